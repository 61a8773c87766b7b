mod app_events;
mod app_state;

// Re-export public types
pub use app_events::Command;
pub use app_state::App;
