//! Notification module for typeahead
//!
//! Provides the transient notification sink used to surface search failures.

mod notification_state;

pub use notification_state::{Notification, NotificationState, NotificationType};
