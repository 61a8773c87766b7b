use clap::Parser;
use color_eyre::Result;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use typeahead::app::App;
use typeahead::cache::{FileStore, TtlCache};
use typeahead::config::{self, Config};
use typeahead::error::TypeaheadError;
use typeahead::history::RecentHistory;
use typeahead::search::SearchController;
use typeahead::search::worker::WorkerCache;
use typeahead::source::HttpSource;

/// Debounced search-as-you-type against a JSON HTTP API
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Search a JSON HTTP API as you type, with cancellation and a TTL cache",
    after_help = "Each stdin line is the full current query. Commands: :open N, :recent [filter], :invalidate, :quit"
)]
struct Args {
    /// Search endpoint URL (overrides [http] endpoint)
    #[arg(long)]
    endpoint: Option<String>,

    /// Query-string parameter carrying the search text
    #[arg(long)]
    param: Option<String>,

    /// JSON pointer selecting the results in the response, e.g. /items
    #[arg(long)]
    pointer: Option<String>,

    /// Cache freshness window in seconds
    #[arg(long)]
    ttl: Option<u64>,

    /// Delay after the last keystroke before searching, in milliseconds
    #[arg(long)]
    debounce: Option<u64>,

    /// Skip the response cache
    #[arg(long)]
    no_cache: bool,

    /// Recent history file (defaults to the platform data directory)
    #[arg(long)]
    history: Option<PathBuf>,
}

impl Args {
    /// CLI flags take precedence over the config file
    fn apply(&self, config: &mut Config) {
        if let Some(endpoint) = &self.endpoint {
            config.http.endpoint = Some(endpoint.clone());
        }
        if let Some(param) = &self.param {
            config.http.query_param = param.clone();
        }
        if let Some(pointer) = &self.pointer {
            config.http.results_pointer = Some(pointer.clone());
        }
        if let Some(ttl) = self.ttl {
            config.cache.ttl_secs = ttl;
        }
        if let Some(debounce) = self.debounce {
            config.search.debounce_ms = debounce;
        }
        if self.no_cache {
            config.cache.enabled = false;
        }
    }
}

fn main() -> Result<()> {
    // Writes to /tmp/typeahead-debug.log at DEBUG level
    #[cfg(debug_assertions)]
    init_debug_log();

    color_eyre::install()?;

    // Load config before parsing so flags can override it
    let config_result = config::load_config();

    let args = Args::parse();
    let mut config = config_result.config;
    args.apply(&mut config);

    let mut app = build_app(&config, args.history.as_deref())?;

    if let Some(warning) = config_result.warning {
        app.search.notification.show_warning(&warning);
    }

    run(&mut app)?;

    #[cfg(debug_assertions)]
    log::debug!("=== TYPEAHEAD DEBUG SESSION ENDED ===");

    Ok(())
}

#[cfg(debug_assertions)]
fn init_debug_log() {
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("/tmp/typeahead-debug.log")
    {
        Ok(file) => file,
        Err(_) => return,
    };

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .format(|buf, record| {
            use std::time::SystemTime;
            let datetime: chrono::DateTime<chrono::Local> = SystemTime::now().into();
            writeln!(
                buf,
                "[{}] [{}] {}",
                datetime.format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .init();

    log::debug!("=== TYPEAHEAD DEBUG SESSION STARTED ===");
}

fn build_app(config: &Config, history_path: Option<&std::path::Path>) -> Result<App, TypeaheadError> {
    let has_endpoint = config
        .http
        .endpoint
        .as_deref()
        .is_some_and(|e| !e.trim().is_empty());
    if !has_endpoint {
        return Err(TypeaheadError::MissingEndpoint);
    }
    let source = HttpSource::from_config(&config.http)?;

    let cache = if config.cache.enabled {
        config.cache.cache_dir().map(|dir| {
            log::debug!("Caching responses in {:?}", dir);
            WorkerCache::new(TtlCache::new(FileStore::new(dir)), config.cache.ttl())
        })
    } else {
        None
    };

    let search = SearchController::new(source, &config.search, cache);

    let recent = match history_path {
        Some(path) => RecentHistory::load(path),
        None => RecentHistory::load_default(),
    };

    // Long enough for the debounce window plus a full request timeout
    let settle_timeout = config.search.debounce()
        + Duration::from_millis(config.http.timeout_ms)
        + Duration::from_secs(1);

    Ok(App::new(search, recent, settle_timeout))
}

fn run(app: &mut App) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();

    app.flush_notification(&mut err)?;

    for line in stdin.lock().lines() {
        let line = line?;
        app.handle_line(&line, &mut out, &mut err)?;
        out.flush()?;

        if app.should_quit() {
            break;
        }
    }

    app.search.unmount();
    Ok(())
}
