//! # Hot Reload Module
//!
//! Watches `config.yaml` and swaps in a rebuilt route table when it changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use actiondispatch::hot_reload::watch_config;
//!
//! let registry = Arc::new(registry);
//! let dispatcher = Arc::new(Dispatcher::from_config(AppConfig::load("config.yaml")?, &registry)?);
//!
//! let reg = Arc::clone(&registry);
//! let watcher = watch_config("config.yaml", Arc::clone(&dispatcher), move |config| {
//!     reg.build_table(config)
//! })?;
//! // keep `watcher` alive for as long as reloads should happen
//! ```
//!
//! ## Reload Process
//!
//! 1. **Detection** - the watcher sees a modify or create event
//! 2. **Parse** - the file is loaded into an [`AppConfig`]
//! 3. **Build** - the caller's factory builds a new [`RouteTable`]
//! 4. **Swap** - [`Dispatcher::reload_config`] installs the config and table
//!    together; the old table's handlers are released once in-flight
//!    requests finish
//!
//! If parsing or building fails the error is logged and the previous table
//! stays live.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{error, info};

use crate::config::{AppConfig, ConfigError};
use crate::dispatcher::{Dispatcher, RouteTable};

/// Load `path` and build a table from it with `build`, then install it.
///
/// Returns the number of routes in the new table.
pub fn reload_from<F>(path: &Path, dispatcher: &Dispatcher, build: &F) -> Result<usize, ConfigError>
where
    F: Fn(&AppConfig) -> Result<RouteTable, ConfigError>,
{
    let config = AppConfig::load(path)?;
    let table = build(&config)?;
    let routes = table.len();
    dispatcher.reload_config(config, table);
    Ok(routes)
}

/// Watch a config file and rebuild the dispatcher's route table when it changes.
pub fn watch_config<P, F>(
    config_path: P,
    dispatcher: Arc<Dispatcher>,
    build: F,
) -> notify::Result<RecommendedWatcher>
where
    P: AsRef<Path>,
    F: Fn(&AppConfig) -> Result<RouteTable, ConfigError> + Send + 'static,
{
    let path: PathBuf = config_path.as_ref().to_path_buf();
    let watch_path = path.clone();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<notify::Event, notify::Error>| match res {
            Ok(event) => {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    return;
                }
                match reload_from(&watch_path, &dispatcher, &build) {
                    Ok(routes) => info!(
                        path = %watch_path.display(),
                        routes,
                        "hot-reload: applied route updates"
                    ),
                    Err(e) => error!(
                        path = %watch_path.display(),
                        error = %e,
                        "hot-reload: keeping previous route table"
                    ),
                }
            }
            Err(e) => error!(error = %e, "hot-reload: watch error"),
        },
        Config::default(),
    )?;

    watcher.watch(&path, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}
