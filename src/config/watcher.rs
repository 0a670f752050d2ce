//! Configuration file watcher for hot reload.
//!
//! # Design Decisions
//! - The parent directory is watched, not the file: editors that save by
//!   rename would otherwise detach the watch after the first write
//! - Events for sibling files are ignored
//! - A reload is forwarded only when it differs from the last configuration
//!   sent, so repeated events for one save produce one update
//! - A file that fails to load or validate keeps the current configuration

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RouterConfig;

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    current: RouterConfig,
    update_tx: mpsc::UnboundedSender<RouterConfig>,
}

impl ConfigWatcher {
    /// Watch `path`, which currently holds `current`.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(
        path: &Path,
        current: RouterConfig,
    ) -> (Self, mpsc::UnboundedReceiver<RouterConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                current,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut filter = ReloadFilter::new(&self.path, self.current);
        let tx = self.update_tx;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Some(config) = filter.apply(&event) {
                        let _ = tx.send(config);
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, dir = ?dir, "Config watcher started");
        Ok(watcher)
    }
}

/// Turns filesystem events into configuration updates.
struct ReloadFilter {
    path: PathBuf,
    file_name: Option<OsString>,
    last: RouterConfig,
}

impl ReloadFilter {
    fn new(path: &Path, last: RouterConfig) -> Self {
        Self {
            path: path.to_path_buf(),
            file_name: path.file_name().map(OsString::from),
            last,
        }
    }

    fn concerns_file(&self, event: &Event) -> bool {
        let Some(file_name) = &self.file_name else {
            return false;
        };
        event
            .paths
            .iter()
            .any(|p| p.file_name() == Some(file_name.as_os_str()))
    }

    /// The reloaded configuration, if `event` changed it.
    fn apply(&mut self, event: &Event) -> Option<RouterConfig> {
        if !(event.kind.is_modify() || event.kind.is_create()) || !self.concerns_file(event) {
            return None;
        }

        tracing::debug!(path = ?self.path, "Config file change detected, reloading");
        match load_config(&self.path) {
            Ok(config) if config == self.last => {
                tracing::debug!("Config file unchanged");
                None
            }
            Ok(config) => {
                tracing::info!(path = ?self.path, "Config reloaded");
                self.last = config.clone();
                Some(config)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Failed to reload config. Keeping current configuration."
                );
                None
            }
        }
    }
}
