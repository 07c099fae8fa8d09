//! Hot reload of the `engine` section
//!
//! Only timing and resolution constants are applied to a running engine.
//! Changes to the MIDI devices, the cycle period or the simulated project
//! need a restart and are only reported.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use super::{AppConfig, EngineConfig};

/// Editors write in bursts; wait this long before reading the file
const DEBOUNCE: Duration = Duration::from_millis(150);

/// Watches the configuration file and yields changed engine sections
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<EngineConfig>,
}

impl ConfigWatcher {
    /// Load the configuration file and start watching it
    pub async fn new(config_path: String) -> Result<(Self, Arc<AppConfig>)> {
        let initial = AppConfig::load(&config_path)
            .await
            .context("Failed to load initial config")?;
        let initial = Arc::new(initial);

        let (tx, rx) = mpsc::channel(4);
        let current = Arc::new(Mutex::new((*initial).clone()));
        let pending = Arc::new(AtomicBool::new(false));

        let file = PathBuf::from(&config_path);
        let file_name: Option<OsString> = file.file_name().map(|n| n.to_os_string());
        // watch the directory: saving through a temp file replaces the inode
        let dir = match file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        // notify callbacks run on their own OS thread, not in Tokio context
        let runtime = tokio::runtime::Handle::current();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    error!("Watch error: {}", e);
                    return;
                }
            };
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                return;
            }
            let ours = event
                .paths
                .iter()
                .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
            if !ours || pending.swap(true, Ordering::SeqCst) {
                return;
            }
            debug!("Config file changed: {:?}", event.paths);

            let path = config_path.clone();
            let tx = tx.clone();
            let current = current.clone();
            let pending = pending.clone();
            runtime.spawn(async move {
                tokio::time::sleep(DEBOUNCE).await;
                pending.store(false, Ordering::SeqCst);

                let reloaded = match AppConfig::load(&path).await {
                    Ok(config) => config,
                    Err(e) => {
                        warn!("⚠️  Failed to reload config (keeping old config): {:#}", e);
                        return;
                    }
                };

                let mut current = current.lock().await;
                if reloaded.midi != current.midi
                    || reloaded.cycle_ms != current.cycle_ms
                    || reloaded.simulation != current.simulation
                {
                    warn!("Only the engine section reloads live, restart to apply the other changes");
                }
                if reloaded.engine != current.engine {
                    info!("Engine configuration reloaded");
                    if let Err(e) = tx.send(reloaded.engine.clone()).await {
                        error!("Failed to send config update: {}", e);
                    }
                }
                *current = reloaded;
            });
        })?;

        watcher
            .watch(Path::new(&dir), RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config directory: {}", dir.display()))?;

        info!("Config file watcher started for: {}", file.display());

        Ok((
            Self {
                _watcher: watcher,
                rx,
            },
            initial,
        ))
    }

    /// Next changed engine section, `None` once the watcher stopped
    pub async fn next_config(&mut self) -> Option<EngineConfig> {
        self.rx.recv().await
    }
}
