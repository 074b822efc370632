//! Rule-set hot reload.
//!
//! An [`EngineHandle`] owns the current [`DispositionEngine`] behind an `Arc`.
//! Request handlers take a snapshot with [`EngineHandle::current`] and evaluate
//! against it without holding any lock. A reload compiles a complete new
//! engine first and only then swaps the pointer, so readers see either the
//! old rule set or the new one, never a mix.
//!
//! [`start_file_watcher`] uses the [`notify`] crate to reload when the
//! config file changes. Invalid configuration is handled fail-safe: the old
//! engine is retained and a warning is logged.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{info, warn};

use super::evaluator::{DispositionEngine, RequestDescriptor};
use super::rule::Disposition;
use crate::error::Result;

/// Shared, swappable reference to the active engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    inner: Arc<RwLock<Arc<DispositionEngine>>>,
}

impl EngineHandle {
    pub fn new(engine: DispositionEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(engine))),
        }
    }

    /// Snapshot of the active engine.
    pub fn current(&self) -> Arc<DispositionEngine> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the active engine, returning the previous one.
    pub fn swap(&self, engine: DispositionEngine) -> Arc<DispositionEngine> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(engine))
    }

    /// Evaluate against the active engine.
    pub fn evaluate(&self, req: &RequestDescriptor<'_>) -> Disposition {
        self.current().evaluate(req)
    }
}

/// Reload the rule set from disk into `handle`.
///
/// On failure (I/O error, invalid TOML, bad pattern, missing env var) the
/// active engine is untouched and the error is returned.
pub fn reload_engine(handle: &EngineHandle, config_path: &Path) -> Result<()> {
    let engine = DispositionEngine::load_from_path(config_path)?;
    let count = engine.rule_count();
    handle.swap(engine);
    info!(
        "Rules reloaded from {} ({} rules)",
        config_path.display(),
        count
    );
    Ok(())
}

/// Start a file-system watcher that triggers [`reload_engine`] on config changes.
///
/// Returns a [`RecommendedWatcher`] handle that must be kept alive for the
/// duration of the watch. Dropping the handle stops the watcher.
pub fn start_file_watcher(
    config_path: PathBuf,
    handle: EngineHandle,
) -> Result<RecommendedWatcher> {
    let path = config_path.clone();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                info!("Config file changed, reloading rules...");
                if let Err(e) = reload_engine(&handle, &path) {
                    warn!("Rule reload failed (keeping old rules): {}", e);
                }
            }
        }
        Err(e) => {
            warn!("File watcher error: {}", e);
        }
    })?;

    watcher.watch(&config_path, RecursiveMode::NonRecursive)?;
    info!("Watching {} for changes", config_path.display());
    Ok(watcher)
}

/// Watch `config_path` if it exists.
///
/// A missing file is not an error: the caller is running on the built-in
/// rules, so there is nothing to reload. A warning is logged and `None` is
/// returned.
pub fn watch_config(config_path: &Path, handle: EngineHandle) -> Result<Option<RecommendedWatcher>> {
    if !config_path.exists() {
        warn!(
            "{} not found, built-in rules in use; not watching for changes",
            config_path.display()
        );
        return Ok(None);
    }
    start_file_watcher(config_path.to_path_buf(), handle).map(Some)
}
