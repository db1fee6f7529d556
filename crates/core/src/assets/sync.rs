//! Version-triggered cache purge.
//!
//! Cached non-user assets are re-derivable from the bundle or the remote
//! root, so after a package upgrade they are dropped wholesale. Entries in
//! the user namespace have no other source and always survive.
//!
//! The check runs at most once per [`CacheSynchronizer`]; concurrent callers
//! wait for the first run and then observe its outcome.

use tokio::sync::OnceCell;

use super::AssetPath;
use crate::cache::{PersistentStore, SettingsStore, key};

/// Settings entry holding the package version that last owned the cache.
pub const VERSION_MARKER: &str = "extensionLastVersion";

/// Version assumed when no marker has ever been written.
pub const UNKNOWN_VERSION: &str = "0.0.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Unchecked,
    Checked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Marker matched the running version.
    UpToDate,
    /// Marker could not be read; nothing was purged.
    Skipped,
    /// Version changed and a sweep ran.
    Swept(SweepReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub previous_version: String,
    pub removed: usize,
    pub kept: usize,
    /// False when enumeration or a removal failed and the sweep stopped early.
    pub completed: bool,
}

#[derive(Debug)]
pub struct CacheSynchronizer {
    current_version: String,
    user_prefix: AssetPath,
    outcome: OnceCell<SyncOutcome>,
}

impl CacheSynchronizer {
    pub fn new(current_version: impl Into<String>, user_prefix: AssetPath) -> Self {
        Self { current_version: current_version.into(), user_prefix, outcome: OnceCell::new() }
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    pub fn state(&self) -> SyncState {
        if self.outcome.initialized() { SyncState::Checked } else { SyncState::Unchecked }
    }

    pub fn outcome(&self) -> Option<&SyncOutcome> {
        self.outcome.get()
    }

    /// Move to `Checked`, purging stale entries on the first call only.
    ///
    /// Never fails: storage faults are logged and end the sweep early.
    pub async fn synchronize(&self, store: &dyn PersistentStore, settings: &dyn SettingsStore) -> &SyncOutcome {
        self.outcome.get_or_init(|| self.check(store, settings)).await
    }

    async fn check(&self, store: &dyn PersistentStore, settings: &dyn SettingsStore) -> SyncOutcome {
        let last_version = match settings.get_string(VERSION_MARKER).await {
            Ok(version) => version.unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
            Err(e) => {
                tracing::error!(error = %e, "cache sync: failed to read version marker");
                return SyncOutcome::Skipped;
            }
        };

        if last_version == self.current_version {
            tracing::debug!(version = %self.current_version, "cache sync: version unchanged");
            return SyncOutcome::UpToDate;
        }

        if let Err(e) = settings.set_string(VERSION_MARKER, &self.current_version).await {
            tracing::error!(error = %e, "cache sync: failed to record version marker");
        }

        let report = self.sweep(store, last_version).await;
        tracing::info!(
            from = %report.previous_version,
            to = %self.current_version,
            removed = report.removed,
            kept = report.kept,
            completed = report.completed,
            "cache sync: purged stale assets"
        );
        SyncOutcome::Swept(report)
    }

    async fn sweep(&self, store: &dyn PersistentStore, previous_version: String) -> SweepReport {
        let mut report = SweepReport { previous_version, ..Default::default() };

        let keys = match store.list_all().await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::error!(error = %e, "cache sync: failed to enumerate entries");
                return report;
            }
        };

        for key in keys {
            match key::decode(&key) {
                Ok(path) if path.starts_with(&self.user_prefix) => {
                    report.kept += 1;
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "cache sync: leaving undecodable entry in place");
                    report.kept += 1;
                    continue;
                }
            }

            if let Err(e) = store.remove(&key).await {
                tracing::error!(key = %key, error = %e, "cache sync: failed to remove entry");
                return report;
            }
            report.removed += 1;
        }

        report.completed = true;
        report
    }
}
