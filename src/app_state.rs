// =============================================================================
// Central Application State — signal engine host
// =============================================================================
//
// Ties the dataset store, the runtime config and the last scan report
// together for the REST handlers.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for all mutable shared values.
//   - A watch channel carries the scan cancel flag.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::market_data::DatasetStore;
use crate::runtime_config::RuntimeConfig;
use crate::scan::ScanReport;

/// Shared state handed to every handler via `Arc<AppState>`.
pub struct AppState {
    /// Incremented on every dataset or config mutation.
    pub state_version: AtomicU64,

    pub runtime_config: RwLock<RuntimeConfig>,

    /// Where config changes are persisted; `None` keeps them in memory.
    pub config_path: Option<PathBuf>,

    pub store: Arc<DatasetStore>,

    pub last_scan: RwLock<Option<ScanReport>>,

    /// Set while a scan is running; only one runs at a time.
    pub scan_running: AtomicBool,

    cancel_tx: watch::Sender<bool>,
}

impl AppState {
    pub fn new(config: RuntimeConfig, store: Arc<DatasetStore>, config_path: Option<PathBuf>) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            state_version: AtomicU64::new(0),
            runtime_config: RwLock::new(config),
            config_path,
            store,
            last_scan: RwLock::new(None),
            scan_running: AtomicBool::new(false),
            cancel_tx,
        }
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::Relaxed)
    }

    pub fn increment_version(&self) {
        self.state_version.fetch_add(1, Ordering::Relaxed);
    }

    /// Reset the cancel flag and hand out a receiver for a new scan.
    pub fn begin_scan(&self) -> watch::Receiver<bool> {
        self.cancel_tx.send_replace(false);
        self.cancel_tx.subscribe()
    }

    /// Claim the single scan slot. `None` while another scan holds it.
    pub fn try_claim_scan(&self) -> Option<ScanSlot<'_>> {
        if self.scan_running.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(ScanSlot { state: self })
    }

    /// Ask the running scan (if any) to stop.
    pub fn cancel_scan(&self) {
        self.cancel_tx.send_replace(true);
    }
}

/// Held for the lifetime of a scan; releases `scan_running` on drop, even
/// when the request future is abandoned mid-scan.
pub struct ScanSlot<'a> {
    state: &'a AppState,
}

impl Drop for ScanSlot<'_> {
    fn drop(&mut self) {
        self.state.scan_running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_flag_resets_per_scan() {
        let state = AppState::new(RuntimeConfig::default(), Arc::new(DatasetStore::new()), None);
        state.cancel_scan();
        let rx = state.begin_scan();
        assert!(!*rx.borrow());
        state.cancel_scan();
        assert!(*rx.borrow());
    }

    #[test]
    fn version_increments() {
        let state = AppState::new(RuntimeConfig::default(), Arc::new(DatasetStore::new()), None);
        assert_eq!(state.current_state_version(), 0);
        state.increment_version();
        assert_eq!(state.current_state_version(), 1);
    }

    #[test]
    fn scan_slot_is_exclusive_and_released_on_drop() {
        let state = AppState::new(RuntimeConfig::default(), Arc::new(DatasetStore::new()), None);
        let slot = state.try_claim_scan();
        assert!(slot.is_some());
        assert!(state.try_claim_scan().is_none());
        drop(slot);
        assert!(!state.scan_running.load(Ordering::SeqCst));
        assert!(state.try_claim_scan().is_some());
    }
}
