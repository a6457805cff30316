use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::board::Position;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::search::deepening;
use crate::search::time::SearchControl;
use crate::search::tt::TranspositionTable;
use crate::search::{Reporter, SearchParams, SearchResult};

/// Owns the transposition table and settings across searches and runs each
/// search on its own worker thread. At most one search is active at a time.
pub struct Engine {
    params: SearchParams,
    hash_mb: usize,
    tt: Arc<Mutex<TranspositionTable>>,
    control: SearchControl,
    busy: Arc<AtomicBool>,
    reporter: Option<Reporter>,
}

/// Handle to a running search. Dropping it detaches the worker; the search
/// still ends at its limits or on `Engine::request_stop`.
pub struct SearchHandle {
    join: JoinHandle<Result<SearchResult, EngineError>>,
    control: SearchControl,
}

impl SearchHandle {
    pub fn wait(self) -> Result<SearchResult, EngineError> {
        self.join.join().map_err(|_| EngineError::WorkerPanicked)?
    }

    pub fn stop(&self) { self.control.stop(); }

    pub fn is_finished(&self) -> bool { self.join.is_finished() }
}

// Clears the busy flag however the worker exits.
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) { self.0.store(false, Ordering::Release); }
}

impl Default for Engine {
    fn default() -> Self { Self::new(&EngineConfig::default()) }
}

impl Engine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            params: config.search_params(),
            hash_mb: config.hash_mb.max(1),
            tt: Arc::new(Mutex::new(TranspositionTable::with_capacity_mb(config.hash_mb))),
            control: SearchControl::new(),
            busy: Arc::new(AtomicBool::new(false)),
            reporter: None,
        }
    }

    pub fn params(&self) -> &SearchParams { &self.params }

    pub fn hash_mb(&self) -> usize { self.hash_mb }

    pub fn is_searching(&self) -> bool { self.busy.load(Ordering::Acquire) }

    /// Limits for the next search; `None` for both means search until stopped.
    pub fn configure(&mut self, depth_limit: Option<u32>, time_limit_ms: Option<u64>) {
        self.params.depth = depth_limit.map(|d| d.max(1));
        self.params.movetime = time_limit_ms.map(Duration::from_millis);
    }

    pub fn set_threads(&mut self, threads: usize) { self.params.threads = threads.max(1); }

    pub fn set_use_tt(&mut self, use_tt: bool) { self.params.use_tt = use_tt; }

    pub fn set_reporter(&mut self, reporter: Option<Reporter>) { self.reporter = reporter; }

    /// Reallocates the table; its contents are lost.
    pub fn set_hash_mb(&mut self, mb: usize) -> Result<(), EngineError> {
        if self.is_searching() { return Err(EngineError::SearchInProgress); }
        let mb = mb.max(1);
        *self.lock_tt() = TranspositionTable::with_capacity_mb(mb);
        self.hash_mb = mb;
        debug!("transposition table resized to {} MB", mb);
        Ok(())
    }

    pub fn reset_state(&mut self) -> Result<(), EngineError> {
        if self.is_searching() { return Err(EngineError::SearchInProgress); }
        self.lock_tt().clear();
        Ok(())
    }

    pub fn request_stop(&self) { self.control.stop(); }

    pub fn start_search(&mut self, position: Position) -> Result<SearchHandle, EngineError> {
        if let Some(t) = position.terminal() { return Err(EngineError::NoLegalMoves(t)); }
        if self.busy.swap(true, Ordering::AcqRel) { return Err(EngineError::SearchInProgress); }
        let guard = BusyGuard(self.busy.clone());

        self.control = SearchControl::new();
        let control = self.control.clone();
        let tt = self.tt.clone();
        let params = self.params;
        let reporter = self.reporter.clone();
        let mut pos = position;

        let join = thread::Builder::new()
            .name("search".into())
            .spawn(move || {
                let _guard = guard;
                let mut table = tt.lock().unwrap_or_else(|poisoned| {
                    warn!("transposition table lock was poisoned; reusing its contents");
                    poisoned.into_inner()
                });
                let table = if params.use_tt { Some(&mut *table) } else { None };
                deepening::run(&mut pos, table, &control, &params, reporter.as_ref())
            })?;
        Ok(SearchHandle { join, control: self.control.clone() })
    }

    /// Starts a search and blocks until it returns.
    pub fn search(&mut self, position: Position) -> Result<SearchResult, EngineError> {
        self.start_search(position)?.wait()
    }

    fn lock_tt(&self) -> std::sync::MutexGuard<'_, TranspositionTable> {
        self.tt.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
