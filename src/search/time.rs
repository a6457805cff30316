use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Shared cancellation flag. Monotonic for the lifetime of one search: it goes
/// from running to stopped and is never reset; a new search gets a new control.
#[derive(Clone, Debug, Default)]
pub struct SearchControl {
    stop: Arc<AtomicBool>,
}

impl SearchControl {
    pub fn new() -> Self { Self::default() }

    pub fn stop(&self) { self.stop.store(true, Ordering::Release); }

    #[inline]
    pub fn is_stopped(&self) -> bool { self.stop.load(Ordering::Acquire) }
}

/// Deadline monitor running beside the search. It sleeps until the budget runs
/// out and then raises the stop flag; dropping it first (search finished)
/// wakes the thread, which exits without touching the flag.
pub struct TimeController {
    deadline: Instant,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TimeController {
    pub fn start(control: SearchControl, budget: Duration) -> Self {
        let deadline = Instant::now() + budget;
        let (tx, rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("time-controller".into())
            .spawn(move || {
                if let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(budget) {
                    log::debug!("time budget of {:?} elapsed, stopping search", budget);
                    control.stop();
                }
            })
            .ok();
        if handle.is_none() {
            log::warn!("could not spawn time controller thread; search runs without a deadline");
        }
        Self { deadline, cancel: Some(tx), handle }
    }

    pub fn deadline(&self) -> Instant { self.deadline }

    pub fn remaining(&self) -> Duration { self.deadline.saturating_duration_since(Instant::now()) }
}

/// Safety margin kept back from every clock-derived budget.
pub const MOVE_OVERHEAD_MS: u64 = 50;

/// Moves assumed left in the game when the GUI does not send `movestogo`.
pub const DEFAULT_MOVES_TO_GO: u64 = 30;

/// Budget for one move from the remaining clock: an even share of the time
/// over the moves to go plus most of the increment, never more than the clock
/// minus the overhead.
pub fn allot_movetime(time_ms: u64, inc_ms: u64, moves_to_go: Option<u64>) -> u64 {
    let mtg = moves_to_go.filter(|&m| m > 0).unwrap_or(DEFAULT_MOVES_TO_GO);
    let share = time_ms / mtg + inc_ms * 3 / 4;
    share.min(time_ms.saturating_sub(MOVE_OVERHEAD_MS)).max(1)
}

impl Drop for TimeController {
    fn drop(&mut self) {
        // Closing the channel wakes the sleeper early
        drop(self.cancel.take());
        if let Some(h) = self.handle.take() { let _ = h.join(); }
    }
}
