use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Period of the session clock.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Identifies one round. Ticks carry the id of the round that armed them so a
/// tick from a replaced round can never reach a newer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundId(u64);

impl RoundId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        RoundId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round-{}", self.0)
    }
}

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Paint opportunity; emitted when no other event arrived within a frame.
    Frame,
    /// One second of session clock for the given round.
    Tick(RoundId),
}

/// Source of terminal events (keyboard, resize, ticks)
pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        thread::spawn(move || loop {
            let event = match event::read() {
                Ok(CtEvent::Key(key)) => AppEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!("terminal input closed: {err}");
                    break;
                }
            };
            if input_tx.send(event).is_err() {
                break;
            }
        });

        Self { tx, rx }
    }

    /// Sender that tick sources use to join the same event stream.
    pub fn sender(&self) -> Sender<AppEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable frame ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Runner that advances the application one event at a time
pub struct Runner<E: AppEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: AppEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to one frame interval and returns the next event, or Frame on timeout
    pub fn step(&self) -> AppEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                AppEvent::Frame
            }
        }
    }
}

/// Live one-second tick source of a round. Dropping the handle cancels it.
#[derive(Debug)]
pub struct TimerHandle {
    round: RoundId,
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn new(round: RoundId) -> Self {
        Self {
            round,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn round(&self) -> RoundId {
        self.round
    }

    /// Flag shared with the tick source; set once the handle is released.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            tracing::debug!(round = %self.round, "tick source cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Arms the per-round one-second clock.
pub trait TickScheduler: fmt::Debug + Send + Sync {
    fn schedule(&self, round: RoundId) -> TimerHandle;
}

/// Sends `AppEvent::Tick` into the app's event channel from a helper thread.
#[derive(Debug, Clone)]
pub struct ThreadTickScheduler {
    tx: Sender<AppEvent>,
    interval: Duration,
}

impl ThreadTickScheduler {
    pub fn new(tx: Sender<AppEvent>) -> Self {
        Self::with_interval(tx, TICK_INTERVAL)
    }

    pub fn with_interval(tx: Sender<AppEvent>, interval: Duration) -> Self {
        Self { tx, interval }
    }
}

impl TickScheduler for ThreadTickScheduler {
    fn schedule(&self, round: RoundId) -> TimerHandle {
        let handle = TimerHandle::new(round);
        let cancelled = handle.cancel_flag();
        let tx = self.tx.clone();
        let interval = self.interval;

        thread::spawn(move || loop {
            thread::sleep(interval);
            if cancelled.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(AppEvent::Tick(round)).is_err() {
                break;
            }
        });

        handle
    }
}

/// Scheduler that never fires on its own; ticks are delivered by the caller.
/// Keeps track of the cancel flags it handed out.
#[derive(Debug, Default)]
pub struct ManualTickScheduler {
    armed: Mutex<Vec<(RoundId, Arc<AtomicBool>)>>,
}

impl ManualTickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a tick source for `round` is armed and not yet cancelled.
    pub fn is_active(&self, round: RoundId) -> bool {
        self.armed
            .lock()
            .map(|armed| {
                armed
                    .iter()
                    .any(|(r, flag)| *r == round && !flag.load(Ordering::SeqCst))
            })
            .unwrap_or(false)
    }

    pub fn scheduled_count(&self) -> usize {
        self.armed.lock().map(|armed| armed.len()).unwrap_or(0)
    }
}

impl TickScheduler for ManualTickScheduler {
    fn schedule(&self, round: RoundId) -> TimerHandle {
        let handle = TimerHandle::new(round);
        if let Ok(mut armed) = self.armed.lock() {
            armed.push((round, handle.cancel_flag()));
        }
        handle
    }
}
