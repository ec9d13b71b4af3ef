//! One-shot timers supplied by the host event loop.
//!
//! The engine never sleeps or polls. It asks a `Scheduler` for a timer and
//! cancels it when the composition moves on. When a timer expires the host
//! hands its id back through `MultipressEngine::timer_fired`; ids that are no
//! longer pending are ignored by the engine.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Host timer service.
pub trait Scheduler {
    /// Arrange for a one-shot timer to fire after `delay`.
    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Cancel a timer. Unknown or already fired ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

/// Timer queue driven by a virtual clock.
///
/// The host advances time explicitly and receives the ids that expired, in
/// deadline order. Useful for hosts that already own a clock and for tests.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    now: Duration,
    next_id: u64,
    /// (deadline, id), kept sorted by deadline then id
    pending: Vec<(Duration, TimerId)>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap the queue so the host and an engine can both hold it.
    pub fn shared() -> SharedTimerQueue {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers that have not fired or been cancelled.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|(_, p)| *p == id)
    }

    /// Deadline of the earliest pending timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.first().map(|(deadline, _)| *deadline)
    }

    /// Move the clock forward and return every timer that expired.
    pub fn advance(&mut self, delta: Duration) -> Vec<TimerId> {
        self.now += delta;
        let due = self
            .pending
            .iter()
            .take_while(|(deadline, _)| *deadline <= self.now)
            .count();
        self.pending.drain(..due).map(|(_, id)| id).collect()
    }
}

impl Scheduler for TimerQueue {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let deadline = self.now + delay;
        let pos = self
            .pending
            .partition_point(|(d, _)| *d <= deadline);
        self.pending.insert(pos, (deadline, id));
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|(_, p)| *p != id);
    }
}

/// Timer queue shared between the host loop and an engine.
pub type SharedTimerQueue = Rc<RefCell<TimerQueue>>;

impl<S: Scheduler + ?Sized> Scheduler for Rc<RefCell<S>> {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        self.borrow_mut().schedule(delay)
    }

    fn cancel(&mut self, id: TimerId) {
        self.borrow_mut().cancel(id)
    }
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        (**self).schedule(delay)
    }

    fn cancel(&mut self, id: TimerId) {
        (**self).cancel(id)
    }
}
