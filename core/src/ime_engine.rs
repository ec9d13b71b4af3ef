//! Multipress compose engine.
//!
//! Pressing a configured key repeatedly cycles through its candidates, the
//! way text is entered on a phone keypad: `2` gives `a`, `2 2` gives `b`,
//! and so on, wrapping back to the first candidate after the last. The
//! current candidate is shown as preedit text and becomes final (is
//! committed) when
//!
//! - a different key is pressed,
//! - the compose timeout elapses with no further key press.
//!
//! Keys without candidates commit their printable character directly, or are
//! left to the host when they have none.

use crate::composition::PreeditDisplay;
use crate::keyval::Keyval;
use crate::signal::{Signal, SignalHub};
use crate::table::KeyCandidateTable;
use crate::timer::{Scheduler, TimerId};
use crate::Config;
use std::time::Duration;
use tracing::{debug, trace};

/// Whether a key went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Press,
    Release,
}

/// A key event delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub keyval: Keyval,
    pub kind: KeyEventKind,
}

impl KeyEvent {
    pub fn press(keyval: Keyval) -> Self {
        Self {
            keyval,
            kind: KeyEventKind::Press,
        }
    }

    pub fn release(keyval: Keyval) -> Self {
        Self {
            keyval,
            kind: KeyEventKind::Release,
        }
    }
}

/// Result of processing a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResult {
    /// Key was consumed by the engine
    Handled,
    /// Key was not handled (pass through to the host)
    NotHandled,
}

/// Mutable compose state; idle when `press_count == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ComposeState {
    last_key: Keyval,
    press_count: usize,
    tentative_match: Option<String>,
    pending_timer: Option<TimerId>,
}

impl ComposeState {
    fn idle() -> Self {
        Self {
            last_key: Keyval::VOID,
            press_count: 0,
            tentative_match: None,
            pending_timer: None,
        }
    }
}

/// Multipress input engine.
///
/// Owns its candidate table, compose state and the handle to at most one
/// outstanding auto-commit timer. All methods run on the host's event-loop
/// thread.
///
/// Used directly, the engine emits signals while its method is still
/// running, so handlers cannot call back into it. Wrap it in a
/// [`SharedEngine`](crate::SharedEngine) when handlers need to.
pub struct MultipressEngine<S: Scheduler> {
    table: KeyCandidateTable,
    scheduler: S,
    signals: SignalHub,
    compose_timeout: Duration,
    state: ComposeState,
    /// Signals held back for the caller to deliver, when deferred.
    outbox: Vec<Signal>,
    defer_signals: bool,
}

impl<S: Scheduler> MultipressEngine<S> {
    pub fn new(table: KeyCandidateTable, scheduler: S, config: &Config) -> Self {
        Self {
            table,
            scheduler,
            signals: SignalHub::new(),
            compose_timeout: config.compose_timeout(),
            state: ComposeState::idle(),
            outbox: Vec::new(),
            defer_signals: false,
        }
    }

    /// Replace the candidate table.
    ///
    /// A composition in progress is abandoned first, as with `reset`.
    pub fn configure(&mut self, table: KeyCandidateTable) {
        self.reset();
        self.table = table;
    }

    pub fn table(&self) -> &KeyCandidateTable {
        &self.table
    }

    /// Handlers for `preedit-start`, `preedit-changed`, `preedit-end` and `commit`.
    pub fn signals(&self) -> &SignalHub {
        &self.signals
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn compose_timeout(&self) -> Duration {
        self.compose_timeout
    }

    /// Change the auto-commit delay for timers started from now on.
    pub fn set_compose_timeout(&mut self, timeout: Duration) {
        self.compose_timeout = timeout;
    }

    pub fn is_composing(&self) -> bool {
        self.state.press_count > 0
    }

    pub fn press_count(&self) -> usize {
        self.state.press_count
    }

    /// Key of the composition in progress, `Keyval::VOID` when idle.
    pub fn last_key(&self) -> Keyval {
        self.state.last_key
    }

    pub fn tentative_match(&self) -> Option<&str> {
        self.state.tentative_match.as_deref()
    }

    /// The pending auto-commit timer, if any.
    pub fn pending_timer(&self) -> Option<TimerId> {
        self.state.pending_timer
    }

    /// Process a key event.
    ///
    /// Releases are never consumed. A press of a key other than the one
    /// being composed first commits the current tentative match.
    pub fn handle_key(&mut self, event: KeyEvent) -> KeyResult {
        if event.kind != KeyEventKind::Press {
            return KeyResult::NotHandled;
        }
        let key = event.keyval;
        self.interrupt(key);

        let Some(candidates) = self.table.candidates(key) else {
            return self.handle_plain_key(key);
        };

        let starting = self.state.press_count == 0;

        // Past the last candidate: cycle back to the first
        let index = if self.state.press_count >= candidates.len() {
            0
        } else {
            self.state.press_count
        };
        let candidate = candidates[index].clone();

        if starting {
            self.emit(Signal::PreeditStart);
        }

        trace!(key = %key, index, candidate = %candidate, "tentative match");
        self.state.last_key = key;
        self.state.tentative_match = Some(candidate);
        self.state.press_count = index + 1;

        self.emit(Signal::PreeditChanged);

        self.cancel_automatic_timeout_commit();
        self.state.pending_timer = Some(self.scheduler.schedule(self.compose_timeout));

        KeyResult::Handled
    }

    /// Commit the tentative match if a press of `key` ends the composition.
    ///
    /// That is any key other than the one being composed, or a key that has
    /// no candidates. Returns true if something was committed.
    pub(crate) fn interrupt(&mut self, key: Keyval) -> bool {
        if self.state.press_count == 0
            || (self.state.last_key == key && self.table.contains(key))
        {
            return false;
        }
        match self.state.tentative_match.clone() {
            Some(text) => {
                self.accept_character(text);
                true
            }
            None => false,
        }
    }

    /// Key without candidates: pass its own character through if it has one.
    fn handle_plain_key(&mut self, key: Keyval) -> KeyResult {
        match key.to_unicode() {
            Some(ch) => {
                self.accept_character(ch.to_string());
                KeyResult::Handled
            }
            None => KeyResult::NotHandled,
        }
    }

    /// Abandon the composition without committing.
    pub fn reset(&mut self) {
        self.clear_compose_buffer();
    }

    /// Deliver an expired timer.
    ///
    /// Commits the tentative match if `id` is the pending auto-commit timer.
    /// Returns false for stale ids (cancelled or superseded timers).
    pub fn timer_fired(&mut self, id: TimerId) -> bool {
        if self.state.pending_timer != Some(id) {
            trace!(timer = id.0, "ignoring stale timer");
            return false;
        }
        // Already expired; nothing left to cancel
        self.state.pending_timer = None;

        if let Some(text) = self.state.tentative_match.clone() {
            debug!(text = %text, "compose timeout, accepting tentative match");
            self.accept_character(text);
        }
        true
    }

    /// What the host should show as preedit.
    pub fn preedit(&self) -> PreeditDisplay {
        PreeditDisplay::tentative(self.state.tentative_match.as_deref().unwrap_or(""))
    }

    fn cancel_automatic_timeout_commit(&mut self) {
        if let Some(id) = self.state.pending_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    /// Return to idle, ending any visible preedit.
    fn clear_compose_buffer(&mut self) {
        self.state.last_key = Keyval::VOID;
        self.state.press_count = 0;

        self.cancel_automatic_timeout_commit();

        if self.state.tentative_match.take().is_some() {
            self.emit(Signal::PreeditChanged);
            self.emit(Signal::PreeditEnd);
        }
    }

    /// Finish composing and hand `text` to the host.
    ///
    /// State is idle before `commit` handlers run, and the preedit is
    /// cleared before the commit is emitted.
    fn accept_character(&mut self, text: String) {
        self.clear_compose_buffer();
        debug!(text = %text, "commit");
        self.emit(Signal::Commit(text));
    }

    fn emit(&mut self, signal: Signal) {
        if self.defer_signals {
            self.outbox.push(signal);
        } else {
            self.signals.emit(&signal);
        }
    }

    /// Hold signals back until `take_signals` instead of emitting them.
    pub(crate) fn defer_signals(&mut self) {
        self.defer_signals = true;
    }

    /// Signals held back since the last call, oldest first.
    pub(crate) fn take_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.outbox)
    }
}

impl<S: Scheduler> Drop for MultipressEngine<S> {
    fn drop(&mut self) {
        self.cancel_automatic_timeout_commit();
    }
}

impl<S: Scheduler> std::fmt::Debug for MultipressEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipressEngine")
            .field("table_entries", &self.table.len())
            .field("compose_timeout", &self.compose_timeout)
            .field("state", &self.state)
            .finish()
    }
}
