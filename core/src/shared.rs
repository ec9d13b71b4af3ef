//! Engine handle for hosts whose signal handlers call back into the engine.
//!
//! A commit handler may want to look at the engine, or feed it another key
//! (simulated input). `SharedEngine` keeps the engine behind `Rc<RefCell<_>>`
//! and delivers signals only after the borrow for the state change has been
//! released, so handlers can borrow the engine again.

use crate::composition::PreeditDisplay;
use crate::ime_engine::{KeyEvent, KeyEventKind, KeyResult, MultipressEngine};
use crate::signal::{Signal, SignalHub};
use crate::table::KeyCandidateTable;
use crate::timer::{Scheduler, TimerId};
use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

/// Shared, re-entrant handle to a `MultipressEngine`.
pub struct SharedEngine<S: Scheduler> {
    engine: Rc<RefCell<MultipressEngine<S>>>,
    signals: SignalHub,
}

/// Non-owning handle, for handlers stored in the engine's own hub.
pub struct WeakEngine<S: Scheduler> {
    engine: Weak<RefCell<MultipressEngine<S>>>,
}

impl<S: Scheduler> SharedEngine<S> {
    pub fn new(mut engine: MultipressEngine<S>) -> Self {
        engine.defer_signals();
        let signals = engine.signals().clone();
        Self {
            engine: Rc::new(RefCell::new(engine)),
            signals,
        }
    }

    /// Handlers, shared with the wrapped engine.
    pub fn signals(&self) -> &SignalHub {
        &self.signals
    }

    /// Borrow the engine for state queries.
    ///
    /// Panics if called from inside an engine method, which cannot happen
    /// from a signal handler.
    pub fn borrow(&self) -> Ref<'_, MultipressEngine<S>> {
        self.engine.borrow()
    }

    /// Handle that does not keep the engine alive.
    ///
    /// Handlers connected to `signals()` should capture this rather than a
    /// clone, which would form a reference cycle through the hub.
    pub fn downgrade(&self) -> WeakEngine<S> {
        WeakEngine {
            engine: Rc::downgrade(&self.engine),
        }
    }

    /// Process a key event.
    ///
    /// A commit caused by the key interrupting a composition is delivered
    /// before the key itself is processed, with the engine idle.
    pub fn handle_key(&self, event: KeyEvent) -> KeyResult {
        if event.kind == KeyEventKind::Press {
            // Handlers may start a new composition; commit that one too
            while self.step(|engine| engine.interrupt(event.keyval)) {}
        }
        self.step(|engine| engine.handle_key(event))
    }

    /// Abandon the composition without committing.
    pub fn reset(&self) {
        self.step(|engine| engine.reset())
    }

    /// Deliver an expired timer. Returns false for stale ids.
    pub fn timer_fired(&self, id: TimerId) -> bool {
        self.step(|engine| engine.timer_fired(id))
    }

    /// Replace the candidate table, abandoning any composition.
    pub fn configure(&self, table: KeyCandidateTable) {
        self.step(|engine| engine.configure(table))
    }

    pub fn is_composing(&self) -> bool {
        self.engine.borrow().is_composing()
    }

    pub fn preedit(&self) -> PreeditDisplay {
        self.engine.borrow().preedit()
    }

    /// Run one state change, then deliver its signals with no borrow held.
    fn step<R>(&self, op: impl FnOnce(&mut MultipressEngine<S>) -> R) -> R {
        let (result, pending) = {
            let mut engine = self.engine.borrow_mut();
            let result = op(&mut *engine);
            (result, engine.take_signals())
        };
        self.deliver(pending);
        result
    }

    fn deliver(&self, pending: Vec<Signal>) {
        for signal in &pending {
            self.signals.emit(signal);
        }
    }
}

impl<S: Scheduler> Clone for SharedEngine<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Rc::clone(&self.engine),
            signals: self.signals.clone(),
        }
    }
}

impl<S: Scheduler> WeakEngine<S> {
    pub fn upgrade(&self) -> Option<SharedEngine<S>> {
        let engine = self.engine.upgrade()?;
        let signals = engine.borrow().signals().clone();
        Some(SharedEngine { engine, signals })
    }
}

impl<S: Scheduler> Clone for WeakEngine<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Weak::clone(&self.engine),
        }
    }
}

impl<S: Scheduler> std::fmt::Debug for SharedEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.engine.try_borrow() {
            Ok(engine) => f.debug_tuple("SharedEngine").field(&*engine).finish(),
            Err(_) => f.write_str("SharedEngine(<busy>)"),
        }
    }
}
