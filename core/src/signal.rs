//! Notifications sent from the engine to its host widget.
//!
//! The host registers handlers per signal kind; the engine invokes them
//! synchronously, in registration order, as state changes. These four signals
//! are the engine's entire output.

use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A notification emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "signal", content = "text", rename_all = "kebab-case")]
pub enum Signal {
    /// A composition began; preedit text is about to appear.
    PreeditStart,
    /// The preedit text changed; re-read it with `MultipressEngine::preedit`.
    PreeditChanged,
    /// The composition ended; preedit text is gone.
    PreeditEnd,
    /// Final text for the host to insert.
    Commit(String),
}

impl Signal {
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::PreeditStart => SignalKind::PreeditStart,
            Signal::PreeditChanged => SignalKind::PreeditChanged,
            Signal::PreeditEnd => SignalKind::PreeditEnd,
            Signal::Commit(_) => SignalKind::Commit,
        }
    }
}

/// Signal kinds handlers can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    PreeditStart,
    PreeditChanged,
    PreeditEnd,
    Commit,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::PreeditStart,
        SignalKind::PreeditChanged,
        SignalKind::PreeditEnd,
        SignalKind::Commit,
    ];

    /// Name as hosts know it (`preedit-start`, `commit`, ...).
    pub fn name(self) -> &'static str {
        match self {
            SignalKind::PreeditStart => "preedit-start",
            SignalKind::PreeditChanged => "preedit-changed",
            SignalKind::PreeditEnd => "preedit-end",
            SignalKind::Commit => "commit",
        }
    }
}

/// Handle returned by `SignalHub::connect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

type Handler = Rc<dyn Fn(&Signal)>;

#[derive(Default)]
struct HubInner {
    next_id: Cell<u64>,
    handlers: RefCell<Vec<(HandlerId, SignalKind, Handler)>>,
}

/// Per-kind handler lists.
///
/// Clones share the same handlers. Emission works on a snapshot of the
/// handler list, so a handler may emit again, connect or disconnect while
/// it runs.
#[derive(Clone, Default)]
pub struct SignalHub {
    inner: Rc<HubInner>,
}

impl SignalHub {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> HandlerId {
        let id = self.inner.next_id.get() + 1;
        self.inner.next_id.set(id);
        HandlerId(id)
    }

    /// Register a handler for one kind of signal.
    pub fn connect<F>(&self, kind: SignalKind, handler: F) -> HandlerId
    where
        F: Fn(&Signal) + 'static,
    {
        let id = self.next_id();
        let handler: Handler = Rc::new(handler);
        self.inner.handlers.borrow_mut().push((id, kind, handler));
        id
    }

    /// Register one handler for every kind of signal.
    pub fn connect_all<F>(&self, handler: F) -> HandlerId
    where
        F: Fn(&Signal) + 'static,
    {
        let id = self.next_id();
        let handler: Handler = Rc::new(handler);
        let mut handlers = self.inner.handlers.borrow_mut();
        for kind in SignalKind::ALL {
            handlers.push((id, kind, Rc::clone(&handler)));
        }
        id
    }

    /// Remove a handler. Returns false if it was not connected.
    pub fn disconnect(&self, id: HandlerId) -> bool {
        let mut handlers = self.inner.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(h, _, _)| *h != id);
        handlers.len() != before
    }

    pub fn handler_count(&self) -> usize {
        self.inner.handlers.borrow().len()
    }

    /// Invoke the handlers subscribed to this signal's kind.
    pub fn emit(&self, signal: &Signal) {
        let kind = signal.kind();
        let handlers: Vec<Handler> = self
            .inner
            .handlers
            .borrow()
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(_, _, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler(signal);
        }
    }
}

impl std::fmt::Debug for SignalHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalHub")
            .field("handlers", &self.handler_count())
            .finish()
    }
}

/// Shared recorder of emitted signals.
///
/// ```
/// # use libmultipress_core::{Signal, SignalHub, SignalLog};
/// let log = SignalLog::new();
/// let hub = SignalHub::new();
/// log.attach(&hub);
/// hub.emit(&Signal::Commit("a".into()));
/// assert_eq!(log.commits(), vec!["a".to_string()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SignalLog {
    signals: Rc<RefCell<Vec<Signal>>>,
}

impl SignalLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every signal emitted through `hub`.
    pub fn attach(&self, hub: &SignalHub) -> HandlerId {
        let signals = Rc::clone(&self.signals);
        hub.connect_all(move |s| signals.borrow_mut().push(s.clone()))
    }

    /// Recorded signals, oldest first.
    pub fn signals(&self) -> Vec<Signal> {
        self.signals.borrow().clone()
    }

    /// Remove and return recorded signals.
    pub fn take(&self) -> Vec<Signal> {
        std::mem::take(&mut *self.signals.borrow_mut())
    }

    /// Committed strings only.
    pub fn commits(&self) -> Vec<String> {
        self.signals
            .borrow()
            .iter()
            .filter_map(|s| match s {
                Signal::Commit(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.signals.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handlers_run_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let hub = SignalHub::new();
        for n in 0..3 {
            let order = Rc::clone(&order);
            hub.connect(SignalKind::Commit, move |_| order.borrow_mut().push(n));
        }
        hub.emit(&Signal::Commit("x".into()));
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_handlers_only_see_their_kind() {
        let log = SignalLog::new();
        let hub = SignalHub::new();
        let signals = log.signals.clone();
        hub.connect(SignalKind::PreeditEnd, move |s| signals.borrow_mut().push(s.clone()));

        hub.emit(&Signal::PreeditStart);
        hub.emit(&Signal::Commit("a".into()));
        hub.emit(&Signal::PreeditEnd);
        assert_eq!(log.signals(), vec![Signal::PreeditEnd]);
    }

    #[test]
    fn test_disconnect() {
        let log = SignalLog::new();
        let hub = SignalHub::new();
        let id = log.attach(&hub);
        assert_eq!(hub.handler_count(), 4);

        assert!(hub.disconnect(id));
        assert!(!hub.disconnect(id));
        hub.emit(&Signal::PreeditStart);
        assert!(log.signals().is_empty());
    }

    #[test]
    fn test_signal_kind_names() {
        assert_eq!(Signal::Commit("b".into()).kind(), SignalKind::Commit);
        assert_eq!(SignalKind::PreeditChanged.name(), "preedit-changed");
    }

    #[test]
    fn test_handler_may_emit_and_disconnect() {
        let log = SignalLog::new();
        let hub = SignalHub::new();
        log.attach(&hub);

        let inner = hub.clone();
        let id = Rc::new(Cell::new(None));
        let own_id = Rc::clone(&id);
        id.set(Some(hub.connect(SignalKind::Commit, move |_| {
            inner.emit(&Signal::PreeditEnd);
            if let Some(id) = own_id.get() {
                inner.disconnect(id);
            }
        })));

        hub.emit(&Signal::Commit("a".into()));
        hub.emit(&Signal::Commit("b".into()));
        assert_eq!(
            log.signals(),
            vec![
                Signal::Commit("a".into()),
                Signal::PreeditEnd,
                Signal::Commit("b".into()),
            ]
        );
    }
}
