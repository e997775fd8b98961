use crate::value::Value;
use core_types::NodeId;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    None,
    Capturing,
    AtTarget,
    Bubbling,
}

/// A dispatched event.
///
/// Listeners receive `&Event`; the mutable parts of dispatch state live in
/// cells so a listener can stop propagation without exclusive access. Copies
/// made for bound handlers share the stop flag with the dispatched event.
#[derive(Clone, Debug)]
pub struct Event {
    kind: Rc<str>,
    bubbles: bool,
    target: Cell<Option<NodeId>>,
    current_target: Cell<Option<NodeId>>,
    phase: Cell<Phase>,
    stopped: Rc<Cell<bool>>,
    detail: Value,
    data: Value,
}

impl Event {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: Rc::from(kind),
            bubbles: true,
            target: Cell::new(None),
            current_target: Cell::new(None),
            phase: Cell::new(Phase::None),
            stopped: Rc::new(Cell::new(false)),
            detail: Value::Undefined,
            data: Value::Undefined,
        }
    }

    pub fn non_bubbling(mut self) -> Self {
        self.bubbles = false;
        self
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }

    /// Copy of this event carrying bound handler data.
    pub fn with_data(&self, data: Value) -> Self {
        let mut event = self.clone();
        event.data = data;
        event
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target.get()
    }

    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.get()
    }

    pub fn phase(&self) -> Phase {
        self.phase.get()
    }

    pub fn detail(&self) -> &Value {
        &self.detail
    }

    /// Data bound to the handler at registration, `Undefined` for plain handlers.
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.stopped.get()
    }

    /// Point `current_target` at `node` for dispatchers that fan one host
    /// listener out to handlers stored on other nodes.
    pub fn retarget(&self, node: NodeId) {
        self.current_target.set(Some(node));
    }

    pub(crate) fn begin(&self, target: NodeId) {
        self.target.set(Some(target));
        self.stopped.set(false);
    }

    pub(crate) fn enter(&self, node: NodeId, phase: Phase) {
        self.current_target.set(Some(node));
        self.phase.set(phase);
    }

    pub(crate) fn finish(&self) {
        self.current_target.set(None);
        self.phase.set(Phase::None);
    }
}
