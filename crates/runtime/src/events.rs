//! Listener attachment and document-level delegation.
//!
//! Delegated handlers live on the node as `$$<name>` properties (bound data
//! under `$$<name>Data`). One bubbling listener per event name on the
//! document root walks from the target upwards and calls them.

use crate::Runtime;
use host::{Document, DomError, Event, Handler, NodeId, Value};
use std::rc::Rc;

pub(crate) struct Delegation {
    names: Vec<Rc<str>>,
    handler: Handler,
}

fn handler_key(name: &str) -> String {
    format!("$${name}")
}

fn data_key(name: &str) -> String {
    format!("$${name}Data")
}

/// Split a handler value into the callable and its bound data. The bound form
/// is a two-element array `[handler, data]`.
fn bound_handler(value: &Value) -> Option<(Handler, Option<Value>)> {
    match value {
        Value::Handler(h) => Some((h.clone(), None)),
        Value::Array(items) => match items.first() {
            Some(Value::Handler(h)) => Some((h.clone(), Some(items.get(1).cloned().unwrap_or_default()))),
            _ => None,
        },
        _ => None,
    }
}

impl Runtime {
    /// Attach `handler` for events named `name` on `node`, either as a host
    /// listener or, with `delegate`, as a handler the document-level
    /// dispatcher finds on the node.
    pub fn add_event_listener(
        &self,
        doc: &mut Document,
        node: NodeId,
        name: &str,
        handler: &Value,
        delegate: bool,
    ) -> Result<(), DomError> {
        if delegate {
            return match bound_handler(handler) {
                Some((h, Some(data))) => {
                    doc.set_property(node, &handler_key(name), Value::Handler(h))?;
                    doc.set_property(node, &data_key(name), data)
                }
                _ => doc.set_property(node, &handler_key(name), handler.clone()),
            };
        }
        match bound_handler(handler) {
            Some((h, None)) => doc.add_event_listener(node, name, h, false),
            Some((h, Some(data))) => {
                let wrapped = Handler::new(move |doc, event| h.call(doc, &event.with_data(data.clone())));
                doc.add_event_listener(node, name, wrapped, false)
            }
            None => {
                log::warn!(
                    target: "domx::events",
                    "ignoring non-callable {name} handler {handler:?} on {node:?}"
                );
                Ok(())
            }
        }
    }

    /// Install the document-level dispatcher for each of `names`. Names
    /// already installed for this document are skipped.
    pub fn delegate_events(&self, doc: &mut Document, names: &[&str]) -> Result<(), DomError> {
        let mut registry = self.delegated.borrow_mut();
        let entry = registry.entry(doc.id()).or_insert_with(|| Delegation {
            names: Vec::new(),
            handler: Handler::new(dispatch_delegated),
        });
        let root = doc.root();
        for &name in names {
            if entry.names.iter().any(|n| n.as_ref() == name) {
                continue;
            }
            log::trace!(target: "domx::events", "delegating {name} on {:?}", doc.id());
            doc.add_event_listener(root, name, entry.handler.clone(), false)?;
            entry.names.push(Rc::from(name));
        }
        Ok(())
    }

    /// Remove every dispatcher `delegate_events` installed on `doc`.
    pub fn clear_delegated_events(&self, doc: &mut Document) -> Result<(), DomError> {
        let Some(entry) = self.delegated.borrow_mut().remove(&doc.id()) else {
            return Ok(());
        };
        let root = doc.root();
        for name in &entry.names {
            doc.remove_event_listener(root, name, &entry.handler, false)?;
        }
        Ok(())
    }
}

/// Walk from the target to the root calling delegated handlers. Disabled
/// elements are skipped; a handler that stops propagation ends the walk.
fn dispatch_delegated(doc: &mut Document, event: &Event) {
    let key = handler_key(event.kind());
    let bound = data_key(event.kind());
    let mut node = event.target();
    while let Some(current) = node {
        if let Value::Handler(handler) = doc.property(current, &key) {
            if !doc.property(current, "disabled").truthy() {
                event.retarget(current);
                match doc.property(current, &bound) {
                    Value::Undefined => handler.call(doc, event),
                    data => handler.call(doc, &event.with_data(data)),
                }
                if event.propagation_stopped() {
                    break;
                }
            }
        }
        node = doc.parent(current);
    }
    event.retarget(doc.root());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Value {
        let log = Rc::clone(log);
        Value::handler(move |_, e| {
            let data = match e.data() {
                Value::Undefined => String::new(),
                d => format!(":{d}"),
            };
            log.borrow_mut().push(format!("{tag}{data}"));
        })
    }

    fn tree(doc: &mut Document) -> (NodeId, NodeId) {
        let outer = doc.create_element("div");
        let inner = doc.create_element("button");
        let root = doc.root();
        doc.append_child(root, outer).expect("append");
        doc.append_child(outer, inner).expect("append");
        (outer, inner)
    }

    #[test]
    fn bound_handlers_receive_their_data() {
        let rt = Runtime::new();
        let mut doc = Document::new();
        let (_, button) = tree(&mut doc);
        let log = Rc::new(RefCell::new(Vec::new()));
        let bound = Value::array([recorder(&log, "hit"), Value::from(7)]);
        rt.add_event_listener(&mut doc, button, "click", &bound, false)
            .expect("listen");
        doc.dispatch(button, "click").expect("dispatch");
        assert_eq!(*log.borrow(), ["hit:7"]);
    }

    #[test]
    fn delegated_handlers_run_from_target_upwards() {
        let rt = Runtime::new();
        let mut doc = Document::new();
        let (outer, button) = tree(&mut doc);
        let log = Rc::new(RefCell::new(Vec::new()));
        rt.add_event_listener(&mut doc, button, "click", &recorder(&log, "button"), true)
            .expect("button");
        let bound = Value::array([recorder(&log, "outer"), Value::from("d")]);
        rt.add_event_listener(&mut doc, outer, "click", &bound, true)
            .expect("outer");
        rt.delegate_events(&mut doc, &["click", "click"]).expect("delegate");
        assert_eq!(doc.listener_count(doc.root(), "click"), 1);

        doc.dispatch(button, "click").expect("dispatch");
        assert_eq!(*log.borrow(), ["button", "outer:d"]);

        rt.clear_delegated_events(&mut doc).expect("clear");
        assert_eq!(doc.listener_count(doc.root(), "click"), 0);
        doc.dispatch(button, "click").expect("dispatch");
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn delegated_walk_skips_disabled_and_honors_stop() {
        let rt = Runtime::new();
        let mut doc = Document::new();
        let (outer, button) = tree(&mut doc);
        let log = Rc::new(RefCell::new(Vec::new()));
        rt.add_event_listener(&mut doc, button, "click", &recorder(&log, "button"), true)
            .expect("button");
        doc.set_property(button, "disabled", Value::Bool(true)).expect("disable");
        let stopper = Value::handler(|_, e| e.stop_propagation());
        rt.add_event_listener(&mut doc, outer, "click", &stopper, true)
            .expect("outer");
        let root_hits = Rc::new(RefCell::new(0));
        let hits = Rc::clone(&root_hits);
        let root = doc.root();
        rt.delegate_events(&mut doc, &["click"]).expect("delegate");
        doc.add_event_listener(root, "click", Handler::new(move |_, _| *hits.borrow_mut() += 1), false)
            .expect("root listener");

        doc.dispatch(button, "click").expect("dispatch");
        assert!(log.borrow().is_empty());
        // Stopping inside the delegated walk does not cancel other listeners on the root.
        assert_eq!(*root_hits.borrow(), 1);
    }
}
