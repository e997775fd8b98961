use crate::Runtime;
use host::{Document, Value};
use std::rc::Rc;

/// Output of one normalization pass.
#[derive(Debug, Default)]
pub struct Normalized {
    /// Host nodes in order, plus producers left in place when not unwrapping.
    pub items: Vec<Value>,
    /// Set when a producer was left in place.
    pub dynamic: bool,
}

impl Normalized {
    pub fn nodes(&self) -> impl Iterator<Item = host::NodeId> + '_ {
        self.items.iter().filter_map(Value::as_node)
    }
}

impl Runtime {
    /// Flatten `values` into host nodes.
    ///
    /// Nodes pass through, nullish and boolean entries vanish, nested arrays
    /// are flattened, everything else becomes a new text node holding its
    /// string form. Producers are either unwrapped and their result
    /// normalized in place, or kept as placeholders that mark the result
    /// dynamic.
    pub fn normalize(&self, doc: &mut Document, values: &[Value], unwrap: bool) -> Normalized {
        let mut out = Normalized::default();
        let mut stack: Vec<(Rc<[Value]>, usize)> = vec![(Rc::from(values), 0)];
        while let Some((items, index)) = stack.last_mut() {
            let Some(item) = items.get(*index).cloned() else {
                stack.pop();
                continue;
            };
            *index += 1;
            match item {
                Value::Node(_) => out.items.push(item),
                Value::Undefined | Value::Null | Value::Bool(_) => {}
                Value::Array(nested) => stack.push((nested, 0)),
                Value::Lazy(_) if unwrap => match self.unwrap_lazy(doc, item) {
                    Value::Array(nested) => stack.push((nested, 0)),
                    resolved => stack.push((Rc::from([resolved]), 0)),
                },
                Value::Lazy(_) => {
                    out.items.push(item);
                    out.dynamic = true;
                }
                other => {
                    let text = doc.create_text_node(&other.to_js_string());
                    out.items.push(Value::Node(text));
                }
            }
        }
        out
    }

    /// Call producers until a non-producer appears. A chain longer than the
    /// configured limit resolves to `Undefined`.
    pub fn unwrap_lazy(&self, doc: &mut Document, value: Value) -> Value {
        let mut current = value;
        let mut calls = 0usize;
        while let Value::Lazy(producer) = &current {
            if calls == self.config().unwrap_limit {
                log::error!(
                    target: "domx::insert",
                    "producer chain exceeded {} calls; treating it as undefined",
                    self.config().unwrap_limit
                );
                return Value::Undefined;
            }
            calls += 1;
            current = producer.clone().call(doc);
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use crate::{Runtime, RuntimeConfig};
    use host::{Document, Value};
    use std::cell::Cell;
    use std::rc::Rc;

    fn texts(doc: &Document, items: &[Value]) -> Vec<String> {
        items
            .iter()
            .map(|v| match v {
                Value::Node(id) => doc.text_content(*id),
                other => format!("{other:?}"),
            })
            .collect()
    }

    #[test]
    fn flattens_and_skips_nullish_and_booleans() {
        let rt = Runtime::new();
        let mut doc = Document::new();
        let span = doc.create_element("span");
        let input = [
            Value::from("a"),
            Value::Null,
            Value::array([Value::from(1), Value::array([Value::Bool(true), Value::from("b")])]),
            Value::Undefined,
            Value::Node(span),
            Value::Bool(false),
        ];
        let out = rt.normalize(&mut doc, &input, false);
        assert!(!out.dynamic);
        assert_eq!(out.items.len(), 4);
        assert!(out.items[3].same(&Value::Node(span)));
        assert_eq!(texts(&doc, &out.items[..3]), ["a", "1", "b"]);
    }

    #[test]
    fn producers_are_placeholders_without_unwrap() {
        let rt = Runtime::new();
        let mut doc = Document::new();
        let lazy = Value::lazy(|_| Value::from("x"));
        let out = rt.normalize(&mut doc, &[Value::from("a"), lazy.clone()], false);
        assert!(out.dynamic);
        assert!(out.items[1].same(&lazy));
    }

    #[test]
    fn unwrapping_resolves_nested_producers() {
        let rt = Runtime::new();
        let mut doc = Document::new();
        let inner = Value::lazy(|_| Value::from("deep"));
        let outer = Value::lazy(move |_| {
            let inner = inner.clone();
            Value::lazy(move |_| Value::array([Value::from("a"), inner.clone()]))
        });
        let out = rt.normalize(&mut doc, &[outer], true);
        assert!(!out.dynamic);
        assert_eq!(texts(&doc, &out.items), ["a", "deep"]);
    }

    #[test]
    fn objects_and_functions_inside_arrays_become_text() {
        let rt = Runtime::new();
        let mut doc = Document::new();
        let input = [Value::from(host::Props::new()), Value::handler(|_, _| {})];
        let out = rt.normalize(&mut doc, &input, false);
        assert_eq!(texts(&doc, &out.items), ["[object Object]", "[function]"]);
    }

    #[test]
    fn unwrap_limit_stops_runaway_chains() {
        let rt = Runtime::with_config(RuntimeConfig {
            unwrap_limit: 5,
            ..RuntimeConfig::default()
        });
        let mut doc = Document::new();
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        fn forever(counter: Rc<Cell<u32>>) -> Value {
            Value::lazy(move |_| {
                counter.set(counter.get() + 1);
                forever(Rc::clone(&counter))
            })
        }
        let resolved = rt.unwrap_lazy(&mut doc, forever(counter));
        assert!(matches!(resolved, Value::Undefined));
        assert_eq!(calls.get(), 5);
    }
}
