//! Composite property helpers: inline style, class maps, prop merging and
//! whole-object spreads.

use crate::Runtime;
use crate::insert::Marker;
use host::{Document, DomError, NodeId, PropEntry, Props, Value};
use std::rc::Rc;

/// Class keys a class-map helper last turned on for one element.
///
/// Owned by the caller and handed back on every call; the helper diffs the
/// new map against it. Keys keep insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassListState {
    active: Vec<String>,
}

impl ClassListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the state from the object a previous resolver call returned.
    /// Anything that is not an object is an empty state.
    pub fn from_value(value: &Value) -> Self {
        let active = value
            .as_props()
            .map(|props| props.keys().map(str::to_string).collect())
            .unwrap_or_default();
        Self { active }
    }

    /// The state as an object mapping each active key to `true`.
    pub fn to_value(&self) -> Value {
        let mut props = Props::new();
        for key in &self.active {
            props.insert(key, true);
        }
        Value::from(props)
    }

    pub fn keys(&self) -> &[String] {
        &self.active
    }

    pub fn contains(&self, key: &str) -> bool {
        self.active.iter().any(|k| k == key)
    }
}

fn is_ignored_class_key(key: &str) -> bool {
    key.is_empty() || key == "undefined"
}

/// Toggle every whitespace-separated token of `key`.
fn toggle_class_key(doc: &mut Document, node: NodeId, key: &str, on: bool) -> Result<(), DomError> {
    for token in key.split_whitespace() {
        doc.class_list_toggle(node, token, Some(on))?;
    }
    Ok(())
}

impl Runtime {
    /// Inline style: a string replaces the whole declaration list, an object
    /// sets each declaration (nullish entries remove theirs). Other values are
    /// ignored.
    pub fn style(&self, doc: &mut Document, node: NodeId, value: &Value) -> Result<(), DomError> {
        if !value.truthy() {
            return Ok(());
        }
        match value {
            Value::Str(text) => doc.set_css_text(node, text),
            Value::Object(props) => {
                let props = Rc::clone(props);
                for key in props.keys() {
                    match props.get(doc, key) {
                        v if v.is_nullish() => doc.remove_style_property(node, key)?,
                        v => doc.set_style_property(node, key, &v.to_js_string())?,
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Diff a class map against `state`: keys that went falsy or disappeared
    /// are removed, newly truthy keys are added. Keys may hold several
    /// space-separated classes. Non-object values count as an empty map.
    pub fn class_list(
        &self,
        doc: &mut Document,
        node: NodeId,
        value: &Value,
        state: &mut ClassListState,
    ) -> Result<(), DomError> {
        let empty = Props::new();
        let map = value.as_props().unwrap_or(&empty);

        let previous = std::mem::take(&mut state.active);
        for key in previous {
            if is_ignored_class_key(&key) || map.get(doc, &key).truthy() {
                state.active.push(key);
                continue;
            }
            toggle_class_key(doc, node, &key, false)?;
        }
        for key in map.keys() {
            if is_ignored_class_key(key) || state.contains(key) || !map.get(doc, key).truthy() {
                continue;
            }
            toggle_class_key(doc, node, key, true)?;
            state.active.push(key.to_string());
        }
        Ok(())
    }

    /// Merge property sources left to right into a new object. Producers are
    /// called once; getters are copied as getters; later keys win.
    pub fn merge_props(&self, doc: &mut Document, sources: &[Value]) -> Props {
        let mut target = Props::new();
        for source in sources {
            let source = match source {
                Value::Lazy(producer) => producer.call(doc),
                other => other.clone(),
            };
            if let Value::Object(props) = source {
                for (key, entry) in props.entries() {
                    target.define(key, entry.clone());
                }
            }
        }
        target
    }

    /// Apply a whole props object: children (unless skipped), then `ref`,
    /// then every other key through the resolver with refs skipped.
    pub fn spread(
        &self,
        doc: &mut Document,
        node: NodeId,
        props: &Props,
        is_svg: bool,
        skip_children: bool,
    ) -> Result<Props, DomError> {
        if !skip_children && props.contains("children") {
            let children = props.get(doc, "children");
            self.insert_value(doc, node, children, Marker::Whole)?;
        }
        if let Value::Callback(cb) = props.get(doc, "ref") {
            cb.call(doc, node);
        }
        let mut prev = Props::new();
        self.assign(doc, node, props, is_svg, true, &mut prev, true)?;
        Ok(prev)
    }

    /// Apply every key of `props` through the resolver, recording the
    /// returned previous values in `prev`. Keys recorded in `prev` but absent
    /// from `props` are reset to `undefined` and dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn assign(
        &self,
        doc: &mut Document,
        node: NodeId,
        props: &Props,
        is_svg: bool,
        skip_children: bool,
        prev: &mut Props,
        skip_ref: bool,
    ) -> Result<(), DomError> {
        let stale: Vec<String> = prev
            .keys()
            .filter(|key| !props.contains(key))
            .map(str::to_string)
            .collect();
        for key in stale {
            let old = prev.peek(&key).cloned().unwrap_or_default();
            self.assign_prop(doc, node, &key, Value::Undefined, &old, is_svg, skip_ref)?;
            prev.remove(&key);
        }

        for key in props.keys() {
            if key == "children" {
                if !skip_children {
                    let children = props.get(doc, key);
                    self.insert_value(doc, node, children, Marker::Whole)?;
                }
                continue;
            }
            let value = props.get(doc, key);
            let old = prev.peek(key).cloned().unwrap_or_default();
            let next = self.assign_prop(doc, node, key, value, &old, is_svg, skip_ref)?;
            prev.define(key, PropEntry::Value(next));
        }
        Ok(())
    }
}
