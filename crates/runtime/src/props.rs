//! The property resolver: one key/value pair becomes exactly one kind of
//! host write.

use crate::dispatch;
use crate::helpers::ClassListState;
use crate::Runtime;
use host::{Document, DomError, NodeId, Value};

/// Set an attribute, or remove it for nullish values.
pub fn set_attribute(doc: &mut Document, node: NodeId, name: &str, value: &Value) -> Result<(), DomError> {
    if value.is_nullish() {
        doc.remove_attribute(node, name)
    } else {
        doc.set_attribute(node, name, &value.to_js_string())
    }
}

/// Namespaced form of [`set_attribute`]; `name` is the qualified name.
pub fn set_attribute_ns(
    doc: &mut Document,
    node: NodeId,
    namespace: &str,
    name: &str,
    value: &Value,
) -> Result<(), DomError> {
    if value.is_nullish() {
        let local = name.split_once(':').map_or(name, |(_, local)| local);
        doc.remove_attribute_ns(node, namespace, local)
    } else {
        doc.set_attribute_ns(node, namespace, name, &value.to_js_string())
    }
}

/// Write the class string; nullish removes the attribute.
pub fn class_name(doc: &mut Document, node: NodeId, value: &Value) -> Result<(), DomError> {
    if value.is_nullish() {
        doc.remove_attribute(node, "class")
    } else {
        doc.set_property(node, "className", value.clone())
    }
}

impl Runtime {
    /// Apply `key = value` to `node` and return what the caller should pass
    /// as `prev` next time.
    ///
    /// `prev` is only consulted for listener keys (to remove the stale
    /// listener), for `classList` (membership diff), and to skip writes of
    /// an identical value.
    #[allow(clippy::too_many_arguments)]
    pub fn assign_prop(
        &self,
        doc: &mut Document,
        node: NodeId,
        key: &str,
        value: Value,
        prev: &Value,
        is_svg: bool,
        skip_ref: bool,
    ) -> Result<Value, DomError> {
        if key == "style" {
            self.style(doc, node, &value)?;
            return Ok(Value::Undefined);
        }
        if key == "classList" {
            let mut state = ClassListState::from_value(prev);
            self.class_list(doc, node, &value, &mut state)?;
            return Ok(state.to_value());
        }
        if value.same(prev) {
            return Ok(prev.clone());
        }

        if key == "ref" {
            if !skip_ref {
                match &value {
                    Value::Callback(cb) => cb.call(doc, node),
                    Value::Undefined => {}
                    other => log::warn!(target: "domx::props", "ref is not a callback: {other:?}"),
                }
            }
        } else if let Some(name) = key.strip_prefix("on:") {
            self.replace_listener(doc, node, name, &value, prev, false)?;
        } else if let Some(name) = key.strip_prefix("oncapture:") {
            self.replace_listener(doc, node, name, &value, prev, true)?;
        } else if let Some(event) = key.strip_prefix("on").filter(|rest| !rest.is_empty()) {
            let name = event.to_ascii_lowercase();
            let delegate = self.config().delegate_events && dispatch::is_delegated_event(&name);
            if delegate {
                self.add_event_listener(doc, node, &name, &value, true)?;
                self.delegate_events(doc, &[name.as_str()])?;
            } else if value.truthy() {
                self.add_event_listener(doc, node, &name, &value, false)?;
            }
        } else if let Some(name) = key.strip_prefix("attr:") {
            set_attribute(doc, node, name, &value)?;
        } else {
            self.assign_property_or_attribute(doc, node, key, &value, is_svg)?;
        }
        Ok(value)
    }

    fn replace_listener(
        &self,
        doc: &mut Document,
        node: NodeId,
        name: &str,
        value: &Value,
        prev: &Value,
        capture: bool,
    ) -> Result<(), DomError> {
        if let Value::Handler(old) = prev {
            doc.remove_event_listener(node, name, old, capture)?;
        }
        if let Value::Handler(new) = value {
            doc.add_event_listener(node, name, new.clone(), capture)?;
        }
        Ok(())
    }

    fn assign_property_or_attribute(
        &self,
        doc: &mut Document,
        node: NodeId,
        key: &str,
        value: &Value,
        is_svg: bool,
    ) -> Result<(), DomError> {
        let tag = doc.tag_name(node).unwrap_or("").to_string();
        let forced = key.strip_prefix("prop:");
        let is_child_prop = forced.is_none() && dispatch::is_child_property(key);
        let alias = match (forced, is_child_prop, is_svg) {
            (None, false, false) => dispatch::prop_alias(key, &tag),
            _ => None,
        };
        let is_prop =
            forced.is_some() || (!is_child_prop && !is_svg && alias.is_none() && dispatch::is_property(key));
        let is_custom = !(is_prop || is_child_prop || alias.is_some()) && tag.contains('-');
        let as_property = is_prop || is_child_prop || alias.is_some() || is_custom;
        let prop = forced.unwrap_or(key);

        if as_property {
            log::trace!(target: "domx::props", "{key} -> property on <{tag}>");
            if prop == "class" || prop == "className" {
                return class_name(doc, node, value);
            }
            if is_custom && !is_prop && !is_child_prop {
                return doc.set_property(node, &dispatch::to_property_name(prop), value.clone());
            }
            return doc.set_property(node, alias.unwrap_or(prop), value.clone());
        }

        if is_svg {
            if let Some(namespace) = key.split_once(':').and_then(|(prefix, _)| dispatch::svg_namespace(prefix)) {
                log::trace!(target: "domx::props", "{key} -> namespaced attribute");
                return set_attribute_ns(doc, node, namespace, key, value);
            }
        }
        let name = dispatch::attribute_alias(key).unwrap_or(key);
        log::trace!(target: "domx::props", "{key} -> attribute {name}");
        set_attribute(doc, node, name, value)
    }
}
