//! Static classification data for property keys.
//!
//! Everything here is a pure lookup; the resolver decides what to do with it.

use core_types::{XLINK_NS, XML_NS};

/// Keys written as DOM properties on non-SVG elements.
const PROPERTIES: &[&str] = &[
    "className",
    "value",
    "readOnly",
    "formNoValidate",
    "isMap",
    "noModule",
    "playsInline",
    // boolean attributes exposed as properties
    "allowfullscreen",
    "async",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "default",
    "disabled",
    "formnovalidate",
    "hidden",
    "indeterminate",
    "inert",
    "ismap",
    "loop",
    "multiple",
    "muted",
    "nomodule",
    "novalidate",
    "open",
    "playsinline",
    "readonly",
    "required",
    "reversed",
    "seamless",
    "selected",
];

/// Keys that replace an element's content when assigned.
const CHILD_PROPERTIES: &[&str] = &["innerHTML", "textContent", "innerText", "children"];

/// Property name to attribute name, used on the attribute path.
const ATTRIBUTE_ALIASES: &[(&str, &str)] = &[("className", "class"), ("htmlFor", "for")];

struct PropAlias {
    prop: &'static str,
    property: &'static str,
    /// Uppercase tag names the alias applies to; empty means every tag.
    tags: &'static [&'static str],
}

const PROP_ALIASES: &[PropAlias] = &[
    PropAlias {
        prop: "class",
        property: "className",
        tags: &[],
    },
    PropAlias {
        prop: "formnovalidate",
        property: "formNoValidate",
        tags: &["BUTTON", "INPUT"],
    },
    PropAlias {
        prop: "ismap",
        property: "isMap",
        tags: &["IMG"],
    },
    PropAlias {
        prop: "nomodule",
        property: "noModule",
        tags: &["SCRIPT"],
    },
    PropAlias {
        prop: "playsinline",
        property: "playsInline",
        tags: &["VIDEO"],
    },
    PropAlias {
        prop: "readonly",
        property: "readOnly",
        tags: &["INPUT", "TEXTAREA"],
    },
];

const SVG_NAMESPACES: &[(&str, &str)] = &[("xlink", XLINK_NS), ("xml", XML_NS)];

/// Events the delegating dispatcher handles when delegation is enabled.
const DELEGATED_EVENTS: &[&str] = &[
    "beforeinput",
    "click",
    "dblclick",
    "contextmenu",
    "focusin",
    "focusout",
    "input",
    "keydown",
    "keyup",
    "mousedown",
    "mousemove",
    "mouseout",
    "mouseover",
    "mouseup",
    "pointerdown",
    "pointermove",
    "pointerout",
    "pointerover",
    "pointerup",
    "touchend",
    "touchmove",
    "touchstart",
];

pub fn is_property(key: &str) -> bool {
    PROPERTIES.contains(&key)
}

pub fn is_child_property(key: &str) -> bool {
    CHILD_PROPERTIES.contains(&key)
}

pub fn attribute_alias(key: &str) -> Option<&'static str> {
    ATTRIBUTE_ALIASES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, attr)| *attr)
}

/// Property a key maps to on an element with the given tag name, compared
/// case-insensitively.
pub fn prop_alias(key: &str, tag_name: &str) -> Option<&'static str> {
    let alias = PROP_ALIASES.iter().find(|a| a.prop == key)?;
    if alias.tags.is_empty() || alias.tags.iter().any(|t| t.eq_ignore_ascii_case(tag_name)) {
        Some(alias.property)
    } else {
        None
    }
}

pub fn svg_namespace(prefix: &str) -> Option<&'static str> {
    SVG_NAMESPACES
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, ns)| *ns)
}

pub fn is_delegated_event(name: &str) -> bool {
    DELEGATED_EVENTS.contains(&name)
}

/// `my-prop` to `myProp`, lowercasing first.
pub fn to_property_name(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    let mut out = String::with_capacity(lower.len());
    let mut chars = lower.chars().peekable();
    while let Some(ch) = chars.next() {
        match (ch, chars.peek()) {
            ('-', Some(next)) if next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(ch),
        }
    }
    out
}
