//! Dynamic values flowing between compiled code, the runtime and the host tree.
//!
//! `Value` mirrors the shapes a template expression can evaluate to. Rc-backed
//! variants compare by identity, primitives by value, the same way `===` does.

use crate::Document;
use crate::event::Event;
use core_types::NodeId;
use std::fmt;
use std::rc::Rc;

type ProducerFn = dyn Fn(&mut Document) -> Value;
type HandlerFn = dyn Fn(&mut Document, &Event);
type CallbackFn = dyn Fn(&mut Document, NodeId);

/// Zero-argument producer of a value. The runtime's only lazy mechanism.
#[derive(Clone)]
pub struct Producer(Rc<ProducerFn>);

impl Producer {
    pub fn new(f: impl Fn(&mut Document) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, doc: &mut Document) -> Value {
        (self.0)(doc)
    }

    pub fn ptr_eq(&self, other: &Producer) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Event listener callback. Identity is the `Rc`, so removing a listener needs
/// a clone of the handler that was added.
#[derive(Clone)]
pub struct Handler(Rc<HandlerFn>);

impl Handler {
    pub fn new(f: impl Fn(&mut Document, &Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, doc: &mut Document, event: &Event) {
        (self.0)(doc, event)
    }

    pub fn ptr_eq(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Per-element callback, used for `ref` props.
#[derive(Clone)]
pub struct Callback(Rc<CallbackFn>);

impl Callback {
    pub fn new(f: impl Fn(&mut Document, NodeId) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, doc: &mut Document, node: NodeId) {
        (self.0)(doc, node)
    }

    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Node(NodeId),
    Array(Rc<[Value]>),
    Object(Rc<Props>),
    Lazy(Producer),
    Handler(Handler),
    Callback(Callback),
}

impl Value {
    pub fn lazy(f: impl Fn(&mut Document) -> Value + 'static) -> Self {
        Value::Lazy(Producer::new(f))
    }

    pub fn handler(f: impl Fn(&mut Document, &Event) + 'static) -> Self {
        Value::Handler(Handler::new(f))
    }

    pub fn callback(f: impl Fn(&mut Document, NodeId) + 'static) -> Self {
        Value::Callback(Callback::new(f))
    }

    pub fn array(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(items.into_iter().collect())
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Lazy(_) | Value::Handler(_) | Value::Callback(_))
    }

    /// Truthiness as JavaScript defines it.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Strict identity (`===`): primitives by value, everything else by reference.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Lazy(a), Value::Lazy(b)) => a.ptr_eq(b),
            (Value::Handler(a), Value::Handler(b)) => a.ptr_eq(b),
            (Value::Callback(a), Value::Callback(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_props(&self) -> Option<&Props> {
        match self {
            Value::Object(props) => Some(props),
            _ => None,
        }
    }

    /// The string conversion `String(value)` performs.
    pub fn to_js_string(&self) -> String {
        self.to_string()
    }
}

/// Number formatting close to `Number.prototype.toString` for the values
/// templates carry: integral values print without a fraction.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        // Shortest round-trip digits; exponent form outside [1e-6, 1e21).
        let scientific = format!("{n:e}");
        match scientific.split_once('e').map(|(m, e)| (m, e.parse::<i32>())) {
            Some((mantissa, Ok(exp))) if !(-7 < exp && exp < 21) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{}", exp.unsigned_abs())
            }
            _ => format!("{n}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Str(s) => f.write_str(s),
            Value::Node(_) => f.write_str("[object Node]"),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i != 0 {
                        f.write_str(",")?;
                    }
                    if !item.is_nullish() {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            Value::Object(_) => f.write_str("[object Object]"),
            Value::Lazy(_) | Value::Handler(_) | Value::Callback(_) => f.write_str("[function]"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::Str(s) => write!(f, "Str({s:?})"),
            Value::Node(id) => write!(f, "Node({})", id.0),
            Value::Array(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Object(props) => fmt::Debug::fmt(props, f),
            Value::Lazy(_) => f.write_str("Lazy(..)"),
            Value::Handler(_) => f.write_str("Handler(..)"),
            Value::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Rc::from(s))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Node(id)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items.into())
    }
}

impl From<Props> for Value {
    fn from(props: Props) -> Self {
        Value::Object(Rc::new(props))
    }
}

impl From<Handler> for Value {
    fn from(handler: Handler) -> Self {
        Value::Handler(handler)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One own property of a [`Props`] map.
#[derive(Clone)]
pub enum PropEntry {
    Value(Value),
    /// Accessor evaluated on every read.
    Getter(Producer),
}

/// Ordered string-keyed property map (insertion order, like object keys).
#[derive(Clone, Default)]
pub struct Props {
    entries: Vec<(Rc<str>, PropEntry)>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style getter definition.
    pub fn with_getter(mut self, key: &str, f: impl Fn(&mut Document) -> Value + 'static) -> Self {
        self.define(key, PropEntry::Getter(Producer::new(f)));
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.define(key, PropEntry::Value(value.into()));
    }

    /// Define or redefine a key, keeping its original position when it exists.
    pub fn define(&mut self, key: &str, entry: PropEntry) {
        match self.entries.iter_mut().find(|(k, _)| k.as_ref() == key) {
            Some((_, slot)) => *slot = entry,
            None => self.entries.push((Rc::from(key), entry)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<PropEntry> {
        let index = self.entries.iter().position(|(k, _)| k.as_ref() == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.as_ref() == key)
    }

    pub fn entry(&self, key: &str) -> Option<&PropEntry> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, e)| e)
    }

    /// Read a key, running its getter when it has one. Missing keys are `Undefined`.
    pub fn get(&self, doc: &mut Document, key: &str) -> Value {
        match self.entry(key) {
            Some(PropEntry::Value(v)) => v.clone(),
            Some(PropEntry::Getter(p)) => p.call(doc),
            None => Value::Undefined,
        }
    }

    /// Read a plain value without running getters.
    pub fn peek(&self, key: &str) -> Option<&Value> {
        match self.entry(key) {
            Some(PropEntry::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_ref())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &PropEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_ref(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (k, e) in &self.entries {
            match e {
                PropEntry::Value(v) => map.entry(k, v),
                PropEntry::Getter(_) => map.entry(k, &format_args!("get ..")),
            };
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_javascript() {
        for falsy in [
            Value::Undefined,
            Value::Null,
            Value::Bool(false),
            Value::Number(0.0),
            Value::Number(f64::NAN),
            Value::from(""),
        ] {
            assert!(!falsy.truthy(), "{falsy:?} should be falsy");
        }
        for truthy in [
            Value::Bool(true),
            Value::Number(-1.0),
            Value::from("0"),
            Value::array([]),
            Value::from(Props::new()),
        ] {
            assert!(truthy.truthy(), "{truthy:?} should be truthy");
        }
    }

    #[test]
    fn same_compares_references_for_shared_values() {
        let a = Value::array([Value::from(1)]);
        let b = Value::array([Value::from(1)]);
        assert!(a.same(&a.clone()));
        assert!(!a.same(&b));
        assert!(Value::from("x").same(&Value::from("x")));
        assert!(!Value::Number(f64::NAN).same(&Value::Number(f64::NAN)));
        assert!(!Value::Null.same(&Value::Undefined));
    }

    #[test]
    fn string_conversion_matches_javascript_shapes() {
        assert_eq!(Value::from(42).to_js_string(), "42");
        assert_eq!(Value::from(1.5).to_js_string(), "1.5");
        assert_eq!(Value::from(-0.0).to_js_string(), "0");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(Value::Bool(true).to_js_string(), "true");
        assert_eq!(
            Value::array([Value::from("a"), Value::Null, Value::from(2)]).to_js_string(),
            "a,,2"
        );
        assert_eq!(Value::from(Props::new()).to_js_string(), "[object Object]");
    }

    #[test]
    fn props_keep_insertion_order_on_redefine() {
        let mut props = Props::new().with("a", 1).with("b", 2);
        props.insert("a", 3);
        assert_eq!(props.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert!(matches!(props.peek("a"), Some(Value::Number(n)) if *n == 3.0));
    }

    #[test]
    fn getters_run_on_every_read() {
        let mut doc = Document::new();
        let props = Props::new().with_getter("n", |doc| {
            let count = doc.children(doc.root()).len();
            Value::from(count as u32)
        });
        assert!(matches!(props.get(&mut doc, "n"), Value::Number(n) if n == 0.0));
        let el = doc.create_element("div");
        let root = doc.root();
        doc.append_child(root, el).expect("append");
        assert!(matches!(props.get(&mut doc, "n"), Value::Number(n) if n == 1.0));
        assert!(props.peek("n").is_none());
    }
}
