//! Arena-backed host tree.
//!
//! Invariants:
//! - `NodeId`s index `nodes` and are never reused; removal only detaches.
//! - A node has at most one parent, and `children` lists agree with `parent`.
//! - Only document and element nodes have children.
//! - Element names and attribute names are ASCII-lowercased for HTML-namespace
//!   elements, matching how markup parsing stores them.

use crate::event::{Event, Phase};
use crate::style;
use crate::value::{Handler, Value};
use core_types::{DocumentId, Namespace, NodeId};
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomError {
    UnknownNode(NodeId),
    WrongNodeKind(NodeId),
    InvalidParent(NodeId),
    InvalidSibling { parent: NodeId, before: NodeId },
    NotAChild { parent: NodeId, child: NodeId },
    CycleDetected { parent: NodeId, child: NodeId },
    FragmentImport,
    EmptyFragment,
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::UnknownNode(id) => write!(f, "unknown node {}", id.0),
            DomError::WrongNodeKind(id) => write!(f, "node {} has the wrong kind for this operation", id.0),
            DomError::InvalidParent(id) => write!(f, "node {} cannot have children", id.0),
            DomError::InvalidSibling { parent, before } => {
                write!(f, "reference node {} is not a child of {}", before.0, parent.0)
            }
            DomError::NotAChild { parent, child } => {
                write!(f, "node {} is not a child of {}", child.0, parent.0)
            }
            DomError::CycleDetected { parent, child } => {
                write!(f, "inserting {} into {} would create a cycle", child.0, parent.0)
            }
            DomError::FragmentImport => f.write_str("a fragment root cannot be imported as one node"),
            DomError::EmptyFragment => f.write_str("markup produced no root node"),
        }
    }
}

impl std::error::Error for DomError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub namespace: Option<Rc<str>>,
    pub name: Rc<str>,
    pub value: String,
}

impl Attr {
    /// Name without its `prefix:` part.
    pub fn local_name(&self) -> &str {
        self.name.split_once(':').map_or(self.name.as_ref(), |(_, local)| local)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeType {
    Document,
    Element,
    Text,
    Comment,
}

struct ElementData {
    name: Rc<str>,
    namespace: Namespace,
    attributes: Vec<Attr>,
    properties: Vec<(Rc<str>, Value)>,
    style: Vec<(String, String)>,
}

enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    Comment(String),
}

struct Listener {
    kind: Rc<str>,
    handler: Handler,
    capture: bool,
}

struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<Listener>,
}

impl NodeRecord {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }

    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document | NodeKind::Element(_))
    }
}

pub struct Document {
    id: DocumentId,
    nodes: Vec<NodeRecord>,
}

const ROOT: NodeId = NodeId(0);

impl Document {
    pub fn new() -> Self {
        static NEXT_ID: AtomicU32 = AtomicU32::new(1);
        Self {
            id: DocumentId(NEXT_ID.fetch_add(1, Ordering::Relaxed)),
            nodes: vec![NodeRecord::new(NodeKind::Document)],
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The document node. Events bubble up to it.
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Records are never freed, so the arena grows with every node created,
    /// including text nodes that a later patch detaches.
    fn push(&mut self, kind: NodeKind) -> NodeId {
        let Ok(index) = u32::try_from(self.nodes.len()) else {
            panic!("node arena exhausted at {} records", self.nodes.len());
        };
        self.nodes.push(NodeRecord::new(kind));
        log::trace!(target: "host::document", "created node {index}");
        NodeId(index)
    }

    fn record(&self, id: NodeId) -> Result<&NodeRecord, DomError> {
        self.nodes
            .get(id.0 as usize)
            .ok_or(DomError::UnknownNode(id))
    }

    fn record_mut(&mut self, id: NodeId) -> Result<&mut NodeRecord, DomError> {
        self.nodes
            .get_mut(id.0 as usize)
            .ok_or(DomError::UnknownNode(id))
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        match &self.record(id)?.kind {
            NodeKind::Element(el) => Ok(el),
            _ => Err(DomError::WrongNodeKind(id)),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match &mut self.record_mut(id)?.kind {
            NodeKind::Element(el) => Ok(el),
            _ => Err(DomError::WrongNodeKind(id)),
        }
    }

    // --- creation ---------------------------------------------------------

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create_element_ns(Namespace::Html, name)
    }

    pub fn create_element_ns(&mut self, namespace: Namespace, name: &str) -> NodeId {
        let name: Rc<str> = match namespace {
            Namespace::Html => Rc::from(name.to_ascii_lowercase()),
            Namespace::Svg | Namespace::MathMl => Rc::from(name),
        };
        self.push(NodeKind::Element(ElementData {
            name,
            namespace,
            attributes: Vec::new(),
            properties: Vec::new(),
            style: Vec::new(),
        }))
    }

    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Comment(text.to_string()))
    }

    /// Create detached live nodes from an inert parsed subtree.
    pub fn import_node(&mut self, source: &html::Node) -> Result<NodeId, DomError> {
        let root = self.import_shallow(source)?;
        let mut stack = vec![(source, root)];
        while let Some((src, dst)) = stack.pop() {
            for child in src.children() {
                let id = self.import_shallow(child)?;
                self.attach(dst, id, None)?;
                stack.push((child, id));
            }
        }
        Ok(root)
    }

    fn import_shallow(&mut self, source: &html::Node) -> Result<NodeId, DomError> {
        let kind = match source {
            html::Node::Fragment { .. } => return Err(DomError::FragmentImport),
            html::Node::Element {
                name,
                namespace,
                attributes,
                ..
            } => {
                let attributes: Vec<Attr> = attributes
                    .iter()
                    .map(|(k, v)| Attr {
                        namespace: None,
                        name: Rc::from(k.as_ref()),
                        value: v.clone(),
                    })
                    .collect();
                let style = attributes
                    .iter()
                    .find(|a| a.name.as_ref() == "style")
                    .map(|a| style::parse_declarations(&a.value))
                    .unwrap_or_default();
                NodeKind::Element(ElementData {
                    name: Rc::from(name.as_ref()),
                    namespace: *namespace,
                    attributes,
                    properties: Vec::new(),
                    style,
                })
            }
            html::Node::Text { text } => NodeKind::Text(text.clone()),
            html::Node::Comment { text } => NodeKind::Comment(text.clone()),
        };
        Ok(self.push(kind))
    }

    /// Copy a node (and with `deep`, its subtree). Attributes and inline
    /// style are copied; properties and listeners are not.
    pub fn clone_node(&mut self, id: NodeId, deep: bool) -> Result<NodeId, DomError> {
        let copy = self.clone_shallow(id)?;
        if !deep {
            return Ok(copy);
        }
        let mut stack = vec![(id, copy)];
        while let Some((src, dst)) = stack.pop() {
            let children = self.record(src)?.children.clone();
            for child in children {
                let child_copy = self.clone_shallow(child)?;
                self.attach(dst, child_copy, None)?;
                stack.push((child, child_copy));
            }
        }
        Ok(copy)
    }

    fn clone_shallow(&mut self, id: NodeId) -> Result<NodeId, DomError> {
        let kind = match &self.record(id)?.kind {
            NodeKind::Document => return Err(DomError::WrongNodeKind(id)),
            NodeKind::Element(el) => NodeKind::Element(ElementData {
                name: Rc::clone(&el.name),
                namespace: el.namespace,
                attributes: el.attributes.clone(),
                properties: Vec::new(),
                style: el.style.clone(),
            }),
            NodeKind::Text(text) => NodeKind::Text(text.clone()),
            NodeKind::Comment(text) => NodeKind::Comment(text.clone()),
        };
        Ok(self.push(kind))
    }

    // --- node info --------------------------------------------------------

    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.record(id).ok().map(|r| match r.kind {
            NodeKind::Document => NodeType::Document,
            NodeKind::Element(_) => NodeType::Element,
            NodeKind::Text(_) => NodeType::Text,
            NodeKind::Comment(_) => NodeType::Comment,
        })
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_ok()
    }

    /// Local tag name as stored (lowercase for HTML elements).
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).ok().map(|el| el.name.as_ref())
    }

    pub fn namespace(&self, id: NodeId) -> Option<Namespace> {
        self.element(id).ok().map(|el| el.namespace)
    }

    /// Tag names with a hyphen are custom elements.
    pub fn is_custom_element(&self, id: NodeId) -> bool {
        self.tag_name(id).is_some_and(|name| name.contains('-'))
    }

    /// Character data of a text or comment node.
    pub fn data(&self, id: NodeId) -> Option<&str> {
        match &self.record(id).ok()?.kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => Some(text),
            _ => None,
        }
    }

    pub fn set_data(&mut self, id: NodeId, data: &str) -> Result<(), DomError> {
        match &mut self.record_mut(id)?.kind {
            NodeKind::Text(text) | NodeKind::Comment(text) => {
                text.clear();
                text.push_str(data);
                Ok(())
            }
            _ => Err(DomError::WrongNodeKind(id)),
        }
    }

    // --- tree -------------------------------------------------------------

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.record(id).ok()?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.record(id) {
            Ok(record) => &record.children,
            Err(_) => &[],
        }
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|c| *c == id)?;
        siblings.get(pos + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let pos = siblings.iter().position(|c| *c == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    /// Inclusive ancestor check.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `before` (or at the end for `None`), detaching it
    /// from wherever it currently is.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<(), DomError> {
        let before = match self.check_insert(parent, child, before) {
            Ok(before) => before,
            Err(err) => {
                log::debug!(target: "host::document", "rejected insert of {child:?} into {parent:?}: {err}");
                return Err(err);
            }
        };
        self.detach(child)?;
        self.attach(parent, child, before)
    }

    /// Validate an insertion and resolve the reference node it lands before.
    fn check_insert(
        &self,
        parent: NodeId,
        child: NodeId,
        before: Option<NodeId>,
    ) -> Result<Option<NodeId>, DomError> {
        if !self.record(parent)?.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        if matches!(self.record(child)?.kind, NodeKind::Document) {
            return Err(DomError::WrongNodeKind(child));
        }
        if self.contains(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        match before {
            Some(reference) if self.parent(reference) != Some(parent) => Err(DomError::InvalidSibling {
                parent,
                before: reference,
            }),
            Some(reference) if reference == child => Ok(self.next_sibling(child)),
            other => Ok(other),
        }
    }

    fn attach(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) -> Result<(), DomError> {
        let siblings = &mut self.record_mut(parent)?.children;
        let pos = match before {
            Some(reference) => siblings
                .iter()
                .position(|c| *c == reference)
                .ok_or(DomError::InvalidSibling {
                    parent,
                    before: reference,
                })?,
            None => siblings.len(),
        };
        siblings.insert(pos, child);
        self.record_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        if let Some(parent) = self.record_mut(id)?.parent.take() {
            self.record_mut(parent)?.children.retain(|c| *c != id);
        }
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child)
    }

    /// Detach a node from its parent; a no-op for detached nodes.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DomError> {
        self.detach(id)
    }

    // --- text -------------------------------------------------------------

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let Ok(record) = self.record(id) else {
            return out;
        };
        if let NodeKind::Text(text) | NodeKind::Comment(text) = &record.kind {
            out.push_str(text);
            return out;
        }
        let mut stack: Vec<NodeId> = record.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            let Ok(r) = self.record(current) else { continue };
            match &r.kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element(_) => stack.extend(r.children.iter().rev().copied()),
                _ => {}
            }
        }
        out
    }

    /// Replace all children with a single text node (none for the empty string),
    /// or overwrite the data of a character node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        if !self.record(id)?.allows_children() {
            return self.set_data(id, text);
        }
        self.clear_children(id)?;
        if !text.is_empty() {
            let node = self.create_text_node(text);
            self.attach(id, node, None)?;
        }
        Ok(())
    }

    pub fn clear_children(&mut self, id: NodeId) -> Result<(), DomError> {
        let children = std::mem::take(&mut self.record_mut(id)?.children);
        for child in children {
            self.record_mut(child)?.parent = None;
        }
        Ok(())
    }

    /// Parse `markup` and replace the children of `id` with the result.
    pub fn set_inner_html(&mut self, id: NodeId, markup: &str) -> Result<(), DomError> {
        if !self.record(id)?.allows_children() {
            return Err(DomError::InvalidParent(id));
        }
        let fragment = html::parse_fragment(markup);
        self.clear_children(id)?;
        for child in fragment.children() {
            let node = self.import_node(child)?;
            self.attach(id, node, None)?;
        }
        Ok(())
    }

    // --- attributes -------------------------------------------------------

    fn attr_key<'a>(el: &ElementData, name: &'a str) -> Cow<'a, str> {
        if el.namespace == Namespace::Html && name.bytes().any(|b| b.is_ascii_uppercase()) {
            Cow::Owned(name.to_ascii_lowercase())
        } else {
            Cow::Borrowed(name)
        }
    }

    pub fn attributes(&self, id: NodeId) -> &[Attr] {
        match self.element(id) {
            Ok(el) => &el.attributes,
            Err(_) => &[],
        }
    }

    /// `getAttribute`: matches the qualified name regardless of namespace.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let el = self.element(id).ok()?;
        let key = Self::attr_key(el, name);
        el.attributes
            .iter()
            .find(|a| a.name.as_ref() == key)
            .map(|a| a.value.as_str())
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        let key = Self::attr_key(el, name);
        match el.attributes.iter_mut().find(|a| a.name.as_ref() == key) {
            Some(attr) => {
                attr.value.clear();
                attr.value.push_str(value);
            }
            None => el.attributes.push(Attr {
                namespace: None,
                name: Rc::from(key.as_ref()),
                value: value.to_string(),
            }),
        }
        if key == "style" {
            el.style = style::parse_declarations(value);
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        let key = Self::attr_key(el, name);
        el.attributes.retain(|a| a.name.as_ref() != key);
        if key == "style" {
            el.style.clear();
        }
        Ok(())
    }

    pub fn attribute_ns(&self, id: NodeId, namespace: &str, local_name: &str) -> Option<&str> {
        self.element(id)
            .ok()?
            .attributes
            .iter()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.local_name() == local_name)
            .map(|a| a.value.as_str())
    }

    /// `setAttributeNS` with a qualified (`prefix:local`) name.
    pub fn set_attribute_ns(
        &mut self,
        id: NodeId,
        namespace: &str,
        qualified_name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        let local = qualified_name
            .split_once(':')
            .map_or(qualified_name, |(_, l)| l);
        match el
            .attributes
            .iter_mut()
            .find(|a| a.namespace.as_deref() == Some(namespace) && a.local_name() == local)
        {
            Some(attr) => {
                attr.name = Rc::from(qualified_name);
                attr.value.clear();
                attr.value.push_str(value);
            }
            None => el.attributes.push(Attr {
                namespace: Some(Rc::from(namespace)),
                name: Rc::from(qualified_name),
                value: value.to_string(),
            }),
        }
        Ok(())
    }

    pub fn remove_attribute_ns(&mut self, id: NodeId, namespace: &str, local_name: &str) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        el.attributes
            .retain(|a| !(a.namespace.as_deref() == Some(namespace) && a.local_name() == local_name));
        Ok(())
    }

    // --- properties -------------------------------------------------------

    /// Read a property. Reflected properties read through to attributes or
    /// content; anything never written reads as `Undefined`.
    pub fn property(&self, id: NodeId, name: &str) -> Value {
        let reflected = |attr: &str| Value::from(self.attribute(id, attr).unwrap_or(""));
        match name {
            "textContent" | "innerText" => return Value::from(self.text_content(id)),
            "nodeName" => {
                return match self.record(id).map(|r| &r.kind) {
                    Ok(NodeKind::Element(el)) if el.namespace == Namespace::Html => {
                        Value::from(el.name.to_ascii_uppercase())
                    }
                    Ok(NodeKind::Element(el)) => Value::from(el.name.as_ref()),
                    Ok(NodeKind::Text(_)) => Value::from("#text"),
                    Ok(NodeKind::Comment(_)) => Value::from("#comment"),
                    Ok(NodeKind::Document) => Value::from("#document"),
                    Err(_) => Value::Undefined,
                };
            }
            _ => {}
        }
        let Ok(el) = self.element(id) else {
            return Value::Undefined;
        };
        match name {
            "className" => reflected("class"),
            "id" => reflected("id"),
            "htmlFor" => reflected("for"),
            "innerHTML" => Value::from(crate::serialize::inner_html(self, id)),
            _ => el
                .properties
                .iter()
                .find(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.clone())
                .unwrap_or_default(),
        }
    }

    /// Assign a property the way a host element would, `null` and `undefined`
    /// included. Reflected properties write through.
    pub fn set_property(&mut self, id: NodeId, name: &str, value: Value) -> Result<(), DomError> {
        let text = |v: &Value| if v.is_nullish() { String::new() } else { v.to_js_string() };
        match name {
            "textContent" | "innerText" => return self.set_text_content(id, &text(&value)),
            "innerHTML" => return self.set_inner_html(id, &text(&value)),
            "className" => return self.set_attribute(id, "class", &value.to_js_string()),
            "id" => return self.set_attribute(id, "id", &value.to_js_string()),
            "htmlFor" => return self.set_attribute(id, "for", &value.to_js_string()),
            _ => {}
        }
        let el = self.element_mut(id)?;
        match el.properties.iter_mut().find(|(k, _)| k.as_ref() == name) {
            Some((_, slot)) => *slot = value,
            None => el.properties.push((Rc::from(name), value)),
        }
        Ok(())
    }

    // --- class list -------------------------------------------------------

    pub fn class_list(&self, id: NodeId) -> Vec<&str> {
        let mut tokens: Vec<&str> = Vec::new();
        for token in self.attribute(id, "class").unwrap_or("").split_ascii_whitespace() {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens
    }

    pub fn class_list_contains(&self, id: NodeId, token: &str) -> bool {
        self.class_list(id).contains(&token)
    }

    /// `classList.toggle`. Returns whether the token is present afterwards.
    /// Empty or whitespace-bearing tokens are ignored.
    pub fn class_list_toggle(&mut self, id: NodeId, token: &str, force: Option<bool>) -> Result<bool, DomError> {
        self.element(id)?;
        if token.is_empty() || token.bytes().any(|b| b.is_ascii_whitespace()) {
            return Ok(false);
        }
        let present = self.class_list_contains(id, token);
        let want = force.unwrap_or(!present);
        if want == present {
            return Ok(present);
        }
        let mut tokens: Vec<String> = self.class_list(id).into_iter().map(str::to_string).collect();
        if want {
            tokens.push(token.to_string());
        } else {
            tokens.retain(|t| t != token);
        }
        self.set_attribute(id, "class", &tokens.join(" "))?;
        Ok(want)
    }

    // --- inline style -----------------------------------------------------

    pub fn style_property(&self, id: NodeId, name: &str) -> Option<&str> {
        let name = style::normalize_name(name);
        self.element(id)
            .ok()?
            .style
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// `style.setProperty`; an empty value removes the declaration.
    pub fn set_style_property(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = style::normalize_name(name);
        let el = self.element_mut(id)?;
        if value.is_empty() {
            el.style.retain(|(n, _)| *n != name);
        } else {
            style::set_declaration(&mut el.style, &name, value);
        }
        self.sync_style_attribute(id)
    }

    pub fn remove_style_property(&mut self, id: NodeId, name: &str) -> Result<(), DomError> {
        self.set_style_property(id, name, "")
    }

    pub fn css_text(&self, id: NodeId) -> String {
        self.element(id)
            .map(|el| style::serialize_declarations(&el.style))
            .unwrap_or_default()
    }

    pub fn set_css_text(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        self.element_mut(id)?.style = style::parse_declarations(text);
        self.sync_style_attribute(id)
    }

    fn sync_style_attribute(&mut self, id: NodeId) -> Result<(), DomError> {
        let el = self.element_mut(id)?;
        let text = style::serialize_declarations(&el.style);
        match el.attributes.iter_mut().find(|a| a.name.as_ref() == "style") {
            Some(attr) => attr.value = text,
            None => el.attributes.push(Attr {
                namespace: None,
                name: Rc::from("style"),
                value: text,
            }),
        }
        Ok(())
    }

    // --- events -----------------------------------------------------------

    /// Registering the same (kind, handler, capture) twice is a no-op.
    pub fn add_event_listener(
        &mut self,
        id: NodeId,
        kind: &str,
        handler: Handler,
        capture: bool,
    ) -> Result<(), DomError> {
        let record = self.record_mut(id)?;
        let exists = record
            .listeners
            .iter()
            .any(|l| l.kind.as_ref() == kind && l.capture == capture && l.handler.ptr_eq(&handler));
        if !exists {
            record.listeners.push(Listener {
                kind: Rc::from(kind),
                handler,
                capture,
            });
        }
        Ok(())
    }

    pub fn remove_event_listener(
        &mut self,
        id: NodeId,
        kind: &str,
        handler: &Handler,
        capture: bool,
    ) -> Result<(), DomError> {
        self.record_mut(id)?
            .listeners
            .retain(|l| !(l.kind.as_ref() == kind && l.capture == capture && l.handler.ptr_eq(handler)));
        Ok(())
    }

    pub fn listener_count(&self, id: NodeId, kind: &str) -> usize {
        self.record(id)
            .map(|r| r.listeners.iter().filter(|l| l.kind.as_ref() == kind).count())
            .unwrap_or(0)
    }

    pub fn has_event_listener(&self, id: NodeId, kind: &str, handler: &Handler, capture: bool) -> bool {
        self.record(id).is_ok_and(|r| {
            r.listeners
                .iter()
                .any(|l| l.kind.as_ref() == kind && l.capture == capture && l.handler.ptr_eq(handler))
        })
    }

    /// Dispatch a fresh bubbling event of `kind` at `target`.
    pub fn dispatch(&mut self, target: NodeId, kind: &str) -> Result<Event, DomError> {
        self.dispatch_event(target, Event::new(kind))
    }

    /// Capture from the root down, then the target (capturing listeners
    /// first), then bubble back up when the event bubbles.
    pub fn dispatch_event(&mut self, target: NodeId, event: Event) -> Result<Event, DomError> {
        self.record(target)?;
        event.begin(target);
        let mut path = Vec::new();
        let mut current = self.parent(target);
        while let Some(id) = current {
            path.push(id);
            current = self.parent(id);
        }

        for &node in path.iter().rev() {
            if event.propagation_stopped() {
                break;
            }
            self.invoke(node, &event, Phase::Capturing, Some(true));
        }
        if !event.propagation_stopped() {
            self.invoke(target, &event, Phase::AtTarget, Some(true));
            self.invoke(target, &event, Phase::AtTarget, Some(false));
        }
        if event.bubbles() {
            for &node in &path {
                if event.propagation_stopped() {
                    break;
                }
                self.invoke(node, &event, Phase::Bubbling, Some(false));
            }
        }
        event.finish();
        Ok(event)
    }

    fn invoke(&mut self, node: NodeId, event: &Event, phase: Phase, capture: Option<bool>) {
        let handlers: Vec<Handler> = match self.record(node) {
            Ok(r) => r
                .listeners
                .iter()
                .filter(|l| l.kind.as_ref() == event.kind() && capture.is_none_or(|c| c == l.capture))
                .map(|l| l.handler.clone())
                .collect(),
            Err(_) => return,
        };
        if handlers.is_empty() {
            return;
        }
        event.enter(node, phase);
        for handler in handlers {
            handler.call(self, event);
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("id", &self.id)
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn div_with_children(doc: &mut Document, n: usize) -> (NodeId, Vec<NodeId>) {
        let parent = doc.create_element("div");
        let kids = (0..n)
            .map(|i| {
                let t = doc.create_text_node(&i.to_string());
                doc.append_child(parent, t).expect("append");
                t
            })
            .collect();
        (parent, kids)
    }

    #[test]
    fn insert_before_moves_node_between_parents() {
        let mut doc = Document::new();
        let (a, kids) = div_with_children(&mut doc, 2);
        let b = doc.create_element("div");
        doc.append_child(b, kids[0]).expect("move");
        assert_eq!(doc.children(a), [kids[1]]);
        assert_eq!(doc.children(b), [kids[0]]);
        assert_eq!(doc.parent(kids[0]), Some(b));
    }

    #[test]
    fn insert_before_reference_positions_node() {
        let mut doc = Document::new();
        let (a, kids) = div_with_children(&mut doc, 2);
        let t = doc.create_text_node("x");
        doc.insert_before(a, t, Some(kids[1])).expect("insert");
        assert_eq!(doc.text_content(a), "0x1");
        doc.insert_before(a, t, Some(t)).expect("self reference");
        assert_eq!(doc.text_content(a), "0x1");
    }

    #[test]
    fn removed_nodes_keep_their_ids() {
        let mut doc = Document::new();
        let (a, kids) = div_with_children(&mut doc, 1);
        doc.remove_child(a, kids[0]).expect("remove");
        let fresh = doc.create_text_node("y");
        assert!(fresh.0 > kids[0].0);
        assert_eq!(doc.text_content(kids[0]), "0");
        assert_eq!(doc.parent(kids[0]), None);
    }

    #[test]
    fn insert_before_rejects_bad_structure() {
        let mut doc = Document::new();
        let (a, kids) = div_with_children(&mut doc, 1);
        let b = doc.create_element("span");
        doc.append_child(a, b).expect("append");
        assert_eq!(
            doc.append_child(b, a),
            Err(DomError::CycleDetected { parent: b, child: a })
        );
        assert_eq!(doc.append_child(kids[0], b), Err(DomError::InvalidParent(kids[0])));
        let stray = doc.create_text_node("s");
        assert_eq!(
            doc.insert_before(b, stray, Some(kids[0])),
            Err(DomError::InvalidSibling {
                parent: b,
                before: kids[0]
            })
        );
        assert_eq!(doc.append_child(a, NodeId(999)), Err(DomError::UnknownNode(NodeId(999))));
    }

    #[test]
    fn set_text_content_replaces_children() {
        let mut doc = Document::new();
        let (a, kids) = div_with_children(&mut doc, 3);
        doc.set_text_content(a, "hello").expect("set");
        assert_eq!(doc.children(a).len(), 1);
        assert_eq!(doc.parent(kids[0]), None);
        doc.set_text_content(a, "").expect("clear");
        assert!(doc.children(a).is_empty());
    }

    #[test]
    fn attributes_fold_case_for_html_elements_only() {
        let mut doc = Document::new();
        let div = doc.create_element("DIV");
        doc.set_attribute(div, "notProp", "good").expect("set");
        assert_eq!(doc.attribute(div, "notprop"), Some("good"));
        assert_eq!(doc.tag_name(div), Some("div"));

        let svg = doc.create_element_ns(Namespace::Svg, "svg");
        doc.set_attribute(svg, "viewBox", "0 0 1 1").expect("set");
        assert_eq!(doc.attribute(svg, "viewBox"), Some("0 0 1 1"));
        assert_eq!(doc.attribute(svg, "viewbox"), None);
    }

    #[test]
    fn namespaced_attributes_match_by_local_name() {
        let mut doc = Document::new();
        let svg = doc.create_element_ns(Namespace::Svg, "use");
        let ns = core_types::XLINK_NS;
        doc.set_attribute_ns(svg, ns, "xlink:href", "#a").expect("set");
        assert_eq!(doc.attribute_ns(svg, ns, "href"), Some("#a"));
        assert_eq!(doc.attribute(svg, "xlink:href"), Some("#a"));
        doc.remove_attribute_ns(svg, ns, "href").expect("remove");
        assert!(doc.attributes(svg).is_empty());
    }

    #[test]
    fn class_list_toggle_respects_force() {
        let mut doc = Document::new();
        let el = doc.create_element("p");
        assert!(doc.class_list_toggle(el, "a", Some(true)).expect("on"));
        assert!(doc.class_list_toggle(el, "b", None).expect("toggle"));
        assert!(doc.class_list_toggle(el, "a", Some(true)).expect("noop"));
        assert_eq!(doc.attribute(el, "class"), Some("a b"));
        assert!(!doc.class_list_toggle(el, "a", Some(false)).expect("off"));
        assert_eq!(doc.class_list(el), ["b"]);
    }

    #[test]
    fn style_writes_reflect_into_attribute() {
        let mut doc = Document::new();
        let el = doc.create_element("p");
        doc.set_style_property(el, "color", "red").expect("set");
        doc.set_style_property(el, "margin-top", "1px").expect("set");
        assert_eq!(doc.attribute(el, "style"), Some("color: red; margin-top: 1px;"));
        doc.remove_style_property(el, "color").expect("remove");
        assert_eq!(doc.css_text(el), "margin-top: 1px;");
        doc.set_attribute(el, "style", "width: 2px").expect("attr");
        assert_eq!(doc.style_property(el, "width"), Some("2px"));
        assert_eq!(doc.style_property(el, "margin-top"), None);
    }

    #[test]
    fn reflected_properties_write_through() {
        let mut doc = Document::new();
        let el = doc.create_element("label");
        doc.set_property(el, "className", Value::from("a b")).expect("class");
        doc.set_property(el, "htmlFor", Value::from("x")).expect("for");
        doc.set_property(el, "textContent", Value::from(5)).expect("text");
        doc.set_property(el, "value", Value::Null).expect("plain");
        assert_eq!(doc.attribute(el, "class"), Some("a b"));
        assert_eq!(doc.attribute(el, "for"), Some("x"));
        assert_eq!(doc.text_content(el), "5");
        assert!(matches!(doc.property(el, "value"), Value::Null));
        assert!(matches!(doc.property(el, "missing"), Value::Undefined));
        assert_eq!(doc.property(el, "nodeName").as_str(), Some("LABEL"));
    }

    #[test]
    fn clone_copies_structure_but_not_listeners_or_properties() {
        let mut doc = Document::new();
        let markup = html::parse_fragment(r#"<ul class="l"><li>a</li><li>b</li></ul>"#);
        let ul = doc.import_node(markup.first_child().expect("ul")).expect("import");
        doc.set_property(ul, "custom", Value::from(1)).expect("prop");
        doc.add_event_listener(ul, "click", Handler::new(|_, _| {}), false)
            .expect("listen");
        let copy = doc.clone_node(ul, true).expect("clone");
        assert_ne!(copy, ul);
        assert_eq!(crate::serialize::outer_html(&doc, copy), r#"<ul class="l"><li>a</li><li>b</li></ul>"#);
        assert!(matches!(doc.property(copy, "custom"), Value::Undefined));
        assert_eq!(doc.listener_count(copy, "click"), 0);
        assert_eq!(doc.clone_node(doc.root(), false), Err(DomError::WrongNodeKind(doc.root())));
    }

    #[test]
    fn dispatch_runs_capture_target_and_bubble_in_order() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        let root = doc.root();
        doc.append_child(root, outer).expect("append");
        doc.append_child(outer, inner).expect("append");

        let log = Rc::new(RefCell::new(Vec::new()));
        let record = |tag: &'static str| {
            let log = Rc::clone(&log);
            Handler::new(move |_, e| log.borrow_mut().push((tag, e.phase())))
        };
        doc.add_event_listener(outer, "click", record("outer-capture"), true).expect("listen");
        doc.add_event_listener(outer, "click", record("outer-bubble"), false).expect("listen");
        doc.add_event_listener(inner, "click", record("inner"), false).expect("listen");
        doc.add_event_listener(root, "click", record("root"), false).expect("listen");

        doc.dispatch(inner, "click").expect("dispatch");
        assert_eq!(
            *log.borrow(),
            [
                ("outer-capture", Phase::Capturing),
                ("inner", Phase::AtTarget),
                ("outer-bubble", Phase::Bubbling),
                ("root", Phase::Bubbling),
            ]
        );
    }

    #[test]
    fn stop_propagation_halts_bubbling() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        doc.append_child(outer, inner).expect("append");
        let hits = Rc::new(RefCell::new(0));
        let h = Rc::clone(&hits);
        doc.add_event_listener(outer, "click", Handler::new(move |_, _| *h.borrow_mut() += 1), false)
            .expect("listen");
        doc.add_event_listener(inner, "click", Handler::new(|_, e| e.stop_propagation()), false)
            .expect("listen");
        let event = doc.dispatch(inner, "click").expect("dispatch");
        assert!(event.propagation_stopped());
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn listeners_can_mutate_the_document() {
        let mut doc = Document::new();
        let button = doc.create_element("button");
        doc.add_event_listener(
            button,
            "click",
            Handler::new(|doc, e| {
                let target = e.current_target().expect("target");
                let _ = doc.set_text_content(target, "clicked");
            }),
            false,
        )
        .expect("listen");
        doc.dispatch(button, "click").expect("dispatch");
        assert_eq!(doc.text_content(button), "clicked");
    }

    #[test]
    fn duplicate_listener_registration_is_ignored() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        let h = Handler::new(|_, _| {});
        doc.add_event_listener(el, "x", h.clone(), false).expect("add");
        doc.add_event_listener(el, "x", h.clone(), false).expect("add");
        doc.add_event_listener(el, "x", h.clone(), true).expect("add");
        assert_eq!(doc.listener_count(el, "x"), 2);
        doc.remove_event_listener(el, "x", &h, false).expect("remove");
        assert!(!doc.has_event_listener(el, "x", &h, false));
        assert!(doc.has_event_listener(el, "x", &h, true));
    }
}
