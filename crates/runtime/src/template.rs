//! Template instantiation: parse markup once, produce fresh host nodes per call.

use crate::Runtime;
use host::{Document, DocumentId, DomError, NodeId};
use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// A compiled template. Cheap to clone; clones share the parsed markup.
#[derive(Clone, Debug)]
pub struct Template {
    inner: Rc<TemplateInner>,
}

#[derive(Debug)]
struct TemplateInner {
    markup: Rc<str>,
    is_custom_element: bool,
    is_svg: bool,
    parsed: OnceCell<Option<html::Node>>,
    /// Custom-element templates clone a live prototype per document.
    prototypes: RefCell<HashMap<DocumentId, NodeId>>,
}

impl Template {
    pub fn new(markup: &str, is_custom_element: bool, is_svg: bool) -> Self {
        Self {
            inner: Rc::new(TemplateInner {
                markup: Rc::from(markup),
                is_custom_element,
                is_svg,
                parsed: OnceCell::new(),
                prototypes: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn markup(&self) -> &str {
        &self.inner.markup
    }

    /// The root this template instantiates: the first top-level node, or for
    /// SVG markup (wrapped in an `<svg>` element) the first node inside it.
    fn root(&self) -> Option<&html::Node> {
        self.inner
            .parsed
            .get_or_init(|| {
                log::trace!(target: "domx::template", "parsing template {:?}", self.inner.markup);
                let fragment = html::parse_fragment(&self.inner.markup);
                let first = fragment.first_child();
                let root = if self.inner.is_svg {
                    first.and_then(html::Node::first_child)
                } else {
                    first
                };
                root.cloned()
            })
            .as_ref()
    }

    /// Create a detached copy of the template root in `doc`.
    pub fn instantiate(&self, doc: &mut Document) -> Result<NodeId, DomError> {
        let Some(root) = self.root() else {
            log::error!(target: "domx::template", "template {:?} has no root node", self.inner.markup);
            return Err(DomError::EmptyFragment);
        };
        if !self.inner.is_custom_element {
            return doc.import_node(root);
        }
        let existing = self.inner.prototypes.borrow().get(&doc.id()).copied();
        let prototype = match existing {
            Some(node) => node,
            None => {
                let node = doc.import_node(root)?;
                self.inner.prototypes.borrow_mut().insert(doc.id(), node);
                node
            }
        };
        doc.clone_node(prototype, true)
    }
}

impl Runtime {
    /// Compile `markup` into a [`Template`]. Parsing happens on first use.
    pub fn template(&self, markup: &str, is_custom_element: bool, is_svg: bool) -> Template {
        Template::new(markup, is_custom_element, is_svg)
    }
}
