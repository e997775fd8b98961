//! Region reconciliation.
//!
//! A region is a slot in a parent's child list. With [`Marker::Whole`] it is
//! every child of the parent; otherwise it is the run of nodes this region
//! last inserted in front of the marker (or at the end). That run is recorded
//! in the region, and only recorded nodes are ever removed.

use crate::Runtime;
use host::{Document, DomError, NodeId, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    /// The region is the parent's entire child list.
    Whole,
    /// Content goes at the end of the parent's children.
    End,
    /// Content goes immediately before this child of the parent.
    Before(NodeId),
}

#[derive(Clone, Debug)]
pub struct Region {
    parent: NodeId,
    marker: Marker,
    current: Vec<NodeId>,
}

impl Region {
    pub fn new(parent: NodeId, marker: Marker) -> Self {
        Self {
            parent,
            marker,
            current: Vec::new(),
        }
    }

    pub fn whole(parent: NodeId) -> Self {
        Self::new(parent, Marker::Whole)
    }

    pub fn at_end(parent: NodeId) -> Self {
        Self::new(parent, Marker::End)
    }

    pub fn before(parent: NodeId, marker: NodeId) -> Self {
        Self::new(parent, Marker::Before(marker))
    }

    pub fn parent(&self) -> NodeId {
        self.parent
    }

    pub fn marker(&self) -> Marker {
        self.marker
    }

    /// Nodes the region currently owns, in document order.
    pub fn nodes(&self) -> &[NodeId] {
        &self.current
    }

    fn reference(&self) -> Option<NodeId> {
        match self.marker {
            Marker::Before(node) => Some(node),
            Marker::Whole | Marker::End => None,
        }
    }
}

impl Runtime {
    /// Reconcile `region` with `value`.
    ///
    /// Every call re-evaluates `value`, so callers can repeat it as data
    /// changes. Values that cannot be rendered (objects, handlers, callbacks)
    /// are logged and leave the region untouched.
    pub fn insert(&self, doc: &mut Document, region: &mut Region, value: Value) -> Result<(), DomError> {
        match &value {
            Value::Str(_) | Value::Number(_) => {
                let text = value.to_js_string();
                if region.marker == Marker::Whole {
                    doc.set_text_content(region.parent, &text)?;
                    region.current = doc.children(region.parent).to_vec();
                } else {
                    let node = doc.create_text_node(&text);
                    self.splice(doc, region, vec![node])?;
                }
            }
            Value::Undefined | Value::Null | Value::Bool(_) => self.clear(doc, region)?,
            Value::Lazy(_) => {
                let resolved = self.unwrap_lazy(doc, value.clone());
                return self.insert(doc, region, resolved);
            }
            Value::Array(items) => {
                let mut normalized = self.normalize(doc, items, false);
                if normalized.dynamic {
                    normalized = self.normalize(doc, &normalized.items, true);
                }
                let nodes: Vec<NodeId> = normalized.nodes().collect();
                if nodes.is_empty() {
                    self.clear(doc, region)?;
                } else {
                    self.splice(doc, region, nodes)?;
                }
            }
            Value::Node(node) => self.splice(doc, region, vec![*node])?,
            Value::Object(_) | Value::Handler(_) | Value::Callback(_) => {
                log::warn!(
                    target: "domx::insert",
                    "unrecognized value {value:?}; skipped inserting into {:?}",
                    region.parent
                );
                return Ok(());
            }
        }
        Ok(())
    }

    /// One-shot insert into a fresh region.
    pub fn insert_value(
        &self,
        doc: &mut Document,
        parent: NodeId,
        value: Value,
        marker: Marker,
    ) -> Result<Region, DomError> {
        let mut region = Region::new(parent, marker);
        self.insert(doc, &mut region, value)?;
        Ok(region)
    }

    fn clear(&self, doc: &mut Document, region: &mut Region) -> Result<(), DomError> {
        if region.marker == Marker::Whole {
            doc.clear_children(region.parent)?;
            region.current.clear();
            return Ok(());
        }
        self.splice(doc, region, Vec::new())
    }

    /// Put `nodes` in the region, in order, and drop whatever the region held
    /// before that is not part of the new content.
    fn splice(&self, doc: &mut Document, region: &mut Region, nodes: Vec<NodeId>) -> Result<(), DomError> {
        let parent = region.parent;
        let stale: Vec<NodeId> = match region.marker {
            Marker::Whole => doc.children(parent).to_vec(),
            Marker::End | Marker::Before(_) => std::mem::take(&mut region.current),
        };
        let reference = region.reference();
        for &node in &nodes {
            doc.insert_before(parent, node, reference)?;
        }
        for node in stale {
            if !nodes.contains(&node) && doc.parent(node) == Some(parent) {
                doc.remove_child(parent, node)?;
            }
        }
        log::trace!(
            target: "domx::insert",
            "region {:?}/{:?} now holds {} node(s)",
            parent,
            region.marker,
            nodes.len()
        );
        region.current = nodes;
        Ok(())
    }
}
