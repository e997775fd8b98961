//! In-process host tree the runtime renders into.
//!
//! `Document` is an arena of element, text and comment nodes with the subset
//! of host behavior compiled templates rely on: attributes (namespaced too),
//! properties with reflection, inline style, class tokens, listeners with
//! capture/bubble dispatch, and markup import/serialization.

mod document;
mod event;
mod serialize;
mod style;
mod value;

pub use crate::document::{Attr, Document, DomError, NodeType};
pub use crate::event::{Event, Phase};
pub use crate::serialize::{inner_html, outer_html, outline};
pub use crate::value::{Callback, Handler, Producer, PropEntry, Props, Value, format_number};
pub use core_types::{DocumentId, Namespace, NodeId};
