//! Template markup parsing.
//!
//! Compiled templates are plain markup strings. They are tokenized once,
//! built into an inert [`Node`] fragment, and imported into a live host
//! document by the template instantiator.

mod entities;
mod fragment;
mod tokenizer;
mod types;

pub use crate::entities::decode_entities;
pub use crate::fragment::{build_fragment, parse_fragment};
pub use crate::tokenizer::tokenize;
pub use crate::types::{AtomId, AtomTable, Node, Token, TokenStream};
