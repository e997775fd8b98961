//! Runtime for compiled templates.
//!
//! Compiled code instantiates templates, then calls into this crate to patch
//! dynamic child regions ([`Runtime::insert`]) and to apply properties,
//! attributes and listeners to host elements ([`Runtime::assign_prop`] and the
//! helpers built on it). The runtime keeps no per-node state of its own:
//! region runs and class-list state belong to the caller.

mod component;
mod config;
pub mod dispatch;
mod events;
mod helpers;
mod insert;
mod normalize;
mod props;
mod template;

pub use crate::component::{ClassComponent, Component};
pub use crate::config::RuntimeConfig;
pub use crate::helpers::ClassListState;
pub use crate::insert::{Marker, Region};
pub use crate::normalize::Normalized;
pub use crate::props::{class_name, set_attribute, set_attribute_ns};
pub use crate::template::Template;

use host::DocumentId;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct Runtime {
    config: RuntimeConfig,
    delegated: RefCell<HashMap<DocumentId, events::Delegation>>,
}

impl Runtime {
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            config,
            delegated: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("delegated_documents", &self.delegated.borrow().len())
            .finish()
    }
}
