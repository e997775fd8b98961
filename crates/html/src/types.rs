use core_types::Namespace;
use std::collections::HashMap;
use std::sync::Arc;

/// Interned tag or attribute name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AtomId(pub u32);

/// Case-preserving name interner shared by one token stream.
///
/// Names are stored exactly as written; case folding is the fragment builder's
/// job because it depends on the namespace the element ends up in.
#[derive(Debug, Default)]
pub struct AtomTable {
    atoms: Vec<Arc<str>>,
    map: HashMap<Arc<str>, AtomId>,
}

impl AtomTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> AtomId {
        if let Some(id) = self.map.get(name) {
            return *id;
        }
        let id = AtomId(self.atoms.len() as u32);
        let atom: Arc<str> = Arc::from(name);
        self.atoms.push(Arc::clone(&atom));
        self.map.insert(atom, id);
        id
    }

    /// Resolve an id produced by this table.
    ///
    /// Panics on ids from another table; token streams never mix tables.
    pub fn resolve(&self, id: AtomId) -> &str {
        &self.atoms[id.0 as usize]
    }

    pub fn resolve_arc(&self, id: AtomId) -> Arc<str> {
        Arc::clone(&self.atoms[id.0 as usize])
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Token {
    StartTag {
        name: AtomId,
        attributes: Vec<(AtomId, Option<String>)>,
        self_closing: bool,
    },
    EndTag(AtomId),
    Comment(String),
    Text(String),
}

#[derive(Debug)]
pub struct TokenStream {
    tokens: Vec<Token>,
    atoms: AtomTable,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>, atoms: AtomTable) -> Self {
        Self { tokens, atoms }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }
}

/// Inert parsed markup. Nothing here is attached to a live document; the host
/// tree imports these nodes when a template is instantiated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Fragment {
        children: Vec<Node>,
    },
    Element {
        name: Arc<str>,
        namespace: Namespace,
        attributes: Vec<(Arc<str>, String)>,
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

impl Node {
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Fragment { children } | Node::Element { children, .. } => children,
            Node::Text { .. } | Node::Comment { .. } => &[],
        }
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children().first()
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.as_ref() == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// True if this subtree contains an element whose tag name has a hyphen.
    pub fn contains_custom_element(&self) -> bool {
        match self {
            Node::Element { name, children, .. } => {
                name.contains('-') || children.iter().any(Node::contains_custom_element)
            }
            Node::Fragment { children } => children.iter().any(Node::contains_custom_element),
            Node::Text { .. } | Node::Comment { .. } => false,
        }
    }
}
