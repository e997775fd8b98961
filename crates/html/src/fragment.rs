use crate::tokenizer::tokenize;
use crate::types::{Node, Token, TokenStream};
use core_types::Namespace;
use std::sync::Arc;

/// Parse template markup into an inert fragment.
pub fn parse_fragment(markup: &str) -> Node {
    build_fragment(&tokenize(markup))
}

/// Build a fragment tree from tokens.
///
/// Element names and attribute names are ASCII-lowercased for HTML-namespace
/// elements; SVG and MathML content keeps the case it was written in. An end
/// tag closes the nearest open element with the same name and everything
/// opened after it; unmatched end tags are dropped.
pub fn build_fragment(stream: &TokenStream) -> Node {
    let atoms = stream.atoms();
    let mut arena = FragmentArena::new();
    let root = arena.push(ArenaNode::Fragment);
    let mut open: Vec<usize> = Vec::new();

    for token in stream.tokens() {
        let parent = open.last().copied().unwrap_or(root);
        match token {
            Token::Text(text) => {
                arena.add_child(parent, ArenaNode::Text(text.clone()));
            }
            Token::Comment(text) => {
                arena.add_child(parent, ArenaNode::Comment(text.clone()));
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let raw = atoms.resolve(*name);
                let namespace = child_namespace(arena.namespace_of(parent), arena.name_of(parent), raw);
                let name: Arc<str> = match namespace {
                    Namespace::Html => Arc::from(raw.to_ascii_lowercase()),
                    Namespace::Svg | Namespace::MathMl => atoms.resolve_arc(*name),
                };
                let attributes = attributes
                    .iter()
                    .map(|(k, v)| {
                        let key: Arc<str> = match namespace {
                            Namespace::Html => Arc::from(atoms.resolve(*k).to_ascii_lowercase()),
                            Namespace::Svg | Namespace::MathMl => atoms.resolve_arc(*k),
                        };
                        (key, v.clone().unwrap_or_default())
                    })
                    .collect();
                let index = arena.add_child(
                    parent,
                    ArenaNode::Element {
                        name,
                        namespace,
                        attributes,
                    },
                );
                if !*self_closing {
                    open.push(index);
                }
            }
            Token::EndTag(name) => {
                let target = atoms.resolve(*name);
                if let Some(depth) = open
                    .iter()
                    .rposition(|&index| arena.name_of(index).is_some_and(|n| n.eq_ignore_ascii_case(target)))
                {
                    open.truncate(depth);
                }
            }
        }
    }

    arena.into_tree(root)
}

fn child_namespace(parent_ns: Namespace, parent_name: Option<&str>, name: &str) -> Namespace {
    if name.eq_ignore_ascii_case("svg") {
        return Namespace::Svg;
    }
    if name.eq_ignore_ascii_case("math") {
        return Namespace::MathMl;
    }
    match (parent_ns, parent_name) {
        (Namespace::Svg, Some(p)) if p.eq_ignore_ascii_case("foreignObject") => Namespace::Html,
        (ns, _) => ns,
    }
}

enum ArenaNode {
    Fragment,
    Element {
        name: Arc<str>,
        namespace: Namespace,
        attributes: Vec<(Arc<str>, String)>,
    },
    Text(String),
    Comment(String),
}

struct FragmentArena {
    nodes: Vec<ArenaNode>,
    children: Vec<Vec<usize>>,
}

impl FragmentArena {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            children: Vec::new(),
        }
    }

    fn push(&mut self, node: ArenaNode) -> usize {
        self.nodes.push(node);
        self.children.push(Vec::new());
        self.nodes.len() - 1
    }

    fn add_child(&mut self, parent: usize, node: ArenaNode) -> usize {
        let index = self.push(node);
        self.children[parent].push(index);
        index
    }

    fn name_of(&self, index: usize) -> Option<&str> {
        match &self.nodes[index] {
            ArenaNode::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    fn namespace_of(&self, index: usize) -> Namespace {
        match &self.nodes[index] {
            ArenaNode::Element { namespace, .. } => *namespace,
            _ => Namespace::Html,
        }
    }

    fn into_tree(mut self, root: usize) -> Node {
        // Iterative postorder so deeply nested markup cannot overflow the stack.
        // When a node is popped the second time, its children are the last
        // `child_count` entries of `built`, in document order.
        let mut built: Vec<Node> = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(root, false)];
        while let Some((index, visited)) = stack.pop() {
            if !visited {
                stack.push((index, true));
                for &child in self.children[index].iter().rev() {
                    stack.push((child, false));
                }
                continue;
            }
            let children = built.split_off(built.len() - self.children[index].len());
            let node = match std::mem::replace(&mut self.nodes[index], ArenaNode::Fragment) {
                ArenaNode::Fragment => Node::Fragment { children },
                ArenaNode::Element {
                    name,
                    namespace,
                    attributes,
                } => Node::Element {
                    name,
                    namespace,
                    attributes,
                    children,
                },
                ArenaNode::Text(text) => Node::Text { text },
                ArenaNode::Comment(text) => Node::Comment { text },
            };
            built.push(node);
        }
        debug_assert_eq!(built.len(), 1, "fragment builder yields exactly one root");
        built.pop().unwrap_or(Node::Fragment {
            children: Vec::new(),
        })
    }
}
