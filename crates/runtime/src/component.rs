use crate::Runtime;
use host::{Document, NodeId, Props, Value};
use std::fmt;
use std::rc::Rc;

/// Instance produced by a class-style component.
pub trait ClassComponent {
    /// Node (or renderable value) the instance renders into.
    fn root(&self) -> Value;
}

type FunctionComponent = dyn Fn(&mut Document, &Props) -> Value;
type Constructor = dyn Fn(&mut Document, &Props) -> Box<dyn ClassComponent>;

#[derive(Clone)]
pub enum Component {
    Function(Rc<FunctionComponent>),
    Class {
        construct: Rc<Constructor>,
        /// The instance attaches itself; nothing is returned for insertion.
        self_mount: bool,
    },
}

impl Component {
    pub fn function(f: impl Fn(&mut Document, &Props) -> Value + 'static) -> Self {
        Component::Function(Rc::new(f))
    }

    pub fn class(
        construct: impl Fn(&mut Document, &Props) -> Box<dyn ClassComponent> + 'static,
        self_mount: bool,
    ) -> Self {
        Component::Class {
            construct: Rc::new(construct),
            self_mount,
        }
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Function(_) => f.write_str("Component::Function(..)"),
            Component::Class { self_mount, .. } => f
                .debug_struct("Component::Class")
                .field("self_mount", self_mount)
                .finish_non_exhaustive(),
        }
    }
}

impl Runtime {
    /// Run a component with `props` and return what it renders. A
    /// self-mounting class component yields `Null`.
    pub fn create_component(&self, doc: &mut Document, component: &Component, props: &Props) -> Value {
        match component {
            Component::Function(f) => f(doc, props),
            Component::Class { construct, self_mount } => {
                let instance = construct(doc, props);
                if *self_mount { Value::Null } else { instance.root() }
            }
        }
    }

    /// Apply a directive to `element` and hand back its result.
    pub fn use_directive<R>(
        &self,
        doc: &mut Document,
        directive: impl FnOnce(&mut Document, NodeId, Value) -> R,
        element: NodeId,
        arg: Value,
    ) -> R {
        directive(doc, element, arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counter {
        root: NodeId,
    }

    impl ClassComponent for Counter {
        fn root(&self) -> Value {
            Value::Node(self.root)
        }
    }

    #[test]
    fn function_components_receive_props() {
        let rt = Runtime::new();
        let mut doc = Document::new();
        let greet = Component::function(|doc, props| {
            let name = props.get(doc, "name");
            Value::from(format!("hello {name}"))
        });
        let out = rt.create_component(&mut doc, &greet, &Props::new().with("name", "ada"));
        assert_eq!(out.as_str(), Some("hello ada"));
    }

    #[test]
    fn class_components_return_root_unless_self_mounting() {
        let rt = Runtime::new();
        let mut doc = Document::new();
        let built = Rc::new(Cell::new(0));
        let make = |self_mount| {
            let built = Rc::clone(&built);
            Component::class(
                move |doc, _| {
                    built.set(built.get() + 1);
                    Box::new(Counter {
                        root: doc.create_element("output"),
                    }) as Box<dyn ClassComponent>
                },
                self_mount,
            )
        };
        let out = rt.create_component(&mut doc, &make(false), &Props::new());
        assert_eq!(out.as_node().and_then(|n| doc.tag_name(n)), Some("output"));
        let out = rt.create_component(&mut doc, &make(true), &Props::new());
        assert!(matches!(out, Value::Null));
        assert_eq!(built.get(), 2);
    }

    #[test]
    fn directives_get_element_and_argument() {
        let rt = Runtime::new();
        let mut doc = Document::new();
        let input = doc.create_element("input");
        let result = rt.use_directive(
            &mut doc,
            |doc, el, arg| {
                doc.set_attribute(el, "data-model", &arg.to_js_string())
                    .map(|()| el)
            },
            input,
            Value::from("field"),
        );
        assert_eq!(result, Ok(input));
        assert_eq!(doc.attribute(input, "data-model"), Some("field"));
    }
}
