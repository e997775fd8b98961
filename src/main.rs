//! Renders a small todo list with the runtime and prints the resulting tree.

use host::{Document, Handler, NodeId, Props, Value, outer_html, outline};
use runtime::{Component, Region, Runtime, RuntimeConfig};
use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const OUTLINE_CAP: usize = 200;

fn item_component(rt: &Rc<Runtime>) -> Component {
    let rt = Rc::clone(rt);
    let row = rt.template(r#"<li class="item"><span></span></li>"#, false, false);
    Component::function(move |doc: &mut Document, props: &Props| {
        let li = match row.instantiate(doc) {
            Ok(li) => li,
            Err(err) => {
                log::error!(target: "domx::demo", "row template failed: {err}");
                return Value::Null;
            }
        };
        let label = props.get(doc, "label");
        let done = props.get(doc, "done");
        let span = doc.first_child(li);
        let classes = Props::new().with("done", done);
        let rendered = span
            .map(|span| rt.insert_value(doc, span, label, runtime::Marker::Whole))
            .transpose()
            .and_then(|_| {
                rt.assign_prop(doc, li, "classList", Value::from(classes), &Value::Undefined, false, false)
            });
        if let Err(err) = rendered {
            log::error!(target: "domx::demo", "row render failed: {err}");
        }
        Value::Node(li)
    })
}

fn render_rows(rt: &Runtime, doc: &mut Document, item: &Component, todos: &[(&str, bool)]) -> Value {
    Value::array(todos.iter().map(|(label, done)| {
        let props = Props::new().with("label", *label).with("done", *done);
        rt.create_component(doc, item, &props)
    }))
}

fn mount(rt: &Rc<Runtime>, doc: &mut Document) -> Result<NodeId, Box<dyn Error>> {
    let shell = rt.template(
        r#"<section class="todos"><h1>Todo</h1><ul></ul><footer><!----></footer></section>"#,
        false,
        false,
    );
    let section = shell.instantiate(doc)?;
    doc.append_child(doc.root(), section)?;

    let list = doc
        .children(section)
        .iter()
        .copied()
        .find(|&n| doc.tag_name(n) == Some("ul"))
        .ok_or("template lost its list")?;
    let footer = doc.last_child(section).ok_or("template lost its footer")?;
    let marker = doc.first_child(footer).ok_or("template lost its marker")?;

    let clicks = Rc::new(RefCell::new(0u32));
    let counter = Rc::clone(&clicks);
    let attrs = Props::new()
        .with("id", "main")
        .with("aria-label", "todo list")
        .with("onClick", Value::Handler(Handler::new(move |_, _| *counter.borrow_mut() += 1)));
    rt.spread(doc, section, &attrs, false, true)?;

    let item = item_component(rt);
    let mut rows = Region::whole(list);
    let first = render_rows(rt, doc, &item, &[("write parser", true), ("patch regions", false)]);
    rt.insert(doc, &mut rows, first)?;
    let second = render_rows(
        rt,
        doc,
        &item,
        &[("write parser", true), ("patch regions", true), ("ship it", false)],
    );
    rt.insert(doc, &mut rows, second)?;

    let mut summary = Region::before(footer, marker);
    let remaining = rows.nodes().len();
    rt.insert(doc, &mut summary, Value::from(format!("{remaining} items")))?;

    if let Some(&row) = rows.nodes().first() {
        doc.dispatch(row, "click")?;
    }
    log::info!(target: "domx::demo", "delegated clicks handled: {}", clicks.borrow());
    Ok(section)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let rt = Rc::new(Runtime::with_config(RuntimeConfig {
        delegate_events: true,
        ..RuntimeConfig::default()
    }));
    let mut doc = Document::new();
    let section = mount(&rt, &mut doc)?;

    for line in outline(&doc, section, OUTLINE_CAP) {
        println!("{line}");
    }
    println!();
    println!("{}", outer_html(&doc, section));
    Ok(())
}
