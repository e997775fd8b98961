#![no_main]

use host::{Document, NodeId, Value};
use libfuzzer_sys::fuzz_target;
use runtime::{Region, Runtime};

fn value_for(pool: &[NodeId], op: u8, arg: u8) -> Value {
    match op % 7 {
        0 => Value::Undefined,
        1 => Value::Null,
        2 => Value::from(format!("t{arg}")),
        3 => Value::from(f64::from(arg)),
        4 => Value::Node(pool[usize::from(arg) % pool.len()]),
        5 => Value::array(
            (0..arg % 5).map(|i| Value::Node(pool[usize::from(arg.wrapping_add(i)) % pool.len()])),
        ),
        _ => {
            let text = format!("lazy{arg}");
            Value::lazy(move |_| Value::from(text.as_str()))
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let rt = Runtime::new();
    let mut doc = Document::new();
    let parent = doc.create_element("div");
    let marker = doc.create_comment("");
    doc.append_child(parent, marker).expect("fresh nodes attach");
    let pool: Vec<_> = (0..6)
        .map(|i| {
            if i % 2 == 0 {
                doc.create_element("span")
            } else {
                doc.create_text_node("n")
            }
        })
        .collect();

    let mut regions = [Region::whole(parent), Region::before(parent, marker)];
    for chunk in data.chunks_exact(3) {
        let value = value_for(&pool, chunk[1], chunk[2]);
        let region = &mut regions[usize::from(chunk[0] & 1)];
        if rt.insert(&mut doc, region, value).is_err() {
            continue;
        }
        for &node in region.nodes() {
            assert_eq!(doc.parent(node), Some(parent));
        }
    }
});
