use host::{Document, NodeId, Props, Value, outer_html};
use runtime::{Marker, Region, Runtime};
use serde::Deserialize;
use serde_json::Value as Json;
use test_support::{escape_text, fixture_path, load_json};

const FORMAT: &str = "domx-insert-v1";

#[derive(Debug, Deserialize)]
struct Manifest {
    format: String,
    scenarios: Vec<Scenario>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    #[serde(default)]
    children: Vec<String>,
    marker: MarkerFixture,
    steps: Vec<Json>,
    expect: String,
    region_nodes: usize,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MarkerFixture {
    Named(String),
    Before { before: usize },
}

/// Fixture JSON to a runtime value. Objects are tagged:
/// `{"undefined": true}`, `{"lazy": v}`, `{"element": tag, "text"?: s}`,
/// `{"object": true}` (a plain props object).
fn to_value(doc: &mut Document, json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Value::from(s.as_str()),
        Json::Array(items) => Value::array(items.iter().map(|item| to_value(doc, item)).collect::<Vec<_>>()),
        Json::Object(map) => {
            if map.contains_key("undefined") {
                Value::Undefined
            } else if let Some(inner) = map.get("lazy") {
                let inner = inner.clone();
                Value::lazy(move |doc| to_value(doc, &inner))
            } else if let Some(Json::String(tag)) = map.get("element") {
                let el = doc.create_element(tag);
                if let Some(Json::String(text)) = map.get("text") {
                    doc.set_text_content(el, text).expect("element text");
                }
                Value::Node(el)
            } else if map.contains_key("object") {
                Value::from(Props::new())
            } else {
                panic!("unknown fixture object {json}")
            }
        }
    }
}

fn marker(fixture: &MarkerFixture, children: &[NodeId]) -> Marker {
    match fixture {
        MarkerFixture::Named(name) if name == "whole" => Marker::Whole,
        MarkerFixture::Named(name) if name == "end" => Marker::End,
        MarkerFixture::Named(name) => panic!("unknown marker {name}"),
        MarkerFixture::Before { before } => Marker::Before(children[*before]),
    }
}

fn run(scenario: &Scenario) -> Result<(), String> {
    let rt = Runtime::new();
    let mut doc = Document::new();
    let parent = doc.create_element("div");
    let mut children = Vec::new();
    for tag in &scenario.children {
        let child = doc.create_element(tag);
        doc.append_child(parent, child).map_err(|e| e.to_string())?;
        children.push(child);
    }
    let mut region = Region::new(parent, marker(&scenario.marker, &children));
    for step in &scenario.steps {
        let value = to_value(&mut doc, step);
        rt.insert(&mut doc, &mut region, value).map_err(|e| e.to_string())?;
    }
    let actual = outer_html(&doc, parent);
    if actual != scenario.expect {
        return Err(format!(
            "expected \"{}\", got \"{}\"",
            escape_text(&scenario.expect),
            escape_text(&actual)
        ));
    }
    if region.nodes().len() != scenario.region_nodes {
        return Err(format!(
            "region holds {} node(s), expected {}",
            region.nodes().len(),
            scenario.region_nodes
        ));
    }
    if let Some(stray) = region.nodes().iter().find(|n| doc.parent(**n) != Some(parent)) {
        return Err(format!("region node {stray:?} is not a child of the parent"));
    }
    Ok(())
}

#[test]
fn insert_scenarios() {
    let manifest: Manifest = load_json(&fixture_path(env!("CARGO_MANIFEST_DIR"), "insert.json"));
    assert_eq!(manifest.format, FORMAT, "unsupported insert fixture format");
    let failures: Vec<String> = manifest
        .scenarios
        .iter()
        .filter_map(|s| run(s).err().map(|err| format!("{}: {err}", s.name)))
        .collect();
    assert!(failures.is_empty(), "insert failures:\n{}", failures.join("\n"));
}
