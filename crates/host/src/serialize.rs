//! Markup serialization and a compact debug outline of a host subtree.

use crate::document::{Document, NodeType};
use core_types::{Namespace, NodeId};
use std::fmt::Write;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn inner_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    let raw = doc
        .tag_name(id)
        .is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name));
    for &child in doc.children(id) {
        write_node(doc, child, raw, &mut out);
    }
    out
}

pub fn outer_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, false, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, raw_text: bool, out: &mut String) {
    match doc.node_type(id) {
        Some(NodeType::Text) => {
            let text = doc.data(id).unwrap_or("");
            if raw_text {
                out.push_str(text);
            } else {
                escape_into(text, false, out);
            }
        }
        Some(NodeType::Comment) => {
            out.push_str("<!--");
            out.push_str(doc.data(id).unwrap_or(""));
            out.push_str("-->");
        }
        Some(NodeType::Element) => {
            let name = doc.tag_name(id).unwrap_or("");
            out.push('<');
            out.push_str(name);
            for attr in doc.attributes(id) {
                out.push(' ');
                out.push_str(&attr.name);
                out.push_str("=\"");
                escape_into(&attr.value, true, out);
                out.push('"');
            }
            out.push('>');
            let html = doc.namespace(id) == Some(Namespace::Html);
            if html && VOID_ELEMENTS.contains(&name) {
                return;
            }
            out.push_str(&inner_html(doc, id));
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Some(NodeType::Document) => out.push_str(&inner_html(doc, id)),
        None => {}
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

const INDENT_STEP: &str = "  ";
const PREVIEW_CHARS: usize = 40;

/// One line per node, indented by depth, at most `cap` lines. Whitespace-only
/// text is skipped and long text is truncated.
pub fn outline(doc: &Document, root: NodeId, cap: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((id, depth)) = stack.pop() {
        if out.len() == cap {
            break;
        }
        let indent = INDENT_STEP.repeat(depth);
        match doc.node_type(id) {
            Some(NodeType::Document) => out.push(format!("{indent}#document")),
            Some(NodeType::Element) => {
                let mut line = format!("{indent}<{}", doc.tag_name(id).unwrap_or(""));
                for key in ["id", "class"] {
                    if let Some(v) = doc.attribute(id, key).filter(|v| !v.is_empty()) {
                        let _ = write!(line, r#" {key}="{v}""#);
                    }
                }
                line.push('>');
                let style = doc.css_text(id);
                if !style.is_empty() {
                    let _ = write!(line, "  /* {style} */");
                }
                out.push(line);
            }
            Some(NodeType::Text) => {
                let text = doc.data(id).unwrap_or("").trim();
                if !text.is_empty() {
                    out.push(format!("{indent}\"{}\"", preview(text)));
                }
            }
            Some(NodeType::Comment) => {
                out.push(format!("{indent}<!-- {} -->", preview(doc.data(id).unwrap_or(""))));
            }
            None => {}
        }
        for &child in doc.children(id).iter().rev() {
            stack.push((child, depth + 1));
        }
    }
    out
}

fn preview(text: &str) -> String {
    let mut out: String = text
        .chars()
        .take(PREVIEW_CHARS)
        .map(|ch| if ch == '\n' { ' ' } else { ch })
        .collect();
    if text.chars().nth(PREVIEW_CHARS).is_some() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_escaping_and_void_elements() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_attribute(div, "title", r#"a "q" & <b>"#).expect("attr");
        let br = doc.create_element("br");
        let text = doc.create_text_node("1 < 2 & 3");
        doc.append_child(div, br).expect("append");
        doc.append_child(div, text).expect("append");
        assert_eq!(
            outer_html(&doc, div),
            r#"<div title="a &quot;q&quot; &amp; <b>"><br>1 &lt; 2 &amp; 3</div>"#
        );
    }

    #[test]
    fn inner_html_round_trips_through_set_inner_html() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_inner_html(div, "<p class=\"x\">a<!--c--></p><style>a > b</style>")
            .expect("set");
        assert_eq!(
            inner_html(&doc, div),
            "<p class=\"x\">a<!--c--></p><style>a > b</style>"
        );
    }

    #[test]
    fn outline_lists_nodes_by_depth() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.set_inner_html(root, r#"<div id="app" style="color: red"><p>  hi  </p> </div>"#)
            .expect("set");
        assert_eq!(
            outline(&doc, root, 10),
            [
                "#document",
                r#"  <div id="app">  /* color: red; */"#,
                "    <p>",
                "      \"hi\"",
            ]
        );
        assert_eq!(outline(&doc, root, 2).len(), 2);
    }
}
