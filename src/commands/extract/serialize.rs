//! Reserializes a parsed node back into an HTML fragment.

use super::dom::{Document, NodeData, NodeId};
use super::escape::escape_markup;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentOptions {
    /// Drop the authoring `class` attribute from the outermost element.
    pub strip_root_class: bool,
    /// Write text through the markup escaper and drop empty hyperlinks.
    /// The escaper leaves `&` alone; it is written as `&amp;` here, the same
    /// as in plain text, so a source `&amp;` comes back byte-identical.
    pub escape_text: bool,
}

pub fn outer_html(doc: &Document, id: NodeId, options: FragmentOptions) -> String {
    let mut out = String::new();
    write_node(doc, id, options, true, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, options: FragmentOptions, root: bool, out: &mut String) {
    match &doc.node(id).data {
        NodeData::Text(text) => {
            if options.escape_text {
                out.push_str(&escape_markup(&text.replace('&', "&amp;")));
            } else {
                push_escaped_text(text, out);
            }
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Element { name, attrs } => {
            let tag = name.local.as_ref();
            if options.escape_text && tag == "a" && doc.text(id).trim().is_empty() {
                return;
            }

            out.push('<');
            out.push_str(tag);
            for (key, value) in attrs {
                if root && options.strip_root_class && key == "class" {
                    continue;
                }
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                push_escaped_attr(value, out);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&tag) {
                return;
            }

            for child in doc.children(id) {
                write_node(doc, *child, options, false, out);
            }

            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeData::Document => {
            for child in doc.children(id) {
                write_node(doc, *child, options, false, out);
            }
        }
        NodeData::Doctype => {}
    }
}

fn push_escaped_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn push_escaped_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(doc: &Document, tag: &str) -> NodeId {
        doc.find_descendant(doc.root(), tag)
            .expect("fixture tag should exist")
    }

    #[test]
    fn strips_class_from_the_root_element_only() {
        let doc = Document::parse(r#"<div class="body"><span class="keep">x</span></div>"#);
        let html = outer_html(
            &doc,
            first(&doc, "div"),
            FragmentOptions {
                strip_root_class: true,
                escape_text: false,
            },
        );
        assert_eq!(html, r#"<div><span class="keep">x</span></div>"#);
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        let doc = Document::parse("<p>a<br>b</p>");
        let html = outer_html(&doc, first(&doc, "p"), FragmentOptions::default());
        assert_eq!(html, "<p>a<br>b</p>");
    }

    #[test]
    fn plain_text_reescapes_ampersands_and_angle_brackets() {
        let doc = Document::parse("<p>1 &lt; 2 &amp; 3</p>");
        let html = outer_html(&doc, first(&doc, "p"), FragmentOptions::default());
        assert_eq!(html, "<p>1 &lt; 2 &amp; 3</p>");
    }
}
