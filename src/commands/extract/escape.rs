use super::dom::{Document, NodeId};
use super::serialize::{FragmentOptions, outer_html};

/// Replaces the reserved markup characters with named references.
/// `&` is left alone.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '>' => out.push_str("&gt;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Serializes `id` with every text descendant escaped. Hyperlinks without
/// visible text are dropped.
pub fn escaped_fragment(doc: &Document, id: NodeId) -> String {
    outer_html(
        doc,
        id,
        FragmentOptions {
            strip_root_class: false,
            escape_text: true,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_markup_replaces_quotes_and_brackets() {
        assert_eq!(
            escape_markup(r#"<a> "b" 'c'"#),
            "&lt;a&gt; &quot;b&quot; &apos;c&apos;"
        );
    }

    #[test]
    fn escape_markup_leaves_ampersand_untouched() {
        assert_eq!(escape_markup("salt & pepper"), "salt & pepper");
    }

    #[test]
    fn escaped_fragment_has_no_raw_reserved_characters_in_text() {
        let doc = Document::parse(
            "<p><b>Dazzled:</b> can&apos;t see &quot;well&quot; &lt;sic&gt; &amp; more</p>",
        );
        let p = doc.find_descendant(doc.root(), "p").expect("p should exist");
        let html = escaped_fragment(&doc, p);

        let text = html
            .trim_start_matches("<p><b>Dazzled:</b>")
            .trim_end_matches("</p>");
        for raw in ['<', '>', '"', '\''] {
            assert!(!text.contains(raw), "raw {raw:?} left in {text}");
        }
        assert!(
            text.contains(" &amp; more"),
            "ampersand should reserialize as in the source: {text}"
        );
    }

    #[test]
    fn escaped_fragment_escapes_link_labels_and_drops_empty_links() {
        let doc = Document::parse(
            r#"<p><b>Pinned</b> see <a href="x.html">"grapple"</a><a href="y.html"></a></p>"#,
        );
        let p = doc.find_descendant(doc.root(), "p").expect("p should exist");
        let html = escaped_fragment(&doc, p);
        assert_eq!(
            html,
            r#"<p><b>Pinned</b> see <a href="x.html">&quot;grapple&quot;</a></p>"#
        );
    }
}
