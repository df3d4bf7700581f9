use anyhow::Result;

use super::dom::Document;
use super::escape::escaped_fragment;
use super::records::Record;
use super::scan_sections::{capitalize, collapse_whitespace, find_heading, is_section_boundary};
use super::serialize::{FragmentOptions, outer_html};

/// Paragraph-keyed scan of the CONDITIONS section: a paragraph with a bold
/// lead term opens an entry, plain paragraphs extend it. Paragraphs carrying
/// a `class` are section furniture and are skipped.
pub fn scan_conditions<F>(doc: &Document, document: &str, mut emit: F) -> Result<usize>
where
    F: FnMut(Record) -> Result<()>,
{
    let mut cursor = doc.cursor();
    find_heading(&mut cursor, doc, "h3", "CONDITIONS", document)?;

    let mut open: Option<(String, String)> = None;
    let mut emitted = 0;

    for node in cursor {
        let Some(tag) = doc.tag(node) else {
            continue;
        };
        if is_section_boundary(tag) {
            break;
        }
        if tag != "p" || doc.attr(node, "class").is_some() {
            continue;
        }

        match doc.find_descendant(node, "b") {
            Some(lead) => {
                if let Some((name, fulltext)) = open.take() {
                    emit(Record::Condition { name, fulltext })?;
                    emitted += 1;
                }
                let name = capitalize(&collapse_whitespace(&doc.text(lead)));
                open = Some((name, escaped_fragment(doc, node)));
            }
            None => {
                if let Some((_, fulltext)) = open.as_mut() {
                    fulltext.push_str(&outer_html(doc, node, FragmentOptions::default()));
                }
            }
        }
    }

    if let Some((name, fulltext)) = open {
        emit(Record::Condition { name, fulltext })?;
        emitted += 1;
    }

    Ok(emitted)
}
