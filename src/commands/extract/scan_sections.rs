//! Heading-keyed scanners: an `h5` opens an entry, anything up to the next
//! `h5` is its body, and an `h1`-`h3` closes the section.

use anyhow::{Context, Result};
use regex::Regex;

use super::dom::{Cursor, Document, NodeId, heading_level};
use super::records::Record;
use super::serialize::{FragmentOptions, outer_html};

pub(super) const ENTRY_HEADING: &str = "h5";
const SECTION_BOUNDARY_LEVEL: u8 = 3;

pub(super) fn is_section_boundary(tag: &str) -> bool {
    heading_level(tag).is_some_and(|level| level <= SECTION_BOUNDARY_LEVEL)
}

pub(super) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Upper-cases the first character and lower-cases the rest.
pub(super) fn capitalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Splits `"x and y"` (in any case) into its conjuncts, each capitalized.
pub(super) fn split_conjunction(name: &str) -> Vec<String> {
    collapse_whitespace(name)
        .to_lowercase()
        .split(" and ")
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

pub(super) fn heading_text(doc: &Document, id: NodeId) -> String {
    collapse_whitespace(&doc.text(id))
}

pub(super) fn find_heading(
    cursor: &mut Cursor,
    doc: &Document,
    tag: &str,
    caption: &str,
    document: &str,
) -> Result<NodeId> {
    cursor
        .seek(|node| doc.is_tag(node, tag) && heading_text(doc, node) == caption)
        .with_context(|| format!("heading \"{caption}\" not found in {document}"))
}

/// Walks `start` and its following siblings, calling `finalize` with the
/// heading text and accumulated body of every entry.
fn scan_heading_entries<F>(doc: &Document, start: NodeId, mut finalize: F) -> Result<usize>
where
    F: FnMut(&str, &str) -> Result<()>,
{
    let body_options = FragmentOptions {
        strip_root_class: true,
        escape_text: false,
    };

    let mut open: Option<(String, String)> = None;
    let mut finalized = 0;

    for node in Cursor::new(doc.siblings_from(start)) {
        let Some(tag) = doc.tag(node) else {
            continue;
        };

        if tag == ENTRY_HEADING {
            if let Some((heading, body)) = open.take() {
                finalize(&heading, &body)?;
                finalized += 1;
            }
            open = Some((heading_text(doc, node), String::new()));
        } else if is_section_boundary(tag) {
            break;
        } else if let Some((_, body)) = open.as_mut() {
            body.push_str(&outer_html(doc, node, body_options));
        }
    }

    if let Some((heading, body)) = open {
        finalize(&heading, &body)?;
        finalized += 1;
    }

    Ok(finalized)
}

/// Every `h5` entry from the first one in the document. A heading naming
/// several abilities (`"Blindsight and Blindsense"`) yields one record each.
pub fn scan_special_abilities<F>(doc: &Document, document: &str, mut emit: F) -> Result<usize>
where
    F: FnMut(Record) -> Result<()>,
{
    let first = doc
        .cursor()
        .seek(|node| doc.is_tag(node, ENTRY_HEADING))
        .with_context(|| format!("no {ENTRY_HEADING} entry headings in {document}"))?;

    let mut emitted = 0;
    scan_heading_entries(doc, first, |heading, body| {
        for name in split_conjunction(heading) {
            emit(Record::SpecialAbility {
                name,
                fulltext: body.to_string(),
            })?;
            emitted += 1;
        }
        Ok(())
    })?;

    Ok(emitted)
}

/// The `h5` entries under "THE ABILITIES", each titled `Name (Short)`.
pub fn scan_abilities<F>(doc: &Document, document: &str, mut emit: F) -> Result<usize>
where
    F: FnMut(Record) -> Result<()>,
{
    let title_re = Regex::new(r"^([a-zA-Z]+) +\(([a-zA-Z]+)\)")
        .context("failed to compile ability title regex")?;

    let mut cursor = doc.cursor();
    find_heading(&mut cursor, doc, "h3", "THE ABILITIES", document)?;
    let first = cursor
        .seek(|node| doc.is_tag(node, ENTRY_HEADING))
        .with_context(|| format!("no ability entries after \"THE ABILITIES\" in {document}"))?;

    scan_heading_entries(doc, first, |heading, body| {
        let lowered = heading.to_lowercase();
        let captures = title_re.captures(&lowered).with_context(|| {
            format!("entry heading does not match \"Name (Short)\": {heading}")
        })?;

        emit(Record::Ability {
            name: capitalize(&captures[1]),
            shortname: captures[2].to_string(),
            fulltext: body.to_string(),
        })
    })
}
