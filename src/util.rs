use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use regex::bytes::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn utc_compact_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

/// Returns the hex SHA-256 digest and the byte length of a file.
pub fn sha256_file(path: &Path) -> Result<(String, u64)> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];
    let mut total = 0_u64;

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
        total += count as u64;
    }

    Ok((format!("{:x}", hasher.finalize()), total))
}

pub fn sha256_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// How far into a document a `<meta charset>` declaration is looked for.
const CHARSET_SNIFF_LIMIT: usize = 1024;

static META_CHARSET_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?([A-Za-z0-9_:.\-]+)"#).ok()
});

fn declared_charset(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(CHARSET_SNIFF_LIMIT)];
    let captures = META_CHARSET_RE.as_ref()?.captures(head)?;
    Encoding::for_label(captures.get(1)?.as_bytes())
}

/// Decodes an HTML document: UTF-8 (BOM stripped) when it is well formed,
/// else the `<meta charset>` encoding, else Windows-1252.
pub fn decode_document(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _, malformed) = UTF_8.decode(bytes);
    if !malformed {
        return text;
    }

    let encoding = declared_charset(bytes)
        .filter(|encoding| *encoding != UTF_8)
        .unwrap_or(WINDOWS_1252);
    let (text, _, _) = encoding.decode(bytes);
    text
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_document_strips_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("<p>\u{2014}</p>".as_bytes());
        assert_eq!(decode_document(&bytes), "<p>\u{2014}</p>");
    }

    #[test]
    fn decode_document_falls_back_to_windows_1252() {
        let bytes = b"<td>\x97</td>";
        assert_eq!(decode_document(bytes), "<td>\u{2014}</td>");
    }

    #[test]
    fn decode_document_honours_meta_charset() {
        let bytes = b"<html><head><meta charset=\"windows-1251\"></head><p>\xC0</p>";
        assert!(decode_document(bytes).contains("<p>\u{0410}</p>"));

        let bytes =
            b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=iso-8859-7\"><p>\xE1</p>";
        assert!(decode_document(bytes).contains("<p>\u{03B1}</p>"));
    }

    #[test]
    fn sha256_bytes_matches_known_digest() {
        assert_eq!(
            sha256_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
