//! Catalog charsets.
//!
//! A PO file names its encoding in the header's `Content-Type`. The header
//! is plain ASCII in every encoding gettext supports, so the label can be
//! read from the raw bytes before anything is decoded.

use encoding_rs::{Encoding, UTF_8};

use crate::error::{CatalogError, Result};

const CHARSET: &[u8] = b"charset=";

/// The encoding declared by the first entry of `input`. Unknown labels,
/// such as the `CHARSET` placeholder of a template, mean UTF-8.
pub fn declared_encoding(input: &[u8]) -> &'static Encoding {
    let start = input
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(input.len());
    let first = &input[start..];
    let first = match find(first, b"\n\n") {
        Some(end) => &first[..end],
        None => first,
    };

    let Some(at) = find_ignore_case(first, CHARSET) else {
        return UTF_8;
    };
    let label: Vec<u8> = first[at + CHARSET.len()..]
        .iter()
        .copied()
        .take_while(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b':'))
        .collect();
    Encoding::for_label(&label).map_or(UTF_8, Encoding::output_encoding)
}

/// Decode catalog bytes with their declared encoding.
pub fn decode(input: &[u8]) -> Result<String> {
    let encoding = declared_encoding(input);
    let (text, malformed) = encoding.decode_without_bom_handling(input);
    if malformed {
        return Err(CatalogError::Encoding(format!(
            "catalog is not valid {}",
            encoding.name()
        )));
    }
    Ok(text.into_owned())
}

/// Encode PO text. Fails if a character has no representation in
/// `encoding`.
pub fn encode(text: &str, encoding: &'static Encoding) -> Result<Vec<u8>> {
    if encoding == UTF_8 {
        return Ok(text.as_bytes().to_vec());
    }
    let (bytes, _, unmappable) = encoding.encode(text);
    if unmappable {
        return Err(CatalogError::Encoding(format!(
            "text cannot be represented in {}",
            encoding.name()
        )));
    }
    Ok(bytes.into_owned())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn find_ignore_case(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle))
}
