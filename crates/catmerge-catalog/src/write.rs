//! PO serialization.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::encoding::encode;
use crate::error::Result;
use crate::escape::escape;
use crate::header::HeaderFormat;
use crate::message::{Message, Translation};

/// Output formatting flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Maximum line width before strings are wrapped.
    pub width: usize,
    /// Never word-wrap; only break after embedded newlines.
    pub no_wrap: bool,
    /// Write live entries sorted by key instead of in catalog order.
    pub sort_output: bool,
    /// Skip `#:` reference comments.
    pub omit_locations: bool,
    /// Header field layout.
    pub header_format: HeaderFormat,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            width: 79,
            no_wrap: false,
            sort_output: false,
            omit_locations: false,
            header_format: HeaderFormat::Preserve,
        }
    }
}

/// Serialize a catalog to PO text. Live entries come first, then the
/// graveyard.
pub fn write_catalog(catalog: &Catalog, options: &WriteOptions) -> String {
    let mut blocks: Vec<String> = Vec::with_capacity(catalog.len() + 1);

    if let Some(header) = catalog.header() {
        let header = header.formatted(options.header_format);
        blocks.push(write_message(&header.to_message(), options));
    }

    let mut live: Vec<&Message> = catalog.live().collect();
    if options.sort_output {
        live.sort_by(|a, b| a.key.cmp(&b.key));
    }
    blocks.extend(live.into_iter().map(|m| write_message(m, options)));
    blocks.extend(catalog.obsolete().map(|m| write_message(m, options)));

    blocks.join("\n")
}

/// Serialize a catalog to bytes in the charset its header declares.
pub fn encode_catalog(catalog: &Catalog, options: &WriteOptions) -> Result<Vec<u8>> {
    encode(&write_catalog(catalog, options), catalog.encoding())
}

/// Serialize a single entry, including its trailing newline.
pub fn write_message(message: &Message, options: &WriteOptions) -> String {
    let mut out = String::new();
    let comments = &message.comments;

    for line in &comments.translator {
        if line.is_empty() {
            out.push_str("#\n");
        } else {
            out.push_str("# ");
            out.push_str(line);
            out.push('\n');
        }
    }
    for line in &comments.extracted {
        out.push_str("#. ");
        out.push_str(line);
        out.push('\n');
    }
    if !options.omit_locations {
        for line in &comments.references {
            out.push_str("#: ");
            out.push_str(line);
            out.push('\n');
        }
    }
    if !comments.flags.is_empty() {
        out.push_str("#, ");
        out.push_str(&comments.flags.join(", "));
        out.push('\n');
    }

    let prefix = if message.obsolete { "#~ " } else { "" };
    for line in &comments.previous {
        out.push_str(if message.obsolete { "#~| " } else { "#| " });
        out.push_str(line);
        out.push('\n');
    }

    if let Some(ctx) = &message.key.context {
        write_field(&mut out, prefix, "msgctxt", ctx, options);
    }
    write_field(&mut out, prefix, "msgid", &message.key.msgid, options);
    if let Some(plural) = &message.msgid_plural {
        write_field(&mut out, prefix, "msgid_plural", plural, options);
    }
    match &message.translation {
        Translation::Singular(s) => write_field(&mut out, prefix, "msgstr", s, options),
        Translation::Plural(forms) => {
            for (i, form) in forms.iter().enumerate() {
                write_field(&mut out, prefix, &format!("msgstr[{i}]"), form, options);
            }
        }
    }
    out
}

/// Write `keyword "value"`, switching to the multi-line form when the value
/// has embedded newlines or does not fit in the configured width.
fn write_field(out: &mut String, prefix: &str, keyword: &str, value: &str, options: &WriteOptions) {
    let escaped = escape(value);
    let body = value.strip_suffix('\n').unwrap_or(value);
    let single_line = format!("{prefix}{keyword} \"{escaped}\"");
    let fits = options.no_wrap || single_line.chars().count() <= options.width;

    if !body.contains('\n') && fits {
        out.push_str(&single_line);
        out.push('\n');
        return;
    }

    out.push_str(prefix);
    out.push_str(keyword);
    out.push_str(" \"\"\n");
    for segment in value.split_inclusive('\n') {
        let escaped = escape(segment);
        for chunk in wrap_escaped(&escaped, prefix.chars().count() + 2, options) {
            out.push_str(prefix);
            out.push('"');
            out.push_str(chunk);
            out.push_str("\"\n");
        }
    }
}

/// Split an escaped segment into chunks that fit within the width once
/// quoted. Breaks happen after spaces; a word longer than the width is
/// kept whole.
fn wrap_escaped<'a>(escaped: &'a str, overhead: usize, options: &WriteOptions) -> Vec<&'a str> {
    let limit = options.width.saturating_sub(overhead).max(1);
    if options.no_wrap || escaped.chars().count() <= limit {
        return vec![escaped];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut last_break: Option<usize> = None;
    let mut count = 0;

    for (pos, ch) in escaped.char_indices() {
        count += 1;
        if count > limit {
            if let Some(brk) = last_break.filter(|&b| b > start) {
                chunks.push(&escaped[start..brk]);
                count = escaped[brk..pos].chars().count() + 1;
                start = brk;
                last_break = None;
            }
        }
        if ch == ' ' {
            last_break = Some(pos + 1);
        }
    }
    if start < escaped.len() {
        chunks.push(&escaped[start..]);
    }
    chunks
}
