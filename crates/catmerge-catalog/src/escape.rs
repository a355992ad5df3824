//! C-style string literal escaping as used by PO files.

use crate::error::{CatalogError, Result};

/// Escape a value for use between double quotes.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            c if c.is_ascii_control() => out.push_str(&format!("\\{:03o}", c as u32)),
            other => out.push(other),
        }
    }
    out
}

/// Decode a quoted literal such as `"Hello\n"`. Trailing whitespace after
/// the closing quote is allowed; anything else is an error.
///
/// Consecutive octal escapes are bytes and are decoded together as UTF-8,
/// so `"caf\303\251"` reads as `café`. A run that is not UTF-8 is taken
/// byte for byte as Latin-1.
pub fn unquote(literal: &str, line: usize) -> Result<String> {
    let literal = literal.trim_end();
    let inner = literal
        .strip_prefix('"')
        .ok_or_else(|| CatalogError::parse(line, "expected a quoted string"))?;

    let mut out = String::with_capacity(inner.len());
    let mut octal: Vec<u8> = Vec::new();
    let mut chars = inner.char_indices();
    while let Some((pos, ch)) = chars.next() {
        if ch == '\\' {
            let (_, esc) = chars
                .next()
                .ok_or_else(|| CatalogError::parse(line, "unterminated string"))?;
            if let Some(first) = esc.to_digit(8) {
                let mut code = first;
                for _ in 0..2 {
                    let mut peek = chars.clone();
                    match peek.next().and_then(|(_, d)| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars = peek;
                        }
                        None => break,
                    }
                }
                let byte = u8::try_from(code).map_err(|_| {
                    CatalogError::parse(line, format!("octal escape \\{code:o} is out of range"))
                })?;
                octal.push(byte);
                continue;
            }
            flush_octal(&mut out, &mut octal);
            match esc {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                'r' => out.push('\r'),
                'a' => out.push('\u{7}'),
                'b' => out.push('\u{8}'),
                'f' => out.push('\u{c}'),
                'v' => out.push('\u{b}'),
                '"' => out.push('"'),
                '\\' => out.push('\\'),
                other => {
                    return Err(CatalogError::parse(
                        line,
                        format!("unknown escape sequence \\{other}"),
                    ));
                }
            }
            continue;
        }

        flush_octal(&mut out, &mut octal);
        if ch == '"' {
            if pos + 1 != inner.len() {
                return Err(CatalogError::parse(
                    line,
                    "unexpected characters after closing quote",
                ));
            }
            return Ok(out);
        }
        out.push(ch);
    }
    Err(CatalogError::parse(line, "unterminated string"))
}

fn flush_octal(out: &mut String, bytes: &mut Vec<u8>) {
    if bytes.is_empty() {
        return;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => out.push_str(text),
        Err(_) => out.extend(bytes.iter().map(|&b| char::from(b))),
    }
    bytes.clear();
}
