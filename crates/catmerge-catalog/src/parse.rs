//! Line-oriented PO parser.
//!
//! Produces a raw [`Catalog`]: duplicates are kept as they appear and are
//! only folded by [`Catalog::canonicalize`]. The first live entry with an
//! empty key becomes the header; later ones are discarded.

use crate::catalog::Catalog;
use crate::error::{CatalogError, Result};
use crate::escape::unquote;
use crate::header::Header;
use crate::message::{Comments, Message, MessageKey, Translation};

/// The keyword a continuation string would extend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    None,
    Context,
    Id,
    IdPlural,
    Str,
    StrN(usize),
}

/// An entry under construction.
#[derive(Debug, Default)]
struct Pending {
    comments: Comments,
    obsolete: bool,
    context: Option<String>,
    msgid: Option<String>,
    msgid_plural: Option<String>,
    msgstr: Option<String>,
    forms: Vec<String>,
    start_line: usize,
}

impl Pending {
    fn has_keywords(&self) -> bool {
        self.context.is_some() || self.msgid.is_some()
    }

    fn has_msgstr(&self) -> bool {
        self.msgstr.is_some() || !self.forms.is_empty()
    }
}

struct Parser {
    header: Option<Header>,
    messages: Vec<Message>,
    pending: Pending,
    field: Field,
}

/// Parse PO text into a raw catalog.
pub fn parse_catalog(input: &str) -> Result<Catalog> {
    let mut parser = Parser {
        header: None,
        messages: Vec::new(),
        pending: Pending::default(),
        field: Field::None,
    };

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        parser.line(line, line_no)?;
    }
    parser.finish(input.lines().count().max(1))?;

    Ok(Catalog::from_parts(parser.header, parser.messages))
}

impl Parser {
    fn line(&mut self, line: &str, line_no: usize) -> Result<()> {
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            if self.pending.has_keywords() {
                self.finish(line_no)?;
            }
            return Ok(());
        }

        if let Some(rest) = trimmed.strip_prefix("#~") {
            // Graveyard line: either a previous-source comment or keywords.
            if let Some(prev) = rest.strip_prefix('|') {
                self.begin_comment(line_no)?;
                self.pending.comments.previous.push(prev.trim_start().to_string());
                return Ok(());
            }
            return self.keyword_line(rest.trim_start(), line_no, true);
        }

        if let Some(rest) = trimmed.strip_prefix('#') {
            self.begin_comment(line_no)?;
            let comments = &mut self.pending.comments;
            if let Some(text) = rest.strip_prefix('.') {
                comments.extracted.push(text.trim_start().to_string());
            } else if let Some(text) = rest.strip_prefix(':') {
                comments.references.push(text.trim().to_string());
            } else if let Some(text) = rest.strip_prefix(',') {
                for flag in text.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                    comments.add_flag(flag);
                }
            } else if let Some(text) = rest.strip_prefix('|') {
                comments.previous.push(text.trim_start().to_string());
            } else {
                let text = rest.strip_prefix(' ').unwrap_or(rest);
                comments.translator.push(text.to_string());
            }
            return Ok(());
        }

        self.keyword_line(trimmed, line_no, false)
    }

    /// A comment line starts a new entry if the current one is complete.
    fn begin_comment(&mut self, line_no: usize) -> Result<()> {
        if self.pending.has_keywords() {
            if !self.pending.has_msgstr() {
                return Err(CatalogError::parse(line_no, "comment inside an entry before msgstr"));
            }
            self.finish(line_no)?;
        }
        Ok(())
    }

    fn keyword_line(&mut self, line: &str, line_no: usize, obsolete: bool) -> Result<()> {
        if line.starts_with('"') {
            let value = unquote(line, line_no)?;
            return self.continue_field(value, line_no);
        }

        let (keyword, rest) = match line.find(|c: char| c.is_whitespace() || c == '"') {
            Some(pos) => (&line[..pos], line[pos..].trim_start()),
            None => (line, ""),
        };
        if rest.is_empty() {
            return Err(CatalogError::parse(
                line_no,
                format!("keyword '{keyword}' without a quoted string"),
            ));
        }

        match keyword {
            "msgctxt" | "msgid" => {
                if self.pending.has_msgstr() {
                    self.finish(line_no)?;
                }
                let value = unquote(rest, line_no)?;
                self.mark_obsolete(obsolete, line_no)?;
                if keyword == "msgctxt" {
                    if self.pending.context.is_some() || self.pending.msgid.is_some() {
                        return Err(CatalogError::parse(line_no, "unexpected msgctxt"));
                    }
                    self.pending.context = Some(value);
                    self.field = Field::Context;
                } else {
                    if self.pending.msgid.is_some() {
                        return Err(CatalogError::parse(line_no, "duplicate msgid in entry"));
                    }
                    self.pending.msgid = Some(value);
                    self.field = Field::Id;
                }
            }
            "msgid_plural" => {
                if self.pending.msgid.is_none() || self.pending.has_msgstr() {
                    return Err(CatalogError::parse(line_no, "msgid_plural without msgid"));
                }
                self.pending.msgid_plural = Some(unquote(rest, line_no)?);
                self.field = Field::IdPlural;
            }
            "msgstr" => {
                if self.pending.msgid.is_none() {
                    return Err(CatalogError::parse(line_no, "msgstr without msgid"));
                }
                if self.pending.msgid_plural.is_some() {
                    return Err(CatalogError::parse(
                        line_no,
                        "plural entry requires msgstr[N] forms",
                    ));
                }
                if self.pending.msgstr.is_some() {
                    return Err(CatalogError::parse(line_no, "duplicate msgstr in entry"));
                }
                self.pending.msgstr = Some(unquote(rest, line_no)?);
                self.field = Field::Str;
            }
            other => {
                let index = other
                    .strip_prefix("msgstr[")
                    .and_then(|s| s.strip_suffix(']'))
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or_else(|| {
                        CatalogError::parse(line_no, format!("unknown keyword '{other}'"))
                    })?;
                if self.pending.msgid.is_none() {
                    return Err(CatalogError::parse(line_no, "msgstr without msgid"));
                }
                if self.pending.msgid_plural.is_none() {
                    return Err(CatalogError::parse(
                        line_no,
                        "msgstr[N] on an entry without msgid_plural",
                    ));
                }
                if index != self.pending.forms.len() {
                    return Err(CatalogError::parse(
                        line_no,
                        format!(
                            "plural form index {index} out of sequence (expected {})",
                            self.pending.forms.len()
                        ),
                    ));
                }
                self.pending.forms.push(unquote(rest, line_no)?);
                self.field = Field::StrN(index);
            }
        }
        Ok(())
    }

    fn mark_obsolete(&mut self, obsolete: bool, line_no: usize) -> Result<()> {
        if self.pending.has_keywords() && self.pending.obsolete != obsolete {
            return Err(CatalogError::parse(
                line_no,
                "entry mixes obsolete and live lines",
            ));
        }
        if !self.pending.has_keywords() {
            self.pending.start_line = line_no;
        }
        self.pending.obsolete = obsolete;
        Ok(())
    }

    fn continue_field(&mut self, value: String, line_no: usize) -> Result<()> {
        let target = match self.field {
            Field::None => None,
            Field::Context => self.pending.context.as_mut(),
            Field::Id => self.pending.msgid.as_mut(),
            Field::IdPlural => self.pending.msgid_plural.as_mut(),
            Field::Str => self.pending.msgstr.as_mut(),
            Field::StrN(i) => self.pending.forms.get_mut(i),
        };
        match target {
            Some(s) => {
                s.push_str(&value);
                Ok(())
            }
            None => Err(CatalogError::parse(
                line_no,
                "continuation string with nothing to continue",
            )),
        }
    }

    /// Close the pending entry, if any.
    fn finish(&mut self, line_no: usize) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);
        self.field = Field::None;

        if !pending.has_keywords() {
            // Stray comments with no entry after them are dropped.
            return Ok(());
        }
        let msgid = pending.msgid.ok_or_else(|| {
            CatalogError::parse(pending.start_line, "msgctxt without msgid")
        })?;
        let translation = match (pending.msgid_plural.is_some(), pending.msgstr) {
            (false, Some(s)) => Translation::Singular(s),
            (true, None) if !pending.forms.is_empty() => Translation::Plural(pending.forms),
            _ => {
                return Err(CatalogError::parse(
                    line_no,
                    format!("missing msgstr for msgid {msgid:?}"),
                ));
            }
        };

        let message = Message {
            key: MessageKey {
                context: pending.context,
                msgid,
            },
            msgid_plural: pending.msgid_plural,
            translation,
            comments: pending.comments,
            obsolete: pending.obsolete,
        };

        if !message.obsolete && message.key.is_header() {
            if self.header.is_none() {
                self.header = Some(Header::from_message(message));
            } else {
                tracing::debug!(line = line_no, "ignoring duplicate header entry");
            }
        } else {
            self.messages.push(message);
        }
        Ok(())
    }
}
