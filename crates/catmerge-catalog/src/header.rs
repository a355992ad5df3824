//! The catalog header: the pseudo-entry with an empty key whose value holds
//! `Name: value` metadata lines.

use serde::{Deserialize, Serialize};

use crate::message::{Comments, Message, MessageKey, Translation};

/// Standard gettext header field order, used by [`HeaderFormat::Canonical`].
pub const CANONICAL_FIELD_ORDER: &[&str] = &[
    "Project-Id-Version",
    "Report-Msgid-Bugs-To",
    "POT-Creation-Date",
    "PO-Revision-Date",
    "Last-Translator",
    "Language-Team",
    "Language",
    "MIME-Version",
    "Content-Type",
    "Content-Transfer-Encoding",
    "Plural-Forms",
];

/// How header fields are laid out when a header is written back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFormat {
    /// Keep the field order found in the input.
    #[default]
    Preserve,
    /// Reorder fields to the standard gettext order.
    Canonical,
}

/// One `Name: value` line of the header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderField {
    pub name: String,
    pub value: String,
}

/// The catalog header.
///
/// The raw `msgstr` is kept verbatim so that a header which is reattached
/// unchanged serializes to exactly the same text it was parsed from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub comments: Comments,
    pub msgstr: String,
}

impl Header {
    pub fn new(msgstr: impl Into<String>) -> Self {
        Self {
            comments: Comments::default(),
            msgstr: msgstr.into(),
        }
    }

    /// Build a header from the parsed header entry.
    pub fn from_message(message: Message) -> Self {
        let msgstr = match message.translation {
            Translation::Singular(s) => s,
            Translation::Plural(mut forms) => {
                if forms.is_empty() {
                    String::new()
                } else {
                    forms.swap_remove(0)
                }
            }
        };
        Self {
            comments: message.comments,
            msgstr,
        }
    }

    /// The header as a regular entry, for serialization.
    pub fn to_message(&self) -> Message {
        let mut message = Message::new(MessageKey::new(""), self.msgstr.clone());
        message.comments = self.comments.clone();
        message
    }

    /// Parsed `Name: value` fields, in order. Lines without a colon are
    /// skipped.
    pub fn fields(&self) -> Vec<HeaderField> {
        self.msgstr
            .lines()
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                Some(HeaderField {
                    name: name.trim().to_string(),
                    value: value.trim().to_string(),
                })
            })
            .collect()
    }

    /// Look up a field by case-insensitive name.
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields()
            .into_iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
            .map(|f| f.value)
    }

    /// The `charset=` parameter of `Content-Type`, if declared.
    pub fn charset(&self) -> Option<String> {
        let content_type = self.field("Content-Type")?;
        content_type
            .split(';')
            .filter_map(|part| part.trim().split_once('='))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, v)| v.trim().to_string())
    }

    /// Apply a layout to the header.
    pub fn formatted(&self, format: HeaderFormat) -> Header {
        match format {
            HeaderFormat::Preserve => self.clone(),
            HeaderFormat::Canonical => self.canonicalized(),
        }
    }

    /// A copy with fields reordered to [`CANONICAL_FIELD_ORDER`]. Unknown
    /// fields and non-field lines follow, in their original order.
    pub fn canonicalized(&self) -> Header {
        let mut lines: Vec<&str> = self.msgstr.lines().filter(|l| !l.is_empty()).collect();
        let rank = |line: &str| {
            let name = line.split_once(':').map(|(n, _)| n.trim()).unwrap_or("");
            CANONICAL_FIELD_ORDER
                .iter()
                .position(|known| known.eq_ignore_ascii_case(name))
                .unwrap_or(CANONICAL_FIELD_ORDER.len())
        };
        // Stable sort keeps unknown fields in their input order.
        lines.sort_by_key(|line| rank(line));

        let mut msgstr = String::with_capacity(self.msgstr.len());
        for line in lines {
            msgstr.push_str(line);
            msgstr.push('\n');
        }
        Header {
            comments: self.comments.clone(),
            msgstr,
        }
    }
}
