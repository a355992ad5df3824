use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a catalog entry: the source text plus an optional
/// disambiguating context (`msgctxt`).
///
/// Two entries with the same `msgid` but different contexts are distinct
/// messages. The header is the only entry whose key is empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageKey {
    /// Disambiguating context, if any.
    pub context: Option<String>,
    /// The source text.
    pub msgid: String,
}

impl MessageKey {
    /// A key without context.
    pub fn new(msgid: impl Into<String>) -> Self {
        Self {
            context: None,
            msgid: msgid.into(),
        }
    }

    /// A key with a `msgctxt`.
    pub fn with_context(context: impl Into<String>, msgid: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            msgid: msgid.into(),
        }
    }

    /// Returns `true` if this is the header key (empty msgid, no context).
    pub fn is_header(&self) -> bool {
        self.context.is_none() && self.msgid.is_empty()
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "{:?} [{ctx}]", self.msgid),
            None => write!(f, "{:?}", self.msgid),
        }
    }
}

/// The value slots of an entry: a single `msgstr`, or one `msgstr[N]` per
/// plural form.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Translation {
    Singular(String),
    Plural(Vec<String>),
}

impl Translation {
    /// All value slots in order.
    pub fn slots(&self) -> &[String] {
        match self {
            Self::Singular(s) => std::slice::from_ref(s),
            Self::Plural(forms) => forms,
        }
    }
}

impl Default for Translation {
    fn default() -> Self {
        Self::Singular(String::new())
    }
}

/// Metadata attached to an entry. None of it takes part in merge equality.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comments {
    /// `# ` translator comments.
    pub translator: Vec<String>,
    /// `#.` comments extracted from the source code.
    pub extracted: Vec<String>,
    /// `#:` source-location references.
    pub references: Vec<String>,
    /// `#,` flags such as `fuzzy` or `c-format`.
    pub flags: Vec<String>,
    /// `#|` previous-source lines, kept verbatim.
    pub previous: Vec<String>,
}

impl Comments {
    pub fn is_empty(&self) -> bool {
        self.translator.is_empty()
            && self.extracted.is_empty()
            && self.references.is_empty()
            && self.flags.is_empty()
            && self.previous.is_empty()
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.iter().any(|f| f == flag)
    }

    /// Add a flag if not already present.
    pub fn add_flag(&mut self, flag: &str) {
        if !self.has_flag(flag) {
            self.flags.push(flag.to_string());
        }
    }

    /// Merge the comment lines of `other` into `self`, keeping first-seen
    /// order and skipping lines already present. Previous-source lines are
    /// replaced rather than unioned, since they describe a single earlier
    /// version of the entry.
    pub fn absorb(&mut self, other: &Comments) {
        union_into(&mut self.translator, &other.translator);
        union_into(&mut self.extracted, &other.extracted);
        union_into(&mut self.references, &other.references);
        union_into(&mut self.flags, &other.flags);
        self.previous.clone_from(&other.previous);
    }
}

fn union_into(target: &mut Vec<String>, extra: &[String]) {
    for line in extra {
        if !target.contains(line) {
            target.push(line.clone());
        }
    }
}

/// A single translatable entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub key: MessageKey,
    /// Source text for the plural forms, if this is a plural entry.
    pub msgid_plural: Option<String>,
    pub translation: Translation,
    pub comments: Comments,
    /// Graveyard entry (written with a `#~` prefix).
    pub obsolete: bool,
}

impl Message {
    /// A live singular entry with no comments.
    pub fn new(key: MessageKey, msgstr: impl Into<String>) -> Self {
        Self {
            key,
            msgid_plural: None,
            translation: Translation::Singular(msgstr.into()),
            comments: Comments::default(),
            obsolete: false,
        }
    }

    /// A live plural entry with no comments.
    pub fn plural(key: MessageKey, msgid_plural: impl Into<String>, forms: Vec<String>) -> Self {
        Self {
            key,
            msgid_plural: Some(msgid_plural.into()),
            translation: Translation::Plural(forms),
            comments: Comments::default(),
            obsolete: false,
        }
    }

    /// Returns `true` if the values (plural source and slots) match,
    /// regardless of key.
    pub fn same_value(&self, other: &Message) -> bool {
        self.msgid_plural == other.msgid_plural && self.translation == other.translation
    }

    /// Fold a later duplicate of this entry into `self`: content from the
    /// later occurrence, comments unioned.
    pub fn absorb(&mut self, later: Message) {
        self.msgid_plural = later.msgid_plural;
        self.translation = later.translation;
        self.obsolete = later.obsolete;
        self.comments.absorb(&later.comments);
    }
}
