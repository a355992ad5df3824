//! Merged entries and the conflict marker convention.
//!
//! Inside the pipeline a conflict is a [`MergeValue::Conflict`] holding both
//! variants. Only when the result is turned back into a catalog is it
//! collapsed to a single value with msgcat-style markers:
//!
//! ```text
//! #-#-#-#-#  local  #-#-#-#-#
//! <local value>
//! #-#-#-#-#  other  #-#-#-#-#
//! <other value>
//! ```

use serde::Serialize;

use catmerge_catalog::{Catalog, Comments, Message, MessageKey, Translation};

use crate::config::ConflictLabels;

/// Delimiter framing each variant label.
pub const CONFLICT_MARKER: &str = "#-#-#-#-#";

/// Substring whose presence in a value means a conflict is unresolved.
pub const CONFLICT_SCAN: &str = "#-#-#";

/// Value of a merged entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeValue {
    Resolved(Translation),
    Conflict { local: Translation, other: Translation },
}

/// Where a merged entry's value came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    /// Same value in every input that has the key.
    Unchanged,
    /// Changed on the local branch only.
    Local,
    /// Changed on the other branch only.
    Other,
    /// Changed identically on both branches.
    Both,
    /// Changed differently on both branches.
    Conflict,
}

/// An entry of the merge result before serialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergedEntry {
    pub key: MessageKey,
    pub msgid_plural: Option<String>,
    pub value: MergeValue,
    pub comments: Comments,
    pub origin: Origin,
}

impl MergedEntry {
    /// Wrap a resolved entry.
    pub fn resolved(message: Message, origin: Origin) -> Self {
        Self {
            key: message.key,
            msgid_plural: message.msgid_plural,
            value: MergeValue::Resolved(message.translation),
            comments: message.comments,
            origin,
        }
    }

    /// Pair two incompatible variants. Metadata comes from the local entry,
    /// with the other entry's comments unioned in. If either side is plural
    /// the entry is plural, with that side's `msgid_plural` (Local's when
    /// both are).
    pub fn conflict(local: &Message, other: &Message) -> Self {
        let mut comments = local.comments.clone();
        comments.absorb(&other.comments);
        comments.previous.clone_from(&local.comments.previous);
        Self {
            key: local.key.clone(),
            msgid_plural: plural_source(local)
                .or_else(|| plural_source(other))
                .map(str::to_owned),
            value: MergeValue::Conflict {
                local: local.translation.clone(),
                other: other.translation.clone(),
            },
            comments,
            origin: Origin::Conflict,
        }
    }

    /// Turn the entry into a catalog message. Conflicts are collapsed with
    /// markers and flagged `fuzzy` so gettext tools will not use them.
    pub fn into_message(self, labels: &ConflictLabels) -> Message {
        let mut comments = self.comments;
        let translation = match self.value {
            MergeValue::Resolved(t) => t,
            MergeValue::Conflict { local, other } => {
                comments.add_flag("fuzzy");
                collapse(&local, &other, labels)
            }
        };
        Message {
            key: self.key,
            msgid_plural: self.msgid_plural,
            translation,
            comments,
            obsolete: false,
        }
    }
}

fn plural_source(message: &Message) -> Option<&str> {
    match message.translation {
        Translation::Plural(_) => message.msgid_plural.as_deref(),
        Translation::Singular(_) => None,
    }
}

/// Collapse two variants into one value, slot by slot.
///
/// Two singular values stay singular. Otherwise the result is plural with
/// as many slots as the longer side; a singular value fills slot 0 and a
/// slot missing on one side is treated as empty.
pub fn collapse(local: &Translation, other: &Translation, labels: &ConflictLabels) -> Translation {
    let slot = |t: &Translation, i: usize| t.slots().get(i).cloned().unwrap_or_default();
    match (local, other) {
        (Translation::Singular(l), Translation::Singular(o)) => {
            Translation::Singular(render_conflict(l, o, labels))
        }
        _ => {
            let count = local.slots().len().max(other.slots().len());
            Translation::Plural(
                (0..count)
                    .map(|i| render_conflict(&slot(local, i), &slot(other, i), labels))
                    .collect(),
            )
        }
    }
}

/// Render both variants of one value slot with markers.
pub fn render_conflict(local: &str, other: &str, labels: &ConflictLabels) -> String {
    let mut out = String::with_capacity(local.len() + other.len() + 64);
    for (label, text) in [(&labels.local, local), (&labels.other, other)] {
        out.push_str(CONFLICT_MARKER);
        out.push_str("  ");
        out.push_str(label);
        out.push_str("  ");
        out.push_str(CONFLICT_MARKER);
        out.push('\n');
        out.push_str(text);
        if !text.ends_with('\n') {
            out.push('\n');
        }
    }
    // Match the local value's trailing-newline convention.
    if !local.ends_with('\n') {
        out.pop();
    }
    out
}

/// Returns `true` if any line of `content` carries a conflict marker.
pub fn contains_conflict_marker(content: &[u8]) -> bool {
    let needle = CONFLICT_SCAN.as_bytes();
    content
        .split(|&b| b == b'\n')
        .any(|line| line.windows(needle.len()).any(|w| w == needle))
}

/// Keys of live entries whose value still carries a conflict marker.
pub fn find_conflicts(catalog: &Catalog) -> Vec<MessageKey> {
    catalog
        .live()
        .filter(|m| m.translation.slots().iter().any(|s| s.contains(CONFLICT_SCAN)))
        .map(|m| m.key.clone())
        .collect()
}
