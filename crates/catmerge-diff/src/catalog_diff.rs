//! Entry-level diff between two catalogs, and change-set extraction.
//!
//! Only live entries take part. Graveyard (`#~`) entries are neither
//! additions nor removals: an entry that moved to the graveyard counts as
//! removed, and one that came back counts as added.

use std::collections::HashMap;

use catmerge_catalog::{Catalog, Message, MessageKey};

/// The result of comparing two catalogs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CatalogDiff {
    /// The list of entry changes.
    pub changes: Vec<EntryChange>,
}

impl CatalogDiff {
    /// Create an empty catalog diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// A single change between two catalogs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryChange {
    /// A key only present in the new catalog.
    Added { entry: Message },
    /// A key only present in the old catalog.
    Removed { entry: Message },
    /// A key present in both whose value differs.
    Modified { old: Message, new: Message },
}

/// Compute the diff between two catalogs.
///
/// Removals and modifications follow the order of `old`; additions follow
/// the order of `new` and come last.
pub fn diff_catalogs(old: &Catalog, new: &Catalog) -> CatalogDiff {
    let mut changes = Vec::new();
    let new_index = new.index();
    let old_index = old.index();

    for old_entry in old.live() {
        match new_index.get(&old_entry.key) {
            Some(new_entry) => {
                if !old_entry.same_value(new_entry) {
                    changes.push(EntryChange::Modified {
                        old: old_entry.clone(),
                        new: (*new_entry).clone(),
                    });
                }
            }
            None => changes.push(EntryChange::Removed {
                entry: old_entry.clone(),
            }),
        }
    }

    for new_entry in new.live() {
        if !old_index.contains_key(&new_entry.key) {
            changes.push(EntryChange::Added {
                entry: new_entry.clone(),
            });
        }
    }

    CatalogDiff { changes }
}

/// The entries of one branch that changed relative to the ancestor.
///
/// Immutable once built; entries keep the branch's order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeSet {
    entries: Vec<Message>,
    index: HashMap<MessageKey, usize>,
}

impl ChangeSet {
    pub fn from_entries(entries: Vec<Message>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, m)| (m.key.clone(), i))
            .collect();
        Self { entries, index }
    }

    pub fn get(&self, key: &MessageKey) -> Option<&Message> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, key: &MessageKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Entries of `side` whose key is live in `base` but whose value differs.
///
/// New keys, removed keys, and graveyard entries on either side are not
/// changes in this sense; they are handled by the unchanged-entry set and
/// the template filter.
pub fn extract_changes(side: &Catalog, base: &Catalog) -> ChangeSet {
    let mut entries: Vec<Message> = diff_catalogs(base, side)
        .changes
        .into_iter()
        .filter_map(|change| match change {
            EntryChange::Modified { new, .. } => Some(new),
            _ => None,
        })
        .collect();

    // Keep the branch's order rather than the ancestor's.
    let order: HashMap<&MessageKey, usize> = side
        .live()
        .enumerate()
        .map(|(i, m)| (&m.key, i))
        .collect();
    entries.sort_by_key(|m| order.get(&m.key).copied().unwrap_or(usize::MAX));

    tracing::trace!(changed = entries.len(), "extracted change set");
    ChangeSet::from_entries(entries)
}

/// Entries of `side` whose key is not live in `base`, in the branch's order.
pub fn extract_additions(side: &Catalog, base: &Catalog) -> ChangeSet {
    let entries: Vec<Message> = diff_catalogs(base, side)
        .changes
        .into_iter()
        .filter_map(|change| match change {
            EntryChange::Added { entry } => Some(entry),
            _ => None,
        })
        .collect();
    ChangeSet::from_entries(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catmerge_catalog::Translation;

    fn catalog(pairs: &[(&str, &str)]) -> Catalog {
        Catalog::from_parts(
            None,
            pairs
                .iter()
                .map(|(k, v)| Message::new(MessageKey::new(*k), *v))
                .collect(),
        )
    }

    #[test]
    fn identical_catalogs_no_diff() {
        let c = catalog(&[("a", "1"), ("b", "2")]);
        assert!(diff_catalogs(&c, &c).is_empty());
    }

    #[test]
    fn empty_to_populated() {
        let diff = diff_catalogs(&Catalog::new(), &catalog(&[("x", "1"), ("y", "2")]));
        assert_eq!(diff.len(), 2);
        assert!(diff
            .changes
            .iter()
            .all(|c| matches!(c, EntryChange::Added { .. })));
    }

    #[test]
    fn mixed_changes() {
        let old = catalog(&[("keep", "k"), ("modify", "old"), ("remove", "r")]);
        let new = catalog(&[("keep", "k"), ("modify", "new"), ("added", "a")]);
        let diff = diff_catalogs(&old, &new);
        assert_eq!(diff.len(), 3);
        let kinds: Vec<(&str, &str)> = diff
            .changes
            .iter()
            .map(|c| match c {
                EntryChange::Added { entry } => ("added", entry.key.msgid.as_str()),
                EntryChange::Removed { entry } => ("removed", entry.key.msgid.as_str()),
                EntryChange::Modified { new, .. } => ("modified", new.key.msgid.as_str()),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![("modified", "modify"), ("removed", "remove"), ("added", "added")]
        );
    }

    #[test]
    fn comment_only_change_is_not_modification() {
        let old = catalog(&[("a", "1")]);
        let mut moved = Message::new(MessageKey::new("a"), "1");
        moved.comments.references.push("moved.c:9".into());
        let new = Catalog::from_parts(None, vec![moved]);
        assert!(diff_catalogs(&old, &new).is_empty());
    }

    #[test]
    fn extract_changes_only_modified_keys() {
        let base = catalog(&[("a", "1"), ("b", "2"), ("gone", "x")]);
        let side = catalog(&[("a", "1"), ("b", "22"), ("new", "n")]);
        let changes = extract_changes(&side, &base);
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes.get(&MessageKey::new("b")).unwrap().translation,
            Translation::Singular("22".into())
        );
        assert!(!changes.contains(&MessageKey::new("new")));
    }

    #[test]
    fn extract_changes_ignores_graveyard() {
        let mut dead = Message::new(MessageKey::new("a"), "old");
        dead.obsolete = true;
        let base = Catalog::from_parts(None, vec![dead.clone()]);
        let side = catalog(&[("a", "new")]);
        assert!(extract_changes(&side, &base).is_empty());

        let base = catalog(&[("a", "1")]);
        let mut revived = dead;
        revived.translation = Translation::Singular("2".into());
        let side = Catalog::from_parts(None, vec![revived]);
        assert!(extract_changes(&side, &base).is_empty());
    }

    #[test]
    fn extract_changes_keeps_branch_order() {
        let base = catalog(&[("a", "1"), ("b", "2")]);
        let side = catalog(&[("b", "20"), ("a", "10")]);
        let set = extract_changes(&side, &base);
        let keys: Vec<&str> = set
            .iter()
            .map(|m| m.key.msgid.as_str())
            .collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn extract_additions_only_new_keys() {
        let base = catalog(&[("a", "1")]);
        let side = catalog(&[("z", "26"), ("a", "2"), ("m", "13")]);
        let set = extract_additions(&side, &base);
        let keys: Vec<&str> = set
            .iter()
            .map(|m| m.key.msgid.as_str())
            .collect();
        assert_eq!(keys, vec!["z", "m"]);
    }
}
