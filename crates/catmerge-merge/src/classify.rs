use catmerge_catalog::{Catalog, Message};
use catmerge_diff::{extract_additions, extract_changes, ChangeSet};

use crate::conflict::{MergedEntry, Origin};

/// What one branch did relative to the ancestor.
///
/// `modified` holds entries whose key is live in the ancestor with a
/// different value; `added` holds entries whose key the ancestor does not
/// have live. Both are immutable once extracted.
#[derive(Clone, Debug, Default)]
pub struct BranchChanges {
    pub modified: ChangeSet,
    pub added: ChangeSet,
}

impl BranchChanges {
    /// Extract the changes of `side` relative to `base`.
    pub fn extract(side: &Catalog, base: &Catalog) -> Self {
        Self {
            modified: extract_changes(side, base),
            added: extract_additions(side, base),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.added.is_empty()
    }
}

/// Result of comparing the two branches' changes.
#[derive(Clone, Debug, Default)]
pub struct Classification {
    /// Keys changed differently on both sides.
    pub conflicts: Vec<MergedEntry>,
    /// Keys changed identically on both sides, collapsed to one entry.
    pub both: Vec<MergedEntry>,
    pub local_only: Vec<MergedEntry>,
    pub other_only: Vec<MergedEntry>,
}

impl Classification {
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Total number of changed keys across all classes.
    pub fn len(&self) -> usize {
        self.conflicts.len() + self.both.len() + self.local_only.len() + self.other_only.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition both branches' changes into conflicts and single-side changes.
///
/// Modifications and additions are classified the same way: a key that
/// only one side touched belongs to that side, a key both sides set to the
/// same value is collapsed, and a key set to different values is a
/// conflict. The latter includes a key the ancestor lacks that both
/// branches introduced with different content.
pub fn classify(local: &BranchChanges, other: &BranchChanges) -> Classification {
    let mut out = Classification::default();
    pair_up(&local.modified, &other.modified, &mut out);
    pair_up(&local.added, &other.added, &mut out);

    tracing::debug!(
        changed = out.len(),
        conflicts = out.conflicts.len(),
        both = out.both.len(),
        local_only = out.local_only.len(),
        other_only = out.other_only.len(),
        "classified changes"
    );
    out
}

fn pair_up(local: &ChangeSet, other: &ChangeSet, out: &mut Classification) {
    for entry in local.iter() {
        match other.get(&entry.key) {
            Some(theirs) if entry.same_value(theirs) => {
                out.both.push(MergedEntry::resolved(combined(entry, theirs), Origin::Both));
            }
            Some(theirs) => {
                tracing::debug!(key = %entry.key, "conflicting change");
                out.conflicts.push(MergedEntry::conflict(entry, theirs));
            }
            None => out
                .local_only
                .push(MergedEntry::resolved(entry.clone(), Origin::Local)),
        }
    }
    for entry in other.iter().filter(|m| !local.contains(&m.key)) {
        out.other_only
            .push(MergedEntry::resolved(entry.clone(), Origin::Other));
    }
}

/// The local entry with the other entry's comments unioned in.
fn combined(local: &Message, other: &Message) -> Message {
    let mut message = local.clone();
    message.comments.absorb(&other.comments);
    message.comments.previous.clone_from(&local.comments.previous);
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use catmerge_catalog::{MessageKey, Translation};

    use crate::conflict::MergeValue;

    fn catalog(pairs: &[(&str, &str)]) -> Catalog {
        Catalog::from_parts(
            None,
            pairs
                .iter()
                .map(|(k, v)| Message::new(MessageKey::new(*k), *v))
                .collect(),
        )
    }

    fn keys(entries: &[MergedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.key.msgid.as_str()).collect()
    }

    #[test]
    fn disjoint_changes_are_single_sided() {
        let base = catalog(&[("k1", "Hello"), ("k2", "World")]);
        let local = catalog(&[("k1", "Hi"), ("k2", "World")]);
        let other = catalog(&[("k1", "Hello"), ("k2", "Planet")]);
        let result = classify(
            &BranchChanges::extract(&local, &base),
            &BranchChanges::extract(&other, &base),
        );
        assert!(!result.has_conflicts());
        assert_eq!(keys(&result.local_only), vec!["k1"]);
        assert_eq!(keys(&result.other_only), vec!["k2"]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn identical_change_collapses() {
        let base = catalog(&[("k", "old")]);
        let both = catalog(&[("k", "new")]);
        let result = classify(
            &BranchChanges::extract(&both, &base),
            &BranchChanges::extract(&both, &base),
        );
        assert!(!result.has_conflicts());
        assert_eq!(keys(&result.both), vec!["k"]);
        assert_eq!(
            result.both[0].value,
            MergeValue::Resolved(Translation::Singular("new".into()))
        );
        assert!(result.local_only.is_empty() && result.other_only.is_empty());
    }

    #[test]
    fn different_changes_conflict() {
        let base = catalog(&[("k1", "Hello")]);
        let local = catalog(&[("k1", "Hi")]);
        let other = catalog(&[("k1", "Hey")]);
        let result = classify(
            &BranchChanges::extract(&local, &base),
            &BranchChanges::extract(&other, &base),
        );
        assert_eq!(keys(&result.conflicts), vec!["k1"]);
        assert_eq!(
            result.conflicts[0].value,
            MergeValue::Conflict {
                local: Translation::Singular("Hi".into()),
                other: Translation::Singular("Hey".into()),
            }
        );
    }

    #[test]
    fn independent_additions_with_different_content_conflict() {
        let base = Catalog::new();
        let local = catalog(&[("new", "L")]);
        let other = catalog(&[("new", "O")]);
        let result = classify(
            &BranchChanges::extract(&local, &base),
            &BranchChanges::extract(&other, &base),
        );
        assert_eq!(keys(&result.conflicts), vec!["new"]);
    }

    #[test]
    fn identical_additions_collapse() {
        let base = Catalog::new();
        let side = catalog(&[("new", "same")]);
        let result = classify(
            &BranchChanges::extract(&side, &base),
            &BranchChanges::extract(&side, &base),
        );
        assert!(!result.has_conflicts());
        assert_eq!(keys(&result.both), vec!["new"]);
    }

    #[test]
    fn identical_change_unions_comments() {
        let base = catalog(&[("k", "old")]);
        let mut local = Message::new(MessageKey::new("k"), "new");
        local.comments.references.push("a.c:1".into());
        let mut other = Message::new(MessageKey::new("k"), "new");
        other.comments.references.push("b.c:2".into());
        let result = classify(
            &BranchChanges::extract(&Catalog::from_parts(None, vec![local]), &base),
            &BranchChanges::extract(&Catalog::from_parts(None, vec![other]), &base),
        );
        assert_eq!(result.both[0].comments.references, vec!["a.c:1", "b.c:2"]);
    }

    #[test]
    fn no_changes() {
        let base = catalog(&[("a", "1")]);
        let local = BranchChanges::extract(&base, &base);
        assert!(local.is_empty());
        assert!(classify(&local, &local).is_empty());
    }
}
