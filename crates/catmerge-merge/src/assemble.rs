use std::collections::HashMap;

use catmerge_catalog::{Catalog, MessageKey};

use crate::classify::Classification;
use crate::conflict::{MergedEntry, Origin};

/// Entries whose value is the same in every input that has the key live.
///
/// Covers keys present in any of the three catalogs, including keys only
/// one side has (those trivially agree). The entry is taken from Local if
/// it has the key, else Other, else Base. Order: Local's, then Other's new
/// keys, then Base-only keys.
pub fn unchanged_entries(base: &Catalog, local: &Catalog, other: &Catalog) -> Vec<MergedEntry> {
    let base_index = base.index();
    let local_index = local.index();
    let other_index = other.index();

    let candidates = local
        .live()
        .chain(other.live().filter(|m| !local_index.contains_key(&m.key)))
        .chain(
            base.live()
                .filter(|m| !local_index.contains_key(&m.key) && !other_index.contains_key(&m.key)),
        );

    candidates
        .filter(|m| {
            [&base_index, &local_index, &other_index]
                .iter()
                .filter_map(|index| index.get(&m.key))
                .all(|present| present.same_value(m))
        })
        .map(|m| MergedEntry::resolved(m.clone(), Origin::Unchanged))
        .collect()
}

/// The raw merge: every entry the assembler produced, at most one per key.
#[derive(Clone, Debug, Default)]
pub struct RawMerge {
    entries: Vec<MergedEntry>,
}

impl RawMerge {
    pub fn entries(&self) -> &[MergedEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<MergedEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn rank(origin: Origin) -> u8 {
    match origin {
        Origin::Unchanged => 0,
        Origin::Local | Origin::Other | Origin::Both => 1,
        Origin::Conflict => 2,
    }
}

/// Union the unchanged entries with the classified changes.
///
/// When a key occurs more than once the higher-ranked entry replaces the
/// lower one in place: conflict over single-side change over unchanged.
/// The position is that of the key's first occurrence.
pub fn assemble(unchanged: Vec<MergedEntry>, classification: Classification) -> RawMerge {
    let Classification {
        conflicts,
        both,
        local_only,
        other_only,
    } = classification;

    let mut entries: Vec<MergedEntry> = Vec::new();
    let mut index: HashMap<MessageKey, usize> = HashMap::new();

    let all = unchanged
        .into_iter()
        .chain(local_only)
        .chain(other_only)
        .chain(both)
        .chain(conflicts);

    for entry in all {
        match index.get(&entry.key) {
            Some(&pos) => {
                if rank(entry.origin) >= rank(entries[pos].origin) {
                    entries[pos] = entry;
                }
            }
            None => {
                index.insert(entry.key.clone(), entries.len());
                entries.push(entry);
            }
        }
    }

    tracing::debug!(entries = entries.len(), "assembled raw merge");
    RawMerge { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catmerge_catalog::{Message, Translation};

    use crate::classify::{classify, BranchChanges};
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

    fn value(raw: &RawMerge, key: &str) -> MergeValue {
        let key = MessageKey::new(key);
        raw.entries()
            .iter()
            .find(|e| e.key == key)
            .unwrap()
            .value
            .clone()
    }

    #[test]
    fn unchanged_excludes_changed_keys() {
        let base = catalog(&[("same", "s"), ("changed", "old")]);
        let local = catalog(&[("same", "s"), ("changed", "new")]);
        let unchanged = unchanged_entries(&base, &local, &base);
        let keys: Vec<&str> = unchanged.iter().map(|e| e.key.msgid.as_str()).collect();
        assert_eq!(keys, vec!["same"]);
    }

    #[test]
    fn unchanged_covers_one_sided_keys() {
        let base = catalog(&[("gone", "g")]);
        let local = catalog(&[("l", "1")]);
        let other = catalog(&[("o", "2")]);
        let keys: Vec<String> = unchanged_entries(&base, &local, &other)
            .into_iter()
            .map(|e| e.key.msgid)
            .collect();
        assert_eq!(keys, vec!["l", "o", "gone"]);
    }

    #[test]
    fn unchanged_prefers_local_metadata() {
        let base = catalog(&[("k", "v")]);
        let mut local_msg = Message::new(MessageKey::new("k"), "v");
        local_msg.comments.references.push("local.c:1".into());
        let local = Catalog::from_parts(None, vec![local_msg]);
        let unchanged = unchanged_entries(&base, &local, &base);
        assert_eq!(unchanged[0].comments.references, vec!["local.c:1"]);
    }

    #[test]
    fn conflict_beats_unchanged_and_single_side() {
        let key = MessageKey::new("k");
        let unchanged = vec![MergedEntry::resolved(
            Message::new(key.clone(), "base"),
            Origin::Unchanged,
        )];
        let classification = Classification {
            conflicts: vec![MergedEntry::conflict(
                &Message::new(key.clone(), "L"),
                &Message::new(key.clone(), "O"),
            )],
            local_only: vec![MergedEntry::resolved(Message::new(key, "L"), Origin::Local)],
            ..Default::default()
        };
        let raw = assemble(unchanged, classification);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw.entries()[0].origin, Origin::Conflict);
    }

    #[test]
    fn assembles_disjoint_scenario() {
        let base = catalog(&[("k1", "Hello"), ("k2", "World")]);
        let local = catalog(&[("k1", "Hi"), ("k2", "World")]);
        let other = catalog(&[("k1", "Hello"), ("k2", "Planet")]);
        let classification = classify(
            &BranchChanges::extract(&local, &base),
            &BranchChanges::extract(&other, &base),
        );
        let raw = assemble(unchanged_entries(&base, &local, &other), classification);
        assert_eq!(raw.len(), 2);
        assert_eq!(value(&raw, "k1"), MergeValue::Resolved(Translation::Singular("Hi".into())));
        assert_eq!(
            value(&raw, "k2"),
            MergeValue::Resolved(Translation::Singular("Planet".into()))
        );
        let order: Vec<&str> = raw.entries().iter().map(|e| e.key.msgid.as_str()).collect();
        assert_eq!(order, vec!["k1", "k2"]);
    }
}
