use std::collections::{HashMap, HashSet};

use catmerge_catalog::{Catalog, Message, MessageKey};

use crate::assemble::RawMerge;
use crate::conflict::MergedEntry;
use crate::error::{MergeError, Result};
use crate::stage::Stage;

/// The keys allowed in the output: live keys of Local, then live keys of
/// Other that Local lacks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateKeys {
    keys: Vec<MessageKey>,
    set: HashSet<MessageKey>,
}

impl TemplateKeys {
    pub fn from_catalogs(local: &Catalog, other: &Catalog) -> Self {
        let mut keys = Vec::new();
        let mut set = HashSet::new();
        for message in local.live().chain(other.live()) {
            if set.insert(message.key.clone()) {
                keys.push(message.key.clone());
            }
        }
        Self { keys, set }
    }

    pub fn contains(&self, key: &MessageKey) -> bool {
        self.set.contains(key)
    }

    pub fn keys(&self) -> &[MessageKey] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Output of template reconciliation.
#[derive(Clone, Debug, Default)]
pub struct Reconciled {
    /// One entry per template key, in template order.
    pub entries: Vec<MergedEntry>,
    /// Raw entries whose key was not in the template.
    pub dropped: usize,
}

/// Filter the raw merge down to the template's keys.
///
/// Keys are matched exactly; an entry is never paired with a template key
/// that merely resembles its own. Every template key must have an entry in
/// the raw merge, otherwise an earlier stage lost data and the merge fails.
pub fn reconcile_template(raw: RawMerge, template: &TemplateKeys) -> Result<Reconciled> {
    let mut dropped = 0;
    let mut by_key: HashMap<MessageKey, MergedEntry> = HashMap::with_capacity(raw.len());
    for entry in raw.into_entries() {
        if template.contains(&entry.key) {
            by_key.insert(entry.key.clone(), entry);
        } else {
            tracing::trace!(key = %entry.key, "dropping stale entry");
            dropped += 1;
        }
    }

    let entries = template
        .keys()
        .iter()
        .map(|key| {
            by_key.remove(key).ok_or_else(|| {
                MergeError::stage(Stage::Template, format!("no merged entry for key {key}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(kept = entries.len(), dropped, "reconciled against template");
    Ok(Reconciled { entries, dropped })
}

/// Graveyard entries to append after the live result: Local's, then
/// Other's that Local lacks, skipping any key that is live in the result.
pub fn carry_graveyard(local: &Catalog, other: &Catalog, live: &TemplateKeys) -> Vec<Message> {
    let mut seen = HashSet::new();
    local
        .obsolete()
        .chain(other.obsolete())
        .filter(|m| !live.contains(&m.key) && seen.insert(m.key.clone()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble;
    use crate::classify::Classification;
    use crate::conflict::Origin;

    fn catalog(pairs: &[(&str, &str)]) -> Catalog {
        Catalog::from_parts(
            None,
            pairs
                .iter()
                .map(|(k, v)| Message::new(MessageKey::new(*k), *v))
                .collect(),
        )
    }

    fn raw(keys: &[&str]) -> RawMerge {
        let unchanged = keys
            .iter()
            .map(|k| MergedEntry::resolved(Message::new(MessageKey::new(*k), "v"), Origin::Unchanged))
            .collect();
        assemble(unchanged, Classification::default())
    }

    fn dead(key: &str, value: &str) -> Message {
        let mut m = Message::new(MessageKey::new(key), value);
        m.obsolete = true;
        m
    }

    #[test]
    fn template_order_is_local_then_other() {
        let local = catalog(&[("b", "1"), ("a", "1")]);
        let other = catalog(&[("c", "1"), ("a", "2")]);
        let template = TemplateKeys::from_catalogs(&local, &other);
        let keys: Vec<&str> = template.keys().iter().map(|k| k.msgid.as_str()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn template_ignores_graveyard() {
        let local = Catalog::from_parts(None, vec![dead("x", "1")]);
        let template = TemplateKeys::from_catalogs(&local, &Catalog::new());
        assert!(template.is_empty());
    }

    #[test]
    fn stale_entries_dropped() {
        let template = TemplateKeys::from_catalogs(&catalog(&[("a", "1")]), &catalog(&[("b", "1")]));
        let result = reconcile_template(raw(&["stale", "b", "a"]), &template).unwrap();
        let keys: Vec<&str> = result.entries.iter().map(|e| e.key.msgid.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(result.dropped, 1);
    }

    #[test]
    fn exact_key_matching_only() {
        let template = TemplateKeys::from_catalogs(&catalog(&[("Open file", "1")]), &Catalog::new());
        let err = reconcile_template(raw(&["Open file…"]), &template).unwrap_err();
        assert!(matches!(err, MergeError::Stage { stage: Stage::Template, .. }));
    }

    #[test]
    fn graveyard_local_first_then_other() {
        let local = Catalog::from_parts(None, vec![dead("x", "local")]);
        let other = Catalog::from_parts(None, vec![dead("x", "other"), dead("y", "other")]);
        let carried = carry_graveyard(&local, &other, &TemplateKeys::default());
        assert_eq!(carried, vec![dead("x", "local"), dead("y", "other")]);
    }

    #[test]
    fn graveyard_skips_live_keys() {
        let local = catalog(&[("x", "alive")]);
        let other = Catalog::from_parts(None, vec![dead("x", "old")]);
        let template = TemplateKeys::from_catalogs(&local, &other);
        assert!(carry_graveyard(&local, &other, &template).is_empty());
    }
}
