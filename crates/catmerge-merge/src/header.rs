use catmerge_catalog::{Catalog, Header, Message};

use crate::config::ConflictLabels;
use crate::conflict::MergedEntry;

/// Build the final catalog: Local's header, the reconciled live entries
/// (conflicts collapsed to marker form), then the carried graveyard.
///
/// Base's and Other's headers are never consulted. Field reordering, if
/// configured, is applied by the writer.
pub fn reconcile_header(
    entries: Vec<MergedEntry>,
    graveyard: Vec<Message>,
    local_header: Option<Header>,
    labels: &ConflictLabels,
) -> Catalog {
    let messages = entries
        .into_iter()
        .map(|entry| entry.into_message(labels))
        .chain(graveyard)
        .collect();
    Catalog::from_parts(local_header, messages)
}
