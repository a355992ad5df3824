use std::collections::{HashMap, HashSet};
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};

use crate::encoding::decode;
use crate::error::Result;
use crate::header::Header;
use crate::message::{Message, MessageKey};
use crate::parse::parse_catalog;

/// An ordered collection of entries plus at most one header.
///
/// Live and graveyard (`#~`) entries share the same list; graveyard entries
/// are flagged with [`Message::obsolete`]. The header is never stored in
/// the entry list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    header: Option<Header>,
    messages: Vec<Message>,
    /// Position of the first live entry for each key.
    live_index: HashMap<MessageKey, usize>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a catalog from a header and entries. Any header-keyed live
    /// entry in `messages` is dropped.
    pub fn from_parts(header: Option<Header>, messages: Vec<Message>) -> Self {
        let messages = messages
            .into_iter()
            .filter(|m| m.obsolete || !m.key.is_header())
            .collect();
        Self::indexed(header, messages)
    }

    fn indexed(header: Option<Header>, messages: Vec<Message>) -> Self {
        let mut live_index = HashMap::with_capacity(messages.len());
        for (pos, message) in messages.iter().enumerate() {
            if !message.obsolete {
                live_index.entry(message.key.clone()).or_insert(pos);
            }
        }
        Self {
            header,
            messages,
            live_index,
        }
    }

    /// Parse PO text.
    pub fn parse(input: &str) -> Result<Self> {
        parse_catalog(input)
    }

    /// Parse PO bytes in the charset the header declares, UTF-8 if it
    /// declares none.
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        Self::parse(&decode(input)?)
    }

    /// Read and parse a catalog file.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    /// The encoding the catalog is written in: the header's charset if it
    /// names one, otherwise UTF-8.
    pub fn encoding(&self) -> &'static Encoding {
        self.header
            .as_ref()
            .and_then(Header::charset)
            .and_then(|label| Encoding::for_label(label.as_bytes()))
            .map_or(UTF_8, Encoding::output_encoding)
    }

    /// All entries, live and graveyard, in order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Live entries in order.
    pub fn live(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| !m.obsolete)
    }

    /// Graveyard entries in order.
    pub fn obsolete(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.obsolete)
    }

    /// Number of entries, excluding the header.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Find a live entry by key.
    pub fn get(&self, key: &MessageKey) -> Option<&Message> {
        self.live_index.get(key).map(|&pos| &self.messages[pos])
    }

    pub fn contains_key(&self, key: &MessageKey) -> bool {
        self.live_index.contains_key(key)
    }

    /// Map of live keys to entries, for repeated lookups.
    pub fn index(&self) -> HashMap<&MessageKey, &Message> {
        self.live().map(|m| (&m.key, m)).collect()
    }

    /// Copy of the header, leaving the catalog untouched. Calling this any
    /// number of times yields the same header. The entry list never holds
    /// the header, so the catalog itself is the header-less view.
    pub fn extract_header(&self) -> Option<Header> {
        self.header.clone()
    }

    /// Deduplicate entries by key.
    ///
    /// A duplicate keeps the position of its first occurrence, takes content
    /// from its last occurrence, and unions comments across all of them.
    /// Live and graveyard entries are deduplicated separately; a graveyard
    /// entry whose key is also live is dropped.
    pub fn canonicalize(self) -> Catalog {
        let Self {
            header, messages, ..
        } = self;

        let mut live: Vec<Message> = Vec::new();
        let mut live_index: HashMap<MessageKey, usize> = HashMap::new();
        let mut dead: Vec<Message> = Vec::new();
        let mut dead_index: HashMap<MessageKey, usize> = HashMap::new();

        for message in messages {
            let (list, index) = if message.obsolete {
                (&mut dead, &mut dead_index)
            } else {
                (&mut live, &mut live_index)
            };
            match index.get(&message.key) {
                Some(&pos) => {
                    tracing::trace!(key = %message.key, "merging duplicate entry");
                    list[pos].absorb(message);
                }
                None => {
                    index.insert(message.key.clone(), list.len());
                    list.push(message);
                }
            }
        }

        dead.retain(|m| !live_index.contains_key(&m.key));
        live.extend(dead);

        Self::indexed(header, live)
    }

    /// Returns `true` if no two live (or two graveyard) entries share a key.
    pub fn is_canonical(&self) -> bool {
        let mut seen_live = HashSet::new();
        let mut seen_dead = HashSet::new();
        self.messages.iter().all(|m| {
            if m.obsolete {
                seen_dead.insert(&m.key)
            } else {
                seen_live.insert(&m.key)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Translation;

    fn msg(id: &str, value: &str) -> Message {
        Message::new(MessageKey::new(id), value)
    }

    #[test]
    fn canonicalize_keeps_first_position_last_content() {
        let catalog = Catalog::from_parts(
            None,
            vec![msg("a", "1"), msg("b", "2"), msg("a", "3"), msg("c", "4")],
        )
        .canonicalize();

        let keys: Vec<&str> = catalog.live().map(|m| m.key.msgid.as_str()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(
            catalog.get(&MessageKey::new("a")).unwrap().translation,
            Translation::Singular("3".into())
        );
        assert!(catalog.is_canonical());
    }

    #[test]
    fn canonicalize_unions_comments() {
        let mut first = msg("a", "1");
        first.comments.references.push("x.c:1".into());
        let mut second = msg("a", "1");
        second.comments.references.push("y.c:2".into());
        let catalog = Catalog::from_parts(None, vec![first, second]).canonicalize();
        assert_eq!(
            catalog.get(&MessageKey::new("a")).unwrap().comments.references,
            vec!["x.c:1", "y.c:2"]
        );
    }

    #[test]
    fn canonicalize_drops_graveyard_shadowed_by_live() {
        let mut dead = msg("a", "old");
        dead.obsolete = true;
        let mut other_dead = msg("z", "gone");
        other_dead.obsolete = true;
        let catalog =
            Catalog::from_parts(None, vec![dead, msg("a", "new"), other_dead]).canonicalize();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.obsolete().count(), 1);
        assert_eq!(catalog.obsolete().next().unwrap().key.msgid, "z");
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let catalog =
            Catalog::from_parts(None, vec![msg("a", "1"), msg("a", "2"), msg("b", "3")]);
        let once = catalog.canonicalize();
        let twice = once.clone().canonicalize();
        assert_eq!(once, twice);
    }

    #[test]
    fn from_parts_drops_header_entries() {
        let catalog = Catalog::from_parts(None, vec![msg("", "Language: de\n"), msg("a", "1")]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.header().is_none());
    }

    #[test]
    fn header_extraction_is_idempotent() {
        let catalog = Catalog::from_parts(Some(Header::new("Language: de\n")), vec![msg("a", "1")]);
        assert_eq!(catalog.extract_header(), Some(Header::new("Language: de\n")));
        assert_eq!(catalog.extract_header(), catalog.extract_header());
        assert_eq!(catalog.len(), 1);
        assert!(catalog.messages().iter().all(|m| !m.key.is_header()));
    }

    #[test]
    fn from_bytes_rejects_invalid_utf8() {
        let err = Catalog::from_bytes(&[0x6d, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, crate::CatalogError::Encoding(_)));
    }

    #[test]
    fn from_bytes_decodes_declared_charset() {
        let mut input = b"msgid \"\"\nmsgstr \"Content-Type: text/plain; charset=ISO-8859-1\\n\"\n\n".to_vec();
        input.extend_from_slice(b"msgid \"size\"\nmsgstr \"Gr\xf6\xdfe\"\n");
        let catalog = Catalog::from_bytes(&input).unwrap();
        assert_eq!(
            catalog.get(&MessageKey::new("size")).unwrap().translation,
            Translation::Singular("Größe".into())
        );
        assert_eq!(catalog.encoding().name(), "windows-1252");
    }

    #[test]
    fn encoding_defaults_to_utf8() {
        assert_eq!(Catalog::new().encoding(), UTF_8);
        let template = Header::new("Content-Type: text/plain; charset=CHARSET\n");
        assert_eq!(Catalog::from_parts(Some(template), Vec::new()).encoding(), UTF_8);
    }

    #[test]
    fn get_ignores_graveyard() {
        let mut dead = msg("gone", "x");
        dead.obsolete = true;
        let catalog = Catalog::from_parts(None, vec![dead, msg("live", "y")]);
        assert!(!catalog.contains_key(&MessageKey::new("gone")));
        assert_eq!(
            catalog.get(&MessageKey::new("live")).unwrap().translation,
            Translation::Singular("y".into())
        );
    }

    #[test]
    fn get_finds_first_live_duplicate() {
        let catalog = Catalog::from_parts(None, vec![msg("a", "1"), msg("a", "2")]);
        assert_eq!(
            catalog.get(&MessageKey::new("a")).unwrap().translation,
            Translation::Singular("1".into())
        );
        let canonical = catalog.canonicalize();
        assert_eq!(
            canonical.get(&MessageKey::new("a")).unwrap().translation,
            Translation::Singular("2".into())
        );
    }
}
