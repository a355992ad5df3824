//! Translation catalog model for catmerge.
//!
//! This crate reads, canonicalizes, and writes gettext PO catalogs. It knows
//! nothing about merging; the merge crates operate on the [`Catalog`] values
//! produced here.
//!
//! # Key Types
//!
//! - [`Catalog`] -- Ordered entries plus an optional [`Header`]
//! - [`Message`] / [`MessageKey`] -- A single entry and its `(msgctxt, msgid)` identity
//! - [`Translation`] -- Singular or plural value slots
//! - [`WriteOptions`] -- Output formatting flags for [`write_catalog`]
//!
//! Catalogs are decoded from and encoded back to the charset their header
//! declares; in memory all text is UTF-8.

pub mod catalog;
pub mod encoding;
pub mod error;
pub mod escape;
pub mod header;
pub mod message;
pub mod parse;
pub mod write;

pub use catalog::Catalog;
pub use error::{CatalogError, Result};
pub use header::{Header, HeaderField, HeaderFormat};
pub use message::{Comments, Message, MessageKey, Translation};
pub use parse::parse_catalog;
pub use write::{encode_catalog, write_catalog, write_message, WriteOptions};
