//! # BAST - Binary AST
//!
//! A compact binary encoding of a parsed model ([`ast::Nebula`]) that can be
//! decoded back to an equal tree without re-running the parser.
//!
//! ## File layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ HEADER (32 bytes, see [`Header`])                              │
//! │                                                               │
//! │ magic "BAST" | version | flags | revision                     │
//! │ string_table_offset | root_offset | file_size | checksum      │
//! │ reserved                                                      │
//! ├───────────────────────────────────────────────────────────────┤
//! │ STRING TABLE (at offset 32)                                    │
//! │                                                               │
//! │ count | count × (byte_len | UTF-8)                            │
//! ├───────────────────────────────────────────────────────────────┤
//! │ PATH TABLE (directly after the string table)                   │
//! │                                                               │
//! │ count | count × (n | n × string_index)                        │
//! ├───────────────────────────────────────────────────────────────┤
//! │ NODE STREAM (at root_offset, runs to file_size)                │
//! │                                                               │
//! │ Nebula | count | definition*                                   │
//! │                                                               │
//! │ definition: tag|meta [location] [metadata] fields [children]  │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fixed-width integers are little-endian; every count, index and length in
//! the body is an LEB128 varint. Strings are interned: a node refers to a
//! string by its table index. Dotted paths used more than once go through the
//! path table, others are written inline.
//!
//! The checksum is Adler-32 over everything after the header.
//!
//! ## Usage
//!
//! ```rust
//! use ast::{Container, Definition, Nebula};
//! use config::CodecConfig;
//!
//! let model = Nebula::new(vec![Definition::Domain(Container::new("Shop"))]);
//! let bytes = bast::encode(&model, &CodecConfig::default()).unwrap();
//! assert_eq!(bast::decode(&bytes).unwrap(), model);
//! ```

mod checksum;
mod error;
mod format;
mod inspect;
mod location;
mod reader;
mod tables;
pub mod tags;
mod writer;

pub use checksum::{adler32, Adler32};
pub use error::{DecodeError, DecodeErrors, EncodeError, HeaderError};
pub use format::{
    Flags, Header, FORMAT_REVISION, HEADER_SIZE, MAGIC, MAX_SIZE, STRING_TABLE_OFFSET, VERSION,
};
pub use inspect::{inspect, Summary};
pub use location::{LocationDecoder, LocationEncoder};
pub use reader::{decode, read_header, MAX_DEPTH};
pub use tables::{PathTable, PathTableBuilder, StringTable, StringTableBuilder};
pub use writer::encode;

#[cfg(test)]
mod tests;
