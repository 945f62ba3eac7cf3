//! String and path tables.
//!
//! Both tables are written once, right after the header, and loaded eagerly
//! by the reader. Nodes refer to entries by varint index.
//!
//! ```text
//! string table: varint count | count × (varint byte_len | UTF-8 bytes)
//! path table:   varint count | count × (varint n | n × varint string_index)
//! ```

use std::collections::HashMap;

use ast::PathIdentifier;
use bytebuf::{ByteReader, ByteWriter};

use crate::error::DecodeError;
use crate::reader::read_count;

/// Interns strings in first-sight order.
#[derive(Debug, Default)]
pub struct StringTableBuilder {
    index: HashMap<String, u32>,
    strings: Vec<String>,
}

impl StringTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `s`, adding it on first sight.
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&i) = self.index.get(s) {
            return i;
        }
        let i = self.strings.len() as u32;
        self.index.insert(s.to_owned(), i);
        self.strings.push(s.to_owned());
        i
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    #[must_use]
    pub fn freeze(self) -> StringTable {
        StringTable {
            strings: self.strings,
        }
    }
}

/// An immutable, ordered table of unique strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringTable {
    strings: Vec<String>,
}

impl StringTable {
    pub fn write_to(&self, w: &mut ByteWriter) {
        w.write_varint(self.strings.len() as u64);
        for s in &self.strings {
            w.write_str(s);
        }
    }

    /// Loads the whole table. Duplicate entries are rejected.
    pub fn read(r: &mut ByteReader<'_>) -> Result<Self, DecodeError> {
        let count = read_count(r)?;
        let mut strings = Vec::with_capacity(count);
        let mut seen = HashMap::with_capacity(count);
        for i in 0..count {
            let offset = r.position();
            let s = r.read_string()?;
            if let Some(first) = seen.insert(s.clone(), i) {
                return Err(DecodeError::Malformed {
                    offset,
                    reason: format!("string table entry {i} duplicates entry {first}"),
                });
            }
            strings.push(s);
        }
        Ok(Self { strings })
    }

    /// Resolves `index`; `at` is the offset the index was read from.
    pub fn lookup(&self, index: u64, at: usize) -> Result<&str, DecodeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map(String::as_str)
            .ok_or(DecodeError::TableIndex {
                table: "string",
                index,
                size: self.strings.len(),
                offset: at,
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.strings.iter().map(String::as_str)
    }
}

/// Counts path occurrences during the collect pass.
#[derive(Debug, Default)]
pub struct PathTableBuilder {
    counts: HashMap<PathIdentifier, u32>,
    order: Vec<PathIdentifier>,
}

impl PathTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `path`. Empty paths are never tabled.
    pub fn observe(&mut self, path: &PathIdentifier) {
        if path.is_empty() {
            return;
        }
        match self.counts.get_mut(path) {
            Some(n) => *n += 1,
            None => {
                self.counts.insert(path.clone(), 1);
                self.order.push(path.clone());
            }
        }
    }

    /// Keeps the paths seen at least twice, in first-sight order.
    #[must_use]
    pub fn freeze(self) -> PathTable {
        let counts = self.counts;
        PathTable::from_paths(
            self.order
                .into_iter()
                .filter(|p| counts.get(p).is_some_and(|&n| n >= 2))
                .collect(),
        )
    }
}

/// An immutable, ordered table of shared paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathTable {
    paths: Vec<PathIdentifier>,
    index: HashMap<PathIdentifier, u32>,
}

impl PathTable {
    fn from_paths(paths: Vec<PathIdentifier>) -> Self {
        let index = paths
            .iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), i as u32))
            .collect();
        Self { paths, index }
    }

    /// Index of `path` if it is tabled.
    #[must_use]
    pub fn position(&self, path: &PathIdentifier) -> Option<u32> {
        self.index.get(path).copied()
    }

    /// Writes the table. Every component must already be interned in
    /// `strings`, so this never grows the string table.
    pub fn write_to(&self, w: &mut ByteWriter, strings: &mut StringTableBuilder) {
        w.write_varint(self.paths.len() as u64);
        for path in &self.paths {
            w.write_varint(path.len() as u64);
            for part in &path.value {
                w.write_varint(u64::from(strings.intern(part)));
            }
        }
    }

    pub fn read(r: &mut ByteReader<'_>, strings: &StringTable) -> Result<Self, DecodeError> {
        let count = read_count(r)?;
        let mut paths = Vec::with_capacity(count);
        for _ in 0..count {
            let offset = r.position();
            let n = read_count(r)?;
            if n == 0 {
                return Err(DecodeError::Malformed {
                    offset,
                    reason: "empty path in path table".into(),
                });
            }
            let mut parts = Vec::with_capacity(n);
            for _ in 0..n {
                let at = r.position();
                let idx = r.read_varint()?;
                parts.push(strings.lookup(idx, at)?.to_owned());
            }
            paths.push(PathIdentifier { value: parts });
        }
        let table = Self::from_paths(paths);
        if table.index.len() != table.paths.len() {
            return Err(DecodeError::Malformed {
                offset: r.position(),
                reason: "path table contains duplicate entries".into(),
            });
        }
        Ok(table)
    }

    pub fn lookup(&self, index: u64, at: usize) -> Result<&PathIdentifier, DecodeError> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.paths.get(i))
            .ok_or(DecodeError::TableIndex {
                table: "path",
                index,
                size: self.paths.len(),
                offset: at,
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathIdentifier> {
        self.paths.iter()
    }
}
