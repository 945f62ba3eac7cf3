//! Delta-compressed source locations.
//!
//! Each location site starts with one varint marker:
//!
//! ```text
//! 0      same source as the previous location, deltas follow
//! 1      no location at this site
//! n >= 2 source changed to string index n - 2, running offsets reset to 0,
//!        deltas follow
//! ```
//!
//! The deltas are `zigzag(offset - last_offset)` and
//! `zigzag(end_offset - last_end_offset)`. Nothing at all is written when
//! the file does not carry locations.

use std::collections::HashMap;
use std::sync::Arc;

use ast::Location;
use bytebuf::{ByteReader, ByteWriter};

use crate::error::DecodeError;
use crate::tables::StringTable;

const SAME_SOURCE: u64 = 0;
const NO_LOCATION: u64 = 1;
const SOURCE_BASE: u64 = 2;

#[derive(Debug, Default)]
pub struct LocationEncoder {
    last_source: Option<u32>,
    last_offset: u32,
    last_end: u32,
}

impl LocationEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one site. `source` is the string index of the location's
    /// source name.
    pub fn encode(&mut self, w: &mut ByteWriter, site: Option<(u32, &Location)>) {
        let Some((source, loc)) = site else {
            w.write_varint(NO_LOCATION);
            return;
        };
        if self.last_source == Some(source) {
            w.write_varint(SAME_SOURCE);
        } else {
            w.write_varint(u64::from(source) + SOURCE_BASE);
            self.last_source = Some(source);
            self.last_offset = 0;
            self.last_end = 0;
        }
        w.write_zigzag(i64::from(loc.offset) - i64::from(self.last_offset));
        w.write_zigzag(i64::from(loc.end_offset) - i64::from(self.last_end));
        self.last_offset = loc.offset;
        self.last_end = loc.end_offset;
    }
}

#[derive(Debug, Default)]
pub struct LocationDecoder {
    last_source: Option<Arc<str>>,
    last_offset: u32,
    last_end: u32,
    /// One shared `Arc` per source name, keyed by string index.
    sources: HashMap<u64, Arc<str>>,
}

impl LocationDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(
        &mut self,
        r: &mut ByteReader<'_>,
        strings: &StringTable,
    ) -> Result<Option<Location>, DecodeError> {
        let at = r.position();
        let marker = r.read_varint()?;
        let source = match marker {
            NO_LOCATION => return Ok(None),
            SAME_SOURCE => match &self.last_source {
                Some(s) => Arc::clone(s),
                None => {
                    return Err(DecodeError::Malformed {
                        offset: at,
                        reason: "location refers to a previous source but none was set".into(),
                    })
                }
            },
            n => {
                let index = n - SOURCE_BASE;
                let source = match self.sources.get(&index) {
                    Some(s) => Arc::clone(s),
                    None => {
                        let s: Arc<str> = Arc::from(strings.lookup(index, at)?);
                        self.sources.insert(index, Arc::clone(&s));
                        s
                    }
                };
                self.last_source = Some(Arc::clone(&source));
                self.last_offset = 0;
                self.last_end = 0;
                source
            }
        };
        let offset = apply_delta(self.last_offset, r)?;
        let end_offset = apply_delta(self.last_end, r)?;
        self.last_offset = offset;
        self.last_end = end_offset;
        Ok(Some(Location {
            source,
            offset,
            end_offset,
        }))
    }
}

fn apply_delta(last: u32, r: &mut ByteReader<'_>) -> Result<u32, DecodeError> {
    let at = r.position();
    let delta = r.read_zigzag()?;
    i64::from(last)
        .checked_add(delta)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(DecodeError::Malformed {
            offset: at,
            reason: format!("location delta {delta} from {last} is out of range"),
        })
}
