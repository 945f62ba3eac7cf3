//! Section-level report on an encoded file.

use std::fmt;

use crate::error::DecodeErrors;
use crate::format::{Header, HEADER_SIZE};
use crate::reader::{open, BastReader};

/// What a BAST file contains, and how many bytes each section takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub header: Header,
    pub string_count: usize,
    pub path_count: usize,
    /// Definitions at every depth, not counting the root.
    pub definition_count: usize,
    pub string_table_bytes: usize,
    pub path_table_bytes: usize,
    pub node_bytes: usize,
}

/// Fully decodes `bytes` and reports on its layout.
pub fn inspect(bytes: &[u8]) -> Result<Summary, DecodeErrors> {
    let sections = open(bytes)?;
    let header = sections.header;
    let string_count = sections.strings.len();
    let path_count = sections.paths.len();
    let strings_end = sections.strings_end;
    let root = header.root_offset as usize;
    let nebula = BastReader::new(sections).read_root()?;
    Ok(Summary {
        header,
        string_count,
        path_count,
        definition_count: nebula.definition_count(),
        string_table_bytes: strings_end - HEADER_SIZE,
        path_table_bytes: root - strings_end,
        node_bytes: header.file_size as usize - root,
    })
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "BAST v{} rev {} flags {:#06x}, {} bytes, checksum {:#010x}",
            self.header.version,
            self.header.format_revision,
            self.header.flags.bits(),
            self.header.file_size,
            self.header.checksum
        )?;
        writeln!(
            f,
            "  strings:     {:>6} entries {:>9} bytes",
            self.string_count, self.string_table_bytes
        )?;
        writeln!(
            f,
            "  paths:       {:>6} entries {:>9} bytes",
            self.path_count, self.path_table_bytes
        )?;
        write!(
            f,
            "  definitions: {:>6}         {:>9} bytes",
            self.definition_count, self.node_bytes
        )
    }
}
