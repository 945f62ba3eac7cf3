//! Metadata attached to definitions: descriptions, comments, terms, options.

use crate::location::Location;
use crate::refs::{Identifier, PathIdentifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Meta {
    BriefDescription { loc: Option<Location>, text: String },
    Description { loc: Option<Location>, lines: Vec<String> },
    LineComment { loc: Option<Location>, text: String },
    BlockComment { loc: Option<Location>, lines: Vec<String> },
    /// A glossary term scoped to the definition.
    Term {
        loc: Option<Location>,
        id: Identifier,
        definition: Vec<String>,
    },
    /// `option name("arg", ...)`.
    OptionValue {
        loc: Option<Location>,
        name: String,
        args: Vec<String>,
    },
    AuthorRef {
        loc: Option<Location>,
        path: PathIdentifier,
    },
    Attachment {
        loc: Option<Location>,
        id: Identifier,
        mime_type: String,
        data: String,
    },
}

impl Meta {
    #[must_use]
    pub fn is_comment(&self) -> bool {
        matches!(self, Meta::LineComment { .. } | Meta::BlockComment { .. })
    }

    #[must_use]
    pub fn is_description(&self) -> bool {
        matches!(self, Meta::BriefDescription { .. } | Meta::Description { .. })
    }

    /// Shorthand for a one-line `Description` without a location.
    pub fn described_as(line: impl Into<String>) -> Self {
        Meta::Description {
            loc: None,
            lines: vec![line.into()],
        }
    }
}
