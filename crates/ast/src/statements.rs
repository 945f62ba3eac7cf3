//! Statements inside handlers, functions and saga steps.

use crate::location::Location;
use crate::refs::{MessageRef, Reference};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Free-form prose, e.g. `"compute the tax"`.
    Arbitrary { loc: Option<Location>, what: String },
    Error { loc: Option<Location>, message: String },
    Set {
        loc: Option<Location>,
        field: Reference,
        value: String,
    },
    Send {
        loc: Option<Location>,
        msg: MessageRef,
        portlet: Reference,
    },
    Tell {
        loc: Option<Location>,
        msg: MessageRef,
        to: Reference,
    },
    Morph {
        loc: Option<Location>,
        entity: Reference,
        state: Reference,
        value: MessageRef,
    },
    Become {
        loc: Option<Location>,
        entity: Reference,
        handler: Reference,
    },
    Call {
        loc: Option<Location>,
        function: Reference,
    },
    Return { loc: Option<Location>, value: String },
    When {
        loc: Option<Location>,
        condition: String,
        then: Vec<Statement>,
        otherwise: Vec<Statement>,
    },
}

impl Statement {
    #[must_use]
    pub fn loc(&self) -> Option<&Location> {
        match self {
            Statement::Arbitrary { loc, .. }
            | Statement::Error { loc, .. }
            | Statement::Set { loc, .. }
            | Statement::Send { loc, .. }
            | Statement::Tell { loc, .. }
            | Statement::Morph { loc, .. }
            | Statement::Become { loc, .. }
            | Statement::Call { loc, .. }
            | Statement::Return { loc, .. }
            | Statement::When { loc, .. } => loc.as_ref(),
        }
    }

    /// Shorthand for an `Arbitrary` statement without a location.
    pub fn prose(what: impl Into<String>) -> Self {
        Statement::Arbitrary {
            loc: None,
            what: what.into(),
        }
    }
}
