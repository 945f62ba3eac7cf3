//! Type expressions.

use crate::definitions::Field;
use crate::location::Location;
use crate::refs::{Identifier, MessageKind, PathIdentifier};

/// A record-like group of fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aggregation {
    pub loc: Option<Location>,
    pub fields: Vec<Field>,
}

impl Aggregation {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { loc: None, fields }
    }
}

/// One named value of an enumeration, optionally with an explicit number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumerator {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub value: Option<i64>,
}

/// The right-hand side of a `type` or `field` definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpression {
    String {
        loc: Option<Location>,
        min: Option<u64>,
        max: Option<u64>,
    },
    Integer { loc: Option<Location> },
    Whole { loc: Option<Location> },
    Natural { loc: Option<Location> },
    Number { loc: Option<Location> },
    Boolean { loc: Option<Location> },
    Real { loc: Option<Location> },
    Decimal {
        loc: Option<Location>,
        whole: u64,
        fractional: u64,
    },
    Date { loc: Option<Location> },
    Time { loc: Option<Location> },
    DateTime { loc: Option<Location> },
    TimeStamp { loc: Option<Location> },
    Duration { loc: Option<Location> },
    Uuid { loc: Option<Location> },
    Url {
        loc: Option<Location>,
        scheme: Option<String>,
    },
    Currency {
        loc: Option<Location>,
        country: String,
    },
    Nothing { loc: Option<Location> },
    Abstract { loc: Option<Location> },
    Pattern {
        loc: Option<Location>,
        patterns: Vec<String>,
    },
    Range {
        loc: Option<Location>,
        min: i64,
        max: i64,
    },
    Enumeration {
        loc: Option<Location>,
        enumerators: Vec<Enumerator>,
    },
    Alternation {
        loc: Option<Location>,
        of: Vec<TypeExpression>,
    },
    Aggregation(Aggregation),
    /// An aggregation that defines a message of the given kind.
    Message {
        kind: MessageKind,
        aggregation: Aggregation,
    },
    /// A named type used in place, e.g. `field total is Money`.
    Alias {
        loc: Option<Location>,
        path: PathIdentifier,
    },
    /// The identity type of an entity, e.g. `Id(Shop.Cart)`.
    EntityReference {
        loc: Option<Location>,
        entity: PathIdentifier,
    },
    Optional {
        loc: Option<Location>,
        of: Box<TypeExpression>,
    },
    ZeroOrMore {
        loc: Option<Location>,
        of: Box<TypeExpression>,
    },
    OneOrMore {
        loc: Option<Location>,
        of: Box<TypeExpression>,
    },
    SpecificRange {
        loc: Option<Location>,
        of: Box<TypeExpression>,
        min: u64,
        max: u64,
    },
    Mapping {
        loc: Option<Location>,
        from: Box<TypeExpression>,
        to: Box<TypeExpression>,
    },
    Sequence {
        loc: Option<Location>,
        of: Box<TypeExpression>,
    },
    Set {
        loc: Option<Location>,
        of: Box<TypeExpression>,
    },
}

impl TypeExpression {
    /// The location of the expression itself.
    #[must_use]
    pub fn loc(&self) -> Option<&Location> {
        match self {
            TypeExpression::Aggregation(agg) | TypeExpression::Message { aggregation: agg, .. } => {
                agg.loc.as_ref()
            }
            TypeExpression::String { loc, .. }
            | TypeExpression::Integer { loc }
            | TypeExpression::Whole { loc }
            | TypeExpression::Natural { loc }
            | TypeExpression::Number { loc }
            | TypeExpression::Boolean { loc }
            | TypeExpression::Real { loc }
            | TypeExpression::Decimal { loc, .. }
            | TypeExpression::Date { loc }
            | TypeExpression::Time { loc }
            | TypeExpression::DateTime { loc }
            | TypeExpression::TimeStamp { loc }
            | TypeExpression::Duration { loc }
            | TypeExpression::Uuid { loc }
            | TypeExpression::Url { loc, .. }
            | TypeExpression::Currency { loc, .. }
            | TypeExpression::Nothing { loc }
            | TypeExpression::Abstract { loc }
            | TypeExpression::Pattern { loc, .. }
            | TypeExpression::Range { loc, .. }
            | TypeExpression::Enumeration { loc, .. }
            | TypeExpression::Alternation { loc, .. }
            | TypeExpression::Alias { loc, .. }
            | TypeExpression::EntityReference { loc, .. }
            | TypeExpression::Optional { loc, .. }
            | TypeExpression::ZeroOrMore { loc, .. }
            | TypeExpression::OneOrMore { loc, .. }
            | TypeExpression::SpecificRange { loc, .. }
            | TypeExpression::Mapping { loc, .. }
            | TypeExpression::Sequence { loc, .. }
            | TypeExpression::Set { loc, .. } => loc.as_ref(),
        }
    }

    /// Shorthand for `Alias` of a dotted path.
    pub fn alias(dotted: &str) -> Self {
        TypeExpression::Alias {
            loc: None,
            path: PathIdentifier::parse(dotted),
        }
    }
}
