//! Names and cross-definition references.

use std::fmt;

use crate::location::Location;

/// A simple name with the location it was written at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub loc: Option<Location>,
    pub value: String,
}

impl Identifier {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            loc: None,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn at(mut self, loc: Location) -> Self {
        self.loc = Some(loc);
        self
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// A dotted path such as `Shop.Cart.AddItem`, stored as its components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathIdentifier {
    pub value: Vec<String>,
}

impl PathIdentifier {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            value: parts.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a dotted string into components. An empty string is an empty path.
    pub fn parse(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::default();
        }
        Self::new(dotted.split('.'))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.value.len()
    }
}

impl fmt::Display for PathIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value.join("."))
    }
}

/// The kind of definition a [`Reference`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefKind {
    Domain,
    Context,
    Entity,
    Repository,
    Projector,
    Adaptor,
    Saga,
    Streamlet,
    Connector,
    Inlet,
    Outlet,
    Handler,
    State,
    Function,
    Type,
    Field,
    Constant,
    Author,
    Invariant,
}

impl RefKind {
    pub const ALL: [RefKind; 19] = [
        RefKind::Domain,
        RefKind::Context,
        RefKind::Entity,
        RefKind::Repository,
        RefKind::Projector,
        RefKind::Adaptor,
        RefKind::Saga,
        RefKind::Streamlet,
        RefKind::Connector,
        RefKind::Inlet,
        RefKind::Outlet,
        RefKind::Handler,
        RefKind::State,
        RefKind::Function,
        RefKind::Type,
        RefKind::Field,
        RefKind::Constant,
        RefKind::Author,
        RefKind::Invariant,
    ];

    /// Keyword used for this kind in model source text.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            RefKind::Domain => "domain",
            RefKind::Context => "context",
            RefKind::Entity => "entity",
            RefKind::Repository => "repository",
            RefKind::Projector => "projector",
            RefKind::Adaptor => "adaptor",
            RefKind::Saga => "saga",
            RefKind::Streamlet => "streamlet",
            RefKind::Connector => "connector",
            RefKind::Inlet => "inlet",
            RefKind::Outlet => "outlet",
            RefKind::Handler => "handler",
            RefKind::State => "state",
            RefKind::Function => "function",
            RefKind::Type => "type",
            RefKind::Field => "field",
            RefKind::Constant => "constant",
            RefKind::Author => "author",
            RefKind::Invariant => "invariant",
        }
    }
}

/// A reference to another definition, e.g. `entity Shop.Cart`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: RefKind,
    pub loc: Option<Location>,
    pub path: PathIdentifier,
}

impl Reference {
    pub fn new(kind: RefKind, path: PathIdentifier) -> Self {
        Self {
            kind,
            loc: None,
            path,
        }
    }

    #[must_use]
    pub fn at(mut self, loc: Location) -> Self {
        self.loc = Some(loc);
        self
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.keyword(), self.path)
    }
}

/// A reference in a position that can only name a type (a state's type, the
/// type carried by an inlet or outlet).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub loc: Option<Location>,
    pub path: PathIdentifier,
}

impl TypeRef {
    pub fn new(path: PathIdentifier) -> Self {
        Self { loc: None, path }
    }

    #[must_use]
    pub fn at(mut self, loc: Location) -> Self {
        self.loc = Some(loc);
        self
    }
}

/// The kinds of message a model can define.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Command,
    Event,
    Query,
    Result,
    Record,
}

impl MessageKind {
    pub const ALL: [MessageKind; 5] = [
        MessageKind::Command,
        MessageKind::Event,
        MessageKind::Query,
        MessageKind::Result,
        MessageKind::Record,
    ];

    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            MessageKind::Command => "command",
            MessageKind::Event => "event",
            MessageKind::Query => "query",
            MessageKind::Result => "result",
            MessageKind::Record => "record",
        }
    }
}

/// A reference to a message type, e.g. `command AddItem`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub kind: MessageKind,
    pub loc: Option<Location>,
    pub path: PathIdentifier,
}

impl MessageRef {
    pub fn new(kind: MessageKind, path: PathIdentifier) -> Self {
        Self {
            kind,
            loc: None,
            path,
        }
    }

    #[must_use]
    pub fn at(mut self, loc: Location) -> Self {
        self.loc = Some(loc);
        self
    }
}

impl fmt::Display for MessageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.keyword(), self.path)
    }
}
