//! Definitions and the top-level [`Nebula`] container.

use crate::location::Location;
use crate::meta::Meta;
use crate::refs::{Identifier, MessageRef, Reference, TypeRef};
use crate::statements::Statement;
use crate::types::{Aggregation, TypeExpression};

/// Shared shape of the definitions that are plain named containers
/// (domain, context, entity, repository, projector, handler).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub contents: Vec<Definition>,
    pub metadata: Vec<Meta>,
}

impl Container {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            loc: None,
            id: Identifier::new(id),
            contents: Vec::new(),
            metadata: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, def: Definition) -> Self {
        self.contents.push(def);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptorDirection {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adaptor {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub direction: AdaptorDirection,
    /// The context this adaptor translates from or to.
    pub referent: Reference,
    pub contents: Vec<Definition>,
    pub metadata: Vec<Meta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Saga {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub input: Option<Aggregation>,
    pub output: Option<Aggregation>,
    /// Saga steps, in execution order.
    pub contents: Vec<Definition>,
    pub metadata: Vec<Meta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SagaStep {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub do_statements: Vec<Statement>,
    pub undo_statements: Vec<Statement>,
    pub metadata: Vec<Meta>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Void,
    Source,
    Sink,
    Flow,
    Merge,
    Split,
    Router,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Void,
        ShapeKind::Source,
        ShapeKind::Sink,
        ShapeKind::Flow,
        ShapeKind::Merge,
        ShapeKind::Split,
        ShapeKind::Router,
    ];
}

/// The inlet/outlet arity of a streamlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamletShape {
    pub kind: ShapeKind,
    pub loc: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Streamlet {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub shape: StreamletShape,
    pub contents: Vec<Definition>,
    pub metadata: Vec<Meta>,
}

/// An inlet or outlet of a streamlet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Portlet {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub type_ref: TypeRef,
    pub metadata: Vec<Meta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connector {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub from: Reference,
    pub to: Reference,
    pub metadata: Vec<Meta>,
}

/// What an `on` clause of a handler reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OnTrigger {
    Init,
    Term,
    Other,
    Message(MessageRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnClause {
    pub loc: Option<Location>,
    pub trigger: OnTrigger,
    pub statements: Vec<Statement>,
    pub metadata: Vec<Meta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub type_ref: TypeRef,
    pub metadata: Vec<Meta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub type_ex: TypeExpression,
    pub metadata: Vec<Meta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub type_ex: TypeExpression,
    pub metadata: Vec<Meta>,
}

impl Field {
    pub fn new(id: impl Into<String>, type_ex: TypeExpression) -> Self {
        Self {
            loc: None,
            id: Identifier::new(id),
            type_ex,
            metadata: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub input: Option<Aggregation>,
    pub output: Option<Aggregation>,
    pub statements: Vec<Statement>,
    pub metadata: Vec<Meta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invariant {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub condition: Option<String>,
    pub metadata: Vec<Meta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub type_ex: TypeExpression,
    pub value: String,
    pub metadata: Vec<Meta>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub loc: Option<Location>,
    pub id: Identifier,
    pub name: String,
    pub email: String,
    pub metadata: Vec<Meta>,
}

/// Definitions that came from another source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub loc: Option<Location>,
    pub origin: String,
    pub contents: Vec<Definition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Domain(Container),
    Context(Container),
    Entity(Container),
    Repository(Container),
    Projector(Container),
    Handler(Container),
    Adaptor(Adaptor),
    Saga(Saga),
    SagaStep(SagaStep),
    Streamlet(Streamlet),
    Inlet(Portlet),
    Outlet(Portlet),
    Connector(Connector),
    OnClause(OnClause),
    State(State),
    Type(TypeDef),
    Field(Field),
    Function(Function),
    Invariant(Invariant),
    Constant(Constant),
    Author(Author),
    Include(Include),
}

impl Definition {
    /// Lower-case keyword naming the kind of definition.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Definition::Domain(_) => "domain",
            Definition::Context(_) => "context",
            Definition::Entity(_) => "entity",
            Definition::Repository(_) => "repository",
            Definition::Projector(_) => "projector",
            Definition::Handler(_) => "handler",
            Definition::Adaptor(_) => "adaptor",
            Definition::Saga(_) => "saga",
            Definition::SagaStep(_) => "step",
            Definition::Streamlet(_) => "streamlet",
            Definition::Inlet(_) => "inlet",
            Definition::Outlet(_) => "outlet",
            Definition::Connector(_) => "connector",
            Definition::OnClause(_) => "on",
            Definition::State(_) => "state",
            Definition::Type(_) => "type",
            Definition::Field(_) => "field",
            Definition::Function(_) => "function",
            Definition::Invariant(_) => "invariant",
            Definition::Constant(_) => "constant",
            Definition::Author(_) => "author",
            Definition::Include(_) => "include",
        }
    }

    /// The definition's name. `on` clauses and includes are anonymous.
    #[must_use]
    pub fn id(&self) -> Option<&Identifier> {
        match self {
            Definition::Domain(c)
            | Definition::Context(c)
            | Definition::Entity(c)
            | Definition::Repository(c)
            | Definition::Projector(c)
            | Definition::Handler(c) => Some(&c.id),
            Definition::Adaptor(d) => Some(&d.id),
            Definition::Saga(d) => Some(&d.id),
            Definition::SagaStep(d) => Some(&d.id),
            Definition::Streamlet(d) => Some(&d.id),
            Definition::Inlet(d) | Definition::Outlet(d) => Some(&d.id),
            Definition::Connector(d) => Some(&d.id),
            Definition::State(d) => Some(&d.id),
            Definition::Type(d) => Some(&d.id),
            Definition::Field(d) => Some(&d.id),
            Definition::Function(d) => Some(&d.id),
            Definition::Invariant(d) => Some(&d.id),
            Definition::Constant(d) => Some(&d.id),
            Definition::Author(d) => Some(&d.id),
            Definition::OnClause(_) | Definition::Include(_) => None,
        }
    }

    #[must_use]
    pub fn loc(&self) -> Option<&Location> {
        match self {
            Definition::Domain(c)
            | Definition::Context(c)
            | Definition::Entity(c)
            | Definition::Repository(c)
            | Definition::Projector(c)
            | Definition::Handler(c) => c.loc.as_ref(),
            Definition::Adaptor(d) => d.loc.as_ref(),
            Definition::Saga(d) => d.loc.as_ref(),
            Definition::SagaStep(d) => d.loc.as_ref(),
            Definition::Streamlet(d) => d.loc.as_ref(),
            Definition::Inlet(d) | Definition::Outlet(d) => d.loc.as_ref(),
            Definition::Connector(d) => d.loc.as_ref(),
            Definition::OnClause(d) => d.loc.as_ref(),
            Definition::State(d) => d.loc.as_ref(),
            Definition::Type(d) => d.loc.as_ref(),
            Definition::Field(d) => d.loc.as_ref(),
            Definition::Function(d) => d.loc.as_ref(),
            Definition::Invariant(d) => d.loc.as_ref(),
            Definition::Constant(d) => d.loc.as_ref(),
            Definition::Author(d) => d.loc.as_ref(),
            Definition::Include(d) => d.loc.as_ref(),
        }
    }

    /// Nested definitions. Leaf definitions return an empty slice.
    #[must_use]
    pub fn contents(&self) -> &[Definition] {
        match self {
            Definition::Domain(c)
            | Definition::Context(c)
            | Definition::Entity(c)
            | Definition::Repository(c)
            | Definition::Projector(c)
            | Definition::Handler(c) => &c.contents,
            Definition::Adaptor(d) => &d.contents,
            Definition::Saga(d) => &d.contents,
            Definition::Streamlet(d) => &d.contents,
            Definition::Include(d) => &d.contents,
            Definition::SagaStep(_)
            | Definition::Inlet(_)
            | Definition::Outlet(_)
            | Definition::Connector(_)
            | Definition::OnClause(_)
            | Definition::State(_)
            | Definition::Type(_)
            | Definition::Field(_)
            | Definition::Function(_)
            | Definition::Invariant(_)
            | Definition::Constant(_)
            | Definition::Author(_) => &[],
        }
    }

    /// Attached metadata. Includes never carry any.
    #[must_use]
    pub fn metadata(&self) -> &[Meta] {
        match self {
            Definition::Domain(c)
            | Definition::Context(c)
            | Definition::Entity(c)
            | Definition::Repository(c)
            | Definition::Projector(c)
            | Definition::Handler(c) => &c.metadata,
            Definition::Adaptor(d) => &d.metadata,
            Definition::Saga(d) => &d.metadata,
            Definition::SagaStep(d) => &d.metadata,
            Definition::Streamlet(d) => &d.metadata,
            Definition::Inlet(d) | Definition::Outlet(d) => &d.metadata,
            Definition::Connector(d) => &d.metadata,
            Definition::OnClause(d) => &d.metadata,
            Definition::State(d) => &d.metadata,
            Definition::Type(d) => &d.metadata,
            Definition::Field(d) => &d.metadata,
            Definition::Function(d) => &d.metadata,
            Definition::Invariant(d) => &d.metadata,
            Definition::Constant(d) => &d.metadata,
            Definition::Author(d) => &d.metadata,
            Definition::Include(_) => &[],
        }
    }

    /// Number of definitions in this subtree, counting `self`.
    #[must_use]
    pub fn subtree_count(&self) -> usize {
        1 + self.contents().iter().map(Definition::subtree_count).sum::<usize>()
    }
}

/// A bag of top-level definitions of any kind, in source order.
///
/// This is what decoding a BAST file yields: the content need not form a
/// complete model, e.g. a fragment meant to be imported into a larger one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Nebula {
    pub contents: Vec<Definition>,
}

impl Nebula {
    pub fn new(contents: Vec<Definition>) -> Self {
        Self { contents }
    }

    pub fn push(&mut self, def: Definition) {
        self.contents.push(def);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.contents.iter()
    }

    /// Total number of definitions at every depth.
    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.contents.iter().map(Definition::subtree_count).sum()
    }

    /// Finds a top-level definition by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Definition> {
        self.contents
            .iter()
            .find(|d| d.id().is_some_and(|id| id.value == name))
    }
}
