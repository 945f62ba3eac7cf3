//! # AST - in-memory model of a domain model
//!
//! The tree the parser produces and the BAST codec consumes and reproduces.
//! Everything here is plain owned data (`Send + Sync`); there is no parsing,
//! validation or printing in this crate.
//!
//! ```text
//! Nebula
//!  └─ Definition (domain, context, entity, handler, saga, streamlet, ...)
//!      ├─ Identifier, Location
//!      ├─ Meta*            descriptions, comments, terms, options
//!      ├─ kind-specific    TypeExpression, Reference, MessageRef, Statement*
//!      └─ Definition*      nested contents
//! ```
//!
//! Locations are `(source, offset, end_offset)` only. Use
//! [`SourceText::line_col`] to turn an offset into a line and column.

mod definitions;
mod location;
mod meta;
mod refs;
mod statements;
mod types;

pub use definitions::{
    Adaptor, AdaptorDirection, Author, Connector, Constant, Container, Definition, Field,
    Function, Include, Invariant, Nebula, OnClause, OnTrigger, Portlet, Saga, SagaStep,
    ShapeKind, State, Streamlet, StreamletShape, TypeDef,
};
pub use location::{Location, SourceText};
pub use meta::Meta;
pub use refs::{Identifier, MessageKind, MessageRef, PathIdentifier, RefKind, Reference, TypeRef};
pub use statements::Statement;
pub use types::{Aggregation, Enumerator, TypeExpression};
