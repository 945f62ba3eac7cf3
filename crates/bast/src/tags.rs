//! Tag categories.
//!
//! Every tagged value in the node stream belongs to exactly one structural
//! category, and every category owns a closed enum over its own numeric range:
//!
//! ```text
//! NodeTag        1 ..=  24   definitions (+ Nebula root)
//! StatementTag  25 ..=  36   statements
//! TypeTag       37 ..=  72   type expressions
//! ShapeTag      73 ..=  80   streamlet shapes
//! RefTag        81 ..= 104   references to definitions
//! MessageRefTag 105..= 112   references to messages
//! MetaTag       113..= 127   metadata items
//! ```
//!
//! The ranges never overlap, so a byte written for one category is rejected
//! by the dispatcher of every other category instead of being misread.
//! The high bit is reserved for [`META_FLAG`] and is only meaningful on a
//! [`NodeTag`] byte.

use ast::{Definition, Meta, MessageKind, RefKind, ShapeKind, Statement, TypeExpression};

/// Set on a node tag byte when a metadata block follows the location.
pub const META_FLAG: u8 = 0x80;

/// Mask selecting the tag value from a node tag byte.
pub const TAG_MASK: u8 = 0x7F;

/// A closed tag enumeration for one structural category.
pub trait Tag: Copy + TryFrom<u8, Error = u8> + Into<u8> {
    /// Human-readable name used in dispatch errors.
    const CATEGORY: &'static str;
    const FIRST: u8;
    const LAST: u8;
}

macro_rules! tag_category {
    (
        $(#[$doc:meta])*
        $name:ident, $category:literal, $first:literal ..= $last:literal {
            $( $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $( $variant = $value ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];
        }

        impl Tag for $name {
            const CATEGORY: &'static str = $category;
            const FIRST: u8 = $first;
            const LAST: u8 = $last;
        }

        const _: () = {
            $( assert!($value >= $first && $value <= $last, "tag outside its category range"); )+
        };

        impl TryFrom<u8> for $name {
            type Error = u8;

            fn try_from(byte: u8) -> Result<Self, u8> {
                match byte {
                    $( $value => Ok($name::$variant), )+
                    other => Err(other),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(tag: $name) -> u8 {
                tag as u8
            }
        }
    };
}

tag_category! {
    /// Definitions. The only category whose byte may carry [`META_FLAG`].
    NodeTag, "definition", 1..=24 {
        Nebula = 1,
        Domain = 2,
        Context = 3,
        Entity = 4,
        Repository = 5,
        Projector = 6,
        Handler = 7,
        Adaptor = 8,
        Saga = 9,
        SagaStep = 10,
        Streamlet = 11,
        Inlet = 12,
        Outlet = 13,
        Connector = 14,
        OnClause = 15,
        State = 16,
        Type = 17,
        Field = 18,
        Function = 19,
        Invariant = 20,
        Constant = 21,
        Author = 22,
        Include = 23,
    }
}

tag_category! {
    StatementTag, "statement", 25..=36 {
        Arbitrary = 25,
        Error = 26,
        Set = 27,
        Send = 28,
        Tell = 29,
        Morph = 30,
        Become = 31,
        Call = 32,
        Return = 33,
        When = 34,
    }
}

tag_category! {
    TypeTag, "type expression", 37..=72 {
        String = 37,
        Integer = 38,
        Whole = 39,
        Natural = 40,
        Number = 41,
        Boolean = 42,
        Real = 43,
        Decimal = 44,
        Date = 45,
        Time = 46,
        DateTime = 47,
        TimeStamp = 48,
        Duration = 49,
        Uuid = 50,
        Url = 51,
        Currency = 52,
        Nothing = 53,
        Abstract = 54,
        Pattern = 55,
        Range = 56,
        Enumeration = 57,
        Alternation = 58,
        Aggregation = 59,
        Message = 60,
        Alias = 61,
        EntityReference = 62,
        Optional = 63,
        ZeroOrMore = 64,
        OneOrMore = 65,
        SpecificRange = 66,
        Mapping = 67,
        Sequence = 68,
        Set = 69,
    }
}

tag_category! {
    ShapeTag, "streamlet shape", 73..=80 {
        Void = 73,
        Source = 74,
        Sink = 75,
        Flow = 76,
        Merge = 77,
        Split = 78,
        Router = 79,
    }
}

tag_category! {
    RefTag, "reference", 81..=104 {
        Domain = 81,
        Context = 82,
        Entity = 83,
        Repository = 84,
        Projector = 85,
        Adaptor = 86,
        Saga = 87,
        Streamlet = 88,
        Connector = 89,
        Inlet = 90,
        Outlet = 91,
        Handler = 92,
        State = 93,
        Function = 94,
        Type = 95,
        Field = 96,
        Constant = 97,
        Author = 98,
        Invariant = 99,
    }
}

tag_category! {
    MessageRefTag, "message reference", 105..=112 {
        Command = 105,
        Event = 106,
        Query = 107,
        Result = 108,
        Record = 109,
    }
}

tag_category! {
    MetaTag, "metadata", 113..=127 {
        BriefDescription = 113,
        Description = 114,
        LineComment = 115,
        BlockComment = 116,
        Term = 117,
        OptionValue = 118,
        AuthorRef = 119,
        Attachment = 120,
    }
}

const _: () = {
    assert!(NodeTag::LAST < StatementTag::FIRST);
    assert!(StatementTag::LAST < TypeTag::FIRST);
    assert!(TypeTag::LAST < ShapeTag::FIRST);
    assert!(ShapeTag::LAST < RefTag::FIRST);
    assert!(RefTag::LAST < MessageRefTag::FIRST);
    assert!(MessageRefTag::LAST < MetaTag::FIRST);
    assert!(MetaTag::LAST <= TAG_MASK);
    assert!(NodeTag::FIRST > 0);
};

impl NodeTag {
    #[must_use]
    pub fn of(def: &Definition) -> NodeTag {
        match def {
            Definition::Domain(_) => NodeTag::Domain,
            Definition::Context(_) => NodeTag::Context,
            Definition::Entity(_) => NodeTag::Entity,
            Definition::Repository(_) => NodeTag::Repository,
            Definition::Projector(_) => NodeTag::Projector,
            Definition::Handler(_) => NodeTag::Handler,
            Definition::Adaptor(_) => NodeTag::Adaptor,
            Definition::Saga(_) => NodeTag::Saga,
            Definition::SagaStep(_) => NodeTag::SagaStep,
            Definition::Streamlet(_) => NodeTag::Streamlet,
            Definition::Inlet(_) => NodeTag::Inlet,
            Definition::Outlet(_) => NodeTag::Outlet,
            Definition::Connector(_) => NodeTag::Connector,
            Definition::OnClause(_) => NodeTag::OnClause,
            Definition::State(_) => NodeTag::State,
            Definition::Type(_) => NodeTag::Type,
            Definition::Field(_) => NodeTag::Field,
            Definition::Function(_) => NodeTag::Function,
            Definition::Invariant(_) => NodeTag::Invariant,
            Definition::Constant(_) => NodeTag::Constant,
            Definition::Author(_) => NodeTag::Author,
            Definition::Include(_) => NodeTag::Include,
        }
    }
}

impl StatementTag {
    #[must_use]
    pub fn of(stmt: &Statement) -> StatementTag {
        match stmt {
            Statement::Arbitrary { .. } => StatementTag::Arbitrary,
            Statement::Error { .. } => StatementTag::Error,
            Statement::Set { .. } => StatementTag::Set,
            Statement::Send { .. } => StatementTag::Send,
            Statement::Tell { .. } => StatementTag::Tell,
            Statement::Morph { .. } => StatementTag::Morph,
            Statement::Become { .. } => StatementTag::Become,
            Statement::Call { .. } => StatementTag::Call,
            Statement::Return { .. } => StatementTag::Return,
            Statement::When { .. } => StatementTag::When,
        }
    }
}

impl TypeTag {
    #[must_use]
    pub fn of(te: &TypeExpression) -> TypeTag {
        match te {
            TypeExpression::String { .. } => TypeTag::String,
            TypeExpression::Integer { .. } => TypeTag::Integer,
            TypeExpression::Whole { .. } => TypeTag::Whole,
            TypeExpression::Natural { .. } => TypeTag::Natural,
            TypeExpression::Number { .. } => TypeTag::Number,
            TypeExpression::Boolean { .. } => TypeTag::Boolean,
            TypeExpression::Real { .. } => TypeTag::Real,
            TypeExpression::Decimal { .. } => TypeTag::Decimal,
            TypeExpression::Date { .. } => TypeTag::Date,
            TypeExpression::Time { .. } => TypeTag::Time,
            TypeExpression::DateTime { .. } => TypeTag::DateTime,
            TypeExpression::TimeStamp { .. } => TypeTag::TimeStamp,
            TypeExpression::Duration { .. } => TypeTag::Duration,
            TypeExpression::Uuid { .. } => TypeTag::Uuid,
            TypeExpression::Url { .. } => TypeTag::Url,
            TypeExpression::Currency { .. } => TypeTag::Currency,
            TypeExpression::Nothing { .. } => TypeTag::Nothing,
            TypeExpression::Abstract { .. } => TypeTag::Abstract,
            TypeExpression::Pattern { .. } => TypeTag::Pattern,
            TypeExpression::Range { .. } => TypeTag::Range,
            TypeExpression::Enumeration { .. } => TypeTag::Enumeration,
            TypeExpression::Alternation { .. } => TypeTag::Alternation,
            TypeExpression::Aggregation(_) => TypeTag::Aggregation,
            TypeExpression::Message { .. } => TypeTag::Message,
            TypeExpression::Alias { .. } => TypeTag::Alias,
            TypeExpression::EntityReference { .. } => TypeTag::EntityReference,
            TypeExpression::Optional { .. } => TypeTag::Optional,
            TypeExpression::ZeroOrMore { .. } => TypeTag::ZeroOrMore,
            TypeExpression::OneOrMore { .. } => TypeTag::OneOrMore,
            TypeExpression::SpecificRange { .. } => TypeTag::SpecificRange,
            TypeExpression::Mapping { .. } => TypeTag::Mapping,
            TypeExpression::Sequence { .. } => TypeTag::Sequence,
            TypeExpression::Set { .. } => TypeTag::Set,
        }
    }
}

impl MetaTag {
    #[must_use]
    pub fn of(meta: &Meta) -> MetaTag {
        match meta {
            Meta::BriefDescription { .. } => MetaTag::BriefDescription,
            Meta::Description { .. } => MetaTag::Description,
            Meta::LineComment { .. } => MetaTag::LineComment,
            Meta::BlockComment { .. } => MetaTag::BlockComment,
            Meta::Term { .. } => MetaTag::Term,
            Meta::OptionValue { .. } => MetaTag::OptionValue,
            Meta::AuthorRef { .. } => MetaTag::AuthorRef,
            Meta::Attachment { .. } => MetaTag::Attachment,
        }
    }
}

impl From<ShapeKind> for ShapeTag {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Void => ShapeTag::Void,
            ShapeKind::Source => ShapeTag::Source,
            ShapeKind::Sink => ShapeTag::Sink,
            ShapeKind::Flow => ShapeTag::Flow,
            ShapeKind::Merge => ShapeTag::Merge,
            ShapeKind::Split => ShapeTag::Split,
            ShapeKind::Router => ShapeTag::Router,
        }
    }
}

impl From<ShapeTag> for ShapeKind {
    fn from(tag: ShapeTag) -> Self {
        match tag {
            ShapeTag::Void => ShapeKind::Void,
            ShapeTag::Source => ShapeKind::Source,
            ShapeTag::Sink => ShapeKind::Sink,
            ShapeTag::Flow => ShapeKind::Flow,
            ShapeTag::Merge => ShapeKind::Merge,
            ShapeTag::Split => ShapeKind::Split,
            ShapeTag::Router => ShapeKind::Router,
        }
    }
}

impl From<RefKind> for RefTag {
    fn from(kind: RefKind) -> Self {
        match kind {
            RefKind::Domain => RefTag::Domain,
            RefKind::Context => RefTag::Context,
            RefKind::Entity => RefTag::Entity,
            RefKind::Repository => RefTag::Repository,
            RefKind::Projector => RefTag::Projector,
            RefKind::Adaptor => RefTag::Adaptor,
            RefKind::Saga => RefTag::Saga,
            RefKind::Streamlet => RefTag::Streamlet,
            RefKind::Connector => RefTag::Connector,
            RefKind::Inlet => RefTag::Inlet,
            RefKind::Outlet => RefTag::Outlet,
            RefKind::Handler => RefTag::Handler,
            RefKind::State => RefTag::State,
            RefKind::Function => RefTag::Function,
            RefKind::Type => RefTag::Type,
            RefKind::Field => RefTag::Field,
            RefKind::Constant => RefTag::Constant,
            RefKind::Author => RefTag::Author,
            RefKind::Invariant => RefTag::Invariant,
        }
    }
}

impl From<RefTag> for RefKind {
    fn from(tag: RefTag) -> Self {
        match tag {
            RefTag::Domain => RefKind::Domain,
            RefTag::Context => RefKind::Context,
            RefTag::Entity => RefKind::Entity,
            RefTag::Repository => RefKind::Repository,
            RefTag::Projector => RefKind::Projector,
            RefTag::Adaptor => RefKind::Adaptor,
            RefTag::Saga => RefKind::Saga,
            RefTag::Streamlet => RefKind::Streamlet,
            RefTag::Connector => RefKind::Connector,
            RefTag::Inlet => RefKind::Inlet,
            RefTag::Outlet => RefKind::Outlet,
            RefTag::Handler => RefKind::Handler,
            RefTag::State => RefKind::State,
            RefTag::Function => RefKind::Function,
            RefTag::Type => RefKind::Type,
            RefTag::Field => RefKind::Field,
            RefTag::Constant => RefKind::Constant,
            RefTag::Author => RefKind::Author,
            RefTag::Invariant => RefKind::Invariant,
        }
    }
}

impl From<MessageKind> for MessageRefTag {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Command => MessageRefTag::Command,
            MessageKind::Event => MessageRefTag::Event,
            MessageKind::Query => MessageRefTag::Query,
            MessageKind::Result => MessageRefTag::Result,
            MessageKind::Record => MessageRefTag::Record,
        }
    }
}

impl From<MessageRefTag> for MessageKind {
    fn from(tag: MessageRefTag) -> Self {
        match tag {
            MessageRefTag::Command => MessageKind::Command,
            MessageRefTag::Event => MessageKind::Event,
            MessageRefTag::Query => MessageKind::Query,
            MessageRefTag::Result => MessageKind::Result,
            MessageRefTag::Record => MessageKind::Record,
        }
    }
}

/// Ordinal of a message kind inside a `TypeTag::Message` expression.
pub(crate) fn message_kind_ordinal(kind: MessageKind) -> u8 {
    match kind {
        MessageKind::Command => 0,
        MessageKind::Event => 1,
        MessageKind::Query => 2,
        MessageKind::Result => 3,
        MessageKind::Record => 4,
    }
}

pub(crate) fn message_kind_from_ordinal(ordinal: u8) -> Option<MessageKind> {
    MessageKind::ALL.get(usize::from(ordinal)).copied()
}
