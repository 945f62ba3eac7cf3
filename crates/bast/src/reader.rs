//! The decoder.
//!
//! Decoding validates the header and checksum up front, loads both tables
//! eagerly, then reads the node stream from the root offset. Any error aborts
//! the whole decode; no partial tree is returned.

use ast::{
    Adaptor, AdaptorDirection, Aggregation, Author, Connector, Constant, Container, Definition,
    Enumerator, Field, Function, Identifier, Include, Invariant, Location, MessageRef, Meta,
    Nebula, OnClause, OnTrigger, PathIdentifier, Portlet, Reference, Saga, SagaStep, State,
    Statement, Streamlet, StreamletShape, TypeDef, TypeExpression, TypeRef,
};
use bytebuf::ByteReader;
use log::{debug, warn};

use crate::checksum::adler32;
use crate::error::{DecodeError, DecodeErrors, HeaderError};
use crate::format::{Flags, Header, HEADER_SIZE};
use crate::location::LocationDecoder;
use crate::tables::{PathTable, StringTable};
use crate::tags::{
    message_kind_from_ordinal, MessageRefTag, MetaTag, NodeTag, RefTag, ShapeTag, StatementTag,
    Tag, TypeTag, META_FLAG, TAG_MASK,
};

/// Deepest nesting of definitions, statements and type expressions accepted.
pub const MAX_DEPTH: usize = 256;

/// Reads an element count and rejects counts larger than the bytes left.
///
/// Every counted element takes at least one byte, so a larger count can only
/// come from a corrupt or truncated file. Checking it here keeps a forged
/// count from driving a huge allocation.
pub(crate) fn read_count(r: &mut ByteReader<'_>) -> Result<usize, DecodeError> {
    let offset = r.position();
    let count = r.read_varint()?;
    let available = r.remaining();
    match usize::try_from(count) {
        Ok(n) if n <= available => Ok(n),
        _ => Err(DecodeError::Truncated {
            offset,
            needed: usize::try_from(count).unwrap_or(usize::MAX),
            available,
        }),
    }
}

/// Reads and validates the header without touching the rest of the file.
///
/// The checksum is not verified here.
pub fn read_header(bytes: &[u8]) -> Result<Header, DecodeError> {
    let header = Header::parse(bytes)?;
    header.validate()?;
    Ok(header)
}

/// Header plus the loaded tables, shared by [`decode`] and
/// [`inspect`](crate::inspect).
pub(crate) struct Sections<'a> {
    pub header: Header,
    pub strings: StringTable,
    pub paths: PathTable,
    pub reader: ByteReader<'a>,
    pub strings_end: usize,
}

/// Validates the header, size and checksum, then loads both tables.
pub(crate) fn open(bytes: &[u8]) -> Result<Sections<'_>, DecodeError> {
    let header = read_header(bytes)?;
    let file_size = header.file_size as usize;
    if file_size > bytes.len() {
        return Err(DecodeError::Truncated {
            offset: 0,
            needed: file_size,
            available: bytes.len(),
        });
    }
    if bytes.len() > file_size {
        return Err(DecodeError::TrailingBytes {
            offset: file_size,
            count: bytes.len() - file_size,
        });
    }
    let actual = adler32(&bytes[HEADER_SIZE..file_size]);
    if actual != header.checksum {
        return Err(HeaderError::ChecksumMismatch {
            expected: header.checksum,
            actual,
        }
        .into());
    }

    let mut reader = ByteReader::new(bytes);
    reader.seek(HEADER_SIZE)?;
    let strings = StringTable::read(&mut reader)?;
    let strings_end = reader.position();
    let paths = PathTable::read(&mut reader, &strings)?;
    if reader.position() != header.root_offset as usize {
        return Err(HeaderError::BadOffset {
            field: "root",
            offset: header.root_offset,
            file_size: header.file_size,
        }
        .into());
    }
    Ok(Sections {
        header,
        strings,
        paths,
        reader,
        strings_end,
    })
}

/// Decodes a complete BAST file into a [`Nebula`].
pub fn decode(bytes: &[u8]) -> Result<Nebula, DecodeErrors> {
    let result = open(bytes).and_then(|sections| {
        let header = sections.header;
        let nebula = BastReader::new(sections).read_root()?;
        debug!(
            "decoded {} definitions from {} bytes (flags {:#06x})",
            nebula.definition_count(),
            header.file_size,
            header.flags.bits()
        );
        Ok(nebula)
    });
    result.map_err(|e| {
        warn!("rejecting BAST input: {e}");
        DecodeErrors::from(e)
    })
}

/// Per-call decoding context.
pub(crate) struct BastReader<'a> {
    r: ByteReader<'a>,
    strings: StringTable,
    paths: PathTable,
    locations: LocationDecoder,
    flags: Flags,
    depth: usize,
}

impl<'a> BastReader<'a> {
    pub(crate) fn new(sections: Sections<'a>) -> Self {
        Self {
            r: sections.reader,
            strings: sections.strings,
            paths: sections.paths,
            locations: LocationDecoder::new(),
            flags: sections.header.flags,
            depth: 0,
        }
    }

    /// Reads the root node and checks that it ends exactly at end of file.
    pub(crate) fn read_root(mut self) -> Result<Nebula, DecodeError> {
        let at = self.r.position();
        let (tag, has_meta) = self.node_tag()?;
        if tag != NodeTag::Nebula || has_meta {
            return Err(DecodeError::Malformed {
                offset: at,
                reason: format!("root node must be a plain nebula, found {tag:?}"),
            });
        }
        let contents = self.definitions()?;
        if !self.r.is_at_end() {
            return Err(DecodeError::TrailingBytes {
                offset: self.r.position(),
                count: self.r.remaining(),
            });
        }
        Ok(Nebula::new(contents))
    }

    // ---- primitives ----

    fn malformed(&self, offset: usize, reason: impl Into<String>) -> DecodeError {
        DecodeError::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<T, DecodeError> {
        if self.depth >= MAX_DEPTH {
            return Err(DecodeError::NestingTooDeep {
                max: MAX_DEPTH,
                offset: self.r.position(),
            });
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    fn expect_tag<T: Tag>(&mut self) -> Result<T, DecodeError> {
        let offset = self.r.position();
        let byte = self.r.read_u8()?;
        T::try_from(byte).map_err(|tag| DecodeError::TagDispatch {
            category: T::CATEGORY,
            tag,
            offset,
        })
    }

    /// Reads a node tag byte, splitting off the metadata flag.
    fn node_tag(&mut self) -> Result<(NodeTag, bool), DecodeError> {
        let offset = self.r.position();
        let byte = self.r.read_u8()?;
        let tag = NodeTag::try_from(byte & TAG_MASK).map_err(|_| DecodeError::TagDispatch {
            category: NodeTag::CATEGORY,
            tag: byte,
            offset,
        })?;
        Ok((tag, byte & META_FLAG != 0))
    }

    fn flag(&mut self) -> Result<bool, DecodeError> {
        let offset = self.r.position();
        match self.r.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.malformed(
                offset,
                format!("expected presence byte 0 or 1, found {other}"),
            )),
        }
    }

    fn count(&mut self) -> Result<usize, DecodeError> {
        read_count(&mut self.r)
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let at = self.r.position();
        let index = self.r.read_varint()?;
        Ok(self.strings.lookup(index, at)?.to_owned())
    }

    fn string_list(&mut self) -> Result<Vec<String>, DecodeError> {
        let n = self.count()?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.string()?);
        }
        Ok(out)
    }

    fn path(&mut self) -> Result<PathIdentifier, DecodeError> {
        let at = self.r.position();
        let d = self.r.read_varint()?;
        if d & 1 == 1 {
            return Ok(self.paths.lookup(d >> 1, at)?.clone());
        }
        let n = usize::try_from(d >> 1)
            .ok()
            .filter(|&n| n <= self.r.remaining())
            .ok_or(DecodeError::Truncated {
                offset: at,
                needed: usize::try_from(d >> 1).unwrap_or(usize::MAX),
                available: self.r.remaining(),
            })?;
        let mut parts = Vec::with_capacity(n);
        for _ in 0..n {
            parts.push(self.string()?);
        }
        Ok(PathIdentifier { value: parts })
    }

    fn location(&mut self) -> Result<Option<Location>, DecodeError> {
        if !self.flags.has_locations() {
            return Ok(None);
        }
        self.locations.decode(&mut self.r, &self.strings)
    }

    fn identifier(&mut self) -> Result<Identifier, DecodeError> {
        let loc = self.location()?;
        let value = self.string()?;
        Ok(Identifier { loc, value })
    }

    fn reference(&mut self) -> Result<Reference, DecodeError> {
        let kind = self.expect_tag::<RefTag>()?.into();
        let loc = self.location()?;
        let path = self.path()?;
        Ok(Reference { kind, loc, path })
    }

    fn message_ref(&mut self) -> Result<MessageRef, DecodeError> {
        let kind = self.expect_tag::<MessageRefTag>()?.into();
        let loc = self.location()?;
        let path = self.path()?;
        Ok(MessageRef { kind, loc, path })
    }

    fn type_ref(&mut self) -> Result<TypeRef, DecodeError> {
        let loc = self.location()?;
        let path = self.path()?;
        Ok(TypeRef { loc, path })
    }

    // ---- definitions ----

    fn definitions(&mut self) -> Result<Vec<Definition>, DecodeError> {
        let n = self.count()?;
        let mut defs = Vec::with_capacity(n);
        for _ in 0..n {
            defs.push(self.nested(Self::definition)?);
        }
        Ok(defs)
    }

    fn metadata(&mut self, present: bool) -> Result<Vec<Meta>, DecodeError> {
        if !present {
            return Ok(Vec::new());
        }
        let at = self.r.position();
        let n = self.count()?;
        if n == 0 {
            return Err(self.malformed(at, "metadata flag set on an empty metadata block"));
        }
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.meta()?);
        }
        Ok(out)
    }

    fn definition(&mut self) -> Result<Definition, DecodeError> {
        let at = self.r.position();
        let (tag, has_meta) = self.node_tag()?;
        let loc = self.location()?;
        let metadata = self.metadata(has_meta)?;

        let container = |me: &mut Self, loc, metadata| -> Result<Container, DecodeError> {
            let id = me.identifier()?;
            let contents = me.definitions()?;
            Ok(Container {
                loc,
                id,
                contents,
                metadata,
            })
        };

        let def = match tag {
            NodeTag::Domain => Definition::Domain(container(self, loc, metadata)?),
            NodeTag::Context => Definition::Context(container(self, loc, metadata)?),
            NodeTag::Entity => Definition::Entity(container(self, loc, metadata)?),
            NodeTag::Repository => Definition::Repository(container(self, loc, metadata)?),
            NodeTag::Projector => Definition::Projector(container(self, loc, metadata)?),
            NodeTag::Handler => Definition::Handler(container(self, loc, metadata)?),
            NodeTag::Adaptor => {
                let id = self.identifier()?;
                let dir_at = self.r.position();
                let direction = match self.r.read_u8()? {
                    0 => AdaptorDirection::Inbound,
                    1 => AdaptorDirection::Outbound,
                    other => {
                        return Err(
                            self.malformed(dir_at, format!("unknown adaptor direction {other}"))
                        )
                    }
                };
                let referent = self.reference()?;
                let contents = self.definitions()?;
                Definition::Adaptor(Adaptor {
                    loc,
                    id,
                    direction,
                    referent,
                    contents,
                    metadata,
                })
            }
            NodeTag::Saga => {
                let id = self.identifier()?;
                let input = self.optional_aggregation()?;
                let output = self.optional_aggregation()?;
                let contents = self.definitions()?;
                Definition::Saga(Saga {
                    loc,
                    id,
                    input,
                    output,
                    contents,
                    metadata,
                })
            }
            NodeTag::SagaStep => {
                let id = self.identifier()?;
                let do_statements = self.statements()?;
                let undo_statements = self.statements()?;
                Definition::SagaStep(SagaStep {
                    loc,
                    id,
                    do_statements,
                    undo_statements,
                    metadata,
                })
            }
            NodeTag::Streamlet => {
                let id = self.identifier()?;
                let kind = self.expect_tag::<ShapeTag>()?.into();
                let shape = StreamletShape {
                    kind,
                    loc: self.location()?,
                };
                let contents = self.definitions()?;
                Definition::Streamlet(Streamlet {
                    loc,
                    id,
                    shape,
                    contents,
                    metadata,
                })
            }
            NodeTag::Inlet | NodeTag::Outlet => {
                let portlet = Portlet {
                    loc,
                    id: self.identifier()?,
                    type_ref: self.type_ref()?,
                    metadata,
                };
                if tag == NodeTag::Inlet {
                    Definition::Inlet(portlet)
                } else {
                    Definition::Outlet(portlet)
                }
            }
            NodeTag::Connector => Definition::Connector(Connector {
                loc,
                id: self.identifier()?,
                from: self.reference()?,
                to: self.reference()?,
                metadata,
            }),
            NodeTag::OnClause => {
                let trig_at = self.r.position();
                let trigger = match self.r.read_u8()? {
                    0 => OnTrigger::Init,
                    1 => OnTrigger::Term,
                    2 => OnTrigger::Other,
                    3 => OnTrigger::Message(self.message_ref()?),
                    other => {
                        return Err(
                            self.malformed(trig_at, format!("unknown on-clause trigger {other}"))
                        )
                    }
                };
                let statements = self.statements()?;
                Definition::OnClause(OnClause {
                    loc,
                    trigger,
                    statements,
                    metadata,
                })
            }
            NodeTag::State => Definition::State(State {
                loc,
                id: self.identifier()?,
                type_ref: self.type_ref()?,
                metadata,
            }),
            NodeTag::Type => Definition::Type(TypeDef {
                loc,
                id: self.identifier()?,
                type_ex: self.type_expression()?,
                metadata,
            }),
            NodeTag::Field => Definition::Field(Field {
                loc,
                id: self.identifier()?,
                type_ex: self.type_expression()?,
                metadata,
            }),
            NodeTag::Function => {
                let id = self.identifier()?;
                let input = self.optional_aggregation()?;
                let output = self.optional_aggregation()?;
                let statements = self.statements()?;
                Definition::Function(Function {
                    loc,
                    id,
                    input,
                    output,
                    statements,
                    metadata,
                })
            }
            NodeTag::Invariant => {
                let id = self.identifier()?;
                let condition = if self.flag()? { Some(self.string()?) } else { None };
                Definition::Invariant(Invariant {
                    loc,
                    id,
                    condition,
                    metadata,
                })
            }
            NodeTag::Constant => Definition::Constant(Constant {
                loc,
                id: self.identifier()?,
                type_ex: self.type_expression()?,
                value: self.string()?,
                metadata,
            }),
            NodeTag::Author => Definition::Author(Author {
                loc,
                id: self.identifier()?,
                name: self.string()?,
                email: self.string()?,
                metadata,
            }),
            NodeTag::Include => {
                if !metadata.is_empty() {
                    return Err(self.malformed(at, "include nodes cannot carry metadata"));
                }
                let origin = self.string()?;
                let contents = self.definitions()?;
                Definition::Include(Include {
                    loc,
                    origin,
                    contents,
                })
            }
            NodeTag::Nebula => {
                return Err(self.malformed(at, "nebula is only valid as the root node"))
            }
        };
        Ok(def)
    }

    fn field_node(&mut self) -> Result<Field, DecodeError> {
        let at = self.r.position();
        match self.nested(Self::definition)? {
            Definition::Field(f) => Ok(f),
            other => Err(self.malformed(
                at,
                format!("aggregation member must be a field, found {}", other.kind_name()),
            )),
        }
    }

    fn aggregation_body(&mut self, loc: Option<Location>) -> Result<Aggregation, DecodeError> {
        let n = self.count()?;
        let mut fields = Vec::with_capacity(n);
        for _ in 0..n {
            fields.push(self.field_node()?);
        }
        Ok(Aggregation { loc, fields })
    }

    fn optional_aggregation(&mut self) -> Result<Option<Aggregation>, DecodeError> {
        if !self.flag()? {
            return Ok(None);
        }
        let loc = self.location()?;
        Ok(Some(self.aggregation_body(loc)?))
    }

    // ---- type expressions ----

    fn boxed_type(&mut self) -> Result<Box<TypeExpression>, DecodeError> {
        Ok(Box::new(self.type_expression()?))
    }

    fn type_expression(&mut self) -> Result<TypeExpression, DecodeError> {
        self.nested(Self::type_expression_inner)
    }

    fn type_expression_inner(&mut self) -> Result<TypeExpression, DecodeError> {
        let tag = self.expect_tag::<TypeTag>()?;
        let loc = self.location()?;
        let te = match tag {
            TypeTag::String => {
                let at = self.r.position();
                let bits = self.r.read_u8()?;
                if bits & !0b11 != 0 {
                    return Err(
                        self.malformed(at, format!("unknown string bounds bits {bits:#04x}"))
                    );
                }
                let min = if bits & 0b01 != 0 { Some(self.r.read_varint()?) } else { None };
                let max = if bits & 0b10 != 0 { Some(self.r.read_varint()?) } else { None };
                TypeExpression::String { loc, min, max }
            }
            TypeTag::Integer => TypeExpression::Integer { loc },
            TypeTag::Whole => TypeExpression::Whole { loc },
            TypeTag::Natural => TypeExpression::Natural { loc },
            TypeTag::Number => TypeExpression::Number { loc },
            TypeTag::Boolean => TypeExpression::Boolean { loc },
            TypeTag::Real => TypeExpression::Real { loc },
            TypeTag::Decimal => TypeExpression::Decimal {
                loc,
                whole: self.r.read_varint()?,
                fractional: self.r.read_varint()?,
            },
            TypeTag::Date => TypeExpression::Date { loc },
            TypeTag::Time => TypeExpression::Time { loc },
            TypeTag::DateTime => TypeExpression::DateTime { loc },
            TypeTag::TimeStamp => TypeExpression::TimeStamp { loc },
            TypeTag::Duration => TypeExpression::Duration { loc },
            TypeTag::Uuid => TypeExpression::Uuid { loc },
            TypeTag::Url => {
                let scheme = if self.flag()? { Some(self.string()?) } else { None };
                TypeExpression::Url { loc, scheme }
            }
            TypeTag::Currency => TypeExpression::Currency {
                loc,
                country: self.string()?,
            },
            TypeTag::Nothing => TypeExpression::Nothing { loc },
            TypeTag::Abstract => TypeExpression::Abstract { loc },
            TypeTag::Pattern => TypeExpression::Pattern {
                loc,
                patterns: self.string_list()?,
            },
            TypeTag::Range => TypeExpression::Range {
                loc,
                min: self.r.read_zigzag()?,
                max: self.r.read_zigzag()?,
            },
            TypeTag::Enumeration => {
                let n = self.count()?;
                let mut enumerators = Vec::with_capacity(n);
                for _ in 0..n {
                    let loc = self.location()?;
                    let id = self.identifier()?;
                    let value = if self.flag()? { Some(self.r.read_zigzag()?) } else { None };
                    enumerators.push(Enumerator { loc, id, value });
                }
                TypeExpression::Enumeration { loc, enumerators }
            }
            TypeTag::Alternation => {
                let n = self.count()?;
                let mut of = Vec::with_capacity(n);
                for _ in 0..n {
                    of.push(self.type_expression()?);
                }
                TypeExpression::Alternation { loc, of }
            }
            TypeTag::Aggregation => TypeExpression::Aggregation(self.aggregation_body(loc)?),
            TypeTag::Message => {
                let at = self.r.position();
                let ordinal = self.r.read_u8()?;
                let kind = message_kind_from_ordinal(ordinal)
                    .ok_or_else(|| self.malformed(at, format!("unknown message kind {ordinal}")))?;
                TypeExpression::Message {
                    kind,
                    aggregation: self.aggregation_body(loc)?,
                }
            }
            TypeTag::Alias => TypeExpression::Alias {
                loc,
                path: self.path()?,
            },
            TypeTag::EntityReference => TypeExpression::EntityReference {
                loc,
                entity: self.path()?,
            },
            TypeTag::Optional => TypeExpression::Optional {
                loc,
                of: self.boxed_type()?,
            },
            TypeTag::ZeroOrMore => TypeExpression::ZeroOrMore {
                loc,
                of: self.boxed_type()?,
            },
            TypeTag::OneOrMore => TypeExpression::OneOrMore {
                loc,
                of: self.boxed_type()?,
            },
            TypeTag::SpecificRange => TypeExpression::SpecificRange {
                loc,
                of: self.boxed_type()?,
                min: self.r.read_varint()?,
                max: self.r.read_varint()?,
            },
            TypeTag::Mapping => TypeExpression::Mapping {
                loc,
                from: self.boxed_type()?,
                to: self.boxed_type()?,
            },
            TypeTag::Sequence => TypeExpression::Sequence {
                loc,
                of: self.boxed_type()?,
            },
            TypeTag::Set => TypeExpression::Set {
                loc,
                of: self.boxed_type()?,
            },
        };
        Ok(te)
    }

    // ---- statements ----

    fn statements(&mut self) -> Result<Vec<Statement>, DecodeError> {
        let n = self.count()?;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.nested(Self::statement)?);
        }
        Ok(out)
    }

    fn statement(&mut self) -> Result<Statement, DecodeError> {
        let tag = self.expect_tag::<StatementTag>()?;
        let loc = self.location()?;
        let st = match tag {
            StatementTag::Arbitrary => Statement::Arbitrary {
                loc,
                what: self.string()?,
            },
            StatementTag::Error => Statement::Error {
                loc,
                message: self.string()?,
            },
            StatementTag::Set => Statement::Set {
                loc,
                field: self.reference()?,
                value: self.string()?,
            },
            StatementTag::Send => Statement::Send {
                loc,
                msg: self.message_ref()?,
                portlet: self.reference()?,
            },
            StatementTag::Tell => Statement::Tell {
                loc,
                msg: self.message_ref()?,
                to: self.reference()?,
            },
            StatementTag::Morph => Statement::Morph {
                loc,
                entity: self.reference()?,
                state: self.reference()?,
                value: self.message_ref()?,
            },
            StatementTag::Become => Statement::Become {
                loc,
                entity: self.reference()?,
                handler: self.reference()?,
            },
            StatementTag::Call => Statement::Call {
                loc,
                function: self.reference()?,
            },
            StatementTag::Return => Statement::Return {
                loc,
                value: self.string()?,
            },
            StatementTag::When => Statement::When {
                loc,
                condition: self.string()?,
                then: self.statements()?,
                otherwise: self.statements()?,
            },
        };
        Ok(st)
    }

    // ---- metadata ----

    fn meta(&mut self) -> Result<Meta, DecodeError> {
        let tag = self.expect_tag::<MetaTag>()?;
        let loc = self.location()?;
        let m = match tag {
            MetaTag::BriefDescription => Meta::BriefDescription {
                loc,
                text: self.string()?,
            },
            MetaTag::Description => Meta::Description {
                loc,
                lines: self.string_list()?,
            },
            MetaTag::LineComment => Meta::LineComment {
                loc,
                text: self.string()?,
            },
            MetaTag::BlockComment => Meta::BlockComment {
                loc,
                lines: self.string_list()?,
            },
            MetaTag::Term => Meta::Term {
                loc,
                id: self.identifier()?,
                definition: self.string_list()?,
            },
            MetaTag::OptionValue => Meta::OptionValue {
                loc,
                name: self.string()?,
                args: self.string_list()?,
            },
            MetaTag::AuthorRef => Meta::AuthorRef {
                loc,
                path: self.path()?,
            },
            MetaTag::Attachment => Meta::Attachment {
                loc,
                id: self.identifier()?,
                mime_type: self.string()?,
                data: self.string()?,
            },
        };
        Ok(m)
    }
}
