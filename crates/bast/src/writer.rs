//! The encoder.
//!
//! Encoding walks the tree twice through the same [`Sink`] traversal. The
//! [`Collector`] pass interns every string and counts every path; the
//! [`Emitter`] pass writes the node stream against the finished tables.
//! Because both passes run the same code, every string and path the emitter
//! meets was already seen by the collector.

use ast::{
    Aggregation, Definition, Enumerator, Field, Identifier, Location, MessageRef, Meta, Nebula,
    OnTrigger, PathIdentifier, Reference, Statement, TypeExpression, TypeRef,
};
use bytebuf::ByteWriter;
use config::CodecConfig;
use log::{debug, trace};

use crate::checksum::Adler32;
use crate::error::EncodeError;
use crate::format::{Flags, Header, HEADER_SIZE, MAX_SIZE};
use crate::location::LocationEncoder;
use crate::reader::MAX_DEPTH;
use crate::tables::{PathTable, PathTableBuilder, StringTableBuilder};
use crate::tags::{
    message_kind_ordinal, MessageRefTag, MetaTag, NodeTag, RefTag, ShapeTag, StatementTag,
    TypeTag, META_FLAG,
};

/// Receiver of the encoded value stream.
trait Sink {
    fn config(&self) -> &CodecConfig;
    fn u8(&mut self, v: u8);
    fn varint(&mut self, v: u64);
    fn zigzag(&mut self, v: i64);
    fn string(&mut self, s: &str);
    fn path(&mut self, p: &PathIdentifier);
    fn location(&mut self, loc: Option<&Location>);

    fn count(&mut self, n: usize) {
        self.varint(n as u64);
    }

    /// Brackets one level of the nesting the decoder counts against
    /// [`MAX_DEPTH`].
    fn enter(&mut self) {}
    fn leave(&mut self) {}
}

/// Pass 1: interns strings and counts paths, writes nothing.
struct Collector<'c> {
    cfg: &'c CodecConfig,
    strings: StringTableBuilder,
    paths: PathTableBuilder,
    depth: usize,
    max_depth: usize,
}

impl Sink for Collector<'_> {
    fn config(&self) -> &CodecConfig {
        self.cfg
    }

    fn u8(&mut self, _: u8) {}

    fn varint(&mut self, _: u64) {}

    fn zigzag(&mut self, _: i64) {}

    fn string(&mut self, s: &str) {
        self.strings.intern(s);
    }

    fn path(&mut self, p: &PathIdentifier) {
        for part in &p.value {
            self.strings.intern(part);
        }
        self.paths.observe(p);
    }

    fn location(&mut self, loc: Option<&Location>) {
        if let (true, Some(loc)) = (self.cfg.locations, loc) {
            self.strings.intern(&loc.source);
        }
    }

    fn enter(&mut self) {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

/// Pass 2: writes the node stream.
struct Emitter<'c> {
    cfg: &'c CodecConfig,
    out: ByteWriter,
    strings: StringTableBuilder,
    paths: PathTable,
    locations: LocationEncoder,
}

impl Sink for Emitter<'_> {
    fn config(&self) -> &CodecConfig {
        self.cfg
    }

    fn u8(&mut self, v: u8) {
        self.out.write_u8(v);
    }

    fn varint(&mut self, v: u64) {
        self.out.write_varint(v);
    }

    fn zigzag(&mut self, v: i64) {
        self.out.write_zigzag(v);
    }

    fn string(&mut self, s: &str) {
        let i = self.strings.intern(s);
        self.out.write_varint(u64::from(i));
    }

    fn path(&mut self, p: &PathIdentifier) {
        if let Some(i) = self.paths.position(p) {
            self.out.write_varint((u64::from(i) << 1) | 1);
            return;
        }
        self.out.write_varint((p.len() as u64) << 1);
        for part in &p.value {
            let i = self.strings.intern(part);
            self.out.write_varint(u64::from(i));
        }
    }

    fn location(&mut self, loc: Option<&Location>) {
        if !self.cfg.locations {
            return;
        }
        let site = loc.map(|l| (self.strings.intern(&l.source), l));
        self.locations.encode(&mut self.out, site);
    }
}

/// Encodes `nebula` into a complete BAST file.
///
/// The output depends only on the tree and `cfg`: encoding the same input
/// twice yields identical bytes. Trees nested deeper than [`MAX_DEPTH`] are
/// refused, since the decoder would reject them.
pub fn encode(nebula: &Nebula, cfg: &CodecConfig) -> Result<Vec<u8>, EncodeError> {
    let mut collector = Collector {
        cfg,
        strings: StringTableBuilder::new(),
        paths: PathTableBuilder::new(),
        depth: 0,
        max_depth: 0,
    };
    root(&mut collector, nebula);
    if collector.max_depth > MAX_DEPTH {
        return Err(EncodeError::TooDeep { max: MAX_DEPTH });
    }

    let mut emitter = Emitter {
        cfg,
        out: ByteWriter::new(),
        strings: collector.strings,
        paths: collector.paths.freeze(),
        locations: LocationEncoder::new(),
    };
    root(&mut emitter, nebula);
    let Emitter {
        out: nodes,
        mut strings,
        paths,
        ..
    } = emitter;

    let mut path_bytes = ByteWriter::new();
    paths.write_to(&mut path_bytes, &mut strings);
    let strings = strings.freeze();
    let mut string_bytes = ByteWriter::new();
    strings.write_to(&mut string_bytes);

    let root_offset = HEADER_SIZE + string_bytes.position() + path_bytes.position();
    let file_size = root_offset + nodes.position();
    if file_size > MAX_SIZE {
        return Err(EncodeError::TooLarge {
            size: file_size,
            max: MAX_SIZE,
        });
    }

    let mut hasher = Adler32::new();
    hasher.update(string_bytes.as_slice());
    hasher.update(path_bytes.as_slice());
    hasher.update(nodes.as_slice());

    // Both values are bounded by MAX_SIZE, which fits in a u32.
    let header = Header::new(
        Flags::from(cfg),
        root_offset as u32,
        file_size as u32,
        hasher.finish(),
    );
    let mut out = ByteWriter::with_capacity(file_size);
    header.write_to(&mut out);
    out.write_bytes(string_bytes.as_slice());
    out.write_bytes(path_bytes.as_slice());
    out.write_bytes(nodes.as_slice());

    trace!(
        "bast sections: strings@{} paths@{} root@{} end@{}",
        HEADER_SIZE,
        HEADER_SIZE + string_bytes.position(),
        root_offset,
        file_size
    );
    debug!(
        "encoded {} definitions: {} strings, {} shared paths, {} bytes",
        nebula.definition_count(),
        strings.len(),
        paths.len(),
        file_size
    );
    Ok(out.into_bytes())
}

fn root<S: Sink>(s: &mut S, nebula: &Nebula) {
    s.u8(NodeTag::Nebula.into());
    definitions(s, &nebula.contents);
}

fn definitions<S: Sink>(s: &mut S, defs: &[Definition]) {
    s.count(defs.len());
    for d in defs {
        s.enter();
        definition(s, d);
        s.leave();
    }
}

fn kept<'m>(cfg: &CodecConfig, metadata: &'m [Meta]) -> Vec<&'m Meta> {
    metadata
        .iter()
        .filter(|m| (cfg.comments || !m.is_comment()) && (cfg.descriptions || !m.is_description()))
        .collect()
}

/// `tag|meta [location] [metadata]`, common to every definition node.
fn node_header<S: Sink>(s: &mut S, tag: NodeTag, loc: Option<&Location>, metadata: &[Meta]) {
    let metadata = kept(s.config(), metadata);
    let tag = u8::from(tag);
    s.u8(if metadata.is_empty() { tag } else { tag | META_FLAG });
    s.location(loc);
    if !metadata.is_empty() {
        s.count(metadata.len());
        for m in metadata {
            meta(s, m);
        }
    }
}

fn definition<S: Sink>(s: &mut S, def: &Definition) {
    node_header(s, NodeTag::of(def), def.loc(), def.metadata());
    match def {
        Definition::Domain(c)
        | Definition::Context(c)
        | Definition::Entity(c)
        | Definition::Repository(c)
        | Definition::Projector(c)
        | Definition::Handler(c) => {
            identifier(s, &c.id);
            definitions(s, &c.contents);
        }
        Definition::Adaptor(a) => {
            identifier(s, &a.id);
            s.u8(match a.direction {
                ast::AdaptorDirection::Inbound => 0,
                ast::AdaptorDirection::Outbound => 1,
            });
            reference(s, &a.referent);
            definitions(s, &a.contents);
        }
        Definition::Saga(saga) => {
            identifier(s, &saga.id);
            optional_aggregation(s, saga.input.as_ref());
            optional_aggregation(s, saga.output.as_ref());
            definitions(s, &saga.contents);
        }
        Definition::SagaStep(step) => {
            identifier(s, &step.id);
            statements(s, &step.do_statements);
            statements(s, &step.undo_statements);
        }
        Definition::Streamlet(st) => {
            identifier(s, &st.id);
            s.u8(ShapeTag::from(st.shape.kind).into());
            s.location(st.shape.loc.as_ref());
            definitions(s, &st.contents);
        }
        Definition::Inlet(p) | Definition::Outlet(p) => {
            identifier(s, &p.id);
            type_ref(s, &p.type_ref);
        }
        Definition::Connector(c) => {
            identifier(s, &c.id);
            reference(s, &c.from);
            reference(s, &c.to);
        }
        Definition::OnClause(on) => {
            match &on.trigger {
                OnTrigger::Init => s.u8(0),
                OnTrigger::Term => s.u8(1),
                OnTrigger::Other => s.u8(2),
                OnTrigger::Message(m) => {
                    s.u8(3);
                    message_ref(s, m);
                }
            }
            statements(s, &on.statements);
        }
        Definition::State(st) => {
            identifier(s, &st.id);
            type_ref(s, &st.type_ref);
        }
        Definition::Type(t) => {
            identifier(s, &t.id);
            type_expression(s, &t.type_ex);
        }
        Definition::Field(f) => {
            identifier(s, &f.id);
            type_expression(s, &f.type_ex);
        }
        Definition::Function(f) => {
            identifier(s, &f.id);
            optional_aggregation(s, f.input.as_ref());
            optional_aggregation(s, f.output.as_ref());
            statements(s, &f.statements);
        }
        Definition::Invariant(inv) => {
            identifier(s, &inv.id);
            match &inv.condition {
                Some(c) => {
                    s.u8(1);
                    s.string(c);
                }
                None => s.u8(0),
            }
        }
        Definition::Constant(c) => {
            identifier(s, &c.id);
            type_expression(s, &c.type_ex);
            s.string(&c.value);
        }
        Definition::Author(a) => {
            identifier(s, &a.id);
            s.string(&a.name);
            s.string(&a.email);
        }
        Definition::Include(inc) => {
            s.string(&inc.origin);
            definitions(s, &inc.contents);
        }
    }
}

/// A field as a full definition node, as it appears inside aggregations.
fn field_node<S: Sink>(s: &mut S, field: &Field) {
    node_header(s, NodeTag::Field, field.loc.as_ref(), &field.metadata);
    identifier(s, &field.id);
    type_expression(s, &field.type_ex);
}

fn identifier<S: Sink>(s: &mut S, id: &Identifier) {
    s.location(id.loc.as_ref());
    s.string(&id.value);
}

fn string_list<S: Sink>(s: &mut S, list: &[String]) {
    s.count(list.len());
    for item in list {
        s.string(item);
    }
}

fn reference<S: Sink>(s: &mut S, r: &Reference) {
    s.u8(RefTag::from(r.kind).into());
    s.location(r.loc.as_ref());
    s.path(&r.path);
}

fn message_ref<S: Sink>(s: &mut S, m: &MessageRef) {
    s.u8(MessageRefTag::from(m.kind).into());
    s.location(m.loc.as_ref());
    s.path(&m.path);
}

fn type_ref<S: Sink>(s: &mut S, t: &TypeRef) {
    s.location(t.loc.as_ref());
    s.path(&t.path);
}

fn aggregation_body<S: Sink>(s: &mut S, agg: &Aggregation) {
    s.count(agg.fields.len());
    for f in &agg.fields {
        s.enter();
        field_node(s, f);
        s.leave();
    }
}

fn optional_aggregation<S: Sink>(s: &mut S, agg: Option<&Aggregation>) {
    match agg {
        Some(agg) => {
            s.u8(1);
            s.location(agg.loc.as_ref());
            aggregation_body(s, agg);
        }
        None => s.u8(0),
    }
}

fn enumerator<S: Sink>(s: &mut S, e: &Enumerator) {
    s.location(e.loc.as_ref());
    identifier(s, &e.id);
    match e.value {
        Some(v) => {
            s.u8(1);
            s.zigzag(v);
        }
        None => s.u8(0),
    }
}

fn type_expression<S: Sink>(s: &mut S, te: &TypeExpression) {
    s.enter();
    type_expression_inner(s, te);
    s.leave();
}

fn type_expression_inner<S: Sink>(s: &mut S, te: &TypeExpression) {
    s.u8(TypeTag::of(te).into());
    s.location(te.loc());
    match te {
        TypeExpression::String { min, max, .. } => {
            s.u8(u8::from(min.is_some()) | (u8::from(max.is_some()) << 1));
            if let Some(min) = min {
                s.varint(*min);
            }
            if let Some(max) = max {
                s.varint(*max);
            }
        }
        TypeExpression::Decimal {
            whole, fractional, ..
        } => {
            s.varint(*whole);
            s.varint(*fractional);
        }
        TypeExpression::Url { scheme, .. } => match scheme {
            Some(scheme) => {
                s.u8(1);
                s.string(scheme);
            }
            None => s.u8(0),
        },
        TypeExpression::Currency { country, .. } => s.string(country),
        TypeExpression::Pattern { patterns, .. } => string_list(s, patterns),
        TypeExpression::Range { min, max, .. } => {
            s.zigzag(*min);
            s.zigzag(*max);
        }
        TypeExpression::Enumeration { enumerators, .. } => {
            s.count(enumerators.len());
            for e in enumerators {
                enumerator(s, e);
            }
        }
        TypeExpression::Alternation { of, .. } => {
            s.count(of.len());
            for te in of {
                type_expression(s, te);
            }
        }
        TypeExpression::Aggregation(agg) => aggregation_body(s, agg),
        TypeExpression::Message { kind, aggregation } => {
            s.u8(message_kind_ordinal(*kind));
            aggregation_body(s, aggregation);
        }
        TypeExpression::Alias { path, .. } => s.path(path),
        TypeExpression::EntityReference { entity, .. } => s.path(entity),
        TypeExpression::Optional { of, .. }
        | TypeExpression::ZeroOrMore { of, .. }
        | TypeExpression::OneOrMore { of, .. }
        | TypeExpression::Sequence { of, .. }
        | TypeExpression::Set { of, .. } => type_expression(s, of),
        TypeExpression::SpecificRange { of, min, max, .. } => {
            type_expression(s, of);
            s.varint(*min);
            s.varint(*max);
        }
        TypeExpression::Mapping { from, to, .. } => {
            type_expression(s, from);
            type_expression(s, to);
        }
        TypeExpression::Integer { .. }
        | TypeExpression::Whole { .. }
        | TypeExpression::Natural { .. }
        | TypeExpression::Number { .. }
        | TypeExpression::Boolean { .. }
        | TypeExpression::Real { .. }
        | TypeExpression::Date { .. }
        | TypeExpression::Time { .. }
        | TypeExpression::DateTime { .. }
        | TypeExpression::TimeStamp { .. }
        | TypeExpression::Duration { .. }
        | TypeExpression::Uuid { .. }
        | TypeExpression::Nothing { .. }
        | TypeExpression::Abstract { .. } => {}
    }
}

fn statements<S: Sink>(s: &mut S, list: &[Statement]) {
    s.count(list.len());
    for st in list {
        s.enter();
        statement(s, st);
        s.leave();
    }
}

fn statement<S: Sink>(s: &mut S, st: &Statement) {
    s.u8(StatementTag::of(st).into());
    s.location(st.loc());
    match st {
        Statement::Arbitrary { what, .. } => s.string(what),
        Statement::Error { message, .. } => s.string(message),
        Statement::Set { field, value, .. } => {
            reference(s, field);
            s.string(value);
        }
        Statement::Send { msg, portlet, .. } => {
            message_ref(s, msg);
            reference(s, portlet);
        }
        Statement::Tell { msg, to, .. } => {
            message_ref(s, msg);
            reference(s, to);
        }
        Statement::Morph {
            entity,
            state,
            value,
            ..
        } => {
            reference(s, entity);
            reference(s, state);
            message_ref(s, value);
        }
        Statement::Become {
            entity, handler, ..
        } => {
            reference(s, entity);
            reference(s, handler);
        }
        Statement::Call { function, .. } => reference(s, function),
        Statement::Return { value, .. } => s.string(value),
        Statement::When {
            condition,
            then,
            otherwise,
            ..
        } => {
            s.string(condition);
            statements(s, then);
            statements(s, otherwise);
        }
    }
}

fn meta<S: Sink>(s: &mut S, m: &Meta) {
    s.u8(MetaTag::of(m).into());
    match m {
        Meta::BriefDescription { loc, text } | Meta::LineComment { loc, text } => {
            s.location(loc.as_ref());
            s.string(text);
        }
        Meta::Description { loc, lines } | Meta::BlockComment { loc, lines } => {
            s.location(loc.as_ref());
            string_list(s, lines);
        }
        Meta::Term {
            loc,
            id,
            definition,
        } => {
            s.location(loc.as_ref());
            identifier(s, id);
            string_list(s, definition);
        }
        Meta::OptionValue { loc, name, args } => {
            s.location(loc.as_ref());
            s.string(name);
            string_list(s, args);
        }
        Meta::AuthorRef { loc, path } => {
            s.location(loc.as_ref());
            s.path(path);
        }
        Meta::Attachment {
            loc,
            id,
            mime_type,
            data,
        } => {
            s.location(loc.as_ref());
            identifier(s, id);
            s.string(mime_type);
            s.string(data);
        }
    }
}
