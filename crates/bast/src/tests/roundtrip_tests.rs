use std::sync::Arc;

use crate::*;
use ast::*;
use bytebuf::ByteReader;
use config::CodecConfig;

use super::helpers::{sample, SHOP_SOURCE};

fn string_table_of(bytes: &[u8]) -> StringTable {
    let mut r = ByteReader::new(bytes);
    r.seek(HEADER_SIZE).unwrap();
    StringTable::read(&mut r).unwrap()
}

/// Runs `f` on a thread with room for deep recursion in debug builds.
fn with_big_stack(f: impl FnOnce() + Send + 'static) {
    std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap();
}

// -------------------- Round trip --------------------

#[test]
fn full_model_round_trips_exactly() {
    let model = sample(&CodecConfig::FULL);
    let bytes = encode(&model, &CodecConfig::FULL).unwrap();
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded, model);
    assert_eq!(decoded.definition_count(), model.definition_count());
}

#[test]
fn encoding_is_deterministic() {
    let model = sample(&CodecConfig::FULL);
    let a = encode(&model, &CodecConfig::FULL).unwrap();
    let b = encode(&model.clone(), &CodecConfig::FULL).unwrap();
    assert_eq!(a, b);
}

#[test]
fn re_encoding_a_decoded_tree_gives_the_same_bytes() {
    let model = sample(&CodecConfig::FULL);
    let first = encode(&model, &CodecConfig::FULL).unwrap();
    let second = encode(&decode(&first).unwrap(), &CodecConfig::FULL).unwrap();
    assert_eq!(first, second);
}

#[test]
fn decoded_locations_share_source_names() {
    let bytes = encode(&sample(&CodecConfig::FULL), &CodecConfig::FULL).unwrap();
    let decoded = decode(&bytes).unwrap();
    let domain = &decoded.contents[0];
    let context = &domain.contents()[0];
    let a = domain.loc().unwrap();
    let b = context.loc().unwrap();
    assert_eq!(&*a.source, SHOP_SOURCE);
    assert!(Arc::ptr_eq(&a.source, &b.source));
}

// -------------------- Flags --------------------

#[test]
fn compact_drops_locations_comments_and_descriptions() {
    let bytes = encode(&sample(&CodecConfig::FULL), &CodecConfig::COMPACT).unwrap();
    assert_eq!(read_header(&bytes).unwrap().flags.bits(), 0);
    assert_eq!(decode(&bytes).unwrap(), sample(&CodecConfig::COMPACT));
    assert!(!string_table_of(&bytes).iter().any(|s| s == SHOP_SOURCE));
}

#[test]
fn comments_only_dropped_when_disabled() {
    let cfg = CodecConfig {
        comments: false,
        ..CodecConfig::FULL
    };
    let bytes = encode(&sample(&CodecConfig::FULL), &cfg).unwrap();
    let h = read_header(&bytes).unwrap();
    assert!(!h.flags.has_comments());
    assert!(h.flags.has_descriptions() && h.flags.has_locations());

    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded, sample(&cfg));
    assert!(!string_table_of(&bytes).iter().any(|s| s == "// checkout lives here"));
    assert!(string_table_of(&bytes).iter().any(|s| s == "an online shop"));
}

#[test]
fn descriptions_only_dropped_when_disabled() {
    let cfg = CodecConfig {
        descriptions: false,
        ..CodecConfig::FULL
    };
    let bytes = encode(&sample(&CodecConfig::FULL), &cfg).unwrap();
    assert!(!read_header(&bytes).unwrap().flags.has_descriptions());
    assert_eq!(decode(&bytes).unwrap(), sample(&cfg));
    let strings = string_table_of(&bytes);
    assert!(!strings.iter().any(|s| s == "an online shop" || s == "A shopping cart."));
    assert!(strings.iter().any(|s| s == "// checkout lives here"));
}

#[test]
fn dropping_all_metadata_clears_the_meta_flag() {
    let mut c = Container::new("D");
    c.metadata.push(Meta::LineComment {
        loc: None,
        text: "only a comment".into(),
    });
    let model = Nebula::new(vec![Definition::Domain(c)]);
    let cfg = CodecConfig {
        comments: false,
        ..CodecConfig::COMPACT
    };
    let bytes = encode(&model, &cfg).unwrap();
    let root = read_header(&bytes).unwrap().root_offset as usize;
    // Nebula tag, count, then the domain tag without the metadata bit
    assert_eq!(bytes[root + 2], u8::from(tags::NodeTag::Domain));
    assert_eq!(decode(&bytes).unwrap(), Nebula::new(vec![Definition::Domain(Container::new("D"))]));
}

// -------------------- Interning --------------------

#[test]
fn two_children_named_id_share_one_string() {
    let field = |loc| {
        Definition::Field(Field {
            loc,
            id: Identifier::new("id"),
            type_ex: TypeExpression::Uuid { loc: None },
            metadata: vec![],
        })
    };
    let entity = Container {
        loc: None,
        id: Identifier::new("Cart"),
        contents: vec![field(None), field(Some(Location::new("a.riddl", 1, 3)))],
        metadata: vec![],
    };
    let model = Nebula::new(vec![Definition::Entity(entity)]);
    let bytes = encode(&model, &CodecConfig::FULL).unwrap();

    let strings = string_table_of(&bytes);
    assert_eq!(strings.iter().filter(|s| *s == "id").count(), 1);
    let all: Vec<&str> = strings.iter().collect();
    let unique: std::collections::HashSet<&str> = all.iter().copied().collect();
    assert_eq!(all.len(), unique.len());
    assert_eq!(decode(&bytes).unwrap(), model);
}

#[test]
fn repeated_paths_go_through_the_path_table() {
    let r = |p: &str| Reference::new(RefKind::Entity, PathIdentifier::parse(p));
    let handler = Definition::OnClause(OnClause {
        loc: None,
        trigger: OnTrigger::Other,
        statements: vec![
            Statement::Call { loc: None, function: r("Shop.Cart") },
            Statement::Call { loc: None, function: r("Shop.Cart") },
            Statement::Call { loc: None, function: r("Shop.Order") },
        ],
        metadata: vec![],
    });
    let model = Nebula::new(vec![handler]);
    let bytes = encode(&model, &CodecConfig::COMPACT).unwrap();
    let summary = inspect(&bytes).unwrap();
    assert_eq!(summary.path_count, 1);
    assert_eq!(summary.string_count, 3);
    assert_eq!(decode(&bytes).unwrap(), model);
}

#[test]
fn empty_paths_round_trip() {
    let model = Nebula::new(vec![Definition::Type(TypeDef {
        loc: None,
        id: Identifier::new("Anything"),
        type_ex: TypeExpression::Alias {
            loc: None,
            path: PathIdentifier::default(),
        },
        metadata: vec![],
    })]);
    let bytes = encode(&model, &CodecConfig::FULL).unwrap();
    assert_eq!(decode(&bytes).unwrap(), model);
}

// -------------------- Edge cases --------------------

#[test]
fn empty_root_is_36_bytes() {
    let bytes = encode(&Nebula::default(), &CodecConfig::FULL).unwrap();
    assert_eq!(bytes.len(), 32 + 1 + 1 + 2);
    assert_eq!(&bytes[32..], &[0, 0, u8::from(tags::NodeTag::Nebula), 0]);
    assert!(decode(&bytes).unwrap().is_empty());
}

#[test]
fn oversized_output_is_refused() {
    let model = Nebula::new(vec![Definition::Constant(Constant {
        loc: None,
        id: Identifier::new("Huge"),
        type_ex: TypeExpression::String {
            loc: None,
            min: None,
            max: None,
        },
        value: "x".repeat(MAX_SIZE),
        metadata: vec![],
    })]);
    match encode(&model, &CodecConfig::COMPACT).unwrap_err() {
        EncodeError::TooLarge { size, max } => {
            assert_eq!(max, MAX_SIZE);
            assert!(size > MAX_SIZE);
        }
        other => panic!("expected TooLarge, got {other}"),
    }
}

fn nested_domains(depth: usize) -> Nebula {
    let mut inner = Container::new("leaf");
    for i in 0..depth - 1 {
        inner = Container::new(format!("d{i}")).with(Definition::Domain(inner));
    }
    Nebula::new(vec![Definition::Domain(inner)])
}

#[test]
fn nesting_up_to_the_limit_decodes() {
    with_big_stack(|| {
        let model = nested_domains(MAX_DEPTH);
        let bytes = encode(&model, &CodecConfig::COMPACT).unwrap();
        assert_eq!(decode(&bytes).unwrap(), model);
    });
}

#[test]
fn nesting_past_the_limit_is_refused_by_the_encoder() {
    with_big_stack(|| {
        let err = encode(&nested_domains(MAX_DEPTH + 1), &CodecConfig::COMPACT).unwrap_err();
        assert_eq!(err, EncodeError::TooDeep { max: MAX_DEPTH });
    });
}

fn nested_optionals(depth: usize) -> Nebula {
    let mut te = TypeExpression::Integer { loc: None };
    for _ in 0..depth {
        te = TypeExpression::Optional {
            loc: None,
            of: Box::new(te),
        };
    }
    Nebula::new(vec![Definition::Type(TypeDef {
        loc: None,
        id: Identifier::new("Deep"),
        type_ex: te,
        metadata: vec![],
    })])
}

#[test]
fn deep_type_expressions_are_refused_by_the_encoder() {
    with_big_stack(|| {
        let err = encode(&nested_optionals(300), &CodecConfig::COMPACT).unwrap_err();
        assert_eq!(err, EncodeError::TooDeep { max: MAX_DEPTH });
    });
}

#[test]
fn every_encodable_depth_decodes() {
    with_big_stack(|| {
        // the definition takes one level, the innermost Integer another
        let model = nested_optionals(MAX_DEPTH - 2);
        let bytes = encode(&model, &CodecConfig::COMPACT).unwrap();
        assert_eq!(decode(&bytes).unwrap(), model);

        let too_deep = nested_optionals(MAX_DEPTH - 1);
        assert!(encode(&too_deep, &CodecConfig::COMPACT).is_err());
    });
}

// -------------------- Inspect --------------------

#[test]
fn inspect_reports_sections() {
    let model = sample(&CodecConfig::FULL);
    let bytes = encode(&model, &CodecConfig::FULL).unwrap();
    let s = inspect(&bytes).unwrap();
    assert_eq!(s.definition_count, model.definition_count());
    assert_eq!(
        HEADER_SIZE + s.string_table_bytes + s.path_table_bytes + s.node_bytes,
        bytes.len()
    );
    assert_eq!(
        s.header.root_offset as usize,
        HEADER_SIZE + s.string_table_bytes + s.path_table_bytes
    );
    assert!(s.path_count > 0, "the sample repeats several paths");
    assert!(s.to_string().starts_with("BAST v1 rev 2"));
}
