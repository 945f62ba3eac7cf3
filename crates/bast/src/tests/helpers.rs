use ast::*;
use config::CodecConfig;

pub const SHOP_SOURCE: &str = "shop.riddl";
pub const LIB_SOURCE: &str = "lib/common.riddl";

/// Builds the sample model as it should look after a round trip under `cfg`:
/// locations, comments and descriptions appear only when `cfg` keeps them.
/// `sample(&CodecConfig::FULL)` is the full input tree.
pub struct Fixture {
    cfg: CodecConfig,
    shop: SourceText,
    lib: SourceText,
}

impl Fixture {
    pub fn new(cfg: &CodecConfig) -> Self {
        Self {
            cfg: *cfg,
            shop: SourceText::new(SHOP_SOURCE, "domain Shop is { ... }"),
            lib: SourceText::new(LIB_SOURCE, "type Money is Decimal(10, 2)"),
        }
    }

    fn at(&self, start: u32, end: u32) -> Option<Location> {
        self.cfg.locations.then(|| self.shop.at(start, end))
    }

    fn lib_at(&self, start: u32, end: u32) -> Option<Location> {
        self.cfg.locations.then(|| self.lib.at(start, end))
    }

    fn id(&self, name: &str, start: u32) -> Identifier {
        Identifier {
            loc: self.at(start, start + name.len() as u32),
            value: name.to_string(),
        }
    }

    fn meta(&self, items: Vec<Meta>) -> Vec<Meta> {
        items
            .into_iter()
            .filter(|m| {
                (self.cfg.comments || !m.is_comment())
                    && (self.cfg.descriptions || !m.is_description())
            })
            .collect()
    }

    fn reference(&self, kind: RefKind, path: &str, start: u32) -> Reference {
        Reference {
            kind,
            loc: self.at(start, start + path.len() as u32),
            path: PathIdentifier::parse(path),
        }
    }

    fn message(&self, kind: MessageKind, path: &str, start: u32) -> MessageRef {
        MessageRef {
            kind,
            loc: self.at(start, start + path.len() as u32),
            path: PathIdentifier::parse(path),
        }
    }

    fn field(&self, name: &str, start: u32, type_ex: TypeExpression) -> Field {
        Field {
            loc: self.at(start, start + 20),
            id: self.id(name, start + 6),
            type_ex,
            metadata: self.meta(vec![Meta::LineComment {
                loc: self.at(start + 21, start + 30),
                text: format!("{name} field"),
            }]),
        }
    }

    fn types(&self) -> Vec<Definition> {
        let ty = |name: &str, start: u32, type_ex: TypeExpression| {
            Definition::Type(TypeDef {
                loc: self.at(start, start + 40),
                id: self.id(name, start + 5),
                type_ex,
                metadata: vec![],
            })
        };
        vec![
            ty(
                "Name",
                1000,
                TypeExpression::String {
                    loc: self.at(1013, 1030),
                    min: Some(1),
                    max: Some(128),
                },
            ),
            ty(
                "Note",
                1050,
                TypeExpression::String {
                    loc: self.at(1060, 1066),
                    min: None,
                    max: Some(4096),
                },
            ),
            ty(
                "Price",
                1100,
                TypeExpression::Decimal {
                    loc: self.at(1110, 1125),
                    whole: 10,
                    fractional: 2,
                },
            ),
            ty(
                "Site",
                1150,
                TypeExpression::Url {
                    loc: self.at(1160, 1170),
                    scheme: Some("https".into()),
                },
            ),
            ty("Link", 1180, TypeExpression::Url { loc: self.at(1190, 1193), scheme: None }),
            ty(
                "Cash",
                1200,
                TypeExpression::Currency {
                    loc: self.at(1210, 1223),
                    country: "CA".into(),
                },
            ),
            ty(
                "Sku",
                1250,
                TypeExpression::Pattern {
                    loc: self.at(1260, 1290),
                    patterns: vec!["[A-Z]{3}".into(), "[0-9]+".into()],
                },
            ),
            ty(
                "Percent",
                1300,
                TypeExpression::Range {
                    loc: self.at(1310, 1325),
                    min: -100,
                    max: 100,
                },
            ),
            ty(
                "Color",
                1350,
                TypeExpression::Enumeration {
                    loc: self.at(1360, 1400),
                    enumerators: vec![
                        Enumerator {
                            loc: self.at(1370, 1373),
                            id: self.id("Red", 1370),
                            value: Some(-1),
                        },
                        Enumerator {
                            loc: self.at(1375, 1380),
                            id: self.id("Green", 1375),
                            value: None,
                        },
                    ],
                },
            ),
            ty(
                "Choice",
                1450,
                TypeExpression::Alternation {
                    loc: self.at(1460, 1490),
                    of: vec![
                        TypeExpression::Integer { loc: self.at(1465, 1472) },
                        TypeExpression::Boolean { loc: self.at(1475, 1482) },
                        TypeExpression::Nothing { loc: None },
                    ],
                },
            ),
            ty(
                "Address",
                1500,
                TypeExpression::Aggregation(Aggregation {
                    loc: self.at(1510, 1590),
                    fields: vec![
                        self.field("street", 1515, TypeExpression::alias("Name")),
                        self.field(
                            "zip",
                            1540,
                            TypeExpression::Natural {
                                loc: self.at(1550, 1557),
                            },
                        ),
                    ],
                }),
            ),
            ty(
                "AddItem",
                1600,
                TypeExpression::Message {
                    kind: MessageKind::Command,
                    aggregation: Aggregation {
                        loc: self.at(1610, 1690),
                        fields: vec![
                            self.field(
                                "cart",
                                1615,
                                TypeExpression::EntityReference {
                                    loc: self.at(1625, 1640),
                                    entity: PathIdentifier::parse("Shop.Sales.Cart"),
                                },
                            ),
                            self.field("sku", 1645, TypeExpression::alias("Sku")),
                        ],
                    },
                },
            ),
            ty(
                "ItemAdded",
                1700,
                TypeExpression::Message {
                    kind: MessageKind::Event,
                    aggregation: Aggregation::new(vec![]),
                },
            ),
            ty(
                "Tags",
                1750,
                TypeExpression::Mapping {
                    loc: self.at(1760, 1790),
                    from: Box::new(TypeExpression::alias("Name")),
                    to: Box::new(TypeExpression::Set {
                        loc: self.at(1775, 1785),
                        of: Box::new(TypeExpression::Uuid { loc: None }),
                    }),
                },
            ),
            ty(
                "Lines",
                1800,
                TypeExpression::SpecificRange {
                    loc: self.at(1810, 1830),
                    of: Box::new(TypeExpression::Optional {
                        loc: None,
                        of: Box::new(TypeExpression::Sequence {
                            loc: None,
                            of: Box::new(TypeExpression::ZeroOrMore {
                                loc: None,
                                of: Box::new(TypeExpression::OneOrMore {
                                    loc: None,
                                    of: Box::new(TypeExpression::TimeStamp { loc: None }),
                                }),
                            }),
                        }),
                    }),
                    min: 1,
                    max: 50,
                },
            ),
            ty(
                "Scalars",
                1850,
                TypeExpression::Alternation {
                    loc: None,
                    of: vec![
                        TypeExpression::Whole { loc: None },
                        TypeExpression::Number { loc: None },
                        TypeExpression::Real { loc: None },
                        TypeExpression::Date { loc: None },
                        TypeExpression::Time { loc: None },
                        TypeExpression::DateTime { loc: None },
                        TypeExpression::Duration { loc: None },
                        TypeExpression::Abstract { loc: None },
                    ],
                },
            ),
        ]
    }

    fn handler(&self) -> Definition {
        let on_add = Definition::OnClause(OnClause {
            loc: self.at(2100, 2400),
            trigger: OnTrigger::Message(self.message(MessageKind::Command, "AddItem", 2110)),
            statements: vec![
                Statement::Set {
                    loc: self.at(2130, 2160),
                    field: self.reference(RefKind::Field, "Cart.count", 2134),
                    value: "count + 1".into(),
                },
                Statement::Send {
                    loc: self.at(2170, 2200),
                    msg: self.message(MessageKind::Event, "ItemAdded", 2175),
                    portlet: self.reference(RefKind::Outlet, "Events.out", 2190),
                },
                Statement::Tell {
                    loc: self.at(2210, 2240),
                    msg: self.message(MessageKind::Command, "Reserve", 2215),
                    to: self.reference(RefKind::Entity, "Shop.Sales.Cart", 2230),
                },
                Statement::Morph {
                    loc: self.at(2250, 2280),
                    entity: self.reference(RefKind::Entity, "Shop.Sales.Cart", 2255),
                    state: self.reference(RefKind::State, "Cart.Closed", 2265),
                    value: self.message(MessageKind::Record, "CartData", 2275),
                },
                Statement::When {
                    loc: self.at(2290, 2390),
                    condition: "cart is empty".into(),
                    then: vec![
                        Statement::Error {
                            loc: self.at(2300, 2320),
                            message: "nothing to add".into(),
                        },
                        Statement::Become {
                            loc: self.at(2325, 2345),
                            entity: self.reference(RefKind::Entity, "Shop.Sales.Cart", 2330),
                            handler: self.reference(RefKind::Handler, "Cart.Idle", 2340),
                        },
                    ],
                    otherwise: vec![
                        Statement::Call {
                            loc: self.at(2350, 2370),
                            function: self.reference(RefKind::Function, "total", 2355),
                        },
                        Statement::Return {
                            loc: self.at(2375, 2385),
                            value: "ok".into(),
                        },
                    ],
                },
            ],
            metadata: self.meta(vec![Meta::BriefDescription {
                loc: self.at(2395, 2399),
                text: "adds an item".into(),
            }]),
        });
        let lifecycle = [OnTrigger::Init, OnTrigger::Term, OnTrigger::Other]
            .into_iter()
            .enumerate()
            .map(|(i, trigger)| {
                Definition::OnClause(OnClause {
                    loc: self.at(2400 + i as u32 * 10, 2405 + i as u32 * 10),
                    trigger,
                    statements: vec![Statement::Arbitrary {
                        loc: None,
                        what: "log it".into(),
                    }],
                    metadata: vec![],
                })
            });
        let mut contents = vec![on_add];
        contents.extend(lifecycle);
        Definition::Handler(Container {
            loc: self.at(2000, 2500),
            id: self.id("CartHandler", 2008),
            contents,
            metadata: vec![],
        })
    }

    fn entity(&self) -> Definition {
        Definition::Entity(Container {
            loc: self.at(600, 3000),
            id: self.id("Cart", 607),
            contents: vec![
                Definition::State(State {
                    loc: self.at(620, 660),
                    id: self.id("Open", 626),
                    type_ref: TypeRef {
                        loc: self.at(640, 648),
                        path: PathIdentifier::parse("CartData"),
                    },
                    metadata: vec![],
                }),
                Definition::Field(self.field(
                    "count",
                    670,
                    TypeExpression::Integer {
                        loc: self.at(680, 687),
                    },
                )),
                self.handler(),
                Definition::Function(Function {
                    loc: self.at(2600, 2800),
                    id: self.id("total", 2609),
                    input: Some(Aggregation {
                        loc: self.at(2620, 2650),
                        fields: vec![self.field("tax", 2622, TypeExpression::alias("Price"))],
                    }),
                    output: None,
                    statements: vec![Statement::prose("sum the lines")],
                    metadata: vec![],
                }),
                Definition::Invariant(Invariant {
                    loc: self.at(2810, 2850),
                    id: self.id("NonNegative", 2820),
                    condition: Some("count >= 0".into()),
                    metadata: vec![],
                }),
                Definition::Invariant(Invariant {
                    loc: self.at(2855, 2870),
                    id: self.id("Unchecked", 2860),
                    condition: None,
                    metadata: vec![],
                }),
            ],
            metadata: self.meta(vec![
                Meta::Description {
                    loc: self.at(2900, 2990),
                    lines: vec!["A shopping cart.".into(), "One per customer.".into()],
                },
                Meta::BlockComment {
                    loc: self.at(590, 599),
                    lines: vec!["expiry rules pending".into()],
                },
                Meta::Term {
                    loc: self.at(2991, 2999),
                    id: self.id("line", 2992),
                    definition: vec!["an item and quantity".into()],
                },
                Meta::OptionValue {
                    loc: None,
                    name: "aggregate".into(),
                    args: vec![],
                },
                Meta::AuthorRef {
                    loc: self.at(2995, 2999),
                    path: PathIdentifier::parse("Shop.reid"),
                },
                Meta::Attachment {
                    loc: None,
                    id: self.id("diagram", 2996),
                    mime_type: "image/svg+xml".into(),
                    data: "<svg/>".into(),
                },
            ]),
        })
    }

    fn streaming(&self) -> Vec<Definition> {
        let portlet = |name: &str, start: u32, ty: &str| Portlet {
            loc: self.at(start, start + 30),
            id: self.id(name, start + 6),
            type_ref: TypeRef {
                loc: self.at(start + 15, start + 15 + ty.len() as u32),
                path: PathIdentifier::parse(ty),
            },
            metadata: vec![],
        };
        let shapes = ShapeKind::ALL.into_iter().enumerate().map(|(i, kind)| {
            let start = 3200 + i as u32 * 100;
            Definition::Streamlet(Streamlet {
                loc: self.at(start, start + 90),
                id: self.id(&format!("S{i}"), start + 10),
                shape: StreamletShape {
                    kind,
                    loc: self.at(start + 20, start + 26),
                },
                contents: vec![],
                metadata: vec![],
            })
        });
        let mut out = vec![Definition::Streamlet(Streamlet {
            loc: self.at(3000, 3190),
            id: self.id("Events", 3010),
            shape: StreamletShape {
                kind: ShapeKind::Flow,
                loc: self.at(3020, 3024),
            },
            contents: vec![
                Definition::Inlet(portlet("in", 3030, "AddItem")),
                Definition::Outlet(portlet("out", 3070, "ItemAdded")),
            ],
            metadata: vec![],
        })];
        out.extend(shapes);
        out.push(Definition::Connector(Connector {
            loc: self.at(3100, 3150),
            id: self.id("Pipe", 3110),
            from: self.reference(RefKind::Outlet, "Events.out", 3120),
            to: self.reference(RefKind::Inlet, "Events.in", 3135),
            metadata: vec![],
        }));
        out
    }

    fn context(&self) -> Definition {
        let mut contents = self.types();
        contents.push(self.entity());
        contents.extend(self.streaming());
        contents.push(Definition::Repository(Container {
            loc: self.at(4000, 4100),
            id: self.id("Carts", 4011),
            contents: vec![],
            metadata: vec![],
        }));
        contents.push(Definition::Projector(Container {
            loc: self.at(4200, 4300),
            id: self.id("Totals", 4210),
            contents: vec![],
            metadata: vec![],
        }));
        contents.push(Definition::Adaptor(Adaptor {
            loc: self.at(4400, 4500),
            id: self.id("FromWarehouse", 4408),
            direction: AdaptorDirection::Inbound,
            referent: self.reference(RefKind::Context, "Shop.Warehouse", 4430),
            contents: vec![],
            metadata: vec![],
        }));
        contents.push(Definition::Adaptor(Adaptor {
            loc: self.at(4510, 4590),
            id: self.id("ToWarehouse", 4518),
            direction: AdaptorDirection::Outbound,
            referent: self.reference(RefKind::Context, "Shop.Warehouse", 4540),
            contents: vec![],
            metadata: vec![],
        }));
        contents.push(Definition::Saga(Saga {
            loc: self.at(4600, 4900),
            id: self.id("Checkout", 4605),
            input: Some(Aggregation {
                loc: self.at(4620, 4640),
                fields: vec![self.field("order", 4622, TypeExpression::alias("AddItem"))],
            }),
            output: Some(Aggregation::new(vec![])),
            contents: vec![Definition::SagaStep(SagaStep {
                loc: self.at(4700, 4890),
                id: self.id("Charge", 4705),
                do_statements: vec![Statement::Call {
                    loc: self.at(4720, 4740),
                    function: self.reference(RefKind::Function, "total", 4725),
                }],
                undo_statements: vec![Statement::prose("refund")],
                metadata: vec![],
            })],
            metadata: vec![],
        }));
        Definition::Context(Container {
            loc: self.at(500, 5000),
            id: self.id("Sales", 508),
            contents,
            metadata: self.meta(vec![Meta::LineComment {
                loc: self.at(490, 499),
                text: "// checkout lives here".into(),
            }]),
        })
    }

    /// The full sample model.
    pub fn model(&self) -> Nebula {
        let domain = Definition::Domain(Container {
            loc: self.at(0, 6000),
            id: self.id("Shop", 7),
            contents: vec![
                self.context(),
                Definition::Author(Author {
                    loc: self.at(5100, 5200),
                    id: self.id("reid", 5107),
                    name: "Reid".into(),
                    email: "reid@example.com".into(),
                    metadata: vec![],
                }),
                Definition::Include(Include {
                    loc: self.at(5300, 5330),
                    origin: LIB_SOURCE.into(),
                    contents: vec![Definition::Type(TypeDef {
                        loc: self.lib_at(0, 28),
                        id: Identifier {
                            loc: self.lib_at(5, 10),
                            value: "Money".into(),
                        },
                        type_ex: TypeExpression::Decimal {
                            loc: self.lib_at(14, 28),
                            whole: 10,
                            fractional: 2,
                        },
                        metadata: vec![],
                    })],
                }),
            ],
            metadata: self.meta(vec![Meta::BriefDescription {
                loc: self.at(6001, 6010),
                text: "an online shop".into(),
            }]),
        });
        Nebula::new(vec![
            domain,
            Definition::Constant(Constant {
                loc: self.at(6100, 6140),
                id: self.id("MaxItems", 6109),
                type_ex: TypeExpression::Natural { loc: None },
                value: "100".into(),
                metadata: vec![],
            }),
        ])
    }
}

pub fn sample(cfg: &CodecConfig) -> Nebula {
    Fixture::new(cfg).model()
}

/// Wraps `payload` in a header that passes every check, checksum included.
pub fn forge(payload: &[u8], root_offset: u32) -> Vec<u8> {
    let file_size = (crate::HEADER_SIZE + payload.len()) as u32;
    let header = crate::Header::new(
        crate::Flags::from_bits(0),
        root_offset,
        file_size,
        crate::adler32(payload),
    );
    let mut w = bytebuf::ByteWriter::new();
    header.write_to(&mut w);
    w.write_bytes(payload);
    w.into_bytes()
}

/// Recomputes the checksum after a test edited bytes past the header.
pub fn reseal(bytes: &mut [u8]) {
    let sum = crate::adler32(&bytes[crate::HEADER_SIZE..]);
    bytes[24..28].copy_from_slice(&sum.to_le_bytes());
}
