use vouch::{
    checks, CompileError, Object, Path, Presence, RuleNode, Settings, SpecRegistry,
    Specification, Validator, Value,
};

fn path(s: &str) -> Path {
    s.parse().unwrap()
}

#[test]
fn empty_specification_accepts_anything() {
    let validator = Validator::new(
        &Specification::new("Empty", vec![]),
        &SpecRegistry::new(),
        Settings::default(),
    )
    .unwrap();
    assert!(validator.template().is_empty());
    for value in [
        Value::Null,
        Value::Int(1),
        Value::from("x"),
        Value::from(vec![1_i64]),
        Value::from(Object::new()),
    ] {
        assert!(validator.is_valid(&value));
    }
}

#[test]
fn required_root_rejects_null() {
    let validator = Validator::builder(Specification::build("Root", |s| s.required()))
        .build()
        .unwrap();
    let result = validator.validate(&Value::Null, false);
    assert_eq!(result.get(&Path::root())[0].code(), "Required");
    assert_eq!(result.to_string(), "Global.Required\n");
    assert!(validator.is_valid(&Value::Int(0)));
}

#[test]
fn members_of_scalars_are_absent() {
    let validator = Validator::builder(Specification::build("S", |s| {
        s.member("a", |m| m.required())
    }))
    .build()
    .unwrap();
    let result = validator.validate(&Value::from("not an object"), false);
    assert_eq!(result.get(&path("a"))[0].code(), "Required");
}

#[test]
fn collection_of_scalars() {
    let validator = Validator::builder(Specification::build("S", |s| {
        s.member("tags", |m| {
            m.check(checks::min_items(1))
                .check(checks::max_items(3))
                .each(|e| e.check(checks::not_empty()))
        })
    }))
    .build()
    .unwrap();

    let empty: Value = Object::new().set("tags", Vec::<Value>::new()).into();
    let result = validator.validate(&empty, false);
    assert_eq!(result.codes(), ["MinItems"]);

    let tags: Value = Object::new()
        .set("tags", vec!["a", "", "c", ""])
        .into();
    let result = validator.validate(&tags, false);
    let paths: Vec<String> = result.paths().map(ToString::to_string).collect();
    assert_eq!(paths, ["tags", "tags[1]", "tags[3]"]);
    assert_eq!(result.get(&path("tags"))[0].code(), "MaxItems");
}

#[test]
fn nested_collections_keep_every_index() {
    let validator = Validator::builder(Specification::build("Matrix", |s| {
        s.member("rows", |m| m.each(|r| r.each(|c| c.check(checks::gte(0_i64)))))
    }))
    .build()
    .unwrap();
    let rows: Value = Object::new()
        .set(
            "rows",
            vec![Value::from(vec![1_i64, -1]), Value::from(vec![-5_i64])],
        )
        .into();
    let result = validator.validate(&rows, false);
    let paths: Vec<String> = result.paths().map(ToString::to_string).collect();
    assert_eq!(paths, ["rows[0][1]", "rows[1][0]"]);
    assert!(validator.template().get(&path("rows[*][*]")).is_some());
}

#[test]
fn numbers_compare_across_int_and_float() {
    let validator = Validator::builder(Specification::build("S", |s| {
        s.member("price", |m| m.check(checks::lte(9.99_f64)))
            .member("qty", |m| m.check(checks::lt(10_i64)))
    }))
    .build()
    .unwrap();
    let ok: Value = Object::new().set("price", 9_i64).set("qty", 9.5_f64).into();
    assert!(validator.is_valid(&ok));

    let bad: Value = Object::new().set("price", 10_i64).set("qty", "nine").into();
    assert_eq!(validator.validate(&bad, false).len(), 2);
}

#[test]
fn string_length_counts_chars() {
    let validator = Validator::builder(Specification::build("S", |s| {
        s.member("name", |m| m.check(checks::max_length(4)))
    }))
    .build()
    .unwrap();
    let name: Value = Object::new().set("name", "żółw").into();
    assert!(validator.is_valid(&name));
}

#[test]
fn equality_checks() {
    let validator = Validator::builder(Specification::build("S", |s| {
        s.member("accepted", |m| m.check(checks::eq(true)))
            .member("role", |m| m.check(checks::neq("root")))
    }))
    .build()
    .unwrap();
    let ok: Value = Object::new().set("accepted", true).set("role", 7_i64).into();
    assert!(validator.is_valid(&ok));

    let bad: Value = Object::new().set("accepted", false).set("role", "root").into();
    assert_eq!(
        validator.validate(&bad, false).codes(),
        ["EqualTo", "NotEqualTo"]
    );
}

#[test]
fn custom_codes_and_messages() {
    let validator = Validator::builder(Specification::build("S", |s| {
        s.member("id", |m| {
            m.presence(Presence::required().with_code("MissingId").with_message("Id is missing"))
        })
        .member("age", |m| {
            m.check(
                checks::gte(18_i64)
                    .with_code("TooYoung")
                    .with_message("Must be {min} or older"),
            )
        })
    }))
    .build()
    .unwrap();

    let result = validator.validate(&Object::new().set("age", 12_i64).into(), false);
    assert_eq!(result.codes(), ["TooYoung", "MissingId"]);
    let messages = result.messages(validator.settings(), "English");
    assert_eq!(messages["age"], ["Must be 18 or older"]);
    assert_eq!(messages["id"], ["Id is missing"]);
}

#[test]
fn deeply_nested_registry_chain() {
    // L0 -> L1 -> ... -> L25, each one member deeper.
    let mut builder = Validator::builder(Specification::build("L0", |s| {
        s.member("next", |m| m.nested("L1"))
    }));
    for i in 1..25 {
        let next = format!("L{}", i + 1);
        builder = builder.register(Specification::build(format!("L{i}"), move |s| {
            s.member("next", |m| m.nested(&next))
        }));
    }
    builder = builder.register(Specification::build("L25", |s| {
        s.member("leaf", |m| m.required())
    }));
    let validator = builder.build().unwrap();
    assert_eq!(validator.plan().spec_count(), 26);

    let mut value = Value::from(Object::new());
    for _ in 0..25 {
        value = Object::new().set("next", value).into();
    }
    let result = validator.validate(&value, false);
    let expected = format!("{}leaf", "next.".repeat(25));
    assert_eq!(result.get(&path(&expected))[0].code(), "Required");
}

#[test]
fn compile_errors() {
    let unresolved = Validator::builder(Specification::build("S", |s| {
        s.member("a", |m| m.nested("Ghost"))
    }))
    .build()
    .unwrap_err();
    assert_eq!(
        unresolved.to_string(),
        "unresolved specification reference 'Ghost' at 'a' in 'S'"
    );

    let conflicting = Validator::builder(Specification::new(
        "S",
        vec![
            RuleNode::Presence(Presence::required()),
            RuleNode::Presence(Presence::forbidden()),
        ],
    ))
    .build()
    .unwrap_err();
    assert!(matches!(conflicting, CompileError::ConflictingPresence { .. }));

    let duplicate = Validator::builder(Specification::new("Root", vec![]))
        .register(Specification::new("A", vec![]))
        .register(Specification::new("A", vec![]))
        .build()
        .unwrap_err();
    assert!(matches!(duplicate, CompileError::DuplicateSpecification { .. }));

    let cycle = Validator::builder(Specification::build("A", |s| s.nested("B")))
        .register(Specification::build("B", |s| s.nested("A")))
        .build()
        .unwrap_err();
    assert_eq!(
        cycle.to_string(),
        "specification cycle does not descend into the model: A -> B -> A"
    );

    let bad_path = Validator::builder(Specification::build("S", |s| {
        s.check(checks::not_empty().at("a..b"))
    }))
    .build()
    .unwrap_err();
    assert!(matches!(bad_path, CompileError::InvalidPath { .. }));
    assert!(std::error::Error::source(&bad_path).is_some());
}

#[test]
fn repeated_collection_blocks_share_one_element_scope() {
    let validator = Validator::builder(Specification::build("S", |s| {
        s.member("items", |m| {
            m.each(|e| e.required())
                .each(|e| e.required().check(checks::not_empty()))
        })
    }))
    .build()
    .unwrap();
    let items: Value = Object::new()
        .set("items", vec![Value::Null, Value::from("")])
        .into();
    let result = validator.validate(&items, false);
    assert_eq!(result.code_map()["items[0]"], ["Required"]);
    assert_eq!(result.code_map()["items[1]"], ["NotEmpty"]);
    assert_eq!(result.len(), 2);
}

#[test]
fn presence_conflicts_across_scopes_fail_compilation() {
    let collections = Validator::builder(Specification::build("S", |s| {
        s.member("items", |m| m.each(|e| e.required()).each(|e| e.optional()))
    }))
    .build()
    .unwrap_err();
    assert_eq!(
        collections.to_string(),
        "conflicting presence rules at 'items[*]' in 'S'"
    );

    let nested = Validator::builder(Specification::build("S", |s| {
        s.member("a", |m| m.required().nested("X"))
    }))
    .register(Specification::build("X", |s| s.forbidden()))
    .build()
    .unwrap_err();
    assert_eq!(nested.to_string(), "conflicting presence rules at 'a' in 'S'");
}

#[test]
fn nested_presence_applies_at_the_member() {
    let validator = Validator::builder(Specification::build("S", |s| {
        s.member("a", |m| m.nested("X"))
    }))
    .register(Specification::build("X", |s| {
        s.required().member("id", |m| m.required())
    }))
    .build()
    .unwrap();
    let result = validator.validate(&Object::new().into(), false);
    assert_eq!(result.code_map()["a"], ["Required"]);
}

#[test]
fn ambiguous_member_names_fail_compilation() {
    let err = Validator::builder(Specification::build("S", |s| {
        s.member("a.b", |m| m.required())
            .member("a", |m| m.required().member("b", |b| b.required()))
    }))
    .build()
    .unwrap_err();
    assert!(matches!(
        err,
        CompileError::InvalidMemberName { ref name, ref path, .. } if name == "a.b" && path.is_empty()
    ));

    let empty = Validator::builder(Specification::build("S", |s| s.member("", |m| m.required())))
        .build()
        .unwrap_err();
    assert_eq!(empty.to_string(), "invalid member name '' at '' in 'S'");
}

#[test]
fn string_views_keep_every_entry() {
    let validator = Validator::builder(Specification::build("S", |s| {
        s.member("a", |m| {
            m.required()
                .member("b", |b| b.required())
                .member("c", |c| c.each(|e| e.required()))
        })
    }))
    .build()
    .unwrap();
    let value: Value = Object::new()
        .set("a.x", 1_i64)
        .set("a.c", vec![Value::Null, Value::Null])
        .into();
    let result = validator.validate(&value, false);
    assert_eq!(result.len(), 3);
    assert_eq!(result.code_map().values().map(Vec::len).sum::<usize>(), 3);
    for path in result.paths() {
        assert_eq!(&path.to_string().parse::<Path>().unwrap(), path);
    }
}

#[test]
fn self_reference_on_a_member_compiles() {
    let validator = Validator::builder(Specification::build("Person", |s| {
        s.member("name", |m| m.required())
            .member("spouse", |m| m.nested("Person"))
    }))
    .build()
    .unwrap();

    let mut value: Value = Object::new().into();
    for _ in 0..50 {
        value = Object::new().set("name", "x").set("spouse", value).into();
    }
    // The innermost spouse lacks a name but lies beyond the depth cap.
    assert!(validator.is_valid(&value));
}

#[test]
fn path_parsing() {
    assert_eq!(path("").to_string(), "");
    assert_eq!(path("orders[3].total").generalize().to_string(), "orders[*].total");
    assert!("orders[".parse::<Path>().is_err());
    assert!("[x]".parse::<Path>().is_err());
}
