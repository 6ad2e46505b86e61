use json_adt::prelude::{EITHER, LIST, MAYBE, PAIR, REC};
use json_adt::{
    Config, ErrorKind, Factory, Type, Validator, check, fields, map, number, optional, record,
    repeated, schema, string, valid, validate_definition,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn nil() -> Value {
    json!({ "constr": "Nil", "Nil": {} })
}

fn cons(head: Value, tail: Value) -> Value {
    json!({ "constr": "Cons", "Cons": { "head": head, "tail": tail } })
}

fn list_of(items: impl IntoIterator<Item = Value, IntoIter: DoubleEndedIterator>) -> Value {
    items.into_iter().rev().fold(nil(), |tail, head| cons(head, tail))
}

#[test]
fn list_examples() {
    validate_definition(&LIST).unwrap();
    let numbers = LIST.apply(vec![number()]).unwrap();

    let good = cons(json!(1), nil());
    assert_eq!(check(&numbers, &good), Ok(&good));

    let bad_head = cons(json!("x"), nil());
    let err = check(&numbers, &bad_head).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(err.to_string(), "at $.Cons.head: type mismatch: expected 'number', got 'string'");

    let bogus = json!({ "constr": "Bogus", "Bogus": {} });
    let err = check(&numbers, &bogus).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConstrField);
    assert_eq!(err.to_string(), "at $: invalid constr field 'Bogus', expected one of Nil, Cons");
}

#[test]
fn deep_recursive_values_validate() {
    let numbers = LIST.apply(vec![number()]).unwrap();
    for depth in [0, 1, 10, 200] {
        let value = list_of((0..depth).map(|n| json!(n)));
        assert!(valid(&numbers, &value), "depth {depth}");
    }
    let mut broken = (0..50).map(|n| json!(n)).collect::<Vec<_>>();
    broken[49] = json!(null);
    let err = check(&numbers, &list_of(broken)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndefinedNull);
    let path = err.as_validation().unwrap().path.segments().count();
    assert_eq!(path, 49 * 2 + 1);
}

#[test]
fn check_never_changes_the_value_and_agrees_with_valid() {
    let ty = map(repeated(optional(number())));
    let values = [
        json!({}),
        json!({ "a": [] }),
        json!({ "a": [1, null, 2.5], "b": [] }),
        json!({ "a": [1, "2"] }),
        json!([1]),
        json!(null),
    ];
    for value in &values {
        let outcome = check(&ty, value);
        assert_eq!(outcome.is_ok(), valid(&ty, value));
        if let Ok(same) = outcome {
            assert!(std::ptr::eq(same, value));
        }
        // idempotent
        assert_eq!(outcome.map_err(|e| e.kind()), check(&ty, value).map_err(|e| e.kind()));
    }
}

#[test]
fn empty_containers_always_pass() {
    let ty = repeated(LIST.apply(vec![string()]).unwrap());
    assert!(valid(&ty, &json!([])));
    let ty = map(PAIR.apply(vec![number(), number()]).unwrap());
    assert!(valid(&ty, &json!({})));
    let ty = optional(REC.apply(vec![]).unwrap());
    assert!(valid(&ty, &json!(null)));
}

#[test]
fn records_reject_missing_and_extra_fields() {
    let pair = PAIR.apply(vec![number(), string()]).unwrap();
    assert!(valid(&pair, &json!({ "fst": 1, "snd": "a" })));
    for value in [
        json!({ "fst": 1 }),
        json!({ "snd": "a" }),
        json!({ "fst": 1, "snd": "a", "thd": true }),
        json!({}),
    ] {
        assert_eq!(check(&pair, &value).unwrap_err().kind(), ErrorKind::ExpectedFields, "{value}");
    }
}

#[test]
fn payload_key_must_match_discriminator() {
    let maybe = MAYBE.apply(vec![number()]).unwrap();
    assert!(valid(&maybe, &json!({ "constr": "Just", "Just": { "fromJust": 1 } })));
    let err = check(&maybe, &json!({ "constr": "Just", "Nothing": {} })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ExpectedFields);
}

#[test]
fn arity_is_checked_regardless_of_data() {
    for args in [vec![number()], vec![number(), number(), number()]] {
        let err = EITHER.apply(args).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArityMismatch);
    }

    let uses_either_wrong = |n: usize| -> Factory {
        schema("Wrapper", move |_, [a]: &[Type; 1]| {
            Ok(fields([("Wrapped", EITHER.apply(vec![a.clone(); n])?)]))
        })
    };
    for n in [1, 3] {
        let err = validate_definition(&uses_either_wrong(n)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArityMismatch);
    }
    assert!(validate_definition(&uses_either_wrong(2)).is_ok());
}

#[test]
fn mutually_recursive_definitions() {
    // Forest(a) = record { trees: List(Tree(a)) }, Tree(a) = Node { value: a, forest: Forest(a) }
    use once_cell::sync::Lazy;
    static TREE: Lazy<Factory> = Lazy::new(|| {
        schema("Tree", |_, [a]: &[Type; 1]| {
            Ok(fields([(
                "Node",
                Type::from(fields([("value", a.clone()), ("forest", FOREST.apply(vec![a.clone()])?)])),
            )]))
        })
    });
    static FOREST: Lazy<Factory> = Lazy::new(|| {
        record("Forest", |_, [a]: &[Type; 1]| {
            Ok(fields([("trees", LIST.apply(vec![TREE.apply(vec![a.clone()])?])?)]))
        })
    });

    validate_definition(&TREE).unwrap();
    validate_definition(&FOREST).unwrap();

    let leaf = |v: i64| json!({ "constr": "Node", "Node": { "value": v, "forest": { "trees": nil() } } });
    let tree = json!({ "constr": "Node", "Node": {
        "value": 0,
        "forest": { "trees": list_of([leaf(1), leaf(2)]) }
    }});
    let ty = TREE.apply(vec![number()]).unwrap();
    assert!(valid(&ty, &tree));
}

#[test]
fn custom_discriminator() {
    let validator = Validator::new(Config { discriminator: "type".into(), ..Config::default() });
    let maybe = MAYBE.apply(vec![string()]).unwrap();
    assert!(validator.valid(&maybe, &json!({ "type": "Nothing", "Nothing": {} })));
    let err = validator.check(&maybe, &json!({ "constr": "Nothing", "Nothing": {} })).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndefinedNull);
}

#[test]
fn validators_share_across_threads() {
    let validator = Validator::default();
    let numbers = LIST.apply(vec![number()]).unwrap();
    std::thread::scope(|scope| {
        for n in 0..4 {
            let (validator, numbers) = (&validator, &numbers);
            scope.spawn(move || {
                let value = list_of((0..n * 10).map(|i| json!(i)));
                assert!(validator.valid(numbers, &value));
                assert!(validator.validate_definition(&LIST).is_ok());
            });
        }
    });
}
