//! Validates encoded choice documents against the wire schema at
//! schema/choice-wire-schema.json.

use std::path::Path;

use funrec_core::{wire, Choice2, Choice3, Choice6, JsonCodec, Maybe, TypeNameResolver, WireShape};
use serde_json::{json, Value};

fn load_validator() -> jsonschema::Validator {
    let schema_path =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schema/choice-wire-schema.json");
    let schema_src = std::fs::read_to_string(&schema_path)
        .unwrap_or_else(|e| panic!("Failed to read schema at {}: {}", schema_path.display(), e));
    let schema_value: Value = serde_json::from_str(&schema_src).unwrap();
    jsonschema::validator_for(&schema_value)
        .unwrap_or_else(|e| panic!("Failed to compile schema: {}", e))
}

fn check(validator: &jsonschema::Validator, doc: &Value, failures: &mut Vec<String>) {
    if let Err(error) = validator.validate(doc) {
        failures.push(format!("{}: {}", doc, error));
    }
}

#[test]
fn validate_encoded_choices_against_schema() {
    let validator = load_validator();
    let mut failures = Vec::new();

    type Wide = Choice6<i32, String, bool, u64, Vec<i32>, Maybe<char>>;
    let samples = vec![
        Wide::from_first(-4),
        Wide::from_second("ABC".to_string()),
        Wide::from_third(true),
        Wide::from_fourth(u64::MAX),
        Wide::from_fifth(vec![1, 2, 3]),
        Wide::from_sixth(Maybe::none()),
    ];
    let resolver = TypeNameResolver::for_choice::<Wide>().unwrap();

    for sample in &samples {
        for shape in [WireShape::Tagged, WireShape::Positional] {
            let doc = wire::encode(sample, &JsonCodec, shape, &resolver).unwrap();
            check(&validator, &doc, &mut failures);
        }
        check(&validator, &serde_json::to_value(sample).unwrap(), &mut failures);
    }

    type Nested = Choice2<Choice3<i8, f64, String>, Vec<String>>;
    let nested = Nested::from_first(Choice3::from_second(2.5));
    check(&validator, &serde_json::to_value(&nested).unwrap(), &mut failures);

    assert!(
        failures.is_empty(),
        "Schema validation failed for {} documents:\n{}",
        failures.len(),
        failures.join("\n")
    );
}

#[test]
fn schema_rejects_malformed_documents() {
    let validator = load_validator();
    let malformed = [
        json!(5),
        json!(null),
        json!([]),
        json!([1]),
        json!([1, 2, 3]),
        json!([0, "x"]),
        json!(["1", "x"]),
        json!({"value": 1}),
        json!({"$choiceType": "Int32"}),
        json!({"$choiceType": "", "value": 1}),
        json!({"$choiceType": 7, "value": 1}),
    ];

    for doc in &malformed {
        assert!(!validator.is_valid(doc), "schema accepted {}", doc);
    }
}
