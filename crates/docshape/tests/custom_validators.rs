//! Scenario tests for property- and schema-level custom validators.

use docshape::prelude::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn flag() -> (Arc<AtomicBool>, Arc<AtomicBool>) {
    let flag = Arc::new(AtomicBool::new(false));
    (flag.clone(), flag)
}

#[tokio::test]
async fn validators_are_called() {
    let (prop_single, prop_single_set) = flag();
    let (prop_multi, prop_multi_set) = flag();
    let (schema_single, schema_single_set) = flag();
    let (schema_multi, schema_multi_set) = flag();

    let schema = Schema::create([(
        "name",
        string()
            .valid_if(move |_: &Value, _: &Value| {
                prop_single_set.store(true, Ordering::SeqCst);
                true
            })
            .valid_if(move |_: &Value, _: &Value| {
                prop_multi_set.store(true, Ordering::SeqCst);
                true
            }),
    )])
    .valid_if(move |_: &Value| {
        schema_single_set.store(true, Ordering::SeqCst);
        true
    })
    .valid_if(move |_: &Value| {
        schema_multi_set.store(true, Ordering::SeqCst);
        true
    })
    .build();

    schema.validate(json!({ "name": "Ricardo" })).await.unwrap();

    assert!(prop_single.load(Ordering::SeqCst));
    assert!(prop_multi.load(Ordering::SeqCst));
    assert!(schema_single.load(Ordering::SeqCst));
    assert!(schema_multi.load(Ordering::SeqCst));
}

#[tokio::test]
async fn failed_validation_reports_property_and_code() {
    let schema = Schema::create([(
        "name",
        string()
            .valid_if(|v: &Value, _: &Value| *v != "vancouver")
            .with_error_code("INVALID_NAME"),
    )])
    .build();

    // a valid value first
    schema
        .validate(json!({ "name": "rio de janeiro" }))
        .await
        .unwrap();

    let err = schema
        .validate(json!({ "name": "vancouver" }))
        .await
        .unwrap_err();
    let errors = err.validation_errors().expect("expected validation errors");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].property.as_deref(), Some("name"));
    assert_eq!(errors[0].code, "INVALID_NAME");
}

#[tokio::test]
async fn custom_validator_in_schema() {
    let errmsg = "Name cannot be vancouver";
    let schema = Schema::create([("name", string())])
        .valid_if(|doc: &Value| doc["name"] != "vancouver")
        .with_error_message(errmsg)
        .with_error_code("INVALID_NAME")
        .build();

    let err = schema
        .validate(json!({ "name": "vancouver" }))
        .await
        .unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].property, None);
    assert_eq!(errors[0].message, errmsg);
    assert_eq!(errors[0].code, "INVALID_NAME");
}

#[tokio::test]
async fn not_null_failure_skips_custom_validators() {
    let (called, called_set) = flag();
    let schema = Schema::create([(
        "name",
        string()
            .not_null()
            .valid_if(move |v: &Value, _: &Value| {
                called_set.store(true, Ordering::SeqCst);
                *v != "vancouver"
            }),
    )])
    .build();

    let err = schema.validate(json!({ "name": null })).await.unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].property.as_deref(), Some("name"));
    assert_eq!(errors[0].code, codes::NOT_NULL);
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn property_errors_suppress_schema_validators() {
    let (called, called_set) = flag();
    let schema = Schema::create([("name", string().not_null())])
        .valid_if(move |_: &Value| {
            called_set.store(true, Ordering::SeqCst);
            false
        })
        .build();

    let err = schema.validate(json!({})).await.unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, codes::NOT_NULL);
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn unlabeled_failure_defaults_to_invalid_code() {
    let errmsg = "Cannot be Vancouver";
    let schema = Schema::create([(
        "name",
        string()
            .valid_if(|_: &Value, doc: &Value| {
                doc["name"].as_str().is_some_and(|n| n.to_lowercase() != "vancouver")
            })
            .with_error_message(errmsg),
    )])
    .build();

    schema.validate(json!({ "name": "Rio" })).await.unwrap();

    let err = schema
        .validate(json!({ "name": "Vancouver" }))
        .await
        .unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors[0].property.as_deref(), Some("name"));
    assert_eq!(errors[0].message, errmsg);
    assert_eq!(errors[0].code, codes::INVALID);
}

#[tokio::test]
async fn register_use_unregister_validator() {
    let err_msg = "Value must be less than 10";
    validators().register("smallNumber", |v: &Value, _: &Value| {
        if v.as_f64().is_some_and(|n| n > 10.0) {
            Some(err_msg.to_string())
        } else {
            None
        }
    });

    let schema = Schema::create([("value", number().valid_if_named("smallnumber"))]).build();

    let err = schema.validate(json!({ "value": 20 })).await.unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].property.as_deref(), Some("value"));
    assert_eq!(errors[0].message, err_msg);

    assert!(validators().get("smallNumber").is_some());
    validators().unregister("smallNumber");
    assert!(validators().get("smallNumber").is_none());

    // the schema still references the name: the next validate call must
    // reject with a configuration fault, not a validation-error list
    let err = schema.validate(json!({ "value": 20 })).await.unwrap_err();
    assert!(err.is_config());
    assert!(err.validation_errors().is_none());
    match err {
        SchemaError::Config(ConfigError::UnknownValidator(name)) => {
            assert_eq!(name, "smallnumber");
        }
        other => panic!("expected unknown-validator fault, got {other:?}"),
    }
}

#[tokio::test]
async fn registered_validator_with_default_code() {
    validators()
        .register("withinTen", |v: &Value, _: &Value| {
            v.as_f64().is_some_and(|n| n <= 10.0)
        })
        .with_error_code("NOT_SMALL_NUMBER");

    let schema = Schema::create([("value", number().valid_if_named("withinTen"))]).build();

    let err = schema.validate(json!({ "value": 20 })).await.unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].property.as_deref(), Some("value"));
    assert!(!errors[0].message.is_empty());
    assert_eq!(errors[0].code, "NOT_SMALL_NUMBER");

    let doc = schema.validate(json!({ "value": 10 })).await.unwrap();
    assert_eq!(doc["value"], 10);

    validators().unregister("withinTen");
}

#[tokio::test]
async fn registry_keys_are_case_insensitive() {
    validators().register("UpperBound", |v: &Value, _: &Value| {
        v.as_f64().is_some_and(|n| n < 100.0)
    });

    let schema = Schema::create([("value", number().valid_if_named("upperbound"))]).build();
    schema.validate(json!({ "value": 50 })).await.unwrap();
    assert!(schema.validate(json!({ "value": 200 })).await.is_err());

    validators().unregister("UPPERBOUND");
    assert!(validators().get("upperBound").is_none());
}

#[tokio::test]
async fn multiple_validators_fail_at_first_invalid() {
    let schema = Schema::create([(
        "value",
        number()
            .valid_if(|v: &Value, _: &Value| v.as_i64().is_some_and(|n| n < 20))
            .with_error_message("Must be lower than 20")
            .valid_if(|v: &Value, _: &Value| v.as_i64().is_some_and(|n| n < 10))
            .with_error_message("Must be lower than 10")
            .valid_if(|v: &Value, _: &Value| v.as_i64().is_some_and(|n| n < 8))
            .with_error_message("Must be lower than 8"),
    )])
    .build();

    for (value, message) in [
        (20, "Must be lower than 20"),
        (15, "Must be lower than 10"),
        (9, "Must be lower than 8"),
    ] {
        let err = schema.validate(json!({ "value": value })).await.unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].property.as_deref(), Some("value"));
        assert_eq!(errors[0].message, message);
    }

    let doc = schema.validate(json!({ "value": 5 })).await.unwrap();
    assert_eq!(doc["value"], 5);
}

#[tokio::test]
async fn later_validators_do_not_run_after_a_failure() {
    let (called, called_set) = flag();
    let schema = Schema::create([(
        "value",
        number()
            .valid_if(|_: &Value, _: &Value| false)
            .with_error_code("FIRST")
            .valid_if(move |_: &Value, _: &Value| {
                called_set.store(true, Ordering::SeqCst);
                false
            })
            .with_error_code("SECOND"),
    )])
    .build();

    let err = schema.validate(json!({ "value": 1 })).await.unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "FIRST");
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn message_resolved_from_function() {
    let schema = Schema::create([("val", string())])
        .valid_if(|_: &Value| false)
        .with_error_message_fn(|_: &Value| "LOCALIZED MESSAGE".to_string())
        .build();

    let err = schema.validate(json!({ "val": "Hi" })).await.unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "LOCALIZED MESSAGE");
}

#[tokio::test]
async fn message_resolver_is_lazy() {
    let (called, called_set) = flag();
    let schema = Schema::create([(
        "val",
        string()
            .valid_if(|_: &Value, _: &Value| true)
            .with_error_message_fn(move |_: &Value| {
                called_set.store(true, Ordering::SeqCst);
                "never".to_string()
            }),
    )])
    .build();

    schema.validate(json!({ "val": "ok" })).await.unwrap();
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn string_outcome_overrides_configured_message() {
    let schema = Schema::create([(
        "value",
        number()
            .valid_if(|v: &Value, _: &Value| {
                if v.as_i64().is_some_and(|n| n > 0) {
                    None
                } else {
                    Some("must be positive".to_string())
                }
            })
            .with_error_message("configured message")
            .with_error_code("POSITIVE"),
    )])
    .build();

    let err = schema.validate(json!({ "value": -3 })).await.unwrap_err();
    let errors = err.validation_errors().unwrap();
    // predicate-supplied message wins; configured code still applies
    assert_eq!(errors[0].message, "must be positive");
    assert_eq!(errors[0].code, "POSITIVE");
}

#[tokio::test]
async fn async_validators_share_the_pipeline() {
    let schema = Schema::create([(
        "value",
        number().valid_if_async(|v: Value, _doc: Value| async move {
            v.as_i64().is_some_and(|n| n % 2 == 0)
        }),
    )])
    .valid_if_async(|doc: Value| async move { doc["value"] != 42 })
    .with_error_code("NO_ANSWER")
    .build();

    schema.validate(json!({ "value": 4 })).await.unwrap();

    let err = schema.validate(json!({ "value": 3 })).await.unwrap_err();
    assert_eq!(err.validation_errors().unwrap()[0].code, codes::INVALID);

    let err = schema.validate(json!({ "value": 42 })).await.unwrap_err();
    let errors = err.validation_errors().unwrap();
    assert_eq!(errors[0].property, None);
    assert_eq!(errors[0].code, "NO_ANSWER");
}
