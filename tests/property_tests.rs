//! Property tests for input composition and validation.
//!
//! These tests check the merge rule and repeatability over arbitrary
//! request contents.

use proptest::prelude::*;
use request_validator::web::{RequestSnapshot, ValidateUsing};
use request_validator::{schema_fn, RequestValidator, COOKIES_KEY, HEADERS_KEY, PARAMS_KEY};
use serde_json::{json, Value};

// Strategy: Generate arbitrary string maps for params/headers/cookies
fn arb_string_map() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(
        (
            prop::string::string_regex("[a-z][a-z0-9-]{0,8}").unwrap(),
            prop::string::string_regex("[ -~]{0,12}").unwrap(),
        ),
        0..5,
    )
}

// Strategy: Generate a body value that might collide with a namespaced key
fn arb_body_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        prop::string::string_regex("[a-z]{0,6}").unwrap().prop_map(Value::String),
        Just(json!({"forged": "value"})),
    ]
}

fn snapshot(
    body: &[(String, Value)],
    params: &[(String, String)],
    headers: &[(String, String)],
    cookies: &[(String, String)],
) -> RequestSnapshot {
    let mut snapshot = RequestSnapshot::new("req-prop");
    for (k, v) in body {
        snapshot.set_body_field(k.clone(), v.clone());
    }
    for (k, v) in params {
        snapshot.add_param(k.clone(), v.clone());
    }
    for (k, v) in headers {
        snapshot.add_header(k, v.clone());
    }
    for (k, v) in cookies {
        snapshot.add_cookie(k.clone(), v.clone());
    }
    snapshot
}

proptest! {
    /// Property: Namespaced facets always win over same-named body fields
    #[test]
    fn proptest_namespaced_facets_override_body(
        colliding in arb_body_value(),
        extra in prop::string::string_regex("[a-z]{1,8}").unwrap(),
        params in arb_string_map(),
        cookies in arb_string_map(),
    ) {
        let body = vec![
            (PARAMS_KEY.to_string(), colliding.clone()),
            (HEADERS_KEY.to_string(), colliding.clone()),
            (COOKIES_KEY.to_string(), colliding),
            (format!("field_{}", extra), json!(extra)),
        ];
        let request = snapshot(&body, &params, &[], &cookies);

        let input = RequestValidator::new(&request).unified_input().unwrap();

        let expected_params: serde_json::Map<String, Value> = params
            .iter()
            .map(|(k, v)| (k.clone(), json!(v)))
            .collect();
        let expected_cookies: serde_json::Map<String, Value> = cookies
            .iter()
            .map(|(k, v)| (k.clone(), json!(v)))
            .collect();

        prop_assert_eq!(input.get(PARAMS_KEY), Some(&Value::Object(expected_params)));
        prop_assert_eq!(input.get(HEADERS_KEY), Some(&json!({})));
        prop_assert_eq!(input.get(COOKIES_KEY), Some(&Value::Object(expected_cookies)));
        let field_key = format!("field_{}", extra);
        prop_assert_eq!(input.get(&field_key), Some(&json!(extra)));
    }

    /// Property: Validating the same request twice gives the same result
    #[test]
    fn proptest_revalidation_is_repeatable(
        params in arb_string_map(),
        headers in arb_string_map(),
        cookies in arb_string_map(),
    ) {
        let request = snapshot(&[], &params, &headers, &cookies);
        let echo = schema_fn(|input: Value| async move { Ok(input) });

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let first = runtime.block_on(request.validate_using(&echo)).unwrap();
        let second = runtime.block_on(request.validate_using(&echo)).unwrap();

        prop_assert_eq!(first, second);
    }
}
