//! Composition of request facets into a single record.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Key under which route parameters are nested.
pub const PARAMS_KEY: &str = "params";
/// Key under which request headers are nested.
pub const HEADERS_KEY: &str = "headers";
/// Key under which request cookies are nested.
pub const COOKIES_KEY: &str = "cookies";

/// The single mapping handed to a schema.
///
/// Body fields sit at the top level. Route parameters, headers and cookies
/// are nested under `params`, `headers` and `cookies`. When the body itself
/// carries one of those three keys, the nested request facet replaces it.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use request_validator::UnifiedInput;
/// use serde_json::{json, Map};
///
/// let mut body = Map::new();
/// body.insert("params".to_string(), json!("x"));
///
/// let params = BTreeMap::from([("id".to_string(), "1".to_string())]);
/// let input = UnifiedInput::compose(body, &params, &BTreeMap::new(), &BTreeMap::new());
///
/// assert_eq!(input.get("params"), Some(&json!({"id": "1"})));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedInput {
    fields: Map<String, Value>,
}

impl UnifiedInput {
    /// Builds the record: body fields first, then the three namespaced facets.
    pub fn compose(
        body: Map<String, Value>,
        params: &BTreeMap<String, String>,
        headers: &BTreeMap<String, String>,
        cookies: &BTreeMap<String, String>,
    ) -> Self {
        let mut fields = body;
        fields.insert(PARAMS_KEY.to_string(), string_map(params));
        fields.insert(HEADERS_KEY.to_string(), string_map(headers));
        fields.insert(COOKIES_KEY.to_string(), string_map(cookies));
        Self { fields }
    }

    /// Returns the value stored under a top-level key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the number of top-level keys, namespaced facets included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always `false`: the three namespaced keys are present even for an empty request.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Borrows the record as a JSON object map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Converts the record into the JSON value passed to a schema.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<UnifiedInput> for Value {
    fn from(input: UnifiedInput) -> Self {
        input.into_value()
    }
}

fn string_map(entries: &BTreeMap<String, String>) -> Value {
    Value::Object(
        entries
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn empty() -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn empty_request_still_has_namespaces() {
        let input = UnifiedInput::compose(Map::new(), &empty(), &empty(), &empty());

        assert_eq!(
            input.into_value(),
            json!({"params": {}, "headers": {}, "cookies": {}})
        );
    }

    #[test]
    fn body_fields_sit_at_top_level() {
        let input = UnifiedInput::compose(
            body(json!({"username": "virk", "age": 30})),
            &empty(),
            &empty(),
            &empty(),
        );

        assert_eq!(input.get("username"), Some(&json!("virk")));
        assert_eq!(input.get("age"), Some(&json!(30)));
        assert_eq!(input.len(), 5);
    }

    #[test]
    fn namespaced_facets_override_body_fields() {
        let params = BTreeMap::from([("id".to_string(), "1".to_string())]);
        let headers = BTreeMap::from([("accept".to_string(), "json".to_string())]);
        let cookies = BTreeMap::from([("session".to_string(), "abc".to_string())]);

        let input = UnifiedInput::compose(
            body(json!({
                "params": "x",
                "headers": {"accept": "xml"},
                "cookies": ["forged"],
            })),
            &params,
            &headers,
            &cookies,
        );

        assert_eq!(input.get("params"), Some(&json!({"id": "1"})));
        assert_eq!(input.get("headers"), Some(&json!({"accept": "json"})));
        assert_eq!(input.get("cookies"), Some(&json!({"session": "abc"})));
    }

    #[test]
    fn facet_values_are_strings() {
        let params = BTreeMap::from([("id".to_string(), "42".to_string())]);
        let input = UnifiedInput::compose(Map::new(), &params, &empty(), &empty());

        assert_eq!(input.get("params"), Some(&json!({"id": "42"})));
    }
}
