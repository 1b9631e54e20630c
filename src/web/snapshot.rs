//! Owned, framework-agnostic request view.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::ExtractionError;

use super::{HasContext, RequestSource};

/// Body as it arrived: already parsed into fields, or still raw JSON text.
#[derive(Debug, Clone)]
enum Body {
    Parsed(Map<String, Value>),
    Raw(String),
}

/// Snapshot of an HTTP request's validatable data.
///
/// `RequestSnapshot` is the primary integration point for frameworks that
/// don't want to implement [`RequestSource`] themselves: copy the request's
/// body, route parameters, headers and cookies into it and validate.
///
/// # Design Notes
///
/// Header names are stored lowercased, so [`header`](Self::header) lookups
/// are case-insensitive. Repeated headers are joined with `", "`.
///
/// A raw body set with [`set_raw_body`](Self::set_raw_body) is parsed on
/// every [`body`](RequestSource::body) call; a parse failure surfaces as an
/// [`ExtractionError`] rather than an empty body.
///
/// # Examples
///
/// ```
/// use request_validator::web::{RequestSnapshot, RequestSource};
/// use serde_json::json;
///
/// let mut snapshot = RequestSnapshot::new("req-12345");
/// snapshot.set_body_field("username", json!("virk"));
/// snapshot.add_param("id", "1");
/// snapshot.add_header("Accept", "json");
///
/// assert_eq!(snapshot.header("ACCEPT"), Some("json"));
/// assert_eq!(snapshot.params().unwrap()["id"], "1");
/// ```
#[derive(Debug, Clone)]
pub struct RequestSnapshot {
    request_id: String,
    body: Body,
    params: BTreeMap<String, String>,
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
}

impl RequestSnapshot {
    /// Creates an empty snapshot with the given request ID.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            body: Body::Parsed(Map::new()),
            params: BTreeMap::new(),
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
        }
    }

    /// Replaces the body with already-parsed fields.
    pub fn set_body(&mut self, fields: Map<String, Value>) {
        self.body = Body::Parsed(fields);
    }

    /// Sets a single parsed body field.
    ///
    /// A raw body set earlier is discarded.
    pub fn set_body_field(&mut self, key: impl Into<String>, value: Value) {
        match &mut self.body {
            Body::Parsed(fields) => {
                fields.insert(key.into(), value);
            }
            Body::Raw(_) => {
                let mut fields = Map::new();
                fields.insert(key.into(), value);
                self.body = Body::Parsed(fields);
            }
        }
    }

    /// Stores unparsed JSON body text.
    pub fn set_raw_body(&mut self, raw: impl Into<String>) {
        self.body = Body::Raw(raw.into());
    }

    /// Adds a route parameter.
    pub fn add_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Adds a header. Repeated names are joined with `", "`.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        let value = value.into();
        self.headers
            .entry(name.as_ref().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }

    /// Adds a cookie.
    pub fn add_cookie(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    /// Parses a `Cookie` header value (`a=1; b=2`) into cookies.
    ///
    /// Pairs without `=` are ignored. Values wrapped in double quotes are unquoted.
    pub fn add_cookie_header(&mut self, header: &str) {
        for pair in header.split(';') {
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            self.cookies.insert(name.to_string(), value.to_string());
        }
    }

    /// Returns the request ID.
    pub fn id(&self) -> &str {
        &self.request_id
    }

    /// Looks up a header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

impl RequestSource for RequestSnapshot {
    fn request_id(&self) -> Option<&str> {
        Some(&self.request_id)
    }

    fn body(&self) -> Result<Map<String, Value>, ExtractionError> {
        match &self.body {
            Body::Parsed(fields) => Ok(fields.clone()),
            Body::Raw(raw) if raw.trim().is_empty() => Ok(Map::new()),
            Body::Raw(raw) => match serde_json::from_str(raw)? {
                Value::Object(fields) => Ok(fields),
                other => Err(ExtractionError::BodyNotAnObject {
                    found: json_type_name(&other),
                }),
            },
        }
    }

    fn params(&self) -> Result<BTreeMap<String, String>, ExtractionError> {
        Ok(self.params.clone())
    }

    fn headers(&self) -> Result<BTreeMap<String, String>, ExtractionError> {
        Ok(self.headers.clone())
    }

    fn cookies(&self) -> Result<BTreeMap<String, String>, ExtractionError> {
        Ok(self.cookies.clone())
    }
}

impl HasContext for RequestSnapshot {
    type Context = Self;

    fn context(&self) -> Option<&Self> {
        Some(self)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_snapshot_new() {
        let snapshot = RequestSnapshot::new("req-test");
        assert_eq!(snapshot.id(), "req-test");
        assert!(snapshot.body().unwrap().is_empty());
        assert!(snapshot.params().unwrap().is_empty());
    }

    #[test]
    fn headers_are_case_insensitive() {
        let mut snapshot = RequestSnapshot::new("req-1");
        snapshot.add_header("X-Custom", "value");

        assert_eq!(snapshot.header("x-custom"), Some("value"));
        assert_eq!(snapshot.header("X-CUSTOM"), Some("value"));
        assert!(snapshot.headers().unwrap().contains_key("x-custom"));
    }

    #[test]
    fn repeated_headers_are_joined() {
        let mut snapshot = RequestSnapshot::new("req-1");
        snapshot.add_header("Accept", "text/html");
        snapshot.add_header("accept", "application/json");

        assert_eq!(snapshot.header("accept"), Some("text/html, application/json"));
    }

    #[test]
    fn cookie_header_is_parsed() {
        let mut snapshot = RequestSnapshot::new("req-1");
        snapshot.add_cookie_header("session=abc; theme=\"dark\"; flag; =orphan");

        let cookies = snapshot.cookies().unwrap();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies["session"], "abc");
        assert_eq!(cookies["theme"], "dark");
    }

    #[test]
    fn raw_body_is_parsed_on_read() {
        let mut snapshot = RequestSnapshot::new("req-1");
        snapshot.set_raw_body(r#"{"username": "virk"}"#);

        assert_eq!(snapshot.body().unwrap().get("username"), Some(&json!("virk")));
    }

    #[test]
    fn blank_raw_body_is_empty() {
        let mut snapshot = RequestSnapshot::new("req-1");
        snapshot.set_raw_body("  ");

        assert!(snapshot.body().unwrap().is_empty());
    }

    #[test]
    fn malformed_raw_body_fails_extraction() {
        let mut snapshot = RequestSnapshot::new("req-1");
        snapshot.set_raw_body("{not json");

        assert!(matches!(
            snapshot.body(),
            Err(ExtractionError::MalformedBody(_))
        ));
    }

    #[test]
    fn non_object_raw_body_fails_extraction() {
        let mut snapshot = RequestSnapshot::new("req-1");
        snapshot.set_raw_body("[1, 2]");

        assert!(matches!(
            snapshot.body(),
            Err(ExtractionError::BodyNotAnObject { found: "array" })
        ));
    }

    #[test]
    fn body_field_replaces_raw_body() {
        let mut snapshot = RequestSnapshot::new("req-1");
        snapshot.set_raw_body("{not json");
        snapshot.set_body_field("username", json!("virk"));

        assert_eq!(snapshot.body().unwrap().len(), 1);
    }

    #[test]
    fn multiple_reads_produce_independent_copies() {
        let mut snapshot = RequestSnapshot::new("req-1");
        snapshot.add_param("k", "v");

        let mut first = snapshot.params().unwrap();
        first.insert("extra".to_string(), "x".to_string());
        let second = snapshot.params().unwrap();

        assert_eq!(second.len(), 1);
    }

    #[test]
    fn snapshot_is_its_own_context() {
        let snapshot = RequestSnapshot::new("req-ctx");
        assert_eq!(snapshot.context().map(|c| c.id()), Some("req-ctx"));
    }
}
