//! A [`Schema`] backed by JSON Schema documents.
//!
//! Validation runs through the `jsonschema` crate; the validated value is
//! then deserialized into the caller's output type.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use async_trait::async_trait;
use jsonschema::error::ValidationErrorKind;
use jsonschema::{ValidationError, Validator};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::issue::{IssueCode, PathSegment, ValidationFailure, ValidationIssue};
use crate::schema::Schema;

/// What happens to object keys the schema does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Undeclared keys are dropped from the output.
    #[default]
    Strip,
    /// Undeclared keys are rejected as `unrecognized_keys` issues.
    Strict,
    /// Undeclared keys are kept.
    Passthrough,
}

/// Controls JSON Schema validation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonSchemaConfig {
    /// Policy for keys not listed under an object schema's `properties`.
    pub unknown_keys: UnknownKeys,
    /// Maximum number of issues reported per failure. Values below 1 are treated as 1.
    pub max_issues: usize,
}

impl Default for JsonSchemaConfig {
    fn default() -> Self {
        Self {
            unknown_keys: UnknownKeys::Strip,
            max_issues: 32,
        }
    }
}

/// A compiled JSON Schema producing `T` on success.
///
/// `T` defaults to [`Value`]. With [`UnknownKeys::Strip`] the output only
/// carries declared properties, so validating a request against a schema
/// that declares just `username` yields `{"username": ...}` even though the
/// input also held `params`, `headers` and `cookies`.
///
/// # Examples
///
/// ```
/// use request_validator::{JsonSchema, Schema};
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let schema: JsonSchema = r#"{
///     "type": "object",
///     "properties": {"username": {"type": "string"}},
///     "required": ["username"]
/// }"#
/// .parse()
/// .unwrap();
///
/// let output = schema
///     .parse_async(json!({"username": "virk", "headers": {}}))
///     .await
///     .unwrap();
/// assert_eq!(output, json!({"username": "virk"}));
/// # }
/// ```
pub struct JsonSchema<T = Value> {
    document: Value,
    validator: Validator,
    config: JsonSchemaConfig,
    _output: PhantomData<fn() -> T>,
}

impl<T> JsonSchema<T> {
    /// Compiles `schema` with the default configuration.
    pub fn new(schema: &Value) -> Result<Self, SchemaError> {
        Self::with_config(schema, JsonSchemaConfig::default())
    }

    /// Compiles `schema` with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Compile`] if the document is not a valid schema.
    pub fn with_config(schema: &Value, config: JsonSchemaConfig) -> Result<Self, SchemaError> {
        let mut document = schema.clone();
        if config.unknown_keys == UnknownKeys::Strict {
            apply_strict_mode(&mut document);
        }

        let validator = jsonschema::validator_for(&document)
            .map_err(|e| SchemaError::Compile(Box::new(e)))?;

        Ok(Self {
            document,
            validator,
            config,
            _output: PhantomData,
        })
    }

    /// Returns the configuration this schema was compiled with.
    pub fn config(&self) -> &JsonSchemaConfig {
        &self.config
    }

    /// Returns the compiled document, including any strict-mode additions.
    pub fn document(&self) -> &Value {
        &self.document
    }

    fn check(&self, input: &Value) -> Result<(), ValidationFailure> {
        let limit = self.config.max_issues.max(1);
        let issues: Vec<ValidationIssue> = self
            .validator
            .iter_errors(input)
            .take(limit)
            .map(|err| to_issue(input, &err))
            .collect();

        match ValidationFailure::from_issues(issues) {
            Some(failure) => Err(failure),
            None => Ok(()),
        }
    }
}

impl<T: DeserializeOwned> JsonSchema<T> {
    /// Validates `input` synchronously and converts it into `T`.
    pub fn parse(&self, input: Value) -> Result<T, ValidationFailure> {
        self.check(&input)?;

        let mut output = input;
        if self.config.unknown_keys == UnknownKeys::Strip {
            strip_undeclared(&self.document, &[&self.document], &mut output);
        }

        serde_json::from_value(output).map_err(|e| {
            ValidationFailure::new(ValidationIssue::new(
                Vec::new(),
                IssueCode::Custom,
                e.to_string(),
            ))
        })
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send> Schema for JsonSchema<T> {
    type Output = T;

    async fn parse_async(&self, input: Value) -> Result<T, ValidationFailure> {
        self.parse(input)
    }
}

impl<T> FromStr for JsonSchema<T> {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let document: Value = serde_json::from_str(s)?;
        Self::new(&document)
    }
}

impl<T> fmt::Debug for JsonSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema")
            .field("document", &self.document)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn to_issue(instance: &Value, err: &ValidationError<'_>) -> ValidationIssue {
    let mut path = pointer_segments(instance, &err.instance_path().to_string());

    let code = match err.kind() {
        ValidationErrorKind::Required { property } => {
            let name = match property.as_str() {
                Some(name) => name.to_string(),
                None => property.to_string(),
            };
            path.push(PathSegment::Key(name));
            IssueCode::Required
        }
        ValidationErrorKind::Type { .. } => IssueCode::InvalidType,
        ValidationErrorKind::AdditionalProperties { .. }
        | ValidationErrorKind::UnevaluatedProperties { .. } => IssueCode::UnrecognizedKeys,
        _ => IssueCode::InvalidValue,
    };

    ValidationIssue::new(path, code, err.to_string())
}

/// Splits a JSON pointer into segments, using the instance to tell array
/// indices from numeric object keys.
fn pointer_segments(instance: &Value, pointer: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut current = Some(instance);

    for token in pointer.split('/').skip(1) {
        let token = token.replace("~1", "/").replace("~0", "~");
        match current {
            Some(Value::Array(items)) => match token.parse::<usize>() {
                Ok(index) => {
                    current = items.get(index);
                    segments.push(PathSegment::Index(index));
                }
                Err(_) => {
                    current = None;
                    segments.push(PathSegment::Key(token));
                }
            },
            Some(Value::Object(fields)) => {
                current = fields.get(&token);
                segments.push(PathSegment::Key(token));
            }
            _ => {
                current = None;
                segments.push(PathSegment::Key(token));
            }
        }
    }

    segments
}

const COMBINATORS: [&str; 3] = ["allOf", "anyOf", "oneOf"];

/// Follows at most this many chained local `$ref`s while stripping.
const MAX_REF_HOPS: usize = 32;

fn apply_strict_mode(schema: &mut Value) {
    mark_strict(schema, false);
}

/// Closes object schemas against undeclared keys.
///
/// Combinator branches are left open: each branch only sees its own
/// `properties`, so the parent closes over all of them with
/// `unevaluatedProperties` instead.
fn mark_strict(schema: &mut Value, in_branch: bool) {
    let Value::Object(map) = schema else {
        return;
    };

    let already_closed =
        map.contains_key("additionalProperties") || map.contains_key("unevaluatedProperties");
    if !in_branch && !already_closed {
        if composes_objects(map) {
            map.insert("unevaluatedProperties".to_string(), Value::Bool(false));
        } else if is_object_schema(map) {
            map.insert("additionalProperties".to_string(), Value::Bool(false));
        }
    }

    for key in ["properties", "patternProperties", "$defs", "definitions"] {
        if let Some(Value::Object(children)) = map.get_mut(key) {
            children.values_mut().for_each(|c| mark_strict(c, false));
        }
    }
    for key in ["items", "additionalProperties", "not"] {
        if let Some(child) = map.get_mut(key) {
            mark_strict(child, false);
        }
    }
    if let Some(Value::Array(children)) = map.get_mut("prefixItems") {
        children.iter_mut().for_each(|c| mark_strict(c, false));
    }
    for key in COMBINATORS {
        if let Some(Value::Array(branches)) = map.get_mut(key) {
            branches.iter_mut().for_each(|b| mark_strict(b, true));
        }
    }
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
    match map.get("type") {
        Some(Value::String(t)) => t == "object",
        Some(Value::Array(types)) => types.iter().any(|t| t == "object"),
        _ => map.contains_key("properties"),
    }
}

/// True when any combinator branch describes an object.
fn composes_objects(map: &Map<String, Value>) -> bool {
    COMBINATORS.iter().any(|key| match map.get(*key) {
        Some(Value::Array(branches)) => branches.iter().any(|branch| match branch {
            Value::Object(branch) => is_object_schema(branch) || composes_objects(branch),
            _ => false,
        }),
        _ => false,
    })
}

/// Resolves a schema's local `$ref` (`#/...`) against the document root.
fn local_ref<'a>(root: &'a Value, map: &Map<String, Value>) -> Option<&'a Value> {
    let pointer = map.get("$ref")?.as_str()?.strip_prefix('#')?;
    root.pointer(pointer)
}

/// What a set of schemas declares about one position in the instance.
#[derive(Default)]
struct Declared<'a> {
    properties: Vec<(&'a str, &'a Value)>,
    declares_properties: bool,
    open: bool,
    items: Vec<&'a Value>,
}

impl<'a> Declared<'a> {
    /// Gathers declarations from `schema`, its local `$ref` target and its
    /// combinator branches.
    fn collect(&mut self, root: &'a Value, schema: &'a Value, hops: usize) {
        let Value::Object(map) = schema else {
            return;
        };

        if let Some(Value::Object(properties)) = map.get("properties") {
            self.declares_properties = true;
            self.properties
                .extend(properties.iter().map(|(k, v)| (k.as_str(), v)));
            let keeps_extra = map
                .get("additionalProperties")
                .is_some_and(|a| a != &Value::Bool(false))
                || map.contains_key("patternProperties");
            self.open |= keeps_extra;
        }
        if let Some(items) = map.get("items") {
            self.items.push(items);
        }
        if hops < MAX_REF_HOPS {
            if let Some(target) = local_ref(root, map) {
                self.collect(root, target, hops + 1);
            }
        }
        for key in COMBINATORS {
            if let Some(Value::Array(branches)) = map.get(key) {
                for branch in branches {
                    self.collect(root, branch, hops);
                }
            }
        }
    }

    fn schemas_for(&self, key: &str) -> Vec<&'a Value> {
        self.properties
            .iter()
            .filter(|(name, _)| *name == key)
            .map(|(_, schema)| *schema)
            .collect()
    }
}

/// Removes object keys not declared under `properties`, recursively.
///
/// Local `$ref`s and `allOf`/`anyOf`/`oneOf` branches are followed; a key
/// declared by any of them is kept. Objects whose schema sets
/// `additionalProperties` or `patternProperties` keep their extra keys; so
/// does anything under a schema without `properties`.
fn strip_undeclared(root: &Value, schemas: &[&Value], value: &mut Value) {
    let mut declared = Declared::default();
    for schema in schemas {
        declared.collect(root, schema, 0);
    }

    match value {
        Value::Object(fields) => {
            if !declared.declares_properties {
                return;
            }
            if !declared.open {
                fields.retain(|key, _| {
                    declared
                        .properties
                        .iter()
                        .any(|(name, _)| *name == key.as_str())
                });
            }
            for (key, child) in fields.iter_mut() {
                let child_schemas = declared.schemas_for(key);
                if !child_schemas.is_empty() {
                    strip_undeclared(root, &child_schemas, child);
                }
            }
        }
        Value::Array(items) => {
            if !declared.items.is_empty() {
                for item in items.iter_mut() {
                    strip_undeclared(root, &declared.items, item);
                }
            }
        }
        _ => {}
    }
}
