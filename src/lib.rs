//! Schema validation for HTTP request data.
//!
//! This crate validates everything a handler receives from a request in one
//! call:
//! - **Unified input**: body fields at the top level, with route parameters,
//!   headers and cookies nested under `params`, `headers` and `cookies`
//! - **Pluggable schemas**: any validator implementing the async [`Schema`]
//!   trait, including the bundled [`JsonSchema`]
//! - **Structured failures**: a [`ValidationFailure`] listing each issue's
//!   path, code and message, returned exactly as the schema produced it
//!
//! # Core Types
//!
//! - [`RequestValidator`]: Binds a request context and runs a schema over it
//! - [`UnifiedInput`]: The merged record handed to the schema
//! - [`Schema`]: Async validation capability producing a typed output
//! - [`JsonSchema<T>`]: JSON Schema implementation of [`Schema`]
//! - [`web::ValidateUsing`]: `validate_using` for any request with a context
//!
//! # Examples
//!
//! ```
//! use request_validator::web::{RequestSnapshot, ValidateUsing};
//! use request_validator::{IssueCode, JsonSchema};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let schema: JsonSchema = JsonSchema::new(&json!({
//!     "type": "object",
//!     "properties": {
//!         "username": {"type": "string"},
//!         "headers": {
//!             "type": "object",
//!             "properties": {"accept": {"type": "string"}},
//!             "required": ["accept"]
//!         }
//!     },
//!     "required": ["username", "headers"]
//! }))
//! .unwrap();
//!
//! let mut request = RequestSnapshot::new("req-123");
//! request.set_body_field("username", json!("virk"));
//! request.add_header("Accept", "json");
//!
//! let output = request.validate_using(&schema).await.unwrap();
//! assert_eq!(output, json!({"username": "virk", "headers": {"accept": "json"}}));
//!
//! // Missing fields come back as structured issues
//! let empty = RequestSnapshot::new("req-124");
//! let failure = empty
//!     .validate_using(&schema)
//!     .await
//!     .unwrap_err()
//!     .into_validation_failure()
//!     .unwrap();
//! assert_eq!(failure.issues()[0].code, IssueCode::Required);
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod input;
mod issue;
mod json_schema;
mod schema;
mod validator;
pub mod web;

pub use error::{Error, ExtractionError, Result, SchemaError};
pub use input::{UnifiedInput, COOKIES_KEY, HEADERS_KEY, PARAMS_KEY};
pub use issue::{IssueCode, PathSegment, ValidationFailure, ValidationIssue};
pub use json_schema::{JsonSchema, JsonSchemaConfig, UnknownKeys};
pub use schema::{schema_fn, Schema, SchemaFn};
pub use validator::RequestValidator;
