//! The `validate_using` operation for hosting-layer request types.
//!
//! Instead of patching a method onto a framework's request at startup, the
//! operation is an extension trait with a blanket impl over [`HasContext`].
//! Bringing [`ValidateUsing`] into scope is the whole registration step.
//!
//! # Integration Flow
//!
//! ```text
//! Framework request
//!   ↓ implements HasContext
//! request.validate_using(schema)
//!   ↓ context()? ── None ──> Error::ContextUnavailable
//!   ↓
//! RequestValidator::validate(schema)
//!   ↓
//! Ok(schema output) | Err(Error::Validation(failure))
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::Schema;
use crate::validator::RequestValidator;

use super::HasContext;

/// Validates a request's data with a schema.
///
/// Implemented for every [`HasContext`] type whose context is `Sync`.
///
/// # Examples
///
/// ```
/// use request_validator::web::{RequestSnapshot, ValidateUsing};
/// use request_validator::JsonSchema;
/// use serde::Deserialize;
/// use serde_json::json;
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct Login {
///     username: String,
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let schema = JsonSchema::<Login>::new(&json!({
///     "type": "object",
///     "properties": {"username": {"type": "string"}},
///     "required": ["username"]
/// }))
/// .unwrap();
///
/// let mut request = RequestSnapshot::new("req-1");
/// request.set_body_field("username", json!("virk"));
///
/// let login = request.validate_using(&schema).await.unwrap();
/// assert_eq!(login, Login { username: "virk".to_string() });
/// # }
/// ```
#[async_trait]
pub trait ValidateUsing {
    /// Validates this request's unified input against `schema`.
    ///
    /// # Errors
    ///
    /// - [`Error::ContextUnavailable`](crate::Error::ContextUnavailable) if
    ///   the request has no bound context
    /// - [`Error::Extraction`](crate::Error::Extraction) if a facet can't be read
    /// - [`Error::Validation`](crate::Error::Validation) with the schema's own failure
    async fn validate_using<S: Schema>(&self, schema: S) -> Result<S::Output>;
}

#[async_trait]
impl<H> ValidateUsing for H
where
    H: HasContext + Sync + ?Sized,
    H::Context: Sync,
{
    async fn validate_using<S: Schema>(&self, schema: S) -> Result<S::Output> {
        RequestValidator::from_context(self.context())?
            .validate(schema)
            .await
    }
}
