use std::fmt;

use crate::error::{Error, Result};
use crate::input::UnifiedInput;
use crate::schema::Schema;
use crate::web::RequestSource;

/// Binds a schema to one request context and runs validation.
///
/// The validator holds no state of its own: every call to
/// [`validate`](Self::validate) reads the context afresh, so reusing one
/// validator (or validating concurrently through copies of it) is safe.
///
/// # Flow
///
/// ```text
/// body ─┐
/// params ┼─> UnifiedInput ──> Schema::parse_async ──> Ok(Output)
/// headers│                                        └─> Err(Error::Validation)
/// cookies┘
/// ```
///
/// All four facets are read synchronously before the schema is awaited, so
/// the schema sees one consistent point-in-time record.
///
/// # Examples
///
/// ```
/// use request_validator::{schema_fn, RequestValidator};
/// use request_validator::web::RequestSnapshot;
/// use serde_json::{json, Value};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut snapshot = RequestSnapshot::new("req-1");
/// snapshot.set_body_field("username", json!("virk"));
///
/// let schema = schema_fn(|input: Value| async move { Ok(input["username"].clone()) });
/// let username = RequestValidator::new(&snapshot).validate(schema).await.unwrap();
/// assert_eq!(username, json!("virk"));
/// # }
/// ```
pub struct RequestValidator<'a, R: ?Sized> {
    ctx: &'a R,
}

impl<'a, R: RequestSource + ?Sized> RequestValidator<'a, R> {
    /// Creates a validator bound to `ctx`.
    pub fn new(ctx: &'a R) -> Self {
        Self { ctx }
    }

    /// Creates a validator from a context that may be missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ContextUnavailable`] if `ctx` is `None`. Nothing is
    /// read from the request in that case.
    pub fn from_context(ctx: Option<&'a R>) -> Result<Self> {
        ctx.map(Self::new).ok_or(Error::ContextUnavailable)
    }

    /// Reads all four facets and composes them into a [`UnifiedInput`].
    ///
    /// Facets are read in the order body, params, headers, cookies. The first
    /// accessor failure is returned as-is.
    pub fn unified_input(&self) -> Result<UnifiedInput> {
        let body = self.ctx.body()?;
        let params = self.ctx.params()?;
        let headers = self.ctx.headers()?;
        let cookies = self.ctx.cookies()?;

        Ok(UnifiedInput::compose(body, &params, &headers, &cookies))
    }

    /// Validates the request against `schema`.
    ///
    /// On success, returns whatever the schema produced. On failure, the
    /// schema's [`ValidationFailure`](crate::ValidationFailure) is returned
    /// inside [`Error::Validation`] exactly as the schema built it.
    ///
    /// Dropping the returned future cancels the schema call; no partial
    /// result is kept.
    ///
    /// # Errors
    ///
    /// - [`Error::Extraction`] if a request accessor fails
    /// - [`Error::Validation`] if the schema rejects the input
    pub async fn validate<S: Schema>(&self, schema: S) -> Result<S::Output> {
        let request_id = self.ctx.request_id().unwrap_or("-");

        let input = match self.unified_input() {
            Ok(input) => input,
            Err(err) => {
                tracing::warn!(request_id = %request_id, error = %err, "request extraction failed");
                return Err(err);
            }
        };

        tracing::debug!(
            request_id = %request_id,
            fields = input.len(),
            "validating request input"
        );

        match schema.parse_async(input.into_value()).await {
            Ok(output) => {
                tracing::debug!(request_id = %request_id, "request input accepted");
                Ok(output)
            }
            Err(failure) => {
                tracing::debug!(
                    request_id = %request_id,
                    issues = failure.issues().len(),
                    "request input rejected"
                );
                Err(Error::Validation(failure))
            }
        }
    }
}

impl<R: ?Sized> Clone for RequestValidator<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: ?Sized> Copy for RequestValidator<'_, R> {}

impl<R: RequestSource + ?Sized> fmt::Debug for RequestValidator<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestValidator")
            .field("request_id", &self.ctx.request_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::issue::{IssueCode, ValidationFailure, ValidationIssue};
    use crate::schema::schema_fn;
    use crate::web::RequestSnapshot;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn echo() -> impl Schema<Output = Value> {
        schema_fn(|input: Value| async move { Ok(input) })
    }

    #[test]
    fn missing_context_is_rejected_up_front() {
        let result = RequestValidator::<RequestSnapshot>::from_context(None);
        assert!(matches!(result, Err(Error::ContextUnavailable)));
    }

    #[test]
    fn unified_input_merges_all_facets() {
        let mut snapshot = RequestSnapshot::new("req-1");
        snapshot.set_body_field("username", json!("virk"));
        snapshot.add_param("id", "1");
        snapshot.add_header("Accept", "json");
        snapshot.add_cookie("session", "abc");

        let input = RequestValidator::new(&snapshot).unified_input().unwrap();

        assert_eq!(
            input.into_value(),
            json!({
                "username": "virk",
                "params": {"id": "1"},
                "headers": {"accept": "json"},
                "cookies": {"session": "abc"},
            })
        );
    }

    #[tokio::test]
    async fn schema_sees_unified_input() {
        let mut snapshot = RequestSnapshot::new("req-2");
        snapshot.set_body_field("params", json!("x"));
        snapshot.add_param("id", "1");

        let seen = RequestValidator::new(&snapshot)
            .validate(echo())
            .await
            .unwrap();

        assert_eq!(seen["params"], json!({"id": "1"}));
    }

    #[tokio::test]
    async fn extraction_failure_skips_schema() {
        let mut snapshot = RequestSnapshot::new("req-3");
        snapshot.set_raw_body("{broken");

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let schema = schema_fn(move |input: Value| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, ValidationFailure>(input) }
        });

        let err = RequestValidator::new(&snapshot)
            .validate(schema)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Extraction(ExtractionError::MalformedBody(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn schema_failure_is_returned_verbatim() {
        let failure = ValidationFailure::new(ValidationIssue::new(
            vec!["username".into()],
            IssueCode::Required,
            "username is required",
        ));
        let expected = failure.clone();
        let schema = schema_fn(move |_input: Value| {
            let failure = failure.clone();
            async move { Err::<(), _>(failure) }
        });

        let snapshot = RequestSnapshot::new("req-4");
        let err = RequestValidator::new(&snapshot)
            .validate(schema)
            .await
            .unwrap_err();

        assert_eq!(err.into_validation_failure().unwrap(), expected);
    }

    #[test]
    fn validator_is_copy() {
        let snapshot = RequestSnapshot::new("req-5");
        let validator = RequestValidator::new(&snapshot);
        let copy = validator;

        assert_eq!(format!("{:?}", copy), format!("{:?}", validator));
    }
}
