//! The schema capability the validator delegates to.
//!
//! A [`Schema`] turns an untyped [`Value`] into a typed output or a
//! [`ValidationFailure`]. The validator never looks inside a schema; any
//! schema library can sit behind this trait.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::issue::ValidationFailure;

/// An asynchronous validation capability.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use request_validator::{IssueCode, Schema, ValidationFailure, ValidationIssue};
/// use serde_json::Value;
///
/// struct Username;
///
/// #[async_trait]
/// impl Schema for Username {
///     type Output = String;
///
///     async fn parse_async(&self, input: Value) -> Result<String, ValidationFailure> {
///         match input.get("username").and_then(Value::as_str) {
///             Some(name) => Ok(name.to_string()),
///             None => Err(ValidationFailure::new(ValidationIssue::new(
///                 vec!["username".into()],
///                 IssueCode::Required,
///                 "username is required",
///             ))),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Schema: Send + Sync {
    /// The validated shape produced on success.
    type Output: Send;

    /// Validates `input`, producing the typed output or a structured failure.
    async fn parse_async(&self, input: Value) -> Result<Self::Output, ValidationFailure>;
}

#[async_trait]
impl<S: Schema + ?Sized> Schema for &S {
    type Output = S::Output;

    async fn parse_async(&self, input: Value) -> Result<Self::Output, ValidationFailure> {
        (**self).parse_async(input).await
    }
}

#[async_trait]
impl<S: Schema + ?Sized> Schema for Arc<S> {
    type Output = S::Output;

    async fn parse_async(&self, input: Value) -> Result<Self::Output, ValidationFailure> {
        (**self).parse_async(input).await
    }
}

#[async_trait]
impl<S: Schema + ?Sized> Schema for Box<S> {
    type Output = S::Output;

    async fn parse_async(&self, input: Value) -> Result<Self::Output, ValidationFailure> {
        (**self).parse_async(input).await
    }
}

/// A [`Schema`] built from an async closure. See [`schema_fn`].
#[derive(Clone)]
pub struct SchemaFn<F> {
    f: F,
}

impl<F> fmt::Debug for SchemaFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaFn").finish_non_exhaustive()
    }
}

/// Wraps an async closure as a [`Schema`].
///
/// Handy for bridging schema libraries that already expose an async
/// `parse` function, and for tests.
///
/// # Examples
///
/// ```
/// use request_validator::schema_fn;
/// use serde_json::Value;
///
/// let passthrough = schema_fn(|input: Value| async move { Ok(input) });
/// # let _ = passthrough;
/// ```
pub fn schema_fn<F, Fut, T>(f: F) -> SchemaFn<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, ValidationFailure>> + Send,
    T: Send,
{
    SchemaFn { f }
}

#[async_trait]
impl<F, Fut, T> Schema for SchemaFn<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, ValidationFailure>> + Send,
    T: Send,
{
    type Output = T;

    async fn parse_async(&self, input: Value) -> Result<T, ValidationFailure> {
        (self.f)(input).await
    }
}
