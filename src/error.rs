use crate::issue::ValidationFailure;

/// Errors returned by [`RequestValidator`](crate::RequestValidator) and
/// [`ValidateUsing`](crate::web::ValidateUsing).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request has no bound context to read from.
    #[error("request context is unavailable")]
    ContextUnavailable,

    /// A request accessor failed while reading its facet.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// The schema rejected the unified input.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
}

impl Error {
    /// Returns the schema's failure if this is a validation error.
    pub fn validation_failure(&self) -> Option<&ValidationFailure> {
        match self {
            Error::Validation(failure) => Some(failure),
            _ => None,
        }
    }

    /// Consumes the error, returning the schema's failure untouched.
    ///
    /// Any other variant is handed back in `Err`.
    pub fn into_validation_failure(self) -> std::result::Result<ValidationFailure, Error> {
        match self {
            Error::Validation(failure) => Ok(failure),
            other => Err(other),
        }
    }
}

/// Failures raised while reading a facet of the request.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The raw body is not valid JSON.
    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    /// The body parsed, but not into a field mapping.
    #[error("request body must be an object, got {found}")]
    BodyNotAnObject {
        /// JSON type name of what was found instead
        found: &'static str,
    },

    /// A hosting-layer accessor failed for its own reasons.
    #[error("failed to read request {facet}: {message}")]
    Accessor {
        /// Which facet was being read (`body`, `params`, `headers`, `cookies`)
        facet: &'static str,
        /// Accessor-provided detail
        message: String,
    },
}

/// Errors raised while building a [`JsonSchema`](crate::JsonSchema).
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema text is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The schema document could not be compiled.
    ///
    /// The compiler's error is kept as the [`source`](std::error::Error::source).
    #[error("failed to compile schema: {0}")]
    Compile(#[source] Box<jsonschema::ValidationError<'static>>),
}

/// Result alias for validator operations.
pub type Result<T> = std::result::Result<T, Error>;
