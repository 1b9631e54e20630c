//! Extraction boundary traits for web integration.
//!
//! This module defines the seam between framework-specific request types and
//! the validator: how facets are read, and how a request exposes its context.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::ExtractionError;

/// Read access to the four facets of a request.
///
/// Framework integrations implement this for their request context. Each
/// accessor is called once per validation, in the order body, params,
/// headers, cookies, and must not have side effects beyond producing its data.
///
/// # Body Policy
///
/// `body` returns the full parsed body: every field the body parser
/// populated, with no whitelist applied. Deciding which fields matter is
/// the schema's job.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use request_validator::web::RequestSource;
/// use request_validator::ExtractionError;
/// use serde_json::{Map, Value};
///
/// struct MyFrameworkRequest {
///     route: BTreeMap<String, String>,
/// }
///
/// impl RequestSource for MyFrameworkRequest {
///     fn body(&self) -> Result<Map<String, Value>, ExtractionError> {
///         Ok(Map::new())
///     }
///     fn params(&self) -> Result<BTreeMap<String, String>, ExtractionError> {
///         Ok(self.route.clone())
///     }
///     fn headers(&self) -> Result<BTreeMap<String, String>, ExtractionError> {
///         Ok(BTreeMap::new())
///     }
///     fn cookies(&self) -> Result<BTreeMap<String, String>, ExtractionError> {
///         Ok(BTreeMap::new())
///     }
/// }
/// ```
pub trait RequestSource {
    /// Identifier used to correlate log events. Defaults to none.
    fn request_id(&self) -> Option<&str> {
        None
    }

    /// Parsed body fields, or an empty map when there is no body.
    fn body(&self) -> Result<Map<String, Value>, ExtractionError>;

    /// Route parameters.
    fn params(&self) -> Result<BTreeMap<String, String>, ExtractionError>;

    /// Request headers, keyed by lowercase name.
    fn headers(&self) -> Result<BTreeMap<String, String>, ExtractionError>;

    /// Request cookies.
    fn cookies(&self) -> Result<BTreeMap<String, String>, ExtractionError>;
}

impl<R: RequestSource + ?Sized> RequestSource for &R {
    fn request_id(&self) -> Option<&str> {
        (**self).request_id()
    }

    fn body(&self) -> Result<Map<String, Value>, ExtractionError> {
        (**self).body()
    }

    fn params(&self) -> Result<BTreeMap<String, String>, ExtractionError> {
        (**self).params()
    }

    fn headers(&self) -> Result<BTreeMap<String, String>, ExtractionError> {
        (**self).headers()
    }

    fn cookies(&self) -> Result<BTreeMap<String, String>, ExtractionError> {
        (**self).cookies()
    }
}

/// A hosting-layer request that may or may not carry a bound context.
///
/// Implementing this trait is all a request type needs to gain
/// [`ValidateUsing`](super::ValidateUsing).
pub trait HasContext {
    /// The context type requests are read from.
    type Context: RequestSource;

    /// Returns the bound context, or `None` if the request has none.
    fn context(&self) -> Option<&Self::Context>;
}

impl<R: RequestSource> HasContext for Option<R> {
    type Context = R;

    fn context(&self) -> Option<&R> {
        self.as_ref()
    }
}
