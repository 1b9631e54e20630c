//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the validator.
//! It handles:
//! - Reading request facets (body, route params, headers, cookies)
//! - Exposing whether a request has a bound context
//! - Attaching the `validate_using` operation to request types
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: This module contains no framework-specific code.
//!    It defines interfaces that framework-specific code can implement.
//!
//! 2. **Read Once, Then Validate**: Facets are read synchronously, merged, and only
//!    then handed to the schema. The request is never modified.
//!
//! 3. **Explicit Context**: A request without a context fails with
//!    `Error::ContextUnavailable` before anything is read.
//!
//! # Integration Model
//!
//! Framework-specific code should either:
//! 1. Implement [`RequestSource`] for its request context and [`HasContext`] for
//!    its request type, or
//! 2. Copy request data into a [`RequestSnapshot`]
//!
//! and then call [`ValidateUsing::validate_using`] with any [`Schema`](crate::Schema).
//!
//! # Example Flow
//!
//! ```ignore
//! // In a framework-specific integration (e.g., axum, actix):
//! let mut snapshot = RequestSnapshot::new(request_id);
//! snapshot.set_raw_body(body_text);
//! for (name, value) in http_req.headers() {
//!     snapshot.add_header(name, value.to_str()?);
//! }
//!
//! let payload: CreateUser = snapshot.validate_using(&create_user_schema).await?;
//! ```

mod extension;
mod extract;
mod snapshot;

pub use extension::ValidateUsing;
pub use extract::{HasContext, RequestSource};
pub use snapshot::RequestSnapshot;
