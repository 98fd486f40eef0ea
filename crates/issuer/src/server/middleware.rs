//! Limits applied by the router's middleware layers.
//!
//! Request tracing, timeout enforcement, and response compression are wired in
//! [`super::router::build`].

use std::time::Duration;

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Largest accepted request body. A batch of names or a pasted token is tiny.
pub const MAX_BODY_BYTES: usize = 256 * 1024;
