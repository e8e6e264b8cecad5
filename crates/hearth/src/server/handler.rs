use std::sync::Arc;

use crate::http::{Request, Response};

/// A route handler. Invoked on whichever worker thread accepted the
/// connection's read completion — handlers run concurrently across
/// connections and must be `Send + Sync`.
pub type Handler = Arc<dyn Fn(&Request, &mut Response) + Send + Sync>;

/// An error handler, registered per [`crate::http::Status`] and invoked
/// instead of a route handler when dispatch fails before reaching one
/// (no matching route, wrong method, or a parse failure).
pub type ErrorHandler = Arc<dyn Fn(&Request, &mut Response) + Send + Sync>;
