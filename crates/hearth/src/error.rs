use thiserror::Error;

/// The parsing phase that failed. Carried alongside [`Error::Parse`] so
/// callers (and the server's 400 dispatch path) can tell which part of the
/// request line/headers/body was malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePhase {
    Method,
    Uri,
    Version,
    Headers,
    Body,
}

impl std::fmt::Display for ParsePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ParsePhase::Method => "method",
            ParsePhase::Uri => "uri",
            ParsePhase::Version => "version",
            ParsePhase::Headers => "headers",
            ParsePhase::Body => "body",
        };
        f.write_str(s)
    }
}

/// Top-level error type for the crate. This is a taxonomy, not a single
/// failure path: most of these are recovered locally (closing a connection
/// or emitting an error response) rather than propagated to the host.
#[derive(Debug, Error)]
pub enum Error {
    #[error("socket error: {0}")]
    Socket(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse request {phase}")]
    Parse { phase: ParsePhase },

    #[error("route not found")]
    RouteNotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("node already has a path-parameter child")]
    PathParameterConflict,

    #[error("invalid route path: {0}")]
    InvalidPath(String),

    #[error("server registration error: {0}")]
    Registration(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to handler code by [`crate::server::Request::get_path_param`].
/// These are not logged or turned into a response automatically — the
/// handler decides what, if anything, to do about them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("path parameter `{0}` was not bound for this route")]
    NotFound(String),
    #[error("path parameter `{name}` value `{value}` could not be parsed: {message}")]
    Invalid {
        name: String,
        value: String,
        message: String,
    },
}
