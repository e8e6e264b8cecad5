//! An embeddable HTTP/1.1 server library for hosting application
//! endpoints directly inside a Rust process, built on a Windows IOCP
//! reactor.
//!
//! ```no_run
//! use std::sync::Arc;
//! use hearth::{Method, Request, Response, Server};
//!
//! let mut server = Server::new(8080);
//! let handler = Arc::new(|_req: &Request, res: &mut Response| {
//!     res.set_body(b"Hello, world!".to_vec());
//! });
//! server.add_route("/", &[Method::Get], handler).unwrap();
//! server.start().unwrap();
//! ```

mod conn;
mod error;
mod http;
mod io;
mod net;
mod routing;
mod server;

pub use error::{Error, ParamError, ParsePhase, Result};
pub use http::{Headers, Method, Request, Response, Status, Version, METHOD_COUNT};
pub use routing::{RouteNode, RoutePath, RouteTree};
pub use server::{ErrorHandler, Handler, Server, ServerConfig};
