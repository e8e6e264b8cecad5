//! The embeddable server: route/error-handler registration, the
//! reactor-driven accept/read/write pipeline, and per-connection dispatch.

mod config;
mod handler;
#[allow(clippy::module_inception)]
mod server;

pub use config::ServerConfig;
pub use handler::{ErrorHandler, Handler};
pub use server::Server;
