//! The per-client connection state machine sitting between the reactor's
//! raw I/O completions and the server's request-handling pipeline.

mod connection;

pub(crate) use connection::Connection;
