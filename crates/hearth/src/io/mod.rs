//! IOCP-backed I/O reactor: posted operations, the completion port handle,
//! and the worker-thread dispatch loop.

mod completion_port;
mod operation;
mod reactor;

pub(crate) use operation::{Operation, OperationKind, OperationTarget};
pub(crate) use reactor::Reactor;
