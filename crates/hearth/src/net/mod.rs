//! TCP socket adapter and the small Winsock startup/shutdown plumbing it
//! needs.

mod socket;
mod winsock;

pub(crate) use socket::{Socket, BUFFER_SIZE};
pub(crate) use winsock::{last_error_is_pending, WsaGuard};
