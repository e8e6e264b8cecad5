use std::sync::Arc;

use windows::Win32::Networking::WinSock::SOCKET;
use windows::Win32::System::IO::OVERLAPPED;

use crate::conn::Connection;

/// Two times the size of a `sockaddr_in` plus 16 bytes of padding, the
/// buffer layout `AcceptEx`/`GetAcceptExSockaddrs` require for the local
/// and remote address pair appended after the connection's receive buffer.
pub(crate) const ACCEPT_ADDRESS_LEN: usize = 16 + 16;

/// What kind of I/O this operation represents, mirroring the original
/// source's `iocp_operation` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OperationKind {
    Accept,
    Read,
    Write,
}

/// The back-pointer carried by a read/write operation so the reactor's
/// dispatch loop can reach the owning connection directly, without a
/// client-table lookup on the hot path. An accept operation has no target —
/// it completes against the single listening socket the server already
/// holds, so the registered accept callback needs no extra context.
///
/// The original source's equivalent back-pointer is a raw `connection*`;
/// this keeps the operation's ownership story safe by cloning the
/// connection's `Arc` instead (see `DESIGN.md`).
pub(crate) enum OperationTarget {
    None,
    Connection(Arc<Connection>),
}

/// A single posted I/O operation. `overlapped` must stay the first field:
/// the reactor recovers a `*mut Operation` from the `*mut OVERLAPPED` that
/// `GetQueuedCompletionStatus` hands back by a `CONTAINING_RECORD`-style
/// cast, which is only sound while the two share an address.
///
/// Heap-allocated via `Box::into_raw` when posted and reclaimed via
/// `Box::from_raw` by the thread that processes its completion.
#[repr(C)]
pub(crate) struct Operation {
    pub overlapped: OVERLAPPED,
    pub kind: OperationKind,
    pub socket: SOCKET,
    pub target: OperationTarget,
    /// For `Accept`, the freshly created socket `AcceptEx` will bind the
    /// incoming connection to. Unused for `Read`/`Write`.
    pub accept_socket: SOCKET,
    pub buffer: Vec<u8>,
    pub transferred: u32,
}

impl Operation {
    pub(crate) fn new(
        kind: OperationKind,
        socket: SOCKET,
        target: OperationTarget,
        buffer: Vec<u8>,
    ) -> Box<Operation> {
        Box::new(Operation {
            overlapped: OVERLAPPED::default(),
            kind,
            socket,
            target,
            accept_socket: SOCKET(0),
            buffer,
            transferred: 0,
        })
    }

    /// Recovers the `Operation` a completed `OVERLAPPED` belongs to. Safe
    /// only when called with a pointer this module itself produced via
    /// [`Operation::new`] and [`Box::into_raw`].
    pub(crate) unsafe fn from_overlapped(overlapped: *mut OVERLAPPED) -> Box<Operation> {
        Box::from_raw(overlapped.cast::<Operation>())
    }
}

// Posted on one worker thread, completed and reclaimed on another; every
// field is itself `Send` (`Arc<Connection>` requires `Connection: Send +
// Sync`, which holds — see `conn::connection`).
unsafe impl Send for Operation {}
