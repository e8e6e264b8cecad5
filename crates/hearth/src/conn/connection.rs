use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tracing::{event, Level};
use windows::Win32::Networking::WinSock::SOCKET;

use crate::io::Reactor;
use crate::net::{Socket, BUFFER_SIZE};
use crate::server::Server;

/// A single accepted client connection: an owned socket plus the fixed
/// read/accumulation buffer, guarded so at most one read and one write is
/// ever in flight at a time.
///
/// Grounded on the original source's `connection` (buffer, pending/closed
/// atomics, `on_read_raw`/`on_write_raw`/`post_read`/`post_write`) and
/// `server_connection` (the `pending_close` double-close guard and request
/// dispatch). `Connection` holds a non-owning raw pointer back to the
/// `Server` it belongs to — the server closes every connection before it is
/// dropped, so the pointer never dangles while a `Connection` is reachable.
pub(crate) struct Connection {
    socket: Mutex<Socket>,
    raw_socket: SOCKET,
    server: *const Server,

    read_pending: AtomicBool,
    write_pending: AtomicBool,
    closed: AtomicBool,
    pending_close: AtomicBool,
}

// SAFETY: the raw `server` pointer is read-only and only ever dereferenced
// while the server is alive (see the struct doc comment); every other
// field is independently thread-safe.
unsafe impl Send for Connection {}
unsafe impl Sync for Connection {}

impl Connection {
    pub(crate) fn new(socket: Socket, server: *const Server) -> Self {
        let raw_socket = socket.raw();
        Self {
            socket: Mutex::new(socket),
            raw_socket,
            server,
            read_pending: AtomicBool::new(false),
            write_pending: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            pending_close: AtomicBool::new(false),
        }
    }

    pub(crate) fn raw_socket(&self) -> SOCKET {
        self.raw_socket
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn server(&self) -> &Server {
        // SAFETY: see the struct doc comment — the server outlives every
        // connection it has not yet removed from its client table.
        unsafe { &*self.server }
    }

    /// Posts a read for up to the connection's full buffer capacity. A
    /// second call while a read is already pending, or after the
    /// connection has closed, is a silent no-op — exactly one read is ever
    /// in flight.
    pub(crate) fn post_read(self: &std::sync::Arc<Self>, reactor: &Reactor) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }
        if self
            .read_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        if reactor.post_read(self.raw_socket, self.clone()).is_err() {
            event!(Level::WARN, socket = self.raw_socket.0, "failed to post read operation");
            self.read_pending.store(false, Ordering::SeqCst);
            self.close();
        }
    }

    /// Posts a write of `message`. A write already in flight, an empty
    /// message, or a closed connection are all silent no-ops, matching the
    /// original source's `post_write`.
    pub(crate) fn post_write(self: &std::sync::Arc<Self>, reactor: &Reactor, message: Vec<u8>) {
        if self.closed.load(Ordering::SeqCst) || message.is_empty() {
            return;
        }
        if self
            .write_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        if reactor.post_write(self.raw_socket, self.clone(), message).is_err() {
            event!(Level::WARN, socket = self.raw_socket.0, "failed to post write operation");
            self.write_pending.store(false, Ordering::SeqCst);
            self.close();
        }
    }

    /// Handles a completed read. A zero-byte transfer means the peer closed
    /// the connection. A single read transferring [`BUFFER_SIZE`] bytes or
    /// more is treated as oversize and the connection is closed rather than
    /// ever re-requesting or reassembling it — this crate never accumulates
    /// a request across more than one completed read (see `DESIGN.md`).
    pub(crate) fn on_read_raw(self: &std::sync::Arc<Self>, reactor: &Reactor, transferred: u32, data: &[u8]) {
        self.read_pending.store(false, Ordering::SeqCst);

        if self.closed.load(Ordering::SeqCst) {
            return;
        }

        if transferred == 0 {
            self.close();
            return;
        }

        if transferred as usize >= BUFFER_SIZE {
            event!(
                Level::WARN,
                socket = self.raw_socket.0,
                "connection tried to send a message that was too large"
            );
            self.close();
            return;
        }

        self.server().handle_request(self, &data[..transferred as usize], reactor);
    }

    /// Handles a completed write. A zero-byte transfer is a write failure;
    /// otherwise the response has been fully sent and, since this crate
    /// never keeps a connection alive past one request/response pair, the
    /// connection is closed immediately afterward.
    pub(crate) fn on_write_raw(self: &std::sync::Arc<Self>, transferred: u32) {
        self.write_pending.store(false, Ordering::SeqCst);

        if self.closed.load(Ordering::SeqCst) {
            return;
        }

        if transferred == 0 {
            event!(Level::WARN, socket = self.raw_socket.0, "connection failed to write message");
            self.close();
            return;
        }

        self.close();
    }

    /// Closes the connection and removes it from the server's client
    /// table. Idempotent via a compare-and-swap on `pending_close` so a
    /// concurrent read-failure close and write-completion close never both
    /// run the teardown path.
    pub(crate) fn close(self: &std::sync::Arc<Self>) {
        if self
            .pending_close
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        self.closed.store(true, Ordering::SeqCst);
        self.socket.lock().expect("socket mutex poisoned").close();
        self.server().remove_client(self.raw_socket);
    }
}
