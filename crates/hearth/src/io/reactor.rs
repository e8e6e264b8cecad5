use std::sync::Arc;
use std::thread::JoinHandle;

use windows::Win32::Networking::WinSock::{AcceptEx, SOCKET, WSARecv, WSASend, WSABUF};

use crate::error::{Error, Result};
use crate::io::completion_port::CompletionPort;
use crate::io::operation::{Operation, OperationKind, OperationTarget, ACCEPT_ADDRESS_LEN};
use crate::net::BUFFER_SIZE;

type OperationCallback = Arc<dyn Fn(Box<Operation>) + Send + Sync>;

/// The I/O reactor: a shared completion port plus a pool of worker threads
/// that each block in `GetQueuedCompletionStatus` and dispatch completed
/// operations to one of three registered callbacks by operation kind.
///
/// Grounded on the original source's `iocp_context` (`set_on_accept`/
/// `set_on_read`/`set_on_write`, `worker_thread`) and the teacher's
/// `CompletionPort`/`tcp_server.rs` accept loop, generalized here to a
/// plain-callback dispatch model rather than the teacher's `Future`-based
/// one (see `DESIGN.md`).
pub(crate) struct Reactor {
    port: Arc<CompletionPort>,
    threads: Vec<JoinHandle<()>>,
    on_accept: Option<OperationCallback>,
    on_read: Option<OperationCallback>,
    on_write: Option<OperationCallback>,
}

impl Reactor {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            port: Arc::new(CompletionPort::new()?),
            threads: Vec::new(),
            on_accept: None,
            on_read: None,
            on_write: None,
        })
    }

    pub(crate) fn associate(&self, socket: SOCKET) -> Result<()> {
        self.port.associate(socket)
    }

    pub(crate) fn set_on_accept(&mut self, callback: OperationCallback) {
        self.on_accept = Some(callback);
    }

    pub(crate) fn set_on_read(&mut self, callback: OperationCallback) {
        self.on_read = Some(callback);
    }

    pub(crate) fn set_on_write(&mut self, callback: OperationCallback) {
        self.on_write = Some(callback);
    }

    /// Starts `worker_threads` worker threads (default: one per logical
    /// CPU), each pinned to a distinct core via `core_affinity` where the
    /// platform exposes enough cores to do so.
    pub(crate) fn start(&mut self, worker_threads: Option<usize>) {
        let count = worker_threads
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1);

        let core_ids = core_affinity::get_core_ids().unwrap_or_default();

        for index in 0..count {
            let port = Arc::clone(&self.port);
            let on_accept = self.on_accept.clone();
            let on_read = self.on_read.clone();
            let on_write = self.on_write.clone();
            let core_id = core_ids.get(index % core_ids.len().max(1)).copied();

            let handle = std::thread::Builder::new()
                .name(format!("hearth-reactor-{index}"))
                .spawn(move || {
                    if let Some(core_id) = core_id {
                        core_affinity::set_for_current(core_id);
                    }
                    worker_loop(port, on_accept, on_read, on_write);
                })
                .expect("spawning a reactor worker thread should not fail under normal OS conditions");

            self.threads.push(handle);
        }
    }

    /// Posts an `AcceptEx` operation on the listening socket. The fresh
    /// connection socket is created here (overlapped, not yet bound to any
    /// completion port — that happens once the accept completes).
    pub(crate) fn post_accept(&self, listen_socket: SOCKET) -> Result<()> {
        let accept_socket = create_overlapped_socket()?;

        let buffer = vec![0u8; (std::mem::size_of::<windows::Win32::Networking::WinSock::SOCKADDR_IN>() + 16) * 2 + 32];
        let mut operation = Operation::new(OperationKind::Accept, listen_socket, OperationTarget::None, buffer);
        operation.accept_socket = accept_socket;

        let buffer_ptr = operation.buffer.as_mut_ptr();
        let overlapped_ptr = &mut operation.overlapped as *mut _;
        let raw = Box::into_raw(operation);

        let mut bytes_received = 0u32;
        // SAFETY: `buffer_ptr` points into a live heap allocation sized to
        // hold the two address structures AcceptEx writes, and
        // `overlapped_ptr` is owned by the operation we just leaked into
        // `raw` — reclaimed by the reactor's dispatch loop on completion.
        let ok = unsafe {
            AcceptEx(
                listen_socket,
                accept_socket,
                buffer_ptr.cast(),
                0,
                ACCEPT_ADDRESS_LEN as u32,
                ACCEPT_ADDRESS_LEN as u32,
                &mut bytes_received,
                overlapped_ptr,
            )
        };

        // `AcceptEx` returning an error other than ERROR_IO_PENDING means
        // the operation was never queued, so we must reclaim it ourselves
        // instead of waiting for a completion that will never arrive.
        if !ok.as_bool() {
            let error = crate::net::last_error_is_pending();
            if !error {
                // SAFETY: `raw` was produced by `Box::into_raw` above and
                // has not been freed or handed to the completion port.
                unsafe {
                    drop(Box::from_raw(raw));
                }
                return Err(Error::Socket("AcceptEx failed to post".to_string()));
            }
        }

        Ok(())
    }

    pub(crate) fn post_read(&self, socket: SOCKET, connection: Arc<crate::conn::Connection>) -> Result<()> {
        let buffer = vec![0u8; BUFFER_SIZE];
        post_buffer_operation(OperationKind::Read, socket, OperationTarget::Connection(connection), buffer)
    }

    pub(crate) fn post_write(&self, socket: SOCKET, connection: Arc<crate::conn::Connection>, data: Vec<u8>) -> Result<()> {
        post_buffer_operation(OperationKind::Write, socket, OperationTarget::Connection(connection), data)
    }
}

fn post_buffer_operation(kind: OperationKind, socket: SOCKET, target: OperationTarget, buffer: Vec<u8>) -> Result<()> {
    let mut operation = Operation::new(kind, socket, target, buffer);

    let wsa_buffer = WSABUF {
        len: operation.buffer.len() as u32,
        buf: windows::core::PSTR(operation.buffer.as_mut_ptr()),
    };
    let overlapped_ptr = &mut operation.overlapped as *mut _;
    let raw = Box::into_raw(operation);

    let mut transferred = 0u32;
    let mut flags = 0u32;

    // SAFETY: `raw`'s buffer outlives the call (it is heap-allocated inside
    // the boxed operation, reclaimed only by the reactor's completion
    // handler), and `overlapped_ptr` is likewise owned by `raw`.
    let result = match kind {
        OperationKind::Read => unsafe {
            WSARecv(
                socket,
                &[wsa_buffer],
                Some(&mut transferred),
                &mut flags,
                Some(overlapped_ptr),
                None,
            )
        },
        OperationKind::Write => unsafe {
            WSASend(
                socket,
                &[wsa_buffer],
                Some(&mut transferred),
                flags,
                Some(overlapped_ptr),
                None,
            )
        },
        OperationKind::Accept => unreachable!("accept operations are posted via post_accept"),
    };

    if result != 0 && !crate::net::last_error_is_pending() {
        // SAFETY: `raw` was produced by `Box::into_raw` above and has not
        // been handed to the completion port.
        unsafe {
            drop(Box::from_raw(raw));
        }
        return Err(Error::Socket(format!("failed to post {kind:?} operation")));
    }

    Ok(())
}

fn create_overlapped_socket() -> Result<SOCKET> {
    use windows::Win32::Networking::WinSock::{
        WSASocketA, AF_INET, IPPROTO_TCP, SOCK_STREAM, WSA_FLAG_OVERLAPPED,
    };

    // SAFETY: constant, valid arguments.
    unsafe {
        WSASocketA(AF_INET.0 as i32, SOCK_STREAM.0, IPPROTO_TCP.0, None, 0, WSA_FLAG_OVERLAPPED)
            .map_err(|e| Error::Socket(e.to_string()))
    }
}

fn worker_loop(
    port: Arc<CompletionPort>,
    on_accept: Option<OperationCallback>,
    on_read: Option<OperationCallback>,
    on_write: Option<OperationCallback>,
) {
    loop {
        let Some((transferred, overlapped)) = port.get_queued_completion_status() else {
            break;
        };

        // SAFETY: every `OVERLAPPED` this port hands back was embedded as
        // the first field of an `Operation` allocated via `Operation::new`
        // and leaked with `Box::into_raw` by this module.
        let mut operation = unsafe { Operation::from_overlapped(overlapped) };
        operation.transferred = transferred;

        match operation.kind {
            OperationKind::Accept => {
                if let Some(callback) = &on_accept {
                    callback(operation);
                }
            }
            OperationKind::Read => {
                if let Some(callback) = &on_read {
                    callback(operation);
                }
            }
            OperationKind::Write => {
                if let Some(callback) = &on_write {
                    callback(operation);
                }
            }
        }
    }
}
