use windows::Win32::Networking::WinSock::{
    bind, closesocket, htons, listen, setsockopt, AF_INET, INADDR_ANY, INVALID_SOCKET, IN_ADDR,
    IPPROTO_TCP, SOCKADDR_IN, SOCKET, SOCK_STREAM, SOL_SOCKET, SO_LINGER, SO_RCVBUF, SO_REUSEADDR,
    SO_SNDBUF, TCP_NODELAY, IPPROTO_TCP as TCP_LEVEL, LINGER, WSASocketA, WSA_FLAG_OVERLAPPED,
};

use crate::error::{Error, Result};
use crate::net::winsock;

pub(crate) const BUFFER_SIZE: usize = 64 * 1024;

/// A move-only TCP socket handle. Closes on [`Drop`]; a socket moved-from
/// (or already closed) holds the invalid-socket sentinel and `close()` on
/// it is a no-op, matching the original source's `socket` wrapper.
#[derive(Debug)]
pub(crate) struct Socket {
    raw: SOCKET,
}

impl Socket {
    /// Wraps an already-created raw socket (used for sockets accepted via
    /// `AcceptEx`, which this type does not itself create).
    pub(crate) fn from_raw(raw: SOCKET) -> Self {
        Self { raw }
    }

    pub(crate) fn raw(&self) -> SOCKET {
        self.raw
    }

    /// Creates a fresh overlapped TCP socket, binds it to `port` on all
    /// interfaces, and sets `SO_REUSEADDR`. Listening and the remaining
    /// options are applied separately by the caller (`Server::start`),
    /// following the original source's `socket::create`/`listen` split.
    pub(crate) fn create(port: u16) -> Result<Self> {
        // SAFETY: valid, constant arguments; WSA_FLAG_OVERLAPPED is
        // required so the socket can be used with an I/O completion port.
        let raw = unsafe {
            WSASocketA(
                AF_INET.0 as i32,
                SOCK_STREAM.0,
                IPPROTO_TCP.0,
                None,
                0,
                WSA_FLAG_OVERLAPPED,
            )
            .map_err(|e| Error::Socket(e.to_string()))?
        };

        let socket = Self { raw };
        socket.set_reuse_addr()?;
        socket.set_buffer_sizes()?;
        socket.bind(port)?;
        Ok(socket)
    }

    fn set_reuse_addr(&self) -> Result<()> {
        let value: i32 = 1;
        // SAFETY: `value` lives for the call and matches the expected
        // option size.
        let value_bytes =
            unsafe { std::slice::from_raw_parts(&value as *const i32 as *const u8, 4) };
        let result = unsafe { setsockopt(self.raw, SOL_SOCKET, SO_REUSEADDR, Some(value_bytes)) };
        winsock::to_result(result == 0)
    }

    /// Sets `SO_RCVBUF`/`SO_SNDBUF` to [`BUFFER_SIZE`], matching the fixed
    /// 64 KiB read buffer every completed receive is checked against.
    fn set_buffer_sizes(&self) -> Result<()> {
        let value: i32 = BUFFER_SIZE as i32;
        // SAFETY: `value` lives for the call and matches the expected
        // option size.
        let value_bytes =
            unsafe { std::slice::from_raw_parts(&value as *const i32 as *const u8, 4) };
        let result = unsafe { setsockopt(self.raw, SOL_SOCKET, SO_RCVBUF, Some(value_bytes)) };
        winsock::to_result(result == 0)?;
        let result = unsafe { setsockopt(self.raw, SOL_SOCKET, SO_SNDBUF, Some(value_bytes)) };
        winsock::to_result(result == 0)
    }

    fn bind(&self, port: u16) -> Result<()> {
        let mut addr = IN_ADDR::default();
        addr.S_un.S_addr = INADDR_ANY.S_un.S_addr;

        let socket_addr = SOCKADDR_IN {
            sin_family: AF_INET,
            // SAFETY: pure value conversion, no preconditions.
            sin_port: unsafe { htons(port) },
            sin_addr: addr,
            sin_zero: [0; 8],
        };

        // SAFETY: `socket_addr` is valid for the duration of the call and
        // its size matches `sockaddr_in`.
        let result = unsafe {
            bind(
                self.raw,
                &socket_addr as *const SOCKADDR_IN as *const _,
                std::mem::size_of::<SOCKADDR_IN>() as i32,
            )
        };
        winsock::to_result(result == 0)
    }

    /// Marks the socket as a passive listening socket with the given
    /// backlog.
    pub(crate) fn listen(&self, backlog: i32) -> Result<()> {
        // SAFETY: no preconditions beyond `self.raw` being a valid,
        // bound, stream socket, which `create` guarantees.
        let result = unsafe { listen(self.raw, backlog) };
        winsock::to_result(result == 0)
    }

    /// Applies the per-connection option set the original source sets on
    /// every accepted socket: zero-linger (an immediate, RST-free close on
    /// drop with no lingering `TIME_WAIT`-adjacent delay), `TCP_NODELAY`
    /// (disable Nagle's algorithm, since request/response pairs here are
    /// never large enough to benefit from coalescing), and the 64 KiB
    /// send/receive buffers.
    pub(crate) fn configure_connection_options(&self) -> Result<()> {
        let linger = LINGER {
            l_onoff: 1,
            l_linger: 0,
        };
        // SAFETY: `linger` lives for the call and matches the expected
        // option size.
        let linger_bytes = unsafe {
            std::slice::from_raw_parts(&linger as *const LINGER as *const u8, std::mem::size_of::<LINGER>())
        };
        let result = unsafe { setsockopt(self.raw, SOL_SOCKET, SO_LINGER, Some(linger_bytes)) };
        winsock::to_result(result == 0)?;

        let value: i32 = 1;
        let value_bytes =
            unsafe { std::slice::from_raw_parts(&value as *const i32 as *const u8, 4) };
        // SAFETY: same as above.
        let result = unsafe { setsockopt(self.raw, TCP_LEVEL, TCP_NODELAY, Some(value_bytes)) };
        winsock::to_result(result == 0)?;

        self.set_buffer_sizes()
    }

    /// Closes the socket, if not already closed. Idempotent.
    pub(crate) fn close(&mut self) {
        if self.raw == INVALID_SOCKET {
            return;
        }
        let raw = self.raw;
        self.raw = INVALID_SOCKET;
        // SAFETY: `raw` is either a valid open socket or the operation is
        // a documented no-op on an already-invalid handle.
        unsafe {
            let _ = closesocket(raw);
        }
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_sentinel_close_is_a_no_op() {
        let mut socket = Socket { raw: INVALID_SOCKET };
        socket.close();
        assert_eq!(socket.raw, INVALID_SOCKET);
    }
}
