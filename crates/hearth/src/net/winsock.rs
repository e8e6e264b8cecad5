use windows::Win32::Networking::WinSock::{
    WSACleanup, WSAGetLastError, WSAStartup, WSADATA, WSA_IO_PENDING,
};

use crate::error::{Error, Result};

/// RAII guard around `WSAStartup`/`WSACleanup`, mirroring the original
/// source's `wsa_guard`. One instance lives for the lifetime of a
/// [`crate::server::Server`]; Winsock itself reference-counts startup
/// calls, so holding more than one guard per process is harmless.
pub(crate) struct WsaGuard;

impl WsaGuard {
    pub(crate) fn new() -> Result<Self> {
        let mut data = WSADATA::default();
        // SAFETY: `data` is a valid, appropriately sized out-parameter.
        let result = unsafe { WSAStartup(0x0202, &mut data) };
        if result != 0 {
            return Err(Error::Socket(format!("WSAStartup failed: {result}")));
        }
        Ok(Self)
    }
}

impl Drop for WsaGuard {
    fn drop(&mut self) {
        // SAFETY: WSACleanup takes no arguments and is safe to call as long
        // as a matching WSAStartup succeeded, which holding `Self` proves.
        unsafe {
            let _ = WSACleanup();
        }
    }
}

/// Converts the last Winsock error into this crate's error type.
pub(crate) fn last_error() -> Error {
    // SAFETY: always safe to query.
    let code = unsafe { WSAGetLastError() };
    Error::Socket(format!("winsock error {}", code.0))
}

/// Converts a Winsock `BOOL`-returning call's failure into this crate's
/// error type, following the convention the teacher's own call sites use
/// (`winsock::to_io_result`).
pub(crate) fn to_result(succeeded: bool) -> Result<()> {
    if succeeded {
        Ok(())
    } else {
        Err(last_error())
    }
}

/// True if the most recent Winsock call failed only because the overlapped
/// operation was queued for asynchronous completion — the expected outcome
/// for every `AcceptEx`/`WSARecv`/`WSASend` call posted through the
/// reactor, not a real failure.
pub(crate) fn last_error_is_pending() -> bool {
    // SAFETY: always safe to query.
    unsafe { WSAGetLastError() == WSA_IO_PENDING }
}
