use windows::core::Owned;
use windows::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE};
use windows::Win32::Networking::WinSock::SOCKET;
use windows::Win32::Storage::FileSystem::SetFileCompletionNotificationModes;
use windows::Win32::System::WindowsProgramming::FILE_SKIP_SET_EVENT_ON_HANDLE;
use windows::Win32::System::IO::{CreateIoCompletionPort, OVERLAPPED};

use crate::error::{Error, Result};

/// Thin wrapper over a Windows I/O completion port. One instance is shared
/// by every reactor worker thread; sockets are bound to it with
/// [`CompletionPort::associate`] so their I/O completions arrive here
/// rather than via any other notification mechanism.
pub(crate) struct CompletionPort {
    handle: Owned<HANDLE>,
}

impl CompletionPort {
    pub(crate) fn new() -> Result<Self> {
        // SAFETY: creating an unbound completion port has no preconditions
        // beyond the handle being released on drop, which `Owned` does.
        let handle = unsafe {
            Owned::new(
                CreateIoCompletionPort(INVALID_HANDLE_VALUE, HANDLE::default(), 0, 0)
                    .map_err(|e| Error::Socket(e.to_string()))?,
            )
        };

        Ok(Self { handle })
    }

    /// Binds a socket to this completion port so its overlapped I/O
    /// completions are delivered here. Also disables the event-notification
    /// path on the handle per Raymond Chen's guidance (only the completion
    /// port needs to be signaled, not a manual-reset event too).
    pub(crate) fn associate(&self, socket: SOCKET) -> Result<()> {
        let handle = HANDLE(socket.0 as isize);

        // SAFETY: `socket` is a valid, open socket handle for the duration
        // of this call.
        unsafe {
            CreateIoCompletionPort(handle, *self.handle, socket.0 as usize, 0)
                .map_err(|e| Error::Socket(e.to_string()))?;

            SetFileCompletionNotificationModes(handle, FILE_SKIP_SET_EVENT_ON_HANDLE as u8)
                .map_err(|e| Error::Socket(e.to_string()))?;
        }

        Ok(())
    }

    pub(crate) fn handle(&self) -> HANDLE {
        *self.handle
    }

    /// Blocks until the next completion arrives (or the port is closed),
    /// returning the transferred byte count and the `OVERLAPPED` pointer to
    /// recover the owning [`super::Operation`] from. `Ok(None)` means the
    /// port was closed and the calling worker thread should exit.
    pub(crate) fn get_queued_completion_status(&self) -> Option<(u32, *mut OVERLAPPED)> {
        use windows::Win32::System::IO::GetQueuedCompletionStatus;

        let mut bytes_transferred = 0u32;
        let mut completion_key = 0usize;
        let mut overlapped: *mut OVERLAPPED = std::ptr::null_mut();

        // SAFETY: all three out-parameters are valid local stack locations.
        let ok = unsafe {
            GetQueuedCompletionStatus(
                self.handle(),
                &mut bytes_transferred,
                &mut completion_key,
                &mut overlapped,
                u32::MAX,
            )
        };

        if overlapped.is_null() {
            return None;
        }

        // A failed completion (`ok == false` with a non-null overlapped) is
        // still a real operation whose buffer/context must be reclaimed;
        // treat it as a zero-byte transfer, the same as a clean peer close.
        let transferred = if ok.as_bool() { bytes_transferred } else { 0 };
        Some((transferred, overlapped))
    }
}
