// RAII ownership of an open target-process handle

use crate::error::InjectError;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_ACCESS_RIGHTS, PROCESS_CREATE_THREAD, PROCESS_VM_OPERATION,
    PROCESS_VM_WRITE,
};

/// Exclusively owned handle to a target process.
///
/// The handle is closed exactly once, when the value is dropped, which
/// covers every exit path of the injection call that opened it.
pub struct ProcessHandle {
    handle: HANDLE,
    pid: u32,
}

// A process handle is a kernel object reference and may move across threads.
unsafe impl Send for ProcessHandle {}

impl ProcessHandle {
    /// The three access rights the injection sequence needs, and no more:
    /// allocate/free remote memory, write remote memory, create a remote
    /// thread.
    pub const INJECTION_ACCESS: PROCESS_ACCESS_RIGHTS = PROCESS_ACCESS_RIGHTS(
        PROCESS_VM_OPERATION.0 | PROCESS_VM_WRITE.0 | PROCESS_CREATE_THREAD.0,
    );

    /// Opens the process with the given access rights.
    pub fn open(pid: u32, rights: PROCESS_ACCESS_RIGHTS) -> Result<Self, InjectError> {
        unsafe {
            match OpenProcess(rights, false, pid) {
                Ok(h) if h.is_invalid() => Err(InjectError::ProcessOpenFailed {
                    pid,
                    source: std::io::Error::last_os_error(),
                }),
                Ok(h) => {
                    log::debug!("opened process {} with rights {:#x}", pid, rights.0);
                    Ok(Self { handle: h, pid })
                }
                Err(_) => Err(InjectError::ProcessOpenFailed {
                    pid,
                    source: std::io::Error::last_os_error(),
                }),
            }
        }
    }

    /// Opens the process with exactly the rights injection requires.
    pub fn open_for_injection(pid: u32) -> Result<Self, InjectError> {
        Self::open(pid, Self::INJECTION_ACCESS)
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Raw handle for Win32 calls. Must not outlive this value.
    pub fn as_handle(&self) -> HANDLE {
        self.handle
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        if !self.handle.is_invalid() {
            unsafe {
                let _ = CloseHandle(self.handle);
            }
            log::debug!("closed handle to process {}", self.pid);
        }
    }
}
