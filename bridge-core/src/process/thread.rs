// RAII ownership of a remotely created thread handle

use crate::error::InjectError;
use windows::Win32::Foundation::{CloseHandle, HANDLE, WAIT_OBJECT_0};
use windows::Win32::System::Threading::{GetExitCodeThread, WaitForSingleObject, INFINITE};

/// Handle to a thread created inside the target process.
///
/// Closed exactly once on drop, after the engine has either waited for
/// completion or given up on the thread.
pub struct RemoteThread {
    handle: HANDLE,
}

unsafe impl Send for RemoteThread {}

impl RemoteThread {
    /// Wrap a thread handle returned by `CreateRemoteThread`.
    ///
    /// # Safety
    /// `handle` must be a valid thread handle owned by the caller; this
    /// value takes over closing it.
    pub unsafe fn from_raw(handle: HANDLE) -> Self {
        Self { handle }
    }

    /// Blocks until the remote thread terminates.
    ///
    /// Uses an infinite wait: the thread runs the target's library loader,
    /// whose duration this process does not control. Any wait-satisfaction
    /// reason other than thread completion is an error.
    pub fn wait(&self) -> Result<(), InjectError> {
        let event = unsafe { WaitForSingleObject(self.handle, INFINITE) };
        if event != WAIT_OBJECT_0 {
            return Err(InjectError::UnexpectedWaitResult(event.0));
        }
        Ok(())
    }

    /// Reads the thread's exit value, the return value of the loader call.
    pub fn exit_code(&self) -> Result<u32, InjectError> {
        let mut code = 0u32;
        unsafe {
            GetExitCodeThread(self.handle, &mut code)
                .map_err(|e| InjectError::UnexpectedWaitResult(e.code().0 as u32))?;
        }
        Ok(code)
    }
}

impl Drop for RemoteThread {
    fn drop(&mut self) {
        if !self.handle.is_invalid() {
            unsafe {
                let _ = CloseHandle(self.handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use windows::Win32::System::Threading::{CreateThread, THREAD_CREATION_FLAGS};

    unsafe extern "system" fn trivial_thread(_arg: *mut std::ffi::c_void) -> u32 {
        7
    }

    #[test]
    fn test_wait_and_exit_code_on_local_thread() {
        // A locally created thread exercises the same wait/exit-code path
        // the engine uses on the remote one.
        let handle = unsafe {
            CreateThread(
                None,
                0,
                Some(trivial_thread),
                None,
                THREAD_CREATION_FLAGS(0),
                None,
            )
        }
        .expect("thread creation should succeed");

        let thread = unsafe { RemoteThread::from_raw(handle) };
        thread.wait().expect("wait should complete");
        assert_eq!(thread.exit_code().unwrap(), 7);
    }
}
