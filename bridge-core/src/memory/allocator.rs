//! Remote memory allocation with RAII cleanup.

use crate::error::InjectError;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::System::Memory::{
    VirtualAllocEx, VirtualFreeEx, MEM_COMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_PROTECTION_FLAGS,
    PAGE_READWRITE,
};

/// A region allocated inside the target process's address space.
///
/// The address is only meaningful to the target; it must never be
/// dereferenced locally. The region is freed when this value drops,
/// which the engine arranges to happen after the remote thread has
/// finished using it.
pub struct RemoteMemory {
    process: HANDLE,
    address: *mut u8,
    size: usize,
}

impl RemoteMemory {
    /// Allocates `size` bytes of committed memory in the target process.
    pub fn allocate(
        process: HANDLE,
        size: usize,
        protection: PAGE_PROTECTION_FLAGS,
    ) -> Result<Self, InjectError> {
        if size == 0 {
            return Err(InjectError::RemoteAllocationFailed(
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "zero-length allocation"),
            ));
        }

        let address =
            unsafe { VirtualAllocEx(process, None, size, MEM_COMMIT | MEM_RESERVE, protection) };

        if address.is_null() {
            return Err(InjectError::RemoteAllocationFailed(
                std::io::Error::last_os_error(),
            ));
        }

        log::debug!("allocated {} bytes at {:?} in remote process", size, address);

        Ok(Self {
            process,
            address: address as *mut u8,
            size,
        })
    }

    /// Allocates a read-write region, the protection the path buffer needs.
    pub fn allocate_readwrite(process: HANDLE, size: usize) -> Result<Self, InjectError> {
        Self::allocate(process, size, PAGE_READWRITE)
    }

    /// Address of the region in the target's address space.
    pub fn address(&self) -> *mut u8 {
        self.address
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Raw pointer form for passing as a remote thread argument.
    pub fn as_ptr(&self) -> *const std::ffi::c_void {
        self.address as *const std::ffi::c_void
    }
}

impl Drop for RemoteMemory {
    fn drop(&mut self) {
        unsafe {
            if let Err(e) = VirtualFreeEx(
                self.process,
                self.address as *mut std::ffi::c_void,
                0,
                MEM_RELEASE,
            ) {
                log::warn!("failed to free remote memory at {:?}: {}", self.address, e);
            }
        }
    }
}
