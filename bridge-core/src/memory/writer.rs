//! Writing data into remote process memory.

use crate::error::InjectError;
use windows::Win32::Foundation::HANDLE;
use windows::Win32::System::Diagnostics::Debug::WriteProcessMemory;

/// Copies `data` into the target process at `address`.
///
/// A short write is a hard failure: truncated content must never be
/// handed to the remote loader as if it were complete.
pub fn write_memory(process: HANDLE, address: *mut u8, data: &[u8]) -> Result<(), InjectError> {
    let mut bytes_written = 0usize;

    unsafe {
        WriteProcessMemory(
            process,
            address as *const std::ffi::c_void,
            data.as_ptr() as *const std::ffi::c_void,
            data.len(),
            Some(&mut bytes_written),
        )
        .map_err(|_| InjectError::IncompleteRemoteWrite {
            written: 0,
            expected: data.len(),
        })?;
    }

    if bytes_written != data.len() {
        return Err(InjectError::IncompleteRemoteWrite {
            written: bytes_written,
            expected: data.len(),
        });
    }

    log::debug!("wrote {} bytes to {:?} in remote process", bytes_written, address);
    Ok(())
}

/// Writes `text` as a null-terminated UTF-16 string and returns the byte
/// length written (2 bytes per code unit plus the 2-byte terminator).
pub fn write_wide_string(
    process: HANDLE,
    address: *mut u8,
    text: &str,
) -> Result<usize, InjectError> {
    let wide: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
    let bytes =
        unsafe { std::slice::from_raw_parts(wide.as_ptr() as *const u8, wide.len() * 2) };

    write_memory(process, address, bytes)?;
    Ok(bytes.len())
}

/// Byte length `write_wide_string` will need for `text`.
pub fn wide_byte_len(text: &str) -> usize {
    (text.encode_utf16().count() + 1) * 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::RemoteMemory;
    use windows::Win32::System::Threading::GetCurrentProcess;

    #[test]
    fn test_wide_byte_len_counts_code_units() {
        assert_eq!(wide_byte_len(""), 2);
        assert_eq!(wide_byte_len("C:\\a.dll"), 18);
        // Non-BMP characters take two UTF-16 code units.
        assert_eq!(wide_byte_len("\u{1F600}"), 6);
    }

    #[test]
    fn test_round_trip_into_own_process() {
        let process = unsafe { GetCurrentProcess() };
        let path = "C:\\Mods\\bridge_payload.dll";

        let mem = RemoteMemory::allocate_readwrite(process, wide_byte_len(path)).unwrap();
        let written = write_wide_string(process, mem.address(), path).unwrap();
        assert_eq!(written, wide_byte_len(path));

        // Writing into our own process lets us verify the exact bytes.
        let wide: Vec<u16> = path.encode_utf16().chain(std::iter::once(0)).collect();
        let stored =
            unsafe { std::slice::from_raw_parts(mem.address() as *const u16, wide.len()) };
        assert_eq!(stored, wide.as_slice());
    }
}
