// Process enumeration via a ToolHelp32 snapshot

use crate::error::ProcessError;
use crate::process::ProcessRecord;

/// Enumerates running processes on the system.
pub struct ProcessEnumerator;

#[cfg(windows)]
mod imp {
    use super::*;
    use std::mem;
    use windows::Win32::Foundation::{CloseHandle, HANDLE};
    use windows::Win32::System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W,
        TH32CS_SNAPPROCESS,
    };

    impl ProcessEnumerator {
        /// Takes a fresh snapshot of the process table and returns one
        /// record per live process.
        ///
        /// The snapshot is independent per call and carries no ordering
        /// guarantee. The pseudo idle entry (pid 0) and entries without an
        /// executable name are filtered out.
        pub fn enumerate() -> Result<Vec<ProcessRecord>, ProcessError> {
            unsafe {
                let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0).map_err(|e| {
                    ProcessError::SnapshotFailed(std::io::Error::from_raw_os_error(e.code().0))
                })?;

                // RAII guard so the snapshot is closed on every exit path
                let _guard = SnapshotGuard(snapshot);

                let mut entry: PROCESSENTRY32W = mem::zeroed();
                entry.dwSize = mem::size_of::<PROCESSENTRY32W>() as u32;

                if Process32FirstW(snapshot, &mut entry).is_err() {
                    return Err(ProcessError::EnumerationFailed(
                        std::io::Error::last_os_error(),
                    ));
                }

                let mut processes = Vec::new();
                loop {
                    if let Some(record) = record_from_entry(&entry) {
                        processes.push(record);
                    }

                    entry.dwSize = mem::size_of::<PROCESSENTRY32W>() as u32;
                    if Process32NextW(snapshot, &mut entry).is_err() {
                        // ERROR_NO_MORE_FILES: end of the snapshot
                        break;
                    }
                }

                log::debug!("enumerated {} processes", processes.len());
                Ok(processes)
            }
        }
    }

    fn record_from_entry(entry: &PROCESSENTRY32W) -> Option<ProcessRecord> {
        let len = entry
            .szExeFile
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(entry.szExeFile.len());
        let name = String::from_utf16_lossy(&entry.szExeFile[..len]);

        if entry.th32ProcessID == 0 || name.is_empty() {
            return None;
        }

        Some(ProcessRecord {
            pid: entry.th32ProcessID,
            name,
        })
    }

    struct SnapshotGuard(HANDLE);

    impl Drop for SnapshotGuard {
        fn drop(&mut self) {
            unsafe {
                let _ = CloseHandle(self.0);
            }
        }
    }
}

#[cfg(not(windows))]
impl ProcessEnumerator {
    /// Process enumeration relies on the Windows ToolHelp API; other
    /// platforms report a clean runtime error.
    pub fn enumerate() -> Result<Vec<ProcessRecord>, ProcessError> {
        Err(ProcessError::Unsupported)
    }
}

impl ProcessEnumerator {
    /// Finds a process by its id in a fresh snapshot.
    pub fn find_by_pid(pid: u32) -> Result<ProcessRecord, ProcessError> {
        Self::enumerate()?
            .into_iter()
            .find(|p| p.pid == pid)
            .ok_or(ProcessError::ProcessNotFound(pid))
    }

    /// Finds all processes whose name contains `name`, case-insensitively.
    pub fn find_by_name(name: &str) -> Result<Vec<ProcessRecord>, ProcessError> {
        let name_lower = name.to_lowercase();
        Ok(Self::enumerate()?
            .into_iter()
            .filter(|p| p.name.to_lowercase().contains(&name_lower))
            .collect())
    }
}

#[cfg(all(test, windows))]
mod tests {
    use super::*;
    use windows::Win32::System::Threading::GetCurrentProcessId;

    #[test]
    fn test_enumerate_finds_current_process() {
        let processes = ProcessEnumerator::enumerate().expect("enumeration should succeed");
        assert!(!processes.is_empty());

        let current_pid = unsafe { GetCurrentProcessId() };
        assert!(
            processes.iter().any(|p| p.pid == current_pid),
            "current process (PID {}) should appear in the snapshot",
            current_pid
        );
    }

    #[test]
    fn test_no_zero_pid_or_empty_name() {
        let processes = ProcessEnumerator::enumerate().unwrap();
        for record in &processes {
            assert_ne!(record.pid, 0, "pid 0 must be filtered out");
            assert!(!record.name.is_empty(), "empty names must be filtered out");
        }
    }

    #[test]
    fn test_snapshots_are_independent() {
        // Two snapshots may differ, but both must be complete enough to
        // contain this process.
        let current_pid = unsafe { GetCurrentProcessId() };
        for _ in 0..2 {
            let snapshot = ProcessEnumerator::enumerate().unwrap();
            assert!(snapshot.iter().any(|p| p.pid == current_pid));
        }
    }

    #[test]
    fn test_find_by_pid_unknown() {
        let result = ProcessEnumerator::find_by_pid(u32::MAX - 1);
        match result {
            Err(ProcessError::ProcessNotFound(pid)) => assert_eq!(pid, u32::MAX - 1),
            other => panic!("expected ProcessNotFound, got {:?}", other.map(|p| p.pid)),
        }
    }

    #[test]
    fn test_find_by_name_is_case_insensitive() {
        let lower = ProcessEnumerator::find_by_name("exe").unwrap();
        let upper = ProcessEnumerator::find_by_name("EXE").unwrap();
        assert!(!lower.is_empty());
        assert_eq!(lower.len(), upper.len());
    }
}

#[cfg(all(test, not(windows)))]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_platform_reports_cleanly() {
        assert!(matches!(
            ProcessEnumerator::enumerate(),
            Err(ProcessError::Unsupported)
        ));
    }
}
