// Error types for enumeration, privilege and injection operations

use thiserror::Error;

/// Errors related to process enumeration.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Failed to create process snapshot")]
    SnapshotFailed(#[source] std::io::Error),

    #[error("Failed to enumerate processes")]
    EnumerationFailed(#[source] std::io::Error),

    #[error("Process not found: {0}")]
    ProcessNotFound(u32),

    #[error("Process enumeration is not supported on this platform")]
    Unsupported,
}

/// Errors related to privilege checks and UAC elevation.
#[derive(Debug, Error)]
pub enum PrivilegeError {
    #[error("Failed to create Administrators group SID")]
    SidCreationFailed(#[source] std::io::Error),

    #[error("Failed to check token membership")]
    MembershipCheckFailed(#[source] std::io::Error),

    #[error("Failed to locate the current executable")]
    ExecutableNotFound(#[source] std::io::Error),

    #[error("Elevated relaunch request was rejected by the shell (code {0})")]
    ElevationRequestFailed(isize),

    #[error("Privilege operations are not supported on this platform")]
    Unsupported,
}

/// Errors produced by the injection state machine.
///
/// Each variant corresponds to one failing step; [`InjectError::code`]
/// yields the stable string the UI layer matches against.
/// `NEEDS_ELEVATION` is the single code the caller is expected to
/// special-case: it means the operation can succeed after an elevated
/// restart, unlike every other code which is terminal for this attempt.
#[derive(Debug, Error)]
pub enum InjectError {
    #[error("DLL file not found: {0}")]
    PayloadNotFound(String),

    #[error("Administrator privileges required")]
    NeedsElevation,

    #[error("Failed to check privileges")]
    PrivilegeCheckFailed(#[source] PrivilegeError),

    #[error("OpenProcess failed for PID {pid} (ensure you have administrator privileges)")]
    ProcessOpenFailed {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("VirtualAllocEx failed in target process")]
    RemoteAllocationFailed(#[source] std::io::Error),

    #[error("Incomplete write: wrote {written} bytes, expected {expected}")]
    IncompleteRemoteWrite { written: usize, expected: usize },

    #[error("Failed to resolve LoadLibraryW in kernel32.dll")]
    EntryPointResolutionFailed(#[source] std::io::Error),

    #[error("CreateRemoteThread failed")]
    RemoteThreadCreationFailed(#[source] std::io::Error),

    #[error("Unexpected wait result on remote thread: {0}")]
    UnexpectedWaitResult(u32),

    #[error("LoadLibraryW failed in target process (possible causes: DLL architecture mismatch, missing dependencies, or invalid DLL)")]
    RemotePayloadLoadFailed,

    #[error("Operation cancelled before the remote thread was created")]
    Cancelled,
}

impl InjectError {
    /// Stable error code carried in [`crate::InjectionOutcome`].
    pub fn code(&self) -> &'static str {
        match self {
            InjectError::PayloadNotFound(_) => "PayloadNotFound",
            InjectError::NeedsElevation => "NEEDS_ELEVATION",
            InjectError::PrivilegeCheckFailed(_) => "PrivilegeCheckFailed",
            InjectError::ProcessOpenFailed { .. } => "ProcessOpenFailed",
            InjectError::RemoteAllocationFailed(_) => "RemoteAllocationFailed",
            InjectError::IncompleteRemoteWrite { .. } => "IncompleteRemoteWrite",
            InjectError::EntryPointResolutionFailed(_) => "EntryPointResolutionFailed",
            InjectError::RemoteThreadCreationFailed(_) => "RemoteThreadCreationFailed",
            InjectError::UnexpectedWaitResult(_) => "UnexpectedWaitResult",
            InjectError::RemotePayloadLoadFailed => "RemotePayloadLoadFailed",
            InjectError::Cancelled => "Cancelled",
        }
    }

    /// Short human message for the failure, in the wording the
    /// surrounding UI shows next to the detailed error text.
    pub fn summary(&self) -> &'static str {
        match self {
            InjectError::PayloadNotFound(_) => "Injection failed: DLL not found",
            InjectError::NeedsElevation => "Administrator privileges required",
            InjectError::PrivilegeCheckFailed(_) => "Injection failed: privilege check error",
            InjectError::Cancelled => "Injection cancelled",
            _ => "Injection failed",
        }
    }
}
