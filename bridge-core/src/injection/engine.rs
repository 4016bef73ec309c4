//! CreateRemoteThread injection engine.
//!
//! The classic load-library technique, run as a synchronous state
//! machine: validate the payload, check privileges, open the target,
//! allocate and fill a remote path buffer, resolve LoadLibraryW locally,
//! start a remote thread at it, wait, and inspect the exit value. One
//! progress line is pushed into the status sink before each step, and
//! every OS resource is owned by an RAII guard so it is released exactly
//! once on every exit path.

use std::time::Instant;

use crate::cancel::CancelToken;
use crate::error::InjectError;
use crate::injection::{InjectionOutcome, InjectionRequest};
use crate::privilege;
use crate::status::StatusSink;

/// Guidance shown when the operation needs an elevated restart.
const ELEVATION_GUIDANCE: &str = "DLL injection requires administrator privileges.\n\n\
The application will restart with elevated privileges.\n\
Your DLL selection will be saved.\n\n\
Click 'Inject DLL' again after restart to proceed.";

/// The injection engine. Stateless between calls: each `inject` owns its
/// own process and thread handles, so concurrent calls do not interact.
#[derive(Debug, Default)]
pub struct InjectionEngine;

impl InjectionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Runs the full injection state machine for one request.
    ///
    /// The call is synchronous; `sink` receives progress lines while it
    /// runs. Cancellation is cooperative and only observed up to remote
    /// thread creation: once the thread exists inside the target it
    /// cannot be recalled, so a cancellation requested after that point
    /// is not honored and the call proceeds to completion.
    ///
    /// All failures are returned in the outcome; this method never
    /// panics and never terminates the process.
    pub fn inject(
        &self,
        request: &InjectionRequest,
        sink: &dyn StatusSink,
        cancel: &CancelToken,
    ) -> InjectionOutcome {
        let started = Instant::now();
        let mut progress = Progress {
            sink,
            transcript: Vec::new(),
        };

        let result = self.run(request, &mut progress, cancel);
        let elapsed = started.elapsed();

        match result {
            Ok(()) => {
                let summary = format!(
                    "Successfully injected {} into process {}",
                    request.payload_path.display(),
                    request.target_pid
                );
                log::info!("{}", summary);
                progress.transcript.push(summary);
                InjectionOutcome {
                    succeeded: true,
                    message: "DLL injected successfully".to_string(),
                    output: progress.transcript.join("\n"),
                    error_code: String::new(),
                    elapsed,
                }
            }
            Err(err) => {
                let detail = render_chain(&err);
                log::error!("injection failed ({}): {}", err.code(), detail);

                let message = match err {
                    InjectError::NeedsElevation | InjectError::Cancelled => {
                        err.summary().to_string()
                    }
                    _ => format!("{}: {}", err.summary(), detail),
                };

                match err {
                    InjectError::NeedsElevation => {
                        progress.transcript.push(ELEVATION_GUIDANCE.to_string())
                    }
                    InjectError::Cancelled => progress.transcript.push(detail),
                    _ => progress.transcript.push(format!(
                        "Failed to inject {} into process {}",
                        request.payload_path.display(),
                        request.target_pid
                    )),
                }

                InjectionOutcome {
                    succeeded: false,
                    message,
                    output: progress.transcript.join("\n"),
                    error_code: err.code().to_string(),
                    elapsed,
                }
            }
        }
    }

    fn run(
        &self,
        request: &InjectionRequest,
        progress: &mut Progress<'_>,
        cancel: &CancelToken,
    ) -> Result<(), InjectError> {
        progress.emit("Starting injection process...");
        if cancel.is_cancelled() {
            return Err(InjectError::Cancelled);
        }

        // Validating: no OS resources are touched for a missing payload.
        if !request.payload_path.is_file() {
            return Err(InjectError::PayloadNotFound(
                request.payload_path.display().to_string(),
            ));
        }

        if cancel.is_cancelled() {
            return Err(InjectError::Cancelled);
        }
        progress.emit("Checking administrator privileges...");
        let elevated = privilege::is_elevated().map_err(InjectError::PrivilegeCheckFailed)?;
        if !elevated {
            return Err(InjectError::NeedsElevation);
        }

        if cancel.is_cancelled() {
            return Err(InjectError::Cancelled);
        }
        progress.emit(format!(
            "Injecting DLL into process {}...",
            request.target_pid
        ));
        self.perform(request, progress, cancel)?;

        progress.emit("Injection completed successfully!");
        Ok(())
    }

    #[cfg(windows)]
    fn perform(
        &self,
        request: &InjectionRequest,
        progress: &mut Progress<'_>,
        cancel: &CancelToken,
    ) -> Result<(), InjectError> {
        use crate::memory::{wide_byte_len, write_wide_string, RemoteMemory};
        use crate::process::{ProcessHandle, RemoteThread};
        use windows::Win32::System::Threading::CreateRemoteThread;

        if cancel.is_cancelled() {
            return Err(InjectError::Cancelled);
        }
        progress.emit("Opening target process...");
        let process = ProcessHandle::open_for_injection(request.target_pid)?;

        let payload = request.payload_path.to_string_lossy();

        if cancel.is_cancelled() {
            return Err(InjectError::Cancelled);
        }
        progress.emit("Allocating memory in target process...");
        let remote =
            RemoteMemory::allocate_readwrite(process.as_handle(), wide_byte_len(&payload))?;

        if cancel.is_cancelled() {
            return Err(InjectError::Cancelled);
        }
        progress.emit("Writing DLL path to target process memory...");
        write_wide_string(process.as_handle(), remote.address(), &payload)?;

        if cancel.is_cancelled() {
            return Err(InjectError::Cancelled);
        }
        progress.emit("Resolving LoadLibraryW address...");
        let loader = resolve_loader_entry()?;

        // Last cancellation point: once the remote thread exists it
        // cannot be recalled from this process.
        if cancel.is_cancelled() {
            return Err(InjectError::Cancelled);
        }
        progress.emit("Creating remote thread...");
        let raw = unsafe {
            CreateRemoteThread(
                process.as_handle(),
                None,
                0,
                Some(std::mem::transmute::<
                    *mut std::ffi::c_void,
                    unsafe extern "system" fn(*mut std::ffi::c_void) -> u32,
                >(loader)),
                Some(remote.as_ptr()),
                0,
                None,
            )
            .map_err(|_| {
                InjectError::RemoteThreadCreationFailed(std::io::Error::last_os_error())
            })?
        };
        let thread = unsafe { RemoteThread::from_raw(raw) };

        progress.emit("Waiting for DLL to load...");
        thread.wait()?;

        // The exit value is LoadLibraryW's return: a module handle on
        // success, zero when the target's loader rejected the payload.
        let exit_code = thread.exit_code()?;
        if exit_code == 0 {
            return Err(InjectError::RemotePayloadLoadFailed);
        }
        log::debug!("DLL loaded in target, module handle 0x{:X}", exit_code);
        Ok(())
    }

    // The privilege check already failed on non-Windows platforms, so
    // this is never reached; it exists to keep the state machine total.
    #[cfg(not(windows))]
    fn perform(
        &self,
        _request: &InjectionRequest,
        _progress: &mut Progress<'_>,
        _cancel: &CancelToken,
    ) -> Result<(), InjectError> {
        Err(InjectError::PrivilegeCheckFailed(
            crate::error::PrivilegeError::Unsupported,
        ))
    }
}

/// Get the address of LoadLibraryW in kernel32.dll.
///
/// kernel32.dll is mapped at the same base in every process of one
/// session, so the local address is valid as a remote thread start.
#[cfg(windows)]
fn resolve_loader_entry() -> Result<*mut std::ffi::c_void, InjectError> {
    use windows::core::s;
    use windows::Win32::System::LibraryLoader::{GetModuleHandleA, GetProcAddress};

    unsafe {
        let kernel32 = GetModuleHandleA(s!("kernel32.dll")).map_err(|_| {
            InjectError::EntryPointResolutionFailed(std::io::Error::last_os_error())
        })?;

        let loadlib = GetProcAddress(kernel32, s!("LoadLibraryW")).ok_or_else(|| {
            InjectError::EntryPointResolutionFailed(std::io::Error::last_os_error())
        })?;

        Ok(loadlib as *mut std::ffi::c_void)
    }
}

/// Forwards each progress line to the sink and keeps a transcript for
/// the outcome's output field.
struct Progress<'a> {
    sink: &'a dyn StatusSink,
    transcript: Vec<String>,
}

impl Progress<'_> {
    fn emit(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.sink.report(&message);
        self.transcript.push(message);
    }
}

/// Renders an error with its full source chain, so the underlying OS
/// error description reaches the outcome text.
fn render_chain(err: &InjectError) -> String {
    use std::error::Error as _;

    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::MemorySink;
    use std::fs;
    use std::path::PathBuf;

    fn missing_payload() -> PathBuf {
        PathBuf::from(if cfg!(windows) {
            "C:\\definitely\\missing\\payload.dll"
        } else {
            "/definitely/missing/payload.dll"
        })
    }

    fn temp_payload(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bridge_{}_{}.dll", std::process::id(), name));
        fs::write(&path, b"not a real module").unwrap();
        path
    }

    #[test]
    fn test_missing_payload_short_circuits() {
        let engine = InjectionEngine::new();
        let sink = MemorySink::new();
        let request = InjectionRequest::new(1234, missing_payload());

        let outcome = engine.inject(&request, &sink, &CancelToken::new());

        assert!(!outcome.succeeded);
        assert_eq!(outcome.error_code, "PayloadNotFound");
        assert!(outcome.message.contains("DLL not found"));
        // Validation failed before any privilege or process step ran.
        assert_eq!(sink.messages(), vec!["Starting injection process..."]);
    }

    #[test]
    fn test_cancellation_before_any_step() {
        let engine = InjectionEngine::new();
        let sink = MemorySink::new();
        let payload = temp_payload("cancel");
        let request = InjectionRequest::new(1234, &payload);

        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = engine.inject(&request, &sink, &cancel);
        fs::remove_file(&payload).ok();

        assert!(!outcome.succeeded);
        assert_eq!(outcome.error_code, "Cancelled");
        // No target-process handle was ever requested.
        assert_eq!(sink.messages(), vec!["Starting injection process..."]);
    }

    #[test]
    fn test_transcript_is_carried_in_output() {
        let engine = InjectionEngine::new();
        let sink = MemorySink::new();
        let request = InjectionRequest::new(1234, missing_payload());

        let outcome = engine.inject(&request, &sink, &CancelToken::new());

        assert!(outcome.output.starts_with("Starting injection process..."));
        assert!(outcome.output.contains("Failed to inject"));
    }

    #[cfg(windows)]
    #[test]
    fn test_needs_elevation_sentinel_when_unprivileged() {
        if crate::privilege::is_elevated().unwrap_or(false) {
            eprintln!("running elevated - skipping NEEDS_ELEVATION test");
            return;
        }

        let engine = InjectionEngine::new();
        let sink = MemorySink::new();
        let payload = temp_payload("elevation");
        // Target pid is irrelevant: the privilege gate comes first.
        let request = InjectionRequest::new(u32::MAX - 1, &payload);

        let outcome = engine.inject(&request, &sink, &CancelToken::new());
        fs::remove_file(&payload).ok();

        assert!(!outcome.succeeded);
        assert_eq!(outcome.error_code, "NEEDS_ELEVATION");
        assert!(outcome.needs_elevation());
        assert!(outcome.output.contains("restart with elevated privileges"));
        assert_eq!(
            sink.messages(),
            vec![
                "Starting injection process...",
                "Checking administrator privileges...",
            ]
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn test_privilege_check_unsupported_off_windows() {
        let engine = InjectionEngine::new();
        let sink = MemorySink::new();
        let payload = temp_payload("unsupported");
        let request = InjectionRequest::new(1234, &payload);

        let outcome = engine.inject(&request, &sink, &CancelToken::new());
        fs::remove_file(&payload).ok();

        assert!(!outcome.succeeded);
        assert_eq!(outcome.error_code, "PrivilegeCheckFailed");
    }
}
