// Elevated relaunch of the current executable

use crate::error::PrivilegeError;

/// Relaunches the current executable through the shell with a UAC
/// prompt, preserving command-line arguments, then exits this process.
///
/// On success this function does not return: once the shell accepts the
/// launch request the unprivileged instance terminates immediately so two
/// copies of the application never compete for the same resources. The
/// contract is "request was issued" only; a user declining the UAC prompt
/// surfaces as the new process failing to start, not as an error here.
#[cfg(windows)]
pub fn relaunch_elevated() -> Result<(), PrivilegeError> {
    use std::os::windows::ffi::OsStrExt;
    use windows::core::PCWSTR;
    use windows::Win32::UI::Shell::ShellExecuteW;
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

    let exe = std::env::current_exe().map_err(PrivilegeError::ExecutableNotFound)?;

    // Reassemble the original argv into one parameter string.
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = args.join(" ");

    let to_wide = |s: &std::ffi::OsStr| -> Vec<u16> {
        s.encode_wide().chain(std::iter::once(0)).collect()
    };
    let verb_wide = to_wide(std::ffi::OsStr::new("runas"));
    let exe_wide = to_wide(exe.as_os_str());
    let args_wide = to_wide(std::ffi::OsStr::new(args.as_str()));

    let params = if args.is_empty() {
        PCWSTR::null()
    } else {
        PCWSTR(args_wide.as_ptr())
    };

    let hinstance = unsafe {
        ShellExecuteW(
            None,
            PCWSTR(verb_wide.as_ptr()),
            PCWSTR(exe_wide.as_ptr()),
            params,
            PCWSTR::null(),
            SW_SHOWNORMAL,
        )
    };

    // ShellExecuteW reports success with a value greater than 32.
    let rv = hinstance.0 as isize;
    if rv <= 32 {
        log::error!("elevated relaunch rejected by the shell: code {}", rv);
        return Err(PrivilegeError::ElevationRequestFailed(rv));
    }

    log::info!("elevated instance launched, exiting unprivileged process");
    std::process::exit(0);
}

/// Elevation is a Windows UAC concept; other platforms report a clean
/// runtime error.
#[cfg(not(windows))]
pub fn relaunch_elevated() -> Result<(), PrivilegeError> {
    Err(PrivilegeError::Unsupported)
}
