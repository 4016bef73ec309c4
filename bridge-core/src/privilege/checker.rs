// Administrator membership check for the current process token

use crate::error::PrivilegeError;
use std::sync::OnceLock;

// Elevation status cannot change within one process lifetime, so a
// successful check is cached. A fresh process (e.g. after the elevated
// relaunch) starts with an empty cache and a new token.
static ELEVATED: OnceLock<bool> = OnceLock::new();

/// Returns whether the current process token belongs to the local
/// Administrators group.
///
/// The first successful check is cached for the process lifetime;
/// failures are not cached and the check is retried on the next call.
pub fn is_elevated() -> Result<bool, PrivilegeError> {
    if let Some(&cached) = ELEVATED.get() {
        return Ok(cached);
    }
    let fresh = check_admin_membership()?;
    Ok(*ELEVATED.get_or_init(|| fresh))
}

#[cfg(windows)]
fn check_admin_membership() -> Result<bool, PrivilegeError> {
    use windows::Win32::Security::{
        CheckTokenMembership, CreateWellKnownSid, WinBuiltinAdministratorsSid, PSID,
    };

    unsafe {
        // First call sizes the SID buffer, second call fills it.
        let mut sid_size = 0u32;
        let _ = CreateWellKnownSid(
            WinBuiltinAdministratorsSid,
            None,
            PSID(std::ptr::null_mut()),
            &mut sid_size,
        );

        let mut sid_buffer = vec![0u8; sid_size as usize];
        CreateWellKnownSid(
            WinBuiltinAdministratorsSid,
            None,
            PSID(sid_buffer.as_mut_ptr() as *mut _),
            &mut sid_size,
        )
        .map_err(|e| {
            log::error!("Failed to create Administrators SID: {}", e);
            PrivilegeError::SidCreationFailed(std::io::Error::last_os_error())
        })?;

        let mut is_member = Default::default();
        CheckTokenMembership(None, PSID(sid_buffer.as_ptr() as *mut _), &mut is_member).map_err(
            |e| {
                log::error!("Failed to check token membership: {}", e);
                PrivilegeError::MembershipCheckFailed(std::io::Error::last_os_error())
            },
        )?;

        log::debug!("administrator check: {}", is_member.as_bool());
        Ok(is_member.as_bool())
    }
}

#[cfg(not(windows))]
fn check_admin_membership() -> Result<bool, PrivilegeError> {
    Err(PrivilegeError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(windows)]
    #[test]
    fn test_is_elevated_is_idempotent() {
        let first = is_elevated().expect("privilege check should not fail");
        for _ in 0..10 {
            assert_eq!(is_elevated().unwrap(), first);
        }
    }

    #[cfg(not(windows))]
    #[test]
    fn test_unsupported_platform_reports_cleanly() {
        assert!(matches!(is_elevated(), Err(PrivilegeError::Unsupported)));
    }
}
