// Process snapshot records

use serde::Serialize;
use std::fmt;

/// One entry of a process table snapshot: id and executable name.
///
/// A record is a point-in-time value, not a live view. The process may
/// exit, or a new process may be assigned the same id, between the
/// snapshot and any later use of the pid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessRecord {
    /// Process ID
    pub pid: u32,
    /// Executable name (e.g. "notepad.exe")
    pub name: String,
}

impl fmt::Display for ProcessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (PID {})", self.name, self.pid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let record = ProcessRecord {
            pid: 4242,
            name: "game.exe".to_string(),
        };
        assert_eq!(record.to_string(), "game.exe (PID 4242)");
    }

    #[test]
    fn test_serializes_for_ui() {
        let record = ProcessRecord {
            pid: 7,
            name: "svchost.exe".to_string(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["pid"], 7);
        assert_eq!(json["name"], "svchost.exe");
    }
}
