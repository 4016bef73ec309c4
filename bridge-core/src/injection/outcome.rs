// Request and outcome types crossing the engine boundary

use serde::{Serialize, Serializer};
use std::path::PathBuf;
use std::time::Duration;

/// Caller-supplied description of one injection: which process, which DLL.
/// Immutable once handed to the engine; nothing about it is persisted.
#[derive(Debug, Clone)]
pub struct InjectionRequest {
    /// Id of the already-running process that receives the payload.
    pub target_pid: u32,
    /// Absolute path to the DLL the target's loader should load.
    pub payload_path: PathBuf,
}

impl InjectionRequest {
    pub fn new(target_pid: u32, payload_path: impl Into<PathBuf>) -> Self {
        Self {
            target_pid,
            payload_path: payload_path.into(),
        }
    }
}

/// Final result of one injection call.
///
/// `error_code` is empty on success, `"NEEDS_ELEVATION"` when an elevated
/// restart would let the operation succeed, and one of the stable failure
/// codes otherwise. `output` carries the step transcript plus a summary
/// line; `message` is the one-line human verdict.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionOutcome {
    pub succeeded: bool,
    pub message: String,
    pub output: String,
    pub error_code: String,
    #[serde(serialize_with = "serialize_elapsed")]
    pub elapsed: Duration,
}

impl InjectionOutcome {
    /// Whether the caller should offer the restart-elevated-and-retry flow.
    pub fn needs_elevation(&self) -> bool {
        self.error_code == "NEEDS_ELEVATION"
    }
}

fn serialize_elapsed<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:?}", elapsed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_wire_shape() {
        let outcome = InjectionOutcome {
            succeeded: false,
            message: "Administrator privileges required".into(),
            output: "Starting injection process...".into(),
            error_code: "NEEDS_ELEVATION".into(),
            elapsed: Duration::from_millis(12),
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["succeeded"], false);
        assert_eq!(json["errorCode"], "NEEDS_ELEVATION");
        assert_eq!(json["elapsed"], "12ms");
        assert!(outcome.needs_elevation());
    }

    #[test]
    fn test_request_owns_its_path() {
        let request = InjectionRequest::new(1234, "C:\\Mods\\payload.dll");
        assert_eq!(request.target_pid, 1234);
        assert_eq!(request.payload_path, PathBuf::from("C:\\Mods\\payload.dll"));
    }
}
