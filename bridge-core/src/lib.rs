// Core library for the mod bridge DLL injection engine

pub mod cancel;
pub mod error;
pub mod injection;
pub mod privilege;
pub mod process;
pub mod status;
pub mod tracker;

#[cfg(windows)]
pub mod memory;

pub use cancel::CancelToken;
pub use error::{InjectError, PrivilegeError, ProcessError};
pub use injection::{InjectionEngine, InjectionOutcome, InjectionRequest};
pub use privilege::{is_elevated, relaunch_elevated};
pub use process::{ProcessEnumerator, ProcessRecord};
pub use status::{LogSink, MemorySink, StatusSink};
pub use tracker::OperationTracker;
