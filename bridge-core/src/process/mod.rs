//! Process snapshotting and handle management.

pub mod enumerator;
pub mod record;

#[cfg(windows)]
pub mod handle;
#[cfg(windows)]
pub mod thread;

pub use enumerator::ProcessEnumerator;
pub use record::ProcessRecord;

#[cfg(windows)]
pub use handle::ProcessHandle;
#[cfg(windows)]
pub use thread::RemoteThread;
