//! Remote memory management in the target process.

pub mod allocator;
pub mod writer;

pub use allocator::RemoteMemory;
pub use writer::{wide_byte_len, write_memory, write_wide_string};
