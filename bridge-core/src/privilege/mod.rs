//! Privilege checking and UAC elevation.

pub mod checker;
pub mod elevation;

pub use checker::is_elevated;
pub use elevation::relaunch_elevated;
