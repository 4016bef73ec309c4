//! The DLL injection engine and its request/outcome types.

pub mod engine;
pub mod outcome;

pub use engine::InjectionEngine;
pub use outcome::{InjectionOutcome, InjectionRequest};
