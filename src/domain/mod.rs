//! Domain layer types and invariants.

pub mod error;
pub mod faults;
pub mod filters;
pub mod types;
