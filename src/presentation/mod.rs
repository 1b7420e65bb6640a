//! HTML rendering: askama view models, region fragments and escaping.

pub mod escape;
pub mod views;
