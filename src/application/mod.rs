//! Application services coordinating the fault board.

pub mod board;
pub mod browser;
pub mod error;
pub mod generations;
pub mod intake;
pub mod pagination;
pub mod report;
pub mod store;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;
