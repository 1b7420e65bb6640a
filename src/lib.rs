//! FaultBoard: log equipment faults and report on them through a hosted
//! PostgREST store, served as a datastar-driven web page.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
