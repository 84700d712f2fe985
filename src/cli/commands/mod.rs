//! Command implementations for the jobpool CLI

pub mod config;
pub mod run;
pub mod version;
