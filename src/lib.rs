//! Library entry point for the compose-dump CLI.

pub mod commands;
pub mod compose;
pub mod config;
pub mod dump;
pub mod error;
pub mod options;
pub mod utils;
