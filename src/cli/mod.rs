//! Command-line interface
//!
//! This module contains the CLI commands, argument parsing and the JSON
//! request format read by `sign`.

pub mod commands;
pub mod request;

pub use commands::{Command, Opt};
pub use request::{ActionRequest, SignRequest};
