//! Configuration management
//!
//! Defaults, an optional TOML file and `EOSIGN_*` environment variables,
//! resolved into one `Config` value owned by the caller.

pub mod settings;

pub use settings::Config;
