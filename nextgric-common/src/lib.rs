//! Common types and utilities for nextgric
//!
//! This crate provides shared 5G types, configuration structures, and
//! logging utilities used across the nextgric xApp crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod octet_string;
pub mod types;

pub use config::{
    DbConfig, KpmConfig, RcConfig, RestConfig, SimNodeConfig, XappConfig, DEFAULT_DB_HOST,
    DEFAULT_DB_NAME, DEFAULT_DB_PASSWORD, DEFAULT_DB_PORT, DEFAULT_DB_USER,
};
pub use error::Error;
pub use logging::{init_logging, init_logging_with_filter, HexDump, LogLevel};
pub use octet_string::OctetString;
pub use types::*;
