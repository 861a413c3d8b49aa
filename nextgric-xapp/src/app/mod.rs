//! xApp application support
//!
//! Configuration loading and validation for the `nr-xapp` binary.

mod config_loader;

pub use config_loader::{
    load_and_validate_xapp_config, load_xapp_config, load_xapp_config_from_str,
    validate_xapp_config, ConfigError, ConfigValidationError, MAX_RAN_FUNCTION_ID,
};
