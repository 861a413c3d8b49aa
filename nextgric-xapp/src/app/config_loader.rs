//! Configuration Loading for the xApp
//!
//! Loads `XappConfig` from YAML and checks the values the xApp relies on
//! before any task is started.
//!
//! # Example
//!
//! ```rust,ignore
//! use nextgric_xapp::app::load_and_validate_xapp_config;
//!
//! let config = load_and_validate_xapp_config("config/xapp.yaml")?;
//! ```

use std::collections::HashSet;
use std::path::Path;

use nextgric_common::{Plmn, XappConfig};
use thiserror::Error;

/// Largest RAN function id E2AP can carry.
pub const MAX_RAN_FUNCTION_ID: u16 = 4095;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ConfigValidationError),
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("Invalid PLMN: {0}")]
    InvalidPlmn(String),

    #[error("Invalid REST port: 0")]
    InvalidRestPort,

    /// KPM monitoring needs at least one slice to filter on
    #[error("No KPM slice filter configured")]
    NoSliceFilters,

    #[error("Invalid RAN function id {0} (must be at most {MAX_RAN_FUNCTION_ID})")]
    InvalidRanFunctionId(u16),

    #[error("Duplicate E2 node id {0}")]
    DuplicateNode(u32),
}

/// Loads an xApp configuration from a YAML file.
pub fn load_xapp_config<P: AsRef<Path>>(path: P) -> Result<XappConfig, ConfigError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    load_xapp_config_from_str(&contents)
}

/// Loads an xApp configuration from a YAML string.
pub fn load_xapp_config_from_str(yaml: &str) -> Result<XappConfig, ConfigError> {
    serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Validates an xApp configuration.
///
/// # Validation Rules
///
/// - PLMN MCC must be 001-999, MNC 00-99 (2 digits) or 000-999 (3 digits)
/// - REST port must be non-zero
/// - At least one KPM slice filter
/// - KPM and RC RAN function ids must fit E2AP's 0..=4095
/// - Simulated node ids must be unique
pub fn validate_xapp_config(config: &XappConfig) -> Result<(), ConfigValidationError> {
    validate_plmn(&config.plmn)?;

    if config.rest.port == 0 {
        return Err(ConfigValidationError::InvalidRestPort);
    }

    if config.kpm.slice_filters.is_empty() {
        return Err(ConfigValidationError::NoSliceFilters);
    }

    for id in [config.kpm.ran_function_id, config.rc.ran_function_id] {
        if id > MAX_RAN_FUNCTION_ID {
            return Err(ConfigValidationError::InvalidRanFunctionId(id));
        }
    }

    let mut seen = HashSet::new();
    for node in &config.nodes {
        if !seen.insert(node.nb_id) {
            return Err(ConfigValidationError::DuplicateNode(node.nb_id));
        }
    }

    Ok(())
}

fn validate_plmn(plmn: &Plmn) -> Result<(), ConfigValidationError> {
    if plmn.mcc == 0 || plmn.mcc > 999 {
        return Err(ConfigValidationError::InvalidPlmn(format!(
            "MCC {} must be between 001 and 999",
            plmn.mcc
        )));
    }

    let max_mnc = if plmn.long_mnc { 999 } else { 99 };
    if plmn.mnc > max_mnc {
        return Err(ConfigValidationError::InvalidPlmn(format!(
            "MNC {} does not fit {} digits",
            plmn.mnc,
            plmn.mnc_digit_len()
        )));
    }

    Ok(())
}

/// Loads and validates an xApp configuration in one step.
pub fn load_and_validate_xapp_config<P: AsRef<Path>>(path: P) -> Result<XappConfig, ConfigError> {
    let config = load_xapp_config(path)?;
    validate_xapp_config(&config)?;
    Ok(config)
}
