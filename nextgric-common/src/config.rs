//! Configuration structures for the xApps
//!
//! `XappConfig` is loaded from YAML and describes the xApp itself (REST
//! endpoint, KPM subscription parameters, RC control parameters and, for the
//! simulated E2 runtime, the set of E2 nodes). The KPI sink connection is
//! described by `DbConfig`, which is read from the environment.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::logging::LogLevel;
use crate::types::{Plmn, SNssai};

/// Default KPI database host.
pub const DEFAULT_DB_HOST: &str = "127.0.0.1";
/// Default KPI database user.
pub const DEFAULT_DB_USER: &str = "admin";
/// Default KPI database password.
pub const DEFAULT_DB_PASSWORD: &str = "password";
/// Default KPI database name.
pub const DEFAULT_DB_NAME: &str = "flexric_db";
/// Default KPI database port.
pub const DEFAULT_DB_PORT: u16 = 3307;

/// REST control endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestConfig {
    /// Address the HTTP listener binds to
    #[serde(default = "default_rest_ip")]
    pub bind_ip: IpAddr,
    /// HTTP listener port
    #[serde(default = "default_rest_port")]
    pub port: u16,
}

impl RestConfig {
    /// Socket address to listen on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            bind_ip: default_rest_ip(),
            port: default_rest_port(),
        }
    }
}

fn default_rest_ip() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_rest_port() -> u16 {
    8080
}

/// E2SM-KPM monitoring configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpmConfig {
    /// RAN function id of the KPM service model on the E2 nodes
    #[serde(default = "default_kpm_ran_function_id")]
    pub ran_function_id: u16,
    /// One subscription is issued per slice filter
    #[serde(default = "default_slice_filters")]
    pub slice_filters: Vec<SNssai>,
}

impl Default for KpmConfig {
    fn default() -> Self {
        Self {
            ran_function_id: default_kpm_ran_function_id(),
            slice_filters: default_slice_filters(),
        }
    }
}

fn default_kpm_ran_function_id() -> u16 {
    2
}

fn default_slice_filters() -> Vec<SNssai> {
    vec![
        SNssai::with_sd_u32(128, 0x000080),
        SNssai::with_sd_u32(1, 0x000001),
        SNssai::with_sd_u32(5, 0x000082),
    ]
}

/// E2SM-RC control configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RcConfig {
    /// RAN function id of the RC service model on the E2 nodes
    #[serde(default = "default_rc_ran_function_id")]
    pub ran_function_id: u16,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            ran_function_id: default_rc_ran_function_id(),
        }
    }
}

fn default_rc_ran_function_id() -> u16 {
    3
}

/// An E2 node served by the simulated runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimNodeConfig {
    /// gNB identifier
    pub nb_id: u32,
    /// Whether the node exposes the KPM service model
    #[serde(default = "default_true")]
    pub kpm: bool,
    /// Whether the node exposes the RC service model
    #[serde(default = "default_true")]
    pub rc: bool,
    /// Number of UEs reported in each synthetic KPM indication
    #[serde(default = "default_sim_ues")]
    pub ues: u32,
}

fn default_true() -> bool {
    true
}

fn default_sim_ues() -> u32 {
    1
}

/// xApp configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XappConfig {
    /// Name used in logs
    #[serde(default = "default_name")]
    pub name: String,
    /// Log level (overridden by `RUST_LOG`)
    #[serde(default)]
    pub log_level: LogLevel,
    /// PLMN placed in RAN parameter trees and generated UE identities
    #[serde(default = "default_plmn")]
    pub plmn: Plmn,
    /// REST control endpoint
    #[serde(default)]
    pub rest: RestConfig,
    /// KPM monitoring
    #[serde(default)]
    pub kpm: KpmConfig,
    /// RC control
    #[serde(default)]
    pub rc: RcConfig,
    /// E2 nodes of the simulated runtime
    #[serde(default)]
    pub nodes: Vec<SimNodeConfig>,
    /// Whether the simulated runtime emits synthetic KPM reports
    #[serde(default)]
    pub synthetic_reports: bool,
}

impl Default for XappConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: LogLevel::default(),
            plmn: default_plmn(),
            rest: RestConfig::default(),
            kpm: KpmConfig::default(),
            rc: RcConfig::default(),
            nodes: Vec::new(),
            synthetic_reports: false,
        }
    }
}

fn default_name() -> String {
    "nr-xapp".to_string()
}

fn default_plmn() -> Plmn {
    Plmn::new(1, 1, false)
}

/// KPI database connection parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Database host
    pub host: String,
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Database name
    pub database: String,
    /// Database port
    pub port: u16,
}

impl DbConfig {
    /// Reads `DB_HOST`, `DB_USER`, `DB_PASSWORD`, `DB_NAME` and `DB_PORT`,
    /// using the fixed defaults for unset variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`DbConfig::from_env`] with an explicit variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("DB_PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("DB_PORT is not a valid port: {raw}")))?,
            None => DEFAULT_DB_PORT,
        };

        Ok(Self {
            host: lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
            user: lookup("DB_USER").unwrap_or_else(|| DEFAULT_DB_USER.to_string()),
            password: lookup("DB_PASSWORD").unwrap_or_else(|| DEFAULT_DB_PASSWORD.to_string()),
            database: lookup("DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.to_string()),
            port,
        })
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            user: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            database: DEFAULT_DB_NAME.to_string(),
            port: DEFAULT_DB_PORT,
        }
    }
}

// Keep the password out of logs.
impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .field("port", &self.port)
            .finish()
    }
}
