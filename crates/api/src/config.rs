//! Service configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, Map};
use serde::de::DeserializeOwned;

use restock_core::{FieldError, ValidationError};
use restock_infra::replenishment::{DEFAULT_SUBJECT_PREFIX, check_subject_prefix};
use restock_policy::PolicyDefaults;

pub const ENV_PREFIX: &str = "RESTOCK";

pub const BIND_ADDR: &str = "RESTOCK_BIND_ADDR";
pub const INVENTORY_PATH: &str = "RESTOCK_INVENTORY_PATH";
pub const API_TOKEN: &str = "RESTOCK_API_TOKEN";
pub const SUBJECT_PREFIX: &str = "RESTOCK_SUBJECT_PREFIX";
pub const REVIEW_HORIZON_DAYS: &str = "RESTOCK_REVIEW_HORIZON_DAYS";
pub const TARGET_WINDOW_DAYS: &str = "RESTOCK_TARGET_WINDOW_DAYS";
pub const PROJECT_CONSUMPTION: &str = "RESTOCK_PROJECT_CONSUMPTION";
pub const UPDATE_QUANTITIES: &str = "RESTOCK_UPDATE_QUANTITIES";
pub const NOTIFY: &str = "RESTOCK_NOTIFY";
pub const SCHEDULE_SECS: &str = "RESTOCK_SCHEDULE_SECS";

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);

#[derive(Debug, thiserror::Error)]
pub enum ApiConfigError {
    #[error("configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("configuration validation failed: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// JSON inventory file; `None` keeps the inventory in memory.
    pub inventory_path: Option<PathBuf>,
    /// Bearer token required on the check route when set.
    pub api_token: Option<String>,
    pub subject_prefix: String,
    pub defaults: PolicyDefaults,
    /// Whether scheduled runs send notifications.
    pub notify: bool,
    pub schedule_interval: Option<Duration>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(DEFAULT_BIND_ADDR),
            inventory_path: None,
            api_token: None,
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
            defaults: PolicyDefaults::default(),
            notify: true,
            schedule_interval: None,
        }
    }
}

impl ApiConfig {
    /// Load from the process environment (`RESTOCK_*`).
    pub fn from_env() -> Result<Self, ApiConfigError> {
        Self::load(environment())
    }

    /// Load from an explicit variable set instead of the process environment.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Result<Self, ApiConfigError>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let vars: Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(environment().source(Some(vars)))
    }

    /// Every malformed variable is reported, not just the first.
    fn load(source: Environment) -> Result<Self, ApiConfigError> {
        let settings = Config::builder().add_source(source).build()?;

        let mut errors = Vec::new();
        let mut config = Self::default();

        if let Some(raw) = read::<String>(&settings, &mut errors, BIND_ADDR) {
            match raw.trim().parse() {
                Ok(addr) => config.bind_addr = addr,
                Err(_) => errors.push(FieldError::new(
                    BIND_ADDR,
                    format!("must be a socket address like 0.0.0.0:8080 (got {raw:?})"),
                )),
            }
        }

        config.inventory_path = read_text(&settings, &mut errors, INVENTORY_PATH).map(PathBuf::from);
        config.api_token = read_text(&settings, &mut errors, API_TOKEN);

        if let Some(prefix) = read::<String>(&settings, &mut errors, SUBJECT_PREFIX) {
            check_subject_prefix(&mut errors, SUBJECT_PREFIX, &prefix);
            config.subject_prefix = prefix.trim().to_string();
        }

        if let Some(days) = read::<f64>(&settings, &mut errors, REVIEW_HORIZON_DAYS) {
            config.defaults.review_horizon_days = days;
        }
        if let Some(days) = read::<f64>(&settings, &mut errors, TARGET_WINDOW_DAYS) {
            config.defaults.target_window_days = Some(days);
        }
        if let Some(enabled) = read::<bool>(&settings, &mut errors, PROJECT_CONSUMPTION) {
            config.defaults.project_consumption = enabled;
        }
        if let Some(enabled) = read::<bool>(&settings, &mut errors, UPDATE_QUANTITIES) {
            config.defaults.update_calculated_quantities = enabled;
        }
        if let Some(enabled) = read::<bool>(&settings, &mut errors, NOTIFY) {
            config.notify = enabled;
        }
        match read::<u64>(&settings, &mut errors, SCHEDULE_SECS) {
            Some(0) => errors.push(FieldError::new(SCHEDULE_SECS, "must be a positive number of seconds")),
            Some(secs) => config.schedule_interval = Some(Duration::from_secs(secs)),
            None => {}
        }

        if let Err(e) = config.defaults.validate() {
            errors.extend(e.fields.into_iter().map(|f| FieldError {
                field: env_name(&f.field).to_string(),
                message: f.message,
            }));
        }

        ValidationError::from_collected(errors)?;
        Ok(config)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).ignore_empty(true)
}

// `RESTOCK_REVIEW_HORIZON_DAYS` is stored under `review_horizon_days`.
fn config_key(var: &str) -> String {
    var.strip_prefix(ENV_PREFIX)
        .map(|rest| rest.trim_start_matches('_'))
        .unwrap_or(var)
        .to_ascii_lowercase()
}

/// Typed read of one variable. Unset is `None`; a value of the wrong type is
/// recorded against the variable name and also yields `None`.
fn read<T: DeserializeOwned>(settings: &Config, errors: &mut Vec<FieldError>, var: &str) -> Option<T> {
    match settings.get::<T>(&config_key(var)) {
        Ok(value) => Some(value),
        Err(config::ConfigError::NotFound(_)) => None,
        Err(e) => {
            errors.push(FieldError::new(var, invalid_message(&e)));
            None
        }
    }
}

/// Like [`read`] for free text, treating a blank value as unset.
fn read_text(settings: &Config, errors: &mut Vec<FieldError>, var: &str) -> Option<String> {
    read::<String>(settings, errors, var)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid_message(err: &config::ConfigError) -> String {
    match err {
        config::ConfigError::Type {
            unexpected, expected, ..
        } => format!("expected {expected}, got {unexpected}"),
        other => other.to_string(),
    }
}

// Maps `PolicyDefaults::validate` field names back to their variables.
fn env_name(field: &str) -> &str {
    match field {
        "reviewHorizonDays" => REVIEW_HORIZON_DAYS,
        "targetWindowDays" => TARGET_WINDOW_DAYS,
        other => other,
    }
}
