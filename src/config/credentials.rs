//! Oracle credential lookup.
//!
//! Providers are tried in order and the first one that yields a non-empty
//! value wins. When none do, the oracle runs unconfigured.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::config::settings::AppConfig;
use crate::config::settings_io::app_dir;
use crate::error::ConfigError;

pub const API_KEY_NAME: &str = "GOOGLE_API_KEY";
pub const SECRETS_FILE_NAME: &str = "secrets.toml";

pub trait CredentialProvider {
    fn name(&self) -> String;
    fn lookup(&self) -> Result<Option<String>, ConfigError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Configured { api_key: String, source: String },
    Unconfigured,
}

impl Credential {
    pub fn api_key(&self) -> Option<&str> {
        match self {
            Credential::Configured { api_key, .. } => Some(api_key),
            Credential::Unconfigured => None,
        }
    }
}

pub struct EnvProvider {
    var: String,
}

impl EnvProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvProvider {
    fn name(&self) -> String {
        format!("env:{}", self.var)
    }

    fn lookup(&self) -> Result<Option<String>, ConfigError> {
        Ok(std::env::var(&self.var).ok())
    }
}

/// Streamlit-style `secrets.toml` with a top-level key.
pub struct SecretsFileProvider {
    path: PathBuf,
    key: String,
}

impl SecretsFileProvider {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }
}

impl CredentialProvider for SecretsFileProvider {
    fn name(&self) -> String {
        format!("secrets:{}", self.path.display())
    }

    fn lookup(&self) -> Result<Option<String>, ConfigError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        let table: toml::Table = toml::from_str(&raw)?;
        Ok(table
            .get(&self.key)
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }
}

/// A value already read from the app config.
pub struct StaticProvider {
    label: String,
    value: Option<String>,
}

impl StaticProvider {
    pub fn new(label: impl Into<String>, value: Option<String>) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

impl CredentialProvider for StaticProvider {
    fn name(&self) -> String {
        self.label.clone()
    }

    fn lookup(&self) -> Result<Option<String>, ConfigError> {
        Ok(self.value.clone())
    }
}

pub struct CredentialChain {
    providers: Vec<Box<dyn CredentialProvider>>,
}

impl CredentialChain {
    pub fn new(providers: Vec<Box<dyn CredentialProvider>>) -> Self {
        Self { providers }
    }

    /// Env var, then `./.streamlit/secrets.toml`, then the app config dir's
    /// `secrets.toml`, then `oracle.api_key` from the config file.
    pub fn standard(config: &AppConfig) -> Self {
        let local_secrets = PathBuf::from(".streamlit").join(SECRETS_FILE_NAME);
        let app_secrets = app_dir(dirs::config_dir()).join(SECRETS_FILE_NAME);

        Self::new(vec![
            Box::new(EnvProvider::new(API_KEY_NAME)),
            Box::new(SecretsFileProvider::new(local_secrets, API_KEY_NAME)),
            Box::new(SecretsFileProvider::new(app_secrets, API_KEY_NAME)),
            Box::new(StaticProvider::new(
                "config:oracle.api_key",
                config.oracle.api_key.clone(),
            )),
        ])
    }

    /// A provider that errors is skipped with a warning, not fatal.
    pub fn resolve(&self) -> Credential {
        for provider in &self.providers {
            match provider.lookup() {
                Ok(Some(value)) if !value.trim().is_empty() => {
                    debug!(source = %provider.name(), "oracle credential found");
                    return Credential::Configured {
                        api_key: value.trim().to_string(),
                        source: provider.name(),
                    };
                }
                Ok(_) => {}
                Err(e) => warn!(source = %provider.name(), error = %e, "credential provider failed"),
            }
        }
        Credential::Unconfigured
    }
}
