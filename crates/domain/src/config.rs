use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Production host of the SolarWinds admin panel.
pub const DEFAULT_BASE_URL: &str = "https://my.solarwinds.cloud";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Client config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Account email used for the credential login.
    #[serde(default)]
    pub email: String,
    /// Direct password (for config-only setups; prefer `password_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Environment variable holding the password when `password` is unset.
    #[serde(default = "d_password_env")]
    pub password_env: String,
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Per-request deadline applied to every HTTP call.
    #[serde(default = "d_30000")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password: None,
            password_env: d_password_env(),
            base_url: d_base_url(),
            timeout_ms: 30_000,
            user_agent: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("password_env", &self.password_env)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Config with the given credentials and every other field defaulted.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Some(password.into()),
            ..Self::default()
        }
    }

    /// Override the base URL. An empty string keeps the production host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        if !base_url.is_empty() {
            self.base_url = base_url;
        }
        self
    }

    /// The password: `password` if set, otherwise the value of `password_env`.
    pub fn resolve_password(&self) -> Result<String> {
        if let Some(ref password) = self.password {
            return Ok(password.clone());
        }
        std::env::var(&self.password_env).map_err(|_| {
            Error::Config(format!(
                "no password configured and env var {} is not set",
                self.password_env
            ))
        })
    }

    /// Parse `base_url`, treating an empty value as the production host.
    pub fn parsed_base_url(&self) -> Result<url::Url> {
        let raw = if self.base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            self.base_url.as_str()
        };
        Ok(url::Url::parse(raw)?)
    }

    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.email.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "email".into(),
                message: "email must not be empty".into(),
            });
        }

        match self.parsed_base_url() {
            Ok(url) if url.cannot_be_a_base() => errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "base_url".into(),
                message: format!("{url} cannot be used as a base URL"),
            }),
            Ok(url) if url.scheme() != "https" => errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "base_url".into(),
                message: format!("{url} is not https; credentials will be sent in clear text"),
            }),
            Ok(_) => {}
            Err(e) => errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "base_url".into(),
                message: e.to_string(),
            }),
        }

        if self.timeout_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "timeout_ms".into(),
                message: "timeout must be greater than 0".into(),
            });
        }

        if self.password.is_some() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "password".into(),
                message: format!(
                    "password stored in config; prefer the {} env var",
                    self.password_env
                ),
            });
        } else if self.password_env.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "password_env".into(),
                message: "either password or password_env must be set".into(),
            });
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_password_env() -> String {
    "SWI_PASSWORD".into()
}
fn d_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn d_30000() -> u64 {
    30_000
}
