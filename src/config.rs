//! Process configuration.
//!
//! Everything the client reads from the environment is captured once in a
//! [`Settings`] snapshot; adapters receive explicit [`TransportConfig`] and
//! [`Credentials`] values derived from it instead of consulting globals.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::ErrorContext;
use crate::registry::ClientDescriptor;
use crate::{Error, Result};

pub const ACCESS_KEY_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const DEBUG_VAR: &str = "DEBUG";
pub const PROXY_VAR: &str = "C2_PROXY_URL";
pub const TIMEOUT_VAR: &str = "C2_HTTP_TIMEOUT_SECS";

/// Region reported to every service; the cloud has a single tenant region.
pub const REGION: &str = "croc";

/// Snapshot of the environment variables the client understands.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    vars: HashMap<String, String>,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of a variable; empty values count as unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    /// Value of a variable the client cannot run without.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| {
            Error::configuration_with_context(
                format!("environment variable {} is not set", key),
                ErrorContext::new()
                    .with_field_path(key)
                    .with_source("settings"),
            )
        })
    }

    /// Endpoint URL for a service, validated as an absolute http(s) URL.
    pub fn endpoint(&self, descriptor: &ClientDescriptor) -> Result<url::Url> {
        let raw = self.require(descriptor.url_key)?;
        let invalid = |details: String| {
            Error::configuration_with_context(
                format!("invalid endpoint URL '{}'", raw),
                ErrorContext::new()
                    .with_field_path(descriptor.url_key)
                    .with_details(details)
                    .with_source("settings"),
            )
        };
        let url = url::Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(url),
            scheme => Err(invalid(format!("unsupported scheme '{}'", scheme))),
        }
    }

    pub fn credentials(&self) -> Result<Credentials> {
        Ok(Credentials {
            access_key: self.require(ACCESS_KEY_VAR)?.to_string(),
            secret_key: self.require(SECRET_KEY_VAR)?.to_string(),
        })
    }

    /// Verbose transport logging, switched on by any non-empty `DEBUG`.
    pub fn debug(&self) -> bool {
        self.get(DEBUG_VAR).is_some()
    }

    pub fn proxy(&self) -> Option<&str> {
        self.get(PROXY_VAR)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.get(TIMEOUT_VAR)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Transport configuration for one invocation.
    pub fn transport_config(&self, verify_tls: bool) -> TransportConfig {
        TransportConfig {
            verify_tls,
            num_retries: 0,
            timeout: self.timeout(),
            proxy: self.proxy().map(str::to_string),
        }
    }
}

/// Access key pair used to sign requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Explicit transport settings handed to adapter constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub verify_tls: bool,
    /// Always zero: failed requests are reported, never repeated.
    pub num_retries: u32,
    pub timeout: Option<Duration>,
    pub proxy: Option<String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            verify_tls: true,
            num_retries: 0,
            timeout: None,
            proxy: None,
        }
    }
}
