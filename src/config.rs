//! # Configuration Module
//!
//! Application configuration loaded from `config.yaml`. Each route declares
//! its CORS policy at controller and action level.
//!
//! ## Example
//!
//! ```yaml
//! x_forwarded_protocol: https      # trust the proxy: every request is secure
//!
//! routes:
//!   - handler: list_pets
//!     controller:                  # class-level declaration
//!       allow_origin: https://app.example.com
//!       max_age: 600
//!     action:                      # method-level declaration, wins per field
//!       expose_headers: X-Total-Count
//!     allowed_methods: [GET, OPTIONS]
//!     session_free: true
//!     express: true
//!     interceptors: [audit]
//!   - handler: admin_settings
//!     action:
//!       disable: true
//!     csrf: true
//! ```
//!
//! ## Environment Variables
//!
//! - `ACTD_X_FORWARDED_PROTOCOL` overrides `x_forwarded_protocol`.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::cors::{CorsDeclaration, CorsSpec};
use crate::csrf::CsrfSpec;
use crate::request::parse_method;

/// Configuration loading error
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The config file is not valid YAML for [`AppConfig`]
    Parse { message: String },
    /// A route declaration cannot be turned into a handler
    InvalidRoute { handler: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read config '{}': {}", path.display(), source)
            }
            ConfigError::Parse { message } => write!(f, "Invalid config: {}", message),
            ConfigError::InvalidRoute { handler, reason } => {
                write!(f, "Invalid route '{}': {}", handler, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Forwarded protocol the deployment trusts; `https` marks every request secure
    pub x_forwarded_protocol: Option<String>,
    /// Route declarations in registration order
    pub routes: Vec<RouteConfig>,
}

impl AppConfig {
    /// Load from a YAML file, then apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&raw)?.with_env_overrides();
        info!(
            path = %path.display(),
            routes = config.routes.len(),
            "Config loaded"
        );
        Ok(config)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(raw).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(proto) = env::var("ACTD_X_FORWARDED_PROTOCOL") {
            self.x_forwarded_protocol = Some(proto);
        }
        self
    }
}

/// CORS and session policy declared for one route
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Handler name the route dispatches to
    pub handler: String,
    /// Controller (class) level CORS declaration
    pub controller: CorsDeclaration,
    /// Action (method) level CORS declaration
    pub action: CorsDeclaration,
    /// Methods advertised in `Access-Control-Allow-Methods`; must not be empty if present
    pub allowed_methods: Option<Vec<String>>,
    pub session_free: bool,
    pub express: bool,
    pub csrf: bool,
    pub csrf_header: Option<String>,
    /// Registered after-interceptor names attached to this route
    pub interceptors: Vec<String>,
}

impl RouteConfig {
    fn invalid(&self, reason: String) -> ConfigError {
        ConfigError::InvalidRoute {
            handler: self.handler.clone(),
            reason,
        }
    }

    /// Resolve the route's CORS spec: controller then action declarations
    /// folded, chained after the allowed-methods spec when one is declared.
    pub fn cors_spec(&self) -> Result<CorsSpec, ConfigError> {
        let declared = CorsSpec::fold([&self.controller, &self.action]);
        let Some(names) = &self.allowed_methods else {
            return Ok(declared);
        };
        let methods = names
            .iter()
            .map(|n| parse_method(n.as_str()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| self.invalid(e.to_string()))?;
        let methods_spec =
            CorsSpec::for_methods(&methods).map_err(|e| self.invalid(e.to_string()))?;
        Ok(methods_spec.chain(&declared))
    }

    #[must_use]
    pub fn csrf_spec(&self) -> CsrfSpec {
        if self.csrf {
            CsrfSpec::enabled(self.csrf_header.as_deref())
        } else {
            CsrfSpec::DUMB
        }
    }
}
