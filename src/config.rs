//! `.cloudy_config` loading.
//!
//! The config file names environment variables rather than holding secrets:
//!
//! ```json
//! {
//!   "auth": {
//!     "default_alias": "prod",
//!     "aliases": {
//!       "prod": {
//!         "type": "basic",
//!         "credentials": {
//!           "username": "PROD_USERNAME",
//!           "password": "PROD_PASSWORD",
//!           "security_token": "PROD_SECURITY_TOKEN"
//!         }
//!       },
//!       "uat": { "type": "basic", "sandbox": true, "credentials": { ... } }
//!     }
//!   },
//!   "sobjects": ["Account", "Contact"],
//!   "output_dir": "src/sobjects"
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use cloudy_sf_auth::{UsernamePasswordLogin, PRODUCTION_LOGIN_URL, SANDBOX_LOGIN_URL};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = ".cloudy_config";

/// Alias name that resolves to `auth.default_alias`.
pub const DEFAULT_ALIAS: &str = "default";

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for config operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Cannot read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Invalid config JSON: {0}")]
    Json(String),

    #[error("Config has no auth section")]
    MissingAuth,

    #[error("Alias \"default\" requested but auth.default_alias is not set")]
    NoDefaultAlias,

    #[error("Unknown alias: {0}")]
    UnknownAlias(String),

    #[error("Auth type not supported yet: {0}")]
    UnsupportedAuthType(String),

    #[error("Environment variable not set: {0}")]
    MissingEnvVar(String),
}

/// Parsed `.cloudy_config`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudyConfig {
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub sobjects: Vec<String>,
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    pub default_alias: Option<String>,
    #[serde(default)]
    pub aliases: BTreeMap<String, AliasConfig>,
}

/// One named org connection.
#[derive(Debug, Clone, Deserialize)]
pub struct AliasConfig {
    #[serde(rename = "type")]
    pub auth_type: String,
    #[serde(default)]
    pub sandbox: bool,
    /// Overrides the production/sandbox login host, e.g. a My Domain URL.
    pub login_url: Option<String>,
    pub api_version: Option<String>,
    pub credentials: CredentialVars,
}

impl AliasConfig {
    /// Login host for this alias.
    pub fn login_url(&self) -> &str {
        match &self.login_url {
            Some(url) => url.as_str(),
            None if self.sandbox => SANDBOX_LOGIN_URL,
            None => PRODUCTION_LOGIN_URL,
        }
    }
}

/// Names of the environment variables holding the login secrets.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialVars {
    pub username: String,
    pub password: String,
    pub security_token: String,
}

impl CloudyConfig {
    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::with_source(
                ErrorKind::Io {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                },
                e,
            )
        })?;
        debug!(path = %path.display(), "loaded config");
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| Error::with_source(ErrorKind::Json(e.to_string()), e))
    }

    /// Resolve an alias name, mapping `"default"` to `auth.default_alias`.
    pub fn alias(&self, name: &str) -> Result<(&str, &AliasConfig)> {
        let auth = self
            .auth
            .as_ref()
            .ok_or_else(|| Error::new(ErrorKind::MissingAuth))?;

        let resolved = if name == DEFAULT_ALIAS {
            auth.default_alias
                .as_deref()
                .ok_or_else(|| Error::new(ErrorKind::NoDefaultAlias))?
        } else {
            name
        };

        auth.aliases
            .get_key_value(resolved)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| Error::new(ErrorKind::UnknownAlias(resolved.to_string())))
    }

    /// Build the login for an alias from the process environment.
    pub fn login(&self, alias: &str) -> Result<UsernamePasswordLogin> {
        self.login_with(alias, |name| std::env::var(name).ok())
    }

    /// Build the login for an alias, looking secrets up with `lookup`.
    pub fn login_with(
        &self,
        alias: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<UsernamePasswordLogin> {
        let (resolved, entry) = self.alias(alias)?;

        if entry.auth_type != "basic" {
            return Err(Error::new(ErrorKind::UnsupportedAuthType(
                entry.auth_type.clone(),
            )));
        }

        let var = |name: &str| {
            lookup(name).ok_or_else(|| Error::new(ErrorKind::MissingEnvVar(name.to_string())))
        };
        let vars = &entry.credentials;
        let mut login = UsernamePasswordLogin::new(
            var(&vars.username)?,
            var(&vars.password)?,
            var(&vars.security_token)?,
        )
        .with_login_url(entry.login_url());

        if let Some(version) = &entry.api_version {
            login = login.with_api_version(version);
        }

        debug!(alias = resolved, login_url = entry.login_url(), "resolved alias");
        Ok(login)
    }
}
