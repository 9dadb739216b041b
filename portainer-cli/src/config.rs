use crate::api::{ClientOptions, DEFAULT_TIMEOUT};
use crate::cli::{GlobalArgs, env_var_name};
use crate::domain::{Credentials, validate_endpoint_id};
use crate::error::Error;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "1";
const CONFIG_DIR: &str = "portainer-api-cli";
const CONFIG_FILE: &str = "config.toml";

// ---------------------------------------------------------------------------
// File config  (~/.config/portainer-api-cli/config.toml, .portainer-api-cli/config.toml)
// ---------------------------------------------------------------------------

/// ```toml
/// url = "https://portainer.example.com"
/// username = "admin"
/// endpoint = "2"
/// timeout_secs = 60
/// ```
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    pub insecure_tls: Option<bool>,
}

/// Local values win field by field.
pub fn merge_file_config(global: FileConfig, local: FileConfig) -> FileConfig {
    FileConfig {
        url: local.url.or(global.url),
        username: local.username.or(global.username),
        password: local.password.or(global.password),
        endpoint: local.endpoint.or(global.endpoint),
        timeout_secs: local.timeout_secs.or(global.timeout_secs),
        insecure_tls: local.insecure_tls.or(global.insecure_tls),
    }
}

pub struct ConfigStore {
    local_root: PathBuf,
    global_root: Option<PathBuf>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self {
            local_root: PathBuf::from(format!(".{CONFIG_DIR}")),
            global_root: default_global_root(),
        }
    }

    pub fn with_roots(local_root: impl Into<PathBuf>, global_root: Option<PathBuf>) -> Self {
        Self {
            local_root: local_root.into(),
            global_root,
        }
    }

    pub fn load_effective(&self) -> Result<FileConfig> {
        let global = match self.global_config_path() {
            Some(path) => load_file_config(&path)?,
            None => FileConfig::default(),
        };
        let local = load_file_config(&self.local_config_path())?;
        Ok(merge_file_config(global, local))
    }

    pub fn local_config_path(&self) -> PathBuf {
        self.local_root.join(CONFIG_FILE)
    }

    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_root.as_ref().map(|p| p.join(CONFIG_FILE))
    }
}

fn default_global_root() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(Path::new(&home).join(".config").join(CONFIG_DIR))
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

// ---------------------------------------------------------------------------
// Effective settings
// ---------------------------------------------------------------------------

/// Connection settings after flags/env have been laid over the config files.
pub struct Settings {
    pub url: String,
    pub username: String,
    pub password: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub insecure_tls: bool,
}

impl Settings {
    pub fn resolve(args: &GlobalArgs, file: FileConfig) -> Result<Self> {
        let url = pick(args.portainerurl.clone(), file.url, "portainerurl", "url")?;
        let username = pick(args.username.clone(), file.username, "username", "username")?;
        let password = pick(args.password.clone(), file.password, "password", "password")?;

        let endpoint = non_empty(args.endpoint.clone())
            .or(non_empty(file.endpoint))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        validate_endpoint_id(&endpoint)?;

        let timeout = match args.timeout.or(file.timeout_secs) {
            Some(0) => {
                return Err(Error::Validation("timeout must be at least 1 second".to_string()).into());
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            url: url.trim().trim_end_matches('/').to_string(),
            username,
            password,
            endpoint,
            timeout,
            insecure_tls: args.insecure_tls.or(file.insecure_tls).unwrap_or(false),
        })
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            base_url: self.url.clone(),
            timeout: self.timeout,
            insecure_tls: self.insecure_tls,
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("insecure_tls", &self.insecure_tls)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn pick(flag: Option<String>, file: Option<String>, flag_name: &str, key: &str) -> Result<String> {
    non_empty(flag).or(non_empty(file)).ok_or_else(|| {
        Error::Validation(format!(
            "missing {flag_name}; pass --{flag_name}, set {} or add `{key}` to the config file",
            env_var_name(flag_name, &[])
        ))
        .into()
    })
}
