use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::errors::ProviderError;

const MOODKIN_CONFIG: &str = "MOODKIN_CONFIG";

/// Raw contents of `moodkin.toml`; everything optional so env vars can fill gaps.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    pub oauth_url: Option<String>,
    pub api_url: Option<String>,
    pub files_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
    pub image_dir: Option<String>,
    pub base_url: Option<String>,
    #[serde(default = "default_model")]
    pub model: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: Option<bool>,
}

fn default_model() -> Option<String> {
    Some("GigaChat".to_string())
}
fn default_timeout_secs() -> Option<u64> {
    Some(30)
}
fn default_accept_invalid_certs() -> Option<bool> {
    Some(false)
}

/// Everything the Provider client needs to talk to the outside world.
#[derive(Clone)]
pub struct ProviderConfig {
    pub oauth_url: String,
    pub api_url: String,
    /// Download URL with a `%s` placeholder for the image id.
    pub files_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub image_dir: PathBuf,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub accept_invalid_certs: bool,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("oauth_url", &self.oauth_url)
            .field("api_url", &self.api_url)
            .field("files_url", &self.files_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .field("image_dir", &self.image_dir)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

impl ProviderConfig {
    /// Reads the config file (explicit path, `MOODKIN_CONFIG`, or the default
    /// location) and layers `MOODKIN_*` environment variables on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ProviderError> {
        let file = match path
            .map(Path::to_path_buf)
            .or_else(|| env::var(MOODKIN_CONFIG).ok().map(PathBuf::from))
        {
            Some(explicit) => read_config_file(&explicit)?,
            None => {
                let default_path = get_moodkin_config_path();
                if default_path.exists() {
                    read_config_file(&default_path)?
                } else {
                    debug!("No config file at {}, using environment only", default_path.display());
                    ConfigFile::default()
                }
            }
        };
        Self::from_sources(file, |key| env::var(key).ok())
    }

    /// Merges a parsed file with an environment lookup; the environment wins.
    pub fn from_sources<F>(file: ConfigFile, lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();
        let mut required = |value: Option<String>, var: &str, key: &str| -> String {
            match lookup(var).or(value).filter(|v| !v.trim().is_empty()) {
                Some(v) => v,
                None => {
                    missing.push(key.to_string());
                    String::new()
                }
            }
        };

        let oauth_url = required(file.oauth_url, "MOODKIN_OAUTH_URL", "oauth_url");
        let api_url = required(file.api_url, "MOODKIN_API_URL", "api_url");
        let files_url = required(file.files_url, "MOODKIN_FILES_URL", "files_url");
        let client_id = required(file.client_id, "MOODKIN_CLIENT_ID", "client_id");
        let client_secret = required(file.client_secret, "MOODKIN_CLIENT_SECRET", "client_secret");
        let scope = required(file.scope, "MOODKIN_SCOPE", "scope");
        let image_dir = required(file.image_dir, "MOODKIN_IMAGE_DIR", "image_dir");
        let base_url = required(file.base_url, "MOODKIN_BASE_URL", "base_url");

        if !missing.is_empty() {
            return Err(ProviderError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        let model = lookup("MOODKIN_MODEL")
            .or(file.model)
            .or_else(default_model)
            .unwrap_or_default();
        let timeout_secs = match lookup("MOODKIN_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ProviderError::Config(format!("MOODKIN_TIMEOUT_SECS: {}", e))
            })?,
            None => file.timeout_secs.or_else(default_timeout_secs).unwrap_or(30),
        };
        let accept_invalid_certs = match lookup("MOODKIN_ACCEPT_INVALID_CERTS") {
            Some(raw) => raw.parse::<bool>().map_err(|e| {
                ProviderError::Config(format!("MOODKIN_ACCEPT_INVALID_CERTS: {}", e))
            })?,
            None => file
                .accept_invalid_certs
                .or_else(default_accept_invalid_certs)
                .unwrap_or(false),
        };

        let config = ProviderConfig {
            oauth_url,
            api_url,
            files_url,
            client_id,
            client_secret,
            scope,
            image_dir: PathBuf::from(image_dir),
            base_url,
            model,
            timeout: Duration::from_secs(timeout_secs),
            accept_invalid_certs,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ProviderError> {
        for (key, value) in [
            ("oauth_url", &self.oauth_url),
            ("api_url", &self.api_url),
            ("base_url", &self.base_url),
        ] {
            Url::parse(value)
                .map_err(|e| ProviderError::Config(format!("{} is not a valid URL: {}", key, e)))?;
        }
        if !self.files_url.contains("%s") {
            return Err(ProviderError::Config(
                "files_url must contain a %s placeholder for the image id".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ProviderError::Config("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn files_url_for(&self, image_id: &str) -> String {
        self.files_url.replacen("%s", image_id, 1)
    }
}

fn get_moodkin_config_path() -> PathBuf {
    let mut path = config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("moodkin");
    path.push("moodkin.toml");
    path
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ProviderError> {
    info!("Loading config from {}", path.display());
    let content = fs::read_to_string(path)
        .map_err(|e| ProviderError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| ProviderError::Config(format!("cannot parse {}: {}", path.display(), e)))
}
