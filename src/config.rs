use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::ClientError;

const CONFIG_FILE_NAME: &str = ".plumes.toml";
const ENV_PREFIX: &str = "PLUMES";
const MASK: &str = "********";

/// OAuth 1.0a user credentials from the Twitter developer portal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
}

impl Credentials {
    /// Fails on the first credential that is blank.
    pub fn check(&self) -> std::result::Result<(), ClientError> {
        let fields = [
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("access_token", &self.access_token),
            ("access_token_secret", &self.access_token_secret),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ClientError::MissingCredentials(*name)),
            None => Ok(()),
        }
    }
}

/// Everything read from `~/.plumes.toml` and `PLUMES_*` variables. The file
/// is flat, one key per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_token_secret: String,
    /// Seconds to sleep after a rate-limit response before retrying.
    pub sleep_time: u64,
    /// Rate-limit retries per request before giving up.
    pub max_retries: u32,
    pub api_base: String,
    /// Tracing filter used when `PLUMES_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            consumer_secret: String::new(),
            access_token: String::new(),
            access_token_secret: String::new(),
            sleep_time: 900,
            max_retries: 3,
            api_base: "https://api.twitter.com/1.1".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// `~/.plumes.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Load settings from `path` (or the default location), then let
    /// `PLUMES_<FIELD>` variables such as `PLUMES_CONSUMER_KEY` or
    /// `PLUMES_SLEEP_TIME` override them. A missing default file is fine; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::layered(path, environment())
    }

    /// Settings from one TOML file, without environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        Config::builder()
            .add_source(toml_file(path).required(true))
            .build()
            .and_then(Config::try_deserialize)
            .with_context(|| format!("invalid config {}", path.display()))
    }

    fn layered(path: Option<&Path>, env: Environment) -> Result<Self> {
        let file = match path {
            Some(path) => Some(toml_file(path).required(true)),
            None => Self::default_path().map(|path| toml_file(&path).required(false)),
        };

        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(file);
        }
        builder
            .add_source(env)
            .build()
            .and_then(Config::try_deserialize)
            .context("failed to load settings")
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
            access_token: self.access_token.clone(),
            access_token_secret: self.access_token_secret.clone(),
        }
    }

    /// Copy with every non-empty secret replaced by a mask, for display.
    pub fn redacted(&self) -> Self {
        let mask = |value: &str| {
            if value.is_empty() {
                String::new()
            } else {
                MASK.to_string()
            }
        };
        Self {
            consumer_secret: mask(&self.consumer_secret),
            access_token: mask(&self.access_token),
            access_token_secret: mask(&self.access_token_secret),
            ..self.clone()
        }
    }

    /// Write a template config to `path`. Refuses to replace an existing
    /// file unless `force` is set.
    pub fn init(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            bail!(
                "{} already exists; pass --force to overwrite it",
                path.display()
            );
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let template = toml::to_string_pretty(&Settings::default())
            .context("failed to render config template")?;
        fs::write(path, template)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }
}

/// `--config` paths may have any extension, so the format is fixed.
fn toml_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}
