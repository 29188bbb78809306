use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;
use giam_core::{Credential, DEFAULT_BASE_URL};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;

pub const DEFAULT_CREDENTIAL: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub base_url: Option<String>,
    /// Credential used when a manifest entry names none.
    pub credential: Option<String>,
    pub format: Option<String>,
}

impl ProfileConfig {
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "base_url" => self.base_url = Some(value.to_string()),
            "credential" => self.credential = Some(value.to_string()),
            "format" => {
                <OutputFormat as ValueEnum>::from_str(value, true)
                    .map_err(|e| anyhow::anyhow!("Invalid format '{value}': {e}"))?;
                self.format = Some(value.to_string());
            }
            other => {
                anyhow::bail!("Unknown config key: {other}. Valid keys: base_url, credential, format")
            }
        }
        Ok(())
    }
}

pub type ConfigFile = BTreeMap<String, ProfileConfig>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCredential {
    pub token: String,
}

pub type CredentialsFile = BTreeMap<String, StoredCredential>;

/// `config.toml` and `credentials.toml` under one directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.giam`
    pub fn default_location() -> Result<Self> {
        let dir = dirs::home_dir()
            .context("Cannot determine home directory")?
            .join(".giam");
        Ok(Self::new(dir))
    }

    fn config_path(&self) -> PathBuf {
        self.dir.join("config.toml")
    }

    fn credentials_path(&self) -> PathBuf {
        self.dir.join("credentials.toml")
    }

    pub fn load_all(&self) -> Result<ConfigFile> {
        read_toml(&self.config_path())
    }

    pub fn load_profile(&self, profile: &str) -> Result<ProfileConfig> {
        Ok(self.load_all()?.remove(profile).unwrap_or_default())
    }

    pub fn save_profile(&self, profile: &str, config: &ProfileConfig) -> Result<()> {
        let mut all = self.load_all()?;
        all.insert(profile.to_string(), config.clone());
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let content = toml::to_string_pretty(&all)?;
        fs::write(self.config_path(), content)?;
        Ok(())
    }

    pub fn load_credentials(&self) -> Result<CredentialsFile> {
        read_toml(&self.credentials_path())
    }
}

fn read_toml<T: Default + DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))
}

/// 1. `--base-url` / `GIAM_BASE_URL`, 2. profile, 3. the public endpoint.
pub fn resolve_base_url(cli_base_url: Option<&str>, profile: &ProfileConfig) -> String {
    cli_base_url
        .map(str::to_string)
        .or_else(|| profile.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Turns credential names into tokens.
#[derive(Debug, Clone)]
pub struct CredentialResolver {
    override_token: Option<String>,
    default_name: String,
    stored: CredentialsFile,
}

impl CredentialResolver {
    pub fn new(
        override_token: Option<String>,
        profile: &ProfileConfig,
        stored: CredentialsFile,
    ) -> Self {
        Self {
            override_token,
            default_name: profile
                .credential
                .clone()
                .unwrap_or_else(|| DEFAULT_CREDENTIAL.to_string()),
            stored,
        }
    }

    /// `--token` wins; otherwise the named (or profile default) stored credential.
    pub fn resolve(&self, name: Option<&str>) -> Result<Credential> {
        if let Some(token) = &self.override_token {
            return Ok(Credential::bearer(token.clone()));
        }
        let name = name.unwrap_or(self.default_name.as_str());
        self.stored
            .get(name)
            .map(|c| Credential::bearer(c.token.clone()))
            .with_context(|| {
                format!(
                    "No credential named '{name}'. Add it to ~/.giam/credentials.toml or pass --token"
                )
            })
    }
}
