mod edit;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::credentials::Credentials;
use crate::paths::{Paths, paths};

pub use edit::cmd_edit;

/// Top-level configuration structure loaded from `config.toml`.
///
/// Example TOML:
/// ```toml
/// root = "/srv/snapshots"
/// jobs = 4
///
/// [[targets]]
/// remote   = "git@github.com:org/deploy-config.git"
/// tag      = "v1.4.2"
/// key_file = "keys/deploy"
/// password_env = "DEPLOY_KEY_PASSPHRASE"
///
/// [[targets]]
/// remote = "https://example.com/org/repo"
/// tag    = "v1.0.0"
/// ```
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Directory the `<remote>-<tag>` clones are placed under. Relative paths
    /// are taken from the tagsync home.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Number of targets synchronized at once.
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub targets: Vec<Target>,
}

/// A single `[[targets]]` entry.
#[derive(Debug, Deserialize, Clone)]
pub struct Target {
    pub remote: String,
    pub tag: String,
    #[serde(default)]
    pub user: Option<String>,
    /// Password, or passphrase of `key_file`.
    #[serde(default)]
    pub password: Option<String>,
    /// Environment variable holding the password; wins over `password`.
    #[serde(default)]
    pub password_env: Option<String>,
    /// Private key file. Relative paths are taken from the tagsync home.
    #[serde(default)]
    pub key_file: Option<PathBuf>,
    #[serde(default)]
    pub name: Option<String>,
}

impl Config {
    /// Directory clones are placed under. Relative `root` values are taken
    /// from the tagsync home; without one, clones go to `repos/`.
    pub fn root(&self, paths: &Paths) -> PathBuf {
        match &self.root {
            Some(r) => paths.home.join(r),
            None => paths.repos.clone(),
        }
    }

    pub fn jobs(&self) -> usize {
        self.jobs.filter(|n| *n > 0).unwrap_or_else(num_cpus::get)
    }
}

impl Target {
    pub fn display(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}@{}", self.remote, self.tag))
    }

    /// Gather credential inputs, reading `password_env` and `key_file`.
    ///
    /// # Errors
    /// - `password_env` names a variable that is not set.
    /// - `key_file` cannot be read.
    pub fn credentials(&self, home: &Path) -> Result<Credentials> {
        let password = match &self.password_env {
            Some(var) => Some(
                env::var(var).with_context(|| format!("environment variable {} not set", var))?,
            ),
            None => self.password.clone(),
        };
        let private_key = match &self.key_file {
            Some(p) => {
                let path = home.join(p);
                Some(
                    fs::read(&path)
                        .with_context(|| format!("failed to read key {}", path.display()))?,
                )
            }
            None => None,
        };
        Ok(Credentials::new(self.user.clone(), password, private_key))
    }
}

/// Parse configuration text.
pub fn parse_config(txt: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(txt).context("failed to parse config.toml")?;
    if let Some(t) = cfg
        .targets
        .iter()
        .find(|t| t.remote.trim().is_empty() || t.tag.trim().is_empty())
    {
        return Err(anyhow!(
            "target `{}` needs both `remote` and `tag`",
            t.display()
        ));
    }
    Ok(cfg)
}

/// Load and parse `config.toml` from the tagsync home.
///
/// # Errors
/// - The file cannot be read; the message includes the resolved path.
/// - The TOML is invalid or a target lacks `remote`/`tag`.
pub fn load_config() -> Result<Config> {
    let p = paths()?;
    let txt = fs::read_to_string(&p.config)
        .with_context(|| format!("config not found: {}", p.config.display()))?;
    parse_config(&txt)
}
