use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::credentials::Credentials;
use crate::target::SyncTarget;

/// Arguments for a one-shot synchronization.
#[derive(Debug, Default)]
pub struct InitArgs {
    pub remote: String,
    pub tag: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub password_env: Option<String>,
    pub key: Option<PathBuf>,
    pub root: Option<PathBuf>,
}

impl InitArgs {
    fn credentials(&self) -> Result<Credentials> {
        let password = match &self.password_env {
            Some(var) => Some(
                env::var(var).with_context(|| format!("environment variable {} not set", var))?,
            ),
            None => self.password.clone(),
        };
        let private_key = match &self.key {
            Some(path) => Some(
                fs::read(path).with_context(|| format!("failed to read key {}", path.display()))?,
            ),
            None => None,
        };
        Ok(Credentials::new(self.user.clone(), password, private_key))
    }
}

/// Synchronize a single `(remote, tag)` pair and print its local directory.
///
/// The clone lands at `<remote>-<tag>` relative to the current directory, or
/// under `--root` when given.
///
/// # Errors
/// Returns an error if the credentials cannot be read or resolved, or if any
/// synchronization step fails.
pub fn cmd_init(args: &InitArgs) -> Result<()> {
    let creds = args.credentials()?;
    let mut target = SyncTarget::with_credentials(&args.remote, &args.tag, &creds)?;
    if let Some(root) = &args.root {
        target = target.rooted_at(root);
    }

    target
        .init()
        .with_context(|| format!("failed to sync {} at {}", args.remote, args.tag))?;
    println!("{}", target.local_dir().display());
    Ok(())
}
