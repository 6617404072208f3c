use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::Command;

use crate::paths::paths;

/// Starter file written when `tagsync edit` finds no config.
const TEMPLATE: &str = r#"# tagsync configuration
#
# root = "repos"
# jobs = 4
#
# [[targets]]
# remote = "git@github.com:org/repo.git"
# tag = "v1.0.0"
# key_file = "keys/deploy"
# password_env = "DEPLOY_KEY_PASSPHRASE"
"#;

/// Open `config.toml` in `$EDITOR`, creating a commented template first if the
/// file does not exist.
pub fn cmd_edit() -> Result<()> {
    let p = paths()?;
    let config_path = p.config;
    if !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&config_path, TEMPLATE)
            .with_context(|| format!("failed to create {}", config_path.display()))?;
    }

    // EDITOR, else vim
    let editor_env = env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());

    let mut cmd = Command::new(&editor_env);
    cmd.arg(&config_path);

    // vim: -n, no swap file
    if is_vim(&editor_env) {
        cmd.arg("-n");
    }

    let err = cmd.exec();
    Err(err).context(format!("failed to launch editor: {}", editor_env))
}

fn is_vim(editor: &str) -> bool {
    Path::new(editor)
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase().contains("vim"))
        .unwrap_or(false)
}
