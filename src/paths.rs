use anyhow::Result;
use std::{env, path::PathBuf};

#[derive(Clone, Debug)]
pub struct Paths {
    pub home: PathBuf,
    pub repos: PathBuf,
    pub config: PathBuf,
}

/// `$XDG_CONFIG_HOME/tagsync`, falling back to `$HOME/.config/tagsync`.
pub fn tagsync_home() -> Result<PathBuf> {
    let xdg = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty());
    let base = match xdg {
        Some(x) => PathBuf::from(x),
        None => {
            let home = env::var_os("HOME")
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow::anyhow!("neither XDG_CONFIG_HOME nor HOME is set"))?;
            PathBuf::from(home).join(".config")
        }
    };
    Ok(base.join("tagsync"))
}

impl Paths {
    /// Layout under an explicit home directory.
    pub fn under(home: PathBuf) -> Self {
        Paths {
            repos: home.join("repos"),
            config: home.join("config.toml"),
            home,
        }
    }
}

pub fn paths() -> Result<Paths> {
    Ok(Paths::under(tagsync_home()?))
}
