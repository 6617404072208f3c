use anyhow::Result;
use colored::Colorize;
use git2::{ErrorCode, Repository};
use std::path::Path;

use crate::batch::build_jobs;
use crate::config::load_config;
use crate::paths::paths;
use crate::url::RemoteUrl;

/// State of a target's local directory, for display.
#[derive(Debug, PartialEq, Eq)]
enum Local {
    Missing,
    Cloned { head: String },
    Broken(String),
}

fn inspect(dir: &Path) -> Local {
    match Repository::open(dir) {
        Ok(repo) => match repo.head().and_then(|h| h.peel_to_commit()) {
            Ok(c) => {
                let id = c.id().to_string();
                Local::Cloned {
                    head: id[..7].to_string(),
                }
            }
            Err(e) => Local::Broken(e.message().to_string()),
        },
        Err(e) if e.code() == ErrorCode::NotFound => Local::Missing,
        Err(e) => Local::Broken(e.message().to_string()),
    }
}

/// CLI command: print the configured targets and the state of their clones.
///
/// Example output:
/// ```text
/// - deploy (github.com/org/deploy @ v1.4.2) cloned 1a2b3c4
///     /home/me/.config/tagsync/repos/git@github.com:org/deploy.git-v1.4.2
/// - https://example.com/org/repo@v1.0.0 (example.com/org/repo @ v1.0.0) missing
///     /home/me/.config/tagsync/repos/https://example.com/org/repo-v1.0.0
/// ```
///
/// # Errors
/// Returns an error if `config.toml` cannot be loaded or parsed.
pub fn cmd_list() -> Result<()> {
    let p = paths()?;
    let cfg = load_config()?;
    let root = cfg.root(&p);

    for job in build_jobs(&cfg, &root) {
        let source = RemoteUrl::parse(&job.target.remote)
            .map(|u| u.display())
            .unwrap_or_else(|| job.target.remote.clone());
        let state = match inspect(&job.local_dir) {
            Local::Missing => "missing".yellow().to_string(),
            Local::Cloned { head } => format!("{} {}", "cloned".green(), head),
            Local::Broken(msg) => format!("{} ({})", "broken".red(), msg),
        };
        println!(
            "- {} ({} @ {}) {}",
            job.display.bold(),
            source,
            job.target.tag,
            state
        );
        println!("    {}", job.local_dir.display());
    }
    Ok(())
}
