use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::{Config, Target};
use crate::target::local_dir_name;

/// One configured target to synchronize.
#[derive(Clone, Debug)]
pub struct SyncJob {
    pub display: String,
    pub target: Target,
    pub local_dir: PathBuf,
}

/// Build synchronization jobs from the parsed configuration.
///
/// Targets are placed under `root`. Two entries that derive the same local
/// directory would race on it, so only the first one is kept and the rest
/// are reported and skipped.
pub fn build_jobs(cfg: &Config, root: &Path) -> Vec<SyncJob> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut jobs: Vec<SyncJob> = Vec::new();

    for t in &cfg.targets {
        let local_dir = root.join(local_dir_name(&t.remote, &t.tag));
        if !seen.insert(local_dir.clone()) {
            warn!(
                remote = %t.remote,
                tag = %t.tag,
                "duplicate target skipped; it shares {}",
                local_dir.display()
            );
            continue;
        }
        jobs.push(SyncJob {
            display: t.display(),
            target: t.clone(),
            local_dir,
        });
    }

    jobs
}
