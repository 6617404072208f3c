mod jobs;
mod progress;

use anyhow::{Result, anyhow};
use indicatif::{MultiProgress, ProgressBar};
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::config::load_config;
use crate::git::Git2Engine;
use crate::paths::paths;
use crate::sync::SyncReport;
use crate::target::SyncTarget;

pub use jobs::{SyncJob, build_jobs};
use progress::{err_style, ok_style, spinner_style, summarize};

/// Build the target for `job` and run one attempt.
fn run_job(job: &SyncJob, home: &Path, root: &Path) -> Result<SyncReport> {
    let creds = job.target.credentials(home)?;
    let mut target =
        SyncTarget::with_credentials(&job.target.remote, &job.target.tag, &creds)?.rooted_at(root);
    Ok(target.sync_with(&Git2Engine)?)
}

/// Synchronize every target defined in `config.toml`.
///
/// High-level flow:
/// 1. Load configuration and build one job per distinct local directory
///    (see [`jobs::build_jobs`]).
/// 2. Run the jobs **in parallel** on a pool of `jobs` threads, one spinner
///    per target.
/// 3. Report each failure on its target's line and keep going with the rest.
///
/// # Errors
/// Returns an error if the configuration cannot be loaded, or if any target
/// failed to synchronize.
pub fn cmd_sync() -> Result<()> {
    let p = paths()?;
    let cfg = load_config()?;
    if cfg.targets.is_empty() {
        eprintln!("no targets in {}", p.config.display());
        return Ok(());
    }

    let root = cfg.root(&p);
    fs::create_dir_all(&root)?;
    let jobs = build_jobs(&cfg, &root);

    let mp = MultiProgress::new();
    let run_style = spinner_style();
    let done_style = ok_style();
    let fail_style = err_style();

    let mut bars: Vec<ProgressBar> = Vec::with_capacity(jobs.len());
    for j in &jobs {
        let pb = mp.add(ProgressBar::new_spinner());
        pb.set_style(run_style.clone());
        pb.set_message(format!("syncing {}", j.display));
        pb.enable_steady_tick(Duration::from_millis(80));
        bars.push(pb);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(cfg.jobs())
        .build()?;

    let failed: usize = pool.install(|| {
        jobs.par_iter()
            .enumerate()
            .map(|(idx, job)| {
                let pb = &bars[idx];
                match run_job(job, &p.home, &root) {
                    Ok(report) => {
                        pb.set_style(done_style.clone());
                        pb.finish_with_message(summarize(&job.display, &report));
                        0
                    }
                    Err(e) => {
                        pb.set_style(fail_style.clone());
                        pb.finish_with_message(format!("syncing {} (error: {:#})", job.display, e));
                        1
                    }
                }
            })
            .sum()
    });

    if failed > 0 {
        return Err(anyhow!("{} of {} targets failed", failed, jobs.len()));
    }
    Ok(())
}
