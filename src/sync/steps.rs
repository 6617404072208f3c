use git2::Oid;
use std::path::PathBuf;
use tracing::{debug, info};

use super::{Acquired, SyncContext};
use crate::error::{Error, Result, Step};
use crate::git::{Engine, FetchOutcome, PullOutcome};
use crate::target::SyncTarget;

/// Open the target's local clone, cloning it first if the directory is not a
/// repository yet.
pub(super) fn acquire<'t, E: Engine>(
    engine: &'t E,
    target: &'t SyncTarget,
) -> Result<(SyncContext<'t, E>, Acquired)> {
    let path = target.local_dir();
    let repository_error = |source| Error::Repository {
        step: Step::CloneOrOpen,
        path: path.to_path_buf(),
        source,
    };

    let (repo, acquired) = match engine.open(path).map_err(repository_error)? {
        Some(repo) => {
            debug!(path = %path.display(), "opened existing clone");
            (repo, Acquired::Opened)
        }
        None => {
            info!(path = %path.display(), "cloning");
            let repo = engine
                .clone_repo(target.remote(), path, target.auth())
                .map_err(repository_error)?;
            (repo, Acquired::Cloned)
        }
    };

    Ok((
        SyncContext {
            target,
            engine,
            repo,
        },
        acquired,
    ))
}

pub(super) fn fetch<E: Engine>(ctx: &SyncContext<'_, E>) -> Result<FetchOutcome> {
    let outcome = ctx
        .engine
        .fetch(&ctx.repo, ctx.target.auth())
        .map_err(|source| Error::Sync {
            step: Step::Fetch,
            source,
        })?;
    match outcome {
        FetchOutcome::UpToDate => debug!("fetch: already up to date"),
        FetchOutcome::Updated { refs, objects } => debug!(refs, objects, "fetch: updated"),
    }
    Ok(outcome)
}

/// Resolve the tag to a commit. Must run after [`fetch`] so tags created or
/// moved on the remote are visible.
pub(super) fn resolve<E: Engine>(ctx: &SyncContext<'_, E>) -> Result<Oid> {
    let tag = ctx.target.tag();
    let commit = ctx
        .engine
        .resolve_tag(&ctx.repo, tag)
        .map_err(|source| ctx.repository_error(Step::ResolveTag, source))?
        .ok_or_else(|| Error::ReferenceNotFound {
            step: Step::ResolveTag,
            tag: tag.to_string(),
        })?;
    debug!(%commit, "resolved tag");
    Ok(commit)
}

pub(super) fn open_worktree<E: Engine>(ctx: &SyncContext<'_, E>) -> Result<PathBuf> {
    ctx.engine
        .worktree(&ctx.repo)
        .map_err(|source| ctx.repository_error(Step::OpenWorktree, source))
}

pub(super) fn pull<E: Engine>(ctx: &SyncContext<'_, E>) -> Result<PullOutcome> {
    let outcome = ctx
        .engine
        .pull(&ctx.repo, ctx.target.auth())
        .map_err(|source| Error::Sync {
            step: Step::Pull,
            source,
        })?;
    if let PullOutcome::FastForwarded(tip) = outcome {
        info!(%tip, "fast-forwarded checked-out branch");
    } else {
        debug!(?outcome, "pull: nothing to merge");
    }
    Ok(outcome)
}
