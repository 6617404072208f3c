//! Git integration layer.
//!
//! The synchronization state machine talks to version control only through
//! the [`Engine`] trait. The production implementation lives in
//! `git2_backend` and is re-exported as [`Git2Engine`]; everything else in the
//! crate sees the operations below and their documented outcomes, never
//! `git2::Repository` itself.

mod git2_backend;

use std::path::{Path, PathBuf};

use git2::Oid;

use crate::credentials::Auth;

pub use git2_backend::Git2Engine;

/// Name of the remote every managed clone fetches from.
pub const DEFAULT_REMOTE: &str = "origin";

/// Result of a fetch that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Nothing new on the remote.
    UpToDate,
    /// Refs moved or objects arrived.
    Updated { refs: usize, objects: usize },
}

/// Result of a pull that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PullOutcome {
    /// HEAD is detached (pinned to a tag); there is no branch to advance.
    Detached,
    /// HEAD is on a branch without an upstream.
    NoUpstream,
    /// The branch already contains its upstream.
    UpToDate,
    /// The branch and working tree moved forward to the upstream tip.
    FastForwarded(Oid),
}

/// Version-control operations the synchronization steps rely on.
///
/// Every method returns `git2::Error` for failures; the "expected" negative
/// outcomes (not a repository, tag not found, unborn HEAD) are modelled as
/// `None` so callers cannot confuse them with real failures.
pub trait Engine {
    type Handle;

    /// Open `path` as an existing repository. `Ok(None)` when `path` does
    /// not exist or is not a repository.
    fn open(&self, path: &Path) -> Result<Option<Self::Handle>, git2::Error>;

    /// Clone `url` into `path`, creating it if needed.
    fn clone_repo(&self, url: &str, path: &Path, auth: &Auth) -> Result<Self::Handle, git2::Error>;

    /// Fetch branches and tags from [`DEFAULT_REMOTE`].
    fn fetch(&self, repo: &Self::Handle, auth: &Auth) -> Result<FetchOutcome, git2::Error>;

    /// Commit the tag `name` points at, or `None` if there is no such tag.
    fn resolve_tag(&self, repo: &Self::Handle, name: &str) -> Result<Option<Oid>, git2::Error>;

    /// Working directory of the repository.
    fn worktree(&self, repo: &Self::Handle) -> Result<PathBuf, git2::Error>;

    /// Commit HEAD points at, or `None` while HEAD is unborn.
    fn head(&self, repo: &Self::Handle) -> Result<Option<Oid>, git2::Error>;

    /// Move the working tree and HEAD to `commit`.
    fn checkout(&self, repo: &Self::Handle, commit: Oid) -> Result<(), git2::Error>;

    /// Fetch again and reconcile the checked-out branch with its upstream.
    fn pull(&self, repo: &Self::Handle, auth: &Auth) -> Result<PullOutcome, git2::Error>;
}
