//! Synchronization orchestrator.
//!
//! One attempt runs, in this fixed order:
//! 1. clone-or-open the local directory,
//! 2. fetch from `origin`,
//! 3. resolve the tag to a commit,
//! 4. open the working tree,
//! 5. check out the commit if the head is elsewhere (see [`checkout`]),
//! 6. pull.
//!
//! The first failure ends the attempt and is returned tagged with its
//! [`Step`](crate::Step). Repository state lives in a [`SyncContext`] created
//! for the attempt and dropped when it ends; the clone on disk is what
//! persists between attempts.

mod checkout;
mod steps;

use git2::Oid;
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

use crate::error::{Error, Result, Step};
use crate::git::{Engine, FetchOutcome, Git2Engine, PullOutcome};
use crate::target::SyncTarget;

pub use checkout::CheckoutPlan;

/// How the repository handle was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Acquired {
    Opened,
    Cloned,
}

/// What a successful attempt did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyncReport {
    pub acquired: Acquired,
    pub fetched: FetchOutcome,
    /// Commit the tag resolved to; the working tree's head afterwards.
    pub commit: Oid,
    pub worktree: PathBuf,
    pub checkout: CheckoutPlan,
    pub pulled: PullOutcome,
}

/// Per-attempt state threaded through the steps.
pub(crate) struct SyncContext<'t, E: Engine> {
    target: &'t SyncTarget,
    engine: &'t E,
    repo: E::Handle,
}

impl<E: Engine> SyncContext<'_, E> {
    fn path(&self) -> &Path {
        self.target.local_dir()
    }

    fn repository_error(&self, step: Step, source: git2::Error) -> Error {
        Error::Repository {
            step,
            path: self.path().to_path_buf(),
            source,
        }
    }
}

impl SyncTarget {
    /// Bring the local clone to the tag's current commit using libgit2.
    ///
    /// Safe to call repeatedly: against an unchanged remote a second call
    /// opens the clone, finds nothing to fetch and leaves the working tree
    /// alone. After a failure, calling again resumes from whatever the
    /// previous attempt left on disk.
    ///
    /// Takes `&mut self`, so a single target value runs one attempt at a
    /// time. Nothing stops two separately built targets for the same pair
    /// from racing on one local directory; callers must not do that.
    ///
    /// # Errors
    /// The first failing step's [`Error`].
    pub fn init(&mut self) -> Result<()> {
        self.sync_with(&Git2Engine).map(drop)
    }

    /// Like [`SyncTarget::init`], against any [`Engine`], returning what was
    /// done.
    pub fn sync_with<E: Engine>(&mut self, engine: &E) -> Result<SyncReport> {
        let span = info_span!("sync", remote = %self.remote(), tag = %self.tag());
        let _enter = span.enter();

        let (ctx, acquired) = steps::acquire(engine, self)?;
        let fetched = steps::fetch(&ctx)?;
        let commit = steps::resolve(&ctx)?;
        let worktree = steps::open_worktree(&ctx)?;
        let checkout = checkout::coordinate(&ctx, commit)?;
        let pulled = steps::pull(&ctx)?;

        info!(
            %commit,
            path = %self.local_dir().display(),
            cloned = acquired == Acquired::Cloned,
            moved = checkout.moved(),
            "synchronized"
        );
        Ok(SyncReport {
            acquired,
            fetched,
            commit,
            worktree,
            checkout,
            pulled,
        })
    }
}
