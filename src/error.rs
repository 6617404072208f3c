//! Error taxonomy for a synchronization attempt.

use std::fmt;
use std::path::PathBuf;

use git2::Oid;
use thiserror::Error;

use crate::credentials::CredentialError;

/// The step of a synchronization attempt an error came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    CloneOrOpen,
    Fetch,
    ResolveTag,
    OpenWorktree,
    Checkout,
    Pull,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Step::CloneOrOpen => "clone-or-open",
            Step::Fetch => "fetch",
            Step::ResolveTag => "resolve tag",
            Step::OpenWorktree => "open worktree",
            Step::Checkout => "checkout",
            Step::Pull => "pull",
        })
    }
}

/// Coarse classification of [`Error`], for callers that only need to branch
/// on what went wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Credential,
    Repository,
    Sync,
    ReferenceNotFound,
    Checkout,
}

/// Errors returned by [`SyncTarget`](crate::SyncTarget).
///
/// Every variant except [`Error::Credential`] names the step that failed and
/// keeps the engine error as its `source()`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid credentials: {0}")]
    Credential(#[from] CredentialError),

    #[error("{step}: repository error at {}: {source}", .path.display())]
    Repository {
        step: Step,
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("{step}: failed to sync with remote: {source}")]
    Sync {
        step: Step,
        #[source]
        source: git2::Error,
    },

    #[error("{step}: tag `{tag}` not found after fetch")]
    ReferenceNotFound { step: Step, tag: String },

    #[error("{step}: failed to check out {commit}: {source}")]
    Checkout {
        step: Step,
        commit: Oid,
        #[source]
        source: git2::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Credential(_) => ErrorKind::Credential,
            Error::Repository { .. } => ErrorKind::Repository,
            Error::Sync { .. } => ErrorKind::Sync,
            Error::ReferenceNotFound { .. } => ErrorKind::ReferenceNotFound,
            Error::Checkout { .. } => ErrorKind::Checkout,
        }
    }

    /// The failing step, or `None` for errors raised at construction time.
    pub fn step(&self) -> Option<Step> {
        match self {
            Error::Credential(_) => None,
            Error::Repository { step, .. }
            | Error::Sync { step, .. }
            | Error::ReferenceNotFound { step, .. }
            | Error::Checkout { step, .. } => Some(*step),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
