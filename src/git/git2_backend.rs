use git2::{
    AutotagOption, Branch, Cred, CredentialType, ErrorCode, FetchOptions, Oid, RemoteCallbacks,
    Repository,
    build::{CheckoutBuilder, RepoBuilder},
};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

use super::{DEFAULT_REMOTE, Engine, FetchOutcome, PullOutcome};
use crate::credentials::{Auth, DEFAULT_SSH_USER};

/// Refspecs used for every fetch. Tags are force-updated so a tag that was
/// deleted and recreated on the remote moves locally too.
const FETCH_REFSPECS: [&str; 2] = [
    "+refs/heads/*:refs/remotes/origin/*",
    "+refs/tags/*:refs/tags/*",
];

/// libgit2 keeps asking for credentials as long as the callback hands some
/// out; give up after this many requests within one operation.
const MAX_CREDENTIAL_ATTEMPTS: u32 = 4;

/// [`Engine`] backed by libgit2.
#[derive(Clone, Copy, Debug, Default)]
pub struct Git2Engine;

/// Hand out credentials for one network operation.
///
/// - [`Auth::Key`]: the decoded key, presented as the configured user (or the
///   URL's user, or `git`).
/// - [`Auth::None`]: SSH agent, then git credential helpers, then libgit2's
///   default credentials.
fn credentials(
    auth: &Auth,
    url: &str,
    username_from_url: Option<&str>,
    allowed: CredentialType,
    attempts: &Cell<u32>,
) -> Result<Cred, git2::Error> {
    attempts.set(attempts.get() + 1);
    if attempts.get() > MAX_CREDENTIAL_ATTEMPTS {
        return Err(git2::Error::from_str(
            "authentication failed: remote rejected the offered credentials",
        ));
    }

    match auth {
        Auth::Key(key) => {
            let user = key.username(username_from_url);
            if allowed.is_username() {
                return Cred::username(user);
            }
            if allowed.is_ssh_key() {
                return Cred::ssh_key_from_memory(user, None, key.private_key(), key.passphrase());
            }
            Err(git2::Error::from_str(
                "remote does not accept SSH key authentication",
            ))
        }
        Auth::None => {
            let user = username_from_url.unwrap_or(DEFAULT_SSH_USER);
            if allowed.is_username() {
                return Cred::username(user);
            }
            if allowed.is_ssh_key()
                && let Ok(cred) = Cred::ssh_key_from_agent(user)
            {
                return Ok(cred);
            }
            if allowed.is_user_pass_plaintext()
                && let Ok(cfg) = git2::Config::open_default()
                && let Ok(cred) = Cred::credential_helper(&cfg, url, username_from_url)
            {
                return Ok(cred);
            }
            Cred::default()
        }
    }
}

/// Build `FetchOptions` for one operation.
///
/// `attempts` bounds credential requests and `updated_refs` counts the refs
/// the fetch moved, so callers can tell an up-to-date fetch from one that
/// changed something without new objects (a tag re-pointed at an existing
/// commit, for example).
fn fetch_opts<'a>(
    auth: &'a Auth,
    attempts: &'a Cell<u32>,
    updated_refs: &'a Cell<usize>,
) -> FetchOptions<'a> {
    let mut cb = RemoteCallbacks::new();
    cb.credentials(move |url, username_from_url, allowed| {
        credentials(auth, url, username_from_url, allowed, attempts)
    });
    cb.update_tips(move |_name, _old, _new| {
        updated_refs.set(updated_refs.get() + 1);
        true
    });

    let mut fo = FetchOptions::new();
    fo.remote_callbacks(cb);
    fo.download_tags(AutotagOption::All);
    fo
}

/// Perform `git fetch origin` for branches and tags.
fn fetch_origin(repo: &Repository, auth: &Auth) -> Result<FetchOutcome, git2::Error> {
    let attempts = Cell::new(0);
    let updated_refs = Cell::new(0);
    let mut fo = fetch_opts(auth, &attempts, &updated_refs);

    let mut remote = repo.find_remote(DEFAULT_REMOTE)?;
    remote.fetch(&FETCH_REFSPECS, Some(&mut fo), Some("tagsync: fetch"))?;

    let objects = remote.stats().received_objects();
    let refs = updated_refs.get();
    if objects == 0 && refs == 0 {
        Ok(FetchOutcome::UpToDate)
    } else {
        Ok(FetchOutcome::Updated { refs, objects })
    }
}

/// Detach HEAD at the commit it currently points to.
///
/// Only the HEAD reference changes; the index and working tree stay as the
/// clone left them. An unborn HEAD (empty remote) is left alone.
fn detach_head(repo: &Repository) -> Result<(), git2::Error> {
    let target = match repo.head() {
        Ok(head) => head.target(),
        Err(e) if is_unborn(&e) => None,
        Err(e) => return Err(e),
    };
    if let Some(oid) = target {
        repo.set_head_detached(oid)?;
    }
    Ok(())
}

fn is_unborn(e: &git2::Error) -> bool {
    matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}

impl Engine for Git2Engine {
    type Handle = Repository;

    fn open(&self, path: &Path) -> Result<Option<Repository>, git2::Error> {
        match Repository::open(path) {
            Ok(repo) => Ok(Some(repo)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn clone_repo(&self, url: &str, path: &Path, auth: &Auth) -> Result<Repository, git2::Error> {
        let attempts = Cell::new(0);
        let updated_refs = Cell::new(0);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                git2::Error::from_str(&format!("create {}: {}", parent.display(), e))
            })?;
        }

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_opts(auth, &attempts, &updated_refs));
        let repo = builder.clone(url, path)?;

        detach_head(&repo)?;
        Ok(repo)
    }

    fn fetch(&self, repo: &Repository, auth: &Auth) -> Result<FetchOutcome, git2::Error> {
        fetch_origin(repo, auth)
    }

    fn resolve_tag(&self, repo: &Repository, name: &str) -> Result<Option<Oid>, git2::Error> {
        match repo.find_reference(&format!("refs/tags/{}", name)) {
            Ok(reference) => Ok(Some(reference.peel_to_commit()?.id())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn worktree(&self, repo: &Repository) -> Result<PathBuf, git2::Error> {
        repo.workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| git2::Error::from_str("repository is bare and has no working tree"))
    }

    fn head(&self, repo: &Repository) -> Result<Option<Oid>, git2::Error> {
        match repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id())),
            Err(e) if is_unborn(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Safe checkout of `commit`'s tree, then detach HEAD at it. Files with
    /// local modifications that the move would overwrite make this fail.
    fn checkout(&self, repo: &Repository, commit: Oid) -> Result<(), git2::Error> {
        let target = repo.find_commit(commit)?;
        repo.checkout_tree(target.as_object(), Some(CheckoutBuilder::new().safe()))?;
        repo.set_head_detached(commit)?;
        Ok(())
    }

    fn pull(&self, repo: &Repository, auth: &Auth) -> Result<PullOutcome, git2::Error> {
        fetch_origin(repo, auth)?;

        if repo.head_detached()? {
            return Ok(PullOutcome::Detached);
        }
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if is_unborn(&e) => return Ok(PullOutcome::NoUpstream),
            Err(e) => return Err(e),
        };
        if !head.is_branch() {
            return Ok(PullOutcome::Detached);
        }

        let branch = Branch::wrap(head);
        let upstream = match branch.upstream() {
            Ok(upstream) => upstream,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(PullOutcome::NoUpstream),
            Err(e) => return Err(e),
        };
        let Some(tip) = upstream.get().target() else {
            return Ok(PullOutcome::NoUpstream);
        };

        let incoming = repo.find_annotated_commit(tip)?;
        let (analysis, _) = repo.merge_analysis(&[&incoming])?;
        if analysis.is_up_to_date() {
            return Ok(PullOutcome::UpToDate);
        }
        if !analysis.is_fast_forward() {
            return Err(git2::Error::from_str(
                "local branch has diverged from its upstream; refusing to merge",
            ));
        }

        let commit = repo.find_commit(tip)?;
        repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().safe()))?;
        branch
            .into_reference()
            .set_target(tip, "tagsync: fast-forward")?;
        Ok(PullOutcome::FastForwarded(tip))
    }
}
