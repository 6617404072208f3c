//! End-to-end synchronization against throwaway local remotes.

use git2::{Commit, Oid, Repository, Signature};
use std::fs;
use std::path::{Path, PathBuf};
use tagsync::git::{FetchOutcome, Git2Engine};
use tagsync::{Acquired, CheckoutPlan, ErrorKind, Step, SyncTarget};
use tempfile::TempDir;

struct Remote {
    _dir: TempDir,
    path: PathBuf,
    repo: Repository,
}

impl Remote {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("remote");
        let repo = Repository::init(&path).unwrap();
        Remote {
            _dir: dir,
            path,
            repo,
        }
    }

    fn url(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    fn commit(&self, files: &[(&str, &str)], message: &str) -> Oid {
        let mut index = self.repo.index().unwrap();
        for (name, contents) in files {
            fs::write(self.path.join(name), contents).unwrap();
            index.add_path(Path::new(name)).unwrap();
        }
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("remote", "remote@example.com").unwrap();
        let parents: Vec<Commit> = self
            .repo
            .head()
            .ok()
            .map(|h| h.peel_to_commit().unwrap())
            .into_iter()
            .collect();
        let parents: Vec<&Commit> = parents.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    fn tag(&self, name: &str, commit: Oid) {
        let obj = self.repo.find_object(commit, None).unwrap();
        self.repo.tag_lightweight(name, &obj, true).unwrap();
    }
}

fn head_of(dir: &Path) -> Oid {
    Repository::open(dir)
        .unwrap()
        .head()
        .unwrap()
        .peel_to_commit()
        .unwrap()
        .id()
}

fn read(dir: &Path, file: &str) -> String {
    fs::read_to_string(dir.join(file)).unwrap()
}

#[test]
fn fresh_filesystem_clones_and_checks_out_tag() {
    let remote = Remote::new();
    let v1 = remote.commit(&[("app.toml", "version = 1")], "v1");
    remote.tag("v1.0.0", v1);
    remote.commit(&[("app.toml", "version = 2")], "after v1");

    let mut target = SyncTarget::new(&remote.url(), "v1.0.0", None, None, None).unwrap();
    let local = target.local_dir().to_path_buf();
    assert_eq!(local, PathBuf::from(format!("{}-v1.0.0", remote.url())));
    assert!(!local.exists());

    target.init().unwrap();

    assert_eq!(head_of(&local), v1);
    assert_eq!(read(&local, "app.toml"), "version = 1");
    // full history is present, not just the tag
    let clone = Repository::open(&local).unwrap();
    let mut walk = clone.revwalk().unwrap();
    walk.push_glob("refs/remotes/origin/*").unwrap();
    assert_eq!(walk.count(), 2);
}

#[test]
fn second_init_against_unchanged_remote_is_a_no_op() {
    let remote = Remote::new();
    let v1 = remote.commit(&[("a.txt", "alpha"), ("b.txt", "beta")], "v1");
    remote.tag("v1", v1);

    let mut target = SyncTarget::new(&remote.url(), "v1", None, None, None).unwrap();
    let first = target.sync_with(&Git2Engine).unwrap();
    assert_eq!(first.acquired, Acquired::Cloned);

    let local = target.local_dir().to_path_buf();
    let before = (read(&local, "a.txt"), read(&local, "b.txt"));

    let second = target.sync_with(&Git2Engine).unwrap();
    assert_eq!(second.acquired, Acquired::Opened);
    assert_eq!(second.fetched, FetchOutcome::UpToDate);
    assert_eq!(second.checkout, CheckoutPlan::UpToDate);
    assert_eq!(second.commit, v1);
    assert_eq!((read(&local, "a.txt"), read(&local, "b.txt")), before);

    target.init().unwrap();
    assert_eq!(head_of(&local), v1);
}

#[test]
fn recreated_tag_moves_the_working_tree() {
    let remote = Remote::new();
    let old = remote.commit(&[("app.toml", "version = 1")], "old");
    remote.tag("v1.0.0", old);

    let mut target = SyncTarget::new(&remote.url(), "v1.0.0", None, None, None).unwrap();
    target.init().unwrap();
    let local = target.local_dir().to_path_buf();
    assert_eq!(head_of(&local), old);

    let new = remote.commit(&[("app.toml", "version = 1, fixed")], "retag");
    remote.repo.tag_delete("v1.0.0").unwrap();
    remote.tag("v1.0.0", new);

    let report = target.sync_with(&Git2Engine).unwrap();
    assert_eq!(
        report.checkout,
        CheckoutPlan::NeedsCheckout {
            from: Some(old),
            to: new
        }
    );
    assert_eq!(head_of(&local), new);
    assert_eq!(read(&local, "app.toml"), "version = 1, fixed");
}

#[test]
fn moving_between_tags_detaches_at_each() {
    let remote = Remote::new();
    let a = remote.commit(&[("f", "a")], "a");
    remote.tag("a", a);
    let b = remote.commit(&[("f", "b")], "b");
    remote.tag("b", b);

    let mut at_a = SyncTarget::new(&remote.url(), "a", None, None, None).unwrap();
    let mut at_b = SyncTarget::new(&remote.url(), "b", None, None, None).unwrap();
    at_a.init().unwrap();
    at_b.init().unwrap();

    assert_ne!(at_a.local_dir(), at_b.local_dir());
    assert_eq!(read(at_a.local_dir(), "f"), "a");
    assert_eq!(read(at_b.local_dir(), "f"), "b");
    assert!(Repository::open(at_a.local_dir()).unwrap().head_detached().unwrap());
}

#[test]
fn missing_tag_leaves_default_branch_clone() {
    let remote = Remote::new();
    let tip = remote.commit(&[("a.txt", "tip")], "tip");

    let mut target = SyncTarget::new(&remote.url(), "v9.9.9", None, None, None).unwrap();
    let err = target.init().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ReferenceNotFound);
    assert_eq!(err.step(), Some(Step::ResolveTag));
    let local = target.local_dir();
    assert!(local.join(".git").exists());
    assert_eq!(head_of(local), tip);
    assert_eq!(read(local, "a.txt"), "tip");

    // creating the tag later makes the next run succeed
    remote.tag("v9.9.9", tip);
    target.init().unwrap();
}

#[test]
fn local_edits_block_a_conflicting_checkout() {
    let remote = Remote::new();
    let old = remote.commit(&[("app.toml", "version = 1")], "old");
    remote.tag("v1", old);

    let mut target = SyncTarget::new(&remote.url(), "v1", None, None, None).unwrap();
    target.init().unwrap();
    let local = target.local_dir().to_path_buf();
    fs::write(local.join("app.toml"), "local tweak").unwrap();

    // unchanged tag: local edit survives, nothing to do
    target.init().unwrap();
    assert_eq!(read(&local, "app.toml"), "local tweak");

    let new = remote.commit(&[("app.toml", "version = 2")], "new");
    remote.tag("v1", new);
    let err = target.init().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Checkout);
    assert_eq!(err.step(), Some(Step::Checkout));
    assert_eq!(read(&local, "app.toml"), "local tweak");
    assert_eq!(head_of(&local), old);
}

#[test]
fn unreachable_remote_is_a_repository_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no-such-remote");
    let mut target =
        SyncTarget::new(&missing.to_string_lossy(), "v1", None, None, None).unwrap();

    let err = target.init().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Repository);
    assert_eq!(err.step(), Some(Step::CloneOrOpen));
}

#[test]
fn malformed_key_never_yields_a_target() {
    let err = SyncTarget::new(
        "git@example.com:org/repo.git",
        "v1",
        Some("git"),
        None,
        Some(b"not a key at all"),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Credential);
}
