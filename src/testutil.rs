//! Throwaway upstream repositories for tests.

use git2::{Commit, Oid, Repository, Signature};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A non-bare repository standing in for the remote. Clones use its path as
/// the URL.
pub(crate) struct Upstream {
    dir: TempDir,
    repo: Repository,
}

impl Upstream {
    pub(crate) fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path().join("upstream")).unwrap();
        Upstream { dir, repo }
    }

    pub(crate) fn url(&self) -> String {
        self.dir.path().join("upstream").to_string_lossy().into_owned()
    }

    /// Name of the branch HEAD is on.
    pub(crate) fn branch(&self) -> String {
        self.repo.head().unwrap().shorthand().unwrap().to_string()
    }

    /// Write `file` and commit it on the current branch.
    pub(crate) fn commit(&self, file: &str, contents: &str, message: &str) -> Oid {
        let workdir = self.repo.workdir().unwrap();
        fs::write(workdir.join(file), contents).unwrap();

        let mut index = self.repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let sig = Signature::now("tagsync", "tagsync@example.com").unwrap();
        let parents: Vec<Commit> = match self.repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parents: Vec<&Commit> = parents.iter().collect();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap()
    }

    pub(crate) fn tag(&self, name: &str, commit: Oid) {
        let obj = self.repo.find_object(commit, None).unwrap();
        self.repo.tag_lightweight(name, &obj, true).unwrap();
    }

    pub(crate) fn annotated_tag(&self, name: &str, commit: Oid) {
        let obj = self.repo.find_object(commit, None).unwrap();
        let sig = Signature::now("tagsync", "tagsync@example.com").unwrap();
        self.repo.tag(name, &obj, &sig, name, true).unwrap();
    }

    pub(crate) fn delete_tag(&self, name: &str) {
        self.repo.tag_delete(name).unwrap();
    }
}
