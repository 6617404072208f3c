use std::path::{Path, PathBuf};

use crate::credentials::{Auth, Credentials};
use crate::error::Result;

/// One `(remote, tag)` pair to keep on disk, with its resolved credentials.
///
/// Built once and never modified; each call to [`SyncTarget::init`] brings
/// the local clone at [`SyncTarget::local_dir`] to the tag's current commit.
#[derive(Debug)]
pub struct SyncTarget {
    remote: String,
    tag: String,
    local_dir: PathBuf,
    auth: Auth,
}

/// Local directory name for a `(remote, tag)` pair: `<remote>-<tag>`, verbatim.
///
/// No sanitization is applied; callers are responsible for the result being
/// a usable path.
pub fn local_dir_name(remote: &str, tag: &str) -> String {
    format!("{}-{}", remote, tag)
}

impl SyncTarget {
    /// Build a target from raw credential inputs.
    ///
    /// Empty strings and empty key bytes count as absent.
    ///
    /// # Errors
    /// [`Error::Credential`](crate::Error::Credential) if `private_key` is
    /// present but cannot be decoded, either as-is or with `pass` as its
    /// passphrase.
    pub fn new(
        remote: &str,
        tag: &str,
        user: Option<&str>,
        pass: Option<&str>,
        private_key: Option<&[u8]>,
    ) -> Result<Self> {
        let creds = Credentials::new(
            user.map(str::to_string),
            pass.map(str::to_string),
            private_key.map(<[u8]>::to_vec),
        );
        Self::with_credentials(remote, tag, &creds)
    }

    pub fn with_credentials(remote: &str, tag: &str, creds: &Credentials) -> Result<Self> {
        let auth = creds.resolve()?;
        Ok(SyncTarget {
            remote: remote.to_string(),
            tag: tag.to_string(),
            local_dir: PathBuf::from(local_dir_name(remote, tag)),
            auth,
        })
    }

    /// Place the local clone under `root` instead of the current directory.
    ///
    /// Follows [`Path::join`]: a remote that is itself an absolute path yields
    /// an absolute local directory and `root` is ignored.
    pub fn rooted_at(self, root: &Path) -> Self {
        SyncTarget {
            local_dir: root.join(local_dir_name(&self.remote, &self.tag)),
            ..self
        }
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }
}
