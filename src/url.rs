//! Remote URL recognition.
//!
//! A stateless helper for display purposes; the synchronization steps pass
//! remote URLs to the engine untouched.

use regex::Regex;
use std::sync::LazyLock;

static SCP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9._-]+)@([A-Za-z0-9.-]+):([A-Za-z0-9._/-]+?)(?:\.git)?/?$").unwrap()
});

static HTTP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?)://(?:[^@/]+@)?([\w.-]+(?::\d+)?)/([\w.-]+)/([\w.-]+?)(?:\.git)?/?$")
        .unwrap()
});

/// A remote URL recognized as one of the common hosting forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RemoteUrl {
    /// `user@host:path/to/repo.git`
    Scp {
        user: String,
        host: String,
        path: String,
    },
    /// `https://host/owner/repo(.git)`
    Http {
        scheme: String,
        host: String,
        owner: String,
        repo: String,
    },
}

impl RemoteUrl {
    /// Recognize `url`, or `None` if it is neither scp-like nor HTTP(S).
    pub fn parse(url: &str) -> Option<Self> {
        if let Some(c) = SCP_RE.captures(url) {
            return Some(RemoteUrl::Scp {
                user: c[1].to_string(),
                host: c[2].to_string(),
                path: c[3].to_string(),
            });
        }
        let c = HTTP_RE.captures(url)?;
        Some(RemoteUrl::Http {
            scheme: c[1].to_string(),
            host: c[2].to_string(),
            owner: c[3].to_string(),
            repo: c[4].to_string(),
        })
    }

    pub fn host(&self) -> &str {
        match self {
            RemoteUrl::Scp { host, .. } | RemoteUrl::Http { host, .. } => host,
        }
    }

    /// Repository path on the host, without a `.git` suffix.
    pub fn path(&self) -> String {
        match self {
            RemoteUrl::Scp { path, .. } => path.clone(),
            RemoteUrl::Http { owner, repo, .. } => format!("{}/{}", owner, repo),
        }
    }

    /// Short `host/path` form.
    pub fn display(&self) -> String {
        format!("{}/{}", self.host(), self.path())
    }
}
