//! Crate entry point for **tagsync**.
//!
//! tagsync keeps a local clone of a remote git repository pinned to a tag:
//! it clones on first use, and on every later run fetches, re-resolves the
//! tag and checks out only when the tag has moved.
//!
//! ```no_run
//! let mut target = tagsync::SyncTarget::new(
//!     "https://example.com/org/repo",
//!     "v1.0.0",
//!     None,
//!     None,
//!     None,
//! )?;
//! target.init()?;
//! # Ok::<(), tagsync::Error>(())
//! ```
//!
//! The `cmd_*` functions back the `tagsync` CLI.

mod batch;
mod config;
mod credentials;
mod error;
pub mod git;
mod init;
mod list;
mod paths;
mod sync;
mod target;
pub mod url;

#[cfg(test)]
mod testutil;

pub use credentials::{Auth, CredentialError, Credentials, KeyAuth};
pub use error::{Error, ErrorKind, Result, Step};
pub use sync::{Acquired, CheckoutPlan, SyncReport};
pub use target::{SyncTarget, local_dir_name};

pub use batch::cmd_sync;
pub use config::{Config, Target, cmd_edit, load_config};
pub use init::{InitArgs, cmd_init};
pub use list::cmd_list;
pub use paths::{Paths, tagsync_home};
