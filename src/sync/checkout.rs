//! Checkout coordinator.
//!
//! Reads the current head, compares it with the commit the tag resolved to,
//! and checks out only when they differ:
//!
//! ```text
//! Unknown --read head--> HeadKnown --compare--> UpToDate ----------------> Synchronized
//!                                           \-> NeedsCheckout --checkout-> Synchronized
//! ```
//!
//! Equality is on commit ids, never on ref names.

use git2::Oid;
use tracing::{debug, info};

use super::SyncContext;
use crate::error::{Error, Result, Step};
use crate::git::Engine;

/// Outcome of comparing the working tree's head with the target commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutPlan {
    /// Head already is the target; the working tree is not touched.
    UpToDate,
    /// Head differs (or is unborn) and the tree must move to `to`.
    NeedsCheckout { from: Option<Oid>, to: Oid },
}

impl CheckoutPlan {
    pub fn between(head: Option<Oid>, target: Oid) -> Self {
        match head {
            Some(h) if h == target => CheckoutPlan::UpToDate,
            from => CheckoutPlan::NeedsCheckout { from, to: target },
        }
    }

    pub fn moved(&self) -> bool {
        matches!(self, CheckoutPlan::NeedsCheckout { .. })
    }
}

/// Bring the working tree to `target`, checking out only if needed.
pub(super) fn coordinate<E: Engine>(ctx: &SyncContext<'_, E>, target: Oid) -> Result<CheckoutPlan> {
    let head = ctx
        .engine
        .head(&ctx.repo)
        .map_err(|source| ctx.repository_error(Step::Checkout, source))?;

    let plan = CheckoutPlan::between(head, target);
    match plan {
        CheckoutPlan::UpToDate => {
            debug!(commit = %target, "working tree already at tag");
        }
        CheckoutPlan::NeedsCheckout { from, to } => {
            ctx.engine
                .checkout(&ctx.repo, to)
                .map_err(|source| Error::Checkout {
                    step: Step::Checkout,
                    commit: to,
                    source,
                })?;
            match from {
                Some(from) => info!(%from, %to, "checked out tag"),
                None => info!(%to, "checked out tag onto unborn head"),
            }
        }
    }
    Ok(plan)
}
