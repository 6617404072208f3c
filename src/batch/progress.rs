use indicatif::ProgressStyle;

use crate::git::{FetchOutcome, PullOutcome};
use crate::sync::{Acquired, SyncReport};

/// Spinner style used while a target is synchronizing.
/// - Yellow spinner with animated braille-style frames.
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[33m{spinner}\x1b[0m {wide_msg}")
        .unwrap()
        .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"])
}

/// Green check mark followed by the final message.
pub fn ok_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[32m✔\x1b[0m {wide_msg}").unwrap()
}

/// Red cross followed by the error message.
pub fn err_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[31m✘\x1b[0m {wide_msg}").unwrap()
}

/// One-line summary of a finished attempt, e.g.
/// `deploy at 1a2b3c4 (cloned, checked out)`.
pub fn summarize(display: &str, report: &SyncReport) -> String {
    let mut notes: Vec<String> = Vec::new();
    if report.acquired == Acquired::Cloned {
        notes.push("cloned".into());
    } else if report.fetched == FetchOutcome::UpToDate && !report.checkout.moved() {
        notes.push("up to date".into());
    }
    if report.checkout.moved() {
        notes.push("checked out".into());
    }
    if let PullOutcome::FastForwarded(_) = report.pulled {
        notes.push("fast-forwarded".into());
    }

    let short = report.commit.to_string();
    let short = &short[..short.len().min(7)];
    if notes.is_empty() {
        format!("{} at {}", display, short)
    } else {
        format!("{} at {} ({})", display, short, notes.join(", "))
    }
}
