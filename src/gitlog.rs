//! Commit history capture and parsing.
//!
//! The engine shells out to `git log` with a fixed pretty format that frames
//! each commit as: hash line, message lines (subject + body), changed file
//! paths, then a `==END==` sentinel line. A failed or absent git invocation
//! degrades to "no history available" rather than an error.

use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

/// Record terminator emitted by [`GIT_LOG_FORMAT`].
pub const SENTINEL: &str = "==END==";

/// Pretty format handed to `git log --name-only`.
pub const GIT_LOG_FORMAT: &str = "--pretty=format:%H%n%s%n%b%n==END==";

/// A parsed version-control history entry. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub files: Vec<String>,
}

/// Run `git log` in `repo_dir` and return its raw output.
///
/// Non-zero exit or a spawn failure is logged and reported as `None`;
/// callers treat that as an empty commit set.
pub fn run_git_log(repo_dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["log", "--name-only", GIT_LOG_FORMAT])
        .current_dir(repo_dir)
        .output();
    match output {
        Ok(out) if out.status.success() => Some(String::from_utf8_lossy(&out.stdout).into_owned()),
        Ok(out) => {
            warn!(
                status = %out.status,
                "git log failed, treating history as empty"
            );
            None
        }
        Err(err) => {
            warn!(error = %err, "could not invoke git, treating history as empty");
            None
        }
    }
}

/// Parse raw log text into commits.
///
/// Line-oriented state machine per record: the first line is the hash,
/// message lines accumulate until a blank line or the sentinel, file paths
/// accumulate until the sentinel. Tolerates empty file lists, multi-line
/// messages and blank padding between message and files. Empty input yields
/// an empty list.
pub fn parse_git_log(log_text: &str) -> Vec<Commit> {
    let lines: Vec<&str> = log_text.lines().collect();
    let mut commits = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let hash = lines[i].trim();
        i += 1;
        if hash.is_empty() {
            continue;
        }

        let mut message_lines = Vec::new();
        while i < lines.len() && !lines[i].trim().is_empty() && lines[i].trim() != SENTINEL {
            message_lines.push(lines[i]);
            i += 1;
        }
        let message = message_lines.join("\n").trim().to_string();

        let mut files = Vec::new();
        while i < lines.len() && lines[i].trim() != SENTINEL {
            let line = lines[i].trim();
            if !line.is_empty() {
                files.push(line.to_string());
            }
            i += 1;
        }
        // Consume the sentinel.
        i += 1;

        commits.push(Commit {
            hash: hash.to_string(),
            message,
            files,
        });
    }
    commits
}

/// Extract candidate task ids from a commit message.
///
/// Matches dotted-numeric identifiers ("1", "1.2", "1.2.3"); every
/// occurrence is returned, repeats included, since each counts toward the
/// task's commit tally.
pub fn extract_task_ids(message: &str) -> Vec<String> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| Regex::new(r"\b\d+(?:\.\d+)*\b").expect("valid task id regex"));
    re.find_iter(message).map(|m| m.as_str().to_string()).collect()
}
