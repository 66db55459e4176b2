//! Enumerations and field types shared across the engine.
//!
//! Status values arrive as free-form strings in the input tree; they are
//! normalized by lowercasing on deserialize so that "Completed", "completed"
//! and "COMPLETED" all mean the same thing. Unrecognized strings fall back
//! to `Pending`.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Authored task status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "completed" | "done" => Status::Completed,
            "in_progress" | "in progress" | "in-progress" => Status::InProgress,
            _ => Status::Pending,
        }
    }
}

impl From<Status> for String {
    fn from(s: Status) -> Self {
        s.as_str().to_string()
    }
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Completed => "completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the three-point estimates the scheduler reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DurationKind {
    Optimistic,
    #[default]
    Normal,
    Pessimistic,
}

/// Eisenhower matrix quadrant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quadrant {
    UrgentImportant,
    UrgentNotImportant,
    NotUrgentImportant,
    NotUrgentNotImportant,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::UrgentImportant,
        Quadrant::UrgentNotImportant,
        Quadrant::NotUrgentImportant,
        Quadrant::NotUrgentNotImportant,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Quadrant::UrgentImportant => "Urgent & Important",
            Quadrant::UrgentNotImportant => "Urgent & Not Important",
            Quadrant::NotUrgentImportant => "Not Urgent & Important",
            Quadrant::NotUrgentNotImportant => "Not Urgent & Not Important",
        }
    }
}
