//! Entry review statuses, the status filter, and per-status tallies.
//!
//! The wire/database values are the Portuguese identifiers used by the
//! review dashboard (`em_analise`, `verificado`, `reprovado`), with `all`
//! as the filter wildcard.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// EntryStatus
// ---------------------------------------------------------------------------

/// Review state of a submitted entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Waiting for review. The initial state of every submission.
    EmAnalise,
    /// Approved by a reviewer.
    Verificado,
    /// Rejected by a reviewer.
    Reprovado,
}

impl EntryStatus {
    /// Every status, in dashboard tab order.
    pub const ALL: [EntryStatus; 3] = [
        EntryStatus::EmAnalise,
        EntryStatus::Verificado,
        EntryStatus::Reprovado,
    ];

    /// The value stored in `form_entries.status`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmAnalise => "em_analise",
            Self::Verificado => "verificado",
            Self::Reprovado => "reprovado",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid status '{s}'. Must be one of: em_analise, verificado, reprovado"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// StatusFilter
// ---------------------------------------------------------------------------

/// Filter applied to entry listings: a single status or `all`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StatusFilter {
    #[default]
    All,
    Only(EntryStatus),
}

impl StatusFilter {
    /// The status to filter on, or `None` for `all`.
    pub fn status(self) -> Option<EntryStatus> {
        match self {
            Self::All => None,
            Self::Only(status) => Some(status),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(status) => status.as_str(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" | "todos" => Ok(Self::All),
            other => other.parse().map(Self::Only),
        }
    }
}

impl TryFrom<String> for StatusFilter {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StatusFilter> for String {
    fn from(filter: StatusFilter) -> Self {
        filter.as_str().to_string()
    }
}

impl From<EntryStatus> for StatusFilter {
    fn from(status: EntryStatus) -> Self {
        Self::Only(status)
    }
}

// ---------------------------------------------------------------------------
// StatusCounts
// ---------------------------------------------------------------------------

/// Per-status entry tally for the dashboard tabs. Recomputed on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub todos: i64,
    pub em_analise: i64,
    pub verificado: i64,
    pub reprovado: i64,
}

impl StatusCounts {
    /// Build the tally from `(status, count)` pairs such as a `GROUP BY`
    /// result. `todos` is the sum of all pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (EntryStatus, i64)>) -> Self {
        let mut counts = Self::default();
        for (status, count) in pairs {
            match status {
                EntryStatus::EmAnalise => counts.em_analise += count,
                EntryStatus::Verificado => counts.verificado += count,
                EntryStatus::Reprovado => counts.reprovado += count,
            }
            counts.todos += count;
        }
        counts
    }

    /// Count shown on the tab for the given filter.
    pub fn get(&self, filter: StatusFilter) -> i64 {
        match filter.status() {
            None => self.todos,
            Some(EntryStatus::EmAnalise) => self.em_analise,
            Some(EntryStatus::Verificado) => self.verificado,
            Some(EntryStatus::Reprovado) => self.reprovado,
        }
    }
}
