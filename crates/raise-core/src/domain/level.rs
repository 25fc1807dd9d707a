//! RAISE authorization levels.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::RaiseError;

/// Authorization level assigned to an opportunity.
///
/// `L1` is the most severe level (most scrutiny, most signatures) and `L6`
/// the least severe. Ordering follows severity: a more severe level compares
/// greater, so `RaiseLevel::L1 > RaiseLevel::L6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RaiseLevel {
    L6,
    L5,
    L4,
    L3,
    L2,
    L1,
}

impl RaiseLevel {
    /// The level reserved for regulatory non-negotiables.
    pub const MOST_SEVERE: RaiseLevel = RaiseLevel::L1;

    /// The level assigned to the smallest, cleanest deals.
    pub const LEAST_SEVERE: RaiseLevel = RaiseLevel::L6;

    /// Every level, most severe first.
    pub const ALL: [RaiseLevel; 6] = [
        RaiseLevel::L1,
        RaiseLevel::L2,
        RaiseLevel::L3,
        RaiseLevel::L4,
        RaiseLevel::L5,
        RaiseLevel::L6,
    ];

    /// Position on the severity scale: 1 for `L1` through 6 for `L6`.
    pub fn severity_rank(self) -> u8 {
        match self {
            Self::L1 => 1,
            Self::L2 => 2,
            Self::L3 => 3,
            Self::L4 => 4,
            Self::L5 => 5,
            Self::L6 => 6,
        }
    }

    /// Level with the given rank (1..=6).
    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(usize::from(rank).checked_sub(1)?).copied()
    }

    /// One step more severe. Saturates at [`RaiseLevel::MOST_SEVERE`].
    pub fn more_severe(self) -> Self {
        Self::from_rank(self.severity_rank().saturating_sub(1)).unwrap_or(Self::MOST_SEVERE)
    }

    /// Whether `self` demands at least the scrutiny of `other`.
    pub fn is_at_least_as_severe_as(self, other: RaiseLevel) -> bool {
        self >= other
    }

    /// Canonical label (`"L1"`..`"L6"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::L1 => "L1",
            Self::L2 => "L2",
            Self::L3 => "L3",
            Self::L4 => "L4",
            Self::L5 => "L5",
            Self::L6 => "L6",
        }
    }

    /// Short description of the approval scope at this level.
    pub fn description(self) -> &'static str {
        match self {
            Self::L1 => "board-level authorization",
            Self::L2 => "executive committee authorization",
            Self::L3 => "division head authorization",
            Self::L4 => "business unit authorization",
            Self::L5 => "line manager authorization",
            Self::L6 => "standard authorization",
        }
    }
}

impl std::fmt::Display for RaiseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RaiseLevel {
    type Err = RaiseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| RaiseError::UnknownLevel(s.to_string()))
    }
}
