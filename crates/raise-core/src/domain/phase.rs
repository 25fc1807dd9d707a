//! Workflow phases of the opportunity approval process.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::RaiseError;

/// A stage in the multi-step approval workflow.
///
/// Declaration order is workflow order. `Won` and `Lost` are the two
/// terminal outcomes after `Handover`. Deserialization is case-insensitive
/// so `"Planning"` and `"PLANNING"` both load.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Phase {
    /// Opportunity qualification and bid planning.
    #[default]
    Planning,
    /// Authorization to proceed.
    Atp,
    /// Authorization to submit the offer.
    Ats,
    /// Authorization to contract.
    Atc,
    /// Handover to delivery.
    Handover,
    Won,
    Lost,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Planning,
        Phase::Atp,
        Phase::Ats,
        Phase::Atc,
        Phase::Handover,
        Phase::Won,
        Phase::Lost,
    ];

    /// Canonical upper-case name, as stored in control configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "PLANNING",
            Self::Atp => "ATP",
            Self::Ats => "ATS",
            Self::Atc => "ATC",
            Self::Handover => "HANDOVER",
            Self::Won => "WON",
            Self::Lost => "LOST",
        }
    }

    /// Whether the opportunity has left the approval workflow.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }

    /// Whether the fast-track path bypasses this phase.
    pub fn is_skipped_by_fast_track(self) -> bool {
        matches!(self, Self::Ats | Self::Atc)
    }
}

/// Ordered phases an opportunity traverses before reaching an outcome.
///
/// Terminal outcomes are not part of the sequence.
pub fn workflow_phases(fast_track: bool) -> Vec<Phase> {
    Phase::ALL
        .into_iter()
        .filter(|p| !p.is_terminal())
        .filter(|p| !(fast_track && p.is_skipped_by_fast_track()))
        .collect()
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = RaiseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| RaiseError::UnknownPhase(s.to_string()))
    }
}

impl TryFrom<String> for Phase {
    type Error = RaiseError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}
