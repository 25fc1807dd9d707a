//! One-shot evaluation of an opportunity against a settings snapshot.
//!
//! Bundles the level decision, the fast-track verdict and the checkpoints
//! of a phase into a single serializable record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculator::LevelDecision;
use crate::checkpoints::{CheckpointResolution, ResolverOptions};
use crate::domain::{Opportunity, Phase, RaiseLevel};
use crate::fast_track::FastTrackVerdict;
use crate::obs::AssessmentSpan;
use crate::settings::SettingsSnapshot;

/// Everything the engine says about one opportunity in one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub opportunity_id: Option<String>,
    pub phase: Phase,
    pub level: RaiseLevel,
    pub decision: LevelDecision,
    pub fast_track: FastTrackVerdict,
    pub checkpoints: CheckpointResolution,
    /// Digest of the settings snapshot that produced this assessment.
    pub settings_digest: String,
    pub evaluated_at: DateTime<Utc>,
}

impl Assessment {
    /// Phases this opportunity walks through, given its fast-track verdict.
    pub fn workflow(&self) -> Vec<Phase> {
        crate::domain::workflow_phases(self.fast_track.eligible())
    }
}

/// Assess `opp` in `phase`, or in its current phase when `None`.
pub fn assess(
    opp: &Opportunity,
    snapshot: &SettingsSnapshot,
    phase: Option<Phase>,
    options: ResolverOptions,
) -> Assessment {
    let _span = AssessmentSpan::enter(opp.id.as_deref().unwrap_or("-"));
    let phase = phase.unwrap_or(opp.current_phase);

    let decision = snapshot.explain_level(opp);
    let fast_track = snapshot.fast_track(opp);
    let checkpoints = snapshot.checkpoints(phase, opp, options);

    Assessment {
        opportunity_id: opp.id.clone(),
        phase,
        level: decision.level,
        decision,
        fast_track,
        checkpoints,
        settings_digest: snapshot.digest().to_string(),
        evaluated_at: Utc::now(),
    }
}
