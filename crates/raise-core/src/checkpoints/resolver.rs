//! Resolve the checkpoints of one phase for one opportunity.

use serde::{Deserialize, Serialize};

use super::control::{Checkpoint, ControlConfig};
use crate::condition::{is_blank, try_evaluate_condition, ConditionError};
use crate::domain::{Opportunity, Phase};
use crate::metrics::METRICS;
use crate::obs::{emit_checkpoints_resolved, emit_condition_rejected};
use crate::test_mode::TestMode;

/// Options passed explicitly into every resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Force every checkpoint to `required = false`.
    pub test_mode: bool,
}

impl ResolverOptions {
    pub fn test_mode() -> Self {
        Self { test_mode: true }
    }
}

impl From<TestMode> for ResolverOptions {
    fn from(mode: TestMode) -> Self {
        Self {
            test_mode: mode.active,
        }
    }
}

/// A control excluded because its condition could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionFailure {
    pub control_id: String,
    pub condition: String,
    pub error: String,
}

/// Resolved checkpoints plus the controls rejected on a faulty condition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointResolution {
    pub checkpoints: Vec<Checkpoint>,
    pub rejected: Vec<ConditionFailure>,
}

impl CheckpointResolution {
    /// Required checkpoints not yet checked.
    pub fn blocking(&self) -> impl Iterator<Item = &Checkpoint> {
        self.checkpoints.iter().filter(|c| c.is_blocking())
    }

    /// Whether nothing blocks advancing the phase.
    pub fn can_advance(&self) -> bool {
        self.blocking().next().is_none()
    }
}

/// Checkpoints of `phase` for `opp`, in control order.
///
/// Controls scoped to `phase` or to `ALL` whose condition holds are kept.
/// An empty control list yields no checkpoints.
pub fn get_required_checkpoints(
    phase: Phase,
    opp: &Opportunity,
    controls: &[ControlConfig],
    options: ResolverOptions,
) -> Vec<Checkpoint> {
    resolve_checkpoints(phase, opp, controls, options).checkpoints
}

/// Like [`get_required_checkpoints`], also reporting controls dropped
/// because their condition failed to parse or evaluate.
pub fn resolve_checkpoints(
    phase: Phase,
    opp: &Opportunity,
    controls: &[ControlConfig],
    options: ResolverOptions,
) -> CheckpointResolution {
    let mut resolution = CheckpointResolution::default();

    for control in controls.iter().filter(|c| c.phase.applies_to(phase)) {
        if !condition_holds(control, opp, &mut resolution.rejected) {
            continue;
        }
        let required = control.is_mandatory && !options.test_mode;
        resolution
            .checkpoints
            .push(Checkpoint::from_control(control, required));
    }

    METRICS.add_checkpoints_resolved(resolution.checkpoints.len() as u64);
    emit_checkpoints_resolved(
        phase,
        resolution.checkpoints.len(),
        resolution.rejected.len(),
        options.test_mode,
    );
    resolution
}

fn condition_holds(
    control: &ControlConfig,
    opp: &Opportunity,
    rejected: &mut Vec<ConditionFailure>,
) -> bool {
    let Some(condition) = control.condition.as_deref().filter(|c| !is_blank(c)) else {
        return true;
    };
    match try_evaluate_condition(condition, opp) {
        Ok(satisfied) => satisfied,
        Err(err) => {
            record_failure(control, condition, &err, rejected);
            false
        }
    }
}

fn record_failure(
    control: &ControlConfig,
    condition: &str,
    err: &ConditionError,
    rejected: &mut Vec<ConditionFailure>,
) {
    METRICS.inc_condition_failures();
    emit_condition_rejected(condition, err);
    rejected.push(ConditionFailure {
        control_id: control.id.clone(),
        condition: condition.to_string(),
        error: err.to_string(),
    });
}
