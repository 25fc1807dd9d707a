//! Structured observability hooks for engine evaluations.
//!
//! This module provides:
//! - Assessment-scoped tracing spans via the `AssessmentSpan` RAII guard
//! - Emission functions for key evaluation events: level calculated,
//!   fast-track evaluated, checkpoints resolved, condition rejected,
//!   matrix fallback
//!
//! Routine events are emitted at `debug!`, configuration problems at
//! `warn!`. Verbosity follows `RUST_LOG`.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::domain::{Phase, RaiseLevel};

/// RAII guard that enters a span tagged with the opportunity id for the
/// duration of an assessment.
///
/// # Example
///
/// ```ignore
/// let _span = AssessmentSpan::enter("opp-42");
/// // every event emitted below now carries opportunity_id = "opp-42"
/// ```
pub struct AssessmentSpan {
    _span: tracing::span::EnteredSpan,
}

impl AssessmentSpan {
    /// Create and enter a span tagged with the opportunity id.
    pub fn enter(opportunity_id: &str) -> Self {
        let span = tracing::info_span!("raise.assessment", opportunity_id = %opportunity_id);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a RAISE level was calculated.
pub fn emit_level_calculated(opportunity_id: Option<&str>, level: RaiseLevel, rules_applied: usize) {
    debug!(
        event = "level.calculated",
        opportunity_id = opportunity_id.unwrap_or("-"),
        level = %level,
        rules_applied = rules_applied,
    );
}

/// Emit event: fast-track eligibility evaluated.
pub fn emit_fast_track_evaluated(opportunity_id: Option<&str>, eligible: bool, blockers: usize) {
    debug!(
        event = "fast_track.evaluated",
        opportunity_id = opportunity_id.unwrap_or("-"),
        eligible = eligible,
        blockers = blockers,
    );
}

/// Emit event: checkpoints resolved for a phase.
pub fn emit_checkpoints_resolved(phase: Phase, resolved: usize, rejected: usize, test_mode: bool) {
    debug!(
        event = "checkpoints.resolved",
        phase = %phase,
        resolved = resolved,
        rejected = rejected,
        test_mode = test_mode,
    );
}

/// Emit event: a condition failed to parse or evaluate (warning level).
pub fn emit_condition_rejected(condition: &str, error: &dyn std::fmt::Display) {
    warn!(event = "condition.rejected", condition = %condition, error = %error);
}

/// Emit event: no matrix entry matched a value (warning level).
pub fn emit_matrix_fallback(value: Decimal, entries: usize) {
    warn!(
        event = "matrix.fallback",
        value = %value,
        entries = entries,
        fallback = %RaiseLevel::MOST_SEVERE,
    );
}
