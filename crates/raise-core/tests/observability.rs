//! Observability tests for the RAISE engine.
//!
//! These tests verify that structured tracing events are emitted for level
//! calculation, fast-track checks, checkpoint resolution and rejected
//! conditions.

use raise_core::obs::{
    emit_checkpoints_resolved, emit_condition_rejected, emit_fast_track_evaluated,
    emit_level_calculated, emit_matrix_fallback,
};
use raise_core::{
    calculate_raise_level, evaluate_condition, get_required_checkpoints, AssessmentSpan,
    AuthorizationMatrix, ControlConfig, Opportunity, Phase, RaiseLevel, ResolverOptions,
    METRICS,
};
use rust_decimal::Decimal;
use tracing_test::traced_test;

#[traced_test]
#[test]
fn test_emit_level_calculated() {
    emit_level_calculated(Some("opp-1"), RaiseLevel::L3, 2);
    assert!(logs_contain("level.calculated"));
}

#[traced_test]
#[test]
fn test_emit_fast_track_evaluated() {
    emit_fast_track_evaluated(None, false, 3);
    assert!(logs_contain("fast_track.evaluated"));
}

#[traced_test]
#[test]
fn test_emit_checkpoints_resolved() {
    emit_checkpoints_resolved(Phase::Ats, 4, 1, true);
    assert!(logs_contain("checkpoints.resolved"));
}

#[traced_test]
#[test]
fn test_emit_condition_rejected_logs_warning() {
    emit_condition_rejected("opp.isRti ===", &"unexpected end of input");
    assert!(logs_contain("condition.rejected"));
}

#[traced_test]
#[test]
fn test_emit_matrix_fallback_logs_warning() {
    emit_matrix_fallback(Decimal::from(-5), 0);
    assert!(logs_contain("matrix.fallback"));
}

#[traced_test]
#[test]
fn test_assessment_span_enter() {
    let span = AssessmentSpan::enter("opp-span");
    emit_level_calculated(Some("opp-span"), RaiseLevel::L6, 1);
    drop(span);
    assert!(logs_contain("opp-span"));
}

#[traced_test]
#[test]
fn test_faulty_condition_is_logged_and_counted() {
    let before = METRICS.condition_failures();
    assert!(!evaluate_condition(Some("opp.isRti ==="), &Opportunity::default()));
    assert!(logs_contain("condition.rejected"));
    assert!(METRICS.condition_failures() > before);
}

#[traced_test]
#[test]
fn test_calculation_and_resolution_emit_events() {
    let opp = Opportunity::with_value(100_000);
    calculate_raise_level(&opp, &AuthorizationMatrix::standard());
    let controls = vec![ControlConfig::new("ethics", "Ethics", Phase::Atp).mandatory()];
    get_required_checkpoints(Phase::Atp, &opp, &controls, ResolverOptions::default());
    assert!(logs_contain("level.calculated"));
    assert!(logs_contain("checkpoints.resolved"));
}
