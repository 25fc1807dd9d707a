//! RAISE Core Library
//!
//! Authorization-level engine for commercial opportunities: the RAISE level
//! calculator, fast-track eligibility, a safe condition language and the
//! per-phase checkpoint resolver.

pub mod assessment;
pub mod calculator;
pub mod checkpoints;
pub mod condition;
pub mod domain;
pub mod fast_track;
pub mod matrix;
pub mod metrics;
pub mod obs;
pub mod settings;
pub mod telemetry;
pub mod test_mode;

pub use assessment::{assess, Assessment};
pub use calculator::{
    calculate_raise_level, calculate_raise_level_with, explain_raise_level, AppliedRule,
    ForceReason, LevelDecision, LevelRules,
};
pub use checkpoints::{
    get_required_checkpoints, resolve_checkpoints, Checkpoint, CheckpointResolution,
    ConditionFailure, ControlConfig, PhaseScope, ResolverOptions,
};
pub use condition::{
    evaluate_condition, parse_condition, try_evaluate_condition, validate_condition, Condition,
    ConditionError, FieldSource, Value,
};
pub use domain::{workflow_phases, Opportunity, Phase, RaiseError, RaiseLevel, Result};
pub use fast_track::{is_fast_track_eligible, FastTrackBlocker, FastTrackPolicy, FastTrackVerdict};
pub use matrix::{AuthorizationMatrix, LevelLookup, MatrixEntry};
pub use settings::{EngineSettings, SettingsSnapshot};
pub use test_mode::{JsonFileStore, KeyValueStore, MemoryStore, TestMode, TEST_MODE_KEY};

pub use metrics::METRICS;
pub use obs::AssessmentSpan;
pub use telemetry::{init_tracing, TelemetryConfig};

/// RAISE engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
