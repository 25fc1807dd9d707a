//! Checkpoint resolution.
//!
//! Turns the configured control list into the checkpoints an opportunity
//! must clear in a given phase:
//!
//! - **Controls** (`control.rs`): `ControlConfig` as stored by the settings
//!   layer and the `Checkpoint` handed to the workflow.
//! - **Resolver** (`resolver.rs`): phase filter, condition filter and the
//!   test-mode override.

pub mod control;
pub mod resolver;

pub use control::{Checkpoint, ControlConfig, PhaseScope};
pub use resolver::{
    get_required_checkpoints, resolve_checkpoints, CheckpointResolution, ConditionFailure,
    ResolverOptions,
};
