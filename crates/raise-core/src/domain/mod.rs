//! Domain models for the RAISE engine.
//!
//! Canonical definitions for the core entities:
//! - `Opportunity`: the deal under evaluation
//! - `Phase`: workflow stages of the approval process
//! - `RaiseLevel`: the authorization tier assigned to a deal

pub mod error;
pub mod level;
pub mod opportunity;
pub mod phase;

// Re-export main types and errors
pub use error::{RaiseError, Result};
pub use level::RaiseLevel;
pub use opportunity::Opportunity;
pub use phase::{workflow_phases, Phase};
