//! Engine settings: the matrix, the control list and the rule tunables.
//!
//! Settings are owned by an external collaborator. This module loads them
//! from TOML or JSON, validates them and freezes them into a
//! [`SettingsSnapshot`] that every evaluation borrows from.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::calculator::{explain_raise_level, LevelDecision, LevelRules};
use crate::checkpoints::{resolve_checkpoints, CheckpointResolution, ControlConfig, ResolverOptions};
use crate::condition::validate_condition;
use crate::domain::{Opportunity, Phase, RaiseError, Result};
use crate::fast_track::{FastTrackPolicy, FastTrackVerdict};
use crate::matrix::AuthorizationMatrix;

/// Complete engine configuration. Every section is optional in files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineSettings {
    pub matrix: AuthorizationMatrix,
    pub controls: Vec<ControlConfig>,
    pub fast_track: FastTrackPolicy,
    pub level_rules: LevelRules,
}

impl EngineSettings {
    /// Load and validate settings; the format follows the file extension
    /// (`.toml` or `.json`).
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let settings = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::from_toml_str(&raw)?,
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&raw)?,
            other => {
                return Err(RaiseError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };
        settings.validate()?;
        tracing::debug!(
            event = "settings.loaded",
            path = %path.display(),
            controls = settings.controls.len(),
            matrix_entries = settings.matrix.entries().len(),
        );
        Ok(settings)
    }

    /// Parse without validation.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Parse without validation.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Check the matrix, control ids and every control condition.
    ///
    /// # Errors
    ///
    /// `RaiseError::InvalidMatrix` for a broken matrix,
    /// `RaiseError::InvalidSettings` naming every faulty control otherwise.
    pub fn validate(&self) -> Result<()> {
        self.matrix.validate()?;

        let mut problems = Vec::new();
        let mut seen = HashSet::new();
        for control in &self.controls {
            if control.id.trim().is_empty() {
                problems.push(format!("control `{}` has an empty id", control.label));
            } else if !seen.insert(control.id.as_str()) {
                problems.push(format!("duplicate control id `{}`", control.id));
            }
            if let Some(condition) = control.condition.as_deref() {
                if let Err(err) = validate_condition(condition) {
                    problems.push(format!("control `{}`: {err}", control.id));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(RaiseError::InvalidSettings(problems.join("; ")))
        }
    }
}

/// Immutable, cheaply clonable view of one settings version.
///
/// Evaluating the same opportunity against several phases through one
/// snapshot guarantees a single configuration was used; the digest
/// identifies it.
#[derive(Debug, Clone)]
pub struct SettingsSnapshot {
    settings: Arc<EngineSettings>,
    digest: String,
}

impl SettingsSnapshot {
    pub fn new(settings: EngineSettings) -> Result<Self> {
        let bytes = serde_json::to_vec(&settings)?;
        let digest = hex::encode(Sha256::digest(&bytes));
        Ok(Self {
            settings: Arc::new(settings),
            digest,
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// SHA-256 of the canonical JSON form, lowercase hex.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Short form (first 12 hex chars).
    pub fn short_digest(&self) -> &str {
        &self.digest[..12.min(self.digest.len())]
    }

    pub fn explain_level(&self, opp: &Opportunity) -> LevelDecision {
        explain_raise_level(opp, &self.settings.matrix, &self.settings.level_rules)
    }

    pub fn fast_track(&self, opp: &Opportunity) -> FastTrackVerdict {
        self.settings.fast_track.evaluate(opp)
    }

    pub fn checkpoints(
        &self,
        phase: Phase,
        opp: &Opportunity,
        options: ResolverOptions,
    ) -> CheckpointResolution {
        resolve_checkpoints(phase, opp, &self.settings.controls, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RaiseLevel;
    use std::io::Write;

    const SAMPLE_TOML: &str = r#"
[fastTrack]
maxRaiseTcv = 100000

[levelRules]
servicesEscalationThreshold = 150000

[[matrix]]
threshold = 0
level = "L6"

[[matrix]]
threshold = 1000000
level = "L3"

[[controls]]
id = "ethics"
label = "Ethics declaration"
phase = "ALL"
isMandatory = true

[[controls]]
id = "rti-mandate"
label = "RTI mandate"
phase = "ATS"
isMandatory = true
condition = "opp.isRti === true && opp.isMandataria === true"
"#;

    #[test]
    fn test_defaults() {
        let s = EngineSettings::default();
        assert_eq!(s.matrix, AuthorizationMatrix::standard());
        assert!(s.controls.is_empty());
        s.validate().unwrap();
    }

    #[test]
    fn test_toml_sections() {
        let s = EngineSettings::from_toml_str(SAMPLE_TOML).unwrap();
        s.validate().unwrap();
        assert_eq!(s.fast_track.max_raise_tcv, rust_decimal::Decimal::from(100_000));
        assert_eq!(
            s.level_rules.services_escalation_threshold,
            rust_decimal::Decimal::from(150_000)
        );
        assert_eq!(s.level_rules.services_escalation_target, RaiseLevel::L2);
        assert_eq!(s.matrix.entries()[0].level, RaiseLevel::L3);
        assert_eq!(s.controls.len(), 2);
    }

    #[test]
    fn test_json_partial_settings() {
        let s = EngineSettings::from_json_str(r#"{"controls": []}"#).unwrap();
        assert_eq!(s.matrix, AuthorizationMatrix::standard());
    }

    #[test]
    fn test_validate_reports_every_faulty_control() {
        let mut s = EngineSettings::default();
        s.controls = vec![
            ControlConfig::new("a", "A", Phase::Atp).with_condition("opp.isRti ==="),
            ControlConfig::new("a", "A again", Phase::Atp),
            ControlConfig::new("b", "B", Phase::Atp).with_condition("opp.customerRef"),
        ];
        let err = s.validate().unwrap_err().to_string();
        assert!(err.contains("control `a`"));
        assert!(err.contains("duplicate control id `a`"));
        assert!(err.contains("customerRef"));
    }

    #[test]
    fn test_load_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(SAMPLE_TOML.as_bytes()).unwrap();
        let s = EngineSettings::load(file.path()).unwrap();
        assert_eq!(s.controls.len(), 2);

        let mut other = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        other.write_all(b"controls: []").unwrap();
        assert!(matches!(
            EngineSettings::load(other.path()),
            Err(RaiseError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_snapshot_digest_is_stable_and_sensitive() {
        let a = SettingsSnapshot::new(EngineSettings::default()).unwrap();
        let b = SettingsSnapshot::new(EngineSettings::default()).unwrap();
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
        assert_eq!(a.short_digest().len(), 12);

        let mut changed = EngineSettings::default();
        changed.controls.push(ControlConfig::new("x", "X", Phase::Atp));
        let c = SettingsSnapshot::new(changed).unwrap();
        assert_ne!(a.digest(), c.digest());
    }

    #[test]
    fn test_snapshot_clones_share_settings() {
        let a = SettingsSnapshot::new(EngineSettings::default()).unwrap();
        let b = a.clone();
        assert!(std::ptr::eq(a.settings(), b.settings()));
    }
}
