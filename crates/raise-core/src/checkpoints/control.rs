//! Control configuration and the checkpoints derived from it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::Phase;

/// Which phases a control applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseScope {
    /// Cross-phase control (`"ALL"`).
    All,
    Phase(Phase),
}

impl PhaseScope {
    pub fn applies_to(self, phase: Phase) -> bool {
        match self {
            Self::All => true,
            Self::Phase(p) => p == phase,
        }
    }
}

impl From<Phase> for PhaseScope {
    fn from(phase: Phase) -> Self {
        Self::Phase(phase)
    }
}

impl std::fmt::Display for PhaseScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Phase(p) => write!(f, "{p}"),
        }
    }
}

impl std::str::FromStr for PhaseScope {
    type Err = crate::domain::RaiseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("ALL") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Phase)
        }
    }
}

impl Serialize for PhaseScope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PhaseScope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A configured checkpoint definition, owned by the settings collaborator.
///
/// Display metadata (`order`, `action_type`, `details_template`, `note` and
/// anything in `extra`) is carried through to the resolved checkpoint
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlConfig {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub phase: PhaseScope,
    #[serde(default)]
    pub is_mandatory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ControlConfig {
    /// Unconditioned, non-mandatory control.
    pub fn new(id: impl Into<String>, label: impl Into<String>, phase: impl Into<PhaseScope>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: String::new(),
            phase: phase.into(),
            is_mandatory: false,
            condition: None,
            order: None,
            action_type: None,
            details_template: None,
            note: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn mandatory(mut self) -> Self {
        self.is_mandatory = true;
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }
}

/// A checkpoint resolved for one phase of one opportunity.
///
/// Created fresh on every resolution. `checked` and `attachments` start
/// empty; tracking them is the workflow layer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub id: String,
    pub label: String,
    pub description: String,
    pub required: bool,
    pub checked: bool,
    pub attachments: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Checkpoint {
    /// Fresh, unchecked checkpoint for `control`.
    pub fn from_control(control: &ControlConfig, required: bool) -> Self {
        Self {
            id: control.id.clone(),
            label: control.label.clone(),
            description: control.description.clone(),
            required,
            checked: false,
            attachments: Vec::new(),
            order: control.order,
            action_type: control.action_type.clone(),
            details_template: control.details_template.clone(),
            note: control.note.clone(),
            extra: control.extra.clone(),
        }
    }

    /// Whether this checkpoint still blocks advancing the phase.
    pub fn is_blocking(&self) -> bool {
        self.required && !self.checked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_scope_parse() {
        assert_eq!("ALL".parse::<PhaseScope>().unwrap(), PhaseScope::All);
        assert_eq!(
            "atp".parse::<PhaseScope>().unwrap(),
            PhaseScope::Phase(Phase::Atp)
        );
        assert!("NEVER".parse::<PhaseScope>().is_err());
    }

    #[test]
    fn test_phase_scope_applies_to() {
        assert!(PhaseScope::All.applies_to(Phase::Handover));
        assert!(PhaseScope::Phase(Phase::Ats).applies_to(Phase::Ats));
        assert!(!PhaseScope::Phase(Phase::Ats).applies_to(Phase::Atc));
    }

    #[test]
    fn test_control_config_from_json() {
        let json = r#"{
            "id": "rti-mandate",
            "label": "RTI mandate signed",
            "phase": "ATS",
            "isMandatory": true,
            "condition": "opp.isRti === true && opp.isMandataria === true",
            "order": 3,
            "detailsTemplate": "Upload the mandate",
            "owner": "legal"
        }"#;
        let control: ControlConfig = serde_json::from_str(json).unwrap();
        assert_eq!(control.phase, PhaseScope::Phase(Phase::Ats));
        assert!(control.is_mandatory);
        assert_eq!(control.order, Some(3));
        assert_eq!(control.description, "");
        assert_eq!(control.extra["owner"], "legal");

        let cp = Checkpoint::from_control(&control, control.is_mandatory);
        let out = serde_json::to_value(&cp).unwrap();
        assert_eq!(out["required"], true);
        assert_eq!(out["checked"], false);
        assert_eq!(out["attachments"], serde_json::json!([]));
        assert_eq!(out["detailsTemplate"], "Upload the mandate");
        assert_eq!(out["owner"], "legal");
    }

    #[test]
    fn test_phase_scope_serializes_as_text() {
        let control = ControlConfig::new("x", "X", PhaseScope::All);
        let out = serde_json::to_value(&control).unwrap();
        assert_eq!(out["phase"], "ALL");
    }
}
