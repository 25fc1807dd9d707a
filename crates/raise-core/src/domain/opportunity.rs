//! The opportunity record evaluated by the engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::phase::Phase;

/// A business opportunity, as supplied by the surrounding workflow layer.
///
/// Field names follow the web layer's camelCase JSON. Absent boolean flags
/// read as `false` and absent amounts as zero. Fields the engine does not
/// read are preserved in `extra` and round-trip untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Opportunity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Committed total contract value.
    pub tcv: Decimal,
    /// TCV including optional contract parts. Basis for the level.
    pub raise_tcv: Decimal,
    /// Value of the services component, when known.
    pub services_value: Option<Decimal>,

    pub has_social_clauses: bool,
    pub is_non_core_business: bool,
    pub has_low_risk_services: bool,
    pub has_kcp_deviations: bool,
    pub is_new_customer: bool,
    pub is_small_ticket: bool,
    /// Temporary joint venture (RTI) bid.
    pub is_rti: bool,
    /// Lead partner of the joint venture.
    pub is_mandataria: bool,

    pub current_phase: Phase,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Opportunity {
    /// Opportunity with both TCV figures set to `value` and every flag cleared.
    pub fn with_value(value: impl Into<Decimal>) -> Self {
        let value = value.into();
        Self {
            tcv: value,
            raise_tcv: value,
            ..Self::default()
        }
    }

    pub fn with_raise_tcv(mut self, raise_tcv: impl Into<Decimal>) -> Self {
        self.raise_tcv = raise_tcv.into();
        self
    }

    pub fn with_services_value(mut self, services_value: impl Into<Decimal>) -> Self {
        self.services_value = Some(services_value.into());
        self
    }

    pub fn with_social_clauses(mut self, value: bool) -> Self {
        self.has_social_clauses = value;
        self
    }

    pub fn with_non_core_business(mut self, value: bool) -> Self {
        self.is_non_core_business = value;
        self
    }

    pub fn with_low_risk_services(mut self, value: bool) -> Self {
        self.has_low_risk_services = value;
        self
    }

    pub fn with_kcp_deviations(mut self, value: bool) -> Self {
        self.has_kcp_deviations = value;
        self
    }

    pub fn with_new_customer(mut self, value: bool) -> Self {
        self.is_new_customer = value;
        self
    }

    pub fn with_small_ticket(mut self, value: bool) -> Self {
        self.is_small_ticket = value;
        self
    }

    pub fn with_rti(mut self, is_rti: bool, is_mandataria: bool) -> Self {
        self.is_rti = is_rti;
        self.is_mandataria = is_mandataria;
        self
    }

    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.current_phase = phase;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_flags_default_to_false() {
        let opp: Opportunity = serde_json::from_str(r#"{"tcv": 1000, "raiseTcv": 1200}"#).unwrap();
        assert_eq!(opp.raise_tcv, Decimal::from(1200));
        assert!(!opp.has_social_clauses);
        assert!(!opp.is_small_ticket);
        assert_eq!(opp.services_value, None);
        assert_eq!(opp.current_phase, Phase::Planning);
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let json = r#"{
            "title": "Metro line maintenance",
            "raiseTcv": 300000,
            "customerRef": "C-0042",
            "currentPhase": "ATP"
        }"#;
        let opp: Opportunity = serde_json::from_str(json).unwrap();
        assert_eq!(opp.title.as_deref(), Some("Metro line maintenance"));
        assert_eq!(opp.current_phase, Phase::Atp);
        assert_eq!(
            opp.extra.get("customerRef"),
            Some(&serde_json::Value::String("C-0042".into()))
        );

        let back = serde_json::to_value(&opp).unwrap();
        assert_eq!(back["customerRef"], "C-0042");
    }

    #[test]
    fn test_builder_helpers() {
        let opp = Opportunity::with_value(100_000)
            .with_kcp_deviations(true)
            .with_rti(true, false)
            .in_phase(Phase::Atc);
        assert_eq!(opp.tcv, Decimal::from(100_000));
        assert_eq!(opp.raise_tcv, Decimal::from(100_000));
        assert!(opp.has_kcp_deviations);
        assert!(opp.is_rti);
        assert!(!opp.is_mandataria);
        assert_eq!(opp.current_phase, Phase::Atc);
    }
}
