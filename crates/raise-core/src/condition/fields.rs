//! Whitelisted field access for condition evaluation.

use std::collections::BTreeMap;

use super::ast::Value;
use crate::domain::Opportunity;

/// Read-only view of the fields a condition may reference.
///
/// Returning `None` means the field does not exist; the evaluator reports
/// it as unknown.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<Value>;
}

/// Every opportunity field a condition can read.
pub const OPPORTUNITY_FIELDS: &[&str] = &[
    "id",
    "title",
    "tcv",
    "raiseTcv",
    "servicesValue",
    "hasSocialClauses",
    "isNonCoreBusiness",
    "hasLowRiskServices",
    "hasKcpDeviations",
    "isNewCustomer",
    "isSmallTicket",
    "isRti",
    "isMandataria",
    "currentPhase",
];

/// Whether `name` is readable from an [`Opportunity`].
pub fn is_opportunity_field(name: &str) -> bool {
    OPPORTUNITY_FIELDS.contains(&name)
}

fn text(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |s| Value::Text(s.clone()))
}

impl FieldSource for Opportunity {
    fn field(&self, name: &str) -> Option<Value> {
        let value = match name {
            "id" => text(self.id.as_ref()),
            "title" => text(self.title.as_ref()),
            "tcv" => Value::Number(self.tcv),
            "raiseTcv" => Value::Number(self.raise_tcv),
            "servicesValue" => self.services_value.map_or(Value::Null, Value::Number),
            "hasSocialClauses" => Value::Bool(self.has_social_clauses),
            "isNonCoreBusiness" => Value::Bool(self.is_non_core_business),
            "hasLowRiskServices" => Value::Bool(self.has_low_risk_services),
            "hasKcpDeviations" => Value::Bool(self.has_kcp_deviations),
            "isNewCustomer" => Value::Bool(self.is_new_customer),
            "isSmallTicket" => Value::Bool(self.is_small_ticket),
            "isRti" => Value::Bool(self.is_rti),
            "isMandataria" => Value::Bool(self.is_mandataria),
            "currentPhase" => Value::Text(self.current_phase.as_str().to_string()),
            _ => return None,
        };
        Some(value)
    }
}

impl FieldSource for BTreeMap<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}
