//! Safe evaluation of control conditions.
//!
//! Conditions are small boolean expressions stored in control configuration,
//! such as `opp.isRti === true && opp.isMandataria === true`. They are parsed
//! into a [`Condition`] tree and evaluated against a [`FieldSource`] that
//! exposes only whitelisted opportunity fields. Nothing is ever executed.
//!
//! - **Grammar** (`parser.rs`): field references, literals, comparisons,
//!   `&&`, `||`, `!` and parentheses.
//! - **Evaluation** (`ast.rs`): strict typed comparisons.
//! - **Fields** (`fields.rs`): the opportunity whitelist.
//!
//! Evaluation fails closed: a condition that cannot be parsed or evaluated
//! counts as unsatisfied.

pub mod ast;
pub mod error;
pub mod fields;
pub mod parser;

pub use ast::{CmpOp, Condition, Operand, Value};
pub use error::{ConditionError, ConditionResult};
pub use fields::{is_opportunity_field, FieldSource, OPPORTUNITY_FIELDS};
pub use parser::parse_condition;

use crate::metrics::METRICS;
use crate::obs::emit_condition_rejected;

/// Whether an expression is absent in effect (empty or whitespace only).
pub fn is_blank(expression: &str) -> bool {
    expression.trim().is_empty()
}

/// Parse and evaluate `expression`, reporting any failure.
///
/// A blank expression is always satisfied.
pub fn try_evaluate_condition(
    expression: &str,
    source: &dyn FieldSource,
) -> ConditionResult<bool> {
    if is_blank(expression) {
        return Ok(true);
    }
    parse_condition(expression)?.evaluate(source)
}

/// Evaluate an optional condition, failing closed.
///
/// `None` and blank expressions are satisfied. Parse and evaluation errors
/// yield `false` and are logged as `condition.rejected` warnings; use
/// [`try_evaluate_condition`] to receive the error itself.
pub fn evaluate_condition(expression: Option<&str>, source: &dyn FieldSource) -> bool {
    let Some(expression) = expression else {
        return true;
    };
    match try_evaluate_condition(expression, source) {
        Ok(satisfied) => satisfied,
        Err(err) => {
            METRICS.inc_condition_failures();
            emit_condition_rejected(expression, &err);
            false
        }
    }
}

/// Check that `expression` parses and reads only opportunity fields.
///
/// Intended for settings editors, which have no opportunity at hand.
pub fn validate_condition(expression: &str) -> ConditionResult<()> {
    if is_blank(expression) {
        return Ok(());
    }
    let condition = parse_condition(expression)?;
    match condition
        .referenced_fields()
        .into_iter()
        .find(|name| !is_opportunity_field(name))
    {
        Some(unknown) => Err(ConditionError::UnknownField(unknown.to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Opportunity, Phase};

    fn rti(is_rti: bool, is_mandataria: bool) -> Opportunity {
        Opportunity::with_value(1_000_000).with_rti(is_rti, is_mandataria)
    }

    const JOINT_LEAD: &str = "opp.isRti === true && opp.isMandataria === true";

    #[test]
    fn test_blank_and_absent_are_satisfied() {
        let opp = Opportunity::default();
        assert!(evaluate_condition(None, &opp));
        assert!(evaluate_condition(Some(""), &opp));
        assert!(evaluate_condition(Some("   "), &opp));
    }

    #[test]
    fn test_joint_venture_lead() {
        assert!(!evaluate_condition(Some(JOINT_LEAD), &rti(true, false)));
        assert!(evaluate_condition(Some(JOINT_LEAD), &rti(true, true)));
        assert!(!evaluate_condition(Some(JOINT_LEAD), &rti(false, true)));
    }

    #[test]
    fn test_or_and_not() {
        let expr = "opp.isNewCustomer || !opp.isRti";
        assert!(evaluate_condition(Some(expr), &rti(false, false)));
        assert!(!evaluate_condition(Some(expr), &rti(true, false)));
        let newcomer = rti(true, false).with_new_customer(true);
        assert!(evaluate_condition(Some(expr), &newcomer));
    }

    #[test]
    fn test_numeric_and_text_comparisons() {
        let opp = Opportunity::with_value(300_000).in_phase(Phase::Atc);
        assert!(evaluate_condition(Some("opp.raiseTcv >= 300000"), &opp));
        assert!(!evaluate_condition(Some("opp.raiseTcv > 300000"), &opp));
        assert!(evaluate_condition(Some("opp.currentPhase === 'ATC'"), &opp));
        assert!(evaluate_condition(Some("opp.servicesValue === null"), &opp));
    }

    #[test]
    fn test_mismatched_types_are_unequal() {
        let opp = rti(true, true);
        assert!(!evaluate_condition(Some("opp.isRti === 'true'"), &opp));
        assert!(!evaluate_condition(Some("opp.isRti === 1"), &opp));
    }

    #[test]
    fn test_fails_closed() {
        let opp = rti(true, true);
        assert!(!evaluate_condition(Some("opp.isRti === "), &opp));
        assert!(!evaluate_condition(Some("opp.secret === true"), &opp));
        assert!(!evaluate_condition(Some("opp.isRti || opp.unknown"), &opp));
        assert!(!evaluate_condition(Some("opp.currentPhase > 3"), &opp));
        assert!(!evaluate_condition(Some("opp.tcv"), &opp));
    }

    #[test]
    fn test_try_evaluate_reports_cause() {
        let opp = Opportunity::default();
        assert_eq!(
            try_evaluate_condition("opp.nope", &opp),
            Err(ConditionError::UnknownField("nope".into()))
        );
        assert!(matches!(
            try_evaluate_condition("opp.isRti ===", &opp),
            Err(ConditionError::Parse { .. })
        ));
        assert!(matches!(
            try_evaluate_condition("opp.title < 3", &opp),
            Err(ConditionError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_validate_condition() {
        assert!(validate_condition(JOINT_LEAD).is_ok());
        assert!(validate_condition("").is_ok());
        assert_eq!(
            validate_condition("opp.isRti && opp.customerRef === 'x'"),
            Err(ConditionError::UnknownField("customerRef".into()))
        );
        assert!(validate_condition("opp.isRti ==").is_err());
    }
}
