//! RAISE level calculation.
//!
//! Rules apply in a fixed order, each able to short-circuit the rest:
//!
//! 1. Social clauses or non-core business force [`RaiseLevel::MOST_SEVERE`].
//! 2. The base level comes from the authorization matrix on `raise_tcv`.
//! 3. Low-risk services worth at least the escalation threshold lift any
//!    less severe level to the escalation target (`L2`). That range is
//!    `L3` through `L6`: an `L3` base escalates too, not only the three
//!    least severe levels.
//! 4. KCP deviations or a new customer move `L6` or `L5` one step more
//!    severe. Both flags together still shift only once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Opportunity, RaiseLevel};
use crate::matrix::LevelLookup;
use crate::obs::emit_level_calculated;

/// Tunables of the override rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LevelRules {
    /// Services value (inclusive) from which low-risk services escalate.
    pub services_escalation_threshold: Decimal,
    /// Level low-risk services escalate to.
    pub services_escalation_target: RaiseLevel,
}

impl Default for LevelRules {
    fn default() -> Self {
        Self {
            services_escalation_threshold: Decimal::from(200_000),
            services_escalation_target: RaiseLevel::L2,
        }
    }
}

/// Why the forced level was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceReason {
    SocialClauses,
    NonCoreBusiness,
}

/// One rule that contributed to a level decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum AppliedRule {
    Forced {
        reason: ForceReason,
        level: RaiseLevel,
    },
    Base {
        value: Decimal,
        level: RaiseLevel,
    },
    ServicesEscalation {
        from: RaiseLevel,
        to: RaiseLevel,
    },
    Shift {
        from: RaiseLevel,
        to: RaiseLevel,
    },
}

/// The final level plus the rules that produced it, in application order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDecision {
    pub level: RaiseLevel,
    pub applied: Vec<AppliedRule>,
}

impl LevelDecision {
    /// Whether the direct-force rule decided the level.
    pub fn was_forced(&self) -> bool {
        matches!(self.applied.first(), Some(AppliedRule::Forced { .. }))
    }

    /// The matrix level before any override, if the matrix was consulted.
    pub fn base_level(&self) -> Option<RaiseLevel> {
        self.applied.iter().find_map(|r| match r {
            AppliedRule::Base { level, .. } => Some(*level),
            _ => None,
        })
    }
}

/// Calculate the RAISE level with the default [`LevelRules`].
pub fn calculate_raise_level(opp: &Opportunity, lookup: &impl LevelLookup) -> RaiseLevel {
    calculate_raise_level_with(opp, lookup, &LevelRules::default())
}

/// Calculate the RAISE level with explicit rule tunables.
pub fn calculate_raise_level_with(
    opp: &Opportunity,
    lookup: &impl LevelLookup,
    rules: &LevelRules,
) -> RaiseLevel {
    explain_raise_level(opp, lookup, rules).level
}

/// Calculate the RAISE level and record every rule that fired.
pub fn explain_raise_level(
    opp: &Opportunity,
    lookup: &impl LevelLookup,
    rules: &LevelRules,
) -> LevelDecision {
    let decision = decide(opp, lookup, rules);
    emit_level_calculated(opp.id.as_deref(), decision.level, decision.applied.len());
    crate::metrics::METRICS.inc_levels_calculated();
    decision
}

fn decide(opp: &Opportunity, lookup: &impl LevelLookup, rules: &LevelRules) -> LevelDecision {
    let forced = if opp.has_social_clauses {
        Some(ForceReason::SocialClauses)
    } else if opp.is_non_core_business {
        Some(ForceReason::NonCoreBusiness)
    } else {
        None
    };
    if let Some(reason) = forced {
        return LevelDecision {
            level: RaiseLevel::MOST_SEVERE,
            applied: vec![AppliedRule::Forced {
                reason,
                level: RaiseLevel::MOST_SEVERE,
            }],
        };
    }

    let mut level = lookup.level_for_value(opp.raise_tcv);
    let mut applied = vec![AppliedRule::Base {
        value: opp.raise_tcv,
        level,
    }];

    let services_value = opp.services_value.unwrap_or(Decimal::ZERO);
    if opp.has_low_risk_services
        && services_value >= rules.services_escalation_threshold
        && level < rules.services_escalation_target
    {
        let to = rules.services_escalation_target;
        applied.push(AppliedRule::ServicesEscalation { from: level, to });
        level = to;
    }

    if (opp.has_kcp_deviations || opp.is_new_customer)
        && matches!(level, RaiseLevel::L6 | RaiseLevel::L5)
    {
        let to = level.more_severe();
        applied.push(AppliedRule::Shift { from: level, to });
        level = to;
    }

    LevelDecision { level, applied }
}
