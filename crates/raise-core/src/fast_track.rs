//! Fast-track eligibility.
//!
//! Independent of the level calculator: a deal qualifies for the expedited
//! path only when its RAISE TCV is below the small-value threshold and none
//! of the inhibiting flags is set. A small-ticket flag inhibits fast-track;
//! small tickets are pre-approved through a separate channel.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Opportunity;
use crate::obs::emit_fast_track_evaluated;

/// A condition preventing fast-track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "blocker", rename_all = "snake_case")]
pub enum FastTrackBlocker {
    RaiseTcvAtOrAboveThreshold { raise_tcv: Decimal, threshold: Decimal },
    KcpDeviations,
    NewCustomer,
    SmallTicket,
}

impl std::fmt::Display for FastTrackBlocker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RaiseTcvAtOrAboveThreshold {
                raise_tcv,
                threshold,
            } => write!(f, "RAISE TCV {raise_tcv} is not below {threshold}"),
            Self::KcpDeviations => write!(f, "deviations from key contracting principles"),
            Self::NewCustomer => write!(f, "new customer"),
            Self::SmallTicket => write!(f, "small ticket without pre-approval"),
        }
    }
}

/// Outcome of a fast-track evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FastTrackVerdict {
    /// Every inhibitor found (empty when eligible).
    pub blockers: Vec<FastTrackBlocker>,
}

impl FastTrackVerdict {
    pub fn eligible(&self) -> bool {
        self.blockers.is_empty()
    }
}

/// Configurable fast-track thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FastTrackPolicy {
    /// RAISE TCV must be strictly below this value.
    pub max_raise_tcv: Decimal,
}

impl Default for FastTrackPolicy {
    fn default() -> Self {
        Self {
            max_raise_tcv: Decimal::from(250_000),
        }
    }
}

impl FastTrackPolicy {
    /// Collect every fast-track blocker for `opp`.
    pub fn evaluate(&self, opp: &Opportunity) -> FastTrackVerdict {
        let mut blockers = Vec::new();

        if opp.raise_tcv >= self.max_raise_tcv {
            blockers.push(FastTrackBlocker::RaiseTcvAtOrAboveThreshold {
                raise_tcv: opp.raise_tcv,
                threshold: self.max_raise_tcv,
            });
        }
        if opp.has_kcp_deviations {
            blockers.push(FastTrackBlocker::KcpDeviations);
        }
        if opp.is_new_customer {
            blockers.push(FastTrackBlocker::NewCustomer);
        }
        if opp.is_small_ticket {
            blockers.push(FastTrackBlocker::SmallTicket);
        }

        let verdict = FastTrackVerdict { blockers };
        emit_fast_track_evaluated(opp.id.as_deref(), verdict.eligible(), verdict.blockers.len());
        verdict
    }

    pub fn is_eligible(&self, opp: &Opportunity) -> bool {
        self.evaluate(opp).eligible()
    }
}

/// Fast-track eligibility under the default policy.
pub fn is_fast_track_eligible(opp: &Opportunity) -> bool {
    FastTrackPolicy::default().is_eligible(opp)
}
