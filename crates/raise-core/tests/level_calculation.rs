//! Level calculation: rule ordering, overrides and matrix properties.

use raise_core::{
    calculate_raise_level, explain_raise_level, AppliedRule, AuthorizationMatrix, LevelLookup,
    LevelRules, MatrixEntry, Opportunity, RaiseLevel,
};
use rust_decimal::Decimal;

fn level(opp: &Opportunity) -> RaiseLevel {
    calculate_raise_level(opp, &AuthorizationMatrix::standard())
}

#[test]
fn test_small_clean_deal_gets_least_severe_level() {
    assert_eq!(level(&Opportunity::with_value(100_000)), RaiseLevel::L6);
}

#[test]
fn test_kcp_deviations_shift_one_step() {
    let opp = Opportunity::with_value(100_000).with_kcp_deviations(true);
    assert_eq!(level(&opp), RaiseLevel::L5);
}

#[test]
fn test_low_risk_services_escalate_to_l2() {
    let opp = Opportunity::with_value(5_000_000)
        .with_low_risk_services(true)
        .with_services_value(300_000);
    assert_eq!(level(&opp), RaiseLevel::L2);

    // KCP deviations change nothing once escalated.
    let with_kcp = opp.with_kcp_deviations(true);
    assert_eq!(level(&with_kcp), RaiseLevel::L2);
}

#[test]
fn test_social_clauses_win_over_everything() {
    let opp = Opportunity::with_value(50_000)
        .with_social_clauses(true)
        .with_non_core_business(true)
        .with_low_risk_services(true)
        .with_services_value(10_000_000)
        .with_kcp_deviations(true)
        .with_new_customer(true)
        .with_small_ticket(true);
    assert_eq!(level(&opp), RaiseLevel::MOST_SEVERE);
}

#[test]
fn test_force_rule_dominance_across_values() {
    for value in [0_i64, 1, 249_999, 5_000_000, 999_000_000_000] {
        for social in [true, false] {
            let opp = Opportunity::with_value(value)
                .with_social_clauses(social)
                .with_non_core_business(!social)
                .with_new_customer(value % 2 == 0);
            assert_eq!(level(&opp), RaiseLevel::L1, "value {value}");
        }
    }
}

#[test]
fn test_base_level_is_monotonic() {
    let matrix = AuthorizationMatrix::standard();
    let values: Vec<Decimal> = [
        0_i64, 1, 249_999, 250_000, 999_999, 1_000_000, 4_999_999, 5_000_000, 19_999_999,
        20_000_000, 49_999_999, 50_000_000, 800_000_000,
    ]
    .into_iter()
    .map(Decimal::from)
    .collect();

    for pair in values.windows(2) {
        let lower = matrix.level_for_value(pair[0]);
        let higher = matrix.level_for_value(pair[1]);
        assert!(
            higher >= lower,
            "{} -> {lower} but {} -> {higher}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_shift_is_idempotent_under_combination() {
    for value in [0_i64, 100_000, 300_000, 2_000_000, 6_000_000] {
        let kcp = Opportunity::with_value(value).with_kcp_deviations(true);
        let new_customer = Opportunity::with_value(value).with_new_customer(true);
        let both = Opportunity::with_value(value)
            .with_kcp_deviations(true)
            .with_new_customer(true);
        assert_eq!(level(&kcp), level(&both));
        assert_eq!(level(&new_customer), level(&both));
    }
}

#[test]
fn test_escalation_never_relaxes() {
    for value in [0_i64, 300_000, 2_000_000, 6_000_000, 25_000_000, 70_000_000] {
        let plain = Opportunity::with_value(value).with_services_value(500_000);
        let escalated = plain.clone().with_low_risk_services(true);
        let before = level(&plain);
        let after = level(&escalated);
        assert!(after >= before, "value {value}: {before} -> {after}");
        if before >= RaiseLevel::L2 {
            assert_eq!(before, after);
        }
    }
}

#[test]
fn test_missing_services_value_counts_as_zero() {
    let opp = Opportunity::with_value(100_000).with_low_risk_services(true);
    assert_eq!(level(&opp), RaiseLevel::L6);
}

#[test]
fn test_custom_matrix_is_injected() {
    let matrix = AuthorizationMatrix::new(vec![
        MatrixEntry::new(0, RaiseLevel::L4),
        MatrixEntry::new(1_000, RaiseLevel::L1),
    ])
    .unwrap();
    assert_eq!(
        calculate_raise_level(&Opportunity::with_value(999), &matrix),
        RaiseLevel::L4
    );
    assert_eq!(
        calculate_raise_level(&Opportunity::with_value(1_000), &matrix),
        RaiseLevel::L1
    );
}

#[test]
fn test_closure_lookup() {
    let lookup = |_: Decimal| RaiseLevel::L5;
    let opp = Opportunity::with_value(1).with_new_customer(true);
    assert_eq!(calculate_raise_level(&opp, &lookup), RaiseLevel::L4);
}

#[test]
fn test_empty_matrix_falls_back_to_most_severe() {
    let matrix = AuthorizationMatrix::from_entries_unchecked(Vec::new());
    assert_eq!(
        calculate_raise_level(&Opportunity::with_value(10), &matrix),
        RaiseLevel::MOST_SEVERE
    );
}

#[test]
fn test_explanation_serializes() {
    let opp = Opportunity::with_value(5_000_000)
        .with_low_risk_services(true)
        .with_services_value(300_000);
    let decision = explain_raise_level(&opp, &AuthorizationMatrix::standard(), &LevelRules::default());
    assert_eq!(
        decision.applied,
        vec![
            AppliedRule::Base {
                value: Decimal::from(5_000_000),
                level: RaiseLevel::L3
            },
            AppliedRule::ServicesEscalation {
                from: RaiseLevel::L3,
                to: RaiseLevel::L2
            },
        ]
    );
    let json = serde_json::to_value(&decision).unwrap();
    assert_eq!(json["level"], "L2");
    assert_eq!(json["applied"][1]["rule"], "services_escalation");
}
