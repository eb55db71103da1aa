use attendance_core::{classify, project, Projection, ProjectionKind, RiskTier, DEFAULT_THRESHOLD};

#[test]
fn classify_covers_each_tier_range() {
    let mut tenths = 0;
    while tenths <= 1000 {
        let percentage = f64::from(tenths) / 10.0;
        let expected = if percentage < 75.0 {
            RiskTier::AtRisk
        } else if percentage <= 80.0 {
            RiskTier::NearRisk
        } else {
            RiskTier::Safe
        };
        assert_eq!(classify(percentage), expected, "percentage={percentage}");
        tenths += 1;
    }
}

#[test]
fn reference_projection_examples() {
    assert_eq!(project(30, 50), Projection::needed(30));
    assert_eq!(project(40, 50), Projection::safe_margin(3));
    assert_eq!(project(0, 0), Projection::safe_margin(0));
}

#[test]
fn never_attended_needs_three_times_total() {
    // (0 + n) / (10 + n) >= 0.75  <=>  n >= 30
    assert_eq!(project(0, 10), Projection::needed(30));
}

#[test]
fn projections_are_tight_across_small_counts() {
    for total in 1..=60u32 {
        for present in 0..=total {
            let projection = project(present, total);
            let ratio_ok = |p: u32, t: u32| f64::from(p) >= DEFAULT_THRESHOLD * f64::from(t);

            match projection.kind {
                ProjectionKind::Needed => {
                    let n = projection.count;
                    assert!(n >= 1);
                    assert!(ratio_ok(present + n, total + n), "{present}/{total} n={n}");
                    assert!(
                        !ratio_ok(present + n - 1, total + n - 1),
                        "{present}/{total} n={n} is not minimal"
                    );
                }
                ProjectionKind::SafeMargin => {
                    let n = projection.count;
                    assert!(ratio_ok(present, total + n), "{present}/{total} n={n}");
                    assert!(
                        !ratio_ok(present, total + n + 1),
                        "{present}/{total} n={n} is not maximal"
                    );
                }
            }
        }
    }
}

#[test]
fn near_risk_counts_never_need_sessions() {
    // Consistent percentages: anything >= 75% must project a margin.
    for (present, total) in [(15u32, 20u32), (16, 20), (3, 4), (4, 5)] {
        let percentage = f64::from(present) * 100.0 / f64::from(total);
        assert_ne!(classify(percentage), RiskTier::AtRisk);
        assert_eq!(project(present, total).kind, ProjectionKind::SafeMargin);
    }
}
