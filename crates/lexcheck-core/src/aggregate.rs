use crate::config::RankingPolicy;
use crate::types::{
    GuidanceValidation, IssueKind, RankedPrecedent, TierBreakdown, TierResult, ValidationIssue,
};

/// Combines tier results, retrieval issues, and the ranked precedent list
/// into the response envelope.
///
/// Confidence is `tier1 * 0.6 + tier2 * 0.4`, where an absent or
/// inconclusive Tier-2 contributes the fixed neutral discount instead of its
/// score: 0.0 would unfairly tank confidence, 1.0 would be misleading.
pub fn combine(
    tier1: TierResult,
    tier2: Option<TierResult>,
    retrieval_issues: Vec<ValidationIssue>,
    precedents: Vec<RankedPrecedent>,
    policy: &RankingPolicy,
) -> GuidanceValidation {
    let tier2_component = match &tier2 {
        Some(t) if !t.inconclusive => t.score,
        _ => policy.tier2_neutral,
    };
    let confidence_score = (tier1.score * policy.tier1_weight
        + tier2_component * policy.tier2_weight)
        .clamp(0.0, 1.0);

    let checks_performed =
        tier1.checks_performed + tier2.as_ref().map_or(0, |t| t.checks_performed);
    let checks_passed = tier1.checks_passed + tier2.as_ref().map_or(0, |t| t.checks_passed);

    // Merge in tier order, then stable-sort into severity bands so relative
    // tier order is preserved within each band.
    let mut issues: Vec<ValidationIssue> = tier1.issues.clone();
    issues.extend(retrieval_issues);
    if let Some(t2) = &tier2 {
        issues.extend(t2.issues.clone());
    }
    issues.sort_by_key(|i| i.kind.rank());

    let is_valid = confidence_score >= policy.valid_threshold
        && !issues.iter().any(|i| i.kind == IssueKind::Error);

    GuidanceValidation {
        confidence_score,
        is_valid,
        checks_performed,
        checks_passed,
        issues,
        tiers: TierBreakdown { tier1, tier2 },
        precedents,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceTier;

    fn tier(name: &str, performed: u32, passed: u32) -> TierResult {
        TierResult::from_checks(name, performed, passed, Vec::new())
    }

    #[test]
    fn confidence_uses_both_tiers_when_tier2_conclusive() {
        let policy = RankingPolicy::default();
        let out = combine(tier("statute", 5, 4), Some(tier("precedent", 2, 2)), Vec::new(), Vec::new(), &policy);
        assert!((out.confidence_score - 0.88).abs() < 1e-9);
        assert!(out.is_valid);
    }

    #[test]
    fn inconclusive_tier2_takes_neutral_discount() {
        let policy = RankingPolicy::default();
        let out = combine(tier("statute", 5, 4), Some(TierResult::inconclusive("precedent")), Vec::new(), Vec::new(), &policy);
        assert!((out.confidence_score - 0.64).abs() < 1e-9);
        assert!(out.is_valid);
    }

    #[test]
    fn absent_tier2_takes_neutral_discount() {
        let policy = RankingPolicy::default();
        let out = combine(tier("statute", 5, 1), None, Vec::new(), Vec::new(), &policy);
        assert!((out.confidence_score - (0.2 * 0.6 + 0.4 * 0.4)).abs() < 1e-9);
        assert!(!out.is_valid);
    }

    #[test]
    fn issues_band_by_severity_preserving_tier_order() {
        let policy = RankingPolicy::default();
        let mut t1 = tier("statute", 2, 1);
        t1.issues = vec![
            ValidationIssue::info(SourceTier::Tier1, "t1 info"),
            ValidationIssue::warning(SourceTier::Tier1, "t1 warning", None),
        ];
        let mut t2 = tier("precedent", 1, 0);
        t2.issues = vec![ValidationIssue::warning(SourceTier::Tier2, "t2 warning", None)];

        let out = combine(t1, Some(t2), Vec::new(), Vec::new(), &policy);
        let messages: Vec<&str> = out.issues.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["t1 warning", "t2 warning", "t1 info"]);
    }
}
