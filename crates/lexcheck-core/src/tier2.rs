use crate::types::{
    CaseContext, ChargeClass, RankedPrecedent, SourceTier, TierResult, ValidationIssue,
};

/// Checks the top-ranked precedents' holdings for consistency with the
/// guidance's charge classification.
///
/// Only runs when Tier-1 cleared the gate (the engine enforces that). With
/// zero precedents, or no precedent carrying a known holding, the tier is
/// inconclusive rather than failed.
pub fn run(ctx: &CaseContext, precedents: &[RankedPrecedent]) -> TierResult {
    if precedents.is_empty() || ctx.charge_class == ChargeClass::Unknown {
        return TierResult::inconclusive("precedent");
    }

    let mut issues = Vec::new();
    let mut performed: u32 = 0;
    let mut passed: u32 = 0;

    for ranked in precedents {
        let Some(holding) = ranked.precedent.holding_class else {
            continue;
        };
        performed += 1;
        if holding == ctx.charge_class {
            passed += 1;
        } else {
            issues.push(ValidationIssue::warning(
                SourceTier::Tier2,
                format!(
                    "{} frames this charge as a {} but the guidance assumes a {}",
                    ranked.precedent.case_name,
                    holding.as_str(),
                    ctx.charge_class.as_str()
                ),
                Some(format!(
                    "Review {} before relying on {}-level guidance",
                    ranked.precedent.citation,
                    ctx.charge_class.as_str()
                )),
            ));
        }
    }

    TierResult::from_checks("precedent", performed, passed, issues)
}
