use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;

use crate::sources::RuleTable;
use crate::types::{CaseContext, GuidanceStatement, SourceTier, TierResult, ValidationIssue};

/// Outcome of the statute tier, with the timeout count the engine uses to
/// detect total collaborator unavailability.
#[derive(Debug)]
pub struct Tier1Outcome {
    pub result: TierResult,
    pub lookups_unavailable: u32,
}

/// Checks each guidance statement against the jurisdiction rule table.
///
/// Per statement: pass on exact match, Warning when the rule differs, Info
/// when no rule exists for the pair (absence is surfaced, never silently
/// assumed correct), Info when the lookup itself times out. Always runs;
/// with zero statements the result is inconclusive.
pub async fn run(
    ctx: &CaseContext,
    statements: &[GuidanceStatement],
    rules: &dyn RuleTable,
    deadline: Duration,
) -> Tier1Outcome {
    let mut issues = Vec::new();
    let mut performed: u32 = 0;
    let mut passed: u32 = 0;
    let mut unavailable: u32 = 0;

    for stmt in statements {
        performed += 1;
        let lookup = timeout(
            deadline,
            rules.lookup(&ctx.jurisdiction, &stmt.statement_type),
        )
        .await;

        match lookup {
            Ok(Ok(Some(rule))) => {
                if rule.expected_value.trim() == stmt.claimed_value.trim() {
                    passed += 1;
                } else {
                    let suggestion = match &rule.citation {
                        Some(cite) => {
                            format!("Authoritative value is {} ({cite})", rule.expected_value)
                        }
                        None => format!("Authoritative value is {}", rule.expected_value),
                    };
                    issues.push(ValidationIssue::warning(
                        SourceTier::Tier1,
                        format!(
                            "{} guidance states {} but the {} rule says {}",
                            stmt.statement_type,
                            stmt.claimed_value,
                            ctx.jurisdiction,
                            rule.expected_value
                        ),
                        Some(suggestion),
                    ));
                }
            }
            Ok(Ok(None)) => {
                issues.push(ValidationIssue::info(
                    SourceTier::Tier1,
                    format!(
                        "no authoritative rule recorded for {} in {}",
                        stmt.statement_type, ctx.jurisdiction
                    ),
                ));
            }
            Ok(Err(e)) => {
                debug!("rule lookup failed for {}: {e}", stmt.statement_type);
                unavailable += 1;
                issues.push(ValidationIssue::info(
                    SourceTier::Tier1,
                    format!("rule lookup unavailable for {}", stmt.statement_type),
                ));
            }
            Err(_) => {
                debug!("rule lookup timed out for {}", stmt.statement_type);
                unavailable += 1;
                issues.push(ValidationIssue::info(
                    SourceTier::Tier1,
                    format!("rule lookup unavailable for {}", stmt.statement_type),
                ));
            }
        }
    }

    Tier1Outcome {
        result: TierResult::from_checks("statute", performed, passed, issues),
        lookups_unavailable: unavailable,
    }
}
