use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::timeout;
use tracing::warn;

use crate::config::RankingPolicy;
use crate::db::Db;
use crate::sources::CaseLawCorpus;
use crate::types::{
    CaseContext, PrecedentCase, RankedPrecedent, RelevanceWeight, SourceTier, ValidationIssue,
};

/// Outcome of precedent retrieval. A timeout yields an empty list plus an
/// Info issue, equivalent to "no precedents found", never a request failure.
#[derive(Debug)]
pub struct RetrievalOutcome {
    pub precedents: Vec<RankedPrecedent>,
    pub issues: Vec<ValidationIssue>,
    pub timed_out: bool,
}

/// Queries the corpus, scores candidates against stored relevance weights,
/// and returns the deterministic top-N ranking.
pub async fn run(
    ctx: &CaseContext,
    corpus: &dyn CaseLawCorpus,
    db: &Db,
    policy: &RankingPolicy,
    deadline: Duration,
    as_of: DateTime<Utc>,
) -> RetrievalOutcome {
    let candidates = match timeout(
        deadline,
        corpus.find_candidates(&ctx.jurisdiction, &ctx.charge_categories),
    )
    .await
    {
        Ok(Ok(c)) => c,
        Ok(Err(e)) => {
            warn!("case-law corpus query failed: {e}");
            return RetrievalOutcome {
                precedents: Vec::new(),
                issues: vec![ValidationIssue::info(
                    SourceTier::Tier2,
                    "precedent retrieval unavailable; continuing without precedent support",
                )],
                timed_out: true,
            };
        }
        Err(_) => {
            warn!("case-law corpus query timed out");
            return RetrievalOutcome {
                precedents: Vec::new(),
                issues: vec![ValidationIssue::info(
                    SourceTier::Tier2,
                    "precedent retrieval unavailable; continuing without precedent support",
                )],
                timed_out: true,
            };
        }
    };

    if candidates.is_empty() {
        return RetrievalOutcome {
            precedents: Vec::new(),
            issues: vec![ValidationIssue::info(
                SourceTier::Tier2,
                format!(
                    "no precedent cases matched jurisdiction {} and the charged categories",
                    ctx.jurisdiction
                ),
            )],
            timed_out: false,
        };
    }

    let ids: Vec<String> = candidates.iter().map(|c| c.id.clone()).collect();
    let weights = match db.get_weights_for(&ids) {
        Ok(w) => w,
        Err(e) => {
            // Ranking still works without feedback history; cold-start neutral.
            warn!("relevance weight load failed: {e}");
            HashMap::new()
        }
    };

    RetrievalOutcome {
        precedents: rank(ctx, candidates, &weights, policy, as_of),
        issues: Vec::new(),
        timed_out: false,
    }
}

/// Deterministic relevance ranking. Identical inputs and identical weight
/// state always produce identical ordering.
pub fn rank(
    ctx: &CaseContext,
    candidates: Vec<PrecedentCase>,
    weights: &HashMap<(String, String), RelevanceWeight>,
    policy: &RankingPolicy,
    as_of: DateTime<Utc>,
) -> Vec<RankedPrecedent> {
    let mut ranked: Vec<RankedPrecedent> = candidates
        .into_iter()
        .map(|case| score_candidate(ctx, case, weights, policy, as_of))
        .collect();

    sort_ranked(&mut ranked);
    ranked.truncate(policy.max_precedents);
    ranked
}

/// Ranking order: relevance desc, then court authority desc, then date
/// filed desc, then id asc as the deterministic final tie-break.
pub fn sort_ranked(ranked: &mut [RankedPrecedent]) {
    ranked.sort_by(|a, b| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then_with(|| {
                b.precedent
                    .court_level
                    .weight()
                    .total_cmp(&a.precedent.court_level.weight())
            })
            .then_with(|| b.precedent.date_filed.cmp(&a.precedent.date_filed))
            .then_with(|| a.precedent.id.cmp(&b.precedent.id))
    });
}

fn score_candidate(
    ctx: &CaseContext,
    case: PrecedentCase,
    weights: &HashMap<(String, String), RelevanceWeight>,
    policy: &RankingPolicy,
    as_of: DateTime<Utc>,
) -> RankedPrecedent {
    let mut matched: Vec<String> = ctx
        .charge_categories
        .iter()
        .filter(|c| case.charge_categories.iter().any(|cc| cc == *c))
        .cloned()
        .collect();
    matched.sort();

    let overlap = if ctx.charge_categories.is_empty() {
        0.0
    } else {
        matched.len() as f64 / ctx.charge_categories.len() as f64
    };

    let years = (as_of - case.date_filed).num_days().max(0) as f64 / 365.25;
    let recency = (-years / policy.recency_decay_years).exp();

    // Feedback history for the matched categories; neutral when none exists,
    // so cold-start precedents are neither penalized nor favored.
    let adjustments: Vec<f64> = matched
        .iter()
        .filter_map(|cat| weights.get(&(case.id.clone(), cat.clone())))
        .map(|w| w.adjustment(policy.feedback_smoothing))
        .collect();
    let feedback = if adjustments.is_empty() {
        0.5
    } else {
        adjustments.iter().sum::<f64>() / adjustments.len() as f64
    };

    let score = policy.overlap_weight * overlap
        + policy.court_weight * case.court_level.weight()
        + policy.recency_weight * recency
        + policy.feedback_weight * feedback;

    RankedPrecedent {
        relevance_score: score.clamp(0.0, 1.0),
        matched_charge_categories: matched,
        precedent: case,
    }
}
