use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::aggregate;
use crate::config::Config;
use crate::context;
use crate::db::Db;
use crate::error::EngineError;
use crate::feedback::{self, FeedbackRequest};
use crate::retrieval;
use crate::sources::{CaseLawCorpus, ChargeRegistry, RuleTable};
use crate::tier1;
use crate::tier2;
use crate::types::{FeedbackRecord, GuidanceValidation, ValidationRequest};

/// The guidance validation & precedent retrieval engine.
///
/// One `validate` call is one logical task: normalize, then Tier-1 and
/// retrieval concurrently, then Tier-2 over the retrieval output, then
/// aggregation. Feedback flows back in through [`Engine::record_feedback`],
/// the only write path in the engine.
pub struct Engine {
    rules: Arc<dyn RuleTable>,
    charges: Arc<dyn ChargeRegistry>,
    corpus: Arc<dyn CaseLawCorpus>,
    db: Arc<Db>,
    config: Arc<Config>,
}

impl Engine {
    pub fn new(
        rules: Arc<dyn RuleTable>,
        charges: Arc<dyn ChargeRegistry>,
        corpus: Arc<dyn CaseLawCorpus>,
        db: Arc<Db>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            rules,
            charges,
            corpus,
            db,
            config,
        }
    }

    pub async fn validate(
        &self,
        req: &ValidationRequest,
    ) -> Result<GuidanceValidation, EngineError> {
        let deadline = self.config.collaborator_timeout();
        let ctx =
            context::normalize(req, self.rules.as_ref(), self.charges.as_ref(), deadline).await?;
        debug!(
            "validating guidance: jurisdiction={} charges={} statements={}",
            ctx.jurisdiction,
            ctx.charge_codes.len(),
            req.guidance_statements.len()
        );

        // Tier-1 and retrieval have no data dependency; join before Tier-2.
        let (t1, ret) = tokio::join!(
            tier1::run(&ctx, &req.guidance_statements, self.rules.as_ref(), deadline),
            retrieval::run(
                &ctx,
                self.corpus.as_ref(),
                &self.db,
                &self.config.ranking,
                deadline,
                Utc::now(),
            ),
        );

        // 503 only when no partial result is computable: every rule lookup
        // failed AND the corpus was unreachable.
        let tier1_all_down = t1.result.checks_performed > 0
            && t1.lookups_unavailable == t1.result.checks_performed;
        if tier1_all_down && ret.timed_out {
            return Err(EngineError::CollaboratorUnavailable);
        }

        let tier2 = if t1.result.score >= self.config.ranking.tier2_gate {
            Some(tier2::run(&ctx, &ret.precedents))
        } else {
            debug!(
                "tier-2 skipped: tier-1 score {:.2} below gate {:.2}",
                t1.result.score, self.config.ranking.tier2_gate
            );
            None
        };

        let out = aggregate::combine(
            t1.result,
            tier2,
            ret.issues,
            ret.precedents,
            &self.config.ranking,
        );
        info!(
            "validation done: jurisdiction={} confidence={:.2} valid={} issues={}",
            ctx.jurisdiction,
            out.confidence_score,
            out.is_valid,
            out.issues.len()
        );
        Ok(out)
    }

    /// Idempotent helpfulness vote; see [`feedback::record`].
    pub fn record_feedback(&self, req: &FeedbackRequest) -> Result<FeedbackRecord, EngineError> {
        feedback::record(&self.db, req)
    }

    /// A session's stored votes, for read-through UI caches.
    pub fn session_feedback(&self, session_id: &str) -> Result<Vec<FeedbackRecord>, EngineError> {
        Ok(self.db.list_session_feedback(session_id)?)
    }
}
