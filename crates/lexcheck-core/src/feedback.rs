use chrono::Utc;
use tracing::warn;

use crate::db::Db;
use crate::error::EngineError;
use crate::types::{CaseStage, FeedbackRecord};

/// Feedback submission as received from the consumer. `case_id` is the
/// precedent id the vote refers to; `case_name` travels with the request for
/// audit logging but is not part of the stored key.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub session_id: String,
    pub case_id: String,
    #[serde(default)]
    pub case_name: String,
    #[serde(default)]
    pub jurisdiction: String,
    #[serde(default)]
    pub charge_category: Option<String>,
    pub is_helpful: bool,
    pub case_stage: CaseStage,
}

/// Records a helpfulness vote: idempotent upsert keyed on
/// (session_id, case_id), with one retry on a storage conflict.
pub fn record(db: &Db, req: &FeedbackRequest) -> Result<FeedbackRecord, EngineError> {
    if req.session_id.trim().is_empty() {
        return Err(EngineError::invalid_feedback(
            "sessionId",
            "must not be empty",
        ));
    }
    if req.case_id.trim().is_empty() {
        return Err(EngineError::invalid_feedback("caseId", "must not be empty"));
    }

    let rec = FeedbackRecord {
        session_id: req.session_id.trim().to_string(),
        precedent_id: req.case_id.trim().to_string(),
        jurisdiction: req.jurisdiction.trim().to_ascii_uppercase(),
        charge_category: req
            .charge_category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from),
        is_helpful: req.is_helpful,
        case_stage: req.case_stage,
        created_at: Utc::now(),
    };

    match db.upsert_feedback(&rec) {
        Ok(stored) => Ok(stored),
        Err(first) => {
            // Upsert semantics make conflicts near-impossible; retry once,
            // then surface the conflict.
            warn!("feedback upsert failed, retrying once: {first}");
            db.upsert_feedback(&rec)
                .map_err(|_| EngineError::FeedbackConflict)
        }
    }
}
