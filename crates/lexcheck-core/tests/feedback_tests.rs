use lexcheck_core::db::Db;
use lexcheck_core::feedback::{self, FeedbackRequest};
use lexcheck_core::types::CaseStage;

// ── helpers ──────────────────────────────────────────────────────────────

fn open_db() -> Db {
    let db = Db::open(":memory:").expect("open in-memory db");
    db.migrate().expect("migrate");
    db
}

fn vote(session: &str, case: &str, helpful: bool) -> FeedbackRequest {
    FeedbackRequest {
        session_id: session.into(),
        case_id: case.into(),
        case_name: "People v. Example".into(),
        jurisdiction: "CA".into(),
        charge_category: Some("public-order".into()),
        is_helpful: helpful,
        case_stage: CaseStage::Pretrial,
    }
}

fn weight_counts(db: &Db, case: &str, category: &str) -> (i64, i64) {
    db.get_weight(case, category)
        .expect("get weight")
        .map_or((0, 0), |w| (w.helpful_count, w.unhelpful_count))
}

// ── upsert semantics ─────────────────────────────────────────────────────

#[test]
fn test_first_vote_creates_record_and_weight() {
    let db = open_db();
    let stored = feedback::record(&db, &vote("s1", "ca-1", true)).expect("record");
    assert_eq!(stored.session_id, "s1");
    assert_eq!(stored.precedent_id, "ca-1");
    assert!(stored.is_helpful);

    assert_eq!(weight_counts(&db, "ca-1", "public-order"), (1, 0));
    assert!(db.get_feedback("s1", "ca-1").expect("get").is_some());
}

#[test]
fn test_resubmission_is_idempotent() {
    let db = open_db();
    feedback::record(&db, &vote("s1", "ca-1", true)).expect("first");
    feedback::record(&db, &vote("s1", "ca-1", true)).expect("second");

    // One record, one counted vote, not two.
    assert_eq!(weight_counts(&db, "ca-1", "public-order"), (1, 0));
    let records = db.list_session_feedback("s1").expect("list");
    assert_eq!(records.len(), 1);
}

#[test]
fn test_vote_flip_moves_the_count() {
    let db = open_db();
    feedback::record(&db, &vote("s1", "ca-1", true)).expect("helpful");
    feedback::record(&db, &vote("s1", "ca-1", false)).expect("unhelpful");

    // helpful back to zero, unhelpful incremented; both in one transaction.
    assert_eq!(weight_counts(&db, "ca-1", "public-order"), (0, 1));
    let rec = db.get_feedback("s1", "ca-1").expect("get").expect("exists");
    assert!(!rec.is_helpful);
}

#[test]
fn test_flip_back_restores_original_counts() {
    let db = open_db();
    feedback::record(&db, &vote("s1", "ca-1", true)).expect("helpful");
    feedback::record(&db, &vote("s1", "ca-1", false)).expect("flip");
    feedback::record(&db, &vote("s1", "ca-1", true)).expect("flip back");
    assert_eq!(weight_counts(&db, "ca-1", "public-order"), (1, 0));
}

#[test]
fn test_sessions_count_independently() {
    let db = open_db();
    feedback::record(&db, &vote("s1", "ca-1", true)).expect("s1");
    feedback::record(&db, &vote("s2", "ca-1", true)).expect("s2");
    feedback::record(&db, &vote("s3", "ca-1", false)).expect("s3");
    assert_eq!(weight_counts(&db, "ca-1", "public-order"), (2, 1));
}

#[test]
fn test_category_change_moves_weight_between_aggregates() {
    let db = open_db();
    feedback::record(&db, &vote("s1", "ca-1", true)).expect("first");

    let mut req = vote("s1", "ca-1", true);
    req.charge_category = Some("property".into());
    feedback::record(&db, &req).expect("recategorized");

    assert_eq!(weight_counts(&db, "ca-1", "public-order"), (0, 0));
    assert_eq!(weight_counts(&db, "ca-1", "property"), (1, 0));
}

#[test]
fn test_missing_category_uses_blank_aggregate_key() {
    let db = open_db();
    let mut req = vote("s1", "ca-1", true);
    req.charge_category = None;
    feedback::record(&db, &req).expect("record");
    assert_eq!(weight_counts(&db, "ca-1", ""), (1, 0));
}

// ── input validation ─────────────────────────────────────────────────────

#[test]
fn test_empty_session_id_rejected() {
    let db = open_db();
    let err = feedback::record(&db, &vote("  ", "ca-1", true)).unwrap_err();
    assert!(err.to_string().contains("sessionId"));
}

#[test]
fn test_empty_case_id_rejected() {
    let db = open_db();
    let err = feedback::record(&db, &vote("s1", "", true)).unwrap_err();
    assert!(err.to_string().contains("caseId"));
}

// ── listing ──────────────────────────────────────────────────────────────

#[test]
fn test_list_session_feedback_sorted_by_precedent() {
    let db = open_db();
    feedback::record(&db, &vote("s1", "ca-2", true)).expect("ca-2");
    feedback::record(&db, &vote("s1", "ca-1", false)).expect("ca-1");
    feedback::record(&db, &vote("other", "ca-9", true)).expect("other session");

    let records = db.list_session_feedback("s1").expect("list");
    let ids: Vec<&str> = records.iter().map(|r| r.precedent_id.as_str()).collect();
    assert_eq!(ids, vec!["ca-1", "ca-2"]);
}

// ── durability ───────────────────────────────────────────────────────────

#[test]
fn test_votes_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("feedback.db");
    let path = path.to_str().expect("utf-8 path");

    {
        let db = Db::open(path).expect("open");
        db.migrate().expect("migrate");
        feedback::record(&db, &vote("s1", "ca-1", true)).expect("record");
    }

    let db = Db::open(path).expect("reopen");
    db.migrate().expect("migrate is idempotent");
    let records = db.list_session_feedback("s1").expect("list");
    assert_eq!(records.len(), 1);
    assert!(records[0].is_helpful);
    assert_eq!(weight_counts(&db, "ca-1", "public-order"), (1, 0));
}
