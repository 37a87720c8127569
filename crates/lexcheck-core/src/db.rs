use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::types::{CaseStage, FeedbackRecord, RelevanceWeight};

const SCHEMA_SQL: &str = include_str!("../../../schema.sql");

/// SQLite-backed store for feedback records and relevance weights.
///
/// The connection mutex serializes all writes, which gives the per-key
/// linearizability the feedback recorder requires without any key-level
/// locking of its own.
pub struct Db {
    conn: Mutex<Connection>,
}

// ── Timestamp helpers ─────────────────────────────────────────────────────

fn parse_ts(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

fn ts_str(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn category_key(category: Option<&str>) -> String {
    category.unwrap_or("").trim().to_string()
}

// ── Row mappers ───────────────────────────────────────────────────────────

fn row_to_feedback(row: &rusqlite::Row<'_>) -> rusqlite::Result<FeedbackRecord> {
    let category: String = row.get(3)?;
    let stage: String = row.get(5)?;
    let created_at: String = row.get(6)?;
    Ok(FeedbackRecord {
        session_id: row.get(0)?,
        precedent_id: row.get(1)?,
        jurisdiction: row.get(2)?,
        charge_category: if category.is_empty() { None } else { Some(category) },
        is_helpful: row.get::<_, i64>(4)? != 0,
        case_stage: CaseStage::parse(&stage).unwrap_or(CaseStage::Pretrial),
        created_at: parse_ts(&created_at),
    })
}

fn row_to_weight(row: &rusqlite::Row<'_>) -> rusqlite::Result<RelevanceWeight> {
    let last_updated: String = row.get(4)?;
    Ok(RelevanceWeight {
        precedent_id: row.get(0)?,
        charge_category: row.get(1)?,
        helpful_count: row.get(2)?,
        unhelpful_count: row.get(3)?,
        last_updated: parse_ts(&last_updated),
    })
}

impl Db {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open db at {path}"))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute_batch(SCHEMA_SQL).context("apply schema")?;
        Ok(())
    }

    // ── Feedback ──────────────────────────────────────────────────────────

    /// Idempotent upsert keyed on (session_id, precedent_id).
    ///
    /// A resubmission replaces the prior vote. The relevance-weight counters
    /// are adjusted in the same transaction: a fresh vote increments one
    /// counter, a vote flip moves a count from one counter to the other, and
    /// a repeat of the same vote leaves the counters untouched.
    pub fn upsert_feedback(&self, rec: &FeedbackRecord) -> Result<FeedbackRecord> {
        let mut conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let tx = conn.transaction().context("begin feedback tx")?;

        let prior: Option<(bool, String)> = tx
            .query_row(
                "SELECT is_helpful, charge_category FROM feedback_records
                 WHERE session_id = ?1 AND precedent_id = ?2",
                params![rec.session_id, rec.precedent_id],
                |row| Ok((row.get::<_, i64>(0)? != 0, row.get(1)?)),
            )
            .optional()
            .context("read prior feedback")?;

        let category = category_key(rec.charge_category.as_deref());
        let now = ts_str(rec.created_at);

        tx.execute(
            "INSERT INTO feedback_records
                 (session_id, precedent_id, jurisdiction, charge_category,
                  is_helpful, case_stage, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (session_id, precedent_id) DO UPDATE SET
                 jurisdiction = excluded.jurisdiction,
                 charge_category = excluded.charge_category,
                 is_helpful = excluded.is_helpful,
                 case_stage = excluded.case_stage,
                 created_at = excluded.created_at",
            params![
                rec.session_id,
                rec.precedent_id,
                rec.jurisdiction,
                category,
                rec.is_helpful as i64,
                rec.case_stage.as_str(),
                now,
            ],
        )
        .context("upsert feedback record")?;

        match prior {
            None => {
                bump_weight(&tx, &rec.precedent_id, &category, rec.is_helpful, 1, &now)?;
            }
            Some((was_helpful, prior_category)) => {
                if was_helpful != rec.is_helpful || prior_category != category {
                    bump_weight(&tx, &rec.precedent_id, &prior_category, was_helpful, -1, &now)?;
                    bump_weight(&tx, &rec.precedent_id, &category, rec.is_helpful, 1, &now)?;
                }
            }
        }

        tx.commit().context("commit feedback tx")?;
        Ok(rec.clone())
    }

    pub fn get_feedback(
        &self,
        session_id: &str,
        precedent_id: &str,
    ) -> Result<Option<FeedbackRecord>> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let rec = conn
            .query_row(
                "SELECT session_id, precedent_id, jurisdiction, charge_category,
                        is_helpful, case_stage, created_at
                 FROM feedback_records
                 WHERE session_id = ?1 AND precedent_id = ?2",
                params![session_id, precedent_id],
                row_to_feedback,
            )
            .optional()
            .context("get feedback")?;
        Ok(rec)
    }

    pub fn list_session_feedback(&self, session_id: &str) -> Result<Vec<FeedbackRecord>> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn.prepare(
            "SELECT session_id, precedent_id, jurisdiction, charge_category,
                    is_helpful, case_stage, created_at
             FROM feedback_records
             WHERE session_id = ?1
             ORDER BY precedent_id",
        )?;
        let rows = stmt.query_map(params![session_id], row_to_feedback)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    // ── Relevance weights ─────────────────────────────────────────────────

    pub fn get_weight(
        &self,
        precedent_id: &str,
        charge_category: &str,
    ) -> Result<Option<RelevanceWeight>> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let weight = conn
            .query_row(
                "SELECT precedent_id, charge_category, helpful_count, unhelpful_count, last_updated
                 FROM relevance_weights
                 WHERE precedent_id = ?1 AND charge_category = ?2",
                params![precedent_id, charge_category],
                row_to_weight,
            )
            .optional()
            .context("get weight")?;
        Ok(weight)
    }

    /// All stored weights for the given precedent ids, keyed by
    /// (precedent_id, charge_category). One query per retrieval call.
    pub fn get_weights_for(
        &self,
        precedent_ids: &[String],
    ) -> Result<HashMap<(String, String), RelevanceWeight>> {
        let mut out = HashMap::new();
        if precedent_ids.is_empty() {
            return Ok(out);
        }
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let placeholders = vec!["?"; precedent_ids.len()].join(",");
        let sql = format!(
            "SELECT precedent_id, charge_category, helpful_count, unhelpful_count, last_updated
             FROM relevance_weights
             WHERE precedent_id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(precedent_ids), row_to_weight)?;
        for row in rows {
            let w = row?;
            out.insert((w.precedent_id.clone(), w.charge_category.clone()), w);
        }
        Ok(out)
    }
}

/// Applies a single counter delta to the (precedent, category) aggregate,
/// creating the row on first touch. Counters never go below zero.
fn bump_weight(
    tx: &rusqlite::Transaction<'_>,
    precedent_id: &str,
    charge_category: &str,
    helpful: bool,
    delta: i64,
    now: &str,
) -> Result<()> {
    let (dh, du) = if helpful { (delta, 0) } else { (0, delta) };
    tx.execute(
        "INSERT INTO relevance_weights
             (precedent_id, charge_category, helpful_count, unhelpful_count, last_updated)
         VALUES (?1, ?2, MAX(0, ?3), MAX(0, ?4), ?5)
         ON CONFLICT (precedent_id, charge_category) DO UPDATE SET
             helpful_count = MAX(0, helpful_count + ?3),
             unhelpful_count = MAX(0, unhelpful_count + ?4),
             last_updated = ?5",
        params![precedent_id, charge_category, dh, du, now],
    )
    .context("bump relevance weight")?;
    Ok(())
}
