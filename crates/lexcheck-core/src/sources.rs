use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{ChargeClass, PrecedentCase};

// ── Collaborator boundary ────────────────────────────────────────────────
//
// The rule table, charge registry, and case-law corpus are external,
// potentially-blocking stores. The engine only ever reads from them; every
// call site wraps them in a bounded timeout.

/// Authoritative value for one (jurisdiction, statement_type) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleEntry {
    pub statement_type: String,
    pub expected_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,
}

/// Registry entry for a single charge code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeInfo {
    pub code: String,
    pub label: String,
    pub categories: Vec<String>,
    pub class: ChargeClass,
}

#[async_trait]
pub trait RuleTable: Send + Sync {
    /// O(1) keyed lookup. `None` means no rule exists for the pair, which is
    /// surfaced as Info upstream, not an error.
    async fn lookup(&self, jurisdiction: &str, statement_type: &str) -> Result<Option<RuleEntry>>;

    /// Whether the jurisdiction has any rule coverage at all.
    async fn has_jurisdiction(&self, jurisdiction: &str) -> Result<bool>;
}

#[async_trait]
pub trait ChargeRegistry: Send + Sync {
    /// Resolves a charge code to categories and class; `None` if unknown.
    async fn resolve(&self, code: &str) -> Result<Option<ChargeInfo>>;
}

#[async_trait]
pub trait CaseLawCorpus: Send + Sync {
    /// Candidates whose jurisdiction matches and whose categories intersect
    /// the given set. No jurisdiction match means an empty list; the engine
    /// never falls back across jurisdictions silently.
    async fn find_candidates(
        &self,
        jurisdiction: &str,
        categories: &[String],
    ) -> Result<Vec<PrecedentCase>>;
}
