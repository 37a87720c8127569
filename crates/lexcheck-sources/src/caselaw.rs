use anyhow::{Context, Result};
use async_trait::async_trait;

use lexcheck_core::sources::CaseLawCorpus;
use lexcheck_core::types::PrecedentCase;

/// In-memory case-law corpus. Candidate filtering follows the boundary
/// contract: jurisdiction must match exactly and at least one charge
/// category must intersect.
pub struct StaticCaseLawCorpus {
    cases: Vec<PrecedentCase>,
}

impl StaticCaseLawCorpus {
    pub fn new(cases: Vec<PrecedentCase>) -> Self {
        Self { cases }
    }

    pub fn from_path(path: &str) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("read case-law corpus {path}"))?;
        let cases: Vec<PrecedentCase> = serde_json::from_str(&contents)
            .with_context(|| format!("parse case-law corpus {path}"))?;
        Ok(Self::new(cases))
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

#[async_trait]
impl CaseLawCorpus for StaticCaseLawCorpus {
    async fn find_candidates(
        &self,
        jurisdiction: &str,
        categories: &[String],
    ) -> Result<Vec<PrecedentCase>> {
        Ok(self
            .cases
            .iter()
            .filter(|c| c.jurisdiction == jurisdiction)
            .filter(|c| {
                c.charge_categories
                    .iter()
                    .any(|cc| categories.iter().any(|wanted| wanted == cc))
            })
            .cloned()
            .collect())
    }
}
