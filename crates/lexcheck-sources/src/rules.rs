use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use lexcheck_core::sources::{RuleEntry, RuleTable};

/// JSON shape: one block of rules per jurisdiction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionRules {
    pub jurisdiction: String,
    pub rules: Vec<RuleEntry>,
}

/// In-memory rule table keyed by (jurisdiction, statement_type).
#[derive(Debug)]
pub struct StaticRuleTable {
    rules: HashMap<(String, String), RuleEntry>,
    jurisdictions: HashSet<String>,
}

impl StaticRuleTable {
    pub fn new(blocks: Vec<JurisdictionRules>) -> Self {
        let mut rules = HashMap::new();
        let mut jurisdictions = HashSet::new();
        for block in blocks {
            let jurisdiction = block.jurisdiction.to_ascii_uppercase();
            jurisdictions.insert(jurisdiction.clone());
            for rule in block.rules {
                rules.insert(
                    (jurisdiction.clone(), rule.statement_type.clone()),
                    rule,
                );
            }
        }
        Self {
            rules,
            jurisdictions,
        }
    }

    pub fn from_path(path: &str) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("read rule table {path}"))?;
        let blocks: Vec<JurisdictionRules> =
            serde_json::from_str(&contents).with_context(|| format!("parse rule table {path}"))?;
        Ok(Self::new(blocks))
    }
}

#[async_trait]
impl RuleTable for StaticRuleTable {
    async fn lookup(&self, jurisdiction: &str, statement_type: &str) -> Result<Option<RuleEntry>> {
        Ok(self
            .rules
            .get(&(jurisdiction.to_string(), statement_type.to_string()))
            .cloned())
    }

    async fn has_jurisdiction(&self, jurisdiction: &str) -> Result<bool> {
        Ok(self.jurisdictions.contains(jurisdiction))
    }
}
