use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;

use lexcheck_core::sources::{ChargeInfo, ChargeRegistry};

/// In-memory charge registry keyed by lowercase charge code.
pub struct StaticChargeRegistry {
    charges: HashMap<String, ChargeInfo>,
}

impl StaticChargeRegistry {
    pub fn new(entries: Vec<ChargeInfo>) -> Self {
        let charges = entries
            .into_iter()
            .map(|c| (c.code.to_ascii_lowercase(), c))
            .collect();
        Self { charges }
    }

    pub fn from_path(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("read charge registry {path}"))?;
        let entries: Vec<ChargeInfo> = serde_json::from_str(&contents)
            .with_context(|| format!("parse charge registry {path}"))?;
        Ok(Self::new(entries))
    }
}

#[async_trait]
impl ChargeRegistry for StaticChargeRegistry {
    async fn resolve(&self, code: &str) -> Result<Option<ChargeInfo>> {
        Ok(self.charges.get(code).cloned())
    }
}
