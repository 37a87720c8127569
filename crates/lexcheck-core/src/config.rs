use std::collections::HashMap;

use anyhow::Result;

/// Ranking and aggregation constants.
///
/// These are configurable defaults, not fixed law. Any change is a
/// ranking-policy update and must bump `version`, since it changes the
/// reproducible ordering and confidence arithmetic.
#[derive(Debug, Clone)]
pub struct RankingPolicy {
    pub version: String,

    // Relevance score components (must sum to 1.0)
    pub overlap_weight: f64,
    pub court_weight: f64,
    pub recency_weight: f64,
    pub feedback_weight: f64,

    /// Divisor in `exp(-years_since_filed / recency_decay_years)`.
    pub recency_decay_years: f64,
    /// Laplace smoothing constant in `helpful / (helpful + unhelpful + k)`.
    pub feedback_smoothing: f64,
    /// Top-N truncation of the ranked precedent list.
    pub max_precedents: usize,

    // Confidence aggregation
    pub tier1_weight: f64,
    pub tier2_weight: f64,
    /// Neutral discount substituted when Tier-2 is absent or inconclusive.
    pub tier2_neutral: f64,
    /// Tier-1 score below which Tier-2 is not worth running.
    pub tier2_gate: f64,
    pub valid_threshold: f64,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            version: "2026.1".into(),
            overlap_weight: 0.5,
            court_weight: 0.2,
            recency_weight: 0.2,
            feedback_weight: 0.1,
            recency_decay_years: 10.0,
            feedback_smoothing: 5.0,
            max_precedents: 10,
            tier1_weight: 0.6,
            tier2_weight: 0.4,
            tier2_neutral: 0.4,
            tier2_gate: 0.5,
            valid_threshold: 0.6,
        }
    }
}

/// Full application configuration, loaded from env plus an optional `.env`.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: String,

    // External collaborator data (empty = built-in seed set)
    pub rules_path: String,
    pub charges_path: String,
    pub caselaw_path: String,

    /// Deadline for each rule-table / corpus call, in milliseconds.
    pub collaborator_timeout_ms: u64,
    /// Max feedback submissions per session per minute.
    pub feedback_rate_limit: u32,

    // Web
    pub web_bind: String,
    pub web_port: u16,

    pub ranking: RankingPolicy,
}

fn parse_dotenv() -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return map;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            map.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    map
}

fn get(key: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
}

fn get_str(key: &str, dotenv: &HashMap<String, String>, default: &str) -> String {
    get(key, dotenv).unwrap_or_else(|| default.to_string())
}

fn get_u16(key: &str, dotenv: &HashMap<String, String>, default: u16) -> u16 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_u32(key: &str, dotenv: &HashMap<String, String>, default: u32) -> u32 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_u64(key: &str, dotenv: &HashMap<String, String>, default: u64) -> u64 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_usize(key: &str, dotenv: &HashMap<String, String>, default: usize) -> usize {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: "store".into(),
            rules_path: String::new(),
            charges_path: String::new(),
            caselaw_path: String::new(),
            collaborator_timeout_ms: 2000,
            feedback_rate_limit: 10,
            web_bind: "127.0.0.1".into(),
            web_port: 3141,
            ranking: RankingPolicy::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let dotenv = parse_dotenv();

        let mut ranking = RankingPolicy::default();
        ranking.max_precedents = get_usize("MAX_PRECEDENTS", &dotenv, ranking.max_precedents);

        Ok(Config {
            data_dir: get_str("DATA_DIR", &dotenv, "store"),
            rules_path: get_str("RULES_PATH", &dotenv, ""),
            charges_path: get_str("CHARGES_PATH", &dotenv, ""),
            caselaw_path: get_str("CASELAW_PATH", &dotenv, ""),
            collaborator_timeout_ms: get_u64("COLLABORATOR_TIMEOUT_MS", &dotenv, 2000),
            feedback_rate_limit: get_u32("FEEDBACK_RATE_LIMIT", &dotenv, 10),
            web_bind: get_str("WEB_BIND", &dotenv, "127.0.0.1"),
            web_port: get_u16("WEB_PORT", &dotenv, 3141),
            ranking,
        })
    }

    pub fn collaborator_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.collaborator_timeout_ms)
    }
}
