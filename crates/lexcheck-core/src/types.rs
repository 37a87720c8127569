use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Case Facts ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStage {
    Arrest,
    Arraignment,
    Pretrial,
    Trial,
    Sentencing,
    Appeal,
}

impl CaseStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arrest => "arrest",
            Self::Arraignment => "arraignment",
            Self::Pretrial => "pretrial",
            Self::Trial => "trial",
            Self::Sentencing => "sentencing",
            Self::Appeal => "appeal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "arrest" => Some(Self::Arrest),
            "arraignment" => Some(Self::Arraignment),
            "pretrial" => Some(Self::Pretrial),
            "trial" => Some(Self::Trial),
            "sentencing" => Some(Self::Sentencing),
            "appeal" => Some(Self::Appeal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustodyStatus {
    InCustody,
    OnBail,
    OwnRecognizance,
    Released,
}

/// Statutory severity class of a charge, also used for precedent holdings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeClass {
    Felony,
    Misdemeanor,
    Infraction,
    Unknown,
}

impl ChargeClass {
    /// Severity rank used to pick the dominant class among multiple charges.
    pub fn severity(self) -> u8 {
        match self {
            Self::Felony => 3,
            Self::Misdemeanor => 2,
            Self::Infraction => 1,
            Self::Unknown => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Felony => "felony",
            Self::Misdemeanor => "misdemeanor",
            Self::Infraction => "infraction",
            Self::Unknown => "unknown",
        }
    }
}

/// Canonical, validated case facts. Immutable for the life of a request.
#[derive(Debug, Clone)]
pub struct CaseContext {
    /// Uppercase 2-letter jurisdiction code, verified against the rule table.
    pub jurisdiction: String,
    pub charge_codes: BTreeSet<String>,
    /// Sorted, deduplicated categories resolved via the charge registry.
    pub charge_categories: Vec<String>,
    /// Most severe class among the resolved charges.
    pub charge_class: ChargeClass,
    pub case_stage: CaseStage,
    pub custody_status: CustodyStatus,
    pub has_attorney: bool,
}

// ── Guidance Statements ──────────────────────────────────────────────────

/// One atomic claim in the generated guidance, checked against the rule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceStatement {
    /// Keyed lookup name, e.g. "notarization_required" or "max_continuance_days".
    pub statement_type: String,
    pub claimed_value: String,
}

// ── Validation Issues ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Error,
    Warning,
    Info,
}

impl IssueKind {
    /// Sort rank for the merged issue list: errors first, info last.
    pub fn rank(self) -> u8 {
        match self {
            Self::Error => 0,
            Self::Warning => 1,
            Self::Info => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceTier {
    Tier1,
    Tier2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub source_tier: SourceTier,
}

impl ValidationIssue {
    pub fn info(tier: SourceTier, message: impl Into<String>) -> Self {
        Self {
            kind: IssueKind::Info,
            message: message.into(),
            suggestion: None,
            source_tier: tier,
        }
    }

    pub fn warning(
        tier: SourceTier,
        message: impl Into<String>,
        suggestion: Option<String>,
    ) -> Self {
        Self {
            kind: IssueKind::Warning,
            message: message.into(),
            suggestion,
            source_tier: tier,
        }
    }
}

// ── Tier Results ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierResult {
    pub tier_name: String,
    /// checks_passed / checks_performed, or 0 when inconclusive.
    pub score: f64,
    pub checks_performed: u32,
    pub checks_passed: u32,
    /// True when zero checks could be performed; neutral, not a failure.
    pub inconclusive: bool,
    pub issues: Vec<ValidationIssue>,
}

impl TierResult {
    /// Builds a result upholding the score invariant.
    pub fn from_checks(
        tier_name: impl Into<String>,
        checks_performed: u32,
        checks_passed: u32,
        issues: Vec<ValidationIssue>,
    ) -> Self {
        let checks_passed = checks_passed.min(checks_performed);
        let (score, inconclusive) = if checks_performed == 0 {
            (0.0, true)
        } else {
            (f64::from(checks_passed) / f64::from(checks_performed), false)
        };
        Self {
            tier_name: tier_name.into(),
            score,
            checks_performed,
            checks_passed,
            inconclusive,
            issues,
        }
    }

    pub fn inconclusive(tier_name: impl Into<String>) -> Self {
        Self::from_checks(tier_name, 0, 0, Vec::new())
    }
}

// ── Precedents ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourtLevel {
    Supreme,
    Appellate,
    Trial,
    Unknown,
}

impl CourtLevel {
    /// Fixed authority weight; also the first ranking tie-break criterion.
    pub fn weight(self) -> f64 {
        match self {
            Self::Supreme => 1.0,
            Self::Appellate => 0.7,
            Self::Trial => 0.4,
            Self::Unknown => 0.2,
        }
    }
}

/// A prior court decision from the external case-law corpus. The engine
/// never mutates these; relevance is a request-scoped decoration carried
/// by [`RankedPrecedent`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrecedentCase {
    pub id: String,
    pub case_name: String,
    pub citation: String,
    pub court: String,
    pub court_level: CourtLevel,
    pub jurisdiction: String,
    pub date_filed: DateTime<Utc>,
    pub charge_categories: Vec<String>,
    /// How the court framed the charge, when known. Drives Tier-2 checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holding_class: Option<ChargeClass>,
    /// Canonical source URL. Display fallbacks are a presentation concern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPrecedent {
    pub precedent: PrecedentCase,
    pub relevance_score: f64,
    pub matched_charge_categories: Vec<String>,
}

// ── Feedback ─────────────────────────────────────────────────────────────

/// Durable helpfulness vote, at most one per (session_id, precedent_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub session_id: String,
    pub precedent_id: String,
    pub jurisdiction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_category: Option<String>,
    pub is_helpful: bool,
    pub case_stage: CaseStage,
    pub created_at: DateTime<Utc>,
}

/// Vote aggregate per (precedent_id, charge_category), maintained
/// incrementally by the feedback recorder.
#[derive(Debug, Clone)]
pub struct RelevanceWeight {
    pub precedent_id: String,
    pub charge_category: String,
    pub helpful_count: i64,
    pub unhelpful_count: i64,
    pub last_updated: DateTime<Utc>,
}

impl RelevanceWeight {
    /// Laplace-smoothed helpfulness ratio; neutral 0.5 before any votes.
    pub fn adjustment(&self, smoothing: f64) -> f64 {
        let total = self.helpful_count + self.unhelpful_count;
        if total <= 0 {
            return 0.5;
        }
        self.helpful_count as f64 / (total as f64 + smoothing)
    }
}

// ── Request / Response Envelope ──────────────────────────────────────────

/// Raw validation request as received from the consumer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRequest {
    pub jurisdiction: String,
    pub charge_codes: Vec<String>,
    pub case_stage: CaseStage,
    pub custody_status: CustodyStatus,
    #[serde(default)]
    pub has_attorney: bool,
    #[serde(default)]
    pub guidance_statements: Vec<GuidanceStatement>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierBreakdown {
    pub tier1: TierResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier2: Option<TierResult>,
}

/// The complete validation response. Immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceValidation {
    pub confidence_score: f64,
    pub is_valid: bool,
    pub checks_performed: u32,
    pub checks_passed: u32,
    pub issues: Vec<ValidationIssue>,
    pub tiers: TierBreakdown,
    pub precedents: Vec<RankedPrecedent>,
}
