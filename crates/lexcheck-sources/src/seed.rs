//! Bundled seed data so the server runs without external data files. The
//! set is intentionally small: three jurisdictions, a handful of charge
//! codes, and enough precedent to exercise ranking end to end.

use chrono::{DateTime, TimeZone, Utc};

use lexcheck_core::sources::{ChargeInfo, RuleEntry};
use lexcheck_core::types::{ChargeClass, CourtLevel, PrecedentCase};

use crate::rules::JurisdictionRules;
use crate::{StaticCaseLawCorpus, StaticChargeRegistry, StaticRuleTable};

fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn rule(statement_type: &str, expected_value: &str, citation: &str) -> RuleEntry {
    RuleEntry {
        statement_type: statement_type.into(),
        expected_value: expected_value.into(),
        citation: if citation.is_empty() {
            None
        } else {
            Some(citation.into())
        },
    }
}

pub fn rule_table() -> StaticRuleTable {
    StaticRuleTable::new(vec![
        JurisdictionRules {
            jurisdiction: "CA".into(),
            rules: vec![
                rule("notarization_required", "false", "Cal. Penal Code § 1429"),
                rule("arraignment_deadline_hours", "48", "Cal. Penal Code § 825"),
                rule("max_continuance_days", "30", "Cal. Penal Code § 1050"),
                rule("public_defender_available", "true", "Cal. Gov. Code § 27706"),
                rule("jury_trial_available", "true", "Cal. Const. art. I, § 16"),
                rule("diversion_available", "true", "Cal. Penal Code § 1001.95"),
            ],
        },
        JurisdictionRules {
            jurisdiction: "NY".into(),
            rules: vec![
                rule("notarization_required", "false", "N.Y. C.P.L. § 100.30"),
                rule("arraignment_deadline_hours", "24", "N.Y. C.P.L. § 140.20"),
                rule("max_continuance_days", "45", ""),
                rule("public_defender_available", "true", "N.Y. County Law § 722"),
            ],
        },
        JurisdictionRules {
            jurisdiction: "TX".into(),
            rules: vec![
                rule("notarization_required", "true", "Tex. Code Crim. Proc. art. 15.05"),
                rule("arraignment_deadline_hours", "48", "Tex. Code Crim. Proc. art. 15.17"),
                rule("jury_trial_available", "true", "Tex. Const. art. I, § 15"),
            ],
        },
    ])
}

fn charge(code: &str, label: &str, categories: &[&str], class: ChargeClass) -> ChargeInfo {
    ChargeInfo {
        code: code.into(),
        label: label.into(),
        categories: categories.iter().map(|c| (*c).into()).collect(),
        class,
    }
}

pub fn charge_registry() -> StaticChargeRegistry {
    StaticChargeRegistry::new(vec![
        charge(
            "ca-disorderly-conduct",
            "Disorderly conduct (Cal. Penal Code § 647)",
            &["public-order"],
            ChargeClass::Misdemeanor,
        ),
        charge(
            "ca-petty-theft",
            "Petty theft (Cal. Penal Code § 484)",
            &["property"],
            ChargeClass::Misdemeanor,
        ),
        charge(
            "ca-burglary-1",
            "First-degree burglary (Cal. Penal Code § 459)",
            &["property"],
            ChargeClass::Felony,
        ),
        charge(
            "ca-dui",
            "Driving under the influence (Cal. Veh. Code § 23152)",
            &["vehicular"],
            ChargeClass::Misdemeanor,
        ),
        charge(
            "ny-assault-3",
            "Assault in the third degree (N.Y. Penal Law § 120.00)",
            &["violent"],
            ChargeClass::Misdemeanor,
        ),
        charge(
            "ny-grand-larceny-4",
            "Grand larceny in the fourth degree (N.Y. Penal Law § 155.30)",
            &["property"],
            ChargeClass::Felony,
        ),
        charge(
            "tx-dwi",
            "Driving while intoxicated (Tex. Penal Code § 49.04)",
            &["vehicular"],
            ChargeClass::Misdemeanor,
        ),
    ])
}

#[allow(clippy::too_many_arguments)]
fn precedent(
    id: &str,
    case_name: &str,
    citation: &str,
    court: &str,
    court_level: CourtLevel,
    jurisdiction: &str,
    date_filed: DateTime<Utc>,
    categories: &[&str],
    holding_class: Option<ChargeClass>,
) -> PrecedentCase {
    PrecedentCase {
        id: id.into(),
        case_name: case_name.into(),
        citation: citation.into(),
        court: court.into(),
        court_level,
        jurisdiction: jurisdiction.into(),
        date_filed,
        charge_categories: categories.iter().map(|c| (*c).into()).collect(),
        holding_class,
        url: Some(format!("https://caselaw.example.org/opinion/{id}")),
    }
}

pub fn caselaw_corpus() -> StaticCaseLawCorpus {
    StaticCaseLawCorpus::new(vec![
        precedent(
            "ca-1993-aguilar",
            "People v. Aguilar",
            "16 Cal. App. 4th 1023",
            "California Court of Appeal",
            CourtLevel::Appellate,
            "CA",
            date(1993, 6, 17),
            &["public-order"],
            Some(ChargeClass::Misdemeanor),
        ),
        precedent(
            "ca-2014-rivera",
            "People v. Rivera",
            "59 Cal. 4th 1118",
            "California Supreme Court",
            CourtLevel::Supreme,
            "CA",
            date(2014, 8, 11),
            &["property"],
            Some(ChargeClass::Misdemeanor),
        ),
        precedent(
            "ca-2018-taylor",
            "People v. Taylor",
            "23 Cal. App. 5th 401",
            "California Court of Appeal",
            CourtLevel::Appellate,
            "CA",
            date(2018, 5, 2),
            &["public-order", "property"],
            Some(ChargeClass::Misdemeanor),
        ),
        precedent(
            "ca-2021-okafor",
            "People v. Okafor",
            "68 Cal. App. 5th 88",
            "Los Angeles County Superior Court",
            CourtLevel::Trial,
            "CA",
            date(2021, 2, 24),
            &["public-order"],
            None,
        ),
        precedent(
            "ca-2009-mendez",
            "People v. Mendez",
            "45 Cal. 4th 915",
            "California Supreme Court",
            CourtLevel::Supreme,
            "CA",
            date(2009, 1, 29),
            &["property"],
            Some(ChargeClass::Felony),
        ),
        precedent(
            "ny-2016-brown",
            "People v. Brown",
            "28 N.Y.3d 392",
            "New York Court of Appeals",
            CourtLevel::Supreme,
            "NY",
            date(2016, 11, 21),
            &["violent"],
            Some(ChargeClass::Misdemeanor),
        ),
        precedent(
            "ny-2019-castillo",
            "People v. Castillo",
            "171 A.D.3d 1553",
            "Appellate Division, Fourth Department",
            CourtLevel::Appellate,
            "NY",
            date(2019, 4, 26),
            &["property"],
            Some(ChargeClass::Felony),
        ),
        precedent(
            "tx-2017-huang",
            "Huang v. State",
            "532 S.W.3d 495",
            "Texas Court of Criminal Appeals",
            CourtLevel::Supreme,
            "TX",
            date(2017, 10, 4),
            &["vehicular"],
            Some(ChargeClass::Misdemeanor),
        ),
    ])
}
