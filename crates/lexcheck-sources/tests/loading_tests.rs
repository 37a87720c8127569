use std::io::Write;

use lexcheck_core::sources::{CaseLawCorpus, ChargeRegistry, RuleTable};
use lexcheck_core::types::{ChargeClass, CourtLevel};
use lexcheck_sources::{StaticCaseLawCorpus, StaticChargeRegistry, StaticRuleTable};

fn write_json(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    f.write_all(contents.as_bytes()).expect("write json");
    f
}

#[tokio::test]
async fn test_rule_table_loads_from_json() {
    let f = write_json(
        r#"[
            {
                "jurisdiction": "ca",
                "rules": [
                    {
                        "statementType": "notarization_required",
                        "expectedValue": "false",
                        "citation": "Cal. Penal Code § 859"
                    }
                ]
            }
        ]"#,
    );

    let table = StaticRuleTable::from_path(f.path().to_str().expect("utf-8 path"))
        .expect("load rule table");

    // Jurisdictions are normalized to uppercase on load.
    assert!(table.has_jurisdiction("CA").await.expect("lookup"));
    assert!(!table.has_jurisdiction("NY").await.expect("lookup"));

    let rule = table
        .lookup("CA", "notarization_required")
        .await
        .expect("lookup")
        .expect("rule present");
    assert_eq!(rule.expected_value, "false");
    assert_eq!(rule.citation.as_deref(), Some("Cal. Penal Code § 859"));
}

#[tokio::test]
async fn test_charge_registry_loads_from_json() {
    let f = write_json(
        r#"[
            {
                "code": "CA-Petty-Theft",
                "label": "Petty theft",
                "categories": ["property"],
                "class": "misdemeanor"
            }
        ]"#,
    );

    let registry = StaticChargeRegistry::from_path(f.path().to_str().expect("utf-8 path"))
        .expect("load charge registry");

    // Codes are keyed lowercase.
    let info = registry
        .resolve("ca-petty-theft")
        .await
        .expect("resolve")
        .expect("charge present");
    assert_eq!(info.label, "Petty theft");
    assert_eq!(info.class, ChargeClass::Misdemeanor);
}

#[tokio::test]
async fn test_caselaw_corpus_loads_from_json() {
    let f = write_json(
        r#"[
            {
                "id": "ca-2018-taylor",
                "caseName": "People v. Taylor",
                "citation": "23 Cal. App. 5th 401",
                "court": "California Court of Appeal",
                "courtLevel": "appellate",
                "jurisdiction": "CA",
                "dateFiled": "2018-05-02T00:00:00Z",
                "chargeCategories": ["public-order", "property"]
            }
        ]"#,
    );

    let corpus = StaticCaseLawCorpus::from_path(f.path().to_str().expect("utf-8 path"))
        .expect("load corpus");
    assert_eq!(corpus.len(), 1);

    let hits = corpus
        .find_candidates("CA", &["property".to_string()])
        .await
        .expect("find candidates");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].court_level, CourtLevel::Appellate);
    // Optional fields omitted from the JSON default to None.
    assert!(hits[0].holding_class.is_none());
    assert!(hits[0].url.is_none());
}

#[tokio::test]
async fn test_malformed_json_is_an_error() {
    let f = write_json("{ not json ]");
    let err = StaticRuleTable::from_path(f.path().to_str().expect("utf-8 path")).unwrap_err();
    assert!(err.to_string().contains("parse rule table"));
}

#[tokio::test]
async fn test_corpus_ignores_non_matching_jurisdiction() {
    let corpus = lexcheck_sources::seed::caselaw_corpus();
    let hits = corpus
        .find_candidates("WY", &["public-order".to_string()])
        .await
        .expect("find candidates");
    assert!(hits.is_empty());
}
