use std::collections::BTreeSet;
use std::time::Duration;

use tokio::time::timeout;

use crate::error::EngineError;
use crate::sources::{ChargeRegistry, RuleTable};
use crate::types::{CaseContext, ChargeClass, ValidationRequest};

/// Canonicalizes raw case facts into a typed [`CaseContext`].
///
/// Any malformed or unknown value is a hard stop; no partial normalization
/// is ever returned. Collaborator timeouts and failures here (rather than
/// bad input) surface as collaborator errors since nothing can be validated
/// without the registry and rule table.
pub async fn normalize(
    req: &ValidationRequest,
    rules: &dyn RuleTable,
    charges: &dyn ChargeRegistry,
    deadline: Duration,
) -> Result<CaseContext, EngineError> {
    let jurisdiction = req.jurisdiction.trim().to_ascii_uppercase();
    if jurisdiction.len() != 2 || !jurisdiction.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(EngineError::invalid_context(
            "jurisdiction",
            "must be a 2-letter code",
        ));
    }

    let known = timeout(deadline, rules.has_jurisdiction(&jurisdiction))
        .await
        .map_err(|_| EngineError::CollaboratorTimeout {
            collaborator: "rule table".into(),
        })?
        .map_err(|_| EngineError::CollaboratorUnavailable)?;
    if !known {
        return Err(EngineError::invalid_context(
            "jurisdiction",
            format!("unknown jurisdiction {jurisdiction}"),
        ));
    }

    let mut charge_codes = BTreeSet::new();
    let mut categories = BTreeSet::new();
    let mut charge_class = ChargeClass::Unknown;
    for raw in &req.charge_codes {
        let code = raw.trim().to_ascii_lowercase();
        if code.is_empty() {
            return Err(EngineError::invalid_context(
                "chargeCodes",
                "charge code must not be empty",
            ));
        }
        let info = timeout(deadline, charges.resolve(&code))
            .await
            .map_err(|_| EngineError::CollaboratorTimeout {
                collaborator: "charge registry".into(),
            })?
            .map_err(|_| EngineError::CollaboratorUnavailable)?
            .ok_or_else(|| {
                EngineError::invalid_context(
                    "chargeCodes",
                    format!("unknown charge code {code}"),
                )
            })?;
        if info.class.severity() > charge_class.severity() {
            charge_class = info.class;
        }
        categories.extend(info.categories);
        charge_codes.insert(code);
    }

    Ok(CaseContext {
        jurisdiction,
        charge_codes,
        charge_categories: categories.into_iter().collect(),
        charge_class,
        case_stage: req.case_stage,
        custody_status: req.custody_status,
        has_attorney: req.has_attorney,
    })
}
