//! Concrete collaborator implementations for the validation engine: a
//! static rule table, charge registry, and case-law corpus, each loadable
//! from JSON or built from the bundled seed set.

pub mod caselaw;
pub mod charges;
pub mod rules;
pub mod seed;

pub use caselaw::StaticCaseLawCorpus;
pub use charges::StaticChargeRegistry;
pub use rules::StaticRuleTable;
