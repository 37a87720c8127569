pub mod aggregate;
pub mod config;
pub mod context;
pub mod db;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod retrieval;
pub mod sources;
pub mod tier1;
pub mod tier2;
pub mod types;

pub use error::EngineError;
pub use types::*;
