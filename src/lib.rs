pub mod api;
pub mod config;
pub mod dispute;
pub mod domain;
pub mod engine;
pub mod error;
pub mod matching;
pub mod risk;
pub mod settlement;
pub mod store;

pub use config::PolicyConfig;
pub use dispute::DisputeStore;
pub use engine::{AdmissionDecision, DisputeDetail, Engine};
pub use error::{EngineError, Result};
pub use matching::{match_lp, LpRegistry};
pub use risk::{analyze, required_stake, StakeRequirement};
pub use settlement::{LogSettlement, Settlement};
pub use store::{HistoryStore, InMemoryHistoryStore};
