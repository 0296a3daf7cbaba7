pub mod resolver;
pub mod store;

pub use resolver::{
    arbitrator_reward, escalation_stage, is_eligible_arbitrator, resolve, slash_amount,
};
pub use store::DisputeStore;
