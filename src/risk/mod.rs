pub mod scorer;
pub mod stake;

pub use scorer::analyze;
pub use stake::{required_stake, StakeRequirement};
