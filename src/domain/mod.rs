pub mod dispute;
pub mod history;
pub mod lp;
pub mod order;
pub mod risk;

pub use dispute::*;
pub use history::*;
pub use lp::*;
pub use order::*;
pub use risk::*;
