pub mod disputes;
pub mod fraud;
pub mod lp;
pub mod orders;
pub mod system;

pub use disputes::*;
pub use fraud::*;
pub use lp::*;
pub use orders::*;
pub use system::*;
