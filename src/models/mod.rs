pub mod analysis;
pub mod cost;
pub mod recommendation;

pub use analysis::*;
pub use cost::*;
pub use recommendation::*;
