pub mod average;
pub mod score;

pub use average::*;
pub use score::*;
