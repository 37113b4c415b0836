pub mod task;
pub mod metric_map;
pub mod table;
pub mod run;
pub mod artifact;

pub use task::*;
pub use metric_map::*;
pub use table::*;
pub use run::*;
pub use artifact::*;
