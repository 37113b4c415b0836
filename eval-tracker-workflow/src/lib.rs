pub mod blobs;
pub mod loader;
pub mod writer;

pub use blobs::*;
pub use loader::*;
pub use writer::*;
