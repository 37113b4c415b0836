//! SDK resource modules
//!
//! Resource-specific clients for the run, table and artifact endpoints. All
//! of them live under `/entities/{entity}/projects/{project}`.

pub mod artifacts;
pub mod runs;
pub mod tables;

pub use artifacts::ArtifactsClient;
pub use runs::RunsClient;
pub use tables::TablesClient;

use eval_tracker_core::RunLocator;

/// Path segments of a resource owned by `locator`, with `rest` appended
pub(crate) fn project_path<'a>(locator: &'a RunLocator, rest: &[&'a str]) -> Vec<&'a str> {
    let mut segments = vec![
        "entities",
        locator.entity.as_str(),
        "projects",
        locator.project.as_str(),
    ];
    segments.extend_from_slice(rest);
    segments
}
