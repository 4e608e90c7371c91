//! Battery pack designer
//!
//! Searches a catalogue of cells and pack components for every
//! series/parallel arrangement that meets a set of electrical, mechanical
//! and budget requirements, and ranks the results by energy per unit price.

pub mod catalogue;
pub mod db;
pub mod error;
pub mod explorer;
pub mod generator;
pub mod geometry;
pub mod import;
pub mod models;
pub mod ranking;
pub mod report;
pub mod requirements;
pub mod select;

pub use catalogue::{Catalogue, ComponentPools};
pub use error::{CatalogueError, RequirementsError};
pub use models::{CellSpec, Configuration, DesignResult, Requirements, SearchStats};

/// Run the search and rank the result.
///
/// With `with_stats` the search counters are attached to the output.
pub fn design(
    requirements: &Requirements,
    catalogue: &Catalogue,
    with_stats: bool,
) -> DesignResult {
    let (configs, stats) = generator::generate_with_stats(requirements, catalogue);
    let mut result = ranking::rank(configs);
    if with_stats {
        result.stats = Some(stats);
    }
    result
}
