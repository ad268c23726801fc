#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod categorizer;
pub mod config;
pub mod error;
pub mod render;
pub mod stats;
pub mod types;

// Internal pipeline stages; reachable through `Categorizer::process`.
mod aggregator;
mod classifier;
mod clusterer;
mod corrector;
mod sorting;

// --- High-level re-exports -------------------------------------------------

// Main entry points: categorizer + results.
pub use crate::categorizer::{Categorizer, CategorizerParams, CategorizerWorkspace, TraceReport};
pub use crate::classifier::ClassifyOutcome;
pub use crate::error::CategorizerError;
pub use crate::types::{CategorySet, Cluster, Polarity, PolarityPair, Tightness, Trace, CEIL};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use ook_categorizer::prelude::*;
///
/// # fn main() -> Result<(), ook_categorizer::CategorizerError> {
/// let mut trace = Trace::from_flagged(vec![400, 1200, 402, 1198], 0);
/// let mut categorizer = Categorizer::new(CategorizerParams::default());
/// let report = categorizer.process(&mut trace)?;
/// println!("overlap={} residual={}\u{2030}", report.overlap, report.max_rel_delta);
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::types::{Polarity, Trace};
    pub use crate::{Categorizer, CategorizerParams, TraceReport};
}
