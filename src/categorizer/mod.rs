//! Categorizer driver orchestrating the full pipeline.
//!
//! One [`Categorizer::process`] call clusters the HIGH and the LOW
//! durations separately, then runs the corrector over the whole trace,
//! unless clustering flagged overlapping clusters, in which case the
//! correction fidelity cannot be guaranteed and the raw categorization is
//! returned as-is, marked accordingly.
//!
//! The transform is strictly sequential and deterministic: for a fixed
//! flagged input sequence the categorized output is reproducible.

pub mod options;
pub mod workspace;

pub use options::CategorizerParams;
pub use workspace::CategorizerWorkspace;

use crate::clusterer;
use crate::corrector;
use crate::error::CategorizerError;
use crate::types::{CategorySet, Polarity, PolarityPair, Trace};
use serde::Serialize;

/// Result of categorizing one trace.
#[derive(Clone, Debug, Serialize)]
pub struct TraceReport {
    /// Category sets per polarity.
    pub categories: PolarityPair<CategorySet>,
    /// True if a bin run showed two merged clusters; the corrector was
    /// skipped and the output is usable but untrustworthy.
    pub overlap: bool,
    /// True if the corrector ran.
    pub corrected: bool,
    /// Maximum relative correction residual (‰) across the trace.
    pub max_rel_delta: u16,
}

/// Categorizer turning flagged duration traces into category sets.
///
/// Owns the scratch buffers, so one instance can process any number of
/// traces without allocating in the hot path.
pub struct Categorizer {
    params: CategorizerParams,
    workspace: CategorizerWorkspace,
}

impl Categorizer {
    pub fn new(params: CategorizerParams) -> Self {
        Self {
            params,
            workspace: CategorizerWorkspace::new(),
        }
    }

    pub fn params(&self) -> &CategorizerParams {
        &self.params
    }

    /// Runs the full pipeline over `trace`, mutating it in place
    /// (category-center writes and spike/drop resorption to zero
    /// durations).
    pub fn process(&mut self, trace: &mut Trace) -> Result<TraceReport, CategorizerError> {
        let mut overlap = false;

        let high = clusterer::cluster_polarity(
            trace,
            Polarity::High,
            &self.params,
            &mut overlap,
            &mut self.workspace,
        )?;
        let low = clusterer::cluster_polarity(
            trace,
            Polarity::Low,
            &self.params,
            &mut overlap,
            &mut self.workspace,
        )?;
        let mut categories = PolarityPair::new(low, high);

        let mut max_rel_delta = 0;
        let corrected = !overlap;
        if corrected {
            max_rel_delta =
                corrector::correct(&mut categories, trace, &self.params, &mut self.workspace)?;
        }

        Ok(TraceReport {
            categories,
            overlap,
            corrected,
            max_rel_delta,
        })
    }
}
