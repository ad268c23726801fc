//! Parameter types configuring the categorizer.
//!
//! Defaults match the recording front-end: eight warm-up/cool-down samples
//! per border, a first histogram floor just below the shortest pulse the
//! radio hardware produces, and 16-unit starting bins. The table
//! capacities are deliberately not parameters: they define the overflow
//! failure codes (see [`crate::types::limits`]).

use serde::Deserialize;

/// Tunables of the clustering stage.
#[derive(Clone, Debug, Deserialize)]
pub struct CategorizerParams {
    /// Warm-up/cool-down width: number of samples at each end of the trace
    /// excluded from histogram clustering and handled by border
    /// classification instead.
    pub border_width: usize,
    /// Floor of the first histogram; at most the minimum raw duration.
    pub start_value: u16,
    /// Base-2 log of the first histogram's bin width.
    pub initial_bin_width_log2: u8,
}

impl Default for CategorizerParams {
    fn default() -> Self {
        Self {
            border_width: 8,
            start_value: 50,
            initial_bin_width_log2: 4,
        }
    }
}
