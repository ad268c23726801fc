//! Error correction: reliable outliers first, untrusted subsequences
//! second.
//!
//! The corrector mutates the duration sequence in place. Clusters are
//! never modified; only the outlier and aggregation tables grow. Apart
//! from untrusted top-outliers no new category can appear during
//! correction.

mod extractor;
mod outliers;
mod resorber;
mod subsequences;

use crate::categorizer::{CategorizerParams, CategorizerWorkspace};
use crate::error::CategorizerError;
use crate::types::{CategorySet, Polarity, PolarityPair, Trace};

/// Runs both correction passes; returns the maximum relative residual (‰)
/// observed across all corrections, the trace's trustworthiness indicator.
pub(crate) fn correct(
    categories: &mut PolarityPair<CategorySet>,
    trace: &mut Trace,
    params: &CategorizerParams,
    ws: &mut CategorizerWorkspace,
) -> Result<u16, CategorizerError> {
    if categories[Polarity::High].clusters.is_empty()
        || categories[Polarity::Low].clusters.is_empty()
    {
        return Err(CategorizerError::NoCluster);
    }

    let outlier_residual = outliers::correct_outliers(categories, trace, ws)?;
    let subsequence_residual = if trace.unreliable_count() > 0 {
        subsequences::correct_subsequences(categories, trace, params)?
    } else {
        0
    };
    Ok(outlier_residual.max(subsequence_residual))
}
