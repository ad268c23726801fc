//! Per-polarity clustering: histogram clustering followed by
//! post-clustering.
//!
//! HIGH and LOW durations are a priori unrelated, so the categorizer runs
//! this stage once per polarity over the interleaved trace (step 2).
//! Robustness of the clusters rests on three filters: the two polarities
//! never mix, border values stay out of the histograms, and unreliable
//! values and their neighbours are discarded from clustering.

mod histogram;
mod post;

use crate::categorizer::{CategorizerParams, CategorizerWorkspace};
use crate::error::CategorizerError;
use crate::types::{CategorySet, Polarity, Trace};
use log::debug;

/// Clusters one polarity of the trace and returns its category set.
///
/// `overlap` is shared between the two polarity runs; once raised it stays
/// raised and the caller must skip the corrector.
pub(crate) fn cluster_polarity(
    trace: &Trace,
    polarity: Polarity,
    params: &CategorizerParams,
    overlap: &mut bool,
    ws: &mut CategorizerWorkspace,
) -> Result<CategorySet, CategorizerError> {
    // HIGH durations start at index 1, LOW durations at index 2
    let start = match polarity {
        Polarity::High => 1,
        Polarity::Low => 2,
    };
    let stop = match polarity {
        Polarity::High => trace.count() - 1,
        Polarity::Low => trace.count(),
    };
    debug!(
        "clustering {} durations, indices {}..={}",
        polarity.label(),
        start,
        stop
    );

    let mut z = CategorySet::default();
    histogram::build_clusters(&mut z, trace, start, stop, params, overlap, ws)?;
    post::process_borders(&mut z, trace, start, stop, params)?;
    post::locate_separator_barrier(&mut z, trace);
    post::sort_outliers(&mut z);
    debug!(
        "{}: {} clusters, {} border aggregations, {} outliers",
        polarity.label(),
        z.clusters.len(),
        z.border_aggregations,
        z.outliers.len()
    );
    Ok(z)
}
