//! Post-clustering: border processing and separator-barrier detection.
//!
//! Histogram clustering deliberately ignores the warm-up and cool-down
//! zones of the trace. Once the clusters are settled, the border values
//! are classified against them; the ones that fail become outliers and are
//! aggregated into border-triggered mini-clusters (the aggregation prefix
//! that survives later re-aggregation). Finally the separator barrier is
//! raised until an order-of-magnitude gap separates ordinary values from
//! top values.

use crate::aggregator::aggregate;
use crate::categorizer::CategorizerParams;
use crate::error::CategorizerError;
use crate::sorting;
use crate::types::{limits, CategorySet, Tightness, Trace, CEIL};
use log::debug;

/// Classifies the border values and aggregates the failures.
///
/// The very first HIGH of the trace (index 1) is considered too insecure
/// to produce a useful outlier and is never recorded.
pub(crate) fn process_borders(
    z: &mut CategorySet,
    trace: &Trace,
    start: usize,
    stop: usize,
    params: &CategorizerParams,
) -> Result<(), CategorizerError> {
    let border = params.border_width;

    let mut v_ind = start;
    while v_ind <= stop {
        // between the borders: jump from warm-up straight to cool-down
        if v_ind == start + border {
            v_ind = stop - border + 2;
        }
        let value = trace.raw(v_ind);
        if trace.is_unreliable(v_ind)
            || (v_ind < stop && trace.is_unreliable(v_ind + 1))
            || (v_ind > start && trace.is_unreliable(v_ind - 1))
        {
            v_ind += 2;
            continue;
        }
        if !z.classify(value, Tightness::Eighth).near && v_ind > 1 {
            debug!("border outlier at {v_ind}: {value}");
            z.push_outlier(v_ind as u16)?;
        }
        v_ind += 2;
    }

    // border aggregation; only runs of cluster strength are admitted
    aggregate(z, trace, limits::MIN_CLUSTER_SIZE)?;
    z.border_aggregations = z.aggregations.len();

    // outliers the new aggregations can absorb are no outliers anymore
    let mut outliers = std::mem::take(&mut z.outliers);
    outliers.retain(|&index| !z.classify(trace.raw(usize::from(index)), Tightness::Eighth).near);
    z.outliers = outliers;
    Ok(())
}

/// Raises the separator barrier until one iteration brings no change.
///
/// Starting from the highest cluster ceiling, the barrier is set an order
/// of magnitude above the highest value seen below it. A barrier that
/// would exceed a tenth of the ceiling saturates to [`CEIL`], meaning the
/// trace has no top values.
pub(crate) fn locate_separator_barrier(z: &mut CategorySet, trace: &Trace) {
    let mut old_barrier: u16 = 0;
    let mut new_barrier: u16 = z.clusters.last().map(|c| c.ceil).unwrap_or(0);
    while new_barrier > old_barrier {
        old_barrier = new_barrier;
        new_barrier = 0;
        z.separator_barrier = if old_barrier < CEIL / 10 {
            10 * old_barrier
        } else {
            CEIL
        };
        for &index in &z.outliers {
            let value = trace.raw(usize::from(index));
            if value < z.separator_barrier && value > new_barrier {
                new_barrier = value;
            }
        }
    }
    debug!("separator barrier: {}", z.separator_barrier);
}

/// Sorts the outlier list by trace index so the corrector can walk the
/// HIGH and LOW outliers in merged order.
pub(crate) fn sort_outliers(z: &mut CategorySet) {
    sorting::insertion_sort(&mut z.outliers);
}
