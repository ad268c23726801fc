//! Outlier aggregation into mini-clusters.
//!
//! The aggregator groups a polarity's outlier values into small
//! cluster-like entries: after sorting the outlier indices by value, a run
//! extends as long as the step to the next value stays within 12.5 % of
//! the upper value. A run is materialized only when it holds more than
//! `min_count` values. Aggregations behind the border-triggered prefix are
//! rebuilt from scratch on each call.

use crate::error::CategorizerError;
use crate::sorting;
use crate::types::{limits, CategorySet, Trace};

/// Rebuilds the aggregation table from the current outlier list.
///
/// Post-clustering calls this with `min_count = MIN_CLUSTER_SIZE` to admit
/// only border aggregations of cluster strength; the corrector passes use
/// `min_count = 0` so every resistant or top outlier ends up aggregated.
/// Side effect: the outlier index list is left sorted by value.
pub(crate) fn aggregate(
    z: &mut CategorySet,
    trace: &Trace,
    min_count: u16,
) -> Result<(), CategorizerError> {
    z.aggregations.truncate(z.border_aggregations);
    if z.outliers.is_empty() {
        return Ok(());
    }

    sorting::index_sort(&mut z.outliers, |index| trace.raw(usize::from(index)));

    let last = z.outliers.len() - 1;
    let mut o = 0;
    loop {
        if z.aggregations.len() >= limits::MAX_AGGREGATIONS {
            return Err(CategorizerError::TooManyAggregations);
        }
        let mut sum: u32 = 0;
        let mut count: u32 = 0;
        loop {
            let below = trace.raw(usize::from(z.outliers[o]));
            sum += u32::from(below);
            count += 1;
            if o >= last {
                materialize(z, sum, count, min_count)?;
                return Ok(());
            }
            let above = trace.raw(usize::from(z.outliers[o + 1]));
            if u32::from(below) + u32::from(above >> 3) <= u32::from(above) {
                // the step up to `above` is too large; close the run
                break;
            }
            o += 1;
        }
        materialize(z, sum, count, min_count)?;
        o += 1;
        if o == last {
            if z.aggregations.len() >= limits::MAX_AGGREGATIONS {
                return Err(CategorizerError::TooManyAggregations);
            }
            let value = trace.raw(usize::from(z.outliers[o]));
            materialize(z, u32::from(value), 1, min_count)?;
            return Ok(());
        }
    }
}

fn materialize(
    z: &mut CategorySet,
    sum: u32,
    count: u32,
    min_count: u16,
) -> Result<(), CategorizerError> {
    if count > u32::from(min_count) {
        z.push_aggregation((sum / count) as u16)?;
    }
    Ok(())
}
