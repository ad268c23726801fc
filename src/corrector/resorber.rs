//! Spike and drop resorption.
//!
//! A macro spike (short HIGH inside a long LOW) or drop splits one long
//! duration into three. When the central triple of a five-element window
//! sums to a classifiable value and the residual beats the best-fit
//! approximation, the window collapses to `(front, synthesized, 0, 0,
//! back)`; the two zero durations mark the resorbed slots.

use crate::error::CategorizerError;
use crate::types::{CategorySet, Tightness, Trace, CEIL};
use log::debug;

/// Attempts to resorb the central triple of the window
/// `trace[start..=stop]`.
///
/// `centers` holds the nearest-category centers of the window elements as
/// computed by the best-fit pass, and `rel_delta` its residual (‰). On
/// success the trace is rewritten in place, `rel_delta` becomes the
/// (smaller or equal) resorber residual and the synthesized value's index
/// joins the outlier list when it classified into an aggregation. On
/// refusal the trace is untouched and `rel_delta` keeps the best-fit
/// value.
///
/// Only quintuples are resorbable; a quadruple window falls through to
/// best-fit.
pub(crate) fn resorb(
    z: &mut CategorySet,
    trace: &mut Trace,
    centers: &[u16],
    start: usize,
    stop: usize,
    rel_delta: &mut u16,
) -> Result<bool, CategorizerError> {
    if stop - start != 4 {
        return Ok(false);
    }

    let best_fit = *rel_delta;
    let tightness = if best_fit > 100 {
        Tightness::Eighth
    } else {
        Tightness::Sixteenth
    };

    // virtual triple value: fold the border mismatches into the middle
    let mut sum = i32::from(trace.raw(start)) - i32::from(centers[0]);
    sum += i32::from(trace.raw(start + 1))
        + i32::from(trace.raw(start + 2))
        + i32::from(trace.raw(start + 3));
    sum += i32::from(trace.raw(start + 4)) - i32::from(centers[4]);
    if sum > i32::from(CEIL) {
        return Err(CategorizerError::ResorberTripleSum);
    }
    let triple = match u16::try_from(sum) {
        Ok(value) => value,
        Err(_) => return Ok(false),
    };

    let outcome = z.classify(triple, tightness);
    if !outcome.near {
        debug!("resorber: triple value {triple} not classifiable");
        return Ok(false);
    }

    let total: i32 = (start..=stop).map(|i| i32::from(trace.raw(i))).sum();
    let category_sum = i32::from(centers[0]) + i32::from(outcome.center) + i32::from(centers[4]);
    let resorbed = (1000 * (total - category_sum).abs() / total) as u16;
    if resorbed > best_fit {
        *rel_delta = best_fit;
        return Ok(false);
    }
    *rel_delta = resorbed;

    trace.set(start, centers[0]);
    trace.set(start + 1, outcome.center);
    trace.set(start + 2, 0);
    trace.set(start + 3, 0);
    trace.set(start + 4, centers[4]);
    debug!(
        "resorbed window {}..={} into {} ({} \u{2030})",
        start, stop, outcome.center, resorbed
    );

    // an aggregation match is a fresh outlier and must be recorded
    if z.is_aggregation(outcome.index) {
        z.push_outlier((start + 1) as u16)?;
    }
    Ok(true)
}
