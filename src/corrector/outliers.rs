//! Correction of reliable outliers identified by the clusterer.
//!
//! The HIGH and LOW outlier lists are merged into one index-ordered list
//! and scanned from the top down. Every outlier is judged with its two
//! neighbours: a correctable (false) outlier is replaced by classifier
//! centers and dropped from the list, a resistant (true) outlier keeps its
//! value and is later aggregated, and a top outlier above the separator
//! barrier is reliable by sheer size and left alone.

use crate::aggregator::aggregate;
use crate::error::CategorizerError;
use crate::sorting;
use crate::types::{limits, CategorySet, Polarity, PolarityPair, Tightness, Trace, VALUE_MASK};
use crate::CategorizerWorkspace;
use log::debug;

/// Runs the merged outlier pass; returns the maximum correction residual
/// (‰) as a trustworthiness indicator.
pub(crate) fn correct_outliers(
    categories: &mut PolarityPair<CategorySet>,
    trace: &mut Trace,
    ws: &mut CategorizerWorkspace,
) -> Result<u16, CategorizerError> {
    let high_count = categories[Polarity::High].outliers.len();
    let low_count = categories[Polarity::Low].outliers.len();
    if high_count + low_count == 0 {
        return Ok(0);
    }
    if high_count + low_count > limits::MAX_MERGED_OUTLIERS {
        return Err(CategorizerError::MergedOutlierOverflow);
    }
    let merged_len = sorting::merge_sorted(
        &categories[Polarity::High].outliers,
        &categories[Polarity::Low].outliers,
        &mut ws.scratch,
    );

    let v_stop = trace.count();
    let mut rel_delta_max: u16 = 0;
    for m_ind in (0..merged_len).rev() {
        let curr = usize::from(ws.scratch[m_ind]);
        if curr == 0 {
            // cleared by an adjacent-outlier collapse below
            continue;
        }
        let polarity = Polarity::of(curr);

        if trace.raw(curr) > categories[polarity].separator_barrier {
            debug!("top-outlier at {}: {}", curr, trace.raw(curr));
            continue;
        }

        // compensate with both the preceding and the following value
        let mut flag = false;
        let mut value_sum = i32::from(trace.raw(curr));
        let mut center_sum: i32 = 0;
        let mut prev_center: u16 = 0;
        let mut next_center: u16 = 0;
        let prev = curr - 1;
        if prev >= 1 {
            let outcome =
                categories[Polarity::of(prev)].classify(trace.raw(prev), Tightness::Quarter);
            flag = outcome.near;
            prev_center = outcome.center;
            center_sum += i32::from(prev_center);
            value_sum += i32::from(trace.raw(prev));
        }
        let next = curr + 1;
        if next <= v_stop {
            let outcome =
                categories[Polarity::of(next)].classify(trace.raw(next), Tightness::Quarter);
            flag = outcome.near && flag;
            next_center = outcome.center;
            center_sum += i32::from(next_center);
            value_sum += i32::from(trace.raw(next));
        }
        let current = categories[polarity].classify(trace.raw(curr), Tightness::Quarter);
        // correctable if the outlier itself classifies, or both neighbours do
        flag = current.near || flag;

        let rel_resistant = (1000
            * (value_sum - (center_sum + i32::from(trace.raw(curr)))).abs()
            / value_sum) as u16;
        let rel_correctable =
            (1000 * (value_sum - (center_sum + i32::from(current.center))).abs() / value_sum)
                as u16;

        if !flag || rel_resistant < rel_correctable {
            debug!(
                "resistant outlier at {}: {} ({} vs {} \u{2030})",
                curr,
                trace.raw(curr),
                rel_resistant,
                rel_correctable
            );
            continue;
        }

        // correctable: replace the whole neighbourhood by centers
        if prev >= 1 {
            trace.set(prev, prev_center & VALUE_MASK);
        }
        trace.set(curr, current.center & VALUE_MASK);
        if next <= v_stop {
            trace.set(next, next_center & VALUE_MASK);
        }
        debug!(
            "corrected outlier at {} -> {} ({} \u{2030})",
            curr, current.center, rel_correctable
        );
        if rel_correctable > rel_delta_max {
            rel_delta_max = rel_correctable;
        }
        ws.scratch[m_ind] = 0;
        // the preceding outlier may be the very neighbour just corrected
        if m_ind > 0 && usize::from(ws.scratch[m_ind - 1]) == prev {
            trace.set(prev, prev_center);
            ws.scratch[m_ind - 1] = 0;
        }
    }

    // split the surviving (resistant and top) outliers back per polarity
    categories[Polarity::High].outliers.clear();
    categories[Polarity::Low].outliers.clear();
    for &index in &ws.scratch[..merged_len] {
        if index == 0 {
            continue;
        }
        let polarity = Polarity::of(usize::from(index));
        categories[polarity].outliers.push(index);
    }

    // resistant outliers are recuperated as aggregations
    aggregate(&mut categories[Polarity::High], trace, 0)?;
    aggregate(&mut categories[Polarity::Low], trace, 0)?;

    debug!("max outlier correction residual: {rel_delta_max} \u{2030}");
    Ok(rel_delta_max)
}
