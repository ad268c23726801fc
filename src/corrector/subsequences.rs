//! Correction of untrusted subsequences flagged by the recorder.
//!
//! Each extracted window is first scanned for top values (added to the
//! outliers and aggregated on the fly, so later windows can classify
//! against them), then approximated element-wise by the nearest category
//! centers. When one of the elements resists classification the window is
//! handed to the resorber; if that refuses too, the best-fit overwrite is
//! applied anyway.

use crate::aggregator::aggregate;
use crate::categorizer::CategorizerParams;
use crate::corrector::extractor::WindowExtractor;
use crate::corrector::resorber::resorb;
use crate::error::CategorizerError;
use crate::types::{CategorySet, Polarity, PolarityPair, Tightness, Trace};
use log::debug;

/// Walks the untrusted windows and repairs them in place; returns the
/// maximum correction residual (‰).
pub(crate) fn correct_subsequences(
    categories: &mut PolarityPair<CategorySet>,
    trace: &mut Trace,
    params: &CategorizerParams,
) -> Result<u16, CategorizerError> {
    let mut extractor = WindowExtractor::new(1 + params.border_width, trace.count());
    let mut rel_delta_max: u16 = 0;
    let mut centers = [0u16; 5];

    while let Some((start, stop)) = extractor.next_window(trace) {
        let length = stop - start + 1;
        // the recorder only ever produces quadruples and quintuples
        if !(4..=5).contains(&length) {
            return Err(CategorizerError::SubsequenceLength);
        }
        debug!("untrusted window {start}..={stop}");

        // untrusted top values become outliers right away; the immediate
        // re-aggregation lets the rest of the window classify against them
        for v_ind in start..=stop {
            let polarity = Polarity::of(v_ind);
            let value = trace.raw(v_ind);
            if value > categories[polarity].separator_barrier {
                debug!("untrusted top-outlier at {v_ind}: {value}");
                categories[polarity].push_outlier(v_ind as u16)?;
                aggregate(&mut categories[polarity], trace, 0)?;
            }
        }

        // best-fit approximation: every element by its nearest center
        let mut all_near = true;
        let mut value_sum: i32 = 0;
        let mut center_sum: i32 = 0;
        for (k, v_ind) in (start..=stop).enumerate() {
            let outcome =
                categories[Polarity::of(v_ind)].classify(trace.raw(v_ind), Tightness::Eighth);
            all_near = outcome.near && all_near;
            value_sum += i32::from(trace.raw(v_ind));
            center_sum += i32::from(outcome.center);
            centers[k] = outcome.center;
        }
        let mut rel_delta = (1000 * (value_sum - center_sum).abs() / value_sum) as u16;

        if all_near {
            // overwriting with centers also clears the reliability flags
            for (k, v_ind) in (start..=stop).enumerate() {
                trace.set(v_ind, centers[k]);
            }
        } else {
            let polarity = Polarity::of(start + 1);
            let accepted = resorb(
                &mut categories[polarity],
                trace,
                &centers[..length],
                start,
                stop,
                &mut rel_delta,
            )?;
            if !accepted {
                for (k, v_ind) in (start..=stop).enumerate() {
                    trace.set(v_ind, centers[k]);
                }
            }
        }

        if rel_delta > rel_delta_max {
            rel_delta_max = rel_delta;
        }
        debug!("window {start}..={stop} corrected ({rel_delta} \u{2030})");
    }

    debug!("max subsequence correction residual: {rel_delta_max} \u{2030}");
    Ok(rel_delta_max)
}
