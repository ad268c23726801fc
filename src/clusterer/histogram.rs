//! Histogram clustering with adaptive bin widths.
//!
//! One polarity's trusted interior values are dropped into a sequence of
//! 32-bin histograms. The first histogram starts at the configured floor
//! with fine bins; every value above a histogram's ceiling queues the
//! floor of the next one, whose bins double in width until the queued
//! floor is covered. That way three orders of magnitude of durations fit
//! into 16 bits without wasting bins on the sparse upper ranges.
//!
//! Within a pass, runs of occupied bins (single-bin gaps absorbed) become
//! clusters when they hold enough values; sparse runs stay in the bins and
//! are sieved into the outlier list afterwards. A run that reaches the top
//! of a histogram is requeued so the next, coarser histogram can see it
//! whole.

use crate::categorizer::{CategorizerParams, CategorizerWorkspace};
use crate::error::CategorizerError;
use crate::types::{limits, CategorySet, Cluster, Trace, CEIL, VALUE_MASK};
use log::{debug, warn};

/// Duration at the lower edge of `bin`, saturated to the ceiling.
#[inline]
fn bin_value(bin: usize, width_log2: u32, floor: u16) -> u16 {
    (((bin as u32) << width_log2) + u32::from(floor)).min(u32::from(CEIL)) as u16
}

/// Runs the adaptive histogram loop over `trace[start..=stop]` (one
/// polarity, step 2), filling `z` with clusters and sieved outliers.
///
/// `overlap` is raised when a bin run shows a bimodal population profile;
/// the run is truncated at the second mode and the corrector is expected
/// to be skipped for the whole trace.
pub(crate) fn build_clusters(
    z: &mut CategorySet,
    trace: &Trace,
    start: usize,
    stop: usize,
    params: &CategorizerParams,
    overlap: &mut bool,
    ws: &mut CategorizerWorkspace,
) -> Result<(), CategorizerError> {
    let scan_lo = start + params.border_width;
    let scan_hi = stop.saturating_sub(params.border_width);

    z.clusters.clear();
    z.outliers.clear();
    z.aggregations.clear();
    z.border_aggregations = 0;
    z.separator_barrier = 0;
    z.inlier_count = 0;

    let mut next_floor: u16 = params.start_value;
    let mut width_log2 = u32::from(params.initial_bin_width_log2);
    let mut bin_width: u16 = 1 << width_log2;
    ws.bins.fill(0);

    loop {
        let mut outlier_present = false;
        let floor = next_floor;
        let span = (limits::NUM_BINS as u32) << width_log2;
        let ceil = (u32::from(floor) + span).min(u32::from(CEIL)) as u16;
        next_floor = CEIL;

        // bin fill: trusted interior values inside [floor, ceil)
        let mut hit_count = 0usize;
        let mut filled = 0u32;
        for v_ind in (scan_lo..=scan_hi).step_by(2) {
            let value = trace.raw(v_ind);
            if value < floor {
                continue;
            }
            if !trace.is_trusted(v_ind) {
                continue;
            }
            if value >= ceil {
                // lowest trusted value above this histogram opens the next
                if value < next_floor {
                    next_floor = value;
                }
                continue;
            }
            filled += 1;
            let bin = usize::from((value - floor) >> width_log2);
            if bin >= limits::NUM_BINS {
                return Err(CategorizerError::HistogramBinRange);
            }
            if ws.bins[bin] == u8::MAX {
                continue;
            }
            ws.bins[bin] += 1;
            if hit_count < limits::MAX_HITS {
                if ws.bins[bin] <= limits::FIRST_HITS {
                    ws.scratch[hit_count] = v_ind as u16;
                    hit_count += 1;
                }
            } else {
                return Err(CategorizerError::TooManyHits);
            }
        }
        debug!(
            "histogram pass floor={} bin_width={} values={} hits={}",
            floor, bin_width, filled, hit_count
        );

        // bin clustering: walk runs of occupied bins
        let mut b = 0usize;
        while b < limits::NUM_BINS {
            // start bin: first occupied bin after a series of empty bins
            while b < limits::NUM_BINS {
                let occupied = ws.bins[b] > 0;
                b += 1;
                if occupied {
                    break;
                }
            }
            let start_bin = b - 1;
            if b >= limits::NUM_BINS {
                if ws.bins[start_bin] > 0 {
                    // run is adjacent to the next histogram; requeue it so
                    // the coarser pass sees it whole
                    next_floor = bin_value(start_bin, width_log2, floor);
                    ws.bins[start_bin] = 0;
                }
                break;
            }
            if start_bin >= limits::NUM_BINS {
                return Err(CategorizerError::ClusterStartBin);
            }

            // stop bin: more than MAX_HOLES consecutive empty bins end the run
            let mut hole_count: u8 = 0;
            let mut stop_bin = limits::NUM_BINS;
            while b < limits::NUM_BINS {
                if ws.bins[b] > 0 {
                    if hole_count > 0 {
                        z.inlier_count = z.inlier_count.saturating_add(1);
                    }
                    hole_count = 0;
                } else {
                    hole_count += 1;
                    if hole_count > limits::MAX_HOLES {
                        stop_bin = b - usize::from(limits::MAX_HOLES);
                        break;
                    }
                }
                b += 1;
            }
            if b == limits::NUM_BINS {
                if stop_bin == limits::NUM_BINS {
                    // no stop bin in this histogram; requeue the whole run
                    next_floor = bin_value(start_bin, width_log2, floor);
                    for bin in &mut ws.bins[start_bin..] {
                        *bin = 0;
                    }
                    break;
                }
                return Err(CategorizerError::ClusterScan);
            }
            if stop_bin >= limits::NUM_BINS {
                return Err(CategorizerError::ClusterStopBin);
            }

            // overlap check: a long run whose three-bin population sum
            // descends and then climbs again holds two merged clusters
            if stop_bin - start_bin >= 6 {
                let mut ascending = true;
                let mut prev_sum: u16 = 0;
                let mut sum = u16::from(ws.bins[start_bin]) + u16::from(ws.bins[start_bin + 1]);
                for bb in start_bin + 2..stop_bin {
                    sum += u16::from(ws.bins[bb]);
                    if ascending {
                        if sum + 3 < prev_sum {
                            ascending = false;
                        }
                    } else if sum > prev_sum + 3 {
                        warn!("overlapping clusters near bin {bb}");
                        *overlap = true;
                        stop_bin = bb - 2;
                        break;
                    }
                    prev_sum = sum;
                    sum -= u16::from(ws.bins[bb - 2]);
                }
            }

            let mut count: u16 = 0;
            let mut weighted: u32 = 0;
            for (k, bb) in (start_bin..stop_bin).enumerate() {
                count += u16::from(ws.bins[bb]);
                weighted += (k as u32 + 1) * u32::from(ws.bins[bb]);
            }
            if count < limits::MIN_CLUSTER_SIZE {
                // sparse run: bins stay populated and feed the sieve below
                outlier_present = true;
                continue;
            }
            for bin in &mut ws.bins[start_bin..stop_bin] {
                *bin = 0;
            }

            let floor_value = bin_value(start_bin, width_log2, floor);
            let ceil_value = bin_value(stop_bin, width_log2, floor);
            let center = ((u32::from(floor_value) + ((weighted << width_log2) / u32::from(count))
                - u32::from(bin_width >> 1)) as u16)
                & VALUE_MASK;
            z.push_cluster(Cluster {
                count,
                floor: floor_value,
                center,
                ceil: ceil_value,
            })?;
            debug!(
                "cluster {} count={} floor={} center={} ceil={}",
                z.clusters.len() - 1,
                count,
                floor_value,
                center,
                ceil_value
            );
            b = stop_bin;
        }

        // outlier sieve: the first hits of still-populated bins
        if outlier_present {
            for &hit in &ws.scratch[..hit_count] {
                let v_ind = usize::from(hit);
                let value = trace.raw(v_ind);
                let bin = usize::from((value - floor) >> width_log2);
                if ws.bins[bin] > 0 {
                    z.push_outlier(hit)?;
                    ws.bins[bin] -= 1;
                }
            }
        }

        if next_floor == CEIL {
            break;
        }
        // pull the next floor into the middle of its first bin
        next_floor -= bin_width;
        let mut cumulative_ceil = u32::from(ceil);
        while u32::from(next_floor) >= cumulative_ceil {
            width_log2 += 1;
            bin_width <<= 1;
            cumulative_ceil += (limits::NUM_BINS as u32) << width_log2;
        }
    }

    if z.clusters.is_empty() {
        return Err(CategorizerError::NoCluster);
    }
    Ok(())
}
