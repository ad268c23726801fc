//! Nearest-category lookup.
//!
//! Given a duration, the classifier finds the matching cluster or, failing
//! that, the nearest cluster or aggregation center, and reports whether
//! that center is near enough under the requested [`Tightness`]. The
//! nearest category is always reported so callers can reason about
//! near-misses (the renderer uses it to distinguish `-` from `?`).

use crate::types::{CategorySet, Tightness};

/// Result of classifying one duration against a category set.
///
/// `index` lives in the combined category space: cluster indices first,
/// aggregation indices following (`index >= clusters.len()` denotes an
/// aggregation).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassifyOutcome {
    pub index: usize,
    pub center: u16,
    pub near: bool,
}

impl CategorySet {
    /// Finds the nearest category of `value`.
    ///
    /// A value inside a cluster's `[floor, ceil)` range matches that
    /// cluster outright, independent of the tightness. Otherwise the
    /// nearer of the enclosing clusters is the candidate, aggregations may
    /// take over if their center is closer still, and `near` reports
    /// whether the final distance stays below `center >> tightness`.
    ///
    /// Clusters must be non-empty and ascending; both are guaranteed for
    /// every set produced by the clusterer.
    pub fn classify(&self, value: u16, tightness: Tightness) -> ClassifyOutcome {
        debug_assert!(!self.clusters.is_empty());

        let mut index;
        let mut delta;
        match self.clusters.iter().position(|c| value < c.ceil) {
            None => {
                // above the highest cluster
                index = self.clusters.len() - 1;
                delta = value - self.clusters[index].center;
            }
            Some(slot) => {
                let above = &self.clusters[slot];
                if value >= above.floor {
                    return ClassifyOutcome {
                        index: slot,
                        center: above.center,
                        near: true,
                    };
                }
                if slot == 0 {
                    index = 0;
                    delta = above.center - value;
                } else {
                    let to_above = above.center - value;
                    let to_below = value - self.clusters[slot - 1].center;
                    if to_above < to_below {
                        index = slot;
                        delta = to_above;
                    } else {
                        index = slot - 1;
                        delta = to_below;
                    }
                }
            }
        }

        let mut center = self.clusters[index].center;
        if delta < center >> tightness.shift() {
            return ClassifyOutcome {
                index,
                center,
                near: true,
            };
        }

        for (slot, &aggregation) in self.aggregations.iter().enumerate() {
            let distance = value.abs_diff(aggregation);
            if distance < delta {
                index = self.clusters.len() + slot;
                center = aggregation;
                delta = distance;
            }
        }

        ClassifyOutcome {
            index,
            center,
            near: delta < center >> tightness.shift(),
        }
    }
}
