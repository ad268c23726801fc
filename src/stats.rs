//! Per-cluster statistics over the trusted trace values.
//!
//! Diagnostic helper for judging cluster quality: for every cluster of a
//! polarity, the mean, median and mean absolute deviation of the trusted
//! values inside its `[floor, ceil)` range.

use crate::sorting;
use crate::types::{CategorySet, Polarity, Trace};
use serde::Serialize;

/// Mean, median and mean absolute deviation of one cluster's members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ClusterStats {
    pub mean: u16,
    pub median: u16,
    pub mad: u16,
}

/// Computes the statistics of every cluster in `z` from the trusted
/// values of the given polarity. Clusters without any trusted member in
/// range yield `None`.
pub fn cluster_statistics(
    z: &CategorySet,
    trace: &Trace,
    polarity: Polarity,
) -> Vec<Option<ClusterStats>> {
    let start = match polarity {
        Polarity::High => 1,
        Polarity::Low => 2,
    };
    let stop = match polarity {
        Polarity::High => trace.count() - 1,
        Polarity::Low => trace.count(),
    };

    let mut members: Vec<u16> = Vec::new();
    z.clusters
        .iter()
        .map(|cluster| {
            members.clear();
            for v_ind in (start..=stop).step_by(2) {
                let value = trace.raw(v_ind);
                if value < cluster.floor || value >= cluster.ceil {
                    continue;
                }
                if !trace.is_trusted(v_ind) {
                    continue;
                }
                members.push(value);
            }
            if members.is_empty() {
                return None;
            }
            sorting::insertion_sort(&mut members);

            let sum: u32 = members.iter().map(|&v| u32::from(v)).sum();
            let mean = (sum / members.len() as u32) as u16;

            let n = members.len();
            let median = if n % 2 == 0 {
                ((u32::from(members[n / 2 - 1]) + u32::from(members[n / 2])) / 2) as u16
            } else {
                members[n / 2]
            };

            let deviation: u32 = members.iter().map(|&v| u32::from(v.abs_diff(median))).sum();
            let mad = (deviation / n as u32) as u16;

            Some(ClusterStats { mean, median, mad })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cluster;

    #[test]
    fn statistics_cover_only_values_in_cluster_range() {
        let payload = vec![
            390u16, 1200, 400, 1200, 410, 1200, 404, 1200, 3000, 1200,
        ];
        let trace = Trace::from_flagged(payload, 0);
        let z = CategorySet {
            clusters: vec![Cluster {
                count: 4,
                floor: 386,
                center: 400,
                ceil: 418,
            }],
            ..CategorySet::default()
        };
        let stats = cluster_statistics(&z, &trace, Polarity::High);
        let s = stats[0].expect("cluster has members");
        assert_eq!(s.mean, 401);
        assert_eq!(s.median, 402);
        assert_eq!(s.mad, 6);
    }

    #[test]
    fn empty_cluster_range_yields_none() {
        let trace = Trace::from_flagged(vec![400, 1200], 0);
        let z = CategorySet {
            clusters: vec![Cluster {
                count: 3,
                floor: 5000,
                center: 5050,
                ceil: 5100,
            }],
            ..CategorySet::default()
        };
        let stats = cluster_statistics(&z, &trace, Polarity::High);
        assert_eq!(stats, vec![None]);
    }
}
