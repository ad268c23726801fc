//! Text rendering of the categorized sequence and the category tables.
//!
//! The sequence renders as aligned character rows, one column per
//! HIGH/LOW pair: an index ruler, the HIGH reliability row, the HIGH and
//! LOW category rows, and the LOW reliability row. Category indices print
//! as `0`..`9` then `a`.., and the special markers are:
//!
//! - `!`: the value still carries the unreliable flag,
//! - `*`: the value is at or above the top-values barrier,
//! - `-`: below the floor of the lowest category (spike before a pause),
//! - `?`: no category is near enough,
//! - blank: a zero duration, i.e. a resorbed spike/drop slot.

use crate::types::{CategorySet, Polarity, PolarityPair, Tightness, Trace};
use std::fmt::Write;

fn category_char(index: usize) -> char {
    if index < 10 {
        char::from(b'0' + index as u8)
    } else {
        char::from(b'a' + (index - 10) as u8)
    }
}

/// Length of the rendered range: a normally ended trace includes its two
/// end markers, so the trailing HIGH and the ceiling pause show up.
fn rendered_length(trace: &Trace) -> usize {
    let count = trace.count();
    if trace.raw(count + 1) != 0 && trace.raw(count + 2) != 0 {
        count + 2
    } else {
        count
    }
}

fn reliability_row(out: &mut String, trace: &Trace, polarity: Polarity, length: usize) {
    let _ = write!(out, "    : ");
    let start = match polarity {
        Polarity::High => 1,
        Polarity::Low => 2,
    };
    let mut v_ind = start;
    while v_ind <= length {
        if trace.raw(v_ind) == 0 || trace.is_reliable(v_ind) {
            out.push(' ');
        } else {
            out.push('!');
        }
        v_ind += 2;
    }
    out.push('\n');
}

fn category_row(out: &mut String, z: &CategorySet, trace: &Trace, polarity: Polarity, length: usize) {
    let start = match polarity {
        Polarity::High => 1,
        Polarity::Low => 2,
    };
    let mut v_ind = start;
    while v_ind <= length {
        let value = trace.raw(v_ind);
        v_ind += 2;
        // zero durations are resorbed spike/drop slots
        if value == 0 {
            out.push(' ');
            continue;
        }
        if value >= z.separator_barrier {
            out.push('*');
            continue;
        }
        let outcome = z.classify(value, Tightness::Eighth);
        if outcome.near {
            out.push(category_char(outcome.index));
        } else if outcome.index == 0 && value < outcome.center {
            out.push('-');
        } else {
            out.push('?');
        }
    }
    out.push('\n');
}

/// Renders the categorized sequence as aligned HIGH/LOW rows.
pub fn render_sequence(categories: &PolarityPair<CategorySet>, trace: &Trace) -> String {
    let length = rendered_length(trace);
    let mut out = String::new();

    // index ruler: a decade digit every ten values
    let _ = write!(out, "ind : 0");
    let mut decade = 0u8;
    let mut step = 2;
    let mut v_ind = 0;
    while v_ind <= length {
        if step == 10 {
            decade = (decade + 1) % 10;
            let _ = write!(out, "{decade}");
            step = 2;
        } else {
            step += 2;
            out.push(' ');
        }
        v_ind += 2;
    }
    out.push('\n');

    reliability_row(&mut out, trace, Polarity::High, length);
    let _ = write!(out, "HIGH: ");
    category_row(
        &mut out,
        &categories[Polarity::High],
        trace,
        Polarity::High,
        length,
    );
    let _ = write!(out, "LOW : ");
    category_row(
        &mut out,
        &categories[Polarity::Low],
        trace,
        Polarity::Low,
        length,
    );
    reliability_row(&mut out, trace, Polarity::Low, length);
    out
}

/// Renders the compact category table: one row per polarity with cluster
/// centers, a `;` separator, and aggregation centers.
pub fn render_category_table(categories: &PolarityPair<CategorySet>) -> String {
    let mut out = String::new();
    let columns = categories[Polarity::High]
        .category_count()
        .max(categories[Polarity::Low].category_count());
    let _ = write!(out, "ind : ");
    for index in 0..columns {
        let _ = write!(out, "\t{index}");
    }
    out.push('\n');
    for polarity in [Polarity::High, Polarity::Low] {
        let z = &categories[polarity];
        let _ = write!(out, "{:<4}: ", polarity.label());
        for cluster in &z.clusters {
            let _ = write!(out, "\t{}", cluster.center);
        }
        let _ = write!(out, ";");
        for &center in &z.aggregations {
            let _ = write!(out, "\t{center}");
        }
        out.push('\n');
    }
    out
}

/// Renders one polarity's categories in full: the cluster table plus the
/// outlier and aggregation details.
pub fn render_category_details(z: &CategorySet, trace: &Trace) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ind\tcount\tfloor\tcenter\tceil");
    for (index, cluster) in z.clusters.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            index, cluster.count, cluster.floor, cluster.center, cluster.ceil
        );
    }
    let _ = writeln!(out, "inlier count       : {}", z.inlier_count);
    let _ = writeln!(out, "top-outlier barrier: {}", z.separator_barrier);
    let _ = writeln!(out, "outlier size       : {}", z.outliers.len());
    if !z.outliers.is_empty() {
        let _ = write!(out, "outlier indices    : ");
        for &index in &z.outliers {
            let _ = write!(out, "{index}\t");
        }
        out.push('\n');
        let _ = write!(out, "outlier values     : ");
        for &index in &z.outliers {
            let _ = write!(out, "{}\t", trace.raw(usize::from(index)));
        }
        out.push('\n');
    }
    if !z.aggregations.is_empty() {
        let _ = write!(out, "aggregation centers: ");
        for &center in &z.aggregations {
            let _ = write!(out, "{center}\t");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cluster;

    fn categories() -> PolarityPair<CategorySet> {
        let high = CategorySet {
            clusters: vec![Cluster {
                count: 4,
                floor: 386,
                center: 400,
                ceil: 418,
            }],
            separator_barrier: 4180,
            ..CategorySet::default()
        };
        let low = CategorySet {
            clusters: vec![Cluster {
                count: 4,
                floor: 1180,
                center: 1200,
                ceil: 1220,
            }],
            separator_barrier: 12_200,
            ..CategorySet::default()
        };
        PolarityPair::new(low, high)
    }

    #[test]
    fn rows_carry_category_indices_and_markers() {
        // columns: ok, resorbed HIGH slot, top LOW, unclassifiable HIGH
        let trace = Trace::from_flagged(
            vec![400, 1200, 417, 1199, 400, 13_000, 777, 1200],
            0,
        );
        let rendered = render_sequence(&categories(), &trace);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[2], "HIGH: 000?");
        assert_eq!(lines[3], "LOW : 00*0");
    }

    #[test]
    fn zero_duration_renders_blank() {
        let mut trace = Trace::from_flagged(vec![400, 1200, 417, 1199, 400, 1200], 0);
        trace.set(3, 0);
        trace.set(4, 0);
        let rendered = render_sequence(&categories(), &trace);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[2], "HIGH: 0 0");
        assert_eq!(lines[3], "LOW : 0 0");
    }

    #[test]
    fn low_spike_renders_a_dash() {
        let trace = Trace::from_flagged(vec![400, 1200, 40, 1200], 0);
        let rendered = render_sequence(&categories(), &trace);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[2], "HIGH: 0-");
    }

    #[test]
    fn unreliable_flags_show_in_the_reliability_rows() {
        let trace = Trace::from_flagged(vec![401, 1200, 400, 1201], 2);
        let rendered = render_sequence(&categories(), &trace);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[1], "    : ! ");
        assert_eq!(lines[4], "    :  !");
    }

    #[test]
    fn normal_end_markers_are_rendered() {
        let trace =
            Trace::from_flagged(vec![400, 1200], 0).with_normal_end(400);
        let rendered = render_sequence(&categories(), &trace);
        let lines: Vec<&str> = rendered.lines().collect();
        // trailing HIGH classifies, the ceiling sentinel is a top value
        assert_eq!(lines[2], "HIGH: 00");
        assert_eq!(lines[3], "LOW : 0*");
    }

    #[test]
    fn category_table_separates_clusters_from_aggregations() {
        let mut cats = categories();
        cats[Polarity::High].push_aggregation(50).unwrap();
        let table = render_category_table(&cats);
        assert!(table.contains("HIGH: \t400;\t50"));
        assert!(table.contains("LOW : \t1200;"));
    }

    #[test]
    fn category_details_list_outliers_with_values() {
        let trace = Trace::from_flagged(vec![400, 1200, 3000, 1200], 0);
        let mut cats = categories();
        cats[Polarity::High].push_outlier(3).unwrap();
        let details = render_category_details(&cats[Polarity::High], &trace);
        assert!(details.contains("outlier size       : 1"));
        assert!(details.contains("3000"));
    }
}
