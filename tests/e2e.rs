mod common;

use common::synthetic_trace::{jittered, TraceBuilder};
use ook_categorizer::render::render_sequence;
use ook_categorizer::types::Polarity;
use ook_categorizer::{Categorizer, CategorizerError, CategorizerParams};

fn categorizer() -> Categorizer {
    let _ = env_logger::builder().is_test(true).try_init();
    Categorizer::new(CategorizerParams::default())
}

#[test]
fn pure_two_level_trace_maps_to_zeros() {
    let mut builder = TraceBuilder::new();
    for k in 0..40 {
        builder = builder.value(jittered(400, k)).value(jittered(1200, k));
    }
    let mut trace = builder.build();
    let report = categorizer().process(&mut trace).expect("clusterable");

    for polarity in [Polarity::High, Polarity::Low] {
        let z = &report.categories[polarity];
        assert_eq!(z.clusters.len(), 1, "{} clusters", polarity.label());
        assert!(z.outliers.is_empty());
        assert!(z.aggregations.is_empty());
    }
    assert!(!report.overlap);
    assert!(report.corrected);

    let rendered = render_sequence(&report.categories, &trace);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[2], format!("HIGH: {}", "0".repeat(40)));
    assert_eq!(lines[3], format!("LOW : {}", "0".repeat(40)));
}

#[test]
fn normal_end_renders_the_trailing_high_and_the_pause() {
    let mut trace = TraceBuilder::new().pairs(30, 400, 1200).build_with_tail(402);
    let report = categorizer().process(&mut trace).expect("clusterable");
    let rendered = render_sequence(&report.categories, &trace);
    let lines: Vec<&str> = rendered.lines().collect();
    // 30 HIGH columns plus the trailing HIGH; the ceiling sentinel is a pause
    assert_eq!(lines[2], format!("HIGH: {}", "0".repeat(31)));
    assert_eq!(lines[3], format!("LOW : {}*", "0".repeat(30)));
}

#[test]
fn stray_high_becomes_a_resistant_aggregation() {
    // three HIGH levels plus one stray HIGH of 50
    let mut builder = TraceBuilder::new().pairs(4, 400, 1000);
    builder = builder.value(50).value(1000);
    let levels = [400u16, 800, 1600];
    for k in 0..21 {
        builder = builder.value(levels[k % 3]).value(1000);
    }
    builder = builder.pairs(4, 400, 1000);
    assert_eq!(builder.len(), 60);
    let mut trace = builder.build();
    let report = categorizer().process(&mut trace).expect("clusterable");

    let high = &report.categories[Polarity::High];
    assert_eq!(high.clusters.len(), 3);
    let centers: Vec<u16> = high.clusters.iter().map(|c| c.center).collect();
    assert!(centers[0].abs_diff(400) <= 25);
    assert!(centers[1].abs_diff(800) <= 50);
    assert!(centers[2].abs_diff(1600) <= 100);

    // the stray resisted correction: still an outlier, now aggregated
    assert_eq!(high.outliers, vec![9]);
    assert_eq!(high.aggregations, vec![50]);
    assert_eq!(trace.raw(9), 50);

    // its column prints the first aggregation index (cluster count + 0)
    let rendered = render_sequence(&report.categories, &trace);
    let high_row = rendered.lines().nth(2).unwrap();
    assert_eq!(high_row.as_bytes()[6 + 4], b'3');
}

#[test]
fn top_value_prints_a_star() {
    let mut builder = TraceBuilder::new();
    for k in 0..40 {
        let high = if k == 20 { 60_000 } else { 400 };
        builder = builder.value(high).value(1200);
    }
    let mut trace = builder.build();
    let report = categorizer().process(&mut trace).expect("clusterable");

    let high = &report.categories[Polarity::High];
    assert!(high.separator_barrier < 60_000);
    assert_eq!(high.outliers, vec![41]);
    assert_eq!(high.aggregations, vec![60_000]);
    assert_eq!(trace.raw(41), 60_000, "top values are left alone");

    let rendered = render_sequence(&report.categories, &trace);
    let high_row = rendered.lines().nth(2).unwrap();
    assert_eq!(high_row.as_bytes()[6 + 20], b'*');
}

#[test]
fn untrusted_triple_spike_is_resorbed() {
    let mut builder = TraceBuilder::new();
    for k in 0..40 {
        // a second HIGH level at 950 gives the resorbed triple a home
        let high = if (6..=12).contains(&k) && k % 2 == 0 { 950 } else { 400 };
        builder = match k {
            // the spike window: 450+50+450 sums to the 950 level
            20 => builder.flagged(450).flagged(50),
            21 => builder.flagged(450).value(1200),
            _ => builder.value(high).value(1200),
        };
    }
    let mut trace = builder.build();
    let report = categorizer().process(&mut trace).expect("clusterable");

    assert_eq!(
        (40..=44).map(|i| trace.raw(i)).collect::<Vec<_>>(),
        vec![1200, 950, 0, 0, 1200]
    );
    assert_eq!(report.max_rel_delta, 0);

    let rendered = render_sequence(&report.categories, &trace);
    let high_row = rendered.lines().nth(2).unwrap();
    let low_row = rendered.lines().nth(3).unwrap();
    // HIGH column 20 carries the synthesized 950, column 21 is blank
    assert_eq!(high_row.as_bytes()[6 + 20], b'1');
    assert_eq!(high_row.as_bytes()[6 + 21], b' ');
    assert_eq!(low_row.as_bytes()[6 + 20], b' ');
}

#[test]
fn bimodal_bin_run_raises_the_overlap_flag() {
    // 22 HIGH values spread over six adjacent bins with a bimodal profile
    let mut interior = Vec::new();
    interior.extend_from_slice(&[216u16; 8]);
    interior.extend_from_slice(&[232, 232, 248, 264, 264]);
    interior.extend_from_slice(&[280; 8]);
    interior.push(296);
    let mut builder = TraceBuilder::new().pairs(4, 216, 1200);
    for &high in &interior {
        builder = builder.value(high).value(1200);
    }
    builder = builder.pairs(4, 216, 1200);
    let mut trace = builder.build();
    let before: Vec<u16> = (1..=trace.count()).map(|i| trace.raw(i)).collect();

    let report = categorizer().process(&mut trace).expect("still clusterable");
    assert!(report.overlap);
    assert!(!report.corrected, "overlap suppresses the corrector");
    assert_eq!(report.max_rel_delta, 0);
    let after: Vec<u16> = (1..=trace.count()).map(|i| trace.raw(i)).collect();
    assert_eq!(before, after, "the trace is left untouched");
    assert!(report.categories[Polarity::High].clusters.len() >= 2);
}

#[test]
fn nine_distinct_levels_overflow_the_cluster_table() {
    let levels = [100u16, 200, 300, 400, 500, 700, 1400, 2800, 5600];
    let mut builder = TraceBuilder::new().pairs(4, 400, 1000);
    for k in 0..27 {
        builder = builder.value(levels[k % 9]).value(1000);
    }
    builder = builder.pairs(4, 400, 1000);
    let mut trace = builder.build();
    let err = categorizer().process(&mut trace).unwrap_err();
    assert_eq!(err, CategorizerError::TooManyClusters);
    assert_eq!(err.code(), 3);
}

#[test]
fn flagged_pairs_inside_clusters_correct_to_the_reference() {
    let reference = TraceBuilder::new().pairs(30, 400, 1200);
    let mut reference_trace = reference.build();
    let reference_report = categorizer()
        .process(&mut reference_trace)
        .expect("clusterable");
    let reference_rendering =
        render_sequence(&reference_report.categories, &reference_trace);

    let mut payload = Vec::new();
    for _ in 0..30 {
        payload.push(400u16);
        payload.push(1200);
    }
    for &index in &[21usize, 22, 31, 32, 41, 42] {
        payload[index - 1] |= 1;
    }
    let mut flagged_trace = ook_categorizer::Trace::from_flagged(payload, 6);
    let report = categorizer().process(&mut flagged_trace).expect("clusterable");

    // every flagged value classified to its center; no flags survive
    for index in 1..=flagged_trace.count() {
        assert!(flagged_trace.is_reliable(index));
    }
    assert_eq!(
        render_sequence(&report.categories, &flagged_trace),
        reference_rendering
    );
}
