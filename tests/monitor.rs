use dminisat_rust::monitor::{self, Monitor};
use dminisat_rust::sat::Stats;


#[test]
fn empty_report_has_no_nan() {
    let report = monitor::format_stats(&Stats::default(), 0.0, None);
    assert!(report.contains("conflicts             : 0"));
    assert!(!report.contains("NaN") && !report.contains("inf"));
    assert!(!report.contains("Memory used"));

    let report = monitor::format_stats(&Stats::default(), 1.5, Some(2048));
    assert!(report.contains("Memory used           : 2.00 MB"));
}

#[test]
fn report_labels_wall_clock_time_as_elapsed() {
    let stats = Stats { conflicts: 30, ..Stats::default() };
    let report = monitor::format_stats(&stats, 1.5, None);
    assert!(report.ends_with("Elapsed time          : 1.5 s\n"), "{}", report);
    assert!(report.contains("(20 /sec)"), "{}", report);
    assert!(!report.contains("CPU time"));
}

#[test]
fn retired_engines_accumulate() {
    let m = Monitor::new();
    let one = Stats { solves: 1, conflicts: 10, decisions: 20, ..Stats::default() };

    m.publish(one);
    m.retire();
    m.publish(one);
    assert_eq!(m.snapshot().conflicts, 20);

    // Publishing replaces the live engine's counters instead of adding to them.
    m.publish(Stats { solves: 1, conflicts: 15, ..Stats::default() });
    let total = m.snapshot();
    assert_eq!(total.solves, 2);
    assert_eq!(total.conflicts, 25);
    assert!(m.elapsed() >= 0.0);
}
