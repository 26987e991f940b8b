use devlens::config::Thresholds;
use devlens::metrics::{BuildEvent, BuildKind, Issue, IssueLevel, Metrics};
use devlens::score::score;

fn demo_metrics(errors: usize, warnings: usize, longest_ms: Option<f64>) -> Metrics {
    let mut metrics = Metrics::default();
    for i in 0..errors {
        metrics
            .errors
            .push(Issue::new(IssueLevel::Error, format!("error {i}")));
    }
    for i in 0..warnings {
        metrics
            .warnings
            .push(Issue::new(IssueLevel::Warning, format!("warning {i}")));
    }
    if let Some(duration) = longest_ms {
        metrics.build_events.push(BuildEvent {
            target: "build".to_string(),
            duration_ms: Some(duration),
            modules: None,
            kind: BuildKind::Initial,
        });
        metrics.finalize_summary();
    }
    metrics
}

fn main() {
    env_logger::init();

    println!("Scoring demo with default thresholds (warning 5, error 20, slow 30000ms)");
    println!();

    let cases = [
        ("clean run", demo_metrics(0, 0, Some(1_500.0))),
        ("two warnings", demo_metrics(0, 2, Some(1_500.0))),
        ("one error, one warning", demo_metrics(1, 1, Some(1_500.0))),
        ("slow 45s build", demo_metrics(0, 0, Some(45_000.0))),
        ("everything wrong", demo_metrics(3, 5, Some(120_000.0))),
    ];

    let thresholds = Thresholds::default();
    for (label, metrics) in &cases {
        let (value, level) = score(metrics, &thresholds);
        println!("  {label}: {value}/100 ({level})");
    }

    let (clean, _) = score(&cases[0].1, &thresholds);
    let (slow, slow_level) = score(&cases[3].1, &thresholds);
    let (worst, worst_level) = score(&cases[4].1, &thresholds);

    assert_eq!(clean, 100);
    assert_eq!(slow, 90);
    assert_eq!(format!("{slow_level}"), "Excellent");
    // 100 - 60 - 25 - 30 clamps at 0.
    assert_eq!(worst, 0);
    assert_eq!(format!("{worst_level}"), "Poor");

    println!();
    println!("✅ Scoring demo checks passed");
}
