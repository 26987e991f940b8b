use devlens::config::Thresholds;
use devlens::logs::LogLine;
use devlens::{evaluate, parser};

fn main() {
    env_logger::init();

    println!("Testing the Next.js parser against a captured dev session...");

    let sample_log = r#"ready - started server on 0.0.0.0:3000, url: http://localhost:3000
- event compiled client and server successfully in 2.3s (1326 modules)
- wait compiling /dashboard...
- event compiled successfully in 850 ms (1402 modules)
- warn You have enabled experimental features in next.config.js.
- wait compiling /dashboard/settings (client and server)...
- event compiled successfully in 41.2s (1655 modules)
(node:1234) [DEP0040] DeprecationWarning: The punycode module is deprecated.
Duplicate page detected. pages/about.js and pages/about.tsx both resolve to /about.
The module react-refresh was successfully patched for fast refresh
"#;

    let lines = LogLine::from_text(sample_log);
    let metrics = parser::parse("next", lines);

    println!();
    println!("Build events:");
    for event in &metrics.build_events {
        println!(
            "  {} -> duration {:?}ms, modules {:?}, kind {:?}",
            event.target, event.duration_ms, event.modules, event.kind
        );
    }
    println!("Warnings: {}", metrics.warnings.len());
    println!("Errors: {}", metrics.errors.len());
    println!("Notes: {}", metrics.notes.len());

    if let Some(summary) = &metrics.summary {
        println!(
            "Longest build: {} ({:?}ms over {} event(s))",
            summary.longest_target, summary.longest_build_ms, summary.event_count
        );
    }

    let result = evaluate(&metrics, &[], &Thresholds::default());
    println!();
    println!("Score: {}/100 ({})", result.score, result.level);
    for recommendation in &result.recommendations {
        println!("  [{:?}] {}", recommendation.level, recommendation.message);
    }

    // Expected: 3 build events, the 41.2s settings build flagged slow, one
    // duplicate-page error, two warnings, one patched note.
    assert_eq!(metrics.build_events.len(), 3);
    assert_eq!(metrics.warnings.len(), 2);
    assert_eq!(metrics.errors.len(), 1);
    assert_eq!(metrics.notes.len(), 1);
    println!();
    println!("✅ Parser sample checks passed");
}
