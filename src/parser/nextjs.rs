use crate::logs::LogLine;
use crate::metrics::{BuildEvent, BuildKind, Issue, IssueLevel, Metrics};
use crate::parser::extract::{extract_duration_ms, extract_module_count};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;

/// Registry keyword: any framework name containing this (case-insensitive)
/// is routed to this parser.
pub const KEYWORD: &str = "next";

const WAIT_PREFIX: &str = "- wait ";
const EVENT_COMPILED_PREFIX: &str = "- event compiled";
const DUPLICATE_PAGE_PREFIX: &str = "Duplicate page detected";
const NAMED_LAYOUT_PREFIX: &str = "Your page component is named \"layout\"";
const PATCHED_MARKER: &str = "was successfully patched";
const WARN_PREFIXES: [&str; 2] = ["- warn", "warn  -"];
const DEPRECATION_MARKER: &str = "DeprecationWarning";
const CLIENT_AND_SERVER: &str = "client and server";
const DETAIL_INDENT: &str = "        ";

lazy_static! {
    static ref COMPILING: Regex = Regex::new(r"^compiling\s+(.+)$").unwrap();
    static ref COMPILED_TARGET: Regex = Regex::new(r"compiled\s+(.+?)\s+successfully").unwrap();
    static ref PAREN_SUFFIX: Regex = Regex::new(r"\s*\(.*\)\s*$").unwrap();
}

/// Classifier state threaded through the line fold. An open wait window means
/// the next compiled-event line belongs to the named target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifierState {
    pub pending_wait_target: Option<String>,
}

/// Zero-or-one record emitted per classified line.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Event(BuildEvent),
    Error(Issue),
    Warning(Issue),
    Note(Issue),
}

/// Run the full classifier fold over a line batch and derive the summary.
pub fn parse(lines: Vec<LogLine>) -> Metrics {
    let mut metrics = Metrics::default();
    let mut state = ClassifierState::default();

    for i in 0..lines.len() {
        let trimmed = lines[i].text.trim();
        if trimmed.is_empty() {
            continue;
        }
        let (next_state, record) = classify_line(state, trimmed, &lines[i + 1..]);
        state = next_state;
        match record {
            Some(Record::Event(event)) => metrics.build_events.push(event),
            Some(Record::Error(issue)) => metrics.errors.push(issue),
            Some(Record::Warning(issue)) => metrics.warnings.push(issue),
            Some(Record::Note(issue)) => metrics.notes.push(issue),
            None => {}
        }
    }

    metrics.finalize_summary();
    metrics.raw_logs = lines;
    metrics
}

/// One fold step: classify a single trimmed, non-empty line.
///
/// Rules are applied in priority order and are mutually exclusive per line.
/// `following` is the untrimmed remainder of the stream; it is read only for
/// the named-layout detail block and the fold index is never advanced past
/// those lines, so they come back through here on later steps.
pub fn classify_line(
    state: ClassifierState,
    line: &str,
    following: &[LogLine],
) -> (ClassifierState, Option<Record>) {
    if let Some(rest) = line.strip_prefix(WAIT_PREFIX) {
        let target = wait_target(rest);
        log::debug!("Opening wait window for target: {target}");
        return (
            ClassifierState {
                pending_wait_target: Some(target),
            },
            None,
        );
    }

    if line.starts_with(EVENT_COMPILED_PREFIX) {
        let event = build_event(line, state.pending_wait_target);
        log::debug!(
            "Build event: target={} duration_ms={:?} modules={:?}",
            event.target,
            event.duration_ms,
            event.modules
        );
        return (ClassifierState::default(), Some(Record::Event(event)));
    }

    if line.starts_with(DUPLICATE_PAGE_PREFIX) {
        return (
            state,
            Some(Record::Error(Issue::new(IssueLevel::Error, line))),
        );
    }

    if line.starts_with(NAMED_LAYOUT_PREFIX) {
        let routes: Vec<String> = following
            .iter()
            .map(|l| l.text.as_str())
            .take_while(|text| text.starts_with(DETAIL_INDENT))
            .map(|text| text.trim().to_string())
            .collect();
        let issue = Issue::new(IssueLevel::Error, line).with_details(json!({ "routes": routes }));
        return (state, Some(Record::Error(issue)));
    }

    if line.contains(PATCHED_MARKER) {
        return (state, Some(Record::Note(Issue::new(IssueLevel::Info, line))));
    }

    if WARN_PREFIXES.iter().any(|prefix| line.starts_with(prefix)) {
        return (
            state,
            Some(Record::Warning(Issue::new(IssueLevel::Warning, line))),
        );
    }

    if line.contains(DEPRECATION_MARKER) {
        return (
            state,
            Some(Record::Warning(Issue::new(IssueLevel::Warning, line))),
        );
    }

    // Anything else is noise the dev server prints between builds.
    (state, None)
}

/// Derive the wait-window target from the text after the wait marker.
fn wait_target(rest: &str) -> String {
    let stripped = rest.trim();
    let stripped = stripped.strip_suffix("...").unwrap_or(stripped).trim();

    let target = match COMPILING.captures(stripped) {
        Some(caps) => PAREN_SUFFIX.replace(&caps[1], "").trim().to_string(),
        None => stripped.to_string(),
    };

    if target.is_empty() {
        "build".to_string()
    } else {
        target
    }
}

/// Assemble a build event from a compiled-event line and the wait window that
/// may be open for it.
fn build_event(line: &str, pending_wait_target: Option<String>) -> BuildEvent {
    let duration_ms = extract_duration_ms(line);
    let modules = extract_module_count(line);
    let had_wait = pending_wait_target.is_some();

    let target = pending_wait_target.unwrap_or_else(|| {
        let derived = COMPILED_TARGET
            .captures(line)
            .map(|caps| caps[1].replace(CLIENT_AND_SERVER, "").trim().to_string())
            .unwrap_or_default();
        if derived.is_empty() {
            "build".to_string()
        } else {
            derived
        }
    });

    let kind = if had_wait {
        BuildKind::Incremental
    } else if line.contains(CLIENT_AND_SERVER) {
        BuildKind::Initial
    } else {
        BuildKind::Incremental
    };

    BuildEvent {
        target,
        duration_ms,
        modules,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lines(texts: &[&str]) -> Vec<LogLine> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| LogLine::stdout(*text, i as u64))
            .collect()
    }

    #[test]
    fn test_wait_then_compile_is_incremental() {
        // An open wait window beats the "client and server" initial heuristic.
        let metrics = parse(lines(&[
            "- wait compiling /home...",
            "- event compiled client and server successfully in 2.3s",
        ]));

        assert_eq!(metrics.build_events.len(), 1);
        let event = &metrics.build_events[0];
        assert_eq!(event.target, "/home");
        assert_eq!(event.duration_ms, Some(2300.0));
        assert_eq!(event.kind, BuildKind::Incremental);
    }

    #[test]
    fn test_first_compile_without_wait_is_initial() {
        let metrics = parse(lines(&[
            "- event compiled client and server successfully in 850 ms",
        ]));

        let event = &metrics.build_events[0];
        assert_eq!(event.target, "build");
        assert_eq!(event.duration_ms, Some(850.0));
        assert_eq!(event.kind, BuildKind::Initial);
    }

    #[test]
    fn test_wait_target_strips_parenthesized_suffix() {
        let metrics = parse(lines(&[
            "- wait compiling /dashboard/settings (client and server)...",
            "- event compiled successfully in 420 ms (1326 modules)",
        ]));

        let event = &metrics.build_events[0];
        assert_eq!(event.target, "/dashboard/settings");
        assert_eq!(event.modules, Some(1326));
        assert_eq!(event.kind, BuildKind::Incremental);
    }

    #[test]
    fn test_wait_without_compiling_pattern_keeps_text() {
        let metrics = parse(lines(&[
            "- wait something else entirely...",
            "- event compiled successfully in 100ms",
        ]));
        assert_eq!(metrics.build_events[0].target, "something else entirely");
    }

    #[test]
    fn test_wait_window_cleared_after_event() {
        let metrics = parse(lines(&[
            "- wait compiling /a...",
            "- event compiled successfully in 100ms",
            "- event compiled /b successfully in 200ms",
        ]));

        assert_eq!(metrics.build_events[0].target, "/a");
        assert_eq!(metrics.build_events[1].target, "/b");
        assert_eq!(metrics.build_events[1].kind, BuildKind::Incremental);
    }

    #[test]
    fn test_duplicate_page_becomes_error() {
        let metrics = parse(lines(&[
            "Duplicate page detected. pages/about.js and pages/about.tsx both resolve to /about.",
        ]));

        assert_eq!(metrics.errors.len(), 1);
        assert_eq!(metrics.errors[0].level, IssueLevel::Error);
        assert!(metrics.errors[0].message.starts_with("Duplicate page detected"));
        assert!(metrics.errors[0].details.is_none());
    }

    #[test]
    fn test_named_layout_error_collects_indented_routes() {
        let metrics = parse(lines(&[
            "Your page component is named \"layout\" which conflicts with app router conventions:",
            "        pages/blog/layout.tsx",
            "        pages/shop/layout.tsx",
            "not indented, ends the block",
        ]));

        assert_eq!(metrics.errors.len(), 1);
        let details = metrics.errors[0].details.as_ref().unwrap();
        assert_eq!(
            details["routes"],
            json!(["pages/blog/layout.tsx", "pages/shop/layout.tsx"])
        );
    }

    #[test]
    fn test_detail_block_lines_are_classified_again() {
        // The lookahead reads the indented block but the fold index does not
        // skip it, so an indented warn line lands in the routes list AND in
        // warnings.
        let metrics = parse(lines(&[
            "Your page component is named \"layout\" which conflicts with app router conventions:",
            "        - warn pages/blog/layout.tsx",
        ]));

        assert_eq!(metrics.errors.len(), 1);
        assert_eq!(
            metrics.errors[0].details.as_ref().unwrap()["routes"],
            json!(["- warn pages/blog/layout.tsx"])
        );
        assert_eq!(metrics.warnings.len(), 1);
    }

    #[test]
    fn test_patched_note() {
        let metrics = parse(lines(&[
            "The module react-refresh was successfully patched for fast refresh",
        ]));
        assert_eq!(metrics.notes.len(), 1);
        assert_eq!(metrics.notes[0].level, IssueLevel::Info);
    }

    #[test]
    fn test_both_warn_marker_forms() {
        let metrics = parse(lines(&[
            "- warn You have enabled experimental features.",
            "warn  - Fast Refresh had to perform a full reload.",
        ]));
        assert_eq!(metrics.warnings.len(), 2);
    }

    #[test]
    fn test_deprecation_substring_warning() {
        let metrics = parse(lines(&[
            "(node:1234) [DEP0040] DeprecationWarning: The punycode module is deprecated.",
        ]));
        assert_eq!(metrics.warnings.len(), 1);
    }

    #[test]
    fn test_warn_marker_takes_precedence_over_deprecation() {
        let metrics = parse(lines(&[
            "- warn DeprecationWarning: legacy option in use",
        ]));
        // One warning, not two.
        assert_eq!(metrics.warnings.len(), 1);
    }

    #[test]
    fn test_unmatched_lines_are_discarded() {
        let metrics = parse(lines(&[
            "ready - started server on 0.0.0.0:3000",
            "",
            "some random output",
        ]));
        assert!(metrics.build_events.is_empty());
        assert!(metrics.warnings.is_empty());
        assert!(metrics.errors.is_empty());
        assert!(metrics.notes.is_empty());
        assert!(metrics.summary.is_none());
        assert_eq!(metrics.raw_logs.len(), 3);
    }

    #[test]
    fn test_empty_input_yields_empty_metrics() {
        let metrics = parse(Vec::new());
        assert!(metrics.build_events.is_empty());
        assert!(metrics.summary.is_none());
    }

    #[test]
    fn test_summary_reflects_longest_event() {
        let metrics = parse(lines(&[
            "- wait compiling /slow...",
            "- event compiled successfully in 4.5s (2000 modules)",
            "- wait compiling /fast...",
            "- event compiled successfully in 120 ms",
        ]));

        let summary = metrics.summary.unwrap();
        assert_eq!(summary.event_count, 2);
        assert_eq!(summary.longest_build_ms, Some(4500.0));
        assert_eq!(summary.longest_target, "/slow");
    }

    #[test]
    fn test_stepwise_fold_matches_batch_parse() {
        // Feeding lines one at a time through classify_line is the same as
        // the batch pass: classification depends on sequence order only.
        let input = lines(&[
            "- wait compiling /profile...",
            "- event compiled successfully in 1.1s (900 modules)",
            "- warn a lone warning",
            "noise between builds",
            "- event compiled client and server successfully in 650 ms",
        ]);

        let batch = parse(input.clone());

        let mut state = ClassifierState::default();
        let mut events = Vec::new();
        let mut warnings = Vec::new();
        for i in 0..input.len() {
            let trimmed = input[i].text.trim();
            if trimmed.is_empty() {
                continue;
            }
            let (next_state, record) = classify_line(state, trimmed, &input[i + 1..]);
            state = next_state;
            match record {
                Some(Record::Event(event)) => events.push(event),
                Some(Record::Warning(issue)) => warnings.push(issue),
                _ => {}
            }
        }

        assert_eq!(events, batch.build_events);
        assert_eq!(warnings, batch.warnings);
    }

    #[test]
    fn test_reparse_of_raw_logs_is_identical() {
        let input = lines(&[
            "- wait compiling /home...",
            "- event compiled client and server successfully in 2.3s (267 modules)",
            "- warn something looks off",
            "Duplicate page detected. /a and /b collide.",
        ]);

        let first = parse(input);
        let second = parse(first.raw_logs.clone());

        assert_eq!(first.build_events, second.build_events);
        assert_eq!(first.warnings, second.warnings);
        assert_eq!(first.errors, second.errors);
        assert_eq!(first.notes, second.notes);
        assert_eq!(first.summary, second.summary);
    }
}
