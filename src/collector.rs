use crate::config::CollectorConfig;
use crate::logs::{LogLine, LogSource};
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Launch the dev command and capture its output until the process exits,
/// the line budget fills, the capture window elapses, or the user hits
/// Ctrl-C. Whatever was captured up to that point is returned for analysis.
///
/// Both streams are drained concurrently; sequence numbers reflect arrival
/// order at the channel, which is the order the parser consumes.
pub async fn collect_dev_logs(
    command: &[String],
    project_dir: &Path,
    config: &CollectorConfig,
) -> Result<Vec<LogLine>> {
    if command.is_empty() {
        bail!("Dev command is empty");
    }

    log::info!("Running dev command: {}", command.join(" "));
    let mut child = Command::new(&command[0])
        .args(&command[1..])
        .current_dir(project_dir)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to launch dev command: {}", command.join(" ")))?;

    let (sender, mut receiver) = mpsc::unbounded_channel();
    if let Some(stdout) = child.stdout.take() {
        spawn_reader(stdout, LogSource::Stdout, sender.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_reader(stderr, LogSource::Stderr, sender.clone());
    }
    drop(sender);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(config.max_duration_seconds);
    let mut lines: Vec<LogLine> = Vec::new();

    loop {
        tokio::select! {
            received = receiver.recv() => {
                match received {
                    Some((source, text)) => {
                        let sequence = lines.len() as u64;
                        lines.push(LogLine::new(source, text, sequence));
                        if lines.len() >= config.max_lines {
                            log::debug!("Line budget of {} reached, stopping capture", config.max_lines);
                            break;
                        }
                    }
                    None => {
                        log::debug!("Dev process closed both output streams");
                        break;
                    }
                }
            }
            _ = tokio::time::sleep_until(deadline) => {
                log::debug!("Capture window of {}s elapsed", config.max_duration_seconds);
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Interrupted, analyzing {} captured line(s)", lines.len());
                break;
            }
        }
    }

    if let Err(e) = child.start_kill() {
        log::warn!("Failed to stop dev process: {e}");
    }
    let _ = tokio::time::timeout(Duration::from_secs(5), child.wait()).await;

    log::info!("Captured {} line(s) of dev output", lines.len());
    Ok(lines)
}

fn spawn_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    source: LogSource,
    sender: mpsc::UnboundedSender<(LogSource, String)>,
) {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream).lines();
        while let Ok(Some(line)) = reader.next_line().await {
            if sender.send((source, line)).is_err() {
                break;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> CollectorConfig {
        CollectorConfig {
            max_lines: 100,
            max_duration_seconds: 10,
            command: None,
        }
    }

    #[tokio::test]
    async fn test_captures_both_streams() {
        let command = vec![
            "sh".to_string(),
            "-c".to_string(),
            "echo out-line; echo err-line >&2".to_string(),
        ];
        let lines = collect_dev_logs(&command, Path::new("."), &test_config())
            .await
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines
            .iter()
            .any(|l| l.text == "out-line" && l.source == LogSource::Stdout));
        assert!(lines
            .iter()
            .any(|l| l.text == "err-line" && l.source == LogSource::Stderr));
        // Sequence numbers follow arrival order.
        assert_eq!(lines[0].sequence, 0);
        assert_eq!(lines[1].sequence, 1);
    }

    #[tokio::test]
    async fn test_line_budget_stops_capture() {
        let command = vec!["yes".to_string(), "still going".to_string()];
        let config = CollectorConfig {
            max_lines: 5,
            max_duration_seconds: 10,
            command: None,
        };
        let lines = collect_dev_logs(&command, Path::new("."), &config)
            .await
            .unwrap();
        assert_eq!(lines.len(), 5);
    }

    #[tokio::test]
    async fn test_empty_command_is_an_error() {
        let result = collect_dev_logs(&[], Path::new("."), &test_config()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_unlaunchable_command_is_an_error() {
        let command = vec!["devlens-no-such-binary-xyz".to_string()];
        let result = collect_dev_logs(&command, Path::new("."), &test_config()).await;
        assert!(result.is_err());
    }
}
