use anyhow::Context;
use clap::{Arg, Command};
use devlens::collector::collect_dev_logs;
use devlens::config::Config;
use devlens::detect::{detect_project, ProjectInfo};
use devlens::insight::{build_prompt, InsightClient};
use devlens::logs::LogLine;
use devlens::recommend::ConfigFileStatus;
use devlens::report::{AnalysisReport, ReportFormat};
use devlens::{evaluate, parser};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let matches = Command::new("devlens")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dev-server build log analyzer with health scoring and remediation advice")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("devlens.yaml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Test configuration validity")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("project-dir")
                .short('p')
                .long("project-dir")
                .value_name("DIR")
                .help("Project directory to analyze (defaults to the current directory)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("framework")
                .long("framework")
                .value_name("NAME")
                .help("Skip detection and use this framework name")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .help("Analyze a pre-captured log file instead of running the dev command")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("duration")
                .short('d')
                .long("duration")
                .value_name("SECONDS")
                .help("How long to capture dev output before analyzing")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Report format (json, markdown, text)")
                .default_value("text"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write the report to a file instead of stdout")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("no-llm")
                .long("no-llm")
                .help("Skip the LLM insight call")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches.get_one::<String>("config").unwrap();
    let mut config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            process::exit(1);
        }
    };

    if let Some(dir) = matches.get_one::<String>("project-dir") {
        config.project_dir = Some(dir.clone());
    }
    if let Some(framework) = matches.get_one::<String>("framework") {
        config.framework = Some(framework.clone());
    }
    if let Some(duration) = matches.get_one::<String>("duration") {
        match duration.parse::<u64>() {
            Ok(seconds) => config.collector.max_duration_seconds = seconds,
            Err(_) => {
                eprintln!("Invalid --duration value: {duration}");
                process::exit(1);
            }
        }
    }
    if matches.get_flag("no-llm") {
        config.llm.enabled = false;
    }

    if matches.get_flag("test-config") {
        test_config(config_path, &config);
        return;
    }

    let format = match ReportFormat::parse(matches.get_one::<String>("format").unwrap()) {
        Some(format) => format,
        None => {
            eprintln!(
                "Unknown report format: {} (expected json, markdown, or text)",
                matches.get_one::<String>("format").unwrap()
            );
            process::exit(1);
        }
    };
    let log_file = matches.get_one::<String>("log-file").map(PathBuf::from);
    let output = matches.get_one::<String>("output").map(PathBuf::from);

    if let Err(e) = run_analysis(&config, log_file.as_deref(), format, output.as_deref()).await {
        eprintln!("Analysis failed: {e}");
        process::exit(1);
    }
}

fn generate_default_config(path: &str) {
    match Config::default().to_file(path) {
        Ok(()) => println!("✅ Default configuration written to {path}"),
        Err(e) => {
            eprintln!("Error generating configuration: {e}");
            process::exit(1);
        }
    }
}

/// Load configuration. A missing file at the default path is fine; the
/// defaults are usable as-is.
fn load_config(path: &str) -> anyhow::Result<Config> {
    if Path::new(path).exists() {
        let config = Config::from_file(path)?;
        log::info!("Loaded configuration from {path}");
        Ok(config)
    } else {
        log::debug!("No configuration file at {path}, using defaults");
        Ok(Config::default())
    }
}

fn test_config(path: &str, config: &Config) {
    println!("🔍 Testing configuration...");
    println!();
    println!(
        "Configuration file: {}",
        if Path::new(path).exists() { path } else { "(defaults)" }
    );
    println!(
        "Thresholds: warning_penalty={} error_penalty={} slow_build_ms={}",
        config.thresholds.warning_penalty,
        config.thresholds.error_penalty,
        config.thresholds.slow_build_ms
    );
    println!(
        "Collector: max_lines={} max_duration_seconds={}",
        config.collector.max_lines, config.collector.max_duration_seconds
    );
    println!(
        "LLM insight: {} (model {}, key from ${})",
        if config.llm.enabled { "enabled" } else { "disabled" },
        config.llm.model,
        config.llm.api_key_env
    );
    println!();
    println!("✅ Configuration is valid");
}

async fn run_analysis(
    config: &Config,
    log_file: Option<&Path>,
    format: ReportFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let project_dir = PathBuf::from(config.project_dir.as_deref().unwrap_or("."));

    // Detection is mandatory when we have to launch the dev command, and
    // best-effort when analyzing a pre-captured log file.
    let project: Option<ProjectInfo> = if log_file.is_some() {
        match detect_project(&project_dir) {
            Ok(info) => Some(info),
            Err(e) => {
                log::warn!("Project detection skipped: {e}");
                None
            }
        }
    } else {
        Some(detect_project(&project_dir)?)
    };

    let framework_name = config
        .framework
        .clone()
        .or_else(|| project.as_ref().map(|p| p.framework.name().to_string()))
        .unwrap_or_else(|| "unknown".to_string());
    log::info!("Analyzing framework: {framework_name}");

    let lines = match log_file {
        Some(path) => LogLine::read_file(path)?,
        None => {
            let info = project
                .as_ref()
                .context("Project detection is required to run the dev command")?;
            let command = config
                .collector
                .command
                .clone()
                .unwrap_or_else(|| info.dev_command.clone());
            collect_dev_logs(&command, &project_dir, &config.collector).await?
        }
    };

    let metrics = parser::parse(&framework_name, lines);

    let config_files: Vec<ConfigFileStatus> = match &config.expected_config_files {
        Some(paths) => paths
            .iter()
            .map(|path| ConfigFileStatus {
                path: path.clone(),
                exists: project_dir.join(path).exists(),
            })
            .collect(),
        None => project
            .as_ref()
            .map(|p| p.config_files.clone())
            .unwrap_or_default(),
    };

    let result = evaluate(&metrics, &config_files, &config.thresholds);

    let insight = if config.llm.enabled {
        let prompt = build_prompt(&metrics, &result, config.llm.context.as_deref());
        let api_key = std::env::var(&config.llm.api_key_env).ok();
        match InsightClient::new(config.llm.clone()) {
            Ok(client) => client.fetch_insight(api_key.as_deref(), &prompt).await,
            Err(e) => {
                log::warn!("Failed to build LLM client: {e}");
                None
            }
        }
    } else {
        None
    };

    let report = AnalysisReport::new(framework_name, project, metrics, result, insight);
    report.write(format, output)
}
