#![warn(clippy::all, rust_2018_idioms)]

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use awslogs_insights::app::InsightsConfig;
use awslogs_insights::cloudwatch_logs::{
    CloudWatchLogsClient, LogGroupCatalog, QueryEditorState, QuerySubmitter, SubmissionError,
    TimeRange,
};

const DEFAULT_LOG_FILTER: &str =
    "awslogs_insights=info,aws_config=warn,aws_smithy_runtime=warn,aws_smithy_runtime_api=warn,hyper=warn";

/// Start CloudWatch Logs Insights queries from the command line
#[derive(Parser, Debug)]
#[command(name = "awslogs-insights")]
#[command(version = awslogs_insights::version_string())]
struct Cli {
    /// Path to insights.json (default: ./insights.json, then the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// AWS region (overrides config and AWS_REGION)
    #[arg(long)]
    region: Option<String>,

    /// Credential profile (overrides config and AWS_PROFILE)
    #[arg(long)]
    profile: Option<String>,

    /// Log group to query; repeat for several
    #[arg(short = 'g', long = "log-group")]
    log_groups: Vec<String>,

    /// Relative time range, e.g. 15m, 2h, 1d, 1w
    #[arg(long, conflicts_with_all = ["start", "end"])]
    last: Option<String>,

    /// Absolute range start (RFC 3339)
    #[arg(long, requires = "end", value_parser = parse_instant)]
    start: Option<DateTime<Utc>>,

    /// Absolute range end (RFC 3339)
    #[arg(long, requires = "start", value_parser = parse_instant)]
    end: Option<DateTime<Utc>>,

    /// Insights query-language text
    #[arg(short, long, conflicts_with = "search")]
    query: Option<String>,

    /// Free-text search term matched against @message
    #[arg(short, long)]
    search: Option<String>,

    /// List log groups and exit
    #[arg(long)]
    list_log_groups: bool,

    /// Log group name prefix for --list-log-groups
    #[arg(long, requires = "list_log_groups")]
    prefix: Option<String>,

    /// Print the predicted output fields without starting the query
    #[arg(long)]
    fields_only: bool,
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let log_file = directories::ProjectDirs::from("com", "", "awslogs-insights").and_then(|proj_dirs| {
        let log_dir = proj_dirs.data_dir().join("logs");
        std::fs::create_dir_all(&log_dir).ok()?;
        let log_path = log_dir.join("awslogs-insights.log");

        let file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&log_path)
            .ok()?;

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = std::fs::set_permissions(&log_path, std::fs::Permissions::from_mode(0o600)) {
                eprintln!("Failed to set log file permissions: {}", e);
            }
        }

        Some((file, log_path))
    });

    let result = match log_file {
        Some((file, log_path)) => {
            let subscriber = tracing_subscriber::registry().with(filter).with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::sync::Mutex::new(file))
                    .with_ansi(false),
            );
            tracing::subscriber::set_global_default(subscriber).map(|()| Some(log_path))
        }
        None => {
            let subscriber = tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
            tracing::subscriber::set_global_default(subscriber).map(|()| None)
        }
    };

    match result {
        Ok(log_path) => {
            // Bridge log crate events to tracing; must follow set_global_default
            if let Err(e) = tracing_log::LogTracer::init() {
                eprintln!("Failed to initialize log-to-tracing bridge: {}", e);
            }
            if let Some(log_path) = log_path {
                tracing::info!("Logging initialized to: {:?}", log_path);
            }
        }
        Err(e) => eprintln!("Failed to set tracing subscriber: {}", e),
    }
}

/// Apply command-line overrides on top of the configured editor defaults
fn editor_state(cli: &Cli, config: &InsightsConfig) -> Result<QueryEditorState> {
    let mut state = config.editor_state();

    if !cli.log_groups.is_empty() {
        state.log_groups = cli.log_groups.clone();
    }

    if let Some(last) = &cli.last {
        let range = TimeRange::parse_relative(last).context("Invalid --last value")?;
        if let TimeRange::Relative { amount, unit } = range {
            state.relative_time_amount = amount.to_string();
            state.relative_time_unit = unit;
        }
    }

    if let (Some(start), Some(end)) = (cli.start, cli.end) {
        state.absolute_time_selected = true;
        state.relative_time_selected = false;
        state.start_date = start;
        state.end_date = end;
    }

    if let Some(query) = &cli.query {
        state.query_text = query.clone();
    }

    if let Some(term) = &cli.search {
        state.insights_query_selected = false;
        state.search_term_selected = true;
        state.search_term = term.clone();
    }

    Ok(state)
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = InsightsConfig::load(cli.config.as_deref())?
        .with_env_overrides(cli.region.clone(), cli.profile.clone());
    let connection = config.connection();
    let client = Arc::new(CloudWatchLogsClient::new());

    if cli.list_log_groups {
        let log_groups = client
            .list_log_groups(&connection, cli.prefix.as_deref())
            .await
            .context("Failed to list log groups")?;
        for name in log_groups {
            println!("{}", name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let state = editor_state(&cli, &config)?;
    let fields = state.predicted_fields();

    if cli.fields_only {
        println!("{}", fields.join(", "));
        return Ok(ExitCode::SUCCESS);
    }

    let details = match state.query_details(connection) {
        Ok(details) => details,
        Err(e) => {
            tracing::warn!("Query rejected by validation: {:?}", e);
            eprintln!("{}", e);
            return Ok(ExitCode::from(2));
        }
    };

    if !fields.is_empty() {
        eprintln!("Columns: {}", fields.join(", "));
    }

    let handle = QuerySubmitter::new(client).start_query_async(&details);

    let cancel_token = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_token.cancel();
        }
    });

    match handle.outcome().await {
        Ok(query) => {
            println!("{}", query.id);
            Ok(ExitCode::SUCCESS)
        }
        Err(SubmissionError::Cancelled) => {
            eprintln!("cancelled");
            Ok(ExitCode::from(130))
        }
        Err(SubmissionError::Remote(e)) => {
            tracing::error!("Query submission failed: {}", e);
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();
    tracing::info!("awslogs-insights {} starting", awslogs_insights::version_string());

    let result = tokio::runtime::Runtime::new()
        .context("Failed to create tokio runtime")
        .and_then(|runtime| runtime.block_on(run(cli)));

    match result {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
