//! `reqtrack`: command-line client for a reqtrack server.
//!
//! # Usage
//!
//! ```
//! reqtrack --url http://localhost:3000 list
//! reqtrack add --title "Login" --story "a user logs in" --criteria "$(cat criteria.txt)"
//! reqtrack generate 6f1c…
//! reqtrack record <test-id> --status failed --error "timeout" --time-ms 1200
//! ```

mod client;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ResultInput};
use reqtrack_core::{
  flaky::FlakinessReport,
  requirement::{NewRequirement, Requirement},
  run::RunOutcome,
};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

const DEFAULT_URL: &str = "http://localhost:3000";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "reqtrack", about = "Track requirements, tests and release risk")]
struct Args {
  /// Path to a TOML config file (`url = "..."`).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the reqtrack server (default: http://localhost:3000).
  #[arg(long, env = "REQTRACK_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List all requirements, newest first.
  List,
  /// Show one requirement.
  Show { id: Uuid },
  /// Create a requirement.
  Add {
    #[arg(long)]
    title:       String,
    #[arg(long)]
    description: Option<String>,
    /// User story text.
    #[arg(long)]
    story:       Option<String>,
    /// Acceptance criteria, one per line.
    #[arg(long)]
    criteria:    Option<String>,
    #[arg(long)]
    status:      Option<String>,
  },
  /// Delete a requirement with its tests, results and change log.
  Delete { id: Uuid },
  /// Generate test scenarios from a requirement's text.
  Generate { id: Uuid },
  /// List a requirement's tests.
  Tests { id: Uuid },
  /// Record the outcome of a test run.
  Record {
    test_id: Uuid,
    /// `passed`, `failed`, or any other label.
    #[arg(long)]
    status:  String,
    #[arg(long)]
    error:   Option<String>,
    #[arg(long)]
    time_ms: Option<i64>,
  },
  /// Classify a test as flaky from its recent results.
  Flaky { test_id: Uuid },
  /// Risk tier of a requirement from its test results.
  Risk { id: Uuid },
  /// Release checklist for a requirement.
  Checklist { id: Uuid },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flag / env override config file, which overrides the default.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| DEFAULT_URL.to_string());

  let client = ApiClient::new(base_url)?;
  run(&client, args.command).await
}

async fn run(client: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::List => {
      for r in client.list_requirements().await? {
        println!("{}  [{}]  {}", r.requirement_id, r.status, r.title);
      }
    }
    Command::Show { id } => print_requirement(&client.get_requirement(id).await?),
    Command::Add { title, description, story, criteria, status } => {
      let input = NewRequirement {
        description,
        user_story: story,
        acceptance_criteria: criteria,
        status,
        ..NewRequirement::new(title)
      };
      let created = client.create_requirement(&input).await?;
      println!("{}", created.requirement_id);
    }
    Command::Delete { id } => println!("{}", client.delete_requirement(id).await?.message),
    Command::Generate { id } => {
      let ack = client.generate_tests(id).await?;
      println!("{} ({})", ack.message, ack.count.unwrap_or_default());
    }
    Command::Tests { id } => {
      for t in client.list_tests(id).await? {
        let origin = if t.ai_generated { "generated" } else { "manual" };
        println!("{}  {:<10} {:<9} {}  [{}]", t.test_id, t.test_type, origin, t.title, t.status);
      }
    }
    Command::Record { test_id, status, error, time_ms } => {
      let input = ResultInput {
        status:         RunOutcome::from(status),
        error_message:  error,
        execution_time: time_ms,
      };
      let result = client.record_result(test_id, &input).await?;
      println!("{}  {}", result.result_id, result.status.as_str());
    }
    Command::Flaky { test_id } => match client.flaky_status(test_id).await? {
      FlakinessReport::Assessed { is_flaky, pass_count, fail_count, total_runs } => {
        let verdict = if is_flaky { "flaky" } else { "stable" };
        println!("{verdict}: {pass_count} passed, {fail_count} failed of {total_runs} runs");
      }
      FlakinessReport::Insufficient { reason, .. } => println!("{reason}"),
    },
    Command::Risk { id } => {
      let report = client.risk(id).await?;
      println!(
        "risk: {} ({} tests, {} failing)",
        report.risk_level, report.test_coverage, report.failed_tests
      );
      println!("{}", report.recommendation);
    }
    Command::Checklist { id } => {
      let report = client.release_checklist(id).await?;
      let mark = |ok: bool| if ok { "x" } else { " " };
      println!("[{}] no failed tests", mark(report.checklist.no_failed_tests));
      println!("[{}] no recent changes", mark(report.checklist.no_recent_changes));
      println!("[{}] not a new feature", mark(report.checklist.not_new_feature));
      println!("risk: {}  {}", report.risk_level, report.recommendation);
    }
  }
  Ok(())
}

fn print_requirement(r: &Requirement) {
  println!("{}  [{}]", r.title, r.status);
  println!("id:      {}", r.requirement_id);
  println!("created: {}", r.created_at.to_rfc3339());
  if let Some(d) = &r.description {
    println!("\n{d}");
  }
  if let Some(s) = &r.user_story {
    println!("\nUser story: {s}");
  }
  if let Some(c) = &r.acceptance_criteria {
    println!("\nAcceptance criteria:");
    for line in c.lines().map(str::trim).filter(|l| !l.is_empty()) {
      println!("  - {line}");
    }
  }
}
