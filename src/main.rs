// src/main.rs
use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::env;
use thiserror::Error;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod harvest;
mod period;
mod report;
mod slack;

mod period_tests;

use harvest::{HarvestClient, HarvestConfig, HarvestError, HarvestUser, TimeReportEntry};
use period::ReportingPeriod;
use report::{EmployeeRecord, Report, ReportConfig, ReportMode};
use slack::{SlackClient, SlackError, SlackMember};

// --- Error Handling ---

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid value for {name}: '{value}'")]
    InvalidEnvVar { name: String, value: String },
    #[error("Harvest API client error")]
    Harvest(#[from] HarvestError),
    #[error("Slack API client error")]
    Slack(#[from] SlackError),
}

// --- CLI ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Check yesterday's (or the given day's) reported hours.
    Daily,
    /// Monday-morning check against the prior work-week's last day.
    WeekStart,
    /// Check totals over the previous week.
    Weekly,
}

impl Mode {
    fn report_mode(self) -> ReportMode {
        match self {
            Mode::Daily => ReportMode::Daily,
            Mode::WeekStart => ReportMode::WeekStart,
            Mode::Weekly => ReportMode::Weekly,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "harvest-notifier",
    about = "Nudges employees who under-reported their Harvest time, via Slack"
)]
struct Cli {
    /// Which reporting window to check.
    #[arg(long, value_enum)]
    mode: Mode,

    /// Override the report date (daily / week-start modes), YYYY-MM-DD.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Override the start of the report range (weekly mode), YYYY-MM-DD.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Override the end of the report range (weekly mode), YYYY-MM-DD.
    #[arg(long)]
    to: Option<NaiveDate>,
}

// --- Configuration ---

#[derive(Debug, Clone)]
struct AppConfig {
    harvest: HarvestConfig,
    slack_token: String,
    slack_channel: String,
    harvest_url: String,
    report: ReportConfig,
}

fn load_app_config() -> Result<AppConfig, AppError> {
    Ok(AppConfig {
        harvest: HarvestConfig {
            token: require_env("HARVEST_TOKEN")?,
            account_id: require_env("HARVEST_ACCOUNT_ID")?,
            base_url: env::var("HARVEST_API_URL")
                .unwrap_or_else(|_| harvest::HARVEST_API_BASE_URL.to_string()),
        },
        slack_token: require_env("SLACK_TOKEN")?,
        slack_channel: env::var("SLACK_CHANNEL").unwrap_or_else(|_| "general".to_string()),
        harvest_url: env::var("HARVEST_URL")
            .unwrap_or_else(|_| "https://harvestapp.com/".to_string()),
        report: ReportConfig {
            emails_whitelist: ReportConfig::parse_whitelist(
                &env::var("EMAILS_WHITELIST").unwrap_or_default(),
            ),
            missing_hours_threshold: parse_env_f64("MISSING_HOURS_THRESHOLD", 1.0)?,
            missing_hours_daily_threshold: parse_env_f64("MISSING_HOURS_DAILY_THRESHOLD", 1.0)?,
        },
    })
}

fn require_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::MissingEnvVar(name.to_string()))
}

fn parse_env_f64(name: &str, default: f64) -> Result<f64, AppError> {
    match env::var(name) {
        Ok(value) => value.parse().map_err(|_| AppError::InvalidEnvVar {
            name: name.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

// --- Entry point ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Setting tracing subscriber failed")?;

    let cli = Cli::parse();
    let config = load_app_config().context("Loading configuration from environment failed")?;

    let period = match cli.mode {
        Mode::Daily => period::daily(cli.date),
        Mode::WeekStart => period::week_start(cli.date),
        Mode::Weekly => period::weekly(cli.from, cli.to),
    };
    info!(
        "Resolved reporting period: {} to {}",
        period.start(),
        period.end()
    );

    let harvest_client = HarvestClient::new(config.harvest.clone());
    let slack_client = SlackClient::new(config.slack_token.clone());

    let (harvest_users, report_entries, slack_members) =
        fetch_snapshots(&harvest_client, &slack_client, &period)
            .await
            .context("Fetching upstream snapshots failed")?;

    let report = Report::new(config.report.clone());
    let mode = cli.mode.report_mode();
    let notifiable = report.generate(&harvest_users, &slack_members, &report_entries, mode);

    if notifiable.is_empty() {
        info!("Everyone reported their time. Nothing to post.");
        return Ok(());
    }

    dispatch_report(&slack_client, &config, &notifiable, mode, &period)
        .await
        .context("Posting Slack notification failed")?;
    info!(
        "Notified {} users in #{}.",
        notifiable.len(),
        config.slack_channel
    );

    Ok(())
}

/// Fetches both external snapshots up front; the report pipeline itself is
/// pure and never performs I/O.
async fn fetch_snapshots(
    harvest_client: &HarvestClient,
    slack_client: &SlackClient,
    period: &ReportingPeriod,
) -> Result<(Vec<HarvestUser>, Vec<TimeReportEntry>, Vec<SlackMember>), AppError> {
    let users = harvest_client.users_list().await?;
    let entries = harvest_client
        .time_report_list(period.start(), period.end())
        .await?;
    let members = slack_client.users_list().await?;
    Ok((users, entries, members))
}

async fn dispatch_report(
    slack_client: &SlackClient,
    config: &AppConfig,
    users: &[EmployeeRecord],
    mode: ReportMode,
    period: &ReportingPeriod,
) -> Result<(), AppError> {
    let message = render_message(users, mode, period, &config.harvest_url);
    slack_client
        .post_message(&config.slack_channel, &message)
        .await?;
    Ok(())
}

/// Plain-text dispatch: one line per user, a Slack mention when the
/// directory match resolved, the full name otherwise. Richer message layouts
/// live outside this binary.
fn render_message(
    users: &[EmployeeRecord],
    mode: ReportMode,
    period: &ReportingPeriod,
    harvest_url: &str,
) -> String {
    let heading = match mode {
        ReportMode::Weekly => {
            format!("Missing hours for {} to {}:", period.start(), period.end())
        }
        _ => format!("Missing hours for {}:", period.start()),
    };

    let mut lines = vec![heading];
    for user in users {
        let mention = if user.slack_id.is_empty() {
            user.full_name.clone()
        } else {
            format!("<@{}>", user.slack_id)
        };
        let missing = match mode {
            ReportMode::Weekly => user.missing_hours,
            _ => user.missing_hours_daily,
        };
        lines.push(format!("- {}: {:.1}h missing", mention, missing));
    }
    lines.push(format!("Report your time: {}", harvest_url));
    lines.join("\n")
}
