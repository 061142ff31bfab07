//! CLI command definitions.
//!
//! The CLI stands where the presentation layer of the original dashboard
//! would: each subcommand recomputes one derived view over the logged-in
//! user's accumulated table and prints it in the requested format.

use crate::format::OutputFormat;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Productivity metrics over accumulated task-record spreadsheets.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding per-user record files (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Username owning the record store
    #[arg(short, long)]
    pub user: String,

    /// Password for the login gate (required only when credentials are
    /// configured)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Output format for report tables
    #[arg(short, long, value_enum, default_value = "markdown")]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Shared report filters: inclusive date range over the completion date
/// plus an inclusive analyst set.
#[derive(Args, Debug, Default)]
pub struct ReportArgs {
    /// Inclusive start date (dd/mm/yyyy)
    #[arg(long, value_parser = parse_cli_date)]
    pub from: Option<NaiveDate>,

    /// Inclusive end date (dd/mm/yyyy)
    #[arg(long, value_parser = parse_cli_date)]
    pub to: Option<NaiveDate>,

    /// Restrict to these analysts (repeatable)
    #[arg(long = "analyst")]
    pub analysts: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Concatenate an uploaded spreadsheet onto the accumulated table
    Ingest {
        /// Spreadsheet file (CSV) to append
        file: PathBuf,
    },

    /// Headline totals and overall average operational time
    Summary(ReportArgs),

    /// Average operational time per day
    DailyTmo(ReportArgs),

    /// Average operational time per analyst
    AnalystTmo(ReportArgs),

    /// Finalized/cancelled counts per day
    Productivity(ReportArgs),

    /// Tally of finalization kinds
    Finalizations(ReportArgs),

    /// Volume and average time per work queue (finalized tasks)
    Queues(ReportArgs),

    /// Per-protocol folder/request detail (finalized tasks)
    Protocols(ReportArgs),

    /// Productivity ranking across analysts
    Ranking(ReportArgs),
}

/// Parse a CLI date in the same day/month/year convention the spreadsheets
/// use.
fn parse_cli_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%d/%m/%Y")
        .map_err(|_| format!("invalid date '{}', expected dd/mm/yyyy", s))
}
