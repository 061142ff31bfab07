//! opsboard: productivity reports over accumulated task-record spreadsheets.
//!
//! Each invocation is one request/response cycle: open a session for the
//! given user, load their accumulated table into memory, apply the
//! requested filters, recompute the derived view, print it.

use anyhow::Result;
use clap::Parser;
use opsboard::cli::{Cli, Command, ReportArgs};
use opsboard::config::Config;
use opsboard::format::{
    self, OutputFormat, Table, analyst_tmo_table, daily_tmo_table, finalization_table,
    productivity_table, protocol_table, queue_table, ranking_table, summary_table,
};
use opsboard::metrics::{self, DateRange};
use opsboard::schema::read_records;
use opsboard::session::Session;
use opsboard::store::RecordStore;
use opsboard::types::TaskRecord;
use std::fs::File;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(),
    };
    if let Some(dir) = &cli.data_dir {
        config.store.data_dir = dir.clone();
    }
    config.ensure_data_dir()?;

    let session = Session::login(&config, &cli.user, cli.password.as_deref())?;
    let store = RecordStore::new(session.store_path(&config));

    match &cli.command {
        Command::Ingest { file } => {
            let uploaded = read_records(File::open(file)?)?;
            let added = uploaded.len();
            let total = store.append(uploaded)?;
            info!(file = %file.display(), added, total, "spreadsheet ingested");
            println!("Ingested {} rows ({} total)", added, total);
        }
        Command::Summary(args) => {
            let records = load_filtered(&store, args)?;
            print_table(&summary_table(&metrics::overall_summary(&records)), cli.format);
        }
        Command::DailyTmo(args) => {
            let records = load_filtered(&store, args)?;
            print_table(&daily_tmo_table(&metrics::daily_tmo(&records)), cli.format);
        }
        Command::AnalystTmo(args) => {
            let records = load_filtered(&store, args)?;
            print_table(
                &analyst_tmo_table(&metrics::tmo_by_analyst(&records)),
                cli.format,
            );
        }
        Command::Productivity(args) => {
            let records = load_filtered(&store, args)?;
            print_table(
                &productivity_table(&metrics::daily_productivity(&records)),
                cli.format,
            );
        }
        Command::Finalizations(args) => {
            let records = load_filtered(&store, args)?;
            print_table(
                &finalization_table(&metrics::finalization_breakdown(&records)),
                cli.format,
            );
        }
        Command::Queues(args) => {
            let records = load_filtered(&store, args)?;
            print_table(&queue_table(&metrics::queue_breakdown(&records)), cli.format);
        }
        Command::Protocols(args) => {
            let records = load_filtered(&store, args)?;
            print_table(
                &protocol_table(&metrics::protocol_breakdown(&records)),
                cli.format,
            );
        }
        Command::Ranking(args) => {
            let records = load_filtered(&store, args)?;
            let entries = metrics::ranking(&records);
            if matches!(cli.format, OutputFormat::Markdown) {
                let team = metrics::team_average(&records);
                println!("Team TMO: {}\n", format::format_duration(Some(team)));
            }
            print_table(&ranking_table(&entries), cli.format);
        }
    }

    Ok(())
}

/// Load the session's table and apply the shared report filters.
///
/// An inverted date range keeps the unfiltered table and surfaces a
/// warning, matching the contract of the replaced dashboard.
fn load_filtered(store: &RecordStore, args: &ReportArgs) -> Result<Vec<TaskRecord>> {
    let mut records = store.load()?;

    if let (Some(start), Some(end)) = (args.from, args.to) {
        let (filtered, warning) =
            metrics::filter_date_range(&records, &DateRange::new(start, end));
        if let Some(message) = warning {
            warn!("{}", message);
            eprintln!("warning: {}", message);
        }
        records = filtered;
    } else if args.from.is_some() || args.to.is_some() {
        // Open-ended range: fill the missing bound from the data.
        let dates: Vec<_> = records.iter().filter_map(|r| r.completion_date()).collect();
        if let (Some(&min), Some(&max)) = (dates.iter().min(), dates.iter().max()) {
            let range = DateRange::new(args.from.unwrap_or(min), args.to.unwrap_or(max));
            let (filtered, warning) = metrics::filter_date_range(&records, &range);
            if let Some(message) = warning {
                warn!("{}", message);
                eprintln!("warning: {}", message);
            }
            records = filtered;
        }
    }

    if !args.analysts.is_empty() {
        records = metrics::filter_analysts(&records, &args.analysts);
    }
    Ok(records)
}

fn print_table(table: &Table, format: OutputFormat) {
    print!("{}", table.render(format));
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "opsboard=debug" } else { "opsboard=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
