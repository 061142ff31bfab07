//! Presentation formatting for durations and derived tables.
//!
//! Formatting is deliberately separate from the aggregator: the aggregator
//! returns structured durations and the text rendering here is swappable.

use crate::metrics::{
    DailyProductivity, DailyTmo, FinalizationBreakdown, ProtocolStats, QueueStats, RankingEntry,
    Summary,
};
use chrono::TimeDelta;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Output format for report tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

/// Render a duration as `"<minutes> min <seconds>s"`.
///
/// Conversion from total elapsed seconds is truncating, not rounding:
/// 125.9s renders as `2 min 5s`. A missing or zero duration renders as
/// `"0 min"`.
pub fn format_duration(duration: Option<TimeDelta>) -> String {
    let total_seconds = duration.map(|d| d.num_seconds()).unwrap_or(0);
    if total_seconds <= 0 {
        return "0 min".to_string();
    }
    format!("{} min {}s", total_seconds / 60, total_seconds % 60)
}

/// A rendered report: column names plus stringly-typed rows. Every derived
/// table converts into one of these before being printed.
#[derive(Debug, Clone)]
pub struct Table {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Markdown => self.render_markdown(),
            OutputFormat::Csv => self.render_csv(),
            OutputFormat::Json => self.render_json().to_string(),
        }
    }

    fn render_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str(&format!("| {} |\n", self.columns.join(" | ")));
        md.push_str(&format!(
            "|{}\n",
            self.columns.iter().map(|_| " --- |").collect::<String>()
        ));
        for row in &self.rows {
            md.push_str(&format!("| {} |\n", row.join(" | ")));
        }
        md
    }

    fn render_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str(&self.columns.join(","));
        csv.push('\n');
        for row in &self.rows {
            let values: Vec<String> = row.iter().map(|v| escape_csv(v)).collect();
            csv.push_str(&values.join(","));
            csv.push('\n');
        }
        csv
    }

    fn render_json(&self) -> Value {
        let rows: Vec<Value> = self
            .rows
            .iter()
            .map(|row| {
                let obj: serde_json::Map<String, Value> = self
                    .columns
                    .iter()
                    .zip(row.iter())
                    .map(|(col, val)| (col.to_string(), Value::String(val.clone())))
                    .collect();
                Value::Object(obj)
            })
            .collect();
        json!({
            "columns": self.columns,
            "rows": rows,
            "row_count": self.rows.len(),
        })
    }
}

/// Quote a CSV value when it contains a comma, quote, or newline.
fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn daily_tmo_table(rows: &[DailyTmo]) -> Table {
    Table {
        columns: vec!["date", "tmo"],
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.date.format("%d/%m/%Y").to_string(),
                    format_duration(Some(r.tmo)),
                ]
            })
            .collect(),
    }
}

pub fn analyst_tmo_table(rows: &BTreeMap<String, TimeDelta>) -> Table {
    Table {
        columns: vec!["analyst", "tmo"],
        rows: rows
            .iter()
            .map(|(analyst, tmo)| vec![analyst.clone(), format_duration(Some(*tmo))])
            .collect(),
    }
}

pub fn productivity_table(rows: &[DailyProductivity]) -> Table {
    Table {
        columns: vec!["date", "finalized", "cancelled", "total"],
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.date.format("%d/%m/%Y").to_string(),
                    r.finalized.to_string(),
                    r.cancelled.to_string(),
                    r.total().to_string(),
                ]
            })
            .collect(),
    }
}

pub fn summary_table(summary: &Summary) -> Table {
    Table {
        columns: vec!["total", "finalized", "cancelled", "average_time"],
        rows: vec![vec![
            summary.total.to_string(),
            summary.finalized.to_string(),
            summary.cancelled.to_string(),
            format_duration(Some(summary.average_time)),
        ]],
    }
}

pub fn finalization_table(breakdown: &FinalizationBreakdown) -> Table {
    Table {
        columns: vec!["full_subsidy", "partial_subsidy", "out_of_scope"],
        rows: vec![vec![
            breakdown.full_subsidy.to_string(),
            breakdown.partial_subsidy.to_string(),
            breakdown.out_of_scope.to_string(),
        ]],
    }
}

pub fn queue_table(rows: &[QueueStats]) -> Table {
    Table {
        columns: vec!["queue", "count", "average_time"],
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.queue.clone(),
                    r.count.to_string(),
                    format_duration(Some(r.average_time)),
                ]
            })
            .collect(),
    }
}

pub fn protocol_table(rows: &[ProtocolStats]) -> Table {
    Table {
        columns: vec![
            "protocol",
            "queue",
            "folders",
            "has_request",
            "has_external_id",
            "average_time",
        ],
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.protocol_id.clone(),
                    r.queue.clone(),
                    r.folder_count.to_string(),
                    r.has_request_number.to_string(),
                    r.has_external_id.to_string(),
                    format_duration(Some(r.average_time)),
                ]
            })
            .collect(),
    }
}

pub fn ranking_table(rows: &[RankingEntry]) -> Table {
    Table {
        columns: vec!["position", "analyst", "finalized", "cancelled", "total"],
        rows: rows
            .iter()
            .enumerate()
            .map(|(idx, r)| {
                vec![
                    (idx + 1).to_string(),
                    r.analyst.clone(),
                    r.finalized.to_string(),
                    r.cancelled.to_string(),
                    r.total.to_string(),
                ]
            })
            .collect(),
    }
}
