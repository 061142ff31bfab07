//! Core types for the productivity metrics aggregator.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Completion status of a task.
///
/// Only `Finalized` and `Cancelled` count toward TMO and productivity
/// metrics. The source spreadsheets carry several spellings for the same
/// status ("Cancelado"/"Cancelada", "Finalizada"/"Finalizado"); those are
/// normalized into this enum at ingestion, see [`crate::schema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Finalized,
    Cancelled,
    InProgress,
    /// Any status text not recognized as one of the above, kept verbatim.
    Other(String),
}

impl TaskStatus {
    /// True for statuses counted toward completed-task metrics.
    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Finalized | TaskStatus::Cancelled)
    }

    /// Canonical display text, matching the current spreadsheet dialect.
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Finalized => "Finalizada",
            TaskStatus::Cancelled => "Cancelada",
            TaskStatus::InProgress => "Em Andamento",
            TaskStatus::Other(s) => s,
        }
    }
}

/// Categorical outcome of a finalized task, used only for the
/// finalization-breakdown tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizationKind {
    FullSubsidy,
    PartialSubsidy,
    OutOfScope,
    /// Unrecognized or empty kind; excluded from all breakdown buckets.
    Other(String),
}

impl FinalizationKind {
    pub fn as_str(&self) -> &str {
        match self {
            FinalizationKind::FullSubsidy => "Subsídio Completo",
            FinalizationKind::PartialSubsidy => "Subsídio Parcial",
            FinalizationKind::OutOfScope => "Fora do Escopo",
            FinalizationKind::Other(s) => s,
        }
    }
}

/// One row of the accumulated task-record table.
///
/// Duration and timestamp fields are `Option`: a value that failed to parse
/// is missing, not zero, and is excluded from sums while still counting
/// toward group denominators where the aggregator says so.
///
/// Persistence goes through the CSV schema layer, not serde; `TimeDelta`
/// has no serde impls anyway.
#[derive(Debug, Clone)]
pub struct TaskRecord {
    pub protocol_id: String,
    pub analyst: String,
    pub status: TaskStatus,
    /// Elapsed work time for the task ("TEMPO MÉDIO OPERACIONAL").
    pub operational_time: Option<TimeDelta>,
    pub created_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub finalization: FinalizationKind,
    /// Work queue ("FILA"); absent in older exports.
    pub queue: Option<String>,
    /// Number of non-empty folder columns ("PASTA*") on the source row.
    pub folder_count: u32,
    /// Whether the row carried a request number ("NÚMERO REQUISIÇÃO").
    pub has_request_number: bool,
    /// Whether the row carried an external system id ("ID PROJURIS").
    pub has_external_id: bool,
}

impl TaskRecord {
    /// Calendar date of completion, when the timestamp parsed.
    pub fn completion_date(&self) -> Option<chrono::NaiveDate> {
        self.completed_at.map(|ts| ts.date())
    }
}
