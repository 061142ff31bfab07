//! Versioned column mapping between spreadsheet headers and [`TaskRecord`].
//!
//! Exports arrive in two header dialects. The current one timestamps rows
//! with "DATA DE CONCLUSÃO DA TAREFA" and spells the cancelled status
//! "Cancelada"; the legacy one uses "DATA CRIAÇÃO DA TAREFA" and
//! "Cancelado". Both are mapped into one canonical record here so the
//! aggregator sees a single schema, and status spellings are normalized at
//! ingestion instead of being branched on downstream.
//!
//! A required column that is absent fails loudly with
//! [`Error::MissingColumn`]; a field value that fails to parse degrades to a
//! missing value on that row only.

use crate::error::{Error, Result};
use crate::parse::{TIMESTAMP_FORMAT, parse_duration, parse_timestamp};
use crate::types::{FinalizationKind, TaskRecord, TaskStatus};
use std::collections::HashMap;
use std::io::{Read, Write};
use tracing::debug;

/// Canonical (current-dialect) headers.
pub const COL_PROTOCOL: &str = "NÚMERO DO PROTOCOLO";
pub const COL_ANALYST: &str = "USUÁRIO QUE CONCLUIU A TAREFA";
pub const COL_STATUS: &str = "SITUAÇÃO DA TAREFA";
pub const COL_TIME: &str = "TEMPO MÉDIO OPERACIONAL";
pub const COL_COMPLETED: &str = "DATA DE CONCLUSÃO DA TAREFA";
pub const COL_CREATED: &str = "DATA CRIAÇÃO DA TAREFA";
pub const COL_FINALIZATION: &str = "FINALIZAÇÃO";
pub const COL_QUEUE: &str = "FILA";
pub const COL_REQUEST: &str = "NÚMERO REQUISIÇÃO";
pub const COL_EXTERNAL_ID: &str = "ID PROJURIS";
/// Canonical folder-count column written by the store.
pub const COL_FOLDERS: &str = "QTD PASTAS";
/// Prefix of the per-folder marker columns in raw exports (PASTA1, PASTA2, ...).
pub const FOLDER_PREFIX: &str = "PASTA";

/// Which header dialect a spreadsheet was detected as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderDialect {
    /// Current exports: completion timestamp present.
    Current,
    /// Older exports: only the creation timestamp is present.
    Legacy,
}

/// Resolved positions of the canonical fields within one spreadsheet.
#[derive(Debug)]
pub struct ColumnMap {
    dialect: HeaderDialect,
    protocol: usize,
    analyst: usize,
    status: usize,
    time: usize,
    completed: Option<usize>,
    created: Option<usize>,
    finalization: Option<usize>,
    queue: Option<usize>,
    request: Option<usize>,
    external_id: Option<usize>,
    folder_count: Option<usize>,
    folder_markers: Vec<usize>,
}

impl ColumnMap {
    /// Resolve canonical fields against a header row.
    ///
    /// Header matching is whitespace- and case-insensitive. The protocol,
    /// analyst, status and operational-time columns are required, as is at
    /// least one of the two timestamp columns; everything else is optional.
    pub fn from_headers<'a, I: IntoIterator<Item = &'a str>>(headers: I) -> Result<Self> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut folder_markers = Vec::new();
        for (idx, header) in headers.into_iter().enumerate() {
            let normalized = header.trim().to_uppercase();
            if normalized.starts_with(FOLDER_PREFIX) {
                folder_markers.push(idx);
            }
            positions.insert(normalized, idx);
        }

        let require = |name: &str| -> Result<usize> {
            positions
                .get(name)
                .copied()
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };
        let optional = |name: &str| positions.get(name).copied();

        let completed = optional(COL_COMPLETED);
        let created = optional(COL_CREATED);
        if completed.is_none() && created.is_none() {
            return Err(Error::MissingColumn(COL_COMPLETED.to_string()));
        }
        let dialect = if completed.is_some() {
            HeaderDialect::Current
        } else {
            HeaderDialect::Legacy
        };

        Ok(Self {
            dialect,
            protocol: require(COL_PROTOCOL)?,
            analyst: require(COL_ANALYST)?,
            status: require(COL_STATUS)?,
            time: require(COL_TIME)?,
            completed,
            created,
            finalization: optional(COL_FINALIZATION),
            queue: optional(COL_QUEUE),
            request: optional(COL_REQUEST),
            external_id: optional(COL_EXTERNAL_ID),
            folder_count: optional(COL_FOLDERS),
            folder_markers,
        })
    }

    pub fn dialect(&self) -> HeaderDialect {
        self.dialect
    }

    /// Map one data row into a record. Field-level parse failures become
    /// missing values; this never fails.
    pub fn map_row(&self, row: &csv::StringRecord) -> TaskRecord {
        let field = |idx: usize| row.get(idx).map(str::trim).unwrap_or("");
        let optional_field = |idx: Option<usize>| {
            idx.map(|i| field(i))
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        // Legacy exports only carry the creation timestamp; it doubles as
        // the completion date there, which is what the legacy reports
        // grouped on.
        let created_at = self.created.and_then(|idx| parse_timestamp(field(idx)));
        let completed_at = match self.completed {
            Some(idx) => parse_timestamp(field(idx)),
            None => created_at,
        };

        let folder_count = match self.folder_count {
            Some(idx) => field(idx).parse().unwrap_or(0),
            None => self
                .folder_markers
                .iter()
                .filter(|&&idx| !field(idx).is_empty())
                .count() as u32,
        };

        TaskRecord {
            protocol_id: field(self.protocol).to_string(),
            analyst: field(self.analyst).to_string(),
            status: normalize_status(field(self.status)),
            operational_time: parse_duration(field(self.time)),
            created_at,
            completed_at,
            finalization: normalize_finalization(
                optional_field(self.finalization).as_deref().unwrap_or(""),
            ),
            queue: optional_field(self.queue),
            folder_count,
            has_request_number: optional_field(self.request).is_some(),
            has_external_id: optional_field(self.external_id).is_some(),
        }
    }
}

/// Normalize a status cell into the canonical enum.
///
/// Both gender variants of the Portuguese participles are accepted; the two
/// source dialects disagree on them.
pub fn normalize_status(text: &str) -> TaskStatus {
    match text.trim().to_lowercase().as_str() {
        "finalizada" | "finalizado" => TaskStatus::Finalized,
        "cancelada" | "cancelado" => TaskStatus::Cancelled,
        "em andamento" | "andamento" => TaskStatus::InProgress,
        _ => TaskStatus::Other(text.trim().to_string()),
    }
}

/// Normalize a finalization cell. Unrecognized text lands in `Other` and is
/// excluded from the three breakdown buckets.
pub fn normalize_finalization(text: &str) -> FinalizationKind {
    match text.trim().to_lowercase().as_str() {
        "subsídio completo" | "subsidio completo" => FinalizationKind::FullSubsidy,
        "subsídio parcial" | "subsidio parcial" => FinalizationKind::PartialSubsidy,
        "fora do escopo" => FinalizationKind::OutOfScope,
        _ => FinalizationKind::Other(text.trim().to_string()),
    }
}

/// Read all records from a CSV spreadsheet.
///
/// The header row decides the dialect; each data row maps best-effort.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<TaskRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let map = ColumnMap::from_headers(headers.iter())?;
    debug!(dialect = ?map.dialect(), columns = headers.len(), "resolved spreadsheet headers");

    let mut records = Vec::new();
    for row in csv_reader.records() {
        records.push(map.map_row(&row?));
    }
    Ok(records)
}

/// Write records as a CSV spreadsheet in the current header dialect.
pub fn write_records<W: Write>(writer: W, records: &[TaskRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        COL_PROTOCOL,
        COL_ANALYST,
        COL_STATUS,
        COL_TIME,
        COL_CREATED,
        COL_COMPLETED,
        COL_FINALIZATION,
        COL_QUEUE,
        COL_FOLDERS,
        COL_REQUEST,
        COL_EXTERNAL_ID,
    ])?;

    for record in records {
        csv_writer.write_record([
            record.protocol_id.as_str(),
            record.analyst.as_str(),
            record.status.as_str(),
            &record
                .operational_time
                .map(format_duration_cell)
                .unwrap_or_default(),
            &record
                .created_at
                .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            &record
                .completed_at
                .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default(),
            record.finalization.as_str(),
            record.queue.as_deref().unwrap_or(""),
            &record.folder_count.to_string(),
            if record.has_request_number { "1" } else { "" },
            if record.has_external_id { "1" } else { "" },
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Serialize a duration back to clock text (`H:MM:SS`), the form the
/// duration parser reads back.
fn format_duration_cell(duration: chrono::TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    format!("{}:{:02}:{:02}", total / 3_600, (total % 3_600) / 60, total % 60)
}
