//! Pure aggregation over in-memory task records.
//!
//! Every function here is deterministic, takes the record table by shared
//! reference, and never fails: empty input yields empty tables, and an empty
//! average is a zero duration rather than a division error.
//!
//! TMO (Tempo Médio Operacional) division semantics, reproduced exactly from
//! the system being replaced: the numerator sums only durations that parsed,
//! but the denominator counts every finalized/cancelled record in the group,
//! including those whose duration is missing. A group with unparseable
//! durations therefore understates its TMO. Whether that is intent or defect
//! is an open stakeholder question (see DESIGN.md); do not "fix" it here.

use crate::types::{FinalizationKind, TaskRecord, TaskStatus};
use chrono::{NaiveDate, TimeDelta};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// `chrono::TimeDelta` carries no serde impls; durations serialize as whole
/// seconds, which is also the unit chart axes want.
fn serialize_seconds<S: Serializer>(d: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(d.num_seconds())
}

/// Inclusive calendar-date range over the completion timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Filter records to an inclusive date range over the completion date.
///
/// Records whose completion timestamp failed to parse are excluded by any
/// range filter. An inverted range (start after end) is a caller mistake the
/// original surfaced as a banner while keeping the unfiltered view on
/// screen; this reproduces that contract by returning the input unchanged
/// along with a warning for the caller to display.
pub fn filter_date_range(
    records: &[TaskRecord],
    range: &DateRange,
) -> (Vec<TaskRecord>, Option<String>) {
    if range.start > range.end {
        let warning = format!(
            "start date {} is after end date {}; showing unfiltered results",
            range.start, range.end
        );
        return (records.to_vec(), Some(warning));
    }
    let filtered = records
        .iter()
        .filter(|r| r.completion_date().is_some_and(|d| range.contains(d)))
        .cloned()
        .collect();
    (filtered, None)
}

/// Filter records to an inclusive set of analyst names.
pub fn filter_analysts(records: &[TaskRecord], analysts: &[String]) -> Vec<TaskRecord> {
    records
        .iter()
        .filter(|r| analysts.iter().any(|a| a == &r.analyst))
        .cloned()
        .collect()
}

/// Average operational time for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTmo {
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_seconds")]
    pub tmo: TimeDelta,
}

/// Completed-task counts for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyProductivity {
    pub date: NaiveDate,
    pub finalized: u64,
    pub cancelled: u64,
}

impl DailyProductivity {
    pub fn total(&self) -> u64 {
        self.finalized + self.cancelled
    }
}

/// Headline numbers for a (possibly range-filtered) table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: u64,
    pub finalized: u64,
    pub cancelled: u64,
    /// Zero duration when no finalized/cancelled record is in scope.
    #[serde(serialize_with = "serialize_seconds")]
    pub average_time: TimeDelta,
}

/// Tally of finalization kinds. Unrecognized/empty kinds fall in no bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinalizationBreakdown {
    pub full_subsidy: u64,
    pub partial_subsidy: u64,
    pub out_of_scope: u64,
}

/// Volume and average time for one work queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub queue: String,
    pub count: u64,
    #[serde(serialize_with = "serialize_seconds")]
    pub average_time: TimeDelta,
}

/// Fine-grained per-protocol view for one analyst's finalized work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolStats {
    pub protocol_id: String,
    pub queue: String,
    pub folder_count: u32,
    pub has_request_number: bool,
    pub has_external_id: bool,
    #[serde(serialize_with = "serialize_seconds")]
    pub average_time: TimeDelta,
}

/// One row of the productivity ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    pub analyst: String,
    pub finalized: u64,
    pub cancelled: u64,
    pub total: u64,
}

/// Sum of parsed durations plus the full record count, the two halves of
/// the TMO division.
#[derive(Default, Clone, Copy)]
struct TmoAccumulator {
    valid_sum_ms: i64,
    count: u64,
}

impl TmoAccumulator {
    fn push(&mut self, duration: Option<TimeDelta>) {
        if let Some(d) = duration {
            self.valid_sum_ms += d.num_milliseconds();
        }
        self.count += 1;
    }

    /// `sum(valid) / count(all)`; zero when the group is empty.
    fn average(&self) -> TimeDelta {
        if self.count == 0 {
            return TimeDelta::zero();
        }
        TimeDelta::milliseconds(self.valid_sum_ms / self.count as i64)
    }
}

/// Average operational time per day over finalized and cancelled tasks,
/// sorted by date ascending. Records without a parseable completion date
/// cannot be grouped and are skipped.
pub fn daily_tmo(records: &[TaskRecord]) -> Vec<DailyTmo> {
    let mut groups: BTreeMap<NaiveDate, TmoAccumulator> = BTreeMap::new();
    for record in records.iter().filter(|r| r.status.is_completed()) {
        if let Some(date) = record.completion_date() {
            groups.entry(date).or_default().push(record.operational_time);
        }
    }
    groups
        .into_iter()
        .map(|(date, acc)| DailyTmo {
            date,
            tmo: acc.average(),
        })
        .collect()
}

/// Average operational time per analyst, same division semantics as
/// [`daily_tmo`]. Returned as a sorted map for deterministic iteration.
pub fn tmo_by_analyst(records: &[TaskRecord]) -> BTreeMap<String, TimeDelta> {
    let mut groups: BTreeMap<String, TmoAccumulator> = BTreeMap::new();
    for record in records.iter().filter(|r| r.status.is_completed()) {
        groups
            .entry(record.analyst.clone())
            .or_default()
            .push(record.operational_time);
    }
    groups
        .into_iter()
        .map(|(analyst, acc)| (analyst, acc.average()))
        .collect()
}

/// Finalized/cancelled counts per completion date, independent of whether
/// the duration on each record parsed. Sorted by date ascending.
pub fn daily_productivity(records: &[TaskRecord]) -> Vec<DailyProductivity> {
    let mut groups: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for record in records {
        let Some(date) = record.completion_date() else {
            continue;
        };
        let entry = groups.entry(date).or_default();
        match record.status {
            TaskStatus::Finalized => entry.0 += 1,
            TaskStatus::Cancelled => entry.1 += 1,
            _ => {}
        }
    }
    groups
        .into_iter()
        .filter(|(_, (f, c))| f + c > 0)
        .map(|(date, (finalized, cancelled))| DailyProductivity {
            date,
            finalized,
            cancelled,
        })
        .collect()
}

/// Headline totals and the overall average operational time.
///
/// The average divides the duration sum over finalized plus cancelled
/// records by their combined count, with an explicit zero-duration guard
/// for an empty denominator.
pub fn overall_summary(records: &[TaskRecord]) -> Summary {
    let mut acc = TmoAccumulator::default();
    let mut finalized = 0;
    let mut cancelled = 0;
    for record in records {
        match record.status {
            TaskStatus::Finalized => finalized += 1,
            TaskStatus::Cancelled => cancelled += 1,
            _ => continue,
        }
        acc.push(record.operational_time);
    }
    Summary {
        total: finalized + cancelled,
        finalized,
        cancelled,
        average_time: acc.average(),
    }
}

/// Tally records into the three named finalization buckets.
pub fn finalization_breakdown(records: &[TaskRecord]) -> FinalizationBreakdown {
    let mut breakdown = FinalizationBreakdown::default();
    for record in records {
        match record.finalization {
            FinalizationKind::FullSubsidy => breakdown.full_subsidy += 1,
            FinalizationKind::PartialSubsidy => breakdown.partial_subsidy += 1,
            FinalizationKind::OutOfScope => breakdown.out_of_scope += 1,
            FinalizationKind::Other(_) => {}
        }
    }
    breakdown
}

/// Volume and average time per queue over finalized tasks.
///
/// Unlike the TMO operations, the queue average is a true mean: it divides
/// by the number of durations that parsed, matching the per-queue table in
/// the replaced system. Records without a queue value (older exports never
/// had the column) contribute nothing; with no queues at all the result is
/// simply empty.
pub fn queue_breakdown(records: &[TaskRecord]) -> Vec<QueueStats> {
    let mut groups: BTreeMap<String, (u64, i64, u64)> = BTreeMap::new();
    for record in records.iter().filter(|r| r.status == TaskStatus::Finalized) {
        let Some(queue) = record.queue.as_deref() else {
            continue;
        };
        let entry = groups.entry(queue.to_string()).or_default();
        entry.0 += 1;
        if let Some(d) = record.operational_time {
            entry.1 += d.num_milliseconds();
            entry.2 += 1;
        }
    }
    groups
        .into_iter()
        .map(|(queue, (count, sum_ms, valid))| QueueStats {
            queue,
            count,
            average_time: mean_ms(sum_ms, valid),
        })
        .collect()
}

/// Per-(protocol, queue) detail over finalized tasks: folder counts, marker
/// columns from the first row seen, and a true-mean analysis time.
pub fn protocol_breakdown(records: &[TaskRecord]) -> Vec<ProtocolStats> {
    #[derive(Default)]
    struct Group {
        folder_count: u32,
        has_request_number: bool,
        has_external_id: bool,
        seeded: bool,
        sum_ms: i64,
        valid: u64,
    }

    let mut groups: BTreeMap<(String, String), Group> = BTreeMap::new();
    for record in records.iter().filter(|r| r.status == TaskStatus::Finalized) {
        let Some(queue) = record.queue.as_deref() else {
            continue;
        };
        let group = groups
            .entry((record.protocol_id.clone(), queue.to_string()))
            .or_default();
        if !group.seeded {
            group.folder_count = record.folder_count;
            group.has_request_number = record.has_request_number;
            group.has_external_id = record.has_external_id;
            group.seeded = true;
        }
        if let Some(d) = record.operational_time {
            group.sum_ms += d.num_milliseconds();
            group.valid += 1;
        }
    }
    groups
        .into_iter()
        .map(|((protocol_id, queue), group)| ProtocolStats {
            protocol_id,
            queue,
            folder_count: group.folder_count,
            has_request_number: group.has_request_number,
            has_external_id: group.has_external_id,
            average_time: mean_ms(group.sum_ms, group.valid),
        })
        .collect()
}

/// Productivity ranking across analysts, most completed tasks first.
/// Ties break on analyst name so the ordering is stable across runs.
pub fn ranking(records: &[TaskRecord]) -> Vec<RankingEntry> {
    let mut groups: BTreeMap<String, (u64, u64)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(record.analyst.clone()).or_default();
        match record.status {
            TaskStatus::Finalized => entry.0 += 1,
            TaskStatus::Cancelled => entry.1 += 1,
            _ => {}
        }
    }
    let mut entries: Vec<RankingEntry> = groups
        .into_iter()
        .map(|(analyst, (finalized, cancelled))| RankingEntry {
            analyst,
            finalized,
            cancelled,
            total: finalized + cancelled,
        })
        .collect();
    entries.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.analyst.cmp(&b.analyst)));
    entries
}

/// Team-wide average over finalized tasks only, as a true mean of the
/// durations that parsed. This is the comparison value individual analysts
/// are measured against.
pub fn team_average(records: &[TaskRecord]) -> TimeDelta {
    let mut sum_ms = 0;
    let mut valid = 0;
    for record in records.iter().filter(|r| r.status == TaskStatus::Finalized) {
        if let Some(d) = record.operational_time {
            sum_ms += d.num_milliseconds();
            valid += 1;
        }
    }
    mean_ms(sum_ms, valid)
}

fn mean_ms(sum_ms: i64, count: u64) -> TimeDelta {
    if count == 0 {
        return TimeDelta::zero();
    }
    TimeDelta::milliseconds(sum_ms / count as i64)
}
