//! Integration tests for the metrics aggregator.
//!
//! These exercise the pure aggregation functions against hand-built record
//! tables, including the deliberate TMO division policy: duration sums skip
//! missing values while group denominators count every completed record.

use chrono::{NaiveDate, TimeDelta};
use opsboard::metrics::{self, DateRange};
use opsboard::types::{FinalizationKind, TaskRecord, TaskStatus};

/// Build a record completed at noon on `date` (dd/mm/yyyy).
fn record(
    analyst: &str,
    status: TaskStatus,
    duration_secs: Option<i64>,
    date: &str,
) -> TaskRecord {
    let completed_at = NaiveDate::parse_from_str(date, "%d/%m/%Y")
        .ok()
        .and_then(|d| d.and_hms_opt(12, 0, 0));
    TaskRecord {
        protocol_id: "P-1".to_string(),
        analyst: analyst.to_string(),
        status,
        operational_time: duration_secs.map(TimeDelta::seconds),
        created_at: completed_at,
        completed_at,
        finalization: FinalizationKind::Other(String::new()),
        queue: None,
        folder_count: 0,
        has_request_number: false,
        has_external_id: false,
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%d/%m/%Y").expect("test date should parse")
}

mod daily_tmo_tests {
    use super::*;

    #[test]
    fn divides_valid_duration_sum_by_full_group_count() {
        // One parsed 10-minute duration plus one missing duration in the
        // same group: the sum is 600s but the denominator is 2.
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(600), "05/03/2024"),
            record("ana", TaskStatus::Cancelled, None, "05/03/2024"),
        ];

        let tmo = metrics::daily_tmo(&records);

        assert_eq!(tmo.len(), 1);
        assert_eq!(tmo[0].tmo, TimeDelta::seconds(300));
    }

    #[test]
    fn recovers_exact_average_when_no_duration_is_missing() {
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(100), "05/03/2024"),
            record("ana", TaskStatus::Finalized, Some(200), "05/03/2024"),
        ];

        let tmo = metrics::daily_tmo(&records);

        // TMO * count == sum of durations when nothing is missing
        assert_eq!(tmo[0].tmo * 2, TimeDelta::seconds(300));
    }

    #[test]
    fn only_finalized_and_cancelled_records_participate() {
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(600), "05/03/2024"),
            record("ana", TaskStatus::InProgress, Some(9_999), "05/03/2024"),
            record(
                "ana",
                TaskStatus::Other("Pendente".to_string()),
                Some(9_999),
                "05/03/2024",
            ),
        ];

        let tmo = metrics::daily_tmo(&records);

        assert_eq!(tmo[0].tmo, TimeDelta::seconds(600));
    }

    #[test]
    fn output_is_sorted_by_date_ascending() {
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(60), "07/03/2024"),
            record("ana", TaskStatus::Finalized, Some(60), "05/03/2024"),
            record("ana", TaskStatus::Finalized, Some(60), "06/03/2024"),
        ];

        let dates: Vec<_> = metrics::daily_tmo(&records)
            .into_iter()
            .map(|d| d.date)
            .collect();

        assert_eq!(
            dates,
            vec![date("05/03/2024"), date("06/03/2024"), date("07/03/2024")]
        );
    }

    #[test]
    fn records_without_completion_date_are_skipped() {
        let mut no_date = record("ana", TaskStatus::Finalized, Some(600), "05/03/2024");
        no_date.completed_at = None;

        assert!(metrics::daily_tmo(&[no_date]).is_empty());
    }

    #[test]
    fn empty_input_yields_empty_table() {
        assert!(metrics::daily_tmo(&[]).is_empty());
    }
}

mod analyst_tmo_tests {
    use super::*;

    #[test]
    fn groups_by_analyst_with_same_division_policy() {
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(600), "05/03/2024"),
            record("ana", TaskStatus::Cancelled, None, "06/03/2024"),
            record("bruno", TaskStatus::Finalized, Some(120), "05/03/2024"),
        ];

        let tmo = metrics::tmo_by_analyst(&records);

        assert_eq!(tmo["ana"], TimeDelta::seconds(300));
        assert_eq!(tmo["bruno"], TimeDelta::seconds(120));
    }

    #[test]
    fn analysts_with_only_in_progress_work_do_not_appear() {
        let records = vec![record(
            "carla",
            TaskStatus::InProgress,
            Some(600),
            "05/03/2024",
        )];

        assert!(metrics::tmo_by_analyst(&records).is_empty());
    }
}

mod productivity_tests {
    use super::*;

    #[test]
    fn counts_equal_finalized_plus_cancelled_per_date() {
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(60), "05/03/2024"),
            record("ana", TaskStatus::Finalized, None, "05/03/2024"),
            record("bruno", TaskStatus::Cancelled, None, "05/03/2024"),
            record("ana", TaskStatus::InProgress, Some(60), "05/03/2024"),
            record("ana", TaskStatus::Finalized, Some(60), "06/03/2024"),
        ];

        let productivity = metrics::daily_productivity(&records);

        assert_eq!(productivity.len(), 2);
        assert_eq!(productivity[0].date, date("05/03/2024"));
        assert_eq!(productivity[0].finalized, 2);
        assert_eq!(productivity[0].cancelled, 1);
        assert_eq!(productivity[0].total(), 3);
        assert_eq!(productivity[1].total(), 1);
    }

    #[test]
    fn duration_validity_does_not_affect_counts() {
        let records = vec![
            record("ana", TaskStatus::Finalized, None, "05/03/2024"),
            record("ana", TaskStatus::Cancelled, None, "05/03/2024"),
        ];

        assert_eq!(metrics::daily_productivity(&records)[0].total(), 2);
    }
}

mod summary_tests {
    use super::*;

    #[test]
    fn zero_completed_records_yield_zero_average_not_a_failure() {
        let records = vec![record(
            "ana",
            TaskStatus::InProgress,
            Some(600),
            "05/03/2024",
        )];

        let summary = metrics::overall_summary(&records);

        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_time, TimeDelta::zero());
    }

    #[test]
    fn averages_over_finalized_and_cancelled_combined() {
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(100), "05/03/2024"),
            record("ana", TaskStatus::Cancelled, Some(300), "05/03/2024"),
            record("ana", TaskStatus::InProgress, Some(9_999), "05/03/2024"),
        ];

        let summary = metrics::overall_summary(&records);

        assert_eq!(summary.total, 2);
        assert_eq!(summary.finalized, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.average_time, TimeDelta::seconds(200));
    }

    #[test]
    fn missing_durations_count_toward_the_denominator() {
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(400), "05/03/2024"),
            record("ana", TaskStatus::Cancelled, None, "05/03/2024"),
        ];

        let summary = metrics::overall_summary(&records);

        assert_eq!(summary.average_time, TimeDelta::seconds(200));
    }
}

mod filter_tests {
    use super::*;

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(60), "04/03/2024"),
            record("ana", TaskStatus::Finalized, Some(60), "05/03/2024"),
            record("ana", TaskStatus::Finalized, Some(60), "07/03/2024"),
            record("ana", TaskStatus::Finalized, Some(60), "08/03/2024"),
        ];
        let range = DateRange::new(date("05/03/2024"), date("07/03/2024"));

        let (filtered, warning) = metrics::filter_date_range(&records, &range);

        assert!(warning.is_none());
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn inverted_range_warns_and_keeps_the_unfiltered_table() {
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(60), "05/03/2024"),
            record("ana", TaskStatus::Finalized, Some(60), "06/03/2024"),
        ];
        let range = DateRange::new(date("07/03/2024"), date("05/03/2024"));

        let (filtered, warning) = metrics::filter_date_range(&records, &range);

        assert!(warning.is_some());
        assert_eq!(filtered.len(), records.len());
    }

    #[test]
    fn records_with_missing_completion_date_are_excluded_by_range_filters() {
        let mut no_date = record("ana", TaskStatus::Finalized, Some(60), "05/03/2024");
        no_date.completed_at = None;
        let range = DateRange::new(date("01/01/2024"), date("31/12/2024"));

        let (filtered, _) = metrics::filter_date_range(&[no_date], &range);

        assert!(filtered.is_empty());
    }

    #[test]
    fn analyst_filter_is_an_inclusive_name_set() {
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(60), "05/03/2024"),
            record("bruno", TaskStatus::Finalized, Some(60), "05/03/2024"),
            record("carla", TaskStatus::Finalized, Some(60), "05/03/2024"),
        ];

        let filtered =
            metrics::filter_analysts(&records, &["ana".to_string(), "carla".to_string()]);

        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.analyst != "bruno"));
    }
}

mod breakdown_tests {
    use super::*;

    #[test]
    fn finalization_tally_excludes_unrecognized_kinds() {
        let mut records = vec![
            record("ana", TaskStatus::Finalized, Some(60), "05/03/2024"),
            record("ana", TaskStatus::Finalized, Some(60), "05/03/2024"),
            record("ana", TaskStatus::Finalized, Some(60), "05/03/2024"),
            record("ana", TaskStatus::Finalized, Some(60), "05/03/2024"),
        ];
        records[0].finalization = FinalizationKind::FullSubsidy;
        records[1].finalization = FinalizationKind::PartialSubsidy;
        records[2].finalization = FinalizationKind::OutOfScope;
        records[3].finalization = FinalizationKind::Other("Duplicado".to_string());

        let breakdown = metrics::finalization_breakdown(&records);

        assert_eq!(breakdown.full_subsidy, 1);
        assert_eq!(breakdown.partial_subsidy, 1);
        assert_eq!(breakdown.out_of_scope, 1);
    }

    #[test]
    fn queue_breakdown_uses_a_true_mean_over_valid_durations() {
        let mut records = vec![
            record("ana", TaskStatus::Finalized, Some(100), "05/03/2024"),
            record("ana", TaskStatus::Finalized, Some(300), "05/03/2024"),
            record("ana", TaskStatus::Finalized, None, "05/03/2024"),
        ];
        for r in &mut records {
            r.queue = Some("Cadastro".to_string());
        }

        let stats = metrics::queue_breakdown(&records);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 3);
        // Unlike TMO, the queue mean skips the missing duration entirely.
        assert_eq!(stats[0].average_time, TimeDelta::seconds(200));
    }

    #[test]
    fn queue_breakdown_is_empty_when_no_record_carries_a_queue() {
        let records = vec![record("ana", TaskStatus::Finalized, Some(60), "05/03/2024")];

        assert!(metrics::queue_breakdown(&records).is_empty());
    }

    #[test]
    fn queue_breakdown_only_counts_finalized_tasks() {
        let mut cancelled = record("ana", TaskStatus::Cancelled, Some(60), "05/03/2024");
        cancelled.queue = Some("Cadastro".to_string());

        assert!(metrics::queue_breakdown(&[cancelled]).is_empty());
    }

    #[test]
    fn protocol_breakdown_groups_by_protocol_and_queue() {
        let mut first = record("ana", TaskStatus::Finalized, Some(100), "05/03/2024");
        first.protocol_id = "P-10".to_string();
        first.queue = Some("Cadastro".to_string());
        first.folder_count = 3;
        first.has_request_number = true;
        let mut second = record("ana", TaskStatus::Finalized, Some(300), "06/03/2024");
        second.protocol_id = "P-10".to_string();
        second.queue = Some("Cadastro".to_string());

        let stats = metrics::protocol_breakdown(&[first, second]);

        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].protocol_id, "P-10");
        assert_eq!(stats[0].folder_count, 3);
        assert!(stats[0].has_request_number);
        assert!(!stats[0].has_external_id);
        assert_eq!(stats[0].average_time, TimeDelta::seconds(200));
    }
}

mod ranking_tests {
    use super::*;

    #[test]
    fn ranking_sorts_by_total_descending() {
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(60), "05/03/2024"),
            record("bruno", TaskStatus::Finalized, Some(60), "05/03/2024"),
            record("bruno", TaskStatus::Cancelled, None, "05/03/2024"),
        ];

        let ranking = metrics::ranking(&records);

        assert_eq!(ranking[0].analyst, "bruno");
        assert_eq!(ranking[0].total, 2);
        assert_eq!(ranking[1].analyst, "ana");
    }

    #[test]
    fn ranking_ties_break_on_analyst_name() {
        let records = vec![
            record("carla", TaskStatus::Finalized, Some(60), "05/03/2024"),
            record("ana", TaskStatus::Finalized, Some(60), "05/03/2024"),
        ];

        let ranking = metrics::ranking(&records);

        assert_eq!(ranking[0].analyst, "ana");
        assert_eq!(ranking[1].analyst, "carla");
    }

    #[test]
    fn team_average_covers_finalized_durations_only() {
        let records = vec![
            record("ana", TaskStatus::Finalized, Some(100), "05/03/2024"),
            record("ana", TaskStatus::Finalized, Some(300), "05/03/2024"),
            record("ana", TaskStatus::Finalized, None, "05/03/2024"),
            record("ana", TaskStatus::Cancelled, Some(9_999), "05/03/2024"),
        ];

        assert_eq!(metrics::team_average(&records), TimeDelta::seconds(200));
    }
}
