//! Scheduler integration tests against an in-memory fetcher.

mod common;

use chrono::NaiveDate;
use common::{strings, EventLog, MockFetcher, RecordingProgress};
use klinedl_core::{
    ArchiveLayout, CancelToken, DataCategory, DateRange, IntervalSet, NoopProgress,
    ScheduleOptions, Scheduler, TaskEnumerator, TaskError, TradingType, YearMonth,
};
use std::time::Duration;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn enumerator(checksum: bool) -> TaskEnumerator {
    let range = DateRange::new(d(2023, 1, 1), d(2023, 12, 31)).unwrap();
    TaskEnumerator::new(range, IntervalSet::daily(), checksum)
}

fn options(parallelism: usize) -> ScheduleOptions {
    ScheduleOptions {
        parallelism,
        ..ScheduleOptions::default()
    }
}

#[test]
fn monthly_run_is_sequential_in_enumeration_order() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let fetcher = MockFetcher::new();
    let scheduler = Scheduler::new(&fetcher, &layout, &NoopProgress, options(4));

    let e = enumerator(true);
    let symbols = strings(&["btcusdt", "ethusdt"]);
    let intervals = strings(&["1h"]);
    let months = YearMonth::grid(&[2023], &[1, 2]);

    let summary = scheduler.run_monthly(&e, &symbols, &intervals, &months);

    let expected: Vec<String> = e
        .monthly(&symbols, &intervals, &months)
        .map(|t| {
            format!(
                "data/spot/monthly/klines/{}/1h/{}",
                t.symbol.to_uppercase(),
                t.file_name()
            )
        })
        .collect();
    assert_eq!(fetcher.calls(), expected);
    assert_eq!(fetcher.peak(), 1);
    assert_eq!(summary.total, 8);
    assert_eq!(summary.downloaded, 8);
    assert!(summary.all_succeeded());
    assert!(dir
        .path()
        .join("data/spot/monthly/klines/BTCUSDT/1h/BTCUSDT-1h-2023-02.zip.CHECKSUM")
        .exists());
}

#[test]
fn daily_run_preserves_order_within_each_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::UsdMargined, DataCategory::Klines, dir.path());
    let fetcher = MockFetcher::with_delay(Duration::from_millis(2));
    let scheduler = Scheduler::new(&fetcher, &layout, &NoopProgress, options(3));

    let e = enumerator(true);
    let symbols = strings(&["AAAUSDT", "BBBUSDT", "CCCUSDT", "DDDUSDT"]);
    let intervals = strings(&["1m", "1h"]);
    let dates: Vec<NaiveDate> = (1..=5).map(|day| d(2023, 6, day)).collect();

    let summary = scheduler.run_daily(&e, &symbols, &intervals, &dates).unwrap();
    assert_eq!(summary.total, 4 * 2 * 5 * 2);
    assert_eq!(summary.downloaded, summary.total);

    let calls = fetcher.calls();
    for symbol in &symbols {
        let seen: Vec<&String> = calls.iter().filter(|c| c.contains(symbol.as_str())).collect();
        let expected: Vec<String> = e
            .daily_for_symbol(symbol, &intervals, &dates)
            .map(|t| {
                format!(
                    "data/futures/um/daily/klines/{symbol}/{}/{}",
                    t.interval,
                    t.file_name()
                )
            })
            .collect();
        assert_eq!(seen, expected.iter().collect::<Vec<_>>());
    }
}

#[test]
fn daily_parallelism_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let fetcher = MockFetcher::with_delay(Duration::from_millis(15));
    let scheduler = Scheduler::new(&fetcher, &layout, &NoopProgress, options(2));

    let e = enumerator(false);
    let symbols = strings(&["A", "B", "C", "D", "E", "F"]);
    let intervals = strings(&["1d"]);
    let dates = vec![d(2023, 2, 1), d(2023, 2, 2)];

    let summary = scheduler.run_daily(&e, &symbols, &intervals, &dates).unwrap();
    assert_eq!(summary.downloaded, 12);
    assert!(fetcher.peak() <= 2, "peak concurrency {}", fetcher.peak());
    assert!(fetcher.peak() >= 2, "symbols never overlapped");
}

#[test]
fn duplicate_symbols_are_fetched_once() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let fetcher = MockFetcher::with_delay(Duration::from_millis(50));
    let scheduler = Scheduler::new(&fetcher, &layout, &NoopProgress, options(2));

    let e = enumerator(false);
    let symbols = strings(&["btcusdt", "BTCUSDT", "BtcUsdt"]);
    let summary = scheduler
        .run_daily(&e, &symbols, &strings(&["1d"]), &[d(2023, 1, 5)])
        .unwrap();

    assert_eq!(
        fetcher.calls(),
        vec!["data/spot/daily/klines/BTCUSDT/1d/BTCUSDT-1d-2023-01-05.zip".to_string()]
    );
    assert_eq!(fetcher.peak(), 1);
    assert_eq!(summary.total, 1);
    assert_eq!(summary.downloaded, 1);

    let monthly = scheduler.run_monthly(
        &e,
        &symbols,
        &strings(&["1d"]),
        &YearMonth::grid(&[2023], &[2]),
    );
    assert_eq!(monthly.total, 1);
    assert_eq!(fetcher.calls().len(), 2);
}

#[test]
fn daily_progress_announces_each_date_before_its_fetches() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let log = EventLog::default();
    let fetcher = MockFetcher::with_log(log.clone());
    let progress = RecordingProgress { log: log.clone() };
    let scheduler = Scheduler::new(&fetcher, &layout, &progress, options(1));

    let e = enumerator(true);
    let intervals = strings(&["1m", "1h"]);
    let dates = vec![d(2023, 6, 1), d(2023, 6, 2)];
    scheduler
        .run_daily(&e, &strings(&["BTCUSDT"]), &intervals, &dates)
        .unwrap();

    let mut expected = vec!["symbol daily BTCUSDT 1/1".to_string()];
    for interval in &intervals {
        expected.push(format!("interval BTCUSDT {interval}"));
        for date in &dates {
            expected.push(format!("date BTCUSDT {interval} {date}"));
            let archive = format!("BTCUSDT-{interval}-{date}.zip");
            for file in [archive.clone(), format!("{archive}.CHECKSUM")] {
                expected.push(format!("start {file}"));
                expected.push(format!("fetch {file}"));
                expected.push(format!("done {file}"));
            }
        }
    }
    expected.push("batch daily 8".to_string());

    assert_eq!(*log.lock().unwrap(), expected);
}

#[test]
fn single_worker_daily_run_is_fully_sequential() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let fetcher = MockFetcher::with_delay(Duration::from_millis(1));
    let scheduler = Scheduler::new(&fetcher, &layout, &NoopProgress, options(1));

    let e = enumerator(false);
    let symbols = strings(&["XUSDT", "YUSDT"]);
    let intervals = strings(&["5m"]);
    let dates = vec![d(2023, 3, 1), d(2023, 3, 2)];

    scheduler.run_daily(&e, &symbols, &intervals, &dates).unwrap();
    let names: Vec<String> = fetcher
        .calls()
        .iter()
        .map(|c| c.rsplit('/').next().unwrap().to_string())
        .collect();
    let expected: Vec<String> = e
        .daily(&symbols, &intervals, &dates)
        .map(|t| t.file_name())
        .collect();
    assert_eq!(names, expected);
    assert_eq!(fetcher.peak(), 1);
}

#[test]
fn invalid_daily_intervals_schedule_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let fetcher = MockFetcher::new();
    let scheduler = Scheduler::new(&fetcher, &layout, &NoopProgress, options(2));

    let e = enumerator(true);
    let symbols = strings(&["BTCUSDT", "ETHUSDT"]);
    let summary = scheduler
        .run_daily(&e, &symbols, &strings(&["1M"]), &[d(2023, 1, 5)])
        .unwrap();
    assert_eq!(summary.total, 0);
    assert!(fetcher.calls().is_empty());
}

#[test]
fn failures_are_recorded_and_the_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let mut fetcher = MockFetcher::new();
    fetcher.failing.insert("BTCUSDT-1h-2023-01.zip".into());
    let scheduler = Scheduler::new(&fetcher, &layout, &NoopProgress, options(1));

    let e = enumerator(false);
    let months = YearMonth::grid(&[2023], &[1, 2, 3]);
    let summary = scheduler.run_monthly(&e, &strings(&["BTCUSDT"]), &strings(&["1h"]), &months);

    assert_eq!(summary.total, 3);
    assert_eq!(summary.downloaded, 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.failures[0].task.file_name(), "BTCUSDT-1h-2023-01.zip");
    assert!(matches!(summary.failures[0].error, TaskError::Fetch(_)));
}

#[test]
fn fail_fast_cancels_remaining_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let mut fetcher = MockFetcher::new();
    fetcher.failing.insert("BTCUSDT-1h-2023-02.zip".into());
    let opts = ScheduleOptions {
        fail_fast: true,
        ..ScheduleOptions::default()
    };
    let scheduler = Scheduler::new(&fetcher, &layout, &NoopProgress, opts);

    let e = enumerator(false);
    let months = YearMonth::grid(&[2023], &[1, 2, 3, 4]);
    let summary = scheduler.run_monthly(&e, &strings(&["BTCUSDT"]), &strings(&["1h"]), &months);

    assert_eq!(fetcher.calls().len(), 2);
    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.cancelled, 2);
    assert!(scheduler.cancel_token().is_cancelled());
}

#[test]
fn external_cancellation_stops_before_first_task() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let fetcher = MockFetcher::new();
    let token = CancelToken::new();
    token.cancel();
    let scheduler =
        Scheduler::new(&fetcher, &layout, &NoopProgress, options(2)).with_cancel_token(token);

    let e = enumerator(false);
    let summary = scheduler
        .run_daily(&e, &strings(&["A", "B"]), &strings(&["1m"]), &[d(2023, 1, 2)])
        .unwrap();
    assert!(fetcher.calls().is_empty());
    assert_eq!(summary.cancelled, 2);
}

#[test]
fn missing_checksum_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let mut fetcher = MockFetcher::new();
    fetcher.missing.insert("BTCUSDT-1h-2023-01.zip.CHECKSUM".into());
    let opts = ScheduleOptions {
        verify: true,
        ..ScheduleOptions::default()
    };
    let scheduler = Scheduler::new(&fetcher, &layout, &NoopProgress, opts);

    let e = enumerator(true);
    let months = YearMonth::grid(&[2023], &[1]);
    let summary = scheduler.run_monthly(&e, &strings(&["BTCUSDT"]), &strings(&["1h"]), &months);

    assert_eq!(summary.downloaded, 1);
    assert_eq!(summary.missing_checksums, 1);
    assert_eq!(summary.verified, 0);
    assert!(summary.all_succeeded());
}

#[test]
fn verify_flags_corrupt_archive() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let mut fetcher = MockFetcher::new();
    // sha256("hello world")
    let digest = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
    fetcher.bodies.insert("BTCUSDT-1h-2023-01.zip".into(), b"hello world".to_vec());
    fetcher.bodies.insert(
        "BTCUSDT-1h-2023-01.zip.CHECKSUM".into(),
        format!("{digest}  BTCUSDT-1h-2023-01.zip\n").into_bytes(),
    );
    fetcher.bodies.insert("BTCUSDT-1h-2023-02.zip".into(), b"corrupted".to_vec());
    fetcher.bodies.insert(
        "BTCUSDT-1h-2023-02.zip.CHECKSUM".into(),
        format!("{digest}  BTCUSDT-1h-2023-02.zip\n").into_bytes(),
    );
    let opts = ScheduleOptions {
        verify: true,
        ..ScheduleOptions::default()
    };
    let scheduler = Scheduler::new(&fetcher, &layout, &NoopProgress, opts);

    let e = enumerator(true);
    let months = YearMonth::grid(&[2023], &[1, 2]);
    let summary = scheduler.run_monthly(&e, &strings(&["BTCUSDT"]), &strings(&["1h"]), &months);

    assert_eq!(summary.verified, 1);
    assert_eq!(summary.failed(), 1);
    assert!(matches!(summary.failures[0].error, TaskError::Checksum(_)));
    assert!(summary.failures[0].task.is_checksum);
}

#[test]
fn second_run_over_complete_folder_transfers_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let fetcher = MockFetcher::new();
    let scheduler = Scheduler::new(&fetcher, &layout, &NoopProgress, options(2));

    let e = enumerator(true);
    let symbols = strings(&["BTCUSDT", "ETHUSDT"]);
    let intervals = strings(&["1m"]);
    let dates = vec![d(2023, 8, 1), d(2023, 8, 2)];

    let first = scheduler.run_daily(&e, &symbols, &intervals, &dates).unwrap();
    assert_eq!(first.downloaded, 8);
    let calls_after_first = fetcher.calls().len();

    let second = scheduler.run_daily(&e, &symbols, &intervals, &dates).unwrap();
    assert_eq!(second.downloaded, 0);
    assert_eq!(second.skipped, 8);
    assert_eq!(fetcher.calls().len(), calls_after_first);
}

#[test]
fn overwrite_refetches_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    let layout = ArchiveLayout::new(TradingType::Spot, DataCategory::Klines, dir.path());
    let fetcher = MockFetcher::new();
    let e = enumerator(false);
    let months = YearMonth::grid(&[2023], &[5]);
    let symbols = strings(&["BTCUSDT"]);
    let intervals = strings(&["1d"]);

    Scheduler::new(&fetcher, &layout, &NoopProgress, options(1))
        .run_monthly(&e, &symbols, &intervals, &months);
    let opts = ScheduleOptions {
        overwrite: true,
        ..ScheduleOptions::default()
    };
    let summary = Scheduler::new(&fetcher, &layout, &NoopProgress, opts)
        .run_monthly(&e, &symbols, &intervals, &months);

    assert_eq!(summary.downloaded, 1);
    assert_eq!(fetcher.calls().len(), 2);
}
