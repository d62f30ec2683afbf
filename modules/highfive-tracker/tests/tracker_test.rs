//! End-to-end runs against fixture pages with recording backends.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use highfive_client::{HighFiveError, ListingPage};
use highfive_common::SubjectTemplates;
use highfive_tracker::metrics::{MetricDatum, MetricUnit, MetricsBackend};
use highfive_tracker::notify::{HighFiveDigest, NotifyBackend};
use highfive_tracker::people::RuleBasedRecognizer;
use highfive_tracker::{InterestFilter, ListingSource, RunStats, Tracker, TrackerSettings};

/// Serves `fixtures/listing_pages.json` page by page, keyed on offset.
struct FixtureSource {
    pages: Vec<ListingPage>,
    batch_size: u32,
    requests: Arc<Mutex<Vec<u64>>>,
}

impl FixtureSource {
    fn new(batch_size: u32) -> Self {
        let pages: Vec<ListingPage> =
            serde_json::from_str(include_str!("fixtures/listing_pages.json"))
                .expect("fixture should decode");
        Self {
            pages,
            batch_size,
            requests: Arc::default(),
        }
    }
}

#[async_trait]
impl ListingSource for FixtureSource {
    async fn page(&self, count: u32, offset: u64) -> Result<ListingPage, HighFiveError> {
        assert_eq!(count, self.batch_size);
        self.requests.lock().unwrap().push(offset);
        let index = (offset / u64::from(self.batch_size)) as usize;
        self.pages.get(index).cloned().ok_or(HighFiveError::Api {
            status: 404,
            message: format!("no fixture page at offset {offset}"),
        })
    }
}

struct FailingSource;

#[async_trait]
impl ListingSource for FailingSource {
    async fn page(&self, _count: u32, _offset: u64) -> Result<ListingPage, HighFiveError> {
        Err(HighFiveError::Network("connection refused".into()))
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    sent: Arc<Mutex<Vec<HighFiveDigest>>>,
    fail: bool,
}

#[async_trait]
impl NotifyBackend for RecordingNotifier {
    async fn send(&self, digest: &HighFiveDigest) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("smtp unavailable");
        }
        self.sent.lock().unwrap().push(digest.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingMetrics {
    put: Arc<Mutex<Vec<MetricDatum>>>,
}

#[async_trait]
impl MetricsBackend for RecordingMetrics {
    async fn put(&self, data: &[MetricDatum]) -> anyhow::Result<()> {
        self.put.lock().unwrap().extend_from_slice(data);
        Ok(())
    }
}

fn settings() -> TrackerSettings {
    TrackerSettings {
        batch_size: 5,
        max_pages: 10,
        subjects: SubjectTemplates::default(),
        metrics_namespace: "HighFiveTracker".into(),
        environment: "test".into(),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 9, 25).unwrap()
}

fn tracker(
    source: impl ListingSource + 'static,
    names: &[&str],
    communities: &[&str],
    notifier: &RecordingNotifier,
    metrics: &RecordingMetrics,
) -> Tracker {
    Tracker::new(
        Box::new(source),
        InterestFilter::new(names, communities),
        Box::new(notifier.clone()),
        Box::new(metrics.clone()),
        settings(),
    )
}

#[tokio::test]
async fn run_notifies_matches_and_reports_metrics() {
    let source = FixtureSource::new(5);
    let requests = source.requests.clone();
    let notifier = RecordingNotifier::default();
    let metrics = RecordingMetrics::default();

    let stats = tracker(source, &["Katie"], &["Langley"], &notifier, &metrics)
        .run_on(today())
        .await
        .unwrap();

    // The middle page reports a lower count; paging carries on to offset 10.
    assert_eq!(*requests.lock().unwrap(), vec![0, 5, 10]);
    assert_eq!(
        stats,
        RunStats {
            total_count: 5,
            interesting_count: 2,
            people_counted: 0,
        }
    );

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Found 2 new high fives");
    assert_eq!(sent[0].count, 2);
    assert_eq!(
        sent[0].body,
        "Date: Sep 20, 2023\nFrom: Sam\nCommunity: Langley\n\
         Message: Huge thanks to Katie in the ER, she was wonderful.\n\n\
         Message: Thanks KATIE and the whole team."
    );

    let put = metrics.put.lock().unwrap();
    let summary: Vec<(&str, f64, MetricUnit)> = put
        .iter()
        .map(|d| (d.name.as_str(), d.value, d.unit))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("TotalHighFives", 5.0, MetricUnit::Count),
            ("MostRecentHighFiveAgeDays", 5.0, MetricUnit::Days),
        ]
    );
    assert!(put.iter().all(|d| d.namespace == "HighFiveTracker" && d.environment == "test"));
}

#[tokio::test]
async fn no_matches_means_no_notification() {
    let notifier = RecordingNotifier::default();
    let metrics = RecordingMetrics::default();

    let stats = tracker(FixtureSource::new(5), &["Nobody"], &["Langley"], &notifier, &metrics)
        .run_on(today())
        .await
        .unwrap();

    assert_eq!(stats.interesting_count, 0);
    assert_eq!(stats.total_count, 5);
    assert!(notifier.sent.lock().unwrap().is_empty());
    assert_eq!(metrics.put.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn community_scope_is_case_insensitive() {
    let notifier = RecordingNotifier::default();
    let metrics = RecordingMetrics::default();

    let stats = tracker(FixtureSource::new(5), &["katie"], &["SURREY"], &notifier, &metrics)
        .run_on(today())
        .await
        .unwrap();

    // Surrey post plus the unscoped one.
    assert_eq!(stats.interesting_count, 2);
    let sent = notifier.sent.lock().unwrap();
    assert!(sent[0].body.contains("Community: Surrey"));
    assert!(!sent[0].body.contains("Community: Langley"));
}

#[tokio::test]
async fn person_counts_are_tallied_when_enabled() {
    let notifier = RecordingNotifier::default();
    let metrics = RecordingMetrics::default();

    let stats = tracker(FixtureSource::new(5), &["Katie"], &["Langley"], &notifier, &metrics)
        .with_person_counts(Box::new(RuleBasedRecognizer::new()))
        .run_on(today())
        .await
        .unwrap();

    // (Langley, Katie), (Langley, Kim), (Surrey, Katie), (none, Patel)
    assert_eq!(stats.people_counted, 4);
    assert_eq!(stats.interesting_count, 2);
}

#[tokio::test]
async fn notify_failure_fails_the_run_before_metrics() {
    let notifier = RecordingNotifier {
        fail: true,
        ..Default::default()
    };
    let metrics = RecordingMetrics::default();

    let err = tracker(FixtureSource::new(5), &["Katie"], &["Langley"], &notifier, &metrics)
        .run_on(today())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("smtp unavailable"));
    assert!(metrics.put.lock().unwrap().is_empty());
}

#[tokio::test]
async fn fetch_failure_sends_nothing() {
    let notifier = RecordingNotifier::default();
    let metrics = RecordingMetrics::default();

    let err = tracker(FailingSource, &["Katie"], &["Langley"], &notifier, &metrics)
        .run_on(today())
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("Failed to fetch high fives"));
    assert!(notifier.sent.lock().unwrap().is_empty());
    assert!(metrics.put.lock().unwrap().is_empty());
}
