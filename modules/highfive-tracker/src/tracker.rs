use std::fmt;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::{error, info};

use highfive_common::{Config, HighFive, SubjectTemplates};

use crate::extractor::extract_all;
use crate::fetcher::{fetch_all, ListingSource};
use crate::filter::InterestFilter;
use crate::metrics::{MetricsBackend, RunSummary};
use crate::notify::{HighFiveDigest, NotifyBackend};
use crate::people::{person_counts, EntityRecognizer};

/// Stats from a tracker run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub total_count: usize,
    pub interesting_count: usize,
    /// Distinct (community, person) pairs; zero unless person counts are on.
    pub people_counted: usize,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} interesting={} people_counted={}",
            self.total_count, self.interesting_count, self.people_counted
        )
    }
}

/// Settings the tracker needs from [`Config`].
#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub batch_size: u32,
    pub max_pages: u32,
    pub subjects: SubjectTemplates,
    pub metrics_namespace: String,
    pub environment: String,
}

impl TrackerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size,
            max_pages: config.max_pages,
            subjects: config
                .email
                .as_ref()
                .map(|e| e.subjects.clone())
                .unwrap_or_default(),
            metrics_namespace: config.metrics.namespace.clone(),
            environment: config.environment.clone(),
        }
    }
}

/// Fetch → extract → filter, then notify and report metrics.
pub struct Tracker {
    source: Box<dyn ListingSource>,
    filter: InterestFilter,
    notifier: Box<dyn NotifyBackend>,
    metrics: Box<dyn MetricsBackend>,
    recognizer: Option<Box<dyn EntityRecognizer>>,
    settings: TrackerSettings,
}

impl Tracker {
    pub fn new(
        source: Box<dyn ListingSource>,
        filter: InterestFilter,
        notifier: Box<dyn NotifyBackend>,
        metrics: Box<dyn MetricsBackend>,
        settings: TrackerSettings,
    ) -> Self {
        Self {
            source,
            filter,
            notifier,
            metrics,
            recognizer: None,
            settings,
        }
    }

    /// Also tally people mentioned per community.
    pub fn with_person_counts(mut self, recognizer: Box<dyn EntityRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub async fn run(&self) -> Result<RunStats> {
        self.run_on(Utc::now().date_naive()).await
    }

    /// Run with an explicit "today", used for the age metric.
    pub async fn run_on(&self, today: NaiveDate) -> Result<RunStats> {
        let records = fetch_all(
            self.source.as_ref(),
            self.settings.batch_size,
            self.settings.max_pages,
        )
        .await
        .context("Failed to fetch high fives")?;

        let high_fives = extract_all(&records);

        let interesting: Vec<HighFive> = high_fives
            .iter()
            .filter(|hf| self.filter.matches(hf))
            .cloned()
            .collect();

        info!("Found {} interesting high fives", interesting.len());
        for high_five in &interesting {
            info!(id = %high_five.id, "\n{high_five}");
        }

        let mut stats = RunStats {
            total_count: high_fives.len(),
            interesting_count: interesting.len(),
            people_counted: 0,
        };

        if let Some(recognizer) = &self.recognizer {
            let counts = person_counts(&high_fives, recognizer.as_ref());
            for (community, people) in counts.sorted() {
                let community = community.as_deref().unwrap_or("(none)");
                for (person, count) in people {
                    info!(community, person = %person, count, "Person high five count");
                }
            }
            stats.people_counted = counts.len();
        }

        if !interesting.is_empty() {
            let digest = HighFiveDigest::new(&interesting, &self.settings.subjects);
            if let Err(e) = self.notifier.send(&digest).await {
                error!(error = %e, count = digest.count, "Failed to send notification");
                return Err(e.context("Failed to send notification"));
            }
        }

        let summary = RunSummary::new(&high_fives, today);
        let data = summary.metrics(&self.settings.metrics_namespace, &self.settings.environment);
        if let Err(e) = self.metrics.put(&data).await {
            error!(error = %e, "Failed to emit metrics");
            return Err(e.context("Failed to emit metrics"));
        }

        info!("Tracker run complete. {stats}");
        Ok(stats)
    }
}
