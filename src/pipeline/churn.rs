use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};

use crate::analytics::{
    compute_window_metrics, find_market_age_anomalies, most_recent_streak_days, CohortFilter,
    MarketAgeAnomaly, UserTenure, WindowError,
};
use crate::models::{Bet, ChurnFeatureRecord, Comment, Contract};
use crate::pipeline::{group_bet_indices, run_chunked};
use crate::store::Snapshot;

/// Anomalies listed individually in the log before summarising.
const ANOMALY_LOG_SAMPLE: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct ChurnConfig {
    /// Epoch millis the tenure day counts are measured from.
    pub reference_ms: i64,
    /// `None` evaluates every user.
    pub cohort: Option<CohortFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChurnReport {
    pub users: usize,
    pub records: usize,
    pub excluded_by_cohort: usize,
    pub skipped_7_days: usize,
    pub skipped_30_days: usize,
    /// Users with no usable window at all; no row is emitted for them.
    pub users_without_windows: usize,
    /// Bets placed before their contract was created, among users that passed the cohort filter.
    pub market_age_anomalies: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ChurnRun {
    pub records: Vec<ChurnFeatureRecord>,
    pub report: ChurnReport,
}

/// Result of evaluating one user.
#[derive(Debug, Clone, Default)]
pub struct UserOutcome {
    pub record: Option<ChurnFeatureRecord>,
    pub excluded_by_cohort: bool,
    pub skipped: Vec<WindowError>,
    pub market_age_anomalies: Vec<MarketAgeAnomaly>,
}

/// Read-only per-run lookups shared by every user evaluation.
#[derive(Debug)]
pub struct ChurnContext {
    snapshot: Arc<Snapshot>,
    comments_by_user: HashMap<String, Vec<usize>>,
    contracts_by_creator: HashMap<String, Vec<String>>,
    config: ChurnConfig,
}

impl ChurnContext {
    pub fn new(snapshot: Arc<Snapshot>, config: ChurnConfig) -> Self {
        let mut comments_by_user: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, comment) in snapshot.comments.iter().enumerate() {
            comments_by_user
                .entry(comment.user_id.clone())
                .or_default()
                .push(idx);
        }

        let mut contracts_by_creator: HashMap<String, Vec<String>> = HashMap::new();
        for contract in snapshot.contracts.iter() {
            contracts_by_creator
                .entry(contract.creator_id.clone())
                .or_default()
                .push(contract.id.clone());
        }

        Self {
            snapshot,
            comments_by_user,
            contracts_by_creator,
            config,
        }
    }

    /// Evaluate one user from the indices of their bets in the snapshot.
    pub fn evaluate_user(&self, user_id: &str, bet_indices: &[usize]) -> UserOutcome {
        let snapshot = &self.snapshot;
        let bets: Vec<&Bet> = bet_indices.iter().map(|&i| &snapshot.bets[i]).collect();
        let timestamps: Vec<i64> = bets.iter().map(|b| b.created_time).collect();

        let Some(tenure) = UserTenure::from_timestamps(&timestamps, self.config.reference_ms) else {
            return UserOutcome::default();
        };

        if let Some(cohort) = &self.config.cohort {
            if !cohort.admits(&tenure) {
                return UserOutcome {
                    excluded_by_cohort: true,
                    ..UserOutcome::default()
                };
            }
        }

        let market_age_anomalies =
            find_market_age_anomalies(bets.iter().copied(), &snapshot.contracts);

        let comments: Vec<&Comment> = self
            .comments_by_user
            .get(user_id)
            .map(|idx| idx.iter().map(|&i| &snapshot.comments[i]).collect())
            .unwrap_or_default();
        let authored: Vec<&Contract> = self
            .contracts_by_creator
            .get(user_id)
            .map(|ids| ids.iter().filter_map(|id| snapshot.contracts.get(id)).collect())
            .unwrap_or_default();

        let anchor = tenure.last_bet_time;
        let windows = compute_window_metrics(&bets, &comments, &authored, &snapshot.contracts, anchor);

        let mut skipped = Vec::new();
        let mut keep = |result: Result<_, WindowError>| match result {
            Ok(features) => Some(features),
            Err(e) => {
                tracing::debug!(user_id = %user_id, reason = %e, "Window skipped");
                skipped.push(e);
                None
            }
        };
        let last_7_days = keep(windows.last_7_days);
        let last_30_days = keep(windows.last_30_days);

        if last_7_days.is_none() && last_30_days.is_none() {
            return UserOutcome {
                skipped,
                market_age_anomalies,
                ..UserOutcome::default()
            };
        }

        let record = ChurnFeatureRecord {
            user_id: user_id.to_string(),
            anchor_time: anchor,
            first_bet_time: tenure.first_bet_time,
            days_since_last_bet: tenure.days_since_last_bet,
            days_since_first_bet: tenure.days_since_first_bet,
            daily_streak: most_recent_streak_days(&timestamps),
            last_7_days,
            last_30_days,
        };

        UserOutcome {
            record: Some(record),
            excluded_by_cohort: false,
            skipped,
            market_age_anomalies,
        }
    }
}

fn log_market_age_anomalies(anomalies: &[MarketAgeAnomaly]) {
    if anomalies.is_empty() {
        return;
    }

    for anomaly in anomalies.iter().take(ANOMALY_LOG_SAMPLE) {
        tracing::warn!(
            user_id = %anomaly.user_id,
            contract_id = %anomaly.contract_id,
            bet_time = anomaly.bet_time,
            contract_created_time = anomaly.contract_created_time,
            "Bet placed before contract creation"
        );
    }
    tracing::warn!(
        count = anomalies.len(),
        "Bets with negative market age found; market-age statistics include them"
    );
}

fn summarize(outcomes: Vec<UserOutcome>) -> ChurnRun {
    let mut report = ChurnReport {
        users: outcomes.len(),
        ..ChurnReport::default()
    };
    let mut records = Vec::new();
    let mut anomalies = Vec::new();

    for outcome in outcomes {
        if outcome.excluded_by_cohort {
            report.excluded_by_cohort += 1;
        }
        for skip in &outcome.skipped {
            if skip.window_days() <= 7 {
                report.skipped_7_days += 1;
            } else {
                report.skipped_30_days += 1;
            }
        }
        anomalies.extend(outcome.market_age_anomalies);
        match outcome.record {
            Some(record) => records.push(record),
            None if !outcome.excluded_by_cohort => report.users_without_windows += 1,
            None => {}
        }
    }

    records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    report.records = records.len();

    anomalies.sort_by(|a, b| (&a.user_id, a.bet_time).cmp(&(&b.user_id, b.bet_time)));
    log_market_age_anomalies(&anomalies);
    report.market_age_anomalies = anomalies.len();

    counter!("churn_records_total").increment(report.records as u64);
    counter!("cohort_users_excluded_total").increment(report.excluded_by_cohort as u64);
    counter!("churn_windows_skipped_total", "window" => "7").increment(report.skipped_7_days as u64);
    counter!("churn_windows_skipped_total", "window" => "30").increment(report.skipped_30_days as u64);
    counter!("market_age_anomalies_total").increment(report.market_age_anomalies as u64);

    ChurnRun { records, report }
}

/// Compute churn features for every user, spreading users across `workers`.
pub async fn run_churn(
    snapshot: Arc<Snapshot>,
    config: ChurnConfig,
    workers: usize,
) -> anyhow::Result<ChurnRun> {
    let start = Instant::now();

    let groups = group_bet_indices(&snapshot.bets, |b| b.user_id.clone());
    tracing::info!(users = groups.len(), workers, "Calculating churn features");

    let context = Arc::new(ChurnContext::new(snapshot, config));
    let outcomes = run_chunked(groups, workers, move |(user_id, indices)| {
        context.evaluate_user(&user_id, &indices)
    })
    .await?;

    let run = summarize(outcomes);

    let elapsed = start.elapsed().as_secs_f64();
    histogram!("job_duration_seconds", "job" => "churn").record(elapsed);
    tracing::info!(
        users = run.report.users,
        records = run.report.records,
        excluded_by_cohort = run.report.excluded_by_cohort,
        skipped_7_days = run.report.skipped_7_days,
        skipped_30_days = run.report.skipped_30_days,
        elapsed_secs = elapsed,
        "Churn calculation complete"
    );

    Ok(run)
}
