use metrics::{counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and register the batch-run metrics.
/// The returned handle renders the text exposition snapshot written at
/// the end of a run.
pub fn init_metrics() -> PrometheusHandle {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    register_run_metrics();

    handle
}

/// Pre-register counters so they appear in the snapshot even when zero.
/// Histograms are only described: a recorded placeholder would count as a
/// real job run.
fn register_run_metrics() {
    counter!("bets_filtered_total").absolute(0);
    counter!("profit_records_total").absolute(0);
    counter!("churn_records_total").absolute(0);
    counter!("churn_windows_skipped_total", "window" => "7").absolute(0);
    counter!("churn_windows_skipped_total", "window" => "30").absolute(0);
    counter!("cohort_users_excluded_total").absolute(0);
    counter!("market_age_anomalies_total").absolute(0);

    describe_histogram!(
        "job_duration_seconds",
        Unit::Seconds,
        "Wall-clock duration of one batch job"
    );
}
