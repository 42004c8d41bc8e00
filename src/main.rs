use std::sync::Arc;

use anyhow::Context;

use betmetrics::analytics::tenure::reference_millis;
use betmetrics::analytics::CohortFilter;
use betmetrics::config::{AppConfig, LogFormat};
use betmetrics::pipeline::{run_churn, run_profits, ChurnConfig, ChurnRun, ProfitRun};
use betmetrics::store::{write_ndjson, EventStore, Snapshot};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);
    let metrics_handle = betmetrics::metrics::init_metrics();

    tracing::info!(
        job = ?config.job,
        reference_date = %config.reference_date,
        workers = config.workers,
        outcome_types = ?config.supported_outcome_types,
        "Starting metrics run"
    );

    // --- Load snapshot ---
    let load_config = config.clone();
    let store = tokio::task::spawn_blocking(move || EventStore::load(&load_config))
        .await
        .context("snapshot loader panicked")??;
    let snapshot = Arc::new(Snapshot::prepare(store, &config.supported_outcome_types));

    // --- Jobs ---
    let profits = async {
        if config.job.runs_profits() {
            run_profits(Arc::clone(&snapshot), config.workers).await.map(Some)
        } else {
            Ok(None)
        }
    };

    let churn_config = ChurnConfig {
        reference_ms: reference_millis(config.reference_date),
        cohort: config.cohort_filter.then(CohortFilter::default),
    };
    let churn = async {
        if config.job.runs_churn() {
            run_churn(Arc::clone(&snapshot), churn_config, config.workers)
                .await
                .map(Some)
        } else {
            Ok(None)
        }
    };

    let (profits, churn): (Option<ProfitRun>, Option<ChurnRun>) = tokio::try_join!(profits, churn)?;

    // --- Persist ---
    if let Some(run) = profits {
        let path = config.profits_output();
        let written = write_ndjson(&path, &run.records)?;
        tracing::info!(path = %path.display(), records = written, "Wrote profit records");
    }

    if let Some(run) = churn {
        let path = config.churn_output();
        let written = write_ndjson(&path, &run.records)?;
        tracing::info!(
            path = %path.display(),
            records = written,
            users = run.report.users,
            excluded_by_cohort = run.report.excluded_by_cohort,
            users_without_windows = run.report.users_without_windows,
            market_age_anomalies = run.report.market_age_anomalies,
            "Wrote churn records"
        );
    }

    let metrics_path = config.metrics_output();
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    std::fs::write(&metrics_path, metrics_handle.render())
        .with_context(|| format!("writing {}", metrics_path.display()))?;

    tracing::info!("Metrics run complete");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Text => registry.with(fmt::layer()).init(),
    }
}
