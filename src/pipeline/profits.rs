use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};

use crate::analytics::compute_net_profit;
use crate::models::{Bet, Contract, ProfitRecord};
use crate::pipeline::{group_bet_indices, run_chunked};
use crate::store::Snapshot;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfitReport {
    /// (user, contract) groups evaluated.
    pub groups: usize,
    pub records: usize,
    /// Groups whose contract vanished from the index.
    pub missing_contract: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ProfitRun {
    pub records: Vec<ProfitRecord>,
    pub report: ProfitReport,
}

/// Assemble the profit row for one (user, contract) group.
/// `None` for an empty group.
pub fn build_profit_record(user_id: &str, contract: &Contract, bets: &[&Bet]) -> Option<ProfitRecord> {
    let last_bet_time = bets.iter().map(|b| b.created_time).max()?;

    Some(ProfitRecord {
        user_id: user_id.to_string(),
        contract_id: contract.id.clone(),
        profit: compute_net_profit(contract, bets.iter().copied()),
        group_slugs: contract.group_slugs.clone(),
        last_bet_time,
        resolve_time: contract.resolve_time(),
    })
}

fn evaluate_group(snapshot: &Snapshot, key: &(String, String), indices: &[usize]) -> Option<ProfitRecord> {
    let (user_id, contract_id) = key;
    let Some(contract) = snapshot.contracts.get(contract_id) else {
        tracing::debug!(user_id = %user_id, contract_id = %contract_id, "Contract missing, skipping group");
        return None;
    };
    let bets: Vec<&Bet> = indices.iter().map(|&i| &snapshot.bets[i]).collect();
    build_profit_record(user_id, contract, &bets)
}

fn finish(mut records: Vec<ProfitRecord>, groups: usize) -> ProfitRun {
    records.sort_by(|a, b| {
        a.user_id
            .cmp(&b.user_id)
            .then_with(|| a.contract_id.cmp(&b.contract_id))
    });

    let report = ProfitReport {
        groups,
        records: records.len(),
        missing_contract: groups - records.len(),
    };
    counter!("profit_records_total").increment(report.records as u64);

    ProfitRun { records, report }
}

fn group_keys(snapshot: &Snapshot) -> Vec<((String, String), Vec<usize>)> {
    group_bet_indices(&snapshot.bets, |b| (b.user_id.clone(), b.contract_id.clone()))
}

/// Compute profit rows on the current thread.
pub fn compute_profits(snapshot: &Snapshot) -> ProfitRun {
    let groups = group_keys(snapshot);
    let total = groups.len();
    let records = groups
        .iter()
        .filter_map(|(key, indices)| evaluate_group(snapshot, key, indices))
        .collect();
    finish(records, total)
}

/// Compute profit rows with (user, contract) groups spread across `workers`.
pub async fn run_profits(snapshot: Arc<Snapshot>, workers: usize) -> anyhow::Result<ProfitRun> {
    let start = Instant::now();
    let groups = group_keys(&snapshot);
    let total = groups.len();
    tracing::info!(groups = total, workers, "Calculating profits");

    let shared = Arc::clone(&snapshot);
    let results = run_chunked(groups, workers, move |(key, indices)| {
        evaluate_group(&shared, &key, &indices)
    })
    .await?;

    let run = finish(results.into_iter().flatten().collect(), total);

    let elapsed = start.elapsed().as_secs_f64();
    histogram!("job_duration_seconds", "job" => "profits").record(elapsed);
    tracing::info!(
        records = run.report.records,
        missing_contract = run.report.missing_contract,
        elapsed_secs = elapsed,
        "Profit calculation complete"
    );

    Ok(run)
}
