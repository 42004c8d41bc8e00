pub mod churn;
pub mod profits;

pub use churn::{run_churn, ChurnConfig, ChurnContext, ChurnReport, ChurnRun, UserOutcome};
pub use profits::{compute_profits, run_profits, ProfitReport, ProfitRun};

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::models::Bet;

/// Bet indices grouped by an arbitrary key. Group order is unspecified.
pub fn group_bet_indices<K, F>(bets: &[Bet], key: F) -> Vec<(K, Vec<usize>)>
where
    K: Eq + Hash,
    F: Fn(&Bet) -> K,
{
    let mut groups: HashMap<K, Vec<usize>> = HashMap::new();
    for (idx, bet) in bets.iter().enumerate() {
        groups.entry(key(bet)).or_default().push(idx);
    }
    groups.into_iter().collect()
}

/// Split independent groups into `workers` chunks and evaluate each chunk on
/// the blocking pool. Result order is unspecified.
pub async fn run_chunked<G, R, F>(groups: Vec<G>, workers: usize, work: F) -> anyhow::Result<Vec<R>>
where
    G: Send + 'static,
    R: Send + 'static,
    F: Fn(G) -> R + Send + Sync + 'static,
{
    if groups.is_empty() {
        return Ok(Vec::new());
    }

    let total = groups.len();
    let chunk_size = total.div_ceil(workers.max(1));
    let work = Arc::new(work);

    let mut tasks = JoinSet::new();
    let mut groups = groups.into_iter().peekable();
    while groups.peek().is_some() {
        let chunk: Vec<G> = groups.by_ref().take(chunk_size).collect();
        let work = Arc::clone(&work);
        tasks.spawn_blocking(move || chunk.into_iter().map(|g| (*work)(g)).collect::<Vec<R>>());
    }

    tracing::debug!(groups = total, chunks = tasks.len(), "Dispatched group chunks");

    let mut results = Vec::with_capacity(total);
    while let Some(chunk) = tasks.join_next().await {
        results.extend(chunk?);
    }
    Ok(results)
}
