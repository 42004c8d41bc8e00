pub mod ndjson;

pub use ndjson::{load_ndjson, write_ndjson};

use std::collections::HashMap;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{Bet, Comment, Contract};

/// The three raw collections of one snapshot.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    pub bets: Vec<Bet>,
    pub contracts: Vec<Contract>,
    pub comments: Vec<Comment>,
}

impl EventStore {
    pub fn load(config: &AppConfig) -> Result<Self, AppError> {
        tracing::info!(path = %config.contracts_path.display(), "Reading contracts");
        let contracts = load_ndjson(&config.contracts_path)?;
        tracing::info!(path = %config.bets_path.display(), "Reading bets");
        let bets = load_ndjson(&config.bets_path)?;
        tracing::info!(path = %config.comments_path.display(), "Reading comments");
        let comments = load_ndjson(&config.comments_path)?;

        let store = Self {
            bets,
            contracts,
            comments,
        };
        tracing::info!(
            bets = store.bets.len(),
            contracts = store.contracts.len(),
            comments = store.comments.len(),
            "Snapshot loaded"
        );
        Ok(store)
    }
}

/// Read-only id -> contract lookup, built once per run.
#[derive(Debug, Clone, Default)]
pub struct ContractIndex {
    by_id: HashMap<String, Contract>,
}

impl ContractIndex {
    pub fn new(contracts: impl IntoIterator<Item = Contract>) -> Self {
        let by_id = contracts
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Contract> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Contract> {
        self.by_id.values()
    }
}

/// Snapshot restricted to supported contracts and the bets placed on them.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub contracts: ContractIndex,
    pub bets: Vec<Bet>,
    pub comments: Vec<Comment>,
    /// Bets dropped because their contract is unknown or unsupported.
    pub bets_filtered: usize,
}

impl Snapshot {
    pub fn prepare(store: EventStore, supported_outcome_types: &[String]) -> Self {
        let contracts = ContractIndex::new(
            store
                .contracts
                .into_iter()
                .filter(|c| c.has_outcome_type(supported_outcome_types)),
        );

        let total_bets = store.bets.len();
        let bets: Vec<Bet> = store
            .bets
            .into_iter()
            .filter(|b| contracts.contains(&b.contract_id))
            .collect();
        let bets_filtered = total_bets - bets.len();

        if bets_filtered > 0 {
            tracing::info!(
                dropped = bets_filtered,
                kept = bets.len(),
                "Dropped bets on unknown or unsupported contracts"
            );
        }
        metrics::counter!("bets_filtered_total").increment(bets_filtered as u64);

        Self {
            contracts,
            bets,
            comments: store.comments,
            bets_filtered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(id: &str, outcome_type: &str) -> Contract {
        Contract {
            id: id.into(),
            creator_id: "creator".into(),
            outcome_type: outcome_type.into(),
            is_resolved: false,
            resolution: None,
            resolution_time: None,
            created_time: 0,
            close_time: None,
            group_slugs: Vec::new(),
        }
    }

    fn bet(contract_id: &str) -> Bet {
        Bet {
            user_id: "u1".into(),
            contract_id: contract_id.into(),
            amount: 10,
            outcome: "YES".into(),
            shares: 10.0,
            created_time: 1,
            is_redemption: false,
        }
    }

    #[test]
    fn test_prepare_drops_unsupported_and_unknown() {
        let store = EventStore {
            bets: vec![bet("binary"), bet("poll"), bet("missing"), bet("binary")],
            contracts: vec![contract("binary", "BINARY"), contract("poll", "POLL")],
            comments: Vec::new(),
        };

        let snapshot = Snapshot::prepare(store, &["BINARY".to_string()]);

        assert_eq!(snapshot.contracts.len(), 1);
        assert!(snapshot.contracts.contains("binary"));
        assert_eq!(snapshot.bets.len(), 2);
        assert_eq!(snapshot.bets_filtered, 2);
    }
}
