use std::sync::Arc;

use betmetrics::models::{Bet, Comment, Contract, MS_PER_DAY};
use betmetrics::store::{EventStore, Snapshot};

/// 2024-07-06 00:00 UTC, the default snapshot date.
#[allow(dead_code)]
pub const REFERENCE_MS: i64 = 1_720_224_000_000;
#[allow(dead_code)]
pub const HOUR: i64 = 3_600_000;

/// Timestamp `days` days before the reference date.
#[allow(dead_code)]
pub fn days_ago(days: i64) -> i64 {
    REFERENCE_MS - days * MS_PER_DAY
}

#[allow(dead_code)]
pub fn make_contract(id: &str, creator: &str, outcome_type: &str, created_time: i64) -> Contract {
    Contract {
        id: id.into(),
        creator_id: creator.into(),
        outcome_type: outcome_type.into(),
        is_resolved: false,
        resolution: None,
        resolution_time: None,
        created_time,
        close_time: None,
        group_slugs: vec!["test-group".into()],
    }
}

#[allow(dead_code)]
pub fn resolved(mut contract: Contract, resolution: &str, resolution_time: i64) -> Contract {
    contract.is_resolved = true;
    contract.resolution = Some(resolution.into());
    contract.resolution_time = Some(resolution_time);
    contract
}

#[allow(dead_code)]
pub fn make_bet(user: &str, contract: &str, amount: i64, outcome: &str, shares: f64, created_time: i64) -> Bet {
    Bet {
        user_id: user.into(),
        contract_id: contract.into(),
        amount,
        outcome: outcome.into(),
        shares,
        created_time,
        is_redemption: false,
    }
}

#[allow(dead_code)]
pub fn redemption(user: &str, contract: &str, amount: i64, created_time: i64) -> Bet {
    Bet {
        is_redemption: true,
        ..make_bet(user, contract, amount, "NO", amount.abs() as f64, created_time)
    }
}

#[allow(dead_code)]
pub fn make_comment(id: &str, user: &str, contract: &str, likes: i64, created_time: i64) -> Comment {
    Comment {
        id: id.into(),
        user_id: user.into(),
        contract_id: contract.into(),
        likes,
        created_time,
    }
}

/// Prepare a binary-only snapshot from raw collections.
#[allow(dead_code)]
pub fn snapshot(bets: Vec<Bet>, contracts: Vec<Contract>, comments: Vec<Comment>) -> Arc<Snapshot> {
    let store = EventStore {
        bets,
        contracts,
        comments,
    };
    Arc::new(Snapshot::prepare(store, &["BINARY".to_string()]))
}

/// Unique scratch directory for file-based tests.
#[allow(dead_code)]
pub fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("betmetrics_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).expect("Failed to create scratch dir");
    dir
}
