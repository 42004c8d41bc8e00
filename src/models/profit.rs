use serde::{Deserialize, Serialize};

/// Realized profit of one user on one contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitRecord {
    pub user_id: String,
    pub contract_id: String,
    pub profit: f64,
    pub group_slugs: Vec<String>,
    pub last_bet_time: i64,
    pub resolve_time: Option<i64>,
}
