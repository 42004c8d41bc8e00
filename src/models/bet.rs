use serde::{Deserialize, Serialize};

/// One trade event from the bets dump.
///
/// `amount` is positive for purchases and negative for sale proceeds.
/// Redemptions carry a negative amount and `is_redemption = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub user_id: String,
    pub contract_id: String,
    pub amount: i64,
    pub outcome: String,
    pub shares: f64,
    pub created_time: i64,
    #[serde(default)]
    pub is_redemption: bool,
}
