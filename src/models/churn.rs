use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Distribution of bets-per-market counts inside one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountDistribution {
    pub median: f64,
    /// Sample standard deviation; `None` when only one market was bet on.
    pub std: Option<f64>,
    pub min: u32,
    pub max: u32,
}

/// Distribution of market ages (bet time minus contract creation), in whole days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeDistribution {
    pub median: i64,
    /// Sample standard deviation floored to days; `None` for a single bet.
    pub std: Option<i64>,
    pub min: i64,
    pub max: i64,
}

/// Activity and engagement features for one trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowFeatures {
    pub window_days: i64,
    pub num_bets: usize,
    pub betting_days: usize,
    pub num_markets: usize,
    pub bets_per_market: CountDistribution,
    pub market_age: AgeDistribution,
    pub num_contracts_created: usize,
    pub num_comments: usize,
    pub num_comment_likes: i64,
}

/// One row of churn features per user.
///
/// A window whose statistics are undefined for this user is left out
/// (`None`) instead of being filled with zeros.
///
/// Serialized as a flat row with one column per window feature
/// (`numBetsLast7Days`, `medianBetsPerMarket30Days`, ...). The columns of a
/// window that is `None` are written as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChurnFeatureRecord {
    pub user_id: String,
    pub anchor_time: i64,
    pub first_bet_time: i64,
    pub days_since_last_bet: i64,
    pub days_since_first_bet: i64,
    pub daily_streak: i64,
    pub last_7_days: Option<WindowFeatures>,
    pub last_30_days: Option<WindowFeatures>,
}

impl Serialize for ChurnFeatureRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut row = serializer.serialize_map(None)?;
        row.serialize_entry("userId", &self.user_id)?;
        row.serialize_entry("anchorTime", &self.anchor_time)?;
        row.serialize_entry("firstBetTime", &self.first_bet_time)?;
        row.serialize_entry("daysSinceLastBet", &self.days_since_last_bet)?;
        row.serialize_entry("daysSinceFirstBet", &self.days_since_first_bet)?;
        row.serialize_entry("dailyStreak", &self.daily_streak)?;

        for (days, window) in [(7, &self.last_7_days), (30, &self.last_30_days)] {
            let w = window.as_ref();
            let last = |name: &str| format!("{name}Last{days}Days");
            let per = |name: &str| format!("{name}{days}Days");

            row.serialize_entry(&last("numBets"), &w.map(|w| w.num_bets))?;
            row.serialize_entry(&last("bettingDays"), &w.map(|w| w.betting_days))?;
            row.serialize_entry(&per("numMarkets"), &w.map(|w| w.num_markets))?;

            row.serialize_entry(&per("medianBetsPerMarket"), &w.map(|w| w.bets_per_market.median))?;
            row.serialize_entry(&per("stdBetsPerMarket"), &w.and_then(|w| w.bets_per_market.std))?;
            row.serialize_entry(&per("minBetsPerMarket"), &w.map(|w| w.bets_per_market.min))?;
            row.serialize_entry(&per("maxBetsPerMarket"), &w.map(|w| w.bets_per_market.max))?;

            row.serialize_entry(&last("medianMarketAge"), &w.map(|w| w.market_age.median))?;
            row.serialize_entry(&last("stdMarketAge"), &w.and_then(|w| w.market_age.std))?;
            row.serialize_entry(&last("minMarketAge"), &w.map(|w| w.market_age.min))?;
            row.serialize_entry(&last("maxMarketAge"), &w.map(|w| w.market_age.max))?;

            row.serialize_entry(&last("numContractsCreated"), &w.map(|w| w.num_contracts_created))?;
            row.serialize_entry(&last("numComments"), &w.map(|w| w.num_comments))?;
            row.serialize_entry(&last("numCommentLikes"), &w.map(|w| w.num_comment_likes))?;
        }

        row.end()
    }
}
