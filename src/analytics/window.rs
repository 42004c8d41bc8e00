use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::fmt;

use thiserror::Error;

use crate::analytics::stats::{median, sample_std};
use crate::models::{
    floor_days, utc_date, AgeDistribution, Bet, Comment, Contract, CountDistribution,
    WindowFeatures, MS_PER_DAY,
};
use crate::store::ContractIndex;

/// Trailing window sizes in days, smallest first.
pub const WINDOW_DAYS: [i64; 2] = [7, 30];

/// What a window was missing when its statistics could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingData {
    Bets,
    MarketAge,
}

impl fmt::Display for MissingData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingData::Bets => f.write_str("no bets"),
            MissingData::MarketAge => f.write_str("no market-age data"),
        }
    }
}

/// A window whose distribution statistics are undefined for this user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("insufficient data in the last {window_days} days: {missing}")]
    InsufficientData { window_days: i64, missing: MissingData },
}

impl WindowError {
    pub fn window_days(&self) -> i64 {
        match self {
            WindowError::InsufficientData { window_days, .. } => *window_days,
        }
    }
}

/// Per-window results for one user. Each window is either populated or
/// carries the reason it has insufficient data.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowMetrics {
    pub last_7_days: Result<WindowFeatures, WindowError>,
    pub last_30_days: Result<WindowFeatures, WindowError>,
}

/// Inclusive lower bound of a window ending at `anchor`.
pub fn window_start(anchor: i64, window_days: i64) -> i64 {
    anchor - window_days * MS_PER_DAY
}

/// Compute 7- and 30-day features for one user relative to `anchor`.
///
/// Bets are bucketed once: everything inside the widest window is sorted
/// newest first, so each narrower window is a prefix of that sequence.
pub fn compute_window_metrics(
    user_bets: &[&Bet],
    user_comments: &[&Comment],
    user_contracts: &[&Contract],
    contracts: &ContractIndex,
    anchor: i64,
) -> WindowMetrics {
    let widest = WINDOW_DAYS[WINDOW_DAYS.len() - 1];
    let earliest = window_start(anchor, widest);

    let mut recent: Vec<&Bet> = user_bets
        .iter()
        .copied()
        .filter(|b| b.created_time >= earliest && b.created_time <= anchor)
        .collect();
    recent.sort_by_key(|b| Reverse(b.created_time));

    let [last_7_days, last_30_days] = WINDOW_DAYS.map(|window_days| {
        let start = window_start(anchor, window_days);
        let len = recent.partition_point(|b| b.created_time >= start);
        window_features(
            &recent[..len],
            user_comments,
            user_contracts,
            contracts,
            anchor,
            window_days,
        )
    });

    WindowMetrics {
        last_7_days,
        last_30_days,
    }
}

/// Features for a single window given the bets already restricted to it.
pub fn window_features(
    window_bets: &[&Bet],
    user_comments: &[&Comment],
    user_contracts: &[&Contract],
    contracts: &ContractIndex,
    anchor: i64,
    window_days: i64,
) -> Result<WindowFeatures, WindowError> {
    let insufficient = |missing| WindowError::InsufficientData {
        window_days,
        missing,
    };
    if window_bets.is_empty() {
        return Err(insufficient(MissingData::Bets));
    }

    let start = window_start(anchor, window_days);
    let in_window = |t: i64| t >= start && t <= anchor;

    let betting_days = window_bets
        .iter()
        .filter_map(|b| utc_date(b.created_time))
        .collect::<HashSet<_>>()
        .len();

    let mut per_market: HashMap<&str, u32> = HashMap::new();
    for bet in window_bets {
        *per_market.entry(bet.contract_id.as_str()).or_default() += 1;
    }

    let bets_per_market = count_distribution(per_market.values().copied())
        .ok_or_else(|| insufficient(MissingData::Bets))?;
    let market_age = market_age_distribution(window_bets, contracts)
        .ok_or_else(|| insufficient(MissingData::MarketAge))?;

    let num_contracts_created = user_contracts
        .iter()
        .filter(|c| in_window(c.created_time))
        .count();

    let (num_comments, num_comment_likes) = user_comments
        .iter()
        .filter(|c| in_window(c.created_time))
        .fold((0usize, 0i64), |(n, likes), c| (n + 1, likes + c.likes));

    Ok(WindowFeatures {
        window_days,
        num_bets: window_bets.len(),
        betting_days,
        num_markets: per_market.len(),
        bets_per_market,
        market_age,
        num_contracts_created,
        num_comments,
        num_comment_likes,
    })
}

/// Median/std/min/max of per-market bet counts. `None` when there are no markets.
pub fn count_distribution(counts: impl IntoIterator<Item = u32>) -> Option<CountDistribution> {
    let counts: Vec<u32> = counts.into_iter().collect();
    let min = *counts.iter().min()?;
    let max = *counts.iter().max()?;

    let as_f64: Vec<f64> = counts.iter().map(|&c| f64::from(c)).collect();

    Some(CountDistribution {
        median: median(&as_f64)?,
        std: sample_std(&as_f64),
        min,
        max,
    })
}

/// Market age of every bet whose contract is known, floored to whole days.
/// `None` when no bet joins to a contract.
pub fn market_age_distribution(
    window_bets: &[&Bet],
    contracts: &ContractIndex,
) -> Option<AgeDistribution> {
    let ages: Vec<i64> = window_bets
        .iter()
        .filter_map(|b| {
            contracts
                .get(&b.contract_id)
                .map(|c| b.created_time - c.created_time)
        })
        .collect();

    let min = *ages.iter().min()?;
    let max = *ages.iter().max()?;

    let as_f64: Vec<f64> = ages.iter().map(|&a| a as f64).collect();
    let day = MS_PER_DAY as f64;

    Some(AgeDistribution {
        median: (median(&as_f64)? / day).floor() as i64,
        std: sample_std(&as_f64).map(|s| (s / day).floor() as i64),
        min: floor_days(min),
        max: floor_days(max),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
