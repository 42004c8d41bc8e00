use chrono::NaiveDate;

use crate::models::floor_days;

/// When a user started and last placed a bet, relative to the snapshot date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserTenure {
    pub first_bet_time: i64,
    pub last_bet_time: i64,
    pub days_since_first_bet: i64,
    pub days_since_last_bet: i64,
}

impl UserTenure {
    /// `None` when the user has no bets.
    pub fn from_timestamps(timestamps: &[i64], reference_ms: i64) -> Option<Self> {
        let first_bet_time = *timestamps.iter().min()?;
        let last_bet_time = *timestamps.iter().max()?;

        Some(Self {
            first_bet_time,
            last_bet_time,
            days_since_first_bet: floor_days(reference_ms - first_bet_time),
            days_since_last_bet: floor_days(reference_ms - last_bet_time),
        })
    }
}

/// Epoch millis of midnight UTC on `date`.
pub fn reference_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

/// User selection rule for churn analysis.
///
/// Keeps established users who are still active, plus users who went
/// quiet recently enough that their churn is still observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CohortFilter {
    /// Established users must have started more than this many days ago.
    pub min_tenure_days: i64,
    /// Users active within this many days count as retained.
    pub active_within_days: i64,
    /// Lapsed users are kept only if they went quiet fewer than this many days ago.
    pub lapsed_within_days: i64,
}

impl Default for CohortFilter {
    fn default() -> Self {
        Self {
            min_tenure_days: 30,
            active_within_days: 30,
            lapsed_within_days: 120,
        }
    }
}

impl CohortFilter {
    pub fn admits(&self, tenure: &UserTenure) -> bool {
        let retained = tenure.days_since_first_bet > self.min_tenure_days
            && tenure.days_since_last_bet < self.active_within_days;
        let lapsed = tenure.days_since_last_bet > self.active_within_days
            && tenure.days_since_last_bet < self.lapsed_within_days;
        retained || lapsed
    }
}
