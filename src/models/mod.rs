pub mod bet;
pub mod churn;
pub mod comment;
pub mod contract;
pub mod profit;

pub use bet::Bet;
pub use churn::{AgeDistribution, ChurnFeatureRecord, CountDistribution, WindowFeatures};
pub use comment::Comment;
pub use contract::Contract;
pub use profit::ProfitRecord;

use chrono::{DateTime, NaiveDate, Utc};

/// Milliseconds in one day. All timestamps in the snapshot are epoch millis.
pub const MS_PER_DAY: i64 = 86_400_000;

/// UTC calendar date of an epoch-millisecond timestamp.
pub fn utc_date(millis: i64) -> Option<NaiveDate> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

/// Whole days in a millisecond span, floored toward negative infinity.
pub fn floor_days(millis: i64) -> i64 {
    millis.div_euclid(MS_PER_DAY)
}
