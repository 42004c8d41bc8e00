use crate::models::MS_PER_DAY;

/// Length in whole days of the streak that ends at the most recent bet.
///
/// Walks backwards from the latest timestamp, summing gaps while each gap
/// is at most 24 hours. The first longer gap ends the streak. A single
/// timestamp has no gap to sum and yields 0.
pub fn most_recent_streak_days(timestamps: &[i64]) -> i64 {
    let mut sorted = timestamps.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut streak_ms = 0i64;
    for pair in sorted.windows(2) {
        let gap = pair[0] - pair[1];
        if gap > MS_PER_DAY {
            break;
        }
        streak_ms += gap;
    }

    streak_ms / MS_PER_DAY
}
