pub mod consistency;
pub mod settlement;
pub mod stats;
pub mod streak;
pub mod tenure;
pub mod window;

pub use consistency::{find_market_age_anomalies, MarketAgeAnomaly};
pub use settlement::{compute_net_profit, settle, Settlement};
pub use streak::most_recent_streak_days;
pub use tenure::{CohortFilter, UserTenure};
pub use window::{compute_window_metrics, MissingData, WindowError, WindowMetrics, WINDOW_DAYS};
