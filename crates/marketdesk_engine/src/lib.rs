pub mod indicators;
pub mod levels;
pub mod series;
pub mod session;
pub mod snapshot;
pub mod time;

pub use levels::{classify, classify_all, Classification};
pub use series::{build_chart_series, build_series};
pub use session::{MarketSession, VisibleRangePolicy};
pub use snapshot::{extract_ltp, latest_ltp, SnapshotFields};
pub use time::{parse_market_time, MarketClock, TimeError};
