use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Time from `now` to the next Unix time that is a multiple of `period` seconds.
/// For periods dividing 60 these are the same offsets within every minute.
pub fn first_delay(now: DateTime<Utc>, period: u64) -> Duration {
    let period = period.max(1);
    let into = now.timestamp().rem_euclid(i64::try_from(period).unwrap_or(i64::MAX));
    let seconds = u64::try_from(into).unwrap_or_default();
    let millis = u64::from(now.timestamp_subsec_millis().min(999));

    Duration::from_millis((period - seconds) * 1000 - millis)
}

/// Calls `refresh` now, then on every `period`-second boundary until the future is dropped.
pub async fn run<F: FnMut()>(period: u64, mut refresh: F) {
    refresh();

    let delay = first_delay(Utc::now(), period);
    tracing::debug!(?delay, period, "scheduler aligned");

    let mut ticks = interval_at(Instant::now() + delay, Duration::from_secs(period.max(1)));
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticks.tick().await;
        refresh();
    }
}
