use crate::time::parse_market_time;
use chrono::NaiveTime;
use marketdesk_shared_models::Sample;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Window the backend uses for its own rolling means.
pub const DEFAULT_MA_WINDOW: usize = 13;

/// A full window is required before a mean is produced.
fn window(size: usize) -> RollingOptionsFixedWindow {
    RollingOptionsFixedWindow {
        window_size: size,
        min_periods: size,
        ..Default::default()
    }
}

/// True when no sample carries a usable (finite, non-zero) value for `key`.
pub fn needs_backfill(samples: &[Sample], key: &str) -> bool {
    !samples
        .iter()
        .any(|sample| sample.field(key).is_some_and(|v| v != 0.0))
}

/// Trailing rolling mean over `values`. A missing value leaves a gap for every window
/// that covers it.
pub fn rolling_mean(values: &[Option<f64>], window_size: usize) -> PolarsResult<Vec<Option<f64>>> {
    let df = DataFrame::new(vec![Column::new("value".into(), values.to_vec())])?
        .lazy()
        .with_column(col("value").rolling_mean(window(window_size)).alias("ma"))
        .collect()?;

    Ok(df.column("ma")?.f64()?.into_iter().collect())
}

/// One row per minute in time order, holding the sample index and value the chart
/// would draw there. Zero counts as missing and never replaces an earlier value, and a
/// later non-zero write replaces an earlier one.
fn chart_rows(samples: &[Sample], source: &str) -> Vec<Option<(usize, f64)>> {
    let mut rows: BTreeMap<NaiveTime, Option<(usize, f64)>> = BTreeMap::new();

    for (idx, sample) in samples.iter().enumerate() {
        let Some(time) = sample.time().and_then(|t| parse_market_time(t).ok()) else {
            continue;
        };
        let row = rows.entry(time).or_default();
        if let Some(value) = sample.field(source).filter(|v| *v != 0.0) {
            *row = Some((idx, value));
        }
    }

    rows.into_values().collect()
}

/// Computes `ma_key` from `source` when the backend sent nothing usable for it.
///
/// The mean runs over the series the chart draws, so superseded writes and zeros do not
/// enter it. Returns whether the samples were modified. A zero window disables
/// backfilling.
pub fn backfill_moving_average(
    samples: &mut [Sample],
    source: &str,
    ma_key: &str,
    window_size: usize,
) -> PolarsResult<bool> {
    if window_size == 0 || samples.is_empty() || !needs_backfill(samples, ma_key) {
        return Ok(false);
    }

    let rows = chart_rows(samples, source);
    let values: Vec<Option<f64>> = rows.iter().map(|row| row.map(|(_, value)| value)).collect();
    let means = rolling_mean(&values, window_size)?;

    for (row, mean) in rows.into_iter().zip(means) {
        if let (Some((idx, _)), Some(mean)) = (row, mean) {
            samples[idx].set_field(ma_key, mean);
        }
    }

    Ok(true)
}
