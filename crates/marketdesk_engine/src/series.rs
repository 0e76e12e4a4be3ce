use crate::time::MarketClock;
use marketdesk_shared_models::{Point, Sample};
use std::collections::BTreeMap;

/// Time-sorted points for `key`. Samples sharing a time string overwrite each other in
/// arrival order, so the last one wins.
pub fn build_series(samples: &[Sample], key: &str, clock: &MarketClock) -> Vec<Point> {
    collect_points(samples, key, clock, |_| true)
}

/// Chart-path variant of [`build_series`]: zero values never enter the series, and the
/// result is trimmed so every timestamp strictly exceeds the one before it.
pub fn build_chart_series(samples: &[Sample], key: &str, clock: &MarketClock) -> Vec<Point> {
    let mut points = collect_points(samples, key, clock, |value| value != 0.0);
    points.dedup_by(|later, kept| later.time <= kept.time);
    points
}

fn collect_points(
    samples: &[Sample],
    key: &str,
    clock: &MarketClock,
    keep: impl Fn(f64) -> bool,
) -> Vec<Point> {
    let mut by_time: BTreeMap<i64, Point> = BTreeMap::new();

    for sample in samples {
        let (Some(time), Some(value)) = (sample.time(), sample.field(key)) else {
            continue;
        };
        if !keep(value) {
            continue;
        }

        match clock.timestamp(time) {
            Ok(ts) => {
                by_time.insert(ts, Point::new(ts, value));
            }
            Err(err) => tracing::warn!(key, %err, "skipping sample with unusable time"),
        }
    }

    by_time.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use marketdesk_shared_models::fields::{LTP, LTP_MA};
    use std::collections::HashMap;

    fn clock() -> MarketClock {
        MarketClock::new(NaiveDate::from_ymd_opt(2025, 8, 14).unwrap(), chrono_tz::Asia::Kolkata)
    }

    fn ts(time: &str) -> i64 {
        clock().timestamp(time).unwrap()
    }

    fn shuffled() -> Vec<Sample> {
        vec![
            Sample::new("10:05").with(LTP, 5.0),
            Sample::new("09:15").with(LTP, 1.0),
            Sample::new("09:45").with(LTP, 3.0),
            Sample::new("09:15").with(LTP, 2.0),
            Sample::new("09:30").with(LTP, 0.0),
            Sample::new("10:05").with(LTP, 6.0),
        ]
    }

    /// Deterministic pseudo-random source for generated inputs.
    struct Lcg(u64);

    impl Lcg {
        fn below(&mut self, bound: u64) -> u64 {
            self.0 = self.0.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            (self.0 >> 33) % bound
        }
    }

    /// Up to 24 samples over eight minutes, so times repeat and zeros are common.
    fn generated(seed: u64) -> Vec<Sample> {
        let mut rng = Lcg(seed);
        let len = rng.below(25);
        (0..len)
            .map(|_| {
                let time = format!("09:{:02}", 15 + rng.below(8));
                let value = [0.0, 1.5, -2.0, 3.25, 100.0][rng.below(5) as usize];
                Sample::new(time).with(LTP, value)
            })
            .collect()
    }

    /// Last write per minute, kept in a hash map and sorted afterwards.
    fn last_writes(samples: &[Sample], skip_zero: bool) -> Vec<Point> {
        let mut last: HashMap<i64, f64> = HashMap::new();
        for sample in samples {
            let value = sample.field(LTP).unwrap();
            if skip_zero && value == 0.0 {
                continue;
            }
            last.insert(ts(sample.time().unwrap()), value);
        }

        let mut points: Vec<Point> = last.into_iter().map(|(time, value)| Point::new(time, value)).collect();
        points.sort_by_key(|p| p.time);
        points
    }

    #[test]
    fn generated_inputs_keep_ordering_and_last_write() {
        for seed in 0..64 {
            let samples = generated(seed);
            let series = build_series(&samples, LTP, &clock());
            let chart = build_chart_series(&samples, LTP, &clock());

            for points in [&series, &chart] {
                assert!(points.windows(2).all(|w| w[0].time < w[1].time), "seed {seed}");
            }
            assert!(chart.iter().all(|p| p.value != 0.0), "seed {seed}");
            assert_eq!(series, last_writes(&samples, false), "seed {seed}");
            assert_eq!(chart, last_writes(&samples, true), "seed {seed}");

            assert_eq!(build_series(&samples, LTP, &clock()), series, "seed {seed}");
            assert_eq!(build_chart_series(&samples, LTP, &clock()), chart, "seed {seed}");
        }
    }

    #[test]
    fn empty_input_gives_empty_series() {
        assert!(build_series(&[], LTP, &clock()).is_empty());
        assert!(build_chart_series(&[], LTP, &clock()).is_empty());
    }

    #[test]
    fn sorted_with_unique_timestamps() {
        for points in [
            build_series(&shuffled(), LTP, &clock()),
            build_chart_series(&shuffled(), LTP, &clock()),
        ] {
            assert!(points.windows(2).all(|w| w[0].time < w[1].time));
        }
    }

    #[test]
    fn last_write_wins() {
        let points = build_series(&shuffled(), LTP, &clock());
        assert_eq!(
            points,
            vec![
                Point::new(ts("09:15"), 2.0),
                Point::new(ts("09:30"), 0.0),
                Point::new(ts("09:45"), 3.0),
                Point::new(ts("10:05"), 6.0),
            ]
        );
    }

    #[test]
    fn idempotent() {
        let samples = shuffled();
        assert_eq!(build_series(&samples, LTP, &clock()), build_series(&samples, LTP, &clock()));
        assert_eq!(
            build_chart_series(&samples, LTP, &clock()),
            build_chart_series(&samples, LTP, &clock())
        );
    }

    #[test]
    fn chart_series_drops_zeros() {
        let points = build_chart_series(&shuffled(), LTP, &clock());
        assert!(points.iter().all(|p| p.value != 0.0));
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn zero_does_not_erase_earlier_value() {
        let samples = vec![
            Sample::new("09:20").with(LTP, 105.0),
            Sample::new("09:20").with(LTP, 0.0),
        ];
        assert_eq!(
            build_chart_series(&samples, LTP, &clock()),
            vec![Point::new(ts("09:20"), 105.0)]
        );
    }

    #[test]
    fn skips_missing_fields_and_bad_times() {
        let mut no_time = Sample::default().with(LTP, 7.0);
        no_time.time = None;
        let samples = vec![
            no_time,
            Sample::new("").with(LTP, 8.0),
            Sample::new("nope").with(LTP, 9.0),
            Sample::new("09:20").with(LTP_MA, 10.0),
            Sample::new("09:20").with(LTP, f64::NAN),
            Sample::new("09:21").with(LTP, 11.0),
        ];

        assert_eq!(
            build_series(&samples, LTP, &clock()),
            vec![Point::new(ts("09:21"), 11.0)]
        );
    }
}
