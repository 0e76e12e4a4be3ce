/// Linear mapping from a data domain to a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// A zero-width domain is widened by half a unit on each side.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let (mut d_min, mut d_max) = domain;
        if (d_max - d_min).abs() < f64::EPSILON {
            d_min -= 0.5;
            d_max += 0.5;
        }
        Self {
            domain: (d_min, d_max),
            range,
        }
    }

    /// Scale over the finite values of `values`, or `0..1` when there are none.
    pub fn fit(values: impl IntoIterator<Item = f64>, range: (f64, f64)) -> Self {
        let extent = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            });

        Self::new(extent.unwrap_or((0.0, 1.0)), range)
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let res = r0 + (value - d0) / (d1 - d0) * (r1 - r0);
        if res.is_finite() {
            res
        } else {
            r0
        }
    }

    /// Round-numbered ticks inside the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let step = nice_step(d1 - d0, count.max(1));
        if !step.is_finite() || step <= 0.0 {
            return Vec::new();
        }

        let first = (d0 / step).ceil() as i64;
        let last = (d1 / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// 1, 2 or 5 times a power of ten, close to `span / count`.
pub fn nice_step(span: f64, count: usize) -> f64 {
    let raw = span.abs() / count as f64;
    if raw == 0.0 || !raw.is_finite() {
        return 0.0;
    }

    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let factor = if normalized < 1.5 {
        1.0
    } else if normalized < 3.0 {
        2.0
    } else if normalized < 7.0 {
        5.0
    } else {
        10.0
    };

    factor * magnitude
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_linearly() {
        let scale = LinearScale::new((0.0, 100.0), (300.0, 0.0));
        assert_eq!(scale.map(0.0), 300.0);
        assert_eq!(scale.map(100.0), 0.0);
        assert_eq!(scale.map(25.0), 225.0);
    }

    #[test]
    fn widens_flat_domain() {
        let scale = LinearScale::fit([42.0, 42.0], (0.0, 10.0));
        assert_eq!(scale.domain(), (41.5, 42.5));
        assert_eq!(scale.map(42.0), 5.0);
    }

    #[test]
    fn empty_fit_defaults() {
        let scale = LinearScale::fit(std::iter::empty(), (0.0, 10.0));
        assert_eq!(scale.domain(), (0.0, 1.0));
    }

    #[test]
    fn nice_ticks() {
        let scale = LinearScale::new((24_612.0, 24_988.0), (0.0, 1.0));
        assert_eq!(scale.ticks(4), vec![24_700.0, 24_800.0, 24_900.0]);

        assert_eq!(nice_step(10.0, 5), 2.0);
        assert_eq!(nice_step(0.0, 5), 0.0);
    }
}
