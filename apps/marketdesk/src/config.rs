use anyhow::{anyhow, bail, Context};
use chrono_tz::Tz;
use marketdesk_backend::DEFAULT_BASE_URL;
use marketdesk_engine::indicators::DEFAULT_MA_WINDOW;
use marketdesk_engine::{parse_market_time, MarketSession, VisibleRangePolicy};
use marketdesk_render::chart::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use marketdesk_render::Palette;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_INDICES: &str = "BANKNIFTY=NIFTY_BANK,NIFTY=NIFTY_50,SENSEX=SENSEX";
pub const DEFAULT_TZ: &str = "Asia/Kolkata";
pub const DEFAULT_OUTPUT: &str = "dashboard.html";
pub const DEFAULT_REFRESH_SECS: u64 = 30;

/// An index on the dashboard and the key of its levels file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub levels_file: String,
}

/// Parses `NAME=FILE_KEY` pairs separated by commas. A bare `NAME` uses itself as the key.
pub fn parse_indices(list: &str) -> anyhow::Result<Vec<IndexSpec>> {
    let mut indices: Vec<IndexSpec> = Vec::new();

    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, file) = match entry.split_once('=') {
            Some((name, file)) => (name.trim(), file.trim()),
            None => (entry, entry),
        };
        if name.is_empty() || file.is_empty() {
            bail!("malformed index entry {entry:?}, expected NAME=FILE_KEY");
        }
        if indices.iter().any(|i| i.name == name) {
            bail!("index {name} is listed twice");
        }
        indices.push(IndexSpec {
            name: name.to_string(),
            levels_file: file.to_string(),
        });
    }

    if indices.is_empty() {
        bail!("no indices configured");
    }
    Ok(indices)
}

/// Runtime configuration, read from `MARKETDESK_*` variables.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub title: String,
    pub base_url: String,
    pub output: PathBuf,
    pub tz: Tz,
    pub refresh_secs: u64,
    pub indices: Vec<IndexSpec>,
    pub visible_range: VisibleRangePolicy,
    pub ma_window: usize,
    pub session: MarketSession,
    pub chart_width: u32,
    pub chart_height: u32,
    pub palette: Palette,
}

struct Vars<F: Fn(&str) -> Option<String>>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn text(&self, name: &str, default: &str) -> String {
        (self.0)(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    fn parsed<T: std::str::FromStr>(&self, name: &str, default: T) -> anyhow::Result<T>
    where
        T::Err: std::fmt::Display,
    {
        match (self.0)(name).map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) {
            Some(raw) => raw.parse().map_err(|e| anyhow!("{name}={raw:?}: {e}")),
            None => Ok(default),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let vars = Vars(lookup);

        let tz_name = vars.text("MARKETDESK_TZ", DEFAULT_TZ);
        let tz: Tz = tz_name
            .parse()
            .map_err(|e| anyhow!("MARKETDESK_TZ={tz_name:?}: {e}"))?;

        let defaults = MarketSession::default();
        let open = parse_market_time(&vars.text("MARKETDESK_SESSION_OPEN", &defaults.open.format("%H:%M").to_string()))
            .context("MARKETDESK_SESSION_OPEN")?;
        let close = parse_market_time(&vars.text("MARKETDESK_SESSION_CLOSE", &defaults.close.format("%H:%M").to_string()))
            .context("MARKETDESK_SESSION_CLOSE")?;
        if close <= open {
            bail!("session closes at {close} before it opens at {open}");
        }

        let refresh_secs = vars.parsed("MARKETDESK_REFRESH_SECS", DEFAULT_REFRESH_SECS)?;
        if refresh_secs == 0 {
            bail!("MARKETDESK_REFRESH_SECS must be positive");
        }

        Ok(Self {
            title: vars.text("MARKETDESK_TITLE", "Index Monitor"),
            base_url: vars.text("MARKETDESK_BASE_URL", DEFAULT_BASE_URL),
            output: PathBuf::from(vars.text("MARKETDESK_OUTPUT", DEFAULT_OUTPUT)),
            tz,
            refresh_secs,
            indices: parse_indices(&vars.text("MARKETDESK_INDICES", DEFAULT_INDICES)).context("MARKETDESK_INDICES")?,
            visible_range: vars.parsed("MARKETDESK_VISIBLE_RANGE", VisibleRangePolicy::default())?,
            ma_window: vars.parsed("MARKETDESK_MA_WINDOW", DEFAULT_MA_WINDOW)?,
            session: MarketSession::new(open, close),
            chart_width: vars.parsed("MARKETDESK_CHART_WIDTH", DEFAULT_WIDTH)?,
            chart_height: vars.parsed("MARKETDESK_CHART_HEIGHT", DEFAULT_HEIGHT)?,
            palette: Palette::default(),
        })
    }

    /// Command-line values take precedence over the environment.
    pub fn with_overrides(
        mut self,
        base_url: Option<String>,
        output: Option<PathBuf>,
        visible_range: Option<VisibleRangePolicy>,
    ) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        if let Some(output) = output {
            self.output = output;
        }
        if let Some(policy) = visible_range {
            self.visible_range = policy;
        }
        self
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.indices.iter().map(|i| i.name.as_str()).collect()
    }
}
