use crate::config::DashboardConfig;
use anyhow::Context;
use chrono::Utc;
use marketdesk_backend::chartdata::ChartData;
use marketdesk_backend::levels::{Levels, LevelsParams};
use marketdesk_backend::snapshots::Snapshots;
use marketdesk_backend::BackendClient;
use marketdesk_engine::indicators::backfill_moving_average;
use marketdesk_engine::MarketClock;
use marketdesk_render::{render_dual_axis_chart, ChartKind, Page, StatusRow, StatusTable};
use marketdesk_shared_models::{fields, Sample};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

/// Moving averages the charts draw, with the field each is computed from.
const MOVING_AVERAGES: [(&str, &str); 3] = [
    (fields::LTP, fields::LTP_MA),
    (fields::NET_OI_CHANGE, fields::NET_OI_MA),
    (fields::NET_DEX, fields::NET_DEX_MA),
];

/// Writes the dashboard file. Writers are serialized and each write goes through a
/// sibling temp file, so a reader only ever sees a complete document.
///
/// The document is rendered inside the critical section, so the file always ends up
/// holding the page as the last writer saw it.
pub struct Publisher {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl Publisher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn publish(&self, render: impl FnOnce() -> String) -> std::io::Result<()> {
        let _guard = self.lock.lock().await;
        let html = render();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &html).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(path = %self.path().display(), bytes = html.len(), "dashboard written");
        Ok(())
    }
}

pub struct Dashboard {
    client: BackendClient,
    config: DashboardConfig,
    page: Mutex<Page>,
    publisher: Publisher,
    print_table: bool,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, print_table: bool) -> anyhow::Result<Self> {
        let client = BackendClient::new(&config.base_url).context("Failed to build HTTP client")?;
        let page = Page::dashboard(config.title.clone(), &config.symbols());
        let publisher = Publisher::new(config.output.clone());

        Ok(Self {
            client,
            config,
            page: Mutex::new(page),
            publisher,
            print_table,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn page(&self) -> MutexGuard<'_, Page> {
        self.page.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts the table load and the chart load as independent tasks.
    pub fn refresh_all(self: &Arc<Self>) -> [JoinHandle<()>; 2] {
        tracing::info!("refreshing dashboard");

        let data = Arc::clone(self);
        let charts = Arc::clone(self);
        [
            tokio::spawn(async move { data.load_data().await }),
            tokio::spawn(async move { charts.load_all_charts().await }),
        ]
    }

    /// One full cycle, waiting for both loads to finish.
    pub async fn refresh_once(self: &Arc<Self>) {
        for handle in self.refresh_all() {
            if let Err(err) = handle.await {
                tracing::error!(%err, "refresh task failed");
            }
        }
    }

    /// Rebuilds the status table. Any failed fetch leaves the previous table in place.
    pub async fn load_data(&self) {
        if let Err(err) = self.try_load_data().await {
            tracing::error!("Error loading data: {err:#}");
        }
    }

    async fn try_load_data(&self) -> anyhow::Result<()> {
        let table = self.fetch_table().await?;
        if self.print_table {
            table.to_console().printstd();
        }

        let stamp = Utc::now().with_timezone(&self.config.tz).format("%H:%M:%S").to_string();
        {
            let mut page = self.page();
            page.set_table(table);
            page.set_last_updated(&stamp);
        }

        self.publish().await?;
        tracing::info!(rows = self.config.indices.len(), "status table updated");
        Ok(())
    }

    async fn fetch_table(&self) -> anyhow::Result<StatusTable> {
        let snapshots = {
            let client = self.client.clone();
            tokio::spawn(async move { client.call0::<Snapshots>().await })
        };
        let levels: Vec<_> = self
            .config
            .indices
            .iter()
            .map(|index| {
                let client = self.client.clone();
                let params = LevelsParams::builder().file_key(index.levels_file.clone()).build();
                tokio::spawn(async move { client.call::<Levels>(&params).await })
            })
            .collect();

        let snapshots = snapshots.await?.context("Failed to fetch snapshots")?;

        let mut rows = Vec::with_capacity(levels.len());
        for (index, task) in self.config.indices.iter().zip(levels) {
            let levels = task
                .await?
                .with_context(|| format!("Failed to fetch levels for {}", index.name))?;
            let lines = snapshots.get(&index.name).map(Vec::as_slice).unwrap_or_default();
            rows.push(StatusRow::new(&index.name, lines, &levels));
        }

        Ok(StatusTable::new(rows))
    }

    /// Redraws both charts of every index from one chart data fetch.
    pub async fn load_all_charts(&self) {
        if let Err(err) = self.try_load_all_charts().await {
            tracing::error!("Error loading chart data: {err:#}");
        }
    }

    async fn try_load_all_charts(&self) -> anyhow::Result<()> {
        let mut data = self
            .client
            .call0::<ChartData>()
            .await
            .context("Failed to fetch chart data")?;
        let clock = MarketClock::today(self.config.tz);

        {
            let mut page = self.page();
            for index in &self.config.indices {
                let mut samples = data.remove(&index.name).unwrap_or_default();
                self.backfill(&index.name, &mut samples);

                for kind in ChartKind::ALL {
                    let mut chart = kind.config(&index.name, samples.clone(), &self.config.palette);
                    chart.width = self.config.chart_width;
                    chart.height = self.config.chart_height;
                    render_dual_axis_chart(&mut page, &chart, &clock, &self.config.session, self.config.visible_range);
                }
            }
        }

        self.publish().await?;
        tracing::info!(day = %clock.day(), "charts updated");
        Ok(())
    }

    async fn publish(&self) -> anyhow::Result<()> {
        self.publisher
            .publish(|| self.page().to_html(self.config.refresh_secs))
            .await
            .context("Failed to write dashboard")
    }

    fn backfill(&self, symbol: &str, samples: &mut [Sample]) {
        for (source, ma) in MOVING_AVERAGES {
            match backfill_moving_average(samples, source, ma, self.config.ma_window) {
                Ok(true) => tracing::debug!(symbol, ma, "moving average computed locally"),
                Ok(false) => {}
                Err(err) => tracing::warn!(symbol, ma, %err, "cannot compute moving average"),
            }
        }
    }
}
