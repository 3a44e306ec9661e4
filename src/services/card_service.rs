use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::MarketDataSource;
use crate::models::{BarChartSpec, CardLayout, ChartOptions, ChartProjection, CoinMarketRecord, Theme};
use crate::services::chart_service::{self, RenderError};

/// The card's only mutable state: the latest successful fetch
#[derive(Debug, Default)]
pub struct ChartState {
    pub records: Vec<CoinMarketRecord>,
    /// Bumped on every replacement; 0 means nothing fetched yet
    pub version: u64,
}

/// A bar chart card of the ten most expensive coins.
///
/// `mount` starts a single fetch; the result replaces the state wholesale.
/// Failures are logged and leave the state as it was.
pub struct ChartCard {
    state: Arc<RwLock<ChartState>>,
    alive: Arc<AtomicBool>,
    fetch_task: Option<JoinHandle<()>>,
    mounted_once: bool,
    projection_cache: Mutex<Option<(u64, Arc<ChartProjection>)>>,
    theme: Theme,
    options: ChartOptions,
    layout: CardLayout,
}

impl ChartCard {
    pub fn new(theme: Theme) -> Self {
        Self {
            state: Arc::new(RwLock::new(ChartState::default())),
            alive: Arc::new(AtomicBool::new(true)),
            fetch_task: None,
            mounted_once: false,
            projection_cache: Mutex::new(None),
            theme,
            options: ChartOptions::default(),
            layout: CardLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: CardLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Issue the one fetch for this card. Later calls are ignored.
    ///
    /// Spawns onto the current tokio runtime, so it must be called from
    /// within one; outside a runtime `tokio::spawn` panics.
    pub fn mount<S>(&mut self, source: Arc<S>)
    where
        S: MarketDataSource + ?Sized + 'static,
    {
        if self.mounted_once {
            warn!("Chart card already mounted, ignoring second mount");
            return;
        }
        self.mounted_once = true;

        let state = Arc::clone(&self.state);
        let alive = Arc::clone(&self.alive);

        debug!("Mounting chart card, fetching market data");
        self.fetch_task = Some(tokio::spawn(async move {
            let result = source.fetch_markets().await;
            apply_fetch_result(&state, &alive, result).await;
        }));
    }

    /// Wait for the mount fetch to finish, whatever its outcome
    pub async fn wait_for_fetch(&mut self) {
        if let Some(task) = self.fetch_task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("Market fetch task failed: {}", e);
                }
            }
        }
    }

    /// Stop caring about the fetch. A late result is dropped.
    pub fn unmount(&mut self) {
        self.alive.store(false, Ordering::SeqCst);
        if let Some(task) = self.fetch_task.as_ref() {
            task.abort();
        }
        debug!("Chart card unmounted");
    }

    /// Number of records in the current state
    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }

    /// Top-ten projection of the current state, recomputed only when the state changes
    pub async fn projection(&self) -> Arc<ChartProjection> {
        let state = self.state.read().await;

        let mut cache = self
            .projection_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some((version, projection)) = cache.as_ref() {
            if *version == state.version {
                return Arc::clone(projection);
            }
        }

        let projection = Arc::new(chart_service::project(&state.records));
        *cache = Some((state.version, Arc::clone(&projection)));
        projection
    }

    /// `"{N} Most Expensive Cryptocurrencies"`, N being every fetched record
    pub async fn dataset_label(&self) -> String {
        chart_service::dataset_label(self.projection().await.total_count)
    }

    /// Resolve the current projection into a drawable spec
    pub async fn chart_spec(&self) -> BarChartSpec {
        let projection = self.projection().await;
        chart_service::build_bar_chart(&projection, &self.theme, &self.options, &self.layout)
    }

    /// Render the card into a PNG or SVG file
    pub async fn render_to_file(&self, path: &Path, width: u32) -> Result<(), RenderError> {
        let spec = self.chart_spec().await;
        chart_service::render_to_file(&spec, path, width)
    }
}

impl Drop for ChartCard {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Fetch completion handler. Replaces the state on success, logs on failure,
/// and does nothing once the card is gone.
async fn apply_fetch_result<E: std::fmt::Display>(
    state: &RwLock<ChartState>,
    alive: &AtomicBool,
    result: Result<Vec<CoinMarketRecord>, E>,
) {
    if !alive.load(Ordering::SeqCst) {
        debug!("Chart card unmounted before fetch completed, dropping result");
        return;
    }

    match result {
        Ok(records) => {
            let mut state = state.write().await;
            // Checked again under the lock, unmount may have raced the write
            if !alive.load(Ordering::SeqCst) {
                return;
            }
            state.records = records;
            state.version += 1;
            info!("Loaded {} market records", state.records.len());
        }
        Err(e) => {
            warn!("Failed to fetch market data: {}", e);
        }
    }
}
