pub mod cache;
pub mod realtime;
pub mod state;

pub use cache::{CacheEntry, CachedValue, QueryCache, QueryKey};
pub use realtime::{ChangeEvent, ChangeKind, RealtimeHub, Subscription, REVIEWS_TABLE, SENTIMENT_TABLE};
pub use state::{DashboardState, ProviderPhase};

use crate::config::Settings;
use crate::services::api::{
    AnalyticsClient, ApiClientConfig, ApiError, DashboardClient, DashboardSnapshot,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, MissedTickBehavior};

pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(250);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

const IDLE_TICK: Duration = Duration::from_secs(3600);

#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<Option<DashboardSnapshot>, ApiError>;
}

#[derive(Clone)]
pub struct ApiFetcher {
    dashboard: DashboardClient,
    analytics: AnalyticsClient,
    include_stats: bool,
    topic_limit: u32,
    analytics_range: Option<String>,
}

impl ApiFetcher {
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            dashboard: DashboardClient::new(config.clone())?,
            analytics: AnalyticsClient::new(config)?,
            include_stats: true,
            topic_limit: 10,
            analytics_range: None,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        let config = settings.api_client_config()?;
        Ok(Self {
            dashboard: DashboardClient::new(config.clone())?,
            analytics: AnalyticsClient::new(config)?,
            include_stats: settings.include_stats,
            topic_limit: u32::try_from(settings.topic_limit).unwrap_or(u32::MAX),
            analytics_range: settings.analytics_range.clone(),
        })
    }

    pub fn with_stats(mut self, include_stats: bool) -> Self {
        self.include_stats = include_stats;
        self
    }

    pub fn with_topic_limit(mut self, limit: u32) -> Self {
        self.topic_limit = limit;
        self
    }

    pub fn with_analytics_range(mut self, range: impl Into<String>) -> Self {
        self.analytics_range = Some(range.into());
        self
    }
}

#[async_trait]
impl SnapshotFetcher for ApiFetcher {
    async fn fetch_snapshot(&self) -> Result<Option<DashboardSnapshot>, ApiError> {
        let mut snapshot = if self.include_stats {
            let (mut snapshot, stats) = tokio::try_join!(
                self.dashboard.dashboard_data(),
                self.dashboard.dashboard_stats()
            )?;
            snapshot.merge_stats(stats);
            snapshot
        } else {
            self.dashboard.dashboard_data().await?
        };

        // Supplemental endpoints are best-effort; a failure never voids the snapshot.
        if snapshot.topics.is_empty() && self.topic_limit > 0 {
            match self.analytics.topics(self.topic_limit).await {
                Ok(topics) => snapshot.topics = topics,
                Err(err) => tracing::warn!(error = %err, "topics fetch failed"),
            }
        }

        if let Some(range) = &self.analytics_range {
            if snapshot.sentiment_trend.is_empty() {
                match self.analytics.analytics(range).await {
                    Ok(report) => snapshot.sentiment_trend = report.sentiment_trend,
                    Err(err) => tracing::warn!(error = %err, "analytics fetch failed"),
                }
            }
        }

        Ok(Some(snapshot))
    }
}

#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    pub heartbeat: Option<Duration>,
    pub watch_tables: Vec<String>,
}

impl RefreshPolicy {
    pub fn manual() -> Self {
        Self {
            heartbeat: None,
            watch_tables: Vec::new(),
        }
    }

    pub fn heartbeat(interval: Duration) -> Self {
        Self {
            heartbeat: Some(interval),
            watch_tables: Vec::new(),
        }
    }

    pub fn push(tables: Vec<String>) -> Self {
        Self {
            heartbeat: None,
            watch_tables: tables,
        }
    }

    pub fn heartbeat_and_push(interval: Duration, tables: Vec<String>) -> Self {
        Self {
            heartbeat: Some(interval),
            watch_tables: tables,
        }
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::heartbeat(DEFAULT_POLL_INTERVAL)
    }
}

pub struct DashboardDataProvider<F> {
    fetcher: Arc<F>,
    cache: QueryCache,
    policy: RefreshPolicy,
    subscriptions: Vec<Subscription>,
}

impl<F> DashboardDataProvider<F>
where
    F: SnapshotFetcher + 'static,
{
    pub fn new(fetcher: F, cache: QueryCache, policy: RefreshPolicy) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            cache,
            policy,
            subscriptions: Vec::new(),
        }
    }

    pub fn with_realtime(mut self, hub: &RealtimeHub) -> Self {
        self.subscriptions = self
            .policy
            .watch_tables
            .iter()
            .map(|table| hub.subscribe(table))
            .collect();
        self
    }

    pub fn spawn(self) -> DashboardHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(DashboardState::new());
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        for subscription in self.subscriptions {
            tokio::spawn(forward_changes(subscription, change_tx.clone()));
        }
        drop(change_tx);

        tokio::spawn(run_provider(
            self.fetcher,
            self.cache,
            self.policy,
            command_rx,
            change_rx,
            state_tx,
        ));

        DashboardHandle {
            commands: command_tx,
            state: state_rx,
        }
    }
}

pub struct DashboardHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<DashboardState>,
}

impl DashboardHandle {
    pub fn refresh(&self) {
        let _ = self.commands.send(Command::Refresh);
    }

    pub fn pause_polling(&self) {
        let _ = self.commands.send(Command::PausePolling);
    }

    pub fn resume_polling(&self) {
        let _ = self.commands.send(Command::ResumePolling);
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    pub fn state(&self) -> watch::Receiver<DashboardState> {
        self.state.clone()
    }

    pub fn current(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn snapshot(&self) -> Option<DashboardSnapshot> {
        self.state.borrow().snapshot().cloned()
    }
}

impl Drop for DashboardHandle {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

enum Command {
    Refresh,
    PausePolling,
    ResumePolling,
    Shutdown,
}

async fn forward_changes(mut subscription: Subscription, tx: mpsc::UnboundedSender<ChangeEvent>) {
    loop {
        tokio::select! {
            _ = tx.closed() => break,
            maybe_event = subscription.recv() => match maybe_event {
                Some(event) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }
}

async fn run_provider<F: SnapshotFetcher>(
    fetcher: Arc<F>,
    cache: QueryCache,
    policy: RefreshPolicy,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut changes: mpsc::UnboundedReceiver<ChangeEvent>,
    state_tx: watch::Sender<DashboardState>,
) {
    let mut state = DashboardState::new();
    let period = policy.heartbeat.map(|interval| interval.max(MIN_POLL_INTERVAL));
    let mut polling_enabled = period.is_some();
    let mut push_open = true;

    let tick = period.unwrap_or(IDLE_TICK);
    let mut ticker = time::interval_at(time::Instant::now() + tick, tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    do_refresh(fetcher.as_ref(), &cache, &mut state, &state_tx).await;

    loop {
        tokio::select! {
            _ = ticker.tick(), if polling_enabled => {
                do_refresh(fetcher.as_ref(), &cache, &mut state, &state_tx).await;
            }
            maybe_event = changes.recv(), if push_open => match maybe_event {
                Some(event) => {
                    let tables = drain_batch(event, &mut changes).await;
                    for table in &tables {
                        cache.invalidate_table(table);
                    }
                    tracing::debug!(?tables, "change notification, refetching");
                    do_refresh(fetcher.as_ref(), &cache, &mut state, &state_tx).await;
                }
                None => push_open = false,
            },
            maybe_command = commands.recv() => match maybe_command {
                Some(Command::Refresh) => {
                    do_refresh(fetcher.as_ref(), &cache, &mut state, &state_tx).await;
                }
                Some(Command::PausePolling) => polling_enabled = false,
                Some(Command::ResumePolling) => {
                    if period.is_some() {
                        polling_enabled = true;
                        ticker.reset();
                    }
                }
                Some(Command::Shutdown) | None => break,
            },
        }
    }

    state.tear_down();
    let _ = state_tx.send(state);
    cache.clear();
}

async fn drain_batch(
    first: ChangeEvent,
    changes: &mut mpsc::UnboundedReceiver<ChangeEvent>,
) -> Vec<String> {
    let mut tables = vec![first.table];
    // Give forwarders a chance to flush events already published.
    tokio::task::yield_now().await;
    while let Ok(event) = changes.try_recv() {
        if !tables.contains(&event.table) {
            tables.push(event.table);
        }
    }
    tables
}

async fn do_refresh<F: SnapshotFetcher + ?Sized>(
    fetcher: &F,
    cache: &QueryCache,
    state: &mut DashboardState,
    state_tx: &watch::Sender<DashboardState>,
) {
    state.set_loading();
    let _ = state_tx.send(state.clone());

    match fetcher.fetch_snapshot().await {
        Ok(Some(snapshot)) => {
            cache.insert(QueryKey::Dashboard, CachedValue::Snapshot(snapshot.clone()));
            if let Some(stats) = snapshot.stats.clone() {
                cache.insert(QueryKey::DashboardStats, CachedValue::Stats(stats));
            }
            if !snapshot.topics.is_empty() {
                cache.insert(QueryKey::Topics, CachedValue::Topics(snapshot.topics.clone()));
            }
            state.update(snapshot);
        }
        Ok(None) => {
            tracing::debug!("dashboard fetch returned no data");
            state.set_empty(None);
        }
        Err(err) => {
            tracing::warn!(error = %err, "dashboard fetch failed");
            state.set_empty(Some(err.to_string()));
        }
    }

    let _ = state_tx.send(state.clone());
}
