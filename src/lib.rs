//! Data-access layer for the ReviewLens sentiment monitoring dashboard.
//!
//! Supplies the latest [`DashboardSnapshot`] to view components, refreshed by
//! fixed-interval polling, push invalidation from realtime change
//! notifications, or both, behind a single [`DashboardDataProvider`] worker.

pub mod config;
pub mod provider;
pub mod services;

pub use config::{Settings, SettingsError};
pub use provider::{
    ApiFetcher, CacheEntry, CachedValue, ChangeEvent, ChangeKind, DashboardDataProvider,
    DashboardHandle, DashboardState, ProviderPhase, QueryCache, QueryKey, RealtimeHub,
    RefreshPolicy, SnapshotFetcher, Subscription,
};
pub use services::api::{
    AnalyticsClient, AnalyticsReport, AnalyzeOutcome, ApiClientConfig, ApiError, DashboardClient,
    DashboardSnapshot, DashboardStats,
};
