pub mod analytics;
pub mod dashboard;
pub mod http;

pub use analytics::{AnalyticsClient, AnalyticsReport, AnalyzeOutcome};
pub use dashboard::{
    Alert, DashboardClient, DashboardMetrics, DashboardSnapshot, DashboardStats,
    PlatformBreakdown, Topic, TrendPoint,
};
pub use http::{ApiClientConfig, ApiError, ApiResponse, HttpClient, QueryParams};
