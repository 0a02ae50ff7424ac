use super::http::{ApiClientConfig, ApiError, HttpClient};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardClient {
    http: Arc<HttpClient>,
}

impl DashboardClient {
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http: Arc::new(HttpClient::new(config)?),
        })
    }

    pub async fn dashboard_data(&self) -> Result<DashboardSnapshot, ApiError> {
        let response = self
            .http
            .get_json::<DashboardSnapshot>("/api/dashboard")
            .await?;
        Ok(response.data)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let response = self
            .http
            .get_json::<DashboardStats>("/api/dashboard/stats")
            .await?;
        Ok(response.data)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    #[serde(default)]
    pub metrics: DashboardMetrics,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default)]
    pub platforms: Vec<PlatformBreakdown>,
    #[serde(default)]
    pub sentiment_trend: Vec<TrendPoint>,
    #[serde(default)]
    pub topics: Vec<Topic>,
    #[serde(default)]
    pub stats: Option<DashboardStats>,
}

impl DashboardSnapshot {
    pub fn merge_stats(&mut self, stats: DashboardStats) {
        match &mut self.stats {
            Some(existing) => existing.fill_missing(stats),
            None => self.stats = Some(stats),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    #[serde(default)]
    pub total_reviews: u64,
    #[serde(default)]
    pub positive_count: u64,
    #[serde(default)]
    pub neutral_count: u64,
    #[serde(default)]
    pub negative_count: u64,
    #[serde(default)]
    pub average_rating: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub severity: String,
    pub message: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlatformBreakdown {
    pub platform: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub label: String,
    #[serde(default)]
    pub positive: u64,
    #[serde(default)]
    pub neutral: u64,
    #[serde(default)]
    pub negative: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub keyword: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default)]
    pub reviews_today: Option<u64>,
    #[serde(default)]
    pub mentions_this_week: Option<u64>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub active_alerts: Option<u64>,
}

impl DashboardStats {
    fn fill_missing(&mut self, other: DashboardStats) {
        if self.reviews_today.is_none() {
            self.reviews_today = other.reviews_today;
        }
        if self.mentions_this_week.is_none() {
            self.mentions_this_week = other.mentions_this_week;
        }
        if self.sentiment_score.is_none() {
            self.sentiment_score = other.sentiment_score;
        }
        if self.active_alerts.is_none() {
            self.active_alerts = other.active_alerts;
        }
    }
}
