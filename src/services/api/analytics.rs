use super::dashboard::{PlatformBreakdown, Topic, TrendPoint};
use super::http::{ApiClientConfig, ApiError, HttpClient, QueryParams};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub struct AnalyticsClient {
    http: Arc<HttpClient>,
}

impl AnalyticsClient {
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http: Arc::new(HttpClient::new(config)?),
        })
    }

    pub async fn topics(&self, limit: u32) -> Result<Vec<Topic>, ApiError> {
        let response = self
            .http
            .get_json_with_query::<Vec<Topic>>("/api/topics", &QueryParams::limit(limit))
            .await?;
        Ok(response.data)
    }

    pub async fn analytics(&self, range: &str) -> Result<AnalyticsReport, ApiError> {
        let response = self
            .http
            .get_json_with_query::<AnalyticsReport>("/api/analytics", &QueryParams::range(range))
            .await?;
        Ok(response.data)
    }

    pub async fn analyze_url(&self, url: &str) -> Result<AnalyzeOutcome, ApiError> {
        let payload = json!({ "url": url });
        let response = self
            .http
            .post_json::<AnalyzeOutcome, _>("/api/analyze/url", &payload)
            .await?;
        Ok(response.data)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub sentiment_trend: Vec<TrendPoint>,
    #[serde(default)]
    pub platforms: Vec<PlatformBreakdown>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AnalyzeOutcome {
    pub count: u64,
    pub platform: String,
}
