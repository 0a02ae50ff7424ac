use reqwest::{header::HeaderMap, Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ApiClientConfig {
    pub fn try_from_url(url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(url)?;
        Ok(Self::new(base_url))
    }

    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(15),
            user_agent: format!("ReviewLens/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: ApiClientConfig,
}

impl HttpClient {
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.config.base_url.join(path).map_err(ApiError::from)
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        self.request_json(Method::GET, path, Option::<&()>::None)
            .await
    }

    pub async fn get_json_with_query<T>(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let mut url = self.url(path)?;
        query.apply(&mut url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::Request)?;
        Self::hydrate_response(response).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_json(Method::POST, path, Some(body)).await
    }

    pub async fn request_json<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path)?;
        let mut builder = self.client.request(method, url);
        if let Some(payload) = body {
            builder = builder.json(payload);
        }

        let response = builder.send().await.map_err(ApiError::Request)?;
        Self::hydrate_response(response).await
    }

    async fn hydrate_response<T>(response: reqwest::Response) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(ApiError::Request)?;

        if !status.is_success() {
            return Err(ApiError::HttpStatus { status, body });
        }

        let data = serde_json::from_str(&body)
            .map_err(|source| ApiError::Deserialize { source, body })?;

        Ok(ApiResponse {
            data,
            status,
            headers,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pub limit: Option<u32>,
    pub range: Option<String>,
}

impl QueryParams {
    pub fn limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn range(range: impl Into<String>) -> Self {
        Self {
            range: Some(range.into()),
            ..Default::default()
        }
    }

    pub fn apply(&self, url: &mut Url) {
        if self.limit.is_none() && self.range.is_none() {
            return;
        }

        {
            let mut pairs = url.query_pairs_mut();
            if let Some(limit) = self.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(range) = &self.range {
                pairs.append_pair("range", range);
            }
        }
    }
}

#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: StatusCode,
    pub headers: HeaderMap,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("failed to deserialize response: {source}")]
    Deserialize {
        source: serde_json::Error,
        body: String,
    },
}
