use crate::api::error::ApiError;
use crate::api::models::{
    AnalysisKey, AnalysisResult, ClusterRequest, ClusterResult, CreateDatasetRequest,
    CreateDatasetResponse, DatasetInfo, DatasetList, ErrorBody, GuestTokenResponse,
    MessageResponse, MetricRequest, MetricResult, RequestCodeRequest, VerifyCodeRequest,
    VerifyCodeResponse,
};
use crate::domain::{ClusterMethod, MetricType};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

const CLUSTER_PATH: &str = "/v1/analysis/cluster";
const METRIC_PATH: &str = "/v1/analysis/metric";
const DATASETS_PATH: &str = "/v1/datasets/";
const REQUEST_CODE_PATH: &str = "/v1/auth/request_code";
const VERIFY_CODE_PATH: &str = "/v1/auth/verify_code";
const GUEST_PATH: &str = "/v1/auth/guest";

/// The analysis endpoints the fetch orchestration depends on.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn cluster(&self, dataset_id: &str, method: ClusterMethod)
        -> Result<ClusterResult, ApiError>;

    async fn metric(&self, dataset_id: &str, metric: MetricType) -> Result<MetricResult, ApiError>;

    async fn fetch(&self, dataset_id: &str, key: AnalysisKey) -> Result<AnalysisResult, ApiError> {
        match key {
            AnalysisKey::Cluster(method) => self
                .cluster(dataset_id, method)
                .await
                .map(|result| AnalysisResult::Cluster(method, result)),
            AnalysisKey::Metric(metric) => self
                .metric(dataset_id, metric)
                .await
                .map(|result| AnalysisResult::Metric(metric, result)),
        }
    }
}

/// Dataset registration endpoints. Requests carry the session token.
#[async_trait]
pub trait DatasetBackend: Send + Sync {
    async fn create_dataset(
        &self,
        city: &str,
        transport_type: &str,
    ) -> Result<CreateDatasetResponse, ApiError>;

    async fn list_datasets(&self) -> Result<Vec<DatasetInfo>, ApiError>;

    async fn delete_dataset(&self, dataset_id: &str) -> Result<(), ApiError>;
}

/// reqwest-backed client for the `/v1` API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `/v1/datasets/{id}` with the id percent-encoded as one path segment.
    fn dataset_url(&self, dataset_id: &str) -> Result<Url, ApiError> {
        let invalid = || ApiError::InvalidDatasetId(dataset_id.to_string());
        // Dot segments are dropped by the URL parser rather than encoded.
        if matches!(dataset_id.trim(), "" | "." | "..") {
            return Err(invalid());
        }

        let mut url = Url::parse(&self.url(DATASETS_PATH)).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|()| invalid())?
            .pop_if_empty()
            .push(dataset_id);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            // Sent verbatim; the backend strips an optional "Bearer " itself.
            Some(token) => request.header(AUTHORIZATION, token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<reqwest::Response, ApiError> {
        debug!(path, "sending request");
        let response = request.header(ACCEPT, "application/json").send().await?;
        let status = response.status();

        if status.is_success() {
            info!(path, status = status.as_u16(), "request completed");
            return Ok(response);
        }

        let error = error_from_response(response).await;
        warn!(path, status = status.as_u16(), %error, "request failed");
        Err(error)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<T, ApiError> {
        let response = self.send(request, path).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    pub async fn request_code(&self, email: &str) -> Result<String, ApiError> {
        let request = self
            .client
            .post(self.url(REQUEST_CODE_PATH))
            .json(&RequestCodeRequest { email });
        let response: MessageResponse = self.send_json(request, REQUEST_CODE_PATH).await?;
        Ok(response.message)
    }

    pub async fn verify_code(&self, email: &str, code: &str) -> Result<VerifyCodeResponse, ApiError> {
        let request = self
            .client
            .post(self.url(VERIFY_CODE_PATH))
            .json(&VerifyCodeRequest { email, code });
        self.send_json(request, VERIFY_CODE_PATH).await
    }

    pub async fn guest(&self) -> Result<String, ApiError> {
        let request = self.client.post(self.url(GUEST_PATH));
        let response: GuestTokenResponse = self.send_json(request, GUEST_PATH).await?;
        Ok(response.token)
    }
}

async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|body| body.detail_text())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

    if status == StatusCode::CONFLICT {
        ApiError::Conflict(detail)
    } else {
        ApiError::Status {
            status: status.as_u16(),
            detail,
        }
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn cluster(
        &self,
        dataset_id: &str,
        method: ClusterMethod,
    ) -> Result<ClusterResult, ApiError> {
        let request = self
            .client
            .post(self.url(CLUSTER_PATH))
            .json(&ClusterRequest { dataset_id, method });
        let result: ClusterResult = self.send_json(request, CLUSTER_PATH).await?;
        result
            .validate()
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        Ok(result)
    }

    async fn metric(&self, dataset_id: &str, metric: MetricType) -> Result<MetricResult, ApiError> {
        let request = self
            .client
            .post(self.url(METRIC_PATH))
            .json(&MetricRequest { dataset_id, metric });
        let result: MetricResult = self.send_json(request, METRIC_PATH).await?;
        result
            .validate()
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        Ok(result)
    }
}

#[async_trait]
impl DatasetBackend for HttpBackend {
    async fn create_dataset(
        &self,
        city: &str,
        transport_type: &str,
    ) -> Result<CreateDatasetResponse, ApiError> {
        let request = self.authorized(
            self.client
                .post(self.url(DATASETS_PATH))
                .json(&CreateDatasetRequest {
                    city,
                    transport_type,
                }),
        );
        let response: CreateDatasetResponse = self.send_json(request, DATASETS_PATH).await?;

        if response.dataset_id.is_empty() {
            return Err(ApiError::Malformed("dataset_id is missing".to_string()));
        }

        Ok(response)
    }

    async fn list_datasets(&self) -> Result<Vec<DatasetInfo>, ApiError> {
        let request = self.authorized(self.client.get(self.url(DATASETS_PATH)));
        let list: DatasetList = self.send_json(request, DATASETS_PATH).await?;
        Ok(list.datasets)
    }

    async fn delete_dataset(&self, dataset_id: &str) -> Result<(), ApiError> {
        let url = self.dataset_url(dataset_id)?;
        let path = url.path().to_string();
        let request = self.authorized(self.client.delete(url));
        self.send(request, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn backend(server: &Server) -> HttpBackend {
        HttpBackend::new(&server.url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn cluster_posts_dataset_and_method() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", CLUSTER_PATH)
            .match_body(Matcher::Json(json!({"dataset_id": "d1", "method": "louvain"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "dataset_id": "d1",
                    "type": "louvain",
                    "nodes": [
                        {"id": "1", "name": "Kremlin", "cluster_id": 2, "coordinates": [37.61, 55.75]}
                    ],
                    "statistics": {"modularity": 0.61}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let result = backend(&server)
            .cluster("d1", ClusterMethod::Louvain)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result.nodes[0].cluster_id, 2);
        assert_eq!(result.statistics.unwrap().modularity, Some(0.61));
    }

    #[tokio::test]
    async fn metric_body_uses_metric_field() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", METRIC_PATH)
            .match_body(Matcher::Json(
                json!({"dataset_id": "d1", "metric": "betweenness"}),
            ))
            .with_status(200)
            .with_body(r#"{"dataset_id": "d1", "nodes": []}"#)
            .create_async()
            .await;

        let result = backend(&server)
            .metric("d1", MetricType::Betweenness)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(result.nodes.is_empty());
    }

    #[tokio::test]
    async fn non_success_carries_detail() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", METRIC_PATH)
            .with_status(404)
            .with_body(r#"{"detail": "Dataset not found"}"#)
            .create_async()
            .await;

        let error = backend(&server)
            .metric("missing", MetricType::PageRank)
            .await
            .unwrap_err();

        match error {
            ApiError::Status { status, detail } => {
                assert_eq!(status, 404);
                assert_eq!(detail, "Dataset not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_detail_falls_back_to_reason() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", CLUSTER_PATH)
            .with_status(502)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let error = backend(&server)
            .cluster("d1", ClusterMethod::Leiden)
            .await
            .unwrap_err();

        assert_eq!(error.status(), Some(502));
        assert!(error.to_string().contains("Bad Gateway"));
    }

    #[tokio::test]
    async fn invalid_body_is_malformed() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", CLUSTER_PATH)
            .with_status(200)
            .with_body(r#"{"nodes": [{"id": "1", "name": "A", "cluster_id": 0, "coordinates": [400.0, 10.0]}]}"#)
            .create_async()
            .await;

        let error = backend(&server)
            .cluster("d1", ClusterMethod::Leiden)
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::Malformed(_)));
    }

    #[tokio::test]
    async fn duplicate_dataset_is_conflict() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", DATASETS_PATH)
            .match_body(Matcher::Json(json!({"city": "Kazan", "transport_type": "tram"})))
            .with_status(409)
            .with_body(r#"{"detail": "Dataset with this city and transport type already exists"}"#)
            .create_async()
            .await;

        let error = backend(&server)
            .create_dataset("Kazan", "tram")
            .await
            .unwrap_err();

        assert!(error.is_conflict());
    }

    #[tokio::test]
    async fn dataset_requests_send_token_verbatim() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", DATASETS_PATH)
            .match_header("authorization", "guest-token-123")
            .with_status(200)
            .with_body(
                json!({"datasets": [{"dataset_id": "d1", "city": "Moscow", "transport_type": "bus"}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let datasets = backend(&server)
            .with_token(Some("guest-token-123".to_string()))
            .list_datasets()
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].city, "Moscow");
    }

    #[tokio::test]
    async fn delete_targets_dataset_path() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/v1/datasets/d9")
            .with_status(200)
            .with_body(r#"{"message": "Dataset d9 deleted"}"#)
            .create_async()
            .await;

        backend(&server).delete_dataset("d9").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_encodes_reserved_characters_in_dataset_id() {
        let mut server = Server::new_async().await;
        let guest = server
            .mock("DELETE", GUEST_PATH)
            .with_status(200)
            .expect(0)
            .create_async()
            .await;
        let dataset = server
            .mock("DELETE", "/v1/datasets/..%2Fauth%2Fguest%3Fx=1")
            .with_status(200)
            .with_body(r#"{"message": "deleted"}"#)
            .create_async()
            .await;

        backend(&server)
            .delete_dataset("../auth/guest?x=1")
            .await
            .unwrap();

        dataset.assert_async().await;
        guest.assert_async().await;
    }

    #[tokio::test]
    async fn dot_dataset_ids_are_rejected_before_sending() {
        let mut server = Server::new_async().await;
        let any_delete = server
            .mock("DELETE", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        for id in ["..", ".", ""] {
            let error = backend(&server).delete_dataset(id).await.unwrap_err();
            assert!(matches!(error, ApiError::InvalidDatasetId(_)));
        }
        any_delete.assert_async().await;
    }

    #[tokio::test]
    async fn empty_dataset_id_is_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", DATASETS_PATH)
            .with_status(200)
            .with_body(r#"{"dataset_id": ""}"#)
            .create_async()
            .await;

        let error = backend(&server)
            .create_dataset("Omsk", "bus")
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::Malformed(_)));
    }

    #[tokio::test]
    async fn guest_returns_token() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", GUEST_PATH)
            .with_status(200)
            .with_body(r#"{"token": "abc"}"#)
            .create_async()
            .await;

        assert_eq!(backend(&server).guest().await.unwrap(), "abc");
    }
}
