// HTTP report client for the reporting API
use crate::application::report_source::ReportSource;
use crate::domain::identity::EntityId;
use crate::domain::period::Period;
use crate::domain::report::RawResponse;
use crate::error::FetchError;
use crate::infrastructure::config::ReportConfig;
use async_trait::async_trait;
use serde::Deserialize;

const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone)]
pub struct HttpReportClient {
    client: reqwest::Client,
    config: ReportConfig,
}

/// Error body the API sends with non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default, alias = "message")]
    error: Option<String>,
}

impl HttpReportClient {
    pub fn new(config: ReportConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn build_url(&self, entity: &EntityId, period: Option<&Period>) -> String {
        let base = self.config.endpoint.trim_end_matches('/');
        let entity = urlencoding::encode(entity.as_str());
        match period {
            Some(period) => format!(
                "{}/{}?year={}",
                base,
                entity,
                urlencoding::encode(period.as_str())
            ),
            None => format!("{}/{}", base, entity),
        }
    }
}

#[async_trait]
impl ReportSource for HttpReportClient {
    async fn fetch(
        &self,
        entity: &EntityId,
        period: Option<&Period>,
    ) -> Result<RawResponse, FetchError> {
        let api_key = self.config.credential().ok_or_else(|| {
            FetchError::Configuration("report API key is not configured".to_string())
        })?;

        let url = self.build_url(entity, period);
        tracing::debug!("Requesting dashboard report: {}", url);

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()));
            tracing::debug!("Report API returned {}: {}", status, message);
            return Err(FetchError::Request(message));
        }

        RawResponse::from_slice(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn report(
        Path(id): Path<String>,
        Query(query): Query<HashMap<String, String>>,
        headers: HeaderMap,
    ) -> axum::response::Response {
        if headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) != Some("secret") {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid API key" })))
                .into_response();
        }
        match (id.as_str(), query.get("year").map(String::as_str)) {
            ("123", None) => Json(json!({
                "dashboardData": { "metrics": { "totalIncome": 10 } },
                "availableYears": ["2024", "2023"]
            }))
            .into_response(),
            ("123", Some("2023")) => {
                Json(json!({ "metrics": { "totalIncome": 23 } })).into_response()
            }
            ("broken", _) => (StatusCode::BAD_GATEWAY, "upstream exploded").into_response(),
            ("garbled", _) => "not json at all".into_response(),
            _ => (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response(),
        }
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api/dashboard", addr)
    }

    fn client(endpoint: String, api_key: Option<&str>) -> HttpReportClient {
        HttpReportClient::new(ReportConfig {
            endpoint,
            api_key: api_key.map(str::to_string),
        })
    }

    fn entity(id: &str) -> EntityId {
        crate::domain::identity::resolve_identity(
            &crate::domain::identity::NavigationContext::parse(&format!("?id={id}")),
            "id",
        )
        .unwrap()
    }

    #[test]
    fn test_build_url() {
        let client = client("https://api.example.com/dashboard/".to_string(), Some("k"));
        assert_eq!(
            client.build_url(&entity("123"), None),
            "https://api.example.com/dashboard/123"
        );
        assert_eq!(
            client.build_url(&entity("a%20b"), Some(&Period::from("2023"))),
            "https://api.example.com/dashboard/a%20b?year=2023"
        );
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_request() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new().route(
            "/api/dashboard/:id",
            get({
                let hits = hits.clone();
                move || {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        Json(json!({ "metrics": {} }))
                    }
                }
            }),
        );
        let endpoint = serve(router).await;

        for key in [None, Some(""), Some("  ")] {
            let err = client(endpoint.clone(), key)
                .fetch(&entity("123"), None)
                .await
                .unwrap_err();
            assert!(matches!(err, FetchError::Configuration(_)));
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_enveloped_and_flat_responses() {
        let endpoint = serve(Router::new().route("/api/dashboard/:id", get(report))).await;
        let client = client(endpoint, Some("secret"));

        let initial = client.fetch(&entity("123"), None).await.unwrap();
        assert_eq!(
            initial.available_periods(),
            Some([Period::from("2024"), Period::from("2023")].as_slice())
        );

        let yearly = client
            .fetch(&entity("123"), Some(&Period::from("2023")))
            .await
            .unwrap();
        assert!(matches!(yearly, RawResponse::Flat(_)));
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let endpoint = serve(Router::new().route("/api/dashboard/:id", get(report))).await;

        let err = client(endpoint.clone(), Some("secret"))
            .fetch(&entity("999"), None)
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Request("Not found".to_string()));

        let err = client(endpoint, Some("wrong"))
            .fetch(&entity("123"), None)
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Request("Invalid API key".to_string()));
    }

    #[tokio::test]
    async fn test_unparseable_error_body_falls_back_to_status() {
        let endpoint = serve(Router::new().route("/api/dashboard/:id", get(report))).await;

        let err = client(endpoint, Some("secret"))
            .fetch(&entity("broken"), None)
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Request("request failed with status 502".to_string()));
    }

    #[tokio::test]
    async fn test_garbled_success_body_is_malformed() {
        let endpoint = serve(Router::new().route("/api/dashboard/:id", get(report))).await;

        let err = client(endpoint, Some("secret"))
            .fetch(&entity("garbled"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{}/api/dashboard", addr), Some("secret"))
            .fetch(&entity("123"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
