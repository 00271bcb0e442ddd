use crate::error::{ApiErrorResponse, CliError, Result};
use crate::resource::{Page, Payload, ResourceId, ResourceStore};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;

/// JSON-over-HTTP client for the PDC REST API.
pub struct PdcClient {
    http: reqwest::Client,
    server: String,
    token: Option<String>,
}

impl PdcClient {
    pub fn new(server: String, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            server: server.trim_end_matches('/').to_owned(),
            token,
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(ref token) = self.token {
            if let Ok(val) = HeaderValue::from_str(&format!("Token {token}")) {
                headers.insert(AUTHORIZATION, val);
            }
        }
        headers
    }

    fn collection_url(&self, endpoint: &str) -> String {
        format!("{}/{}/", self.server, endpoint)
    }

    fn record_url(&self, endpoint: &str, id: ResourceId) -> String {
        format!("{}/{}/{}/", self.server, endpoint, id)
    }

    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value> {
        let status = resp.status().as_u16();

        if status == 204 {
            return Ok(Value::Null);
        }

        let body = resp.text().await?;

        if status >= 400 {
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(ApiErrorResponse::into_message)
                .unwrap_or_else(|| {
                    if body.is_empty() {
                        "Request failed".into()
                    } else {
                        body.clone()
                    }
                });
            return Err(CliError::Api { status, detail });
        }

        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(CliError::from)
    }
}

#[async_trait]
impl ResourceStore for PdcClient {
    async fn fetch_page(&self, endpoint: &str, query: &[(String, String)]) -> Result<Page> {
        let resp = self
            .http
            .get(self.collection_url(endpoint))
            .headers(self.headers())
            .query(query)
            .send()
            .await?;
        let body = self.handle_response(resp).await?;
        serde_json::from_value(body).map_err(CliError::from)
    }

    async fn create(&self, endpoint: &str, payload: &Payload) -> Result<Value> {
        tracing::debug!(endpoint, ?payload, "POST");
        let resp = self
            .http
            .post(self.collection_url(endpoint))
            .headers(self.headers())
            .json(payload)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn update(&self, endpoint: &str, id: ResourceId, payload: &Payload) -> Result<Value> {
        tracing::debug!(endpoint, id, ?payload, "PATCH");
        let resp = self
            .http
            .patch(self.record_url(endpoint, id))
            .headers(self.headers())
            .json(payload)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn get(
        &self,
        endpoint: &str,
        id: ResourceId,
        query: &[(String, String)],
    ) -> Result<Value> {
        let resp = self
            .http
            .get(self.record_url(endpoint, id))
            .headers(self.headers())
            .query(query)
            .send()
            .await?;
        self.handle_response(resp).await
    }
}
