use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Server-assigned identifier of a resource.
pub type ResourceId = i64;

/// Query parameters as sent to the store, in order.
pub type Query = Vec<(String, String)>;

/// Partial payload for create/update calls.
pub type Payload = Map<String, Value>;

/// One page of a list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub next: Option<String>,
}

impl Page {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// The remote resource store. Every operation receives the handle explicitly;
/// its lifecycle belongs to the caller.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn fetch_page(&self, endpoint: &str, query: &[(String, String)]) -> Result<Page>;

    async fn create(&self, endpoint: &str, payload: &Payload) -> Result<Value>;

    /// Partial update: fields missing from `payload` are preserved server-side.
    async fn update(&self, endpoint: &str, id: ResourceId, payload: &Payload) -> Result<Value>;

    async fn get(&self, endpoint: &str, id: ResourceId, query: &[(String, String)])
        -> Result<Value>;
}

/// In-memory store used by unit tests. Pages are served in order for any
/// `fetch_page` on an endpoint; every call is recorded.
#[cfg(test)]
pub mod fake {
    use super::*;
    use crate::error::CliError;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        FetchPage(String, Query),
        Create(String, Payload),
        Update(String, ResourceId, Payload),
        Get(String, ResourceId, Query),
    }

    #[derive(Default)]
    pub struct FakeStore {
        pages: HashMap<String, Vec<Page>>,
        records: HashMap<(String, ResourceId), Value>,
        failing_page: Option<(String, u32)>,
        pub calls: Mutex<Vec<Call>>,
    }

    impl FakeStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Serves `batches` as consecutive pages of `endpoint`.
        pub fn with_pages(mut self, endpoint: &str, batches: Vec<Vec<Value>>) -> Self {
            let count = batches.iter().map(Vec::len).sum::<usize>() as u64;
            let total = batches.len();
            let pages = batches
                .into_iter()
                .enumerate()
                .map(|(i, results)| Page {
                    count,
                    results,
                    next: (i + 1 < total).then(|| format!("{endpoint}/?page={}", i + 2)),
                })
                .collect();
            self.pages.insert(endpoint.to_owned(), pages);
            self
        }

        pub fn with_record(mut self, endpoint: &str, id: ResourceId, record: Value) -> Self {
            self.records.insert((endpoint.to_owned(), id), record);
            self
        }

        pub fn failing_on_page(mut self, endpoint: &str, page: u32) -> Self {
            self.failing_page = Some((endpoint.to_owned(), page));
            self
        }

        pub async fn calls(&self) -> Vec<Call> {
            self.calls.lock().await.clone()
        }
    }

    fn page_number(query: &[(String, String)]) -> u32 {
        query
            .iter()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(1)
    }

    #[async_trait]
    impl ResourceStore for FakeStore {
        async fn fetch_page(&self, endpoint: &str, query: &[(String, String)]) -> Result<Page> {
            self.calls
                .lock()
                .await
                .push(Call::FetchPage(endpoint.to_owned(), query.to_vec()));
            let page = page_number(query);
            if let Some((failing, n)) = &self.failing_page {
                if failing == endpoint && *n == page {
                    return Err(CliError::Api {
                        status: 500,
                        detail: "boom".into(),
                    });
                }
            }
            Ok(self
                .pages
                .get(endpoint)
                .and_then(|pages| pages.get((page as usize).saturating_sub(1)))
                .cloned()
                .unwrap_or_default())
        }

        async fn create(&self, endpoint: &str, payload: &Payload) -> Result<Value> {
            self.calls
                .lock()
                .await
                .push(Call::Create(endpoint.to_owned(), payload.clone()));
            let mut created = payload.clone();
            created.insert("id".into(), Value::from(1));
            Ok(Value::Object(created))
        }

        async fn update(
            &self,
            endpoint: &str,
            id: ResourceId,
            payload: &Payload,
        ) -> Result<Value> {
            self.calls
                .lock()
                .await
                .push(Call::Update(endpoint.to_owned(), id, payload.clone()));
            Ok(Value::Object(payload.clone()))
        }

        async fn get(
            &self,
            endpoint: &str,
            id: ResourceId,
            query: &[(String, String)],
        ) -> Result<Value> {
            self.calls
                .lock()
                .await
                .push(Call::Get(endpoint.to_owned(), id, query.to_vec()));
            self.records
                .get(&(endpoint.to_owned(), id))
                .cloned()
                .ok_or_else(|| CliError::Api {
                    status: 404,
                    detail: "Not found.".into(),
                })
        }
    }
}
