use crate::error::Result;
use crate::resource::store::{Query, ResourceStore};
use serde_json::Value;
use std::collections::VecDeque;

/// Lazy cursor over every record of a paged list endpoint.
///
/// Pages are requested one at a time, only once the previous page's records
/// have all been handed out. Records come back in server order. An error ends
/// the sequence: later calls to [`Paged::next`] return `Ok(None)`.
pub struct Paged<'a, S: ?Sized> {
    store: &'a S,
    endpoint: String,
    query: Query,
    buffer: VecDeque<Value>,
    next_page: Option<u32>,
}

impl<'a, S: ResourceStore + ?Sized> Paged<'a, S> {
    pub fn new(store: &'a S, endpoint: impl Into<String>, query: Query) -> Self {
        Self {
            store,
            endpoint: endpoint.into(),
            query,
            buffer: VecDeque::new(),
            next_page: Some(1),
        }
    }

    pub async fn next(&mut self) -> Result<Option<Value>> {
        loop {
            if let Some(record) = self.buffer.pop_front() {
                return Ok(Some(record));
            }
            let Some(page) = self.next_page.take() else {
                return Ok(None);
            };
            self.fetch(page).await?;
        }
    }

    /// Drains the remaining records.
    pub async fn try_collect(mut self) -> Result<Vec<Value>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await? {
            records.push(record);
        }
        Ok(records)
    }

    async fn fetch(&mut self, page: u32) -> Result<()> {
        let mut query = self.query.clone();
        query.push(("page".into(), page.to_string()));
        tracing::debug!(endpoint = %self.endpoint, page, "fetching page");

        let response = self.store.fetch_page(&self.endpoint, &query).await?;
        if response.count == 0 {
            return Ok(());
        }
        if response.has_next() {
            self.next_page = Some(page + 1);
        }
        self.buffer.extend(response.results);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::store::fake::{Call, FakeStore};
    use serde_json::json;

    fn records(ids: &[i64]) -> Vec<Value> {
        ids.iter().map(|id| json!({"id": id})).collect()
    }

    fn ids(values: &[Value]) -> Vec<i64> {
        values.iter().filter_map(|v| v["id"].as_i64()).collect()
    }

    fn page_calls(calls: &[Call]) -> Vec<String> {
        calls
            .iter()
            .filter_map(|c| match c {
                Call::FetchPage(_, q) => {
                    q.iter().find(|(k, _)| k == "page").map(|(_, v)| v.clone())
                }
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_flattens_pages_in_order() {
        let store = FakeStore::new().with_pages(
            "global-components",
            vec![records(&[1, 2]), records(&[3, 4]), records(&[5])],
        );
        let query = vec![("name".to_string(), "bash".to_string())];
        let all = Paged::new(&store, "global-components", query)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(ids(&all), vec![1, 2, 3, 4, 5]);

        let calls = store.calls().await;
        assert_eq!(page_calls(&calls), vec!["1", "2", "3"]);
        assert!(matches!(
            &calls[0],
            Call::FetchPage(_, q) if q[0] == ("name".to_string(), "bash".to_string())
        ));
    }

    #[tokio::test]
    async fn test_prefix_consumption_fetches_fewer_pages() {
        let store = FakeStore::new()
            .with_pages("global-components", vec![records(&[1, 2]), records(&[3])]);
        let mut paged = Paged::new(&store, "global-components", Vec::new());

        assert_eq!(paged.next().await.unwrap(), Some(json!({"id": 1})));
        assert_eq!(paged.next().await.unwrap(), Some(json!({"id": 2})));
        assert_eq!(store.calls().await.len(), 1);

        assert_eq!(paged.next().await.unwrap(), Some(json!({"id": 3})));
        assert_eq!(store.calls().await.len(), 2);
        assert_eq!(paged.next().await.unwrap(), None);
        assert_eq!(store.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_nothing_fetched_until_first_next() {
        let store = FakeStore::new().with_pages("global-components", vec![records(&[1])]);
        let _paged = Paged::new(&store, "global-components", Vec::new());
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_result_set() {
        let store = FakeStore::new();
        let all = Paged::new(&store, "global-components", Vec::new())
            .try_collect()
            .await
            .unwrap();
        assert!(all.is_empty());
        assert_eq!(store.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_error_halts_sequence() {
        let store = FakeStore::new()
            .with_pages("global-components", vec![records(&[1]), records(&[2]), records(&[3])])
            .failing_on_page("global-components", 2);
        let mut paged = Paged::new(&store, "global-components", Vec::new());

        assert_eq!(paged.next().await.unwrap(), Some(json!({"id": 1})));
        assert!(paged.next().await.is_err());
        assert_eq!(paged.next().await.unwrap(), None);
        assert_eq!(page_calls(&store.calls().await), vec!["1", "2"]);
    }
}
