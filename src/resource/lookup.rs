use crate::error::{CliError, Result};
use crate::resource::fields::FieldSet;
use crate::resource::paging::Paged;
use crate::resource::store::{Query, ResourceId, ResourceStore};
use serde_json::Value;

/// Human-given key of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NaturalKey {
    Name(String),
    Release { release: String, name: String },
}

impl NaturalKey {
    fn query(&self) -> Query {
        match self {
            NaturalKey::Name(name) => vec![("name".into(), name.clone())],
            NaturalKey::Release { release, name } => vec![
                ("name".into(), name.clone()),
                ("release".into(), release.clone()),
            ],
        }
    }
}

/// Resolves `key` to the server id. Returns `None` when nothing matches.
///
/// Natural keys are not guaranteed unique: when several records match, the
/// first one in server order wins.
// TODO: decide whether an ambiguous match should become an error instead.
pub async fn resolve_identity<S: ResourceStore + ?Sized>(
    store: &S,
    endpoint: &str,
    key: &NaturalKey,
) -> Result<Option<ResourceId>> {
    let page = store.fetch_page(endpoint, &key.query()).await?;
    if page.count == 0 {
        return Ok(None);
    }
    if page.count > 1 {
        tracing::debug!(
            endpoint,
            ?key,
            matches = page.count,
            "natural key is ambiguous, using first match"
        );
    }
    let Some(first) = page.results.first() else {
        return Ok(None);
    };
    first
        .get("id")
        .and_then(Value::as_i64)
        .map(Some)
        .ok_or_else(|| CliError::InvalidInput(format!("{endpoint} record without an integer id")))
}

/// Filters and options for a list call. Options travel with the query but do
/// not satisfy the filter requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    filters: Query,
    options: Query,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes every supplied field as a filter. Booleans are sent as
    /// `true`/`false`.
    pub fn from_fields(fields: &FieldSet) -> Self {
        let mut query = Self::new();
        for (key, value) in fields.iter() {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            query.filters.push((key.clone(), value));
        }
        query
    }

    #[cfg(test)]
    pub fn filter(mut self, key: &str, value: impl Into<String>) -> Self {
        self.filters.push((key.to_owned(), value.into()));
        self
    }

    pub fn option(mut self, key: &str, value: impl Into<String>) -> Self {
        self.options.push((key.to_owned(), value.into()));
        self
    }

    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    fn into_query(self) -> Query {
        let mut query = self.filters;
        query.extend(self.options);
        query
    }
}

/// Lists every record matching `query`. An unfiltered list is refused before
/// anything is sent.
pub fn list_resources<'a, S: ResourceStore + ?Sized>(
    store: &'a S,
    endpoint: &str,
    query: ListQuery,
) -> Result<Paged<'a, S>> {
    if !query.has_filters() {
        return Err(CliError::FilterRequired);
    }
    Ok(Paged::new(store, endpoint, query.into_query()))
}
