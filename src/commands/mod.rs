pub mod config_cmd;
pub mod global_component;
pub mod release_component;

use crate::error::{CliError, Result};
use crate::resource::{
    build_create_payload, fetch_contacts, merge_contacts, resolve_identity, ContactScope,
    FieldSet, FieldSpec, NaturalKey, ResourceId, ResourceStore, UpdatePayload,
};
use serde_json::Value;

/// Resolves `key`, turning "no match" into a user-facing error.
pub async fn require_identity<S: ResourceStore + ?Sized>(
    store: &S,
    endpoint: &str,
    key: &NaturalKey,
    what: &str,
) -> Result<ResourceId> {
    resolve_identity(store, endpoint, key)
        .await?
        .ok_or_else(|| CliError::NotFound(format!("This {what} doesn't exist.")))
}

/// Sends `fields` as a new record and returns the id the server assigned.
/// Missing required fields fail before anything is sent.
pub async fn create_record<S: ResourceStore + ?Sized>(
    store: &S,
    endpoint: &str,
    fields: &FieldSet,
    specs: &[FieldSpec],
) -> Result<ResourceId> {
    let payload = build_create_payload(fields, specs)?;
    tracing::debug!(endpoint, ?payload, "creating record");
    let created = store.create(endpoint, &payload).await?;
    record_id(&created)
}

/// Applies a prebuilt update. A no-op skips the request entirely.
pub async fn apply_update<S: ResourceStore + ?Sized>(
    store: &S,
    endpoint: &str,
    id: ResourceId,
    update: UpdatePayload,
) -> Result<()> {
    match update {
        UpdatePayload::NoOp => {
            tracing::debug!(endpoint, id, "empty data, skipping request");
        }
        UpdatePayload::Changes(payload) => {
            tracing::debug!(endpoint, id, ?payload, "updating record");
            store.update(endpoint, id, &payload).await?;
        }
    }
    Ok(())
}

/// Fetches the contacts in `scope` and attaches them to `record`.
pub async fn with_contacts<S: ResourceStore + ?Sized>(
    store: &S,
    record: Value,
    contacts_endpoint: &str,
    scope: &ContactScope,
) -> Result<Value> {
    let contacts = fetch_contacts(store, contacts_endpoint, scope).await?;
    Ok(merge_contacts(record, contacts))
}

pub fn record_id(record: &Value) -> Result<ResourceId> {
    record
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| CliError::InvalidInput("server returned a record without an id".into()))
}

pub fn record_str<'a>(record: &'a Value, field: &str) -> Result<&'a str> {
    record
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            CliError::InvalidInput(format!("server returned a record without `{field}`"))
        })
}

/// Table lines for the `contacts` list attached by [`with_contacts`].
pub fn contact_lines(record: &Value) -> Vec<String> {
    let Some(contacts) = record.get("contacts").and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut lines = Vec::new();
    for entry in contacts {
        lines.push(format!("Role:\t{}", crate::output::text(&entry["role"])));
        let contact = &entry["contact"];
        for name in ["username", "mail_name"] {
            if let Some(value) = contact.get(name) {
                lines.push(format!("\tName:\t{}", crate::output::text(value)));
            }
        }
        lines.push(format!("\tEmail:\t{}", crate::output::text(&contact["email"])));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::store::fake::{Call, FakeStore};
    use serde_json::json;

    #[tokio::test]
    async fn test_require_identity_not_found() {
        let store = FakeStore::new();
        let err = require_identity(
            &store,
            "global-components",
            &NaturalKey::Name("nope".into()),
            "global component",
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "This global component doesn't exist.");
    }

    #[tokio::test]
    async fn test_noop_update_sends_nothing() {
        let store = FakeStore::new();
        apply_update(&store, "global-components", 4, UpdatePayload::NoOp)
            .await
            .unwrap();
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_missing_field_sends_nothing() {
        let store = FakeStore::new();
        let specs = [FieldSpec::required("name"), FieldSpec::required("release")];
        let mut fields = FieldSet::new();
        fields.insert("name", "bash");
        let result = create_record(&store, "release-components", &fields, &specs).await;
        assert!(matches!(result, Err(CliError::MissingRequiredFields(_))));
        assert!(store.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_returns_new_id() {
        let store = FakeStore::new();
        let mut fields = FieldSet::new();
        fields.insert("name", "bash");
        let id = create_record(&store, "global-components", &fields, &[FieldSpec::required("name")])
            .await
            .unwrap();
        assert_eq!(id, 1);
        assert!(matches!(
            &store.calls().await[0],
            Call::Create(endpoint, _) if endpoint == "global-components"
        ));
    }

    #[test]
    fn test_contact_lines() {
        let record = json!({
            "contacts": [
                {"role": "owner", "contact": {"username": "alice", "email": "alice@example.com"}},
                {"role": "qe", "contact": {"mail_name": "qe-list", "email": "qe@example.com"}}
            ]
        });
        assert_eq!(
            contact_lines(&record),
            vec![
                "Role:\towner",
                "\tName:\talice",
                "\tEmail:\talice@example.com",
                "Role:\tqe",
                "\tName:\tqe-list",
                "\tEmail:\tqe@example.com",
            ]
        );
        assert!(contact_lines(&json!({"id": 1})).is_empty());
    }
}
