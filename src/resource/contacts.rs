use crate::error::Result;
use crate::resource::paging::Paged;
use crate::resource::store::ResourceStore;
use serde_json::Value;

/// Field linking a contact association back to its component.
const LINK_FIELD: &str = "component";

/// Which component the contacts belong to. Release components are scoped by
/// their release as well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactScope {
    Global { component: String },
    Release { component: String, release: String },
}

impl ContactScope {
    fn query(&self) -> Vec<(String, String)> {
        match self {
            ContactScope::Global { component } => vec![("component".into(), component.clone())],
            ContactScope::Release { component, release } => vec![
                ("component".into(), component.clone()),
                ("release".into(), release.clone()),
            ],
        }
    }
}

/// Fetches every contact association in `scope`, across all pages.
pub async fn fetch_contacts<S: ResourceStore + ?Sized>(
    store: &S,
    endpoint: &str,
    scope: &ContactScope,
) -> Result<Vec<Value>> {
    Paged::new(store, endpoint, scope.query()).try_collect().await
}

/// Attaches `contacts` to `resource` for display, dropping the link field
/// from each association. An empty list adds no `contacts` key.
pub fn merge_contacts(mut resource: Value, contacts: Vec<Value>) -> Value {
    if contacts.is_empty() {
        return resource;
    }
    let contacts: Vec<Value> = contacts
        .into_iter()
        .map(|mut contact| {
            if let Value::Object(map) = &mut contact {
                map.remove(LINK_FIELD);
            }
            contact
        })
        .collect();
    if let Value::Object(map) = &mut resource {
        map.insert("contacts".into(), Value::Array(contacts));
    }
    resource
}
