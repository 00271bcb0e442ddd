//! Generic machinery shared by every resource command: field tables, partial
//! payloads, paging, identity lookup and contact merging.

pub mod contacts;
pub mod fields;
pub mod lookup;
pub mod paging;
pub mod payload;
pub mod store;

pub use contacts::{fetch_contacts, merge_contacts, ContactScope};
pub use fields::{FieldArgs, FieldSet, FieldSpec, FieldTable};
pub use lookup::{list_resources, resolve_identity, ListQuery, NaturalKey};
pub use payload::{build_create_payload, build_update_payload, UpdatePayload};
pub use store::{Page, Payload, ResourceId, ResourceStore};
