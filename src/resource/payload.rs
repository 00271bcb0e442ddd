use crate::error::{CliError, Result};
use crate::resource::fields::{FieldSet, FieldSpec};
use crate::resource::store::Payload;
use serde_json::{Map, Value};

/// Outcome of building an update payload.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdatePayload {
    /// Nothing was supplied; the update call must be skipped.
    NoOp,
    Changes(Payload),
}

/// Builds a create payload. Every required field missing from `fields` is
/// reported at once, by flag name.
pub fn build_create_payload(fields: &FieldSet, specs: &[FieldSpec]) -> Result<Payload> {
    let missing: Vec<String> = specs
        .iter()
        .filter(|spec| spec.required && !fields.contains(spec.path))
        .map(|spec| spec.flag_name())
        .collect();
    if !missing.is_empty() {
        return Err(CliError::MissingRequiredFields(missing));
    }
    nest(fields)
}

pub fn build_update_payload(fields: &FieldSet) -> Result<UpdatePayload> {
    if fields.is_empty() {
        return Ok(UpdatePayload::NoOp);
    }
    nest(fields).map(UpdatePayload::Changes)
}

/// Expands dotted paths into nested objects. Paths sharing a prefix land in
/// the same object. An empty string becomes `null`.
fn nest(fields: &FieldSet) -> Result<Payload> {
    let mut payload = Map::new();
    for (path, value) in fields.iter() {
        let value = match value {
            Value::String(s) if s.is_empty() => Value::Null,
            other => other.clone(),
        };
        insert_path(&mut payload, path, value)?;
    }
    Ok(payload)
}

fn insert_path(root: &mut Payload, path: &str, value: Value) -> Result<()> {
    let mut parts: Vec<&str> = path.split('.').collect();
    let leaf = parts.pop().unwrap_or(path);

    let mut node = root;
    for part in parts {
        let child = node
            .entry(part.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        node = match child {
            Value::Object(map) => map,
            _ => return Err(conflict(path)),
        };
    }
    if node.contains_key(leaf) {
        return Err(conflict(path));
    }
    node.insert(leaf.to_owned(), value);
    Ok(())
}

fn conflict(path: &str) -> CliError {
    CliError::InvalidInput(format!("field `{path}` conflicts with another supplied field"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RELEASE_COMPONENT: &[FieldSpec] = &[
        FieldSpec::required("name"),
        FieldSpec::required("release"),
        FieldSpec::required("global_component"),
        FieldSpec::optional("srpm.name"),
    ];

    fn fields(pairs: &[(&str, Value)]) -> FieldSet {
        let mut set = FieldSet::new();
        for (path, value) in pairs {
            set.insert(*path, value.clone());
        }
        set
    }

    #[test]
    fn test_disjoint_prefixes_each_nested() {
        let input = fields(&[
            ("name", json!("bash")),
            ("upstream.homepage", json!("https://gnu.org")),
            ("srpm.name", json!("bash-src")),
        ]);
        let payload = build_update_payload(&input).unwrap();
        assert_eq!(
            payload,
            UpdatePayload::Changes(
                json!({
                    "name": "bash",
                    "upstream": {"homepage": "https://gnu.org"},
                    "srpm": {"name": "bash-src"}
                })
                .as_object()
                .unwrap()
                .clone()
            )
        );
    }

    #[test]
    fn test_shared_prefix_merges_into_one_object() {
        let input = fields(&[
            ("upstream.homepage", json!("https://gnu.org")),
            ("upstream.scm_type", json!("git")),
            ("upstream.scm_url", json!("git://gnu.org/bash")),
        ]);
        let UpdatePayload::Changes(payload) = build_update_payload(&input).unwrap() else {
            panic!("expected changes");
        };
        assert_eq!(payload.len(), 1);
        assert_eq!(
            payload["upstream"],
            json!({
                "homepage": "https://gnu.org",
                "scm_type": "git",
                "scm_url": "git://gnu.org/bash"
            })
        );
    }

    #[test]
    fn test_create_missing_required_field() {
        let input = fields(&[("name", json!("bash")), ("global_component", json!("bash"))]);
        match build_create_payload(&input, RELEASE_COMPONENT) {
            Err(CliError::MissingRequiredFields(missing)) => {
                assert_eq!(missing, vec!["release".to_string()]);
            }
            other => panic!("expected missing field error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_reports_every_missing_field() {
        match build_create_payload(&FieldSet::new(), RELEASE_COMPONENT) {
            Err(CliError::MissingRequiredFields(missing)) => {
                assert_eq!(missing, vec!["name", "release", "global-component"]);
            }
            other => panic!("expected missing field error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_with_all_required() {
        let input = fields(&[
            ("name", json!("bash")),
            ("release", json!("fedora-24")),
            ("global_component", json!("bash")),
        ]);
        let payload = build_create_payload(&input, RELEASE_COMPONENT).unwrap();
        assert_eq!(payload.len(), 3);
        assert_eq!(payload["release"], json!("fedora-24"));
    }

    #[test]
    fn test_update_empty_is_noop() {
        assert_eq!(
            build_update_payload(&FieldSet::new()).unwrap(),
            UpdatePayload::NoOp
        );
    }

    #[test]
    fn test_empty_string_clears_field() {
        let input = fields(&[("dist_git_path", json!(""))]);
        let UpdatePayload::Changes(payload) = build_update_payload(&input).unwrap() else {
            panic!("expected changes");
        };
        assert_eq!(payload.get("dist_git_path"), Some(&Value::Null));
    }

    #[test]
    fn test_toggle_states() {
        let mut unset = FieldSet::new();
        unset.insert("name", "bash");
        unset.set_toggle("active", None);
        let UpdatePayload::Changes(payload) = build_update_payload(&unset).unwrap() else {
            panic!("expected changes");
        };
        assert!(!payload.contains_key("active"));

        for (toggle, expected) in [(true, json!(true)), (false, json!(false))] {
            let mut set = FieldSet::new();
            set.set_toggle("active", Some(toggle));
            let UpdatePayload::Changes(payload) = build_update_payload(&set).unwrap() else {
                panic!("expected changes");
            };
            assert_eq!(payload["active"], expected);
        }
    }

    #[test]
    fn test_leaf_and_branch_conflict() {
        let input = fields(&[("upstream", json!("x")), ("upstream.homepage", json!("y"))]);
        assert!(matches!(
            build_update_payload(&input),
            Err(CliError::InvalidInput(_))
        ));
    }
}
