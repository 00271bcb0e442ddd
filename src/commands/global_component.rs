use crate::commands::{
    apply_update, contact_lines, create_record, record_str, require_identity, with_contacts,
};
use crate::error::Result;
use crate::output::{self, Columns, Detail, Format};
use crate::resource::{
    build_update_payload, list_resources, ContactScope, FieldArgs, FieldSet, FieldSpec,
    FieldTable, ListQuery, NaturalKey, ResourceId, ResourceStore,
};
use clap::Subcommand;
use serde_json::Value;

pub const ENDPOINT: &str = "global-components";
pub const CONTACTS_ENDPOINT: &str = "global-component-contacts";

const UPSTREAM: &str = "Upstream (optional)";

#[derive(Debug)]
pub struct CreateFields;

impl FieldTable for CreateFields {
    const SPECS: &'static [FieldSpec] = &[
        FieldSpec::required("name"),
        FieldSpec::optional("dist_git_path"),
        FieldSpec::optional("upstream.homepage").flag("homepage").heading(UPSTREAM),
        FieldSpec::optional("upstream.scm_type").flag("scm-type").heading(UPSTREAM),
        FieldSpec::optional("upstream.scm_url").flag("scm-url").heading(UPSTREAM),
    ];
}

#[derive(Debug)]
pub struct UpdateFields;

impl FieldTable for UpdateFields {
    const SPECS: &'static [FieldSpec] = &[
        FieldSpec::optional("name"),
        FieldSpec::optional("dist_git_path"),
        FieldSpec::optional("upstream.homepage").flag("homepage").heading(UPSTREAM),
        FieldSpec::optional("upstream.scm_type").flag("scm-type").heading(UPSTREAM),
        FieldSpec::optional("upstream.scm_url").flag("scm-url").heading(UPSTREAM),
    ];
}

#[derive(Debug)]
pub struct ListFilters;

impl FieldTable for ListFilters {
    const SPECS: &'static [FieldSpec] = &[
        FieldSpec::optional("dist_git_path"),
        FieldSpec::optional("label"),
        FieldSpec::optional("name"),
        FieldSpec::optional("upstream_homepage"),
        FieldSpec::optional("upstream_scm_type"),
        FieldSpec::optional("upstream_scm_url"),
    ];
}

#[derive(Subcommand, Debug)]
pub enum GlobalComponentCommand {
    /// List global components matching the given filters
    #[command(long_about = "List global components.\n\n\
        At least one filter is required.\n\n\
        Examples:\n\
        pdc global-component list --name bash\n\
        pdc global-component list --upstream-scm-type git --format table")]
    List {
        #[command(flatten)]
        filters: FieldArgs<ListFilters>,
    },
    /// Display details of a global component
    #[command(long_about = "Display a global component together with its contacts.\n\n\
        Example:\n\
        pdc global-component info bash")]
    Info {
        /// Global component name
        #[arg(value_name = "GLOBAL_COMPONENT_NAME")]
        name: String,
    },
    /// Create a new global component
    #[command(long_about = "Create a global component.\n\n\
        Required:\n\
          --name            Component name\n\n\
        Example:\n\
        pdc global-component create --name bash --homepage https://www.gnu.org/software/bash/ \\\n\
          --scm-type git --scm-url https://git.savannah.gnu.org/git/bash.git")]
    Create {
        #[command(flatten)]
        fields: FieldArgs<CreateFields>,
    },
    /// Update an existing global component
    #[command(long_about = "Update a global component by name.\n\n\
        Only the flags you pass are changed. Pass an empty string to clear a field.\n\n\
        Examples:\n\
        pdc global-component update bash --dist-git-path rpms/bash\n\
        pdc global-component update bash --homepage \"\"")]
    Update {
        /// Global component name
        #[arg(value_name = "GLOBAL_COMPONENT_NAME")]
        name: String,
        #[command(flatten)]
        fields: FieldArgs<UpdateFields>,
    },
}

pub async fn handle<S: ResourceStore + ?Sized>(
    cmd: GlobalComponentCommand,
    store: &S,
    format: &Format,
) -> Result<()> {
    match cmd {
        GlobalComponentCommand::List { filters } => {
            let query = ListQuery::from_fields(&filters.resolve());
            let mut records = list_resources(store, ENDPOINT, query)?;
            match format {
                Format::Table => {
                    let mut columns = Columns::new(&["ID", "Name"], &[10]);
                    while let Some(record) = records.next().await? {
                        columns.print_row(&[
                            output::text(&record["id"]),
                            output::text(&record["name"]),
                        ]);
                    }
                }
                _ => {
                    let all = records.try_collect().await?;
                    output::print_output(&Value::Array(all), format);
                }
            }
        }
        GlobalComponentCommand::Info { name } => {
            let id = require_identity(store, ENDPOINT, &NaturalKey::Name(name), "global component")
                .await?;
            show(store, id, format).await?;
        }
        GlobalComponentCommand::Create { fields } => {
            let id = create(store, &fields.resolve()).await?;
            show(store, id, format).await?;
        }
        GlobalComponentCommand::Update { name, fields } => {
            let id = update(store, &name, &fields.resolve()).await?;
            show(store, id, format).await?;
        }
    }
    Ok(())
}

pub async fn create<S: ResourceStore + ?Sized>(store: &S, fields: &FieldSet) -> Result<ResourceId> {
    create_record(store, ENDPOINT, fields, CreateFields::SPECS).await
}

/// Updates the component called `name` and returns its id.
pub async fn update<S: ResourceStore + ?Sized>(
    store: &S,
    name: &str,
    fields: &FieldSet,
) -> Result<ResourceId> {
    let changes = build_update_payload(fields)?;
    let id = require_identity(
        store,
        ENDPOINT,
        &NaturalKey::Name(name.to_owned()),
        "global component",
    )
    .await?;
    apply_update(store, ENDPOINT, id, changes).await?;
    Ok(id)
}

/// Fetches the component and attaches its contacts.
pub async fn info<S: ResourceStore + ?Sized>(store: &S, id: ResourceId) -> Result<Value> {
    let record = store.get(ENDPOINT, id, &[]).await?;
    let scope = ContactScope::Global {
        component: record_str(&record, "name")?.to_owned(),
    };
    with_contacts(store, record, CONTACTS_ENDPOINT, &scope).await
}

async fn show<S: ResourceStore + ?Sized>(store: &S, id: ResourceId, format: &Format) -> Result<()> {
    let record = info(store, id).await?;
    match format {
        Format::Table => output::print_lines(&detail_lines(&record)),
        _ => output::print_output(&record, format),
    }
    Ok(())
}

fn detail_lines(record: &Value) -> Vec<String> {
    let labels = record["labels"]
        .as_array()
        .map(|labels| labels.iter().map(|l| output::text(&l["name"])).collect())
        .unwrap_or_default();
    let upstream = match record["upstream"].as_object() {
        Some(upstream) => ["homepage", "scm_type", "scm_url"]
            .iter()
            .map(|key| {
                let value = upstream.get(*key).unwrap_or(&Value::Null);
                format!("{key}:\t{}", output::text(value))
            })
            .collect(),
        None => Vec::new(),
    };
    Detail::new()
        .field("ID", output::text(&record["id"]))
        .field("Name", output::text(&record["name"]))
        .field("Dist Git Path", output::text(&record["dist_git_path"]))
        .field("Dist Git URL", output::text(&record["dist_git_web_url"]))
        .section("Labels", labels)
        .section("Upstream", upstream)
        .section("Contacts", contact_lines(record))
        .into_lines()
}
