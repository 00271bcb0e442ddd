use crate::commands::{
    apply_update, contact_lines, create_record, record_str, require_identity, with_contacts,
};
use crate::error::{CliError, Result};
use crate::output::{self, Columns, Detail, Format};
use crate::resource::{
    build_update_payload, list_resources, ContactScope, FieldArgs, FieldSet, FieldSpec,
    FieldTable, ListQuery, NaturalKey, ResourceId, ResourceStore,
};
use clap::{Args, Subcommand};
use serde_json::Value;

pub const ENDPOINT: &str = "release-components";
pub const CONTACTS_ENDPOINT: &str = "release-component-contacts";

const INCLUDE_INACTIVE: &str = "include_inactive_release";

#[derive(Debug)]
pub struct CreateFields;

impl FieldTable for CreateFields {
    const SPECS: &'static [FieldSpec] = &[
        FieldSpec::required("name"),
        FieldSpec::required("release"),
        FieldSpec::required("global_component"),
        FieldSpec::optional("dist_git_branch"),
        FieldSpec::optional("bugzilla_component"),
        FieldSpec::optional("brew_package"),
        FieldSpec::optional("type"),
        FieldSpec::optional("srpm.name").flag("srpm-name"),
    ];
}

#[derive(Debug)]
pub struct UpdateFields;

impl FieldTable for UpdateFields {
    const SPECS: &'static [FieldSpec] = &[
        FieldSpec::optional("name"),
        FieldSpec::optional("global_component"),
        FieldSpec::optional("dist_git_branch"),
        FieldSpec::optional("bugzilla_component"),
        FieldSpec::optional("brew_package"),
        FieldSpec::optional("type"),
        FieldSpec::optional("srpm.name").flag("srpm-name"),
    ];
}

#[derive(Debug)]
pub struct ListFilters;

impl FieldTable for ListFilters {
    const SPECS: &'static [FieldSpec] = &[
        FieldSpec::optional("brew_package"),
        FieldSpec::optional("bugzilla_component"),
        FieldSpec::optional("global_component"),
        FieldSpec::optional("name"),
        FieldSpec::optional("release"),
        FieldSpec::optional("srpm_name"),
        FieldSpec::optional("type"),
    ];
}

/// `--activate` / `--deactivate`; neither leaves `active` untouched.
#[derive(Args, Debug, Default)]
pub struct ActivityArgs {
    /// Mark the release component active
    #[arg(long, conflicts_with = "deactivate")]
    pub activate: bool,
    /// Mark the release component inactive
    #[arg(long)]
    pub deactivate: bool,
}

impl ActivityArgs {
    pub fn toggle(&self) -> Option<bool> {
        toggle(self.activate, self.deactivate)
    }
}

/// `--active` / `--inactive` list filter.
#[derive(Args, Debug, Default)]
pub struct ActiveFilter {
    /// Show active release components
    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,
    /// Show inactive release components
    #[arg(long)]
    pub inactive: bool,
}

fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Subcommand, Debug)]
pub enum ReleaseComponentCommand {
    /// List release components matching the given filters
    #[command(long_about = "List release components.\n\n\
        At least one filter is required; --include-inactive-release alone is not a filter.\n\n\
        Examples:\n\
        pdc release-component list --release fedora-24 --active\n\
        pdc release-component list --global-component bash --include-inactive-release")]
    List {
        #[command(flatten)]
        filters: FieldArgs<ListFilters>,
        #[command(flatten)]
        activity: ActiveFilter,
        /// Show components in both active and inactive releases
        #[arg(long)]
        include_inactive_release: bool,
    },
    /// Display details of a release component
    #[command(long_about = "Display a release component together with its contacts.\n\n\
        Example:\n\
        pdc release-component info fedora-24 bash")]
    Info {
        /// Release ID
        release: String,
        /// Release component name
        name: String,
        /// Look the component up in inactive releases too
        #[arg(long)]
        include_inactive_release: bool,
    },
    /// Create a new release component
    #[command(long_about = "Create a release component.\n\n\
        Required:\n\
          --name               Component name\n\
          --release            Release ID\n\
          --global-component   Name of the global component\n\n\
        Example:\n\
        pdc release-component create --name bash --release fedora-24 \\\n\
          --global-component bash --type rpm --srpm-name bash --activate")]
    Create {
        #[command(flatten)]
        fields: FieldArgs<CreateFields>,
        #[command(flatten)]
        activity: ActivityArgs,
    },
    /// Update an existing release component
    #[command(long_about = "Update a release component identified by release and name.\n\n\
        Only the flags you pass are changed. Pass an empty string to clear a field.\n\
        --name renames the component.\n\n\
        Examples:\n\
        pdc release-component update fedora-24 bash --deactivate\n\
        pdc release-component update fedora-24 bash --brew-package bash --srpm-name bash")]
    Update {
        /// Release ID
        release: String,
        /// Release component name
        name: String,
        #[command(flatten)]
        fields: FieldArgs<UpdateFields>,
        #[command(flatten)]
        activity: ActivityArgs,
    },
}

pub async fn handle<S: ResourceStore + ?Sized>(
    cmd: ReleaseComponentCommand,
    store: &S,
    format: &Format,
) -> Result<()> {
    match cmd {
        ReleaseComponentCommand::List {
            filters,
            activity,
            include_inactive_release,
        } => {
            let mut fields = filters.resolve();
            fields.set_toggle("active", toggle(activity.active, activity.inactive));
            let mut query = ListQuery::from_fields(&fields);
            if include_inactive_release {
                query = query.option(INCLUDE_INACTIVE, "true");
            }
            let mut records = list_resources(store, ENDPOINT, query)?;
            match format {
                Format::Table => {
                    let mut columns = Columns::new(&["ID", "Release_ID", "Name"], &[10, 25]);
                    while let Some(record) = records.next().await? {
                        columns.print_row(&[
                            output::text(&record["id"]),
                            release_label(&record),
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
        ReleaseComponentCommand::Info {
            release,
            name,
            include_inactive_release,
        } => {
            let id = require_identity(
                store,
                ENDPOINT,
                &NaturalKey::Release { release, name },
                "release component",
            )
            .await?;
            show(store, id, include_inactive_release, format).await?;
        }
        ReleaseComponentCommand::Create { fields, activity } => {
            let mut fields = fields.resolve();
            fields.set_toggle("active", activity.toggle());
            let id = create(store, &fields).await?;
            show(store, id, false, format).await?;
        }
        ReleaseComponentCommand::Update {
            release,
            name,
            fields,
            activity,
        } => {
            let mut fields = fields.resolve();
            fields.set_toggle("active", activity.toggle());
            let id = update(store, NaturalKey::Release { release, name }, &fields).await?;
            show(store, id, false, format).await?;
        }
    }
    Ok(())
}

pub async fn create<S: ResourceStore + ?Sized>(store: &S, fields: &FieldSet) -> Result<ResourceId> {
    create_record(store, ENDPOINT, fields, CreateFields::SPECS).await
}

/// Updates the component identified by `key` and returns its id.
pub async fn update<S: ResourceStore + ?Sized>(
    store: &S,
    key: NaturalKey,
    fields: &FieldSet,
) -> Result<ResourceId> {
    let changes = build_update_payload(fields)?;
    let id = require_identity(store, ENDPOINT, &key, "release component").await?;
    apply_update(store, ENDPOINT, id, changes).await?;
    Ok(id)
}

/// Fetches the component and attaches the contacts scoped to its release.
pub async fn info<S: ResourceStore + ?Sized>(
    store: &S,
    id: ResourceId,
    include_inactive_release: bool,
) -> Result<Value> {
    let query = if include_inactive_release {
        vec![(INCLUDE_INACTIVE.to_owned(), "true".to_owned())]
    } else {
        Vec::new()
    };
    let record = store.get(ENDPOINT, id, &query).await?;
    let release = record
        .get("release")
        .and_then(|r| r.get("release_id"))
        .and_then(Value::as_str)
        .ok_or_else(|| CliError::InvalidInput("release component without a release".into()))?;
    let scope = ContactScope::Release {
        component: record_str(&record, "name")?.to_owned(),
        release: release.to_owned(),
    };
    with_contacts(store, record, CONTACTS_ENDPOINT, &scope).await
}

async fn show<S: ResourceStore + ?Sized>(
    store: &S,
    id: ResourceId,
    include_inactive_release: bool,
    format: &Format,
) -> Result<()> {
    let record = info(store, id, include_inactive_release).await?;
    match format {
        Format::Table => output::print_lines(&detail_lines(&record)),
        _ => output::print_output(&record, format),
    }
    Ok(())
}

/// Release id for display, marked when the release is inactive.
fn release_label(record: &Value) -> String {
    let release = &record["release"];
    let release_id = output::text(&release["release_id"]);
    if release["active"].as_bool().unwrap_or(true) {
        release_id
    } else {
        format!("{release_id} (inactive)")
    }
}

fn detail_lines(record: &Value) -> Vec<String> {
    let activity = if record["active"].as_bool().unwrap_or(false) {
        "active"
    } else {
        "inactive"
    };
    let srpm = match record["srpm"].get("name") {
        Some(name) => output::text(name),
        None => "null".to_owned(),
    };
    Detail::new()
        .field("ID", output::text(&record["id"]))
        .field("Name", output::text(&record["name"]))
        .field("Release ID", release_label(record))
        .field("Global Component", output::text(&record["global_component"]))
        .field(
            "Bugzilla Component",
            output::text(&record["bugzilla_component"]["name"]),
        )
        .field("Brew Package", output::text(&record["brew_package"]))
        .field("Dist Git Branch", output::text(&record["dist_git_branch"]))
        .field("Dist Git URL", output::text(&record["dist_git_web_url"]))
        .field("Activity", activity)
        .field("Type", output::text(&record["type"]))
        .field("Srpm Name", srpm)
        .section("Contacts", contact_lines(record))
        .into_lines()
}
