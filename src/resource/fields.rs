//! Declarative field tables and the resolver that turns supplied command-line
//! flags into dotted field paths.
//!
//! A resource command declares its settable attributes as a static table of
//! [`FieldSpec`]s. [`FieldArgs`] renders that table as clap arguments and
//! collects whatever the user actually typed; [`resolve_fields`] then maps the
//! collected flags onto their dotted paths. Flags the user did not pass never
//! show up in the result.

use clap::{Arg, ArgAction, ArgMatches, Args, Command, FromArgMatches};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Flag name (without leading dashes) to the raw value typed by the user.
pub type RawArgs = BTreeMap<String, String>;

/// One settable attribute of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Dotted path; each component is one nesting level of the payload.
    pub path: &'static str,
    pub required: bool,
    /// Long flag override. Defaults to the path with `.` and `_` as `-`.
    pub flag: Option<&'static str>,
    pub heading: Option<&'static str>,
}

impl FieldSpec {
    pub const fn optional(path: &'static str) -> Self {
        Self {
            path,
            required: false,
            flag: None,
            heading: None,
        }
    }

    pub const fn required(path: &'static str) -> Self {
        Self {
            path,
            required: true,
            flag: None,
            heading: None,
        }
    }

    pub const fn flag(mut self, flag: &'static str) -> Self {
        self.flag = Some(flag);
        self
    }

    pub const fn heading(mut self, heading: &'static str) -> Self {
        self.heading = Some(heading);
        self
    }

    pub fn flag_name(&self) -> String {
        match self.flag {
            Some(flag) => flag.to_owned(),
            None => self.path.replace(['.', '_'], "-"),
        }
    }

    fn arg_id(&self) -> String {
        format!("field:{}", self.path)
    }

    fn to_arg(self) -> Arg {
        let leaf = self.path.rsplit('.').next().unwrap_or(self.path);
        let mut help = format!("Set `{}`", self.path);
        if self.required {
            help.push_str(" (required)");
        }
        let mut arg = Arg::new(self.arg_id())
            .long(self.flag_name())
            .value_name(leaf.to_uppercase())
            .help(help)
            .action(ArgAction::Set);
        if let Some(heading) = self.heading {
            arg = arg.help_heading(heading);
        }
        arg
    }
}

/// A static table of field specifications, one per resource action.
pub trait FieldTable {
    const SPECS: &'static [FieldSpec];
}

/// clap arguments generated from a [`FieldTable`]. Flatten into a subcommand
/// with `#[command(flatten)]`.
pub struct FieldArgs<T> {
    raw: RawArgs,
    _table: PhantomData<T>,
}

impl<T: FieldTable> FieldArgs<T> {
    pub fn new(raw: RawArgs) -> Self {
        Self {
            raw,
            _table: PhantomData,
        }
    }

    #[cfg(test)]
    pub fn raw(&self) -> &RawArgs {
        &self.raw
    }

    pub fn resolve(&self) -> FieldSet {
        resolve_fields(&self.raw, T::SPECS)
    }
}

impl<T> fmt::Debug for FieldArgs<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldArgs").field("raw", &self.raw).finish()
    }
}

impl<T: FieldTable> FromArgMatches for FieldArgs<T> {
    fn from_arg_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let mut raw = RawArgs::new();
        for spec in T::SPECS {
            if let Some(value) = matches.get_one::<String>(&spec.arg_id()) {
                raw.insert(spec.flag_name(), value.clone());
            }
        }
        Ok(Self::new(raw))
    }

    fn update_from_arg_matches(&mut self, matches: &ArgMatches) -> Result<(), clap::Error> {
        *self = Self::from_arg_matches(matches)?;
        Ok(())
    }
}

impl<T: FieldTable> Args for FieldArgs<T> {
    fn augment_args(cmd: Command) -> Command {
        T::SPECS
            .iter()
            .fold(cmd, |cmd, spec| cmd.arg(spec.to_arg()))
    }

    fn augment_args_for_update(cmd: Command) -> Command {
        Self::augment_args(cmd)
    }
}

/// Dotted path to the value the user supplied for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet(BTreeMap<String, Value>);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(path.into(), value.into());
    }

    /// Tri-state flag: `None` leaves the path absent.
    pub fn set_toggle(&mut self, path: &str, toggle: Option<bool>) {
        if let Some(on) = toggle {
            self.insert(path, on);
        }
    }

    #[cfg(test)]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.0.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// Keeps only the flags that were supplied, keyed by their dotted path.
/// Values pass through untouched.
pub fn resolve_fields(raw: &RawArgs, specs: &[FieldSpec]) -> FieldSet {
    let mut fields = FieldSet::new();
    for spec in specs {
        if let Some(value) = raw.get(&spec.flag_name()) {
            fields.insert(spec.path, value.as_str());
        }
    }
    fields
}
