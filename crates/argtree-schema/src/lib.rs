//! JSON data model for argtree.
//!
//! A [`CommandSchema`] describes a command tree as plain data so it can be
//! kept in a file and loaded at runtime. [`CommandSchema::build_tree`] turns it
//! into a validated [`CommandTree`]; [`ResolutionReport`] is the serializable
//! view of a resolution.

mod report;

pub use report::{ArgReport, CommandReport, ErrorReport, ResolutionReport, value_to_json};

use argtree::convert::{self, Registry};
use argtree::{
    Argument, ArgumentGroup, Arity, BuildError, Command, CommandTree, Restriction, UsageCount,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid value count '{value}' for '{argument}': expected N, MIN..MAX or MIN..")]
    InvalidArity { argument: String, value: String },

    #[error("invalid usage count '{value}' for '{argument}': expected N, MIN..MAX or MIN..")]
    InvalidUsageCount { argument: String, value: String },

    #[error("invalid short flag '{value}' for '{argument}': expected a single character")]
    InvalidShort { argument: String, value: String },

    #[error("schema error: {0}")]
    Build(#[from] BuildError),
}

fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct ArgSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    /// Additional long names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_name: Option<String>,
    /// Shorthand for `values: "1"` on a flag.
    #[serde(default)]
    pub takes_value: bool,
    /// Values per occurrence: `"2"`, `"0..1"` or `"1.."`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub multiple: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub possible_values: Vec<String>,
    /// Times the argument may be given: `"2"`, `"1..3"` or `"2.."`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<String>,
    /// Given alone, it excuses missing required arguments and groups.
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub forward: bool,
    #[serde(default)]
    pub hidden: bool,
}

impl Default for ArgSchema {
    fn default() -> Self {
        Self {
            name: String::new(),
            short: None,
            long: None,
            aliases: Vec::new(),
            help: String::new(),
            required: false,
            default_value: None,
            value_name: None,
            takes_value: false,
            values: None,
            value_type: None,
            multiple: true,
            possible_values: Vec::new(),
            usage_count: None,
            unique: false,
            forward: false,
            hidden: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum RestrictionSchema {
    #[default]
    None,
    ExactlyOne,
    AtLeastOne,
    All,
}

impl From<RestrictionSchema> for Restriction {
    fn from(value: RestrictionSchema) -> Self {
        match value {
            RestrictionSchema::None => Restriction::None,
            RestrictionSchema::ExactlyOne => Restriction::ExactlyOne,
            RestrictionSchema::AtLeastOne => Restriction::AtLeastOne,
            RestrictionSchema::All => Restriction::All,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct GroupSchema {
    pub name: String,
    #[serde(default)]
    pub restriction: RestrictionSchema,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct CommandSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub about: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<ArgSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandSchema>,
}

/// Parse `"N"`, `"MIN..MAX"` or `"MIN.."`.
pub fn parse_arity(text: &str) -> Option<Arity> {
    let text = text.trim();
    match text.split_once("..") {
        None => text.parse().ok().map(Arity::exactly),
        Some((min, "")) => min.trim().parse().ok().map(Arity::at_least),
        Some((min, max)) => {
            let min = min.trim().parse().ok()?;
            let max = max.trim().parse().ok()?;
            Some(Arity::range(min, max))
        }
    }
}

/// Same forms as [`parse_arity`], read as occurrence counts.
pub fn parse_usage_count(text: &str) -> Option<UsageCount> {
    let arity = parse_arity(text)?;
    Some(match arity.max() {
        Some(max) => UsageCount::range(arity.min(), max),
        None => UsageCount::at_least(arity.min()),
    })
}

impl ArgSchema {
    fn is_positional(&self) -> bool {
        self.short.is_none() && self.long.is_none() && self.aliases.is_empty()
    }

    /// Convert into a builder argument, registering a choice converter in
    /// `registry` when `possible-values` is set.
    pub fn to_argument(&self, registry: &mut Registry) -> Result<Argument, SchemaError> {
        let explicit_arity = match &self.values {
            Some(text) => Some(parse_arity(text).ok_or_else(|| SchemaError::InvalidArity {
                argument: self.name.clone(),
                value: text.clone(),
            })?),
            None => None,
        };

        let mut arg = if self.is_positional() {
            Argument::positional(&self.name)
        } else if self.takes_value || explicit_arity.is_some_and(|a| a.takes_values()) {
            Argument::new(&self.name, Arity::exactly(1), convert::STRING)
        } else {
            Argument::new(&self.name, Arity::NONE, convert::BOOL)
        };

        if let Some(short) = &self.short {
            let trimmed = short.trim().trim_start_matches('-');
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => arg = arg.short(c),
                _ => {
                    return Err(SchemaError::InvalidShort {
                        argument: self.name.clone(),
                        value: short.clone(),
                    });
                }
            }
        }
        if let Some(long) = &self.long {
            arg = arg.long(long);
        }
        for alias in &self.aliases {
            arg = arg.long(alias);
        }

        if let Some(arity) = explicit_arity {
            arg = arg.arity(arity);
        }
        if self.forward {
            arg = arg.forward();
        }

        if !self.possible_values.is_empty() {
            let tag = format!("one-of:{}", self.possible_values.join("|"));
            if !registry.contains(&tag) {
                registry.register(tag.clone(), convert::one_of(self.possible_values.iter().cloned()));
            }
            arg = arg.value_type(tag);
        } else if let Some(value_type) = &self.value_type {
            arg = arg.value_type(value_type);
        }

        if let Some(default) = &self.default_value {
            arg = arg.default_value(default);
        }
        if let Some(value_name) = &self.value_name {
            arg = arg.value_name(value_name);
        }
        if let Some(text) = &self.usage_count {
            let usage = parse_usage_count(text).ok_or_else(|| SchemaError::InvalidUsageCount {
                argument: self.name.clone(),
                value: text.clone(),
            })?;
            arg = arg.usage_count(usage);
        }

        Ok(arg
            .required(self.required)
            .multiple(self.multiple)
            .unique(self.unique)
            .help(&self.help)
            .hidden(self.hidden))
    }
}

impl GroupSchema {
    pub fn to_group(&self) -> ArgumentGroup {
        let mut group = ArgumentGroup::new(&self.name, self.restriction.into());
        for arg in &self.args {
            group = group.arg(arg);
        }
        for inner in &self.groups {
            group = group.group(inner.to_group());
        }
        group
    }
}

impl CommandSchema {
    /// Convert into a builder command. Choice converters are added to `registry`.
    pub fn to_command(&self, registry: &mut Registry) -> Result<Command, SchemaError> {
        let mut command = Command::new(&self.name).about(&self.about);
        for alias in &self.aliases {
            command = command.alias(alias);
        }
        for arg in &self.args {
            command = command.arg(arg.to_argument(registry)?);
        }
        for group in &self.groups {
            command = command.group(group.to_group());
        }
        for sub in &self.subcommands {
            command = command.subcommand(sub.to_command(registry)?);
        }
        Ok(command)
    }

    /// Build a validated tree using the built-in converters.
    pub fn build_tree(&self) -> Result<CommandTree, SchemaError> {
        self.build_tree_with(Registry::with_builtins())
    }

    pub fn build_tree_with(&self, mut registry: Registry) -> Result<CommandTree, SchemaError> {
        let root = self.to_command(&mut registry)?;
        let tree = CommandTree::build(root, registry)?;
        tracing::debug!(root = %self.name, commands = tree.len(), "schema loaded");
        Ok(tree)
    }

    /// Parse a schema from JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
