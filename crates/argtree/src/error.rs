use thiserror::Error;

use crate::tree::{Arity, CommandId, Restriction, UsageCount};

/// Construction-time failure: the declared tree itself is inconsistent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("command name cannot be empty")]
    EmptyCommandName,

    #[error("argument name cannot be empty in command '{command}'")]
    EmptyArgumentName { command: String },

    #[error("argument '{argument}' is defined twice in command '{command}'")]
    DuplicateArgument { command: String, argument: String },

    #[error("arg definition conflict in '{command}': {flag} maps to both '{first}' and '{second}'")]
    DuplicateFlag {
        command: String,
        flag: String,
        first: String,
        second: String,
    },

    #[error("subcommand conflict in '{command}': '{name}' maps to both '{first}' and '{second}'")]
    DuplicateSubcommand {
        command: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("invalid arity for '{argument}' in '{command}': min {min} is greater than max {max}")]
    InvalidArity {
        command: String,
        argument: String,
        min: usize,
        max: usize,
    },

    #[error("invalid flag name {flag} for '{argument}' in '{command}'")]
    InvalidFlagName {
        command: String,
        argument: String,
        flag: String,
    },

    #[error("argument '{argument}' in '{command}' uses unregistered value type '{value_type}'")]
    UnregisteredType {
        command: String,
        argument: String,
        value_type: String,
    },

    #[error("invalid default '{value}' for '{argument}' in '{command}': {reason}")]
    InvalidDefault {
        command: String,
        argument: String,
        value: String,
        reason: String,
    },

    #[error("forwarding argument '{argument}' in '{command}' must be an unbounded positional")]
    InvalidForwarding { command: String, argument: String },

    #[error("forwarding argument '{argument}' in '{command}' must be the last positional")]
    ForwardingNotLast { command: String, argument: String },

    #[error(
        "forwarding argument '{argument}' in '{command}' cannot follow unbounded positional '{previous}'"
    )]
    ForwardingAfterUnbounded {
        command: String,
        argument: String,
        previous: String,
    },

    #[error("invalid usage count for '{argument}' in '{command}': {reason}")]
    InvalidUsageCount {
        command: String,
        argument: String,
        reason: String,
    },

    #[error("group '{group}' in '{command}' references unknown argument '{argument}'")]
    UnknownGroupMember {
        command: String,
        group: String,
        argument: String,
    },

    #[error("group '{group}' is defined twice in command '{command}'")]
    DuplicateGroup { command: String, group: String },
}

/// How a group restriction was broken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupViolation {
    NoneSatisfied,
    MultipleSatisfied { present: Vec<String> },
    MissingMembers { missing: Vec<String> },
}

/// What went wrong while resolving a command line.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ErrorKind {
    #[error("unknown flag: {flag}")]
    UnknownFlag { flag: String },

    #[error("missing required argument {argument}")]
    MissingRequiredArgument { argument: String },

    #[error("too few values for {argument}: expected {expected}, found {found}")]
    TooFewValues {
        argument: String,
        expected: Arity,
        found: usize,
    },

    #[error("too many values for {argument}: expected {expected}, found {found}")]
    TooManyValues {
        argument: String,
        expected: Arity,
        found: usize,
    },

    #[error("invalid value '{value}' for {argument}: {reason}")]
    ConversionFailure {
        argument: String,
        value: String,
        reason: String,
    },

    #[error("unexpected argument '{token}'")]
    UnexpectedToken { token: String },

    #[error("{}", group_message(.group, .restriction, .violation, .members))]
    GroupConstraintViolated {
        group: String,
        restriction: Restriction,
        violation: GroupViolation,
        members: Vec<String>,
    },

    #[error("argument {argument} cannot be used multiple times")]
    DuplicateNonRepeatable { argument: String },

    #[error("unknown subcommand '{name}'")]
    UnknownSubcommand { name: String },

    #[error("argument {argument} must be used {expected}, used {found}")]
    UsageCountOutOfRange {
        argument: String,
        expected: UsageCount,
        found: usize,
    },
}

fn group_message(
    group: &str,
    restriction: &Restriction,
    violation: &GroupViolation,
    members: &[String],
) -> String {
    match violation {
        GroupViolation::NoneSatisfied => match restriction {
            Restriction::ExactlyOne => format!(
                "group '{group}' requires exactly one of: {}",
                members.join(", ")
            ),
            _ => format!(
                "group '{group}' requires at least one of: {}",
                members.join(", ")
            ),
        },
        GroupViolation::MultipleSatisfied { present } => format!(
            "group '{group}' allows only one of: {} (found {})",
            members.join(", "),
            present.join(", ")
        ),
        GroupViolation::MissingMembers { missing } => format!(
            "group '{group}' requires all of: {} (missing {})",
            members.join(", "),
            missing.join(", ")
        ),
    }
}

impl ErrorKind {
    /// Stable kebab-case identifier.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UnknownFlag { .. } => "unknown-flag",
            Self::MissingRequiredArgument { .. } => "missing-required-argument",
            Self::TooFewValues { .. } => "too-few-values",
            Self::TooManyValues { .. } => "too-many-values",
            Self::ConversionFailure { .. } => "conversion-failure",
            Self::UnexpectedToken { .. } => "unexpected-token",
            Self::GroupConstraintViolated { .. } => "group-constraint-violated",
            Self::DuplicateNonRepeatable { .. } => "duplicate-non-repeatable",
            Self::UnknownSubcommand { .. } => "unknown-subcommand",
            Self::UsageCountOutOfRange { .. } => "usage-count-out-of-range",
        }
    }

    /// The argument the error is about, when there is one.
    pub fn argument(&self) -> Option<&str> {
        match self {
            Self::MissingRequiredArgument { argument }
            | Self::TooFewValues { argument, .. }
            | Self::TooManyValues { argument, .. }
            | Self::ConversionFailure { argument, .. }
            | Self::DuplicateNonRepeatable { argument }
            | Self::UsageCountOutOfRange { argument, .. } => Some(argument),
            _ => None,
        }
    }
}

/// A resolution error with the command it belongs to and the argv index where
/// it was detected, when it relates to a specific token.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{kind}")]
pub struct ResolveError {
    pub kind: ErrorKind,
    pub position: Option<usize>,
    pub command: CommandId,
}

impl ResolveError {
    pub fn new(kind: ErrorKind, position: Option<usize>, command: CommandId) -> Self {
        Self {
            kind,
            position,
            command,
        }
    }

    pub fn argument(&self) -> Option<&str> {
        self.kind.argument()
    }
}
