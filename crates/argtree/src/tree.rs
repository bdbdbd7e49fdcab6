//! Command tree definitions.
//!
//! [`Command`], [`Argument`] and [`ArgumentGroup`] are plain builder values.
//! [`CommandTree::build`] validates them against a converter [`Registry`] and
//! flattens the hierarchy into an arena of [`CommandNode`]s addressed by
//! [`CommandId`]. The built tree is immutable and can be shared between
//! threads; every resolution only borrows it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::convert::{Registry, Value};
use crate::error::BuildError;
use crate::token::FlagScope;

/// Number of values an argument accepts per occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Arity {
    min: usize,
    max: Option<usize>,
}

impl Arity {
    /// A switch that takes no values.
    pub const NONE: Arity = Arity {
        min: 0,
        max: Some(0),
    };

    /// Exactly `n` values.
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    /// Between `min` and `max` values, both inclusive.
    pub const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    /// `min` or more values, no upper bound.
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// Zero or one value.
    pub const fn optional() -> Self {
        Self::range(0, 1)
    }

    pub fn min(&self) -> usize {
        self.min
    }

    /// `None` means unbounded.
    pub fn max(&self) -> Option<usize> {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    /// Whether at least one value is accepted.
    pub fn takes_values(&self) -> bool {
        self.max != Some(0)
    }

    /// At most one value per occurrence; repeated occurrences overwrite.
    pub fn is_single(&self) -> bool {
        matches!(self.max, Some(0) | Some(1))
    }

    /// Whether one more value fits after `taken` have been accepted.
    pub fn has_room(&self, taken: usize) -> bool {
        self.max.is_none_or(|max| taken < max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn values(n: usize) -> &'static str {
            if n == 1 { "value" } else { "values" }
        }
        match self.max {
            Some(0) => f.write_str("no values"),
            Some(max) if max == self.min => write!(f, "{max} {}", values(max)),
            Some(max) => write!(f, "{} to {max} values", self.min),
            None => write!(f, "at least {} {}", self.min, values(self.min)),
        }
    }
}

/// How many times an argument may be given on one command line.
///
/// Unlike [`Arity`], the lower bound is at least 1: it only applies once the
/// argument is used at all. Whether it must be used is [`Argument::required`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsageCount {
    min: usize,
    max: Option<usize>,
}

impl UsageCount {
    pub const fn exactly(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    pub const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    /// Whether `count` uses are within bounds.
    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

impl fmt::Display for UsageCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn times(n: usize) -> &'static str {
            if n == 1 { "time" } else { "times" }
        }
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {max} {}", times(max)),
            Some(max) => write!(f, "{} to {max} times", self.min),
            None => write!(f, "at least {} {}", self.min, times(self.min)),
        }
    }
}

/// One spelling of a flag: `-o` or `--output`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlagName {
    Short(char),
    Long(String),
}

impl fmt::Display for FlagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short(c) => write!(f, "-{c}"),
            Self::Long(name) => write!(f, "--{name}"),
        }
    }
}

fn normalize_long(raw: &str) -> String {
    raw.trim().trim_start_matches('-').to_string()
}

/// Declaration of a single argument.
///
/// An argument without any flag names is positional.
#[derive(Debug, Clone)]
pub struct Argument {
    name: String,
    shorts: Vec<char>,
    longs: Vec<String>,
    arity: Arity,
    value_type: String,
    default_value: Option<String>,
    required: bool,
    multiple: bool,
    usage: Option<UsageCount>,
    unique: bool,
    forward: bool,
    help: String,
    value_name: Option<String>,
    hidden: bool,
}

impl Argument {
    /// An argument with no flag names yet; add them with [`Argument::short`]
    /// and [`Argument::long`], or leave it positional.
    pub fn new(name: impl Into<String>, arity: Arity, value_type: &str) -> Self {
        Self {
            name: name.into(),
            shorts: Vec::new(),
            longs: Vec::new(),
            arity,
            value_type: value_type.to_string(),
            default_value: None,
            required: false,
            multiple: true,
            usage: None,
            unique: false,
            forward: false,
            help: String::new(),
            value_name: None,
            hidden: false,
        }
    }

    /// A positional argument taking exactly one string value.
    pub fn positional(name: impl Into<String>) -> Self {
        Self::new(name, Arity::exactly(1), crate::convert::STRING)
    }

    /// A boolean switch `--<name>` taking no values.
    pub fn flag(name: impl Into<String>) -> Self {
        let name = name.into();
        let long = normalize_long(&name);
        let mut arg = Self::new(name, Arity::NONE, crate::convert::BOOL);
        arg.longs.push(long);
        arg
    }

    /// An option `--<name> <value>` taking exactly one string value.
    pub fn option(name: impl Into<String>) -> Self {
        let name = name.into();
        let long = normalize_long(&name);
        let mut arg = Self::new(name, Arity::exactly(1), crate::convert::STRING);
        arg.longs.push(long);
        arg
    }

    /// A switch `--<name>` whose value is the number of times it was given.
    ///
    /// Reads as `0` when absent.
    pub fn counter(name: impl Into<String>) -> Self {
        Self::flag(name)
            .value_type(crate::convert::COUNT)
            .default_value("0")
    }

    /// Add a short name (`-c`).
    pub fn short(mut self, c: char) -> Self {
        if !self.shorts.contains(&c) {
            self.shorts.push(c);
        }
        self
    }

    /// Add a long name. Leading dashes are ignored (`"--out"` and `"out"` are the same).
    pub fn long(mut self, name: impl AsRef<str>) -> Self {
        let name = normalize_long(name.as_ref());
        if !self.longs.contains(&name) {
            self.longs.push(name);
        }
        self
    }

    /// Values accepted per occurrence.
    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        self
    }

    /// Tag of the registered converter for this argument's values.
    pub fn value_type(mut self, tag: impl Into<String>) -> Self {
        self.value_type = tag.into();
        self
    }

    /// Text converted at build time and used when the argument is not given.
    pub fn default_value(mut self, text: impl Into<String>) -> Self {
        self.default_value = Some(text.into());
        self
    }

    /// Report the argument as missing when it is neither given nor defaulted.
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Whether the argument may occur more than once (default `true`).
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Bounds on how many times the argument may be given once it is used.
    pub fn usage_count(mut self, usage: UsageCount) -> Self {
        self.usage = Some(usage);
        self
    }

    /// When given, missing required arguments and group violations of this
    /// command and its ancestors are not reported (`--help`, `--version`).
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Capture every remaining raw token verbatim once this positional is reached.
    pub fn forward(mut self) -> Self {
        self.forward = true;
        self.arity = Arity::at_least(1);
        self
    }

    /// Description shown in help output.
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Placeholder shown for the value in help and messages.
    pub fn value_name(mut self, name: impl Into<String>) -> Self {
        self.value_name = Some(name.into());
        self
    }

    /// Leave the argument out of help output.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shorts(&self) -> &[char] {
        &self.shorts
    }

    pub fn longs(&self) -> &[String] {
        &self.longs
    }

    pub fn flag_names(&self) -> impl Iterator<Item = FlagName> + '_ {
        self.shorts
            .iter()
            .map(|c| FlagName::Short(*c))
            .chain(self.longs.iter().map(|l| FlagName::Long(l.clone())))
    }

    pub fn is_positional(&self) -> bool {
        self.shorts.is_empty() && self.longs.is_empty()
    }

    pub fn get_arity(&self) -> Arity {
        self.arity
    }

    pub fn get_value_type(&self) -> &str {
        &self.value_type
    }

    pub fn get_default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    pub fn get_usage_count(&self) -> Option<UsageCount> {
        self.usage
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn is_forward(&self) -> bool {
        self.forward
    }

    pub fn get_help(&self) -> &str {
        &self.help
    }

    pub fn get_value_name(&self) -> Option<&str> {
        self.value_name.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Value placeholder used in messages and help (`FILE`, or the upper-cased name).
    pub fn placeholder(&self) -> String {
        self.value_name
            .clone()
            .unwrap_or_else(|| self.name.to_ascii_uppercase())
    }

    /// How the argument is referred to in messages: `--long`, `-s` or `<NAME>`.
    pub fn display_name(&self) -> String {
        if let Some(long) = self.longs.first() {
            format!("--{long}")
        } else if let Some(short) = self.shorts.first() {
            format!("-{short}")
        } else {
            format!("<{}>", self.placeholder())
        }
    }

    /// Positional slots other than the forwarding one must receive this many values.
    pub(crate) fn required_values(&self) -> usize {
        if self.required {
            self.arity.min().max(1)
        } else {
            0
        }
    }
}

/// Logical restriction of an [`ArgumentGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Restriction {
    /// Informational only.
    None,
    ExactlyOne,
    AtLeastOne,
    All,
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::ExactlyOne => "exactly-one",
            Self::AtLeastOne => "at-least-one",
            Self::All => "all",
        })
    }
}

#[derive(Debug, Clone)]
pub enum GroupMember {
    Argument(String),
    Group(ArgumentGroup),
}

/// A set of arguments and nested groups with a [`Restriction`].
#[derive(Debug, Clone)]
pub struct ArgumentGroup {
    name: String,
    restriction: Restriction,
    members: Vec<GroupMember>,
}

impl ArgumentGroup {
    pub fn new(name: impl Into<String>, restriction: Restriction) -> Self {
        Self {
            name: name.into(),
            restriction,
            members: Vec::new(),
        }
    }

    pub fn none(name: impl Into<String>) -> Self {
        Self::new(name, Restriction::None)
    }

    pub fn exactly_one(name: impl Into<String>) -> Self {
        Self::new(name, Restriction::ExactlyOne)
    }

    pub fn at_least_one(name: impl Into<String>) -> Self {
        Self::new(name, Restriction::AtLeastOne)
    }

    pub fn all(name: impl Into<String>) -> Self {
        Self::new(name, Restriction::All)
    }

    /// Add a member argument by name.
    pub fn arg(mut self, name: impl Into<String>) -> Self {
        self.members.push(GroupMember::Argument(name.into()));
        self
    }

    pub fn group(mut self, group: ArgumentGroup) -> Self {
        self.members.push(GroupMember::Group(group));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn restriction(&self) -> Restriction {
        self.restriction
    }

    pub fn members(&self) -> &[GroupMember] {
        &self.members
    }

    fn visit_names<'g>(&'g self, out: &mut Vec<&'g str>) {
        out.push(&self.name);
        for member in &self.members {
            if let GroupMember::Group(inner) = member {
                inner.visit_names(out);
            }
        }
    }

    fn visit_args<'g>(&'g self, out: &mut Vec<(&'g str, &'g str)>) {
        for member in &self.members {
            match member {
                GroupMember::Argument(name) => out.push((&self.name, name)),
                GroupMember::Group(inner) => inner.visit_args(out),
            }
        }
    }
}

/// Builder for one command and, recursively, its subcommands.
#[derive(Debug, Clone)]
pub struct Command {
    name: String,
    aliases: Vec<String>,
    about: String,
    args: Vec<Argument>,
    groups: Vec<ArgumentGroup>,
    subcommands: Vec<Command>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            about: String::new(),
            args: Vec::new(),
            groups: Vec::new(),
            subcommands: Vec::new(),
        }
    }

    /// Another name the command is reachable by.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn about(mut self, about: impl Into<String>) -> Self {
        self.about = about.into();
        self
    }

    /// Append an argument; positionals fill in declaration order.
    pub fn arg(mut self, arg: Argument) -> Self {
        self.args.push(arg);
        self
    }

    pub fn group(mut self, group: ArgumentGroup) -> Self {
        self.groups.push(group);
        self
    }

    pub fn subcommand(mut self, command: Command) -> Self {
        self.subcommands.push(command);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Index of a command inside a [`CommandTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(usize);

impl CommandId {
    pub const ROOT: CommandId = CommandId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// A validated command inside a [`CommandTree`].
#[derive(Debug)]
pub struct CommandNode {
    id: CommandId,
    parent: Option<CommandId>,
    children: Vec<CommandId>,
    name: String,
    aliases: Vec<String>,
    about: String,
    args: Vec<Argument>,
    defaults: Vec<Option<Value>>,
    groups: Vec<ArgumentGroup>,
    flags: HashMap<FlagName, usize>,
    numeric: bool,
}

impl CommandNode {
    pub fn id(&self) -> CommandId {
        self.id
    }

    /// Back-reference to the parent command (`None` for the root).
    pub fn parent(&self) -> Option<CommandId> {
        self.parent
    }

    pub fn children(&self) -> &[CommandId] {
        &self.children
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn about(&self) -> &str {
        &self.about
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.args
    }

    pub fn groups(&self) -> &[ArgumentGroup] {
        &self.groups
    }

    pub fn has_subcommands(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.args.iter().find(|a| a.name == name)
    }

    /// Index into [`CommandNode::arguments`] of the argument spelled `flag`.
    pub fn flag_index(&self, flag: &FlagName) -> Option<usize> {
        self.flags.get(flag).copied()
    }

    pub fn find_flag(&self, flag: &FlagName) -> Option<&Argument> {
        self.flag_index(flag).map(|i| &self.args[i])
    }

    /// Positional arguments in declaration order, including a forwarding one.
    pub fn positionals(&self) -> impl Iterator<Item = &Argument> {
        self.args.iter().filter(|a| a.is_positional())
    }

    pub fn forwarding(&self) -> Option<&Argument> {
        self.args.iter().find(|a| a.forward)
    }

    /// Converted default of the argument at `index`.
    pub fn default_value(&self, index: usize) -> Option<&Value> {
        self.defaults.get(index).and_then(|d| d.as_ref())
    }

    pub fn matches_name(&self, raw: &str) -> bool {
        self.name == raw || self.aliases.iter().any(|a| a == raw)
    }
}

impl FlagScope for CommandNode {
    fn short_arity(&self, c: char) -> Option<Arity> {
        self.find_flag(&FlagName::Short(c)).map(|a| a.arity)
    }

    fn numeric_in_scope(&self) -> bool {
        self.numeric
    }
}

/// An immutable, validated command hierarchy plus the converters its arguments use.
#[derive(Debug)]
pub struct CommandTree {
    nodes: Vec<CommandNode>,
    registry: Registry,
}

impl CommandTree {
    /// Validate `root` and everything below it.
    ///
    /// Fails on duplicate names, inconsistent arity, unregistered value types,
    /// defaults that do not convert, misplaced forwarding arguments and group
    /// members that do not exist.
    pub fn build(root: Command, registry: Registry) -> Result<Self, BuildError> {
        let mut tree = Self {
            nodes: Vec::new(),
            registry,
        };
        tree.insert(root, None)?;
        tracing::debug!(commands = tree.nodes.len(), "command tree built");
        Ok(tree)
    }

    fn insert(&mut self, command: Command, parent: Option<CommandId>) -> Result<CommandId, BuildError> {
        let Command {
            name,
            aliases,
            about,
            args,
            groups,
            subcommands,
        } = command;

        if name.trim().is_empty() {
            return Err(BuildError::EmptyCommandName);
        }

        let flags = validate_args(&name, &args)?;
        validate_groups(&name, &args, &groups)?;

        let mut defaults = Vec::with_capacity(args.len());
        let mut numeric = false;
        for arg in &args {
            let converter = self.registry.get(&arg.value_type).ok_or_else(|| {
                BuildError::UnregisteredType {
                    command: name.clone(),
                    argument: arg.name.clone(),
                    value_type: arg.value_type.clone(),
                }
            })?;
            numeric |= converter.is_numeric();
            let default = match &arg.default_value {
                Some(text) => Some(converter.parse(text).map_err(|e| BuildError::InvalidDefault {
                    command: name.clone(),
                    argument: arg.name.clone(),
                    value: text.clone(),
                    reason: e.to_string(),
                })?),
                None => None,
            };
            defaults.push(default);
        }

        let mut sibling_names: HashMap<&str, &str> = HashMap::new();
        for sub in &subcommands {
            for label in std::iter::once(&sub.name).chain(sub.aliases.iter()) {
                if let Some(prev) = sibling_names.insert(label.as_str(), sub.name.as_str()) {
                    return Err(BuildError::DuplicateSubcommand {
                        command: name.clone(),
                        name: label.clone(),
                        first: prev.to_string(),
                        second: sub.name.clone(),
                    });
                }
            }
        }

        let id = CommandId(self.nodes.len());
        self.nodes.push(CommandNode {
            id,
            parent,
            children: Vec::new(),
            name,
            aliases,
            about,
            args,
            defaults,
            groups,
            flags,
            numeric,
        });

        for sub in subcommands {
            let child = self.insert(sub, Some(id))?;
            self.nodes[id.0].children.push(child);
        }

        Ok(id)
    }

    pub fn root(&self) -> &CommandNode {
        &self.nodes[0]
    }

    /// The node for `id`.
    ///
    /// Ids are only handed out by this tree; passing an id from another tree
    /// may panic.
    pub fn command(&self, id: CommandId) -> &CommandNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: CommandId) -> Option<&CommandNode> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: CommandId) -> Option<&CommandNode> {
        self.get(id)?.parent.map(|p| self.command(p))
    }

    pub fn children(&self, id: CommandId) -> impl Iterator<Item = &CommandNode> {
        self.command(id).children.iter().map(|c| self.command(*c))
    }

    /// Child of `id` whose name or alias is `raw`.
    pub fn find_subcommand(&self, id: CommandId, raw: &str) -> Option<CommandId> {
        self.children(id).find(|c| c.matches_name(raw)).map(|c| c.id)
    }

    /// Walk down from the root following `names` (names or aliases).
    pub fn find_path<S: AsRef<str>>(&self, names: &[S]) -> Option<CommandId> {
        names.iter().try_fold(CommandId::ROOT, |id, name| {
            self.find_subcommand(id, name.as_ref())
        })
    }

    /// Names from the root down to `id`.
    pub fn path(&self, id: CommandId) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cursor = self.get(id);
        while let Some(node) = cursor {
            out.push(node.name.as_str());
            cursor = node.parent.map(|p| self.command(p));
        }
        out.reverse();
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

fn validate_args(command: &str, args: &[Argument]) -> Result<HashMap<FlagName, usize>, BuildError> {
    let mut names: HashSet<&str> = HashSet::new();
    let mut flags: HashMap<FlagName, usize> = HashMap::new();

    for (idx, arg) in args.iter().enumerate() {
        if arg.name.trim().is_empty() {
            return Err(BuildError::EmptyArgumentName {
                command: command.to_string(),
            });
        }
        if !names.insert(&arg.name) {
            return Err(BuildError::DuplicateArgument {
                command: command.to_string(),
                argument: arg.name.clone(),
            });
        }
        if let Some(max) = arg.arity.max() {
            if arg.arity.min() > max {
                return Err(BuildError::InvalidArity {
                    command: command.to_string(),
                    argument: arg.name.clone(),
                    min: arg.arity.min(),
                    max,
                });
            }
        }

        if let Some(usage) = arg.usage {
            let reason = if arg.is_positional() {
                Some("positional arguments are given at most once")
            } else if usage.min == 0 {
                Some("the minimum must be at least 1")
            } else if usage.max.is_some_and(|max| max < usage.min) {
                Some("the minimum is greater than the maximum")
            } else if !arg.multiple && usage.max != Some(1) {
                Some("the argument is not repeatable")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(BuildError::InvalidUsageCount {
                    command: command.to_string(),
                    argument: arg.name.clone(),
                    reason: reason.to_string(),
                });
            }
        }

        for flag in arg.flag_names() {
            let valid = match &flag {
                FlagName::Short(c) => !matches!(c, '-' | '=') && !c.is_whitespace(),
                FlagName::Long(l) => !l.is_empty() && !l.contains('=') && !l.contains(char::is_whitespace),
            };
            if !valid {
                return Err(BuildError::InvalidFlagName {
                    command: command.to_string(),
                    argument: arg.name.clone(),
                    flag: flag.to_string(),
                });
            }
            if let Some(prev) = flags.insert(flag.clone(), idx) {
                return Err(BuildError::DuplicateFlag {
                    command: command.to_string(),
                    flag: flag.to_string(),
                    first: args[prev].name.clone(),
                    second: arg.name.clone(),
                });
            }
        }
    }

    let positionals: Vec<&Argument> = args.iter().filter(|a| a.is_positional()).collect();
    for (pos, arg) in positionals.iter().enumerate() {
        if !arg.forward {
            continue;
        }
        if !arg.arity.is_unbounded() {
            return Err(BuildError::InvalidForwarding {
                command: command.to_string(),
                argument: arg.name.clone(),
            });
        }
        if pos + 1 != positionals.len() {
            return Err(BuildError::ForwardingNotLast {
                command: command.to_string(),
                argument: arg.name.clone(),
            });
        }
        if let Some(prev) = positionals[..pos].iter().find(|p| p.arity.is_unbounded()) {
            return Err(BuildError::ForwardingAfterUnbounded {
                command: command.to_string(),
                argument: arg.name.clone(),
                previous: prev.name.clone(),
            });
        }
    }
    // Flagged arguments cannot forward.
    if let Some(arg) = args.iter().find(|a| a.forward && !a.is_positional()) {
        return Err(BuildError::InvalidForwarding {
            command: command.to_string(),
            argument: arg.name.clone(),
        });
    }

    Ok(flags)
}

fn validate_groups(command: &str, args: &[Argument], groups: &[ArgumentGroup]) -> Result<(), BuildError> {
    let mut group_names = Vec::new();
    let mut members = Vec::new();
    for group in groups {
        group.visit_names(&mut group_names);
        group.visit_args(&mut members);
    }

    let mut seen = HashSet::new();
    for name in group_names {
        if !seen.insert(name) {
            return Err(BuildError::DuplicateGroup {
                command: command.to_string(),
                group: name.to_string(),
            });
        }
    }

    for (group, member) in members {
        if !args.iter().any(|a| a.name == member) {
            return Err(BuildError::UnknownGroupMember {
                command: command.to_string(),
                group: group.to_string(),
                argument: member.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::with_builtins()
    }

    #[test]
    fn arity_display_reads_naturally() {
        assert_eq!(Arity::NONE.to_string(), "no values");
        assert_eq!(Arity::exactly(1).to_string(), "1 value");
        assert_eq!(Arity::exactly(2).to_string(), "2 values");
        assert_eq!(Arity::range(0, 1).to_string(), "0 to 1 values");
        assert_eq!(Arity::at_least(1).to_string(), "at least 1 value");
    }

    #[test]
    fn build_links_parents_and_children() {
        let root = Command::new("git")
            .subcommand(Command::new("remote").subcommand(Command::new("add")))
            .subcommand(Command::new("status").alias("st"));
        let tree = CommandTree::build(root, registry()).unwrap();

        assert_eq!(tree.len(), 4);
        let remote = tree.find_subcommand(CommandId::ROOT, "remote").unwrap();
        let add = tree.find_subcommand(remote, "add").unwrap();
        assert_eq!(tree.parent(add).map(|p| p.name()), Some("remote"));
        assert_eq!(tree.path(add), vec!["git", "remote", "add"]);
        assert_eq!(tree.find_path(&["st"]), tree.find_subcommand(CommandId::ROOT, "status"));
        assert!(tree.parent(CommandId::ROOT).is_none());
    }

    #[test]
    fn build_rejects_duplicate_flags() {
        let root = Command::new("cmd")
            .arg(Argument::flag("verbose").short('v'))
            .arg(Argument::flag("version").short('v'));
        let err = CommandTree::build(root, registry()).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateFlag { .. }), "{err:?}");
    }

    #[test]
    fn build_rejects_sibling_alias_conflicts() {
        let root = Command::new("cmd")
            .subcommand(Command::new("alpha").alias("beta"))
            .subcommand(Command::new("beta"));
        let err = CommandTree::build(root, registry()).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateSubcommand { .. }), "{err:?}");
    }

    #[test]
    fn build_rejects_unregistered_type_and_bad_default() {
        let root = Command::new("cmd").arg(Argument::option("size").value_type("bytes"));
        let err = CommandTree::build(root, registry()).unwrap_err();
        assert!(matches!(err, BuildError::UnregisteredType { .. }), "{err:?}");

        let root = Command::new("cmd").arg(
            Argument::option("port")
                .value_type(crate::convert::INT)
                .default_value("eighty"),
        );
        let err = CommandTree::build(root, registry()).unwrap_err();
        assert!(matches!(err, BuildError::InvalidDefault { .. }), "{err:?}");
    }

    #[test]
    fn build_rejects_inverted_arity() {
        let root = Command::new("cmd").arg(Argument::option("pair").arity(Arity::range(3, 2)));
        let err = CommandTree::build(root, registry()).unwrap_err();
        assert!(matches!(err, BuildError::InvalidArity { min: 3, max: 2, .. }));
    }

    #[test]
    fn build_checks_forwarding_placement() {
        let root = Command::new("run")
            .arg(Argument::positional("rest").forward())
            .arg(Argument::positional("script"));
        let err = CommandTree::build(root, registry()).unwrap_err();
        assert!(matches!(err, BuildError::ForwardingNotLast { .. }), "{err:?}");

        let root = Command::new("run")
            .arg(Argument::positional("files").arity(Arity::at_least(1)))
            .arg(Argument::positional("rest").forward());
        let err = CommandTree::build(root, registry()).unwrap_err();
        assert!(matches!(err, BuildError::ForwardingAfterUnbounded { .. }), "{err:?}");

        let root = Command::new("run").arg(Argument::option("rest").forward());
        let err = CommandTree::build(root, registry()).unwrap_err();
        assert!(matches!(err, BuildError::InvalidForwarding { .. }), "{err:?}");
    }

    #[test]
    fn build_checks_group_members() {
        let root = Command::new("cmd")
            .arg(Argument::flag("a"))
            .group(ArgumentGroup::exactly_one("mode").arg("a").arg("b"));
        let err = CommandTree::build(root, registry()).unwrap_err();
        assert!(matches!(err, BuildError::UnknownGroupMember { .. }), "{err:?}");

        let root = Command::new("cmd")
            .arg(Argument::flag("a"))
            .group(ArgumentGroup::none("g").group(ArgumentGroup::all("g").arg("a")));
        let err = CommandTree::build(root, registry()).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateGroup { .. }), "{err:?}");
    }

    #[test]
    fn usage_count_display_and_bounds() {
        assert_eq!(UsageCount::exactly(1).to_string(), "exactly 1 time");
        assert_eq!(UsageCount::range(2, 3).to_string(), "2 to 3 times");
        assert_eq!(UsageCount::at_least(2).to_string(), "at least 2 times");
        assert!(UsageCount::range(2, 3).contains(3));
        assert!(!UsageCount::range(2, 3).contains(1));
        assert!(UsageCount::at_least(1).contains(usize::MAX));
    }

    #[test]
    fn build_checks_usage_counts() {
        let zero = Command::new("cmd").arg(Argument::flag("v").usage_count(UsageCount::range(0, 2)));
        let err = CommandTree::build(zero, registry()).unwrap_err();
        assert!(matches!(err, BuildError::InvalidUsageCount { .. }), "{err:?}");

        let single = Command::new("cmd").arg(
            Argument::option("o")
                .multiple(false)
                .usage_count(UsageCount::at_least(1)),
        );
        let err = CommandTree::build(single, registry()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid usage count for 'o' in 'cmd': the argument is not repeatable"
        );

        let positional =
            Command::new("cmd").arg(Argument::positional("f").usage_count(UsageCount::exactly(1)));
        assert!(CommandTree::build(positional, registry()).is_err());

        let ok = Command::new("cmd").arg(Argument::counter("v").usage_count(UsageCount::range(1, 3)));
        assert!(CommandTree::build(ok, registry()).is_ok());
    }

    #[test]
    fn counter_defaults_to_zero() {
        let tree = CommandTree::build(
            Command::new("cmd").arg(Argument::counter("verbose").short('v')),
            registry(),
        )
        .unwrap();
        let arg = tree.root().argument("verbose").unwrap();
        assert_eq!(arg.get_arity(), Arity::NONE);
        assert_eq!(arg.get_value_type(), crate::convert::COUNT);
        assert_eq!(tree.root().default_value(0), Some(&Value::Int(0)));
    }

    #[test]
    fn long_names_are_normalized() {
        let arg = Argument::option("output").long("--out").long("out");
        assert_eq!(arg.longs(), &["output".to_string(), "out".to_string()]);
        assert_eq!(arg.display_name(), "--output");
        assert_eq!(Argument::positional("file").display_name(), "<FILE>");
    }

    #[test]
    fn numeric_scope_follows_registered_converters() {
        let root = Command::new("calc")
            .arg(Argument::positional("n").value_type(crate::convert::INT))
            .subcommand(Command::new("echo").arg(Argument::positional("text")));
        let tree = CommandTree::build(root, registry()).unwrap();
        assert!(tree.root().numeric_in_scope());
        let echo = tree.find_path(&["echo"]).unwrap();
        assert!(!tree.command(echo).numeric_in_scope());
    }
}
