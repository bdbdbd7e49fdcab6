//! Resolution results.

use indexmap::IndexMap;

use crate::convert::Value;
use crate::error::ResolveError;
use crate::tree::{CommandId, CommandTree};

/// Where the values of a matched argument came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSource {
    CommandLine,
    Default,
}

impl ValueSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CommandLine => "command-line",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchedArg {
    values: Vec<Value>,
    raw: Vec<String>,
    occurrences: usize,
    positions: Vec<usize>,
    source: ValueSource,
}

impl MatchedArg {
    pub(crate) fn explicit() -> Self {
        Self {
            values: Vec::new(),
            raw: Vec::new(),
            occurrences: 0,
            positions: Vec::new(),
            source: ValueSource::CommandLine,
        }
    }

    pub(crate) fn from_default(value: Value) -> Self {
        Self {
            raw: vec![value.to_string()],
            values: vec![value],
            occurrences: 0,
            positions: Vec::new(),
            source: ValueSource::Default,
        }
    }

    pub(crate) fn record_occurrence(&mut self, position: usize) {
        self.occurrences += 1;
        self.positions.push(position);
    }

    pub(crate) fn push(&mut self, raw: String, value: Option<Value>) {
        self.raw.push(raw);
        if let Some(value) = value {
            self.values.push(value);
        }
    }

    pub(crate) fn push_implicit(&mut self, value: Value) {
        self.values.push(value);
    }

    pub(crate) fn clear_values(&mut self) {
        self.values.clear();
        self.raw.clear();
    }

    /// Converted values in the order they were given.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Raw text of every value assigned, including ones that failed conversion.
    pub fn raw_values(&self) -> &[String] {
        &self.raw
    }

    pub fn last(&self) -> Option<&Value> {
        self.values.last()
    }

    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// Input positions of each occurrence.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn source(&self) -> ValueSource {
        self.source
    }
}

/// The result for one command on the path taken through the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub(crate) command: CommandId,
    pub(crate) name: String,
    pub(crate) values: IndexMap<String, MatchedArg>,
    pub(crate) errors: Vec<ResolveError>,
    pub(crate) children: Vec<ParsedCommand>,
}

impl ParsedCommand {
    pub(crate) fn new(command: CommandId, name: impl Into<String>) -> Self {
        Self {
            command,
            name: name.into(),
            values: IndexMap::new(),
            errors: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn command(&self) -> CommandId {
        self.command
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last value of `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).and_then(MatchedArg::last)
    }

    pub fn get_all(&self, name: &str) -> &[Value] {
        self.values
            .get(name)
            .map(MatchedArg::values)
            .unwrap_or_default()
    }

    /// Given on the command line or filled from a default.
    pub fn is_present(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Given on the command line.
    pub fn is_explicit(&self, name: &str) -> bool {
        self.values
            .get(name)
            .is_some_and(|m| m.source == ValueSource::CommandLine)
    }

    pub fn occurrences(&self, name: &str) -> usize {
        self.values.get(name).map_or(0, MatchedArg::occurrences)
    }

    pub fn matched(&self, name: &str) -> Option<&MatchedArg> {
        self.values.get(name)
    }

    /// Matched arguments in the order they were first seen.
    pub fn arguments(&self) -> impl Iterator<Item = (&str, &MatchedArg)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Errors detected while this command was being resolved.
    pub fn errors(&self) -> &[ResolveError] {
        &self.errors
    }

    pub fn children(&self) -> &[ParsedCommand] {
        &self.children
    }

    /// The subcommand taken below this one, if any.
    pub fn subcommand(&self) -> Option<&ParsedCommand> {
        self.children.first()
    }
}

/// The outcome of resolving one argument vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub(crate) root: ParsedCommand,
    pub(crate) errors: Vec<ResolveError>,
}

impl Resolution {
    pub fn root(&self) -> &ParsedCommand {
        &self.root
    }

    /// Every error, in detection order.
    pub fn errors(&self) -> &[ResolveError] {
        &self.errors
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors_for(&self, command: CommandId) -> impl Iterator<Item = &ResolveError> {
        self.errors.iter().filter(move |e| e.command == command)
    }

    /// The deepest command reached.
    pub fn leaf(&self) -> &ParsedCommand {
        let mut node = &self.root;
        while let Some(child) = node.subcommand() {
            node = child;
        }
        node
    }

    /// Result nodes from the root down to the leaf.
    pub fn chain(&self) -> impl Iterator<Item = &ParsedCommand> {
        std::iter::successors(Some(&self.root), |node| node.subcommand())
    }

    /// Names of the commands taken, root first.
    pub fn command_path<'t>(&self, tree: &'t CommandTree) -> Vec<&'t str> {
        tree.path(self.leaf().command)
    }

    pub fn into_parts(self) -> (ParsedCommand, Vec<ResolveError>) {
        (self.root, self.errors)
    }
}
