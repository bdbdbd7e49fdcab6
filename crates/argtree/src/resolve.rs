//! The resolver: walks a [`CommandTree`] against an argument vector.
//!
//! Every problem found is recorded as a [`ResolveError`] and resolution moves
//! on, so a single pass reports everything wrong with the input.

use crate::convert::{Converter, Value};
use crate::error::{ErrorKind, ResolveError};
use crate::group;
use crate::matches::{MatchedArg, ParsedCommand, Resolution};
use crate::token::{Lexer, Token, TokenKind};
use crate::tree::{Argument, CommandId, CommandNode, CommandTree, FlagName};

/// Reusable handle that resolves argument vectors against one tree.
///
/// Holds no per-call state, so one `Resolver` (or many) may be used from
/// several threads at once.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'t> {
    tree: &'t CommandTree,
}

impl<'t> Resolver<'t> {
    pub fn new(tree: &'t CommandTree) -> Self {
        Self { tree }
    }

    pub fn tree(&self) -> &'t CommandTree {
        self.tree
    }

    /// Resolve `argv` (program name excluded) starting at the root command.
    pub fn resolve<S: AsRef<str>>(&self, argv: &[S]) -> Resolution {
        tracing::debug!(args = argv.len(), root = self.tree.root().name(), "resolving");

        let mut pass = Pass {
            tree: self.tree,
            lexer: Lexer::new(argv),
            errors: Vec::new(),
        };

        let mut chain = Vec::new();
        let mut current = Some(CommandId::ROOT);
        while let Some(id) = current {
            let (parsed, next) = pass.scan(id);
            chain.push(parsed);
            current = next;
        }

        // A unique argument anywhere below a command silences its requirements.
        let mut unique_below = vec![false; chain.len()];
        let mut seen = false;
        for (i, parsed) in chain.iter().enumerate().rev() {
            seen |= self.tree.command(parsed.command).arguments().iter().any(|a| {
                a.is_unique() && parsed.is_explicit(a.name())
            });
            unique_below[i] = seen;
        }
        for (parsed, suppressed) in chain.iter_mut().zip(unique_below) {
            pass.check_requirements(parsed, suppressed);
        }
        for parsed in &mut chain {
            let id = parsed.command;
            parsed.errors = pass.errors.iter().filter(|e| e.command == id).cloned().collect();
        }

        let mut nodes = chain.into_iter().rev();
        let mut root = match nodes.next() {
            Some(leaf) => leaf,
            None => ParsedCommand::new(CommandId::ROOT, self.tree.root().name()),
        };
        for mut parent in nodes {
            parent.children.push(root);
            root = parent;
        }

        tracing::debug!(errors = pass.errors.len(), "resolution finished");
        Resolution {
            root,
            errors: pass.errors,
        }
    }
}

/// Shorthand for `Resolver::new(tree).resolve(argv)`.
pub fn resolve<S: AsRef<str>>(tree: &CommandTree, argv: &[S]) -> Resolution {
    Resolver::new(tree).resolve(argv)
}

/// A positional value waiting for finalization.
#[derive(Debug)]
struct Collected {
    position: usize,
    text: String,
    literal: bool,
    dashed: bool,
}

struct Pass<'t, 'a, S: AsRef<str>> {
    tree: &'t CommandTree,
    lexer: Lexer<'a, S>,
    errors: Vec<ResolveError>,
}

impl<'t, S: AsRef<str>> Pass<'t, '_, S> {
    fn error(&mut self, kind: ErrorKind, position: Option<usize>, command: CommandId) {
        tracing::trace!(?position, error = kind.name(), "recorded error");
        self.errors.push(ResolveError::new(kind, position, command));
    }

    /// Consume tokens for `id` until the input ends or a subcommand is entered.
    fn scan(&mut self, id: CommandId) -> (ParsedCommand, Option<CommandId>) {
        let tree = self.tree;
        let node = tree.command(id);
        let mut parsed = ParsedCommand::new(id, node.name());
        let mut collected: Vec<Collected> = Vec::new();
        let mut descend = None;

        let required_before_subcommand: usize = node
            .positionals()
            .filter(|a| !a.is_forward())
            .map(Argument::required_values)
            .fold(0, usize::saturating_add);
        let forward_after: usize = node
            .positionals()
            .filter(|a| !a.is_forward())
            .map(|a| a.get_arity().max().unwrap_or(usize::MAX))
            .fold(0, usize::saturating_add);

        while let Some(token) = self.lexer.next_token(node) {
            tracing::trace!(position = token.position, kind = ?token.kind, "token");
            let Token {
                kind,
                position,
                attached,
                literal,
                dashed,
            } = token;
            let text = match kind {
                TokenKind::Separator => continue,
                TokenKind::Flag(flag) => {
                    self.flag(node, &mut parsed, flag, position);
                    continue;
                }
                TokenKind::Value(text) => text,
            };

            if attached {
                self.error(ErrorKind::UnexpectedToken { token: text }, Some(position), id);
                continue;
            }
            if !literal && !dashed && collected.len() >= required_before_subcommand {
                if let Some(child) = tree.find_subcommand(id, &text) {
                    tracing::debug!(
                        from = node.name(),
                        to = tree.command(child).name(),
                        "entering subcommand"
                    );
                    descend = Some(child);
                    break;
                }
            }
            if let Some(forward) = node.forwarding() {
                if collected.len() >= forward_after {
                    let mut rest = vec![(position, text)];
                    rest.extend(self.lexer.take_raw_rest());
                    self.forward(node, &mut parsed, forward, rest);
                    break;
                }
            }
            collected.push(Collected {
                position,
                text,
                literal,
                dashed,
            });
            if let Some(forward) = node.forwarding() {
                if collected.len() >= forward_after {
                    // Slots are full; whatever follows belongs to the forwarding argument.
                    let rest = self.lexer.take_raw_rest();
                    if !rest.is_empty() {
                        self.forward(node, &mut parsed, forward, rest);
                    }
                    break;
                }
            }
        }

        self.finalize(node, &mut parsed, collected);
        (parsed, descend)
    }

    fn flag(
        &mut self,
        node: &'t CommandNode,
        parsed: &mut ParsedCommand,
        flag: FlagName,
        position: usize,
    ) {
        let Some(index) = node.flag_index(&flag) else {
            self.error(
                ErrorKind::UnknownFlag {
                    flag: flag.to_string(),
                },
                Some(position),
                node.id(),
            );
            while self.lexer.next_if(node, |t| t.attached).is_some() {}
            return;
        };
        let arg = &node.arguments()[index];
        let arity = arg.get_arity();
        let tree = self.tree;

        let mut values: Vec<(usize, String)> = Vec::new();
        if let Some(token) = self.lexer.next_if(node, |t| t.attached) {
            let text = match token.kind {
                TokenKind::Value(text) => text,
                _ => String::new(),
            };
            if arity.takes_values() {
                values.push((token.position, text));
            } else {
                self.error(
                    ErrorKind::TooManyValues {
                        argument: arg.display_name(),
                        expected: arity,
                        found: 1,
                    },
                    Some(token.position),
                    node.id(),
                );
            }
        } else {
            while arity.has_room(values.len()) {
                // Dashed strings are values here; only flags, the separator
                // and subcommand names end the run.
                let next = self.lexer.next_if(node, |t| {
                    t.is_plain_value()
                        && (t.literal
                            || t.dashed
                            || t.as_value()
                                .is_none_or(|v| tree.find_subcommand(node.id(), v).is_none()))
                });
                match next {
                    Some(Token {
                        kind: TokenKind::Value(text),
                        position,
                        ..
                    }) => values.push((position, text)),
                    _ => break,
                }
            }
        }

        let entry = parsed
            .values
            .entry(arg.name().to_string())
            .or_insert_with(MatchedArg::explicit);
        if entry.occurrences() > 0 && !arg.is_multiple() {
            self.error(
                ErrorKind::DuplicateNonRepeatable {
                    argument: arg.display_name(),
                },
                Some(position),
                node.id(),
            );
            return;
        }
        if let Some(usage) = arg.get_usage_count() {
            let found = entry.occurrences() + 1;
            if usage.max().is_some_and(|max| found > max) {
                self.error(
                    ErrorKind::UsageCountOutOfRange {
                        argument: arg.display_name(),
                        expected: usage,
                        found,
                    },
                    Some(position),
                    node.id(),
                );
                entry.record_occurrence(position);
                return;
            }
        }

        if values.len() < arity.min() {
            self.error(
                ErrorKind::TooFewValues {
                    argument: arg.display_name(),
                    expected: arity,
                    found: values.len(),
                },
                Some(position),
                node.id(),
            );
        }

        entry.record_occurrence(position);
        let converter = tree.registry().get(arg.get_value_type());
        if converter.is_some_and(Converter::is_counter) {
            let count = i64::try_from(entry.occurrences()).unwrap_or(i64::MAX);
            entry.clear_values();
            entry.push_implicit(Value::Int(count));
            return;
        }
        if arity.is_single() && !values.is_empty() {
            entry.clear_values();
        }
        if values.is_empty() {
            let implicit = converter.and_then(Converter::implicit_value);
            if let Some(implicit) = implicit {
                if arity.is_single() {
                    entry.clear_values();
                }
                entry.push_implicit(implicit.clone());
            }
        }
        for (position, text) in values {
            self.assign(node, arg, entry, position, text);
        }
    }

    fn assign(
        &mut self,
        node: &CommandNode,
        arg: &Argument,
        entry: &mut MatchedArg,
        position: usize,
        text: String,
    ) {
        match self.tree.registry().convert(arg.get_value_type(), &text) {
            Ok(value) => {
                tracing::trace!(argument = arg.name(), %value, "assigned");
                entry.push(text, Some(value));
            }
            Err(err) => {
                self.error(
                    ErrorKind::ConversionFailure {
                        argument: arg.display_name(),
                        value: text.clone(),
                        reason: err.to_string(),
                    },
                    Some(position),
                    node.id(),
                );
                entry.push(text, None);
            }
        }
    }

    fn forward(
        &mut self,
        node: &CommandNode,
        parsed: &mut ParsedCommand,
        arg: &Argument,
        rest: Vec<(usize, String)>,
    ) {
        tracing::debug!(argument = arg.name(), count = rest.len(), "forwarding remaining input");
        let entry = parsed
            .values
            .entry(arg.name().to_string())
            .or_insert_with(MatchedArg::explicit);
        if let Some((position, _)) = rest.first() {
            entry.record_occurrence(*position);
        }
        for (position, text) in rest {
            self.assign(node, arg, entry, position, text);
        }
    }

    /// Distribute positionals, report leftovers, check usage counts, fill defaults.
    fn finalize(
        &mut self,
        node: &CommandNode,
        parsed: &mut ParsedCommand,
        collected: Vec<Collected>,
    ) {
        let slots: Vec<&Argument> = node.positionals().filter(|a| !a.is_forward()).collect();
        let mut values = collected.into_iter();
        let mut remaining = values.len();

        for (i, arg) in slots.iter().enumerate() {
            let reserve = slots[i + 1..]
                .iter()
                .map(|a| a.required_values())
                .fold(0, usize::saturating_add);
            let available = remaining.saturating_sub(reserve);
            let arity = arg.get_arity();
            let take = arity.max().map_or(available, |max| max.min(available));
            if take == 0 {
                continue;
            }
            remaining -= take;

            let chunk: Vec<Collected> = values.by_ref().take(take).collect();
            let first = chunk[0].position;
            if take < arity.min() {
                self.error(
                    ErrorKind::TooFewValues {
                        argument: arg.display_name(),
                        expected: arity,
                        found: take,
                    },
                    Some(first),
                    node.id(),
                );
            }
            let entry = parsed
                .values
                .entry(arg.name().to_string())
                .or_insert_with(MatchedArg::explicit);
            entry.record_occurrence(first);
            for item in chunk {
                self.assign(node, arg, entry, item.position, item.text);
            }
        }

        let mut first_plain = true;
        for item in values {
            let kind = if item.dashed {
                ErrorKind::UnknownFlag { flag: item.text }
            } else if first_plain && !item.literal && node.has_subcommands() {
                ErrorKind::UnknownSubcommand { name: item.text }
            } else {
                ErrorKind::UnexpectedToken { token: item.text }
            };
            first_plain &= item.dashed;
            self.error(kind, Some(item.position), node.id());
        }

        for arg in node.arguments() {
            let Some(usage) = arg.get_usage_count() else {
                continue;
            };
            let found = parsed.occurrences(arg.name());
            if found > 0 && found < usage.min() {
                self.error(
                    ErrorKind::UsageCountOutOfRange {
                        argument: arg.display_name(),
                        expected: usage,
                        found,
                    },
                    None,
                    node.id(),
                );
            }
        }

        for (index, arg) in node.arguments().iter().enumerate() {
            if parsed.values.contains_key(arg.name()) {
                continue;
            }
            if let Some(default) = node.default_value(index) {
                parsed
                    .values
                    .insert(arg.name().to_string(), MatchedArg::from_default(default.clone()));
            }
        }
    }

    /// Required arguments and groups, checked once the whole path is known.
    fn check_requirements(&mut self, parsed: &ParsedCommand, suppressed: bool) {
        let tree = self.tree;
        let node = tree.command(parsed.command);
        if suppressed {
            tracing::debug!(command = node.name(), "unique argument given, skipping requirements");
            return;
        }
        for arg in node.arguments() {
            if arg.is_required() && !parsed.values.contains_key(arg.name()) {
                self.error(
                    ErrorKind::MissingRequiredArgument {
                        argument: arg.display_name(),
                    },
                    None,
                    node.id(),
                );
            }
        }
        for kind in group::evaluate(node, |name| parsed.is_explicit(name)) {
            self.error(kind, None, node.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{Registry, INT};
    use crate::tree::{Arity, ArgumentGroup, Command, UsageCount};

    fn value_of<'r>(resolution: &'r Resolution, path: &[&str], name: &str) -> Option<&'r Value> {
        let mut node = resolution.root();
        for step in path {
            node = node.children().iter().find(|c| c.name() == *step)?;
        }
        node.get(name)
    }

    fn tree(root: Command) -> CommandTree {
        CommandTree::build(root, Registry::with_builtins()).unwrap()
    }

    fn kinds(resolution: &Resolution) -> Vec<&'static str> {
        resolution.errors().iter().map(|e| e.kind.name()).collect()
    }

    #[test]
    fn flag_accumulates_up_to_max() {
        let tree = tree(
            Command::new("app")
                .arg(Argument::option("pair").short('p').arity(Arity::exactly(2)))
                .arg(Argument::positional("rest").arity(Arity::at_least(0))),
        );
        let res = resolve(&tree, &["-p", "a", "b", "c"]);
        assert!(res.is_ok(), "{:?}", res.errors());
        let pair: Vec<String> = res.root().get_all("pair").iter().map(|v| v.to_string()).collect();
        assert_eq!(pair, vec!["a", "b"]);
        assert_eq!(res.root().get_all("rest"), &[Value::Str("c".into())]);
    }

    #[test]
    fn accumulation_stops_at_flags_and_separator() {
        let tree = tree(
            Command::new("app")
                .arg(Argument::option("files").arity(Arity::at_least(1)))
                .arg(Argument::flag("x"))
                .arg(Argument::positional("tail").arity(Arity::at_least(0))),
        );
        let res = resolve(&tree, &["--files", "a", "b", "--x", "--files", "c", "--", "d"]);
        assert!(res.is_ok(), "{:?}", res.errors());
        assert_eq!(res.root().get_all("files").len(), 3);
        assert_eq!(res.root().occurrences("files"), 2);
        assert_eq!(res.root().get_all("tail"), &[Value::Str("d".into())]);
    }

    #[test]
    fn single_valued_flag_is_last_wins() {
        let tree = tree(
            Command::new("app").arg(Argument::option("level").short('l').value_type(INT)),
        );
        let res = resolve(&tree, &["-l", "1", "--level=2"]);
        assert!(res.is_ok());
        assert_eq!(res.root().get_all("level"), &[Value::Int(2)]);
        assert_eq!(res.root().occurrences("level"), 2);
    }

    #[test]
    fn non_repeatable_duplicate_is_reported() {
        let tree = tree(
            Command::new("app").arg(Argument::option("name").multiple(false)),
        );
        let res = resolve(&tree, &["--name", "a", "--name", "b"]);
        assert_eq!(kinds(&res), vec!["duplicate-non-repeatable"]);
        assert_eq!(res.root().get("name"), Some(&Value::Str("a".into())));
        assert_eq!(res.errors()[0].position, Some(2));
    }

    #[test]
    fn attached_value_on_switch_is_too_many() {
        let tree = tree(Command::new("app").arg(Argument::flag("quiet").short('q')));
        let res = resolve(&tree, &["--quiet=yes"]);
        assert_eq!(kinds(&res), vec!["too-many-values"]);
        assert_eq!(res.root().get("quiet"), Some(&Value::Bool(true)));
    }

    #[test]
    fn unknown_flag_skips_its_attached_value() {
        let tree = tree(Command::new("app").arg(Argument::positional("file")));
        let res = resolve(&tree, &["--nope=1", "main.rs"]);
        assert_eq!(kinds(&res), vec!["unknown-flag"]);
        assert_eq!(res.root().get("file"), Some(&Value::Str("main.rs".into())));
    }

    #[test]
    fn positionals_leave_room_for_required_later_slots() {
        let tree = tree(
            Command::new("cp")
                .arg(Argument::positional("sources").arity(Arity::at_least(1)).required(true))
                .arg(Argument::positional("dest").required(true)),
        );
        let res = resolve(&tree, &["a", "b", "c"]);
        assert!(res.is_ok(), "{:?}", res.errors());
        assert_eq!(res.root().get_all("sources").len(), 2);
        assert_eq!(res.root().get("dest"), Some(&Value::Str("c".into())));
    }

    #[test]
    fn conversion_failure_keeps_going() {
        let tree = tree(
            Command::new("app")
                .arg(Argument::option("n").value_type(INT))
                .arg(Argument::option("m").value_type(INT)),
        );
        let res = resolve(&tree, &["--n", "x", "--m", "3"]);
        assert_eq!(kinds(&res), vec!["conversion-failure"]);
        assert_eq!(res.root().get("m"), Some(&Value::Int(3)));
        let matched = res.root().matched("n").unwrap();
        assert!(matched.values().is_empty());
        assert_eq!(matched.raw_values(), &["x".to_string()]);
    }

    #[test]
    fn subcommand_requires_satisfied_positionals() {
        let tree = tree(
            Command::new("app")
                .arg(Argument::positional("target").required(true))
                .subcommand(Command::new("run")),
        );
        let res = resolve(&tree, &["run", "run"]);
        assert!(res.is_ok(), "{:?}", res.errors());
        assert_eq!(res.root().get("target"), Some(&Value::Str("run".into())));
        assert_eq!(res.leaf().name(), "run");
    }

    #[test]
    fn forwarding_captures_raw_rest() {
        let tree = tree(
            Command::new("exec")
                .arg(Argument::flag("verbose").short('v'))
                .arg(Argument::positional("program").required(true))
                .arg(Argument::positional("args").forward()),
        );
        let res = resolve(&tree, &["-v", "ls", "-v", "--", "--color"]);
        assert!(res.is_ok(), "{:?}", res.errors());
        let args: Vec<String> = res.root().get_all("args").iter().map(|v| v.to_string()).collect();
        assert_eq!(args, vec!["-v", "--", "--color"]);

        let res = resolve(&tree, &["-x", "-y"]);
        assert!(res.is_ok(), "{:?}", res.errors());
        assert_eq!(res.root().get("program"), Some(&Value::Str("-x".into())));
        assert_eq!(res.root().get_all("args"), &[Value::Str("-y".into())]);
        assert_eq!(res.root().occurrences("verbose"), 1);
    }

    #[test]
    fn dashed_strings_are_taken_as_flag_values() {
        let tree = tree(
            Command::new("grep")
                .arg(Argument::option("pattern").short('e'))
                .arg(Argument::positional("file")),
        );
        for pattern in ["-x", "-5"] {
            let res = resolve(&tree, &["--pattern", pattern, "a.txt"]);
            assert!(res.is_ok(), "{pattern}: {:?}", res.errors());
            assert_eq!(res.root().get("pattern"), Some(&Value::Str(pattern.into())));
            assert_eq!(res.root().get("file"), Some(&Value::Str("a.txt".into())));
        }

        let res = resolve(&tree, &["-e", "--", "a.txt"]);
        assert_eq!(kinds(&res), vec!["too-few-values"]);
    }

    #[test]
    fn dashed_strings_fill_positionals_before_they_are_unknown() {
        let tree = tree(Command::new("echo").arg(Argument::positional("word")));
        let res = resolve(&tree, &["-n"]);
        assert!(res.is_ok(), "{:?}", res.errors());
        assert_eq!(res.root().get("word"), Some(&Value::Str("-n".into())));

        let res = resolve(&tree, &["hi", "-n", "there"]);
        assert_eq!(kinds(&res), vec!["unknown-flag", "unexpected-token"]);
        assert_eq!(res.errors()[0].to_string(), "unknown flag: -n");
        assert_eq!(res.errors()[0].position, Some(1));
    }

    #[test]
    fn dashed_leftover_does_not_hide_unknown_subcommand() {
        let tree = tree(Command::new("app").subcommand(Command::new("run")));
        let res = resolve(&tree, &["-x", "walk"]);
        assert_eq!(kinds(&res), vec!["unknown-flag", "unknown-subcommand"]);
    }

    #[test]
    fn subcommand_name_ends_flag_values() {
        let tree = tree(
            Command::new("app")
                .arg(Argument::option("files").arity(Arity::at_least(2)))
                .subcommand(Command::new("run")),
        );
        let res = resolve(&tree, &["--files", "a", "run"]);
        assert_eq!(kinds(&res), vec!["too-few-values"]);
        assert_eq!(res.errors()[0].position, Some(0));
        assert_eq!(res.root().matched("files").unwrap().raw_values(), &["a".to_string()]);
        assert_eq!(res.leaf().name(), "run");

        let res = resolve(&tree, &["--files", "run"]);
        assert_eq!(kinds(&res), vec!["too-few-values"]);
        assert_eq!(res.leaf().name(), "run");
    }

    #[test]
    fn short_positional_is_too_few_values() {
        let tree = tree(
            Command::new("mv").arg(Argument::positional("pair").arity(Arity::exactly(2))),
        );
        let res = resolve(&tree, &["a"]);
        assert_eq!(kinds(&res), vec!["too-few-values"]);
        match &res.errors()[0].kind {
            ErrorKind::TooFewValues {
                argument, found, ..
            } => {
                assert_eq!(argument, "<PAIR>");
                assert_eq!(*found, 1);
            }
            other => panic!("expected TooFewValues, got: {other:?}"),
        }
        assert_eq!(res.errors()[0].position, Some(0));
        assert_eq!(res.root().get_all("pair"), &[Value::Str("a".into())]);
    }

    #[test]
    fn usage_count_bounds_are_enforced() {
        let tree = tree(
            Command::new("app").arg(
                Argument::flag("verbose")
                    .short('v')
                    .usage_count(UsageCount::range(2, 3)),
            ),
        );
        assert!(resolve(&tree, &["-vv"]).is_ok());
        assert!(resolve(&tree, &[] as &[&str]).is_ok());

        let res = resolve(&tree, &["-v"]);
        assert_eq!(kinds(&res), vec!["usage-count-out-of-range"]);
        assert_eq!(res.errors()[0].position, None);

        let res = resolve(&tree, &["-vv", "-vv"]);
        assert_eq!(kinds(&res), vec!["usage-count-out-of-range"]);
        assert_eq!(res.errors()[0].position, Some(1));
        assert_eq!(
            res.errors()[0].to_string(),
            "argument --verbose must be used 2 to 3 times, used 4"
        );
    }

    #[test]
    fn counter_counts_occurrences() {
        let tree = tree(Command::new("app").arg(Argument::counter("verbose").short('v')));
        let res = resolve(&tree, &["-vvv", "--verbose"]);
        assert!(res.is_ok(), "{:?}", res.errors());
        assert_eq!(res.root().get_all("verbose"), &[Value::Int(4)]);
        assert_eq!(res.root().occurrences("verbose"), 4);

        let res = resolve(&tree, &[] as &[&str]);
        assert_eq!(res.root().get("verbose"), Some(&Value::Int(0)));
        assert!(!res.root().is_explicit("verbose"));
    }

    #[test]
    fn unique_argument_silences_requirements() {
        let tree = tree(
            Command::new("app")
                .arg(Argument::option("config").required(true))
                .arg(Argument::flag("json"))
                .arg(Argument::flag("yaml"))
                .group(ArgumentGroup::exactly_one("format").arg("json").arg("yaml"))
                .arg(Argument::flag("version").unique(true))
                .subcommand(
                    Command::new("run")
                        .arg(Argument::positional("script").required(true))
                        .arg(Argument::flag("help").short('h').unique(true)),
                ),
        );
        assert!(resolve(&tree, &["--version"]).is_ok());
        assert!(resolve(&tree, &["run", "-h"]).is_ok());

        let res = resolve(&tree, &["run"]);
        assert_eq!(
            kinds(&res),
            vec![
                "missing-required-argument",
                "group-constraint-violated",
                "missing-required-argument"
            ]
        );
        assert_eq!(res.root().errors().len(), 2);
        assert_eq!(res.leaf().errors().len(), 1);

        // Unique arguments do not excuse malformed input.
        let res = resolve(&tree, &["--version", "--bogus"]);
        assert_eq!(kinds(&res), vec!["unknown-flag"]);
    }

    #[test]
    fn value_of_walks_the_path() {
        let tree = tree(
            Command::new("app").subcommand(Command::new("get").arg(Argument::positional("key"))),
        );
        let res = resolve(&tree, &["get", "k"]);
        assert_eq!(value_of(&res, &["get"], "key"), Some(&Value::Str("k".into())));
        assert_eq!(value_of(&res, &["set"], "key"), None);
    }
}
