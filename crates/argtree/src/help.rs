//! Plain-text help for one command of a [`CommandTree`].

use crate::tree::{Argument, ArgumentGroup, CommandId, CommandTree, GroupMember};

fn value_placeholder(arg: &Argument) -> String {
    let name = arg.placeholder();
    let arity = arg.get_arity();
    let one = if arity.min() == 0 {
        format!("[<{name}>]")
    } else {
        format!("<{name}>")
    };
    match arity.max() {
        Some(0) => String::new(),
        Some(1) => one,
        Some(max) if max == arity.min() => vec![one; max].join(" "),
        _ => format!("{one}..."),
    }
}

fn format_arg_left(arg: &Argument) -> String {
    if arg.is_positional() {
        let n = arg.placeholder();
        let mut out = if arg.is_required() {
            format!("<{n}>")
        } else {
            format!("[{n}]")
        };
        if arg.get_arity().max() != Some(1) {
            out.push_str("...");
        }
        return out;
    }

    let mut names: Vec<String> = arg.shorts().iter().map(|c| format!("-{c}")).collect();
    names.extend(arg.longs().iter().map(|l| format!("--{l}")));
    let mut out = names.join(", ");
    let values = value_placeholder(arg);
    if !values.is_empty() {
        out.push(' ');
        out.push_str(&values);
    }
    out
}

fn format_arg_help(arg: &Argument) -> String {
    let mut parts = Vec::new();
    let help = arg.get_help().trim();
    if !help.is_empty() {
        parts.push(help.to_string());
    }
    if arg.is_required() && !arg.is_positional() {
        parts.push("(required)".to_string());
    }
    if let Some(default) = arg.get_default_value() {
        parts.push(format!("[default: {default}]"));
    }
    parts.join(" ")
}

fn push_rows(out: &mut String, title: &str, rows: Vec<(String, String)>) {
    if rows.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {}\n", left));
        } else {
            out.push_str(&format!("  {:width$}  {}\n", left, help, width = width));
        }
    }
}

fn describe_group(group: &ArgumentGroup, tree: &CommandTree, id: CommandId) -> String {
    let node = tree.command(id);
    let members: Vec<String> = group
        .members()
        .iter()
        .map(|m| match m {
            GroupMember::Argument(name) => node
                .argument(name)
                .map(Argument::display_name)
                .unwrap_or_else(|| name.clone()),
            GroupMember::Group(inner) => format!("[{}]", inner.name()),
        })
        .collect();
    format!("{}: {}", group.restriction(), members.join(", "))
}

fn collect_groups<'g>(groups: &'g [ArgumentGroup], out: &mut Vec<&'g ArgumentGroup>) {
    for group in groups {
        out.push(group);
        for member in group.members() {
            if let GroupMember::Group(inner) = member {
                collect_groups(std::slice::from_ref(inner), out);
            }
        }
    }
}

/// Usage line: `app build [OPTIONS] <PATH> <COMMAND>`.
pub fn usage(tree: &CommandTree, id: CommandId) -> String {
    let node = tree.command(id);
    let mut parts: Vec<String> = tree.path(id).iter().map(|s| s.to_string()).collect();
    if node.arguments().iter().any(|a| !a.is_positional() && !a.is_hidden()) {
        parts.push("[OPTIONS]".to_string());
    }
    for arg in node.positionals().filter(|a| !a.is_hidden()) {
        if arg.is_forward() {
            parts.push(format!("[{}]...", arg.placeholder()));
        } else {
            parts.push(format_arg_left(arg));
        }
    }
    if node.has_subcommands() {
        parts.push("<COMMAND>".to_string());
    }
    parts.join(" ")
}

/// Render the help text of command `id`.
pub fn render(tree: &CommandTree, id: CommandId) -> String {
    let node = tree.command(id);
    let mut out = String::new();
    let title = tree.path(id).join(" ");
    if node.about().trim().is_empty() {
        out.push_str(&title);
        out.push('\n');
    } else {
        out.push_str(&format!("{} - {}\n", title, node.about().trim()));
    }

    out.push_str(&format!("\nUsage: {}\n", usage(tree, id)));

    let visible = || node.arguments().iter().filter(|a| !a.is_hidden());
    push_rows(
        &mut out,
        "Arguments",
        visible()
            .filter(|a| a.is_positional())
            .map(|a| (format_arg_left(a), format_arg_help(a)))
            .collect(),
    );
    push_rows(
        &mut out,
        "Options",
        visible()
            .filter(|a| !a.is_positional())
            .map(|a| (format_arg_left(a), format_arg_help(a)))
            .collect(),
    );
    push_rows(
        &mut out,
        "Commands",
        tree.children(id)
            .map(|child| {
                let mut left = child.name().to_string();
                if !child.aliases().is_empty() {
                    left.push_str(&format!(" ({})", child.aliases().join(", ")));
                }
                (left, child.about().trim().to_string())
            })
            .collect(),
    );

    let mut groups = Vec::new();
    collect_groups(node.groups(), &mut groups);
    push_rows(
        &mut out,
        "Groups",
        groups
            .into_iter()
            .map(|g| (g.name().to_string(), describe_group(g, tree, id)))
            .collect(),
    );

    out
}
