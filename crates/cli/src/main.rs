mod schema_file;

use anyhow::{Result, bail};
use argtree::{CommandId, CommandTree, Resolver, help};
use argtree_schema::ResolutionReport;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

use crate::schema_file::load_tree;

#[derive(Parser)]
#[command(name = "argtree")]
#[command(version, about = "Resolve command lines against a JSON command tree", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a command-tree schema
    Check(CheckArgs),

    /// Resolve arguments against a command-tree schema
    Resolve(ResolveArgs),

    /// Print help text for a command of the schema
    Help(HelpArgs),
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to the JSON schema
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,
}

#[derive(Parser)]
struct ResolveArgs {
    /// Path to the JSON schema
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,

    /// Only output the JSON report
    #[arg(long)]
    json: bool,

    /// Arguments to resolve (after `--`)
    #[arg(last = true, value_name = "ARGS")]
    args: Vec<String>,
}

#[derive(Parser)]
struct HelpArgs {
    /// Path to the JSON schema
    #[arg(value_name = "SCHEMA")]
    schema: PathBuf,

    /// Subcommand path, e.g. `remote add`
    #[arg(value_name = "COMMAND")]
    path: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => check_command(args),
        Commands::Resolve(args) => resolve_command(args),
        Commands::Help(args) => help_command(args),
    }
}

fn check_command(args: CheckArgs) -> Result<()> {
    tracing::debug!("executing check command");

    let tree = load_tree(&args.schema)?;
    eprintln!("OK: {}", args.schema.display());
    eprintln!("Commands: {}", tree.len());
    for node in tree.iter() {
        let path = tree.path(node.id()).join(" ");
        eprintln!("  {} ({} argument(s))", path, node.arguments().len());
    }
    Ok(())
}

fn resolve_command(args: ResolveArgs) -> Result<()> {
    tracing::debug!(args = args.args.len(), "executing resolve command");

    let tree = load_tree(&args.schema)?;
    let resolution = Resolver::new(&tree).resolve(args.args.as_slice());
    let report = ResolutionReport::new(&tree, &resolution);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        if !report.ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    println!("command: {}", report.command_path.join(" "));
    for command in &report.commands {
        for (name, arg) in &command.values {
            let values: Vec<String> = arg.values.iter().map(render_json_value).collect();
            let suffix = if arg.source == "default" { " (default)" } else { "" };
            println!("  {}.{} = {}{}", command.name, name, values.join(", "), suffix);
        }
    }

    if !report.errors.is_empty() {
        eprintln!();
        for err in &report.errors {
            match err.position {
                Some(pos) => eprintln!("error: {} (at argument {})", err.message, pos),
                None => eprintln!("error: {}", err.message),
            }
        }
        eprintln!();
        bail!("resolution failed with {} error(s)", report.errors.len());
    }

    Ok(())
}

fn render_json_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => match (map.get("key"), map.get("value")) {
            (Some(serde_json::Value::String(k)), Some(serde_json::Value::String(v))) => {
                format!("{k}={v}")
            }
            _ => value.to_string(),
        },
        other => other.to_string(),
    }
}

fn help_command(args: HelpArgs) -> Result<()> {
    tracing::debug!("executing help command");

    let tree = load_tree(&args.schema)?;
    let id = find_command(&tree, &args.path)?;
    print!("{}", help::render(&tree, id));
    Ok(())
}

fn find_command(tree: &CommandTree, path: &[String]) -> Result<CommandId> {
    match tree.find_path(path) {
        Some(id) => Ok(id),
        None => bail!(
            "unknown command path '{}' in '{}'",
            path.join(" "),
            tree.root().name()
        ),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
