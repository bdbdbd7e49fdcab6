//! Command-line argument resolution.
//!
//! Describe the accepted commands with [`Command`], [`Argument`] and
//! [`ArgumentGroup`], validate them once with [`CommandTree::build`], then
//! resolve any number of argument vectors against the tree:
//!
//! ```
//! use argtree::{Argument, Arity, Command, CommandTree, Registry, Value, resolve};
//!
//! let root = Command::new("app").subcommand(
//!     Command::new("build")
//!         .arg(Argument::option("opt").short('o').arity(Arity::optional()).value_type("int"))
//!         .arg(Argument::positional("path").required(true)),
//! );
//! let tree = CommandTree::build(root, Registry::with_builtins()).unwrap();
//!
//! let resolution = resolve(&tree, &["build", "-o", "5", "src"]);
//! assert!(resolution.is_ok());
//! let build = resolution.leaf();
//! assert_eq!(build.get("opt"), Some(&Value::Int(5)));
//! assert_eq!(build.get("path"), Some(&Value::Str("src".into())));
//! ```
//!
//! Resolution never stops at the first problem: every error is collected in
//! [`Resolution::errors`] in the order it was detected.

pub mod convert;
pub mod error;
pub mod group;
pub mod help;
pub mod matches;
pub mod resolve;
pub mod token;
pub mod tree;

pub use convert::{ConversionError, Converter, Registry, Value};
pub use error::{BuildError, ErrorKind, GroupViolation, ResolveError};
pub use matches::{MatchedArg, ParsedCommand, Resolution, ValueSource};
pub use resolve::{Resolver, resolve};
pub use token::{FlagScope, Lexer, Token, TokenKind};
pub use tree::{
    Argument, ArgumentGroup, Arity, Command, CommandId, CommandNode, CommandTree, FlagName,
    GroupMember, Restriction, UsageCount,
};
