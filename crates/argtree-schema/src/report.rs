use argtree::{CommandTree, ParsedCommand, Resolution, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// JSON rendering of a single converted value.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Float(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Str(s) => serde_json::Value::String(s.clone()),
        Value::Path(p) => serde_json::Value::String(p.display().to_string()),
        Value::Pair(k, v) => serde_json::json!({ "key": k, "value": v }),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ArgReport {
    pub values: Vec<serde_json::Value>,
    pub occurrences: usize,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct CommandReport {
    pub name: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub values: IndexMap<String, ArgReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ErrorReport {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<String>,
    pub message: String,
}

/// Serializable summary of a [`Resolution`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ResolutionReport {
    pub ok: bool,
    pub command_path: Vec<String>,
    pub commands: Vec<CommandReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorReport>,
}

impl ResolutionReport {
    pub fn new(tree: &CommandTree, resolution: &Resolution) -> Self {
        let commands = resolution.chain().map(command_report).collect();
        let errors = resolution
            .errors()
            .iter()
            .map(|err| ErrorReport {
                kind: err.kind.name().to_string(),
                position: err.position,
                command: tree.path(err.command).join(" "),
                argument: err.argument().map(str::to_string),
                message: err.to_string(),
            })
            .collect();
        Self {
            ok: resolution.is_ok(),
            command_path: resolution
                .command_path(tree)
                .into_iter()
                .map(str::to_string)
                .collect(),
            commands,
            errors,
        }
    }
}

fn command_report(parsed: &ParsedCommand) -> CommandReport {
    CommandReport {
        name: parsed.name().to_string(),
        values: parsed
            .arguments()
            .map(|(name, matched)| {
                (
                    name.to_string(),
                    ArgReport {
                        values: matched.values().iter().map(value_to_json).collect(),
                        occurrences: matched.occurrences(),
                        source: matched.source().as_str().to_string(),
                    },
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandSchema;
    use argtree::resolve;

    #[test]
    fn report_lists_path_values_and_errors() {
        let schema: CommandSchema = serde_json::from_str(
            r#"{
                "name": "kv",
                "subcommands": [{
                    "name": "set",
                    "args": [
                        { "name": "pair", "value-type": "key-value", "values": "1.." },
                        { "name": "ttl", "long": "ttl", "takes-value": true, "value-type": "int",
                          "default-value": "60" }
                    ]
                }]
            }"#,
        )
        .unwrap();
        let tree = schema.build_tree().unwrap();

        let res = resolve(&tree, &["set", "a=1", "b=2"]);
        let report = ResolutionReport::new(&tree, &res);
        assert!(report.ok);
        assert_eq!(report.command_path, vec!["kv", "set"]);
        assert_eq!(report.commands.len(), 2);
        let set = &report.commands[1];
        assert_eq!(set.values["pair"].values.len(), 2);
        assert_eq!(
            set.values["pair"].values[0],
            serde_json::json!({ "key": "a", "value": "1" })
        );
        assert_eq!(set.values["ttl"].source, "default");
        assert_eq!(set.values["ttl"].values, vec![serde_json::json!(60)]);

        let res = resolve(&tree, &["set", "a=1", "--ttl", "soon"]);
        let report = ResolutionReport::new(&tree, &res);
        assert!(!report.ok);
        assert_eq!(report.errors.len(), 1);
        let err = &report.errors[0];
        assert_eq!(err.kind, "conversion-failure");
        assert_eq!(err.command, "kv set");
        assert_eq!(err.argument.as_deref(), Some("--ttl"));
        assert_eq!(err.position, Some(3));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["command-path"], serde_json::json!(["kv", "set"]));
        assert_eq!(json["errors"][0]["kind"], "conversion-failure");
    }

    #[test]
    fn float_values_stay_numbers() {
        assert_eq!(value_to_json(&Value::Float(1.5)), serde_json::json!(1.5));
        assert_eq!(
            value_to_json(&Value::Pair("k".into(), "v".into())),
            serde_json::json!({ "key": "k", "value": "v" })
        );
    }
}
