use anyhow::{Context, Result, bail};
use argtree::CommandTree;
use argtree_schema::CommandSchema;
use std::fs;
use std::path::Path;

/// Read and parse a JSON command-tree schema.
pub fn load_schema(path: &Path) -> Result<CommandSchema> {
    if !path.exists() {
        bail!("schema not found: {}", path.display());
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema: {}", path.display()))?;
    let schema: CommandSchema = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse schema JSON: {}", path.display()))?;
    tracing::debug!(path = %path.display(), root = %schema.name, "loaded schema");
    Ok(schema)
}

/// Load a schema and validate it into a command tree.
pub fn load_tree(path: &Path) -> Result<CommandTree> {
    let schema = load_schema(path)?;
    schema
        .build_tree()
        .with_context(|| format!("invalid schema: {}", path.display()))
}
