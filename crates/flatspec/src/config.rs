//! Assembles a [`FlattenConfig`] from the config file and command-line flags.

use std::path::Path;

use flatspec_flatten::{FlattenConfig, FlattenError, FlattenManifest};

/// Parse a `KEY=VALUE` command-line argument.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Load the optional `flatspec.yaml` and layer `--option` / `--name-mapping` flags on top.
pub fn load_config(
    path: Option<&Path>,
    options: &[(String, String)],
    name_mappings: &[(String, String)],
) -> Result<FlattenConfig, FlattenError> {
    let manifest = match path {
        Some(path) => FlattenManifest::load(path)?,
        None => FlattenManifest::default(),
    };
    manifest
        .with_overrides(options.iter().cloned(), name_mappings.iter().cloned())
        .to_config()
}
