//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use lanes_arch::{ArchSpec, LocationAddress, presets};

/// Load an architecture from a preset name or a YAML/JSON file.
pub fn load_arch(name_or_path: &str) -> Result<ArchSpec> {
    if let Some(preset) = presets::by_name(name_or_path) {
        return preset.with_context(|| format!("Failed to build preset '{name_or_path}'"));
    }
    if !Path::new(name_or_path).exists() {
        anyhow::bail!(
            "Unknown architecture '{name_or_path}'. Available presets: {}, or a YAML/JSON file",
            presets::PRESET_NAMES.join(", ")
        );
    }
    load_document(name_or_path)
}

/// Read a YAML or JSON document, chosen by extension.
pub fn load_document<T: DeserializeOwned>(path: &str) -> Result<T> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        anyhow::bail!("File not found: {path}");
    }

    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;

    let ext = path_obj.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext.to_lowercase().as_str() {
        "yaml" | "yml" => {
            serde_yaml_ng::from_str(&source).with_context(|| format!("Invalid YAML in {path}"))
        }
        _ => serde_json::from_str(&source).with_context(|| format!("Invalid JSON in {path}")),
    }
}

/// Parse a `WORD,SITE` pair.
pub fn parse_location(text: &str) -> Result<LocationAddress> {
    let (word, site) = text
        .split_once(',')
        .with_context(|| format!("Expected WORD,SITE but got '{text}'"))?;
    let word = word
        .trim()
        .parse()
        .with_context(|| format!("Invalid word id in '{text}'"))?;
    let site = site
        .trim()
        .parse()
        .with_context(|| format!("Invalid site id in '{text}'"))?;
    Ok(LocationAddress::new(word, site))
}
