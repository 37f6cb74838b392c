// src/pyconfig/uv.rs

//! uv configuration (TOML) parsing and generation.
//!
//! uv reads either a standalone `uv.toml` (top-level keys) or the
//! `[tool.uv]` table of a `pyproject.toml`; [`parse_uv_config`] accepts
//! both. Generation writes a `[tool.uv]` document with keys grouped by
//! rough category, inferred from the key name.

use std::collections::BTreeMap;

use toml::Value;

use crate::errors::Result;

/// Parse uv TOML content into a flat key/value map.
///
/// If the document contains a `[tool.uv]` table, only that table is used;
/// otherwise every top-level non-table key counts.
pub fn parse_uv_config(content: &str) -> Result<BTreeMap<String, Value>> {
    let doc: toml::Table = toml::from_str(content)?;

    let table = match doc.get("tool").and_then(|t| t.get("uv")).and_then(Value::as_table) {
        Some(uv) => uv.clone(),
        None => doc,
    };

    Ok(table
        .into_iter()
        .filter(|(_, value)| !value.is_table())
        .collect())
}

/// Ordered output categories with their header comments.
const CATEGORIES: &[(&str, &str)] = &[
    ("index", "# index / mirror settings"),
    ("cache", "# cache settings"),
    ("python", "# python version settings"),
    ("network", "# network settings"),
    ("build", "# build settings"),
    ("other", "# other settings"),
];

fn category_for(key: &str) -> &'static str {
    if key.contains("index") || key.contains("url") {
        "index"
    } else if key.contains("cache") {
        "cache"
    } else if key.contains("python") {
        "python"
    } else if key.contains("timeout") || key.contains("retries") || key.contains("cert") {
        "network"
    } else if key.contains("build") || key.contains("compile") {
        "build"
    } else {
        "other"
    }
}

/// Render a key/value map as a `[tool.uv]` TOML document.
///
/// Keys are grouped by category with a comment header per group; values are
/// rendered through `toml::Value`'s TOML representation.
pub fn generate_uv_config(config: &BTreeMap<String, Value>) -> String {
    let mut grouped: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();

    for (key, value) in config {
        if matches!(value, Value::String(s) if s.is_empty()) {
            continue;
        }
        grouped
            .entry(category_for(key))
            .or_default()
            .push(format!("{key} = {value}"));
    }

    let mut lines = vec!["[tool.uv]".to_string()];
    for (category, header) in CATEGORIES {
        if let Some(entries) = grouped.get(category) {
            lines.push(header.to_string());
            lines.extend(entries.iter().cloned());
            lines.push(String::new());
        }
    }

    lines.join("\n").trim().to_string()
}
