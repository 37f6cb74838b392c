// src/pyconfig/pip.rs

//! pip configuration file (INI dialect) parsing and generation.
//!
//! pip flattens its sections when reading options, so parsing returns a
//! single key/value map regardless of which section a key appeared in.
//! Generation re-distributes known keys into `[global]`, `[install]` and
//! `[download]`; unknown keys land in `[global]`.

use std::collections::BTreeMap;

/// Value of a pip config entry. Bare keys (no `=`) are boolean flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    Str(String),
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Str(s.to_string())
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

/// Keys belonging to `[global]`.
const GLOBAL_KEYS: &[&str] = &[
    "index-url",
    "extra-index-url",
    "trusted-host",
    "find-links",
    "no-index",
    "timeout",
    "retries",
    "proxy",
    "cert",
    "client-cert",
    "cache-dir",
    "no-cache-dir",
    "require-virtualenv",
    "log",
    "log-file",
    "verbose",
    "quiet",
    "progress-bar",
    "disable-pip-version-check",
    "isolated",
    "use-feature",
    "build-dir",
    "src",
    "dist-dir",
];

/// Keys belonging to `[install]`.
const INSTALL_KEYS: &[&str] = &[
    "upgrade",
    "upgrade-strategy",
    "force-reinstall",
    "no-deps",
    "pre",
    "user",
    "target",
    "prefix",
    "root",
    "install-option",
    "global-option",
    "compile",
    "no-compile",
    "no-warn-script-location",
    "no-warn-conflicts",
    "ignore-installed",
    "no-build-isolation",
    "use-pep517",
    "no-use-pep517",
    "constraint",
];

/// Keys belonging to `[download]`.
const DOWNLOAD_KEYS: &[&str] = &[
    "dest",
    "platform",
    "python-version",
    "implementation",
    "abi",
    "only-binary",
    "no-binary",
    "prefer-binary",
    "no-clean",
];

fn section_for(key: &str) -> &'static str {
    if GLOBAL_KEYS.contains(&key) {
        "global"
    } else if INSTALL_KEYS.contains(&key) {
        "install"
    } else if DOWNLOAD_KEYS.contains(&key) {
        "download"
    } else {
        // Keys we don't recognise still belong somewhere pip will read them.
        "global"
    }
}

/// Parse `pip.conf` / `pip.ini` content into a flat key/value map.
///
/// Section headers are consumed but not kept; `#` and `;` start comments;
/// a line without `=` becomes a boolean `true` flag.
pub fn parse_pip_config(content: &str) -> BTreeMap<String, ConfigValue> {
    let mut result = BTreeMap::new();

    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            continue;
        }

        match trimmed.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                result.insert(
                    key.trim().to_string(),
                    ConfigValue::Str(value.trim().to_string()),
                );
            }
            _ => {
                result.insert(trimmed.to_string(), ConfigValue::Bool(true));
            }
        }
    }

    result
}

/// Render a key/value map back into pip INI text.
///
/// Empty string values and `false` flags are omitted; `true` flags become
/// bare keys. Sections are emitted in global/install/download order and
/// empty sections are skipped.
pub fn generate_pip_config(config: &BTreeMap<String, ConfigValue>) -> String {
    let mut sections: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();

    for (key, value) in config {
        let rendered = match value {
            ConfigValue::Bool(false) => continue,
            ConfigValue::Bool(true) => key.clone(),
            ConfigValue::Str(s) if s.is_empty() => continue,
            ConfigValue::Str(s) => format!("{key} = {s}"),
        };
        sections.entry(section_for(key)).or_default().push(rendered);
    }

    let mut lines = Vec::new();
    for section in ["global", "install", "download"] {
        if let Some(entries) = sections.get(section) {
            if entries.is_empty() {
                continue;
            }
            lines.push(format!("[{section}]"));
            lines.extend(entries.iter().cloned());
            lines.push(String::new());
        }
    }

    lines.join("\n").trim().to_string()
}
