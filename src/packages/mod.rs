// src/packages/mod.rs

//! Global package operations via pip or `uv pip`.
//!
//! Every mutation runs through the relay so its output streams into the log
//! store; read-only probes (`check`, `latest`, `search`) use the quiet
//! capture path, matching how the original tool behaved. Output parsers are
//! split out as pure functions so they can be tested against canned text.

pub mod batch;

pub use batch::{batch_update, run_pool, UpdateReport, DEFAULT_JOBS};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::Result;
use crate::relay::{self, Relay};

/// Which package manager backs an operation. `Uv` drives `uv pip`, keeping
/// the same CLI surface as plain pip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackageManager {
    Pip,
    #[default]
    Uv,
}

impl PackageManager {
    pub fn prefix(&self) -> &'static str {
        match self {
            PackageManager::Pip => "pip",
            PackageManager::Uv => "uv pip",
        }
    }
}

/// One installed package as reported by `pip list --format=json`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
}

/// Result of a list operation; raw output is kept so callers can surface it
/// when parsing yields nothing.
#[derive(Debug, Clone, Serialize)]
pub struct PackageList {
    pub packages: Vec<InstalledPackage>,
    pub stdout: String,
    pub stderr: String,
}

/// Result of an install/update/uninstall.
#[derive(Debug, Clone, Serialize)]
pub struct OpResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<relay::CommandOutput> for OpResult {
    fn from(out: relay::CommandOutput) -> Self {
        OpResult {
            success: out.success(),
            stdout: out.stdout,
            stderr: out.stderr,
        }
    }
}

/// Parse `pip list --format=json` output. Anything unparseable yields an
/// empty list rather than an error; pip versions differ in what they print
/// around the JSON.
pub fn parse_pip_list(json: &str) -> Vec<InstalledPackage> {
    match serde_json::from_str(json.trim()) {
        Ok(packages) => packages,
        Err(err) => {
            warn!(error = %err, "could not parse package list JSON");
            Vec::new()
        }
    }
}

/// List globally installed packages.
pub async fn list(relay: &Relay, manager: PackageManager) -> Result<PackageList> {
    let out = relay::run(relay, &format!("{} list --format=json", manager.prefix())).await?;

    let packages = if out.success() {
        parse_pip_list(&out.stdout)
    } else {
        Vec::new()
    };

    Ok(PackageList {
        packages,
        stdout: out.stdout,
        stderr: out.stderr,
    })
}

/// Install a package globally.
pub async fn install(relay: &Relay, manager: PackageManager, name: &str) -> Result<OpResult> {
    let out = relay::run(relay, &format!("{} install {name}", manager.prefix())).await?;
    Ok(out.into())
}

/// Upgrade a package to its latest version.
pub async fn update(relay: &Relay, manager: PackageManager, name: &str) -> Result<OpResult> {
    let out = relay::run(
        relay,
        &format!("{} install --upgrade {name}", manager.prefix()),
    )
    .await?;
    Ok(out.into())
}

/// Uninstall a package without prompting.
pub async fn uninstall(relay: &Relay, manager: PackageManager, name: &str) -> Result<OpResult> {
    let out = relay::run(relay, &format!("{} uninstall -y {name}", manager.prefix())).await?;
    Ok(out.into())
}

/// Installed-or-not probe via `pip show`.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub installed: bool,
    pub version: Option<String>,
}

/// Extract the `Version:` line from `pip show` output.
pub fn parse_show_version(output: &str) -> Option<String> {
    let re = Regex::new(r"Version:\s+(\S+)").ok()?;
    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check whether a package is installed (always asks pip; `uv pip show`
/// output is compatible but the original probed pip).
pub async fn check(name: &str) -> Result<CheckResult> {
    let out = relay::capture(&format!("pip show {name}")).await?;

    if !out.success() {
        return Ok(CheckResult {
            installed: false,
            version: None,
        });
    }

    Ok(CheckResult {
        installed: true,
        version: parse_show_version(&out.stdout),
    })
}

/// Extract the newest entry from `pip index versions` output.
pub fn parse_available_versions(output: &str) -> Option<String> {
    let re = Regex::new(r"Available versions:\s+([^\s,]+)").ok()?;
    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Query the latest available version of a package.
pub async fn latest_version(name: &str) -> Result<Option<String>> {
    let out = relay::capture(&format!("pip index versions {name}")).await?;
    if !out.success() {
        return Ok(None);
    }
    Ok(parse_available_versions(&out.stdout))
}

/// One `pip search` hit.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SearchResult {
    pub name: String,
    pub version: String,
    pub description: String,
}

/// Parse `name (version) - description` lines from `pip search` output.
pub fn parse_search_output(output: &str) -> Vec<SearchResult> {
    let Ok(re) = Regex::new(r"^(\S+)\s+\(([^)]+)\)\s+-\s+(.+)$") else {
        return Vec::new();
    };

    output
        .lines()
        .filter_map(|line| {
            let caps = re.captures(line)?;
            Some(SearchResult {
                name: caps[1].to_string(),
                version: caps[2].to_string(),
                description: caps[3].trim().to_string(),
            })
        })
        .collect()
}

/// Search PyPI through pip. Failures (the XML-RPC search API is frequently
/// disabled server-side) come back as an empty list.
pub async fn search(keyword: &str) -> Result<Vec<SearchResult>> {
    let out = relay::capture(&format!("pip search \"{keyword}\"")).await?;
    if !out.success() {
        return Ok(Vec::new());
    }
    Ok(parse_search_output(&out.stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pip_list_json() {
        let json = r#"[{"name": "requests", "version": "2.32.3"}, {"name": "flask", "version": "3.1.0"}]"#;
        let packages = parse_pip_list(json);
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].name, "requests");
        assert_eq!(packages[1].version, "3.1.0");
    }

    #[test]
    fn malformed_list_json_yields_empty() {
        assert!(parse_pip_list("WARNING: something went wrong").is_empty());
        assert!(parse_pip_list("").is_empty());
    }

    #[test]
    fn parses_show_version() {
        let output = "Name: requests\nVersion: 2.32.3\nSummary: HTTP for Humans.";
        assert_eq!(parse_show_version(output), Some("2.32.3".to_string()));
        assert_eq!(parse_show_version("Name: requests"), None);
    }

    #[test]
    fn parses_index_versions() {
        let output = "requests (2.32.3)\nAvailable versions: 2.32.3, 2.32.2, 2.31.0";
        assert_eq!(parse_available_versions(output), Some("2.32.3".to_string()));
    }

    #[test]
    fn parses_search_lines() {
        let output = "\
requests (2.32.3)        - Python HTTP for Humans.
requests-cache (1.2.1)   - Persistent cache for requests
not a result line
";
        let results = parse_search_output(output);
        assert_eq!(results.len(), 2);
        assert_eq!(
            results[0],
            SearchResult {
                name: "requests".to_string(),
                version: "2.32.3".to_string(),
                description: "Python HTTP for Humans.".to_string(),
            }
        );
    }

    #[test]
    fn manager_prefixes() {
        assert_eq!(PackageManager::Pip.prefix(), "pip");
        assert_eq!(PackageManager::Uv.prefix(), "uv pip");
    }
}
