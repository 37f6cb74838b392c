// src/toolchain.rs

//! Interpreter and package-manager discovery.
//!
//! Probes run the tools' `--version` commands and extract the dotted
//! version; an absent tool simply yields `None`. Paths are resolved with
//! `which` (or `where` on Windows).

use std::collections::BTreeMap;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::errors::{Result, ToolboxError};
use crate::relay::{self, Relay};

/// Snapshot of the local Python toolchain.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EnvironmentInfo {
    pub python_version: Option<String>,
    pub pip_version: Option<String>,
    pub uv_version: Option<String>,
    pub python_path: Option<String>,
    pub pip_path: Option<String>,
    pub uv_path: Option<String>,
    /// Human-readable summary lines, one per probe.
    pub logs: Vec<String>,
}

/// Extract `<tool> <dotted version>` from command output.
pub fn extract_version(output: &str, tool: &str) -> Option<String> {
    let re = Regex::new(&format!(r"(?i){tool}\s+v?([\d.]+)")).ok()?;
    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_string())
}

/// Some tools (notably Python 2) print the version to stderr.
fn combined(out: &relay::CommandOutput) -> String {
    format!("{}\n{}", out.stdout, out.stderr)
}

/// Probe the Python interpreter version (`python`, falling back to
/// `python3`).
pub async fn python_version() -> Result<Option<String>> {
    let primary = relay::capture("python --version").await?;
    if let Some(version) = extract_version(&combined(&primary), "Python") {
        return Ok(Some(version));
    }

    let fallback = relay::capture("python3 --version").await?;
    Ok(extract_version(&combined(&fallback), "Python"))
}

/// Probe the pip version (`pip`, falling back to `python -m pip`).
pub async fn pip_version() -> Result<Option<String>> {
    let primary = relay::capture("pip --version").await?;
    if let Some(version) = extract_version(&combined(&primary), "pip") {
        return Ok(Some(version));
    }

    let fallback = relay::capture("python -m pip --version").await?;
    Ok(extract_version(&combined(&fallback), "pip"))
}

/// Probe the uv version.
pub async fn uv_version() -> Result<Option<String>> {
    let out = relay::capture("uv --version").await?;
    Ok(extract_version(&combined(&out), "uv"))
}

/// Resolve the first path of a tool on `PATH`, if any.
pub async fn tool_path(tool: &str) -> Result<Option<String>> {
    let lookup = if cfg!(windows) { "where" } else { "which" };
    let out = relay::capture(&format!("{lookup} {tool}")).await?;

    if !out.success() {
        return Ok(None);
    }

    Ok(out
        .stdout
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from))
}

fn summary(logs: &mut Vec<String>, label: &str, value: &Option<String>, absent: &str) {
    logs.push(format!(
        "{label}: {}",
        value.as_deref().unwrap_or(absent)
    ));
}

/// Probe the full toolchain, streaming every probe through the relay so the
/// log store shows what was run.
pub async fn environment_info(relay: &Relay) -> Result<EnvironmentInfo> {
    let mut info = EnvironmentInfo::default();

    let primary = relay::run(relay, "python --version").await?;
    info.python_version = extract_version(&combined(&primary), "Python");
    if info.python_version.is_none() {
        let fallback = relay::run(relay, "python3 --version").await?;
        info.python_version = extract_version(&combined(&fallback), "Python");
    }

    let primary = relay::run(relay, "pip --version").await?;
    info.pip_version = extract_version(&combined(&primary), "pip");
    if info.pip_version.is_none() {
        let fallback = relay::run(relay, "python -m pip --version").await?;
        info.pip_version = extract_version(&combined(&fallback), "pip");
    }

    let out = relay::run(relay, "uv --version").await?;
    info.uv_version = extract_version(&combined(&out), "uv");

    info.python_path = tool_path("python").await?;
    info.pip_path = tool_path("pip").await?;
    info.uv_path = tool_path("uv").await?;

    summary(&mut info.logs, "python version", &info.python_version, "not installed");
    summary(&mut info.logs, "pip version", &info.pip_version, "not installed");
    summary(&mut info.logs, "uv version", &info.uv_version, "not installed");
    summary(&mut info.logs, "python path", &info.python_path, "not found");
    summary(&mut info.logs, "pip path", &info.pip_path, "not found");
    summary(&mut info.logs, "uv path", &info.uv_path, "not found");

    debug!(
        python = ?info.python_version,
        pip = ?info.pip_version,
        uv = ?info.uv_version,
        "toolchain probed"
    );
    Ok(info)
}

/// Snapshot of the current process environment.
pub fn environment_variables() -> BTreeMap<String, String> {
    std::env::vars().collect()
}

/// Persist an environment variable for the user.
///
/// Only supported on Windows (via `setx`); elsewhere shell profiles have to
/// be edited by hand, which is the caller's problem to surface.
pub async fn set_environment_variable(key: &str, value: &str) -> Result<()> {
    if !cfg!(windows) {
        return Err(ToolboxError::Unsupported(
            "persistent environment variables require editing the shell profile".to_string(),
        ));
    }

    let out = relay::capture(&format!("setx {key} \"{value}\"")).await?;
    if !out.success() {
        return Err(ToolboxError::PackageManager(format!(
            "setx failed with exit code {}: {}",
            out.exit_code,
            out.stderr.trim()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_dotted_versions() {
        assert_eq!(
            extract_version("Python 3.12.1", "Python"),
            Some("3.12.1".to_string())
        );
        assert_eq!(
            extract_version(
                "pip 24.0 from /usr/lib/python3/dist-packages/pip (python 3.12)",
                "pip"
            ),
            Some("24.0".to_string())
        );
        assert_eq!(extract_version("uv 0.5.9 (linux)", "uv"), Some("0.5.9".to_string()));
        assert_eq!(extract_version("command not found", "Python"), None);
    }
}
