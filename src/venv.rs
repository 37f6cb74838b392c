// src/venv.rs

//! Virtual environment management.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::errors::Result;
use crate::packages::OpResult;
use crate::relay::{self, Relay};
use crate::toolchain::extract_version;

/// A discovered virtual environment.
#[derive(Debug, Clone, Serialize)]
pub struct VirtualEnv {
    pub name: String,
    pub path: PathBuf,
    pub python_version: String,
}

/// Location of the interpreter inside a venv directory.
pub fn interpreter_path(env_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        env_dir.join("Scripts").join("python.exe")
    } else {
        env_dir.join("bin").join("python")
    }
}

/// Create a virtual environment at `path`, via uv or the stdlib venv module.
pub async fn create(relay: &Relay, path: &Path, use_uv: bool) -> Result<OpResult> {
    let path = path.display();
    let command = if use_uv {
        format!("uv venv \"{path}\"")
    } else {
        format!("python -m venv \"{path}\"")
    };

    let out = relay::run(relay, &command).await?;
    Ok(out.into())
}

/// Scan `base` for virtual environments: any subdirectory containing a venv
/// interpreter counts. Each interpreter is probed for its Python version;
/// a probe that fails still lists the env, with version "unknown".
pub async fn list(base: &Path) -> Result<Vec<VirtualEnv>> {
    let mut envs = Vec::new();

    let mut entries = match tokio::fs::read_dir(base).await {
        Ok(entries) => entries,
        Err(err) => {
            debug!(base = %base.display(), error = %err, "venv base directory not readable");
            return Ok(envs);
        }
    };

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_dir() {
            continue;
        }

        let env_dir = entry.path();
        let interpreter = interpreter_path(&env_dir);
        if !interpreter.exists() {
            continue;
        }

        let out = relay::capture(&format!("\"{}\" --version", interpreter.display())).await?;
        let version = extract_version(&format!("{}\n{}", out.stdout, out.stderr), "Python")
            .unwrap_or_else(|| "unknown".to_string());

        envs.push(VirtualEnv {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: env_dir,
            python_version: version,
        });
    }

    Ok(envs)
}

/// Delete a virtual environment directory recursively.
pub async fn remove(path: &Path) -> Result<()> {
    tokio::fs::remove_dir_all(path).await?;
    Ok(())
}
