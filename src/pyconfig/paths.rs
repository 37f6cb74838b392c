// src/pyconfig/paths.rs

//! Default on-disk locations for toolchain config files, plus the file IO.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::anyhow;
use tracing::debug;

use crate::errors::Result;

/// Default location of pip's user config file.
///
/// `%USERPROFILE%\pip\pip.ini` on Windows, `~/.pip/pip.conf` elsewhere.
pub fn pip_config_path() -> Result<PathBuf> {
    let home = dirs_next::home_dir().ok_or_else(|| anyhow!("cannot determine home directory"))?;

    if cfg!(windows) {
        Ok(home.join("pip").join("pip.ini"))
    } else {
        Ok(home.join(".pip").join("pip.conf"))
    }
}

/// Default location of uv's user config file under the platform config dir.
pub fn uv_config_path() -> Result<PathBuf> {
    let config =
        dirs_next::config_dir().ok_or_else(|| anyhow!("cannot determine config directory"))?;
    Ok(config.join("uv").join("uv.toml"))
}

/// Read a config file, treating a missing file as empty content.
pub fn read_config(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not present; treating as empty");
            Ok(String::new())
        }
        Err(err) => Err(err.into()),
    }
}

/// Write a config file, creating parent directories as needed.
pub fn write_config(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("pip.conf");
        assert_eq!(read_config(&path).unwrap(), "");
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pip").join("pip.ini");
        write_config(&path, "[global]\ntimeout = 60").unwrap();
        assert!(read_config(&path).unwrap().contains("timeout = 60"));
    }
}
