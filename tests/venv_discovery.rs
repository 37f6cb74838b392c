// tests/venv_discovery.rs

#![cfg(unix)]

use std::error::Error;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use pytoolbox::venv;
use pytoolbox_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// Lay down a directory that looks like a venv: `bin/python` is a stub
/// script announcing a version.
fn fake_venv(base: &Path, name: &str, version: &str) -> std::io::Result<()> {
    let bin = base.join(name).join("bin");
    fs::create_dir_all(&bin)?;
    let python = bin.join("python");
    fs::write(&python, format!("#!/bin/sh\necho \"Python {version}\"\n"))?;
    fs::set_permissions(&python, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[tokio::test]
async fn lists_only_directories_with_an_interpreter() -> TestResult {
    with_timeout(async {
        init_tracing();

        let dir = tempfile::tempdir()?;
        fake_venv(dir.path(), "proj-env", "3.11.5")?;
        fs::create_dir_all(dir.path().join("not-a-venv"))?;
        fs::write(dir.path().join("stray-file"), "")?;

        let envs = venv::list(dir.path()).await?;

        assert_eq!(envs.len(), 1);
        assert_eq!(envs[0].name, "proj-env");
        assert_eq!(envs[0].python_version, "3.11.5");

        Ok(())
    })
    .await
}

#[tokio::test]
async fn missing_base_directory_lists_nothing() -> TestResult {
    with_timeout(async {
        init_tracing();

        let envs = venv::list(Path::new("/definitely/not/a/real/base")).await?;
        assert!(envs.is_empty());

        Ok(())
    })
    .await
}

#[tokio::test]
async fn remove_deletes_the_environment_directory() -> TestResult {
    with_timeout(async {
        init_tracing();

        let dir = tempfile::tempdir()?;
        fake_venv(dir.path(), "doomed", "3.12.0")?;
        let env_path = dir.path().join("doomed");

        venv::remove(&env_path).await?;
        assert!(!env_path.exists());

        Ok(())
    })
    .await
}
