// src/lib.rs

pub mod cli;
pub mod errors;
pub mod logging;
pub mod logstore;
pub mod packages;
pub mod pyconfig;
pub mod relay;
pub mod toolchain;
pub mod venv;
pub mod version;

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::cli::{CliArgs, Command, ConfigCommand, ConfigTool, VenvCommand};
use crate::errors::{Result, ToolboxError};
use crate::logstore::LogStore;
use crate::packages::PackageManager;
use crate::relay::{CommandEvent, LogLevel, Relay};

/// High-level entry point used by `main.rs`.
///
/// Wires together the relay, the log store subscriber (which also echoes
/// streamed lines to the terminal) and the subcommand handlers.
pub async fn run(args: CliArgs) -> Result<()> {
    let relay = Arc::new(Relay::new());
    let store = Arc::new(Mutex::new(LogStore::new()));
    let echo_task = spawn_echo_subscriber(&relay, Arc::clone(&store));

    let manager = if args.pip {
        PackageManager::Pip
    } else {
        PackageManager::Uv
    };

    let outcome = dispatch(args.command, &relay, manager).await;

    // Dropping the last relay handle closes the subscriber channel; waiting
    // for the task ensures every streamed line reached the terminal.
    drop(relay);
    let _ = echo_task.await;

    outcome
}

/// Subscribe the log store to the relay and echo streamed lines live.
fn spawn_echo_subscriber(relay: &Relay, store: Arc<Mutex<LogStore>>) -> JoinHandle<()> {
    let mut rx = relay.subscribe_all();

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let CommandEvent::Log { line, level, .. } = &event {
                match level {
                    LogLevel::Error => eprintln!("{line}"),
                    _ => println!("{line}"),
                }
            }
            store.lock().expect("log store poisoned").apply(event);
        }
        debug!("echo subscriber finished");
    })
}

async fn dispatch(command: Command, relay: &Arc<Relay>, manager: PackageManager) -> Result<()> {
    match command {
        Command::Info { json } => {
            let info = toolchain::environment_info(relay).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                for line in &info.logs {
                    println!("{line}");
                }
            }
            Ok(())
        }

        Command::Exec { command } => {
            let command = command.join(" ");
            let out = relay::run(relay, &command).await?;
            if !out.success() {
                return Err(ToolboxError::PackageManager(format!(
                    "command exited with code {}",
                    out.exit_code
                )));
            }
            Ok(())
        }

        Command::List { json } => {
            let list = packages::list(relay, manager).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&list.packages)?);
            } else {
                for pkg in &list.packages {
                    println!("{} {}", pkg.name, pkg.version);
                }
            }
            Ok(())
        }

        Command::Install { name } => {
            let result = packages::install(relay, manager, &name).await?;
            op_outcome("install", &name, result.success)
        }

        Command::Update { name } => {
            let result = packages::update(relay, manager, &name).await?;
            op_outcome("update", &name, result.success)
        }

        Command::UpdateAll { names, jobs } => {
            let total = names.len();
            let reports =
                packages::batch_update(Arc::clone(relay), manager, names, jobs).await;

            let mut failed = 0;
            for report in &reports {
                if report.success {
                    println!("updated {}", report.name);
                } else {
                    failed += 1;
                    println!("failed  {}", report.name);
                }
            }

            if failed > 0 {
                return Err(ToolboxError::PackageManager(format!(
                    "{failed} of {total} updates failed"
                )));
            }
            Ok(())
        }

        Command::Uninstall { name } => {
            let result = packages::uninstall(relay, manager, &name).await?;
            op_outcome("uninstall", &name, result.success)
        }

        Command::Check { name } => {
            let result = packages::check(&name).await?;
            if result.installed {
                println!(
                    "{name} is installed ({})",
                    result.version.as_deref().unwrap_or("version unknown")
                );
            } else {
                println!("{name} is not installed");
            }
            Ok(())
        }

        Command::Latest { name } => {
            let Some(latest) = packages::latest_version(&name).await? else {
                println!("no version information for {name}");
                return Ok(());
            };

            let installed = packages::check(&name).await?;
            match installed.version {
                Some(current) if version::has_update(&current, &latest) => {
                    let kind = match version::update_type(&current, &latest) {
                        version::UpdateType::Major => "major",
                        version::UpdateType::Minor => "minor",
                        version::UpdateType::Patch => "patch",
                    };
                    println!("{latest} ({kind} update from {current})");
                }
                Some(current) => println!("{latest} (installed {current} is up to date)"),
                None => println!("{latest}"),
            }
            Ok(())
        }

        Command::Search { keyword } => {
            for hit in packages::search(&keyword).await? {
                println!("{} ({}) - {}", hit.name, hit.version, hit.description);
            }
            Ok(())
        }

        Command::Venv(cmd) => run_venv(cmd, relay).await,

        Command::Config(cmd) => run_config(cmd),
    }
}

fn op_outcome(op: &str, name: &str, success: bool) -> Result<()> {
    if success {
        println!("{op} {name}: ok");
        Ok(())
    } else {
        Err(ToolboxError::PackageManager(format!("{op} {name} failed")))
    }
}

async fn run_venv(cmd: VenvCommand, relay: &Arc<Relay>) -> Result<()> {
    match cmd {
        VenvCommand::Create { path, uv } => {
            let result = venv::create(relay, &path, uv).await?;
            op_outcome("venv create", &path.display().to_string(), result.success)
        }

        VenvCommand::List { base } => {
            for env in venv::list(&base).await? {
                println!("{}\t{}\t{}", env.name, env.python_version, env.path.display());
            }
            Ok(())
        }

        VenvCommand::Remove { path } => {
            venv::remove(&path).await?;
            println!("removed {}", path.display());
            Ok(())
        }
    }
}

fn run_config(cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Path { tool } => {
            println!("{}", config_path(tool)?.display());
            Ok(())
        }

        ConfigCommand::Show { tool } => {
            let path = config_path(tool)?;
            let content = pyconfig::paths::read_config(&path)?;
            match tool {
                ConfigTool::Pip => {
                    for (key, value) in pyconfig::parse_pip_config(&content) {
                        match value {
                            pyconfig::ConfigValue::Bool(flag) => println!("{key} = {flag}"),
                            pyconfig::ConfigValue::Str(s) => println!("{key} = {s}"),
                        }
                    }
                }
                ConfigTool::Uv => {
                    for (key, value) in pyconfig::parse_uv_config(&content)? {
                        println!("{key} = {value}");
                    }
                }
            }
            Ok(())
        }

        ConfigCommand::Set { key, value, tool } => {
            let path = config_path(tool)?;
            let content = pyconfig::paths::read_config(&path)?;

            let rendered = match tool {
                ConfigTool::Pip => {
                    let mut config = pyconfig::parse_pip_config(&content);
                    config.insert(key, pyconfig::ConfigValue::Str(value));
                    pyconfig::generate_pip_config(&config)
                }
                ConfigTool::Uv => {
                    let mut config = pyconfig::parse_uv_config(&content)?;
                    config.insert(key, parse_toml_scalar(&value));
                    pyconfig::generate_uv_config(&config)
                }
            };

            pyconfig::paths::write_config(&path, &rendered)?;
            println!("wrote {}", path.display());
            Ok(())
        }
    }
}

fn config_path(tool: ConfigTool) -> Result<std::path::PathBuf> {
    match tool {
        ConfigTool::Pip => pyconfig::paths::pip_config_path(),
        ConfigTool::Uv => pyconfig::paths::uv_config_path(),
    }
}

/// Interpret a CLI value as the most specific TOML scalar it parses as.
fn parse_toml_scalar(value: &str) -> toml::Value {
    if let Ok(b) = value.parse::<bool>() {
        toml::Value::Boolean(b)
    } else if let Ok(i) = value.parse::<i64>() {
        toml::Value::Integer(i)
    } else {
        toml::Value::String(value.to_string())
    }
}
