// src/pyconfig/mod.rs

//! Mirror/proxy configuration files for the Python toolchain.
//!
//! - [`pip`] handles the INI dialect used by `pip.conf` / `pip.ini`.
//! - [`uv`] handles uv's TOML configuration (`uv.toml` or `[tool.uv]`).
//! - [`paths`] resolves the default on-disk locations and does the file IO.

pub mod paths;
pub mod pip;
pub mod uv;

pub use pip::{generate_pip_config, parse_pip_config, ConfigValue};
pub use uv::{generate_uv_config, parse_uv_config};
