use std::env;

mod app;
mod catalog;
mod config;
mod library;
mod mpris;
mod player;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging goes to stderr; redirect it when debugging under the TUI
    // (`RUST_LOG=debug attune 2>attune.log`).
    env_logger::init();

    if env::args().any(|a| a == "--init-config") {
        return write_default_config();
    }

    runtime::run()
}

/// Write the default configuration to the resolved config path, refusing to
/// overwrite an existing file.
fn write_default_config() -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = config::resolve_config_path() else {
        return Err("cannot resolve a config path (no HOME set)".into());
    };
    if path.exists() {
        return Err(format!("config already exists at {}", path.display()).into());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, config::Settings::default_toml()?)?;
    println!("wrote {}", path.display());
    Ok(())
}
