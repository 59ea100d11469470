//! CLI wiring probe.
//!
//! # Responsibility
//! - Load an optional JSON config and build a `Manager` from it.
//! - Run one empty transaction lifecycle to verify core crate wiring.
//!
//! Usage: `daoreg_cli [CONFIG_JSON]`; set `DAOREG_LOG_DIR` to an absolute
//! directory to write lifecycle events to rotating log files.

use daoreg_core::{
    core_version, default_log_level, init_logging, DaoError, Manager, ManagerConfig,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("daoreg_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: Option<String>) -> Result<(), String> {
    println!("daoreg_core version={}", core_version());
    if let Ok(log_dir) = std::env::var("DAOREG_LOG_DIR") {
        init_logging(default_log_level(), &log_dir).map_err(|err| err.to_string())?;
    }

    let config = match config_path {
        Some(path) => ManagerConfig::load(&path).map_err(|err| format!("{path}: {err}"))?,
        None => ManagerConfig::default(),
    };
    let manager = Manager::with_config(config).map_err(|err| err.to_string())?;
    println!("data_sources={}", manager.source_names().join(","));

    probe_lifecycle(&manager).map_err(|err| err.to_string())?;
    println!("lifecycle=ok");
    Ok(())
}

fn probe_lifecycle(manager: &Manager) -> Result<(), DaoError> {
    let mut ctx = manager.start_transaction()?;
    manager.commit_transaction(&ctx)?;
    manager.end_transaction(&mut ctx);
    log::debug!("event=cli_probe module=cli status=ok context_id={}", ctx.id());
    Ok(())
}
