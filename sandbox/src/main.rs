mod avatar;
mod error;
mod scenario;

use std::path::{Path, PathBuf};

use kcc_controller::ControllerConfig;

use crate::error::SandboxError;

fn main() -> Result<(), SandboxError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => load_config(&path)?,
        None => ControllerConfig::default(),
    };

    let summary = scenario::run(config)?;
    log::info!(
        "done: {} ticks over {:.2}s, {} jumps, {} landings, {} blocked, final position {:?}, closest wall gap {:.3}",
        summary.ticks,
        summary.elapsed,
        summary.jumps,
        summary.landings,
        summary.blocked_ticks,
        summary.final_position,
        summary.closest_wall_gap
    );

    Ok(())
}

fn load_config(path: &Path) -> Result<ControllerConfig, SandboxError> {
    let text = std::fs::read_to_string(path).map_err(|source| SandboxError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&text).map_err(|source| SandboxError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loaded controller config from {}", path.display());
    Ok(config)
}
