//! # TERRAVOX Bake
//!
//! Generates and meshes a whole world once, then reports what it built.
//!
//! ```bash
//! # Defaults: CPU backend, 40x40 chunks, seed 42
//! terravox-bake
//!
//! # From a file
//! terravox-bake crates/terravox/config/terravox.toml
//! ```

use std::process::ExitCode;

use terravox::{config::DEFAULT_LOG_FILTER, logging, AppConfig};
use tracing::{error, info};

fn main() -> ExitCode {
    let config = match std::env::args_os().nth(1) {
        Some(path) => AppConfig::load(path),
        None => Ok(AppConfig::default()),
    };

    let config = match config {
        Ok(config) => config,
        Err(err) => {
            // Logging is not up yet
            let _ = logging::init(DEFAULT_LOG_FILTER);
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = logging::init(&config.log_filter) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match terravox::bake(&config) {
        Ok(stats) => {
            info!(
                chunks = stats.chunks_meshed,
                per_lod = ?stats.chunks_per_lod,
                blocks = stats.blocks,
                faces = stats.faces(),
                opaque_vertices = stats.opaque_vertices,
                transparent_vertices = stats.transparent_vertices,
                draw_calls = stats.draw_calls,
                estimate_usage = format_args!("{:.2}", stats.estimate_usage()),
                "world baked"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("bake failed: {err}");
            ExitCode::FAILURE
        }
    }
}
