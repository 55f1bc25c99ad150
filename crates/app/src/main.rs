//! Entry point for Meshview.
//! Parses the CLI, sets up logging, loads the mesh and hands it to the window loop.

mod cli;

use std::fs::File;

use anyhow::{Context, Result, bail};
use asset::Mesh;
use clap::Parser;

use crate::cli::Cli;

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_level().as_str()),
    );
    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = cli.viewer_config();
    log::info!(
        "Starting Meshview. Mesh: {}, backend: {:?}, show_fps={}, window_size={}x{}",
        cli.mesh.display(),
        config.backends,
        config.show_fps,
        config.width,
        config.height
    );

    let mut mesh = Mesh::new();
    let stats = mesh
        .load(&cli.mesh)
        .with_context(|| format!("Failed to load mesh {}", cli.mesh.display()))?;
    log::debug!("Load stats: {:?}", stats);
    if mesh.is_empty() {
        bail!("{} contains no triangles", cli.mesh.display());
    }

    platform::run_viewer(&mesh, config)?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
