use flea3_camera::{
    camera::{Camera, Flea3},
    cli::CliArgs,
    config::Config,
    logging,
    report::{save_write_report, WriteReport},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};

fn main() -> Result<()> {
    // Parse command-line arguments
    let cli_args = CliArgs::parse();

    // Setup logging
    logging::setup_logging(u8::from(cli_args.debug), cli_args.log_file.as_deref())?;
    logging::log_app_start(flea3_camera::VERSION);

    // Load configuration
    let config = Config::load(&cli_args)?;
    logging::log_app_config(&config);

    // Apply to the simulated camera
    let model = format!("{:?}", cli_args.model).to_lowercase();
    info!("Configuring simulated Flea3 ({})", model);
    let mut camera = Flea3::new(cli_args.model.node_map());
    camera
        .set_new_configuration(&config.camera, cli_args.level)
        .context("Failed to configure camera")?;

    let (width, height) = camera.image_size()?;
    info!("Image size is now {}x{}", width, height);

    let node_map = camera.into_node_map();
    info!("{} properties written", node_map.writes().len());
    for (name, value) in node_map.snapshot() {
        debug!("  {} = {}", name, value);
    }

    if let Some(path) = &config.output.write_log {
        save_write_report(&WriteReport::new(&model, &node_map), path)
            .with_context(|| format!("Failed to save write log to {}", path.display()))?;
    }

    Ok(())
}
