use anyhow::Result;
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::{debug, info, LevelFilter};
use std::io;

use crate::config::Config;

pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn setup_logging(verbosity: u8, log_file: Option<&str>) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    let mut base_config = fern::Dispatch::new().level(level_for_verbosity(verbosity));

    // Separate file config so we can include year, month and day in file logs
    let file_config = fern::Dispatch::new().format(|out, message, record| {
        out.finish(format_args!(
            "{}[{}][{}] {}",
            Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
            record.target(),
            record.level(),
            message
        ))
    });

    let stdout_config = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                Local::now().format("[%H:%M:%S]"),
                record.target(),
                colors.color(record.level()),
                message
            ))
        })
        .chain(io::stdout());

    base_config = base_config.chain(stdout_config);

    if let Some(log_file) = log_file {
        base_config = base_config.chain(file_config.chain(fern::log_file(log_file)?));
    }

    base_config.apply()?;

    debug!("Logging system initialized");

    Ok(())
}

pub fn log_app_start(version: &str) {
    info!("Starting Flea3 configuration tool v{}", version);
}

pub fn log_app_config(config: &Config) {
    let camera = &config.camera;
    info!("Application configured with:");
    info!("  Camera:");
    info!("    Frame rate: {}", camera.acquisition_frame_rate);
    info!("    Resolution: {}", camera.video_resolution);
    info!(
        "    Offset: ({}, {})",
        camera.image_format_x_offset, camera.image_format_y_offset
    );
    match camera.video_mode {
        Some(mode) => info!("    Video mode: {:?}", mode),
        None => info!("    Video mode: unchanged"),
    }
    info!(
        "    Trigger: {} (source {}, {})",
        camera.enable_trigger, camera.trigger_source, camera.trigger_activation_mode
    );
    if camera.exposure_is_manual() {
        info!("    Exposure: {} us", camera.exposure_time);
    } else {
        info!(
            "    Exposure: {} (upper limit {} us)",
            camera.exposure_auto, camera.auto_exposure_time_upper_limit
        );
    }
    if camera.gain_is_manual() {
        info!("    Gain: {} dB", camera.gain);
    } else {
        info!("    Gain: {}", camera.auto_gain);
    }
    info!("  Output:");
    match &config.output.write_log {
        Some(path) => info!("    Write log: {}", path.display()),
        None => info!("    Write log: none"),
    }
}
