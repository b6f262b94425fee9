//! Configuration layer for Point Grey / FLIR Flea3 cameras.
//!
//! This library provides functionality for:
//! - Translating a camera configuration record into ordered node-map writes
//! - Guarded property access against a GenICam-style node map
//! - A simulated Flea3 node map for dry runs without hardware
//! - Loading configurations from TOML with command-line overrides

pub mod camera;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod node_map;
pub mod report;

pub use camera::{Camera, CameraConfig, Flea3, ReconfigureLevel, VideoMode, VideoResolution};
pub use config::Config;
pub use error::{AppError, CameraError, Result};
pub use node_map::{set_property, InMemoryNodeMap, NodeMap, NodeMapError, PropertyValue};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
///
/// Sets up logging and announces the library version. Call it once before
/// using anything else when the host application does not install its own
/// logger.
///
/// # Arguments
///
/// * `debug` - Whether to enable debug logging
/// * `log_file` - Optional path to a log file. If None, logs will only be output to stdout.
pub fn initialize(debug: bool, log_file: Option<&str>) -> anyhow::Result<()> {
    logging::setup_logging(u8::from(debug), log_file)?;
    logging::log_app_start(VERSION);
    Ok(())
}

/// A convenience function to apply a configuration to a Flea3 node map
///
/// # Returns
///
/// The configured camera, or the first error raised by the node map.
pub fn configure_flea3<N: NodeMap>(
    node_map: N,
    config: &CameraConfig,
    level: ReconfigureLevel,
) -> std::result::Result<Flea3<N>, CameraError> {
    let mut camera = Flea3::new(node_map);
    camera.set_new_configuration(config, level)?;
    Ok(camera)
}
