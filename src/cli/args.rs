use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::camera::{ReconfigureLevel, VideoResolution};
use crate::node_map::InMemoryNodeMap;

/// Which Flea3 variant to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CameraModel {
    Color,
    Mono,
}

impl CameraModel {
    pub fn node_map(self) -> InMemoryNodeMap {
        match self {
            CameraModel::Color => InMemoryNodeMap::flea3_color(),
            CameraModel::Mono => InMemoryNodeMap::flea3_mono(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Apply a Flea3 configuration to a camera node map", long_about = None)]
pub struct CliArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = CameraModel::Color)]
    pub model: CameraModel,

    #[arg(long, value_enum, default_value_t = ReconfigureLevel::Running)]
    pub level: ReconfigureLevel,

    #[arg(long)]
    pub frame_rate: Option<f64>,

    /// Resolution index, 0 (1280x1024) to 4 (160x120)
    #[arg(long, value_parser = parse_resolution)]
    pub resolution: Option<VideoResolution>,

    /// Manual exposure time in microseconds
    #[arg(long)]
    pub exposure_time: Option<f64>,

    /// Manual gain in dB
    #[arg(long)]
    pub gain: Option<f64>,

    #[arg(long)]
    pub debug: bool,

    #[arg(long)]
    pub log_file: Option<String>,

    /// Save the applied writes as JSON
    #[arg(long)]
    pub write_log: Option<PathBuf>,
}

fn parse_resolution(value: &str) -> Result<VideoResolution, String> {
    let index: u8 = value
        .parse()
        .map_err(|_| format!("'{}' is not a resolution index", value))?;
    VideoResolution::try_from(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = CliArgs::parse_from(["flea3-config"]);
        assert_eq!(args.model, CameraModel::Color);
        assert_eq!(args.level, ReconfigureLevel::Running);
        assert!(args.config.is_none());
        assert!(args.resolution.is_none());
        assert!(!args.debug);
    }

    #[test]
    fn test_model_and_level() {
        let args = CliArgs::parse_from(["flea3-config", "--model", "mono", "--level", "stop"]);
        assert_eq!(args.model, CameraModel::Mono);
        assert_eq!(args.level, ReconfigureLevel::Stop);
    }

    #[test]
    fn test_resolution_index() {
        let args = CliArgs::parse_from(["flea3-config", "--resolution", "1"]);
        assert_eq!(args.resolution, Some(VideoResolution::Res1));

        assert!(CliArgs::try_parse_from(["flea3-config", "--resolution", "5"]).is_err());
        assert!(CliArgs::try_parse_from(["flea3-config", "--resolution", "vga"]).is_err());
    }
}
