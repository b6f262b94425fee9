use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::camera::CameraConfig;
use crate::cli::CliArgs;
use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub camera: CameraConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where to save the JSON record of the applied writes.
    pub write_log: Option<PathBuf>,
}

impl Config {
    pub fn load(cli_args: &CliArgs) -> Result<Self> {
        let mut config = match &cli_args.config {
            Some(path) => Self::from_file(path)?,
            None => {
                info!("No configuration file given, starting from defaults");
                Self::default()
            }
        };

        // Override config with CLI arguments
        config.override_with_cli_args(cli_args);

        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from {}", path.display());

        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(config_str: &str) -> std::result::Result<Self, AppError> {
        Ok(toml::from_str(config_str)?)
    }

    fn override_with_cli_args(&mut self, args: &CliArgs) {
        if let Some(frame_rate) = args.frame_rate {
            self.camera.acquisition_frame_rate = frame_rate;
        }
        if let Some(resolution) = args.resolution {
            self.camera.video_resolution = resolution;
        }
        if let Some(exposure_time) = args.exposure_time {
            self.camera.exposure_auto = "Off".to_string();
            self.camera.exposure_time = exposure_time;
        }
        if let Some(gain) = args.gain {
            self.camera.auto_gain = "Off".to_string();
            self.camera.gain = gain;
        }
        if let Some(write_log) = &args.write_log {
            self.output.write_log = Some(write_log.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.camera
            .validate()
            .map_err(AppError::config)
            .context("Invalid camera configuration")?;

        // Ensure the write log folder exists
        if let Some(parent) = self
            .output
            .write_log
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
        {
            if !parent.exists() {
                warn!("Write log folder does not exist. Creating it.");
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create write log folder: {}", parent.display())
                })?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{VideoMode, VideoResolution};
    use clap::Parser;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_camera_table() {
        let config = Config::from_toml_str(
            r#"
            [camera]
            acquisition_frame_rate = 15.0
            video_resolution = 2
            video_mode = 0
            exposure_auto = "Off"
            exposure_time = 800.0

            [output]
            write_log = "out/writes.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.camera.acquisition_frame_rate, 15.0);
        assert_eq!(config.camera.video_resolution, VideoResolution::Res2);
        assert_eq!(config.camera.video_mode, Some(VideoMode::Mode0));
        assert!(config.camera.exposure_is_manual());
        assert_eq!(config.camera.gain, 0.0);
        assert_eq!(config.output.write_log, Some(PathBuf::from("out/writes.json")));
    }

    #[test]
    fn test_unknown_resolution_is_rejected() {
        let err = Config::from_toml_str("[camera]\nvideo_resolution = 9\n").unwrap_err();
        assert!(matches!(err, AppError::TomlParse(_)));
    }

    #[test]
    fn test_nan_values_fail_validation() {
        let config = Config::from_toml_str(
            r#"
            [camera]
            auto_gain = "Off"
            gain = nan
            exposure_auto = "Off"
            exposure_time = nan
            "#,
        )
        .unwrap();

        assert!(config.camera.gain.is_nan());
        let err = config.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("must be a finite number"));
    }

    #[test]
    fn test_cli_overrides() {
        let args = CliArgs::parse_from([
            "flea3-config",
            "--frame-rate",
            "12.5",
            "--resolution",
            "3",
            "--gain",
            "4.0",
        ]);
        let config = Config::load(&args).unwrap();

        assert_eq!(config.camera.acquisition_frame_rate, 12.5);
        assert_eq!(config.camera.video_resolution, VideoResolution::Res3);
        assert!(config.camera.gain_is_manual());
        assert_eq!(config.camera.gain, 4.0);
        assert!(!config.camera.exposure_is_manual());
    }

    #[test]
    fn test_invalid_override_fails_validation() {
        let args = CliArgs::parse_from(["flea3-config", "--frame-rate", "0"]);
        assert!(Config::load(&args).is_err());
    }
}
