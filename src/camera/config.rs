use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sensor region sizes the Flea3 driver offers, stored by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VideoResolution {
    #[default]
    Res0,
    Res1,
    Res2,
    Res3,
    Res4,
}

impl VideoResolution {
    /// Width and height in pixels.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            VideoResolution::Res0 => (1280, 1024),
            VideoResolution::Res1 => (1280, 960),
            VideoResolution::Res2 => (640, 480),
            VideoResolution::Res3 => (320, 240),
            VideoResolution::Res4 => (160, 120),
        }
    }
}

impl TryFrom<u8> for VideoResolution {
    type Error = String;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            0 => Ok(VideoResolution::Res0),
            1 => Ok(VideoResolution::Res1),
            2 => Ok(VideoResolution::Res2),
            3 => Ok(VideoResolution::Res3),
            4 => Ok(VideoResolution::Res4),
            other => Err(format!("Unknown video resolution {} (expected 0-4)", other)),
        }
    }
}

impl From<VideoResolution> for u8 {
    fn from(resolution: VideoResolution) -> Self {
        resolution as u8
    }
}

impl fmt::Display for VideoResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        write!(f, "{}x{}", width, height)
    }
}

/// Flea3 video modes, stored by their mode number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum VideoMode {
    Mode0 = 0,
    Mode1 = 1,
    Mode2 = 2,
    Mode7 = 7,
}

impl VideoMode {
    /// Pixel format the mode selects, if it selects one.
    pub fn pixel_format(self) -> Option<&'static str> {
        match self {
            VideoMode::Mode0 => Some("BayerBG8"),
            VideoMode::Mode1 | VideoMode::Mode2 | VideoMode::Mode7 => None,
        }
    }
}

impl TryFrom<u8> for VideoMode {
    type Error = String;

    fn try_from(mode: u8) -> Result<Self, Self::Error> {
        match mode {
            0 => Ok(VideoMode::Mode0),
            1 => Ok(VideoMode::Mode1),
            2 => Ok(VideoMode::Mode2),
            7 => Ok(VideoMode::Mode7),
            other => Err(format!("Unknown video mode {} (expected 0, 1, 2 or 7)", other)),
        }
    }
}

impl From<VideoMode> for u8 {
    fn from(mode: VideoMode) -> Self {
        mode as u8
    }
}

/// How much of the camera a reconfiguration may touch.
///
/// At `Stop` the stream keeps running, so frame rate and ROI are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReconfigureLevel {
    Running = 0,
    Stop = 1,
    Close = 3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub acquisition_frame_rate: f64,
    pub video_resolution: VideoResolution,
    pub video_mode: Option<VideoMode>,
    pub image_format_x_offset: i64,
    pub image_format_y_offset: i64,

    pub enable_trigger: String,
    pub trigger_source: String,
    pub trigger_selector: String,
    pub trigger_activation_mode: String,
    pub line_selector: String,
    pub line_mode: String,

    pub exposure_mode: String,
    pub exposure_auto: String,
    pub exposure_time: f64,
    pub auto_exposure_time_upper_limit: f64,

    pub sharpening_enable: bool,
    pub auto_sharpness: bool,
    pub sharpness: f64,
    pub sharpening_threshold: f64,

    pub saturation_enable: bool,
    pub saturation: f64,

    pub auto_gain: String,
    pub gain: f64,
    pub brightness: f64,

    pub gamma_enable: bool,
    pub gamma: f64,

    pub auto_white_balance: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            acquisition_frame_rate: 30.0,
            video_resolution: VideoResolution::Res0,
            video_mode: None,
            image_format_x_offset: 0,
            image_format_y_offset: 0,
            enable_trigger: "Off".to_string(),
            trigger_source: "Software".to_string(),
            trigger_selector: "FrameStart".to_string(),
            trigger_activation_mode: "RisingEdge".to_string(),
            line_selector: "Line0".to_string(),
            line_mode: "Input".to_string(),
            exposure_mode: "Timed".to_string(),
            exposure_auto: "Continuous".to_string(),
            exposure_time: 5000.0,
            auto_exposure_time_upper_limit: 20000.0,
            sharpening_enable: false,
            auto_sharpness: false,
            sharpness: 1.0,
            sharpening_threshold: 0.1,
            saturation_enable: false,
            saturation: 100.0,
            auto_gain: "Continuous".to_string(),
            gain: 0.0,
            brightness: 0.0,
            gamma_enable: false,
            gamma: 1.0,
            auto_white_balance: "Continuous".to_string(),
        }
    }
}

impl CameraConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame_rate(mut self, fps: f64) -> Self {
        self.acquisition_frame_rate = fps;
        self
    }

    pub fn with_resolution(mut self, resolution: VideoResolution) -> Self {
        self.video_resolution = resolution;
        self
    }

    pub fn with_offset(mut self, offset_x: i64, offset_y: i64) -> Self {
        self.image_format_x_offset = offset_x;
        self.image_format_y_offset = offset_y;
        self
    }

    pub fn with_video_mode(mut self, mode: VideoMode) -> Self {
        self.video_mode = Some(mode);
        self
    }

    /// Hardware trigger on `source`, capturing on the rising edge.
    pub fn with_hardware_trigger(mut self, source: &str) -> Self {
        self.enable_trigger = "On".to_string();
        self.trigger_source = source.to_string();
        self.trigger_activation_mode = "RisingEdge".to_string();
        self
    }

    /// Fixed exposure in microseconds; turns auto exposure off.
    pub fn with_exposure_time(mut self, exposure_us: f64) -> Self {
        self.exposure_auto = "Off".to_string();
        self.exposure_time = exposure_us;
        self
    }

    /// Fixed gain in dB; turns auto gain off.
    pub fn with_gain(mut self, gain_db: f64) -> Self {
        self.auto_gain = "Off".to_string();
        self.gain = gain_db;
        self
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma_enable = true;
        self.gamma = gamma;
        self
    }

    pub fn with_sharpening(mut self, sharpness: f64, threshold: f64) -> Self {
        self.sharpening_enable = true;
        self.auto_sharpness = false;
        self.sharpness = sharpness;
        self.sharpening_threshold = threshold;
        self
    }

    pub fn with_saturation(mut self, saturation: f64) -> Self {
        self.saturation_enable = true;
        self.saturation = saturation;
        self
    }

    pub fn exposure_is_manual(&self) -> bool {
        self.exposure_auto == "Off"
    }

    pub fn gain_is_manual(&self) -> bool {
        self.auto_gain == "Off"
    }

    pub fn validate(&self) -> Result<(), String> {
        let floats = [
            ("acquisition_frame_rate", self.acquisition_frame_rate),
            ("exposure_time", self.exposure_time),
            ("auto_exposure_time_upper_limit", self.auto_exposure_time_upper_limit),
            ("sharpness", self.sharpness),
            ("sharpening_threshold", self.sharpening_threshold),
            ("saturation", self.saturation),
            ("gain", self.gain),
            ("brightness", self.brightness),
            ("gamma", self.gamma),
        ];
        if let Some((field, _)) = floats.iter().find(|(_, value)| !value.is_finite()) {
            return Err(format!("{} must be a finite number", field));
        }
        if self.acquisition_frame_rate <= 0.0 {
            return Err("Frame rate must be greater than 0".to_string());
        }
        if self.image_format_x_offset < 0 || self.image_format_y_offset < 0 {
            return Err("Image offsets cannot be negative".to_string());
        }
        if self.exposure_time < 0.0 || self.auto_exposure_time_upper_limit < 0.0 {
            return Err("Exposure times cannot be negative".to_string());
        }
        if self.gain < 0.0 {
            return Err("Gain cannot be negative".to_string());
        }
        if self.gamma_enable && self.gamma <= 0.0 {
            return Err("Gamma must be greater than 0 when enabled".to_string());
        }
        let enums = [
            ("enable_trigger", &self.enable_trigger),
            ("trigger_source", &self.trigger_source),
            ("trigger_selector", &self.trigger_selector),
            ("trigger_activation_mode", &self.trigger_activation_mode),
            ("line_selector", &self.line_selector),
            ("line_mode", &self.line_mode),
            ("exposure_mode", &self.exposure_mode),
            ("exposure_auto", &self.exposure_auto),
            ("auto_gain", &self.auto_gain),
            ("auto_white_balance", &self.auto_white_balance),
        ];
        if let Some((field, _)) = enums.iter().find(|(_, value)| value.is_empty()) {
            return Err(format!("{} cannot be empty", field));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CameraConfig::default();
        assert_eq!(config.acquisition_frame_rate, 30.0);
        assert_eq!(config.video_resolution, VideoResolution::Res0);
        assert_eq!(config.video_mode, None);
        assert_eq!(config.enable_trigger, "Off");
        assert!(!config.exposure_is_manual());
        assert!(!config.gain_is_manual());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = CameraConfig::new()
            .with_frame_rate(15.0)
            .with_resolution(VideoResolution::Res2)
            .with_offset(320, 240)
            .with_exposure_time(1000.0)
            .with_gain(6.0)
            .with_gamma(2.2)
            .with_hardware_trigger("Line0");

        assert_eq!(config.acquisition_frame_rate, 15.0);
        assert_eq!(config.video_resolution.dimensions(), (640, 480));
        assert_eq!(config.image_format_x_offset, 320);
        assert_eq!(config.image_format_y_offset, 240);
        assert!(config.exposure_is_manual());
        assert!(config.gain_is_manual());
        assert!(config.gamma_enable);
        assert_eq!(config.enable_trigger, "On");
        assert_eq!(config.trigger_source, "Line0");
    }

    #[test]
    fn test_resolution_table() {
        let table: Vec<(u32, u32)> = (0u8..5)
            .map(|i| VideoResolution::try_from(i).unwrap().dimensions())
            .collect();
        assert_eq!(
            table,
            vec![(1280, 1024), (1280, 960), (640, 480), (320, 240), (160, 120)]
        );
        assert!(VideoResolution::try_from(5u8).is_err());
        assert_eq!(VideoResolution::Res3.to_string(), "320x240");
    }

    #[test]
    fn test_video_mode_pixel_format() {
        assert_eq!(VideoMode::Mode0.pixel_format(), Some("BayerBG8"));
        assert_eq!(VideoMode::Mode1.pixel_format(), None);
        assert_eq!(VideoMode::try_from(7u8), Ok(VideoMode::Mode7));
        assert!(VideoMode::try_from(3u8).is_err());
        assert_eq!(u8::from(VideoMode::Mode7), 7);
    }

    #[test]
    fn test_validate_rejects_non_finite_values() {
        let config = CameraConfig::default().with_gain(f64::NAN);
        assert_eq!(
            config.validate(),
            Err("gain must be a finite number".to_string())
        );

        let config = CameraConfig::default().with_exposure_time(f64::NAN);
        assert_eq!(
            config.validate(),
            Err("exposure_time must be a finite number".to_string())
        );

        let mut config = CameraConfig::default();
        config.brightness = f64::NEG_INFINITY;
        assert!(config.validate().is_err());

        config = CameraConfig::default();
        config.sharpness = f64::NAN;
        assert!(config.validate().is_err());

        config = CameraConfig::default();
        config.saturation = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_invalid_config() {
        let mut config = CameraConfig::default();
        config.acquisition_frame_rate = 0.0;
        assert!(config.validate().is_err());

        config.acquisition_frame_rate = f64::NAN;
        assert!(config.validate().is_err());

        config = CameraConfig::default().with_offset(-2, 0);
        assert!(config.validate().is_err());

        config = CameraConfig::default().with_gamma(f64::INFINITY);
        assert!(config.validate().is_err());

        config = CameraConfig::default().with_gamma(0.0);
        assert!(config.validate().is_err());

        config = CameraConfig::default();
        config.trigger_source.clear();
        assert_eq!(
            config.validate(),
            Err("trigger_source cannot be empty".to_string())
        );
    }
}
