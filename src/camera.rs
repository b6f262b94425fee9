mod config;
mod flea3;

pub use config::{CameraConfig, ReconfigureLevel, VideoMode, VideoResolution};
pub use flea3::Flea3;

use crate::error::CameraError;

/// Per-model translation of a [`CameraConfig`] into node-map writes.
pub trait Camera {
    /// Applies `config`. At [`ReconfigureLevel::Stop`] the frame rate and
    /// image format are left untouched.
    fn set_new_configuration(
        &mut self,
        config: &CameraConfig,
        level: ReconfigureLevel,
    ) -> Result<(), CameraError>;

    fn set_frame_rate(&mut self, frame_rate: f64) -> Result<(), CameraError>;

    /// Frame rate, region of interest and pixel format.
    fn set_image_control_formats(&mut self, config: &CameraConfig) -> Result<(), CameraError>;
}
