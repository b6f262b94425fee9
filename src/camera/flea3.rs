use log::{debug, info};

use super::{Camera, CameraConfig, ReconfigureLevel, VideoMode, VideoResolution};
use crate::error::CameraError;
use crate::node_map::{set_property, NodeMap, NodeMapError};

/// Point Grey / FLIR Flea3 configured through its node map.
pub struct Flea3<N: NodeMap> {
    node_map: N,
}

impl<N: NodeMap> Flea3<N> {
    pub fn new(node_map: N) -> Self {
        Self { node_map }
    }

    pub fn node_map(&self) -> &N {
        &self.node_map
    }

    pub fn into_node_map(self) -> N {
        self.node_map
    }

    /// Current `Width` x `Height` as reported by the camera.
    pub fn image_size(&self) -> Result<(i64, i64), CameraError> {
        let width = self.node_map.get_int("Width")?;
        let height = self.node_map.get_int("Height")?;
        Ok((width, height))
    }

    pub fn set_resolution(&mut self, resolution: VideoResolution) -> Result<(), CameraError> {
        Ok(self.write_resolution(resolution)?)
    }

    pub fn set_video_mode(&mut self, mode: VideoMode) -> Result<(), CameraError> {
        Ok(self.write_video_mode(mode)?)
    }

    fn write_frame_rate(&mut self, frame_rate: f64) -> Result<(), NodeMapError> {
        info!("Setting frame rate to {} fps", frame_rate);
        let nm = &mut self.node_map;

        // Flea3 names differ from the Blackfly S here
        set_property(nm, "AcquisitionFrameRateEnabled", true)?;
        set_property(nm, "AcquisitionFrameRateAuto", "Off")?;

        if let Ok((min, max)) = nm.float_range("AcquisitionFrameRate") {
            debug!("Minimum frame rate: {}", min);
            debug!("Maximum frame rate: {}", max);
        }

        set_property(nm, "AcquisitionFrameRate", frame_rate)?;

        if let Ok(current) = nm.get_float("AcquisitionFrameRate") {
            debug!("Current frame rate: {}", current);
        }
        Ok(())
    }

    fn write_image_control_formats(&mut self, config: &CameraConfig) -> Result<(), NodeMapError> {
        debug!("Setting image control formats");
        self.write_frame_rate(config.acquisition_frame_rate)?;

        // Offsets go to zero first so a larger ROI fits on the sensor
        set_property(&mut self.node_map, "OffsetX", 0_i64)?;
        set_property(&mut self.node_map, "OffsetY", 0_i64)?;

        self.write_resolution(config.video_resolution)?;

        set_property(&mut self.node_map, "OffsetX", config.image_format_x_offset)?;
        set_property(&mut self.node_map, "OffsetY", config.image_format_y_offset)?;

        if let Some(mode) = config.video_mode {
            self.write_video_mode(mode)?;
        }
        Ok(())
    }

    fn write_resolution(&mut self, resolution: VideoResolution) -> Result<(), NodeMapError> {
        info!("Setting resolution to {}", resolution);
        let (width, height) = resolution.dimensions();
        set_property(&mut self.node_map, "Width", width)?;
        set_property(&mut self.node_map, "Height", height)?;
        Ok(())
    }

    fn write_video_mode(&mut self, mode: VideoMode) -> Result<(), NodeMapError> {
        match mode.pixel_format() {
            Some(format) => {
                set_property(&mut self.node_map, "PixelFormat", format)?;
            }
            None => debug!("Video mode {:?} leaves the pixel format unchanged", mode),
        }
        Ok(())
    }

    fn write_configuration(
        &mut self,
        config: &CameraConfig,
        level: ReconfigureLevel,
    ) -> Result<(), NodeMapError> {
        if level != ReconfigureLevel::Stop {
            self.write_image_control_formats(config)?;
        }

        let nm = &mut self.node_map;

        // Trigger source can only change while triggering is off
        set_property(nm, "TriggerMode", "Off")?;
        set_property(nm, "TriggerSource", &config.trigger_source)?;
        set_property(nm, "TriggerSelector", &config.trigger_selector)?;
        set_property(nm, "TriggerActivation", &config.trigger_activation_mode)?;
        set_property(nm, "TriggerMode", &config.enable_trigger)?;

        set_property(nm, "LineSelector", &config.line_selector)?;
        set_property(nm, "LineMode", &config.line_mode)?;

        set_property(nm, "ExposureMode", &config.exposure_mode)?;
        set_property(nm, "ExposureAuto", &config.exposure_auto)?;

        if nm.is_available("SharpeningEnable") {
            set_property(nm, "SharpeningEnable", config.sharpening_enable)?;
            if config.sharpening_enable {
                set_property(nm, "SharpeningAuto", config.auto_sharpness)?;
                set_property(nm, "Sharpening", config.sharpness)?;
                set_property(nm, "SharpeningThreshold", config.sharpening_threshold)?;
            }
        }

        if nm.is_available("SaturationEnable") {
            set_property(nm, "SaturationEnable", config.saturation_enable)?;
            if config.saturation_enable {
                set_property(nm, "Saturation", config.saturation)?;
            }
        }

        if config.exposure_is_manual() {
            set_property(nm, "ExposureTime", config.exposure_time)?;
        } else {
            set_property(
                nm,
                "AutoExposureTimeUpperLimit",
                config.auto_exposure_time_upper_limit,
            )?;
        }

        // GainSelector is not writable on this model
        set_property(nm, "GainAuto", &config.auto_gain)?;
        if config.gain_is_manual() {
            set_property(nm, "Gain", config.gain)?;
        }

        set_property(nm, "BlackLevel", config.brightness)?;

        if config.gamma_enable {
            set_property(nm, "GammaEnabled", true)?;
            set_property(nm, "Gamma", config.gamma)?;
        }

        if nm.is_available("BalanceWhiteAuto") {
            set_property(nm, "BalanceWhiteAuto", &config.auto_white_balance)?;
        }

        Ok(())
    }
}

impl<N: NodeMap> Camera for Flea3<N> {
    fn set_new_configuration(
        &mut self,
        config: &CameraConfig,
        level: ReconfigureLevel,
    ) -> Result<(), CameraError> {
        info!("Setting new configuration ({:?})", level);
        self.write_configuration(config, level).map_err(|e| {
            CameraError::configuration(format!(
                "[Flea3::set_new_configuration] Failed to set configuration: {}",
                e
            ))
        })
    }

    fn set_frame_rate(&mut self, frame_rate: f64) -> Result<(), CameraError> {
        Ok(self.write_frame_rate(frame_rate)?)
    }

    fn set_image_control_formats(&mut self, config: &CameraConfig) -> Result<(), CameraError> {
        Ok(self.write_image_control_formats(config)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node_map::{InMemoryNodeMap, PropertyValue};

    #[test]
    fn test_set_frame_rate_sequence() {
        let mut camera = Flea3::new(InMemoryNodeMap::flea3_color());
        camera.set_frame_rate(25.0).unwrap();

        let nm = camera.node_map();
        assert_eq!(
            nm.written_names(),
            vec![
                "AcquisitionFrameRateEnabled",
                "AcquisitionFrameRateAuto",
                "AcquisitionFrameRate"
            ]
        );
        assert_eq!(nm.get_float("AcquisitionFrameRate"), Ok(25.0));
    }

    #[test]
    fn test_frame_rate_is_clamped_to_camera_maximum() {
        let mut camera = Flea3::new(InMemoryNodeMap::flea3_color());
        camera.set_frame_rate(120.0).unwrap();
        assert_eq!(camera.node_map().get_float("AcquisitionFrameRate"), Ok(60.0));
    }

    #[test]
    fn test_set_resolution_writes_width_then_height() {
        let mut camera = Flea3::new(InMemoryNodeMap::flea3_color());
        camera.set_resolution(VideoResolution::Res4).unwrap();

        assert_eq!(camera.node_map().written_names(), vec!["Width", "Height"]);
        assert_eq!(camera.image_size().unwrap(), (160, 120));
    }

    #[test]
    fn test_only_mode0_sets_pixel_format() {
        let mut camera = Flea3::new(InMemoryNodeMap::flea3_color());
        camera.set_video_mode(VideoMode::Mode1).unwrap();
        camera.set_video_mode(VideoMode::Mode7).unwrap();
        assert!(camera.node_map().writes().is_empty());

        camera.set_video_mode(VideoMode::Mode0).unwrap();
        assert_eq!(
            camera.node_map().writes()[0].value,
            PropertyValue::Enum("BayerBG8".to_string())
        );
    }

    #[test]
    fn test_vendor_failure_is_wrapped() {
        let nm = InMemoryNodeMap::flea3_color().with_failure("LineMode", "GenICam::AccessException");
        let mut camera = Flea3::new(nm);
        let err = camera
            .set_new_configuration(&CameraConfig::default(), ReconfigureLevel::Running)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "[Flea3::set_new_configuration] Failed to set configuration: \
             GenICam::AccessException (node 'LineMode')"
        );
    }

    #[test]
    fn test_direct_frame_rate_failure_is_a_node_map_error() {
        let nm = InMemoryNodeMap::flea3_color().with_failure("AcquisitionFrameRate", "timeout");
        let mut camera = Flea3::new(nm);
        assert!(matches!(
            camera.set_frame_rate(10.0),
            Err(CameraError::NodeMap(NodeMapError::Vendor { .. }))
        ));
    }
}
