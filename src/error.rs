use thiserror::Error;

use crate::node_map::NodeMapError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("{0}")]
    Configuration(String),

    #[error("Node map error: {0}")]
    NodeMap(#[from] NodeMapError),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }
}

impl CameraError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        CameraError::Configuration(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_error_wraps_into_app_error() {
        let err: AppError = CameraError::configuration("boom").into();
        assert_eq!(err.to_string(), "Camera error: boom");
    }

    #[test]
    fn test_node_map_error_message_is_kept() {
        let err: CameraError = NodeMapError::vendor("Gain", "access denied").into();
        assert!(err.to_string().contains("access denied"));
    }
}
