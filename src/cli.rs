mod args;

pub use args::{CameraModel, CliArgs};
