use thiserror::Error;

pub const NO_DEVICE_MESSAGE: &str = "No camera device was found.";
pub const ACCESS_FAILED_MESSAGE: &str = "Failed to access camera.";

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("no camera device was found")]
    NoDevice,

    #[error("the video media type is not available on this system")]
    MediaTypeUnavailable,

    #[error("camera access is not authorized (status {0})")]
    AccessDenied(isize),

    #[error("failed to open camera input: {0}")]
    OpenFailed(String),

    #[error("capture session refused the camera {0}")]
    SessionRejected(&'static str),
}

impl CameraError {
    /// Text for the user-facing alert, or `None` when the failure is only logged.
    pub fn alert_message(&self) -> Option<&'static str> {
        match self {
            CameraError::NoDevice | CameraError::MediaTypeUnavailable => Some(NO_DEVICE_MESSAGE),
            CameraError::AccessDenied(_) | CameraError::OpenFailed(_) => {
                Some(ACCESS_FAILED_MESSAGE)
            }
            CameraError::SessionRejected(_) => None,
        }
    }
}
