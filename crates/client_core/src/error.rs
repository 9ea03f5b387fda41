use thiserror::Error;

/// Shown when scanning cannot start; manual entry stays available.
pub const CAMERA_UNAVAILABLE_MESSAGE: &str =
    "Camera access denied or not available. You can enter the code manually.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("camera unavailable: {reason}")]
    CameraUnavailable { reason: String },
    #[error("capture stopped: {reason}")]
    CaptureLost { reason: String },
}

impl ScanError {
    pub fn camera_unavailable(reason: impl Into<String>) -> Self {
        Self::CameraUnavailable {
            reason: reason.into(),
        }
    }

    pub fn capture_lost(reason: impl Into<String>) -> Self {
        Self::CaptureLost {
            reason: reason.into(),
        }
    }

    /// Text for the session's error message.
    pub fn user_message(&self) -> String {
        match self {
            ScanError::CameraUnavailable { .. } => CAMERA_UNAVAILABLE_MESSAGE.to_string(),
            ScanError::CaptureLost { reason } => {
                format!("Scanning stopped ({reason}). You can enter the code manually.")
            }
        }
    }
}
