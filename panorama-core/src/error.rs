/// Error types for panorama construction and per-frame geometry
use std::fmt;

/// Result type for panorama operations.
pub type Result<T> = std::result::Result<T, PanoramaError>;

/// Errors raised by the panorama core.
///
/// None of these are transient: each one is a deterministic logic or setup error.
#[derive(Debug, Clone, PartialEq)]
pub enum PanoramaError {
    /// Malformed configuration (wrong texture count, bad cube size), detected at construction.
    Configuration { message: String },
    /// Pop on an empty transform stack.
    StackUnderflow,
    /// Face index outside `[0, 6)`.
    InvalidFace(usize),
}

impl PanoramaError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl fmt::Display for PanoramaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { message } => write!(f, "Invalid panorama configuration: {}", message),
            Self::StackUnderflow => write!(f, "Transform stack underflow: pop on empty stack"),
            Self::InvalidFace(index) => write!(f, "Invalid face index {}, expected 0..6", index),
        }
    }
}

impl std::error::Error for PanoramaError {}
