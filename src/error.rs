//! Error type shared by the heightfield, noise and erosion modules.

use thiserror::Error;

/// Errors that can occur while building or eroding a heightfield.
#[derive(Error, Debug)]
pub enum Error {
    /// A grid was requested with a zero width or height.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// A backing buffer does not match the requested grid size.
    #[error("a {width}x{height} grid needs {} cells, got {actual}", .width * .height)]
    DataLength {
        width: usize,
        height: usize,
        actual: usize,
    },

    /// A terrain or erosion parameter is outside its valid range.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A splat would touch cells outside the backing storage.
    #[error("splat at ({x}, {y}) falls outside the {width}x{height} grid")]
    SplatOutOfBounds {
        x: f32,
        y: f32,
        width: usize,
        height: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_message_is_not_config_specific() {
        let err: Error = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(err.to_string().starts_with("JSON error: "), "{}", err);
    }
}
