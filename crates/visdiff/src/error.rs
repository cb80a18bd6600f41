use thiserror::Error;

/// Machine-distinguishable category of a [`CompareError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Decode,
    InvalidImage,
    InvalidParameter,
}

#[derive(Debug, Error)]
pub enum CompareError {
    /// Input bytes are not a decodable raster image.
    #[error("decode error: {0}")]
    Decode(#[source] image::ImageError),

    /// Zero-sized image, or two grids that cannot be reconciled.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Threshold or ignore region outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl CompareError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) => ErrorKind::Decode,
            Self::InvalidImage(_) => ErrorKind::InvalidImage,
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
        }
    }

    pub(crate) fn dimension_mismatch(left: (u32, u32), right: (u32, u32)) -> Self {
        Self::InvalidImage(format!(
            "dimension mismatch: {}x{} vs {}x{}",
            left.0, left.1, right.0, right.1
        ))
    }
}
