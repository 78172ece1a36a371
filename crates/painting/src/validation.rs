use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Check that a surface of the given size can hold at least one pixel
pub fn validate_dimensions(width: u32, height: u32) -> Result<(), SurfaceError> {
    if width == 0 || height == 0 {
        return Err(SurfaceError::InvalidDimensions { width, height });
    }
    Ok(())
}

/// Byte length of a tightly packed RGBA buffer
pub fn rgba_len(width: u32, height: u32) -> usize {
    (width as usize) * (height as usize) * 4
}

/// Validate a raw RGBA buffer against its declared dimensions
pub fn validate_rgba(width: u32, height: u32, bytes: &[u8]) -> Result<(), SurfaceError> {
    validate_dimensions(width, height)?;
    let expected = rgba_len(width, height);
    if bytes.len() != expected {
        return Err(SurfaceError::BufferSize {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}
