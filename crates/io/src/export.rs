//! PNG export of flattened surfaces

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use painting::{Editor, PixelRect, PixelSurface};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encode failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Nothing to export: no layers")]
    EmptyStack,
}

pub fn encode_png<W: Write>(surface: &PixelSurface, writer: W) -> Result<(), ExportError> {
    let encoder = PngEncoder::new(writer);
    encoder.write_image(
        surface.as_bytes(),
        surface.width,
        surface.height,
        ExtendedColorType::Rgba8,
    )?;
    Ok(())
}

pub fn save_png(surface: &PixelSurface, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    encode_png(surface, &mut writer)?;
    writer.flush()?;
    info!("Wrote {}x{} PNG to {}", surface.width, surface.height, path.display());
    Ok(())
}

/// Flatten the editor's document, crop it, and write it as PNG
pub fn export_png(
    editor: &mut Editor,
    crop: Option<PixelRect>,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    if editor.stack().is_empty() {
        return Err(ExportError::EmptyStack);
    }
    let flat = editor.export(crop);
    save_png(&flat, path)
}
