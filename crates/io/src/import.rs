//! Decoding, orientation and import-time downscaling

use std::io::{BufRead, Cursor, Seek};
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageDecoder, ImageReader, RgbaImage};
use painting::{Editor, LayerId, PixelSurface, SurfaceError};
use thiserror::Error;
use tracing::{debug, info};

use crate::crop::{clamp_crop, CropProvider};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no pixels")]
    Empty,

    #[error("Invalid surface: {0}")]
    Surface(#[from] SurfaceError),
}

/// Decode an image file, applying its EXIF orientation
pub fn decode_file(path: impl AsRef<Path>) -> Result<RgbaImage, ImportError> {
    let path = path.as_ref();
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let img = decode_reader(reader)?;
    debug!("Decoded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}

/// Decode an in-memory image blob, applying its EXIF orientation
pub fn decode_bytes(bytes: &[u8]) -> Result<RgbaImage, ImportError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    decode_reader(reader)
}

fn decode_reader<R: BufRead + Seek>(reader: ImageReader<R>) -> Result<RgbaImage, ImportError> {
    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);

    let rgba = img.into_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(ImportError::Empty);
    }
    Ok(rgba)
}

/// Shrink so the longer side is at most `max_dim`. Never enlarges.
pub fn downscale_to_fit(img: RgbaImage, max_dim: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    let longest = w.max(h);
    if max_dim == 0 || longest <= max_dim {
        return img;
    }
    let ratio = max_dim as f64 / longest as f64;
    let nw = ((w as f64 * ratio).round() as u32).clamp(1, max_dim);
    let nh = ((h as f64 * ratio).round() as u32).clamp(1, max_dim);
    debug!("Downscaling import {}x{} -> {}x{}", w, h, nw, nh);
    imageops::resize(&img, nw, nh, FilterType::Lanczos3)
}

pub fn image_to_surface(img: &RgbaImage) -> Result<PixelSurface, ImportError> {
    Ok(PixelSurface::from_rgba(img.width(), img.height(), img.as_raw())?)
}

/// Downscale, then let `crop` pick the region that becomes the layer.
///
/// Returns `Ok(None)` when the crop step was cancelled.
pub fn prepare_surface(
    img: RgbaImage,
    max_dim: u32,
    crop: &mut dyn CropProvider,
) -> Result<Option<PixelSurface>, ImportError> {
    let surface = image_to_surface(&downscale_to_fit(img, max_dim))?;
    let Some(rect) = crop.choose(&surface) else {
        debug!("Import cancelled at crop step");
        return Ok(None);
    };
    let rect = clamp_crop(rect, surface.width, surface.height);
    if rect == surface.bounds() {
        return Ok(Some(surface));
    }
    Ok(Some(surface.crop(rect)))
}

/// Run the whole import pipeline and add the result as the new top layer
pub fn import_layer(
    editor: &mut Editor,
    img: RgbaImage,
    crop: &mut dyn CropProvider,
) -> Result<Option<LayerId>, ImportError> {
    let Some(surface) = prepare_surface(img, editor.import_max_dim(), crop)? else {
        return Ok(None);
    };
    let (w, h) = (surface.width, surface.height);
    let id = editor.add_layer(surface)?;
    info!("Imported {}x{} image as {}", w, h, id);
    Ok(Some(id))
}
