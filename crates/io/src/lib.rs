//! Import and export collaborators for the layering engine
//!
//! Decoding, resampling and encoding go through the `image` crate. The
//! engine only ever sees [`painting::PixelSurface`]s.

mod crop;
mod export;
mod import;

pub use crop::{clamp_crop, CropProvider, FixedCrop, FullFrame};
pub use export::{encode_png, export_png, save_png, ExportError};
pub use import::{
    decode_bytes, decode_file, downscale_to_fit, image_to_surface, import_layer, prepare_surface,
    ImportError,
};
