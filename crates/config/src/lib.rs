//! Shared configuration for the layering compositor
//!
//! This crate provides the single source of truth for viewport dimensions
//! and the editor tunables (history depth, zoom bounds, brush defaults)
//! shared by the engine, the IO glue and the front end.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Default viewport width in logical pixels
pub const DEFAULT_WIDTH: u32 = 1280;

/// Default viewport height in logical pixels
pub const DEFAULT_HEIGHT: u32 = 800;

/// Default device pixel ratio (1.0 = no scaling)
pub const DEFAULT_SCALE: f32 = 1.0;

/// Maximum number of undo steps kept
pub const DEFAULT_MAX_HISTORY: usize = 30;

/// Camera zoom bounds
pub const DEFAULT_MIN_VIEW_SCALE: f32 = 0.5;
pub const DEFAULT_MAX_VIEW_SCALE: f32 = 8.0;

/// Layer scale bounds applied by gestures and the wheel
pub const DEFAULT_MIN_LAYER_SCALE: f32 = 0.05;
pub const DEFAULT_MAX_LAYER_SCALE: f32 = 50.0;

/// Magic brush radius ceiling in layer pixels
pub const DEFAULT_MAX_MAGIC_RADIUS: f32 = 280.0;

/// Idle window before a wheel burst is committed to history
pub const DEFAULT_WHEEL_COMMIT_MS: u64 = 180;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV_VAR: &str = "LAYERING_CONFIG";

/// Environment variable holding `tracing` filter directives for `--debug` runs
pub const LOG_ENV_VAR: &str = "LAYERING_LOG";

/// Errors raised while loading configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Display configuration for the viewport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Viewport width in logical pixels
    pub width: u32,
    /// Viewport height in logical pixels
    pub height: u32,
    /// Device pixel ratio
    pub scale: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scale: DEFAULT_SCALE,
        }
    }
}

impl DisplayConfig {
    /// Create a new display config with the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: DEFAULT_SCALE,
        }
    }

    /// Get width as f32 for calculations
    pub fn width_f32(&self) -> f32 {
        self.width as f32
    }

    /// Get height as f32 for calculations
    pub fn height_f32(&self) -> f32 {
        self.height as f32
    }

    /// Device pixels per logical pixel. A non-positive scale counts as 1.
    pub fn pixel_ratio(&self) -> f32 {
        if self.scale > 0.0 { self.scale } else { 1.0 }
    }

    /// Viewport size in device pixels, at least 1x1
    pub fn physical_size(&self) -> (u32, u32) {
        let ratio = self.pixel_ratio();
        let w = ((self.width as f32 * ratio).floor() as u32).max(1);
        let h = ((self.height as f32 * ratio).floor() as u32).max(1);
        (w, h)
    }

    /// Longest side an imported image is allowed to keep.
    ///
    /// Roughly twice the viewport, bounded to [1024, 2048].
    pub fn import_max_dim(&self) -> u32 {
        let longest = self.width.max(self.height) as f32;
        ((longest * 2.2).floor() as u32).clamp(1024, 2048)
    }
}

/// Initial brush parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushDefaults {
    /// Diameter in screen pixels
    pub size: f32,
    /// 0.0 = soft, 1.0 = hard
    pub hardness: f32,
    /// 0.0-1.0
    pub strength: f32,
    /// Magic tolerance 0-100
    pub magic_tolerance: f32,
}

impl Default for BrushDefaults {
    fn default() -> Self {
        Self {
            size: 60.0,
            hardness: 0.6,
            strength: 1.0,
            magic_tolerance: 25.0,
        }
    }
}

/// Editor tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub max_history: usize,
    pub min_view_scale: f32,
    pub max_view_scale: f32,
    pub min_layer_scale: f32,
    pub max_layer_scale: f32,
    pub max_magic_radius: f32,
    pub wheel_commit_ms: u64,
    /// Relative scale change per wheel notch
    pub wheel_scale_step: f32,
    /// Rotation per wheel notch with the rotate modifier held
    pub wheel_rotate_step_deg: f32,
    /// Fraction of the viewport an imported layer may occupy
    pub import_fit_fraction: f32,
    /// Vertical distance between pointer and brush centre in screen pixels
    pub brush_offset_px: f32,
    /// Longest side of generated layer thumbnails
    pub thumbnail_size: u32,
    pub brush: BrushDefaults,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            min_view_scale: DEFAULT_MIN_VIEW_SCALE,
            max_view_scale: DEFAULT_MAX_VIEW_SCALE,
            min_layer_scale: DEFAULT_MIN_LAYER_SCALE,
            max_layer_scale: DEFAULT_MAX_LAYER_SCALE,
            max_magic_radius: DEFAULT_MAX_MAGIC_RADIUS,
            wheel_commit_ms: DEFAULT_WHEEL_COMMIT_MS,
            wheel_scale_step: 0.07,
            wheel_rotate_step_deg: 2.0,
            import_fit_fraction: 0.75,
            brush_offset_px: 0.0,
            thumbnail_size: 80,
            brush: BrushDefaults::default(),
        }
    }
}

impl EditorConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&text)?;
        info!("Loaded editor config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Load from the file named by `LAYERING_CONFIG`, falling back to defaults
    pub fn from_env() -> Self {
        let Ok(path) = std::env::var(CONFIG_ENV_VAR) else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring {CONFIG_ENV_VAR}={path}: {e}");
                Self::default()
            }
        }
    }
}
