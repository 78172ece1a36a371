//! Numeric tolerances plus dab and rotate handle geometry

/// Floor applied to camera and layer scales before dividing by them.
pub const SCALE_EPSILON: f32 = 0.0001;

/// Below this magnitude a signed layer scale is treated as 1 when inverting.
pub const INVERSE_SCALE_EPSILON: f32 = 0.000001;

/// Floor for pointer distances used as a pinch baseline.
pub const DISTANCE_EPSILON: f32 = 0.0001;

/// Extra pixels around each dab included in the undo capture.
pub const DAB_MARGIN: f32 = 2.0;

/// Dab spacing as a fraction of the pixel-space radius.
pub const DAB_SPACING: f32 = 0.35;

/// Thresholds below which a transform change is not worth an undo step.
pub const MOVE_EPSILON_POSITION: f32 = 0.5;
pub const MOVE_EPSILON_SCALE: f32 = 0.0005;
pub const MOVE_EPSILON_ROTATION: f32 = 0.0005;

/// Threshold below which an opacity change is not recorded.
pub const OPACITY_EPSILON: f32 = 0.0001;

/// Rotate handle geometry in screen pixels.
pub const ROTATE_HANDLE_GAP: f32 = 34.0;
pub const ROTATE_HANDLE_RADIUS: f32 = 12.0;
pub const ROTATE_HANDLE_SLOP: f32 = 6.0;
