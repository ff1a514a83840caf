//! Shared application-wide constants.
//! Centralizes tweakable values used across layout, rendering and interactions.

// Canvas interactions
/// Pixel distance a free-form drag must travel on either axis before it counts as a move.
pub const DRAG_THRESHOLD_PX: f32 = 3.0;

// Tag input
/// Separator splitting one text input into several tags.
pub const TAG_INPUT_SEPARATOR: char = ',';

// Free-form seeding
/// Tags per row when positions are seeded for free-form mode.
pub const SEED_COLUMNS: usize = 4;
/// Horizontal spacing of seeded positions, in percent.
pub const SEED_STEP_X: f32 = 22.0;
/// Vertical spacing of seeded positions, in percent.
pub const SEED_STEP_Y: f32 = 16.0;
/// Offset of the first seeded position, in percent.
pub const SEED_ORIGIN: f32 = 5.0;

// Templates
/// File stem used when no text tag yields a usable export name.
pub const DEFAULT_TEMPLATE_NAME: &str = "thumbnail";

// Notices
/// Seconds a transient notice stays visible.
pub const NOTICE_SECONDS: f64 = 3.0;

/// Application id used for window title and storage location.
pub const APP_ID: &str = "Thumbnail Editor";
