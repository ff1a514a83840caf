//! Canvas and tag size presets.
//!
//! Presentation presets resolved through static lookup tables. All lengths are in
//! canvas units, where the canvas is [`CANVAS_REFERENCE_WIDTH`] units wide regardless
//! of the on-screen size.

use serde::{Deserialize, Serialize};

/// Width of the canvas in canvas units. Screen rendering scales from this.
pub const CANVAS_REFERENCE_WIDTH: f32 = 1280.0;

/// Canvas aspect ratio and spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CanvasSizePreset {
    /// 16:9 video thumbnail
    #[default]
    Wide,
    /// 1:1 square post
    Square,
    /// 4:5 portrait post
    Portrait,
    /// 9:16 story
    Story,
}

/// Resolved canvas geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSpec {
    /// Width in canvas units
    pub width: f32,
    /// Height in canvas units
    pub height: f32,
    /// Inner padding around the tag container
    pub padding: f32,
    /// Gap between tags and between rows
    pub gap: f32,
}

impl CanvasSpec {
    /// Size of the tag container (canvas minus padding).
    pub fn content_size(&self) -> egui::Vec2 {
        egui::vec2(
            (self.width - 2.0 * self.padding).max(0.0),
            (self.height - 2.0 * self.padding).max(0.0),
        )
    }
}

impl CanvasSizePreset {
    /// Every preset, in display order.
    pub const ALL: [CanvasSizePreset; 4] = [
        CanvasSizePreset::Wide,
        CanvasSizePreset::Square,
        CanvasSizePreset::Portrait,
        CanvasSizePreset::Story,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            CanvasSizePreset::Wide => "16:9",
            CanvasSizePreset::Square => "1:1",
            CanvasSizePreset::Portrait => "4:5",
            CanvasSizePreset::Story => "9:16",
        }
    }

    /// Aspect ratio as (width, height) parts.
    pub fn ratio(self) -> (f32, f32) {
        match self {
            CanvasSizePreset::Wide => (16.0, 9.0),
            CanvasSizePreset::Square => (1.0, 1.0),
            CanvasSizePreset::Portrait => (4.0, 5.0),
            CanvasSizePreset::Story => (9.0, 16.0),
        }
    }

    /// Width to height ratio.
    pub fn aspect_ratio(self) -> f32 {
        let (w, h) = self.ratio();
        w / h
    }

    /// Resolves the canvas geometry.
    pub fn spec(self) -> CanvasSpec {
        let (padding, gap) = match self {
            CanvasSizePreset::Wide => (64.0, 18.0),
            CanvasSizePreset::Square => (80.0, 20.0),
            CanvasSizePreset::Portrait => (80.0, 22.0),
            CanvasSizePreset::Story => (96.0, 24.0),
        };
        CanvasSpec {
            width: CANVAS_REFERENCE_WIDTH,
            height: CANVAS_REFERENCE_WIDTH * self.ratio().1 / self.ratio().0,
            padding,
            gap,
        }
    }
}

/// Per-tag font size and height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TagSizePreset {
    /// Compact tags
    Small,
    /// Default size
    #[default]
    Medium,
    /// Headline tags
    Large,
}

/// Resolved tag metrics in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagMetrics {
    /// Text font size
    pub font_size: f32,
    /// Tag box height
    pub height: f32,
    /// Horizontal padding on each side of padded tags
    pub padding_x: f32,
    /// Emoji sticker edge length
    pub emoji_size: f32,
}

impl TagSizePreset {
    /// Every preset, in display order.
    pub const ALL: [TagSizePreset; 3] = [TagSizePreset::Small, TagSizePreset::Medium, TagSizePreset::Large];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            TagSizePreset::Small => "Small",
            TagSizePreset::Medium => "Medium",
            TagSizePreset::Large => "Large",
        }
    }

    /// Resolves the tag metrics.
    pub fn metrics(self) -> TagMetrics {
        match self {
            TagSizePreset::Small => TagMetrics {
                font_size: 40.0,
                height: 72.0,
                padding_x: 24.0,
                emoji_size: 80.0,
            },
            TagSizePreset::Medium => TagMetrics {
                font_size: 56.0,
                height: 96.0,
                padding_x: 32.0,
                emoji_size: 108.0,
            },
            TagSizePreset::Large => TagMetrics {
                font_size: 80.0,
                height: 132.0,
                padding_x: 44.0,
                emoji_size: 148.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_heights_follow_aspect_ratio() {
        assert_eq!(CanvasSizePreset::Wide.spec().height, 720.0);
        assert_eq!(CanvasSizePreset::Square.spec().height, 1280.0);
        assert!(CanvasSizePreset::Story.spec().height > CANVAS_REFERENCE_WIDTH);
    }

    #[test]
    fn content_size_subtracts_padding() {
        let spec = CanvasSizePreset::Wide.spec();
        assert_eq!(spec.content_size(), egui::vec2(1280.0 - 128.0, 720.0 - 128.0));
    }

    #[test]
    fn tag_sizes_grow() {
        let small = TagSizePreset::Small.metrics();
        let large = TagSizePreset::Large.metrics();
        assert!(small.font_size < TagSizePreset::Medium.metrics().font_size);
        assert!(large.height > small.height);
    }

    #[test]
    fn presets_persist_by_kebab_name() {
        assert_eq!(serde_json::to_string(&CanvasSizePreset::Story).unwrap(), "\"story\"");
        assert_eq!(serde_json::to_string(&TagSizePreset::Large).unwrap(), "\"large\"");
    }
}
