//! Palette registry.
//!
//! A static lookup from palette name to canvas background and per-tag style. Documents
//! persist only the [`PaletteName`]; styles are resolved here at render time, so changes
//! to these tables re-skin previously saved templates.

use crate::types::{TagShape, TagVariant};
use egui::Color32;
use serde::{Deserialize, Serialize};

/// Name of a palette. This is the persisted unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaletteName {
    /// Plain white canvas with dark tags
    #[default]
    White,
    /// Near-black canvas with yellow tags
    Black,
    /// Blue vertical gradient
    BlueGradient,
    /// Pink vertical gradient
    PinkGradient,
    /// Purple vertical gradient
    PurpleGradient,
    /// Orange to red gradient
    SunsetGradient,
    /// Mint to green gradient
    MintGradient,
    /// Warm paper tone
    Cream,
}

impl PaletteName {
    /// Every palette, in display order.
    pub const ALL: [PaletteName; 8] = [
        PaletteName::White,
        PaletteName::Black,
        PaletteName::BlueGradient,
        PaletteName::PinkGradient,
        PaletteName::PurpleGradient,
        PaletteName::SunsetGradient,
        PaletteName::MintGradient,
        PaletteName::Cream,
    ];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            PaletteName::White => "White",
            PaletteName::Black => "Black",
            PaletteName::BlueGradient => "Blue gradient",
            PaletteName::PinkGradient => "Pink gradient",
            PaletteName::PurpleGradient => "Purple gradient",
            PaletteName::SunsetGradient => "Sunset gradient",
            PaletteName::MintGradient => "Mint gradient",
            PaletteName::Cream => "Cream",
        }
    }

    /// Resolves the palette definition.
    pub fn palette(self) -> Palette {
        let (background, accent, on_accent, ink) = match self {
            PaletteName::White => (
                Background::Solid(Color32::WHITE),
                Color32::from_rgb(0x1F, 0x29, 0x37),
                Color32::WHITE,
                Color32::from_rgb(0x11, 0x18, 0x27),
            ),
            PaletteName::Black => (
                Background::Solid(Color32::from_rgb(0x0B, 0x0B, 0x0F)),
                Color32::from_rgb(0xFA, 0xCC, 0x15),
                Color32::from_rgb(0x11, 0x11, 0x11),
                Color32::WHITE,
            ),
            PaletteName::BlueGradient => (
                Background::Linear {
                    top: Color32::from_rgb(0x3B, 0x82, 0xF6),
                    bottom: Color32::from_rgb(0x1E, 0x3A, 0x8A),
                },
                Color32::WHITE,
                Color32::from_rgb(0x1E, 0x3A, 0x8A),
                Color32::WHITE,
            ),
            PaletteName::PinkGradient => (
                Background::Linear {
                    top: Color32::from_rgb(0xF4, 0x72, 0xB6),
                    bottom: Color32::from_rgb(0xDB, 0x27, 0x77),
                },
                Color32::WHITE,
                Color32::from_rgb(0x9D, 0x17, 0x4D),
                Color32::WHITE,
            ),
            PaletteName::PurpleGradient => (
                Background::Linear {
                    top: Color32::from_rgb(0xA7, 0x8B, 0xFA),
                    bottom: Color32::from_rgb(0x6D, 0x28, 0xD9),
                },
                Color32::WHITE,
                Color32::from_rgb(0x4C, 0x1D, 0x95),
                Color32::WHITE,
            ),
            PaletteName::SunsetGradient => (
                Background::Linear {
                    top: Color32::from_rgb(0xF9, 0x73, 0x16),
                    bottom: Color32::from_rgb(0xE1, 0x1D, 0x48),
                },
                Color32::from_rgb(0xFF, 0xF7, 0xED),
                Color32::from_rgb(0x9A, 0x34, 0x12),
                Color32::WHITE,
            ),
            PaletteName::MintGradient => (
                Background::Linear {
                    top: Color32::from_rgb(0x6E, 0xE7, 0xB7),
                    bottom: Color32::from_rgb(0x05, 0x96, 0x69),
                },
                Color32::from_rgb(0x06, 0x4E, 0x3B),
                Color32::WHITE,
                Color32::from_rgb(0x06, 0x4E, 0x3B),
            ),
            PaletteName::Cream => (
                Background::Solid(Color32::from_rgb(0xFD, 0xF6, 0xE3)),
                Color32::from_rgb(0xB4, 0x53, 0x09),
                Color32::WHITE,
                Color32::from_rgb(0x78, 0x35, 0x0F),
            ),
        };
        Palette {
            name: self,
            background,
            accent,
            on_accent,
            ink,
        }
    }
}

/// Canvas background fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Background {
    /// Single color
    Solid(Color32),
    /// Vertical gradient from `top` to `bottom`
    Linear {
        /// Color at the top edge
        top: Color32,
        /// Color at the bottom edge
        bottom: Color32,
    },
}

/// Resolved style of one tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TagStyle {
    /// Background fill, if any
    pub fill: Option<Color32>,
    /// Border as (width, color), if any
    pub stroke: Option<(f32, Color32)>,
    /// Text color
    pub text_color: Color32,
    /// Corner radius as a fraction of the tag height
    pub corner_ratio: f32,
    /// Whether horizontal padding is applied around the content
    pub padded: bool,
}

/// A resolved palette definition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    /// The palette's name
    pub name: PaletteName,
    /// Canvas background
    pub background: Background,
    /// Primary tag color
    pub accent: Color32,
    /// Text color drawn on top of `accent`
    pub on_accent: Color32,
    /// Text color drawn directly on the background
    pub ink: Color32,
}

impl Palette {
    /// Style for a (variant, shape) pair.
    ///
    /// The `Emoji` shape disables fill, border and padding regardless of variant.
    pub fn tag_style(&self, variant: TagVariant, shape: TagShape) -> TagStyle {
        let corner_ratio = match shape {
            TagShape::Round => 0.5,
            TagShape::Squared => 0.18,
            TagShape::Emoji => 0.0,
        };
        if shape == TagShape::Emoji {
            return TagStyle {
                fill: None,
                stroke: None,
                text_color: self.ink,
                corner_ratio,
                padded: false,
            };
        }
        match variant {
            TagVariant::Filled => TagStyle {
                fill: Some(self.accent),
                stroke: None,
                text_color: self.on_accent,
                corner_ratio,
                padded: true,
            },
            TagVariant::Outlined => TagStyle {
                fill: None,
                stroke: Some((2.0, self.accent)),
                text_color: self.accent,
                corner_ratio,
                padded: true,
            },
            TagVariant::Ghost => TagStyle {
                fill: None,
                stroke: None,
                text_color: self.ink,
                corner_ratio,
                padded: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_names_use_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&PaletteName::BlueGradient).unwrap(),
            "\"blue_gradient\""
        );
        let parsed: PaletteName = serde_json::from_str("\"sunset_gradient\"").unwrap();
        assert_eq!(parsed, PaletteName::SunsetGradient);
        assert!(serde_json::from_str::<PaletteName>("\"neon\"").is_err());
    }

    #[test]
    fn every_palette_resolves_to_itself() {
        for name in PaletteName::ALL {
            assert_eq!(name.palette().name, name);
        }
    }

    #[test]
    fn emoji_shape_has_no_decoration() {
        let palette = PaletteName::BlueGradient.palette();
        for variant in TagVariant::ALL {
            let style = palette.tag_style(variant, TagShape::Emoji);
            assert!(style.fill.is_none());
            assert!(style.stroke.is_none());
            assert!(!style.padded);
        }
    }

    #[test]
    fn variants_differ_in_fill_and_border() {
        let palette = PaletteName::White.palette();
        let filled = palette.tag_style(TagVariant::Filled, TagShape::Round);
        let outlined = palette.tag_style(TagVariant::Outlined, TagShape::Squared);
        let ghost = palette.tag_style(TagVariant::Ghost, TagShape::Round);

        assert_eq!(filled.fill, Some(palette.accent));
        assert!(outlined.fill.is_none() && outlined.stroke.is_some());
        assert!(ghost.fill.is_none() && ghost.stroke.is_none());
        assert!(filled.corner_ratio > outlined.corner_ratio);
    }
}
