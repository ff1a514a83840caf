//! Core data types for the thumbnail editor.
//!
//! This module defines the tag entity and the values that travel with it: tag content,
//! visual variant and shape, free-form positions, emoji references and the document
//! snapshot that groups a tag list with its palette and presets.

use crate::palette::PaletteName;
use crate::presets::{CanvasSizePreset, TagSizePreset};
use serde::{Deserialize, Serialize};

/// Identifier of a tag within one document.
///
/// Ids are millisecond timestamps taken at creation time, offset by index for batch
/// creation. They are only unique within a single in-memory list.
pub type TagId = i64;

/// Lower bound applied to each axis of a free-form position.
pub const POSITION_MIN: f32 = 0.0;
/// Upper bound applied to each axis of a free-form position.
///
/// Stops short of 100 so that a dragged tag's own box stays inside the canvas.
pub const POSITION_MAX: f32 = 90.0;

/// A 3D emoji sticker taken from the static catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiReference {
    /// Unique CLDR short name of the emoji
    pub cldr: String,
    /// The emoji glyph itself
    pub glyph: String,
    /// Catalog category
    pub group: String,
    /// Search keywords
    pub keywords: Vec<String>,
    /// Code point notation, e.g. `1F525`
    pub unicode: String,
    /// Relative path of the hosted 3D rendering
    pub image: String,
}

/// What a tag displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TagContent {
    /// Styled text chip
    #[serde(rename = "text")]
    Text(String),
    /// 3D emoji sticker
    #[serde(rename = "3d-emoji")]
    Emoji(EmojiReference),
    /// Layout-only marker forcing a wrap in flow mode
    #[serde(rename = "line-break")]
    LineBreak,
}

impl TagContent {
    /// Returns the text value for text content.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TagContent::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Whether this is the line-break marker.
    pub fn is_line_break(&self) -> bool {
        matches!(self, TagContent::LineBreak)
    }

    /// Whether this is an emoji sticker.
    pub fn is_emoji(&self) -> bool {
        matches!(self, TagContent::Emoji(_))
    }
}

/// Fill style of a text tag. Ignored for emoji content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TagVariant {
    /// Solid background
    #[default]
    Filled,
    /// Border only
    Outlined,
    /// Text only
    Ghost,
}

impl TagVariant {
    /// Every variant, in display order.
    pub const ALL: [TagVariant; 3] = [TagVariant::Filled, TagVariant::Outlined, TagVariant::Ghost];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            TagVariant::Filled => "Filled",
            TagVariant::Outlined => "Outlined",
            TagVariant::Ghost => "Ghost",
        }
    }
}

/// Corner treatment of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TagShape {
    /// Pill shaped
    #[default]
    Round,
    /// Slightly rounded rectangle
    Squared,
    /// Reserved for emoji content; no padding or border
    Emoji,
}

impl TagShape {
    /// Shapes that can be picked for text tags.
    pub const TEXT_SHAPES: [TagShape; 2] = [TagShape::Round, TagShape::Squared];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            TagShape::Round => "Round",
            TagShape::Squared => "Squared",
            TagShape::Emoji => "Emoji",
        }
    }
}

/// Free-form position in percent of the canvas content box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TagPosition {
    /// Horizontal offset, 0 = left edge
    pub x: f32,
    /// Vertical offset, 0 = top edge
    pub y: f32,
}

impl TagPosition {
    /// Creates a position from percentages.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns this position with both axes clamped to `[POSITION_MIN, POSITION_MAX]`.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(POSITION_MIN, POSITION_MAX),
            y: self.y.clamp(POSITION_MIN, POSITION_MAX),
        }
    }
}

/// A single placeable element on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Identity within the current list
    pub id: TagId,
    /// What the tag displays
    pub content: TagContent,
    /// Fill style
    #[serde(default)]
    pub tag_variant: TagVariant,
    /// Corner treatment
    #[serde(default)]
    pub tag_shape: TagShape,
    /// Free-form position; only meaningful in free-form layout mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<TagPosition>,
}

impl Tag {
    /// Creates a tag with the given content and style.
    ///
    /// Emoji content always receives the `Emoji` shape.
    pub fn new(id: TagId, content: TagContent, tag_variant: TagVariant, tag_shape: TagShape) -> Self {
        let tag_shape = if content.is_emoji() {
            TagShape::Emoji
        } else {
            tag_shape
        };
        Self {
            id,
            content,
            tag_variant,
            tag_shape,
            position: None,
        }
    }

    /// Creates a text tag.
    pub fn text(id: TagId, value: impl Into<String>, tag_variant: TagVariant, tag_shape: TagShape) -> Self {
        Self::new(id, TagContent::Text(value.into()), tag_variant, tag_shape)
    }

    /// Creates an emoji sticker tag.
    pub fn emoji(id: TagId, emoji: EmojiReference) -> Self {
        Self::new(id, TagContent::Emoji(emoji), TagVariant::Filled, TagShape::Emoji)
    }

    /// Creates a line-break marker.
    pub fn line_break(id: TagId) -> Self {
        Self::new(id, TagContent::LineBreak, TagVariant::Filled, TagShape::Round)
    }

    /// Applies a shallow merge of `patch` onto this tag.
    pub fn apply(&mut self, patch: &TagPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(variant) = patch.tag_variant {
            self.tag_variant = variant;
        }
        if let Some(shape) = patch.tag_shape {
            self.tag_shape = shape;
        }
        if let Some(position) = patch.position {
            self.position = Some(position);
        }
    }
}

/// Partial tag used by `TagStore::update_tag`. Every `Some` field overrides the old value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagPatch {
    /// New content
    pub content: Option<TagContent>,
    /// New fill style
    pub tag_variant: Option<TagVariant>,
    /// New corner treatment
    pub tag_shape: Option<TagShape>,
    /// New free-form position
    pub position: Option<TagPosition>,
}

impl TagPatch {
    /// Patch that only moves the tag.
    pub fn position(position: TagPosition) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    /// Patch that only replaces the content.
    pub fn content(content: TagContent) -> Self {
        Self {
            content: Some(content),
            ..Default::default()
        }
    }

    /// Whether applying this patch can change the rendered size of the tag.
    pub fn affects_size(&self) -> bool {
        self.content.is_some() || self.tag_variant.is_some() || self.tag_shape.is_some()
    }
}

/// How tags are placed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Wrapping flow in array order
    #[default]
    Flow,
    /// Flow with drag and keyboard reordering
    Sortable,
    /// Explicit percentage positions moved by direct drag
    FreeForm,
}

impl LayoutMode {
    /// Every mode, in display order.
    pub const ALL: [LayoutMode; 3] = [LayoutMode::Flow, LayoutMode::Sortable, LayoutMode::FreeForm];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            LayoutMode::Flow => "Flow",
            LayoutMode::Sortable => "Sortable",
            LayoutMode::FreeForm => "Free-form",
        }
    }

    /// Whether tags are laid out by wrapping (flow or sortable).
    pub fn is_flow(self) -> bool {
        !matches!(self, LayoutMode::FreeForm)
    }
}

/// Value snapshot of the active document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    /// Ordered tag list
    pub tags: Vec<Tag>,
    /// Palette selection (by name)
    pub palette: PaletteName,
    /// Canvas aspect/padding preset
    pub canvas_size: CanvasSizePreset,
    /// Tag font/height preset
    pub tag_size: TagSizePreset,
    /// Placement policy
    pub layout_mode: LayoutMode,
}

impl Document {
    /// Concatenated text of all text tags, separated by spaces.
    pub fn text_summary(&self) -> String {
        self.tags
            .iter()
            .filter_map(|tag| tag.content.as_text())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
