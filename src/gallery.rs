//! Built-in templates that can be applied from the toolbar.
//!
//! Gallery entries decode to the same [`TemplateDocument`] a remote record or an
//! imported file does, so applying one goes through the same path.

use crate::emoji::EmojiCatalog;
use crate::palette::PaletteName;
use crate::template::TemplateDocument;
use crate::types::*;

/// Kinds of built-in templates available from the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryKind {
    /// Short dev-blog headline with a sticker
    DevLog,
    /// Two-line tutorial title
    Tutorial,
    /// Loose free-form collage
    Announcement,
}

/// Metadata for a single gallery entry.
pub struct GalleryInfo {
    /// Stable identifier for the entry
    pub kind: GalleryKind,
    /// Human-friendly display name
    pub name: &'static str,
}

/// Returns all gallery entries with their display names.
pub const fn all_templates() -> &'static [GalleryInfo] {
    const TEMPLATES: &[GalleryInfo] = &[
        GalleryInfo {
            kind: GalleryKind::DevLog,
            name: "Dev log",
        },
        GalleryInfo {
            kind: GalleryKind::Tutorial,
            name: "Tutorial (two lines)",
        },
        GalleryInfo {
            kind: GalleryKind::Announcement,
            name: "Announcement (free-form)",
        },
    ];
    TEMPLATES
}

/// Builds the document for a gallery entry. Emoji come from `catalog`; stickers it does
/// not carry are left out.
pub fn build_template(kind: GalleryKind, catalog: &EmojiCatalog) -> TemplateDocument {
    let mut next = 0;
    let mut id = || {
        next += 1;
        next
    };
    let emoji = |cldr: &str| catalog.get(cldr).cloned();

    match kind {
        GalleryKind::DevLog => {
            let mut tags = Vec::new();
            if let Some(laptop) = emoji("laptop") {
                tags.push(Tag::emoji(id(), laptop));
            }
            tags.push(Tag::text(id(), "Dev Log", TagVariant::Filled, TagShape::Round));
            tags.push(Tag::text(id(), "#12", TagVariant::Outlined, TagShape::Round));
            TemplateDocument {
                tags,
                palette: PaletteName::Black,
            }
        }
        GalleryKind::Tutorial => {
            let mut tags = vec![
                Tag::text(id(), "Rust", TagVariant::Filled, TagShape::Squared),
                Tag::text(id(), "for beginners", TagVariant::Ghost, TagShape::Squared),
                Tag::line_break(id()),
                Tag::text(id(), "Ownership", TagVariant::Outlined, TagShape::Squared),
            ];
            if let Some(books) = emoji("books") {
                tags.push(Tag::emoji(id(), books));
            }
            TemplateDocument {
                tags,
                palette: PaletteName::BlueGradient,
            }
        }
        GalleryKind::Announcement => {
            let placed = |mut tag: Tag, x: f32, y: f32| {
                tag.position = Some(TagPosition::new(x, y));
                tag
            };
            let mut tags = vec![
                placed(Tag::text(id(), "v1.0", TagVariant::Filled, TagShape::Round), 10.0, 20.0),
                placed(Tag::text(id(), "released", TagVariant::Ghost, TagShape::Round), 40.0, 45.0),
            ];
            if let Some(party) = emoji("party popper") {
                tags.push(placed(Tag::emoji(id(), party), 75.0, 10.0));
            }
            TemplateDocument {
                tags,
                palette: PaletteName::SunsetGradient,
            }
        }
    }
}
