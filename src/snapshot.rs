//! Canvas snapshots: render a document to SVG and, on native targets, to PNG.
//!
//! Notes:
//! - The SVG is built on all targets (native + wasm).
//! - PNG rasterisation goes through `resvg`/`tiny-skia` and is native only; web builds
//!   hand out the SVG itself.
//! - Text widths are estimated from character classes since no font context exists here.

use crate::layout::{flow_block_offset, flow_items, flow_layout, percent_to_point, tag_box_size, visible_free_form};
use crate::palette::Background;
use crate::types::*;
use egui::Color32;
use std::fmt::Write as _;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;
use thiserror::Error;

/// Failure to produce a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The generated SVG could not be parsed back
    #[error("failed to parse generated SVG: {0}")]
    Svg(String),
    /// Pixel buffer allocation failed
    #[error("failed to allocate a {0}x{1} pixmap")]
    Pixmap(u32, u32),
    /// PNG encoding failed
    #[error("failed to encode PNG: {0}")]
    Encode(String),
}

/// A rendered image of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`
    pub mime: &'static str,
    /// File extension matching `mime`
    pub extension: &'static str,
}

/// Turns a document into an image.
pub trait Rasterizer: Send + Sync {
    /// Renders `document`.
    fn snapshot(&self, document: &Document) -> Result<Snapshot, SnapshotError>;
}

/// Rasterizer built on the SVG renderer below.
#[derive(Debug, Clone, Copy)]
pub struct SvgRasterizer {
    /// Output scale relative to the canvas reference size
    pub scale: f32,
}

impl Default for SvgRasterizer {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl Rasterizer for SvgRasterizer {
    #[cfg(not(target_arch = "wasm32"))]
    fn snapshot(&self, document: &Document) -> Result<Snapshot, SnapshotError> {
        use tiny_skia::Pixmap;

        let (svg, width, height) = build_svg(document);

        let mut opt = usvg::Options::default();
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        opt.fontdb = Arc::new(db);

        let tree = usvg::Tree::from_data(svg.as_bytes(), &opt)
            .map_err(|e| SnapshotError::Svg(e.to_string()))?;

        let scale = self.scale.clamp(0.25, 4.0);
        let out_w = ((width as f32) * scale).round().max(1.0) as u32;
        let out_h = ((height as f32) * scale).round().max(1.0) as u32;
        let mut pixmap = Pixmap::new(out_w, out_h).ok_or(SnapshotError::Pixmap(out_w, out_h))?;

        let mut pmut = pixmap.as_mut();
        let transform = tiny_skia::Transform::from_scale(scale, scale);
        resvg::render(&tree, transform, &mut pmut);

        let bytes = pixmap
            .encode_png()
            .map_err(|e| SnapshotError::Encode(e.to_string()))?;
        Ok(Snapshot {
            bytes,
            mime: "image/png",
            extension: "png",
        })
    }

    #[cfg(target_arch = "wasm32")]
    fn snapshot(&self, document: &Document) -> Result<Snapshot, SnapshotError> {
        let (svg, _w, _h) = build_svg(document);
        Ok(Snapshot {
            bytes: svg.into_bytes(),
            mime: "image/svg+xml",
            extension: "svg",
        })
    }
}

/// Rough rendered width of `text` at `font_size`: full width for CJK and Hangul, a bit
/// over half for everything else.
pub fn estimate_text_width(text: &str, font_size: f32) -> f32 {
    text.chars()
        .map(|c| {
            let wide = matches!(c as u32, 0x1100..=0x11FF | 0x2E80..=0x9FFF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF);
            if wide {
                font_size
            } else if c.is_whitespace() {
                font_size * 0.3
            } else {
                font_size * 0.58
            }
        })
        .sum()
}

fn hex(c: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r(), c.g(), c.b())
}

/// Builds an SVG string for `document`. Returns (svg, width, height).
pub fn build_svg(document: &Document) -> (String, u32, u32) {
    let canvas = document.canvas_size.spec();
    let metrics = document.tag_size.metrics();
    let palette = document.palette.palette();
    let width = canvas.width.round() as u32;
    let height = canvas.height.round() as u32;
    let bounds = canvas.content_size();
    let origin = egui::pos2(canvas.padding, canvas.padding);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = width,
        h = height
    );

    match palette.background {
        Background::Solid(c) => {
            let _ = writeln!(out, "<rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" fill=\"{}\" />", hex(c));
        }
        Background::Linear { top, bottom } => {
            let _ = writeln!(
                out,
                "<defs><linearGradient id=\"bg\" x1=\"0\" y1=\"0\" x2=\"0\" y2=\"1\"><stop offset=\"0\" stop-color=\"{}\" /><stop offset=\"1\" stop-color=\"{}\" /></linearGradient></defs>",
                hex(top),
                hex(bottom)
            );
            let _ = writeln!(out, "<rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" fill=\"url(#bg)\" />");
        }
    }

    // Placed tags as (tag, rect in canvas units)
    let placed: Vec<(&Tag, egui::Rect)> = if document.layout_mode.is_flow() {
        let items = flow_items(&document.tags, &palette, &metrics, |text| {
            estimate_text_width(text, metrics.font_size)
        });
        let layout = flow_layout(&items, bounds.x, canvas.gap);
        let offset = origin.to_vec2() + flow_block_offset(&layout, bounds);
        document
            .tags
            .iter()
            .zip(layout.rects)
            .filter_map(|(tag, rect)| rect.map(|r| (tag, r.translate(offset))))
            .collect()
    } else {
        let container = egui::Rect::from_min_size(origin, bounds);
        visible_free_form(&document.tags)
            .map(|tag| {
                let style = palette.tag_style(tag.tag_variant, tag.tag_shape);
                let text_width = tag
                    .content
                    .as_text()
                    .map(|text| estimate_text_width(text, metrics.font_size))
                    .unwrap_or_default();
                let size = tag_box_size(&tag.content, &style, &metrics, text_width);
                let min = percent_to_point(container, tag.position.unwrap_or_default());
                (tag, egui::Rect::from_min_size(min, size))
            })
            .collect()
    };

    for (tag, rect) in placed {
        let style = palette.tag_style(tag.tag_variant, tag.tag_shape);
        let center = rect.center();
        match &tag.content {
            TagContent::Text(value) => {
                let radius = rect.height() * style.corner_ratio;
                let fill = style.fill.map(hex).unwrap_or_else(|| "none".to_string());
                let stroke = match style.stroke {
                    Some((w, c)) => format!(" stroke=\"{}\" stroke-width=\"{w}\"", hex(c)),
                    None => String::new(),
                };
                let _ = writeln!(
                    out,
                    "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" rx=\"{r:.1}\" ry=\"{r:.1}\" fill=\"{fill}\"{stroke} />",
                    rect.min.x,
                    rect.min.y,
                    rect.width(),
                    rect.height(),
                    r = radius
                );
                let _ = writeln!(
                    out,
                    "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
                    center.x,
                    center.y,
                    metrics.font_size,
                    hex(style.text_color),
                    escape_xml(value)
                );
            }
            TagContent::Emoji(emoji) => {
                let _ = writeln!(
                    out,
                    "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"{:.1}\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
                    center.x,
                    center.y,
                    metrics.emoji_size * 0.8,
                    escape_xml(&emoji.glyph)
                );
            }
            TagContent::LineBreak => {}
        }
    }

    let _ = writeln!(out, "</svg>");
    (out, width, height)
}

fn escape_xml(input: &str) -> String {
    let mut s = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            '"' => s.push_str("&quot;"),
            '\'' => s.push_str("&apos;"),
            _ => s.push(ch),
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteName;
    use crate::presets::CanvasSizePreset;

    fn doc(tags: Vec<Tag>) -> Document {
        Document {
            tags,
            palette: PaletteName::BlueGradient,
            ..Default::default()
        }
    }

    #[test]
    fn svg_has_canvas_size_and_gradient() {
        let (svg, w, h) = build_svg(&doc(vec![]));
        assert_eq!((w, h), (1280, 720));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("linearGradient"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn svg_escapes_text_and_skips_line_breaks() {
        let tags = vec![
            Tag::text(1, "a<b & \"c\"", TagVariant::Outlined, TagShape::Squared),
            Tag::line_break(2),
        ];
        let (svg, _, _) = build_svg(&doc(tags));
        assert!(svg.contains("a&lt;b &amp; &quot;c&quot;"));
        assert_eq!(svg.matches("<text").count(), 1);
        assert!(svg.contains("stroke-width"));
    }

    #[test]
    fn free_form_places_by_percent() {
        let mut tag = Tag::text(1, "x", TagVariant::Filled, TagShape::Round);
        tag.position = Some(TagPosition::new(50.0, 0.0));
        let mut document = doc(vec![tag, Tag::line_break(2)]);
        document.layout_mode = LayoutMode::FreeForm;
        document.canvas_size = CanvasSizePreset::Square;

        let canvas = CanvasSizePreset::Square.spec();
        let expected_x = canvas.padding + canvas.content_size().x / 2.0;
        let (svg, _, _) = build_svg(&document);
        assert!(svg.contains(&format!("<rect x=\"{:.1}\" y=\"{:.1}\"", expected_x, canvas.padding)));
    }

    #[test]
    fn wide_characters_are_wider() {
        assert!(estimate_text_width("가나", 10.0) > estimate_text_width("ab", 10.0));
        assert_eq!(estimate_text_width("", 10.0), 0.0);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn native_snapshot_is_png() {
        let tags = vec![Tag::text(1, "hello", TagVariant::Filled, TagShape::Round)];
        let snapshot = SvgRasterizer { scale: 0.25 }.snapshot(&doc(tags)).unwrap();
        assert_eq!(snapshot.mime, "image/png");
        assert_eq!(&snapshot.bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
