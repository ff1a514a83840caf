//! Canvas rendering for the palette background and tags.
//!
//! All sizes coming from presets are in canvas units; `scale` converts them to screen
//! points for the current zoom-to-fit.

use super::state::ThumbnailApp;
use crate::palette::Background;
use crate::types::*;
use eframe::egui;
use eframe::epaint::StrokeKind;

/// Outline drawn around the selected tag.
const SELECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(100, 150, 255);

impl ThumbnailApp {
    /// Fills `rect` with the palette background.
    pub fn paint_background(&self, painter: &egui::Painter, rect: egui::Rect) {
        match self.document.palette().palette().background {
            Background::Solid(color) => {
                painter.rect_filled(rect, 0.0, color);
            }
            Background::Linear { top, bottom } => {
                let mut mesh = egui::Mesh::default();
                mesh.colored_vertex(rect.left_top(), top);
                mesh.colored_vertex(rect.right_top(), top);
                mesh.colored_vertex(rect.right_bottom(), bottom);
                mesh.colored_vertex(rect.left_bottom(), bottom);
                mesh.add_triangle(0, 1, 2);
                mesh.add_triangle(0, 2, 3);
                painter.add(egui::Shape::mesh(mesh));
            }
        }
    }

    /// Draws one tag into its screen rectangle.
    ///
    /// # Arguments
    ///
    /// * `painter` - The egui painter for drawing operations
    /// * `tag` - Tag to draw; line breaks draw nothing
    /// * `rect` - Screen-space rectangle of the tag
    /// * `scale` - Screen points per canvas unit
    pub fn paint_tag(&self, painter: &egui::Painter, tag: &Tag, rect: egui::Rect, scale: f32) {
        let palette = self.document.palette().palette();
        let metrics = self.document.tag_size().metrics();
        let style = palette.tag_style(tag.tag_variant, tag.tag_shape);

        match &tag.content {
            TagContent::Text(text) => {
                let radius = rect.height() * style.corner_ratio;
                if let Some(fill) = style.fill {
                    painter.rect_filled(rect, radius, fill);
                }
                if let Some((width, color)) = style.stroke {
                    painter.rect_stroke(
                        rect,
                        radius,
                        egui::Stroke::new(width * scale, color),
                        StrokeKind::Inside,
                    );
                }
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    text,
                    egui::FontId::proportional(metrics.font_size * scale),
                    style.text_color,
                );
            }
            TagContent::Emoji(emoji) => {
                painter.text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    &emoji.glyph,
                    egui::FontId::proportional(metrics.emoji_size * 0.8 * scale),
                    style.text_color,
                );
            }
            TagContent::LineBreak => return,
        }

        if self.interaction.selected == Some(tag.id) {
            painter.rect_stroke(
                rect.expand(3.0),
                6.0,
                egui::Stroke::new(2.0, SELECTION_COLOR),
                StrokeKind::Outside,
            );
        }
    }

    /// Marks the slot a sortable drag would drop into.
    pub fn paint_drop_marker(&self, painter: &egui::Painter, rect: egui::Rect) {
        painter.rect_stroke(
            rect.expand(4.0),
            6.0,
            egui::Stroke::new(2.0, SELECTION_COLOR.gamma_multiply(0.6)),
            StrokeKind::Outside,
        );
    }
}
