//! Canvas layout and interaction.
//!
//! The canvas is drawn at its preset size scaled to fit the central panel. Layout is
//! computed in canvas units and mapped to the screen with a single scale factor, so
//! drag deltas are converted back through the same factor.

use super::state::ThumbnailApp;
use crate::layout::{flow_block_offset, percent_to_point, tag_box_size, visible_free_form, FreeDrag};
use crate::types::*;
use eframe::egui;

/// Canvas geometry on screen for one frame.
#[derive(Debug, Clone, Copy)]
pub struct CanvasGeometry {
    /// Whole canvas including padding
    pub canvas: egui::Rect,
    /// Content box tags are laid out in
    pub content: egui::Rect,
    /// Screen points per canvas unit
    pub scale: f32,
}

impl CanvasGeometry {
    /// Fits a canvas of the current preset into `available`, centred.
    pub fn fit(app: &ThumbnailApp, available: egui::Rect) -> Self {
        let spec = app.document.canvas();
        let scale = (available.width() / spec.width)
            .min(available.height() / spec.height)
            .max(0.05);
        let canvas = egui::Rect::from_center_size(
            available.center(),
            egui::vec2(spec.width, spec.height) * scale,
        );
        let content = egui::Rect::from_min_size(
            canvas.min + egui::vec2(spec.padding, spec.padding) * scale,
            spec.content_size() * scale,
        );
        Self {
            canvas,
            content,
            scale,
        }
    }

    /// Maps a rectangle in content-box canvas units to the screen.
    pub fn to_screen(&self, rect: egui::Rect) -> egui::Rect {
        egui::Rect::from_min_size(
            self.content.min + rect.min.to_vec2() * self.scale,
            rect.size() * self.scale,
        )
    }
}

impl ThumbnailApp {
    /// Measures `text` at the preset font size, in canvas units.
    fn measure_text(painter: &egui::Painter, text: &str, font_size: f32) -> f32 {
        painter
            .layout_no_wrap(
                text.to_string(),
                egui::FontId::proportional(font_size),
                egui::Color32::BLACK,
            )
            .size()
            .x
    }

    /// Renders the canvas and handles its interactions.
    pub fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
        let geometry = CanvasGeometry::fit(self, response.rect);

        self.paint_background(&painter, geometry.canvas);

        if self.document.layout_mode().is_flow() {
            self.draw_flow(ui, &painter, &response, geometry);
        } else {
            self.draw_free_form(ui, &painter, &response, geometry);
        }
    }

    /// Flow and sortable modes: lay out in array order, run the overflow check, and in
    /// sortable mode handle drag reordering.
    fn draw_flow(
        &mut self,
        ui: &egui::Ui,
        painter: &egui::Painter,
        response: &egui::Response,
        geometry: CanvasGeometry,
    ) {
        let font_size = self.document.tag_size().metrics().font_size;
        let bounds = self.document.canvas().content_size();
        let layout = self
            .document
            .flow(|text| Self::measure_text(painter, text, font_size));

        if let Some(verdict) = self.check_overflow(layout.content_size, bounds) {
            if verdict.is_overflow() {
                // The list changed under this layout; draw it next frame.
                ui.ctx().request_repaint();
                return;
            }
        }

        let offset = flow_block_offset(&layout, bounds);
        let placed: Vec<(Tag, egui::Rect)> = self
            .document
            .tags()
            .iter()
            .zip(&layout.rects)
            .filter_map(|(tag, rect)| rect.map(|r| (tag.clone(), geometry.to_screen(r.translate(offset)))))
            .collect();

        let hit = |pos: egui::Pos2| placed.iter().find(|(_, rect)| rect.contains(pos)).map(|(tag, _)| tag.id);
        let pointer = response.interact_pointer_pos().or_else(|| response.hover_pos());

        if response.clicked() {
            self.interaction.selected = pointer.and_then(hit);
        }
        if self.document.layout_mode() == LayoutMode::Sortable {
            if response.drag_started() {
                self.interaction.reorder_drag = pointer.and_then(hit);
                if self.interaction.reorder_drag.is_some() {
                    self.interaction.selected = self.interaction.reorder_drag;
                }
            }
            if response.drag_stopped() {
                if let (Some(dragged), Some(target)) =
                    (self.interaction.reorder_drag.take(), pointer.and_then(hit))
                {
                    self.reorder(dragged, target);
                    ui.ctx().request_repaint();
                }
            }
        }

        let dragging = self.interaction.reorder_drag;
        let drop_target = dragging.and_then(|_| pointer.and_then(hit));
        for (tag, rect) in &placed {
            let rect = match (dragging, pointer) {
                (Some(id), Some(pos)) if id == tag.id => rect.translate(pos - rect.center()),
                _ => *rect,
            };
            if drop_target == Some(tag.id) && dragging != Some(tag.id) {
                self.paint_drop_marker(painter, rect);
            }
            self.paint_tag(painter, tag, rect, geometry.scale);
        }
    }

    /// Free-form mode: tags at their percentage positions, moved by direct drag.
    fn draw_free_form(
        &mut self,
        ui: &egui::Ui,
        painter: &egui::Painter,
        response: &egui::Response,
        geometry: CanvasGeometry,
    ) {
        let palette = self.document.palette().palette();
        let metrics = self.document.tag_size().metrics();
        let drag = self.interaction.free_drag.clone();

        let placed: Vec<(Tag, egui::Rect)> = visible_free_form(self.document.tags())
            .map(|tag| {
                let style = palette.tag_style(tag.tag_variant, tag.tag_shape);
                let text_width = tag
                    .content
                    .as_text()
                    .map(|text| Self::measure_text(painter, text, metrics.font_size))
                    .unwrap_or_default();
                let size = tag_box_size(&tag.content, &style, &metrics, text_width) * geometry.scale;
                let position = match &drag {
                    Some(drag) if drag.tag_id() == tag.id => drag.preview(),
                    _ => tag.position.unwrap_or_default(),
                };
                let min = percent_to_point(geometry.content, position);
                (tag.clone(), egui::Rect::from_min_size(min, size))
            })
            .collect();

        let pointer = response.interact_pointer_pos();
        if response.drag_started() {
            // Topmost tag wins: later tags are drawn above earlier ones.
            let grabbed = pointer.and_then(|pos| {
                placed
                    .iter()
                    .rev()
                    .find(|(_, rect)| rect.contains(pos))
                    .and_then(|(tag, _)| FreeDrag::begin(tag, pos))
            });
            self.interaction.free_drag = grabbed;
        }
        if let (Some(drag), Some(pos)) = (self.interaction.free_drag.as_mut(), pointer) {
            drag.update(pos, geometry.content.size());
        }
        if response.drag_stopped() {
            if let Some(drag) = self.interaction.free_drag.take() {
                self.finish_free_drag(drag.finish());
            }
        } else if response.clicked() {
            self.interaction.selected = pointer.and_then(|pos| {
                placed
                    .iter()
                    .rev()
                    .find(|(_, rect)| rect.contains(pos))
                    .map(|(tag, _)| tag.id)
            });
        }
        if self.interaction.free_drag.is_some() {
            ui.ctx().request_repaint();
        }

        for (tag, rect) in &placed {
            self.paint_tag(painter, tag, *rect, geometry.scale);
        }
    }
}
