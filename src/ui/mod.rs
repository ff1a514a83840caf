//! User interface components and editing logic for the thumbnail editor.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main ThumbnailApp
//! - `file_ops` - Template export/import for native and WASM
//! - `remote_ops` - Remote gallery save, listing and apply
//! - `canvas` - Canvas layout, overflow checks and drag interaction
//! - `rendering` - Drawing the background and tags

mod canvas;
mod file_ops;
mod remote_ops;
mod rendering;
mod state;


pub use state::{EditorSettings, ThumbnailApp};

use crate::constants::NOTICE_SECONDS;
use crate::gallery::{all_templates, build_template, GalleryKind};
use crate::layout::{move_by_key, reorder_by_ids, seed_position, visible_free_form, DragOutcome, KeyMove};
use crate::overflow::Overflow;
use crate::palette::PaletteName;
use crate::presets::{CanvasSizePreset, TagSizePreset};
use crate::recommend::{suggestion_contents, RecommendStyle};
use crate::store::tags_from_input;
use crate::template::TemplateDocument;
use crate::types::*;
use eframe::egui;
use self::state::{Notice, PendingFileOperation};

impl eframe::App for ThumbnailApp {
    /// Persist editor settings between restarts. The document persists itself.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.settings.to_json() {
            Ok(json) => {
                storage.set_string("app_state", json);
            }
            Err(err) => {
                log::error!("Failed to serialize editor settings: {err}");
            }
        }
    }

    /// Main update function called by egui for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.frame_counter += 1;
        self.now = ctx.input(|i| i.time);
        if self.notice.as_ref().is_some_and(|notice| notice.expires_at <= self.now) {
            self.notice = None;
        }

        let visuals = if self.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        self.handle_pending_operations(ctx);
        self.handle_remote_results(ctx);
        self.handle_keys(ctx);

        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        let viewport_width = ctx.input(|i| i.screen_rect().width());
        let max_width = (viewport_width * 0.6).max(220.0);
        let clamped_width = self.settings.side_panel_width.clamp(220.0, max_width);

        egui::SidePanel::left("side_panel")
            .resizable(true)
            .default_width(clamped_width)
            .show(ctx, |ui| {
                self.settings.side_panel_width = ui.available_width().clamp(220.0, max_width);
                self.draw_side_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
            self.draw_notice(ui);
        });

        if self.overflow.is_armed() {
            ctx.request_repaint();
        }
        if let Some(notice) = &self.notice {
            let remaining = (notice.expires_at - self.now).max(0.0);
            ctx.request_repaint_after(std::time::Duration::from_secs_f64(remaining));
        }
    }
}

impl ThumbnailApp {
    /// Shows a transient notice over the canvas.
    pub fn show_notice(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!("Notice: {text}");
        self.notice = Some(Notice {
            text,
            expires_at: self.now + NOTICE_SECONDS,
        });
    }

    /// Requests an overflow check on the next frame, when the list is laid out by flow.
    fn arm_overflow(&mut self) {
        if self.document.layout_mode().is_flow() {
            self.overflow.arm(self.frame_counter);
        }
    }

    /// Resolves a pending overflow check with this frame's measurement and reverts the
    /// last mutation when the content no longer fits.
    ///
    /// # Returns
    ///
    /// The classification when a check ran this frame.
    pub fn check_overflow(&mut self, content: egui::Vec2, bounds: egui::Vec2) -> Option<Overflow> {
        let verdict = self.overflow.check(self.frame_counter, content, bounds)?;
        if let Some(message) = verdict.notice() {
            log::debug!("Overflow {verdict:?}: content {content:?} in {bounds:?}");
            self.document.store_mut().rollback_tags();
            self.show_notice(message);
        }
        Some(verdict)
    }

    /// Gives new tags a start position when they enter a free-form canvas.
    fn place_new(&self, mut tags: Vec<Tag>) -> Vec<Tag> {
        if self.document.layout_mode() == LayoutMode::FreeForm {
            let mut index = visible_free_form(self.document.tags()).count();
            for tag in tags.iter_mut().filter(|tag| !tag.content.is_line_break()) {
                tag.position = Some(seed_position(index));
                index += 1;
            }
        }
        tags
    }

    fn add_contents(&mut self, contents: Vec<TagContent>) -> usize {
        if contents.is_empty() {
            return 0;
        }
        let variant = self.interaction.new_tag_variant;
        let shape = self.interaction.new_tag_shape;
        let tags = self.document.store_mut().make_tags(contents, variant, shape);
        let tags = self.place_new(tags);
        let count = tags.len();
        match <[Tag; 1]>::try_from(tags) {
            Ok([tag]) => self.document.store_mut().add_tag(tag),
            Err(tags) => self.document.store_mut().add_tags(tags),
        }
        self.arm_overflow();
        count
    }

    /// Adds one text tag per comma-separated segment of `input`.
    ///
    /// # Returns
    ///
    /// The number of tags added.
    pub fn add_text_tags(&mut self, input: &str) -> usize {
        self.add_contents(tags_from_input(input))
    }

    /// Adds an emoji sticker from the catalog.
    pub fn add_emoji(&mut self, emoji: EmojiReference) {
        self.add_contents(vec![TagContent::Emoji(emoji)]);
    }

    /// Adds a line break marker.
    pub fn add_line_break(&mut self) {
        self.add_contents(vec![TagContent::LineBreak]);
    }

    /// Removes a tag and clears the selection if it pointed at it.
    pub fn remove_tag(&mut self, id: TagId) {
        if self.document.store_mut().remove_tag(id) && self.interaction.selected == Some(id) {
            self.interaction.selected = None;
        }
    }

    /// Applies `patch` to a tag, checking for overflow when its size may change.
    pub fn update_tag(&mut self, id: TagId, patch: TagPatch) {
        if self.document.store_mut().update_tag(id, &patch) && patch.affects_size() {
            self.arm_overflow();
        }
    }

    /// Assigns random styles to every tag.
    pub fn shuffle_styles(&mut self) {
        self.document.store_mut().random_shuffle(&mut self.rng);
        self.arm_overflow();
    }

    /// Clears the tag list.
    pub fn reset_tags(&mut self) {
        self.document.store_mut().reset_tags();
        self.interaction.selected = None;
        self.overflow.disarm();
    }

    /// Restores the list from before the last mutation.
    pub fn rollback(&mut self) {
        self.document.store_mut().rollback_tags();
        self.overflow.disarm();
    }

    /// Switches layout mode; free-form mode does not measure overflow.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        self.interaction.free_drag = None;
        self.interaction.reorder_drag = None;
        self.document.set_layout_mode(mode);
        if !mode.is_flow() {
            self.overflow.disarm();
        }
    }

    /// Moves `dragged` to the slot of `target`.
    pub fn reorder(&mut self, dragged: TagId, target: TagId) {
        if let Some(tags) = reorder_by_ids(self.document.tags(), dragged, target) {
            self.document.store_mut().update_order(tags);
        }
    }

    /// Swaps the selected tag with its neighbour.
    pub fn move_selected(&mut self, direction: KeyMove) {
        let Some(id) = self.interaction.selected else {
            return;
        };
        if let Some(tags) = move_by_key(self.document.tags(), id, direction) {
            self.document.store_mut().update_order(tags);
        }
    }

    /// Commits the end of a free-form drag.
    pub fn finish_free_drag(&mut self, outcome: DragOutcome) {
        match outcome {
            DragOutcome::Moved { id, position } => {
                self.document.store_mut().update_tag(id, &TagPatch::position(position));
            }
            DragOutcome::Clicked(id) => {
                self.interaction.selected = Some(id);
            }
        }
    }

    /// Replaces tags and palette with a template's.
    pub fn apply_template_document(&mut self, mut template: TemplateDocument) {
        self.interaction.selected = None;
        self.interaction.free_drag = None;
        if self.document.layout_mode() == LayoutMode::FreeForm {
            let placeable = template.tags.iter_mut().filter(|tag| !tag.content.is_line_break());
            for (index, tag) in placeable.enumerate() {
                tag.position.get_or_insert_with(|| seed_position(index));
            }
        }
        self.document.apply_template(template);
    }

    /// Applies a built-in template.
    pub fn apply_gallery(&mut self, kind: GalleryKind) {
        let template = build_template(kind, &self.catalog);
        self.apply_template_document(template);
    }

    /// Asks the recommender about the text in the recommendation field.
    pub fn request_recommendations(&mut self) {
        let input = self.interaction.recommend_input.clone();
        match self.recommender.recommend(&input, self.settings.recommend_style) {
            Ok(recommendation) => {
                self.interaction.recommendation = Some(recommendation);
            }
            Err(err) => {
                self.interaction.recommendation = None;
                self.show_notice(err.to_string());
            }
        }
    }

    /// Adds the tags of the `index`-th recommended title.
    pub fn apply_suggestion(&mut self, index: usize) -> usize {
        let Some(title) = self
            .interaction
            .recommendation
            .as_ref()
            .and_then(|rec| rec.titles.get(index))
        else {
            return 0;
        };
        let contents = suggestion_contents(title, &self.catalog);
        self.add_contents(contents)
    }

    /// Handles keyboard shortcuts: Delete removes the selection, arrows reorder it in
    /// sortable mode.
    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (delete, backward, forward) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace),
                i.key_pressed(egui::Key::ArrowLeft) || i.key_pressed(egui::Key::ArrowUp),
                i.key_pressed(egui::Key::ArrowRight) || i.key_pressed(egui::Key::ArrowDown),
            )
        });
        if delete {
            if let Some(id) = self.interaction.selected {
                self.remove_tag(id);
            }
        }
        if self.document.layout_mode() == LayoutMode::Sortable {
            if backward {
                self.move_selected(KeyMove::Backward);
            } else if forward {
                self.move_selected(KeyMove::Forward);
            }
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            if ui.button("Import…").clicked() {
                self.file.pending = Some(PendingFileOperation::Import);
            }
            if ui.button("Export…").clicked() {
                self.file.pending = Some(PendingFileOperation::Export);
            }
            ui.menu_button("Gallery", |ui| {
                for info in all_templates() {
                    if ui.button(info.name).clicked() {
                        self.apply_gallery(info.kind);
                    }
                }
            });

            let can_save = !self.remote.save_pending && !self.document.tags().is_empty();
            if ui
                .add_enabled(can_save, egui::Button::new("Save to gallery"))
                .clicked()
            {
                self.save_to_remote(ui.ctx());
            }

            ui.separator();

            if ui.button("Shuffle").clicked() {
                self.shuffle_styles();
            }
            if ui.button("Reset").clicked() {
                self.reset_tags();
            }
            if ui.button("⟲ Rollback").clicked() {
                self.rollback();
            }

            ui.separator();

            let mut mode = self.document.layout_mode();
            egui::ComboBox::from_id_salt("layout_mode_combo")
                .selected_text(mode.label())
                .show_ui(ui, |ui| {
                    for option in LayoutMode::ALL {
                        ui.selectable_value(&mut mode, option, option.label());
                    }
                });
            if mode != self.document.layout_mode() {
                self.set_layout_mode(mode);
            }

            let mut canvas = self.document.canvas_size();
            egui::ComboBox::from_id_salt("canvas_size_combo")
                .selected_text(canvas.label())
                .show_ui(ui, |ui| {
                    for option in CanvasSizePreset::ALL {
                        ui.selectable_value(&mut canvas, option, option.label());
                    }
                });
            if canvas != self.document.canvas_size() {
                self.document.set_canvas_size(canvas);
            }

            let mut tag_size = self.document.tag_size();
            egui::ComboBox::from_id_salt("tag_size_combo")
                .selected_text(tag_size.label())
                .show_ui(ui, |ui| {
                    for option in TagSizePreset::ALL {
                        ui.selectable_value(&mut tag_size, option, option.label());
                    }
                });
            if tag_size != self.document.tag_size() {
                self.document.set_tag_size(tag_size);
            }

            let mut palette = self.document.palette();
            egui::ComboBox::from_id_salt("palette_combo")
                .selected_text(palette.label())
                .show_ui(ui, |ui| {
                    for option in PaletteName::ALL {
                        ui.selectable_value(&mut palette, option, option.label());
                    }
                });
            if palette != self.document.palette() {
                self.document.set_palette(palette);
            }

            ui.separator();
            ui.checkbox(&mut self.settings.dark_mode, "Dark Mode");

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("{} tags", self.document.tags().len()));
            });
        });
    }

    fn draw_side_panel(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Add");
            let response = ui.text_edit_singleline(&mut self.interaction.new_tag_text);
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            ui.horizontal(|ui| {
                egui::ComboBox::from_id_salt("new_tag_variant")
                    .selected_text(self.interaction.new_tag_variant.label())
                    .show_ui(ui, |ui| {
                        for option in TagVariant::ALL {
                            ui.selectable_value(&mut self.interaction.new_tag_variant, option, option.label());
                        }
                    });
                egui::ComboBox::from_id_salt("new_tag_shape")
                    .selected_text(self.interaction.new_tag_shape.label())
                    .show_ui(ui, |ui| {
                        for option in TagShape::TEXT_SHAPES {
                            ui.selectable_value(&mut self.interaction.new_tag_shape, option, option.label());
                        }
                    });
            });
            ui.horizontal(|ui| {
                if ui.button("Add tags").clicked() || submitted {
                    let input = std::mem::take(&mut self.interaction.new_tag_text);
                    self.add_text_tags(&input);
                }
                if ui.button("Line break").clicked() {
                    self.add_line_break();
                }
            });

            ui.separator();
            self.draw_selected_editor(ui);

            ui.separator();
            ui.collapsing("Emoji", |ui| {
                ui.text_edit_singleline(&mut self.interaction.emoji_query);
                let mut picked = None;
                ui.horizontal_wrapped(|ui| {
                    for emoji in self.catalog.search(&self.interaction.emoji_query) {
                        if ui.button(&emoji.glyph).on_hover_text(&emoji.cldr).clicked() {
                            picked = Some(emoji.clone());
                        }
                    }
                });
                if let Some(emoji) = picked {
                    self.add_emoji(emoji);
                }
            });

            ui.collapsing("Recommend", |ui| {
                self.draw_recommendations(ui);
            });

            ui.collapsing("Remote gallery", |ui| {
                self.draw_remote_panel(ui);
            });

            ui.separator();
            ui.label("Tags");
            let mut clicked = None;
            for tag in self.document.tags() {
                let label = match &tag.content {
                    TagContent::Text(text) => text.clone(),
                    TagContent::Emoji(emoji) => format!("{} {}", emoji.glyph, emoji.cldr),
                    TagContent::LineBreak => "↵ line break".to_string(),
                };
                let selected = self.interaction.selected == Some(tag.id);
                if ui.selectable_label(selected, label).clicked() {
                    clicked = Some(tag.id);
                }
            }
            if let Some(id) = clicked {
                self.interaction.selected = Some(id);
            }
        });
    }

    fn draw_selected_editor(&mut self, ui: &mut egui::Ui) {
        let Some(tag) = self
            .interaction
            .selected
            .and_then(|id| self.document.store().get(id))
            .cloned()
        else {
            ui.label("Select a tag to edit it.");
            return;
        };

        if self.interaction.edit_for != Some(tag.id) {
            self.interaction.edit_for = Some(tag.id);
            self.interaction.edit_text = tag.content.as_text().unwrap_or_default().to_string();
        }

        ui.heading("Selected");
        if tag.content.as_text().is_some() {
            let response = ui.text_edit_singleline(&mut self.interaction.edit_text);
            if response.lost_focus() {
                let text = self.interaction.edit_text.trim().to_string();
                if !text.is_empty() && tag.content.as_text() != Some(text.as_str()) {
                    self.update_tag(tag.id, TagPatch::content(TagContent::Text(text)));
                }
            }
        }

        if !tag.content.is_line_break() {
            let mut variant = tag.tag_variant;
            ui.horizontal(|ui| {
                for option in TagVariant::ALL {
                    ui.selectable_value(&mut variant, option, option.label());
                }
            });
            if variant != tag.tag_variant {
                self.update_tag(
                    tag.id,
                    TagPatch {
                        tag_variant: Some(variant),
                        ..Default::default()
                    },
                );
            }
        }

        if tag.content.as_text().is_some() {
            let mut shape = tag.tag_shape;
            ui.horizontal(|ui| {
                for option in TagShape::TEXT_SHAPES {
                    ui.selectable_value(&mut shape, option, option.label());
                }
            });
            if shape != tag.tag_shape {
                self.update_tag(
                    tag.id,
                    TagPatch {
                        tag_shape: Some(shape),
                        ..Default::default()
                    },
                );
            }
        }

        if ui.button("Remove").clicked() {
            self.remove_tag(tag.id);
        }
    }

    fn draw_recommendations(&mut self, ui: &mut egui::Ui) {
        ui.add(
            egui::TextEdit::multiline(&mut self.interaction.recommend_input)
                .hint_text("Post title or summary")
                .desired_rows(3),
        );
        ui.horizontal(|ui| {
            egui::ComboBox::from_id_salt("recommend_style")
                .selected_text(self.settings.recommend_style.label())
                .show_ui(ui, |ui| {
                    for option in RecommendStyle::ALL {
                        ui.selectable_value(&mut self.settings.recommend_style, option, option.label());
                    }
                });
            if ui.button("Recommend").clicked() {
                self.request_recommendations();
            }
        });

        let mut chosen = None;
        if let Some(recommendation) = &self.interaction.recommendation {
            for (index, title) in recommendation.titles.iter().enumerate() {
                if ui.button(title.preview()).clicked() {
                    chosen = Some(index);
                }
            }
        }
        if let Some(index) = chosen {
            self.apply_suggestion(index);
        }
    }

    fn draw_notice(&self, ui: &mut egui::Ui) {
        let Some(notice) = &self.notice else {
            return;
        };
        if notice.expires_at <= self.now {
            return;
        }
        let rect = ui.max_rect();
        let pos = egui::pos2(rect.center().x, rect.max.y - 24.0);
        let painter = ui.painter();
        let galley = painter.layout_no_wrap(
            notice.text.clone(),
            egui::FontId::proportional(16.0),
            egui::Color32::WHITE,
        );
        let bubble = egui::Rect::from_center_size(pos, galley.size() + egui::vec2(24.0, 12.0));
        painter.rect_filled(bubble, 8.0, egui::Color32::from_black_alpha(200));
        painter.galley(bubble.min + egui::vec2(12.0, 6.0), galley, egui::Color32::WHITE);
    }
}
