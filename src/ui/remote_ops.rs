//! Remote gallery: saving the current document, listing saved templates and applying one.
//!
//! Jobs run off the UI thread on native builds and report back over the
//! [`RemoteResult`] channel, the same way file operations do.

use super::state::{RemoteResult, ThumbnailApp};
use crate::remote::{decode_record, save_template, TemplateMetadata};
use eframe::egui;

impl ThumbnailApp {
    /// Applies results of finished remote jobs.
    pub fn handle_remote_results(&mut self, ctx: &egui::Context) {
        let mut changed = false;
        while let Ok(result) = self.remote.receiver.try_recv() {
            changed = true;
            match result {
                RemoteResult::Saved(record) => {
                    self.remote.save_pending = false;
                    self.show_notice(format!("Saved \"{}\"", record.metadata.title));
                    self.remote.records.push(record);
                }
                RemoteResult::Listed(records) => {
                    self.remote.list_pending = false;
                    log::debug!("Loaded {} remote templates", records.len());
                    self.remote.records = records;
                }
                RemoteResult::SaveFailed(error) => {
                    self.remote.save_pending = false;
                    log::error!("Saving to the gallery failed: {error}");
                    self.show_notice(error);
                }
                RemoteResult::ListFailed(error) => {
                    self.remote.list_pending = false;
                    log::error!("Listing the gallery failed: {error}");
                    self.show_notice(error);
                }
            }
        }
        if changed {
            ctx.request_repaint();
        }
    }

    /// Metadata for the next save, as typed into the form.
    pub fn save_metadata(&self) -> TemplateMetadata {
        let blog_url = self.remote.blog_url.trim();
        TemplateMetadata {
            title: self.remote.metadata.title.trim().to_string(),
            description: self.remote.metadata.description.trim().to_string(),
            author: self.settings.author.trim().to_string(),
            blog_url: (!blog_url.is_empty()).then(|| blog_url.to_string()),
        }
    }

    /// Starts saving the current document to the gallery. Ignored while a save is
    /// already in flight.
    pub fn save_to_remote(&mut self, ctx: &egui::Context) {
        if self.remote.save_pending {
            return;
        }
        self.remote.save_pending = true;

        let document = self.document.snapshot();
        let metadata = self.save_metadata();
        let store = self.remote.store.clone();
        let rasterizer = self.remote.rasterizer.clone();
        let sender = self.remote.sender.clone();
        let ctx = ctx.clone();

        Self::run_remote_job(move || {
            let result = match save_template(store.as_ref(), rasterizer.as_ref(), &document, metadata) {
                Ok(record) => RemoteResult::Saved(record),
                Err(err) => RemoteResult::SaveFailed(err.to_string()),
            };
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    /// Starts fetching the gallery listing.
    pub fn refresh_remote(&mut self, ctx: &egui::Context) {
        if self.remote.list_pending {
            return;
        }
        self.remote.list_pending = true;

        let store = self.remote.store.clone();
        let sender = self.remote.sender.clone();
        let ctx = ctx.clone();

        Self::run_remote_job(move || {
            let result = match store.select_all() {
                Ok(records) => RemoteResult::Listed(records),
                Err(err) => RemoteResult::ListFailed(err.to_string()),
            };
            let _ = sender.send(result);
            ctx.request_repaint();
        });
    }

    /// Replaces the document with the `index`-th listed template.
    pub fn apply_remote(&mut self, index: usize) {
        let Some(record) = self.remote.records.get(index) else {
            return;
        };
        match decode_record(record) {
            Ok(template) => {
                log::info!("Applying remote template {}", record.id);
                self.apply_template_document(template);
            }
            Err(err) => {
                log::warn!("Remote template {} is malformed: {err}", record.id);
                self.show_notice(format!("Could not apply template: {err}"));
            }
        }
    }

    /// Runs `job` on the tokio blocking pool when a runtime is entered, otherwise inline.
    #[cfg(not(target_arch = "wasm32"))]
    fn run_remote_job(job: impl FnOnce() + Send + 'static) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(job);
            }
            Err(_) => job(),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn run_remote_job(job: impl FnOnce() + 'static) {
        job();
    }

    /// Draws the save form and the list of saved templates.
    pub fn draw_remote_panel(&mut self, ui: &mut egui::Ui) {
        egui::Grid::new("remote_metadata").num_columns(2).show(ui, |ui| {
            ui.label("Title");
            ui.add(egui::TextEdit::singleline(&mut self.remote.metadata.title).hint_text("From tags"));
            ui.end_row();
            ui.label("Description");
            ui.text_edit_singleline(&mut self.remote.metadata.description);
            ui.end_row();
            ui.label("Author");
            ui.text_edit_singleline(&mut self.settings.author);
            ui.end_row();
            ui.label("Blog URL");
            ui.text_edit_singleline(&mut self.remote.blog_url);
            ui.end_row();
        });

        ui.horizontal(|ui| {
            let label = if self.remote.save_pending { "Saving…" } else { "Save template" };
            let can_save = !self.remote.save_pending && !self.document.tags().is_empty();
            if ui.add_enabled(can_save, egui::Button::new(label)).clicked() {
                self.save_to_remote(ui.ctx());
            }
            if ui
                .add_enabled(!self.remote.list_pending, egui::Button::new("Refresh"))
                .clicked()
            {
                self.refresh_remote(ui.ctx());
            }
        });

        if self.remote.records.is_empty() {
            ui.weak("No saved templates loaded.");
            return;
        }

        let mut apply = None;
        for (index, record) in self.remote.records.iter().enumerate().rev() {
            ui.horizontal(|ui| {
                if ui.small_button("Apply").clicked() {
                    apply = Some(index);
                }
                let response = ui.label(&record.metadata.title);
                let mut hover = record.metadata.description.clone();
                if !record.metadata.author.is_empty() {
                    hover.push_str(&format!("\nby {}", record.metadata.author));
                }
                response.on_hover_text(hover);
            });
        }
        if let Some(index) = apply {
            self.apply_remote(index);
        }
    }
}
