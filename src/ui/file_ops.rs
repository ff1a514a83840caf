//! Template export and import.
//!
//! This module handles the file side of templates: native file dialogs on a tokio task,
//! browser downloads and file pickers on the web. Results come back over the
//! [`FileOperationResult`] channel and are applied on the UI thread.

use super::state::{FileOperationResult, PendingFileOperation, ThumbnailApp};
use crate::template::{export_file_name, parse_template_file};
use eframe::egui;

#[cfg(target_arch = "wasm32")]
const TEMPLATE_MIME: &str = "application/json";
#[cfg(target_arch = "wasm32")]
const TEMPLATE_ACCEPT: &str = ".json,application/json";

impl ThumbnailApp {
    /// Handles pending file operations for both native and WASM platforms.
    ///
    /// This method processes completed async file operations and initiates new ones.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The egui context for requesting repaints
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.file.receiver.try_recv() {
            match result {
                FileOperationResult::ExportCompleted(path) => {
                    log::info!("Template exported to {path}");
                    self.show_notice(format!("Exported {path}"));
                }
                FileOperationResult::ImportCompleted(path, content) => {
                    self.import_template(&path, &content);
                }
                FileOperationResult::OperationFailed(error) => {
                    log::error!("File operation failed: {error}");
                    self.show_notice(error);
                }
            }
        }

        match self.file.pending.take() {
            Some(PendingFileOperation::Export) => self.start_export(ctx),
            Some(PendingFileOperation::Import) => self.start_import(ctx),
            None => {}
        }
    }

    /// Applies the content of an imported template file. A malformed file leaves the
    /// document untouched.
    pub fn import_template(&mut self, path: &str, content: &str) {
        match parse_template_file(content) {
            Ok(template) => {
                log::info!("Imported template from {path}");
                self.apply_template_document(template);
            }
            Err(err) => {
                log::warn!("Rejected template {path}: {err}");
                self.show_notice(format!("Could not import {path}: {err}"));
            }
        }
    }

    /// Serializes the current document as a template file body.
    pub fn export_contents(&self) -> Result<(String, String), String> {
        let json = self
            .document
            .to_template()
            .and_then(|template| template.to_json())
            .map_err(|e| format!("Failed to encode template: {e}"))?;
        Ok((export_file_name(self.document.tags()), json))
    }

    fn start_export(&mut self, ctx: &egui::Context) {
        let (file_name, json) = match self.export_contents() {
            Ok(contents) => contents,
            Err(err) => {
                let _ = self.file.sender.send(FileOperationResult::OperationFailed(err));
                return;
            }
        };
        let sender = self.file.sender.clone();
        let ctx = ctx.clone();

        #[cfg(target_arch = "wasm32")]
        {
            let result = match web_files::download_text(&file_name, TEMPLATE_MIME, &json) {
                Ok(()) => FileOperationResult::ExportCompleted(file_name),
                Err(e) => FileOperationResult::OperationFailed(e),
            };
            let _ = sender.send(result);
            ctx.request_repaint();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            tokio::spawn(async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("JSON", &["json"])
                    .set_file_name(&file_name)
                    .save_file()
                    .await
                {
                    let path = handle.path();
                    let result = match std::fs::write(path, json) {
                        Ok(_) => FileOperationResult::ExportCompleted(path.display().to_string()),
                        Err(e) => FileOperationResult::OperationFailed(format!("Failed to save file: {e}")),
                    };
                    let _ = sender.send(result);
                }
                ctx.request_repaint();
            });
        }
    }

    fn start_import(&mut self, ctx: &egui::Context) {
        let sender = self.file.sender.clone();
        let ctx = ctx.clone();

        #[cfg(target_arch = "wasm32")]
        {
            wasm_bindgen_futures::spawn_local(async move {
                match web_files::pick_text_file(TEMPLATE_ACCEPT).await {
                    Some((name, Ok(content))) => {
                        let _ = sender.send(FileOperationResult::ImportCompleted(name, content));
                    }
                    Some((name, Err(e))) => {
                        let _ = sender.send(FileOperationResult::OperationFailed(format!("{name}: {e}")));
                    }
                    None => {
                        log::debug!("Open dialog cancelled or API not supported");
                    }
                }
                ctx.request_repaint();
            });
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            tokio::spawn(async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("JSON", &["json"])
                    .pick_file()
                    .await
                {
                    let path = handle.path();
                    let result = match std::fs::read_to_string(path) {
                        Ok(json) => FileOperationResult::ImportCompleted(path.display().to_string(), json),
                        Err(e) => FileOperationResult::OperationFailed(format!("Failed to read file: {e}")),
                    };
                    let _ = sender.send(result);
                }
                ctx.request_repaint();
            });
        }
    }
}

/// Browser file access: text downloads through a blob URL and text uploads through a
/// hidden file input.
#[cfg(target_arch = "wasm32")]
mod web_files {
    use eframe::wasm_bindgen::closure::Closure;
    use eframe::wasm_bindgen::{JsCast, JsValue};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn js_error(what: &str) -> impl Fn(JsValue) -> String + '_ {
        move |err| format!("{what}: {err:?}")
    }

    /// Offers `content` to the user as a download named `file_name`.
    pub fn download_text(file_name: &str, mime: &str, content: &str) -> Result<(), String> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or("no document to download from")?;
        let body = document.body().ok_or("document has no body")?;

        let parts = js_sys::Array::of1(&JsValue::from_str(content));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(mime);
        let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)
            .map_err(js_error("creating blob"))?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_error("creating URL"))?;

        let link: web_sys::HtmlAnchorElement = document
            .create_element("a")
            .map_err(js_error("creating link"))?
            .unchecked_into();
        link.set_href(&url);
        link.set_download(file_name);
        body.append_child(&link).map_err(js_error("attaching link"))?;
        link.click();
        let _ = body.remove_child(&link);
        web_sys::Url::revoke_object_url(&url).map_err(js_error("revoking URL"))
    }

    /// Lets the user pick one file matching `accept` and reads it as text.
    ///
    /// Returns `None` when nothing was picked; otherwise the file name and its content.
    pub async fn pick_text_file(accept: &str) -> Option<(String, Result<String, String>)> {
        let document = web_sys::window()?.document()?;
        let body = document.body()?;
        let input: web_sys::HtmlInputElement = document.create_element("input").ok()?.unchecked_into();
        input.set_type("file");
        input.set_accept(accept);
        input.style().set_property("display", "none").ok()?;

        let (sender, receiver) = futures::channel::oneshot::channel();
        let sender = Rc::new(RefCell::new(Some(sender)));
        let picked = input.clone();
        let on_change = Closure::<dyn FnMut()>::new(move || {
            let file = picked.files().and_then(|files| files.get(0));
            if let Some(sender) = sender.borrow_mut().take() {
                let _ = sender.send(file);
            }
        });
        input.set_onchange(Some(on_change.as_ref().unchecked_ref()));

        body.append_child(&input).ok()?;
        input.click();
        let file = receiver.await.ok().flatten();
        let _ = body.remove_child(&input);
        drop(on_change);

        let file = file?;
        let content = wasm_bindgen_futures::JsFuture::from(file.text())
            .await
            .map_err(js_error("reading file"))
            .and_then(|text| text.as_string().ok_or_else(|| "file is not text".to_string()));
        Some((file.name(), content))
    }
}
