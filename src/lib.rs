//! # Thumbnail Editor
//!
//! An editor for blog and video thumbnails built from tags: short text chips, 3D emoji
//! stickers and line breaks, laid out on a fixed-ratio canvas over a palette background.
//!
//! ## Features
//! - Tag list with one-level rollback, persisted to local storage on every change
//! - Three placement policies: flowing rows, sortable rows and free-form positions
//! - Overflow detection that vetoes mutations which no longer fit the canvas
//! - Template files and a remote gallery sharing the `{tags, palette}` envelope
//! - Palettes, canvas and tag size presets, built-in templates
//! - Keyword-based tag recommendations

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod document;
pub mod emoji;
pub mod gallery;
pub mod layout;
pub mod overflow;
pub mod palette;
pub mod presets;
pub mod recommend;
pub mod remote;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod template;
pub mod types;
mod ui;

// Re-export public types and functions
pub use types::*;
pub use ui::{EditorSettings, ThumbnailApp};

#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;

/// Builds the editor for a native window, restoring saved settings from `cc`.
#[cfg(not(target_arch = "wasm32"))]
fn create_app(cc: &eframe::CreationContext<'_>) -> ThumbnailApp {
    let settings = cc
        .storage
        .and_then(|storage| storage.get_string("app_state"))
        .and_then(|json| match EditorSettings::from_json(&json) {
            Ok(settings) => Some(settings),
            Err(err) => {
                log::warn!("Ignoring saved editor settings: {err}");
                None
            }
        })
        .unwrap_or_default();

    let remote: Arc<dyn remote::RemoteTemplateStore> =
        match remote::DirectoryTemplateStore::open(constants::APP_ID) {
            Ok(store) => {
                log::info!("Template gallery at {}", store.root().display());
                Arc::new(store)
            }
            Err(err) => {
                log::warn!("Template gallery unavailable, saves stay in memory: {err}");
                Arc::new(remote::InMemoryTemplateStore::new())
            }
        };

    ThumbnailApp::new(storage::open_default(constants::APP_ID), settings, remote)
}

/// Runs the thumbnail editor with default window options.
///
/// This function initializes the egui application window and starts the main event loop.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an `eframe::Error` if
/// initialization fails.
///
/// # Example
///
/// ```no_run
/// use thumbnail_editor::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title(constants::APP_ID)
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        constants::APP_ID,
        options,
        Box::new(|cc| Ok(Box::new(create_app(cc)))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_default_document() {
        let document = Document::default();
        assert!(document.tags.is_empty());
        assert_eq!(document.layout_mode, LayoutMode::Flow);
        assert_eq!(document.text_summary(), "");
    }

    #[test]
    fn test_app_starts_empty() {
        let app = ThumbnailApp::new(
            MemoryStore::shared(),
            EditorSettings::default(),
            std::sync::Arc::new(remote::InMemoryTemplateStore::new()),
        );
        assert!(app.document.tags().is_empty());
        assert!(app.notice.is_none());
        assert!(!app.overflow.is_armed());
    }
}
