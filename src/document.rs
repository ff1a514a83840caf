//! The active document: tag store plus palette, presets and layout mode.
//!
//! Each field group lives under its own storage key and is written whenever it changes.
//! Resetting the tag list leaves palette and presets alone.

use crate::layout::{flow_items, flow_layout, FlowLayout};
use crate::palette::PaletteName;
use crate::presets::{CanvasSizePreset, CanvasSpec, TagSizePreset};
use crate::storage::*;
use crate::store::TagStore;
use crate::template::{PaletteRef, Template, TemplateDocument, TemplateError};
use crate::types::*;

/// Editable document backed by a key-value store.
pub struct DocumentState {
    store: TagStore,
    palette: PaletteName,
    canvas_size: CanvasSizePreset,
    tag_size: TagSizePreset,
    layout_mode: LayoutMode,
    storage: SharedStorage,
}

impl DocumentState {
    /// Loads every field group from `storage`, using defaults for missing or malformed
    /// values.
    pub fn new(storage: SharedStorage) -> Self {
        let palette: PaletteRef = load_or(&*storage, PALETTE_KEY, PaletteName::default().into());
        Self {
            store: TagStore::new(storage.clone()),
            palette: palette.kind,
            canvas_size: load_or(&*storage, CANVAS_SIZE_KEY, CanvasSizePreset::default()),
            tag_size: load_or(&*storage, TAG_SIZE_KEY, TagSizePreset::default()),
            layout_mode: load_or(&*storage, LAYOUT_MODE_KEY, LayoutMode::default()),
            storage,
        }
    }

    /// The tag store.
    pub fn store(&self) -> &TagStore {
        &self.store
    }

    /// Mutable access to the tag store.
    pub fn store_mut(&mut self) -> &mut TagStore {
        &mut self.store
    }

    /// Current tag list.
    pub fn tags(&self) -> &[Tag] {
        self.store.tags()
    }

    /// Selected palette.
    pub fn palette(&self) -> PaletteName {
        self.palette
    }

    /// Selected canvas preset.
    pub fn canvas_size(&self) -> CanvasSizePreset {
        self.canvas_size
    }

    /// Selected tag size preset.
    pub fn tag_size(&self) -> TagSizePreset {
        self.tag_size
    }

    /// Current placement policy.
    pub fn layout_mode(&self) -> LayoutMode {
        self.layout_mode
    }

    /// Selects a palette by name.
    pub fn set_palette(&mut self, palette: PaletteName) {
        self.palette = palette;
        save_json(&*self.storage, PALETTE_KEY, &PaletteRef::from(palette));
    }

    /// Selects the canvas preset.
    pub fn set_canvas_size(&mut self, preset: CanvasSizePreset) {
        self.canvas_size = preset;
        save_json(&*self.storage, CANVAS_SIZE_KEY, &preset);
    }

    /// Selects the tag size preset.
    pub fn set_tag_size(&mut self, preset: TagSizePreset) {
        self.tag_size = preset;
        save_json(&*self.storage, TAG_SIZE_KEY, &preset);
    }

    /// Switches the placement policy.
    ///
    /// Entering free-form mode gives positionless tags a cascading start position.
    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if mode == LayoutMode::FreeForm && self.layout_mode != LayoutMode::FreeForm {
            self.store.assign_missing_positions();
        }
        self.layout_mode = mode;
        save_json(&*self.storage, LAYOUT_MODE_KEY, &mode);
    }

    /// Replaces tag list and palette together. The previous list stays available for
    /// rollback.
    pub fn apply_template(&mut self, template: TemplateDocument) {
        log::info!(
            "Applying template with {} tags, palette {:?}",
            template.tags.len(),
            template.palette
        );
        self.store.replace_all(template.tags);
        self.set_palette(template.palette);
    }

    /// The template envelope for the current tags and palette.
    pub fn to_template(&self) -> Result<Template, TemplateError> {
        Template::from_document(self.store.tags(), self.palette)
    }

    /// Geometry of the selected canvas preset.
    pub fn canvas(&self) -> CanvasSpec {
        self.canvas_size.spec()
    }

    /// Flow layout of the current list inside the canvas content box, with text widths
    /// from `measure` (called with the text at the preset font size).
    pub fn flow(&self, measure: impl FnMut(&str) -> f32) -> FlowLayout {
        let canvas = self.canvas();
        let palette = self.palette.palette();
        let items = flow_items(self.store.tags(), &palette, &self.tag_size.metrics(), measure);
        flow_layout(&items, canvas.content_size().x, canvas.gap)
    }

    /// Value copy of the whole document.
    pub fn snapshot(&self) -> Document {
        Document {
            tags: self.store.tags().to_vec(),
            palette: self.palette,
            canvas_size: self.canvas_size,
            tag_size: self.tag_size,
            layout_mode: self.layout_mode,
        }
    }
}
