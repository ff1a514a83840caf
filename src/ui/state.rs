//! Application state management structures.
//!
//! This module contains the state structures behind the editor: persisted editor
//! settings, transient interaction state, pending file operations, the remote gallery
//! and the main [`ThumbnailApp`].

use crate::document::DocumentState;
use crate::emoji::EmojiCatalog;
use crate::layout::FreeDrag;
use crate::overflow::OverflowGuard;
use crate::recommend::{KeywordRecommender, RecommendStyle, Recommendation, Recommender};
use crate::remote::{RemoteTemplateStore, TemplateMetadata, TemplateRecord};
use crate::snapshot::{Rasterizer, SvgRasterizer};
use crate::storage::SharedStorage;
use crate::store::ShuffleRng;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Editor preferences persisted through `eframe::Storage`.
///
/// The document itself is not part of this; it lives in the key-value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Remembered width of the side panel across sessions
    pub side_panel_width: f32,
    /// Style requested from the recommender
    pub recommend_style: RecommendStyle,
    /// Author name attached to remote saves
    pub author: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            side_panel_width: 300.0,
            recommend_style: RecommendStyle::default(),
            author: String::new(),
        }
    }
}

impl EditorSettings {
    /// Serializes the settings to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// State related to user interactions with tags and the side panel inputs.
#[derive(Debug, Default)]
pub struct InteractionState {
    /// Currently selected tag, if any
    pub selected: Option<TagId>,
    /// Text typed into the "add tags" field
    pub new_tag_text: String,
    /// Style given to newly added text tags
    pub new_tag_variant: TagVariant,
    /// Shape given to newly added text tags
    pub new_tag_shape: TagShape,
    /// Filter for the emoji picker
    pub emoji_query: String,
    /// Text being edited for the selected tag
    pub edit_text: String,
    /// Tag whose text is loaded into `edit_text`
    pub edit_for: Option<TagId>,
    /// Content the recommender is asked about
    pub recommend_input: String,
    /// Last recommendation result
    pub recommendation: Option<Recommendation>,
    /// Active free-form drag
    pub free_drag: Option<FreeDrag>,
    /// Tag picked up by a sortable drag
    pub reorder_drag: Option<TagId>,
}

/// Represents a pending file operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingFileOperation {
    /// Write the current template to a file (file picker or browser download)
    Export,
    /// Read a template from a file
    Import,
}

/// Messages sent from async file operations back to the main app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// Export completed with the given path or file name
    ExportCompleted(String),
    /// Import read the file; path and content
    ImportCompleted(String, String),
    /// Operation failed with an error message
    OperationFailed(String),
}

/// State related to file operations.
pub struct FileState {
    /// Operation requested from the UI and not started yet
    pub pending: Option<PendingFileOperation>,
    /// Channel for receiving file operation results from async contexts
    pub sender: Sender<FileOperationResult>,
    /// Receiving end polled once per frame
    pub receiver: Receiver<FileOperationResult>,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            pending: None,
            sender,
            receiver,
        }
    }
}

/// Messages sent from remote gallery jobs back to the main app.
#[derive(Debug)]
pub enum RemoteResult {
    /// A template was saved
    Saved(TemplateRecord),
    /// The gallery listing arrived
    Listed(Vec<TemplateRecord>),
    /// A save failed
    SaveFailed(String),
    /// The listing failed
    ListFailed(String),
}

/// State of the remote template gallery.
pub struct RemoteState {
    /// Record and image store
    pub store: Arc<dyn RemoteTemplateStore>,
    /// Renders the preview uploaded with each save
    pub rasterizer: Arc<dyn Rasterizer>,
    /// Metadata typed into the save form
    pub metadata: TemplateMetadata,
    /// Blog URL as typed; empty means none
    pub blog_url: String,
    /// Whether a save is in flight; the save button is disabled meanwhile
    pub save_pending: bool,
    /// Whether a listing is in flight
    pub list_pending: bool,
    /// Last fetched records
    pub records: Vec<TemplateRecord>,
    /// Channel for job results
    pub sender: Sender<RemoteResult>,
    /// Receiving end polled once per frame
    pub receiver: Receiver<RemoteResult>,
}

impl RemoteState {
    /// Creates the gallery state around `store`.
    pub fn new(store: Arc<dyn RemoteTemplateStore>) -> Self {
        let (sender, receiver) = channel();
        Self {
            store,
            rasterizer: Arc::new(SvgRasterizer::default()),
            metadata: TemplateMetadata::default(),
            blog_url: String::new(),
            save_pending: false,
            list_pending: false,
            records: Vec::new(),
            sender,
            receiver,
        }
    }
}

/// A transient message shown over the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    /// Message text
    pub text: String,
    /// Time (egui input time, seconds) after which the notice disappears
    pub expires_at: f64,
}

/// The main application structure: document, collaborators and UI state.
///
/// This struct implements the `eframe::App` trait and handles all user interface
/// rendering and interaction logic.
pub struct ThumbnailApp {
    /// The document being edited
    pub document: DocumentState,
    /// Emoji stickers offered by the picker
    pub catalog: EmojiCatalog,
    /// Tag recommendation source
    pub recommender: Box<dyn Recommender>,
    /// Persisted editor preferences
    pub settings: EditorSettings,
    /// User interaction state
    pub interaction: InteractionState,
    /// File operations state
    pub file: FileState,
    /// Remote gallery state
    pub remote: RemoteState,
    /// Currently shown notice
    pub notice: Option<Notice>,
    /// Frame counter; mutations arm the overflow guard with it
    pub frame_counter: u64,
    /// Input time of the current frame in seconds
    pub now: f64,
    /// Pending overflow check
    pub overflow: OverflowGuard,
    /// Source of randomness for shuffling styles
    pub rng: ShuffleRng,
}

impl ThumbnailApp {
    /// Creates the app around a document store, saved settings and a template gallery.
    pub fn new(
        storage: SharedStorage,
        settings: EditorSettings,
        remote: Arc<dyn RemoteTemplateStore>,
    ) -> Self {
        let catalog = EmojiCatalog::builtin();
        Self {
            document: DocumentState::new(storage),
            recommender: Box::new(KeywordRecommender::new(catalog.clone())),
            catalog,
            settings,
            interaction: InteractionState::default(),
            file: FileState::default(),
            remote: RemoteState::new(remote),
            notice: None,
            frame_counter: 0,
            now: 0.0,
            overflow: OverflowGuard::new(),
            rng: ShuffleRng::from_entropy(),
        }
    }
}
