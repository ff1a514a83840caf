//! Remote template gallery.
//!
//! A saved template is a record holding the `{tags, palette}` envelope, some metadata
//! and the public URL of a rendered preview image. Saving is a strict chain:
//! snapshot, then image upload, then record insert. A failing step stops the chain, so
//! a record never points at an image that was not uploaded.

use crate::constants::DEFAULT_TEMPLATE_NAME;
use crate::snapshot::{Rasterizer, Snapshot, SnapshotError};
use crate::store::now_millis;
use crate::template::{PaletteRef, Template, TemplateDocument, TemplateError};
use crate::types::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use uuid::Uuid;

/// Failure in one step of the remote chain.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The document could not be encoded, or a record could not be decoded
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// The preview image could not be rendered
    #[error("snapshot failed: {0}")]
    Snapshot(#[from] SnapshotError),
    /// The preview image could not be stored
    #[error("image upload failed: {0}")]
    Upload(String),
    /// The record could not be stored
    #[error("saving template failed: {0}")]
    Insert(String),
    /// The gallery could not be listed
    #[error("loading templates failed: {0}")]
    Select(String),
}

/// User-facing description of a saved template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateMetadata {
    /// Display title
    pub title: String,
    /// Free text description
    pub description: String,
    /// Author name
    pub author: String,
    /// Optional link to the author's post using the thumbnail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_url: Option<String>,
}

/// One row of the template collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    /// Record id, also used as the preview image name
    pub id: Uuid,
    /// Title, description and author
    #[serde(flatten)]
    pub metadata: TemplateMetadata,
    /// JSON-encoded tag list, as in [`Template::tags`]
    pub tags: String,
    /// Palette selection
    pub palette: PaletteRef,
    /// Public URL of the uploaded preview
    pub image_url: String,
    /// Creation time in milliseconds since the epoch
    #[serde(default)]
    pub created_at: i64,
}

impl TemplateRecord {
    /// The template envelope carried by this record.
    pub fn template(&self) -> Template {
        Template {
            tags: self.tags.clone(),
            palette: self.palette,
        }
    }
}

/// Record store plus blob store behind the gallery.
pub trait RemoteTemplateStore: Send + Sync {
    /// Stores the preview image under `file_name` and returns its public URL.
    fn upload_image(&self, file_name: &str, snapshot: &Snapshot) -> Result<String, RemoteError>;

    /// Adds a record to the template collection.
    fn insert(&self, record: TemplateRecord) -> Result<(), RemoteError>;

    /// Lists every record in the collection.
    fn select_all(&self) -> Result<Vec<TemplateRecord>, RemoteError>;
}

/// Title used when the user leaves it blank: the text tags joined by spaces.
pub fn derive_title(document: &Document) -> String {
    let summary = document.text_summary();
    if summary.trim().is_empty() {
        DEFAULT_TEMPLATE_NAME.to_string()
    } else {
        summary
    }
}

/// Saves `document` to `store`: snapshot, upload, insert.
///
/// # Returns
/// The inserted record. On error nothing after the failing step has run.
pub fn save_template(
    store: &dyn RemoteTemplateStore,
    rasterizer: &dyn Rasterizer,
    document: &Document,
    mut metadata: TemplateMetadata,
) -> Result<TemplateRecord, RemoteError> {
    let template = Template::from_document(&document.tags, document.palette)?;
    let snapshot = rasterizer.snapshot(document)?;

    let id = Uuid::new_v4();
    let file_name = format!("{id}.{}", snapshot.extension);
    let image_url = store.upload_image(&file_name, &snapshot)?;
    log::debug!("Uploaded template preview to {image_url}");

    if metadata.title.trim().is_empty() {
        metadata.title = derive_title(document);
    }
    let record = TemplateRecord {
        id,
        metadata,
        tags: template.tags,
        palette: template.palette,
        image_url,
        created_at: now_millis(),
    };
    store.insert(record.clone())?;
    log::info!("Saved template {} ({})", record.metadata.title, record.id);
    Ok(record)
}

/// Decodes the document a record describes.
pub fn decode_record(record: &TemplateRecord) -> Result<TemplateDocument, RemoteError> {
    Ok(record.template().decode()?)
}

#[derive(Debug, Default)]
struct MemoryInner {
    images: HashMap<String, Snapshot>,
    records: Vec<TemplateRecord>,
}

/// Process-local store. Used in tests and by builds without a configured backend.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    inner: Mutex<MemoryInner>,
}

impl InMemoryTemplateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with `records`.
    pub fn with_records(records: Vec<TemplateRecord>) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                images: HashMap::new(),
                records,
            }),
        }
    }

    /// Number of stored images.
    pub fn image_count(&self) -> usize {
        self.inner.lock().map(|inner| inner.images.len()).unwrap_or_default()
    }
}

impl RemoteTemplateStore for InMemoryTemplateStore {
    fn upload_image(&self, file_name: &str, snapshot: &Snapshot) -> Result<String, RemoteError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| RemoteError::Upload("store lock poisoned".to_string()))?;
        inner.images.insert(file_name.to_string(), snapshot.clone());
        Ok(format!("memory://images/{file_name}"))
    }

    fn insert(&self, record: TemplateRecord) -> Result<(), RemoteError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| RemoteError::Insert("store lock poisoned".to_string()))?;
        inner.records.push(record);
        Ok(())
    }

    fn select_all(&self) -> Result<Vec<TemplateRecord>, RemoteError> {
        let inner = self
            .inner
            .lock()
            .map_err(|_| RemoteError::Select("store lock poisoned".to_string()))?;
        Ok(inner.records.clone())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use directory::DirectoryTemplateStore;

#[cfg(not(target_arch = "wasm32"))]
mod directory {
    use super::*;
    use std::path::{Path, PathBuf};

    /// A local directory standing in for the hosted store: previews under `images/`,
    /// one JSON file per record under `records/`.
    #[derive(Debug, Clone)]
    pub struct DirectoryTemplateStore {
        root: PathBuf,
    }

    impl DirectoryTemplateStore {
        /// Opens the gallery directory inside the application's data directory.
        pub fn open(app_id: &str) -> Result<Self, RemoteError> {
            let root = eframe::storage_dir(app_id)
                .ok_or_else(|| RemoteError::Select("no data directory on this platform".to_string()))?
                .join("templates");
            Self::in_dir(root)
        }

        /// Uses `root` as the gallery directory, creating it when missing.
        pub fn in_dir(root: impl Into<PathBuf>) -> Result<Self, RemoteError> {
            let root = root.into();
            for dir in [root.join("images"), root.join("records")] {
                std::fs::create_dir_all(&dir)
                    .map_err(|e| RemoteError::Select(format!("{}: {e}", dir.display())))?;
            }
            Ok(Self { root })
        }

        /// Gallery directory.
        pub fn root(&self) -> &Path {
            &self.root
        }
    }

    impl RemoteTemplateStore for DirectoryTemplateStore {
        fn upload_image(&self, file_name: &str, snapshot: &Snapshot) -> Result<String, RemoteError> {
            let path = self.root.join("images").join(file_name);
            std::fs::write(&path, &snapshot.bytes)
                .map_err(|e| RemoteError::Upload(format!("{}: {e}", path.display())))?;
            Ok(format!("file://{}", path.display()))
        }

        fn insert(&self, record: TemplateRecord) -> Result<(), RemoteError> {
            let path = self.root.join("records").join(format!("{}.json", record.id));
            let json = serde_json::to_string_pretty(&record)
                .map_err(|e| RemoteError::Insert(e.to_string()))?;
            std::fs::write(&path, json)
                .map_err(|e| RemoteError::Insert(format!("{}: {e}", path.display())))
        }

        fn select_all(&self) -> Result<Vec<TemplateRecord>, RemoteError> {
            let dir = self.root.join("records");
            let entries = std::fs::read_dir(&dir)
                .map_err(|e| RemoteError::Select(format!("{}: {e}", dir.display())))?;

            let mut records = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                    continue;
                }
                let parsed = std::fs::read_to_string(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|json| serde_json::from_str::<TemplateRecord>(&json).map_err(|e| e.to_string()));
                match parsed {
                    Ok(record) => records.push(record),
                    Err(err) => log::warn!("Skipping unreadable template {}: {err}", path.display()),
                }
            }
            records.sort_by_key(|record| record.created_at);
            Ok(records)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::PaletteName;
    use crate::types::{Tag, TagShape, TagVariant};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedRasterizer;

    impl Rasterizer for FixedRasterizer {
        fn snapshot(&self, _document: &Document) -> Result<Snapshot, SnapshotError> {
            Ok(Snapshot {
                bytes: vec![1, 2, 3],
                mime: "image/png",
                extension: "png",
            })
        }
    }

    struct BrokenRasterizer;

    impl Rasterizer for BrokenRasterizer {
        fn snapshot(&self, _document: &Document) -> Result<Snapshot, SnapshotError> {
            Err(SnapshotError::Pixmap(0, 0))
        }
    }

    /// Store whose upload always fails; counts every call.
    #[derive(Default)]
    struct FailingUpload {
        uploads: AtomicUsize,
        inserts: AtomicUsize,
    }

    impl RemoteTemplateStore for FailingUpload {
        fn upload_image(&self, _file_name: &str, _snapshot: &Snapshot) -> Result<String, RemoteError> {
            self.uploads.fetch_add(1, Ordering::SeqCst);
            Err(RemoteError::Upload("bucket unavailable".to_string()))
        }

        fn insert(&self, _record: TemplateRecord) -> Result<(), RemoteError> {
            self.inserts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn select_all(&self) -> Result<Vec<TemplateRecord>, RemoteError> {
            Ok(Vec::new())
        }
    }

    fn document() -> Document {
        Document {
            tags: vec![
                Tag::text(1, "Rust", TagVariant::Filled, TagShape::Round),
                Tag::line_break(2),
                Tag::text(3, "tips", TagVariant::Ghost, TagShape::Squared),
            ],
            palette: PaletteName::BlueGradient,
            ..Default::default()
        }
    }

    #[test]
    fn save_uploads_then_inserts() {
        let store = InMemoryTemplateStore::new();
        let record = save_template(&store, &FixedRasterizer, &document(), TemplateMetadata::default()).unwrap();

        assert_eq!(store.image_count(), 1);
        assert_eq!(record.image_url, format!("memory://images/{}.png", record.id));
        assert_eq!(record.metadata.title, "Rust tips");
        assert_eq!(store.select_all().unwrap(), vec![record.clone()]);

        let decoded = decode_record(&record).unwrap();
        assert_eq!(decoded.tags, document().tags);
        assert_eq!(decoded.palette, PaletteName::BlueGradient);
    }

    #[test]
    fn failed_upload_creates_no_record() {
        let store = FailingUpload::default();
        let result = save_template(&store, &FixedRasterizer, &document(), TemplateMetadata::default());
        assert!(matches!(result, Err(RemoteError::Upload(_))));
        assert_eq!(store.uploads.load(Ordering::SeqCst), 1);
        assert_eq!(store.inserts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_snapshot_uploads_nothing() {
        let store = InMemoryTemplateStore::new();
        let result = save_template(&store, &BrokenRasterizer, &document(), TemplateMetadata::default());
        assert!(matches!(result, Err(RemoteError::Snapshot(_))));
        assert_eq!(store.image_count(), 0);
        assert!(store.select_all().unwrap().is_empty());
    }

    #[test]
    fn explicit_title_is_kept() {
        let store = InMemoryTemplateStore::new();
        let metadata = TemplateMetadata {
            title: "My post".to_string(),
            author: "dev".to_string(),
            ..Default::default()
        };
        let record = save_template(&store, &FixedRasterizer, &document(), metadata).unwrap();
        assert_eq!(record.metadata.title, "My post");
        assert_eq!(record.metadata.author, "dev");
    }

    #[test]
    fn derived_title_falls_back() {
        assert_eq!(derive_title(&Document::default()), "thumbnail");
    }

    #[test]
    fn record_wire_shape_is_flat_camel_case() {
        let store = InMemoryTemplateStore::new();
        let metadata = TemplateMetadata {
            blog_url: Some("https://blog.example/post".to_string()),
            ..Default::default()
        };
        let record = save_template(&store, &FixedRasterizer, &document(), metadata).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["blogUrl"], "https://blog.example/post");
        assert!(value["imageUrl"].is_string());
        assert!(value["tags"].is_string());
        assert_eq!(value["palette"]["type"], "blue_gradient");
    }

    #[test]
    fn malformed_record_does_not_decode() {
        let mut record = save_template(
            &InMemoryTemplateStore::new(),
            &FixedRasterizer,
            &document(),
            TemplateMetadata::default(),
        )
        .unwrap();
        record.tags = "not a tag list".to_string();
        assert!(matches!(
            decode_record(&record),
            Err(RemoteError::Template(TemplateError::Tags(_)))
        ));
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn directory_store_persists_records() {
        let root = std::env::temp_dir().join(format!("thumbnail-templates-{}", Uuid::new_v4()));
        let store = DirectoryTemplateStore::in_dir(&root).unwrap();
        let record = save_template(&store, &FixedRasterizer, &document(), TemplateMetadata::default()).unwrap();

        assert!(root.join("images").join(format!("{}.png", record.id)).exists());
        std::fs::write(root.join("records").join("broken.json"), "{").unwrap();

        let reopened = DirectoryTemplateStore::in_dir(&root).unwrap();
        assert_eq!(reopened.select_all().unwrap(), vec![record]);
        let _ = std::fs::remove_dir_all(root);
    }
}
