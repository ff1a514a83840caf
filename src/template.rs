//! Template envelope: the portable JSON form of a tag list plus palette selection.
//!
//! The envelope keeps the tag list as a JSON-encoded string and the palette as
//! `{"type": <name>}`:
//!
//! ```json
//! { "tags": "[{\"id\":1,...}]", "palette": { "type": "blue_gradient" } }
//! ```
//!
//! Only the palette's name is stored, never its resolved style.

use crate::constants::DEFAULT_TEMPLATE_NAME;
use crate::palette::PaletteName;
use crate::types::Tag;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to encode or decode a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The envelope itself is not valid JSON of the expected shape
    #[error("invalid template: {0}")]
    Envelope(#[source] serde_json::Error),
    /// The embedded `tags` string is not a valid tag list
    #[error("invalid tag list in template: {0}")]
    Tags(#[source] serde_json::Error),
}

/// Palette selection as stored in templates and local storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteRef {
    /// Palette name
    #[serde(rename = "type")]
    pub kind: PaletteName,
}

impl From<PaletteName> for PaletteRef {
    fn from(kind: PaletteName) -> Self {
        Self { kind }
    }
}

/// Decoded template content: what applying a template installs.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDocument {
    /// Replacement tag list
    pub tags: Vec<Tag>,
    /// Replacement palette
    pub palette: PaletteName,
}

/// The serialization envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// JSON-encoded `Tag[]`
    pub tags: String,
    /// Palette selection
    pub palette: PaletteRef,
}

impl Template {
    /// Builds the envelope for a tag list and palette.
    pub fn from_document(tags: &[Tag], palette: PaletteName) -> Result<Self, TemplateError> {
        let tags = serde_json::to_string(tags).map_err(TemplateError::Tags)?;
        Ok(Self {
            tags,
            palette: palette.into(),
        })
    }

    /// Serializes the envelope as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, TemplateError> {
        serde_json::to_string_pretty(self).map_err(TemplateError::Envelope)
    }

    /// Parses an envelope from JSON.
    pub fn from_json(json: &str) -> Result<Self, TemplateError> {
        serde_json::from_str(json).map_err(TemplateError::Envelope)
    }

    /// Decodes the embedded tag list.
    pub fn decode(&self) -> Result<TemplateDocument, TemplateError> {
        let tags: Vec<Tag> = serde_json::from_str(&self.tags).map_err(TemplateError::Tags)?;
        Ok(TemplateDocument {
            tags,
            palette: self.palette.kind,
        })
    }
}

/// Parses a template file's content into the document it describes.
pub fn parse_template_file(json: &str) -> Result<TemplateDocument, TemplateError> {
    Template::from_json(json)?.decode()
}

fn is_hangul_syllable(c: char) -> bool {
    ('\u{AC00}'..='\u{D7A3}').contains(&c)
}

/// File stem derived from the text tags: their concatenation with everything but ASCII
/// letters, digits and Hangul syllables removed.
pub fn export_title(tags: &[Tag]) -> String {
    let title: String = tags
        .iter()
        .filter_map(|tag| tag.content.as_text())
        .flat_map(str::chars)
        .filter(|c| c.is_ascii_alphanumeric() || is_hangul_syllable(*c))
        .collect();
    if title.is_empty() {
        DEFAULT_TEMPLATE_NAME.to_string()
    } else {
        title
    }
}

/// Download file name for exporting `tags`.
pub fn export_file_name(tags: &[Tag]) -> String {
    format!("{}.json", export_title(tags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emoji::EmojiCatalog;
    use crate::types::{TagPosition, TagShape, TagVariant};

    fn text(id: i64, value: &str) -> Tag {
        Tag::text(id, value, TagVariant::Filled, TagShape::Round)
    }

    #[test]
    fn imports_the_reference_file() {
        let json = r#"{
            "tags": "[{\"id\":1,\"content\":{\"type\":\"text\",\"value\":\"tag1\"},\"tagVariant\":\"filled\",\"tagShape\":\"round\"}]",
            "palette": {"type": "blue_gradient"}
        }"#;
        let doc = parse_template_file(json).unwrap();
        assert_eq!(doc.tags.len(), 1);
        assert_eq!(doc.tags[0].content.as_text(), Some("tag1"));
        assert_eq!(doc.palette, PaletteName::BlueGradient);
    }

    #[test]
    fn tags_are_embedded_as_a_string() {
        let template = Template::from_document(&[text(1, "a")], PaletteName::Cream).unwrap();
        let value: serde_json::Value = serde_json::from_str(&template.to_json().unwrap()).unwrap();
        assert!(value["tags"].is_string());
        assert_eq!(value["palette"]["type"], "cream");
    }

    #[test]
    fn round_trips_text_and_emoji_over_every_palette() {
        let catalog = EmojiCatalog::builtin();
        let mut moved = text(3, "세 번째");
        moved.position = Some(TagPosition::new(12.5, 33.0));
        let tags = vec![
            text(1, "hello"),
            Tag::emoji(2, catalog.get("fire").unwrap().clone()),
            moved,
            Tag::text(4, "ghost", TagVariant::Ghost, TagShape::Squared),
        ];
        for palette in PaletteName::ALL {
            let json = Template::from_document(&tags, palette)
                .unwrap()
                .to_json()
                .unwrap();
            let doc = parse_template_file(&json).unwrap();
            assert_eq!(doc, TemplateDocument { tags: tags.clone(), palette });
        }
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(parse_template_file("not json"), Err(TemplateError::Envelope(_))));
        assert!(matches!(
            parse_template_file(r#"{"tags": "[{]", "palette": {"type": "white"}}"#),
            Err(TemplateError::Tags(_))
        ));
        assert!(matches!(
            parse_template_file(r#"{"tags": "[]", "palette": {"type": "neon"}}"#),
            Err(TemplateError::Envelope(_))
        ));
    }

    #[test]
    fn file_name_keeps_alphanumerics_and_hangul() {
        let tags = vec![text(1, "Rust 101!"), Tag::line_break(2), text(3, "초보 가이드?")];
        assert_eq!(export_file_name(&tags), "Rust101초보가이드.json");
    }

    #[test]
    fn file_name_falls_back_when_empty() {
        assert_eq!(export_file_name(&[]), "thumbnail.json");
        assert_eq!(export_file_name(&[text(1, "!!! ???")]), "thumbnail.json");
    }
}
