//! Tag recommendations for a piece of content (a post title, a paragraph).
//!
//! The hosted recommender is a collaborator behind [`Recommender`]; its response is the
//! JSON shape
//!
//! ```json
//! { "titles": [ { "tags": [ { "text": "Rust", "type": "text" } ] } ], "language": "en" }
//! ```
//!
//! [`KeywordRecommender`] builds the same shape locally from the content's keywords and
//! is what the editor falls back to.

use crate::emoji::EmojiCatalog;
use crate::types::TagContent;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_TITLES: usize = 3;
const TAGS_PER_TITLE: usize = 4;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "how", "in", "into", "is", "it", "its",
    "of", "on", "or", "that", "the", "this", "to", "was", "what", "when", "why", "with", "you", "your",
];

/// Failure to produce recommendations.
#[derive(Debug, Error)]
pub enum RecommendError {
    /// Nothing to recommend from
    #[error("no content to recommend tags for")]
    EmptyContent,
    /// The collaborator could not be reached or refused
    #[error("recommendation service unavailable: {0}")]
    Unavailable(String),
    /// The collaborator answered with something that is not a recommendation
    #[error("malformed recommendation: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Flavour of the requested recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendStyle {
    /// Text tags only
    #[default]
    Plain,
    /// Text tags led by matching emoji stickers
    WithEmoji,
}

impl RecommendStyle {
    /// Every style, in display order.
    pub const ALL: [RecommendStyle; 2] = [RecommendStyle::Plain, RecommendStyle::WithEmoji];

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            RecommendStyle::Plain => "Text only",
            RecommendStyle::WithEmoji => "With emoji",
        }
    }
}

/// Kind of a suggested tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// Plain text chip
    Text,
    /// Emoji sticker, `text` names it
    Emoji,
    /// Anything newer than this client; treated as text
    #[serde(other)]
    Unknown,
}

/// One suggested tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSuggestion {
    /// Tag text, or emoji keyword for emoji suggestions
    pub text: String,
    /// Suggestion kind
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}

impl TagSuggestion {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: SuggestionKind::Text,
        }
    }
}

/// One suggested title: a batch of tags added together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TitleSuggestion {
    /// Tags in display order
    pub tags: Vec<TagSuggestion>,
}

impl TitleSuggestion {
    /// Text of the suggestion for list display.
    pub fn preview(&self) -> String {
        self.tags
            .iter()
            .map(|tag| tag.text.as_str())
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

/// A recommender response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Recommendation {
    /// Candidate titles, best first
    #[serde(default)]
    pub titles: Vec<TitleSuggestion>,
    /// Detected language code
    #[serde(default)]
    pub language: String,
}

impl Recommendation {
    /// Parses a collaborator response.
    pub fn from_json(json: &str) -> Result<Self, RecommendError> {
        serde_json::from_str(json).map_err(RecommendError::Malformed)
    }
}

/// Source of tag recommendations.
pub trait Recommender {
    /// Recommends titles for `content`.
    fn recommend(&self, content: &str, style: RecommendStyle) -> Result<Recommendation, RecommendError>;
}

/// Turns a suggested title into tag contents, resolving emoji suggestions through
/// `catalog`. Emoji suggestions the catalog does not know are dropped.
pub fn suggestion_contents(title: &TitleSuggestion, catalog: &EmojiCatalog) -> Vec<TagContent> {
    title
        .tags
        .iter()
        .filter_map(|tag| match tag.kind {
            SuggestionKind::Emoji => {
                let found = catalog.find_keyword(&tag.text).or_else(|| catalog.get(&tag.text));
                if found.is_none() {
                    log::debug!("No sticker for suggested emoji {:?}", tag.text);
                }
                found.map(|emoji| TagContent::Emoji(emoji.clone()))
            }
            SuggestionKind::Text | SuggestionKind::Unknown => {
                let text = tag.text.trim();
                (!text.is_empty()).then(|| TagContent::Text(text.to_string()))
            }
        })
        .collect()
}

/// `"ko"` when the content contains Hangul syllables, `"en"` otherwise.
pub fn detect_language(content: &str) -> &'static str {
    if content.chars().any(|c| ('\u{AC00}'..='\u{D7A3}').contains(&c)) {
        "ko"
    } else {
        "en"
    }
}

/// Distinct keywords of `content` in order of appearance.
pub fn extract_keywords(content: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    content
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() >= 2)
        .filter(|word| !STOPWORDS.contains(&word.to_lowercase().as_str()))
        .filter(|word| seen.insert(word.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Local recommender built on keyword extraction.
#[derive(Debug, Clone)]
pub struct KeywordRecommender {
    catalog: EmojiCatalog,
}

impl KeywordRecommender {
    /// Creates a recommender resolving emoji through `catalog`.
    pub fn new(catalog: EmojiCatalog) -> Self {
        Self { catalog }
    }
}

impl Recommender for KeywordRecommender {
    fn recommend(&self, content: &str, style: RecommendStyle) -> Result<Recommendation, RecommendError> {
        let keywords = extract_keywords(content);
        if keywords.is_empty() {
            return Err(RecommendError::EmptyContent);
        }

        let titles = keywords
            .chunks(TAGS_PER_TITLE)
            .take(MAX_TITLES)
            .map(|chunk| {
                let mut tags = Vec::with_capacity(chunk.len() + 1);
                if style == RecommendStyle::WithEmoji {
                    if let Some(emoji) = chunk.iter().find_map(|word| self.catalog.find_keyword(word)) {
                        tags.push(TagSuggestion {
                            text: emoji.cldr.clone(),
                            kind: SuggestionKind::Emoji,
                        });
                    }
                }
                tags.extend(chunk.iter().map(TagSuggestion::text));
                TitleSuggestion { tags }
            })
            .collect();

        Ok(Recommendation {
            titles,
            language: detect_language(content).to_string(),
        })
    }
}

/// Asks `primary` first and `fallback` when it fails.
pub struct FallbackRecommender {
    primary: Box<dyn Recommender>,
    fallback: Box<dyn Recommender>,
}

impl FallbackRecommender {
    /// Chains two recommenders.
    pub fn new(primary: Box<dyn Recommender>, fallback: Box<dyn Recommender>) -> Self {
        Self { primary, fallback }
    }
}

impl Recommender for FallbackRecommender {
    fn recommend(&self, content: &str, style: RecommendStyle) -> Result<Recommendation, RecommendError> {
        match self.primary.recommend(content, style) {
            Ok(recommendation) => Ok(recommendation),
            Err(RecommendError::EmptyContent) => Err(RecommendError::EmptyContent),
            Err(err) => {
                log::warn!("Recommendation failed, using keyword fallback: {err}");
                self.fallback.recommend(content, style)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl Recommender for Offline {
        fn recommend(&self, _content: &str, _style: RecommendStyle) -> Result<Recommendation, RecommendError> {
            Err(RecommendError::Unavailable("offline".to_string()))
        }
    }

    fn keyword() -> KeywordRecommender {
        KeywordRecommender::new(EmojiCatalog::builtin())
    }

    #[test]
    fn parses_the_collaborator_shape() {
        let json = r#"{"titles":[{"tags":[{"text":"Rust","type":"text"},{"text":"rocket","type":"emoji"},{"text":"x","type":"sticker"}]}],"language":"en"}"#;
        let rec = Recommendation::from_json(json).unwrap();
        assert_eq!(rec.language, "en");
        assert_eq!(rec.titles[0].tags[1].kind, SuggestionKind::Emoji);
        assert_eq!(rec.titles[0].tags[2].kind, SuggestionKind::Unknown);
        assert!(matches!(Recommendation::from_json("\"oops\""), Err(RecommendError::Malformed(_))));
    }

    #[test]
    fn contents_resolve_emoji_through_catalog() {
        let title = TitleSuggestion {
            tags: vec![
                TagSuggestion::text("Rust"),
                TagSuggestion {
                    text: "launch".to_string(),
                    kind: SuggestionKind::Emoji,
                },
                TagSuggestion {
                    text: "unicorn".to_string(),
                    kind: SuggestionKind::Emoji,
                },
                TagSuggestion::text("  "),
            ],
        };
        let contents = suggestion_contents(&title, &EmojiCatalog::builtin());
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].as_text(), Some("Rust"));
        assert!(matches!(&contents[1], TagContent::Emoji(e) if e.cldr == "rocket"));
    }

    #[test]
    fn keywords_skip_stopwords_and_duplicates() {
        assert_eq!(
            extract_keywords("How to write the fastest Rust code, rust CODE!"),
            vec!["write", "fastest", "Rust", "code"]
        );
    }

    #[test]
    fn keyword_recommender_chunks_titles() {
        let rec = keyword()
            .recommend("alpha beta gamma delta epsilon zeta", RecommendStyle::Plain)
            .unwrap();
        assert_eq!(rec.titles.len(), 2);
        assert_eq!(rec.titles[0].tags.len(), 4);
        assert_eq!(rec.titles[1].preview(), "epsilon · zeta");
        assert_eq!(rec.language, "en");
    }

    #[test]
    fn emoji_style_leads_with_sticker() {
        let rec = keyword()
            .recommend("커피 한잔 하면서 공부", RecommendStyle::WithEmoji)
            .unwrap();
        assert_eq!(rec.language, "ko");
        let first = &rec.titles[0].tags[0];
        assert_eq!(first.kind, SuggestionKind::Emoji);
        assert_eq!(first.text, "hot beverage");
    }

    #[test]
    fn empty_content_is_an_error() {
        assert!(matches!(
            keyword().recommend(" ,, ! ", RecommendStyle::Plain),
            Err(RecommendError::EmptyContent)
        ));
    }

    #[test]
    fn fallback_is_used_when_primary_fails() {
        let chained = FallbackRecommender::new(Box::new(Offline), Box::new(keyword()));
        let rec = chained.recommend("Rust async tips", RecommendStyle::Plain).unwrap();
        assert_eq!(rec.titles[0].preview(), "Rust · async · tips");
    }
}
