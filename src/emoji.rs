//! Static catalog of 3D emoji stickers.
//!
//! The catalog is an explicit object handed to whoever needs it (the editor's picker
//! and the recommendation mapper) rather than a global.

use crate::types::EmojiReference;

/// Base path of the hosted 3D renderings.
const IMAGE_ROOT: &str = "assets/3d-emoji";

/// (cldr, glyph, group, unicode, keywords)
const BUILTIN: &[(&str, &str, &str, &str, &[&str])] = &[
    ("fire", "🔥", "Travel & Places", "1F525", &["fire", "hot", "trending", "lit", "불", "핫"]),
    ("sparkles", "✨", "Activities", "2728", &["sparkles", "new", "shiny", "magic", "반짝"]),
    ("rocket", "🚀", "Travel & Places", "1F680", &["rocket", "launch", "fast", "startup", "로켓"]),
    ("light bulb", "💡", "Objects", "1F4A1", &["idea", "tip", "bulb", "insight", "아이디어", "팁"]),
    ("hundred points", "💯", "Smileys & Emotion", "1F4AF", &["hundred", "perfect", "score", "100", "완벽"]),
    ("party popper", "🎉", "Activities", "1F389", &["party", "celebrate", "congrats", "축하"]),
    ("red heart", "❤️", "Smileys & Emotion", "2764", &["heart", "love", "like", "사랑", "좋아"]),
    ("thumbs up", "👍", "People & Body", "1F44D", &["good", "like", "ok", "approve", "좋아요"]),
    ("star-struck", "🤩", "Smileys & Emotion", "1F929", &["wow", "amazing", "star", "대박"]),
    ("face screaming in fear", "😱", "Smileys & Emotion", "1F631", &["shock", "scary", "omg", "충격"]),
    ("money bag", "💰", "Objects", "1F4B0", &["money", "rich", "profit", "cash", "돈"]),
    ("chart increasing", "📈", "Objects", "1F4C8", &["growth", "increase", "stock", "chart", "성장"]),
    ("laptop", "💻", "Objects", "1F4BB", &["laptop", "computer", "code", "dev", "개발", "코딩"]),
    ("books", "📚", "Objects", "1F4DA", &["books", "study", "learn", "read", "공부"]),
    ("warning", "⚠️", "Symbols", "26A0", &["warning", "caution", "alert", "주의"]),
    ("check mark button", "✅", "Symbols", "2705", &["check", "done", "complete", "yes", "완료"]),
    ("trophy", "🏆", "Activities", "1F3C6", &["trophy", "win", "best", "champion", "우승"]),
    ("hot beverage", "☕", "Food & Drink", "2615", &["coffee", "cafe", "morning", "커피"]),
];

/// Lookup over the available stickers.
#[derive(Debug, Clone, Default)]
pub struct EmojiCatalog {
    entries: Vec<EmojiReference>,
}

impl EmojiCatalog {
    /// Catalog bundled with the application.
    pub fn builtin() -> Self {
        let entries = BUILTIN
            .iter()
            .map(|(cldr, glyph, group, unicode, keywords)| EmojiReference {
                cldr: cldr.to_string(),
                glyph: glyph.to_string(),
                group: group.to_string(),
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                unicode: unicode.to_string(),
                image: format!("{IMAGE_ROOT}/{}.png", cldr.replace(' ', "_")),
            })
            .collect();
        Self { entries }
    }

    /// Creates a catalog from explicit entries.
    pub fn from_entries(entries: Vec<EmojiReference>) -> Self {
        Self { entries }
    }

    /// Every entry, in catalog order.
    pub fn entries(&self) -> &[EmojiReference] {
        &self.entries
    }

    /// Looks up an entry by CLDR name.
    pub fn get(&self, cldr: &str) -> Option<&EmojiReference> {
        self.entries.iter().find(|entry| entry.cldr == cldr)
    }

    /// Finds the first entry whose glyph, name or keywords match `word` exactly
    /// (case-insensitive).
    pub fn find_keyword(&self, word: &str) -> Option<&EmojiReference> {
        let word = word.trim().to_lowercase();
        if word.is_empty() {
            return None;
        }
        self.entries.iter().find(|entry| {
            entry.glyph == word
                || entry.cldr == word
                || entry.keywords.iter().any(|keyword| keyword.to_lowercase() == word)
        })
    }

    /// Entries whose name or keywords contain `query`. An empty query returns everything.
    pub fn search(&self, query: &str) -> Vec<&EmojiReference> {
        let query = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|entry| {
                query.is_empty()
                    || entry.cldr.contains(&query)
                    || entry.group.to_lowercase().contains(&query)
                    || entry.keywords.iter().any(|keyword| keyword.to_lowercase().contains(&query))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_are_unique() {
        let catalog = EmojiCatalog::builtin();
        let mut names: Vec<_> = catalog.entries().iter().map(|e| e.cldr.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), catalog.entries().len());
    }

    #[test]
    fn image_paths_are_relative() {
        let catalog = EmojiCatalog::builtin();
        let bulb = catalog.get("light bulb").unwrap();
        assert_eq!(bulb.image, "assets/3d-emoji/light_bulb.png");
    }

    #[test]
    fn keyword_lookup_is_exact_and_case_insensitive() {
        let catalog = EmojiCatalog::builtin();
        assert_eq!(catalog.find_keyword("Trending").unwrap().cldr, "fire");
        assert_eq!(catalog.find_keyword("커피").unwrap().cldr, "hot beverage");
        assert!(catalog.find_keyword("trend").is_none());
        assert!(catalog.find_keyword(" ").is_none());
    }

    #[test]
    fn search_matches_substrings() {
        let catalog = EmojiCatalog::builtin();
        let hits: Vec<_> = catalog.search("cel").iter().map(|e| e.cldr.clone()).collect();
        assert!(hits.contains(&"party popper".to_string()));
        assert_eq!(catalog.search("").len(), catalog.entries().len());
    }
}
