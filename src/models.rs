//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. These types stay light-weight data holders so other layers can focus on
//! presentation, projection and persistence logic.

use std::fmt;

/// Hymnal used when a hymn is created without an explicit kind.
pub const DEFAULT_HYMN_KIND: &str = "harpa";
/// Bible version used when a verse is created without an explicit version.
pub const DEFAULT_BIBLE_VERSION: &str = "ARC";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A numbered hymn from a fixed hymnal.
pub struct Hymn {
    /// Primary key from the database.
    pub id: i64,
    /// Hymnal number. Stored as text so leading zeroes ("001") survive, while
    /// the queries cast it to an integer for ordering.
    pub number: String,
    pub title: String,
    /// Full lyrics. Stanzas are separated by a blank line.
    pub lyrics: String,
    /// Which hymnal the hymn belongs to.
    pub kind: String,
}

impl Hymn {
    /// Reference printed under the lyrics on the projector.
    pub fn reference(&self) -> String {
        format!("{} - {}", self.number, self.title)
    }
}

impl fmt::Display for Hymn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.number, self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A contemporary worship song. Praises have no number and never show a
/// reference on the projector.
pub struct Praise {
    pub id: i64,
    pub title: String,
    /// Optional author, blank when unknown.
    pub author: String,
    pub lyrics: String,
}

impl Praise {
    /// Compose a `Title - Author` string that gracefully omits the hyphen if
    /// the author is blank.
    pub fn display_title(&self) -> String {
        if self.author.trim().is_empty() {
            self.title.clone()
        } else {
            format!("{} - {}", self.title, self.author)
        }
    }
}

impl fmt::Display for Praise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single Bible verse in one translation.
pub struct Verse {
    pub id: i64,
    pub book: String,
    pub chapter: i64,
    pub verse: i64,
    pub text: String,
    /// Short version code such as `ARC` or `NVI`.
    pub version: String,
}

impl Verse {
    /// Formatted reference, e.g. `João 3:16`.
    pub fn reference(&self) -> String {
        format!("{} {}:{}", self.book, self.chapter, self.verse)
    }
}

impl fmt::Display for Verse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which kind of content a service history entry refers to.
pub enum HistoryKind {
    Hymn,
    Praise,
    Verse,
}

impl HistoryKind {
    /// Icon shown before the description in lists and exports.
    pub fn icon(self) -> &'static str {
        match self {
            HistoryKind::Hymn => "🎵",
            HistoryKind::Praise => "🎤",
            HistoryKind::Verse => "📖",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The content an entry was created from, so it can be reloaded later.
pub enum Content {
    Hymn(Hymn),
    Praise(Praise),
    Verse(Verse),
}

impl Content {
    pub fn kind(&self) -> HistoryKind {
        match self {
            Content::Hymn(_) => HistoryKind::Hymn,
            Content::Praise(_) => HistoryKind::Praise,
            Content::Verse(_) => HistoryKind::Verse,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One item played during the current service.
pub struct HistoryItem {
    pub kind: HistoryKind,
    pub description: String,
    pub content: Content,
}

impl HistoryItem {
    pub fn new(description: impl Into<String>, content: Content) -> Self {
        Self {
            kind: content.kind(),
            description: description.into(),
            content,
        }
    }

    /// Numbered line used by the plain-text export.
    pub fn export_line(&self, number: usize) -> String {
        format!("{number}. {} {}", self.kind.icon(), self.description)
    }
}

impl fmt::Display for HistoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.icon(), self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A service history persisted to the `historico_culto` table.
pub struct ServiceRecord {
    pub id: i64,
    /// Local timestamp formatted as `YYYY-MM-DD HH:MM:SS`.
    pub date: String,
    pub service_type: String,
    pub items: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn praise(author: &str) -> Praise {
        Praise {
            id: 1,
            title: "Oceanos".into(),
            author: author.into(),
            lyrics: String::new(),
        }
    }

    #[test]
    fn praise_title_omits_blank_author() {
        assert_eq!(praise("  ").display_title(), "Oceanos");
        assert_eq!(praise("Hillsong United").to_string(), "Oceanos - Hillsong United");
    }

    #[test]
    fn verse_reference_uses_colon() {
        let verse = Verse {
            id: 1,
            book: "João".into(),
            chapter: 3,
            verse: 16,
            text: "Porque Deus amou o mundo".into(),
            version: DEFAULT_BIBLE_VERSION.into(),
        };
        assert_eq!(verse.reference(), "João 3:16");
    }

    #[test]
    fn history_item_export_line_is_numbered() {
        let hymn = Hymn {
            id: 3,
            number: "003".into(),
            title: "Vem a Mim".into(),
            lyrics: String::new(),
            kind: DEFAULT_HYMN_KIND.into(),
        };
        let item = HistoryItem::new(hymn.to_string(), Content::Hymn(hymn));
        assert_eq!(item.kind, HistoryKind::Hymn);
        assert_eq!(item.export_line(2), "2. 🎵 003 - Vem a Mim");
        assert_eq!(item.to_string(), "🎵 003 - Vem a Mim");
    }
}
