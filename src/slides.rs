//! Slide pagination and the preview cursor that walks it.

use std::mem;

use crate::models::{Hymn, Praise, Verse};

/// Split lyrics into slides on blank lines, trimming every stanza. When no
/// non-empty stanza remains the whole text becomes a single slide.
pub fn split_into_slides(text: &str) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    let slides: Vec<String> = normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(str::to_string)
        .collect();

    if slides.is_empty() {
        vec![text.to_string()]
    } else {
        slides
    }
}

/// The content currently loaded into the preview, its slides, and the cursor.
///
/// `held` mirrors the operator holding the Ctrl modifier: navigation keeps
/// updating the preview but nothing reaches the projector until released.
#[derive(Debug, Default, Clone)]
pub struct SlideDeck {
    slides: Vec<String>,
    index: usize,
    reference: Option<String>,
    title: Option<String>,
    held: bool,
}

impl SlideDeck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_hymn(&mut self, hymn: &Hymn) {
        self.slides = lyrics_or_title(&hymn.lyrics, &hymn.title);
        self.reference = Some(hymn.reference());
        self.title = Some(hymn.to_string());
        self.index = 0;
    }

    /// Praises carry no reference on the projector.
    pub fn load_praise(&mut self, praise: &Praise) {
        self.slides = lyrics_or_title(&praise.lyrics, &praise.title);
        self.reference = None;
        self.title = Some(praise.display_title());
        self.index = 0;
    }

    /// A verse is always a single slide.
    pub fn load_verse(&mut self, verse: &Verse) {
        self.slides = vec![verse.text.clone()];
        self.reference = Some(verse.reference());
        self.title = Some(format!("{} ({})", verse.reference(), verse.version));
        self.index = 0;
    }

    pub fn current(&self) -> Option<&str> {
        self.slides.get(self.index).map(String::as_str)
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// `"i / n"` with a 1-based index, `"0 / 0"` when nothing is loaded.
    pub fn counter(&self) -> String {
        if self.slides.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.index + 1, self.slides.len())
        }
    }

    pub fn has_previous(&self) -> bool {
        !self.slides.is_empty() && self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.slides.len()
    }

    /// Advance one slide. Returns whether the cursor moved.
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Step back one slide. Returns whether the cursor moved.
    pub fn previous(&mut self) -> bool {
        if self.has_previous() {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    pub fn hold(&mut self) {
        self.held = true;
    }

    /// End a hold. Returns `true` when a hold was active, meaning the
    /// current slide must now be projected.
    pub fn release(&mut self) -> bool {
        mem::replace(&mut self.held, false)
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn should_project(&self) -> bool {
        !self.held
    }
}

fn lyrics_or_title(lyrics: &str, title: &str) -> Vec<String> {
    if lyrics.is_empty() {
        vec![title.to_string()]
    } else {
        split_into_slides(lyrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_HYMN_KIND;

    fn hymn(lyrics: &str) -> Hymn {
        Hymn {
            id: 1,
            number: "001".into(),
            title: "Chuvas de Graça".into(),
            lyrics: lyrics.into(),
            kind: DEFAULT_HYMN_KIND.into(),
        }
    }

    #[test]
    fn splits_on_blank_lines_and_trims() {
        let slides = split_into_slides("  first\nline \n\n\n second \r\n\r\nthird\n\n");
        assert_eq!(slides, vec!["first\nline", "second", "third"]);
    }

    #[test]
    fn whitespace_only_text_is_one_slide() {
        assert_eq!(split_into_slides(" \n\n "), vec![" \n\n "]);
    }

    #[test]
    fn hymn_without_lyrics_shows_title() {
        let mut deck = SlideDeck::new();
        deck.load_hymn(&hymn(""));
        assert_eq!(deck.current(), Some("Chuvas de Graça"));
        assert_eq!(deck.reference(), Some("001 - Chuvas de Graça"));
        assert_eq!(deck.counter(), "1 / 1");
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut deck = SlideDeck::new();
        assert_eq!(deck.counter(), "0 / 0");
        assert!(!deck.next());
        assert!(!deck.previous());

        deck.load_hymn(&hymn("a\n\nb\n\nc"));
        assert!(!deck.has_previous());
        assert!(deck.next());
        assert!(deck.next());
        assert!(!deck.next());
        assert_eq!(deck.current(), Some("c"));
        assert_eq!(deck.counter(), "3 / 3");
        assert!(deck.previous());
        assert_eq!(deck.index(), 1);
    }

    #[test]
    fn loading_resets_cursor() {
        let mut deck = SlideDeck::new();
        deck.load_hymn(&hymn("a\n\nb"));
        deck.next();
        deck.load_praise(&Praise {
            id: 2,
            title: "Oceanos".into(),
            author: String::new(),
            lyrics: "x\n\ny".into(),
        });
        assert_eq!(deck.index(), 0);
        assert_eq!(deck.reference(), None);
    }

    #[test]
    fn hold_suppresses_projection_until_release() {
        let mut deck = SlideDeck::new();
        assert!(deck.should_project());
        assert!(!deck.release());
        deck.hold();
        assert!(!deck.should_project());
        assert!(deck.release());
        assert!(deck.should_project());
    }
}
