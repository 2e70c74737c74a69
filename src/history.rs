//! The running list of what was played during the current service, plus the
//! short list of recently looked-up verses.

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDateTime;

use crate::models::{Content, HistoryItem};

/// Default number of recent verse references kept in the library tab.
pub const RECENT_VERSE_LIMIT: usize = 20;

#[derive(Debug, Default, Clone)]
pub struct ServiceHistory {
    items: Vec<HistoryItem>,
}

impl ServiceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, description: impl Into<String>, content: Content) {
        let item = HistoryItem::new(description, content);
        log::info!("added to service history: {item}");
        self.items.push(item);
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// `"{icon} {description}"` for every item, the shape persisted in the
    /// database.
    pub fn display_lines(&self) -> Vec<String> {
        self.items.iter().map(ToString::to_string).collect()
    }

    /// Render the plain-text export.
    pub fn export_text(&self, service_type: &str, now: NaiveDateTime) -> String {
        let mut out = String::new();
        out.push_str("Service history\n");
        out.push_str(&format!("Date: {}\n", now.format("%d/%m/%Y %H:%M")));
        out.push_str(&format!("Type: {service_type}\n\n"));
        for (idx, item) in self.items.iter().enumerate() {
            out.push_str(&item.export_line(idx + 1));
            out.push('\n');
        }
        out
    }

    /// Write the export into `dir` using a timestamped file name and return
    /// the path written.
    pub fn export_to(&self, dir: &Path, service_type: &str, now: NaiveDateTime) -> Result<PathBuf> {
        if self.is_empty() {
            return Err(anyhow!("Service history is empty."));
        }

        fs::create_dir_all(dir).context("failed to create export directory")?;
        let path = dir.join(export_file_name(now));
        fs::write(&path, self.export_text(service_type, now))
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }
}

/// `service_history_YYYYMMDD_HHMMSS.txt`
pub fn export_file_name(now: NaiveDateTime) -> String {
    format!("service_history_{}.txt", now.format("%Y%m%d_%H%M%S"))
}

/// Recently projected verse references, newest first and without duplicates.
#[derive(Debug, Clone)]
pub struct RecentVerses {
    references: VecDeque<String>,
    limit: usize,
}

impl Default for RecentVerses {
    fn default() -> Self {
        Self::with_limit(RECENT_VERSE_LIMIT)
    }
}

impl RecentVerses {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            references: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Remember a reference. References already in the list keep their place.
    pub fn remember(&mut self, reference: &str) {
        if self.references.iter().any(|r| r == reference) {
            return;
        }
        self.references.push_front(reference.to_string());
        self.references.truncate(self.limit);
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.references.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.references.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{Praise, Verse};

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(19, 5, 7)
            .unwrap()
    }

    fn history() -> ServiceHistory {
        let mut history = ServiceHistory::new();
        let praise = Praise {
            id: 1,
            title: "Oceanos".into(),
            author: "Hillsong United".into(),
            lyrics: String::new(),
        };
        history.push(praise.display_title(), Content::Praise(praise));
        let verse = Verse {
            id: 2,
            book: "Salmos".into(),
            chapter: 23,
            verse: 1,
            text: "O Senhor é o meu pastor".into(),
            version: "ARC".into(),
        };
        history.push("Salmos 23:1 (ARC)", Content::Verse(verse));
        history
    }

    #[test]
    fn export_text_lists_items_in_order() {
        let text = history().export_text("Sunday", at());
        assert_eq!(
            text,
            "Service history\nDate: 10/03/2024 19:05\nType: Sunday\n\n\
             1. 🎤 Oceanos - Hillsong United\n2. 📖 Salmos 23:1 (ARC)\n"
        );
    }

    #[test]
    fn export_writes_timestamped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = history().export_to(dir.path(), "Regular", at()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "service_history_20240310_190507.txt"
        );
        let written = fs::read_to_string(path).unwrap();
        assert!(written.contains("Type: Regular"));
    }

    #[test]
    fn export_of_empty_history_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ServiceHistory::new()
            .export_to(dir.path(), "Regular", at())
            .is_err());
    }

    #[test]
    fn display_lines_carry_icons() {
        assert_eq!(
            history().display_lines(),
            vec!["🎤 Oceanos - Hillsong United", "📖 Salmos 23:1 (ARC)"]
        );
    }

    #[test]
    fn recent_verses_are_newest_first_and_capped() {
        let mut recent = RecentVerses::with_limit(3);
        for reference in ["João 3:16", "Salmos 23:1", "João 3:16", "Romanos 8:28", "Josué 1:9"] {
            recent.remember(reference);
        }
        let listed: Vec<&str> = recent.iter().collect();
        assert_eq!(listed, vec!["Josué 1:9", "Romanos 8:28", "Salmos 23:1"]);
        assert_eq!(recent.get(0), Some("Josué 1:9"));
    }
}
