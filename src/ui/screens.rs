use anyhow::Result;
use rusqlite::Connection;

use crate::db::{fetch_hymns, fetch_praises, search_hymns, search_praises, search_verses};
use crate::history::RecentVerses;
use crate::models::{Hymn, Praise, ServiceRecord, Verse};

/// Scrollable selection over a list of rows. Filtering happens in the
/// database, so the list only tracks the rows it was handed and the cursor.
pub(crate) struct ListScreen<T> {
    pub(crate) items: Vec<T>,
    pub(crate) selected: usize,
}

impl<T> Default for ListScreen<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
        }
    }
}

impl<T> ListScreen<T> {
    pub(crate) fn new(items: Vec<T>) -> Self {
        let mut screen = Self { items, selected: 0 };
        screen.ensure_in_bounds();
        screen
    }

    pub(crate) fn current(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.items.is_empty() {
            return;
        }
        let len = self.items.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        if !self.items.is_empty() {
            self.selected = self.items.len() - 1;
        }
    }

    /// Replace the rows, keeping the cursor where it was when possible.
    pub(crate) fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.ensure_in_bounds();
    }

    /// Move the cursor to the first row matching `predicate`, if any.
    pub(crate) fn select_where(&mut self, predicate: impl Fn(&T) -> bool) {
        if let Some(idx) = self.items.iter().position(predicate) {
            self.selected = idx;
        }
    }

    pub(crate) fn ensure_in_bounds(&mut self) {
        if self.items.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.items.len() {
            self.selected = self.items.len() - 1;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Library tabs in the left column.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum LibraryTab {
    Hymns,
    Praises,
    Verses,
}

impl LibraryTab {
    pub(crate) const ALL: [LibraryTab; 3] = [LibraryTab::Hymns, LibraryTab::Praises, LibraryTab::Verses];

    pub(crate) fn title(self) -> &'static str {
        match self {
            LibraryTab::Hymns => "Hymns",
            LibraryTab::Praises => "Praises",
            LibraryTab::Verses => "Verses",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            LibraryTab::Hymns => 0,
            LibraryTab::Praises => 1,
            LibraryTab::Verses => 2,
        }
    }

    pub(crate) fn next(self) -> Self {
        match self {
            LibraryTab::Hymns => LibraryTab::Praises,
            LibraryTab::Praises => LibraryTab::Verses,
            LibraryTab::Verses => LibraryTab::Hymns,
        }
    }

    pub(crate) fn previous(self) -> Self {
        match self {
            LibraryTab::Hymns => LibraryTab::Verses,
            LibraryTab::Praises => LibraryTab::Hymns,
            LibraryTab::Verses => LibraryTab::Praises,
        }
    }
}

/// Rows of the verse tab: recent references when no search is active, stored
/// verses while searching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum VerseEntry {
    Recent(String),
    Found(Verse),
}

impl VerseEntry {
    pub(crate) fn label(&self) -> String {
        match self {
            VerseEntry::Recent(reference) => reference.clone(),
            VerseEntry::Found(verse) => format!("{} ({})", verse.reference(), verse.version),
        }
    }
}

/// Everything the left column shows: three tabs, each with its own search
/// filter and cursor.
pub(crate) struct Library {
    pub(crate) tab: LibraryTab,
    pub(crate) hymns: ListScreen<Hymn>,
    pub(crate) praises: ListScreen<Praise>,
    pub(crate) verses: ListScreen<VerseEntry>,
    filters: [Option<String>; 3],
}

impl Library {
    pub(crate) fn load(conn: &Connection) -> Result<Self> {
        Ok(Self {
            tab: LibraryTab::Hymns,
            hymns: ListScreen::new(fetch_hymns(conn)?),
            praises: ListScreen::new(fetch_praises(conn)?),
            verses: ListScreen::default(),
            filters: [None, None, None],
        })
    }

    pub(crate) fn filter(&self) -> Option<&str> {
        self.filters[self.tab.index()].as_deref()
    }

    /// Set the active tab's filter and re-run its query. Blank queries show
    /// the full list.
    pub(crate) fn set_filter(
        &mut self,
        conn: &Connection,
        filter: Option<String>,
        recent: &RecentVerses,
    ) -> Result<()> {
        let filter = filter.filter(|q| !q.trim().is_empty());
        self.filters[self.tab.index()] = filter;
        self.refresh_tab(conn, self.tab, recent)
    }

    /// Re-query every tab, e.g. after an insert or delete.
    pub(crate) fn refresh(&mut self, conn: &Connection, recent: &RecentVerses) -> Result<()> {
        for tab in LibraryTab::ALL {
            self.refresh_tab(conn, tab, recent)?;
        }
        Ok(())
    }

    pub(crate) fn refresh_tab(
        &mut self,
        conn: &Connection,
        tab: LibraryTab,
        recent: &RecentVerses,
    ) -> Result<()> {
        let filter = self.filters[tab.index()].as_deref();
        match tab {
            LibraryTab::Hymns => {
                let hymns = match filter {
                    Some(query) => search_hymns(conn, query)?,
                    None => fetch_hymns(conn)?,
                };
                self.hymns.set_items(hymns);
            }
            LibraryTab::Praises => {
                let praises = match filter {
                    Some(query) => search_praises(conn, query)?,
                    None => fetch_praises(conn)?,
                };
                self.praises.set_items(praises);
            }
            LibraryTab::Verses => {
                let entries = match filter {
                    Some(query) => search_verses(conn, query)?
                        .into_iter()
                        .map(VerseEntry::Found)
                        .collect(),
                    None => recent
                        .iter()
                        .map(|reference| VerseEntry::Recent(reference.to_string()))
                        .collect(),
                };
                self.verses.set_items(entries);
            }
        }
        Ok(())
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        match self.tab {
            LibraryTab::Hymns => self.hymns.move_selection(offset),
            LibraryTab::Praises => self.praises.move_selection(offset),
            LibraryTab::Verses => self.verses.move_selection(offset),
        }
    }

    pub(crate) fn select_first(&mut self) {
        match self.tab {
            LibraryTab::Hymns => self.hymns.select_first(),
            LibraryTab::Praises => self.praises.select_first(),
            LibraryTab::Verses => self.verses.select_first(),
        }
    }

    pub(crate) fn select_last(&mut self) {
        match self.tab {
            LibraryTab::Hymns => self.hymns.select_last(),
            LibraryTab::Praises => self.praises.select_last(),
            LibraryTab::Verses => self.verses.select_last(),
        }
    }

    /// Labels and cursor of the active tab, ready for a list widget.
    pub(crate) fn rows(&self) -> (Vec<String>, usize) {
        match self.tab {
            LibraryTab::Hymns => (
                self.hymns.items.iter().map(ToString::to_string).collect(),
                self.hymns.selected,
            ),
            LibraryTab::Praises => (
                self.praises.items.iter().map(Praise::display_title).collect(),
                self.praises.selected,
            ),
            LibraryTab::Verses => (
                self.verses.items.iter().map(VerseEntry::label).collect(),
                self.verses.selected,
            ),
        }
    }
}

/// Saved service histories, newest first.
pub(crate) struct SavedServicesScreen {
    pub(crate) records: ListScreen<ServiceRecord>,
}

impl SavedServicesScreen {
    pub(crate) fn new(records: Vec<ServiceRecord>) -> Self {
        Self {
            records: ListScreen::new(records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_verse, open_in_memory, seed_if_empty};

    #[test]
    fn list_selection_is_clamped() {
        let mut list = ListScreen::new(vec![1, 2, 3]);
        list.move_selection(-5);
        assert_eq!(list.selected, 0);
        list.move_selection(10);
        assert_eq!(list.current(), Some(&3));
        list.set_items(vec![1]);
        assert_eq!(list.selected, 0);
        list.set_items(Vec::new());
        assert_eq!(list.current(), None);
        list.move_selection(1);
        assert_eq!(list.selected, 0);
    }

    #[test]
    fn tabs_cycle_both_ways() {
        assert_eq!(LibraryTab::Verses.next(), LibraryTab::Hymns);
        assert_eq!(LibraryTab::Hymns.previous(), LibraryTab::Verses);
    }

    #[test]
    fn filters_are_per_tab() {
        let mut conn = open_in_memory().unwrap();
        seed_if_empty(&mut conn).unwrap();
        let recent = RecentVerses::default();
        let mut library = Library::load(&conn).unwrap();
        assert_eq!(library.hymns.len(), 10);

        library
            .set_filter(&conn, Some("chuvas".into()), &recent)
            .unwrap();
        assert_eq!(library.hymns.len(), 1);
        assert_eq!(library.filter(), Some("chuvas"));

        library.tab = LibraryTab::Praises;
        assert_eq!(library.filter(), None);
        assert_eq!(library.praises.len(), 5);

        library.tab = LibraryTab::Hymns;
        library.set_filter(&conn, Some("   ".into()), &recent).unwrap();
        assert_eq!(library.hymns.len(), 10);
        assert_eq!(library.filter(), None);
    }

    #[test]
    fn verse_tab_switches_between_recent_and_search() {
        let conn = open_in_memory().unwrap();
        create_verse(&conn, "Salmos", 23, 1, "O Senhor é o meu pastor", "ARC").unwrap();
        let mut recent = RecentVerses::default();
        recent.remember("João 3:16");

        let mut library = Library::load(&conn).unwrap();
        library.tab = LibraryTab::Verses;
        library.refresh(&conn, &recent).unwrap();
        assert_eq!(
            library.verses.current(),
            Some(&VerseEntry::Recent("João 3:16".into()))
        );

        library
            .set_filter(&conn, Some("pastor".into()), &recent)
            .unwrap();
        let (labels, _) = library.rows();
        assert_eq!(labels, vec!["Salmos 23:1 (ARC)"]);
    }
}
