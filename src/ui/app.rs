use std::mem;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::{
    create_hymn, create_praise, create_verse, delete_hymn, delete_praise, delete_service,
    delete_verse, fetch_services, find_verse_by_reference, save_service, update_hymn,
    update_praise, update_verse,
};
use crate::history::{RecentVerses, ServiceHistory};
use crate::models::{Content, DEFAULT_BIBLE_VERSION};
use crate::projection::{is_image, Projection};
use crate::reference::format_reference;
use crate::slides::SlideDeck;

use super::forms::{
    Alert, ContentForm, DeleteTarget, HymnForm, PathPrompt, PraiseForm, VerseForm, VerseLookup,
};
use super::helpers::{centered_rect, key_hint, surface_error};
use super::projector::{Projector, ProjectorSetup};
use super::screens::{Library, LibraryTab, SavedServicesScreen, VerseEntry};

/// Footer space reserved for status messages and key hints.
const FOOTER_HEIGHT: u16 = 4;
const PROJECTION_DISABLED: &str = "Projection is disabled";
const NO_PROJECTOR_HELP: &str = "No projector output is configured. Open a fullscreen terminal on \
the projector screen, run `tty` there and pass the device with --projector or set [projector] \
output in the config file. Projection is disabled for this session.";

/// Top-level screens.
enum Screen {
    Console,
    SavedServices(SavedServicesScreen),
}

/// Fine-grained modes scoped to the current screen.
enum Mode {
    Normal,
    Searching(String),
    LookingUpVerse(VerseLookup),
    Editing(ContentForm),
    ChoosingBackground(PathPrompt),
    ConfirmDelete(DeleteTarget),
    ConfirmClearHistory,
    Alert(Alert),
}

/// Which list the arrow keys and Enter act on.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Focus {
    Library,
    History,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Control console state: library, preview, projection and service history.
pub struct App {
    conn: Connection,
    config: AppConfig,
    library: Library,
    focus: Focus,
    deck: SlideDeck,
    projection: Projection,
    /// `None` when projection is disabled for the session.
    projector: Option<Projector>,
    history: ServiceHistory,
    history_selected: usize,
    service_type: usize,
    version_index: usize,
    recent: RecentVerses,
    /// Image chosen with `b`, applied with F8.
    background_path: Option<PathBuf>,
    screen: Screen,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(conn: Connection, config: AppConfig, setup: ProjectorSetup) -> Result<Self> {
        let library = Library::load(&conn)?;
        let (projector, mode) = match setup {
            ProjectorSetup::Ready(projector) => (Some(projector), Mode::Normal),
            ProjectorSetup::NotConfigured => {
                log::warn!("no projector output configured, projection disabled");
                (
                    None,
                    Mode::Alert(Alert::warning("No projector", NO_PROJECTOR_HELP)),
                )
            }
            ProjectorSetup::Failed(err) => {
                log::warn!("projector unavailable, projection disabled: {err:#}");
                let message = format!(
                    "Could not open the projector: {}. Projection is disabled for this session.",
                    surface_error(&err)
                );
                (None, Mode::Alert(Alert::error("Projector unavailable", message)))
            }
        };
        let recent = RecentVerses::with_limit(config.recent_verse_limit);

        let mut app = Self {
            conn,
            config,
            library,
            focus: Focus::Library,
            deck: SlideDeck::new(),
            projection: Projection::new(),
            projector,
            history: ServiceHistory::new(),
            history_selected: 0,
            service_type: 0,
            version_index: 0,
            recent,
            background_path: None,
            screen: Screen::Console,
            mode,
            status: None,
        };
        app.render_projector();
        Ok(app)
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        let next = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::Searching(query) => self.handle_search(code, query),
            Mode::LookingUpVerse(lookup) => self.handle_verse_lookup(code, lookup),
            Mode::Editing(form) => Ok(self.handle_form(code, form)),
            Mode::ChoosingBackground(prompt) => Ok(self.handle_background_prompt(code, prompt)),
            Mode::ConfirmDelete(target) => Ok(self.handle_confirm_delete(code, target)),
            Mode::ConfirmClearHistory => Ok(self.handle_confirm_clear(code)),
            Mode::Alert(alert) => Ok(self.handle_alert(code, alert)),
        };

        self.mode = match next {
            Ok(mode) => mode,
            Err(err) => {
                log::error!("{err:#}");
                Mode::Alert(Alert::error("Error", surface_error(&err)))
            }
        };
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        if let Screen::SavedServices(_) = self.screen {
            return self.handle_saved_services_key(code, exit);
        }

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Char('1') => self.switch_tab(LibraryTab::Hymns),
            KeyCode::Char('2') => self.switch_tab(LibraryTab::Praises),
            KeyCode::Char('3') => self.switch_tab(LibraryTab::Verses),
            KeyCode::Tab => self.switch_tab(self.library.tab.next()),
            KeyCode::BackTab => self.switch_tab(self.library.tab.previous()),
            KeyCode::Char('h') => {
                self.focus = match self.focus {
                    Focus::Library => Focus::History,
                    Focus::History => Focus::Library,
                };
            }
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-10),
            KeyCode::PageDown => self.move_cursor(10),
            KeyCode::Home => match self.focus {
                Focus::Library => self.library.select_first(),
                Focus::History => self.history_selected = 0,
            },
            KeyCode::End => match self.focus {
                Focus::Library => self.library.select_last(),
                Focus::History => self.history_selected = self.history.len().saturating_sub(1),
            },
            KeyCode::Enter => return self.activate_selection(),
            KeyCode::Char('/') | KeyCode::Char('f') => {
                self.focus = Focus::Library;
                let query = self.library.filter().unwrap_or_default().to_string();
                return Ok(Mode::Searching(query));
            }
            KeyCode::Char('v') => {
                return Ok(Mode::LookingUpVerse(VerseLookup::with_version(
                    self.version_index,
                )))
            }
            KeyCode::Left => self.step_slide(false),
            KeyCode::Right => self.step_slide(true),
            KeyCode::F(9) => self.toggle_projection(),
            KeyCode::F(10) => self.black_screen(),
            KeyCode::F(8) => return Ok(self.apply_background()),
            KeyCode::Char('B') => self.remove_background(),
            KeyCode::Char('b') => {
                let current = self
                    .background_path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default();
                return Ok(Mode::ChoosingBackground(PathPrompt::with_value(&current)));
            }
            KeyCode::Char('o') => self.open_background(),
            KeyCode::Char('c') => {
                if self.history.is_empty() {
                    self.set_status("Service history is already empty.", StatusKind::Info);
                } else {
                    return Ok(Mode::ConfirmClearHistory);
                }
            }
            KeyCode::Char('x') => return Ok(self.export_history()),
            KeyCode::Char('s') => return self.save_history(),
            KeyCode::Char('t') => self.cycle_service_type(),
            KeyCode::Char('S') => self.open_saved_services()?,
            KeyCode::Char('+') => return Ok(self.new_form()),
            KeyCode::Char('e') => return self.edit_form(),
            KeyCode::Char('-') => return self.delete_prompt(),
            _ => {}
        }

        Ok(Mode::Normal)
    }

    fn handle_saved_services_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let Screen::SavedServices(saved) = &mut self.screen else {
            return Ok(Mode::Normal);
        };

        match code {
            KeyCode::Char('q') => *exit = true,
            KeyCode::Esc | KeyCode::Char('S') => self.screen = Screen::Console,
            KeyCode::Up => saved.records.move_selection(-1),
            KeyCode::Down => saved.records.move_selection(1),
            KeyCode::Home => saved.records.select_first(),
            KeyCode::End => saved.records.select_last(),
            KeyCode::Char('-') => {
                if let Some(record) = saved.records.current() {
                    return Ok(Mode::ConfirmDelete(DeleteTarget::Service {
                        id: record.id,
                        label: format!("{} ({})", record.date, record.service_type),
                    }));
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_search(&mut self, code: KeyCode, mut query: String) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.library.set_filter(&self.conn, None, &self.recent)?;
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Up => {
                self.library.move_selection(-1);
                return Ok(Mode::Searching(query));
            }
            KeyCode::Down => {
                self.library.move_selection(1);
                return Ok(Mode::Searching(query));
            }
            KeyCode::Backspace => {
                query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => query.push(ch),
            _ => return Ok(Mode::Searching(query)),
        }

        self.library
            .set_filter(&self.conn, Some(query.clone()), &self.recent)?;
        Ok(Mode::Searching(query))
    }

    fn handle_verse_lookup(&mut self, code: KeyCode, mut lookup: VerseLookup) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.version_index = lookup.version_index;
                Ok(Mode::Normal)
            }
            KeyCode::Tab => {
                lookup.cycle_version(self.config.bible_versions.len());
                self.version_index = lookup.version_index;
                Ok(Mode::LookingUpVerse(lookup))
            }
            KeyCode::Backspace => {
                lookup.backspace();
                Ok(Mode::LookingUpVerse(lookup))
            }
            KeyCode::Char(ch) => {
                lookup.push_char(ch);
                Ok(Mode::LookingUpVerse(lookup))
            }
            KeyCode::Enter => {
                self.version_index = lookup.version_index;
                let input = lookup.input.trim();
                if input.is_empty() {
                    return Ok(Mode::Alert(Alert::warning(
                        "Verse lookup",
                        "Type a reference such as João 3:16.",
                    )));
                }
                let reference = format_reference(input);
                self.project_reference(&reference)
            }
            _ => Ok(Mode::LookingUpVerse(lookup)),
        }
    }

    fn handle_form(&mut self, code: KeyCode, mut form: ContentForm) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Tab => form.toggle_field(),
            KeyCode::Enter => form.enter(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.set_error(None);
                }
            }
            _ => {}
        }
        Mode::Editing(form)
    }

    fn handle_background_prompt(&mut self, code: KeyCode, mut prompt: PathPrompt) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Char(ch) => {
                prompt.push_char(ch);
            }
            KeyCode::Enter => {
                let raw = prompt.input.trim();
                if raw.is_empty() {
                    self.background_path = None;
                    self.set_status("Background selection cleared.", StatusKind::Info);
                    return Mode::Normal;
                }
                let path = PathBuf::from(raw);
                if !path.exists() {
                    prompt.error = Some("File does not exist.".to_string());
                } else if !is_image(&path) {
                    prompt.error = Some("Choose a png, jpg, jpeg or bmp image.".to_string());
                } else {
                    self.set_status(
                        format!("Background selected: {}. Press F8 to apply.", path.display()),
                        StatusKind::Info,
                    );
                    self.background_path = Some(path);
                    return Mode::Normal;
                }
            }
            _ => {}
        }
        Mode::ChoosingBackground(prompt)
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, target: DeleteTarget) -> Mode {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                match self.perform_delete(&target) {
                    Ok(()) => Mode::Normal,
                    Err(err) => {
                        log::error!("delete failed: {err:#}");
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Mode::ConfirmDelete(target)
                    }
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Mode::Normal,
            _ => Mode::ConfirmDelete(target),
        }
    }

    fn handle_confirm_clear(&mut self, code: KeyCode) -> Mode {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.history.clear();
                self.history_selected = 0;
                log::info!("service history cleared");
                self.set_status("Service history cleared.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Mode::Normal,
            _ => Mode::ConfirmClearHistory,
        }
    }

    fn handle_alert(&mut self, code: KeyCode, alert: Alert) -> Mode {
        match code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Mode::Normal,
            _ => Mode::Alert(alert),
        }
    }

    /// `Ctrl+S` inside a form saves from whichever field has focus.
    pub(crate) fn handle_ctrl_s(&mut self) {
        if !matches!(self.mode, Mode::Editing(_)) {
            return;
        }
        if let Mode::Editing(form) = mem::replace(&mut self.mode, Mode::Normal) {
            self.mode = self.save_form(form);
        }
    }

    /// `Ctrl+Left` / `Ctrl+Right`: move the preview without touching the
    /// projector until the modifier is released.
    pub(crate) fn handle_ctrl_navigation(&mut self, code: KeyCode) {
        if !self.accepts_hold() {
            return;
        }
        self.deck.hold();
        let moved = match code {
            KeyCode::Left => self.deck.previous(),
            KeyCode::Right => self.deck.next(),
            _ => false,
        };
        if moved {
            self.set_status(
                format!("Preview {} (release Ctrl to project)", self.deck.counter()),
                StatusKind::Info,
            );
        }
    }

    pub(crate) fn handle_shift_f8(&mut self) {
        if matches!(self.mode, Mode::Normal) {
            self.remove_background();
        }
    }

    pub(crate) fn modifier_pressed(&mut self) {
        if self.accepts_hold() {
            self.deck.hold();
        }
    }

    pub(crate) fn modifier_released(&mut self) {
        if self.deck.release() && self.projector.is_some() {
            self.project_current();
            self.set_status(
                format!("Projecting slide {}", self.deck.counter()),
                StatusKind::Info,
            );
        }
    }

    pub(crate) fn is_holding(&self) -> bool {
        self.deck.is_held()
    }

    pub(crate) fn close_projector(&mut self) -> Result<()> {
        if let Some(projector) = self.projector.as_mut() {
            projector.close()?;
        }
        Ok(())
    }

    fn accepts_hold(&self) -> bool {
        matches!(self.mode, Mode::Normal)
            && matches!(self.screen, Screen::Console)
            && !self.deck.is_empty()
    }

    fn switch_tab(&mut self, tab: LibraryTab) {
        self.library.tab = tab;
        self.focus = Focus::Library;
    }

    fn move_cursor(&mut self, offset: isize) {
        match self.focus {
            Focus::Library => self.library.move_selection(offset),
            Focus::History => {
                if self.history.is_empty() {
                    return;
                }
                let last = self.history.len() as isize - 1;
                self.history_selected =
                    (self.history_selected as isize + offset).clamp(0, last) as usize;
            }
        }
    }

    fn activate_selection(&mut self) -> Result<Mode> {
        if self.focus == Focus::History {
            if let Some(item) = self.history.item(self.history_selected) {
                let content = item.content.clone();
                self.present(content, false)?;
            }
            return Ok(Mode::Normal);
        }

        match self.library.tab {
            LibraryTab::Hymns => {
                if let Some(hymn) = self.library.hymns.current().cloned() {
                    self.present(Content::Hymn(hymn), true)?;
                }
            }
            LibraryTab::Praises => {
                if let Some(praise) = self.library.praises.current().cloned() {
                    self.present(Content::Praise(praise), true)?;
                }
            }
            LibraryTab::Verses => match self.library.verses.current().cloned() {
                Some(VerseEntry::Found(verse)) => self.present(Content::Verse(verse), true)?,
                Some(VerseEntry::Recent(reference)) => return self.project_reference(&reference),
                None => {}
            },
        }
        Ok(Mode::Normal)
    }

    fn project_reference(&mut self, reference: &str) -> Result<Mode> {
        let version = self.current_version();
        match find_verse_by_reference(&self.conn, reference, &version)? {
            Some(verse) => {
                self.present(Content::Verse(verse), true)?;
                Ok(Mode::Normal)
            }
            None => Ok(Mode::Alert(Alert::error(
                "Verse not found",
                format!("Verse '{reference}' not found in version {version}"),
            ))),
        }
    }

    /// Load content into the preview, optionally record it in the service
    /// history, and project the first slide unless a hold is active.
    fn present(&mut self, content: Content, record: bool) -> Result<()> {
        let description = match &content {
            Content::Hymn(hymn) => {
                self.deck.load_hymn(hymn);
                hymn.to_string()
            }
            Content::Praise(praise) => {
                self.deck.load_praise(praise);
                praise.display_title()
            }
            Content::Verse(verse) => {
                self.deck.load_verse(verse);
                self.recent.remember(&verse.reference());
                self.library
                    .refresh_tab(&self.conn, LibraryTab::Verses, &self.recent)?;
                format!("{} ({})", verse.reference(), verse.version)
            }
        };

        if record {
            self.history.push(description.clone(), content);
            self.history_selected = self.history.len() - 1;
        }

        if self.deck.should_project() {
            self.project_current();
        }

        let message = if self.projector.is_some() && self.deck.should_project() {
            format!("Projecting {description}")
        } else {
            format!("Loaded {description} into the preview")
        };
        self.set_status(message, StatusKind::Info);
        Ok(())
    }

    fn step_slide(&mut self, forward: bool) {
        let moved = if forward {
            self.deck.next()
        } else {
            self.deck.previous()
        };
        if moved && self.deck.should_project() {
            self.project_current();
        }
    }

    fn project_current(&mut self) {
        if self.projector.is_none() {
            return;
        }
        let Some(slide) = self.deck.current() else {
            return;
        };
        self.projection.show(slide, self.deck.reference());
        log::debug!("projecting slide {}", self.deck.counter());
        self.render_projector();
    }

    /// Push the projection state to the projector terminal. A write failure
    /// disables projection for the rest of the session.
    fn render_projector(&mut self) {
        let Some(projector) = self.projector.as_mut() else {
            return;
        };
        if let Err(err) = projector.render(&self.projection) {
            log::error!("projector render failed: {err:#}");
            self.projector = None;
            self.set_status(
                format!(
                    "Projector lost: {}. Projection is disabled.",
                    surface_error(&err)
                ),
                StatusKind::Error,
            );
        }
    }

    fn projection_enabled(&mut self) -> bool {
        if self.projector.is_none() {
            self.set_status(PROJECTION_DISABLED, StatusKind::Error);
            return false;
        }
        true
    }

    fn toggle_projection(&mut self) {
        if !self.projection_enabled() {
            return;
        }
        let black = self.projection.toggle();
        self.render_projector();
        log::info!("projection {}", if black { "hidden" } else { "visible" });
        let text = if black {
            "Projection hidden."
        } else {
            "Projection visible."
        };
        self.set_status(text, StatusKind::Info);
    }

    fn black_screen(&mut self) {
        if !self.projection_enabled() {
            return;
        }
        self.projection.black_screen();
        self.render_projector();
        self.set_status("Black screen.", StatusKind::Info);
    }

    fn apply_background(&mut self) -> Mode {
        if !self.projection_enabled() {
            return Mode::Normal;
        }
        let Some(path) = self.background_path.clone() else {
            self.set_status("Choose a background image first (b).", StatusKind::Error);
            return Mode::Normal;
        };
        match self.projection.apply_background(&path) {
            Ok(()) => {
                self.render_projector();
                log::info!("background applied: {}", path.display());
                self.set_status(
                    format!("Background applied: {}", self.projection.background().label()),
                    StatusKind::Info,
                );
                Mode::Normal
            }
            Err(err) => Mode::Alert(Alert::error("Background", err.to_string())),
        }
    }

    fn remove_background(&mut self) {
        if !self.projection_enabled() {
            return;
        }
        self.projection.remove_background();
        self.render_projector();
        self.set_status("Background removed.", StatusKind::Info);
    }

    fn open_background(&mut self) {
        let Some(path) = self.background_path.clone() else {
            self.set_status("Choose a background image first (b).", StatusKind::Error);
            return;
        };
        match open_link(&path) {
            Ok(()) => self.set_status(
                format!("Opened {} in the image viewer.", path.display()),
                StatusKind::Info,
            ),
            Err(err) => {
                log::warn!("failed to open {}: {err}", path.display());
                self.set_status(
                    format!("Could not open {}: {err}", path.display()),
                    StatusKind::Error,
                );
            }
        }
    }

    fn current_version(&self) -> String {
        self.config
            .version_codes()
            .get(self.version_index)
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIBLE_VERSION.to_string())
    }

    fn service_type_name(&self) -> &str {
        self.config
            .service_types
            .get(self.service_type)
            .map(String::as_str)
            .unwrap_or("Regular")
    }

    fn cycle_service_type(&mut self) {
        let count = self.config.service_types.len().max(1);
        self.service_type = (self.service_type + 1) % count;
        self.set_status(
            format!("Service type: {}", self.service_type_name()),
            StatusKind::Info,
        );
    }

    fn export_history(&mut self) -> Mode {
        if self.history.is_empty() {
            return Mode::Alert(Alert::warning("Export", "Service history is empty."));
        }
        let now = Local::now().naive_local();
        let result = self
            .config
            .export_dir()
            .and_then(|dir| self.history.export_to(&dir, self.service_type_name(), now));
        match result {
            Ok(path) => {
                log::info!("service history exported to {}", path.display());
                Mode::Alert(Alert::info(
                    "Export",
                    format!("History exported to {}", path.display()),
                ))
            }
            Err(err) => {
                log::error!("export failed: {err:#}");
                Mode::Alert(Alert::error("Export failed", surface_error(&err)))
            }
        }
    }

    fn save_history(&mut self) -> Result<Mode> {
        if self.history.is_empty() {
            return Ok(Mode::Alert(Alert::warning(
                "Save service",
                "Service history is empty.",
            )));
        }
        let service_type = self.service_type_name().to_string();
        let id = save_service(&self.conn, &service_type, &self.history.display_lines())?;
        log::info!("service {id} saved ({service_type}, {} items)", self.history.len());
        self.set_status(
            format!("Service saved as #{id} ({service_type})."),
            StatusKind::Info,
        );
        Ok(Mode::Normal)
    }

    fn open_saved_services(&mut self) -> Result<()> {
        let records = fetch_services(&self.conn)?;
        self.screen = Screen::SavedServices(SavedServicesScreen::new(records));
        Ok(())
    }

    fn reload_saved_services(&mut self) -> Result<()> {
        if let Screen::SavedServices(saved) = &mut self.screen {
            saved.records.set_items(fetch_services(&self.conn)?);
        }
        Ok(())
    }

    fn new_form(&mut self) -> Mode {
        self.focus = Focus::Library;
        let form = match self.library.tab {
            LibraryTab::Hymns => ContentForm::Hymn(HymnForm::default()),
            LibraryTab::Praises => ContentForm::Praise(PraiseForm::default()),
            LibraryTab::Verses => ContentForm::Verse(VerseForm::default()),
        };
        Mode::Editing(form)
    }

    fn edit_form(&mut self) -> Result<Mode> {
        let form = match self.library.tab {
            LibraryTab::Hymns => self
                .library
                .hymns
                .current()
                .map(|hymn| ContentForm::Hymn(HymnForm::from_hymn(hymn))),
            LibraryTab::Praises => self
                .library
                .praises
                .current()
                .map(|praise| ContentForm::Praise(PraiseForm::from_praise(praise))),
            LibraryTab::Verses => match self.library.verses.current().cloned() {
                Some(VerseEntry::Found(verse)) => {
                    Some(ContentForm::Verse(VerseForm::from_verse(&verse)))
                }
                Some(VerseEntry::Recent(reference)) => {
                    find_verse_by_reference(&self.conn, &reference, &self.current_version())?
                        .map(|verse| ContentForm::Verse(VerseForm::from_verse(&verse)))
                }
                None => None,
            },
        };

        match form {
            Some(form) => Ok(Mode::Editing(form)),
            None => {
                self.set_status("Nothing selected to edit.", StatusKind::Error);
                Ok(Mode::Normal)
            }
        }
    }

    fn delete_prompt(&mut self) -> Result<Mode> {
        let target = match self.library.tab {
            LibraryTab::Hymns => self.library.hymns.current().map(|hymn| DeleteTarget::Hymn {
                id: hymn.id,
                label: hymn.to_string(),
            }),
            LibraryTab::Praises => {
                self.library
                    .praises
                    .current()
                    .map(|praise| DeleteTarget::Praise {
                        id: praise.id,
                        label: praise.display_title(),
                    })
            }
            LibraryTab::Verses => {
                let verse = match self.library.verses.current().cloned() {
                    Some(VerseEntry::Found(verse)) => Some(verse),
                    Some(VerseEntry::Recent(reference)) => {
                        find_verse_by_reference(&self.conn, &reference, &self.current_version())?
                    }
                    None => None,
                };
                verse.map(|verse| DeleteTarget::Verse {
                    id: verse.id,
                    label: format!("{} ({})", verse.reference(), verse.version),
                })
            }
        };

        match target {
            Some(target) => Ok(Mode::ConfirmDelete(target)),
            None => {
                self.set_status("Nothing selected to delete.", StatusKind::Error);
                Ok(Mode::Normal)
            }
        }
    }

    fn save_form(&mut self, mut form: ContentForm) -> Mode {
        match self.persist_form(&form) {
            Ok(message) => {
                self.set_status(message, StatusKind::Info);
                Mode::Normal
            }
            Err(err) => {
                form.set_error(Some(surface_error(&err)));
                Mode::Editing(form)
            }
        }
    }

    fn persist_form(&mut self, form: &ContentForm) -> Result<String> {
        let message = match form {
            ContentForm::Hymn(inner) => {
                let hymn = inner.parse_inputs()?;
                let id = match inner.id {
                    Some(_) => {
                        update_hymn(&self.conn, &hymn)?;
                        hymn.id
                    }
                    None => {
                        create_hymn(&self.conn, &hymn.number, &hymn.title, &hymn.lyrics, &hymn.kind)?
                            .id
                    }
                };
                self.library.refresh(&self.conn, &self.recent)?;
                self.library.hymns.select_where(|row| row.id == id);
                format!("Saved hymn {hymn}.")
            }
            ContentForm::Praise(inner) => {
                let praise = inner.parse_inputs()?;
                let id = match inner.id {
                    Some(_) => {
                        update_praise(&self.conn, &praise)?;
                        praise.id
                    }
                    None => create_praise(&self.conn, &praise.title, &praise.author, &praise.lyrics)?.id,
                };
                self.library.refresh(&self.conn, &self.recent)?;
                self.library.praises.select_where(|row| row.id == id);
                format!("Saved praise {praise}.")
            }
            ContentForm::Verse(inner) => {
                let verse = inner.parse_inputs()?;
                let id = match inner.id {
                    Some(_) => {
                        update_verse(&self.conn, &verse)?;
                        verse.id
                    }
                    None => {
                        create_verse(
                            &self.conn,
                            &verse.book,
                            verse.chapter,
                            verse.verse,
                            &verse.text,
                            &verse.version,
                        )?
                        .id
                    }
                };
                self.library.refresh(&self.conn, &self.recent)?;
                self.library
                    .verses
                    .select_where(|row| matches!(row, VerseEntry::Found(found) if found.id == id));
                format!("Saved verse {} ({}).", verse.reference(), verse.version)
            }
        };
        log::info!("{message}");
        Ok(message)
    }

    fn perform_delete(&mut self, target: &DeleteTarget) -> Result<()> {
        let message = match target {
            DeleteTarget::Hymn { id, label } => {
                delete_hymn(&self.conn, *id)?;
                format!("Deleted hymn {label}.")
            }
            DeleteTarget::Praise { id, label } => {
                delete_praise(&self.conn, *id)?;
                format!("Deleted praise {label}.")
            }
            DeleteTarget::Verse { id, label } => {
                delete_verse(&self.conn, *id)?;
                format!("Deleted verse {label}.")
            }
            DeleteTarget::Service { id, label } => {
                delete_service(&self.conn, *id)?;
                self.reload_saved_services()?;
                format!("Deleted saved service {label}.")
            }
        };
        log::info!("{message}");
        self.set_status(message, StatusKind::Info);
        self.library.refresh(&self.conn, &self.recent)
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match &self.screen {
            Screen::Console => self.draw_console(frame, content_area),
            Screen::SavedServices(saved) => self.draw_saved_services(frame, content_area, saved),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Editing(form) => self.draw_form(frame, area, form),
            Mode::ChoosingBackground(prompt) => self.draw_background_prompt(frame, area, prompt),
            Mode::ConfirmDelete(target) => self.draw_confirm(frame, area, &target.prompt()),
            Mode::ConfirmClearHistory => {
                self.draw_confirm(frame, area, "Clear the service history?")
            }
            Mode::Alert(alert) => self.draw_alert(frame, area, alert),
            Mode::Normal | Mode::Searching(_) | Mode::LookingUpVerse(_) => {}
        }
    }

    fn draw_console(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(32),
                Constraint::Percentage(43),
                Constraint::Percentage(25),
            ])
            .split(area);

        self.draw_library(frame, columns[0]);
        self.draw_preview(frame, columns[1]);
        self.draw_functions(frame, columns[2]);
    }

    fn draw_library(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
            ])
            .split(area);

        let titles: Vec<Line> = LibraryTab::ALL
            .iter()
            .map(|tab| Line::from(tab.title()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.library.tab.index())
            .block(Block::default().borders(Borders::ALL).title("Library"))
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, chunks[0]);

        let (query, searching) = match &self.mode {
            Mode::Searching(query) => (query.as_str(), true),
            _ => (self.library.filter().unwrap_or_default(), false),
        };
        let search_block = Block::default()
            .borders(Borders::ALL)
            .title("Search [/]")
            .border_style(active_border(searching));
        let search_inner = search_block.inner(chunks[1]);
        frame.render_widget(Paragraph::new(query.to_string()).block(search_block), chunks[1]);
        if searching {
            frame.set_cursor_position((
                search_inner.x + query.chars().count() as u16,
                search_inner.y,
            ));
        }

        let (labels, selected) = self.library.rows();
        let title = format!("{} ({})", self.library.tab.title(), labels.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(active_border(self.focus == Focus::Library));

        if labels.is_empty() {
            let message = if self.library.filter().is_some() {
                "Nothing matches the current search."
            } else if self.library.tab == LibraryTab::Verses {
                "No recent verses. Press v to look one up."
            } else {
                "Nothing here yet. Press + to add."
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(paragraph, chunks[2]);
            return;
        }

        let items: Vec<ListItem> = labels.into_iter().map(ListItem::new).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(selected));
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    fn draw_preview(&self, frame: &mut Frame, area: Rect) {
        let title = match self.deck.title() {
            Some(title) => format!("Preview - {title}"),
            None => "Preview".to_string(),
        };
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let slide = Paragraph::new(
            self.deck
                .current()
                .unwrap_or("Select a hymn, praise or verse and press Enter.")
                .to_string(),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(slide, chunks[0]);

        let enabled = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
        let disabled = Style::default().fg(Color::DarkGray);
        let nav = Line::from(vec![
            Span::styled(
                "[<] previous",
                if self.deck.has_previous() { enabled } else { disabled },
            ),
            Span::raw(format!("   {}   ", self.deck.counter())),
            Span::styled(
                "next [>]",
                if self.deck.has_next() { enabled } else { disabled },
            ),
        ]);
        frame.render_widget(Paragraph::new(nav).alignment(Alignment::Center), chunks[1]);

        let (label, color) = if self.projector.is_none() {
            ("DISABLED", Color::Red)
        } else if self.projection.is_black_screen() {
            ("HIDDEN", Color::Yellow)
        } else {
            ("PROJECTING", Color::Green)
        };
        let mut status = vec![
            Span::raw("Projector: "),
            Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ];
        if self.deck.is_held() {
            status.push(Span::styled(
                "  HOLD",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(status)), chunks[2]);

        let background = format!("Background: {}", self.projection.background().label());
        frame.render_widget(Paragraph::new(background), chunks[3]);
    }

    fn draw_functions(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(area);

        let (input, version_index, active) = match &self.mode {
            Mode::LookingUpVerse(lookup) => (lookup.input.as_str(), lookup.version_index, true),
            _ => ("", self.version_index, false),
        };
        let version = self
            .config
            .bible_versions
            .get(version_index)
            .map(String::as_str)
            .unwrap_or(DEFAULT_BIBLE_VERSION);
        let lookup_block = Block::default()
            .borders(Borders::ALL)
            .title("Verse lookup [v]")
            .border_style(active_border(active));
        let lookup_inner = lookup_block.inner(chunks[0]);
        let lines = vec![
            Line::from(format!("Ref: {input}")),
            Line::from(vec![
                Span::raw("Version: "),
                Span::styled(version.to_string(), Style::default().fg(Color::Yellow)),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines).block(lookup_block), chunks[0]);
        if active {
            frame.set_cursor_position((
                lookup_inner.x + "Ref: ".len() as u16 + input.chars().count() as u16,
                lookup_inner.y,
            ));
        }

        let history_block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Service history - {} [t]", self.service_type_name()))
            .border_style(active_border(self.focus == Focus::History));
        if self.history.is_empty() {
            let paragraph = Paragraph::new("Nothing played yet.")
                .alignment(Alignment::Center)
                .block(history_block);
            frame.render_widget(paragraph, chunks[1]);
        } else {
            let items: Vec<ListItem> = self
                .history
                .display_lines()
                .into_iter()
                .map(ListItem::new)
                .collect();
            let list = List::new(items)
                .block(history_block)
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
            let mut state = ListState::default().with_selected(Some(self.history_selected));
            frame.render_stateful_widget(list, chunks[1], &mut state);
        }

        let selected = self
            .background_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "none".to_string());
        let background = Paragraph::new(selected)
            .block(Block::default().borders(Borders::ALL).title("Background [b]"));
        frame.render_widget(background, chunks[2]);
    }

    fn draw_saved_services(&self, frame: &mut Frame, area: Rect, saved: &SavedServicesScreen) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(area);

        let block = Block::default().borders(Borders::ALL).title("Saved services");
        if saved.records.is_empty() {
            let message = Paragraph::new("No saved services yet. Press s on the console to save one.")
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = saved
            .records
            .items
            .iter()
            .map(|record| {
                ListItem::new(format!(
                    "{} - {} ({})",
                    record.date,
                    record.service_type,
                    record.items.len()
                ))
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");
        let mut state = ListState::default().with_selected(Some(saved.records.selected));
        frame.render_stateful_widget(list, columns[0], &mut state);

        let lines: Vec<Line> = saved
            .records
            .current()
            .map(|record| {
                record
                    .items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| Line::from(format!("{}. {item}", idx + 1)))
                    .collect()
            })
            .unwrap_or_default();
        let detail = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Items"));
        frame.render_widget(detail, columns[1]);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(21)])
            .split(inner);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, chunks[0]);

        let clock = Local::now().format("%H:%M:%S %d/%m/%Y").to_string();
        frame.render_widget(
            Paragraph::new(clock)
                .alignment(Alignment::Right)
                .style(Style::default().fg(Color::Gray)),
            chunks[1],
        );
    }

    fn footer_instructions(&self) -> Line<'static> {
        let hints: &[(&str, &str)] = match (&self.screen, &self.mode) {
            (_, Mode::Searching(_)) => &[
                ("type", "Filter"),
                ("Enter", "Keep"),
                ("Esc", "Clear"),
            ],
            (_, Mode::LookingUpVerse(_)) => &[
                ("Enter", "Look up"),
                ("Tab", "Version"),
                ("Esc", "Cancel"),
            ],
            (_, Mode::Editing(_)) => &[
                ("Tab", "Next field"),
                ("Enter", "Newline / next"),
                ("Ctrl+S", "Save"),
                ("Esc", "Cancel"),
            ],
            (_, Mode::ChoosingBackground(_)) => &[("Enter", "Select"), ("Esc", "Cancel")],
            (_, Mode::ConfirmDelete(_)) | (_, Mode::ConfirmClearHistory) => {
                &[("Y", "Confirm"), ("N", "Cancel")]
            }
            (_, Mode::Alert(_)) => &[("Enter", "Close")],
            (Screen::SavedServices(_), Mode::Normal) => &[
                ("Up/Down", "Navigate"),
                ("-", "Delete"),
                ("Esc", "Back"),
                ("q", "Quit"),
            ],
            (Screen::Console, Mode::Normal) => &[
                ("Enter", "Project"),
                ("Left/Right", "Slide"),
                ("Ctrl+Arrows", "Preview"),
                ("F9", "Show/Hide"),
                ("F10", "Black"),
                ("1-3", "Tab"),
                ("/", "Search"),
                ("v", "Verse"),
                ("h", "History"),
                ("+/e/-", "Edit"),
                ("b/F8/B", "Background"),
                ("x/s/c", "Export/Save/Clear"),
                ("S", "Saved"),
                ("q", "Quit"),
            ],
        };

        let spans: Vec<Span<'static>> = hints
            .iter()
            .flat_map(|(key, label)| key_hint(key, label))
            .collect();
        Line::from(spans)
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect, form: &ContentForm) {
        let popup_area = centered_rect(70, 70, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let fields = form.lines();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(fields.len() as u16),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(inner);

        frame.render_widget(Paragraph::new(fields), chunks[0]);

        let body = Paragraph::new(form.body().to_string())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(active_border(form.editing_body())),
            );
        frame.render_widget(body, chunks[1]);

        let footer = match form.error() {
            Some(error) => Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(Span::styled(
                "Ctrl+S to save - Tab to switch - Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        };
        frame.render_widget(Paragraph::new(footer), chunks[2]);
    }

    fn draw_background_prompt(&self, frame: &mut Frame, area: Rect, prompt: &PathPrompt) {
        let popup_area = centered_rect(60, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Choose Background")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![Line::from(format!("Path: {}", prompt.input)), Line::from("")];
        if let Some(error) = &prompt.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to select (empty clears) - Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }
        frame.render_widget(Paragraph::new(lines), inner);

        let cursor_x = inner.x + "Path: ".len() as u16 + prompt.input.chars().count() as u16;
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y));
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, prompt: &str) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Confirm").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(prompt.to_string()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_alert(&self, frame: &mut Frame, area: Rect, alert: &Alert) {
        let popup_area = centered_rect(60, 35, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(alert.title.clone())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(alert.color()));
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(alert.message.clone()),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to close.",
                Style::default().fg(Color::Gray),
            )),
        ];
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), inner);
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }
}

fn active_border(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}
