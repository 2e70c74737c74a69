use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Hymn, Praise, Verse, DEFAULT_BIBLE_VERSION, DEFAULT_HYMN_KIND};

/// How a form field accepts input.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Input {
    Text,
    Digits,
    /// `Enter` inserts a newline instead of moving focus.
    Multiline,
}

fn push_to(value: &mut String, input: Input, ch: char) -> bool {
    match input {
        Input::Digits if !ch.is_ascii_digit() => false,
        _ if ch.is_control() => false,
        _ => {
            value.push(ch);
            true
        }
    }
}

/// Render a single `name: value` line, highlighting the focused field.
fn field_line(name: &str, value: &str, active: bool, required: bool) -> Line<'static> {
    let display = if value.is_empty() {
        let placeholder = if required { "<required>" } else { "<optional>" };
        placeholder.to_string()
    } else if value.contains('\n') {
        format!("{} lines", value.lines().count())
    } else {
        value.to_string()
    };

    let style = if active {
        Style::default().fg(Color::Yellow)
    } else if value.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    Line::from(vec![Span::raw(format!("{name}: ")), Span::styled(display, style)])
}

fn required(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(anyhow!("{message}"));
    }
    Ok(trimmed.to_string())
}

fn positive(value: &str, name: &str) -> Result<i64> {
    let raw = value.trim();
    if raw.is_empty() {
        return Err(anyhow!("{name} is required."));
    }
    let number = raw
        .parse::<i64>()
        .map_err(|_| anyhow!("{name} must be a number."))?;
    if number <= 0 {
        return Err(anyhow!("{name} must be greater than zero."));
    }
    Ok(number)
}

/// Lyrics keep their inner blank lines, only the outer whitespace goes.
fn lyrics(value: &str) -> String {
    value.replace("\r\n", "\n").trim().to_string()
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum HymnField {
    #[default]
    Number,
    Title,
    Kind,
    Lyrics,
}

impl HymnField {
    fn input(self) -> Input {
        match self {
            HymnField::Number => Input::Digits,
            HymnField::Lyrics => Input::Multiline,
            _ => Input::Text,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct HymnForm {
    /// Set when editing an existing hymn.
    pub(crate) id: Option<i64>,
    pub(crate) number: String,
    pub(crate) title: String,
    pub(crate) kind: String,
    pub(crate) lyrics: String,
    pub(crate) active: HymnField,
    pub(crate) error: Option<String>,
}

impl Default for HymnForm {
    fn default() -> Self {
        Self {
            id: None,
            number: String::new(),
            title: String::new(),
            kind: DEFAULT_HYMN_KIND.to_string(),
            lyrics: String::new(),
            active: HymnField::Number,
            error: None,
        }
    }
}

impl HymnForm {
    pub(crate) fn from_hymn(hymn: &Hymn) -> Self {
        Self {
            id: Some(hymn.id),
            number: hymn.number.clone(),
            title: hymn.title.clone(),
            kind: hymn.kind.clone(),
            lyrics: hymn.lyrics.clone(),
            active: HymnField::Number,
            error: None,
        }
    }

    fn value_mut(&mut self) -> &mut String {
        match self.active {
            HymnField::Number => &mut self.number,
            HymnField::Title => &mut self.title,
            HymnField::Kind => &mut self.kind,
            HymnField::Lyrics => &mut self.lyrics,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            HymnField::Number => HymnField::Title,
            HymnField::Title => HymnField::Kind,
            HymnField::Kind => HymnField::Lyrics,
            HymnField::Lyrics => HymnField::Number,
        };
    }

    pub(crate) fn parse_inputs(&self) -> Result<Hymn> {
        let number = required(&self.number, "Hymn number is required.")?;
        let title = required(&self.title, "Hymn title is required.")?;
        let kind = match self.kind.trim() {
            "" => DEFAULT_HYMN_KIND.to_string(),
            kind => kind.to_string(),
        };
        Ok(Hymn {
            id: self.id.unwrap_or_default(),
            number,
            title,
            lyrics: lyrics(&self.lyrics),
            kind,
        })
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        vec![
            field_line("Number", &self.number, self.active == HymnField::Number, true),
            field_line("Title", &self.title, self.active == HymnField::Title, true),
            field_line("Hymnal", &self.kind, self.active == HymnField::Kind, false),
            field_line("Lyrics", &self.lyrics, self.active == HymnField::Lyrics, false),
        ]
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum PraiseField {
    #[default]
    Title,
    Author,
    Lyrics,
}

impl PraiseField {
    fn input(self) -> Input {
        match self {
            PraiseField::Lyrics => Input::Multiline,
            _ => Input::Text,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct PraiseForm {
    pub(crate) id: Option<i64>,
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) lyrics: String,
    pub(crate) active: PraiseField,
    pub(crate) error: Option<String>,
}

impl PraiseForm {
    pub(crate) fn from_praise(praise: &Praise) -> Self {
        Self {
            id: Some(praise.id),
            title: praise.title.clone(),
            author: praise.author.clone(),
            lyrics: praise.lyrics.clone(),
            active: PraiseField::Title,
            error: None,
        }
    }

    fn value_mut(&mut self) -> &mut String {
        match self.active {
            PraiseField::Title => &mut self.title,
            PraiseField::Author => &mut self.author,
            PraiseField::Lyrics => &mut self.lyrics,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            PraiseField::Title => PraiseField::Author,
            PraiseField::Author => PraiseField::Lyrics,
            PraiseField::Lyrics => PraiseField::Title,
        };
    }

    pub(crate) fn parse_inputs(&self) -> Result<Praise> {
        let title = required(&self.title, "Praise title is required.")?;
        Ok(Praise {
            id: self.id.unwrap_or_default(),
            title,
            author: self.author.trim().to_string(),
            lyrics: lyrics(&self.lyrics),
        })
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        vec![
            field_line("Title", &self.title, self.active == PraiseField::Title, true),
            field_line("Author", &self.author, self.active == PraiseField::Author, false),
            field_line("Lyrics", &self.lyrics, self.active == PraiseField::Lyrics, false),
        ]
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum VerseField {
    #[default]
    Book,
    Chapter,
    Verse,
    Version,
    Text,
}

impl VerseField {
    fn input(self) -> Input {
        match self {
            VerseField::Chapter | VerseField::Verse => Input::Digits,
            VerseField::Text => Input::Multiline,
            _ => Input::Text,
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct VerseForm {
    pub(crate) id: Option<i64>,
    pub(crate) book: String,
    pub(crate) chapter: String,
    pub(crate) verse: String,
    pub(crate) version: String,
    pub(crate) text: String,
    pub(crate) active: VerseField,
    pub(crate) error: Option<String>,
}

impl Default for VerseForm {
    fn default() -> Self {
        Self {
            id: None,
            book: String::new(),
            chapter: String::new(),
            verse: String::new(),
            version: DEFAULT_BIBLE_VERSION.to_string(),
            text: String::new(),
            active: VerseField::Book,
            error: None,
        }
    }
}

impl VerseForm {
    pub(crate) fn from_verse(verse: &Verse) -> Self {
        Self {
            id: Some(verse.id),
            book: verse.book.clone(),
            chapter: verse.chapter.to_string(),
            verse: verse.verse.to_string(),
            version: verse.version.clone(),
            text: verse.text.clone(),
            active: VerseField::Book,
            error: None,
        }
    }

    fn value_mut(&mut self) -> &mut String {
        match self.active {
            VerseField::Book => &mut self.book,
            VerseField::Chapter => &mut self.chapter,
            VerseField::Verse => &mut self.verse,
            VerseField::Version => &mut self.version,
            VerseField::Text => &mut self.text,
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            VerseField::Book => VerseField::Chapter,
            VerseField::Chapter => VerseField::Verse,
            VerseField::Verse => VerseField::Version,
            VerseField::Version => VerseField::Text,
            VerseField::Text => VerseField::Book,
        };
    }

    pub(crate) fn parse_inputs(&self) -> Result<Verse> {
        let book = required(&self.book, "Book is required.")?;
        let chapter = positive(&self.chapter, "Chapter")?;
        let verse = positive(&self.verse, "Verse")?;
        let text = required(&self.text, "Verse text is required.")?;
        let version = match self.version.trim() {
            "" => DEFAULT_BIBLE_VERSION.to_string(),
            version => version.to_uppercase(),
        };
        Ok(Verse {
            id: self.id.unwrap_or_default(),
            book,
            chapter,
            verse,
            text,
            version,
        })
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        vec![
            field_line("Book", &self.book, self.active == VerseField::Book, true),
            field_line("Chapter", &self.chapter, self.active == VerseField::Chapter, true),
            field_line("Verse", &self.verse, self.active == VerseField::Verse, true),
            field_line("Version", &self.version, self.active == VerseField::Version, false),
            field_line("Text", &self.text, self.active == VerseField::Text, true),
        ]
    }
}

/// Add/edit form for whichever library tab was active.
#[derive(Clone, Debug)]
pub(crate) enum ContentForm {
    Hymn(HymnForm),
    Praise(PraiseForm),
    Verse(VerseForm),
}

impl ContentForm {
    pub(crate) fn title(&self) -> &'static str {
        match self {
            ContentForm::Hymn(form) if form.id.is_some() => "Edit Hymn",
            ContentForm::Hymn(_) => "Add Hymn",
            ContentForm::Praise(form) if form.id.is_some() => "Edit Praise",
            ContentForm::Praise(_) => "Add Praise",
            ContentForm::Verse(form) if form.id.is_some() => "Edit Verse",
            ContentForm::Verse(_) => "Add Verse",
        }
    }

    fn active_input(&self) -> Input {
        match self {
            ContentForm::Hymn(form) => form.active.input(),
            ContentForm::Praise(form) => form.active.input(),
            ContentForm::Verse(form) => form.active.input(),
        }
    }

    fn value_mut(&mut self) -> &mut String {
        match self {
            ContentForm::Hymn(form) => form.value_mut(),
            ContentForm::Praise(form) => form.value_mut(),
            ContentForm::Verse(form) => form.value_mut(),
        }
    }

    pub(crate) fn toggle_field(&mut self) {
        match self {
            ContentForm::Hymn(form) => form.toggle_field(),
            ContentForm::Praise(form) => form.toggle_field(),
            ContentForm::Verse(form) => form.toggle_field(),
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let input = self.active_input();
        push_to(self.value_mut(), input, ch)
    }

    pub(crate) fn backspace(&mut self) {
        self.value_mut().pop();
    }

    /// `Enter` inside a multi-line field adds a line break; elsewhere it
    /// moves to the next field.
    pub(crate) fn enter(&mut self) {
        if self.active_input() == Input::Multiline {
            self.value_mut().push('\n');
        } else {
            self.toggle_field();
        }
    }

    pub(crate) fn set_error(&mut self, message: Option<String>) {
        let error = match self {
            ContentForm::Hymn(form) => &mut form.error,
            ContentForm::Praise(form) => &mut form.error,
            ContentForm::Verse(form) => &mut form.error,
        };
        *error = message;
    }

    pub(crate) fn error(&self) -> Option<&str> {
        match self {
            ContentForm::Hymn(form) => form.error.as_deref(),
            ContentForm::Praise(form) => form.error.as_deref(),
            ContentForm::Verse(form) => form.error.as_deref(),
        }
    }

    /// Body of the multi-line field, shown in full below the field list.
    pub(crate) fn body(&self) -> &str {
        match self {
            ContentForm::Hymn(form) => &form.lyrics,
            ContentForm::Praise(form) => &form.lyrics,
            ContentForm::Verse(form) => &form.text,
        }
    }

    pub(crate) fn editing_body(&self) -> bool {
        self.active_input() == Input::Multiline
    }

    pub(crate) fn lines(&self) -> Vec<Line<'static>> {
        match self {
            ContentForm::Hymn(form) => form.lines(),
            ContentForm::Praise(form) => form.lines(),
            ContentForm::Verse(form) => form.lines(),
        }
    }
}

/// Reference typed into the verse lookup panel plus the chosen version.
#[derive(Clone, Debug, Default)]
pub(crate) struct VerseLookup {
    pub(crate) input: String,
    pub(crate) version_index: usize,
}

impl VerseLookup {
    pub(crate) fn with_version(version_index: usize) -> Self {
        Self {
            version_index,
            ..Self::default()
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        push_to(&mut self.input, Input::Text, ch)
    }

    pub(crate) fn backspace(&mut self) {
        self.input.pop();
    }

    pub(crate) fn cycle_version(&mut self, count: usize) {
        if count > 0 {
            self.version_index = (self.version_index + 1) % count;
        }
    }
}

/// Single-line path entry used when choosing a background image.
#[derive(Clone, Debug, Default)]
pub(crate) struct PathPrompt {
    pub(crate) input: String,
    pub(crate) error: Option<String>,
}

impl PathPrompt {
    pub(crate) fn with_value(value: &str) -> Self {
        Self {
            input: value.to_string(),
            error: None,
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        push_to(&mut self.input, Input::Text, ch)
    }

    pub(crate) fn backspace(&mut self) {
        self.input.pop();
    }
}

/// Row awaiting a delete confirmation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DeleteTarget {
    Hymn { id: i64, label: String },
    Praise { id: i64, label: String },
    Verse { id: i64, label: String },
    Service { id: i64, label: String },
}

impl DeleteTarget {
    pub(crate) fn prompt(&self) -> String {
        match self {
            DeleteTarget::Hymn { label, .. } => format!("Delete hymn {label}?"),
            DeleteTarget::Praise { label, .. } => format!("Delete praise {label}?"),
            DeleteTarget::Verse { label, .. } => format!("Delete verse {label}?"),
            DeleteTarget::Service { label, .. } => format!("Delete saved service {label}?"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum AlertKind {
    Info,
    Warning,
    Error,
}

/// Modal message dismissed with Enter or Esc.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Alert {
    pub(crate) title: String,
    pub(crate) message: String,
    pub(crate) kind: AlertKind,
}

impl Alert {
    pub(crate) fn info(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
            kind: AlertKind::Info,
        }
    }

    pub(crate) fn warning(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
            kind: AlertKind::Warning,
        }
    }

    pub(crate) fn error(title: &str, message: impl Into<String>) -> Self {
        Self {
            title: title.to_string(),
            message: message.into(),
            kind: AlertKind::Error,
        }
    }

    pub(crate) fn color(&self) -> Color {
        match self.kind {
            AlertKind::Info => Color::Cyan,
            AlertKind::Warning => Color::Yellow,
            AlertKind::Error => Color::Red,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(form: &mut ContentForm, text: &str) {
        for ch in text.chars() {
            if ch == '\n' {
                form.enter();
            } else {
                form.push_char(ch);
            }
        }
    }

    #[test]
    fn hymn_form_requires_number_and_title() {
        let mut form = ContentForm::Hymn(HymnForm::default());
        let ContentForm::Hymn(hymn) = &form else { unreachable!() };
        let err = hymn.parse_inputs().unwrap_err();
        assert_eq!(err.to_string(), "Hymn number is required.");

        type_text(&mut form, "1x5\n");
        type_text(&mut form, "Porque Ele vive\n");
        let ContentForm::Hymn(hymn) = &form else { unreachable!() };
        let parsed = hymn.parse_inputs().unwrap();
        assert_eq!(parsed.number, "15");
        assert_eq!(parsed.title, "Porque Ele vive");
        assert_eq!(parsed.kind, DEFAULT_HYMN_KIND);
        assert_eq!(parsed.lyrics, "");
    }

    #[test]
    fn lyrics_field_takes_newlines() {
        let mut form = ContentForm::Praise(PraiseForm::default());
        type_text(&mut form, "Oceanos\n\n");
        assert!(matches!(&form, ContentForm::Praise(p) if p.active == PraiseField::Lyrics));
        type_text(&mut form, "Tu me chamas\n\nE ali\n");
        let ContentForm::Praise(praise) = &form else { unreachable!() };
        let parsed = praise.parse_inputs().unwrap();
        assert_eq!(parsed.lyrics, "Tu me chamas\n\nE ali");
        assert_eq!(parsed.author, "");
    }

    #[test]
    fn verse_form_validates_numbers() {
        let mut form = VerseForm {
            book: "Salmos".into(),
            chapter: "0".into(),
            verse: "1".into(),
            text: "O Senhor é o meu pastor".into(),
            version: "nvi".into(),
            ..VerseForm::default()
        };
        assert_eq!(
            form.parse_inputs().unwrap_err().to_string(),
            "Chapter must be greater than zero."
        );
        form.chapter = "23".into();
        let verse = form.parse_inputs().unwrap();
        assert_eq!(verse.reference(), "Salmos 23:1");
        assert_eq!(verse.version, "NVI");
    }

    #[test]
    fn edit_forms_keep_ids() {
        let praise = Praise {
            id: 9,
            title: "Oceanos".into(),
            author: "Hillsong".into(),
            lyrics: "a\n\nb".into(),
        };
        let form = ContentForm::Praise(PraiseForm::from_praise(&praise));
        assert_eq!(form.title(), "Edit Praise");
        let ContentForm::Praise(inner) = &form else { unreachable!() };
        assert_eq!(inner.parse_inputs().unwrap(), praise);
    }

    #[test]
    fn lookup_cycles_versions() {
        let mut lookup = VerseLookup::with_version(3);
        lookup.cycle_version(4);
        assert_eq!(lookup.version_index, 0);
        lookup.push_char('j');
        lookup.push_char('\t');
        assert_eq!(lookup.input, "j");
    }

    #[test]
    fn delete_prompts_name_the_row() {
        let target = DeleteTarget::Hymn {
            id: 1,
            label: "15 - Porque Ele vive".into(),
        };
        assert_eq!(target.prompt(), "Delete hymn 15 - Porque Ele vive?");
    }
}
