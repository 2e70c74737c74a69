use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    ModifierKeyCode, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use super::app::App;

/// Spin up the terminal backend, enter the draw loop, and keep processing input
/// until the user quits.
pub fn run_app(app: &mut App) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

    // Release events for Ctrl only arrive with the kitty keyboard protocol.
    let enhanced = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS
            )
        )
        .context("failed to enable keyboard enhancement")?;
    }
    log::debug!("keyboard enhancement: {enhanced}");

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;

    let result = event_loop(&mut terminal, app);

    cleanup_terminal(&mut terminal, enhanced)?;
    app.close_projector()?;
    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        if !event::poll(Duration::from_millis(250)).context("event polling failed")? {
            continue;
        }
        let Event::Key(key_event) = event::read().context("failed to read event")? else {
            continue;
        };
        if dispatch_key(app, key_event)? {
            return Ok(());
        }
    }
}

/// Route one key event. Returns `true` when the app asked to quit.
fn dispatch_key(app: &mut App, key_event: KeyEvent) -> Result<bool> {
    if let KeyCode::Modifier(ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl) =
        key_event.code
    {
        match key_event.kind {
            KeyEventKind::Press => app.modifier_pressed(),
            KeyEventKind::Release => app.modifier_released(),
            KeyEventKind::Repeat => {}
        }
        return Ok(false);
    }

    match key_event.kind {
        KeyEventKind::Press => {}
        KeyEventKind::Repeat if repeats(key_event.code) => {}
        _ => return Ok(false),
    }

    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    // Without release events, the first key pressed without Ctrl ends the hold.
    if !ctrl && app.is_holding() {
        app.modifier_released();
    }

    if ctrl {
        match key_event.code {
            KeyCode::Left | KeyCode::Right => {
                app.handle_ctrl_navigation(key_event.code);
                return Ok(false);
            }
            KeyCode::Char('s') => {
                app.handle_ctrl_s();
                return Ok(false);
            }
            KeyCode::Char('c') => return Ok(true),
            _ => {}
        }
    }

    if key_event.modifiers.contains(KeyModifiers::SHIFT) && key_event.code == KeyCode::F(8) {
        app.handle_shift_f8();
        return Ok(false);
    }

    app.handle_key(shifted(key_event.code, key_event.modifiers))
}

/// Keys that keep acting while held down.
fn repeats(code: KeyCode) -> bool {
    matches!(
        code,
        KeyCode::Left
            | KeyCode::Right
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::PageUp
            | KeyCode::PageDown
            | KeyCode::Backspace
    )
}

/// Terminals that do not send the shifted codepoint report the base key plus
/// SHIFT. Recover the character a US layout would produce.
fn shifted(code: KeyCode, modifiers: KeyModifiers) -> KeyCode {
    let KeyCode::Char(ch) = code else {
        return code;
    };
    if !modifiers.contains(KeyModifiers::SHIFT) {
        return code;
    }
    let upper = match ch {
        'a'..='z' => ch.to_ascii_uppercase(),
        '1' => '!',
        '2' => '@',
        '3' => '#',
        '4' => '$',
        '5' => '%',
        '6' => '^',
        '7' => '&',
        '8' => '*',
        '9' => '(',
        '0' => ')',
        '-' => '_',
        '=' => '+',
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        ';' => ':',
        '\'' => '"',
        ',' => '<',
        '.' => '>',
        '/' => '?',
        '`' => '~',
        _ => ch,
    };
    KeyCode::Char(upper)
}

fn cleanup_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    enhanced: bool,
) -> Result<()> {
    if enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
            .context("failed to restore keyboard flags")?;
    }
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use rusqlite::Connection;

    use super::*;
    use crate::config::AppConfig;
    use crate::db::{open_in_memory, seed_if_empty};
    use crate::ui::projector::ProjectorSetup;

    fn app() -> App {
        let mut conn: Connection = open_in_memory().unwrap();
        seed_if_empty(&mut conn).unwrap();
        let mut app = App::new(conn, AppConfig::default(), ProjectorSetup::NotConfigured).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        app
    }

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..30)
            .map(|y| {
                (0..140)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn shift_recovers_uppercase_and_symbols() {
        assert_eq!(shifted(KeyCode::Char('s'), KeyModifiers::SHIFT), KeyCode::Char('S'));
        assert_eq!(shifted(KeyCode::Char('S'), KeyModifiers::SHIFT), KeyCode::Char('S'));
        assert_eq!(shifted(KeyCode::Char('='), KeyModifiers::SHIFT), KeyCode::Char('+'));
        assert_eq!(shifted(KeyCode::Char(';'), KeyModifiers::SHIFT), KeyCode::Char(':'));
        assert_eq!(shifted(KeyCode::Char('+'), KeyModifiers::SHIFT), KeyCode::Char('+'));
        assert_eq!(shifted(KeyCode::Char('s'), KeyModifiers::NONE), KeyCode::Char('s'));
        assert_eq!(shifted(KeyCode::Left, KeyModifiers::SHIFT), KeyCode::Left);
    }

    #[test]
    fn shifted_letter_opens_saved_services() {
        for ch in ['s', 'S'] {
            let mut app = app();
            dispatch_key(&mut app, press(KeyCode::Char(ch), KeyModifiers::SHIFT)).unwrap();
            assert!(screen_text(&app).contains("Saved services"));
        }
    }

    #[test]
    fn shifted_equals_opens_add_form() {
        let mut app = app();
        dispatch_key(&mut app, press(KeyCode::Char('='), KeyModifiers::SHIFT)).unwrap();
        assert!(screen_text(&app).contains("Add Hymn"));
    }

    #[test]
    fn shifted_colon_reaches_verse_lookup() {
        let mut app = app();
        dispatch_key(&mut app, press(KeyCode::Char('v'), KeyModifiers::NONE)).unwrap();
        for ch in "joão 3".chars() {
            dispatch_key(&mut app, press(KeyCode::Char(ch), KeyModifiers::NONE)).unwrap();
        }
        dispatch_key(&mut app, press(KeyCode::Char(';'), KeyModifiers::SHIFT)).unwrap();
        dispatch_key(&mut app, press(KeyCode::Char('1'), KeyModifiers::NONE)).unwrap();
        dispatch_key(&mut app, press(KeyCode::Char('6'), KeyModifiers::NONE)).unwrap();
        assert!(screen_text(&app).contains("Ref: joão 3:16"));

        dispatch_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE)).unwrap();
        assert!(screen_text(&app).contains("Preview - João 3:16 (ARC)"));
    }

    #[test]
    fn shift_f8_reports_disabled_projection() {
        let mut app = app();
        dispatch_key(&mut app, press(KeyCode::F(8), KeyModifiers::SHIFT)).unwrap();
        assert!(screen_text(&app).contains("Projection is disabled"));
    }

    #[test]
    fn held_arrow_keeps_advancing() {
        let mut app = app();
        dispatch_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE)).unwrap();
        let repeat = KeyEvent::new_with_kind(KeyCode::Right, KeyModifiers::NONE, KeyEventKind::Repeat);
        dispatch_key(&mut app, repeat).unwrap();
        assert!(screen_text(&app).contains("2 / 3"));

        let repeat_q =
            KeyEvent::new_with_kind(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Repeat);
        assert!(!dispatch_key(&mut app, repeat_q).unwrap());
    }

    #[test]
    fn ctrl_arrow_holds_until_plain_key() {
        let mut app = app();
        dispatch_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE)).unwrap();
        dispatch_key(&mut app, press(KeyCode::Right, KeyModifiers::CONTROL)).unwrap();
        assert!(app.is_holding());

        dispatch_key(&mut app, press(KeyCode::Down, KeyModifiers::NONE)).unwrap();
        assert!(!app.is_holding());
    }

    #[test]
    fn modifier_release_ends_hold() {
        let mut app = app();
        dispatch_key(&mut app, press(KeyCode::Enter, KeyModifiers::NONE)).unwrap();
        let ctrl = KeyCode::Modifier(ModifierKeyCode::LeftControl);
        dispatch_key(&mut app, press(ctrl, KeyModifiers::CONTROL)).unwrap();
        assert!(app.is_holding());

        let release = KeyEvent::new_with_kind(ctrl, KeyModifiers::NONE, KeyEventKind::Release);
        dispatch_key(&mut app, release).unwrap();
        assert!(!app.is_holding());
    }

    #[test]
    fn release_events_for_other_keys_are_ignored() {
        let mut app = app();
        let release =
            KeyEvent::new_with_kind(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Release);
        assert!(!dispatch_key(&mut app, release).unwrap());
        assert!(dispatch_key(&mut app, press(KeyCode::Char('q'), KeyModifiers::NONE)).unwrap());
    }
}
