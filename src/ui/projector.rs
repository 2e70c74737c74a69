//! The projection surface: a second terminal that only ever receives output.
//!
//! Nothing reads keys from the projector terminal, so the audience side has no
//! way to close or interact with it. The control console owns its lifetime.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::{Frame, Terminal, TerminalOptions, Viewport};

use crate::projection::{Background, Projection, ProjectionView};

use super::helpers::{pattern_lines, wrapped_height, BACKGROUND_ART};

/// Outcome of trying to attach the projector at startup.
pub enum ProjectorSetup {
    Ready(Projector),
    NotConfigured,
    Failed(anyhow::Error),
}

impl ProjectorSetup {
    pub fn open(output: Option<&Path>, columns: u16, rows: u16) -> Self {
        match output {
            None => ProjectorSetup::NotConfigured,
            Some(output) => match Projector::open(output, columns, rows) {
                Ok(projector) => ProjectorSetup::Ready(projector),
                Err(err) => ProjectorSetup::Failed(err),
            },
        }
    }
}

pub struct Projector {
    terminal: Terminal<CrosstermBackend<File>>,
    output: PathBuf,
    closed: bool,
}

impl Projector {
    /// Take over the terminal device at `output` with a fixed `columns` x
    /// `rows` viewport. The device size cannot be queried through a
    /// write-only handle, so it comes from configuration.
    pub fn open(output: &Path, columns: u16, rows: u16) -> Result<Self> {
        if columns == 0 || rows == 0 {
            return Err(anyhow!("projector size must be at least 1x1"));
        }

        let mut file = OpenOptions::new()
            .write(true)
            .open(output)
            .with_context(|| format!("failed to open projector output {}", output.display()))?;
        execute!(file, EnterAlternateScreen, Hide, Clear(ClearType::All))
            .context("failed to prepare projector screen")?;

        let terminal = Terminal::with_options(
            CrosstermBackend::new(file),
            TerminalOptions {
                viewport: Viewport::Fixed(Rect::new(0, 0, columns, rows)),
            },
        )
        .context("failed to create projector terminal")?;

        log::info!(
            "projector opened on {} ({columns}x{rows})",
            output.display()
        );
        Ok(Self {
            terminal,
            output: output.to_path_buf(),
            closed: false,
        })
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn render(&mut self, projection: &Projection) -> Result<()> {
        let view = projection.view();
        self.terminal
            .draw(|frame| draw_projection(frame, &view))
            .context("failed to draw projector frame")?;
        Ok(())
    }

    /// Hand the device back in the state it was found.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        execute!(self.terminal.backend_mut(), Show, LeaveAlternateScreen)
            .context("failed to restore projector terminal")?;
        log::info!("projector on {} closed", self.output.display());
        Ok(())
    }
}

impl Drop for Projector {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::warn!("{err:#}");
        }
    }
}

/// Paint one projector frame: background first, then the centered content,
/// then the reference on the last row.
pub(crate) fn draw_projection(frame: &mut Frame, view: &ProjectionView) {
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(Color::Black)),
        area,
    );

    if let Background::Image(_) = view.background {
        frame.render_widget(
            Paragraph::new(pattern_lines(&BACKGROUND_ART, area.width, area.height))
                .style(Style::default().bg(Color::Black)),
            area,
        );
    }

    let Some(content) = view.content else {
        return;
    };

    let reserved = if view.reference.is_some() && area.height > 2 { 2 } else { 0 };
    let text_area = Rect {
        x: area.x + 1u16.min(area.width / 2),
        y: area.y,
        width: area.width.saturating_sub(2).max(1),
        height: area.height.saturating_sub(reserved),
    };

    let text_height = wrapped_height(content, text_area.width).min(text_area.height);
    let top = text_area.y + (text_area.height - text_height) / 2;
    frame.render_widget(
        Paragraph::new(content.to_string())
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Black)
                    .add_modifier(Modifier::BOLD),
            ),
        Rect {
            y: top,
            height: text_height,
            ..text_area
        },
    );

    if let Some(reference) = view.reference {
        if reserved > 0 {
            frame.render_widget(
                Paragraph::new(reference.to_string())
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Yellow).bg(Color::Black)),
                Rect {
                    x: area.x,
                    y: area.y + area.height - 1,
                    width: area.width,
                    height: 1,
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;

    use super::*;

    fn render(projection: &Projection, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let view = projection.view();
        terminal
            .draw(|frame| draw_projection(frame, &view))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buffer[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn black_screen_is_empty() {
        let rows = render(&Projection::new(), 20, 5);
        assert!(rows.iter().all(|row| row.trim().is_empty()));
    }

    #[test]
    fn content_is_centered_with_reference_at_bottom() {
        let mut projection = Projection::new();
        projection.show("Tudo posso", Some("Fp 4:13"));
        let rows = render(&projection, 20, 7);
        let content_row = rows
            .iter()
            .position(|row| row.contains("Tudo posso"))
            .unwrap();
        assert_eq!(content_row, 2);
        assert_eq!(rows[6].trim(), "Fp 4:13");
    }

    #[test]
    fn image_background_draws_texture() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("fundo.png");
        std::fs::write(&image, b"png").unwrap();

        let mut projection = Projection::new();
        projection.apply_background(&image).unwrap();
        let rows = render(&projection, 12, 3);
        assert!(rows[0].contains('*'));
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(Projector::open(Path::new("/dev/null"), 0, 10).is_err());
    }

    #[test]
    fn setup_reports_missing_and_broken_outputs() {
        assert!(matches!(
            ProjectorSetup::open(None, 80, 24),
            ProjectorSetup::NotConfigured
        ));
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("no-such-tty");
        assert!(matches!(
            ProjectorSetup::open(Some(&missing), 80, 24),
            ProjectorSetup::Failed(_)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn renders_into_a_writable_device() {
        let mut projector = Projector::open(Path::new("/dev/null"), 40, 10).unwrap();
        let mut projection = Projection::new();
        projection.show("Tudo posso", None);
        projector.render(&projection).unwrap();
        projector.close().unwrap();
        projector.close().unwrap();
    }
}
