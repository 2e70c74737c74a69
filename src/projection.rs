//! State of the projection surface, independent of how it gets drawn.
//!
//! The projector starts on a black screen. Showing content remembers it so a
//! black-screen toggle can restore exactly what was on screen before.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Image extensions accepted as backgrounds.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProjectionError {
    #[error("background image {0} does not exist")]
    MissingImage(PathBuf),
    #[error("{0} is not a supported image (png, jpg, jpeg, bmp)")]
    UnsupportedImage(PathBuf),
}

/// What the projector paints behind the lyrics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Background {
    #[default]
    Black,
    Image(PathBuf),
}

impl Background {
    /// Short label for status lines, the file name for images.
    pub fn label(&self) -> String {
        match self {
            Background::Black => "black".to_string(),
            Background::Image(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

/// Snapshot handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionView<'a> {
    /// `None` while the black screen is active.
    pub content: Option<&'a str>,
    pub reference: Option<&'a str>,
    pub background: &'a Background,
}

#[derive(Debug, Clone)]
pub struct Projection {
    last_content: String,
    last_reference: Option<String>,
    black_screen: bool,
    background: Background,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            last_content: String::new(),
            last_reference: None,
            black_screen: true,
            background: Background::Black,
        }
    }
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `content` on screen. A blank reference hides the reference line.
    pub fn show(&mut self, content: &str, reference: Option<&str>) {
        self.last_content = content.to_string();
        self.last_reference = reference
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        self.black_screen = false;
    }

    pub fn black_screen(&mut self) {
        self.black_screen = true;
    }

    /// Flip between the last content and the black screen. Returns the new
    /// black-screen flag.
    pub fn toggle(&mut self) -> bool {
        self.black_screen = !self.black_screen;
        self.black_screen
    }

    pub fn is_black_screen(&self) -> bool {
        self.black_screen
    }

    pub fn apply_background(&mut self, path: &Path) -> Result<(), ProjectionError> {
        if !path.exists() {
            return Err(ProjectionError::MissingImage(path.to_path_buf()));
        }
        if !is_image(path) {
            return Err(ProjectionError::UnsupportedImage(path.to_path_buf()));
        }
        self.background = Background::Image(path.to_path_buf());
        Ok(())
    }

    pub fn remove_background(&mut self) {
        self.background = Background::Black;
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Forget the last content and go black.
    pub fn clear(&mut self) {
        self.last_content.clear();
        self.last_reference = None;
        self.black_screen = true;
    }

    pub fn view(&self) -> ProjectionView<'_> {
        if self.black_screen {
            ProjectionView {
                content: None,
                reference: None,
                background: &self.background,
            }
        } else {
            ProjectionView {
                content: Some(&self.last_content),
                reference: self.last_reference.as_deref(),
                background: &self.background,
            }
        }
    }
}

/// Whether the path carries one of the accepted image extensions.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn starts_black() {
        let projection = Projection::new();
        assert!(projection.is_black_screen());
        assert_eq!(projection.view().content, None);
    }

    #[test]
    fn toggle_restores_last_content() {
        let mut projection = Projection::new();
        projection.show("Tudo posso", Some("Filipenses 4:13"));
        assert!(projection.toggle());
        assert_eq!(projection.view().content, None);
        assert!(!projection.toggle());
        let view = projection.view();
        assert_eq!(view.content, Some("Tudo posso"));
        assert_eq!(view.reference, Some("Filipenses 4:13"));
    }

    #[test]
    fn blank_reference_is_hidden() {
        let mut projection = Projection::new();
        projection.show("Porque Ele vive", Some("  "));
        assert_eq!(projection.view().reference, None);
        projection.show("Porque Ele vive", None);
        assert_eq!(projection.view().reference, None);
    }

    #[test]
    fn clear_drops_content() {
        let mut projection = Projection::new();
        projection.show("a", Some("b"));
        projection.clear();
        assert!(projection.is_black_screen());
        projection.toggle();
        assert_eq!(projection.view().content, Some(""));
        assert_eq!(projection.view().reference, None);
    }

    #[test]
    fn background_requires_existing_image() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("Cruz.JPG");
        let text = dir.path().join("notes.txt");
        fs::write(&image, b"jpg").unwrap();
        fs::write(&text, b"txt").unwrap();

        let mut projection = Projection::new();
        assert_eq!(
            projection.apply_background(&dir.path().join("missing.png")),
            Err(ProjectionError::MissingImage(dir.path().join("missing.png")))
        );
        assert!(matches!(
            projection.apply_background(&text),
            Err(ProjectionError::UnsupportedImage(_))
        ));
        projection.apply_background(&image).unwrap();
        assert_eq!(projection.background().label(), "Cruz.JPG");
        projection.remove_background();
        assert_eq!(projection.background(), &Background::Black);
    }
}
