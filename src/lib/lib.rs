//! The retrospective library renders a personal year-in-review as a single static HTML page.
//!
//! The page is a sequence of thematic sections loaded from a TOML content file. Each section
//! carries two renderings of the same story: full paragraphs for the detail view and short
//! icon/text bullets for the simple view. Texts use a tiny inline markup: `**bold**` and
//! `{{highlight}}`. Every section owns an illustration slot that starts with a built-in
//! placeholder and can be replaced by an uploaded file or an AI-generated image.
//!
//! Basic usage renders the built-in content to a file:
//! ```rust
//! use retrospective;
//! use retrospective::config::ConfigSource;
//! use std::error::Error;
//!
//! fn example() -> Result<(), Box<dyn Error>> {
//!     retrospective::render_page_to_file(ConfigSource::Default, "index.html", None, true)?;
//!     Ok(())
//! }
//! ```
//!
//! For more control, build a [`page::Page`] and drive its image slots before rendering:
//! ```rust
//! use retrospective::config::{load_content_from_source, ConfigSource};
//! use retrospective::page::Page;
//! use retrospective::section::DisplayMode;
//! use std::error::Error;
//!
//! fn example_with_upload() -> Result<(), Box<dyn Error>> {
//!     let content = load_content_from_source(ConfigSource::Default)?;
//!     let mut page = Page::new(content);
//!     page.set_mode(DisplayMode::Detail);
//!     // A corrupt file is reported on the slot, not as an error of the page.
//!     let _ = page.slots_mut().upload_file("career", std::path::Path::new("career.png"));
//!     let html = page.to_html();
//!     assert!(html.contains("<!DOCTYPE html>"));
//!     Ok(())
//! }
//! ```
//!
//! The content file decides what the page says:
//! ```toml
//! title = "2025 Retrospective"
//! default_mode = "simple"
//!
//! [[sections]]
//! id = "mechanism"
//! title = "How I work"
//! content = ["I am **responsible** and {{sensitive}}."]
//! summary = [{ icon = "⚙️", text = "**Responsibility** as an engine" }]
//! ```
//!
//! ## Rendering Flow
//! ```text
//! +-------------+     +-----------------+     +------------------+
//! |  Content    |     |  Sections       |     |  HTML            |
//! |  TOML       | --> |  render_section | --> |  - header/intro  |
//! |  [[sections]]     |  format_inline  |     |  - sections      |
//! +-------------+     +-----------------+     |  - widgets       |
//!                                             |  - footer        |
//! +-------------+     +-----------------+     +------------------+
//! | Image slots |     | Placeholder,    |              ^
//! | upload /    | --> | data: URI or    | -------------+
//! | generate    |     | inline error    |
//! +-------------+     +-----------------+
//! ```

pub mod config;
pub mod generator;
pub mod html;
pub mod image_slot;
pub mod images;
pub mod markup;
pub mod page;
pub mod placeholder;
pub mod section;
pub mod validation;
pub mod widgets;

use page::Page;
use section::DisplayMode;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

/// Errors that stop the page from being produced.
///
/// Failures that belong to a single image slot never show up here; they are
/// recorded on the slot and rendered inline.
#[derive(Debug)]
pub enum RetroError {
    /// The content file is not valid TOML or breaks a content invariant
    ConfigError { message: String, suggestion: String },
    /// Reading the content file or writing the page failed
    IoError {
        message: String,
        path: String,
        suggestion: String,
    },
}

impl Error for RetroError {}
impl fmt::Display for RetroError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RetroError::ConfigError {
                message,
                suggestion,
            } => {
                write!(f, "❌ Content Error: {}", message)?;
                write!(f, "\n💡 Suggestion: {}", suggestion)?;
                Ok(())
            }
            RetroError::IoError {
                message,
                path,
                suggestion,
            } => {
                write!(f, "❌ File Error: {}", message)?;
                write!(f, "\n📁 Path: {}", path)?;
                write!(f, "\n💡 Suggestion: {}", suggestion)?;
                Ok(())
            }
        }
    }
}

impl RetroError {
    /// Creates a content error pointing at the built-in example
    pub fn config_error(message: impl Into<String>) -> Self {
        RetroError::ConfigError {
            message: message.into(),
            suggestion: "Check the content file against --print-default-content".to_string(),
        }
    }

    /// Creates a write error for `path`
    pub fn write_error(message: impl Into<String>, path: impl Into<String>) -> Self {
        let message = message.into();
        let suggestion = if message.contains("Permission") || message.contains("denied") {
            "Check that you have write permissions for this location".to_string()
        } else {
            "Try a different output path or check available disk space".to_string()
        };
        RetroError::IoError {
            message,
            path: path.into(),
            suggestion,
        }
    }
}

/// Renders the page described by `source` and returns the HTML document.
///
/// # Arguments
/// * `source` - Content source (Default, File path, or Embedded TOML)
/// * `mode` - Starting display mode; `None` uses the content's `default_mode`
/// * `with_toggle` - Embed both modes with a mode switch instead of a single mode
///
/// # Example
/// ```rust
/// use retrospective::config::ConfigSource;
/// use retrospective::section::DisplayMode;
///
/// const CONTENT: &str = r#"
///     title = "Year"
///     [[sections]]
///     id = "one"
///     title = "One"
///     content = ["**first** paragraph"]
/// "#;
/// let html = retrospective::render_page_to_string(
///     ConfigSource::Embedded(CONTENT),
///     Some(DisplayMode::Detail),
///     false,
/// ).unwrap();
/// assert!(html.contains("<strong>first</strong>"));
/// ```
pub fn render_page_to_string(
    source: config::ConfigSource,
    mode: Option<DisplayMode>,
    with_toggle: bool,
) -> Result<String, RetroError> {
    let content = config::load_content_from_source(source)?;
    let mut page = Page::new(content);
    if let Some(mode) = mode {
        page.set_mode(mode);
    }
    Ok(if with_toggle {
        page.to_html_with_toggle()
    } else {
        page.to_html()
    })
}

/// Renders the page described by `source` and saves it to `path`.
pub fn render_page_to_file(
    source: config::ConfigSource,
    path: &str,
    mode: Option<DisplayMode>,
    with_toggle: bool,
) -> Result<(), RetroError> {
    check_output_dir(path)?;
    let html = render_page_to_string(source, mode, with_toggle)?;
    save_html(&html, path)
}

/// Writes an HTML document to `path`, refusing to create missing directories.
pub fn save_html(html: &str, path: &str) -> Result<(), RetroError> {
    check_output_dir(path)?;
    fs::write(path, html).map_err(|e| RetroError::write_error(e.to_string(), path))
}

fn check_output_dir(path: &str) -> Result<(), RetroError> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(RetroError::IoError {
                message: "Output directory does not exist".to_string(),
                path: parent.display().to_string(),
                suggestion: format!("Create the directory first: mkdir -p {}", parent.display()),
            });
        }
    }
    Ok(())
}
