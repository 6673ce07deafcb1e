//! Content configuration for the retrospective page.
//!
//! Everything the page says lives in a TOML file: the introduction, the
//! ordered list of sections, the footer and the image-generation prompts.
//! A complete default is compiled into the binary, so the page renders even
//! without any file on disk.
//!
//! # Configuration Structure
//!
//! - Top-level keys: `title`, `tagline`, `lang`, `intro_heading`, `intro_text`,
//!   `intro_image`, `default_mode` (`"simple"` or `"detail"`)
//! - `[footer]`: `quote`, `icons`, `credits`
//! - `[generation]`: `model`, `generic_prompt` and a `[generation.prompts]`
//!   table mapping section ids to prompts
//! - `[[sections]]`: `id`, `title`, `subtitle`, `tags`, `content` (paragraphs
//!   for the detail view) and `summary` (`{ icon, text }` items for the simple view)
//!
//! # Configuration Example
//!
//! ```toml
//! title = "2025 Retrospective"
//! intro_heading = "A year in review"
//! intro_text = "What I learned."
//! default_mode = "detail"
//!
//! [[sections]]
//! id = "self"
//! title = "Taking care of me"
//! content = ["I learned that my **morning routine** is an alarm."]
//! summary = [{ icon = "🪥", text = "**Routine** as an alarm" }]
//! ```
//!
//! Section ids must be unique: they key the widgets, placeholders, image slots
//! and prompts. A file violating this is rejected.

use crate::generator::DEFAULT_MODEL;
use crate::image_slot::{SlotConfig, GENERIC_PROMPT, INTRO_SLOT};
use crate::section::{ContentSection, DisplayMode};
use crate::RetroError;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

static DEFAULT_CONTENT: &str = include_str!("../../content/retrospective.toml");

/// Configuration source for the page content.
#[derive(Debug, Clone)]
pub enum ConfigSource<'a> {
    /// Use the built-in retrospective content
    Default,
    /// Load content from a file path
    File(&'a Path),
    /// Use an in-memory TOML string
    Embedded(&'a str),
}

/// Page footer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Footer {
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub icons: Vec<String>,
    #[serde(default)]
    pub credits: Vec<String>,
}

/// Image-generation settings: model and prompt registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_generic_prompt")]
    pub generic_prompt: String,
    #[serde(default)]
    pub prompts: HashMap<String, String>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        GenerationSettings {
            model: default_model(),
            generic_prompt: default_generic_prompt(),
            prompts: HashMap::new(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_generic_prompt() -> String {
    GENERIC_PROMPT.to_string()
}

fn default_lang() -> String {
    "ko".to_string()
}

/// The complete static content of the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageContent {
    pub title: String,
    #[serde(default)]
    pub tagline: String,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub intro_heading: String,
    #[serde(default)]
    pub intro_text: String,
    /// Pre-supplied image for the introduction slot.
    pub intro_image: Option<String>,
    #[serde(default)]
    pub default_mode: DisplayMode,
    #[serde(default)]
    pub footer: Footer,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub sections: Vec<ContentSection>,
}

impl PageContent {
    pub fn section(&self, id: &str) -> Option<&ContentSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Inputs of the image slot machine derived from this content.
    pub fn slot_config(&self) -> SlotConfig {
        SlotConfig {
            intro_image: self.intro_image.clone().filter(|uri| !uri.trim().is_empty()),
            model: self.generation.model.clone(),
            generic_prompt: self.generation.generic_prompt.clone(),
            prompts: self.generation.prompts.clone(),
        }
    }
}

/// The built-in content file, verbatim.
pub fn default_content_toml() -> &'static str {
    DEFAULT_CONTENT
}

/// Returns the first section id that appears more than once.
fn find_duplicate_id(sections: &[ContentSection]) -> Option<&str> {
    let mut seen = HashSet::new();
    sections
        .iter()
        .map(|s| s.id.as_str())
        .find(|id| !seen.insert(*id))
}

/// Parses content TOML and checks the section invariants.
///
/// # Example
/// ```rust
/// use retrospective::config::parse_content_string;
///
/// let content = parse_content_string(r#"
/// title = "Year"
///
/// [[sections]]
/// id = "a"
/// title = "First"
/// "#).unwrap();
/// assert_eq!(content.sections.len(), 1);
/// ```
pub fn parse_content_string(content_str: &str) -> Result<PageContent, RetroError> {
    let content: PageContent = toml::from_str(content_str).map_err(|e| RetroError::ConfigError {
        message: format!("Invalid content file: {}", e),
        suggestion: "Compare your file with the output of --print-default-content".to_string(),
    })?;

    if let Some(id) = find_duplicate_id(&content.sections) {
        return Err(RetroError::config_error(format!(
            "Section id '{}' is used more than once",
            id
        )));
    }

    if let Some(section) = content.sections.iter().find(|s| s.id.trim().is_empty()) {
        return Err(RetroError::config_error(format!(
            "Section '{}' has an empty id",
            section.title
        )));
    }

    // The introduction owns this slot id.
    if let Some(section) = content.sections.iter().find(|s| s.id == INTRO_SLOT) {
        return Err(RetroError::config_error(format!(
            "Section '{}' uses the reserved id '{}'",
            section.title, INTRO_SLOT
        )));
    }

    Ok(content)
}

/// Loads the page content from the given source.
pub fn load_content_from_source(source: ConfigSource) -> Result<PageContent, RetroError> {
    match source {
        ConfigSource::Default => parse_content_string(DEFAULT_CONTENT),
        ConfigSource::File(path) => {
            let content_str = fs::read_to_string(path).map_err(|e| RetroError::IoError {
                message: format!("Cannot read content file: {}", e),
                path: path.display().to_string(),
                suggestion: "Check the path passed to --content".to_string(),
            })?;
            parse_content_string(&content_str)
        }
        ConfigSource::Embedded(content) => parse_content_string(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::has_unbalanced_delimiters;

    #[test]
    fn test_default_content_parses() {
        let content = load_content_from_source(ConfigSource::Default).unwrap();
        assert_eq!(content.title, "2025 Retrospective");
        assert_eq!(content.default_mode, DisplayMode::Simple);
        let ids: Vec<&str> = content.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["self", "career", "health", "finance", "mechanism", "next"]);
        assert!(content.intro_image.is_some());
        assert_eq!(content.generation.model, DEFAULT_MODEL);
        assert_eq!(content.footer.icons, vec!["🌱", "🏡", "🤖"]);
    }

    #[test]
    fn test_default_content_markup_is_balanced() {
        let content = load_content_from_source(ConfigSource::Default).unwrap();
        for section in &content.sections {
            assert!(!section.content.is_empty(), "{} has no paragraphs", section.id);
            assert!(!section.summary.is_empty(), "{} has no summary", section.id);
            for text in section
                .content
                .iter()
                .chain(section.summary.iter().map(|s| &s.text))
            {
                assert!(!has_unbalanced_delimiters(text), "{}: {}", section.id, text);
            }
        }
    }

    #[test]
    fn test_minimal_content_uses_defaults() {
        let content = parse_content_string("title = \"Only a title\"").unwrap();
        assert!(content.sections.is_empty());
        assert_eq!(content.lang, "ko");
        assert_eq!(content.default_mode, DisplayMode::Simple);
        assert_eq!(content.generation, GenerationSettings::default());
        assert_eq!(content.footer, Footer::default());
    }

    #[test]
    fn test_detail_default_mode() {
        let content = parse_content_string("title = \"t\"\ndefault_mode = \"detail\"").unwrap();
        assert_eq!(content.default_mode, DisplayMode::Detail);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let result = parse_content_string("title = \"t\"\ndefault_mode = \"compact\"");
        assert!(matches!(result, Err(RetroError::ConfigError { .. })));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let toml = r#"
            title = "t"
            [[sections]]
            id = "self"
            title = "One"
            [[sections]]
            id = "self"
            title = "Two"
        "#;
        match parse_content_string(toml) {
            Err(RetroError::ConfigError { message, .. }) => assert!(message.contains("'self'")),
            other => panic!("expected duplicate id error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_id_is_rejected() {
        let toml = "title = \"t\"\n[[sections]]\nid = \" \"\ntitle = \"Blank\"";
        assert!(matches!(
            parse_content_string(toml),
            Err(RetroError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_intro_id_is_reserved() {
        let toml = r#"
            title = "t"
            intro_image = "https://example.com/intro.png"
            [[sections]]
            id = "intro"
            title = "Clashing"
        "#;
        match parse_content_string(toml) {
            Err(RetroError::ConfigError { message, .. }) => {
                assert!(message.contains("reserved id 'intro'"))
            }
            other => panic!("expected reserved id error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = parse_content_string("this is not valid toml {{{");
        assert!(matches!(result, Err(RetroError::ConfigError { .. })));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_content_from_source(ConfigSource::File(Path::new("nonexistent.toml")));
        assert!(matches!(result, Err(RetroError::IoError { .. })));
    }

    #[test]
    fn test_embedded_source() {
        const EMBEDDED: &str = r#"
            title = "Embedded"
            [generation.prompts]
            self = "tea"
        "#;
        let content = load_content_from_source(ConfigSource::Embedded(EMBEDDED)).unwrap();
        assert_eq!(content.title, "Embedded");
        let slots = content.slot_config();
        assert_eq!(slots.prompts.get("self").map(String::as_str), Some("tea"));
        assert_eq!(slots.generic_prompt, GENERIC_PROMPT);
        assert_eq!(slots.intro_image, None);
    }

    #[test]
    fn test_blank_intro_image_is_ignored() {
        let content = parse_content_string("title = \"t\"\nintro_image = \"  \"").unwrap();
        assert_eq!(content.slot_config().intro_image, None);
    }
}
