//! Pre-flight checks on loaded content.
//!
//! Nothing here is fatal: the page always renders. The checks catch the
//! mistakes that would otherwise only show up visually, like a stray `**`
//! printed literally or a widget attached to a section that does not exist.

use crate::config::PageContent;
use crate::image_slot::INTRO_SLOT;
use crate::markup::has_unbalanced_delimiters;
use crate::widgets::WidgetRegistry;
use std::path::Path;

/// Checks `content` against `registry` and, optionally, the output path.
/// Returns human-readable warnings, empty when everything looks fine.
pub fn validate_page(
    content: &PageContent,
    registry: &WidgetRegistry,
    output_path: Option<&str>,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if content.sections.is_empty() {
        warnings.push("Content defines no sections; only the introduction will render".to_string());
    }

    for section in &content.sections {
        if section.title.trim().is_empty() {
            warnings.push(format!("Section '{}' has an empty title", section.id));
        }
        if section.content.is_empty() {
            warnings.push(format!(
                "Section '{}' has no paragraphs; its detail view will be empty",
                section.id
            ));
        }
        if section.summary.is_empty() {
            warnings.push(format!(
                "Section '{}' has no summary items; its simple view will be empty",
                section.id
            ));
        }
        for (index, paragraph) in section.content.iter().enumerate() {
            if has_unbalanced_delimiters(paragraph) {
                warnings.push(format!(
                    "Section '{}', paragraph {}: unclosed ** or {{{{ will be shown literally",
                    section.id,
                    index + 1
                ));
            }
        }
        for (index, item) in section.summary.iter().enumerate() {
            if has_unbalanced_delimiters(&item.text) {
                warnings.push(format!(
                    "Section '{}', summary item {}: unclosed ** or {{{{ will be shown literally",
                    section.id,
                    index + 1
                ));
            }
        }
    }

    for id in registry.section_ids() {
        if content.section(id).is_none() {
            warnings.push(format!("Widgets are registered for unknown section '{}'", id));
        }
    }

    let mut prompt_ids: Vec<&String> = content.generation.prompts.keys().collect();
    prompt_ids.sort();
    for id in prompt_ids {
        if id != INTRO_SLOT && content.section(id).is_none() {
            warnings.push(format!("Generation prompt defined for unknown section '{}'", id));
        }
    }

    if let Some(path) = output_path {
        let path = Path::new(path);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                warnings.push(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                ));
            }
        }
        let is_html = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
            .unwrap_or(false);
        if !is_html {
            warnings.push(format!(
                "Output file '{}' does not have an .html extension",
                path.display()
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{load_content_from_source, parse_content_string, ConfigSource};

    #[test]
    fn test_default_content_is_clean() {
        let content = load_content_from_source(ConfigSource::Default).unwrap();
        let warnings = validate_page(&content, &WidgetRegistry::standard(), None);
        assert!(warnings.is_empty(), "unexpected warnings: {:?}", warnings);
    }

    #[test]
    fn test_unbalanced_markup_is_reported() {
        let content = parse_content_string(
            r#"
            title = "t"
            [[sections]]
            id = "a"
            title = "A"
            content = ["fine **bold**", "broken **bold"]
            summary = [{ icon = "x", text = "{{open" }]
        "#,
        )
        .unwrap();
        let warnings = validate_page(&content, &WidgetRegistry::new(), None);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("paragraph 2"));
        assert!(warnings[1].contains("summary item 1"));
        assert!(warnings[1].contains("{{"));
    }

    #[test]
    fn test_empty_views_are_reported() {
        let content = parse_content_string(
            "title = \"t\"\n[[sections]]\nid = \"a\"\ntitle = \"A\"",
        )
        .unwrap();
        let warnings = validate_page(&content, &WidgetRegistry::new(), None);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("no paragraphs"));
        assert!(warnings[1].contains("no summary items"));
    }

    #[test]
    fn test_orphan_widgets_and_prompts() {
        let content = parse_content_string(
            r#"
            title = "t"
            [generation.prompts]
            intro = "ok"
            ghost = "nobody uses this"
        "#,
        )
        .unwrap();
        let warnings = validate_page(&content, &WidgetRegistry::standard(), None);
        assert!(warnings.iter().any(|w| w.contains("no sections")));
        assert!(warnings.iter().any(|w| w.contains("unknown section 'mechanism'")));
        assert!(warnings.iter().any(|w| w.contains("unknown section 'self'")));
        assert!(warnings.iter().any(|w| w.contains("prompt defined for unknown section 'ghost'")));
        assert!(!warnings.iter().any(|w| w.contains("'intro'")));
    }

    #[test]
    fn test_output_path_checks() {
        let content = load_content_from_source(ConfigSource::Default).unwrap();
        let registry = WidgetRegistry::standard();

        assert!(validate_page(&content, &registry, Some("index.html")).is_empty());

        let warnings = validate_page(&content, &registry, Some("/nonexistent/dir/page.html"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("does not exist"));

        let warnings = validate_page(&content, &registry, Some("page.pdf"));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(".html"));
    }
}
