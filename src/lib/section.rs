//! Content sections and the mode-dependent section renderer.
//!
//! A [`ContentSection`] is one thematic block of the retrospective. It carries
//! two renderings of the same story: full paragraphs for the detail view and
//! icon/text bullet points for the simple view. [`render_section`] projects a
//! section into a [`SectionView`] for a given [`DisplayMode`], running every
//! text line through the inline markup formatter.

use crate::markup::{format_inline, Fragment};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// One bullet of the condensed (simple) view.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummaryItem {
    pub icon: String,
    pub text: String,
}

/// A thematic section of the page, loaded once from the content configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentSection {
    /// Unique, stable key. Also used to look up widgets, placeholders and prompts.
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Paragraphs shown in detail mode.
    #[serde(default)]
    pub content: Vec<String>,
    /// Bullets shown in simple mode.
    #[serde(default)]
    pub summary: Vec<SummaryItem>,
}

/// Page-wide presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Simple,
    Detail,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 2] = [DisplayMode::Simple, DisplayMode::Detail];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Simple => "simple",
            DisplayMode::Detail => "detail",
        }
    }

    /// The other mode.
    pub fn toggled(self) -> DisplayMode {
        match self {
            DisplayMode::Simple => DisplayMode::Detail,
            DisplayMode::Detail => DisplayMode::Simple,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(DisplayMode::Simple),
            "detail" => Ok(DisplayMode::Detail),
            other => Err(format!(
                "unknown display mode '{}' (expected 'simple' or 'detail')",
                other
            )),
        }
    }
}

/// A formatted summary bullet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub icon: String,
    pub fragments: Vec<Fragment>,
}

/// Body of a rendered section; which variant depends on the display mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Paragraphs(Vec<Vec<Fragment>>),
    Summary(Vec<SummaryView>),
}

impl Body {
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Paragraphs(p) => p.is_empty(),
            Body::Summary(s) => s.is_empty(),
        }
    }
}

/// Presentation-ready projection of a [`ContentSection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub tags: Vec<String>,
    pub mode: DisplayMode,
    pub body: Body,
}

/// Renders `section` for `mode`. Pure: the same inputs always give the same view.
pub fn render_section(section: &ContentSection, mode: DisplayMode) -> SectionView {
    let body = match mode {
        DisplayMode::Detail => Body::Paragraphs(
            section
                .content
                .iter()
                .map(|paragraph| format_inline(paragraph))
                .collect(),
        ),
        DisplayMode::Simple => Body::Summary(
            section
                .summary
                .iter()
                .map(|item| SummaryView {
                    icon: item.icon.clone(),
                    fragments: format_inline(&item.text),
                })
                .collect(),
        ),
    };

    SectionView {
        id: section.id.clone(),
        title: section.title.clone(),
        subtitle: section.subtitle.clone(),
        tags: section.tags.clone(),
        mode,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::{plain_text, to_markup};

    fn sample() -> ContentSection {
        ContentSection {
            id: "self".to_string(),
            title: "나를 돌보는 법".to_string(),
            subtitle: "작은 의식들".to_string(),
            tags: vec!["#루틴".to_string(), "#회복".to_string()],
            content: vec![
                "아침마다 **양치**를 한다.".to_string(),
                "그리고 {{따뜻한 물}}을 마신다.".to_string(),
            ],
            summary: vec![
                SummaryItem {
                    icon: "🪥".to_string(),
                    text: "**양치**로 하루 시작".to_string(),
                },
                SummaryItem {
                    icon: "🍵".to_string(),
                    text: "따뜻한 물 한 잔".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_detail_mode_renders_paragraphs_in_order() {
        let section = sample();
        let view = render_section(&section, DisplayMode::Detail);
        match &view.body {
            Body::Paragraphs(paragraphs) => {
                let sources: Vec<String> = paragraphs.iter().map(|p| to_markup(p)).collect();
                assert_eq!(sources, section.content);
            }
            other => panic!("expected paragraphs, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_mode_renders_summary_with_verbatim_icons() {
        let section = sample();
        let view = render_section(&section, DisplayMode::Simple);
        match &view.body {
            Body::Summary(items) => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].icon, "🪥");
                assert_eq!(plain_text(&items[0].fragments), "양치로 하루 시작");
                assert_eq!(items[1].icon, "🍵");
            }
            other => panic!("expected summary, got {:?}", other),
        }
    }

    #[test]
    fn test_header_fields_are_mode_independent() {
        let section = sample();
        let simple = render_section(&section, DisplayMode::Simple);
        let detail = render_section(&section, DisplayMode::Detail);
        assert_eq!(simple.title, detail.title);
        assert_eq!(simple.subtitle, detail.subtitle);
        assert_eq!(simple.tags, detail.tags);
        assert_eq!(simple.tags, section.tags);
    }

    #[test]
    fn test_toggling_is_idempotent() {
        let section = sample();
        let first = render_section(&section, DisplayMode::Simple);
        let detail = render_section(&section, DisplayMode::Simple.toggled());
        let again = render_section(&section, DisplayMode::Simple.toggled().toggled());
        assert_eq!(detail.mode, DisplayMode::Detail);
        assert_eq!(first, again);
    }

    #[test]
    fn test_empty_bodies_render_without_error() {
        let section = ContentSection {
            id: "empty".to_string(),
            title: "Empty".to_string(),
            subtitle: String::new(),
            tags: Vec::new(),
            content: Vec::new(),
            summary: Vec::new(),
        };
        assert!(render_section(&section, DisplayMode::Simple).body.is_empty());
        assert!(render_section(&section, DisplayMode::Detail).body.is_empty());
    }

    #[test]
    fn test_display_mode_parsing() {
        assert_eq!("simple".parse::<DisplayMode>(), Ok(DisplayMode::Simple));
        assert_eq!(" Detail ".parse::<DisplayMode>(), Ok(DisplayMode::Detail));
        assert!("compact".parse::<DisplayMode>().is_err());
        assert_eq!(DisplayMode::default(), DisplayMode::Simple);
        assert_eq!(DisplayMode::Detail.to_string(), "detail");
    }
}
