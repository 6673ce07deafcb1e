//! Page composition.
//!
//! A [`Page`] owns everything needed to produce the document: the loaded
//! content, the current display mode, the widget registry and the image
//! slots. Rendering walks the sections in configuration order; each one gets
//! its mode-dependent body, its illustration slot and whatever widgets the
//! registry lists for it in the current mode.
//!
//! ```text
//! +-----------+    +-----------------+    +-------------------+
//! | Content   |    | render_section  |    | header            |
//! | sections  | -> | + widgets_for   | -> | intro + slot      |
//! | mode      |    | + slot state    |    | sections...       |
//! +-----------+    +-----------------+    | footer            |
//!                                         +-------------------+
//! ```

use crate::config::PageContent;
use crate::html::{escape, image_slot_html, section_to_html};
use crate::image_slot::{ImageSlotState, ImageSlots, INTRO_SLOT};
use crate::section::{render_section, DisplayMode, SectionView};
use crate::widgets::{widget_html, WidgetKind, WidgetRegistry};
use log::debug;

static STYLESHEET: &str = include_str!("../../assets/style.css");

/// One section as it appears on the page in the current mode.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSection {
    pub view: SectionView,
    pub widgets: Vec<WidgetKind>,
    pub slot: ImageSlotState,
}

/// The retrospective page.
#[derive(Debug, Clone)]
pub struct Page {
    content: PageContent,
    mode: DisplayMode,
    widgets: WidgetRegistry,
    slots: ImageSlots,
}

impl Page {
    /// Creates a page with the standard widget layout, starting in the
    /// content's default mode.
    pub fn new(content: PageContent) -> Self {
        Page::with_registry(content, WidgetRegistry::standard())
    }

    pub fn with_registry(content: PageContent, widgets: WidgetRegistry) -> Self {
        let mut slots = ImageSlots::new(content.slot_config());
        slots.initialize(INTRO_SLOT);
        for section in &content.sections {
            slots.initialize(&section.id);
        }
        Page {
            mode: content.default_mode,
            content,
            widgets,
            slots,
        }
    }

    pub fn content(&self) -> &PageContent {
        &self.content
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        if self.mode != mode {
            debug!("[page] switching to {} mode", mode);
        }
        self.mode = mode;
    }

    /// Switches to the other mode and returns it.
    pub fn toggle_mode(&mut self) -> DisplayMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn widgets(&self) -> &WidgetRegistry {
        &self.widgets
    }

    pub fn slots(&self) -> &ImageSlots {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut ImageSlots {
        &mut self.slots
    }

    /// Ids of every image slot on the page: the introduction, then each section.
    pub fn slot_ids(&self) -> Vec<&str> {
        std::iter::once(INTRO_SLOT)
            .chain(self.content.sections.iter().map(|s| s.id.as_str()))
            .collect()
    }

    pub fn has_slot(&self, id: &str) -> bool {
        id == INTRO_SLOT || self.content.section(id).is_some()
    }

    /// Every section, in order, rendered for the current mode.
    pub fn render_sections(&self) -> Vec<RenderedSection> {
        self.render_sections_in(self.mode)
    }

    fn render_sections_in(&self, mode: DisplayMode) -> Vec<RenderedSection> {
        self.content
            .sections
            .iter()
            .map(|section| RenderedSection {
                view: render_section(section, mode),
                widgets: self.widgets.widgets_for(&section.id, mode),
                slot: self.slots.state(&section.id),
            })
            .collect()
    }

    /// The complete document for the current mode.
    pub fn to_html(&self) -> String {
        let main = format!(
            "{}<div class=\"mode-view\" data-mode=\"{}\">{}</div>",
            self.intro_html(false),
            self.mode,
            self.sections_html(self.mode, false)
        );
        self.document(&main)
    }

    /// The complete document with both modes and a script-free mode switch.
    ///
    /// Each mode is rendered once; two radio inputs ahead of the views pick
    /// which one is visible, starting on the current mode. Section anchors
    /// carry the mode as a prefix (`detail-self`) so ids stay unique.
    pub fn to_html_with_toggle(&self) -> String {
        let mut main = String::new();
        for mode in DisplayMode::ALL {
            main.push_str(&format!(
                "<input type=\"radio\" name=\"mode\" class=\"mode-input\" id=\"mode-{}\"{}>",
                mode,
                if mode == self.mode { " checked" } else { "" }
            ));
        }
        main.push_str(&self.intro_html(true));
        for mode in DisplayMode::ALL {
            main.push_str(&format!(
                "<div class=\"mode-view\" data-mode=\"{}\">{}</div>",
                mode,
                self.sections_html(mode, true)
            ));
        }
        self.document(&main)
    }

    fn sections_html(&self, mode: DisplayMode, prefix_anchors: bool) -> String {
        let rendered = self.render_sections_in(mode);
        let count = rendered.len();
        rendered
            .iter()
            .enumerate()
            .map(|(index, section)| {
                let children: Vec<String> =
                    section.widgets.iter().map(|kind| widget_html(*kind)).collect();
                let anchor = if prefix_anchors {
                    format!("{}-{}", mode, section.view.id)
                } else {
                    section.view.id.clone()
                };
                section_to_html(
                    &section.view,
                    &anchor,
                    &image_slot_html(&section.view.id, &section.slot),
                    &children,
                    index + 1 == count,
                )
            })
            .collect()
    }

    fn intro_html(&self, with_tabs: bool) -> String {
        let content = &self.content;
        let heading = content
            .intro_heading
            .lines()
            .map(escape)
            .collect::<Vec<_>>()
            .join("<br>");

        let mut out = String::from("<div class=\"intro\"><div class=\"accent-bar\"></div>");
        out.push_str(&format!("<h2>{}</h2>", heading));
        if !content.intro_text.is_empty() {
            out.push_str(&format!(
                "<p class=\"intro-text\">{}</p>",
                escape(&content.intro_text)
            ));
        }
        out.push_str(&image_slot_html(INTRO_SLOT, &self.slots.state(INTRO_SLOT)));
        if with_tabs {
            out.push_str(concat!(
                "<nav class=\"mode-tabs\">",
                "<label for=\"mode-simple\">간단하게 보기</label>",
                "<label for=\"mode-detail\">상세히 보기</label>",
                "</nav>"
            ));
        }
        out.push_str("</div><hr class=\"divider\">");
        out
    }

    fn footer_html(&self) -> String {
        let footer = &self.content.footer;
        let mut out = String::from("<footer class=\"site-footer\">");
        if !footer.quote.is_empty() {
            let quote = footer
                .quote
                .lines()
                .map(escape)
                .collect::<Vec<_>>()
                .join("<br>");
            out.push_str(&format!("<p class=\"quote\">\"{}\"</p>", quote));
        }
        if !footer.icons.is_empty() {
            out.push_str("<div class=\"icons\">");
            for icon in &footer.icons {
                out.push_str(&format!("<span>{}</span>", escape(icon)));
            }
            out.push_str("</div>");
        }
        if !footer.credits.is_empty() {
            out.push_str("<div class=\"credits\">");
            for line in &footer.credits {
                out.push_str(&format!("<p>{}</p>", escape(line)));
            }
            out.push_str("</div>");
        }
        out.push_str("</footer>");
        out
    }

    fn document(&self, main: &str) -> String {
        let content = &self.content;
        let mut out = String::from("<!DOCTYPE html>\n");
        out.push_str(&format!("<html lang=\"{}\">\n<head>\n", escape(&content.lang)));
        out.push_str("<meta charset=\"utf-8\">\n");
        out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        out.push_str(&format!("<title>{}</title>\n", escape(&content.title)));
        out.push_str(&format!("<style>\n{}</style>\n</head>\n", STYLESHEET));
        out.push_str("<body id=\"top\">\n<header class=\"site-header\">");
        out.push_str(&format!("<h1>{}</h1>", escape(&content.title)));
        if !content.tagline.is_empty() {
            out.push_str(&format!(
                "<span class=\"tagline\">{}</span>",
                escape(&content.tagline)
            ));
        }
        out.push_str("</header>\n<main>");
        out.push_str(main);
        out.push_str("<a class=\"to-top\" href=\"#top\">▲ 맨 위로</a></main>\n");
        out.push_str(&self.footer_html());
        out.push_str("\n</body>\n</html>\n");
        out
    }
}
