//! HTML emission for rendered views.
//!
//! These helpers turn the structured views produced by the renderer into
//! markup. All user-provided text goes through [`escape`]; the only raw
//! markup inserted verbatim is the built-in placeholder SVGs and the widget
//! fragments generated by this crate.

use crate::image_slot::ImageSlotState;
use crate::markup::{Fragment, FragmentKind};
use crate::placeholder::placeholder_svg;
use crate::section::{Body, SectionView};

/// Escapes text for use in element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders formatted fragments as inline HTML. Empty spans are skipped.
pub fn fragments_to_html(fragments: &[Fragment]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        match fragment.kind {
            FragmentKind::Plain => out.push_str(&escape(&fragment.text)),
            _ if fragment.text.is_empty() => {}
            FragmentKind::Bold => {
                out.push_str("<strong>");
                out.push_str(&escape(&fragment.text));
                out.push_str("</strong>");
            }
            FragmentKind::Highlight => {
                out.push_str("<span class=\"highlight\">");
                out.push_str(&escape(&fragment.text));
                out.push_str("</span>");
            }
        }
    }
    out
}

/// Renders the illustration frame of one slot.
pub fn image_slot_html(section_id: &str, state: &ImageSlotState) -> String {
    let mut out = String::new();
    let frame_class = if state.current_image.is_some() {
        "graphic"
    } else {
        "graphic graphic-placeholder"
    };
    out.push_str(&format!(
        "<div class=\"{}\" data-slot=\"{}\" data-phase=\"{:?}\">",
        frame_class,
        escape(section_id),
        state.phase()
    ));

    match &state.current_image {
        Some(uri) => out.push_str(&format!(
            "<img src=\"{}\" alt=\"Graphic for {}\">",
            escape(uri),
            escape(section_id)
        )),
        None => {
            if let Some(svg) = placeholder_svg(section_id) {
                out.push_str(svg.trim());
            }
        }
    }

    if state.is_loading {
        out.push_str("<p class=\"slot-status\">Generating image…</p>");
    }
    if let Some(error) = &state.error {
        out.push_str(&format!(
            "<p class=\"slot-error\" role=\"alert\">{}</p>",
            escape(error)
        ));
    }
    out.push_str("</div>");
    out
}

fn body_to_html(body: &Body) -> String {
    let mut out = String::new();
    match body {
        Body::Paragraphs(paragraphs) => {
            out.push_str("<div class=\"section-body detail\">");
            for paragraph in paragraphs {
                out.push_str("<p>");
                out.push_str(&fragments_to_html(paragraph));
                out.push_str("</p>");
            }
            out.push_str("</div>");
        }
        Body::Summary(items) => {
            out.push_str("<div class=\"section-body simple\">");
            for item in items {
                out.push_str("<div class=\"summary-item\">");
                out.push_str(&format!(
                    "<div class=\"summary-icon\">{}</div>",
                    escape(&item.icon)
                ));
                out.push_str(&format!(
                    "<div class=\"summary-text\">{}</div>",
                    fragments_to_html(&item.fragments)
                ));
                out.push_str("</div>");
            }
            out.push_str("</div>");
        }
    }
    out
}

/// Renders a whole section: header, illustration, body and injected widgets.
///
/// `anchor_id` becomes the element id; it differs from the section id when
/// the same section appears once per mode in one document.
pub fn section_to_html(
    view: &SectionView,
    anchor_id: &str,
    slot_html: &str,
    children_html: &[String],
    is_last: bool,
) -> String {
    let mut out = String::new();
    let class = if is_last { "section" } else { "section bordered" };
    out.push_str(&format!(
        "<section class=\"{}\" id=\"{}\" data-mode=\"{}\">",
        class,
        escape(anchor_id),
        view.mode
    ));

    out.push_str("<header class=\"section-header\"><div class=\"tags\">");
    for tag in &view.tags {
        out.push_str(&format!("<span class=\"tag\">{}</span>", escape(tag)));
    }
    out.push_str("</div>");
    out.push_str(&format!("<h2>{}</h2>", escape(&view.title)));
    if !view.subtitle.is_empty() {
        out.push_str(&format!(
            "<p class=\"subtitle\">{}</p>",
            escape(&view.subtitle)
        ));
    }
    out.push_str("</header>");

    out.push_str(slot_html);
    out.push_str(&body_to_html(&view.body));

    if !children_html.is_empty() {
        out.push_str("<div class=\"section-widgets\">");
        for child in children_html {
            out.push_str(child);
        }
        out.push_str("</div>");
    }

    out.push_str("</section>");
    out
}
