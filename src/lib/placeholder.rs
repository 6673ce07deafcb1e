//! Built-in placeholder graphics shown while a section has no image.
//!
//! Each known section id has a small decorative SVG compiled into the binary.
//! Sections without a dedicated graphic get an empty frame.

static INTRO: &str = include_str!("../../assets/placeholders/intro.svg");
static SELF_CARE: &str = include_str!("../../assets/placeholders/self.svg");
static CAREER: &str = include_str!("../../assets/placeholders/career.svg");
static HEALTH: &str = include_str!("../../assets/placeholders/health.svg");
static FINANCE: &str = include_str!("../../assets/placeholders/finance.svg");
static MECHANISM: &str = include_str!("../../assets/placeholders/mechanism.svg");
static NEXT: &str = include_str!("../../assets/placeholders/next.svg");

/// Returns the placeholder SVG markup for `section_id`, if one exists.
pub fn placeholder_svg(section_id: &str) -> Option<&'static str> {
    match section_id {
        "intro" => Some(INTRO),
        "self" => Some(SELF_CARE),
        "career" => Some(CAREER),
        "health" => Some(HEALTH),
        "finance" => Some(FINANCE),
        "mechanism" => Some(MECHANISM),
        "next" => Some(NEXT),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_placeholder_is_svg() {
        for id in ["intro", "self", "career", "health", "finance", "mechanism", "next"] {
            let svg = placeholder_svg(id).unwrap_or_else(|| panic!("missing placeholder for {id}"));
            assert!(svg.trim_start().starts_with("<svg"), "{id} is not an svg");
            assert!(svg.contains("viewBox=\"0 0 800 320\""));
            // Inlined once per mode view; element ids must not repeat.
            assert!(!svg.contains(" id=\""), "{id} declares an element id");
        }
    }

    #[test]
    fn test_unknown_section_has_no_placeholder() {
        assert!(placeholder_svg("unknown").is_none());
    }
}
