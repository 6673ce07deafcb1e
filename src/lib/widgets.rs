//! Chart and diagram widgets injected into specific sections.
//!
//! Which widget shows up where is declarative: a [`WidgetRegistry`] maps a
//! section id to a list of [`WidgetDescriptor`]s, each tagged with the display
//! modes it is visible in. The page composer only asks the registry.
//!
//! The widgets themselves render from fixed illustrative datasets.

use crate::html::escape;
use crate::section::DisplayMode;
use lazy_static::lazy_static;
use std::collections::HashMap;

/// The available widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Three-step morning ritual strip.
    MorningRoutine,
    /// Shadow/light comparison cards.
    Mechanism,
    /// Trigger → old way / new way diagram.
    AnxietyCycle,
    /// Five-trait radar chart.
    TraitRadar,
}

impl WidgetKind {
    pub fn slug(&self) -> &'static str {
        match self {
            WidgetKind::MorningRoutine => "morning-routine",
            WidgetKind::Mechanism => "mechanism",
            WidgetKind::AnxietyCycle => "anxiety-cycle",
            WidgetKind::TraitRadar => "trait-radar",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetDescriptor {
    pub kind: WidgetKind,
    /// Modes in which the widget is visible.
    pub modes: Vec<DisplayMode>,
}

impl WidgetDescriptor {
    pub fn new(kind: WidgetKind, modes: &[DisplayMode]) -> Self {
        WidgetDescriptor {
            kind,
            modes: modes.to_vec(),
        }
    }

    pub fn visible_in(&self, mode: DisplayMode) -> bool {
        self.modes.contains(&mode)
    }
}

/// Section id → widgets, in display order.
#[derive(Debug, Clone, Default)]
pub struct WidgetRegistry {
    entries: HashMap<String, Vec<WidgetDescriptor>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        WidgetRegistry::default()
    }

    /// Appends a widget to a section.
    pub fn register(&mut self, section_id: impl Into<String>, descriptor: WidgetDescriptor) {
        self.entries
            .entry(section_id.into())
            .or_default()
            .push(descriptor);
    }

    /// Widgets of `section_id` visible in `mode`, in registration order.
    pub fn widgets_for(&self, section_id: &str, mode: DisplayMode) -> Vec<WidgetKind> {
        self.entries
            .get(section_id)
            .map(|list| {
                list.iter()
                    .filter(|d| d.visible_in(mode))
                    .map(|d| d.kind)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Section ids with at least one widget registered.
    pub fn section_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// The layout of the retrospective page: visuals only accompany the detail view.
    pub fn standard() -> Self {
        let detail = [DisplayMode::Detail];
        let mut registry = WidgetRegistry::new();
        registry.register("self", WidgetDescriptor::new(WidgetKind::MorningRoutine, &detail));
        registry.register("mechanism", WidgetDescriptor::new(WidgetKind::Mechanism, &detail));
        registry.register("mechanism", WidgetDescriptor::new(WidgetKind::AnxietyCycle, &detail));
        registry.register("mechanism", WidgetDescriptor::new(WidgetKind::TraitRadar, &detail));
        registry
    }
}

/// One axis of the radar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct TraitScore {
    pub label: &'static str,
    pub value: f64,
    pub full_mark: f64,
}

lazy_static! {
    /// Self-assessed energy indicators plotted by the radar chart.
    pub static ref TRAIT_SCORES: Vec<TraitScore> = vec![
        TraitScore { label: "섬세함 (Sensitivity)", value: 95.0, full_mark: 100.0 },
        TraitScore { label: "책임감 (Responsibility)", value: 90.0, full_mark: 100.0 },
        TraitScore { label: "행동력 (Action)", value: 85.0, full_mark: 100.0 },
        TraitScore { label: "회복탄력성 (Resilience)", value: 60.0, full_mark: 100.0 },
        TraitScore { label: "휴식 (Rest)", value: 50.0, full_mark: 100.0 },
    ];
}

const MORNING_STEPS: [(&str, &str); 3] = [("🪥", "양치하기"), ("🍵", "따뜻한 물"), ("🧘‍♀️", "스트레칭")];

const SHADOW_ITEMS: [(&str, &str, &str); 3] = [
    ("⚠️", "타인의 시선:", "내 판단보다 남의 평가를 진실로 믿음"),
    ("🤐", "감정 억압:", "\"괜찮아\"라며 참다가 임계치에서 폭발"),
    ("🔥", "방어적 소진:", "거절이 두려워 모든 책임을 떠안음"),
];

const LIGHT_ITEMS: [(&str, &str, &str); 3] = [
    ("💎", "재정의:", "예민함 → 섬세함, 책임감 → 완결성"),
    ("🛑", "멈춤의 미학:", "조급할 때가 바로 멈춰야 할 때"),
    ("🛡️", "책임 분리:", "타인의 감정은 나의 책임이 아님"),
];

/// Vertex of axis `index` out of `count`, at `ratio` of `radius`, starting at 12 o'clock.
fn radar_point(index: usize, count: usize, ratio: f64, center: f64, radius: f64) -> (f64, f64) {
    let angle = -std::f64::consts::FRAC_PI_2 + std::f64::consts::TAU * index as f64 / count as f64;
    (
        center + radius * ratio * angle.cos(),
        center + radius * ratio * angle.sin(),
    )
}

fn polygon_points(ratios: &[f64], center: f64, radius: f64) -> String {
    ratios
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let (x, y) = radar_point(i, ratios.len(), *r, center, radius);
            format!("{:.1},{:.1}", x, y)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders the radar chart for `scores` as an inline SVG.
pub fn radar_svg(scores: &[TraitScore]) -> String {
    const SIZE: f64 = 360.0;
    const RADIUS: f64 = 120.0;
    let center = SIZE / 2.0;
    let mut out = format!(
        "<svg class=\"radar\" viewBox=\"0 0 {s} {s}\" xmlns=\"http://www.w3.org/2000/svg\">",
        s = SIZE
    );
    if scores.is_empty() {
        out.push_str("</svg>");
        return out;
    }

    for ring in [0.25, 0.5, 0.75, 1.0] {
        let ratios = vec![ring; scores.len()];
        out.push_str(&format!(
            "<polygon points=\"{}\" fill=\"none\" stroke=\"#E7E5E4\"/>",
            polygon_points(&ratios, center, RADIUS)
        ));
    }

    let ratios: Vec<f64> = scores
        .iter()
        .map(|s| {
            if s.full_mark > 0.0 {
                (s.value / s.full_mark).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect();
    out.push_str(&format!(
        "<polygon class=\"radar-area\" points=\"{}\" fill=\"#84A98C\" fill-opacity=\"0.4\" stroke=\"#52796F\" stroke-width=\"2\"/>",
        polygon_points(&ratios, center, RADIUS)
    ));

    for (i, score) in scores.iter().enumerate() {
        let (x, y) = radar_point(i, scores.len(), 1.2, center, RADIUS);
        out.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"11\" fill=\"#57534E\">{}</text>",
            x,
            y,
            escape(score.label)
        ));
    }
    out.push_str("</svg>");
    out
}

fn card_list(items: &[(&str, &str, &str)]) -> String {
    let mut out = String::from("<ul>");
    for (icon, head, text) in items {
        out.push_str(&format!(
            "<li><span class=\"icon\">{}</span><span><strong>{}</strong> {}</span></li>",
            icon,
            escape(head),
            escape(text)
        ));
    }
    out.push_str("</ul>");
    out
}

/// Renders one widget as a static HTML fragment.
pub fn widget_html(kind: WidgetKind) -> String {
    let body = match kind {
        WidgetKind::MorningRoutine => {
            let mut out = String::from("<h3>나를 지키는 아침 의식</h3><ol class=\"routine\">");
            for (icon, label) in MORNING_STEPS {
                out.push_str(&format!(
                    "<li><span class=\"icon\">{}</span><span>{}</span></li>",
                    icon, label
                ));
            }
            out.push_str("</ol><p class=\"caption\">이 루틴이 무너지면, 마음의 경보가 울립니다.</p>");
            out
        }
        WidgetKind::Mechanism => format!(
            "<div class=\"card shadow\"><h4>나의 그림자</h4>{}</div><div class=\"card light\"><h4>강점과 회복</h4>{}</div>",
            card_list(&SHADOW_ITEMS),
            card_list(&LIGHT_ITEMS)
        ),
        WidgetKind::AnxietyCycle => concat!(
            "<h3>패턴의 재구성</h3>",
            "<div class=\"step trigger\"><span class=\"label\">TRIGGER</span>",
            "<p><strong>불안 감지</strong> (누군가의 침묵, 계획 변경, 거절의 두려움)</p></div>",
            "<div class=\"step old\"><span class=\"label\">OLD WAY</span>",
            "<p><s>즉각적 행동 &amp; 과도한 책임</s><br>→ 번아웃 &amp; 폭발 (조건부 평온)</p></div>",
            "<div class=\"step new\"><span class=\"label\">NEW WAY</span>",
            "<p><strong>1. 멈춤 &amp; 인지</strong> (\"나는 안전하다\")<br>",
            "<strong>2. 책임 분리</strong> (타인의 감정은 그들의 몫)<br>",
            "<strong>3. 안전한 실패</strong> (거절해도 괜찮다)</p></div>"
        )
        .to_string(),
        WidgetKind::TraitRadar => format!("<h3>나의 에너지 지표</h3>{}", radar_svg(&TRAIT_SCORES)),
    };
    format!(
        "<figure class=\"widget\" data-widget=\"{}\">{}</figure>",
        kind.slug(),
        body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_is_detail_only() {
        let registry = WidgetRegistry::standard();
        assert_eq!(
            registry.widgets_for("self", DisplayMode::Detail),
            vec![WidgetKind::MorningRoutine]
        );
        assert_eq!(
            registry.widgets_for("mechanism", DisplayMode::Detail),
            vec![
                WidgetKind::Mechanism,
                WidgetKind::AnxietyCycle,
                WidgetKind::TraitRadar
            ]
        );
        assert!(registry.widgets_for("self", DisplayMode::Simple).is_empty());
        assert!(registry.widgets_for("mechanism", DisplayMode::Simple).is_empty());
        assert!(registry.widgets_for("career", DisplayMode::Detail).is_empty());
        assert_eq!(registry.section_ids(), vec!["mechanism", "self"]);
    }

    #[test]
    fn test_widget_visible_in_both_modes() {
        let mut registry = WidgetRegistry::new();
        registry.register(
            "health",
            WidgetDescriptor::new(WidgetKind::TraitRadar, &DisplayMode::ALL),
        );
        for mode in DisplayMode::ALL {
            assert_eq!(registry.widgets_for("health", mode), vec![WidgetKind::TraitRadar]);
        }
    }

    #[test]
    fn test_trait_dataset() {
        assert_eq!(TRAIT_SCORES.len(), 5);
        assert!(TRAIT_SCORES.iter().all(|s| s.value <= s.full_mark));
    }

    #[test]
    fn test_radar_point_starts_at_top() {
        let (x, y) = radar_point(0, 5, 1.0, 180.0, 120.0);
        assert!((x - 180.0).abs() < 1e-9);
        assert!((y - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_radar_svg_contains_labels_and_area() {
        let svg = radar_svg(&TRAIT_SCORES);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("radar-area"));
        assert!(svg.contains("휴식 (Rest)"));
        assert_eq!(svg.matches("<text").count(), 5);
    }

    #[test]
    fn test_radar_svg_empty_dataset() {
        assert_eq!(
            radar_svg(&[]),
            "<svg class=\"radar\" viewBox=\"0 0 360 360\" xmlns=\"http://www.w3.org/2000/svg\"></svg>"
        );
    }

    #[test]
    fn test_widget_html_is_tagged() {
        for kind in [
            WidgetKind::MorningRoutine,
            WidgetKind::Mechanism,
            WidgetKind::AnxietyCycle,
            WidgetKind::TraitRadar,
        ] {
            let html = widget_html(kind);
            assert!(html.starts_with(&format!("<figure class=\"widget\" data-widget=\"{}\">", kind.slug())));
            assert!(html.ends_with("</figure>"));
        }
    }
}
