//! Page configuration
//!
//! Every tunable of the page lives here: section order, tracker thresholds,
//! the hero's entrance choreography, stage artwork placement, smooth-scroll
//! feel, and one reveal recipe per section. Every field has a default, so a
//! config file only lists what it changes:
//!
//! ```toml
//! [tracker]
//! probe_line = 120.0
//!
//! [projects.reveal]
//! start = "top 60%"
//! stagger_ms = 100.0
//! ```

use std::fs;
use std::path::Path;

use folio_animation::{EaseKind, Easing, Position, VisualPatch};
use folio_core::{Millis, Size};
use folio_layout::{
    PoseConfig, RevealSpec, SectionId, SectionRegistry, SmoothScrollConfig, StageObject,
    ToggleActions, TrackerConfig, TriggerEnd, TriggerPoint, TriggerStart,
};
use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

// =============================================================================
// Page Configuration
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Sections in page order; active-section tracking walks this list
    pub sections: Vec<SectionId>,
    pub tracker: TrackerConfig,
    pub ticker: TickerConfig,
    pub scroll: SmoothScrollConfig,
    pub header: HeaderConfig,
    pub hero: HeroConfig,
    pub pose: PoseConfig,
    pub stage: StageConfig,
    pub parallax: ParallaxConfig,
    pub experience: ExperienceConfig,
    pub skills: SectionConfig,
    pub projects: SectionConfig,
    pub contact: SectionConfig,
    pub footer: SectionConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            sections: ["about", "experience", "skills", "projects", "contact"]
                .into_iter()
                .map(SectionId::from)
                .collect(),
            tracker: TrackerConfig::default(),
            ticker: TickerConfig::default(),
            scroll: SmoothScrollConfig::default(),
            header: HeaderConfig::default(),
            hero: HeroConfig::default(),
            pose: PoseConfig::default(),
            stage: StageConfig::default(),
            parallax: ParallaxConfig::default(),
            experience: ExperienceConfig::default(),
            skills: SectionConfig::skills(),
            projects: SectionConfig::projects(),
            contact: SectionConfig::contact(),
            footer: SectionConfig::footer(),
        }
    }
}

impl PageConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| FolioError::ConfigParse(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "page config loaded");
        Ok(config)
    }

    /// Build the section registry, checking stage links against it
    pub fn section_registry(&self) -> Result<SectionRegistry> {
        let registry = SectionRegistry::new(self.sections.iter().cloned())?;
        for object in &self.stage.objects {
            if let Some(target) = &object.target {
                if !registry.contains(target.as_str()) {
                    return Err(FolioError::UnknownSection(target.to_string()));
                }
            }
        }
        Ok(registry)
    }
}

/// Frame ticker behaviour
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    /// Frames longer than this are clamped; 0 disables lag smoothing
    pub lag_threshold_ms: Millis,
    pub lag_adjusted_ms: Millis,
}

// =============================================================================
// Header
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// Header height subtracted from navigation targets (px)
    pub nav_offset: f32,
    pub nav_duration_ms: Millis,
    pub nav_easing: Easing,
    /// Slide-in when the page mounts
    pub intro: EntranceStep,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            nav_offset: 80.0,
            nav_duration_ms: 100.0,
            nav_easing: Easing::power(3, EaseKind::InOut),
            intro: EntranceStep::new(VisualPatch::new().opacity(0.0).y(-20.0), 800.0)
                .easing(Easing::power3_out()),
        }
    }
}

// =============================================================================
// Hero
// =============================================================================

/// One `from` step of an entrance timeline
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntranceStep {
    pub from: VisualPatch,
    pub duration_ms: Millis,
    pub easing: Easing,
    /// Delay between consecutive targets of the step
    pub stagger_ms: Millis,
    /// Start this long before the timeline's current end
    pub overlap_ms: Option<Millis>,
    /// Start at an absolute time; wins over `overlap_ms`
    pub at_ms: Option<Millis>,
}

impl Default for EntranceStep {
    fn default() -> Self {
        Self::new(VisualPatch::new().opacity(0.0), 800.0)
    }
}

impl EntranceStep {
    pub fn new(from: VisualPatch, duration_ms: Millis) -> Self {
        Self {
            from,
            duration_ms,
            easing: Easing::power3_out(),
            stagger_ms: 0.0,
            overlap_ms: None,
            at_ms: None,
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn stagger(mut self, each_ms: Millis) -> Self {
        self.stagger_ms = each_ms;
        self
    }

    pub fn overlap(mut self, ms: Millis) -> Self {
        self.overlap_ms = Some(ms);
        self
    }

    pub fn at(mut self, ms: Millis) -> Self {
        self.at_ms = Some(ms);
        self
    }

    /// Placement on the timeline
    pub fn position(&self) -> Position {
        match (self.at_ms, self.overlap_ms) {
            (Some(at), _) => Position::At(at),
            (None, Some(overlap)) => Position::RelativeToEnd(overlap),
            (None, None) => Position::Sequential,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    /// Wait before the entrance timeline starts
    pub initial_delay_ms: Millis,
    pub title: EntranceStep,
    pub subtitle: EntranceStep,
    pub tags: EntranceStep,
    pub image: EntranceStep,
    pub scroll_indicator: EntranceStep,
    /// Profile image fade once the entrance is done
    pub profile_fade_ms: Millis,
    pub profile_fade_easing: Easing,
    /// Hero visibility ratio that counts as intersecting
    pub intersection_threshold: f32,
    /// Leave whitespace-only title runs unanimated
    pub skip_blank_runs: bool,
}

impl Default for HeroConfig {
    fn default() -> Self {
        let back_out = Easing::BackOut { overshoot: 1.7 };
        Self {
            initial_delay_ms: 300.0,
            title: EntranceStep::new(
                VisualPatch::new().opacity(0.0).y(50.0).rotation_x(-90.0),
                400.0,
            )
            .easing(back_out)
            .stagger(20.0),
            subtitle: EntranceStep::new(VisualPatch::new().opacity(0.0).y(30.0), 800.0)
                .overlap(400.0),
            tags: EntranceStep::new(VisualPatch::new().opacity(0.0).scale(0.0).y(20.0), 500.0)
                .easing(back_out)
                .stagger(100.0)
                .overlap(400.0),
            image: EntranceStep::new(VisualPatch::new().scale(0.0).rotation(180.0), 500.0)
                .easing(Easing::ElasticOut {
                    amplitude: 1.0,
                    period: 0.5,
                })
                .at(200.0),
            scroll_indicator: EntranceStep::new(VisualPatch::new().opacity(0.0).y(-20.0), 600.0)
                .easing(Easing::power2_out())
                .overlap(200.0),
            profile_fade_ms: 50.0,
            profile_fade_easing: Easing::power(2, EaseKind::InOut),
            intersection_threshold: 0.1,
            skip_blank_runs: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Resolution the artwork is authored at
    pub reference: Size,
    pub objects: Vec<StageObject>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            reference: Size::new(1440.0, 1024.0),
            objects: StageObject::defaults(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxConfig {
    /// Hero content drift per scrolled pixel
    pub hero: f32,
    /// Profile image drift per scrolled pixel
    pub image: f32,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            hero: 0.3,
            image: 0.1,
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionLayout {
    /// Entries alternate sides of a central line
    Alternating,
    #[default]
    Grid,
    Column,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    #[default]
    Light,
    Muted,
    Glass,
    Dark,
}

/// Presentation of a section
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionStyle {
    pub layout: SectionLayout,
    pub scheme: ColorScheme,
    /// Easing for reveals that do not name their own
    pub easing: Easing,
}

impl Default for SectionStyle {
    fn default() -> Self {
        Self {
            layout: SectionLayout::Grid,
            scheme: ColorScheme::Light,
            easing: Easing::power3_out(),
        }
    }
}

impl SectionStyle {
    pub fn new(layout: SectionLayout, scheme: ColorScheme) -> Self {
        Self {
            layout,
            scheme,
            ..Default::default()
        }
    }
}

/// A scroll-triggered reveal recipe
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub start: TriggerStart,
    pub end: TriggerEnd,
    pub actions: ToggleActions,
    pub stagger_ms: Millis,
    pub duration_ms: Millis,
    /// Falls back to the section style's easing
    pub easing: Option<Easing>,
    pub from: VisualPatch,
    pub to: VisualPatch,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            start: TriggerPoint::top_at(0.8),
            end: TriggerPoint::default_end(),
            actions: ToggleActions::PLAY_REVERSE,
            stagger_ms: 0.0,
            duration_ms: 800.0,
            easing: None,
            from: VisualPatch::new(),
            to: VisualPatch::new(),
        }
    }
}

impl RevealConfig {
    pub fn new(from: VisualPatch, start: TriggerStart) -> Self {
        Self {
            from,
            start,
            ..Default::default()
        }
    }

    pub fn duration(mut self, ms: Millis) -> Self {
        self.duration_ms = ms;
        self
    }

    pub fn stagger(mut self, each_ms: Millis) -> Self {
        self.stagger_ms = each_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    /// Resolve into a reveal spec under a section style
    pub fn spec(&self, style: &SectionStyle) -> RevealSpec {
        RevealSpec::from_to(self.from, self.to)
            .duration(self.duration_ms)
            .easing(self.easing.unwrap_or(style.easing))
            .stagger(self.stagger_ms)
            .start(self.start)
            .end(self.end)
            .actions(self.actions)
    }
}

/// Style plus reveal for a section of uniform cards
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionConfig {
    pub style: SectionStyle,
    pub reveal: RevealConfig,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            style: SectionStyle::default(),
            reveal: RevealConfig::default(),
        }
    }
}

impl SectionConfig {
    pub fn skills() -> Self {
        Self {
            style: SectionStyle::new(SectionLayout::Grid, ColorScheme::Muted),
            reveal: RevealConfig::new(
                VisualPatch::new().opacity(0.0).y(50.0),
                TriggerPoint::top_at(0.8),
            )
            .stagger(150.0),
        }
    }

    pub fn projects() -> Self {
        Self {
            style: SectionStyle::new(SectionLayout::Grid, ColorScheme::Light),
            reveal: RevealConfig::new(
                VisualPatch::new().opacity(0.0).y(60.0).rotation(5.0),
                TriggerPoint::top_at(0.75),
            )
            .stagger(200.0),
        }
    }

    pub fn contact() -> Self {
        Self {
            style: SectionStyle::new(SectionLayout::Grid, ColorScheme::Light),
            reveal: RevealConfig::new(
                VisualPatch::new().opacity(0.0).y(40.0),
                TriggerPoint::top_at(0.8),
            )
            .stagger(150.0)
            .duration(600.0),
        }
    }

    pub fn footer() -> Self {
        Self {
            style: SectionStyle::new(SectionLayout::Column, ColorScheme::Dark),
            reveal: RevealConfig::new(
                VisualPatch::new().opacity(0.0).y(30.0),
                TriggerPoint::top_at(0.9),
            ),
        }
    }
}

/// The experience timeline: a growing line, popping dots and cards
/// sliding in from alternating sides
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
    pub style: SectionStyle,
    pub line: RevealConfig,
    pub dots: RevealConfig,
    /// Applied per card, each triggered by its own card
    pub cards: RevealConfig,
    /// Horizontal slide distance of the cards (px)
    pub card_offset_x: f32,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            style: SectionStyle::new(SectionLayout::Alternating, ColorScheme::Glass),
            line: RevealConfig::new(VisualPatch::new().scale_y(0.0), TriggerPoint::top_at(0.7))
                .duration(1500.0)
                .easing(Easing::power2_out()),
            dots: RevealConfig::new(VisualPatch::new().scale(0.0), TriggerPoint::top_at(0.7))
                .stagger(200.0)
                .duration(600.0)
                .easing(Easing::BackOut { overshoot: 1.7 }),
            cards: RevealConfig::new(VisualPatch::new().opacity(0.0), TriggerPoint::top_at(0.85)),
            card_offset_x: 100.0,
        }
    }
}

impl ExperienceConfig {
    /// Card `index` slides in from the left when even, from the right when odd
    pub fn card_spec(&self, index: usize) -> RevealSpec {
        let side = if index % 2 == 0 { -1.0 } else { 1.0 };
        let mut cards = self.cards;
        cards.from = cards.from.x(side * self.card_offset_x);
        cards.to = cards.to.x(0.0);
        cards.spec(&self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_layout::{Edge, ToggleAction};

    #[test]
    fn test_defaults_match_observed_page() {
        let config = PageConfig::default();
        assert_eq!(config.sections.len(), 5);
        assert_eq!(config.sections[1], "experience");
        assert_eq!(config.header.nav_offset, 80.0);
        assert_eq!(config.hero.initial_delay_ms, 300.0);
        assert_eq!(config.hero.title.stagger_ms, 20.0);
        assert_eq!(config.hero.subtitle.position(), Position::RelativeToEnd(400.0));
        assert_eq!(config.hero.image.position(), Position::At(200.0));
        assert_eq!(config.projects.reveal.start, TriggerPoint::top_at(0.75));
        assert_eq!(config.projects.reveal.from.rotation, Some(5.0));
        assert_eq!(config.experience.line.duration_ms, 1500.0);
        assert_eq!(config.footer.reveal.start, TriggerPoint::top_at(0.9));
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = PageConfig::from_toml_str(
            r#"
            sections = ["about", "contact"]

            [tracker]
            probe_line = 120.0

            [stage]
            objects = []

            [projects.reveal]
            start = "center 60%"
            actions = "play pause resume reset"
            easing = "expo.out"
            "#,
        )
        .unwrap();

        assert_eq!(config.tracker.probe_line, 120.0);
        assert_eq!(config.tracker.scrolled_threshold, 20.0);
        assert_eq!(config.sections.len(), 2);

        let reveal = config.projects.reveal;
        assert_eq!(reveal.start, TriggerPoint::new(Edge::CENTER, Edge::Fraction(0.6)));
        assert_eq!(reveal.actions.on_leave, ToggleAction::Pause);
        assert_eq!(reveal.easing, Some(Easing::ExpoOut));
        // a present table starts from the generic reveal defaults
        assert_eq!(reveal.duration_ms, 800.0);
        assert_eq!(reveal.stagger_ms, 0.0);
        assert_eq!(config.skills, SectionConfig::skills());
        assert!(config.section_registry().is_ok());
    }

    #[test]
    fn test_bad_easing_is_a_config_error() {
        let err = PageConfig::from_toml_str("[header]\nnav_easing = \"wobble\"").unwrap_err();
        assert!(matches!(err, FolioError::ConfigParse(_)));
    }

    #[test]
    fn test_stage_link_to_missing_section() {
        let config = PageConfig {
            sections: vec!["about".into()],
            ..Default::default()
        };
        match config.section_registry() {
            Err(FolioError::UnknownSection(id)) => assert_eq!(id, "projects"),
            other => panic!("expected unknown section, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_section_list_rejected() {
        let config = PageConfig {
            sections: Vec::new(),
            stage: StageConfig {
                objects: Vec::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            config.section_registry(),
            Err(FolioError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_reveal_easing_falls_back_to_style() {
        let config = PageConfig::default();
        let spec = config.skills.reveal.spec(&config.skills.style);
        assert_eq!(spec.easing, Easing::power3_out());
        assert_eq!(spec.stagger.each_ms, 150.0);

        let line = config.experience.line.spec(&config.experience.style);
        assert_eq!(line.easing, Easing::power2_out());
    }

    #[test]
    fn test_experience_cards_alternate_sides() {
        let config = ExperienceConfig::default();
        assert_eq!(config.card_spec(0).from.x, Some(-100.0));
        assert_eq!(config.card_spec(1).from.x, Some(100.0));
        assert_eq!(config.card_spec(2).to.x, Some(0.0));
        assert_eq!(config.card_spec(3).start, TriggerPoint::top_at(0.85));
    }
}
