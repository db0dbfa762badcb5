//! Hero section
//!
//! The hero plays a one-shot entrance: the title letters flip in one after
//! another, then subtitle, skill tags, profile image and scroll indicator.
//! When the entrance ends the profile image fades out and the character
//! sprite takes its place, following the pointer across the stage.

use folio_animation::{
    Cue, Position, SchedulerHandle, StaggerConfig, TargetId, Timeline, TimelineId, Tween,
    VisualPatch, VisualState,
};
use folio_core::reactive::{ReactiveGraph, Signal};
use folio_core::{Millis, Point, Rect, Size};
use folio_layout::{
    FragmentOptions, MountedText, Parallax, PointerPoseMapper, Pose, ScrollController,
    ScrollTarget, ScrollToOptions, SpritePosition, Stage, StageObject, ViewportMetrics,
};

use crate::config::{HeroConfig, PageConfig, ParallaxConfig};
use crate::content::HeroContent;

/// Animation targets owned by the hero
pub mod targets {
    /// Prefix of the per-letter title targets (`"hero.title.3"`)
    pub const TITLE: &str = "hero.title";
    pub const SUBTITLE: &str = "hero.subtitle";
    /// Prefix of the skill tag targets
    pub const TAG: &str = "hero.tag";
    pub const IMAGE: &str = "hero.image";
    pub const SCROLL_INDICATOR: &str = "hero.scroll";
    /// The hero's content block, moved by parallax
    pub const CONTENT: &str = "hero.content";
    pub const SPRITE: &str = "hero.sprite";
}

/// Cue fired when the profile image starts fading
pub const PROFILE_FADE_CUE: &str = "profile-fade";
/// Cue fired when the character takes over from the profile image
pub const CHARACTER_CUE: &str = "character";

pub struct Hero {
    scheduler: SchedulerHandle,
    config: HeroConfig,
    /// Element observed for intersection
    anchor: String,
    title: MountedText,
    tags: Vec<TargetId>,
    entrance: Option<TimelineId>,
    mapper: PointerPoseMapper,
    stage: Stage,
    objects: Vec<StageObject>,
    content_parallax: Parallax,
    image_parallax: Parallax,
    pose: Signal<Pose>,
}

impl Hero {
    pub fn new(
        graph: &mut ReactiveGraph,
        scheduler: SchedulerHandle,
        anchor: impl Into<String>,
        content: &HeroContent,
        config: &PageConfig,
    ) -> Self {
        let options = FragmentOptions {
            skip_blank_runs: config.hero.skip_blank_runs,
            ..Default::default()
        };
        let ParallaxConfig { hero, image } = config.parallax;
        Self {
            scheduler,
            config: config.hero.clone(),
            anchor: anchor.into(),
            title: MountedText::from_markup(&content.title, options),
            tags: (0..content.tags.len())
                .map(|i| TargetId::indexed(targets::TAG, i))
                .collect(),
            entrance: None,
            mapper: PointerPoseMapper::new(config.pose),
            stage: Stage::new(config.stage.reference),
            objects: config.stage.objects.clone(),
            content_parallax: Parallax::new(hero),
            image_parallax: Parallax::new(image),
            pose: graph.create_signal(Pose::Front),
        }
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn title(&self) -> &MountedText {
        &self.title
    }

    pub fn title_targets(&self) -> Vec<TargetId> {
        self.title.fragmentation().target_ids(targets::TITLE)
    }

    /// Title letters staggered by the entrance
    pub fn animated_title_targets(&self) -> Vec<TargetId> {
        self.title.fragmentation().animated_target_ids(targets::TITLE)
    }

    pub fn pose_signal(&self) -> Signal<Pose> {
        self.pose
    }

    pub fn pose(&self) -> Pose {
        self.mapper.pose()
    }

    pub fn mapper(&self) -> &PointerPoseMapper {
        &self.mapper
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn entrance(&self) -> Option<TimelineId> {
        self.entrance
    }

    // =========================================================================
    // Entrance
    // =========================================================================

    fn build_entrance(&self) -> Timeline {
        let config = &self.config;
        let mut timeline = Timeline::new().with_delay(config.initial_delay_ms);

        let title = self.animated_title_targets();
        if title.is_empty() {
            tracing::debug!("hero title is empty, skipping its entrance step");
        } else {
            let step = &config.title;
            timeline.stagger(
                &title,
                Tween::from(step.from, step.duration_ms).easing(step.easing),
                StaggerConfig::new(step.stagger_ms),
                step.position(),
            );
        }

        let step = &config.subtitle;
        timeline.add(
            targets::SUBTITLE,
            Tween::from(step.from, step.duration_ms).easing(step.easing),
            step.position(),
        );

        if !self.tags.is_empty() {
            let step = &config.tags;
            timeline.stagger(
                &self.tags,
                Tween::from(step.from, step.duration_ms).easing(step.easing),
                StaggerConfig::new(step.stagger_ms),
                step.position(),
            );
        }

        let step = &config.image;
        timeline.add(
            targets::IMAGE,
            Tween::from(step.from, step.duration_ms).easing(step.easing),
            step.position(),
        );

        let step = &config.scroll_indicator;
        timeline.add(
            targets::SCROLL_INDICATOR,
            Tween::from(step.from, step.duration_ms).easing(step.easing),
            step.position(),
        );

        timeline.call(Position::Sequential, PROFILE_FADE_CUE);
        timeline.add(
            targets::IMAGE,
            Tween::to(VisualPatch::new().opacity(0.0), config.profile_fade_ms)
                .easing(config.profile_fade_easing),
            Position::Sequential,
        );
        timeline.call(Position::Sequential, CHARACTER_CUE);
        timeline
    }

    /// Start the entrance; fragments the title on first use
    pub fn play_entrance(&mut self) {
        if self.entrance.is_some() {
            return;
        }
        let mut timeline = self.build_entrance();
        tracing::debug!(
            letters = self.title.tokens().len(),
            duration = timeline.duration(),
            "hero entrance"
        );
        timeline.play();
        self.entrance = self.scheduler.register_timeline(timeline);
    }

    /// React to a cue from the scheduler; returns true if it was ours
    pub fn on_cue(&mut self, timeline: TimelineId, cue: &Cue, now: Millis) -> bool {
        if self.entrance != Some(timeline) {
            return false;
        }
        if cue.label == CHARACTER_CUE {
            self.mapper.mark_entrance_complete(now);
        }
        true
    }

    pub fn is_entrance_complete(&self) -> bool {
        self.mapper.is_sprite_visible()
    }

    // =========================================================================
    // Viewport, Scroll and Pointer
    // =========================================================================

    pub fn resize(&mut self, viewport: Size) {
        self.stage.fit(viewport);
    }

    /// Parallax and hero visibility after a scroll
    pub fn on_scroll<M: ViewportMetrics + ?Sized>(&mut self, metrics: &M) {
        let scroll_y = metrics.scroll_y();
        self.content_parallax.on_scroll(scroll_y);
        self.image_parallax.on_scroll(scroll_y);

        let viewport = metrics.viewport().to_rect();
        let ratio = metrics
            .bounding_rect(&self.anchor)
            .map(|rect| rect.intersection_ratio(&viewport))
            .unwrap_or(0.0);
        self.on_intersection(ratio);
    }

    /// Hero visibility reported by the host
    pub fn on_intersection(&mut self, ratio: f32) {
        let intersecting = ratio >= self.config.intersection_threshold;
        if intersecting != self.mapper.is_intersecting() {
            tracing::debug!(ratio, intersecting, "hero visibility changed");
            self.mapper.set_intersecting(intersecting);
        }
    }

    pub fn on_pointer_move(&mut self, graph: &mut ReactiveGraph, client_x: f32, now: Millis) -> bool {
        let processed = self.mapper.on_pointer_move(client_x, now, &self.stage);
        graph.set(self.pose, self.mapper.pose());
        processed
    }

    /// Per-frame work: idle pose timer and parallax easing
    pub fn tick(&mut self, graph: &mut ReactiveGraph, now: Millis, dt_ms: Millis) {
        if self.mapper.tick(now) {
            graph.set(self.pose, self.mapper.pose());
        }
        self.content_parallax.tick(dt_ms);
        self.image_parallax.tick(dt_ms);
    }

    /// Scroll down by one viewport height
    pub fn scroll_hint(&self, controller: &dyn ScrollController, viewport: Size) {
        tracing::debug!(to = viewport.height, "scroll hint");
        controller.scroll_to(ScrollTarget::Offset(viewport.height), ScrollToOptions::default());
    }

    // =========================================================================
    // Rendering State
    // =========================================================================

    pub fn sprite_position(&self, now: Millis) -> SpritePosition {
        self.mapper.position(now)
    }

    /// Viewport rect of the character sprite
    pub fn sprite_rect(&self, now: Millis) -> Rect {
        let pose = self.mapper.config();
        let side = self.stage.fraction_x(pose.size) * self.stage.size().width;
        let x = self.stage.left() + self.sprite_position(now).to_pixels(self.stage.size().width);
        let y = self.stage.top() + pose.vertical_fraction * self.stage.size().height;
        Rect::new(x - side / 2.0, y - side / 2.0, side, side)
    }

    /// Sprite opacity: hidden until the entrance hands over
    pub fn sprite_state(&self) -> VisualState {
        if self.mapper.is_sprite_visible() {
            VisualState {
                opacity: self.mapper.config().opacity,
                ..VisualState::IDENTITY
            }
        } else {
            VisualState::hidden()
        }
    }

    pub fn objects(&self) -> &[StageObject] {
        &self.objects
    }

    /// Decorative objects with their viewport rects
    pub fn placed_objects(&self) -> impl Iterator<Item = (&StageObject, Rect)> + '_ {
        self.objects
            .iter()
            .map(move |object| (object, self.stage.place(object)))
    }

    /// Topmost decorative object under a viewport point
    pub fn object_at(&self, point: Point) -> Option<&StageObject> {
        self.stage.hit_test(&self.objects, point)
    }

    pub fn content_offset(&self) -> f32 {
        self.content_parallax.offset()
    }

    /// Visual state of a hero target, parallax included
    pub fn visual_state(&self, target: &TargetId) -> Option<VisualState> {
        if target.as_str() == targets::CONTENT {
            return Some(VisualState::IDENTITY.with(&self.content_parallax.patch()));
        }
        if target.as_str() == targets::SPRITE {
            return Some(self.sprite_state());
        }

        let entrance = self
            .entrance
            .and_then(|id| self.scheduler.with_timeline(id, |t| t.state_of(target)))
            .flatten();
        if target.as_str() == targets::IMAGE {
            let mut state = entrance.unwrap_or_default();
            state.y += self.image_parallax.offset();
            return Some(state);
        }
        // letters left out of the entrance render at rest
        entrance.or_else(|| {
            self.title_targets()
                .contains(target)
                .then_some(VisualState::IDENTITY)
        })
    }

    /// Every target the hero animates
    pub fn targets(&self) -> Vec<TargetId> {
        let mut out = self.title_targets();
        out.push(targets::SUBTITLE.into());
        out.extend(self.tags.iter().cloned());
        out.push(targets::IMAGE.into());
        out.push(targets::SCROLL_INDICATOR.into());
        out.push(targets::CONTENT.into());
        out.push(targets::SPRITE.into());
        out
    }
}

impl Drop for Hero {
    fn drop(&mut self) {
        if let Some(id) = self.entrance.take() {
            self.scheduler.remove_timeline(id);
        }
    }
}
