//! Timelines
//!
//! A timeline sequences tweens for any number of targets on one playhead.
//! Entries are placed with position parameters (append, overlap the end,
//! absolute), can be staggered across a list of targets, and labelled cues
//! fire as the playhead passes them.
//!
//! ```
//! use folio_animation::{Easing, Position, StaggerConfig, Timeline, Tween, TargetId, VisualPatch};
//!
//! let chars: Vec<TargetId> = (0..3).map(|i| TargetId::indexed("title", i)).collect();
//! let mut tl = Timeline::new();
//! tl.stagger(
//!     &chars,
//!     Tween::from(VisualPatch::new().opacity(0.0).y(50.0), 400.0).easing(Easing::back_out()),
//!     StaggerConfig::new(20.0),
//!     Position::Sequential,
//! );
//! tl.call(Position::Sequential, "done");
//!
//! tl.play();
//! let cues = tl.tick(1000.0);
//! assert_eq!(cues[0].label, "done");
//! assert_eq!(tl.state_of(&chars[2]).unwrap().opacity, 1.0);
//! ```

use std::fmt;
use std::rc::Rc;

use folio_core::Millis;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::tween::Tween;
use crate::values::VisualState;

/// Identifies an animated element
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(Rc<str>);

impl TargetId {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self(name.into())
    }

    /// `"{prefix}.{index}"`, for members of a staggered group
    pub fn indexed(prefix: &str, index: usize) -> Self {
        Self(format!("{prefix}.{index}").into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TargetId({})", self.0)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TargetId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TargetId {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

/// Where an entry is placed on the timeline
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Position {
    /// At the current end of the timeline
    #[default]
    Sequential,
    /// This many ms before the current end (overlap)
    RelativeToEnd(Millis),
    /// At an absolute time
    At(Millis),
}

/// Direction for staggered starts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaggerDirection {
    /// Animate first to last
    #[default]
    Forward,
    /// Animate last to first
    Reverse,
    /// Animate from center outward
    FromCenter,
}

/// Configuration for staggered entries
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerConfig {
    /// Delay between each target's start (ms)
    pub each_ms: Millis,
    pub direction: StaggerDirection,
    /// Optional: limit stagger to first N items
    pub limit: Option<usize>,
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl StaggerConfig {
    pub fn new(each_ms: Millis) -> Self {
        Self {
            each_ms,
            direction: StaggerDirection::Forward,
            limit: None,
        }
    }

    /// Stagger from last to first
    pub fn reverse(mut self) -> Self {
        self.direction = StaggerDirection::Reverse;
        self
    }

    /// Stagger from center outward
    pub fn from_center(mut self) -> Self {
        self.direction = StaggerDirection::FromCenter;
        self
    }

    /// Limit stagger to first N items
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Start offset for a specific target index
    pub fn delay_for_index(&self, index: usize, total: usize) -> Millis {
        let effective_index = match self.direction {
            StaggerDirection::Forward => index,
            StaggerDirection::Reverse => total.saturating_sub(1).saturating_sub(index),
            StaggerDirection::FromCenter => {
                let center = total / 2;
                index.abs_diff(center)
            }
        };

        let capped_index = match self.limit {
            Some(limit) => effective_index.min(limit),
            None => effective_index,
        };

        self.each_ms * capped_index as Millis
    }
}

/// A labelled point on the timeline
#[derive(Clone, Debug, PartialEq)]
pub struct Cue {
    pub label: String,
    pub at_ms: Millis,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlayDirection {
    #[default]
    Forward,
    Reverse,
}

#[derive(Clone, Debug)]
struct Entry {
    target: TargetId,
    tween: Tween,
    start_ms: Millis,
}

impl Entry {
    fn end_ms(&self) -> Millis {
        self.start_ms + self.tween.duration_ms
    }
}

/// A sequence of tweens on a shared playhead
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    entries: Vec<Entry>,
    cues: Vec<Cue>,
    bases: FxHashMap<TargetId, VisualState>,
    duration_ms: Millis,
    delay_ms: Millis,
    delay_remaining: Millis,
    playhead: Millis,
    direction: PlayDirection,
    playing: bool,
    /// Whether the playhead has been rendered at least once since (re)start
    started: bool,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait `delay_ms` before the first forward play from the start
    pub fn with_delay(mut self, delay_ms: Millis) -> Self {
        self.delay_ms = delay_ms.max(0.0);
        self
    }

    /// Resting state of a target when no tween overrides it
    pub fn set_base(&mut self, target: impl Into<TargetId>, state: VisualState) {
        self.bases.insert(target.into(), state);
    }

    // =========================================================================
    // BUILDING
    // =========================================================================

    fn resolve(&self, position: Position) -> Millis {
        match position {
            Position::Sequential => self.duration_ms,
            Position::RelativeToEnd(ms) => (self.duration_ms - ms).max(0.0),
            Position::At(ms) => ms.max(0.0),
        }
    }

    /// Add one tween; returns its start time
    pub fn add(&mut self, target: impl Into<TargetId>, tween: Tween, position: Position) -> Millis {
        let start_ms = self.resolve(position);
        let entry = Entry {
            target: target.into(),
            tween,
            start_ms,
        };
        self.duration_ms = self.duration_ms.max(entry.end_ms());
        self.entries.push(entry);
        start_ms
    }

    /// Add the same tween for each target, offset by the stagger config
    ///
    /// Returns the group's start time. An empty target list adds nothing.
    pub fn stagger(
        &mut self,
        targets: &[TargetId],
        tween: Tween,
        config: StaggerConfig,
        position: Position,
    ) -> Millis {
        let start_ms = self.resolve(position);
        let total = targets.len();
        let mut end = self.duration_ms;
        for (index, target) in targets.iter().enumerate() {
            let entry = Entry {
                target: target.clone(),
                tween,
                start_ms: start_ms + config.delay_for_index(index, total),
            };
            end = end.max(entry.end_ms());
            self.entries.push(entry);
        }
        self.duration_ms = end;
        start_ms
    }

    /// Register a labelled cue; returns its time
    pub fn call(&mut self, position: Position, label: impl Into<String>) -> Millis {
        let at_ms = self.resolve(position);
        self.cues.push(Cue {
            label: label.into(),
            at_ms,
        });
        self.duration_ms = self.duration_ms.max(at_ms);
        at_ms
    }

    // =========================================================================
    // PLAYBACK
    // =========================================================================

    /// Play forward from the playhead
    ///
    /// A timeline already at its end in the forward direction is left as is.
    pub fn play(&mut self) {
        if self.direction == PlayDirection::Forward && self.started && self.at_end() {
            return;
        }
        if self.playhead <= 0.0 && !self.started {
            self.delay_remaining = self.delay_ms;
        }
        self.direction = PlayDirection::Forward;
        self.playing = true;
    }

    /// Play backward toward the start
    pub fn reverse(&mut self) {
        self.direction = PlayDirection::Reverse;
        self.delay_remaining = 0.0;
        self.playing = self.playhead > 0.0;
    }

    /// Jump to the start and play forward, re-arming cues and the delay
    pub fn restart(&mut self) {
        self.playhead = 0.0;
        self.started = false;
        self.delay_remaining = self.delay_ms;
        self.direction = PlayDirection::Forward;
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Move the playhead without firing cues
    pub fn seek(&mut self, ms: Millis) {
        self.playhead = ms.clamp(0.0, self.duration_ms);
        self.started = true;
        self.delay_remaining = 0.0;
    }

    /// Jump to the end state and stop
    pub fn complete(&mut self) {
        self.seek(self.duration_ms);
        self.direction = PlayDirection::Forward;
        self.playing = false;
    }

    /// Jump to the start state and stop
    pub fn reset(&mut self) {
        self.playhead = 0.0;
        self.started = false;
        self.delay_remaining = 0.0;
        self.direction = PlayDirection::Forward;
        self.playing = false;
    }

    /// Advance the playhead, returning cues crossed going forward
    pub fn tick(&mut self, dt_ms: Millis) -> Vec<Cue> {
        if !self.playing {
            return Vec::new();
        }
        let mut dt = dt_ms.max(0.0);

        if self.direction == PlayDirection::Forward && self.delay_remaining > 0.0 {
            let used = dt.min(self.delay_remaining);
            self.delay_remaining -= used;
            dt -= used;
            if self.delay_remaining > 0.0 {
                return Vec::new();
            }
        }

        match self.direction {
            PlayDirection::Forward => {
                let prev = if self.started {
                    self.playhead
                } else {
                    Millis::NEG_INFINITY
                };
                let next = (self.playhead + dt).min(self.duration_ms);
                self.started = true;
                self.playhead = next;
                if next >= self.duration_ms {
                    self.playing = false;
                }

                let mut fired: SmallVec<[&Cue; 4]> = self
                    .cues
                    .iter()
                    .filter(|cue| cue.at_ms > prev && cue.at_ms <= next)
                    .collect();
                fired.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
                fired.into_iter().cloned().collect()
            }
            PlayDirection::Reverse => {
                self.started = true;
                self.playhead = (self.playhead - dt).max(0.0);
                if self.playhead <= 0.0 {
                    self.playing = false;
                }
                Vec::new()
            }
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn direction(&self) -> PlayDirection {
        self.direction
    }

    pub fn delay(&self) -> Millis {
        self.delay_ms
    }

    pub fn duration(&self) -> Millis {
        self.duration_ms
    }

    pub fn time(&self) -> Millis {
        self.playhead
    }

    pub fn at_end(&self) -> bool {
        self.playhead >= self.duration_ms
    }

    pub fn at_start(&self) -> bool {
        self.playhead <= 0.0
    }

    /// Playhead position as a fraction of the duration
    pub fn progress(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            return if self.started { 1.0 } else { 0.0 };
        }
        (self.playhead / self.duration_ms).clamp(0.0, 1.0) as f32
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.cues.is_empty()
    }

    /// Distinct targets in insertion order
    pub fn targets(&self) -> Vec<TargetId> {
        let mut seen: Vec<TargetId> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.target) {
                seen.push(entry.target.clone());
            }
        }
        seen
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Visual state of `target` at the playhead
    ///
    /// Entries that have not started yet render their `from` state when
    /// nothing earlier applies; the latest started entry wins. Returns
    /// `None` for targets this timeline does not animate.
    pub fn state_of(&self, target: &TargetId) -> Option<VisualState> {
        let mut entries: SmallVec<[&Entry; 4]> = self
            .entries
            .iter()
            .filter(|entry| &entry.target == target)
            .collect();
        if entries.is_empty() {
            return None;
        }
        entries.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));

        let mut base = self.bases.get(target).copied().unwrap_or_default();
        let mut state = None;
        for entry in entries {
            if entry.start_ms <= self.playhead {
                state = Some(entry.tween.sample(base, self.playhead - entry.start_ms));
                base = entry.tween.end_state(base);
            } else {
                if state.is_none() {
                    state = Some(entry.tween.start_state(base));
                }
                break;
            }
        }
        state
    }
}
