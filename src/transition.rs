//! TransitionScheduler - Named, cancellable animation groups.
//!
//! Three groups (`enter`, `update`, `exit`) animate the three
//! partitions of a reconciliation pass concurrently. Each group runs
//! for a fixed duration with cubic-in-out easing and carries its own
//! in-flight run; scheduling a group while its previous run is still
//! in flight cancels that run and replaces it with one targeting the
//! freshly computed values (last write wins per group). Different
//! groups never interrupt each other.
//!
//! Time is injected: the scheduler holds no clock and never blocks.
//! Scheduling is fire-and-forget; the host drives progress by calling
//! [`TransitionScheduler::advance`] from its animation/timer facility
//! and applies the returned samples to the render surface.
//!
//! # Example
//!
//! ```ignore
//! let mut scheduler = TransitionScheduler::new();
//! scheduler.schedule(Group::Update, tweens, t0);
//!
//! // later, from the host's frame callback:
//! let result = scheduler.advance(t0 + 250.0);
//! for sample in &result.samples {
//!     surface.apply_sample(sample);
//! }
//! ```

use std::collections::HashMap;

use crate::types::{BarRect, Key, Rgba};

/// Fixed duration of every group run, in host time units.
pub const DURATION: f32 = 500.0;

// =============================================================================
// Easing
// =============================================================================

/// Cubic in-out easing: slow start, slow finish.
#[inline]
pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let u = -2.0 * t + 2.0;
        1.0 - u * u * u / 2.0
    }
}

// =============================================================================
// Types
// =============================================================================

/// The three animation groups, one per partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    Enter,
    Update,
    Exit,
}

/// The animated visual attributes of one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarAttrs {
    pub rect: BarRect,
    pub fill: Rgba,
}

impl BarAttrs {
    /// Interpolate between two attribute sets at eased progress `t`.
    #[inline]
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self {
            rect: BarRect::lerp(a.rect, b.rect, t),
            fill: Rgba::lerp(a.fill, b.fill, t),
        }
    }
}

/// One bar's animation within a group run: from -> to over the run's
/// duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub key: Key,
    pub from: BarAttrs,
    pub to: BarAttrs,
}

/// An interpolated attribute sample produced by [`TransitionScheduler::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub group: Group,
    pub key: Key,
    pub attrs: BarAttrs,
}

/// Everything one `advance` call produced: the current attribute
/// samples plus the groups that finished at this instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceResult {
    pub samples: Vec<Sample>,
    pub completed: Vec<Group>,
}

// One in-flight run of a named group.
#[derive(Debug, Clone)]
struct GroupRun {
    started_at: f64,
    tweens: Vec<Tween>,
}

// =============================================================================
// TransitionScheduler
// =============================================================================

/// Drives the three concurrently running animation groups.
#[derive(Debug, Default)]
pub struct TransitionScheduler {
    runs: HashMap<Group, GroupRun>,
}

impl TransitionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a group's run at instant `now`.
    ///
    /// A still-running previous run of the same group is cancelled and
    /// replaced; other groups are untouched. An empty tween list
    /// clears the group instead of scheduling a no-op run.
    ///
    /// Returns true if an in-flight run was superseded.
    pub fn schedule(&mut self, group: Group, tweens: Vec<Tween>, now: f64) -> bool {
        let superseded = self.runs.remove(&group).is_some();
        if superseded {
            tracing::trace!(?group, "superseding in-flight run");
        }

        if !tweens.is_empty() {
            self.runs.insert(
                group,
                GroupRun {
                    started_at: now,
                    tweens,
                },
            );
        }
        superseded
    }

    /// Whether a group currently has an in-flight run.
    pub fn is_running(&self, group: Group) -> bool {
        self.runs.contains_key(&group)
    }

    /// Whether any group has an in-flight run.
    pub fn is_animating(&self) -> bool {
        !self.runs.is_empty()
    }

    /// Cancel a group's run without sampling it.
    pub fn cancel(&mut self, group: Group) {
        self.runs.remove(&group);
    }

    /// Advance all groups to instant `now`.
    ///
    /// Produces one sample per tween of every in-flight run; a run
    /// whose duration has elapsed samples exactly at its targets, is
    /// removed, and its group is reported in `completed`.
    pub fn advance(&mut self, now: f64) -> AdvanceResult {
        let mut result = AdvanceResult::default();

        // Stable order keeps output deterministic.
        for group in [Group::Enter, Group::Update, Group::Exit] {
            let Some(run) = self.runs.get(&group) else {
                continue;
            };

            let elapsed = (now - run.started_at) as f32;
            let progress = (elapsed / DURATION).clamp(0.0, 1.0);
            let eased = ease_cubic_in_out(progress);

            for tween in &run.tweens {
                result.samples.push(Sample {
                    group,
                    key: tween.key,
                    attrs: BarAttrs::lerp(tween.from, tween.to, eased),
                });
            }

            if progress >= 1.0 {
                result.completed.push(group);
            }
        }

        for group in &result.completed {
            self.runs.remove(group);
        }

        result
    }

    /// Drop every in-flight run.
    pub fn reset(&mut self) {
        self.runs.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
