//! RenderSurface - The keyed set of on-screen bars.
//!
//! Owns the live bar map (the "previous" set each reconciliation pass
//! diffs against) plus the bars currently animating out. Applying a
//! [`Partition`] translates it into tweens for the three transition
//! groups; applying an [`AdvanceResult`] writes interpolated attributes
//! back into the bars and finalizes completed exits.
//!
//! # Ownership rules
//!
//! - A bar is created by Enter, mutated by Update, destroyed by Exit.
//! - Exiting bars leave the keyed map the instant their removal is
//!   scheduled. A later pass that reuses the same key therefore
//!   creates a fresh bar; it never resurrects the dying one.
//! - No bar outlives the transition that removes it: a superseded exit
//!   run drops its bars immediately (their removal was already
//!   committed), a completed one drops them at completion.

use std::collections::HashMap;
use std::mem;

use bitflags::bitflags;

use crate::reconcile::Partition;
use crate::scale::ScaleProvider;
use crate::transition::{BarAttrs, Group, AdvanceResult, Sample, TransitionScheduler, Tween};
use crate::types::{BarRect, Key, Rgba, Row};

/// Opacity of a hovered bar.
pub const HOVER_OPACITY: f32 = 0.7;

bitflags! {
    /// Per-bar state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BarFlags: u8 {
        /// The bar responds to hover (set at creation, cleared on exit).
        const HOVERABLE = 1 << 0;
        /// The pointer is currently over the bar.
        const HOVERED = 1 << 1;
        /// The bar is animating out and already left the keyed map.
        const REMOVING = 1 << 2;
    }
}

// =============================================================================
// RenderedBar
// =============================================================================

/// One on-screen rectangle: the ephemeral projection of a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedBar {
    /// Identity in the keyed map (the bar's current `age_group`; for
    /// exiting bars, the join key its removal was computed under).
    pub key: Key,
    /// The bound data row.
    pub row: Row,
    /// Current pixel geometry.
    pub rect: BarRect,
    /// Current fill color.
    pub fill: Rgba,
    /// 1.0 normally, [`HOVER_OPACITY`] while hovered.
    pub opacity: f32,
    pub flags: BarFlags,
}

// =============================================================================
// RenderSurface
// =============================================================================

/// The rendering surface: live bars keyed by cohort, plus the bars
/// currently animating out.
#[derive(Debug, Default)]
pub struct RenderSurface {
    bars: HashMap<Key, RenderedBar>,
    exiting: HashMap<Key, RenderedBar>,
}

impl RenderSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The live keyed map - the "previous" set for the next pass.
    ///
    /// Bars are keyed by their plain `age_group`, which is exactly
    /// what the join key function assigns to already-rendered rows.
    pub fn bars(&self) -> &HashMap<Key, RenderedBar> {
        &self.bars
    }

    /// Bars currently animating out (not part of the key space).
    pub fn exiting(&self) -> impl Iterator<Item = &RenderedBar> {
        self.exiting.values()
    }

    /// Number of live bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Apply one reconciliation partition: seed enter bars at the
    /// baseline, re-key update bars to their new cohorts, move exit
    /// bars out of the key space, and schedule all three groups at the
    /// same instant `now`.
    ///
    /// Rows whose age group is missing from the band domain cannot be
    /// placed; they are skipped with a warning rather than panicking
    /// (load-time validation makes this unreachable for valid data).
    pub fn apply(
        &mut self,
        partition: &Partition,
        scales: &ScaleProvider,
        scheduler: &mut TransitionScheduler,
        now: f64,
    ) {
        // Any in-flight exit run is superseded by this pass; its bars'
        // removal was already committed, so they go now.
        self.exiting.clear();

        let mut previous = mem::take(&mut self.bars);
        let mut enter_tweens = Vec::with_capacity(partition.enter.len());
        let mut update_tweens = Vec::with_capacity(partition.update.len());
        let mut exit_tweens = Vec::with_capacity(partition.exit.len());

        // Exit: collapse to the baseline, then disappear.
        for &key in &partition.exit {
            let Some(mut bar) = previous.remove(&key) else {
                continue;
            };
            let from = BarAttrs {
                rect: bar.rect,
                fill: bar.fill,
            };
            let to = BarAttrs {
                rect: BarRect {
                    x: bar.rect.x,
                    y: bar.rect.y + bar.rect.height,
                    width: bar.rect.width,
                    height: 0.0,
                },
                fill: bar.fill,
            };
            bar.flags.remove(BarFlags::HOVERABLE | BarFlags::HOVERED);
            bar.flags.insert(BarFlags::REMOVING);
            bar.opacity = 1.0;
            exit_tweens.push(Tween { key, from, to });
            self.exiting.insert(key, bar);
        }

        // Update: animate the matched bar to its new cohort's values
        // and re-key it by the new age_group.
        for entry in &partition.update {
            let Some(mut bar) = previous.remove(&entry.key) else {
                continue;
            };
            let Some(target_rect) = scales.rect_for(&entry.row) else {
                tracing::warn!(age_group = entry.row.age_group, "row outside band domain");
                continue;
            };
            let from = BarAttrs {
                rect: bar.rect,
                fill: bar.fill,
            };
            let to = BarAttrs {
                rect: target_rect,
                fill: scales.color.color(entry.row.sex),
            };

            let new_key = entry.row.age_group;
            bar.key = new_key;
            bar.row = entry.row;
            update_tweens.push(Tween {
                key: new_key,
                from,
                to,
            });
            self.bars.insert(new_key, bar);
        }

        // Enter: create at baseline geometry, hoverable immediately.
        for row in &partition.enter {
            let Some(baseline) = scales.baseline_rect_for(row) else {
                tracing::warn!(age_group = row.age_group, "row outside band domain");
                continue;
            };
            let Some(target_rect) = scales.rect_for(row) else {
                continue;
            };
            let fill = scales.color.color(row.sex);
            let key = row.age_group;

            self.bars.insert(
                key,
                RenderedBar {
                    key,
                    row: *row,
                    rect: baseline,
                    fill,
                    opacity: 1.0,
                    flags: BarFlags::HOVERABLE,
                },
            );
            enter_tweens.push(Tween {
                key,
                from: BarAttrs {
                    rect: baseline,
                    fill,
                },
                to: BarAttrs {
                    rect: target_rect,
                    fill,
                },
            });
        }

        debug_assert!(
            previous.is_empty(),
            "partition did not cover the previous key set"
        );

        // All three groups start at the same logical instant.
        scheduler.schedule(Group::Enter, enter_tweens, now);
        scheduler.schedule(Group::Update, update_tweens, now);
        scheduler.schedule(Group::Exit, exit_tweens, now);
    }

    /// Write one interpolated sample back into its bar.
    pub fn apply_sample(&mut self, sample: &Sample) {
        let bar = match sample.group {
            Group::Enter | Group::Update => self.bars.get_mut(&sample.key),
            Group::Exit => self.exiting.get_mut(&sample.key),
        };
        if let Some(bar) = bar {
            bar.rect = sample.attrs.rect;
            bar.fill = sample.attrs.fill;
        }
    }

    /// Apply everything an `advance` call produced: samples first,
    /// then exit finalization.
    pub fn apply_advance(&mut self, result: &AdvanceResult) {
        for sample in &result.samples {
            self.apply_sample(sample);
        }
        if result.completed.contains(&Group::Exit) {
            self.exiting.clear();
        }
    }

    /// Dim or restore a bar on hover. Returns true if the bar exists
    /// and is hoverable (exiting bars are not).
    pub fn set_hovered(&mut self, key: Key, hovered: bool) -> bool {
        let Some(bar) = self.bars.get_mut(&key) else {
            return false;
        };
        if !bar.flags.contains(BarFlags::HOVERABLE) {
            return false;
        }

        bar.flags.set(BarFlags::HOVERED, hovered);
        bar.opacity = if hovered { HOVER_OPACITY } else { 1.0 };
        true
    }

    /// Drop every bar (for tests and teardown).
    pub fn clear(&mut self) {
        self.bars.clear();
        self.exiting.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataStore;
    use crate::reconcile::reconcile;
    use crate::transition::DURATION;
    use crate::types::{Sex, CHART_HEIGHT};

    fn census_rows(year: i32, sex: Sex, ages: &[i32]) -> Vec<Row> {
        ages.iter()
            .map(|&age| Row {
                year,
                age_group: age,
                sex,
                people: 1000 + age as i64,
            })
            .collect()
    }

    fn fixture() -> (DataStore, ScaleProvider) {
        let ages: Vec<i32> = (0..10).map(|i| i * 10).collect();
        let mut rows = Vec::new();
        for &year in &[1900, 1910] {
            rows.extend(census_rows(year, Sex::Female, &ages));
            rows.extend(census_rows(year, Sex::Male, &ages));
        }
        let store = DataStore::from_rows(rows).unwrap();
        let scales = ScaleProvider::from_store(&store);
        (store, scales)
    }

    fn run_pass(
        surface: &mut RenderSurface,
        scheduler: &mut TransitionScheduler,
        scales: &ScaleProvider,
        incoming: &[Row],
        target_year: i32,
        step: i32,
        now: f64,
    ) {
        let partition = reconcile(surface.bars(), incoming, target_year, step).unwrap();
        surface.apply(&partition, scales, scheduler, now);
    }

    #[test]
    fn test_enter_creates_at_baseline_hoverable() {
        let (store, scales) = fixture();
        let mut surface = RenderSurface::new();
        let mut scheduler = TransitionScheduler::new();

        let incoming = store.filter(1900, Sex::Female);
        run_pass(&mut surface, &mut scheduler, &scales, &incoming, 1900, 0, 0.0);

        assert_eq!(surface.len(), 10);
        for bar in surface.bars().values() {
            assert_eq!(bar.rect.height, 0.0);
            assert_eq!(bar.rect.y, CHART_HEIGHT);
            assert!(bar.flags.contains(BarFlags::HOVERABLE));
        }
        assert!(scheduler.is_running(Group::Enter));
        assert!(!scheduler.is_running(Group::Update));
        assert!(!scheduler.is_running(Group::Exit));
    }

    #[test]
    fn test_enter_animates_to_target() {
        let (store, scales) = fixture();
        let mut surface = RenderSurface::new();
        let mut scheduler = TransitionScheduler::new();

        let incoming = store.filter(1900, Sex::Female);
        run_pass(&mut surface, &mut scheduler, &scales, &incoming, 1900, 0, 0.0);

        let result = scheduler.advance(f64::from(DURATION));
        surface.apply_advance(&result);

        for bar in surface.bars().values() {
            let expected = scales.rect_for(&bar.row).unwrap();
            assert_eq!(bar.rect, expected);
        }
        assert!(!scheduler.is_animating());
    }

    #[test]
    fn test_step_rekeys_and_exits() {
        let (store, scales) = fixture();
        let mut surface = RenderSurface::new();
        let mut scheduler = TransitionScheduler::new();

        // Render 1900, settle.
        let first = store.filter(1900, Sex::Female);
        run_pass(&mut surface, &mut scheduler, &scales, &first, 1900, 0, 0.0);
        surface.apply_advance(&scheduler.advance(f64::from(DURATION)));

        // Step to 1910.
        let second = store.filter(1910, Sex::Female);
        let t0 = 1000.0;
        run_pass(&mut surface, &mut scheduler, &scales, &second, 1910, 10, t0);

        // Live bars re-keyed by their 1910 cohorts.
        let mut keys: Vec<Key> = surface.bars().keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, (0..10).map(|i| i * 10).collect::<Vec<_>>());

        // The 1900 age-90 bar is mid-exit: out of the key space but
        // still drawable.
        assert_eq!(surface.exiting().count(), 1);
        let dying = surface.exiting().next().unwrap();
        assert!(dying.flags.contains(BarFlags::REMOVING));
        assert!(!dying.flags.contains(BarFlags::HOVERABLE));

        // Exit completion drops it.
        surface.apply_advance(&scheduler.advance(t0 + f64::from(DURATION)));
        assert_eq!(surface.exiting().count(), 0);
    }

    #[test]
    fn test_update_bar_has_nonzero_geometry_delta() {
        let (store, scales) = fixture();
        let mut surface = RenderSurface::new();
        let mut scheduler = TransitionScheduler::new();

        let first = store.filter(1900, Sex::Female);
        run_pass(&mut surface, &mut scheduler, &scales, &first, 1900, 0, 0.0);
        surface.apply_advance(&scheduler.advance(f64::from(DURATION)));

        let before: HashMap<Key, BarRect> = surface
            .bars()
            .iter()
            .map(|(&k, bar)| (k, bar.rect))
            .collect();

        let second = store.filter(1910, Sex::Female);
        let t0 = 1000.0;
        run_pass(&mut surface, &mut scheduler, &scales, &second, 1910, 10, t0);
        surface.apply_advance(&scheduler.advance(t0 + f64::from(DURATION)));

        // Every persisting cohort slid one band to the right.
        for (&key, bar) in surface.bars() {
            if key == 0 {
                continue; // fresh enter
            }
            let old = before[&(key - 10)];
            assert!(
                (bar.rect.x - old.x).abs() > 1e-3,
                "bar {key} did not move"
            );
        }
    }

    #[test]
    fn test_superseded_exit_drops_bars_immediately() {
        let (store, scales) = fixture();
        let mut surface = RenderSurface::new();
        let mut scheduler = TransitionScheduler::new();

        let first = store.filter(1900, Sex::Female);
        run_pass(&mut surface, &mut scheduler, &scales, &first, 1900, 0, 0.0);
        surface.apply_advance(&scheduler.advance(f64::from(DURATION)));

        // Step forward: age-90 bar starts exiting.
        let second = store.filter(1910, Sex::Female);
        run_pass(&mut surface, &mut scheduler, &scales, &second, 1910, 10, 1000.0);
        assert_eq!(surface.exiting().count(), 1);

        // Step back mid-exit: the old exit run is superseded; its bar
        // is gone, not resurrected.
        let third = store.filter(1900, Sex::Female);
        run_pass(&mut surface, &mut scheduler, &scales, &third, 1900, -10, 1100.0);

        // Exactly one new exit (the 1910 age-0 bar); the 1900 age-90
        // bar from the superseded run is gone.
        let exiting: Vec<&RenderedBar> = surface.exiting().collect();
        assert_eq!(exiting.len(), 1);
        assert_eq!(exiting[0].key, 0);
        assert_eq!(exiting[0].row.year, 1910);
    }

    #[test]
    fn test_sex_switch_pure_updates() {
        let (store, scales) = fixture();
        let mut surface = RenderSurface::new();
        let mut scheduler = TransitionScheduler::new();

        let female = store.filter(1900, Sex::Female);
        run_pass(&mut surface, &mut scheduler, &scales, &female, 1900, 0, 0.0);
        surface.apply_advance(&scheduler.advance(f64::from(DURATION)));

        let male = store.filter(1900, Sex::Male);
        let partition = reconcile(surface.bars(), &male, 1900, 0).unwrap();
        assert!(partition.is_structurally_empty());
        assert_eq!(partition.update.len(), male.len());

        let t0 = 1000.0;
        surface.apply(&partition, &scales, &mut scheduler, t0);
        surface.apply_advance(&scheduler.advance(t0 + f64::from(DURATION)));

        for bar in surface.bars().values() {
            assert_eq!(bar.row.sex, Sex::Male);
            assert_eq!(bar.fill, Rgba::MALE_FILL);
        }
        assert_eq!(surface.exiting().count(), 0);
    }

    #[test]
    fn test_hover_dims_and_restores() {
        let (store, scales) = fixture();
        let mut surface = RenderSurface::new();
        let mut scheduler = TransitionScheduler::new();

        let rows = store.filter(1900, Sex::Female);
        run_pass(&mut surface, &mut scheduler, &scales, &rows, 1900, 0, 0.0);

        assert!(surface.set_hovered(20, true));
        let bar = surface.bars()[&20];
        assert_eq!(bar.opacity, HOVER_OPACITY);
        assert!(bar.flags.contains(BarFlags::HOVERED));

        assert!(surface.set_hovered(20, false));
        assert_eq!(surface.bars()[&20].opacity, 1.0);

        // Unknown key is a no-op.
        assert!(!surface.set_hovered(999, true));
    }
}
