//! Scales - Row to pixel geometry and color.
//!
//! Simple collaborators of the core: a band scale over the distinct
//! age-group domain, a linear scale over `[0, max(people)]`, and a
//! two-color ordinal scale over sex. Built once at mount from the
//! dataset; the reconciler and scheduler consume them only to turn a
//! [`Row`] into target geometry and fill color.

use std::collections::HashMap;

use crate::data::DataStore;
use crate::types::{BarRect, Rgba, Row, Sex, CHART_HEIGHT, CHART_WIDTH};

/// Inner/outer padding of the band scale, as a fraction of the step.
const BAND_PADDING: f32 = 0.1;

// =============================================================================
// BandScale
// =============================================================================

/// Maps an ordinal age-group domain onto evenly spaced pixel bands.
#[derive(Debug, Clone)]
pub struct BandScale {
    positions: HashMap<i32, f32>,
    bandwidth: f32,
}

impl BandScale {
    /// Build a band scale over `domain` (ascending, distinct) mapped
    /// onto `[0, range]` with [`BAND_PADDING`] on both sides.
    pub fn new(domain: &[i32], range: f32) -> Self {
        let n = domain.len() as f32;
        // Degenerate domain still yields a usable (empty) scale.
        if domain.is_empty() {
            return Self {
                positions: HashMap::new(),
                bandwidth: 0.0,
            };
        }

        let step = range / (n + BAND_PADDING);
        let bandwidth = step * (1.0 - BAND_PADDING);
        let start = step * BAND_PADDING;

        let positions = domain
            .iter()
            .enumerate()
            .map(|(i, &age)| (age, start + step * i as f32))
            .collect();

        Self {
            positions,
            bandwidth,
        }
    }

    /// Left edge of the band for an age group, if it is in the domain.
    pub fn position(&self, age_group: i32) -> Option<f32> {
        self.positions.get(&age_group).copied()
    }

    /// Width of every band.
    pub fn bandwidth(&self) -> f32 {
        self.bandwidth
    }
}

// =============================================================================
// LinearScale
// =============================================================================

/// Maps `[0, max]` population counts onto `[height, 0]` pixel y.
///
/// y grows downward, so larger populations map to smaller y and the
/// zero-population baseline sits at `height`.
#[derive(Debug, Clone, Copy)]
pub struct LinearScale {
    max: f32,
    height: f32,
}

impl LinearScale {
    pub fn new(max: i64, height: f32) -> Self {
        Self {
            max: max.max(1) as f32,
            height,
        }
    }

    /// Pixel y for a population count.
    pub fn scale(&self, people: i64) -> f32 {
        let t = (people as f32 / self.max).clamp(0.0, 1.0);
        self.height * (1.0 - t)
    }

    /// The population-zero y coordinate.
    pub fn baseline(&self) -> f32 {
        self.height
    }
}

// =============================================================================
// SexScale
// =============================================================================

/// Two-color ordinal scale over sex.
#[derive(Debug, Clone, Copy, Default)]
pub struct SexScale;

impl SexScale {
    /// Fill color for a sex.
    pub fn color(&self, sex: Sex) -> Rgba {
        match sex {
            Sex::Male => Rgba::MALE_FILL,
            Sex::Female => Rgba::FEMALE_FILL,
        }
    }
}

// =============================================================================
// ScaleProvider
// =============================================================================

/// The bundle of scales the core consumes.
#[derive(Debug, Clone)]
pub struct ScaleProvider {
    pub band: BandScale,
    pub linear: LinearScale,
    pub color: SexScale,
}

impl ScaleProvider {
    /// Build all scales from the dataset.
    pub fn from_store(store: &DataStore) -> Self {
        Self {
            band: BandScale::new(&store.age_domain(), CHART_WIDTH),
            linear: LinearScale::new(store.max_people(), CHART_HEIGHT),
            color: SexScale,
        }
    }

    /// Target rectangle for a row, or `None` if its age group is not
    /// in the band domain.
    pub fn rect_for(&self, row: &Row) -> Option<BarRect> {
        let x = self.band.position(row.age_group)?;
        let y = self.linear.scale(row.people);
        Some(BarRect {
            x,
            y,
            width: self.band.bandwidth(),
            height: self.linear.baseline() - y,
        })
    }

    /// Baseline rectangle for a row: zero height at the
    /// population-zero y. Enter bars are created here; exit bars
    /// collapse to here.
    pub fn baseline_rect_for(&self, row: &Row) -> Option<BarRect> {
        let x = self.band.position(row.age_group)?;
        Some(BarRect {
            x,
            y: self.linear.baseline(),
            width: self.band.bandwidth(),
            height: 0.0,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_scale_positions_ascending() {
        let scale = BandScale::new(&[0, 10, 20], 300.0);
        let x0 = scale.position(0).unwrap();
        let x10 = scale.position(10).unwrap();
        let x20 = scale.position(20).unwrap();
        assert!(x0 < x10 && x10 < x20);
        // Evenly stepped.
        assert!(((x10 - x0) - (x20 - x10)).abs() < 1e-3);
        assert!(scale.bandwidth() > 0.0);
        assert!(scale.position(30).is_none());
    }

    #[test]
    fn test_band_scale_fits_range() {
        let domain: Vec<i32> = (0..10).map(|i| i * 10).collect();
        let scale = BandScale::new(&domain, 600.0);
        let last = scale.position(90).unwrap();
        assert!(last + scale.bandwidth() <= 600.0 + 1e-3);
    }

    #[test]
    fn test_band_scale_empty_domain() {
        let scale = BandScale::new(&[], 600.0);
        assert_eq!(scale.bandwidth(), 0.0);
        assert!(scale.position(0).is_none());
    }

    #[test]
    fn test_linear_scale_endpoints() {
        let scale = LinearScale::new(1000, 400.0);
        assert_eq!(scale.scale(0), 400.0);
        assert_eq!(scale.scale(1000), 0.0);
        assert_eq!(scale.scale(500), 200.0);
        assert_eq!(scale.baseline(), 400.0);
    }

    #[test]
    fn test_linear_scale_clamps() {
        let scale = LinearScale::new(1000, 400.0);
        assert_eq!(scale.scale(2000), 0.0);
    }

    #[test]
    fn test_sex_colors_distinct() {
        let scale = SexScale;
        assert_ne!(scale.color(Sex::Male), scale.color(Sex::Female));
    }

    #[test]
    fn test_rect_height_matches_baseline() {
        use crate::types::Row;

        let store = DataStore::from_rows(vec![
            Row { year: 1900, age_group: 0, sex: Sex::Female, people: 500 },
            Row { year: 1900, age_group: 10, sex: Sex::Female, people: 1000 },
        ])
        .unwrap();
        let scales = ScaleProvider::from_store(&store);

        let rect = scales.rect_for(&store.rows()[0]).unwrap();
        assert!((rect.y + rect.height - CHART_HEIGHT).abs() < 1e-3);
        // Half the max population, half the height.
        assert!((rect.height - CHART_HEIGHT / 2.0).abs() < 1e-3);

        let baseline = scales.baseline_rect_for(&store.rows()[0]).unwrap();
        assert_eq!(baseline.height, 0.0);
        assert_eq!(baseline.y, CHART_HEIGHT);
        assert_eq!(baseline.x, rect.x);
    }
}
