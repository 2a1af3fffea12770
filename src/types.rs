//! Core types for cohort-chart.
//!
//! These types define the foundation that everything builds on.
//! They flow from the dataset through the reconciler into the render surface.

use serde::{Deserialize, Serialize};

// =============================================================================
// Chart geometry constants
// =============================================================================

/// Inner chart width in pixels (bars area, excluding margins).
pub const CHART_WIDTH: f32 = 600.0;

/// Inner chart height in pixels (bars area, excluding margins).
pub const CHART_HEIGHT: f32 = 400.0;

/// Margins around the inner chart group.
///
/// The render surface is `CHART_WIDTH + left + right` by
/// `CHART_HEIGHT + top + bottom`; the inner group holding axes, bars
/// and legend is offset by (left, top).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

/// Default chart margins.
pub const MARGIN: Margin = Margin {
    top: 50.0,
    right: 50.0,
    bottom: 50.0,
    left: 100.0,
};

/// First census year in the dataset.
pub const YEAR_MIN: i32 = 1900;

/// Last census year in the dataset.
pub const YEAR_MAX: i32 = 2000;

/// Census interval: one step moves ten years.
pub const YEAR_STEP: i32 = 10;

// =============================================================================
// Sex
// =============================================================================

/// Sex of a census cohort.
///
/// Wire codes follow the dataset: Male = 1, Female = 2. Anything else
/// is rejected at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// The other sex (used by the switch-sex command).
    pub const fn toggled(self) -> Self {
        match self {
            Self::Male => Self::Female,
            Self::Female => Self::Male,
        }
    }

    /// Dataset wire code (1 = Male, 2 = Female).
    pub const fn code(self) -> u8 {
        match self {
            Self::Male => 1,
            Self::Female => 2,
        }
    }
}

impl TryFrom<u8> for Sex {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Male),
            2 => Ok(Self::Female),
            other => Err(format!("invalid sex code: {other} (expected 1 or 2)")),
        }
    }
}

impl From<Sex> for u8 {
    fn from(sex: Sex) -> Self {
        sex.code()
    }
}

// =============================================================================
// Row
// =============================================================================

/// One census record: population of an age cohort for a year and sex.
///
/// Immutable once loaded; the full collection is the dataset of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Census year (1900..=2000 in steps of 10).
    pub year: i32,
    /// Ordinal cohort id: lower bound of the age bracket (0, 10, ... 90).
    pub age_group: i32,
    /// Sex of the cohort.
    pub sex: Sex,
    /// Population count, never negative.
    pub people: i64,
}

// =============================================================================
// ViewState
// =============================================================================

/// The one piece of mutable chart state: which year and sex are shown.
///
/// Owned by the interaction controller and passed into filtering and
/// reconciliation explicitly; there is no ambient global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub year: i32,
    pub sex: Sex,
}

impl ViewState {
    /// Initial state: first census year, female cohorts.
    pub const fn initial() -> Self {
        Self {
            year: YEAR_MIN,
            sex: Sex::Female,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::initial()
    }
}

// =============================================================================
// Key
// =============================================================================

/// Identity key used by the keyed join.
///
/// For rows of the target year the key is `age_group - step`, so a
/// cohort's bar matches the same bar from the previous year under
/// forward stepping (object constancy). For everything else (including
/// already-rendered bars) it is the plain `age_group`.
pub type Key = i32;

/// Compute the join key for a row given the target year and signed step.
pub fn row_key(row: &Row, target_year: i32, step: i32) -> Key {
    if row.year == target_year {
        row.age_group - step
    } else {
        row.age_group
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Axis-aligned bar rectangle in inner-chart pixel coordinates.
///
/// `y` grows downward (SVG convention): the baseline for a zero-height
/// bar sits at `y = CHART_HEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BarRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BarRect {
    /// Linear interpolation between two rects.
    #[inline]
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            width: a.width + (b.width - a.width) * t,
            height: a.height + (b.height - a.height) * t,
        }
    }
}

// =============================================================================
// Color
// =============================================================================

/// RGBA color with 8-bit channels (0-255).
///
/// Using integers for exact comparison - no floating point epsilon needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Create a new RGBA color.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque RGB color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Fill color for male cohorts (steel blue).
    pub const MALE_FILL: Self = Self::rgb(70, 130, 180);

    /// Fill color for female cohorts (rose).
    pub const FEMALE_FILL: Self = Self::rgb(231, 84, 128);

    /// Linear interpolation between two colors.
    #[inline]
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv_t = 1.0 - t;

        Self {
            r: ((a.r as f32 * inv_t) + (b.r as f32 * t)) as u8,
            g: ((a.g as f32 * inv_t) + (b.g as f32 * t)) as u8,
            b: ((a.b as f32 * inv_t) + (b.b as f32 * t)) as u8,
            a: ((a.a as f32 * inv_t) + (b.a as f32 * t)) as u8,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
