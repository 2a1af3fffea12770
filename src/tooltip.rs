//! TooltipPresenter - The single shared hover annotation.
//!
//! One tooltip exists per process; it is exclusively owned by the
//! currently hovered bar. `show` takes ownership for a key, `hide`
//! releases it - a hide from a key that does not own the tooltip is
//! ignored, so a stale hover-leave can never hide another bar's
//! annotation.
//!
//! # API
//!
//! - `show(key, people, anchor)` - take ownership, render near anchor
//! - `hide(key)` - release if `key` owns the tooltip
//! - `tooltip_state()` - snapshot for the host renderer
//! - `reset_tooltip_state()` - test isolation

use std::cell::RefCell;

use crate::types::Key;

/// Fixed offset from the anchor point, in pixels.
pub const TOOLTIP_OFFSET: (f32, f32) = (12.0, -24.0);

// =============================================================================
// State
// =============================================================================

/// Snapshot of the tooltip for the host renderer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TooltipState {
    /// Key of the owning bar while visible.
    pub owner: Option<Key>,
    /// Rendered content, e.g. `"10,596 people"`.
    pub content: String,
    /// Top-left position (anchor plus [`TOOLTIP_OFFSET`]).
    pub position: (f32, f32),
}

impl TooltipState {
    pub fn is_visible(&self) -> bool {
        self.owner.is_some()
    }
}

thread_local! {
    static TOOLTIP: RefCell<TooltipState> = RefCell::new(TooltipState::default());
}

// =============================================================================
// Public API
// =============================================================================

/// Show the tooltip for a bar.
///
/// The hovering bar takes exclusive ownership; a later `show` from a
/// different bar simply transfers it (the pointer can only be over one
/// bar at a time).
pub fn show(key: Key, people: i64, anchor: (f32, f32)) {
    TOOLTIP.with(|tooltip| {
        let mut tooltip = tooltip.borrow_mut();
        tooltip.owner = Some(key);
        tooltip.content = format!("{} people", format_thousands(people));
        tooltip.position = (anchor.0 + TOOLTIP_OFFSET.0, anchor.1 + TOOLTIP_OFFSET.1);
    });
}

/// Hide the tooltip if `key` currently owns it.
pub fn hide(key: Key) {
    TOOLTIP.with(|tooltip| {
        let mut tooltip = tooltip.borrow_mut();
        if tooltip.owner == Some(key) {
            *tooltip = TooltipState::default();
        }
    });
}

/// Current tooltip snapshot.
pub fn tooltip_state() -> TooltipState {
    TOOLTIP.with(|tooltip| tooltip.borrow().clone())
}

/// Reset the tooltip (for testing).
pub fn reset_tooltip_state() {
    TOOLTIP.with(|tooltip| *tooltip.borrow_mut() = TooltipState::default());
}

// =============================================================================
// Formatting
// =============================================================================

/// Group digits with commas: `1234567` -> `"1,234,567"`.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
