//! Host hooks - Controls, year label, and legend.
//!
//! The host page drives the chart through a small set of identified
//! elements. This module maps those identifiers onto [`Command`]s so
//! the chart never touches the host's element tree directly: the host
//! reports clicks by id, and reads back what to display.
//!
//! A hook whose element is absent from the host simply has no trigger;
//! that is not fatal to anything else (a click on an unbound id is
//! logged at debug level and dropped).

use std::collections::HashSet;
use std::rc::Rc;

use crate::controller::{Command, InteractionController};
use crate::scale::SexScale;
use crate::types::{Rgba, Sex, ViewState};

/// Host element id: step one census year back.
pub const HOOK_DECREMENT: &str = "decrement";
/// Host element id: step one census year forward.
pub const HOOK_INCREMENT: &str = "increment";
/// Host element id: toggle the displayed sex.
pub const HOOK_SWITCH_SEX: &str = "switch-sex";
/// Host element id: label showing the current year.
pub const HOOK_YEAR_LABEL: &str = "curr-year-naive";

/// Opacity of the legend swatch for the sex not being shown.
pub const LEGEND_INACTIVE_OPACITY: f32 = 0.5;

// =============================================================================
// HostHooks
// =============================================================================

/// Binding between host element ids and chart commands.
pub struct HostHooks {
    controller: Rc<InteractionController>,
    present: HashSet<String>,
}

impl HostHooks {
    /// Bind against the element ids the host actually has. Ids the
    /// chart does not know are ignored; known ids that are missing
    /// just never fire.
    pub fn bind(controller: Rc<InteractionController>, available: &[&str]) -> Self {
        let present: HashSet<String> = available.iter().map(|id| (*id).to_string()).collect();
        for id in [HOOK_DECREMENT, HOOK_INCREMENT, HOOK_SWITCH_SEX, HOOK_YEAR_LABEL] {
            if !present.contains(id) {
                tracing::debug!(id, "host element missing, hook unbound");
            }
        }
        Self {
            controller,
            present,
        }
    }

    /// A click arrived on a host element. Returns true if it mapped to
    /// an accepted command.
    pub fn click(&self, id: &str) -> bool {
        if !self.present.contains(id) {
            tracing::debug!(id, "click on unbound element ignored");
            return false;
        }

        let command = match id {
            HOOK_DECREMENT => Command::Step(-1),
            HOOK_INCREMENT => Command::Step(1),
            HOOK_SWITCH_SEX => Command::SwitchSex,
            _ => {
                tracing::debug!(id, "no command for element");
                return false;
            }
        };
        self.controller.dispatch(command)
    }

    /// Text for the year label, if the host has one.
    ///
    /// Reads the live view state, so it is current immediately after
    /// any accepted state change.
    pub fn year_label(&self) -> Option<String> {
        if !self.present.contains(HOOK_YEAR_LABEL) {
            return None;
        }
        Some(self.controller.view_state().year.to_string())
    }

    /// A click arrived on a legend swatch.
    pub fn legend_click(&self, sex: Sex) -> bool {
        self.controller.dispatch(Command::SelectSex(sex))
    }

    /// Legend swatches for the current view state.
    pub fn legend(&self) -> [LegendSwatch; 2] {
        legend_for(self.controller.view_state())
    }
}

// =============================================================================
// Legend
// =============================================================================

/// One swatch-and-text legend entry.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendSwatch {
    pub sex: Sex,
    pub color: Rgba,
    pub label: &'static str,
    /// Whether this swatch's sex is the one being shown.
    pub active: bool,
    /// 1.0 when active, [`LEGEND_INACTIVE_OPACITY`] otherwise.
    pub opacity: f32,
    /// Bold label for the active sex.
    pub bold: bool,
}

/// Build the two legend swatches for a view state.
pub fn legend_for(state: ViewState) -> [LegendSwatch; 2] {
    let colors = SexScale;
    [Sex::Male, Sex::Female].map(|sex| {
        let active = sex == state.sex;
        LegendSwatch {
            sex,
            color: colors.color(sex),
            label: match sex {
                Sex::Male => "Male",
                Sex::Female => "Female",
            },
            active,
            opacity: if active { 1.0 } else { LEGEND_INACTIVE_OPACITY },
            bold: active,
        }
    })
}

// =============================================================================
// Tests
// =============================================================================
