//! InteractionController - User commands against the view state.
//!
//! The original UI scattered behavior across host-element callbacks;
//! here every interaction is a value in a finite [`Command`] set
//! dispatched through one entry point, so a test (or a replay log) can
//! drive the chart without any host page.
//!
//! State-changing commands mutate the [`ViewState`] signal; the render
//! pass installed by the pipeline reacts to that mutation synchronously,
//! so mutation and reconciliation are atomic with respect to the next
//! command. A command dispatched re-entrantly while a pass is mid-flight
//! is queued and drained right after it, preserving the single-writer
//! rule over the rendered map.
//!
//! Hover commands never touch the view state and never trigger a pass:
//! they only dim/restore the bar and move the shared tooltip.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use spark_signals::{signal, Signal};

use crate::surface::RenderSurface;
use crate::tooltip;
use crate::types::{Key, Sex, ViewState, YEAR_MAX, YEAR_MIN, YEAR_STEP};

// =============================================================================
// Commands
// =============================================================================

/// The finite set of user interactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Step the year by `direction * 10`; out-of-range is a no-op.
    Step(i32),
    /// Toggle between Male and Female.
    SwitchSex,
    /// Set the sex directly (legend click).
    SelectSex(Sex),
    /// Pointer entered a bar.
    HoverEnter(Key),
    /// Pointer left a bar.
    HoverLeave(Key),
}

// =============================================================================
// InteractionController
// =============================================================================

/// Translates commands into state changes and hover effects.
///
/// Exactly one controller exists per chart; it is the only writer of
/// the view state and (through dispatch) of the rendered set.
pub struct InteractionController {
    view_state: Signal<ViewState>,
    surface: Rc<RefCell<RenderSurface>>,
    dispatching: Cell<bool>,
    queue: RefCell<VecDeque<Command>>,
}

impl InteractionController {
    /// Create a controller over a shared render surface, starting from
    /// the initial view state.
    pub fn new(surface: Rc<RefCell<RenderSurface>>) -> Self {
        Self {
            view_state: signal(ViewState::initial()),
            surface,
            dispatching: Cell::new(false),
            queue: RefCell::new(VecDeque::new()),
        }
    }

    /// The view-state signal. The pipeline's render effect reads it;
    /// nothing but the controller writes it.
    pub fn view_state_signal(&self) -> Signal<ViewState> {
        self.view_state.clone()
    }

    /// Current view state.
    pub fn view_state(&self) -> ViewState {
        self.view_state.get()
    }

    /// Dispatch one command. Returns true if the command was accepted
    /// (caused a state mutation or a hover effect); no-ops return
    /// false.
    ///
    /// Re-entrant dispatches (issued while an earlier command's
    /// mutation-and-reconciliation step is mid-flight) are queued and
    /// report true optimistically.
    pub fn dispatch(&self, command: Command) -> bool {
        if self.dispatching.get() {
            tracing::trace!(?command, "queueing re-entrant command");
            self.queue.borrow_mut().push_back(command);
            return true;
        }

        self.dispatching.set(true);
        let accepted = self.run(command);

        // Drain anything that arrived while the pass was mid-flight.
        loop {
            let Some(queued) = self.queue.borrow_mut().pop_front() else {
                break;
            };
            self.run(queued);
        }
        self.dispatching.set(false);

        accepted
    }

    fn run(&self, command: Command) -> bool {
        tracing::debug!(?command, "dispatch");
        match command {
            Command::Step(direction) => self.step(direction),
            Command::SwitchSex => {
                let state = self.view_state.get();
                self.set_state(ViewState {
                    sex: state.sex.toggled(),
                    ..state
                })
            }
            Command::SelectSex(sex) => {
                let state = self.view_state.get();
                self.set_state(ViewState { sex, ..state })
            }
            Command::HoverEnter(key) => self.hover_enter(key),
            Command::HoverLeave(key) => self.hover_leave(key),
        }
    }

    fn step(&self, direction: i32) -> bool {
        let state = self.view_state.get();
        let new_year = state.year + direction * YEAR_STEP;
        if !(YEAR_MIN..=YEAR_MAX).contains(&new_year) {
            tracing::debug!(new_year, "step out of range, ignoring");
            return false;
        }
        self.set_state(ViewState {
            year: new_year,
            ..state
        })
    }

    // Setting the signal runs the render effect synchronously, so the
    // mutation and its reconciliation pass are one atomic step.
    fn set_state(&self, new_state: ViewState) -> bool {
        if new_state == self.view_state.get() {
            return false;
        }
        self.view_state.set(new_state);
        true
    }

    fn hover_enter(&self, key: Key) -> bool {
        let mut surface = self.surface.borrow_mut();
        if !surface.set_hovered(key, true) {
            return false;
        }
        let bar = surface.bars()[&key];
        drop(surface);

        tooltip::show(key, bar.row.people, (bar.rect.x, bar.rect.y));
        true
    }

    fn hover_leave(&self, key: Key) -> bool {
        let restored = self.surface.borrow_mut().set_hovered(key, false);
        tooltip::hide(key);
        restored
    }
}

// =============================================================================
// Tests
// =============================================================================
