//! Chart pipeline - Mount API and the render-pass effect.
//!
//! Wires the store, scales, surface, scheduler, and controller
//! together and installs the ONE effect that reacts to view-state
//! mutations: filter, reconcile, apply. Because the effect re-runs
//! synchronously when the controller sets the signal, a command's
//! mutation and its reconciliation pass form one atomic step; the
//! command returns as soon as the transitions are scheduled, never
//! waiting for them to finish.
//!
//! # Example
//!
//! ```ignore
//! use cohort_chart::pipeline::mount;
//!
//! let handle = mount(store);
//! handle.dispatch(Command::Step(1));
//!
//! // From the host's animation/timer callback:
//! while handle.tick(now()) {
//!     // bars are interpolating
//! }
//!
//! handle.unmount();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use spark_signals::effect;

use crate::controller::{Command, InteractionController};
use crate::data::DataStore;
use crate::hooks::HostHooks;
use crate::reconcile::reconcile;
use crate::scale::ScaleProvider;
use crate::surface::RenderSurface;
use crate::transition::TransitionScheduler;

// =============================================================================
// ChartHandle
// =============================================================================

/// Handle returned by [`mount`].
///
/// Holds the live pieces a host needs: command dispatch, the render
/// surface to draw from, and the tick entry point that advances
/// animations. Dropping the handle (or calling `unmount`) stops the
/// render effect.
pub struct ChartHandle {
    controller: Rc<InteractionController>,
    surface: Rc<RefCell<RenderSurface>>,
    scheduler: Rc<RefCell<TransitionScheduler>>,
    clock: Rc<Cell<f64>>,
    stop_effect: Option<Box<dyn FnOnce()>>,
}

impl ChartHandle {
    /// Dispatch a user command.
    pub fn dispatch(&self, command: Command) -> bool {
        self.controller.dispatch(command)
    }

    /// The interaction controller (for hook binding).
    pub fn controller(&self) -> Rc<InteractionController> {
        self.controller.clone()
    }

    /// The render surface the host draws from.
    pub fn surface(&self) -> Rc<RefCell<RenderSurface>> {
        self.surface.clone()
    }

    /// Bind host element hooks against this chart.
    pub fn bind_hooks(&self, available: &[&str]) -> HostHooks {
        HostHooks::bind(self.controller.clone(), available)
    }

    /// Advance animations to instant `now` (host time units) and write
    /// the interpolated attributes into the surface.
    ///
    /// Returns true while any group is still in flight.
    pub fn tick(&self, now: f64) -> bool {
        self.clock.set(now);
        let result = self.scheduler.borrow_mut().advance(now);
        self.surface.borrow_mut().apply_advance(&result);
        self.scheduler.borrow().is_animating()
    }

    /// Stop the render effect and drop all rendered state.
    pub fn unmount(mut self) {
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
        self.scheduler.borrow_mut().reset();
        self.surface.borrow_mut().clear();
    }
}

impl Drop for ChartHandle {
    fn drop(&mut self) {
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
    }
}

// =============================================================================
// mount
// =============================================================================

/// Mount the chart over a loaded dataset.
///
/// Builds the scales, creates the surface/scheduler/controller, and
/// installs the render-pass effect. The effect runs once immediately,
/// so the initial view state is rendered (entering from the baseline)
/// before `mount` returns.
pub fn mount(store: DataStore) -> ChartHandle {
    let scales = ScaleProvider::from_store(&store);
    let surface = Rc::new(RefCell::new(RenderSurface::new()));
    let scheduler = Rc::new(RefCell::new(TransitionScheduler::new()));
    let controller = Rc::new(InteractionController::new(surface.clone()));
    let clock = Rc::new(Cell::new(0.0_f64));

    let view_state = controller.view_state_signal();
    let effect_surface = surface.clone();
    let effect_scheduler = scheduler.clone();
    let effect_clock = clock.clone();

    // The signed step feeding the join key is the delta between this
    // pass's year and the previous pass's; the effect remembers the
    // latter the same way the render effect remembers the last
    // terminal size.
    let mut last_year: Option<i32> = None;

    let stop_fn = effect(move || {
        // Read the view state (creates the reactive dependency).
        let state = view_state.get();
        let step = last_year.map_or(0, |prev| state.year - prev);

        let incoming = store.filter(state.year, state.sex);
        let now = effect_clock.get();

        let mut surface = effect_surface.borrow_mut();
        let partition = match reconcile(surface.bars(), &incoming, state.year, step) {
            Ok(partition) => partition,
            Err(err) => {
                // Fatal to this pass, not to the chart: the rendered
                // set is left untouched.
                tracing::error!(%err, year = state.year, "reconciliation failed");
                return;
            }
        };

        surface.apply(
            &partition,
            &scales,
            &mut effect_scheduler.borrow_mut(),
            now,
        );
        last_year = Some(state.year);
    });

    ChartHandle {
        controller,
        surface,
        scheduler,
        clock,
        stop_effect: Some(Box::new(stop_fn)),
    }
}

// =============================================================================
// Tests
// =============================================================================
