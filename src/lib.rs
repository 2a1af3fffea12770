//! # cohort-chart
//!
//! Animated census bar chart engine with keyed reconciliation and
//! object constancy.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals)
//! for fine-grained reactivity.
//!
//! ## Architecture
//!
//! The chart is a reactive pipeline: the interaction controller owns a
//! `ViewState` signal, and the ONE render-pass effect reacts to it:
//!
//! ```text
//! Command → ViewState signal → filter → reconcile → schedule transitions
//! ```
//!
//! The core is the keyed join in [`reconcile`]: given the currently
//! rendered bar set and a freshly filtered row sequence, it partitions
//! bars into Enter/Update/Exit using an identity key that compensates
//! for cohort aging, so a cohort's bar slides across years instead of
//! popping out and back in. The three partitions animate concurrently
//! in named, cancellable transition groups.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Row, Sex, ViewState, Key, geometry, Rgba)
//! - [`data`] - Immutable dataset store with the ordered filtered view
//! - [`scale`] - Band/linear/color scales (Row → pixel geometry)
//! - [`reconcile`] - The Enter/Update/Exit keyed join
//! - [`transition`] - Named, cancellable animation groups
//! - [`surface`] - The rendered keyed bar set
//! - [`controller`] - Command dispatch over the view state
//! - [`tooltip`] - The single shared hover annotation
//! - [`hooks`] - Host controls, year label, legend
//! - [`pipeline`] - Mount API and the render-pass effect

pub mod controller;
pub mod data;
pub mod error;
pub mod hooks;
pub mod pipeline;
pub mod reconcile;
pub mod scale;
pub mod surface;
pub mod tooltip;
pub mod transition;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use controller::{Command, InteractionController};
pub use data::DataStore;
pub use error::{ChartError, Result};
pub use hooks::{legend_for, HostHooks, LegendSwatch};
pub use pipeline::{mount, ChartHandle};
pub use reconcile::{reconcile, Partition, UpdateEntry};
pub use scale::{BandScale, LinearScale, ScaleProvider, SexScale};
pub use surface::{BarFlags, RenderSurface, RenderedBar, HOVER_OPACITY};
pub use tooltip::{format_thousands, reset_tooltip_state, tooltip_state, TooltipState};
pub use transition::{
    ease_cubic_in_out, AdvanceResult, BarAttrs, Group, Sample, TransitionScheduler, Tween,
    DURATION,
};
