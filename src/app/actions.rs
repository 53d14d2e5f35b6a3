//! Actions emitted by the engine for its external collaborators.
//!
//! This module defines the [`Action`] type, the commands produced by the event
//! handler after interpreting a key, plus the per-event [`Verdict`] that tells
//! the event source whether to swallow the key.
//!
//! # Architecture
//!
//! The handler returns an [`Outcome`] per event: one verdict and a `Vec<Action>`
//! in the order the collaborators must observe them. Pointer actions go to the
//! [`PointerActuator`], overlay actions to the [`OverlayRenderer`]. Neither
//! collaborator reports anything back to the engine.
//!
//! # Example
//!
//! ```rust
//! use keygrid::app::actions::{Action, ClickKind, Outcome, PointerAction};
//!
//! let outcome = Outcome::consume(vec![Action::Pointer(PointerAction::Click(ClickKind::Left))]);
//! assert!(outcome.is_consumed());
//! ```

use crate::domain::{Bounds, Letter, Point};
use crate::grid::GridLayout;
use serde::{Deserialize, Serialize};

/// Mouse button semantics of a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickKind {
    Left,
    Right,
    Middle,
    Double,
}

/// Scroll wheel axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
}

/// Commands for the pointer actuator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerAction {
    /// Places the cursor at an absolute point.
    Move(Point),

    /// Places the cursor at an absolute point while the drag button stays held.
    DragMove(Point),

    /// Clicks at the current cursor position.
    Click(ClickKind),

    /// Presses and holds the primary button at the current position.
    DragStart,

    /// Releases the held button.
    DragStop,

    /// Scrolls by `delta` lines; positive reveals content above or to the left.
    Scroll { axis: ScrollAxis, delta: f64 },
}

/// Commands for the overlay renderer.
///
/// Every `Show*` variant replaces whatever overlay is currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayAction {
    /// Draws the primary grid.
    Show(GridLayout),

    /// Draws the free-move indicator.
    ShowFreeMove,

    /// Removes any overlay.
    Hide,

    /// Replaces the primary grid with the refinement grid over `bounds`.
    EnterRefinement(Bounds),

    /// Returns from the refinement grid to the primary grid.
    ExitRefinement,

    /// Emphasizes a primary grid row, or clears the emphasis.
    HighlightRow(Option<Letter>),
}

/// A single command for one of the collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", content = "action", rename_all = "snake_case")]
pub enum Action {
    Pointer(PointerAction),
    Overlay(OverlayAction),
}

/// What the event source must do with the original event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Swallow the event; the desktop never sees it.
    Consume,

    /// Deliver the event unmodified.
    PassThrough,

    /// The intercept was disabled by the OS; re-enable it once.
    ReenableSource,
}

/// Result of interpreting one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub verdict: Verdict,
    pub actions: Vec<Action>,
}

impl Outcome {
    #[must_use]
    pub const fn consume(actions: Vec<Action>) -> Self {
        Self {
            verdict: Verdict::Consume,
            actions,
        }
    }

    #[must_use]
    pub const fn pass_through() -> Self {
        Self {
            verdict: Verdict::PassThrough,
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub const fn reenable_source() -> Self {
        Self {
            verdict: Verdict::ReenableSource,
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.verdict == Verdict::Consume
    }

    /// Pointer actions in emission order.
    pub fn pointer_actions(&self) -> impl Iterator<Item = &PointerAction> {
        self.actions.iter().filter_map(|action| match action {
            Action::Pointer(p) => Some(p),
            Action::Overlay(_) => None,
        })
    }

    /// Overlay actions in emission order.
    pub fn overlay_actions(&self) -> impl Iterator<Item = &OverlayAction> {
        self.actions.iter().filter_map(|action| match action {
            Action::Overlay(o) => Some(o),
            Action::Pointer(_) => None,
        })
    }

    /// Routes every action to its collaborator, preserving order.
    pub fn dispatch<A, R>(&self, actuator: &mut A, renderer: &mut R)
    where
        A: PointerActuator + ?Sized,
        R: OverlayRenderer + ?Sized,
    {
        for action in &self.actions {
            match action {
                Action::Pointer(p) => actuator.perform(p),
                Action::Overlay(o) => renderer.apply(o),
            }
        }
    }
}

/// Executes pointer actions against the real cursor.
pub trait PointerActuator {
    fn perform(&mut self, action: &PointerAction);
}

/// Draws the grid and mode overlays.
pub trait OverlayRenderer {
    fn apply(&mut self, action: &OverlayAction);
}
