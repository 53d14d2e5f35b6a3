//! Session state and mode transitions.
//!
//! This module defines [`SessionState`], the single source of truth for what the
//! next keystroke means. Fields are private so the mode invariants hold by
//! construction:
//!
//! - a pending first letter exists only in [`Mode::GridActive`];
//! - a selected cell exists only in [`Mode::GridRefinement`];
//! - the drag flag is independent of the mode and only changes through
//!   [`SessionState::toggle_drag`].
//!
//! Every transition method returns a [`Transition`] carrying the resulting mode
//! and the actions to emit, in order. Methods invoked in a mode where they are
//! undefined return [`KeygridError::ModeViolation`] and leave the state untouched.
//!
//! # Example
//!
//! ```rust
//! use keygrid::app::{Capabilities, Mode, SessionState};
//! use keygrid::domain::{Bounds, Letter, Point};
//! use keygrid::grid::GridLayout;
//!
//! let grid = GridLayout::primary(Bounds::new(0.0, 0.0, 2600.0, 1300.0));
//! let mut state = SessionState::new(Point::new(0.0, 0.0));
//! state.activate(Capabilities::default(), &grid)?;
//! state.type_letter(Letter::from_char('m').unwrap(), &grid)?;
//! let transition = state.type_letter(Letter::from_char('n').unwrap(), &grid)?;
//! assert_eq!(transition.mode, Mode::GridRefinement);
//! # Ok::<(), keygrid::KeygridError>(())
//! ```

use super::actions::{Action, ClickKind, OverlayAction, PointerAction};
use super::modes::{Capabilities, Mode};
use crate::domain::{Bounds, KeygridError, Letter, Point, Result};
use crate::grid::{GridLayout, Label, RefinementGrid};
use serde::Serialize;

/// Mode change plus the actions it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub mode: Mode,
    pub actions: Vec<Action>,
}

impl Transition {
    const fn stay(mode: Mode) -> Self {
        Self {
            mode,
            actions: Vec::new(),
        }
    }
}

/// Read-only copy of the session for renderers and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub mode: Mode,
    pub pending_first_letter: Option<Letter>,
    pub selected_cell: Option<(Label, Bounds)>,
    pub is_dragging: bool,
    pub cursor_position: Point,
}

/// Central session state container.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    mode: Mode,
    pending_first_letter: Option<Letter>,
    selected_cell: Option<(Label, Bounds)>,
    is_dragging: bool,
    cursor_position: Point,
}

impl SessionState {
    /// Creates an idle session with the cursor cache at `cursor`.
    #[must_use]
    pub const fn new(cursor: Point) -> Self {
        Self {
            mode: Mode::Idle,
            pending_first_letter: None,
            selected_cell: None,
            is_dragging: false,
            cursor_position: cursor,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub const fn pending_first_letter(&self) -> Option<Letter> {
        self.pending_first_letter
    }

    #[must_use]
    pub const fn selected_cell(&self) -> Option<(Label, Bounds)> {
        self.selected_cell
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    #[must_use]
    pub const fn cursor_position(&self) -> Point {
        self.cursor_position
    }

    #[must_use]
    pub const fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            mode: self.mode,
            pending_first_letter: self.pending_first_letter,
            selected_cell: self.selected_cell,
            is_dragging: self.is_dragging,
            cursor_position: self.cursor_position,
        }
    }

    /// Overwrites the cursor cache with a position reported by the owning layer.
    pub fn sync_cursor(&mut self, point: Point) {
        self.cursor_position = point;
    }

    /// Leaves `Idle` for the mode the capabilities allow.
    ///
    /// With no capability enabled the session stays idle and nothing is emitted.
    ///
    /// # Errors
    ///
    /// [`KeygridError::ModeViolation`] if the session is already active.
    pub fn activate(&mut self, caps: Capabilities, primary: &GridLayout) -> Result<Transition> {
        self.require(self.mode == Mode::Idle, "activate")?;

        let Some(mode) = caps.activation_mode() else {
            return Ok(Transition::stay(Mode::Idle));
        };
        self.enter(mode);

        let overlay = match mode {
            Mode::FreeMove => OverlayAction::ShowFreeMove,
            _ => OverlayAction::Show(*primary),
        };
        Ok(self.transition(vec![Action::Overlay(overlay)]))
    }

    /// Returns to `Idle`, clearing every grid field. Dragging is left alone.
    ///
    /// A no-op when already idle.
    pub fn deactivate(&mut self) -> Transition {
        if self.mode == Mode::Idle {
            return Transition::stay(Mode::Idle);
        }
        self.enter(Mode::Idle);
        self.transition(vec![Action::Overlay(OverlayAction::Hide)])
    }

    /// Feeds a grid letter.
    ///
    /// - `GridActive` without a pending letter: remembers it as the row.
    /// - `GridActive` with a pending letter: selects the cell, jumps to its
    ///   center and enters refinement.
    /// - `GridRefinement`: jumps to the letter's sub-cell and stays.
    ///
    /// # Errors
    ///
    /// [`KeygridError::InvalidAddress`] if the cell does not exist in `primary`
    /// (state unchanged), [`KeygridError::ModeViolation`] outside the grid modes.
    pub fn type_letter(&mut self, letter: Letter, primary: &GridLayout) -> Result<Transition> {
        match (self.mode, self.pending_first_letter) {
            (Mode::GridActive, None) => {
                self.pending_first_letter = Some(letter);
                Ok(self.transition(vec![Action::Overlay(OverlayAction::HighlightRow(Some(
                    letter,
                )))]))
            }
            (Mode::GridActive, Some(row)) => {
                let label = Label::new(row, letter);
                let frame = primary
                    .frame_for(&label)
                    .ok_or_else(|| KeygridError::InvalidAddress(label.to_string()))?;

                self.enter(Mode::GridRefinement);
                self.selected_cell = Some((label, frame));
                let jump = self.point_cursor(frame.center());

                Ok(self.transition(vec![
                    jump,
                    Action::Overlay(OverlayAction::EnterRefinement(frame)),
                ]))
            }
            (Mode::GridRefinement, _) => {
                let (_, frame) = self.selected_cell.ok_or(KeygridError::ModeViolation {
                    mode: self.mode,
                    operation: "refine without selected cell",
                })?;
                let point = RefinementGrid::new(frame)
                    .position_for(letter)
                    .ok_or_else(|| KeygridError::InvalidAddress(letter.to_string()))?;

                let jump = self.point_cursor(point);
                Ok(self.transition(vec![jump]))
            }
            _ => Err(self.violation("type_letter")),
        }
    }

    /// Undoes the last grid step.
    ///
    /// Clears the pending row in `GridActive`, leaves refinement back to
    /// `GridActive`, and does nothing in `FreeMove`.
    ///
    /// # Errors
    ///
    /// [`KeygridError::ModeViolation`] when idle.
    pub fn backspace(&mut self) -> Result<Transition> {
        match self.mode {
            Mode::GridActive if self.pending_first_letter.is_some() => {
                self.pending_first_letter = None;
                Ok(self.transition(vec![Action::Overlay(OverlayAction::HighlightRow(None))]))
            }
            Mode::GridActive | Mode::FreeMove => Ok(Transition::stay(self.mode)),
            Mode::GridRefinement => {
                self.enter(Mode::GridActive);
                Ok(self.transition(vec![Action::Overlay(OverlayAction::ExitRefinement)]))
            }
            Mode::Idle => Err(self.violation("backspace")),
        }
    }

    /// Clicks at the cursor. Grid modes deactivate afterwards; free-move stays.
    ///
    /// # Errors
    ///
    /// [`KeygridError::ModeViolation`] when idle.
    pub fn click(&mut self, kind: ClickKind) -> Result<Transition> {
        self.require(self.mode.is_active(), "click")?;

        let mut actions = vec![Action::Pointer(PointerAction::Click(kind))];
        if self.mode.is_grid() {
            actions.extend(self.deactivate().actions);
        }
        Ok(self.transition(actions))
    }

    /// Switches between a grid mode and `FreeMove`.
    ///
    /// A no-op unless both capabilities are enabled.
    ///
    /// # Errors
    ///
    /// [`KeygridError::ModeViolation`] when idle.
    pub fn toggle_mode(&mut self, caps: Capabilities, primary: &GridLayout) -> Result<Transition> {
        self.require(self.mode.is_active(), "toggle_mode")?;

        if !caps.can_toggle() {
            return Ok(Transition::stay(self.mode));
        }

        let overlay = if self.mode == Mode::FreeMove {
            self.enter(Mode::GridActive);
            OverlayAction::Show(*primary)
        } else {
            self.enter(Mode::FreeMove);
            OverlayAction::ShowFreeMove
        };
        Ok(self.transition(vec![Action::Overlay(overlay)]))
    }

    /// Flips the drag flag and emits the matching press or release.
    ///
    /// # Errors
    ///
    /// [`KeygridError::ModeViolation`] when idle.
    pub fn toggle_drag(&mut self) -> Result<Transition> {
        self.require(self.mode.is_active(), "toggle_drag")?;

        self.is_dragging = !self.is_dragging;
        let action = if self.is_dragging {
            PointerAction::DragStart
        } else {
            PointerAction::DragStop
        };
        Ok(self.transition(vec![Action::Pointer(action)]))
    }

    /// Moves the cursor to an already clamped point.
    ///
    /// # Errors
    ///
    /// [`KeygridError::ModeViolation`] when idle.
    pub fn move_to(&mut self, point: Point) -> Result<Transition> {
        self.require(self.mode.is_active(), "move_to")?;
        let action = self.point_cursor(point);
        Ok(self.transition(vec![action]))
    }

    /// Updates the cursor cache and picks a plain or drag move.
    fn point_cursor(&mut self, point: Point) -> Action {
        self.cursor_position = point;
        Action::Pointer(if self.is_dragging {
            PointerAction::DragMove(point)
        } else {
            PointerAction::Move(point)
        })
    }

    /// Switches mode and clears the fields the new mode does not use.
    fn enter(&mut self, mode: Mode) {
        tracing::debug!(from = ?self.mode, to = ?mode, "mode changed");
        self.mode = mode;
        self.pending_first_letter = None;
        self.selected_cell = None;
    }

    fn transition(&self, actions: Vec<Action>) -> Transition {
        debug_assert!(self.pending_first_letter.is_none() || self.mode == Mode::GridActive);
        debug_assert!(self.selected_cell.is_none() || self.mode == Mode::GridRefinement);
        Transition {
            mode: self.mode,
            actions,
        }
    }

    fn require(&self, holds: bool, operation: &'static str) -> Result<()> {
        if holds {
            Ok(())
        } else {
            Err(self.violation(operation))
        }
    }

    const fn violation(&self, operation: &'static str) -> KeygridError {
        KeygridError::ModeViolation {
            mode: self.mode,
            operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> GridLayout {
        GridLayout::primary(Bounds::new(0.0, 0.0, 2600.0, 1300.0))
    }

    fn letter(c: char) -> Letter {
        Letter::from_char(c).unwrap()
    }

    fn active() -> SessionState {
        let mut state = SessionState::new(Point::default());
        state.activate(Capabilities::default(), &grid()).unwrap();
        state
    }

    fn refining() -> SessionState {
        let mut state = active();
        state.type_letter(letter('m'), &grid()).unwrap();
        state.type_letter(letter('n'), &grid()).unwrap();
        state
    }

    #[test]
    fn activation_prefers_grid_then_free_move() {
        let mut state = SessionState::new(Point::default());
        let t = state.activate(Capabilities::default(), &grid()).unwrap();
        assert_eq!(t.mode, Mode::GridActive);
        assert_eq!(t.actions, vec![Action::Overlay(OverlayAction::Show(grid()))]);

        let mut state = SessionState::new(Point::default());
        let caps = Capabilities {
            grid: false,
            free_move: true,
        };
        let t = state.activate(caps, &grid()).unwrap();
        assert_eq!(t.mode, Mode::FreeMove);
        assert_eq!(t.actions, vec![Action::Overlay(OverlayAction::ShowFreeMove)]);

        let mut state = SessionState::new(Point::default());
        let none = Capabilities {
            grid: false,
            free_move: false,
        };
        assert_eq!(state.activate(none, &grid()).unwrap().mode, Mode::Idle);
    }

    #[test]
    fn activate_twice_is_a_mode_violation() {
        let mut state = active();
        assert!(matches!(
            state.activate(Capabilities::default(), &grid()),
            Err(KeygridError::ModeViolation { mode: Mode::GridActive, .. })
        ));
    }

    #[test]
    fn first_letter_pends_second_selects_cell() {
        let mut state = active();

        let t = state.type_letter(letter('m'), &grid()).unwrap();
        assert_eq!(t.mode, Mode::GridActive);
        assert_eq!(state.pending_first_letter(), Some(letter('m')));
        assert_eq!(
            t.actions,
            vec![Action::Overlay(OverlayAction::HighlightRow(Some(letter('m'))))]
        );

        let t = state.type_letter(letter('n'), &grid()).unwrap();
        let frame = grid().frame_for(&"MN".parse().unwrap()).unwrap();
        assert_eq!(t.mode, Mode::GridRefinement);
        assert_eq!(state.pending_first_letter(), None);
        assert_eq!(state.selected_cell(), Some(("MN".parse().unwrap(), frame)));
        assert_eq!(state.cursor_position(), frame.center());
        assert_eq!(
            t.actions,
            vec![
                Action::Pointer(PointerAction::Move(frame.center())),
                Action::Overlay(OverlayAction::EnterRefinement(frame)),
            ]
        );
    }

    #[test]
    fn refinement_letter_jumps_within_selected_cell() {
        let mut state = refining();
        let (_, frame) = state.selected_cell().unwrap();

        let t = state.type_letter(letter('a'), &grid()).unwrap();
        let expected = RefinementGrid::new(frame).position_for(letter('a')).unwrap();
        assert_eq!(t.mode, Mode::GridRefinement);
        assert_eq!(t.actions, vec![Action::Pointer(PointerAction::Move(expected))]);
        assert_eq!(state.cursor_position(), expected);
        assert!(frame.contains(expected));
    }

    #[test]
    fn invalid_cell_leaves_state_unchanged() {
        let small = GridLayout::new(Bounds::new(0.0, 0.0, 100.0, 100.0), 4, 4);
        let mut state = SessionState::new(Point::default());
        state.activate(Capabilities::default(), &small).unwrap();
        state.type_letter(letter('z'), &small).unwrap();
        let before = state.clone();

        assert!(matches!(
            state.type_letter(letter('z'), &small),
            Err(KeygridError::InvalidAddress(_))
        ));
        assert_eq!(state, before);
    }

    #[test]
    fn backspace_steps_back_one_level() {
        let mut state = active();
        state.type_letter(letter('q'), &grid()).unwrap();
        let t = state.backspace().unwrap();
        assert_eq!(t.mode, Mode::GridActive);
        assert_eq!(state.pending_first_letter(), None);
        assert_eq!(t.actions, vec![Action::Overlay(OverlayAction::HighlightRow(None))]);

        // Nothing pending: no-op.
        assert!(state.backspace().unwrap().actions.is_empty());

        let mut state = refining();
        let t = state.backspace().unwrap();
        assert_eq!(t.mode, Mode::GridActive);
        assert_eq!(state.selected_cell(), None);
        assert_eq!(t.actions, vec![Action::Overlay(OverlayAction::ExitRefinement)]);
    }

    #[test]
    fn deactivate_clears_fields_but_keeps_drag() {
        let mut state = active();
        state.toggle_drag().unwrap();
        state.type_letter(letter('b'), &grid()).unwrap();

        let t = state.deactivate();
        assert_eq!(t.mode, Mode::Idle);
        assert_eq!(t.actions, vec![Action::Overlay(OverlayAction::Hide)]);
        assert_eq!(state.pending_first_letter(), None);
        assert!(state.is_dragging());

        assert_eq!(state.deactivate(), Transition::stay(Mode::Idle));
    }

    #[test]
    fn click_deactivates_grid_but_not_free_move() {
        let mut state = refining();
        let t = state.click(ClickKind::Right).unwrap();
        assert_eq!(t.mode, Mode::Idle);
        assert_eq!(
            t.actions,
            vec![
                Action::Pointer(PointerAction::Click(ClickKind::Right)),
                Action::Overlay(OverlayAction::Hide),
            ]
        );

        let mut state = active();
        state.toggle_mode(Capabilities::default(), &grid()).unwrap();
        let t = state.click(ClickKind::Left).unwrap();
        assert_eq!(t.mode, Mode::FreeMove);
        assert_eq!(t.actions.len(), 1);
    }

    #[test]
    fn toggle_mode_requires_both_capabilities() {
        let only_grid = Capabilities {
            grid: true,
            free_move: false,
        };
        let mut state = refining();
        let t = state.toggle_mode(only_grid, &grid()).unwrap();
        assert_eq!(t.mode, Mode::GridRefinement);
        assert!(t.actions.is_empty());

        let t = state.toggle_mode(Capabilities::default(), &grid()).unwrap();
        assert_eq!(t.mode, Mode::FreeMove);
        assert_eq!(state.selected_cell(), None);

        let t = state.toggle_mode(Capabilities::default(), &grid()).unwrap();
        assert_eq!(t.mode, Mode::GridActive);
        assert_eq!(t.actions, vec![Action::Overlay(OverlayAction::Show(grid()))]);
    }

    #[test]
    fn drag_switches_moves_to_drag_moves() {
        let mut state = active();
        let t = state.toggle_drag().unwrap();
        assert_eq!(t.actions, vec![Action::Pointer(PointerAction::DragStart)]);

        let t = state.move_to(Point::new(5.0, 5.0)).unwrap();
        assert_eq!(
            t.actions,
            vec![Action::Pointer(PointerAction::DragMove(Point::new(5.0, 5.0)))]
        );

        let t = state.toggle_drag().unwrap();
        assert_eq!(t.actions, vec![Action::Pointer(PointerAction::DragStop)]);
        assert!(!state.is_dragging());
    }

    #[test]
    fn idle_rejects_active_only_operations() {
        let mut state = SessionState::new(Point::default());
        assert!(state.backspace().is_err());
        assert!(state.click(ClickKind::Left).is_err());
        assert!(state.toggle_drag().is_err());
        assert!(state.move_to(Point::default()).is_err());
        assert!(state.type_letter(letter('a'), &grid()).is_err());
        assert!(state.toggle_mode(Capabilities::default(), &grid()).is_err());
        assert_eq!(state, SessionState::new(Point::default()));
    }
}
