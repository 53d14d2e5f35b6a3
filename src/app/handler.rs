//! Event interpretation: raw key events in, verdicts and actions out.
//!
//! This module implements the [`Engine`], the single owner of the session state
//! and the acceleration state. Each raw event is first classified into exactly
//! one [`Command`] and then applied.
//!
//! # Precedence
//!
//! Classification checks run highest first; the first match wins:
//!
//! 1. tap-disabled recovery
//! 2. key-up and modifier-change events (see below)
//! 3. activation shortcut (only while idle; every other idle event passes through)
//! 4. escape
//! 5. Return+Shift (right click), Return+Control (middle click),
//!    Return+Option (double click), plain Return (left click)
//! 6. Tab (switch grid / free-move)
//! 7. drag toggle key
//! 8. Command+arrow (scroll), then plain arrow (movement)
//! 9. letter (grid input)
//! 10. backspace
//! 11. anything else is swallowed
//!
//! A key-up is swallowed exactly when the engine consumed the matching key-down,
//! whatever the mode is by the time the key is released. Every other key-up
//! passes through, so the desktop sees either both halves of a keystroke or
//! neither. Modifier changes always pass through.
//!
//! # Recovery
//!
//! Engine-side failures never escape [`Engine::handle_event`]: an invalid address
//! or a mode violation is logged, the key is consumed, and nothing is emitted.
//!
//! # Example
//!
//! ```rust
//! use keygrid::{initialize, Config, Mode};
//! use keygrid::domain::{Bounds, KeyEvent};
//! use std::time::Duration;
//!
//! let config = Config::default();
//! let mut engine = initialize(&config, vec![Bounds::new(0.0, 0.0, 1920.0, 1080.0)])?;
//! let event = KeyEvent::down(config.activation.key, config.activation.modifiers, Duration::ZERO);
//! let outcome = engine.handle_event(&event);
//! assert!(outcome.is_consumed());
//! assert_eq!(engine.mode(), Mode::GridActive);
//! # Ok::<(), keygrid::KeygridError>(())
//! ```

use super::acceleration::{AccelerationState, MovementTuning};
use super::actions::{Action, ClickKind, Outcome, PointerAction, ScrollAxis};
use super::modes::{Capabilities, Mode};
use super::state::{SessionSnapshot, SessionState, Transition};
use crate::domain::{
    Direction, DisplayLayout, EventKind, Key, KeyEvent, KeygridError, Letter, Modifiers, Point,
    Result,
};
use crate::grid::GridLayout;
use crate::Config;
use std::collections::HashSet;

/// Factor applied to the scroll speed while the fast modifier is held.
pub const SCROLL_FAST_FACTOR: f64 = 3.0;

/// Meaning assigned to a raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// The OS disabled the intercept.
    Recover,
    /// Deliver the event untouched.
    PassThrough,
    /// Activation shortcut pressed while idle.
    Activate,
    Escape,
    Click(ClickKind),
    ToggleMode,
    ToggleDrag,
    Scroll(Direction, Modifiers),
    Move(Direction, Modifiers),
    Letter(Letter),
    Backspace,
    /// Unrecognized while active.
    Swallow,
}

/// The input-to-action decision engine.
#[derive(Debug, Clone)]
pub struct Engine {
    config: Config,
    tuning: MovementTuning,
    displays: DisplayLayout,
    primary: GridLayout,
    state: SessionState,
    acceleration: AccelerationState,
    /// Keys whose key-down was consumed and whose key-up is still due.
    held: HashSet<Key>,
}

impl Engine {
    /// Creates an idle engine with the cursor cache at the main display's center.
    #[must_use]
    pub fn new(config: Config, displays: DisplayLayout) -> Self {
        let main = displays.main();
        Self {
            tuning: config.movement_tuning(),
            primary: GridLayout::primary(main),
            state: SessionState::new(main.center()),
            acceleration: AccelerationState::default(),
            held: HashSet::new(),
            displays,
            config,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.state.mode()
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    #[must_use]
    pub const fn acceleration(&self) -> &AccelerationState {
        &self.acceleration
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The primary grid laid over the main display.
    #[must_use]
    pub const fn primary_grid(&self) -> &GridLayout {
        &self.primary
    }

    #[must_use]
    pub const fn displays(&self) -> &DisplayLayout {
        &self.displays
    }

    /// Replaces the display layout after a screen configuration change.
    ///
    /// The cursor cache is clamped into the new desktop. A grid session in
    /// progress keeps its selection; the next activation uses the new grid.
    pub fn set_displays(&mut self, displays: DisplayLayout) {
        tracing::debug!(count = displays.displays().len(), desktop = ?displays.desktop(), "displays changed");
        self.primary = GridLayout::primary(displays.main());
        let cursor = displays.clamp(self.state.cursor_position());
        self.state.sync_cursor(cursor);
        self.displays = displays;
    }

    /// Seeds the cursor cache with the real OS cursor position.
    pub fn sync_cursor(&mut self, point: Point) {
        self.state.sync_cursor(self.displays.clamp(point));
    }

    /// Interprets one raw event.
    ///
    /// Never fails: the worst outcome of any error path is a consumed key with
    /// no actions.
    pub fn handle_event(&mut self, event: &KeyEvent) -> Outcome {
        let _span = tracing::debug_span!(
            "handle_event",
            key = %event.key,
            kind = ?event.kind,
            mode = ?self.state.mode()
        )
        .entered();

        let command = self.classify(event);
        tracing::trace!(command = ?command, "event classified");

        let outcome = match command {
            Command::Recover => {
                tracing::warn!("event source disabled, requesting re-enable");
                Outcome::reenable_source()
            }
            Command::PassThrough => Outcome::pass_through(),
            Command::Swallow => Outcome::consume(Vec::new()),
            command => match self.apply(command, event) {
                Ok(transition) => {
                    if transition.mode == Mode::Idle {
                        self.acceleration.reset();
                    }
                    tracing::debug!(
                        mode = ?transition.mode,
                        action_count = transition.actions.len(),
                        "event handled"
                    );
                    Outcome::consume(transition.actions)
                }
                Err(e) => {
                    debug_assert!(!matches!(e, KeygridError::ModeViolation { .. }), "{e}");
                    tracing::debug!(error = %e, "key had no effect");
                    Outcome::consume(Vec::new())
                }
            },
        };
        self.track_held(event, &outcome);
        outcome
    }

    /// Whether the next key-up of `key` will be swallowed.
    #[must_use]
    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn track_held(&mut self, event: &KeyEvent, outcome: &Outcome) {
        match event.kind {
            EventKind::Down if outcome.is_consumed() => {
                self.held.insert(event.key);
            }
            EventKind::Down | EventKind::Up => {
                self.held.remove(&event.key);
            }
            EventKind::ModifiersChanged | EventKind::TapDisabled => {}
        }
    }

    /// Assigns a meaning to `event` following the fixed precedence.
    #[must_use]
    pub fn classify(&self, event: &KeyEvent) -> Command {
        match event.kind {
            EventKind::TapDisabled => return Command::Recover,
            EventKind::ModifiersChanged => return Command::PassThrough,
            EventKind::Up if self.held.contains(&event.key) => return Command::Swallow,
            EventKind::Up => return Command::PassThrough,
            EventKind::Down => {}
        }

        if self.state.mode() == Mode::Idle {
            let activates = self.config.activation.matches(event)
                && self.capabilities().activation_mode().is_some();
            return if activates {
                Command::Activate
            } else {
                Command::PassThrough
            };
        }

        let mods = event.modifiers;
        match event.key {
            Key::Escape => Command::Escape,
            Key::Return if mods.shift => Command::Click(ClickKind::Right),
            Key::Return if mods.control => Command::Click(ClickKind::Middle),
            Key::Return if mods.option => Command::Click(ClickKind::Double),
            Key::Return => Command::Click(ClickKind::Left),
            Key::Tab => Command::ToggleMode,
            key if key == self.config.drag_toggle => Command::ToggleDrag,
            Key::Arrow(direction) if mods.command => Command::Scroll(direction, mods),
            Key::Arrow(direction) => Command::Move(direction, mods),
            Key::Letter(letter) => Command::Letter(letter),
            Key::Backspace => Command::Backspace,
            Key::Space | Key::Other(_) => Command::Swallow,
        }
    }

    fn apply(&mut self, command: Command, event: &KeyEvent) -> Result<Transition> {
        let caps = self.capabilities();
        match command {
            Command::Activate => self.state.activate(caps, &self.primary),
            Command::Escape => Ok(self.state.deactivate()),
            Command::Click(kind) => self.state.click(kind),
            Command::ToggleMode => self.state.toggle_mode(caps, &self.primary),
            Command::ToggleDrag => self.state.toggle_drag(),
            Command::Scroll(direction, mods) => Ok(self.scroll(direction, mods)),
            Command::Move(direction, mods) => self.movement(direction, mods, event),
            Command::Letter(letter) if self.state.mode().is_grid() => {
                self.state.type_letter(letter, &self.primary)
            }
            Command::Backspace => self.state.backspace(),
            Command::Letter(_)
            | Command::Recover
            | Command::PassThrough
            | Command::Swallow => Ok(Transition {
                mode: self.state.mode(),
                actions: Vec::new(),
            }),
        }
    }

    fn movement(&mut self, direction: Direction, mods: Modifiers, event: &KeyEvent) -> Result<Transition> {
        let multiplier = self
            .acceleration
            .register(direction, event.timestamp, &self.tuning);
        let step = self.tuning.step(multiplier, mods);
        let (ux, uy) = direction.unit();

        let target = self
            .displays
            .clamp(self.state.cursor_position().offset(ux * step, uy * step));

        tracing::trace!(step, multiplier, x = target.x, y = target.y, "cursor moved");
        self.state.move_to(target)
    }

    fn scroll(&self, direction: Direction, mods: Modifiers) -> Transition {
        let speed = if mods.shift {
            self.config.scroll_speed * SCROLL_FAST_FACTOR
        } else {
            self.config.scroll_speed
        };
        let (axis, delta) = match direction {
            Direction::Up => (ScrollAxis::Vertical, speed),
            Direction::Down => (ScrollAxis::Vertical, -speed),
            Direction::Left => (ScrollAxis::Horizontal, speed),
            Direction::Right => (ScrollAxis::Horizontal, -speed),
        };
        Transition {
            mode: self.state.mode(),
            actions: vec![Action::Pointer(PointerAction::Scroll { axis, delta })],
        }
    }

    const fn capabilities(&self) -> Capabilities {
        self.config.capabilities()
    }
}
