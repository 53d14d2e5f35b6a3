//! Application layer: the mode state machine and the event interpreter.
//!
//! This module sits between the event source and the external collaborators
//! (pointer actuator, overlay renderer). It owns every piece of mutable state
//! in the crate.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow pattern:
//!
//! ```text
//! KeyEvent → Engine::classify → Command → SessionState transition → Outcome
//!                                   │                                  │
//!                      AccelerationState / grid math        Verdict + Vec<Action>
//! ```
//!
//! # Modules
//!
//! - [`acceleration`]: Time-based movement multiplier
//! - [`actions`]: Actions, verdicts and collaborator traits
//! - [`handler`]: The [`Engine`] and its classification precedence
//! - [`modes`]: Mode and capability types
//! - [`state`]: Session state with explicit transition methods
//!
//! # Example
//!
//! ```rust
//! use keygrid::app::{Engine, Mode};
//! use keygrid::domain::{Bounds, DisplayLayout};
//! use keygrid::Config;
//!
//! let displays = DisplayLayout::new(vec![Bounds::new(0.0, 0.0, 1440.0, 900.0)]).unwrap();
//! let engine = Engine::new(Config::default(), displays);
//! assert_eq!(engine.mode(), Mode::Idle);
//! ```

pub mod acceleration;
pub mod actions;
pub mod handler;
pub mod modes;
pub mod state;

pub use acceleration::{AccelerationState, MovementTuning};
pub use actions::{
    Action, ClickKind, OverlayAction, OverlayRenderer, Outcome, PointerAction, PointerActuator,
    ScrollAxis, Verdict,
};
pub use handler::{Command, Engine};
pub use modes::{Capabilities, Mode};
pub use state::{SessionSnapshot, SessionState, Transition};
