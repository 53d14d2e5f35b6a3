//! Domain layer for the keygrid engine.
//!
//! This module contains the value types every other layer speaks in, independent
//! of any platform input or pointer API.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`geometry`]: Points, rectangles and the display layout
//! - [`keys`]: Keys, modifiers and raw keyboard events
//!
//! # Examples
//!
//! ```
//! use keygrid::domain::{Bounds, Point};
//!
//! let screen = Bounds::new(0.0, 0.0, 1920.0, 1080.0);
//! assert_eq!(screen.center(), Point::new(960.0, 540.0));
//! ```

pub mod error;
pub mod geometry;
pub mod keys;

pub use error::{KeygridError, Result};
pub use geometry::{Bounds, DisplayLayout, Point};
pub use keys::{Direction, EventKind, Key, KeyBinding, KeyEvent, Letter, Modifiers};
