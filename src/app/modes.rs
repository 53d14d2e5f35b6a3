//! Interaction modes and the capabilities that gate them.
//!
//! # State Machine
//!
//! The engine is always in exactly one [`Mode`]:
//! - **Idle**: not capturing; every key except the activation shortcut passes
//!   through to the desktop
//! - **`GridActive`**: the primary grid is shown and letters address a cell
//! - **`GridRefinement`**: a cell was picked; single letters refine within it
//! - **`FreeMove`**: arrows move the cursor continuously with acceleration
//!
//! # Example
//!
//! ```rust
//! use keygrid::app::modes::{Capabilities, Mode};
//!
//! let caps = Capabilities { grid: true, free_move: false };
//! assert_eq!(caps.activation_mode(), Some(Mode::GridActive));
//! assert!(!caps.can_toggle());
//! ```

use serde::{Deserialize, Serialize};

/// Current interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Not capturing input.
    #[default]
    Idle,

    /// Primary grid shown; zero or one letter typed so far.
    GridActive,

    /// A primary cell is selected and its refinement grid is shown.
    GridRefinement,

    /// Continuous arrow-key movement.
    FreeMove,
}

impl Mode {
    /// Whether the engine is capturing input in this mode.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Whether this is one of the two grid modes.
    #[must_use]
    pub const fn is_grid(self) -> bool {
        matches!(self, Self::GridActive | Self::GridRefinement)
    }
}

/// Which interaction styles the user has enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub grid: bool,
    pub free_move: bool,
}

impl Capabilities {
    /// Mode entered by the activation shortcut, grid taking priority.
    ///
    /// `None` when neither capability is enabled.
    #[must_use]
    pub const fn activation_mode(self) -> Option<Mode> {
        if self.grid {
            Some(Mode::GridActive)
        } else if self.free_move {
            Some(Mode::FreeMove)
        } else {
            None
        }
    }

    /// Tab only switches styles when both are available.
    #[must_use]
    pub const fn can_toggle(self) -> bool {
        self.grid && self.free_move
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            grid: true,
            free_move: true,
        }
    }
}
