//! keygrid: keyboard-only pointer control.
//!
//! keygrid interprets a stream of global keyboard events and turns it into
//! pointer actions:
//! - Two-letter jumps on a 26×26 grid laid over the main display
//! - Single-letter refinement on a 6×5 sub-grid of the chosen cell
//! - Accelerated arrow-key movement, clicks, drags and scrolling
//!
//! The crate is the decision engine only. Receiving OS events, moving the real
//! cursor and painting overlays belong to the owning layer, which talks to the
//! engine through plain values.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Owning layer (main.rs, or a platform shell)        │  ← Event source,
//! └─────────────────────────────────────────────────────┘    actuator, renderer
//!                        │ KeyEvent          ▲ Outcome
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← Engine
//! │  - Classification precedence                        │  ← Mode state machine
//! │  - Session transitions                              │  ← Acceleration
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌───────────────────────────┐   ┌─────────────────────┐
//! │ Grid (grid/)              │   │ Domain (domain/)    │
//! │ - Primary 26×26 labels    │   │ - Geometry, keys    │
//! │ - 6×5 refinement letters  │   │ - Error types       │
//! └───────────────────────────┘   └─────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Observability                     │
//! │  - Config/data directories (infrastructure/)        │
//! │  - OpenTelemetry file export (observability/)       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Engine, mode state machine, acceleration, actions
//! - [`grid`]: Grid coordinate math
//! - [`domain`]: Geometry, keyboard and error types
//! - [`infrastructure`]: Platform directories
//! - `observability`: Tracing initialization with OTLP file export
//!
//! # Configuration
//!
//! Tunables are read from `<config dir>/keygrid/config.toml`:
//!
//! ```toml
//! grid_enabled = true
//! free_move_enabled = true
//! drag_toggle = "d"
//! base_speed = 10.0
//! fast_multiplier = 3.0
//! slow_divisor = 4.0
//! scroll_speed = 3.0
//! acceleration_increment = 0.25
//! max_multiplier = 4.0
//! acceleration_timeout_ms = 150
//! trace_level = "debug"
//!
//! [activation]
//! key = "space"
//! modifiers = { control = true, option = true }
//! ```
//!
//! # Example
//!
//! ```rust
//! use keygrid::{initialize, Config, Mode};
//! use keygrid::app::{Action, PointerAction};
//! use keygrid::domain::{Bounds, Key, KeyEvent, Letter, Modifiers};
//! use std::time::Duration;
//!
//! let config = Config::default();
//! let mut engine = initialize(&config, vec![Bounds::new(0.0, 0.0, 2600.0, 1300.0)])?;
//!
//! let press = |key| KeyEvent::down(key, Modifiers::NONE, Duration::ZERO);
//! let letter = |c| Key::Letter(Letter::from_char(c).unwrap());
//!
//! engine.handle_event(&KeyEvent::down(config.activation.key, config.activation.modifiers, Duration::ZERO));
//! engine.handle_event(&press(letter('m')));
//! let outcome = engine.handle_event(&press(letter('n')));
//!
//! assert_eq!(engine.mode(), Mode::GridRefinement);
//! assert!(matches!(outcome.actions[0], Action::Pointer(PointerAction::Move(_))));
//! # Ok::<(), keygrid::KeygridError>(())
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod domain;
pub mod grid;
pub mod infrastructure;
pub mod observability;

pub use app::{Action, Engine, Mode, Outcome, Verdict};
pub use domain::{KeygridError, Result};

use app::{Capabilities, MovementTuning};
use domain::{Bounds, DisplayLayout, Key, KeyBinding, Letter, Modifiers};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Engine tunables.
///
/// Every field has a default, so a configuration file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Shortcut that activates the engine while idle.
    ///
    /// Default: Control+Option+Space.
    pub activation: KeyBinding,

    /// Key that toggles dragging while active. Default: `D`.
    ///
    /// The drag toggle is checked before grid letters, so a letter here can no
    /// longer be typed as a grid coordinate.
    pub drag_toggle: Key,

    /// Whether the two-letter grid is available.
    pub grid_enabled: bool,

    /// Whether continuous arrow-key movement is available.
    pub free_move_enabled: bool,

    /// Pixels moved per arrow event at multiplier 1.0.
    pub base_speed: f64,

    /// Extra factor while Shift is held.
    pub fast_multiplier: f64,

    /// Divisor of `base_speed` while Option is held.
    pub slow_divisor: f64,

    /// Lines scrolled per Command+arrow event.
    pub scroll_speed: f64,

    /// Multiplier growth per accelerated repeat.
    pub acceleration_increment: f64,

    /// Cap of the acceleration multiplier.
    pub max_multiplier: f64,

    /// Longest gap between arrow events that still accelerates, in milliseconds.
    pub acceleration_timeout_ms: u64,

    /// Tracing filter directive (`trace`, `debug`, `info`, ...). Default: `"info"`.
    pub trace_level: Option<String>,

    /// OTLP JSON trace file. Defaults to `keygrid-otlp.json` in the data directory.
    pub trace_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let tuning = MovementTuning::default();
        #[allow(clippy::cast_possible_truncation)]
        let timeout_ms = tuning.acceleration_timeout.as_millis() as u64;
        Self {
            activation: KeyBinding {
                key: Key::Space,
                modifiers: Modifiers {
                    control: true,
                    option: true,
                    ..Modifiers::NONE
                },
            },
            drag_toggle: Key::Letter(Letter::D),
            grid_enabled: true,
            free_move_enabled: true,
            base_speed: tuning.base_speed,
            fast_multiplier: tuning.fast_multiplier,
            slow_divisor: tuning.slow_divisor,
            scroll_speed: 3.0,
            acceleration_increment: tuning.acceleration_increment,
            max_multiplier: tuning.max_multiplier,
            acceleration_timeout_ms: timeout_ms,
            trace_level: None,
            trace_file: None,
        }
    }
}

impl Config {
    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// [`KeygridError::Toml`] for syntax or type errors, [`KeygridError::Config`]
    /// for values that fail [`Config::validate`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use keygrid::Config;
    ///
    /// let config = Config::from_toml_str("base_speed = 25.0\nfree_move_enabled = false")?;
    /// assert_eq!(config.base_speed, 25.0);
    /// assert!(!config.free_move_enabled);
    /// assert!(config.grid_enabled);
    /// # Ok::<(), keygrid::KeygridError>(())
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a TOML configuration file.
    ///
    /// # Errors
    ///
    /// [`KeygridError::Io`] if the file cannot be read, otherwise as
    /// [`Config::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading configuration");
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Loads `path` if given, else the default config file if it exists, else
    /// the built-in defaults.
    ///
    /// # Errors
    ///
    /// As [`Config::from_file`]. A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match infrastructure::default_config_file() {
            Some(default) if default.is_file() => Self::from_file(default),
            _ => {
                tracing::debug!("no configuration file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Rejects tunables the engine cannot work with.
    ///
    /// # Errors
    ///
    /// [`KeygridError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("base_speed", self.base_speed),
            ("fast_multiplier", self.fast_multiplier),
            ("slow_divisor", self.slow_divisor),
            ("scroll_speed", self.scroll_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(KeygridError::Config(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if !(self.acceleration_increment.is_finite() && self.acceleration_increment >= 0.0) {
            return Err(KeygridError::Config(format!(
                "acceleration_increment must not be negative, got {}",
                self.acceleration_increment
            )));
        }
        if !(self.max_multiplier.is_finite() && self.max_multiplier >= 1.0) {
            return Err(KeygridError::Config(format!(
                "max_multiplier must be at least 1.0, got {}",
                self.max_multiplier
            )));
        }
        if !self.grid_enabled && !self.free_move_enabled {
            return Err(KeygridError::Config(
                "at least one of grid_enabled and free_move_enabled must be true".to_string(),
            ));
        }
        Ok(())
    }

    /// Movement tunables in the form the acceleration model uses.
    #[must_use]
    pub fn movement_tuning(&self) -> MovementTuning {
        MovementTuning {
            base_speed: self.base_speed,
            fast_multiplier: self.fast_multiplier,
            slow_divisor: self.slow_divisor,
            acceleration_increment: self.acceleration_increment,
            max_multiplier: self.max_multiplier,
            acceleration_timeout: Duration::from_millis(self.acceleration_timeout_ms),
        }
    }

    #[must_use]
    pub const fn capabilities(&self) -> Capabilities {
        Capabilities {
            grid: self.grid_enabled,
            free_move: self.free_move_enabled,
        }
    }
}

/// Validates the configuration and builds an idle engine over `displays`.
///
/// `displays` lists display bounds with the main display first.
///
/// # Errors
///
/// [`KeygridError::Config`] if the configuration is invalid or no usable
/// display is given.
pub fn initialize(config: &Config, displays: Vec<Bounds>) -> Result<Engine> {
    tracing::debug!(display_count = displays.len(), "initializing keygrid engine");

    config.validate()?;
    let layout = DisplayLayout::new(displays)
        .ok_or_else(|| KeygridError::Config("at least one non-empty display is required".to_string()))?;

    Ok(Engine::new(config.clone(), layout))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_validate_and_match_movement_defaults() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.movement_tuning(), MovementTuning::default());
        assert_eq!(config.drag_toggle.to_string(), "d");
        assert_eq!(config.drag_toggle, Key::Letter(Letter::D));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            drag_toggle = "space"
            acceleration_timeout_ms = 200

            [activation]
            key = "g"
            modifiers = { command = true, shift = true }
            "#,
        )
        .unwrap();

        assert_eq!(config.drag_toggle, Key::Space);
        assert_eq!(
            config.movement_tuning().acceleration_timeout,
            Duration::from_millis(200)
        );
        assert_eq!(config.activation.key.to_string(), "g");
        assert!(config.activation.modifiers.command && config.activation.modifiers.shift);
        assert!(!config.activation.modifiers.control);
        assert_eq!(config.base_speed, 10.0);
    }

    #[test]
    fn invalid_values_are_rejected() {
        for text in [
            "base_speed = 0.0",
            "slow_divisor = -1.0",
            "max_multiplier = 0.5",
            "acceleration_increment = -0.1",
            "grid_enabled = false\nfree_move_enabled = false",
        ] {
            assert!(
                matches!(Config::from_toml_str(text), Err(KeygridError::Config(_))),
                "{text} accepted"
            );
        }
        assert!(matches!(
            Config::from_toml_str("base_speed = \"fast\""),
            Err(KeygridError::Toml(_))
        ));
        assert!(matches!(
            Config::from_toml_str("warp_speed = 9"),
            Err(KeygridError::Toml(_))
        ));
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scroll_speed = 7.5").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.scroll_speed, 7.5);

        let missing = file.path().with_extension("missing");
        assert!(matches!(Config::from_file(missing), Err(KeygridError::Io(_))));
    }

    #[test]
    fn initialize_requires_a_display() {
        assert!(matches!(
            initialize(&Config::default(), vec![]),
            Err(KeygridError::Config(_))
        ));
        let engine = initialize(
            &Config::default(),
            vec![Bounds::new(0.0, 0.0, 800.0, 600.0)],
        )
        .unwrap();
        assert_eq!(engine.mode(), Mode::Idle);
        assert_eq!(engine.snapshot().cursor_position, domain::Point::new(400.0, 300.0));
    }
}
