//! Keyboard event model delivered by the event source.
//!
//! The event source translates platform key codes into [`Key`] values before
//! calling the engine. Only the 26 letter keys, the arrows, and a handful of
//! control keys carry meaning; everything else arrives as [`Key::Other`] with
//! the raw platform code attached for logging.
//!
//! Keys and events serialize to a compact form so the headless driver can read
//! them as JSON lines:
//!
//! ```json
//! {"key": "m", "kind": "down", "modifiers": {"shift": true}, "timestamp_ms": 1200}
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Number of letters in the addressing alphabet.
pub const ALPHABET_LEN: usize = 26;

/// One of the 26 letters `A`–`Z`, stored as a zero-based index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Letter(u8);

impl Letter {
    /// Returns the letter at `index` (`0` → `A`), or `None` past `Z`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index)
            .ok()
            .filter(|&i| usize::from(i) < ALPHABET_LEN)
            .map(Self)
    }

    /// The default drag-toggle key.
    pub const D: Self = Self(b'D' - b'A');

    /// Case-insensitive conversion from an ASCII letter byte.
    #[must_use]
    pub const fn from_ascii(byte: u8) -> Option<Self> {
        let upper = byte.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Some(Self(upper - b'A'))
        } else {
            None
        }
    }

    /// Case-insensitive conversion from an ASCII letter.
    #[must_use]
    pub fn from_char(c: char) -> Option<Self> {
        u8::try_from(c).ok().and_then(Self::from_ascii)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Upper-case character for this letter.
    #[must_use]
    pub const fn as_char(self) -> char {
        (b'A' + self.0) as char
    }

    /// Iterates `A` through `Z`.
    pub fn all() -> impl Iterator<Item = Self> + Clone {
        (0..ALPHABET_LEN).filter_map(Self::from_index)
    }
}

impl TryFrom<char> for Letter {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Self::from_char(c).ok_or_else(|| format!("'{c}' is not a letter A-Z"))
    }
}

impl From<Letter> for char {
    fn from(letter: Letter) -> Self {
        letter.as_char()
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Arrow-key direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit vector in screen coordinates (`y` grows downward).
    #[must_use]
    pub const fn unit(self) -> (f64, f64) {
        match self {
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
        }
    }
}

/// A physical key, as identified by the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    Letter(Letter),
    Arrow(Direction),
    Return,
    Tab,
    Escape,
    Backspace,
    Space,
    /// Any other key, carrying the raw platform key code.
    Other(u16),
}

impl FromStr for Key {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let key = match lower.as_str() {
            "return" | "enter" => Self::Return,
            "tab" => Self::Tab,
            "escape" | "esc" => Self::Escape,
            "backspace" | "delete" => Self::Backspace,
            "space" => Self::Space,
            "up" => Self::Arrow(Direction::Up),
            "down" => Self::Arrow(Direction::Down),
            "left" => Self::Arrow(Direction::Left),
            "right" => Self::Arrow(Direction::Right),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Letter::from_char(c)
                        .map(Self::Letter)
                        .ok_or_else(|| format!("unknown key '{s}'"))?,
                    _ => other
                        .strip_prefix("code:")
                        .and_then(|code| code.parse::<u16>().ok())
                        .map(Self::Other)
                        .ok_or_else(|| format!("unknown key '{s}'"))?,
                }
            }
        };
        Ok(key)
    }
}

impl TryFrom<String> for Key {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Letter(letter) => write!(f, "{}", letter.as_char().to_ascii_lowercase()),
            Self::Arrow(Direction::Up) => f.write_str("up"),
            Self::Arrow(Direction::Down) => f.write_str("down"),
            Self::Arrow(Direction::Left) => f.write_str("left"),
            Self::Arrow(Direction::Right) => f.write_str("right"),
            Self::Return => f.write_str("return"),
            Self::Tab => f.write_str("tab"),
            Self::Escape => f.write_str("escape"),
            Self::Backspace => f.write_str("backspace"),
            Self::Space => f.write_str("space"),
            Self::Other(code) => write!(f, "code:{code}"),
        }
    }
}

/// Modifier keys held while an event was generated.
///
/// `shift` is the "fast" modifier for movement, `option` the "precise" one,
/// and `command` turns arrows into scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    pub shift: bool,
    pub control: bool,
    pub option: bool,
    pub command: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        option: false,
        command: false,
    };

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        !(self.shift || self.control || self.option || self.command)
    }
}

/// What happened at the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    #[serde(alias = "key_down")]
    Down,
    #[serde(alias = "key_up")]
    Up,
    ModifiersChanged,
    /// The OS disabled the global intercept (timeout or user input).
    TapDisabled,
}

/// A raw keyboard event.
///
/// `timestamp` is monotonic time as reported by the event source; only
/// differences between timestamps are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub kind: EventKind,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(rename = "timestamp_ms", with = "millis", default)]
    pub timestamp: Duration,
}

impl KeyEvent {
    #[must_use]
    pub const fn down(key: Key, modifiers: Modifiers, timestamp: Duration) -> Self {
        Self {
            key,
            kind: EventKind::Down,
            modifiers,
            timestamp,
        }
    }

    #[must_use]
    pub const fn up(key: Key, modifiers: Modifiers, timestamp: Duration) -> Self {
        Self {
            key,
            kind: EventKind::Up,
            modifiers,
            timestamp,
        }
    }

    #[must_use]
    pub const fn tap_disabled(timestamp: Duration) -> Self {
        Self {
            key: Key::Other(0),
            kind: EventKind::TapDisabled,
            modifiers: Modifiers::NONE,
            timestamp,
        }
    }
}

/// A key plus the exact set of modifiers that must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyBinding {
    /// Whether `event` presses exactly this binding.
    #[must_use]
    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.key == self.key && event.modifiers == self.modifiers
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        #[allow(clippy::cast_possible_truncation)]
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_cover_the_alphabet() {
        let all: String = Letter::all().map(Letter::as_char).collect();
        assert_eq!(all, "ABCDEFGHIJKLMNOPQRSTUVWXYZ");
        assert!(Letter::from_index(26).is_none());
        assert_eq!(Letter::from_char('m'), Letter::from_index(12));
        assert!(Letter::from_char('1').is_none());
        assert!(Letter::from_char('é').is_none());
    }

    #[test]
    fn ascii_constructor_is_usable_in_const_context() {
        const G: Option<Letter> = Letter::from_ascii(b'g');
        assert_eq!(G, Letter::from_char('G'));
        assert_eq!(Letter::from_ascii(b'['), None);
        assert_eq!(Letter::from_ascii(b'@'), None);
        assert_eq!(Letter::D.as_char(), 'D');
    }

    #[test]
    fn key_names_parse() {
        assert_eq!("Return".parse::<Key>(), Ok(Key::Return));
        assert_eq!("esc".parse::<Key>(), Ok(Key::Escape));
        assert_eq!("left".parse::<Key>(), Ok(Key::Arrow(Direction::Left)));
        assert_eq!("q".parse::<Key>(), Ok(Key::Letter(Letter::from_char('q').unwrap())));
        assert_eq!("code:122".parse::<Key>(), Ok(Key::Other(122)));
        assert!("7".parse::<Key>().is_err());
        assert!("hyper".parse::<Key>().is_err());
    }

    #[test]
    fn event_deserializes_from_json_line() {
        let event: KeyEvent = serde_json::from_str(
            r#"{"key":"m","kind":"down","modifiers":{"shift":true},"timestamp_ms":1200}"#,
        )
        .unwrap();

        assert_eq!(event.key, Key::Letter(Letter::from_char('M').unwrap()));
        assert_eq!(event.kind, EventKind::Down);
        assert!(event.modifiers.shift);
        assert!(!event.modifiers.command);
        assert_eq!(event.timestamp, Duration::from_millis(1200));
    }

    #[test]
    fn binding_requires_exact_modifiers() {
        let binding = KeyBinding {
            key: Key::Space,
            modifiers: Modifiers {
                control: true,
                option: true,
                ..Modifiers::NONE
            },
        };
        let exact = KeyEvent::down(Key::Space, binding.modifiers, Duration::ZERO);
        let extra = KeyEvent::down(
            Key::Space,
            Modifiers {
                shift: true,
                ..binding.modifiers
            },
            Duration::ZERO,
        );

        assert!(binding.matches(&exact));
        assert!(!binding.matches(&extra));
    }
}
