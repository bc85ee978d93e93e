//! Raw input events delivered by the event source.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Whole seconds on the event source's clock.
///
/// `0` is reserved for "no event observed yet".
pub type Seconds = u64;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Button {
    /// Left mouse button (Button 1).
    Left,
    /// Middle mouse button (Button 2).
    Middle,
    /// Right mouse button (Button 3).
    Right,
    /// Extra button 1 (typically back).
    Fourth,
    /// Extra button 2 (typically forward).
    Fifth,
}

impl Button {
    /// All buttons, in counter order.
    pub const ALL: [Button; 5] = [
        Button::Left,
        Button::Middle,
        Button::Right,
        Button::Fourth,
        Button::Fifth,
    ];

    /// Index of this button in the counter array.
    pub fn index(&self) -> usize {
        match self {
            Button::Left => 0,
            Button::Middle => 1,
            Button::Right => 2,
            Button::Fourth => 3,
            Button::Fifth => 4,
        }
    }

    /// Get the button number (1-indexed).
    pub fn number(&self) -> u8 {
        self.index() as u8 + 1
    }

    /// Create a Button from a number (1-indexed).
    ///
    /// Returns `None` for buttons the meter does not count.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1..=5 => Some(Self::ALL[usize::from(n - 1)]),
            _ => None,
        }
    }

    /// Short label used by the input counters line.
    pub fn label(&self) -> &'static str {
        match self {
            Button::Left => "LMB",
            Button::Middle => "MMB",
            Button::Right => "RMB",
            Button::Fourth => "4th",
            Button::Fifth => "5th",
        }
    }
}

/// A single raw input event.
///
/// Events are owned by the producer for the duration of one delivery; the
/// aggregator only copies out the scalar fields it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum RawInputEvent {
    /// Relative pointer motion.
    PointerMotion {
        /// Horizontal movement in pixels.
        dx: i32,
        /// Vertical movement in pixels.
        dy: i32,
        /// When the motion happened.
        timestamp: Seconds,
    },
    /// A mouse button went down.
    ButtonPress {
        /// The button pressed.
        button: Button,
        /// When the press happened.
        timestamp: Seconds,
    },
    /// A mouse button went up.
    ButtonRelease {
        /// The button released.
        button: Button,
        /// When the release happened.
        timestamp: Seconds,
    },
    /// A key went down.
    KeyDown {
        /// When the key went down.
        timestamp: Seconds,
    },
    /// A key went up.
    KeyUp {
        /// When the key went up.
        timestamp: Seconds,
    },
}

impl RawInputEvent {
    /// Create a pointer motion event.
    pub fn motion(dx: i32, dy: i32, timestamp: Seconds) -> Self {
        Self::PointerMotion { dx, dy, timestamp }
    }

    /// Create a button press event.
    pub fn button_press(button: Button, timestamp: Seconds) -> Self {
        Self::ButtonPress { button, timestamp }
    }

    /// Create a button release event.
    pub fn button_release(button: Button, timestamp: Seconds) -> Self {
        Self::ButtonRelease { button, timestamp }
    }

    /// Create a key down event.
    pub fn key_down(timestamp: Seconds) -> Self {
        Self::KeyDown { timestamp }
    }

    /// Create a key up event.
    pub fn key_up(timestamp: Seconds) -> Self {
        Self::KeyUp { timestamp }
    }

    /// Timestamp carried by the event.
    pub fn timestamp(&self) -> Seconds {
        match *self {
            Self::PointerMotion { timestamp, .. }
            | Self::ButtonPress { timestamp, .. }
            | Self::ButtonRelease { timestamp, .. }
            | Self::KeyDown { timestamp }
            | Self::KeyUp { timestamp } => timestamp,
        }
    }

    /// Check if this is a keyboard event.
    pub fn is_keyboard(&self) -> bool {
        matches!(self, Self::KeyDown { .. } | Self::KeyUp { .. })
    }

    /// Check if this is a mouse event.
    pub fn is_mouse(&self) -> bool {
        !self.is_keyboard()
    }

    /// Whether the event counts as user activity for idle detection.
    pub fn marks_activity(&self) -> bool {
        matches!(self, Self::PointerMotion { .. } | Self::KeyDown { .. })
    }
}

/// Distance contributed by one motion event, rounded to whole pixels.
pub fn motion_distance(dx: i32, dy: i32) -> u64 {
    // |i32::MIN|² * 2 still fits in u64.
    let dx = u64::from(dx.unsigned_abs());
    let dy = u64::from(dy.unsigned_abs());
    ((dx * dx + dy * dy) as f64).sqrt().round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_numbers() {
        for button in Button::ALL {
            assert_eq!(Button::from_number(button.number()), Some(button));
        }
        assert_eq!(Button::from_number(0), None);
        assert_eq!(Button::from_number(6), None);
        assert_eq!(Button::Middle.number(), 2);
    }

    #[test]
    fn test_motion_distance_rounds() {
        assert_eq!(motion_distance(3, 4), 5);
        assert_eq!(motion_distance(0, 0), 0);
        assert_eq!(motion_distance(1, 1), 1); // 1.414
        assert_eq!(motion_distance(1, 2), 2); // 2.236
        assert_eq!(motion_distance(-2, -2), 3); // 2.828
    }

    #[test]
    fn test_motion_distance_extreme_values() {
        let d = motion_distance(i32::MIN, i32::MIN);
        assert!(d > 3_000_000_000);
    }

    #[test]
    fn test_event_classification() {
        assert!(RawInputEvent::key_down(1).is_keyboard());
        assert!(RawInputEvent::key_up(1).is_keyboard());
        assert!(RawInputEvent::motion(1, 1, 1).is_mouse());
        assert!(RawInputEvent::button_press(Button::Left, 1).is_mouse());

        assert!(RawInputEvent::key_down(1).marks_activity());
        assert!(RawInputEvent::motion(0, 0, 1).marks_activity());
        assert!(!RawInputEvent::key_up(1).marks_activity());
        assert!(!RawInputEvent::button_press(Button::Right, 1).marks_activity());
    }

    #[test]
    fn test_timestamp() {
        assert_eq!(RawInputEvent::button_release(Button::Fifth, 42).timestamp(), 42);
        assert_eq!(RawInputEvent::motion(1, 2, 7).timestamp(), 7);
    }
}
