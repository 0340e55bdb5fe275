//! Output actions handed to the OS input sink.

use crate::keycode::Key;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A mouse button transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    /// Press the left button.
    #[serde(alias = "left_click")]
    LeftPress,
    /// Release the left button.
    LeftRelease,
    /// Press the right button.
    #[serde(alias = "right_click")]
    RightPress,
    /// Release the right button.
    RightRelease,
}

impl ButtonAction {
    /// Returns `true` for the press transitions.
    pub fn is_press(self) -> bool {
        matches!(self, ButtonAction::LeftPress | ButtonAction::RightPress)
    }
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ButtonAction::LeftPress => "LEFT_CLICK",
            ButtonAction::LeftRelease => "LEFT_RELEASE",
            ButtonAction::RightPress => "RIGHT_CLICK",
            ButtonAction::RightRelease => "RIGHT_RELEASE",
        })
    }
}

/// A direction of pointer travel, in screen coordinates (+y is down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards negative x.
    Left,
    /// Towards positive x.
    Right,
    /// Towards negative y.
    Up,
    /// Towards positive y.
    Down,
}

impl Direction {
    /// The unit vector `(dx, dy)` for this direction.
    pub fn unit(self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
            Direction::Up => "UP",
            Direction::Down => "DOWN",
        })
    }
}

/// A synthesized input action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Press a keyboard key.
    PressKey(Key),
    /// Release a keyboard key.
    ReleaseKey(Key),
    /// Press or release a mouse button.
    MouseButton(ButtonAction),
    /// Move the pointer by a relative displacement.
    MouseMove {
        /// Horizontal displacement in pixels.
        dx: i32,
        /// Vertical displacement in pixels.
        dy: i32,
    },
}

impl Action {
    /// Check if this is a pointer movement.
    pub fn is_move(&self) -> bool {
        matches!(self, Action::MouseMove { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_units() {
        assert_eq!(Direction::Left.unit(), (-1, 0));
        assert_eq!(Direction::Right.unit(), (1, 0));
        assert_eq!(Direction::Up.unit(), (0, -1));
        assert_eq!(Direction::Down.unit(), (0, 1));
    }

    #[test]
    fn test_button_action_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            action: ButtonAction,
        }

        let parsed: Wrapper = toml::from_str("action = \"left_click\"").unwrap();
        assert_eq!(parsed.action, ButtonAction::LeftPress);
        let parsed: Wrapper = toml::from_str("action = \"right_release\"").unwrap();
        assert_eq!(parsed.action, ButtonAction::RightRelease);
        assert!(ButtonAction::RightPress.is_press());
        assert!(!ButtonAction::LeftRelease.is_press());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ButtonAction::LeftPress.to_string(), "LEFT_CLICK");
        assert_eq!(ButtonAction::RightRelease.to_string(), "RIGHT_RELEASE");
        assert_eq!(Direction::Up.to_string(), "UP");
    }
}
