//! Fixed control layout for "No More Room in Hell"
//!
//! ```text
//! action        keyboard      controller
//! ------------------------------------------------
//! walk        - W           - Y axis up / d-pad up
//! look around - mouse move  - X axis / d-pad left/right
//! run         - shift       - button 6 (L2)
//! crouch      - ctrl        - button 3
//! shoot/hit   - left mouse  - button 2
//! use/take    - E           - button 4 (L1)
//! reload      - R           - button 0
//! push away   - V           - button 5 (R1)
//! guns menu   - 1           - button 1
//! ammo menu   - 2           - button 8 (Select)
//! drop/zoom   - right mouse - button 7 (R2)
//! last gun    - Q           - button 9 (Start)
//! ```

use std::fmt::{self, Display};

use crate::controller::ControlId;

/// Keyboard keys the layout can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    LeftShift,
    LeftCtrl,
    E,
    R,
    V,
    Num1,
    Num2,
    Q,
    W,
}

impl Key {
    pub const ALL: [Key; 9] = [
        Key::LeftShift,
        Key::LeftCtrl,
        Key::E,
        Key::R,
        Key::V,
        Key::Num1,
        Key::Num2,
        Key::Q,
        Key::W,
    ];
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::LeftShift => write!(f, "LShift"),
            Key::LeftCtrl => write!(f, "LCtrl"),
            Key::E => write!(f, "E"),
            Key::R => write!(f, "R"),
            Key::V => write!(f, "V"),
            Key::Num1 => write!(f, "1"),
            Key::Num2 => write!(f, "2"),
            Key::Q => write!(f, "Q"),
            Key::W => write!(f, "W"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

/// What a control does when one of its events arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Forward the button transition as a key transition
    EmitKey(Key),
    /// Forward the button transition as a mouse button transition
    EmitMouseButton(MouseButton),
    /// Level reading that sets the look direction
    AdjustStrafe,
    /// Level reading that toggles the forward key on threshold crossings
    AdjustForward,
}

/// Key held while walking forward
pub const FORWARD_KEY: Key = Key::W;

pub static MAPPING: &[(ControlId, Action)] = &[
    (ControlId::Button(6), Action::EmitKey(Key::LeftShift)),
    (ControlId::Button(3), Action::EmitKey(Key::LeftCtrl)),
    (ControlId::Button(2), Action::EmitMouseButton(MouseButton::Left)),
    (ControlId::Button(4), Action::EmitKey(Key::E)),
    (ControlId::Button(0), Action::EmitKey(Key::R)),
    (ControlId::Button(5), Action::EmitKey(Key::V)),
    (ControlId::Button(1), Action::EmitKey(Key::Num1)),
    (ControlId::Button(8), Action::EmitKey(Key::Num2)),
    (ControlId::Button(7), Action::EmitMouseButton(MouseButton::Right)),
    (ControlId::Button(9), Action::EmitKey(Key::Q)),
    (ControlId::AxisX, Action::AdjustStrafe),
    (ControlId::AxisY, Action::AdjustForward),
];

/// Looks up the action bound to a control, `None` for unmapped controls
pub fn action_for(offset: ControlId) -> Option<Action> {
    MAPPING
        .iter()
        .find(|(control, _)| *control == offset)
        .map(|(_, action)| *action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_control_is_bound_once() {
        let controls: HashSet<ControlId> = MAPPING.iter().map(|(c, _)| *c).collect();
        assert_eq!(controls.len(), MAPPING.len());
    }

    #[test]
    fn reload_is_button_zero() {
        assert_eq!(action_for(ControlId::Button(0)), Some(Action::EmitKey(Key::R)));
    }

    #[test]
    fn shoot_and_zoom_are_mouse_buttons() {
        assert_eq!(
            action_for(ControlId::Button(2)),
            Some(Action::EmitMouseButton(MouseButton::Left))
        );
        assert_eq!(
            action_for(ControlId::Button(7)),
            Some(Action::EmitMouseButton(MouseButton::Right))
        );
    }

    #[test]
    fn axes_are_level_actions() {
        assert_eq!(action_for(ControlId::AxisX), Some(Action::AdjustStrafe));
        assert_eq!(action_for(ControlId::AxisY), Some(Action::AdjustForward));
    }

    #[test]
    fn unbound_buttons_have_no_action() {
        assert_eq!(action_for(ControlId::Button(10)), None);
        assert_eq!(action_for(ControlId::Button(255)), None);
    }

    #[test]
    fn forward_key_is_not_bound_to_a_button() {
        let bound = MAPPING
            .iter()
            .any(|(_, action)| *action == Action::EmitKey(FORWARD_KEY));
        assert!(!bound);
    }
}
