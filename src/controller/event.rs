//! Raw controller events and the input source seam
//!
//! Values follow the DirectInput conventions the mapping table was laid out for:
//! buttons report `0x80`/`0` and axes span `0..=65535` with the midpoint as
//! neutral. The d-pad is reported through the two stick axes.

use std::fmt;

/// Value a button reports while held.
pub const BUTTON_PRESSED: u32 = 0x80;

/// Value a button reports once released.
pub const BUTTON_RELEASED: u32 = 0;

/// Largest raw axis value.
pub const AXIS_MAX: u32 = 65535;

/// Raw axis value of a centered stick.
pub const AXIS_CENTER: u32 = AXIS_MAX / 2;

/// Identifies one control on the pad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    /// Button by DirectInput index (0 based)
    Button(u8),
    /// Horizontal axis of the left stick
    AxisX,
    /// Vertical axis of the left stick, 0 is full up
    AxisY,
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlId::Button(index) => write!(f, "Button{}", index),
            ControlId::AxisX => write!(f, "X"),
            ControlId::AxisY => write!(f, "Y"),
        }
    }
}

/// One buffered state change of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerEvent {
    pub offset: ControlId,
    pub value: u32,
}

impl ControllerEvent {
    pub fn new(offset: ControlId, value: u32) -> Self {
        Self { offset, value }
    }

    pub fn button(index: u8, pressed: bool) -> Self {
        let value = if pressed { BUTTON_PRESSED } else { BUTTON_RELEASED };
        Self::new(ControlId::Button(index), value)
    }
}

// Input source errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to initialize input source: {0}")]
    Initialization(String),

    #[error("No controller connected")]
    NoController,

    #[error("Controller disconnected: {0}")]
    Disconnected(String),

    #[error("Failed to read controller data: {0}")]
    Read(String),
}

impl SourceError {
    /// Whether the error only spoils the current tick
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Disconnected(_) | SourceError::Read(_))
    }
}

/// Provides the controller state changes buffered since the previous poll
///
/// Events come back in chronological order. At most `max_events` are returned
/// per call; the rest stay queued for the next poll.
pub trait InputSource {
    fn poll(&mut self, max_events: usize) -> Result<Vec<ControllerEvent>, SourceError>;

    /// Human readable name of the acquired device
    fn device_name(&self) -> String {
        "unknown controller".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_constructor_uses_directinput_values() {
        assert_eq!(
            ControllerEvent::button(3, true),
            ControllerEvent::new(ControlId::Button(3), 0x80)
        );
        assert_eq!(ControllerEvent::button(3, false).value, 0);
    }

    #[test]
    fn only_runtime_errors_are_transient() {
        assert!(SourceError::Read("buffer overflow".into()).is_transient());
        assert!(SourceError::Disconnected("pad 0".into()).is_transient());
        assert!(!SourceError::NoController.is_transient());
        assert!(!SourceError::Initialization("no backend".into()).is_transient());
    }

    #[test]
    fn control_ids_display_like_offsets() {
        assert_eq!(ControlId::Button(9).to_string(), "Button9");
        assert_eq!(ControlId::AxisY.to_string(), "Y");
    }
}
