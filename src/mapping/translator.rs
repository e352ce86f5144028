//! Translation of raw controller events into synthetic keyboard/mouse input
//!
//! Buttons already arrive as transitions and are forwarded one to one. The two
//! stick axes are level readings and need state:
//!
//! ```text
//! Y axis ──► moving_forward ──► W down/up only when the flag flips
//! X axis ──► strafe_direction ──► MouseMove every tick while off-center
//! ```

use std::fmt;

use tracing::debug;

use crate::controller::ControllerEvent;
use crate::mapping::table::{action_for, Action, Key, MouseButton, FORWARD_KEY};

pub const DEFAULT_STRAFE_SPEED: i32 = 20;
pub const DEFAULT_LOW_THRESHOLD: u32 = 1000;
pub const DEFAULT_HIGH_THRESHOLD: u32 = 64000;

/// Output of one translation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticInputEvent {
    Key { key: Key, down: bool },
    MouseButton { button: MouseButton, down: bool },
    MouseMove { dx: i32 },
}

impl fmt::Display for SyntheticInputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = |down: bool| if down { "down" } else { "up" };
        match self {
            SyntheticInputEvent::Key { key, down } => write!(f, "key {} {}", key, direction(*down)),
            SyntheticInputEvent::MouseButton { button, down } => {
                write!(f, "mouse {:?} {}", button, direction(*down))
            }
            SyntheticInputEvent::MouseMove { dx } => write!(f, "mouse move dx={}", dx),
        }
    }
}

/// State carried from one tick to the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslatorState {
    /// -1 looking left, 1 looking right, 0 centered. Sticky until the next reading.
    pub strafe_direction: i8,
    /// Whether the forward key is currently held
    pub moving_forward: bool,
}

/// Axis thresholds and look speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatorSettings {
    /// Horizontal mouse delta per tick while the stick is held off-center
    pub strafe_speed: i32,
    /// Axis readings below this count as the low side (left / forward)
    pub low_threshold: u32,
    /// Axis readings above this count as the high side (right)
    pub high_threshold: u32,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            strafe_speed: DEFAULT_STRAFE_SPEED,
            low_threshold: DEFAULT_LOW_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Translator {
    settings: TranslatorSettings,
}

impl Translator {
    pub fn new(settings: TranslatorSettings) -> Self {
        Self { settings }
    }

    /// Translates one tick worth of controller events
    pub fn translate(
        &self,
        events: &[ControllerEvent],
        state: &mut TranslatorState,
    ) -> Vec<SyntheticInputEvent> {
        let mut output = Vec::new();

        for event in events {
            let Some(action) = action_for(event.offset) else {
                debug!("Ignoring unmapped control {}", event.offset);
                continue;
            };

            match action {
                Action::EmitKey(key) => output.push(SyntheticInputEvent::Key {
                    key,
                    down: event.value != 0,
                }),
                Action::EmitMouseButton(button) => output.push(SyntheticInputEvent::MouseButton {
                    button,
                    down: event.value != 0,
                }),
                Action::AdjustStrafe => {
                    state.strafe_direction = self.strafe_direction(event.value);
                }
                Action::AdjustForward => {
                    let forward = event.value < self.settings.low_threshold;
                    set_forward(forward, state, &mut output);
                }
            }
        }

        if state.strafe_direction != 0 {
            output.push(SyntheticInputEvent::MouseMove {
                dx: i32::from(state.strafe_direction) * self.settings.strafe_speed,
            });
        }

        output
    }

    fn strafe_direction(&self, value: u32) -> i8 {
        if value < self.settings.low_threshold {
            -1
        } else if value > self.settings.high_threshold {
            1
        } else {
            0
        }
    }
}

// Edge-triggered: the key only changes when the flag flips
fn set_forward(forward: bool, state: &mut TranslatorState, output: &mut Vec<SyntheticInputEvent>) {
    if forward != state.moving_forward {
        output.push(SyntheticInputEvent::Key {
            key: FORWARD_KEY,
            down: forward,
        });
    }
    state.moving_forward = forward;
}

/// Translates with the default thresholds and look speed
pub fn translate(
    events: &[ControllerEvent],
    state: &mut TranslatorState,
) -> Vec<SyntheticInputEvent> {
    Translator::default().translate(events, state)
}
