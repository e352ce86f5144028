use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use statum::{machine, state};
use tracing::{debug, error, info, warn};

use crate::controller::event::{
    ControlId, ControllerEvent, InputSource, SourceError, AXIS_CENTER, AXIS_MAX,
};

// Define source states using statum's state macro
#[state]
#[derive(Debug, Clone)]
pub enum SourceState {
    Initializing,
    Acquired,
}

/// Input source backed by gilrs
///
/// gilrs reads the devices from its own background context, so events keep
/// arriving while another window has focus.
#[machine]
#[derive(Debug)]
pub struct GilrsSource<S: SourceState> {
    // Gilrs context
    gilrs: Gilrs,

    // Gamepad whose events are forwarded
    active_gamepad: Option<GamepadId>,

    // Name of the active gamepad, for logs and errors
    device_name: String,

    // Cleared by a Disconnected event, set again by Connected
    connected: bool,

    // Currently held d-pad directions
    dpad: DpadState,
}

impl GilrsSource<Initializing> {
    pub fn create() -> Result<Self, SourceError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(SourceError::Initialization(e.to_string()));
            }
        };

        Ok(Self::new(
            gilrs,
            None,
            String::new(),
            false,
            DpadState::default(),
        ))
    }

    /// Picks the first connected gamepad and transitions to Acquired
    pub fn acquire(mut self) -> Result<GilrsSource<Acquired>, SourceError> {
        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();

        if gamepads.is_empty() {
            error!("No gamepad connected");
            return Err(SourceError::NoController);
        }

        info!("Found {} gamepads:", gamepads.len());
        for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
            info!(
                "  [{}] ID: {}, Name: {}, UUID: {:?}",
                idx,
                id,
                gamepad.name(),
                gamepad.uuid()
            );
        }

        let (id, gamepad) = &gamepads[0];
        let id = *id;
        let name = gamepad.name().to_string();
        info!("Selected gamepad: {} ({})", name, id);

        self.active_gamepad = Some(id);
        self.device_name = name;
        self.connected = true;
        Ok(self.transition())
    }
}

impl GilrsSource<Acquired> {
    // Convert a gilrs event of the active pad into a raw controller event
    fn convert_gilrs_event(&mut self, event: EventType) -> Option<ControllerEvent> {
        match event {
            EventType::ButtonPressed(button, _) => self.convert_button(button, true),
            EventType::ButtonReleased(button, _) => self.convert_button(button, false),
            EventType::ButtonRepeated(button, _) => {
                debug!("Button repeat ignored: {:?}", button);
                None
            }
            EventType::AxisChanged(axis, value, _) => match axis {
                Axis::LeftStickX => Some(ControllerEvent::new(
                    ControlId::AxisX,
                    axis_to_raw(value, false),
                )),
                Axis::LeftStickY => Some(ControllerEvent::new(
                    ControlId::AxisY,
                    axis_to_raw(value, true),
                )),
                Axis::DPadX => {
                    let before = self.dpad;
                    self.dpad.left = value < -0.5;
                    self.dpad.right = value > 0.5;
                    dpad_event(before, self.dpad)
                }
                Axis::DPadY => {
                    let before = self.dpad;
                    self.dpad.up = value > 0.5;
                    self.dpad.down = value < -0.5;
                    dpad_event(before, self.dpad)
                }
                _ => {
                    debug!("Ignoring unsupported axis: {:?}", axis);
                    None
                }
            },
            _ => {
                debug!("Unhandled event type: {:?}", event);
                None
            }
        }
    }

    fn convert_button(&mut self, button: Button, pressed: bool) -> Option<ControllerEvent> {
        let before = self.dpad;
        if self.dpad.set(button, pressed) {
            return dpad_event(before, self.dpad);
        }
        match map_button(button) {
            Some(index) => Some(ControllerEvent::button(index, pressed)),
            None => {
                debug!("Ignoring unmapped button: {:?}", button);
                None
            }
        }
    }
}

impl InputSource for GilrsSource<Acquired> {
    fn poll(&mut self, max_events: usize) -> Result<Vec<ControllerEvent>, SourceError> {
        let mut events = Vec::with_capacity(max_events);

        while events.len() < max_events {
            let Some(Event { id, event, .. }) = self.gilrs.next_event() else {
                break;
            };

            if self.active_gamepad != Some(id) {
                debug!("Skipping event from non-active gamepad: {:?}", id);
                continue;
            }

            match event {
                EventType::Disconnected => {
                    warn!("Controller disconnected: {}", self.device_name);
                    self.connected = false;
                    self.dpad = DpadState::default();
                }
                EventType::Connected => {
                    info!("Controller reconnected: {}", self.device_name);
                    self.connected = true;
                }
                other => {
                    if let Some(raw_event) = self.convert_gilrs_event(other) {
                        debug!("Captured event: {:?}", raw_event);
                        events.push(raw_event);
                    }
                }
            }
        }

        if !self.connected {
            return Err(SourceError::Disconnected(self.device_name.clone()));
        }

        Ok(events)
    }

    fn device_name(&self) -> String {
        self.device_name.clone()
    }
}

/// Held d-pad directions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DpadState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DpadState {
    /// Records a d-pad button; returns false for any other button
    fn set(&mut self, button: Button, pressed: bool) -> bool {
        match button {
            Button::DPadUp => self.up = pressed,
            Button::DPadDown => self.down = pressed,
            Button::DPadLeft => self.left = pressed,
            Button::DPadRight => self.right = pressed,
            _ => return false,
        }
        true
    }

    /// Horizontal component as a raw X axis reading
    pub fn x_value(&self) -> u32 {
        axis_from_pair(self.left, self.right)
    }

    /// Vertical component as a raw Y axis reading, up is the low side
    pub fn y_value(&self) -> u32 {
        axis_from_pair(self.up, self.down)
    }
}

// opposite directions cancel out
fn axis_from_pair(low: bool, high: bool) -> u32 {
    match (low, high) {
        (true, false) => 0,
        (false, true) => AXIS_MAX,
        _ => AXIS_CENTER,
    }
}

/// Reports a d-pad change as a reading of the stick axis it moved
///
/// Only the component that changed is reported, so turning with the d-pad
/// leaves the forward state of the stick alone and the other way round.
fn dpad_event(before: DpadState, after: DpadState) -> Option<ControllerEvent> {
    if before.x_value() != after.x_value() {
        Some(ControllerEvent::new(ControlId::AxisX, after.x_value()))
    } else if before.y_value() != after.y_value() {
        Some(ControllerEvent::new(ControlId::AxisY, after.y_value()))
    } else {
        None
    }
}

// Map gilrs buttons onto the DirectInput button numbering of a generic pad
fn map_button(button: Button) -> Option<u8> {
    match button {
        Button::West => Some(0),
        Button::South => Some(1),
        Button::East => Some(2),
        Button::North => Some(3),
        Button::LeftTrigger => Some(4),
        Button::RightTrigger => Some(5),
        Button::LeftTrigger2 => Some(6),
        Button::RightTrigger2 => Some(7),
        Button::Select => Some(8),
        Button::Start => Some(9),
        _ => None,
    }
}

/// Scales a gilrs axis value (-1.0..=1.0) onto the raw 0..=65535 range
///
/// gilrs reports stick up as positive, raw Y grows downwards, hence `invert`.
fn axis_to_raw(value: f32, invert: bool) -> u32 {
    let value = if invert { -value } else { value };
    let normalized = (value.clamp(-1.0, 1.0) + 1.0) / 2.0;
    (normalized * AXIS_MAX as f32).round() as u32
}
