use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, EventType, InputEvent, Key as EvKey, RelativeAxisType,
};
use tracing::{debug, info};

use crate::injection::{InjectionError, InjectionSink};
use crate::mapping::{Key, MouseButton, SyntheticInputEvent};

const DEVICE_NAME: &str = "padbridge keyboard+mouse";

/// Injects through one uinput device carrying both the keys and the mouse
///
/// `VirtualDevice::emit` writes the batch followed by a single SYN_REPORT, so
/// readers see the whole tick at once.
pub struct UinputSink {
    device: VirtualDevice,
}

impl UinputSink {
    pub fn create() -> Result<Self, InjectionError> {
        let mut keys = AttributeSet::<EvKey>::new();
        for key in Key::ALL {
            keys.insert(key_code(key));
        }
        keys.insert(mouse_code(MouseButton::Left));
        keys.insert(mouse_code(MouseButton::Right));

        let mut rel_axes = AttributeSet::<RelativeAxisType>::new();
        rel_axes.insert(RelativeAxisType::REL_X);
        // never emitted, libinput only treats devices with both axes as a pointer
        rel_axes.insert(RelativeAxisType::REL_Y);

        let device = VirtualDeviceBuilder::new()
            .and_then(|builder| builder.name(DEVICE_NAME).with_keys(&keys))
            .and_then(|builder| builder.with_relative_axes(&rel_axes))
            .and_then(|builder| builder.build())
            .map_err(|e| InjectionError::DeviceCreation(e.to_string()))?;

        info!("Created virtual device: {}", DEVICE_NAME);
        Ok(Self { device })
    }
}

impl InjectionSink for UinputSink {
    fn inject(&mut self, batch: &[SyntheticInputEvent]) -> Result<(), InjectionError> {
        let events = to_input_events(batch);
        debug!("Emitting {} evdev events", events.len());
        self.device
            .emit(&events)
            .map_err(|e| InjectionError::Submit(e.to_string()))
    }
}

fn key_code(key: Key) -> EvKey {
    match key {
        Key::LeftShift => EvKey::KEY_LEFTSHIFT,
        Key::LeftCtrl => EvKey::KEY_LEFTCTRL,
        Key::E => EvKey::KEY_E,
        Key::R => EvKey::KEY_R,
        Key::V => EvKey::KEY_V,
        Key::Num1 => EvKey::KEY_1,
        Key::Num2 => EvKey::KEY_2,
        Key::Q => EvKey::KEY_Q,
        Key::W => EvKey::KEY_W,
    }
}

fn mouse_code(button: MouseButton) -> EvKey {
    match button {
        MouseButton::Left => EvKey::BTN_LEFT,
        MouseButton::Right => EvKey::BTN_RIGHT,
    }
}

fn to_input_events(batch: &[SyntheticInputEvent]) -> Vec<InputEvent> {
    batch
        .iter()
        .map(|event| match *event {
            SyntheticInputEvent::Key { key, down } => {
                InputEvent::new(EventType::KEY, key_code(key).0, i32::from(down))
            }
            SyntheticInputEvent::MouseButton { button, down } => {
                InputEvent::new(EventType::KEY, mouse_code(button).0, i32::from(down))
            }
            SyntheticInputEvent::MouseMove { dx } => {
                InputEvent::new(EventType::RELATIVE, RelativeAxisType::REL_X.0, dx)
            }
        })
        .collect()
}
