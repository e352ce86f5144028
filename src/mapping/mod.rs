//! Fixed translation of controller events into keyboard and mouse input.
//!
//! [`table`] holds the static control layout, [`translator`] turns one tick of
//! [`ControllerEvent`](crate::controller::ControllerEvent)s into an ordered batch
//! of [`SyntheticInputEvent`]s.

pub mod table;
pub mod translator;

pub use table::{action_for, Action, Key, MouseButton, FORWARD_KEY, MAPPING};
pub use translator::{
    translate, SyntheticInputEvent, Translator, TranslatorSettings, TranslatorState,
};
