//! Controller subsystem for gamepad input acquisition
//!
//! 1. [`event`] - Raw controller events and the [`InputSource`] seam
//! 2. [`gilrs_source`] - gilrs backed source for the first connected pad
//!
//! # Architecture
//!
//! ```text
//! Gamepad ──► gilrs ──► GilrsSource::poll ──► Vec<ControllerEvent>
//!                        (max 32 per tick)
//! ```

pub mod event;
pub mod gilrs_source;

pub use event::{ControlId, ControllerEvent, InputSource, SourceError};
pub use gilrs_source::{Acquired, GilrsSource, Initializing};
