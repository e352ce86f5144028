//! Injection sinks for synthetic keyboard/mouse input
//!
//! A sink receives one ordered batch per tick and applies it as a whole.

#[cfg(target_os = "linux")]
pub mod uinput;

#[cfg(target_os = "linux")]
pub use uinput::UinputSink;

use tracing::info;

use crate::mapping::SyntheticInputEvent;

// Injection errors
#[derive(Debug, thiserror::Error)]
pub enum InjectionError {
    #[error("Failed to create virtual device: {0}")]
    DeviceCreation(String),

    #[error("Failed to submit input batch: {0}")]
    Submit(String),
}

/// Submits synthetic input to the OS
pub trait InjectionSink {
    /// Applies the whole batch in order, or nothing of it
    fn inject(&mut self, batch: &[SyntheticInputEvent]) -> Result<(), InjectionError>;
}

/// Sink that writes each batch to the log instead of injecting it
#[derive(Debug, Default)]
pub struct LogSink {
    batches: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> u64 {
        self.batches
    }
}

impl InjectionSink for LogSink {
    fn inject(&mut self, batch: &[SyntheticInputEvent]) -> Result<(), InjectionError> {
        self.batches += 1;
        let events: Vec<String> = batch.iter().map(|event| event.to_string()).collect();
        info!("Batch #{}: [{}]", self.batches, events.join(", "));
        Ok(())
    }
}
