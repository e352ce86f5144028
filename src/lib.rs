//! Drive a keyboard+mouse game with a gamepad.
//!
//! ```text
//! Gamepad ──► controller ──► mapping ──► injection ──► OS
//!             (poll)         (translate)  (one batch per tick)
//!                    └──────── bridge (10ms tick loop) ────────┘
//! ```

pub mod bridge;
pub mod config;
pub mod controller;
pub mod injection;
pub mod mapping;
