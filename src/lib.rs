//! Single-screen arena shooter.
//!
//! - `round`: the round state machine and tick driver
//! - `shooter`, `bullets`, `targets`: the simulated subsystems
//! - `motion`, `geometry`, `schedule`: shared movement, collision and timer rules
//! - `port`: events the simulation emits and the rendering/input contract
//! - `display`: crossterm implementation of that contract

pub mod bullets;
pub mod config;
pub mod display;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod motion;
pub mod port;
pub mod round;
pub mod schedule;
pub mod shooter;
pub mod targets;

pub use config::GameConfig;
pub use error::{ConfigError, RoundError, SpawnError};
pub use round::Round;
