//! Background Tasks Module
//!
//! Contains background tasks that run periodically while the facade serves.
//!
//! # Tasks
//! - Cache sweep: applies the page byte budget and heals corrupt entries

mod sweep;

pub use sweep::{spawn_sweep_task, sweep_once};
