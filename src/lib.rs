// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod mock;
pub mod normalize;
pub mod reading;
pub mod recommend;

// Session tracking, therapy queue, live sampling
pub mod sampler;
pub mod session;
pub mod therapy;

// Service plumbing
pub mod api;
pub mod metrics;
pub mod settings;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::channel::{Channel, ChannelResult, Status};
pub use crate::config::EngineConfig;
pub use crate::engine::ScoringEngine;
pub use crate::error::EngineError;
pub use crate::mock::generate_mock_reading;
pub use crate::reading::{Field, Reading};
pub use crate::recommend::recommend;
