//! Infrastructure layer: storage adapters, orchestration and process config.

pub mod config;
pub mod event_log;
pub mod event_recorder;
pub mod reservation_engine;
pub mod reservations;
pub mod seed;
pub mod stock_ledger;

pub use config::{AppConfig, ConfigError};
pub use event_recorder::EventRecorder;
pub use reservation_engine::{
    ReleaseOutcome, ReleasePolicy, ReservationEngine, ReservationOutcome,
};
