// src/error.rs - Simulation error taxonomy
use thiserror::Error;

use crate::clinic::Stage;
use crate::config::ConfigError;
use crate::stats::StatsError;
use crate::simulator::event_queue::SimTime;

/// Fatal errors raised while a run is in progress.
///
/// None of these are recoverable: every variant means the model reached a
/// state it must never reach, so the driver aborts the run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("causality violation: event scheduled at {scheduled} but clock is at {now}")]
    CausalityViolation { scheduled: SimTime, now: SimTime },
    #[error("{stage} room {room} is already occupied")]
    ServerBusy { stage: Stage, room: usize },
    #[error("{stage} room {room} has no occupant to release")]
    ServerIdle { stage: Stage, room: usize },
    #[error("{stage} room {room} does not exist")]
    NoSuchRoom { stage: Stage, room: usize },
    #[error("{stage} waiting room is empty")]
    EmptyQueue { stage: Stage },
    #[error("patient id space exhausted after patient {last}")]
    PatientIdExhausted { last: u64 },
    #[error("sampled duration {0} is not a finite, non-negative number")]
    InvalidDuration(f64),
    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
