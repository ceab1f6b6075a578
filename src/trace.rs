// src/trace.rs - Append-only domain trace of a run
use std::fmt;

use serde::Serialize;

use crate::clinic::Stage;
use crate::simulator::event_queue::SimTime;

/// A state transition worth showing to someone reading a run back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TraceEvent {
    ArrivalProcessed { patient: u64 },
    ArrivalRejected { patient: u64 },
    JoinedQueue { stage: Stage, patient: u64, waiting: usize },
    LeftQueue { stage: Stage, patient: u64, waiting: usize },
    ServiceStarted { stage: Stage, room: usize, patient: u64 },
    ServiceEnded { stage: Stage, room: usize, patient: u64 },
    Departed { patient: u64 },
    ClinicClosed,
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::ArrivalProcessed { patient } => {
                write!(f, "Processing arrival of Patient {patient}.")
            }
            TraceEvent::ArrivalRejected { patient } => {
                write!(f, "Urgent care is closed. Patient {patient} does not get admitted.")
            }
            TraceEvent::JoinedQueue { stage, patient, waiting } => write!(
                f,
                "Patient {patient} joins the {} waiting room. Number waiting = {waiting}.",
                stage
            ),
            TraceEvent::LeftQueue { stage, patient, waiting } => write!(
                f,
                "Patient {patient} leaves the {} waiting room. Number waiting = {waiting}.",
                stage
            ),
            TraceEvent::ServiceStarted { stage, room, patient } => write!(
                f,
                "Patient {patient} starts service in {} {room}.",
                stage.room_name()
            ),
            TraceEvent::ServiceEnded { stage, room, patient } => {
                write!(f, "Patient {patient} leaves {} {room}.", stage.room_name())
            }
            TraceEvent::Departed { patient } => write!(f, "Patient {patient} leaves the urgent care."),
            TraceEvent::ClinicClosed => f.write_str("Processing the closing of the urgent care."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceEntry {
    pub time: SimTime,
    pub event: TraceEvent,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>10.4}: {}", self.time, self.event)
    }
}

/// Where the clinic writes its trace. Handed to the clinic at construction.
pub trait TraceSink {
    fn record(&mut self, entry: TraceEntry);

    /// Entries kept in memory, for sinks that keep any.
    fn entries(&self) -> &[TraceEntry] {
        &[]
    }
}

/// Keeps every entry in memory.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    entries: Vec<TraceEntry>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TraceSink for EventLog {
    fn record(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }
}

/// Forwards entries to `tracing` at debug level and keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn record(&mut self, entry: TraceEntry) {
        tracing::debug!(time = entry.time, "{}", entry.event);
    }
}
