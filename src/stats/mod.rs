//! Statistics collection for a clinic run.
//!
//! The [`StatsCollector`] is the single owner of every counter and
//! observation. The clinic reports each state transition through one call
//! here; nothing else keeps a parallel tally.

pub mod sample_path;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::clinic::Stage;
use crate::clinic::patient::Patient;
use crate::simulator::event_queue::SimTime;
pub use sample_path::PrevalenceSamplePath;

/// Per-patient observation sequences that averages are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    TimeInSystem,
    PhysicianWait,
    MentalHealthWait,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::TimeInSystem => "time in system",
            Metric::PhysicianWait => "physician waiting time",
            Metric::MentalHealthWait => "mental-health waiting time",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("no observations recorded for {0}")]
    NoObservations(Metric),
    #[error("sample path '{path}' received time {time} after reaching {last}")]
    NonMonotonicTime { path: String, time: SimTime, last: SimTime },
    #[error("sample path '{path}' would go negative at time {time}")]
    NegativeLevel { path: String, time: SimTime },
    #[error("sample path '{0}' is already closed")]
    PathClosed(String),
    #[error("sample path '{0}' has not been closed")]
    PathNotClosed(String),
    #[error("sample path '{0}' covers an empty interval")]
    EmptyInterval(String),
}

/// Summary row for a patient who has left the clinic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientRecord {
    pub id: u64,
    pub at_risk: bool,
    pub arrived: SimTime,
    pub left: SimTime,
    pub physician_wait: SimTime,
    /// Present only for patients routed to a consult.
    pub mh_wait: Option<SimTime>,
    pub time_in_system: SimTime,
}

#[derive(Debug, Clone)]
pub struct StatsCollector {
    patients_arrived: u64,
    patients_served: u64,
    patients_consulted: u64,
    arrivals_rejected: u64,

    time_in_system: Vec<SimTime>,
    physician_wait: Vec<SimTime>,
    mh_wait: Vec<SimTime>,
    records: Vec<PatientRecord>,

    in_system: PrevalenceSamplePath,
    waiting_physician: PrevalenceSamplePath,
    waiting_mh: PrevalenceSamplePath,
    busy_exam: PrevalenceSamplePath,
    busy_consult: PrevalenceSamplePath,
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            patients_arrived: 0,
            patients_served: 0,
            patients_consulted: 0,
            arrivals_rejected: 0,
            time_in_system: Vec::new(),
            physician_wait: Vec::new(),
            mh_wait: Vec::new(),
            records: Vec::new(),
            in_system: PrevalenceSamplePath::new("Patients in the urgent care", 0),
            waiting_physician: PrevalenceSamplePath::new("Patients waiting", 0),
            waiting_mh: PrevalenceSamplePath::new("Patients waiting for MHS", 0),
            busy_exam: PrevalenceSamplePath::new("Busy exam rooms", 0),
            busy_consult: PrevalenceSamplePath::new("Busy consult rooms", 0),
        }
    }

    pub fn patient_arrived(&mut self, now: SimTime) -> Result<(), StatsError> {
        self.patients_arrived += 1;
        self.in_system.record_increment(now, 1)
    }

    pub fn arrival_rejected(&mut self) {
        self.arrivals_rejected += 1;
    }

    pub fn joined_queue(&mut self, stage: Stage, now: SimTime) -> Result<(), StatsError> {
        self.waiting_path_mut(stage).record_increment(now, 1)
    }

    pub fn left_queue(&mut self, stage: Stage, now: SimTime) -> Result<(), StatsError> {
        self.waiting_path_mut(stage).record_increment(now, -1)
    }

    pub fn service_started(&mut self, stage: Stage, now: SimTime) -> Result<(), StatsError> {
        self.busy_path_mut(stage).record_increment(now, 1)
    }

    pub fn service_ended(&mut self, stage: Stage, now: SimTime) -> Result<(), StatsError> {
        self.busy_path_mut(stage).record_increment(now, -1)
    }

    /// The physician stage is over for `patient`, whichever way they go next.
    pub fn physician_encounter_finished(&mut self, patient: &Patient) {
        self.physician_wait.push(patient.physician_wait());
    }

    /// `patient` leaves the clinic at `now`.
    pub fn patient_departed(&mut self, patient: &Patient, now: SimTime) -> Result<(), StatsError> {
        self.in_system.record_increment(now, -1)?;
        self.patients_served += 1;

        let time_in_system = patient.time_in_system(now);
        self.time_in_system.push(time_in_system);

        let mh_wait = if patient.at_risk {
            self.patients_consulted += 1;
            let wait = patient.mh_wait();
            self.mh_wait.push(wait);
            Some(wait)
        } else {
            None
        };

        self.records.push(PatientRecord {
            id: patient.id,
            at_risk: patient.at_risk,
            arrived: patient.arrived_at.unwrap_or(now),
            left: now,
            physician_wait: patient.physician_wait(),
            mh_wait,
            time_in_system,
        });
        Ok(())
    }

    /// Closes every sample path at `now`.
    pub fn close(&mut self, now: SimTime) -> Result<(), StatsError> {
        for path in [
            &mut self.in_system,
            &mut self.waiting_physician,
            &mut self.waiting_mh,
            &mut self.busy_exam,
            &mut self.busy_consult,
        ] {
            path.close(now)?;
        }
        Ok(())
    }

    pub fn patients_arrived(&self) -> u64 {
        self.patients_arrived
    }

    pub fn patients_served(&self) -> u64 {
        self.patients_served
    }

    pub fn patients_consulted(&self) -> u64 {
        self.patients_consulted
    }

    pub fn arrivals_rejected(&self) -> u64 {
        self.arrivals_rejected
    }

    pub fn mean_time_in_system(&self) -> Result<f64, StatsError> {
        mean(&self.time_in_system, Metric::TimeInSystem)
    }

    pub fn mean_physician_wait(&self) -> Result<f64, StatsError> {
        mean(&self.physician_wait, Metric::PhysicianWait)
    }

    pub fn mean_mh_wait(&self) -> Result<f64, StatsError> {
        mean(&self.mh_wait, Metric::MentalHealthWait)
    }

    pub fn observations(&self, metric: Metric) -> &[SimTime] {
        match metric {
            Metric::TimeInSystem => &self.time_in_system,
            Metric::PhysicianWait => &self.physician_wait,
            Metric::MentalHealthWait => &self.mh_wait,
        }
    }

    pub fn patient_records(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn patients_in_system(&self) -> &PrevalenceSamplePath {
        &self.in_system
    }

    pub fn patients_waiting(&self, stage: Stage) -> &PrevalenceSamplePath {
        match stage {
            Stage::Physician => &self.waiting_physician,
            Stage::MentalHealth => &self.waiting_mh,
        }
    }

    pub fn busy_servers(&self, stage: Stage) -> &PrevalenceSamplePath {
        match stage {
            Stage::Physician => &self.busy_exam,
            Stage::MentalHealth => &self.busy_consult,
        }
    }

    /// Every sample path, in-system first.
    pub fn sample_paths(&self) -> [&PrevalenceSamplePath; 5] {
        [
            &self.in_system,
            &self.waiting_physician,
            &self.waiting_mh,
            &self.busy_exam,
            &self.busy_consult,
        ]
    }

    fn waiting_path_mut(&mut self, stage: Stage) -> &mut PrevalenceSamplePath {
        match stage {
            Stage::Physician => &mut self.waiting_physician,
            Stage::MentalHealth => &mut self.waiting_mh,
        }
    }

    fn busy_path_mut(&mut self, stage: Stage) -> &mut PrevalenceSamplePath {
        match stage {
            Stage::Physician => &mut self.busy_exam,
            Stage::MentalHealth => &mut self.busy_consult,
        }
    }
}

fn mean(observations: &[SimTime], metric: Metric) -> Result<f64, StatsError> {
    if observations.is_empty() {
        return Err(StatsError::NoObservations(metric));
    }
    Ok(observations.iter().sum::<f64>() / observations.len() as f64)
}
