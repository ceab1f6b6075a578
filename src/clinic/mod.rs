//! Clinic orchestrator: waiting rooms, room pools and the four event handlers.
//!
//! Patients flow Arrival → physician stage → (if at risk) mental-health stage
//! → departure. At each stage an idle room always wins over queueing, and
//! each waiting room is served strictly first-come first-served.

pub mod patient;
pub mod queue;
pub mod server;

use std::fmt;

use serde::Serialize;

use crate::config::{Config, ConfigError, DistributionConfig};
use crate::error::SimError;
use crate::random::{DurationDistribution, RandomStream, draw_duration};
use crate::simulator::event_queue::{EventCalendar, SimTime};
use crate::stats::StatsCollector;
use crate::trace::{TraceEntry, TraceEvent, TraceSink};
use patient::Patient;
use queue::WaitingRoom;
use server::ServerPool;

/// Service stage. Tags waiting rooms, room pools and their statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Stage {
    Physician,
    MentalHealth,
}

impl Stage {
    /// Event that ends an occupancy of `room` in this stage.
    pub fn completion_event(self, room: usize) -> ClinicEvent {
        match self {
            Stage::Physician => ClinicEvent::EndOfExam { room },
            Stage::MentalHealth => ClinicEvent::EndOfMentalHealthConsult { room },
        }
    }

    pub fn room_name(self) -> &'static str {
        match self {
            Stage::Physician => "Exam Room",
            Stage::MentalHealth => "Consult Room",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Physician => f.write_str("physician"),
            Stage::MentalHealth => f.write_str("mental-health"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClinicEvent {
    Arrival(Patient),
    EndOfExam { room: usize },
    EndOfMentalHealthConsult { room: usize },
    Close,
}

pub struct Clinic {
    is_open: bool,
    prob_at_risk: f64,
    interarrival: DurationDistribution,
    physician_queue: WaitingRoom,
    exam_rooms: ServerPool,
    mh_queue: WaitingRoom,
    consult_rooms: ServerPool,
    stats: StatsCollector,
    trace: Box<dyn TraceSink>,
}

impl Clinic {
    pub fn new(config: &Config, trace: Box<dyn TraceSink>) -> Result<Self, ConfigError> {
        config.validate()?;
        let build = |name: &str, dist: &DistributionConfig| {
            DurationDistribution::try_from(dist)
                .map_err(|e| ConfigError::Invalid(format!("[{}] {}", name, e)))
        };
        Ok(Self {
            is_open: true,
            prob_at_risk: config.clinic.prob_at_risk,
            interarrival: build("arrivals", &config.arrivals)?,
            physician_queue: WaitingRoom::new(Stage::Physician),
            exam_rooms: ServerPool::new(
                Stage::Physician,
                config.clinic.exam_rooms,
                build("exam", &config.exam)?,
            ),
            mh_queue: WaitingRoom::new(Stage::MentalHealth),
            consult_rooms: ServerPool::new(
                Stage::MentalHealth,
                config.clinic.consult_rooms,
                build("consult", &config.consult)?,
            ),
            stats: StatsCollector::new(),
            trace,
        })
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }

    pub(crate) fn stats_mut(&mut self) -> &mut StatsCollector {
        &mut self.stats
    }

    pub fn trace(&self) -> &dyn TraceSink {
        self.trace.as_ref()
    }

    pub fn waiting_room(&self, stage: Stage) -> &WaitingRoom {
        match stage {
            Stage::Physician => &self.physician_queue,
            Stage::MentalHealth => &self.mh_queue,
        }
    }

    pub fn rooms(&self, stage: Stage) -> &ServerPool {
        match stage {
            Stage::Physician => &self.exam_rooms,
            Stage::MentalHealth => &self.consult_rooms,
        }
    }

    /// Patients currently waiting or in service, across both stages.
    pub fn patients_present(&self) -> usize {
        self.physician_queue.len()
            + self.exam_rooms.busy_count()
            + self.mh_queue.len()
            + self.consult_rooms.busy_count()
    }

    /// Dispatches one event to its handler.
    pub fn handle(
        &mut self,
        event: ClinicEvent,
        calendar: &mut EventCalendar<ClinicEvent>,
        rng: &mut dyn RandomStream,
    ) -> Result<(), SimError> {
        match event {
            ClinicEvent::Arrival(patient) => self.process_arrival(patient, calendar, rng),
            ClinicEvent::EndOfExam { room } => self.process_end_of_exam(room, calendar, rng),
            ClinicEvent::EndOfMentalHealthConsult { room } => {
                self.process_end_of_consult(room, calendar, rng)
            }
            ClinicEvent::Close => {
                self.process_close(calendar.now());
                Ok(())
            }
        }
    }

    fn process_arrival(
        &mut self,
        mut patient: Patient,
        calendar: &mut EventCalendar<ClinicEvent>,
        rng: &mut dyn RandomStream,
    ) -> Result<(), SimError> {
        let now = calendar.now();
        let id = patient.id;
        self.record(now, TraceEvent::ArrivalProcessed { patient: id });

        if !self.is_open {
            // Dropped patients do not generate a successor.
            tracing::debug!(patient = id, time = now, "clinic closed, arrival turned away");
            self.stats.arrival_rejected();
            self.record(now, TraceEvent::ArrivalRejected { patient: id });
            return Ok(());
        }

        let next_id = id
            .checked_add(1)
            .ok_or(SimError::PatientIdExhausted { last: id })?;
        patient.arrived_at = Some(now);
        self.stats.patient_arrived(now)?;
        self.admit(Stage::Physician, patient, calendar, rng)?;

        let next_arrival = now + draw_duration(rng, &self.interarrival)?;
        let at_risk = rng.uniform() < self.prob_at_risk;
        calendar.schedule(ClinicEvent::Arrival(Patient::new(next_id, at_risk)), next_arrival)
    }

    fn process_end_of_exam(
        &mut self,
        room: usize,
        calendar: &mut EventCalendar<ClinicEvent>,
        rng: &mut dyn RandomStream,
    ) -> Result<(), SimError> {
        let now = calendar.now();
        let patient = self.end_service(Stage::Physician, room, now)?;
        self.stats.physician_encounter_finished(&patient);

        if patient.at_risk {
            self.admit(Stage::MentalHealth, patient, calendar, rng)?;
        } else {
            self.discharge(patient, now)?;
        }

        if !self.physician_queue.is_empty() {
            let next = self.dequeue(Stage::Physician, now)?;
            self.start_service(Stage::Physician, room, next, calendar, rng)?;
        }
        Ok(())
    }

    fn process_end_of_consult(
        &mut self,
        room: usize,
        calendar: &mut EventCalendar<ClinicEvent>,
        rng: &mut dyn RandomStream,
    ) -> Result<(), SimError> {
        let now = calendar.now();
        let patient = self.end_service(Stage::MentalHealth, room, now)?;
        self.discharge(patient, now)?;

        if !self.mh_queue.is_empty() {
            let next = self.dequeue(Stage::MentalHealth, now)?;
            self.start_service(Stage::MentalHealth, room, next, calendar, rng)?;
        }
        Ok(())
    }

    fn process_close(&mut self, now: SimTime) {
        tracing::info!(time = now, "urgent care closed to new arrivals");
        self.is_open = false;
        self.record(now, TraceEvent::ClinicClosed);
    }

    /// Routes `patient` into `stage`: the first idle room, otherwise the back
    /// of the stage's waiting room.
    fn admit(
        &mut self,
        stage: Stage,
        patient: Patient,
        calendar: &mut EventCalendar<ClinicEvent>,
        rng: &mut dyn RandomStream,
    ) -> Result<(), SimError> {
        match self.rooms(stage).first_idle() {
            Some(room) => self.start_service(stage, room, patient, calendar, rng),
            None => self.enqueue(stage, patient, calendar.now()),
        }
    }

    fn start_service(
        &mut self,
        stage: Stage,
        room: usize,
        patient: Patient,
        calendar: &mut EventCalendar<ClinicEvent>,
        rng: &mut dyn RandomStream,
    ) -> Result<(), SimError> {
        let now = calendar.now();
        let id = patient.id;
        let completes_at = self.pool_mut(stage).start_service(room, patient, calendar, rng)?;
        self.stats.service_started(stage, now)?;
        tracing::debug!(patient = id, %stage, room, until = completes_at, "service started");
        self.record(now, TraceEvent::ServiceStarted { stage, room, patient: id });
        Ok(())
    }

    fn end_service(&mut self, stage: Stage, room: usize, now: SimTime) -> Result<Patient, SimError> {
        let patient = self.pool_mut(stage).release(room)?;
        self.stats.service_ended(stage, now)?;
        self.record(now, TraceEvent::ServiceEnded { stage, room, patient: patient.id });
        Ok(patient)
    }

    fn enqueue(&mut self, stage: Stage, patient: Patient, now: SimTime) -> Result<(), SimError> {
        let id = patient.id;
        let queue = self.queue_mut(stage);
        queue.join(patient, now);
        let waiting = queue.len();
        self.stats.joined_queue(stage, now)?;
        self.record(now, TraceEvent::JoinedQueue { stage, patient: id, waiting });
        Ok(())
    }

    fn dequeue(&mut self, stage: Stage, now: SimTime) -> Result<Patient, SimError> {
        let queue = self.queue_mut(stage);
        let patient = queue.leave(now)?;
        let waiting = queue.len();
        self.stats.left_queue(stage, now)?;
        self.record(now, TraceEvent::LeftQueue { stage, patient: patient.id, waiting });
        Ok(patient)
    }

    fn discharge(&mut self, patient: Patient, now: SimTime) -> Result<(), SimError> {
        self.stats.patient_departed(&patient, now)?;
        self.record(now, TraceEvent::Departed { patient: patient.id });
        Ok(())
    }

    fn queue_mut(&mut self, stage: Stage) -> &mut WaitingRoom {
        match stage {
            Stage::Physician => &mut self.physician_queue,
            Stage::MentalHealth => &mut self.mh_queue,
        }
    }

    fn pool_mut(&mut self, stage: Stage) -> &mut ServerPool {
        match stage {
            Stage::Physician => &mut self.exam_rooms,
            Stage::MentalHealth => &mut self.consult_rooms,
        }
    }

    fn record(&mut self, time: SimTime, event: TraceEvent) {
        self.trace.record(TraceEntry { time, event });
    }
}
