// src/clinic/server.rs
use crate::clinic::patient::Patient;
use crate::clinic::{ClinicEvent, Stage};
use crate::error::SimError;
use crate::random::{DurationDistribution, RandomStream, draw_duration};
use crate::simulator::event_queue::{EventCalendar, SimTime};

/// A single exam or consult room. Busy exactly when it holds an occupant.
#[derive(Debug, Default)]
pub struct Server {
    occupant: Option<Patient>,
}

impl Server {
    pub fn is_busy(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn occupant(&self) -> Option<&Patient> {
        self.occupant.as_ref()
    }
}

/// Fixed-size pool of rooms serving one stage.
#[derive(Debug)]
pub struct ServerPool {
    stage: Stage,
    servers: Vec<Server>,
    service_time: DurationDistribution,
}

impl ServerPool {
    pub fn new(stage: Stage, size: usize, service_time: DurationDistribution) -> Self {
        Self {
            stage,
            servers: (0..size).map(|_| Server::default()).collect(),
            service_time,
        }
    }

    pub fn size(&self) -> usize {
        self.servers.len()
    }

    pub fn busy_count(&self) -> usize {
        self.servers.iter().filter(|s| s.is_busy()).count()
    }

    /// Lowest-numbered idle room, if any.
    pub fn first_idle(&self) -> Option<usize> {
        self.servers.iter().position(|s| !s.is_busy())
    }

    pub fn server(&self, room: usize) -> Option<&Server> {
        self.servers.get(room)
    }

    /// Puts `patient` into `room`, draws a service duration and schedules the
    /// room's completion event. Returns the completion time.
    pub fn start_service(
        &mut self,
        room: usize,
        patient: Patient,
        calendar: &mut EventCalendar<ClinicEvent>,
        rng: &mut dyn RandomStream,
    ) -> Result<SimTime, SimError> {
        let stage = self.stage;
        let server = self
            .servers
            .get_mut(room)
            .ok_or(SimError::NoSuchRoom { stage, room })?;
        if server.is_busy() {
            return Err(SimError::ServerBusy { stage, room });
        }
        let completes_at = calendar.now() + draw_duration(rng, &self.service_time)?;
        calendar.schedule(stage.completion_event(room), completes_at)?;
        server.occupant = Some(patient);
        Ok(completes_at)
    }

    /// Empties `room` and hands back its occupant.
    pub fn release(&mut self, room: usize) -> Result<Patient, SimError> {
        let stage = self.stage;
        self.servers
            .get_mut(room)
            .ok_or(SimError::NoSuchRoom { stage, room })?
            .occupant
            .take()
            .ok_or(SimError::ServerIdle { stage, room })
    }
}
