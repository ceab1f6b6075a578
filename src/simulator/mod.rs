pub mod event_queue;

use crate::clinic::patient::Patient;
use crate::clinic::{Clinic, ClinicEvent};
use crate::config::Config;
use crate::error::SimError;
use crate::random::{RandomStream, SeededStream};
use crate::simulator::event_queue::{EventCalendar, SimTime};
use crate::stats::StatsCollector;
use crate::trace::TraceSink;

/// Drives one clinic run: owns the calendar, the random stream and the clinic.
pub struct Simulator {
    calendar: EventCalendar<ClinicEvent>,
    clinic: Clinic,
    rng: Box<dyn RandomStream>,
    horizon: Option<SimTime>,
    events_processed: u64,
    finished: bool,
}

impl Simulator {
    /// Builds the clinic and seeds the opening arrival and the closing event.
    pub fn new(
        config: &Config,
        rng: Box<dyn RandomStream>,
        trace: Box<dyn TraceSink>,
    ) -> Result<Self, SimError> {
        let clinic = Clinic::new(config, trace)?;
        let mut calendar = EventCalendar::new();
        let first = Patient::new(config.run.initial_patient_id, config.run.initial_patient_at_risk);
        calendar.schedule(ClinicEvent::Arrival(first), 0.0)?;
        calendar.schedule(ClinicEvent::Close, config.clinic.close_time)?;
        tracing::info!(
            exam_rooms = config.clinic.exam_rooms,
            consult_rooms = config.clinic.consult_rooms,
            close_time = config.clinic.close_time,
            "Simulator initialized at time: {}",
            calendar.now()
        );
        Ok(Self {
            calendar,
            clinic,
            rng,
            horizon: config.clinic.horizon,
            events_processed: 0,
            finished: false,
        })
    }

    /// Same as [`Simulator::new`] with a [`SeededStream`] from `config.run.seed`.
    pub fn seeded(config: &Config, trace: Box<dyn TraceSink>) -> Result<Self, SimError> {
        Self::new(config, Box::new(SeededStream::new(config.run.seed)), trace)
    }

    /// Processes the next event, if there is one before the horizon.
    /// Returns the time at which it fired.
    pub fn step(&mut self) -> Result<Option<SimTime>, SimError> {
        if self.finished {
            return Ok(None);
        }
        let Some(next_time) = self.calendar.peek_time() else {
            return Ok(None);
        };
        if self.horizon.is_some_and(|h| next_time > h) {
            return Ok(None);
        }
        let Some((time, event)) = self.calendar.next() else {
            return Ok(None);
        };
        self.clinic.handle(event, &mut self.calendar, self.rng.as_mut())?;
        self.events_processed += 1;
        Ok(Some(time))
    }

    /// Runs until the calendar drains or the horizon is reached, then closes
    /// every sample path.
    pub fn run(&mut self) -> Result<(), SimError> {
        while self.step()?.is_some() {}
        self.finish()
    }

    /// Closes the statistics at the end time of the run.
    ///
    /// A run cut short by the horizon ends at the horizon; a drained run ends
    /// at its last event. Calling this more than once has no further effect.
    pub fn finish(&mut self) -> Result<(), SimError> {
        if self.finished {
            return Ok(());
        }
        if let Some(horizon) = self.horizon {
            if !self.calendar.is_empty() {
                self.calendar.advance_idle_to(horizon);
            }
        }
        let end = self.calendar.now();
        self.clinic.stats_mut().close(end)?;
        self.finished = true;
        tracing::info!(
            end,
            events = self.events_processed,
            pending = self.calendar.len(),
            "Simulation finished"
        );
        Ok(())
    }

    pub fn now(&self) -> SimTime {
        self.calendar.now()
    }

    pub fn clinic(&self) -> &Clinic {
        &self.clinic
    }

    pub fn stats(&self) -> &StatsCollector {
        self.clinic.stats()
    }

    pub fn events_processed(&self) -> u64 {
        self.events_processed
    }

    pub fn pending_events(&self) -> usize {
        self.calendar.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
