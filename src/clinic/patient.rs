// src/clinic/patient.rs
use std::fmt;

use crate::simulator::event_queue::SimTime;

/// One individual moving through the clinic.
///
/// The record is owned by whichever structure currently holds the patient:
/// the calendar (pending arrival), a waiting room, or a server.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub id: u64,
    pub at_risk: bool,
    pub arrived_at: Option<SimTime>,
    pub joined_physician_queue: Option<SimTime>,
    pub left_physician_queue: Option<SimTime>,
    pub joined_mh_queue: Option<SimTime>,
    pub left_mh_queue: Option<SimTime>,
}

impl Patient {
    pub fn new(id: u64, at_risk: bool) -> Self {
        Self {
            id,
            at_risk,
            arrived_at: None,
            joined_physician_queue: None,
            left_physician_queue: None,
            joined_mh_queue: None,
            left_mh_queue: None,
        }
    }

    /// Time spent in the physician waiting room; zero if never queued.
    pub fn physician_wait(&self) -> SimTime {
        interval(self.joined_physician_queue, self.left_physician_queue)
    }

    /// Time spent in the mental-health waiting room; zero if never queued.
    pub fn mh_wait(&self) -> SimTime {
        interval(self.joined_mh_queue, self.left_mh_queue)
    }

    /// Time since admission, as seen at `now`.
    pub fn time_in_system(&self, now: SimTime) -> SimTime {
        self.arrived_at.map_or(0.0, |t| now - t)
    }
}

fn interval(joined: Option<SimTime>, left: Option<SimTime>) -> SimTime {
    match (joined, left) {
        (Some(joined), Some(left)) => left - joined,
        _ => 0.0,
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Patient {}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waits_default_to_zero() {
        let p = Patient::new(3, true);
        assert_eq!(p.physician_wait(), 0.0);
        assert_eq!(p.mh_wait(), 0.0);
        assert_eq!(p.time_in_system(10.0), 0.0);
        assert_eq!(p.to_string(), "Patient 3");
    }

    #[test]
    fn test_waits_from_own_timestamps() {
        let mut p = Patient::new(0, true);
        p.arrived_at = Some(1.0);
        p.joined_physician_queue = Some(1.0);
        p.left_physician_queue = Some(2.5);
        p.joined_mh_queue = Some(3.0);
        p.left_mh_queue = Some(3.25);
        assert_eq!(p.physician_wait(), 1.5);
        assert_eq!(p.mh_wait(), 0.25);
        assert_eq!(p.time_in_system(4.0), 3.0);
    }
}
