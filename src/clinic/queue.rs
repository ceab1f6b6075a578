// src/clinic/queue.rs
use std::collections::VecDeque;

use crate::clinic::Stage;
use crate::clinic::patient::Patient;
use crate::error::SimError;
use crate::simulator::event_queue::SimTime;

/// FIFO waiting room for one stage. Unbounded.
#[derive(Debug)]
pub struct WaitingRoom {
    stage: Stage,
    patients: VecDeque<Patient>,
}

impl WaitingRoom {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            patients: VecDeque::new(),
        }
    }

    /// Adds `patient` at the back, stamping the stage's join time.
    pub fn join(&mut self, mut patient: Patient, now: SimTime) {
        match self.stage {
            Stage::Physician => patient.joined_physician_queue = Some(now),
            Stage::MentalHealth => patient.joined_mh_queue = Some(now),
        }
        self.patients.push_back(patient);
    }

    /// Removes the patient at the front, stamping the stage's leave time.
    pub fn leave(&mut self, now: SimTime) -> Result<Patient, SimError> {
        let mut patient = self
            .patients
            .pop_front()
            .ok_or(SimError::EmptyQueue { stage: self.stage })?;
        match self.stage {
            Stage::Physician => patient.left_physician_queue = Some(now),
            Stage::MentalHealth => patient.left_mh_queue = Some(now),
        }
        Ok(patient)
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Patient> {
        self.patients.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leave_from_empty_room_is_an_error() {
        let mut room = WaitingRoom::new(Stage::MentalHealth);
        let err = room.leave(1.0).unwrap_err();
        assert!(matches!(err, SimError::EmptyQueue { stage: Stage::MentalHealth }));
    }

    #[test]
    fn test_stamps_stage_specific_timestamps() {
        let mut room = WaitingRoom::new(Stage::Physician);
        room.join(Patient::new(1, false), 2.0);
        let p = room.leave(10.0).unwrap();
        assert_eq!(p.joined_physician_queue, Some(2.0));
        assert_eq!(p.left_physician_queue, Some(10.0));
        assert_eq!(p.joined_mh_queue, None);
        assert_eq!(p.physician_wait(), 8.0);

        let mut mh = WaitingRoom::new(Stage::MentalHealth);
        mh.join(p, 11.0);
        let p = mh.leave(12.5).unwrap();
        assert_eq!(p.mh_wait(), 1.5);
        assert_eq!(p.physician_wait(), 8.0);
    }

    #[test]
    fn test_fifo_order_is_preserved() {
        let mut room = WaitingRoom::new(Stage::Physician);
        for id in 0..5 {
            room.join(Patient::new(id, false), id as f64);
        }
        assert_eq!(room.len(), 5);
        let ids: Vec<u64> = (0..5).map(|_| room.leave(9.0).unwrap().id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert!(room.is_empty());
    }
}
