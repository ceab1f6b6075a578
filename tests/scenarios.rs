use clinic_sim::config::{Config, DistributionConfig};
use clinic_sim::simulator::Simulator;
use clinic_sim::stats::{Metric, StatsError};
use clinic_sim::trace::{EventLog, TraceEvent};
use clinic_sim::Stage;

/// Deterministic clinic: constant durations and no random risk flags.
fn constant_config(exam_rooms: usize, interarrival: f64, exam: f64, consult: f64, close: f64) -> Config {
    let mut config = Config::default();
    config.clinic.exam_rooms = exam_rooms;
    config.clinic.consult_rooms = 1;
    config.clinic.prob_at_risk = 0.0;
    config.clinic.close_time = close;
    config.arrivals = DistributionConfig::Constant { value: interarrival };
    config.exam = DistributionConfig::Constant { value: exam };
    config.consult = DistributionConfig::Constant { value: consult };
    config
}

fn traced(config: &Config) -> Simulator {
    Simulator::seeded(config, Box::new(EventLog::new())).unwrap()
}

fn events_at(sim: &Simulator, time: f64) -> Vec<TraceEvent> {
    sim.clinic()
        .trace()
        .entries()
        .iter()
        .filter(|e| e.time == time)
        .map(|e| e.event.clone())
        .collect()
}

#[test]
fn test_direct_service() {
    let config = constant_config(1, 100.0, 5.0, 1.0, 50.0);
    let mut sim = traced(&config);

    assert_eq!(sim.step().unwrap(), Some(0.0));
    assert!(sim.clinic().rooms(Stage::Physician).server(0).unwrap().is_busy());
    assert_eq!(sim.clinic().waiting_room(Stage::Physician).len(), 0);

    assert_eq!(sim.step().unwrap(), Some(5.0));
    assert!(events_at(&sim, 5.0).contains(&TraceEvent::ServiceEnded {
        stage: Stage::Physician,
        room: 0,
        patient: 0
    }));
    assert_eq!(sim.stats().patients_served(), 1);

    sim.run().unwrap();
    let stats = sim.stats();
    assert_eq!(stats.patients_arrived(), 1);
    assert_eq!(stats.patients_served(), 1);
    assert_eq!(stats.mean_time_in_system().unwrap(), 5.0);
    assert_eq!(stats.mean_physician_wait().unwrap(), 0.0);
    assert_eq!(
        stats.mean_mh_wait(),
        Err(StatsError::NoObservations(Metric::MentalHealthWait))
    );
}

#[test]
fn test_queueing_behind_busy_room() {
    let config = constant_config(1, 2.0, 10.0, 1.0, 3.0);
    let mut sim = traced(&config);
    sim.run().unwrap();

    assert!(events_at(&sim, 2.0).contains(&TraceEvent::JoinedQueue {
        stage: Stage::Physician,
        patient: 1,
        waiting: 1
    }));
    let at_ten = events_at(&sim, 10.0);
    let left = at_ten
        .iter()
        .position(|e| *e == TraceEvent::LeftQueue { stage: Stage::Physician, patient: 1, waiting: 0 })
        .unwrap();
    let started = at_ten
        .iter()
        .position(|e| *e == TraceEvent::ServiceStarted { stage: Stage::Physician, room: 0, patient: 1 })
        .unwrap();
    assert!(left < started);

    let record = sim.stats().patient_records().iter().find(|r| r.id == 1).unwrap();
    assert_eq!(record.arrived, 2.0);
    assert_eq!(record.physician_wait, 8.0);
    assert_eq!(record.left, 20.0);
    assert_eq!(record.time_in_system, 18.0);
    // Patients 0 and 1 admitted; the arrival at t=4 finds the clinic closed.
    assert_eq!(sim.stats().patients_arrived(), 2);
    assert_eq!(sim.stats().arrivals_rejected(), 1);
    assert_eq!(sim.stats().mean_physician_wait().unwrap(), 4.0);
}

#[test]
fn test_risk_routing_to_idle_consult_room() {
    let mut config = constant_config(1, 100.0, 5.0, 3.0, 50.0);
    config.run.initial_patient_at_risk = true;
    let mut sim = traced(&config);

    assert_eq!(sim.step().unwrap(), Some(0.0));
    assert_eq!(sim.step().unwrap(), Some(5.0));
    assert!(events_at(&sim, 5.0).contains(&TraceEvent::ServiceStarted {
        stage: Stage::MentalHealth,
        room: 0,
        patient: 0
    }));
    assert_eq!(sim.clinic().waiting_room(Stage::MentalHealth).len(), 0);
    assert_eq!(sim.stats().patients_served(), 0);
    assert_eq!(sim.stats().patients_consulted(), 0);

    assert_eq!(sim.step().unwrap(), Some(8.0));
    let stats = sim.stats();
    assert_eq!(stats.patients_served(), 1);
    assert_eq!(stats.patients_consulted(), 1);
    assert_eq!(stats.mean_mh_wait().unwrap(), 0.0);
    assert_eq!(stats.mean_time_in_system().unwrap(), 8.0);
}

#[test]
fn test_closed_clinic_drops_arrivals() {
    let config = constant_config(1, 105.0, 1.0, 1.0, 100.0);
    let mut sim = traced(&config);
    sim.run().unwrap();

    assert!(events_at(&sim, 100.0).contains(&TraceEvent::ClinicClosed));
    assert!(events_at(&sim, 105.0).contains(&TraceEvent::ArrivalRejected { patient: 1 }));
    let stats = sim.stats();
    assert_eq!(stats.patients_arrived(), 1);
    assert_eq!(stats.arrivals_rejected(), 1);
    assert_eq!(sim.clinic().patients_present(), 0);
    assert_eq!(sim.clinic().rooms(Stage::Physician).busy_count(), 0);
    // The dropped patient does not schedule a successor.
    assert_eq!(sim.pending_events(), 0);
    assert_eq!(sim.now(), 105.0);
}

#[test]
fn test_consult_queue_serves_in_order() {
    // Three at-risk patients an hour apart, short exams, long consults.
    let mut config = constant_config(3, 1.0, 0.5, 4.0, 2.5);
    config.clinic.prob_at_risk = 1.0;
    config.run.initial_patient_at_risk = true;
    let mut sim = traced(&config);
    sim.run().unwrap();

    let stats = sim.stats();
    assert_eq!(stats.patients_arrived(), 3);
    assert_eq!(stats.patients_consulted(), 3);
    let order: Vec<u64> = stats.patient_records().iter().map(|r| r.id).collect();
    assert_eq!(order, vec![0, 1, 2]);
    // Consults run 0.5–4.5, 4.5–8.5, 8.5–12.5.
    let waits = stats.observations(Metric::MentalHealthWait);
    assert_eq!(waits, &[0.0, 3.0, 6.0]);
    assert_eq!(sim.now(), 12.5);
}
