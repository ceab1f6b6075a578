use clinic_sim::config::{load_config, DistributionConfig};
use clinic_sim::simulator::Simulator;
use clinic_sim::trace::LogSink;

#[test]
fn test_example_config_loads_and_runs() {
    let config = load_config("clinic.toml").unwrap();
    assert_eq!(config.clinic.exam_rooms, 4);
    assert_eq!(config.clinic.consult_rooms, 1);
    assert_eq!(config.exam, DistributionConfig::Exponential { mean: 0.25 });

    let mut sim = Simulator::seeded(&config, Box::new(LogSink)).unwrap();
    sim.run().unwrap();
    let stats = sim.stats();
    assert!(stats.patients_arrived() > 100);
    assert_eq!(stats.patients_served(), stats.patients_arrived());
    assert!(stats.mean_time_in_system().unwrap() >= stats.mean_physician_wait().unwrap());
}
