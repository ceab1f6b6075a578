// src/report.rs - Run summary and CSV/JSON export
use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::clinic::Stage;
use crate::simulator::Simulator;
use crate::simulator::event_queue::SimTime;
use crate::stats::{PrevalenceSamplePath, StatsCollector};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct PathSummary {
    pub name: String,
    pub time_average: Option<f64>,
    pub max_level: i64,
    pub closed_at: Option<SimTime>,
}

impl From<&PrevalenceSamplePath> for PathSummary {
    fn from(path: &PrevalenceSamplePath) -> Self {
        Self {
            name: path.name().to_string(),
            time_average: path.time_average().ok(),
            max_level: path.max_level(),
            closed_at: path.closed_at(),
        }
    }
}

/// End-of-run figures. Undefined averages serialize as `null`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub end_time: SimTime,
    pub events_processed: u64,
    pub patients_arrived: u64,
    pub patients_served: u64,
    pub patients_consulted: u64,
    pub arrivals_rejected: u64,
    pub mean_time_in_system: Option<f64>,
    pub mean_physician_wait: Option<f64>,
    pub mean_mh_wait: Option<f64>,
    pub exam_utilization: Option<f64>,
    pub consult_utilization: Option<f64>,
    pub sample_paths: Vec<PathSummary>,
}

impl RunSummary {
    pub fn from_simulator(sim: &Simulator) -> Self {
        let stats = sim.stats();
        let utilization = |stage: Stage| {
            let rooms = sim.clinic().rooms(stage).size();
            stats
                .busy_servers(stage)
                .time_average()
                .ok()
                .map(|busy| busy / rooms as f64)
        };
        Self {
            end_time: sim.now(),
            events_processed: sim.events_processed(),
            patients_arrived: stats.patients_arrived(),
            patients_served: stats.patients_served(),
            patients_consulted: stats.patients_consulted(),
            arrivals_rejected: stats.arrivals_rejected(),
            mean_time_in_system: stats.mean_time_in_system().ok(),
            mean_physician_wait: stats.mean_physician_wait().ok(),
            mean_mh_wait: stats.mean_mh_wait().ok(),
            exam_utilization: utilization(Stage::Physician),
            consult_utilization: utilization(Stage::MentalHealth),
            sample_paths: stats.sample_paths().into_iter().map(PathSummary::from).collect(),
        }
    }
}

fn or_undefined(value: Option<f64>) -> String {
    value.map_or_else(|| "undefined (no observations)".to_string(), |v| format!("{:.4}", v))
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation ended at: {:.4}", self.end_time)?;
        writeln!(f, "Events processed: {}", self.events_processed)?;
        writeln!(f, "Total patients arrived: {}", self.patients_arrived)?;
        writeln!(f, "Total patients served: {}", self.patients_served)?;
        writeln!(f, "Patients received mental health consultation: {}", self.patients_consulted)?;
        writeln!(f, "Arrivals turned away (closed): {}", self.arrivals_rejected)?;
        writeln!(f, "Average patient time in system: {}", or_undefined(self.mean_time_in_system))?;
        writeln!(f, "Average patient waiting time: {}", or_undefined(self.mean_physician_wait))?;
        writeln!(f, "Average patient wait time for MHS: {}", or_undefined(self.mean_mh_wait))?;
        writeln!(f, "Exam room utilization: {}", or_undefined(self.exam_utilization))?;
        writeln!(f, "Consult room utilization: {}", or_undefined(self.consult_utilization))?;
        for path in &self.sample_paths {
            writeln!(
                f,
                "  {}: time-average {}, max {}",
                path.name,
                or_undefined(path.time_average),
                path.max_level
            )?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct PathStep<'a> {
    path: &'a str,
    time: SimTime,
    level: i64,
}

/// One row per departed patient.
pub fn write_patient_csv(path: &Path, stats: &StatsCollector) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in stats.patient_records() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// One row per step of every sample path, for external plotting.
pub fn write_sample_paths_csv(path: &Path, stats: &StatsCollector) -> Result<(), ReportError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for sample_path in stats.sample_paths() {
        for &(time, level) in sample_path.steps() {
            wtr.serialize(PathStep { path: sample_path.name(), time, level })?;
        }
        if let Some(end) = sample_path.closed_at() {
            wtr.serialize(PathStep { path: sample_path.name(), time: end, level: sample_path.level() })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `patients.csv`, `sample_paths.csv` and `summary.json` into `dir`.
pub fn write_outputs(dir: &Path, sim: &Simulator) -> Result<(), ReportError> {
    fs::create_dir_all(dir)?;
    write_patient_csv(&dir.join("patients.csv"), sim.stats())?;
    write_sample_paths_csv(&dir.join("sample_paths.csv"), sim.stats())?;
    let summary = RunSummary::from_simulator(sim);
    fs::write(dir.join("summary.json"), serde_json::to_string_pretty(&summary)?)?;
    tracing::info!("Wrote run outputs to {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::trace::LogSink;
    use tempfile::tempdir;

    fn finished_run() -> Simulator {
        let mut config = Config::default();
        config.clinic.close_time = 4.0;
        let mut sim = Simulator::seeded(&config, Box::new(LogSink)).unwrap();
        sim.run().unwrap();
        sim
    }

    #[test]
    fn test_summary_matches_stats() {
        let sim = finished_run();
        let summary = RunSummary::from_simulator(&sim);
        assert_eq!(summary.patients_arrived, sim.stats().patients_arrived());
        assert_eq!(summary.sample_paths.len(), 5);
        let util = summary.exam_utilization.unwrap();
        assert!((0.0..=1.0).contains(&util));
        assert!(summary.to_string().contains("Total patients served"));
    }

    #[test]
    fn test_undefined_average_serializes_as_null() {
        let mut config = Config::default();
        config.clinic.horizon = Some(0.0);
        let mut sim = Simulator::seeded(&config, Box::new(LogSink)).unwrap();
        sim.run().unwrap();
        let summary = RunSummary::from_simulator(&sim);
        assert_eq!(summary.mean_time_in_system, None);
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["mean_time_in_system"].is_null());
        assert!(summary.to_string().contains("undefined"));
    }

    #[test]
    fn test_write_outputs() {
        let sim = finished_run();
        let dir = tempdir().unwrap();
        write_outputs(dir.path(), &sim).unwrap();
        let patients = fs::read_to_string(dir.path().join("patients.csv")).unwrap();
        let mut lines = patients.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,at_risk,arrived,left,physician_wait,mh_wait,time_in_system"
        );
        assert_eq!(lines.count() as u64, sim.stats().patients_served());
        let paths = fs::read_to_string(dir.path().join("sample_paths.csv")).unwrap();
        assert!(paths.starts_with("path,time,level"));
        assert!(dir.path().join("summary.json").exists());
    }
}
