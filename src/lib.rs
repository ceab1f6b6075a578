//! Discrete-event simulation of an urgent-care clinic with an attached
//! mental-health consultation service.
//!
//! ```rust
//! use clinic_sim::config::Config;
//! use clinic_sim::simulator::Simulator;
//! use clinic_sim::trace::LogSink;
//!
//! let mut sim = Simulator::seeded(&Config::default(), Box::new(LogSink)).unwrap();
//! sim.run().unwrap();
//! assert_eq!(sim.stats().patients_served(), sim.stats().patients_arrived());
//! ```

pub mod clinic;
pub mod config;
pub mod error;
pub mod random;
pub mod report;
pub mod simulator;
pub mod stats;
pub mod trace;

pub use clinic::{Clinic, ClinicEvent, Stage};
pub use config::{Config, load_config};
pub use error::SimError;
pub use simulator::Simulator;
