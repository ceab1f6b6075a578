// src/stats/sample_path.rs - Continuous-time prevalence statistics
use crate::simulator::event_queue::SimTime;
use crate::stats::StatsError;

/// Piecewise-constant integer quantity over simulated time.
///
/// The time-weighted area is accumulated as steps arrive, so the average is
/// available as soon as the path is closed.
#[derive(Debug, Clone)]
pub struct PrevalenceSamplePath {
    name: String,
    start_time: SimTime,
    level: i64,
    max_level: i64,
    last_time: SimTime,
    area: f64,
    steps: Vec<(SimTime, i64)>,
    closed_at: Option<SimTime>,
}

impl PrevalenceSamplePath {
    /// A path at `initial_level` from time zero.
    pub fn new(name: impl Into<String>, initial_level: i64) -> Self {
        let start_time = 0.0;
        Self {
            name: name.into(),
            start_time,
            level: initial_level,
            max_level: initial_level,
            last_time: start_time,
            area: 0.0,
            steps: vec![(start_time, initial_level)],
            closed_at: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> i64 {
        self.level
    }

    pub fn max_level(&self) -> i64 {
        self.max_level
    }

    /// Every `(time, level)` step, starting with the initial level.
    pub fn steps(&self) -> &[(SimTime, i64)] {
        &self.steps
    }

    pub fn closed_at(&self) -> Option<SimTime> {
        self.closed_at
    }

    /// Applies a signed change to the level at `time`.
    pub fn record_increment(&mut self, time: SimTime, increment: i64) -> Result<(), StatsError> {
        self.advance(time)?;
        let level = self.level + increment;
        if level < 0 {
            return Err(StatsError::NegativeLevel {
                path: self.name.clone(),
                time,
            });
        }
        self.level = level;
        self.max_level = self.max_level.max(level);
        self.steps.push((time, level));
        Ok(())
    }

    /// Finalizes the last interval at `time`. No further increments are accepted.
    pub fn close(&mut self, time: SimTime) -> Result<(), StatsError> {
        self.advance(time)?;
        self.closed_at = Some(time);
        Ok(())
    }

    /// Time-weighted mean level over `[start, close]`.
    pub fn time_average(&self) -> Result<f64, StatsError> {
        let end = self
            .closed_at
            .ok_or_else(|| StatsError::PathNotClosed(self.name.clone()))?;
        let span = end - self.start_time;
        if span <= 0.0 {
            return Err(StatsError::EmptyInterval(self.name.clone()));
        }
        Ok(self.area / span)
    }

    fn advance(&mut self, time: SimTime) -> Result<(), StatsError> {
        if self.closed_at.is_some() {
            return Err(StatsError::PathClosed(self.name.clone()));
        }
        if !time.is_finite() || time < self.last_time {
            return Err(StatsError::NonMonotonicTime {
                path: self.name.clone(),
                time,
                last: self.last_time,
            });
        }
        self.area += self.level as f64 * (time - self.last_time);
        self.last_time = time;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_average_of_step_function() {
        let mut path = PrevalenceSamplePath::new("queue", 0);
        path.record_increment(2.0, 1).unwrap();
        path.record_increment(4.0, 1).unwrap();
        path.record_increment(6.0, -2).unwrap();
        path.close(10.0).unwrap();
        // 0*2 + 1*2 + 2*2 + 0*4 = 6 over 10
        assert!((path.time_average().unwrap() - 0.6).abs() < 1e-12);
        assert_eq!(path.max_level(), 2);
        assert_eq!(path.level(), 0);
        assert_eq!(path.steps().len(), 4);
    }

    #[test]
    fn test_same_instant_updates_do_not_add_area() {
        let mut path = PrevalenceSamplePath::new("busy", 0);
        path.record_increment(1.0, 1).unwrap();
        path.record_increment(1.0, -1).unwrap();
        path.record_increment(1.0, 1).unwrap();
        path.close(3.0).unwrap();
        assert!((path.time_average().unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_requires_close() {
        let mut path = PrevalenceSamplePath::new("open", 1);
        assert!(matches!(path.time_average(), Err(StatsError::PathNotClosed(_))));
        path.close(0.0).unwrap();
        assert!(matches!(path.time_average(), Err(StatsError::EmptyInterval(_))));
    }

    #[test]
    fn test_rejects_negative_level_and_time_travel() {
        let mut path = PrevalenceSamplePath::new("p", 0);
        assert!(matches!(
            path.record_increment(1.0, -1),
            Err(StatsError::NegativeLevel { .. })
        ));
        path.record_increment(5.0, 1).unwrap();
        assert!(matches!(
            path.record_increment(4.0, 1),
            Err(StatsError::NonMonotonicTime { .. })
        ));
        path.close(6.0).unwrap();
        assert!(matches!(path.record_increment(7.0, 1), Err(StatsError::PathClosed(_))));
    }
}
