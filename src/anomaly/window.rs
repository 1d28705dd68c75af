//! Fixed-capacity trailing window of scalar observations for one sensor.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

// ---

/// One derived scalar and the arrival time of the reading it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Owned copy of a window: the reference history and the candidate to score.
///
/// `history` holds up to `capacity` observations that arrived *before*
/// `latest`, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowSnapshot {
    pub history: Vec<f64>,
    pub latest: Option<Observation>,
}

/// The newest observation plus the `capacity` observations before it.
///
/// Keeping the candidate apart from its history means the scorer never
/// measures a reading against a window that already contains it.
#[derive(Debug)]
pub struct SensorWindow {
    capacity: usize,
    history: VecDeque<f64>,
    latest: Option<Observation>,
}

impl SensorWindow {
    /// Panics if `capacity` is zero; configuration loading rejects that.
    pub fn new(capacity: usize) -> Self {
        // ---
        assert!(capacity > 0, "window capacity must be greater than zero");
        Self {
            capacity,
            history: VecDeque::with_capacity(capacity),
            latest: None,
        }
    }

    /// Make `observation` the candidate, moving the previous one into history.
    pub fn append(&mut self, observation: Observation) {
        // ---
        if let Some(prev) = self.latest.replace(observation) {
            if self.history.len() == self.capacity {
                self.history.pop_front();
            }
            self.history.push_back(prev.value);
        }
    }

    pub fn snapshot(&self) -> WindowSnapshot {
        // ---
        WindowSnapshot {
            history: self.history.iter().copied().collect(),
            latest: self.latest,
        }
    }

    /// Arrival time of the current candidate.
    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.latest.map(|o| o.timestamp)
    }

    /// Number of observations held, candidate included.
    pub fn len(&self) -> usize {
        self.history.len() + usize::from(self.latest.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_none()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn obs(secs: i64, value: f64) -> Observation {
        Observation {
            timestamp: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
            value,
        }
    }

    #[test]
    fn test_first_append_has_no_history() {
        // ---
        let mut window = SensorWindow::new(3);
        assert!(window.is_empty());

        window.append(obs(0, 1.0));
        let snap = window.snapshot();
        assert!(snap.history.is_empty());
        assert_eq!(snap.latest, Some(obs(0, 1.0)));
        assert_eq!(window.len(), 1);
        assert_eq!(window.latest_timestamp(), Some(obs(0, 1.0).timestamp));
    }

    #[test]
    fn test_evicts_oldest_at_capacity() {
        // ---
        let mut window = SensorWindow::new(3);
        for i in 0..6 {
            window.append(obs(i, i as f64));
        }

        let snap = window.snapshot();
        assert_eq!(snap.history, vec![2.0, 3.0, 4.0]);
        assert_eq!(snap.latest.map(|o| o.value), Some(5.0));
        assert_eq!(window.len(), 4);
    }

    #[test]
    fn test_snapshot_is_detached() {
        // ---
        let mut window = SensorWindow::new(5);
        window.append(obs(0, 10.0));
        window.append(obs(1, 20.0));
        let before = window.snapshot();

        window.append(obs(2, 30.0));
        assert_eq!(before.history, vec![10.0]);
        assert_eq!(window.snapshot().history, vec![10.0, 20.0]);
    }

    #[test]
    #[should_panic(expected = "window capacity")]
    fn test_zero_capacity_panics() {
        // ---
        let _ = SensorWindow::new(0);
    }
}
