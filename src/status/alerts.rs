//! Dashboard alert feed
//!
//! Newest-first list of timestamped alert lines, with a placeholder line
//! while the feed is empty.

use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// Shown while no alert has been recorded
pub const NO_ALERTS: &str = "No alerts at the moment";

const DEFAULT_CAPACITY: usize = 50;

/// A single alert line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub time: String,
    pub message: String,
}

impl Alert {
    pub fn at(time: DateTime<Local>, message: impl Into<String>) -> Self {
        Self {
            time: time.format("%H:%M:%S").to_string(),
            message: message.into(),
        }
    }

    pub fn line(&self) -> String {
        format!("{} - {}", self.time, self.message)
    }
}

/// Bounded, newest-first alert feed
#[derive(Debug, Clone)]
pub struct AlertFeed {
    alerts: VecDeque<Alert>,
    capacity: usize,
}

impl AlertFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            alerts: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Record an alert stamped with the current local time
    pub fn push(&mut self, message: impl Into<String>) {
        self.push_alert(Alert::at(Local::now(), message));
    }

    pub fn push_alert(&mut self, alert: Alert) {
        self.alerts.push_front(alert);
        self.alerts.truncate(self.capacity);
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Lines to display, newest first
    pub fn lines(&self) -> Vec<String> {
        if self.alerts.is_empty() {
            return vec![NO_ALERTS.to_string()];
        }
        self.alerts.iter().map(Alert::line).collect()
    }
}

impl Default for AlertFeed {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn alert(hour: u32, message: &str) -> Alert {
        let time = Local.with_ymd_and_hms(2026, 1, 5, hour, 30, 15).unwrap();
        Alert::at(time, message)
    }

    #[test]
    fn test_empty_feed_shows_placeholder() {
        let feed = AlertFeed::default();
        assert_eq!(feed.lines(), vec![NO_ALERTS.to_string()]);
    }

    #[test]
    fn test_newest_first() {
        let mut feed = AlertFeed::default();
        feed.push_alert(alert(8, "Front Door: Locked -> Unlocked"));
        feed.push_alert(alert(9, "Motion Sensor: No Motion -> Motion Detected!"));

        let lines = feed.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "09:30:15 - Motion Sensor: No Motion -> Motion Detected!");
        assert_eq!(lines[1], "08:30:15 - Front Door: Locked -> Unlocked");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut feed = AlertFeed::new(2);
        feed.push_alert(alert(1, "a"));
        feed.push_alert(alert(2, "b"));
        feed.push_alert(alert(3, "c"));

        assert_eq!(feed.len(), 2);
        assert_eq!(feed.lines(), vec!["03:30:15 - c", "02:30:15 - b"]);
    }
}
