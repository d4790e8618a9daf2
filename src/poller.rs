//! Status Poller
//!
//! Fetches the device status snapshot on a fixed interval and keeps the
//! last successfully rendered panel. A failed poll is logged and otherwise
//! ignored: the previous panel stays in place until the next success.
//!
//! Each tick awaits its request before the next one starts, so polls never
//! overlap and panels are always rendered in request order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;

use crate::status::{render, Change, DeviceStatusSnapshot, Panel};
use crate::upstream::{HomeSecClient, UpstreamError};

/// Where status snapshots come from
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self) -> Result<DeviceStatusSnapshot, UpstreamError>;
}

#[async_trait]
impl StatusSource for HomeSecClient {
    async fn fetch_status(&self) -> Result<DeviceStatusSnapshot, UpstreamError> {
        self.device_status().await
    }
}

/// What the poller knows right now
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollState {
    /// Last successfully rendered panel
    pub panel: Option<Panel>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
    pub total_polls: u64,
}

/// Result of a single poll
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// New panel rendered; `changes` is empty on the first render
    Updated { panel: Panel, changes: Vec<Change> },
    /// Poll failed and the previous panel was kept
    Failed { error: String },
}

/// Periodic device status poller
pub struct StatusPoller {
    source: Arc<dyn StatusSource>,
    interval: Duration,
    state: Arc<RwLock<PollState>>,
    running: Arc<RwLock<bool>>,
}

impl StatusPoller {
    pub fn new(source: Arc<dyn StatusSource>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            state: Arc::new(RwLock::new(PollState::default())),
            running: Arc::new(RwLock::new(true)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Last successfully rendered panel
    pub async fn panel(&self) -> Option<Panel> {
        self.state.read().await.panel.clone()
    }

    pub async fn state(&self) -> PollState {
        self.state.read().await.clone()
    }

    /// Fetch and render one snapshot
    pub async fn poll_once(&self) -> PollOutcome {
        let result = self.source.fetch_status().await;
        let mut state = self.state.write().await;
        state.total_polls += 1;

        match result {
            Ok(snapshot) => {
                let panel = render(&snapshot);
                let changes = state
                    .panel
                    .as_ref()
                    .map(|previous| panel.changes_since(previous))
                    .unwrap_or_default();

                state.panel = Some(panel.clone());
                state.last_success = Some(Utc::now());
                state.last_error = None;
                state.consecutive_failures = 0;

                if !changes.is_empty() {
                    tracing::debug!(changed = changes.len(), "Device status changed");
                }
                PollOutcome::Updated { panel, changes }
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
                state.consecutive_failures += 1;

                tracing::warn!(
                    error = %e,
                    failures = state.consecutive_failures,
                    "Error fetching device status"
                );
                PollOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Poll forever (until [`stop`](Self::stop)), handing each outcome to `on_poll`.
    ///
    /// The first poll happens immediately.
    pub async fn run<F>(&self, mut on_poll: F)
    where
        F: FnMut(&PollOutcome) + Send,
    {
        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            if !*self.running.read().await {
                break;
            }

            let outcome = self.poll_once().await;
            on_poll(&outcome);
        }

        tracing::info!("Status poller stopped");
    }

    /// Start polling on a background task
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Starting status poller");
        tokio::spawn(async move { self.run(|_| {}).await })
    }

    /// Stop the poll loop at its next tick. A stopped poller does not restart.
    pub async fn stop(&self) {
        *self.running.write().await = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::Element;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted poll results, failing once the script runs out
    struct ScriptedSource {
        replies: Mutex<VecDeque<Result<DeviceStatusSnapshot, UpstreamError>>>,
    }

    impl ScriptedSource {
        fn new(replies: Vec<Result<DeviceStatusSnapshot, UpstreamError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
            })
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch_status(&self) -> Result<DeviceStatusSnapshot, UpstreamError> {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(UpstreamError::Unavailable))
        }
    }

    fn snapshot(value: serde_json::Value) -> DeviceStatusSnapshot {
        serde_json::from_value(value).unwrap()
    }

    fn front_door_text(panel: &Panel) -> String {
        panel.get(Element::FrontDoor).unwrap().text.clone()
    }

    #[tokio::test]
    async fn test_failed_poll_keeps_previous_panel() {
        let source = ScriptedSource::new(vec![
            Ok(snapshot(json!({ "frontDoor": "locked" }))),
            Err(UpstreamError::Timeout),
        ]);
        let poller = StatusPoller::new(source, Duration::from_millis(10));

        assert!(matches!(poller.poll_once().await, PollOutcome::Updated { .. }));
        assert!(matches!(poller.poll_once().await, PollOutcome::Failed { .. }));

        let state = poller.state().await;
        assert_eq!(front_door_text(state.panel.as_ref().unwrap()), "Locked");
        assert_eq!(state.consecutive_failures, 1);
        assert_eq!(state.total_polls, 2);
        assert_eq!(state.last_error.as_deref(), Some("Request timeout"));
        assert!(state.last_success.is_some());
    }

    #[tokio::test]
    async fn test_no_panel_before_first_success() {
        let poller = StatusPoller::new(ScriptedSource::new(vec![]), Duration::from_millis(10));
        poller.poll_once().await;
        assert!(poller.panel().await.is_none());
    }

    #[tokio::test]
    async fn test_changes_reported_between_renders() {
        let source = ScriptedSource::new(vec![
            Ok(snapshot(json!({ "frontDoor": "locked" }))),
            Ok(snapshot(json!({ "frontDoor": "unlocked" }))),
        ]);
        let poller = StatusPoller::new(source, Duration::from_millis(10));

        match poller.poll_once().await {
            PollOutcome::Updated { changes, .. } => assert!(changes.is_empty()),
            other => panic!("unexpected: {other:?}"),
        }
        match poller.poll_once().await {
            PollOutcome::Updated { panel, changes } => {
                assert_eq!(front_door_text(&panel), "Unlocked");
                assert_eq!(changes.len(), 1);
                assert_eq!(changes[0].element, Element::FrontDoor);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(poller.state().await.consecutive_failures, 0);
    }

    #[tokio::test]
    async fn test_background_poller_renders_and_stops() {
        let source = ScriptedSource::new(vec![Ok(snapshot(json!({ "ledLight": "on" })))]);
        let poller = Arc::new(StatusPoller::new(source, Duration::from_millis(20)));

        let handle = Arc::clone(&poller).start();
        tokio::time::sleep(Duration::from_millis(100)).await;

        let panel = poller.panel().await.unwrap();
        assert_eq!(panel.get(Element::LedLight).unwrap().text, "On");
        assert!(poller.state().await.total_polls >= 2);

        poller.stop().await;
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
