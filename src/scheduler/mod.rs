//! Planificador del ciclo consulta → comparación → notificación.
//!
//! Una única tarea dueña del snapshot: no hay candados porque nadie más lo
//! escribe ni lo lee. Los ciclos nunca se solapan.

pub mod depends;

pub use depends::ready::await_ready;
pub use depends::tracker::{TickOutcome, TrackerState, TrackerStatus};

use crate::metrics::MetricsCollector;
use crate::notify::Notifier;
use crate::state::POLL_INTERVAL;
use crate::status::{diff, Snapshot, StatusSource};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

pub struct Scheduler {
    source: Arc<dyn StatusSource>,
    notifier: Notifier,
    state: TrackerState,
    status_tx: watch::Sender<TrackerStatus>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(
        source: Arc<dyn StatusSource>,
        notifier: Notifier,
        status_tx: watch::Sender<TrackerStatus>,
    ) -> Self {
        Self {
            source,
            notifier,
            state: TrackerState::Uninitialized,
            status_tx,
            interval: POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.state.snapshot()
    }

    /// Ejecuta un ciclo completo. Ningún fallo dentro del ciclo se propaga.
    pub async fn tick(&mut self) -> TickOutcome {
        MetricsCollector::increment_ticks();
        log::info!("Checking executor statuses...");
        let checked_at = Utc::now();

        let Some(records) = self.source.fetch().await else {
            log::warn!("⚠️ No data this tick; keeping the previous snapshot.");
            self.publish_status(checked_at, false);
            return TickOutcome::Skipped;
        };

        // Una lista vacía no es un estado del mundo: no puede borrar la línea base
        if records.is_empty() {
            log::warn!("⚠️ Status API returned an empty list; keeping the previous snapshot.");
            self.publish_status(checked_at, false);
            return TickOutcome::Skipped;
        }

        let empty = Snapshot::new();
        let previous = self.state.snapshot().unwrap_or(&empty);
        let seeding = previous.is_empty();
        let (current, transitions) = diff(previous, records);
        let items = current.len();

        self.state = TrackerState::Tracking(current);
        MetricsCollector::set_tracked_items(items);
        self.publish_status(checked_at, true);

        if seeding {
            log::info!("Initial status check complete. Will notify on future changes.");
            return TickOutcome::Seeded { items };
        }

        MetricsCollector::add_transitions(transitions.len());
        let mut sent = 0;
        let mut failed = 0;
        for transition in &transitions {
            log::info!("🟢 {} went from unavailable to available", transition.name);
            match self.notifier.notify(transition).await {
                Ok(_) => sent += 1,
                Err(_) => failed += 1,
            }
        }

        TickOutcome::Checked {
            items,
            transitions: transitions.len(),
            sent,
            failed,
        }
    }

    /// Bucle perpetuo con cadencia fija; el primer ciclo es inmediato.
    pub async fn run(mut self) {
        log::info!(
            "⏱️ Scheduler started: one tick every {}s, notifying channel {}",
            self.interval.as_secs(),
            self.notifier.channel_id()
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    fn publish_status(&self, checked_at: chrono::DateTime<Utc>, success: bool) {
        let tracking = self.state.is_tracking();
        let tracked_items = self.state.snapshot().map(|s| s.len()).unwrap_or(0);
        self.status_tx.send_modify(|status| {
            status.ticks += 1;
            status.tracking = tracking;
            status.tracked_items = tracked_items;
            status.last_check_utc = Some(checked_at);
            if success {
                status.last_success_utc = Some(checked_at);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::test_support::RecordingPlatform;
    use crate::notify::{BotIdentity, NotifyError};
    use crate::state::StatusApiConfig;
    use crate::status::{build_snapshot, Record, StatusFetcher};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fuente con respuestas preparadas; `None` simula un fallo de consulta.
    #[derive(Default)]
    struct ScriptedSource {
        replies: Mutex<VecDeque<Option<Vec<Record>>>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(replies: Vec<Option<Vec<Record>>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl StatusSource for ScriptedSource {
        async fn fetch(&self) -> Option<Vec<Record>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies.lock().unwrap().pop_front().flatten()
        }
    }

    fn identity() -> BotIdentity {
        BotIdentity {
            id: "1".into(),
            username: "bot".into(),
            avatar_url: None,
        }
    }

    fn scheduler_with(
        source: Arc<dyn StatusSource>,
        platform: Arc<RecordingPlatform>,
    ) -> (Scheduler, watch::Receiver<TrackerStatus>) {
        let (tx, rx) = watch::channel(TrackerStatus::default());
        let notifier = Notifier::new(platform, 77, "https://watch".into(), &identity());
        (Scheduler::new(source, notifier, tx), rx)
    }

    fn snapshot_of(items: &[(&str, bool)]) -> Snapshot {
        build_snapshot(items.iter().map(|(n, a)| Record::new(*n, *a)).collect())
    }

    fn records(items: &[(&str, bool)]) -> Option<Vec<Record>> {
        Some(items.iter().map(|(n, a)| Record::new(*n, *a)).collect())
    }

    #[tokio::test]
    async fn scenario_a_seeding_fetch_does_not_notify() {
        let platform = Arc::new(RecordingPlatform::text_channel());
        let source = ScriptedSource::new(vec![records(&[("X", false)])]);
        let (mut scheduler, rx) = scheduler_with(source, platform.clone());

        assert_eq!(scheduler.tick().await, TickOutcome::Seeded { items: 1 });
        assert_eq!(scheduler.snapshot(), Some(&snapshot_of(&[("X", false)])));
        assert!(platform.sent_titles().is_empty());
        assert!(rx.borrow().tracking);
    }

    #[tokio::test]
    async fn seeding_with_everything_available_stays_silent() {
        let platform = Arc::new(RecordingPlatform::text_channel());
        let source = ScriptedSource::new(vec![records(&[("A", true), ("B", true)])]);
        let (mut scheduler, _rx) = scheduler_with(source, platform.clone());

        assert_eq!(scheduler.tick().await, TickOutcome::Seeded { items: 2 });
        assert!(platform.sent_titles().is_empty());
    }

    #[tokio::test]
    async fn scenario_b_edge_notifies_once() {
        let platform = Arc::new(RecordingPlatform::text_channel());
        let source = ScriptedSource::new(vec![
            records(&[("X", false)]),
            records(&[("X", true)]),
            records(&[("X", true)]),
        ]);
        let (mut scheduler, _rx) = scheduler_with(source, platform.clone());

        scheduler.tick().await;
        assert_eq!(
            scheduler.tick().await,
            TickOutcome::Checked {
                items: 1,
                transitions: 1,
                sent: 1,
                failed: 0
            }
        );
        assert_eq!(scheduler.snapshot(), Some(&snapshot_of(&[("X", true)])));

        // Scenario C: ya disponible, sin flanco
        assert_eq!(
            scheduler.tick().await,
            TickOutcome::Checked {
                items: 1,
                transitions: 0,
                sent: 0,
                failed: 0
            }
        );
        assert_eq!(platform.sent_titles(), vec!["✅ X is Back Online!".to_string()]);
    }

    #[tokio::test]
    async fn scenario_d_failed_fetch_keeps_snapshot() {
        let platform = Arc::new(RecordingPlatform::text_channel());
        let source = ScriptedSource::new(vec![records(&[("X", false)]), None, records(&[("X", true)])]);
        let (mut scheduler, rx) = scheduler_with(source, platform.clone());

        scheduler.tick().await;
        let before = scheduler.snapshot().cloned();

        assert_eq!(scheduler.tick().await, TickOutcome::Skipped);
        assert_eq!(scheduler.snapshot().cloned(), before);
        assert!(platform.sent_titles().is_empty());
        assert_eq!(rx.borrow().ticks, 2);

        // La transición se detecta en cuanto vuelve a haber datos
        let outcome = scheduler.tick().await;
        assert!(matches!(outcome, TickOutcome::Checked { transitions: 1, .. }));
    }

    #[tokio::test]
    async fn failed_fetch_before_seeding_stays_uninitialized() {
        let platform = Arc::new(RecordingPlatform::text_channel());
        let source = ScriptedSource::new(vec![None]);
        let (mut scheduler, rx) = scheduler_with(source, platform);

        assert_eq!(scheduler.tick().await, TickOutcome::Skipped);
        assert_eq!(scheduler.state(), &TrackerState::Uninitialized);
        assert!(!rx.borrow().tracking);
        assert!(rx.borrow().last_success_utc.is_none());
    }

    #[tokio::test]
    async fn scenario_d_real_fetch_failure_logs_once() {
        let hub = crate::logs::depends::logger::test_support::global_hub();

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = format!("http://{}/scenario-d", addr);

        let fetcher = StatusFetcher::new(&StatusApiConfig {
            url: url.clone(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        let platform = Arc::new(RecordingPlatform::text_channel());
        let (mut scheduler, _rx) = scheduler_with(Arc::new(fetcher), platform.clone());
        scheduler.state = TrackerState::Tracking(snapshot_of(&[("X", false)]));

        assert_eq!(scheduler.tick().await, TickOutcome::Skipped);
        assert_eq!(scheduler.snapshot(), Some(&snapshot_of(&[("X", false)])));
        assert!(platform.sent_titles().is_empty());

        let failures = hub
            .history()
            .iter()
            .filter(|line| line.contains("[API Fetch] FAILED") && line.contains(&url))
            .count();
        assert_eq!(failures, 1);
    }

    #[tokio::test]
    async fn empty_list_keeps_baseline_and_edge_still_fires() {
        let hub = crate::logs::depends::logger::test_support::global_hub();
        let platform = Arc::new(RecordingPlatform::text_channel());
        let source = ScriptedSource::new(vec![
            records(&[("X", false)]),
            records(&[]),
            records(&[("X", true)]),
        ]);
        let (mut scheduler, rx) = scheduler_with(source, platform.clone());

        assert_eq!(scheduler.tick().await, TickOutcome::Seeded { items: 1 });
        assert_eq!(scheduler.tick().await, TickOutcome::Skipped);
        assert_eq!(scheduler.snapshot(), Some(&snapshot_of(&[("X", false)])));
        assert_eq!(rx.borrow().tracked_items, 1);
        assert!(hub
            .history()
            .iter()
            .any(|line| line.ends_with("Status API returned an empty list; keeping the previous snapshot.")));

        assert_eq!(
            scheduler.tick().await,
            TickOutcome::Checked {
                items: 1,
                transitions: 1,
                sent: 1,
                failed: 0
            }
        );
        assert_eq!(platform.sent_titles(), vec!["✅ X is Back Online!".to_string()]);
    }

    #[tokio::test]
    async fn empty_list_before_seeding_stays_uninitialized() {
        let platform = Arc::new(RecordingPlatform::text_channel());
        let source = ScriptedSource::new(vec![records(&[]), records(&[("X", true)])]);
        let (mut scheduler, _rx) = scheduler_with(source, platform.clone());

        assert_eq!(scheduler.tick().await, TickOutcome::Skipped);
        assert_eq!(scheduler.state(), &TrackerState::Uninitialized);
        assert_eq!(scheduler.tick().await, TickOutcome::Seeded { items: 1 });
        assert!(platform.sent_titles().is_empty());
    }

    #[tokio::test]
    async fn scenario_e_vanished_item_dropped() {
        let platform = Arc::new(RecordingPlatform::text_channel());
        let source = ScriptedSource::new(vec![
            records(&[("X", false), ("Y", false)]),
            records(&[("Y", true)]),
        ]);
        let (mut scheduler, rx) = scheduler_with(source, platform.clone());

        scheduler.tick().await;
        let outcome = scheduler.tick().await;

        assert!(matches!(outcome, TickOutcome::Checked { transitions: 1, sent: 1, .. }));
        assert_eq!(scheduler.snapshot(), Some(&snapshot_of(&[("Y", true)])));
        assert_eq!(platform.sent_titles(), vec!["✅ Y is Back Online!".to_string()]);
        assert_eq!(rx.borrow().tracked_items, 1);
    }

    #[tokio::test]
    async fn dispatch_failure_does_not_stop_other_transitions() {
        let mut platform = RecordingPlatform::text_channel();
        platform.fail_for.insert("Alpha".into(), NotifyError::Forbidden(77));
        let platform = Arc::new(platform);
        let source = ScriptedSource::new(vec![
            records(&[("Alpha", false), ("Beta", false)]),
            records(&[("Alpha", true), ("Beta", true)]),
        ]);
        let (mut scheduler, _rx) = scheduler_with(source, platform.clone());

        scheduler.tick().await;
        assert_eq!(
            scheduler.tick().await,
            TickOutcome::Checked {
                items: 2,
                transitions: 2,
                sent: 1,
                failed: 1
            }
        );
        assert_eq!(platform.sent_titles(), vec!["✅ Beta is Back Online!".to_string()]);
        // El snapshot avanza aunque falle el envío
        assert_eq!(scheduler.snapshot().map(|s| s["Alpha"].available), Some(Some(true)));
    }

    #[tokio::test]
    async fn missing_channel_is_isolated_per_tick() {
        let platform = Arc::new(RecordingPlatform::default());
        let source = ScriptedSource::new(vec![
            records(&[("X", false)]),
            records(&[("X", true)]),
            records(&[("X", false)]),
        ]);
        let (mut scheduler, _rx) = scheduler_with(source, platform);

        scheduler.tick().await;
        assert!(matches!(scheduler.tick().await, TickOutcome::Checked { failed: 1, .. }));
        assert!(matches!(scheduler.tick().await, TickOutcome::Checked { failed: 0, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn run_ticks_on_fixed_cadence() {
        let platform = Arc::new(RecordingPlatform::text_channel());
        let source = ScriptedSource::new(vec![]);
        let (scheduler, rx) = scheduler_with(source.clone(), platform);

        let handle = tokio::spawn(scheduler.run());
        tokio::time::sleep(Duration::from_secs(250)).await;
        handle.abort();

        // t = 0, 120 y 240
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(rx.borrow().ticks, 3);
    }
}
