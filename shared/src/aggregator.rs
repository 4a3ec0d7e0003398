//! Periodic dashboard refresh bookkeeping.
//!
//! The aggregator owns no timer; the view schedules ticks and stops them on
//! teardown. Each tick carries a generation so a fetch that resolves after
//! deactivation, or after a newer fetch was started, is discarded.

use std::rc::Rc;
use std::time::Duration;

use crate::error::ClientError;
use crate::model::DashboardSnapshot;
use crate::session::Session;
use crate::transport::DocumentService;

pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Permission to run one dashboard fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

#[derive(Debug, Default)]
pub struct DashboardAggregator {
    snapshot: Option<Rc<DashboardSnapshot>>,
    last_error: Option<ClientError>,
    generation: u64,
    in_flight: Option<u64>,
    active: bool,
    consecutive_failures: u32,
}

impl DashboardAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a refresh cycle and returns the immediate first tick.
    pub fn activate(&mut self) -> Option<Tick> {
        if self.active {
            return None;
        }
        self.active = true;
        self.generation += 1;
        self.in_flight = None;
        self.begin_tick()
    }

    /// Stops the cycle. Any fetch still outstanding will be ignored.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.generation += 1;
        self.in_flight = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Returns `None` when inactive or while the previous fetch is still
    /// outstanding; overlapping fetches are skipped, not queued.
    pub fn begin_tick(&mut self) -> Option<Tick> {
        if !self.active {
            return None;
        }
        if self.in_flight.is_some() {
            log::debug!("Dashboard fetch still in flight; skipping tick");
            return None;
        }
        self.in_flight = Some(self.generation);
        Some(Tick {
            generation: self.generation,
        })
    }

    /// Applies a fetch outcome. Returns `true` if anything visible changed.
    ///
    /// A success replaces the snapshot wholesale. A failure keeps the last
    /// snapshot on screen and records the error.
    pub fn finish_tick(&mut self, tick: Tick, outcome: Result<DashboardSnapshot, ClientError>) -> bool {
        if !self.active || self.in_flight != Some(tick.generation) {
            log::debug!("Discarding stale dashboard result (generation {})", tick.generation);
            return false;
        }
        self.in_flight = None;

        match outcome {
            Ok(snapshot) => {
                self.snapshot = Some(Rc::new(snapshot));
                self.last_error = None;
                self.consecutive_failures = 0;
            }
            Err(err) => {
                self.consecutive_failures += 1;
                log::warn!(
                    "Dashboard refresh failed ({} in a row): {}",
                    self.consecutive_failures,
                    err
                );
                self.last_error = Some(err);
            }
        }
        true
    }

    pub fn snapshot(&self) -> Option<Rc<DashboardSnapshot>> {
        self.snapshot.clone()
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Runs one tick end to end against `service`.
    pub async fn tick<S: DocumentService>(&mut self, service: &S, session: &Session) -> bool {
        let Some(tick) = self.begin_tick() else {
            return false;
        };
        let outcome = service.fetch_dashboard(session).await;
        self.finish_tick(tick, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::FakeService;
    use futures::executor::block_on;

    fn snapshot(total: u64) -> DashboardSnapshot {
        DashboardSnapshot {
            total_documents: total,
            ..Default::default()
        }
    }

    #[test]
    fn inactive_aggregator_never_fetches() {
        let service = FakeService::default();
        let mut aggregator = DashboardAggregator::new();
        assert!(!block_on(aggregator.tick(&service, &Session::new("t").unwrap())));
        assert_eq!(service.calls_named("fetch_dashboard"), 0);
    }

    #[test]
    fn success_replaces_snapshot_wholesale() {
        let mut aggregator = DashboardAggregator::new();
        let first = aggregator.activate().unwrap();
        let mut initial = snapshot(3);
        initial.top_vendors_by_value.insert("Acme".into(), 10.0);
        assert!(aggregator.finish_tick(first, Ok(initial)));

        let second = aggregator.begin_tick().unwrap();
        assert!(aggregator.finish_tick(second, Ok(snapshot(4))));
        let current = aggregator.snapshot().unwrap();
        assert_eq!(current.total_documents, 4);
        assert!(current.top_vendors_by_value.is_empty());
    }

    #[test]
    fn failure_keeps_the_last_snapshot() {
        let service = FakeService::default();
        service
            .dashboards
            .borrow_mut()
            .push_back(Err(ClientError::Transport("offline".into())));
        let session = Session::new("t").unwrap();

        let mut aggregator = DashboardAggregator::new();
        let first = aggregator.activate().unwrap();
        aggregator.finish_tick(first, Ok(snapshot(7)));

        assert!(block_on(aggregator.tick(&service, &session)));
        assert_eq!(aggregator.snapshot().unwrap().total_documents, 7);
        assert_eq!(aggregator.consecutive_failures(), 1);
        assert!(aggregator.last_error().is_some());
        assert!(!aggregator.is_fetching());
    }

    #[test]
    fn overlapping_ticks_are_skipped() {
        let mut aggregator = DashboardAggregator::new();
        let tick = aggregator.activate().unwrap();
        assert!(aggregator.is_fetching());
        assert_eq!(aggregator.begin_tick(), None);
        aggregator.finish_tick(tick, Ok(snapshot(1)));
        assert!(aggregator.begin_tick().is_some());
    }

    #[test]
    fn results_after_deactivation_are_discarded() {
        let mut aggregator = DashboardAggregator::new();
        let tick = aggregator.activate().unwrap();
        aggregator.deactivate();
        assert!(!aggregator.finish_tick(tick, Ok(snapshot(9))));
        assert!(aggregator.snapshot().is_none());
        assert_eq!(aggregator.begin_tick(), None);
    }

    #[test]
    fn results_from_a_previous_activation_are_discarded() {
        let mut aggregator = DashboardAggregator::new();
        let old = aggregator.activate().unwrap();
        aggregator.deactivate();
        let fresh = aggregator.activate().unwrap();

        assert!(!aggregator.finish_tick(old, Ok(snapshot(1))));
        assert!(aggregator.is_fetching());
        assert!(aggregator.finish_tick(fresh, Ok(snapshot(2))));
        assert_eq!(aggregator.snapshot().unwrap().total_documents, 2);
    }

    #[test]
    fn empty_dashboard_is_a_valid_snapshot() {
        let service = FakeService::default();
        service
            .dashboards
            .borrow_mut()
            .push_back(crate::transport::decode_dashboard(200, "{}"));
        let mut aggregator = DashboardAggregator::new();
        let first = aggregator.activate().unwrap();
        let outcome = block_on(service.fetch_dashboard(&Session::new("t").unwrap()));
        assert!(aggregator.finish_tick(first, outcome));
        assert_eq!(*aggregator.snapshot().unwrap(), DashboardSnapshot::default());
    }
}
