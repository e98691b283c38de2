//! Entity directory - the shared, most recently fetched event list.
//!
//! The directory does not perform I/O. A load is split into
//! [`begin_load`](EntityDirectory::begin_load), which hands out a ticket, and
//! [`complete`](EntityDirectory::complete), which applies the result only if
//! the ticket is still the newest. A late answer to a superseded load is
//! discarded, so an earlier request can never overwrite a later one even if
//! aborting it failed.

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::sync::Arc;

use hub_types::{parse_event_date, EventId, EventSummary, LatLng};

use crate::error::FetchError;

/// Proof of an issued load. Only the newest ticket can land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What [`EntityDirectory::complete`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// List replaced.
    Applied,
    /// Error recorded.
    Failed,
    /// Superseded or cancelled; result dropped.
    Stale,
}

/// Consumer-facing load status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug)]
pub struct EntityDirectory {
    events: Arc<[EventSummary]>,
    /// Last generation handed out.
    generation: u64,
    /// Generation whose result is awaited, if any.
    in_flight: Option<u64>,
    loaded: bool,
    error: Option<String>,
    /// Sorted view of `events`, built on first use after each replacement.
    sorted: OnceCell<Arc<[EventSummary]>>,
}

impl Default for EntityDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityDirectory {
    pub fn new() -> Self {
        Self {
            events: Arc::from(Vec::new()),
            generation: 0,
            in_flight: None,
            loaded: false,
            error: None,
            sorted: OnceCell::new(),
        }
    }

    /// Start a load. Any load still in flight becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        if let Some(previous) = self.in_flight.replace(self.generation) {
            tracing::debug!("directory: load {} superseded by {}", previous, self.generation);
        }
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply the result of a load.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<EventSummary>, FetchError>,
    ) -> LoadOutcome {
        if self.in_flight != Some(ticket.generation) {
            tracing::debug!(
                "directory: dropping stale result of load {} (current {:?})",
                ticket.generation,
                self.in_flight
            );
            return LoadOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(events) => {
                tracing::debug!("directory: loaded {} events", events.len());
                self.events = events.into();
                self.sorted = OnceCell::new();
                self.loaded = true;
                self.error = None;
                LoadOutcome::Applied
            }
            Err(FetchError::Aborted) => LoadOutcome::Stale,
            Err(e) => {
                tracing::warn!("directory: load failed: {}", e);
                self.error = Some(e.to_string());
                LoadOutcome::Failed
            }
        }
    }

    /// Invalidate the in-flight load, if any. Its result will be dropped.
    pub fn cancel(&mut self) {
        if let Some(generation) = self.in_flight.take() {
            tracing::debug!("directory: load {} cancelled", generation);
        }
    }

    pub fn status(&self) -> LoadStatus {
        if self.in_flight.is_some() {
            LoadStatus::Loading
        } else if let Some(error) = &self.error {
            LoadStatus::Failed(error.clone())
        } else if self.loaded {
            LoadStatus::Loaded
        } else {
            LoadStatus::Idle
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Error of the last settled load.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Events in API order.
    pub fn events(&self) -> &Arc<[EventSummary]> {
        &self.events
    }

    /// Events by date ascending, undated last, ties broken by name.
    ///
    /// Memoised: the same `Arc` is returned until the list is replaced.
    pub fn sorted(&self) -> Arc<[EventSummary]> {
        self.sorted
            .get_or_init(|| {
                let mut sorted = self.events.to_vec();
                sorted.sort_by(compare_for_sidebar);
                sorted.into()
            })
            .clone()
    }

    pub fn get(&self, id: EventId) -> Option<&EventSummary> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn coordinates(&self, id: EventId) -> Option<LatLng> {
        self.get(id).and_then(EventSummary::coordinates)
    }

    /// Events whose creator matches `email`, case-insensitively.
    pub fn created_by(&self, email: &str) -> Vec<EventSummary> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Vec::new();
        }
        self.events
            .iter()
            .filter(|e| {
                e.creator_email
                    .as_deref()
                    .is_some_and(|c| c.trim().to_lowercase() == email)
            })
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

fn compare_for_sidebar(a: &EventSummary, b: &EventSummary) -> Ordering {
    date_then_name(
        (a.date.as_deref(), &a.name),
        (b.date.as_deref(), &b.name),
    )
}

/// Sidebar order over `(date, name)` pairs: dated entries first, ascending,
/// then name case-insensitively. Unparseable dates count as undated.
pub fn date_then_name(a: (Option<&str>, &str), b: (Option<&str>, &str)) -> Ordering {
    let date_a = a.0.and_then(parse_event_date);
    let date_b = b.0.and_then(parse_event_date);

    let by_date = match (date_a, date_b) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date
        .then_with(|| a.1.to_lowercase().cmp(&b.1.to_lowercase()))
        .then_with(|| a.1.cmp(b.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha_beta() -> Vec<EventSummary> {
        vec![
            EventSummary::new(1, "Alpha"),
            EventSummary::new(2, "Beta").with_date("2024-05-01"),
        ]
    }

    #[test]
    fn sorted_puts_dated_first() {
        let mut dir = EntityDirectory::new();
        let ticket = dir.begin_load();
        dir.complete(ticket, Ok(alpha_beta()));

        let names: Vec<_> = dir.sorted().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names, vec!["Beta", "Alpha"]);
    }

    #[test]
    fn sorted_orders_by_date_then_name() {
        let mut dir = EntityDirectory::new();
        let ticket = dir.begin_load();
        dir.complete(
            ticket,
            Ok(vec![
                EventSummary::new(1, "zulu").with_date("2024-06-01"),
                EventSummary::new(2, "Echo"),
                EventSummary::new(3, "bravo").with_date("2024-06-01"),
                EventSummary::new(4, "Alpha").with_date("2024-01-15T10:00:00Z"),
                EventSummary::new(5, "Charlie"),
            ]),
        );

        let ids: Vec<_> = dir.sorted().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 3, 1, 5, 2]);
    }

    #[test]
    fn sorted_is_memoised_until_replaced() {
        let mut dir = EntityDirectory::new();
        let t = dir.begin_load();
        dir.complete(t, Ok(alpha_beta()));

        let first = dir.sorted();
        assert!(Arc::ptr_eq(&first, &dir.sorted()));

        let t = dir.begin_load();
        dir.complete(t, Ok(alpha_beta()));
        assert!(!Arc::ptr_eq(&first, &dir.sorted()));
    }

    #[test]
    fn later_load_wins_over_late_earlier_result() {
        let mut dir = EntityDirectory::new();
        let first = dir.begin_load();
        let second = dir.begin_load();

        assert_eq!(
            dir.complete(second, Ok(vec![EventSummary::new(2, "Second")])),
            LoadOutcome::Applied
        );
        assert_eq!(
            dir.complete(first, Ok(vec![EventSummary::new(1, "First")])),
            LoadOutcome::Stale
        );

        assert_eq!(dir.len(), 1);
        assert_eq!(dir.events()[0].name, "Second");
        assert_eq!(dir.status(), LoadStatus::Loaded);
    }

    #[test]
    fn earlier_result_arriving_first_is_still_dropped() {
        let mut dir = EntityDirectory::new();
        let first = dir.begin_load();
        let second = dir.begin_load();

        assert_eq!(
            dir.complete(first, Err(FetchError::status(500, None))),
            LoadOutcome::Stale
        );
        assert!(dir.is_loading());
        assert_eq!(dir.error(), None);

        dir.complete(second, Ok(alpha_beta()));
        assert_eq!(dir.len(), 2);
    }

    #[test]
    fn failure_keeps_previous_list() {
        let mut dir = EntityDirectory::new();
        let t = dir.begin_load();
        dir.complete(t, Ok(alpha_beta()));

        let t = dir.begin_load();
        assert_eq!(dir.status(), LoadStatus::Loading);
        assert_eq!(
            dir.complete(t, Err(FetchError::Transport("offline".into()))),
            LoadOutcome::Failed
        );

        assert_eq!(dir.len(), 2);
        assert_eq!(
            dir.status(),
            LoadStatus::Failed("Network error: offline".to_string())
        );

        let t = dir.begin_load();
        dir.complete(t, Ok(vec![]));
        assert_eq!(dir.error(), None);
        assert!(dir.is_empty());
    }

    #[test]
    fn cancelled_load_cannot_land() {
        let mut dir = EntityDirectory::new();
        let t = dir.begin_load();
        dir.cancel();
        assert_eq!(dir.status(), LoadStatus::Idle);
        assert_eq!(dir.complete(t, Ok(alpha_beta())), LoadOutcome::Stale);
        assert!(dir.is_empty());
    }

    #[test]
    fn lookups() {
        let mut dir = EntityDirectory::new();
        let t = dir.begin_load();
        dir.complete(
            t,
            Ok(vec![
                EventSummary::new(1, "Alpha")
                    .with_position(45.8, 15.9)
                    .with_creator("Ana@Example.hr"),
                EventSummary::new(2, "Beta"),
            ]),
        );

        assert_eq!(dir.get(2).map(|e| e.name.as_str()), Some("Beta"));
        assert_eq!(dir.coordinates(1), Some(LatLng::new(45.8, 15.9)));
        assert_eq!(dir.coordinates(2), None);
        assert_eq!(dir.coordinates(9), None);
        assert_eq!(dir.created_by("ana@example.hr").len(), 1);
        assert!(dir.created_by("  ").is_empty());
    }
}
