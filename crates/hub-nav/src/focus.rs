//! Focus coordinator - drive the map to an event and open its callout.
//!
//! A focus request is keyed by a token, not by the event id: asking for the
//! same event twice in a row (clicking the same sidebar entry again) must
//! replay the whole sequence. The coordinator runs when the token changes and
//! ignores a token it has already handled.
//!
//! Sequence per request:
//! 1. supersede any pending callout step
//! 2. guard the id
//! 3. clear the category filter so the target is visible
//! 4. resolve coordinates (unknown id -> stop)
//! 5. fly the viewport there at a bounded zoom
//! 6. after the settle delay ([`tick`](FocusCoordinator::tick)) open the
//!    callout if the marker is mounted, and nudge the view down

use bitflags::bitflags;
use hub_types::{Category, EventId, LatLng};

use crate::config::FocusConfig;
use crate::directory::EntityDirectory;
use crate::markers::{MarkerHandle, MarkerRegistry};

bitflags! {
    /// What a focus request did. Empty for a no-op.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FocusEffects: u8 {
        const NONE = 0;
        /// A pending callout step from an earlier request was cancelled.
        const SUPERSEDED = 1 << 0;
        /// The active category filter was cleared.
        const FILTER_CLEARED = 1 << 1;
        /// The viewport was sent to the target.
        const VIEWPORT_MOVED = 1 << 2;
        /// The callout step is waiting for the settle delay.
        const CALLOUT_SCHEDULED = 1 << 3;
    }
}

impl Default for FocusEffects {
    fn default() -> Self {
        FocusEffects::NONE
    }
}

/// The map viewport as seen by the coordinator.
pub trait MapViewport {
    /// Current zoom level.
    fn zoom(&self) -> f64;

    /// Viewport height in screen pixels.
    fn height(&self) -> f64;

    /// Animate the view to centre on `target` at `zoom`.
    fn fly_to(&mut self, target: LatLng, zoom: f64);

    /// Shift the view by screen pixels (positive `dy` moves the view down,
    /// so content moves up).
    fn pan_by_pixels(&mut self, dx: f64, dy: f64);
}

/// One request to focus an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRequest {
    /// Raw id from the interaction source; negative ids are ignored.
    pub event_id: i64,
    pub token: u64,
}

/// Issues strictly increasing tokens.
#[derive(Debug, Default)]
pub struct FocusTokens {
    last: u64,
}

impl FocusTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, event_id: i64) -> FocusRequest {
        self.last += 1;
        FocusRequest {
            event_id,
            token: self.last,
        }
    }

    /// Convenience for ids already known to be valid.
    pub fn issue_for(&mut self, event_id: EventId) -> FocusRequest {
        self.issue(i64::try_from(event_id).unwrap_or(-1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingCallout {
    event_id: EventId,
    token: u64,
    due_at: f64,
}

#[derive(Debug)]
pub struct FocusCoordinator {
    config: FocusConfig,
    last_token: Option<u64>,
    pending: Option<PendingCallout>,
}

impl FocusCoordinator {
    pub fn new(config: FocusConfig) -> Self {
        Self {
            config,
            last_token: None,
            pending: None,
        }
    }

    /// Handle a focus request at time `now` (seconds).
    pub fn request(
        &mut self,
        request: FocusRequest,
        now: f64,
        filter: &mut Option<Category>,
        directory: &EntityDirectory,
        viewport: &mut dyn MapViewport,
    ) -> FocusEffects {
        if self.last_token == Some(request.token) {
            return FocusEffects::NONE;
        }
        self.last_token = Some(request.token);

        let mut effects = FocusEffects::NONE;
        if let Some(previous) = self.pending.take() {
            tracing::debug!(
                "focus: token {} supersedes pending callout for event {} (token {})",
                request.token,
                previous.event_id,
                previous.token
            );
            effects |= FocusEffects::SUPERSEDED;
        }

        let Ok(event_id) = EventId::try_from(request.event_id) else {
            tracing::debug!("focus: ignoring invalid event id {}", request.event_id);
            return effects;
        };

        if filter.take().is_some() {
            effects |= FocusEffects::FILTER_CLEARED;
        }

        let Some(target) = directory.coordinates(event_id) else {
            tracing::debug!("focus: event {} has no known position", event_id);
            return effects;
        };

        let zoom = self.config.bounded_zoom(viewport.zoom());
        viewport.fly_to(target, zoom);
        effects |= FocusEffects::VIEWPORT_MOVED;

        self.pending = Some(PendingCallout {
            event_id,
            token: request.token,
            due_at: now + self.config.settle_delay_secs,
        });
        effects | FocusEffects::CALLOUT_SCHEDULED
    }

    /// Run the delayed callout step if it is due. Returns the event whose
    /// callout was opened.
    ///
    /// A marker that is not mounted (yet) is skipped silently.
    pub fn tick<M: MarkerHandle>(
        &mut self,
        now: f64,
        registry: &MarkerRegistry<M>,
        viewport: &mut dyn MapViewport,
    ) -> Option<EventId> {
        let pending = self.pending?;
        if now < pending.due_at {
            return None;
        }
        self.pending = None;

        let Some(marker) = registry.lookup(pending.event_id) else {
            tracing::debug!("focus: no marker mounted for event {}", pending.event_id);
            return None;
        };
        marker.open_callout();
        let nudge = viewport.height() * self.config.callout_nudge_fraction;
        viewport.pan_by_pixels(0.0, -nudge);
        Some(pending.event_id)
    }

    /// Drop any pending callout step.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            tracing::debug!("focus: cancelled callout for event {}", pending.event_id);
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time the pending step becomes due, for repaint scheduling.
    pub fn pending_due_at(&self) -> Option<f64> {
        self.pending.map(|p| p.due_at)
    }

    pub fn last_token(&self) -> Option<u64> {
        self.last_token
    }

    pub fn config(&self) -> &FocusConfig {
        &self.config
    }
}
