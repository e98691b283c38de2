//! Detail overlay - which single event the modal shows.
//!
//! Two sources can select an event: the route (`/events/{id}`) and a local
//! selection made on the map without touching the URL. The route wins.

use hub_types::{EventId, EventSummary};

use crate::directory::EntityDirectory;
use crate::history::History;
use crate::navigation::NavigationController;
use crate::route::{Page, Route};

/// Something that can express the overlay in the URL.
pub trait DetailRouter {
    fn open_detail(&mut self, event_id: EventId);
    fn close_detail(&mut self);
}

impl<H: History> DetailRouter for NavigationController<H> {
    fn open_detail(&mut self, event_id: EventId) {
        self.open_event(event_id);
    }

    fn close_detail(&mut self) {
        self.navigate(Page::EventList);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DetailOverlay {
    local: Option<EventId>,
}

impl DetailOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event the overlay should show, before checking it exists.
    pub fn active_id(&self, route: &Route) -> Option<EventId> {
        match route {
            Route::EventDetail { event_id } => Some(*event_id),
            _ => self.local,
        }
    }

    /// Open the overlay. With a router the selection goes into the URL,
    /// otherwise it stays local.
    pub fn open(&mut self, event_id: EventId, router: Option<&mut dyn DetailRouter>) {
        match router {
            Some(router) => router.open_detail(event_id),
            None => self.local = Some(event_id),
        }
    }

    /// Close the overlay.
    ///
    /// The local selection is always cleared so it cannot resurface once the
    /// route moves off the detail page.
    pub fn close(&mut self, router: Option<&mut dyn DetailRouter>) {
        self.local = None;
        if let Some(router) = router {
            router.close_detail();
        }
    }

    /// The event to render, if any. Unknown ids render nothing.
    pub fn resolve<'d>(
        &self,
        route: &Route,
        directory: &'d EntityDirectory,
    ) -> Option<&'d EventSummary> {
        let event_id = self.active_id(route)?;
        let event = directory.get(event_id);
        if event.is_none() {
            tracing::debug!("overlay: event {} not in directory", event_id);
        }
        event
    }

    pub fn local_selection(&self) -> Option<EventId> {
        self.local
    }
}
