//! Navigation controller - owner of the current route.
//!
//! The controller is the single source of truth for which page is active.
//! Programmatic navigation goes through [`navigate`](NavigationController::navigate)
//! and the id-specific `open_*` entry points; browser back/forward arrives
//! through the history subscription and is applied by
//! [`sync`](NavigationController::sync), polled once per frame.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use hub_types::EventId;

use crate::history::{History, Subscription};
use crate::route::{decode, encode, Page, Route};

pub struct NavigationController<H: History> {
    history: H,
    route: Route,
    /// Paths delivered by the history listener, not yet applied.
    inbox: Rc<RefCell<VecDeque<String>>>,
    /// Held for the controller's lifetime; dropping it removes the listener.
    _subscription: Subscription,
}

impl<H: History> NavigationController<H> {
    /// Initialise from the history's current path and subscribe to
    /// back/forward transitions.
    pub fn new(history: H) -> Self {
        let route = decode(&history.current_path());
        let inbox = Rc::new(RefCell::new(VecDeque::new()));

        let sink = inbox.clone();
        let subscription = history.on_change(Box::new(move |path: &str| {
            sink.borrow_mut().push_back(path.to_string());
        }));

        tracing::debug!("navigation: initial route {}", route);
        Self {
            history,
            route,
            inbox,
            _subscription: subscription,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Navigate to an id-less page.
    ///
    /// State is set from decoding the pushed path, not from `page`, so the
    /// route can never disagree with the codec. Returns whether the route
    /// changed.
    pub fn navigate(&mut self, page: Page) -> bool {
        let path = page.path();
        self.push_path(path);
        self.set_route(decode(path))
    }

    /// Navigate to `/events/{id}`.
    pub fn open_event(&mut self, event_id: EventId) -> bool {
        self.open_with_id(Route::EventDetail { event_id })
    }

    /// Navigate to `/events/{id}/edit`.
    pub fn open_edit_event(&mut self, event_id: EventId) -> bool {
        self.open_with_id(Route::EditEvent { event_id })
    }

    /// Apply back/forward transitions received since the last call.
    ///
    /// Only the newest pending path matters; each is decoded afresh. Returns
    /// whether the route changed.
    pub fn sync(&mut self) -> bool {
        let latest = self.inbox.borrow_mut().drain(..).last();
        match latest {
            Some(path) => {
                tracing::debug!("navigation: history moved to {}", path);
                self.set_route(decode(&path))
            }
            None => false,
        }
    }

    /// True when a browser transition is waiting for [`sync`](Self::sync).
    pub fn has_pending(&self) -> bool {
        !self.inbox.borrow().is_empty()
    }

    fn open_with_id(&mut self, route: Route) -> bool {
        let path = encode(&route);
        self.push_path(&path);
        self.set_route(route)
    }

    fn push_path(&self, path: &str) {
        if self.history.current_path() != path {
            self.history.push(path);
        }
    }

    fn set_route(&mut self, route: Route) -> bool {
        if self.route == route {
            return false;
        }
        tracing::debug!("navigation: {} -> {}", self.route, route);
        self.route = route;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryHistory;

    #[test]
    fn initial_route_comes_from_current_path() {
        let nav = NavigationController::new(MemoryHistory::new("/events/12/edit"));
        assert_eq!(nav.route(), Route::EditEvent { event_id: 12 });
    }

    #[test]
    fn navigate_pushes_canonical_path() {
        let history = MemoryHistory::new("/");
        let mut nav = NavigationController::new(history.clone());

        assert!(nav.navigate(Page::EventList));
        assert_eq!(nav.route(), Route::EventList);
        assert_eq!(history.current_path(), "/events");
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn navigating_to_current_page_adds_no_entry() {
        let history = MemoryHistory::new("/auth");
        let mut nav = NavigationController::new(history.clone());

        assert!(!nav.navigate(Page::Auth));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn id_entry_points_set_precise_variant() {
        let history = MemoryHistory::new("/events");
        let mut nav = NavigationController::new(history.clone());

        nav.open_event(5);
        assert_eq!(nav.route(), Route::EventDetail { event_id: 5 });
        assert_eq!(history.current_path(), "/events/5");

        nav.open_edit_event(5);
        assert_eq!(nav.route(), Route::EditEvent { event_id: 5 });
        assert_eq!(history.current_path(), "/events/5/edit");
    }

    #[test]
    fn back_and_forward_apply_on_sync() {
        let history = MemoryHistory::new("/");
        let mut nav = NavigationController::new(history.clone());
        nav.navigate(Page::EventList);
        nav.open_event(3);

        history.back();
        assert!(nav.has_pending());
        // Not applied until polled.
        assert_eq!(nav.route(), Route::EventDetail { event_id: 3 });

        assert!(nav.sync());
        assert_eq!(nav.route(), Route::EventList);
        assert_eq!(encode(&nav.route()), history.current_path());

        history.forward();
        assert!(nav.sync());
        assert_eq!(nav.route(), Route::EventDetail { event_id: 3 });
        assert!(!nav.sync());
    }

    #[test]
    fn several_transitions_settle_on_the_last() {
        let history = MemoryHistory::new("/");
        let mut nav = NavigationController::new(history.clone());
        nav.navigate(Page::EventList);
        nav.navigate(Page::Auth);

        history.back();
        history.back();
        assert!(nav.sync());
        assert!(!nav.has_pending());
        assert_eq!(nav.route(), Route::Map);
        assert_eq!(history.current_path(), "/");
    }

    #[test]
    fn dropping_controller_removes_listener() {
        let history = MemoryHistory::new("/");
        let nav = NavigationController::new(history.clone());
        assert_eq!(history.listener_count(), 1);
        drop(nav);
        assert_eq!(history.listener_count(), 0);
    }
}
