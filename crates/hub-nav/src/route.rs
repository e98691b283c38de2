//! Route codec - URL path <-> typed route.
//!
//! Pure functions, no side effects. Every [`Route`] has exactly one canonical
//! path and `decode(encode(route)) == route` holds for all of them.

use hub_types::EventId;
use serde::{Deserialize, Serialize};
use std::fmt;

const EVENTS: &str = "/events";
const CREATE: &str = "/events/create";
const AUTH: &str = "/auth";

/// The decoded location of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Route {
    #[default]
    Map,
    EventList,
    EventDetail {
        event_id: EventId,
    },
    CreateEvent,
    EditEvent {
        event_id: EventId,
    },
    Auth,
}

/// Id-less navigation targets, the only thing the generic
/// [`NavigationController::navigate`](crate::NavigationController::navigate)
/// accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Page {
    Map,
    EventList,
    CreateEvent,
    Auth,
}

impl Page {
    /// Canonical path for this page.
    pub fn path(&self) -> &'static str {
        match self {
            Page::Map => "/",
            Page::EventList => EVENTS,
            Page::CreateEvent => CREATE,
            Page::Auth => AUTH,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Page::Map => "Map",
            Page::EventList => "Events",
            Page::CreateEvent => "Create Event",
            Page::Auth => "Account",
        }
    }

    /// Pages shown as navigation buttons.
    pub fn all() -> &'static [Page] {
        &[Page::Map, Page::EventList, Page::CreateEvent, Page::Auth]
    }
}

impl Route {
    /// The page this route renders on. Detail and edit routes belong to the
    /// event list.
    pub fn page(&self) -> Page {
        match self {
            Route::Map => Page::Map,
            Route::EventList | Route::EventDetail { .. } | Route::EditEvent { .. } => {
                Page::EventList
            }
            Route::CreateEvent => Page::CreateEvent,
            Route::Auth => Page::Auth,
        }
    }

    /// Event carried by the route, if any.
    pub fn event_id(&self) -> Option<EventId> {
        match self {
            Route::EventDetail { event_id } | Route::EditEvent { event_id } => Some(*event_id),
            _ => None,
        }
    }

    /// Routes that require a signed-in session.
    pub fn requires_auth(&self) -> bool {
        matches!(self, Route::CreateEvent | Route::EditEvent { .. })
    }
}

impl From<Page> for Route {
    fn from(page: Page) -> Self {
        match page {
            Page::Map => Route::Map,
            Page::EventList => Route::EventList,
            Page::CreateEvent => Route::CreateEvent,
            Page::Auth => Route::Auth,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

/// Decode a URL path. Never fails: unrecognised paths resolve to the map.
///
/// Rules, first match wins:
/// 1. `/events/{id}/edit`
/// 2. `/auth...`
/// 3. `/events/create...`
/// 4. `/events/{id}` (optional trailing slash)
/// 5. `/events...`
/// 6. anything else
pub fn decode(path: &str) -> Route {
    let path = strip_query(path);

    if let Some(event_id) = match_event_path(path, Some("edit")) {
        return Route::EditEvent { event_id };
    }
    if path.starts_with(AUTH) {
        return Route::Auth;
    }
    if path.starts_with(CREATE) {
        return Route::CreateEvent;
    }
    if let Some(event_id) = match_event_path(path, None) {
        return Route::EventDetail { event_id };
    }
    if path.starts_with(EVENTS) {
        return Route::EventList;
    }
    Route::Map
}

/// Canonical path of a route.
pub fn encode(route: &Route) -> String {
    match route {
        Route::Map => "/".to_string(),
        Route::EventList => EVENTS.to_string(),
        Route::EventDetail { event_id } => format!("{EVENTS}/{event_id}"),
        Route::CreateEvent => CREATE.to_string(),
        Route::EditEvent { event_id } => format!("{EVENTS}/{event_id}/edit"),
        Route::Auth => AUTH.to_string(),
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or_default()
}

/// Match `/events/{id}` or `/events/{id}/{suffix}`, each with an optional
/// trailing slash.
fn match_event_path(path: &str, suffix: Option<&str>) -> Option<EventId> {
    let rest = path.strip_prefix(EVENTS)?.strip_prefix('/')?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);

    let id_segment = match suffix {
        Some(suffix) => {
            let (id, tail) = rest.split_once('/')?;
            if tail != suffix {
                return None;
            }
            id
        }
        None => rest,
    };
    parse_id(id_segment)
}

fn parse_id(segment: &str) -> Option<EventId> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CANONICAL: &[&str] = &[
        "/",
        "/events",
        "/events/create",
        "/events/7",
        "/events/7/edit",
        "/auth",
    ];

    #[test]
    fn canonical_paths_round_trip() {
        for path in CANONICAL {
            assert_eq!(encode(&decode(path)), *path, "path {path}");
        }
    }

    #[test]
    fn edit_route_scenario() {
        let route = decode("/events/42/edit");
        assert_eq!(route, Route::EditEvent { event_id: 42 });
        assert_eq!(encode(&route), "/events/42/edit");
    }

    #[test]
    fn precedence_rules() {
        assert_eq!(decode("/events/5"), Route::EventDetail { event_id: 5 });
        assert_eq!(decode("/events/5/"), Route::EventDetail { event_id: 5 });
        assert_eq!(decode("/events/5/edit/"), Route::EditEvent { event_id: 5 });
        assert_eq!(decode("/events/create"), Route::CreateEvent);
        assert_eq!(decode("/events/create/draft"), Route::CreateEvent);
        assert_eq!(decode("/auth/login"), Route::Auth);
        assert_eq!(decode("/events/5/other"), Route::EventList);
        assert_eq!(decode("/eventsx"), Route::EventList);
        assert_eq!(decode("/about"), Route::Map);
        assert_eq!(decode(""), Route::Map);
    }

    #[test]
    fn malformed_ids_fall_through() {
        assert_eq!(decode("/events/abc/edit"), Route::EventList);
        assert_eq!(decode("/events/-3"), Route::EventList);
        assert_eq!(decode("/events/1.5/edit"), Route::EventList);
        assert_eq!(decode("/events//edit"), Route::EventList);
        assert_eq!(decode("/events/+4"), Route::EventList);
        // Does not fit in u64
        assert_eq!(decode("/events/99999999999999999999999"), Route::EventList);
    }

    #[test]
    fn query_and_fragment_are_ignored() {
        assert_eq!(decode("/events/9?tab=info"), Route::EventDetail { event_id: 9 });
        assert_eq!(decode("/auth#register"), Route::Auth);
        assert_eq!(decode("/?lat=45"), Route::Map);
    }

    #[test]
    fn detail_collapses_to_list_page() {
        assert_eq!(Route::EventDetail { event_id: 3 }.page(), Page::EventList);
        assert_eq!(Route::EditEvent { event_id: 3 }.page(), Page::EventList);
        assert_eq!(Route::from(Page::Auth), Route::Auth);
        for page in Page::all() {
            assert_eq!(decode(page.path()).page(), *page);
        }
    }

    fn any_route() -> impl Strategy<Value = Route> {
        prop_oneof![
            Just(Route::Map),
            Just(Route::EventList),
            any::<u64>().prop_map(|event_id| Route::EventDetail { event_id }),
            Just(Route::CreateEvent),
            any::<u64>().prop_map(|event_id| Route::EditEvent { event_id }),
            Just(Route::Auth),
        ]
    }

    proptest! {
        #[test]
        fn every_route_round_trips(route in any_route()) {
            let path = encode(&route);
            prop_assert_eq!(decode(&path), route);
            prop_assert_eq!(encode(&decode(&path)), path);
        }

        #[test]
        fn decode_is_total_and_idempotent(path in "(/[a-z0-9]{0,8}){0,4}/?") {
            prop_assert_eq!(decode(&path), decode(&path));
        }

        #[test]
        fn decode_handles_arbitrary_input(path in ".*") {
            let _ = decode(&path);
        }
    }
}
