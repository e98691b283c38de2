//! End-to-end flows across the navigation engine, driven with in-memory
//! history, storage and a fake map.

use std::cell::RefCell;
use std::rc::Rc;

use hub_nav::{
    decode, encode, AuthSession, DetailOverlay, EntityDirectory, FetchError, FocusConfig,
    FocusCoordinator, FocusEffects, FocusTokens, History, LoadOutcome, MapViewport, MarkerHandle,
    MarkerRegistry, MemoryHistory, MemoryStore, NavigationController, Page, Route, StorageKeys,
};
use hub_types::{parse_event_list, Category, EventSummary, LatLng};

#[derive(Default)]
struct Map {
    zoom: f64,
    flights: Vec<(LatLng, f64)>,
    pans: usize,
}

impl MapViewport for Map {
    fn zoom(&self) -> f64 {
        self.zoom
    }
    fn height(&self) -> f64 {
        500.0
    }
    fn fly_to(&mut self, target: LatLng, zoom: f64) {
        self.flights.push((target, zoom));
        self.zoom = zoom;
    }
    fn pan_by_pixels(&mut self, _dx: f64, _dy: f64) {
        self.pans += 1;
    }
}

#[derive(Clone)]
struct Pin {
    id: u64,
    log: Rc<RefCell<Vec<u64>>>,
}

impl MarkerHandle for Pin {
    fn open_callout(&self) {
        self.log.borrow_mut().push(self.id);
    }
}

fn loaded_directory() -> EntityDirectory {
    let payload = serde_json::json!([
        { "id": 1, "name": "Alpha", "lat": 45.81, "lng": 15.98, "category": "24h" },
        { "id": 2, "name": "Beta", "date": "2024-05-01", "lat": 43.51, "lng": 16.44 },
        { "id": 42, "name": "Night Op", "date": "2024-09-14", "latitude": 45.33, "longitude": 14.44 },
        { "name": "no id, skipped" }
    ]);
    let events = parse_event_list(payload).unwrap();
    let mut dir = EntityDirectory::new();
    let ticket = dir.begin_load();
    assert_eq!(dir.complete(ticket, Ok(events)), LoadOutcome::Applied);
    dir
}

#[test]
fn deep_link_to_edit_page() {
    let history = MemoryHistory::new("/events/42/edit");
    let nav = NavigationController::new(history.clone());

    assert_eq!(nav.route(), Route::EditEvent { event_id: 42 });
    assert_eq!(nav.route().page(), Page::EventList);
    assert_eq!(encode(&nav.route()), history.current_path());
}

#[test]
fn sidebar_click_from_list_goes_to_map_and_focuses() {
    let history = MemoryHistory::new("/events");
    let mut nav = NavigationController::new(history.clone());
    let dir = loaded_directory();
    let mut map = Map {
        zoom: 7.0,
        ..Default::default()
    };
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut registry = MarkerRegistry::new();
    for event in dir.events().iter() {
        registry.register(
            event.id,
            Pin {
                id: event.id,
                log: log.clone(),
            },
        );
    }
    let mut filter = Some(Category::Skirmish);
    let mut tokens = FocusTokens::new();
    let mut focus = FocusCoordinator::new(FocusConfig::default());

    // Sidebar click on "Night Op".
    assert!(nav.navigate(Page::Map));
    let effects = focus.request(tokens.issue(42), 1.0, &mut filter, &dir, &mut map);

    assert_eq!(history.current_path(), "/");
    assert_eq!(filter, None);
    assert!(effects.contains(FocusEffects::VIEWPORT_MOVED));
    assert_eq!(map.flights, vec![(LatLng::new(45.33, 14.44), 11.0)]);

    assert_eq!(focus.tick(2.0, &registry, &mut map), Some(42));
    assert_eq!(*log.borrow(), vec![42]);

    // Same entry clicked again: the whole sequence replays.
    focus.request(tokens.issue(42), 3.0, &mut filter, &dir, &mut map);
    assert_eq!(focus.tick(4.0, &registry, &mut map), Some(42));
    assert_eq!(map.flights.len(), 2);
    assert_eq!(*log.borrow(), vec![42, 42]);
    assert_eq!(map.pans, 2);
}

#[test]
fn back_button_closes_routed_detail() {
    let history = MemoryHistory::new("/events");
    let mut nav = NavigationController::new(history.clone());
    let dir = loaded_directory();
    let mut overlay = DetailOverlay::new();

    overlay.open(2, Some(&mut nav));
    assert_eq!(
        overlay.resolve(&nav.route(), &dir).map(|e| e.name.as_str()),
        Some("Beta")
    );

    history.back();
    nav.sync();
    assert_eq!(nav.route(), Route::EventList);
    assert!(overlay.resolve(&nav.route(), &dir).is_none());

    history.forward();
    nav.sync();
    assert_eq!(overlay.active_id(&nav.route()), Some(2));
}

#[test]
fn reload_race_keeps_latest_list() {
    let mut dir = loaded_directory();
    let slow = dir.begin_load();
    let fast = dir.begin_load();

    dir.complete(fast, Ok(vec![EventSummary::new(7, "Fresh")]));
    assert_eq!(
        dir.complete(slow, Err(FetchError::Transport("timeout".into()))),
        LoadOutcome::Stale
    );

    assert_eq!(dir.len(), 1);
    assert_eq!(dir.error(), None);
    assert_eq!(dir.sorted()[0].name, "Fresh");
}

#[test]
fn sign_out_leaves_gated_pages_reachable_by_url_only() {
    let store = MemoryStore::new();
    let mut session = AuthSession::load(&store, StorageKeys::default());
    session.update(&store, Some("t0k"), Some("ana@example.hr"));

    let history = MemoryHistory::new("/events/create");
    let nav = NavigationController::new(history);
    assert!(nav.route().requires_auth());
    assert!(session.is_signed_in());

    session.sign_out(&store);
    assert!(!AuthSession::load(&store, StorageKeys::default()).is_signed_in());
}

#[test]
fn unknown_paths_fall_through() {
    let cases = [
        ("/nope", Route::Map),
        ("", Route::Map),
        ("/events/abc/edit/x", Route::EventList),
        ("/events/12?tab=info#top", Route::EventDetail { event_id: 12 }),
        ("/authx", Route::Auth),
    ];
    for (path, expected) in cases {
        assert_eq!(decode(path), expected, "path {path:?}");
    }
}
