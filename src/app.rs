//! Airsoft Hub application shell
//!
//! Layout:
//! ┌──────────────────────────────────────────┐
//! │  Header                                  │
//! ├────────────┬─────────────────────────────┤
//! │  Sidebar   │  Page (map / list / editor /│
//! │  nav +     │  account) + detail modal    │
//! │  events    │                             │
//! └────────────┴─────────────────────────────┘
//!
//! Frame order: apply browser transitions, land fetch results, render, then
//! advance the focus coordinator so a due callout sees this frame's markers.

use std::time::Duration;

use eframe::egui;
use egui::{Color32, RichText};

use hub_nav::{
    AuthSession, DetailOverlay, EntityDirectory, FetchError, FocusCoordinator, FocusTokens,
    KeyValueStore, LoadTicket, MarkerRegistry, NavigationController, Page, Route,
};
use hub_types::{EventId, EventSummary};

use crate::api::ApiClient;
use crate::config::global_config;
use crate::detail_modal::{self, DetailAction};
use crate::map::{MapAction, MapMarker, MapView};
use crate::pages::{self, AccountContext, AuthPage, EditorContext, EventEditor, PageAction};
use crate::sidebar::{Sidebar, SidebarAction};
use crate::tasks::{InFlight, Spawner};

#[cfg(target_arch = "wasm32")]
type AppHistory = crate::browser::BrowserHistory;
#[cfg(not(target_arch = "wasm32"))]
type AppHistory = hub_nav::MemoryHistory;

/// Used natively when no base URL is configured.
#[cfg(not(target_arch = "wasm32"))]
const DEV_SERVER_URL: &str = "http://localhost:3000";

/// Browser back/forward arrives outside egui's input loop.
const HISTORY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Main application state
pub struct HubApp {
    // Routing
    nav: NavigationController<AppHistory>,
    last_route: Route,

    // Session
    store: Box<dyn KeyValueStore>,
    session: AuthSession,

    // Event data
    api: ApiClient,
    spawner: Option<Spawner>,
    directory: EntityDirectory,
    loader: Option<(LoadTicket, InFlight<Vec<EventSummary>>)>,

    // Map + focus
    map: MapView,
    markers: MarkerRegistry<MapMarker>,
    focus: FocusCoordinator,
    tokens: FocusTokens,

    // Views
    overlay: DetailOverlay,
    sidebar: Sidebar,
    auth_page: AuthPage,
    editor: EventEditor,

    // Startup failure shown in the header
    error: Option<String>,
}

impl HubApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = global_config();

        #[cfg(target_arch = "wasm32")]
        let (history, store): (AppHistory, Box<dyn KeyValueStore>) = (
            crate::browser::BrowserHistory::new(),
            Box::new(crate::browser::LocalStorageStore::new()),
        );
        #[cfg(not(target_arch = "wasm32"))]
        let (history, store): (AppHistory, Box<dyn KeyValueStore>) = (
            hub_nav::MemoryHistory::new("/"),
            Box::new(hub_nav::MemoryStore::new()),
        );

        #[cfg(target_arch = "wasm32")]
        let base_url = config.api.base_url.clone();
        #[cfg(not(target_arch = "wasm32"))]
        let base_url = if config.api.base_url.is_empty() {
            DEV_SERVER_URL.to_string()
        } else {
            config.api.base_url.clone()
        };

        let (spawner, error) = match Spawner::new() {
            Ok(spawner) => (Some(spawner), None),
            Err(e) => {
                tracing::error!("app: {}", e);
                (None, Some(e))
            }
        };

        let session = AuthSession::load(store.as_ref(), config.storage.clone());
        let nav = NavigationController::new(history);
        let last_route = nav.route();

        let mut app = Self {
            nav,
            last_route,
            store,
            session,
            api: ApiClient::new(&base_url, config.api.clone()),
            spawner,
            directory: EntityDirectory::new(),
            loader: None,
            map: MapView::new(&config.map),
            markers: MarkerRegistry::new(),
            focus: FocusCoordinator::new(config.focus),
            tokens: FocusTokens::new(),
            overlay: DetailOverlay::new(),
            sidebar: Sidebar::new(),
            auth_page: AuthPage::new(),
            editor: EventEditor::new(),
            error,
        };
        app.load_events();
        app
    }

    // =========================================================================
    // EVENT LOADING
    // =========================================================================

    /// Fetch the event list. A load still in flight is aborted and its
    /// ticket invalidated.
    fn load_events(&mut self) {
        let ticket = self.directory.begin_load();
        let Some(spawner) = &self.spawner else {
            let reason = FetchError::Transport("background requests unavailable".to_string());
            self.directory.complete(ticket, Err(reason));
            return;
        };
        let api = self.api.clone();
        let fetch = spawner.spawn(move |scope| async move { api.list_events(&scope).await });
        self.loader = Some((ticket, fetch));
    }

    fn poll_loader(&mut self) {
        let Some(result) = self.loader.as_ref().and_then(|(_, fetch)| fetch.poll()) else {
            return;
        };
        if let Some((ticket, _)) = self.loader.take() {
            self.directory.complete(ticket, result);
        }
    }

    // =========================================================================
    // ROUTING
    // =========================================================================

    /// Run route-change housekeeping if the route moved since last seen.
    fn apply_route(&mut self) -> Route {
        let route = self.nav.route();
        if route != self.last_route {
            let from = std::mem::replace(&mut self.last_route, route);
            self.on_route_changed(from, route);
        }
        route
    }

    fn on_route_changed(&mut self, from: Route, to: Route) {
        let chores = RouteHousekeeping::between(from, to);
        tracing::debug!("app: route {} -> {} ({:?})", from, to, chores);
        if chores.leave_account {
            self.auth_page.leave();
        }
        if chores.leave_editor {
            self.editor.leave();
        }
        if chores.clear_map {
            self.focus.cancel();
            self.overlay.close(None);
        }
    }

    fn focus_event(&mut self, event_id: EventId, now: f64) {
        if self.nav.route().page() != Page::Map {
            self.nav.navigate(Page::Map);
        }
        let request = self.tokens.issue_for(event_id);
        let (filter, camera) = self.map.focus_target();
        let effects = self
            .focus
            .request(request, now, filter, &self.directory, camera);
        tracing::debug!("app: focus {} -> {:?}", event_id, effects);
    }

    fn handle_page_action(&mut self, action: PageAction) {
        match action {
            PageAction::None => {}
            PageAction::Navigate(page) => {
                self.nav.navigate(page);
            }
            PageAction::OpenDetail(event_id) => {
                self.overlay.open(event_id, Some(&mut self.nav));
            }
            PageAction::Reload => self.load_events(),
            PageAction::EventSaved => {
                self.load_events();
                self.nav.navigate(Page::EventList);
            }
        }
    }

    // =========================================================================
    // PANELS
    // =========================================================================

    fn header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Airsoft Hub");
                ui.separator();
                match self.session.email() {
                    Some(email) if self.session.is_signed_in() => {
                        ui.label(RichText::new(email).color(Color32::LIGHT_GREEN));
                    }
                    _ => {
                        ui.label(RichText::new("Not signed in").color(Color32::GRAY));
                    }
                }
                if let Some(error) = &self.error {
                    ui.colored_label(Color32::RED, error);
                }
            });
        });
    }

    fn central(&mut self, ctx: &egui::Context, route: Route) -> (MapAction, PageAction) {
        let mut map_action = MapAction::None;
        let mut page_action = PageAction::None;

        egui::CentralPanel::default().show(ctx, |ui| match route {
            Route::Map => {
                map_action = self.map.ui(ui, self.directory.events(), &mut self.markers);
            }
            Route::EventList | Route::EventDetail { .. } => {
                page_action = pages::event_list(ui, &self.directory);
            }
            Route::CreateEvent | Route::EditEvent { .. } => {
                let cx = EditorContext {
                    api: &self.api,
                    spawner: self.spawner.as_ref(),
                    session: &self.session,
                    directory: &self.directory,
                };
                page_action = self.editor.ui(ui, route, cx);
            }
            Route::Auth => {
                let cx = AccountContext {
                    api: &self.api,
                    spawner: self.spawner.as_ref(),
                    store: self.store.as_ref(),
                    session: &mut self.session,
                    directory: &self.directory,
                };
                page_action = self.auth_page.ui(ui, cx);
            }
        });

        if route != Route::Map {
            self.map.unmount_all(&mut self.markers);
        }
        (map_action, page_action)
    }

    fn detail_overlay(&mut self, ctx: &egui::Context, route: Route) {
        let action = match self.overlay.resolve(&route, &self.directory) {
            Some(event) => detail_modal::show(ctx, event, self.session.email()),
            None => return,
        };
        let routed = matches!(route, Route::EventDetail { .. });
        match action {
            DetailAction::None => {}
            DetailAction::Close if routed => self.overlay.close(Some(&mut self.nav)),
            DetailAction::Close => self.overlay.close(None),
            DetailAction::Edit(event_id) => {
                self.overlay.close(None);
                self.nav.open_edit_event(event_id);
            }
        }
    }
}

impl eframe::App for HubApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = ctx.input(|i| i.time);

        self.nav.sync();
        let route = self.apply_route();

        self.poll_loader();
        if route != Route::Auth {
            self.auth_page.poll(&mut self.session, self.store.as_ref());
        }

        self.header(ctx);

        // =====================================================================
        // LEFT PANEL - Navigation + event list
        // =====================================================================
        let sidebar_action = egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                self.sidebar
                    .ui(ui, route, &self.directory, self.session.is_signed_in())
            })
            .inner;

        match sidebar_action {
            SidebarAction::None => {}
            SidebarAction::Navigate(page) => {
                self.nav.navigate(page);
            }
            SidebarAction::Focus(event_id) => self.focus_event(event_id, now),
            SidebarAction::Retry => self.load_events(),
        }

        // Navigation from the sidebar takes effect this frame.
        let route = self.apply_route();

        // =====================================================================
        // CENTRAL PANEL - Current page
        // =====================================================================
        let (map_action, page_action) = self.central(ctx, route);
        if let MapAction::ShowDetails(event_id) = map_action {
            self.overlay.open(event_id, None);
        }
        self.handle_page_action(page_action);

        if let Some(event_id) = self.focus.tick(now, &self.markers, self.map.camera_mut()) {
            tracing::debug!("app: callout opened for {}", event_id);
        }

        let route = self.nav.route();
        self.detail_overlay(ctx, route);

        if self.directory.is_loading()
            || self.focus.has_pending()
            || self.auth_page.is_busy()
            || self.editor.is_busy()
            || self.nav.has_pending()
        {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(HISTORY_POLL_INTERVAL);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        tracing::debug!("app: exiting, dropping in-flight requests");
        self.loader = None;
        self.directory.cancel();
        self.focus.cancel();
        self.auth_page.leave();
        self.editor.leave();
        self.map.unmount_all(&mut self.markers);
    }
}

/// What a route change has to tidy up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RouteHousekeeping {
    /// Abort account requests.
    leave_account: bool,
    /// Abort a pending save and drop the form.
    leave_editor: bool,
    /// A map selection or pending callout does not follow the user to
    /// another page.
    clear_map: bool,
}

impl RouteHousekeeping {
    fn between(from: Route, to: Route) -> Self {
        let left = |page: Page| from.page() == page && to.page() != page;
        Self {
            leave_account: left(Page::Auth),
            // Editing another event is a different form.
            leave_editor: from.requires_auth() && from != to,
            clear_map: left(Page::Map),
        }
    }
}
