//! Central page views other than the map
//!
//! - Event list: cards, clicking one opens `/events/{id}`
//! - Create / edit: account-gated event form
//! - Account: sign in / register, profile, my events, saved events

use egui::{Color32, RichText, ScrollArea};
use serde_json::Value;

use hub_nav::{date_then_name, AuthSession, EntityDirectory, KeyValueStore, LoadStatus, Page, Route};
use hub_types::{
    format_date_ddmmyyyy, AuthRequest, AuthResponse, Category, EventDraft, EventId, EventSummary,
    MeResponse, SavedEvent,
};

use crate::api::ApiClient;
use crate::detail_modal::can_edit;
use crate::map::view::category_color;
use crate::tasks::{FetchResult, InFlight, Spawner};

const ERROR_RED: Color32 = Color32::from_rgb(220, 53, 69);
const OK_GREEN: Color32 = Color32::from_rgb(40, 167, 69);

/// What a page asked the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    None,
    Navigate(Page),
    OpenDetail(EventId),
    Reload,
    /// The server stored a created or edited event.
    EventSaved,
}

// =============================================================================
// EVENT LIST
// =============================================================================

pub fn event_list(ui: &mut egui::Ui, directory: &EntityDirectory) -> PageAction {
    let mut action = PageAction::None;

    ui.horizontal(|ui| {
        ui.heading("Events");
        if directory.is_loading() {
            ui.spinner();
        } else if ui.small_button("Reload").clicked() {
            action = PageAction::Reload;
        }
    });
    ui.add_space(8.0);

    match directory.status() {
        LoadStatus::Loading if directory.is_empty() => {
            ui.label("Loading...");
            return action;
        }
        LoadStatus::Failed(message) => {
            ui.colored_label(ERROR_RED, format!("Error: {message}"));
        }
        _ => {}
    }

    if directory.is_empty() {
        if !directory.is_loading() {
            ui.label("No events found.");
        }
        return action;
    }

    ScrollArea::vertical()
        .id_salt("event_list_cards")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for event in directory.events().iter() {
                let card = egui::Frame::group(ui.style())
                    .inner_margin(egui::Margin::same(10.0))
                    .show(ui, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(RichText::new(&event.name).strong().size(15.0));
                        ui.label(
                            RichText::new(event.category.as_str())
                                .size(11.0)
                                .color(category_color(event.category)),
                        );
                        if let Some(date) = &event.date {
                            ui.label(format!("Date: {}", format_date_ddmmyyyy(date)));
                        }
                        if let Some(location) = &event.location {
                            ui.label(location);
                        }
                        if let Some(description) = &event.description {
                            ui.label(RichText::new(description).color(Color32::GRAY));
                        }
                    });
                let response = card.response.interact(egui::Sense::click());
                if response.on_hover_cursor(egui::CursorIcon::PointingHand).clicked() {
                    action = PageAction::OpenDetail(event.id);
                }
                ui.add_space(6.0);
            }
        });

    action
}

// =============================================================================
// CREATE / EDIT
// =============================================================================

/// Text state of the event form.
#[derive(Debug, Clone, Default, PartialEq)]
struct EventForm {
    name: String,
    date: String,
    location: String,
    category: Category,
    lat: String,
    lng: String,
    description: String,
    detailed_description: String,
    facebook_link: String,
}

impl EventForm {
    fn from_event(event: &EventSummary) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let number = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
        Self {
            name: event.name.clone(),
            date: text(&event.date),
            location: text(&event.location),
            category: event.category,
            lat: number(event.lat),
            lng: number(event.lng),
            description: text(&event.description),
            detailed_description: text(&event.detailed_description),
            facebook_link: text(&event.facebook_link),
        }
    }

    /// Request body. Coordinates must read as finite numbers.
    fn to_draft(&self) -> Result<EventDraft, String> {
        let coordinate = |raw: &str, field: &str| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("Invalid {field}"))
        };
        let optional = |raw: &str| Some(raw.trim().to_string()).filter(|s| !s.is_empty());

        Ok(EventDraft {
            name: self.name.trim().to_string(),
            date: self.date.trim().to_string(),
            location: self.location.trim().to_string(),
            category: self.category,
            lat: coordinate(&self.lat, "lat")?,
            lng: coordinate(&self.lng, "lng")?,
            description: self.description.clone(),
            detailed_description: optional(&self.detailed_description),
            facebook_link: optional(&self.facebook_link),
        })
    }
}

/// Everything the editor touches outside its own state.
pub struct EditorContext<'a> {
    pub api: &'a ApiClient,
    pub spawner: Option<&'a Spawner>,
    pub session: &'a AuthSession,
    pub directory: &'a EntityDirectory,
}

/// Create / edit page state. The save request is aborted by
/// [`leave`](Self::leave).
#[derive(Default)]
pub struct EventEditor {
    form: EventForm,
    /// Route the form was filled for.
    filled_for: Option<Route>,
    save: Option<InFlight<Value>>,
    error: Option<String>,
}

impl EventEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The page left the screen: abort the save and forget the form.
    pub fn leave(&mut self) {
        if self.is_busy() {
            tracing::debug!("editor: leaving page, aborting save");
        }
        self.save = None;
        self.filled_for = None;
        self.error = None;
    }

    pub fn is_busy(&self) -> bool {
        self.save.is_some()
    }

    /// Apply a finished save.
    pub fn poll(&mut self) -> PageAction {
        match self.save.as_ref().and_then(InFlight::poll) {
            Some(result) => {
                self.save = None;
                self.apply_save(result)
            }
            None => PageAction::None,
        }
    }

    fn apply_save(&mut self, result: FetchResult<Value>) -> PageAction {
        match result {
            Ok(_) => {
                tracing::info!("editor: event saved");
                self.error = None;
                PageAction::EventSaved
            }
            Err(e) if e.is_aborted() => PageAction::None,
            Err(e) => {
                tracing::warn!("editor: save failed: {}", e);
                self.error = Some(e.to_string());
                PageAction::None
            }
        }
    }

    /// Fill the form once per visit: blank for create, from the directory
    /// for edit.
    fn fill(&mut self, route: Route, event: Option<&EventSummary>) {
        if self.filled_for == Some(route) {
            return;
        }
        self.form = event.map(EventForm::from_event).unwrap_or_default();
        self.error = None;
        self.filled_for = Some(route);
    }

    fn send(&mut self, route: Route, token: &str, api: &ApiClient, spawner: &Spawner) {
        let draft = match self.form.to_draft() {
            Ok(draft) => draft,
            Err(message) => {
                self.error = Some(message);
                return;
            }
        };
        let (api, token) = (api.clone(), token.to_string());
        self.error = None;
        self.save = Some(spawner.spawn(move |scope| async move {
            match route {
                Route::EditEvent { event_id } => {
                    api.update_event(&scope, &token, event_id, &draft).await
                }
                _ => api.create_event(&scope, &token, &draft).await,
            }
        }));
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, route: Route, cx: EditorContext<'_>) -> PageAction {
        let mut action = self.poll();

        let title = match route {
            Route::EditEvent { .. } => "Edit Event",
            _ => "Create Event",
        };
        ui.heading(title);
        ui.add_space(8.0);

        let Some(token) = cx.session.token() else {
            ui.label("You need to sign in to create or edit events.");
            if ui.button("Sign in").clicked() {
                action = PageAction::Navigate(Page::Auth);
            }
            return action;
        };
        let Some(spawner) = cx.spawner else {
            ui.colored_label(ERROR_RED, "Background requests are unavailable.");
            return action;
        };

        let event = match route {
            Route::EditEvent { event_id } => {
                let Some(event) = cx.directory.get(event_id) else {
                    if cx.directory.is_loading() {
                        ui.spinner();
                    } else {
                        ui.label("Event not found.");
                    }
                    return action;
                };
                if !can_edit(event, cx.session.email()) {
                    ui.label(RichText::new(&event.name).strong());
                    ui.colored_label(ERROR_RED, "You can only edit events you created.");
                    return action;
                }
                Some(event)
            }
            _ => None,
        };
        self.fill(route, event);
        self.form_ui(ui);

        ui.add_space(8.0);
        let busy = self.is_busy();
        let ready = !self.form.name.trim().is_empty();
        ui.horizontal(|ui| {
            if ui
                .add_enabled(ready && !busy, egui::Button::new("Save"))
                .clicked()
            {
                self.send(route, token, cx.api, spawner);
            }
            if ui.button("Cancel").clicked() {
                action = PageAction::Navigate(Page::EventList);
            }
            if busy {
                ui.spinner();
            }
        });
        if let Some(error) = &self.error {
            ui.colored_label(ERROR_RED, error);
        }
        action
    }

    fn form_ui(&mut self, ui: &mut egui::Ui) {
        let form = &mut self.form;
        egui::Grid::new("event_form")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut form.name);
                ui.end_row();

                ui.label("Date");
                ui.add(egui::TextEdit::singleline(&mut form.date).hint_text("YYYY-MM-DD"));
                ui.end_row();

                ui.label("Location");
                ui.text_edit_singleline(&mut form.location);
                ui.end_row();

                ui.label("Category");
                ui.horizontal(|ui| {
                    for category in Category::all() {
                        ui.selectable_value(&mut form.category, *category, category.as_str());
                    }
                });
                ui.end_row();

                ui.label("Latitude");
                ui.text_edit_singleline(&mut form.lat);
                ui.end_row();

                ui.label("Longitude");
                ui.text_edit_singleline(&mut form.lng);
                ui.end_row();

                ui.label("Description");
                ui.text_edit_multiline(&mut form.description);
                ui.end_row();

                ui.label("Details");
                ui.text_edit_multiline(&mut form.detailed_description)
                    .on_hover_text("Shown only in the details view");
                ui.end_row();

                ui.label("Facebook link");
                ui.text_edit_singleline(&mut form.facebook_link);
                ui.end_row();
            });
    }
}

// =============================================================================
// ACCOUNT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum AuthMode {
    #[default]
    Login,
    Register,
}

/// Everything the account page touches outside its own state.
pub struct AccountContext<'a> {
    pub api: &'a ApiClient,
    pub spawner: Option<&'a Spawner>,
    pub store: &'a dyn KeyValueStore,
    pub session: &'a mut AuthSession,
    pub directory: &'a EntityDirectory,
}

/// Account page state. Its fetches are aborted by [`leave`](Self::leave).
#[derive(Default)]
pub struct AuthPage {
    mode: AuthMode,
    email: String,
    password: String,
    username: String,
    airsoft_club: String,
    status: Option<String>,
    error: Option<String>,
    submit: Option<InFlight<AuthResponse>>,

    profile: Option<MeResponse>,
    profile_error: Option<String>,
    profile_fetch: Option<InFlight<MeResponse>>,
    saved: Option<Vec<SavedEvent>>,
    saved_error: Option<String>,
    saved_fetch: Option<InFlight<Vec<SavedEvent>>>,
    /// Token the account data was fetched for.
    loaded_for: Option<String>,
}

impl AuthPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The page left the screen: abort its requests.
    pub fn leave(&mut self) {
        if self.is_busy() {
            tracing::debug!("account: leaving page, aborting requests");
        }
        self.submit = None;
        self.profile_fetch = None;
        self.saved_fetch = None;
        self.loaded_for = None;
    }

    pub fn is_busy(&self) -> bool {
        self.submit.is_some() || self.profile_fetch.is_some() || self.saved_fetch.is_some()
    }

    /// Apply results that have arrived.
    pub fn poll(&mut self, session: &mut AuthSession, store: &dyn KeyValueStore) {
        if let Some(result) = self.submit.as_ref().and_then(InFlight::poll) {
            self.submit = None;
            self.apply_auth(result, session, store);
        }

        if let Some(result) = self.profile_fetch.as_ref().and_then(InFlight::poll) {
            self.profile_fetch = None;
            match result {
                Ok(me) => match &me.error {
                    Some(message) => self.profile_error = Some(message.clone()),
                    None => {
                        self.profile_error = None;
                        self.profile = Some(me);
                    }
                },
                Err(e) if e.is_aborted() => {}
                Err(e) => self.profile_error = Some(e.to_string()),
            }
        }

        if let Some(result) = self.saved_fetch.as_ref().and_then(InFlight::poll) {
            self.saved_fetch = None;
            match result {
                Ok(mut saved) => {
                    sort_saved(&mut saved);
                    self.saved_error = None;
                    self.saved = Some(saved);
                }
                Err(e) if e.is_aborted() => {}
                Err(e) => self.saved_error = Some(e.to_string()),
            }
        }
    }

    fn apply_auth(
        &mut self,
        result: FetchResult<AuthResponse>,
        session: &mut AuthSession,
        store: &dyn KeyValueStore,
    ) {
        let response = match result {
            Ok(response) => response,
            Err(e) if e.is_aborted() => return,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };
        match signed_in_identity(response, &self.email) {
            Ok((token, email)) => {
                session.update(store, Some(&token), Some(&email));
                self.status = Some(match self.mode {
                    AuthMode::Login => format!("Signed in as {email}"),
                    AuthMode::Register => format!("Account created for {email}"),
                });
                self.error = None;
                self.password.clear();
            }
            Err(message) => {
                tracing::warn!("account: authentication failed: {}", message);
                self.error = Some(message);
            }
        }
    }

    fn send_credentials(&mut self, api: &ApiClient, spawner: &Spawner) {
        let request = match self.mode {
            AuthMode::Login => AuthRequest::login(self.email.trim(), self.password.as_str()),
            AuthMode::Register => AuthRequest::register(
                self.email.trim(),
                self.password.as_str(),
                &self.username,
                &self.airsoft_club,
            ),
        };
        let mode = self.mode;
        let api = api.clone();
        self.status = None;
        self.error = None;
        self.submit = Some(spawner.spawn(move |scope| async move {
            match mode {
                AuthMode::Login => api.login(&scope, &request).await,
                AuthMode::Register => api.register(&scope, &request).await,
            }
        }));
    }

    fn fetch_account(&mut self, token: &str, api: &ApiClient, spawner: &Spawner) {
        tracing::debug!("account: fetching profile and saved events");
        self.loaded_for = Some(token.to_string());
        self.profile_error = None;
        self.saved_error = None;

        let (me_api, me_token) = (api.clone(), token.to_string());
        self.profile_fetch = Some(spawner.spawn(move |scope| async move {
            me_api.me(&scope, &me_token).await
        }));

        let (saved_api, saved_token) = (api.clone(), token.to_string());
        self.saved_fetch = Some(spawner.spawn(move |scope| async move {
            saved_api.saved_events(&scope, &saved_token).await
        }));
    }

    fn sign_out(&mut self, session: &mut AuthSession, store: &dyn KeyValueStore) {
        session.sign_out(store);
        self.leave();
        self.profile = None;
        self.profile_error = None;
        self.saved = None;
        self.saved_error = None;
        self.status = Some("Signed out".to_string());
        self.error = None;
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    pub fn ui(&mut self, ui: &mut egui::Ui, cx: AccountContext<'_>) -> PageAction {
        self.poll(cx.session, cx.store);

        ui.heading("Account");
        ui.add_space(8.0);

        let Some(spawner) = cx.spawner else {
            ui.colored_label(ERROR_RED, "Background requests are unavailable.");
            return PageAction::None;
        };

        if let Some(token) = cx.session.token().map(str::to_string) {
            if self.loaded_for.as_deref() != Some(token.as_str()) {
                self.fetch_account(&token, cx.api, spawner);
            }
            self.account_ui(ui, cx)
        } else {
            self.form_ui(ui, cx.api, spawner);
            PageAction::None
        }
    }

    fn status_ui(&self, ui: &mut egui::Ui) {
        if let Some(status) = &self.status {
            ui.colored_label(OK_GREEN, status);
        }
        if let Some(error) = &self.error {
            ui.colored_label(ERROR_RED, error);
        }
    }

    fn form_ui(&mut self, ui: &mut egui::Ui, api: &ApiClient, spawner: &Spawner) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.mode, AuthMode::Login, "Sign in");
            ui.selectable_value(&mut self.mode, AuthMode::Register, "Register");
        });
        ui.add_space(6.0);

        egui::Grid::new("auth_form")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Email");
                ui.text_edit_singleline(&mut self.email);
                ui.end_row();

                ui.label("Password");
                ui.add(egui::TextEdit::singleline(&mut self.password).password(true));
                ui.end_row();

                if self.mode == AuthMode::Register {
                    ui.label("Username");
                    ui.text_edit_singleline(&mut self.username);
                    ui.end_row();

                    ui.label("Airsoft club");
                    ui.text_edit_singleline(&mut self.airsoft_club)
                        .on_hover_text("Leave empty if you play freelance");
                    ui.end_row();
                }
            });

        ui.add_space(6.0);
        let ready = !self.email.trim().is_empty() && !self.password.is_empty();
        ui.horizontal(|ui| {
            let label = match self.mode {
                AuthMode::Login => "Sign in",
                AuthMode::Register => "Create account",
            };
            let busy = self.submit.is_some();
            if ui
                .add_enabled(ready && !busy, egui::Button::new(label))
                .clicked()
            {
                self.send_credentials(api, spawner);
            }
            if busy {
                ui.spinner();
            }
        });
        self.status_ui(ui);
    }

    fn account_ui(&mut self, ui: &mut egui::Ui, cx: AccountContext<'_>) -> PageAction {
        let mut action = PageAction::None;
        self.status_ui(ui);

        ui.group(|ui| {
            ui.label(RichText::new("Profile").strong());
            match (&self.profile, &self.profile_error) {
                (_, Some(error)) => {
                    ui.colored_label(ERROR_RED, error);
                }
                (Some(me), None) => {
                    let email = me.email.as_deref().or(cx.session.email()).unwrap_or("-");
                    ui.label(format!("Email: {email}"));
                    if let Some(username) = &me.username {
                        ui.label(format!("Username: {username}"));
                    }
                    ui.label(format!("Club: {}", me.club_label()));
                }
                (None, None) => {
                    ui.spinner();
                }
            }
        });
        ui.add_space(8.0);

        ScrollArea::vertical()
            .id_salt("account_lists")
            .auto_shrink([false, false])
            .max_height((ui.available_height() - 40.0).max(80.0))
            .show(ui, |ui| {
                ui.label(RichText::new("My Events").strong());
                let mut mine = cx
                    .session
                    .email()
                    .map(|email| cx.directory.created_by(email))
                    .unwrap_or_default();
                mine.sort_by(|a, b| {
                    date_then_name((a.date.as_deref(), &a.name), (b.date.as_deref(), &b.name))
                });
                if mine.is_empty() {
                    ui.label(RichText::new("You have not created any events.").color(Color32::GRAY));
                }
                for event in &mine {
                    if entry_row(ui, &event.name, event.date.as_deref(), event.location.as_deref()) {
                        action = PageAction::OpenDetail(event.id);
                    }
                }

                ui.add_space(10.0);
                ui.label(RichText::new("Saved Events").strong());
                if let Some(error) = &self.saved_error {
                    ui.colored_label(ERROR_RED, error);
                }
                match &self.saved {
                    Some(saved) if saved.is_empty() => {
                        ui.label(RichText::new("No saved events.").color(Color32::GRAY));
                    }
                    Some(saved) => {
                        for event in saved {
                            if entry_row(ui, &event.name, event.date.as_deref(), event.location.as_deref()) {
                                action = PageAction::OpenDetail(event.id);
                            }
                        }
                    }
                    None if self.saved_fetch.is_some() => {
                        ui.spinner();
                    }
                    None => {}
                }
            });

        ui.separator();
        if ui.button("Sign out").clicked() {
            self.sign_out(cx.session, cx.store);
        }
        action
    }
}

fn entry_row(ui: &mut egui::Ui, name: &str, date: Option<&str>, location: Option<&str>) -> bool {
    let mut clicked = false;
    ui.horizontal(|ui| {
        clicked = ui.link(name).clicked();
        if let Some(date) = date {
            ui.label(RichText::new(format_date_ddmmyyyy(date)).size(11.0).color(Color32::GRAY));
        }
        if let Some(location) = location {
            ui.label(RichText::new(location).size(11.0).color(Color32::GRAY));
        }
    });
    clicked
}

/// Token and email from a login/register response. The entered email stands
/// in when the server does not echo one.
fn signed_in_identity(response: AuthResponse, entered_email: &str) -> Result<(String, String), String> {
    if let Some(error) = response.error {
        return Err(error);
    }
    let token = response.token.ok_or_else(|| "Missing token".to_string())?;
    let email = response
        .email
        .unwrap_or_else(|| entered_email.trim().to_string());
    Ok((token, email))
}

fn sort_saved(saved: &mut [SavedEvent]) {
    saved.sort_by(|a, b| date_then_name((a.date.as_deref(), &a.name), (b.date.as_deref(), &b.name)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use hub_nav::{FetchError, MemoryStore, StorageKeys};

    fn response(token: Option<&str>, email: Option<&str>, error: Option<&str>) -> AuthResponse {
        AuthResponse {
            token: token.map(str::to_string),
            email: email.map(str::to_string),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn server_error_wins() {
        let result = signed_in_identity(response(Some("t"), None, Some("Invalid credentials")), "a@b.hr");
        assert_eq!(result, Err("Invalid credentials".to_string()));
    }

    #[test]
    fn missing_token_is_an_error() {
        let result = signed_in_identity(response(None, Some("a@b.hr"), None), "a@b.hr");
        assert_eq!(result, Err("Missing token".to_string()));
    }

    #[test]
    fn entered_email_fills_in() {
        let result = signed_in_identity(response(Some("tok"), None, None), " ana@example.hr ");
        assert_eq!(result, Ok(("tok".to_string(), "ana@example.hr".to_string())));
    }

    #[test]
    fn saved_events_sorted_by_date_then_name() {
        let saved = |id, name: &str, date: Option<&str>| SavedEvent {
            id,
            name: name.to_string(),
            date: date.map(str::to_string),
            location: None,
        };
        let mut list = vec![
            saved(1, "Night op", None),
            saved(2, "bravo", Some("2024-06-01")),
            saved(3, "Alpha", Some("2024-06-01")),
            saved(4, "Zulu", Some("2024-01-01")),
        ];
        sort_saved(&mut list);
        let ids: Vec<_> = list.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1]);
    }

    #[test]
    fn auth_result_updates_session() {
        let store = MemoryStore::new();
        let mut session = AuthSession::load(&store, StorageKeys::default());
        let mut page = AuthPage::new();
        page.email = "ana@example.hr".to_string();
        page.password = "secret".to_string();

        page.apply_auth(Ok(response(Some("tok"), None, None)), &mut session, &store);

        assert!(session.is_signed_in());
        assert_eq!(session.email(), Some("ana@example.hr"));
        assert_eq!(store.get("authToken").as_deref(), Some("tok"));
        assert!(page.password.is_empty());
        assert!(page.error.is_none());
    }

    #[test]
    fn failed_auth_leaves_session_alone() {
        let store = MemoryStore::new();
        let mut session = AuthSession::load(&store, StorageKeys::default());
        let mut page = AuthPage::new();

        page.apply_auth(
            Err(FetchError::status(401, Some("Invalid credentials".into()))),
            &mut session,
            &store,
        );
        assert!(!session.is_signed_in());
        assert_eq!(page.error.as_deref(), Some("Invalid credentials"));

        page.apply_auth(Err(FetchError::Aborted), &mut session, &store);
        assert_eq!(page.error.as_deref(), Some("Invalid credentials"));
    }

    fn edited_event() -> EventSummary {
        let mut event = EventSummary::new(9, "Night Op")
            .with_date("2024-06-01")
            .with_position(45.8, 15.9)
            .with_category(Category::TwelveHour)
            .with_creator("ana@example.hr");
        event.location = Some("Zagreb".into());
        event.detailed_description = Some("Bring NVGs".into());
        event
    }

    #[test]
    fn edit_form_starts_from_the_stored_event() {
        let form = EventForm::from_event(&edited_event());
        assert_eq!(form.name, "Night Op");
        assert_eq!(form.date, "2024-06-01");
        assert_eq!(form.lat, "45.8");
        assert_eq!(form.category, Category::TwelveHour);
        assert!(form.description.is_empty());

        let draft = form.to_draft().unwrap();
        assert_eq!((draft.lat, draft.lng), (45.8, 15.9));
        assert_eq!(draft.location, "Zagreb");
        assert_eq!(draft.detailed_description.as_deref(), Some("Bring NVGs"));
        assert_eq!(draft.facebook_link, None);
    }

    #[test]
    fn unreadable_coordinates_are_reported() {
        let mut form = EventForm::from_event(&edited_event());
        form.lng = "east".into();
        assert_eq!(form.to_draft(), Err("Invalid lng".to_string()));

        form.lng = "15.9".into();
        form.lat = " ".into();
        assert_eq!(form.to_draft(), Err("Invalid lat".to_string()));
    }

    #[test]
    fn form_is_filled_once_per_visit() {
        let event = edited_event();
        let route = Route::EditEvent { event_id: event.id };
        let mut editor = EventEditor::new();

        editor.fill(route, Some(&event));
        editor.form.name = "Renamed".into();
        editor.fill(route, Some(&event));
        assert_eq!(editor.form.name, "Renamed");

        editor.leave();
        editor.fill(Route::CreateEvent, None);
        assert_eq!(editor.form, EventForm::default());
    }

    #[test]
    fn only_a_stored_event_counts_as_saved() {
        let mut editor = EventEditor::new();

        let action = editor.apply_save(Err(FetchError::status(403, Some("Forbidden".into()))));
        assert_eq!(action, PageAction::None);
        assert_eq!(editor.error.as_deref(), Some("Forbidden"));

        assert_eq!(editor.apply_save(Err(FetchError::Aborted)), PageAction::None);
        assert_eq!(editor.error.as_deref(), Some("Forbidden"));

        assert_eq!(editor.apply_save(Ok(Value::Null)), PageAction::EventSaved);
        assert!(editor.error.is_none());
    }

    #[cfg(not(target_arch = "wasm32"))]
    mod background {
        use super::*;
        use std::time::{Duration, Instant};

        #[test]
        fn late_profile_after_leaving_is_discarded() {
            let spawner = Spawner::new().unwrap();
            let store = MemoryStore::new();
            let mut session = AuthSession::load(&store, StorageKeys::default());
            let mut page = AuthPage::new();
            page.profile_fetch = Some(spawner.spawn(|_scope| async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(MeResponse {
                    email: Some("ana@example.hr".into()),
                    ..Default::default()
                })
            }));

            page.leave();
            std::thread::sleep(Duration::from_millis(200));
            page.poll(&mut session, &store);

            assert!(page.profile.is_none());
            assert!(page.profile_error.is_none());
            assert!(!page.is_busy());
        }

        #[test]
        fn rejected_save_stays_on_the_form() {
            let spawner = Spawner::new().unwrap();
            let mut editor = EventEditor::new();
            editor.save = Some(spawner.spawn(|_scope| async {
                Err::<Value, _>(FetchError::status(400, Some("Invalid lat".into())))
            }));

            let deadline = Instant::now() + Duration::from_secs(5);
            let mut action = PageAction::None;
            while editor.is_busy() && Instant::now() < deadline {
                action = editor.poll();
                std::thread::sleep(Duration::from_millis(5));
            }

            assert!(!editor.is_busy());
            assert_eq!(action, PageAction::None);
            assert_eq!(editor.error.as_deref(), Some("Invalid lat"));
        }
    }
}
