//! Map view - markers, callouts and category filter chips
//!
//! Markers are mounted for every event that has a position and passes the
//! category filter. Mounting registers the marker in the shared
//! [`MarkerRegistry`]; unmounting releases exactly that registration. The
//! base layer (tiles) is out of scope: a graticule stands in for it.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use egui::{Align2, Color32, Pos2, RichText, Sense, Stroke};

use hub_nav::{MapConfig, MarkerHandle, MarkerRegistry, Registration};
use hub_types::{format_date_ddmmyyyy, Category, EventId, EventSummary, LatLng};

use super::camera::MapCamera;

const MARKER_RADIUS: f32 = 7.0;
const HIT_RADIUS: f32 = 12.0;
const BACKGROUND: Color32 = Color32::from_rgb(22, 27, 24);
const GRID: Color32 = Color32::from_rgb(40, 48, 42);

/// On-map marker. Opening its callout marks it as the view's open callout.
#[derive(Debug, Clone)]
pub struct MapMarker {
    event_id: EventId,
    open_callout: Rc<Cell<Option<EventId>>>,
}

impl MarkerHandle for MapMarker {
    fn open_callout(&self) {
        self.open_callout.set(Some(self.event_id));
    }
}

/// What the user did on the map this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapAction {
    None,
    /// "Details" pressed in a callout.
    ShowDetails(EventId),
}

/// Marker mount/unmount work for one frame.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MarkerPlan {
    pub mount: Vec<EventId>,
    pub unmount: Vec<EventId>,
}

/// Diff the mounted set against the ids that should be on the map.
pub fn plan_markers(mounted: &HashSet<EventId>, wanted: &[EventId]) -> MarkerPlan {
    let wanted_set: HashSet<EventId> = wanted.iter().copied().collect();
    let mut unmount: Vec<EventId> = mounted
        .iter()
        .filter(|id| !wanted_set.contains(id))
        .copied()
        .collect();
    unmount.sort_unstable();

    let mut seen = HashSet::new();
    let mount = wanted
        .iter()
        .copied()
        .filter(|id| !mounted.contains(id) && seen.insert(*id))
        .collect();
    MarkerPlan { mount, unmount }
}

pub fn category_color(category: Category) -> Color32 {
    match category {
        Category::TwentyFourHour => Color32::from_rgb(220, 53, 69),
        Category::TwelveHour => Color32::from_rgb(253, 126, 20),
        Category::Skirmish => Color32::from_rgb(11, 94, 215),
    }
}

pub struct MapView {
    camera: MapCamera,
    filter: Option<Category>,
    open_callout: Rc<Cell<Option<EventId>>>,
    mounted: HashMap<EventId, Registration>,
}

impl MapView {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            camera: MapCamera::new(config),
            filter: None,
            open_callout: Rc::new(Cell::new(None)),
            mounted: HashMap::new(),
        }
    }

    pub fn camera_mut(&mut self) -> &mut MapCamera {
        &mut self.camera
    }

    pub fn filter(&self) -> Option<Category> {
        self.filter
    }

    /// The focus coordinator clears this to reveal its target.
    pub fn filter_mut(&mut self) -> &mut Option<Category> {
        &mut self.filter
    }

    /// Filter and camera together, for the focus coordinator.
    pub fn focus_target(&mut self) -> (&mut Option<Category>, &mut MapCamera) {
        (&mut self.filter, &mut self.camera)
    }

    pub fn open_callout(&self) -> Option<EventId> {
        self.open_callout.get()
    }

    pub fn close_callout(&self) {
        self.open_callout.set(None);
    }

    fn shows(&self, event: &EventSummary) -> bool {
        event.coordinates().is_some() && self.filter.map_or(true, |f| f == event.category)
    }

    /// Mount and unmount markers so the registry matches `events` under the
    /// current filter.
    pub fn sync_markers(
        &mut self,
        events: &[EventSummary],
        registry: &mut MarkerRegistry<MapMarker>,
    ) {
        let wanted: Vec<EventId> = events
            .iter()
            .filter(|e| self.shows(e))
            .map(|e| e.id)
            .collect();
        let mounted: HashSet<EventId> = self.mounted.keys().copied().collect();
        let plan = plan_markers(&mounted, &wanted);

        for event_id in plan.unmount {
            self.unmount(event_id, registry);
        }
        for event_id in plan.mount {
            let marker = MapMarker {
                event_id,
                open_callout: self.open_callout.clone(),
            };
            let registration = registry.register(event_id, marker);
            self.mounted.insert(event_id, registration);
        }
    }

    /// Release every marker (the map is leaving the screen).
    pub fn unmount_all(&mut self, registry: &mut MarkerRegistry<MapMarker>) {
        let ids: Vec<EventId> = self.mounted.keys().copied().collect();
        for event_id in ids {
            self.unmount(event_id, registry);
        }
    }

    fn unmount(&mut self, event_id: EventId, registry: &mut MarkerRegistry<MapMarker>) {
        if let Some(registration) = self.mounted.remove(&event_id) {
            registry.release(registration);
        }
        if self.open_callout.get() == Some(event_id) {
            self.open_callout.set(None);
        }
    }

    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    // =========================================================================
    // RENDERING
    // =========================================================================

    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        events: &[EventSummary],
        registry: &mut MarkerRegistry<MapMarker>,
    ) -> MapAction {
        self.filter_chips(ui);
        ui.add_space(4.0);

        let dt = ui.input(|i| i.stable_dt) as f64;
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        self.camera.set_viewport(rect);
        self.camera.update(dt);

        if response.dragged() {
            self.camera.drag(response.drag_delta());
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll.abs() > f32::EPSILON {
                let anchor = ui
                    .input(|i| i.pointer.hover_pos())
                    .unwrap_or_else(|| rect.center());
                self.camera.zoom_at(scroll as f64 / 240.0, anchor);
            }
        }

        self.sync_markers(events, registry);

        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKGROUND);
        self.paint_graticule(&painter);

        let pointer = response.interact_pointer_pos();
        let mut hit: Option<(EventId, f32)> = None;
        for event in events.iter().filter(|e| self.mounted.contains_key(&e.id)) {
            let Some(position) = event.coordinates() else {
                continue;
            };
            let p = self.camera.to_screen(position);
            if !rect.expand(MARKER_RADIUS).contains(p) {
                continue;
            }
            let open = self.open_callout.get() == Some(event.id);
            let radius = if open { MARKER_RADIUS + 2.0 } else { MARKER_RADIUS };
            painter.circle(
                p,
                radius,
                category_color(event.category),
                Stroke::new(1.5, Color32::WHITE),
            );

            if let Some(pointer) = pointer {
                let d = pointer.distance(p);
                if d <= HIT_RADIUS && hit.map_or(true, |(_, best)| d < best) {
                    hit = Some((event.id, d));
                }
            }
        }

        if response.clicked() {
            match hit {
                Some((event_id, _)) => {
                    if let Some(marker) = registry.lookup(event_id) {
                        marker.open_callout();
                    }
                }
                None => self.close_callout(),
            }
        }

        let action = self.callout(ui, rect, events);

        if self.camera.is_animating() {
            ui.ctx().request_repaint();
        }
        action
    }

    fn filter_chips(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.selectable_label(self.filter.is_none(), "All").clicked() {
                self.filter = None;
            }
            for category in Category::all() {
                let text = RichText::new(category.as_str()).color(category_color(*category));
                if ui
                    .selectable_label(self.filter == Some(*category), text)
                    .clicked()
                {
                    self.filter = Some(*category);
                }
            }
        });
    }

    fn paint_graticule(&self, painter: &egui::Painter) {
        let rect = painter.clip_rect();
        let zoom = self.camera.current_zoom();
        let step = if zoom >= 9.0 {
            0.25
        } else if zoom >= 6.0 {
            1.0
        } else {
            10.0
        };

        let nw = self.camera.to_geo(rect.left_top());
        let se = self.camera.to_geo(rect.right_bottom());
        let stroke = Stroke::new(1.0, GRID);

        let mut lng = (nw.lng / step).floor() * step;
        while lng <= se.lng {
            let x = self.camera.to_screen(LatLng::new(nw.lat, lng)).x;
            painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
            lng += step;
        }
        let mut lat = (se.lat / step).floor() * step;
        while lat <= nw.lat {
            let y = self.camera.to_screen(LatLng::new(lat, nw.lng)).y;
            painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
            lat += step;
        }
    }

    fn callout(&mut self, ui: &egui::Ui, rect: egui::Rect, events: &[EventSummary]) -> MapAction {
        let Some(event_id) = self.open_callout.get() else {
            return MapAction::None;
        };
        let Some(event) = events.iter().find(|e| e.id == event_id) else {
            return MapAction::None;
        };
        let Some(position) = event.coordinates() else {
            return MapAction::None;
        };
        let anchor = self.camera.to_screen(position) - egui::vec2(0.0, MARKER_RADIUS + 4.0);
        if !rect.contains(anchor) {
            return MapAction::None;
        }

        let mut action = MapAction::None;
        let mut close = false;
        egui::Area::new(egui::Id::new(("map_callout", event_id)))
            .fixed_pos(anchor)
            .pivot(Align2::CENTER_BOTTOM)
            .order(egui::Order::Foreground)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(240.0);
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&event.name).strong());
                        if ui.small_button("x").clicked() {
                            close = true;
                        }
                    });
                    ui.label(
                        RichText::new(event.category.as_str())
                            .color(category_color(event.category))
                            .size(11.0),
                    );
                    if let Some(date) = &event.date {
                        ui.label(format!("Date: {}", format_date_ddmmyyyy(date)));
                    }
                    if let Some(location) = &event.location {
                        ui.label(location);
                    }
                    if let Some(description) = &event.description {
                        ui.label(RichText::new(description).size(11.0).color(Color32::GRAY));
                    }
                    if ui.button("Details").clicked() {
                        action = MapAction::ShowDetails(event_id);
                    }
                });
            });

        if close {
            self.close_callout();
        }
        action
    }
}
