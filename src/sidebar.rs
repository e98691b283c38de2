//! Left sidebar: page navigation and the date-sorted event list
//!
//! Clicking an event asks the app to show the map and focus that event.

use egui::{Color32, RichText, ScrollArea};

use hub_nav::{EntityDirectory, LoadStatus, Page, Route};
use hub_types::{format_date_ddmmyyyy, EventId};

use crate::map::view::category_color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarAction {
    None,
    Navigate(Page),
    Focus(EventId),
    Retry,
}

/// Sidebar state
#[derive(Default)]
pub struct Sidebar {
    /// Last event clicked, highlighted in the list
    highlighted: Option<EventId>,
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        route: Route,
        directory: &EntityDirectory,
        signed_in: bool,
    ) -> SidebarAction {
        let mut action = SidebarAction::None;

        ui.label(RichText::new("Navigation").strong().size(12.0));
        ui.add_space(4.0);
        for page in Page::all() {
            let label = match page {
                Page::Auth if !signed_in => "Sign in",
                Page::CreateEvent if !signed_in => continue,
                _ => page.display_name(),
            };
            if ui
                .selectable_label(route.page() == *page, label)
                .clicked()
            {
                action = SidebarAction::Navigate(*page);
            }
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.label(RichText::new("Events").strong().size(12.0));
            if directory.is_loading() {
                ui.spinner();
            }
        });

        if let LoadStatus::Failed(message) = directory.status() {
            ui.colored_label(Color32::from_rgb(220, 53, 69), format!("Error: {message}"));
            if ui.button("Retry").clicked() {
                action = SidebarAction::Retry;
            }
        }

        let sorted = directory.sorted();
        if sorted.is_empty() && !directory.is_loading() {
            ui.label(RichText::new("No events found.").color(Color32::GRAY));
            return action;
        }

        ScrollArea::vertical()
            .id_salt("sidebar_events")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for event in sorted.iter() {
                    let selected = self.highlighted == Some(event.id);
                    let response = ui
                        .selectable_label(selected, RichText::new(&event.name).strong())
                        .on_hover_text(event.location.as_deref().unwrap_or("Show on map"));
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(event.category.as_str())
                                .size(10.0)
                                .color(category_color(event.category)),
                        );
                        let date = event
                            .date
                            .as_deref()
                            .map(format_date_ddmmyyyy)
                            .unwrap_or_else(|| "No date".to_string());
                        ui.label(RichText::new(date).size(10.0).color(Color32::GRAY));
                    });
                    ui.add_space(2.0);

                    if response.clicked() {
                        self.highlighted = Some(event.id);
                        action = SidebarAction::Focus(event.id);
                    }
                }
            });

        action
    }
}
