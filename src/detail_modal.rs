//! Event detail modal
//!
//! Renders whatever the detail overlay resolved. Which event that is, and
//! what closing does to the URL, is decided by `hub_nav::DetailOverlay`.

use egui::{Color32, RichText, ScrollArea};

use hub_types::{format_date_ddmmyyyy, EventId, EventSummary};

use crate::map::view::category_color;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAction {
    None,
    Close,
    Edit(EventId),
}

/// May the signed-in user edit this event?
pub fn can_edit(event: &EventSummary, signed_in_email: Option<&str>) -> bool {
    match (event.creator_email.as_deref(), signed_in_email) {
        (Some(creator), Some(email)) => creator.trim().eq_ignore_ascii_case(email.trim()),
        _ => false,
    }
}

pub fn show(
    ctx: &egui::Context,
    event: &EventSummary,
    signed_in_email: Option<&str>,
) -> DetailAction {
    let mut action = DetailAction::None;
    let mut open = true;

    egui::Window::new(RichText::new(&event.name).strong())
        .id(egui::Id::new("event_detail_modal"))
        .open(&mut open)
        .collapsible(false)
        .resizable(true)
        .default_width(560.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label(
                    RichText::new(event.category.as_str())
                        .strong()
                        .color(category_color(event.category)),
                );
                if let Some(date) = &event.date {
                    ui.label(format!("Date: {}", format_date_ddmmyyyy(date)));
                }
                if let Some(location) = &event.location {
                    ui.label(location);
                }
            });
            if let Some(position) = event.coordinates() {
                ui.label(
                    RichText::new(format!("{:.5}, {:.5}", position.lat, position.lng))
                        .size(10.0)
                        .color(Color32::GRAY),
                );
            }
            ui.separator();

            ScrollArea::vertical()
                .id_salt("event_detail_body")
                .max_height(360.0)
                .show(ui, |ui| {
                    if let Some(link) = &event.facebook_link {
                        ui.horizontal(|ui| {
                            ui.label("Event page:");
                            ui.hyperlink(link);
                        });
                    }
                    if let Some(thumbnail) = &event.thumbnail {
                        ui.hyperlink_to("Image", thumbnail);
                    } else {
                        ui.label(RichText::new("No image").color(Color32::GRAY));
                    }

                    let description = event
                        .detailed_description
                        .as_ref()
                        .or(event.description.as_ref());
                    if let Some(text) = description {
                        ui.add_space(6.0);
                        ui.label(RichText::new("Description").strong());
                        ui.label(text);
                    }
                });

            ui.separator();
            ui.horizontal(|ui| {
                if can_edit(event, signed_in_email) && ui.button("Edit").clicked() {
                    action = DetailAction::Edit(event.id);
                }
                if ui.button("Close").clicked() {
                    action = DetailAction::Close;
                }
            });

            if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                action = DetailAction::Close;
            }
        });

    if !open {
        action = DetailAction::Close;
    }
    action
}
