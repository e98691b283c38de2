//! Airsoft Hub UI - event map, list and account pages
//!
//! The navigation and focus engine lives in `hub-nav`; this crate renders it
//! with egui and supplies the browser bindings (history, storage, fetch).

pub mod api;
pub mod app;
#[cfg(target_arch = "wasm32")]
pub mod browser;
pub mod config;
pub mod crash;
pub mod detail_modal;
pub mod map;
pub mod pages;
pub mod sidebar;
pub mod tasks;

pub use app::HubApp;

/// Id of the `<canvas>` in `web/index.html`.
pub const CANVAS_ID: &str = "airsoft_hub_canvas";

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    use wasm_bindgen::JsCast;

    crash::install();
    tracing_wasm::set_as_global_default();

    web_sys::console::log_1(&"=== AIRSOFT HUB UI LOADED ===".into());

    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CANVAS_ID))
        .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok());
    let Some(canvas) = canvas else {
        tracing::error!("start: no canvas with id {}", CANVAS_ID);
        crash::show_notice(&format!("missing <canvas id=\"{CANVAS_ID}\">"));
        return;
    };

    wasm_bindgen_futures::spawn_local(async move {
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(|cc| Ok(Box::new(HubApp::new(cc)))),
            )
            .await;
        if let Err(e) = started {
            tracing::error!("start: eframe failed: {:?}", e);
            crash::show_notice(&format!("Failed to start eframe: {e:?}"));
        }
    });
}
