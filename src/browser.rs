//! Browser bindings: session history and `localStorage`
//!
//! WASM only. Native builds use `hub_nav::MemoryHistory` and
//! `hub_nav::MemoryStore` instead.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Storage, Window};

use hub_nav::{History, KeyValueStore, PathListener, Subscription};

/// `window.history` + `popstate`.
#[derive(Clone)]
pub struct BrowserHistory {
    window: Option<Window>,
}

impl Default for BrowserHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserHistory {
    pub fn new() -> Self {
        let window = web_sys::window();
        if window.is_none() {
            tracing::warn!("browser: no window, history disabled");
        }
        Self { window }
    }
}

fn pathname(window: &Window) -> String {
    window
        .location()
        .pathname()
        .unwrap_or_else(|_| "/".to_string())
}

impl History for BrowserHistory {
    fn current_path(&self) -> String {
        self.window
            .as_ref()
            .map(pathname)
            .unwrap_or_else(|| "/".to_string())
    }

    fn push(&self, path: &str) {
        let Some(window) = &self.window else {
            return;
        };
        let pushed = window
            .history()
            .and_then(|h| h.push_state_with_url(&JsValue::NULL, "", Some(path)));
        if let Err(e) = pushed {
            tracing::warn!("browser: pushState({}) failed: {:?}", path, e);
        }
    }

    fn on_change(&self, mut listener: PathListener) -> Subscription {
        let Some(window) = self.window.clone() else {
            return Subscription::detached();
        };

        let source = window.clone();
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |_event: web_sys::Event| {
            listener(&pathname(&source));
        });

        if let Err(e) = window
            .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
        {
            tracing::warn!("browser: popstate listener not installed: {:?}", e);
            return Subscription::detached();
        }

        Subscription::new(move || {
            let _ = window
                .remove_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
            drop(closure);
        })
    }
}

/// `window.localStorage`. Storage failures (private mode, quota) are logged
/// and otherwise ignored.
pub struct LocalStorageStore {
    storage: Option<Storage>,
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStorageStore {
    pub fn new() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            tracing::warn!("browser: localStorage unavailable, session will not persist");
        }
        Self { storage }
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.set_item(key, value) {
                tracing::warn!("browser: localStorage.setItem({}) failed: {:?}", key, e);
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.remove_item(key) {
                tracing::warn!("browser: localStorage.removeItem({}) failed: {:?}", key, e);
            }
        }
    }
}
