//! Background requests bound to an owner's lifetime
//!
//! A spawned request writes its result into a shared slot that the owner
//! polls each frame (`Arc<Mutex<Option<..>>>`, as elsewhere in the app).
//! Dropping the [`InFlight`] handle aborts the request: on wasm through the
//! fetch's `AbortController`, natively by aborting the tokio task.

use std::future::Future;
use std::sync::{Arc, Mutex};

use hub_nav::FetchError;

pub type FetchResult<T> = Result<T, FetchError>;
type Slot<T> = Arc<Mutex<Option<FetchResult<T>>>>;

/// Per-request context handed to the API client.
#[derive(Clone, Default)]
pub struct RequestScope {
    #[cfg(target_arch = "wasm32")]
    signal: Option<web_sys::AbortSignal>,
}

impl RequestScope {
    #[cfg(target_arch = "wasm32")]
    pub fn signal(&self) -> Option<&web_sys::AbortSignal> {
        self.signal.as_ref()
    }

    /// True once the owning handle has aborted the request.
    pub fn is_aborted(&self) -> bool {
        #[cfg(target_arch = "wasm32")]
        {
            self.signal.as_ref().is_some_and(|s| s.aborted())
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            false
        }
    }
}

/// Handle to a running request.
pub struct InFlight<T> {
    slot: Slot<T>,
    #[cfg(target_arch = "wasm32")]
    controller: Option<web_sys::AbortController>,
    #[cfg(not(target_arch = "wasm32"))]
    task: tokio::task::JoinHandle<()>,
}

impl<T> InFlight<T> {
    /// Take the result if it has arrived.
    pub fn poll(&self) -> Option<FetchResult<T>> {
        self.slot.try_lock().ok().and_then(|mut g| g.take())
    }
}

impl<T> Drop for InFlight<T> {
    fn drop(&mut self) {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(controller) = &self.controller {
                controller.abort();
            }
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.task.abort();
        }
    }
}

fn store<T>(slot: &Slot<T>, result: FetchResult<T>) {
    match slot.lock() {
        Ok(mut guard) => *guard = Some(result),
        Err(_) => tracing::error!("tasks: result slot poisoned"),
    }
}

/// Spawns requests on the platform executor.
#[derive(Clone)]
pub struct Spawner {
    #[cfg(not(target_arch = "wasm32"))]
    runtime: Arc<tokio::runtime::Runtime>,
}

impl Spawner {
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Result<Self, String> {
        Ok(Self {})
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Result<Self, String> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(|e| format!("Failed to create tokio runtime: {e}"))?;
        Ok(Self {
            runtime: Arc::new(runtime),
        })
    }

    #[cfg(target_arch = "wasm32")]
    pub fn spawn<T, F, Fut>(&self, request: F) -> InFlight<T>
    where
        T: 'static,
        F: FnOnce(RequestScope) -> Fut,
        Fut: Future<Output = FetchResult<T>> + 'static,
    {
        let controller = web_sys::AbortController::new()
            .map_err(|e| tracing::warn!("tasks: no AbortController: {:?}", e))
            .ok();
        let scope = RequestScope {
            signal: controller.as_ref().map(|c| c.signal()),
        };

        let slot: Slot<T> = Arc::new(Mutex::new(None));
        let sink = slot.clone();
        let future = request(scope);
        wasm_bindgen_futures::spawn_local(async move {
            let result = future.await;
            store(&sink, result);
        });

        InFlight { slot, controller }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn<T, F, Fut>(&self, request: F) -> InFlight<T>
    where
        T: Send + 'static,
        F: FnOnce(RequestScope) -> Fut,
        Fut: Future<Output = FetchResult<T>> + Send + 'static,
    {
        let slot: Slot<T> = Arc::new(Mutex::new(None));
        let sink = slot.clone();
        let future = request(RequestScope::default());
        let task = self.runtime.spawn(async move {
            let result = future.await;
            store(&sink, result);
        });

        InFlight { slot, task }
    }
}
