//! Session-history contract.
//!
//! The browser implementation lives in the UI crate; [`MemoryHistory`] is the
//! in-process stand-in used by tests and native builds.
//!
//! Everything here is single-threaded: listeners are plain `FnMut` closures
//! invoked on the UI thread.

use std::cell::RefCell;
use std::rc::Rc;

/// Callback receiving the path after a back/forward transition.
pub type PathListener = Box<dyn FnMut(&str)>;

/// Wraps the browser's session-history primitive.
pub trait History {
    /// Path of the current entry.
    fn current_path(&self) -> String;

    /// Append a new entry without reloading the page.
    fn push(&self, path: &str);

    /// Listen for browser-initiated transitions (back/forward).
    ///
    /// The listener is called exactly once per transition with the new
    /// current path. Dropping the returned [`Subscription`] removes it.
    fn on_change(&self, listener: PathListener) -> Subscription;
}

/// Scoped listener registration. Deregisters on drop.
#[must_use = "dropping a Subscription removes the listener immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to release.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Deregister now.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

// =============================================================================
// IN-MEMORY HISTORY
// =============================================================================

#[derive(Default)]
struct MemoryInner {
    entries: Vec<String>,
    index: usize,
    listeners: Vec<(u64, PathListener)>,
    next_listener: u64,
    /// Set while listeners are out of the vec being called.
    dispatching: bool,
    /// Listeners cancelled during a dispatch.
    removed: Vec<u64>,
}

/// Entry stack with browser semantics: `push` truncates forward entries,
/// `back`/`forward` move the cursor and notify listeners.
///
/// Cloning shares the same stack.
#[derive(Clone)]
pub struct MemoryHistory {
    inner: Rc<RefCell<MemoryInner>>,
}

impl MemoryHistory {
    pub fn new(initial_path: &str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryInner {
                entries: vec![initial_path.to_string()],
                ..Default::default()
            })),
        }
    }

    /// Step back one entry. Returns false at the first entry.
    pub fn back(&self) -> bool {
        self.step(-1)
    }

    /// Step forward one entry. Returns false at the last entry.
    pub fn forward(&self) -> bool {
        self.step(1)
    }

    /// Number of entries in the stack.
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn step(&self, delta: isize) -> bool {
        let path = {
            let mut inner = self.inner.borrow_mut();
            let Some(target) = inner.index.checked_add_signed(delta) else {
                return false;
            };
            if target >= inner.entries.len() {
                return false;
            }
            inner.index = target;
            inner.entries[target].clone()
        };

        // Listeners run without the borrow held so they may read the history
        // or cancel their own subscription.
        let mut listeners = {
            let mut inner = self.inner.borrow_mut();
            inner.dispatching = true;
            std::mem::take(&mut inner.listeners)
        };
        for (_, listener) in listeners.iter_mut() {
            listener(&path);
        }
        let mut inner = self.inner.borrow_mut();
        inner.dispatching = false;
        let removed = std::mem::take(&mut inner.removed);
        listeners.retain(|(id, _)| !removed.contains(id));
        listeners.append(&mut inner.listeners);
        inner.listeners = listeners;
        true
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn current_path(&self) -> String {
        let inner = self.inner.borrow();
        inner.entries[inner.index].clone()
    }

    fn push(&self, path: &str) {
        let mut inner = self.inner.borrow_mut();
        let keep = inner.index + 1;
        inner.entries.truncate(keep);
        inner.entries.push(path.to_string());
        inner.index = keep;
    }

    fn on_change(&self, listener: PathListener) -> Subscription {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener;
            inner.next_listener += 1;
            inner.listeners.push((id, listener));
            id
        };

        let weak = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = inner.borrow_mut();
                inner.listeners.retain(|(lid, _)| *lid != id);
                if inner.dispatching {
                    inner.removed.push(id);
                }
            }
        })
    }
}
