//! Marker registry - live mapping from event id to its on-map marker.
//!
//! Mutated only by the map's marker mount/unmount lifecycle; read by the
//! focus coordinator to open callouts.

use std::collections::HashMap;

use hub_types::EventId;

/// Opaque reference to an on-map marker.
pub trait MarkerHandle {
    /// Open the marker's callout (popup).
    fn open_callout(&self);
}

/// Receipt for one `register` call, used to release exactly that entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Registration {
    event_id: EventId,
    serial: u64,
}

impl Registration {
    pub fn event_id(&self) -> EventId {
        self.event_id
    }
}

#[derive(Debug)]
pub struct MarkerRegistry<M> {
    entries: HashMap<EventId, (u64, M)>,
    next_serial: u64,
}

impl<M> Default for MarkerRegistry<M> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_serial: 0,
        }
    }
}

impl<M> MarkerRegistry<M> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mounted marker. A second registration for the same id
    /// replaces the first.
    pub fn register(&mut self, event_id: EventId, handle: M) -> Registration {
        let serial = self.next_serial;
        self.next_serial += 1;
        if self.entries.insert(event_id, (serial, handle)).is_some() {
            tracing::debug!("markers: event {} re-registered", event_id);
        }
        Registration { event_id, serial }
    }

    /// Remove whatever marker is registered for `event_id`.
    pub fn unregister(&mut self, event_id: EventId) -> Option<M> {
        self.entries.remove(&event_id).map(|(_, handle)| handle)
    }

    /// Remove the entry only if it is still the one `registration` created.
    ///
    /// An unmount that lands after a newer mount of the same id leaves the
    /// newer marker in place.
    pub fn release(&mut self, registration: Registration) -> bool {
        match self.entries.get(&registration.event_id) {
            Some((serial, _)) if *serial == registration.serial => {
                self.entries.remove(&registration.event_id);
                true
            }
            _ => false,
        }
    }

    pub fn lookup(&self, event_id: EventId) -> Option<&M> {
        self.entries.get(&event_id).map(|(_, handle)| handle)
    }

    pub fn contains(&self, event_id: EventId) -> bool {
        self.entries.contains_key(&event_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
