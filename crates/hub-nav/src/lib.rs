//! Airsoft Hub navigation engine
//!
//! Platform-independent state machines behind the UI: the URL <-> route
//! codec, the history contract, the navigation controller, the shared event
//! directory, map focus coordination, the marker registry and the detail
//! overlay. Nothing here touches the DOM; the UI crate supplies browser
//! implementations of [`History`] and [`KeyValueStore`].
//!
//! # Frame model
//! - No callbacks reach into component state directly
//! - Browser transitions are queued and applied by [`NavigationController::sync`]
//! - Delayed focus steps are driven by [`FocusCoordinator::tick`] with frame time

pub mod config;
pub mod directory;
pub mod error;
pub mod focus;
pub mod history;
pub mod markers;
pub mod navigation;
pub mod overlay;
pub mod route;
pub mod session;

pub use config::{ApiConfig, FocusConfig, HubConfig, MapConfig, StorageKeys};
pub use directory::{date_then_name, EntityDirectory, LoadOutcome, LoadStatus, LoadTicket};
pub use error::{ConfigError, FetchError};
pub use focus::{FocusCoordinator, FocusEffects, FocusRequest, FocusTokens, MapViewport};
pub use history::{History, MemoryHistory, PathListener, Subscription};
pub use markers::{MarkerHandle, MarkerRegistry, Registration};
pub use navigation::NavigationController;
pub use overlay::{DetailOverlay, DetailRouter};
pub use route::{decode, encode, Page, Route};
pub use session::{AuthSession, KeyValueStore, MemoryStore};
