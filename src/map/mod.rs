//! Event map
//!
//! - `animation` - springs for camera moves
//! - `camera` - Web Mercator camera, implements the focus viewport
//! - `view` - markers, callouts, category filter

pub mod animation;
pub mod camera;
pub mod view;

pub use camera::MapCamera;
pub use view::{MapAction, MapMarker, MapView};
