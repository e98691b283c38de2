//! Map camera - Web Mercator pan/zoom with spring interpolation
//!
//! World coordinates are the Mercator unit square (x east, y south, both in
//! 0..1). At zoom `z` the world is `256 * 2^z` screen pixels wide, matching
//! slippy-map tile zoom levels.
//!
//! Call `update(dt)` at the start of the frame, then use the transforms.

use egui::{Pos2, Rect, Vec2};

use hub_nav::{MapConfig, MapViewport};
use hub_types::LatLng;

use super::animation::{SpringConfig, SpringF64, SpringPoint};

pub const TILE_SIZE: f64 = 256.0;

/// Mercator is undefined at the poles; clamp like every slippy map.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Geographic position to Mercator unit square.
pub fn project(p: LatLng) -> (f64, f64) {
    let x = (p.lng + 180.0) / 360.0;
    let lat = p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let y = 0.5 - ((1.0 + lat.sin()) / (1.0 - lat.sin())).ln() / (4.0 * std::f64::consts::PI);
    (x, y)
}

/// Mercator unit square to geographic position.
pub fn unproject(x: f64, y: f64) -> LatLng {
    let lng = x * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

#[derive(Debug, Clone)]
pub struct MapCamera {
    /// View centre in world coordinates (animated)
    center: SpringPoint,
    /// Zoom level (animated)
    zoom: SpringF64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Screen rect the map was last drawn in
    viewport: Rect,
}

impl MapCamera {
    pub fn new(config: &MapConfig) -> Self {
        let (x, y) = project(LatLng::new(config.center_lat, config.center_lng));
        let zoom = config.zoom.clamp(config.min_zoom, config.max_zoom);
        Self {
            center: SpringPoint::with_config(x, y, SpringConfig::MEDIUM),
            zoom: SpringF64::with_config(zoom, SpringConfig::MEDIUM),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            viewport: Rect::NOTHING,
        }
    }

    // =========================================================================
    // FRAME UPDATE
    // =========================================================================

    pub fn update(&mut self, dt: f64) {
        self.center.tick(dt);
        self.zoom.tick(dt);
    }

    pub fn is_animating(&self) -> bool {
        self.center.is_animating() || self.zoom.is_animating()
    }

    pub fn set_viewport(&mut self, rect: Rect) {
        self.viewport = rect;
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Current (animated) zoom.
    pub fn current_zoom(&self) -> f64 {
        self.zoom.get()
    }

    pub fn center(&self) -> LatLng {
        let (x, y) = self.center.get();
        unproject(x, y)
    }

    // =========================================================================
    // TRANSFORMS
    // =========================================================================

    pub fn to_screen(&self, p: LatLng) -> Pos2 {
        let (wx, wy) = project(p);
        let (cx, cy) = self.center.get();
        let scale = world_size(self.zoom.get());
        let c = self.viewport.center();
        Pos2::new(
            c.x + ((wx - cx) * scale) as f32,
            c.y + ((wy - cy) * scale) as f32,
        )
    }

    pub fn to_geo(&self, screen: Pos2) -> LatLng {
        let (cx, cy) = self.center.get();
        let scale = world_size(self.zoom.get());
        let offset = screen - self.viewport.center();
        unproject(
            cx + offset.x as f64 / scale,
            cy + offset.y as f64 / scale,
        )
    }

    // =========================================================================
    // USER INPUT
    // =========================================================================

    /// Drag the map; content follows the pointer.
    pub fn drag(&mut self, screen_delta: Vec2) {
        let scale = world_size(self.zoom.get());
        let (cx, cy) = self.center.get();
        let (x, y) = clamp_world(
            cx - screen_delta.x as f64 / scale,
            cy - screen_delta.y as f64 / scale,
        );
        self.center.set_immediate(x, y);
    }

    /// Zoom by `steps` levels keeping the point under `anchor` fixed.
    pub fn zoom_at(&mut self, steps: f64, anchor: Pos2) {
        let old_zoom = self.zoom.target();
        let new_zoom = (old_zoom + steps).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - old_zoom).abs() < 1e-6 {
            return;
        }

        let offset = anchor - self.viewport.center();
        let (tx, ty) = self.center.target();
        let old_scale = world_size(old_zoom);
        let new_scale = world_size(new_zoom);
        let ax = tx + offset.x as f64 / old_scale;
        let ay = ty + offset.y as f64 / old_scale;
        let (x, y) = clamp_world(
            ax - offset.x as f64 / new_scale,
            ay - offset.y as f64 / new_scale,
        );

        self.center.set_config(SpringConfig::FAST);
        self.zoom.set_config(SpringConfig::FAST);
        self.center.set_target(x, y);
        self.zoom.set_target(new_zoom);
    }
}

fn clamp_world(x: f64, y: f64) -> (f64, f64) {
    (x.clamp(0.0, 1.0), y.clamp(0.0, 1.0))
}

impl MapViewport for MapCamera {
    /// Zoom the camera is heading to.
    fn zoom(&self) -> f64 {
        self.zoom.target()
    }

    fn height(&self) -> f64 {
        if self.viewport.is_positive() {
            self.viewport.height() as f64
        } else {
            0.0
        }
    }

    fn fly_to(&mut self, target: LatLng, zoom: f64) {
        let (x, y) = project(target);
        self.center.set_config(SpringConfig::MEDIUM);
        self.zoom.set_config(SpringConfig::MEDIUM);
        self.center.set_target(x, y);
        self.zoom.set_target(zoom.clamp(self.min_zoom, self.max_zoom));
    }

    fn pan_by_pixels(&mut self, dx: f64, dy: f64) {
        let scale = world_size(self.zoom.target());
        let (tx, ty) = self.center.target();
        let (x, y) = clamp_world(tx + dx / scale, ty + dy / scale);
        self.center.set_target(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> MapCamera {
        let mut camera = MapCamera::new(&MapConfig::default());
        camera.set_viewport(Rect::from_min_size(Pos2::ZERO, egui::vec2(800.0, 600.0)));
        camera
    }

    fn settle(camera: &mut MapCamera) {
        for _ in 0..1200 {
            camera.update(1.0 / 60.0);
        }
    }

    #[test]
    fn projection_round_trip() {
        for p in [
            LatLng::new(45.81, 15.98),
            LatLng::new(-33.86, 151.21),
            LatLng::new(0.0, 0.0),
            LatLng::new(64.14, -21.94),
        ] {
            let (x, y) = project(p);
            let back = unproject(x, y);
            assert!((back.lat - p.lat).abs() < 1e-9, "{p:?} -> {back:?}");
            assert!((back.lng - p.lng).abs() < 1e-9);
        }
        assert_eq!(project(LatLng::new(0.0, 0.0)), (0.5, 0.5));
    }

    #[test]
    fn centre_maps_to_viewport_centre() {
        let camera = camera();
        let p = camera.to_screen(camera.center());
        assert!((p.x - 400.0).abs() < 1e-3);
        assert!((p.y - 300.0).abs() < 1e-3);

        let geo = camera.to_geo(Pos2::new(400.0, 300.0));
        assert!((geo.lat - 45.1).abs() < 1e-6);
    }

    #[test]
    fn fly_to_clamps_zoom_and_settles() {
        let mut camera = camera();
        let target = LatLng::new(43.51, 16.44);
        camera.fly_to(target, 30.0);
        assert_eq!(MapViewport::zoom(&camera), 18.0);

        settle(&mut camera);
        assert!(!camera.is_animating());
        assert!((camera.center().lat - target.lat).abs() < 1e-6);
        assert!((camera.current_zoom() - 18.0).abs() < 1e-6);
    }

    #[test]
    fn negative_dy_moves_content_down() {
        let mut camera = camera();
        let before = camera.to_screen(camera.center());
        camera.pan_by_pixels(0.0, -100.0);
        settle(&mut camera);
        let after = camera.to_screen(LatLng::new(45.1, 15.2));
        assert!((after.y - before.y - 100.0).abs() < 0.5);
        assert_eq!(MapViewport::height(&camera), 600.0);
    }

    #[test]
    fn zoom_at_keeps_anchor_fixed() {
        let mut camera = camera();
        let anchor = Pos2::new(600.0, 150.0);
        let geo = camera.to_geo(anchor);
        camera.zoom_at(2.0, anchor);
        settle(&mut camera);
        let p = camera.to_screen(geo);
        assert!((p.x - anchor.x).abs() < 0.5);
        assert!((p.y - anchor.y).abs() < 0.5);
    }
}
