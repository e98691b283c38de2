//! Spring-based animation for camera moves
//!
//! Critically-damped springs: the camera glides to its target without
//! overshoot. Values are polled each frame; call `tick(dt)` once per frame
//! before reading.

/// Spring configuration parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    /// Stiffness (higher = faster response). Typical: 80-300
    pub stiffness: f64,
    /// Damping ratio: 1.0 = critically damped (no overshoot)
    pub damping: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl SpringConfig {
    /// Panning, scroll zoom.
    pub const FAST: Self = Self {
        stiffness: 300.0,
        damping: 1.0,
    };
    /// Fly-to.
    pub const MEDIUM: Self = Self {
        stiffness: 120.0,
        damping: 1.0,
    };
    pub const SLOW: Self = Self {
        stiffness: 60.0,
        damping: 1.0,
    };
}

/// Animated f64 value with spring physics
#[derive(Debug, Clone)]
pub struct SpringF64 {
    current: f64,
    target: f64,
    velocity: f64,
    config: SpringConfig,
}

impl SpringF64 {
    pub fn new(initial: f64) -> Self {
        Self::with_config(initial, SpringConfig::MEDIUM)
    }

    pub fn with_config(initial: f64, config: SpringConfig) -> Self {
        Self {
            current: initial,
            target: initial,
            velocity: 0.0,
            config,
        }
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    /// Jump immediately to value (no animation)
    pub fn set_immediate(&mut self, value: f64) {
        self.current = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Advance by `dt` seconds.
    ///
    /// F = -k*x - c*v, with c = damping * 2 * sqrt(k).
    pub fn tick(&mut self, dt: f64) {
        // Large steps (tab in background) would destabilise the integration.
        let dt = dt.min(0.1);

        let displacement = self.current - self.target;
        let spring_force = -self.config.stiffness * displacement;
        let damping_force =
            -self.config.damping * 2.0 * self.config.stiffness.sqrt() * self.velocity;
        let acceleration = spring_force + damping_force;

        self.velocity += acceleration * dt;
        self.current += self.velocity * dt;

        if (self.current - self.target).abs() < 1e-9 && self.velocity.abs() < 1e-8 {
            self.current = self.target;
            self.velocity = 0.0;
        }
    }

    pub fn get(&self) -> f64 {
        self.current
    }

    pub fn is_animating(&self) -> bool {
        (self.current - self.target).abs() > 1e-9 || self.velocity.abs() > 1e-8
    }

    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }
}

/// Animated 2D point
#[derive(Debug, Clone)]
pub struct SpringPoint {
    pub x: SpringF64,
    pub y: SpringF64,
}

impl SpringPoint {
    pub fn with_config(x: f64, y: f64, config: SpringConfig) -> Self {
        Self {
            x: SpringF64::with_config(x, config),
            y: SpringF64::with_config(y, config),
        }
    }

    pub fn set_target(&mut self, x: f64, y: f64) {
        self.x.set_target(x);
        self.y.set_target(y);
    }

    pub fn target(&self) -> (f64, f64) {
        (self.x.target(), self.y.target())
    }

    pub fn set_immediate(&mut self, x: f64, y: f64) {
        self.x.set_immediate(x);
        self.y.set_immediate(y);
    }

    pub fn tick(&mut self, dt: f64) {
        self.x.tick(dt);
        self.y.tick(dt);
    }

    pub fn get(&self) -> (f64, f64) {
        (self.x.get(), self.y.get())
    }

    pub fn is_animating(&self) -> bool {
        self.x.is_animating() || self.y.is_animating()
    }

    pub fn set_config(&mut self, config: SpringConfig) {
        self.x.set_config(config);
        self.y.set_config(config);
    }
}
