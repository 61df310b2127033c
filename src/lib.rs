//! Brickout - a touchscreen Breakout orchestration core
//!
//! The actual rigid-body simulation (integration, contact solving) is owned
//! by a host engine outside this crate; we drive it through [`engine::PhysicsHost`].
//!
//! Core modules:
//! - `engine`: host dynamics engine abstraction (bodies, boundaries, events)
//! - `sim`: game entities, behavior composition and the controller state machine
//! - `settings`: persisted gameplay configuration
//!
//! Coordinates are view coordinates: origin at the top-left of the playfield,
//! +x right, +y down. "Up" is therefore angle -π/2.

pub mod engine;
pub mod settings;
pub mod sim;

pub use settings::{MemoryStore, Settings, SettingsStore};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Ball diameter in playfield points
    pub const BALL_SIZE: f32 = 20.0;
    /// Paddle height (fixed; width comes from the divisor table)
    pub const PADDLE_HEIGHT: f32 = 15.0;
    /// Acceptable paddle widths (inclusive bounds on the divisor table)
    pub const PADDLE_MIN_WIDTH: u32 = 20;
    pub const PADDLE_MAX_WIDTH: u32 = 200;
    /// Acceptable paddle speeds, in playfield points per pan event
    pub const PADDLE_MIN_SPEED: u32 = 8;
    pub const PADDLE_MAX_SPEED: u32 = 200;
    /// Pan velocity is divided by this before moving the paddle
    pub const PAN_DAMPING: f32 = 20.0;

    /// Brick grid
    pub const BRICK_COLUMNS: usize = 6;
    pub const BRICK_HEIGHT: f32 = 20.0;
    /// Distance of the first brick row from the playfield top
    pub const TOP_BRICK_OFFSET: f32 = 100.0;
    /// Simulation steps a destroyed brick spends fading out
    pub const BRICK_FADE_STEPS: u8 = 3;

    /// Push jitter half-angles (radians)
    pub const PUSH_OPPOSITE_JITTER: f32 = 30.0 * std::f32::consts::PI / 180.0;
    pub const PUSH_UPWARD_JITTER: f32 = 15.0 * std::f32::consts::PI / 180.0;
    /// Magnitude used when re-pushing a restored ball
    pub const PUSH_RESTORE_MAGNITUDE: f32 = 0.1;

    /// Push magnitude by playfield height, scanned largest threshold first.
    /// Taller playfields need proportionally larger impulses to reach the bricks.
    pub const PUSH_MAGNITUDES: &[(f32, f32)] = &[
        (2048.0, 0.40),
        (1024.0, 0.35),
        (736.0, 0.30),
        (568.0, 0.20),
    ];
    /// Fallback magnitude for playfields shorter than every threshold
    pub const PUSH_MAGNITUDE_DEFAULT: f32 = 0.15;
}

/// Normalize an angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for an angle (view coordinates, +y down)
#[inline]
pub fn vec_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle of a vector in [-π, π)
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(-3.0 * PI) - (-PI)).abs() < 1e-5);
        assert!((normalize_angle(PI / 4.0) - PI / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_angle_round_trip() {
        let angle = -PI / 3.0;
        assert!((angle_of(vec_from_angle(angle)) - angle).abs() < 1e-5);
    }
}
