//! The player's paddle
//!
//! Width is not free-form: the available widths are the integer divisors of
//! the playfield width inside an acceptable range, so a row of paddles always
//! tiles the playfield exactly. Speed (the per-gesture movement cap) is
//! derived the same way from the current width.

use glam::Vec2;

use super::rect::Rect;
use crate::consts::*;

#[derive(Debug, Clone)]
pub struct Paddle {
    /// Left edge of the paddle
    origin_x: f32,
    /// Divisor-derived width table, ascending
    widths: Vec<u32>,
    width_index: usize,
    /// Divisor-derived speed table for the current width, ascending
    speeds: Vec<u32>,
    current_speed: u32,
    playfield: Rect,
}

impl Paddle {
    /// Create a paddle centered in the playfield at its default width
    pub fn new(playfield: Rect) -> Self {
        let widths = divisors_in_range(
            playfield.width() as u32,
            PADDLE_MIN_WIDTH,
            PADDLE_MAX_WIDTH,
        );
        debug_assert!(!widths.is_empty(), "playfield too narrow for any paddle");

        // Approximate table midpoint; ceil sits better on odd-sized tables
        let width_index = ((widths.len() - 1) as f32 / 2.0).ceil() as usize;
        let width = widths[width_index];
        let speeds = speeds_for_width(width);
        let current_speed = speeds[0];

        let mut paddle = Self {
            origin_x: 0.0,
            widths,
            width_index,
            speeds,
            current_speed,
            playfield,
        };
        paddle.origin_x = paddle.snapped_origin_x(playfield.center().x);
        log::debug!(
            "paddle widths: {:?}, current: {}",
            paddle.widths,
            paddle.width()
        );
        paddle
    }

    /// Current width in playfield points
    pub fn width(&self) -> u32 {
        self.widths[self.width_index]
    }

    /// All acceptable widths for this playfield
    pub fn available_widths(&self) -> &[u32] {
        &self.widths
    }

    /// Current per-gesture movement cap
    pub fn current_speed(&self) -> u32 {
        self.current_speed
    }

    pub fn available_speeds(&self) -> &[u32] {
        &self.speeds
    }

    /// Paddle frame, resting on the playfield bottom edge
    pub fn frame(&self) -> Rect {
        Rect::new(
            self.origin_x,
            self.playfield.max_y() - PADDLE_HEIGHT,
            self.width() as f32,
            PADDLE_HEIGHT,
        )
    }

    pub fn center(&self) -> Vec2 {
        self.frame().center()
    }

    /// Move horizontally from a pan gesture velocity.
    ///
    /// Displacement is the damped pan velocity, capped at the current speed,
    /// with the final center clamped so the paddle never crosses the
    /// playfield's left or right edge. Returns true if the paddle moved.
    pub fn move_by_pan(&mut self, pan_velocity_x: f32) -> bool {
        let cap = self.current_speed as f32;
        let delta = (pan_velocity_x / PAN_DAMPING).clamp(-cap, cap);
        if delta == 0.0 {
            return false;
        }

        let half_width = self.width() as f32 / 2.0;
        let mut new_center_x = self.frame().center().x + delta;

        if new_center_x - half_width <= self.playfield.min_x() {
            new_center_x = self.playfield.min_x() + half_width;
        } else if new_center_x + half_width >= self.playfield.max_x() {
            new_center_x = self.playfield.max_x() - half_width;
        }

        let new_origin = new_center_x - half_width;
        let moved = new_origin != self.origin_x;
        self.origin_x = new_origin;
        moved
    }

    /// Step down one width in the table; no-op at the narrow end
    pub fn decrease_width(&mut self) -> bool {
        if self.width_index == 0 {
            return false;
        }
        let center_x = self.frame().center().x;
        self.width_index -= 1;
        self.apply_resize(center_x);
        true
    }

    /// Step up one width in the table; no-op at the wide end
    pub fn increase_width(&mut self) -> bool {
        if self.width_index + 1 >= self.widths.len() {
            return false;
        }
        let center_x = self.frame().center().x;
        self.width_index += 1;
        self.apply_resize(center_x);
        true
    }

    fn apply_resize(&mut self, center_x: f32) {
        self.speeds = speeds_for_width(self.width());
        self.current_speed = self.speeds[0];
        self.origin_x = self.snapped_origin_x(center_x);
    }

    /// Snap an origin to the paddle-width grid so the frame stays aligned
    /// with the columns the width divides the playfield into
    fn snapped_origin_x(&self, center_x: f32) -> f32 {
        let width = self.width() as f32;
        self.playfield.min_x() + ((center_x - self.playfield.min_x()) / width).floor() * width
    }
}

/// Divisors of `n` within `[lo, hi]`, ascending
fn divisors_in_range(n: u32, lo: u32, hi: u32) -> Vec<u32> {
    (1..=n)
        .filter(|step| n % step == 0 && (lo..=hi).contains(step))
        .collect()
}

fn speeds_for_width(width: u32) -> Vec<u32> {
    let speeds = divisors_in_range(width, PADDLE_MIN_SPEED, PADDLE_MAX_SPEED);
    if speeds.is_empty() {
        // Width with no acceptable divisor: fall back to the minimum speed
        vec![PADDLE_MIN_SPEED]
    } else {
        speeds
    }
}
