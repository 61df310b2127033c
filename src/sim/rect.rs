//! Axis-aligned rectangle geometry
//!
//! Frames use view coordinates: `origin` is the top-left corner, +y grows
//! downward. Balls, bricks, the paddle and the playfield itself are all
//! described by these frames.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle (origin = top-left corner)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    /// Build a rect from its center point
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            origin: center - size / 2.0,
            size,
        }
    }

    #[inline]
    pub fn min_x(&self) -> f32 {
        self.origin.x
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.x
    }

    #[inline]
    pub fn min_y(&self) -> f32 {
        self.origin.y
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.y
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.size.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size / 2.0
    }

    /// Move the rect so its center lands on `center` (size unchanged)
    pub fn with_center(&self, center: Vec2) -> Self {
        Self::from_center(center, self.size)
    }

    /// Translate by a delta
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            origin: self.origin + delta,
            size: self.size,
        }
    }

    /// True if the rects overlap (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x() < other.max_x()
            && other.min_x() < self.max_x()
            && self.min_y() < other.max_y()
            && other.min_y() < self.max_y()
    }

    /// True if `point` lies inside (or on the edge of) the rect
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min_x()
            && point.x <= self.max_x()
            && point.y >= self.min_y()
            && point.y <= self.max_y()
    }
}
