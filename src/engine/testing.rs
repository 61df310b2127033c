//! Recording host used by unit tests
//!
//! Stands in for the platform engine: remembers every attach/boundary/impulse
//! call so tests can assert on the choreography, and lets tests script body
//! frames and velocities to simulate what the real engine would report.

use std::collections::HashMap;

use glam::Vec2;

use super::{BodyDesc, BodyId, BoundaryId, BoundaryShape, ItemParams, PhysicsHost};
use crate::sim::Rect;

#[derive(Debug, Default)]
pub(crate) struct TestHost {
    pub bodies: HashMap<BodyId, BodyDesc>,
    pub velocities: HashMap<BodyId, Vec2>,
    pub boundaries: HashMap<BoundaryId, BoundaryShape>,
    /// Every impulse ever applied, in order
    pub impulses: Vec<(BodyId, Vec2)>,
    pub gravity: Vec2,
    pub item_params: ItemParams,
}

impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the velocity the host will report for a body
    pub fn set_velocity(&mut self, id: BodyId, velocity: Vec2) {
        self.velocities.insert(id, velocity);
    }

    /// Script the frame the host will report for a body
    pub fn set_frame(&mut self, id: BodyId, frame: Rect) {
        if let Some(desc) = self.bodies.get_mut(&id) {
            desc.frame = frame;
        }
    }

    pub fn impulses_for(&self, id: BodyId) -> Vec<Vec2> {
        self.impulses
            .iter()
            .filter(|(body, _)| *body == id)
            .map(|(_, impulse)| *impulse)
            .collect()
    }
}

impl PhysicsHost for TestHost {
    fn attach_body(&mut self, id: BodyId, desc: BodyDesc) {
        self.bodies.insert(id, desc);
        self.velocities.entry(id).or_insert(Vec2::ZERO);
    }

    fn detach_body(&mut self, id: BodyId) {
        self.bodies.remove(&id);
        self.velocities.remove(&id);
    }

    fn upsert_boundary(&mut self, id: BoundaryId, shape: BoundaryShape) {
        self.boundaries.insert(id, shape);
    }

    fn remove_boundary(&mut self, id: BoundaryId) {
        self.boundaries.remove(&id);
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn set_item_params(&mut self, params: ItemParams) {
        self.item_params = params;
    }

    fn apply_impulse(&mut self, id: BodyId, impulse: Vec2) {
        self.impulses.push((id, impulse));
    }

    fn linear_velocity(&self, id: BodyId) -> Vec2 {
        self.velocities.get(&id).copied().unwrap_or(Vec2::ZERO)
    }

    fn body_frame(&self, id: BodyId) -> Option<Rect> {
        self.bodies.get(&id).map(|desc| desc.frame)
    }

    fn move_body(&mut self, id: BodyId, frame: Rect) {
        if let Some(desc) = self.bodies.get_mut(&id) {
            desc.frame = frame;
        }
    }
}
