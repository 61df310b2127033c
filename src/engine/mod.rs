//! Host dynamics engine abstraction
//!
//! The continuous simulation (gravity integration, contact solving, elastic
//! bounce) is owned by the host platform; this crate only choreographs it.
//! [`PhysicsHost`] is the surface that choreography runs against: bodies and
//! boundaries are referenced by opaque handles allocated on our side, so the
//! host never needs to key anything off entity identity.
//!
//! The host drives us back through [`EngineEvent`]s, delivered synchronously
//! on the same scheduling domain as user input. There is no concurrent
//! mutation: every callback runs to completion before the next one.

#[cfg(test)]
pub(crate) mod testing;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::Rect;

/// Handle for a dynamic body attached to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Handle for a named immovable collision boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundaryId(pub u32);

/// Shape of a collision boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundaryShape {
    /// Solid rectangle (bricks, paddle before first launch)
    Rect(Rect),
    /// Solid ellipse inscribed in the frame (paddle after first launch)
    Ellipse(Rect),
    /// The inside edges of the frame act as walls (playfield border)
    Edges(Rect),
}

/// Collision shape of a dynamic body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionShape {
    Rect,
    Ellipse,
}

/// Descriptor for attaching a body to the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub frame: Rect,
    pub shape: CollisionShape,
}

/// Dynamic item parameters applied to all attached bodies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemParams {
    /// Bounce energy retention (1.0 = perfectly elastic)
    pub elasticity: f32,
    pub friction: f32,
    pub resistance: f32,
    pub allows_rotation: bool,
}

impl Default for ItemParams {
    fn default() -> Self {
        Self {
            elasticity: 1.0,
            friction: 0.1,
            resistance: 0.0,
            allows_rotation: true,
        }
    }
}

/// Callback delivered by the host engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// A body began contact with a boundary
    CollisionBegan {
        body: BodyId,
        boundary: BoundaryId,
        at: Vec2,
    },
    /// One simulation step elapsed (the continuous action callback)
    Step,
}

/// The host engine surface
///
/// All calls are infallible: the host owns the simulation and resolves every
/// request by policy (unknown handles are ignored). An impulse is an
/// instantaneous velocity change; the host applies it exactly once and keeps
/// no residual force around.
pub trait PhysicsHost {
    /// Attach a body to gravity, collision and item dynamics
    fn attach_body(&mut self, id: BodyId, desc: BodyDesc);

    /// Remove a body from the simulation
    fn detach_body(&mut self, id: BodyId);

    /// Add or replace a boundary shape under a handle
    fn upsert_boundary(&mut self, id: BoundaryId, shape: BoundaryShape);

    /// Remove a boundary (no-op for unknown handles)
    fn remove_boundary(&mut self, id: BoundaryId);

    /// Set the global gravity vector (magnitude encoded in length)
    fn set_gravity(&mut self, gravity: Vec2);

    /// Set dynamic item parameters for all attached bodies
    fn set_item_params(&mut self, params: ItemParams);

    /// Apply an instantaneous one-shot impulse to a body
    fn apply_impulse(&mut self, id: BodyId, impulse: Vec2);

    /// Current velocity of a body (zero for unknown handles)
    fn linear_velocity(&self, id: BodyId) -> Vec2;

    /// Current simulated frame of a body
    fn body_frame(&self, id: BodyId) -> Option<Rect>;

    /// Teleport a body to a frame (ball placement on spawn/restore)
    fn move_body(&mut self, id: BodyId, frame: Rect);
}
