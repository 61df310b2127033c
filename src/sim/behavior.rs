//! Behavior composition over the host engine
//!
//! One place that coordinates the three sub-behaviors the game needs from the
//! host: gravity, collision boundaries and item dynamics. Boundary handles
//! are allocated here and mapped back to game entities through
//! [`BoundaryKey`], so collision callbacks resolve without relying on any
//! kind of object identity.
//!
//! Push impulses also live here. A push is one-shot by contract: the host
//! applies it instantaneously and keeps no residual force attached to the
//! ball.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::rect::Rect;
use crate::consts::*;
use crate::engine::{
    BodyDesc, BodyId, BoundaryId, BoundaryShape, CollisionShape, ItemParams, PhysicsHost,
};
use crate::settings::Settings;
use crate::{angle_of, normalize_angle, vec_from_angle};

/// What a collision boundary stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryKey {
    /// The playfield's edge walls
    Playfield,
    /// The paddle outline (rect before first launch, ellipse after)
    Paddle,
    /// One brick, by brick id
    Brick(u32),
}

/// Gravity + collision + item dynamics, composed
pub struct GameBehavior<H: PhysicsHost> {
    /// The host engine; exposed so the controller can query body state
    pub host: H,
    playfield: Rect,
    gravity_magnitude: f32,
    items: ItemParams,
    boundaries: HashMap<BoundaryKey, BoundaryId>,
    keys: HashMap<BoundaryId, BoundaryKey>,
    next_boundary: u32,
    next_body: u32,
    rng: Pcg32,
}

impl<H: PhysicsHost> GameBehavior<H> {
    pub fn new(mut host: H, playfield: Rect, settings: &Settings, seed: u64) -> Self {
        let items = ItemParams {
            elasticity: settings.elasticity,
            ..ItemParams::default()
        };
        host.set_gravity(Vec2::new(0.0, settings.gravity_magnitude));
        host.set_item_params(items);

        Self {
            host,
            playfield,
            gravity_magnitude: settings.gravity_magnitude,
            items,
            boundaries: HashMap::new(),
            keys: HashMap::new(),
            next_boundary: 0,
            next_body: 0,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    pub fn playfield(&self) -> Rect {
        self.playfield
    }

    // --- Boundaries ---

    /// Add or replace the boundary for a key. Re-adding with the same key
    /// keeps the handle and swaps the shape.
    pub fn upsert_boundary(&mut self, key: BoundaryKey, shape: BoundaryShape) -> BoundaryId {
        let id = match self.boundaries.get(&key) {
            Some(&id) => id,
            None => {
                let id = BoundaryId(self.next_boundary);
                self.next_boundary += 1;
                self.boundaries.insert(key, id);
                self.keys.insert(id, key);
                id
            }
        };
        self.host.upsert_boundary(id, shape);
        id
    }

    /// Remove a boundary; no-op if the key was never registered
    pub fn remove_boundary(&mut self, key: BoundaryKey) {
        if let Some(id) = self.boundaries.remove(&key) {
            self.keys.remove(&id);
            self.host.remove_boundary(id);
        }
    }

    /// Resolve a collision callback's boundary handle back to its entity
    pub fn boundary_key(&self, id: BoundaryId) -> Option<BoundaryKey> {
        self.keys.get(&id).copied()
    }

    /// Register the playfield edges as walls
    pub fn add_playfield_boundary(&mut self) {
        self.upsert_boundary(BoundaryKey::Playfield, BoundaryShape::Edges(self.playfield));
    }

    /// Register the paddle outline; the initial shape is rectangular so a
    /// resting ball sits flat instead of rolling off an oval
    pub fn add_paddle(&mut self, frame: Rect) {
        self.upsert_boundary(BoundaryKey::Paddle, BoundaryShape::Rect(frame));
    }

    /// Re-sync the paddle boundary to its current frame and shape
    pub fn sync_paddle_boundary(&mut self, frame: Rect, oval: bool) {
        let shape = if oval {
            BoundaryShape::Ellipse(frame)
        } else {
            BoundaryShape::Rect(frame)
        };
        self.upsert_boundary(BoundaryKey::Paddle, shape);
    }

    // --- Balls ---

    /// Attach a ball body to gravity, collision and item dynamics
    pub fn add_ball(&mut self, frame: Rect) -> BodyId {
        let id = BodyId(self.next_body);
        self.next_body += 1;
        self.host.attach_body(
            id,
            BodyDesc {
                frame,
                shape: CollisionShape::Ellipse,
            },
        );
        id
    }

    /// Detach a ball body from the simulation
    pub fn remove_ball(&mut self, body: BodyId) {
        self.host.detach_body(body);
    }

    // --- Pushes ---

    /// Push a ball back into play.
    ///
    /// A moving ball is pushed roughly opposite its current heading with
    /// ±30° jitter; a resting ball falls back to the upward cone.
    pub fn push_ball(&mut self, body: BodyId) {
        let velocity = self.host.linear_velocity(body);
        let angle = if velocity == Vec2::ZERO {
            self.jittered(-FRAC_PI_2, PUSH_UPWARD_JITTER)
        } else {
            let opposite = normalize_angle(angle_of(velocity) + PI);
            self.jittered(opposite, PUSH_OPPOSITE_JITTER)
        };
        let magnitude = push_magnitude_for_height(self.playfield.height());
        self.host.apply_impulse(body, vec_from_angle(angle) * magnitude);
    }

    /// First launch of a life: a narrow upward cone off the paddle
    pub fn push_ball_from_paddle(&mut self, body: BodyId) {
        let angle = self.jittered(-FRAC_PI_2, PUSH_UPWARD_JITTER);
        let magnitude = push_magnitude_for_height(self.playfield.height());
        self.host.apply_impulse(body, vec_from_angle(angle) * magnitude);
    }

    /// Re-push a restored ball along its recorded direction at reduced
    /// magnitude. A zero recorded velocity is a no-op.
    pub fn push_restored_ball(&mut self, body: BodyId, recorded_velocity: Vec2) {
        if recorded_velocity == Vec2::ZERO {
            return;
        }
        let angle = angle_of(recorded_velocity);
        self.host
            .apply_impulse(body, vec_from_angle(angle) * PUSH_RESTORE_MAGNITUDE);
    }

    // --- Live-tunable parameters ---

    pub fn set_gravity_magnitude(&mut self, magnitude: f32) {
        self.gravity_magnitude = magnitude;
        self.host.set_gravity(Vec2::new(0.0, magnitude));
    }

    pub fn gravity_magnitude(&self) -> f32 {
        self.gravity_magnitude
    }

    pub fn set_elasticity(&mut self, elasticity: f32) {
        self.items.elasticity = elasticity;
        self.host.set_item_params(self.items);
    }

    pub fn elasticity(&self) -> f32 {
        self.items.elasticity
    }

    fn jittered(&mut self, angle: f32, half_spread: f32) -> f32 {
        normalize_angle(self.rng.random_range(angle - half_spread..=angle + half_spread))
    }
}

/// Impulse magnitude for a playfield height: taller fields need stronger
/// pushes for a ball to reach the bricks. The table is scanned largest
/// threshold first.
pub fn push_magnitude_for_height(height: f32) -> f32 {
    for &(threshold, magnitude) in PUSH_MAGNITUDES {
        if height > threshold {
            return magnitude;
        }
    }
    PUSH_MAGNITUDE_DEFAULT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::TestHost;

    fn behavior() -> GameBehavior<TestHost> {
        let playfield = Rect::new(0.0, 0.0, 320.0, 568.0);
        GameBehavior::new(TestHost::new(), playfield, &Settings::default(), 7)
    }

    /// Absolute angular distance, wrap-aware
    fn angle_distance(a: f32, b: f32) -> f32 {
        normalize_angle(a - b).abs()
    }

    #[test]
    fn test_new_applies_settings_to_host() {
        let b = behavior();
        assert_eq!(b.host.gravity, Vec2::new(0.0, 0.25));
        assert_eq!(b.host.item_params.elasticity, 1.0);
        assert_eq!(b.host.item_params.friction, 0.1);
        assert!(b.host.item_params.allows_rotation);
    }

    #[test]
    fn test_boundary_upsert_is_idempotent_per_key() {
        let mut b = behavior();
        let brick = Rect::new(0.0, 100.0, 53.0, 20.0);
        let id1 = b.upsert_boundary(BoundaryKey::Brick(3), BoundaryShape::Rect(brick));
        let moved = brick.translated(Vec2::new(10.0, 0.0));
        let id2 = b.upsert_boundary(BoundaryKey::Brick(3), BoundaryShape::Rect(moved));

        assert_eq!(id1, id2);
        assert_eq!(b.host.boundaries.len(), 1);
        assert_eq!(b.host.boundaries[&id1], BoundaryShape::Rect(moved));
        assert_eq!(b.boundary_key(id1), Some(BoundaryKey::Brick(3)));
    }

    #[test]
    fn test_remove_boundary_clears_host_and_lookup() {
        let mut b = behavior();
        let id = b.upsert_boundary(
            BoundaryKey::Brick(1),
            BoundaryShape::Rect(Rect::new(0.0, 0.0, 50.0, 20.0)),
        );
        b.remove_boundary(BoundaryKey::Brick(1));
        assert!(b.host.boundaries.is_empty());
        assert_eq!(b.boundary_key(id), None);

        // Removing again is a no-op
        b.remove_boundary(BoundaryKey::Brick(1));
    }

    #[test]
    fn test_paddle_boundary_switches_shape() {
        let mut b = behavior();
        let frame = Rect::new(128.0, 553.0, 64.0, 15.0);
        b.add_paddle(frame);
        let id = b.upsert_boundary(BoundaryKey::Paddle, BoundaryShape::Rect(frame));
        assert_eq!(b.host.boundaries[&id], BoundaryShape::Rect(frame));

        b.sync_paddle_boundary(frame, true);
        assert_eq!(b.host.boundaries[&id], BoundaryShape::Ellipse(frame));
    }

    #[test]
    fn test_push_resting_ball_uses_upward_cone() {
        let mut b = behavior();
        let ball = b.add_ball(Rect::new(150.0, 530.0, 20.0, 20.0));

        for _ in 0..50 {
            b.push_ball(ball);
        }
        for impulse in b.host.impulses_for(ball) {
            assert!(angle_distance(angle_of(impulse), -FRAC_PI_2) <= PUSH_UPWARD_JITTER + 1e-4);
            assert!((impulse.length() - PUSH_MAGNITUDE_DEFAULT).abs() < 1e-4);
        }
    }

    #[test]
    fn test_push_moving_ball_aims_opposite_heading() {
        let mut b = behavior();
        let ball = b.add_ball(Rect::new(150.0, 300.0, 20.0, 20.0));
        // Heading down-right; pushes should aim up-left ± 30°
        b.host.set_velocity(ball, Vec2::new(100.0, 100.0));
        let opposite = normalize_angle(angle_of(Vec2::new(100.0, 100.0)) + PI);

        for _ in 0..50 {
            b.push_ball(ball);
        }
        for impulse in b.host.impulses_for(ball) {
            assert!(angle_distance(angle_of(impulse), opposite) <= PUSH_OPPOSITE_JITTER + 1e-4);
        }
    }

    #[test]
    fn test_push_from_paddle_is_narrow_upward_cone() {
        let mut b = behavior();
        let ball = b.add_ball(Rect::new(150.0, 530.0, 20.0, 20.0));
        for _ in 0..50 {
            b.push_ball_from_paddle(ball);
        }
        for impulse in b.host.impulses_for(ball) {
            assert!(angle_distance(angle_of(impulse), -FRAC_PI_2) <= PUSH_UPWARD_JITTER + 1e-4);
        }
    }

    #[test]
    fn test_push_restored_ball_preserves_direction_at_reduced_magnitude() {
        let mut b = behavior();
        let ball = b.add_ball(Rect::new(150.0, 300.0, 20.0, 20.0));
        let recorded = Vec2::new(-30.0, -40.0);
        b.push_restored_ball(ball, recorded);

        let impulses = b.host.impulses_for(ball);
        assert_eq!(impulses.len(), 1);
        assert!(angle_distance(angle_of(impulses[0]), angle_of(recorded)) < 1e-4);
        assert!((impulses[0].length() - PUSH_RESTORE_MAGNITUDE).abs() < 1e-4);
    }

    #[test]
    fn test_push_restored_ball_without_velocity_is_noop() {
        let mut b = behavior();
        let ball = b.add_ball(Rect::new(150.0, 300.0, 20.0, 20.0));
        b.push_restored_ball(ball, Vec2::ZERO);
        assert!(b.host.impulses.is_empty());
    }

    #[test]
    fn test_each_push_applies_exactly_one_impulse() {
        let mut b = behavior();
        let ball = b.add_ball(Rect::new(150.0, 300.0, 20.0, 20.0));
        b.push_ball(ball);
        b.push_ball(ball);
        assert_eq!(b.host.impulses.len(), 2);
    }

    #[test]
    fn test_magnitude_table_is_ordered_by_height() {
        assert_eq!(push_magnitude_for_height(480.0), 0.15);
        assert_eq!(push_magnitude_for_height(667.0), 0.20);
        assert_eq!(push_magnitude_for_height(800.0), 0.30);
        assert_eq!(push_magnitude_for_height(1536.0), 0.35);
        assert_eq!(push_magnitude_for_height(2732.0), 0.40);
    }

    #[test]
    fn test_live_parameter_updates_reach_host() {
        let mut b = behavior();
        b.set_gravity_magnitude(0.9);
        assert_eq!(b.host.gravity, Vec2::new(0.0, 0.9));
        assert_eq!(b.gravity_magnitude(), 0.9);

        b.set_elasticity(0.5);
        assert_eq!(b.host.item_params.elasticity, 0.5);
        // Other item params untouched
        assert_eq!(b.host.item_params.friction, 0.1);
    }
}
