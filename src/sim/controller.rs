//! Game controller state machine
//!
//! Owns the behavior composer and the entity populations, and advances the
//! round through `NotStarted → Playing → (GameOver | Won) → NotStarted`.
//! Everything here runs synchronously inside host callbacks (collision,
//! per-step action) or gesture handlers; there is no other mutation path.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::behavior::{BoundaryKey, GameBehavior};
use super::paddle::Paddle;
use super::rect::Rect;
use super::state::{Ball, Brick, BrickKind, FrozenBall, GamePhase};
use crate::consts::*;
use crate::engine::{BoundaryShape, EngineEvent, PhysicsHost};
use crate::settings::Settings;

pub struct GameController<H: PhysicsHost> {
    behavior: GameBehavior<H>,
    playfield: Rect,
    phase: GamePhase,
    /// Latest settings (live-tunables already applied)
    settings: Settings,
    /// Settings snapshot the current round was built from
    round: Settings,
    paddle: Option<Paddle>,
    /// Paddle boundary is rectangular until the first launch, elliptical after
    paddle_boundary_oval: bool,
    /// Boundary resync postponed because a ball overlapped the paddle
    paddle_resync_pending: bool,
    balls: Vec<Ball>,
    frozen: Vec<FrozenBall>,
    bricks: Vec<Brick>,
    /// Spawn point for AddBall bricks
    last_ball_center: Vec2,
    next_ball_id: u32,
    next_brick_id: u32,
    rng: Pcg32,
}

impl<H: PhysicsHost> GameController<H> {
    pub fn new(host: H, playfield: Rect, settings: Settings, seed: u64) -> Self {
        let behavior = GameBehavior::new(host, playfield, &settings, seed);
        Self {
            behavior,
            playfield,
            phase: GamePhase::NotStarted,
            round: settings.clone(),
            settings,
            paddle: None,
            paddle_boundary_oval: false,
            paddle_resync_pending: false,
            balls: Vec::new(),
            frozen: Vec::new(),
            bricks: Vec::new(),
            last_ball_center: playfield.center(),
            next_ball_id: 0,
            next_brick_id: 0,
            rng: Pcg32::seed_from_u64(seed.wrapping_add(1)),
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn bricks(&self) -> &[Brick] {
        &self.bricks
    }

    pub fn paddle(&self) -> Option<&Paddle> {
        self.paddle.as_ref()
    }

    pub fn behavior(&self) -> &GameBehavior<H> {
        &self.behavior
    }

    pub fn behavior_mut(&mut self) -> &mut GameBehavior<H> {
        &mut self.behavior
    }

    // --- Gestures ---

    /// The start/restart tap: starts a round from NotStarted, or resets a
    /// finished round back to NotStarted
    pub fn start_tap(&mut self) {
        match self.phase {
            GamePhase::NotStarted => self.start_round(),
            GamePhase::GameOver | GamePhase::Won => self.reset_round(),
            GamePhase::Playing => {}
        }
    }

    /// The push tap: first tap of a life launches off the paddle, later taps
    /// push every ball back into play
    pub fn push_tap(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        if !self.paddle_boundary_oval {
            // First launch: narrow upward cone while the paddle is still flat
            for ball in self.balls.clone() {
                self.behavior.push_ball_from_paddle(ball.body);
            }
            self.paddle_boundary_oval = true;
            self.sync_paddle_boundary();
        } else {
            for ball in self.balls.clone() {
                self.behavior.push_ball(ball.body);
            }
        }
    }

    /// Horizontal pan: velocity maps to paddle displacement
    pub fn pan(&mut self, pan_velocity: Vec2) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let moved = match self.paddle.as_mut() {
            Some(paddle) => paddle.move_by_pan(pan_velocity.x),
            None => false,
        };
        if moved {
            self.sync_paddle_boundary();
        }
    }

    // --- Host callbacks ---

    pub fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::CollisionBegan { body, boundary, at } => {
                if self.phase != GamePhase::Playing {
                    return;
                }
                self.last_ball_center = self
                    .behavior
                    .host
                    .body_frame(body)
                    .map(|frame| frame.center())
                    .unwrap_or(at);
                if let Some(BoundaryKey::Brick(id)) = self.behavior.boundary_key(boundary) {
                    self.brick_hit(id);
                }
            }
            EngineEvent::Step => self.step(),
        }
    }

    // --- Lifecycle (app suspension) ---

    /// Capture every ball's velocity and detach it from the simulation.
    /// Game state is untouched; a second call with nothing left is a no-op.
    pub fn freeze(&mut self) {
        if self.balls.is_empty() {
            return;
        }
        for ball in std::mem::take(&mut self.balls) {
            let center = self
                .behavior
                .host
                .body_frame(ball.body)
                .map(|frame| frame.center())
                .unwrap_or(self.last_ball_center);
            let velocity = self.behavior.host.linear_velocity(ball.body);
            self.behavior.remove_ball(ball.body);
            self.frozen.push(FrozenBall {
                center,
                radius: ball.radius,
                velocity,
            });
        }
        log::info!("Froze {} balls for suspension", self.frozen.len());
    }

    /// Recreate frozen balls and re-push them along their recorded
    /// directions. Restoring with nothing frozen is a no-op.
    pub fn restore(&mut self) {
        if self.frozen.is_empty() {
            return;
        }
        let frozen = std::mem::take(&mut self.frozen);
        log::info!("Restoring {} frozen balls", frozen.len());
        for ball in frozen {
            let frame = Rect::from_center(ball.center, Vec2::splat(ball.radius * 2.0));
            let body = self.behavior.add_ball(frame);
            self.behavior.push_restored_ball(body, ball.velocity);
            self.balls.push(Ball {
                id: self.next_ball_id,
                body,
                radius: ball.radius,
            });
            self.next_ball_id += 1;
        }
    }

    // --- Settings ---

    /// Apply a settings change: gravity and elasticity take effect on the
    /// running simulation immediately, the rest at the next round start
    pub fn apply_settings(&mut self, settings: Settings) {
        self.behavior.set_gravity_magnitude(settings.gravity_magnitude);
        self.behavior.set_elasticity(settings.elasticity);
        self.settings = settings;
        log::debug!("Settings applied (live: gravity + elasticity)");
    }

    // --- Round setup and teardown ---

    fn start_round(&mut self) {
        self.round = self.settings.clone();
        self.behavior.add_playfield_boundary();

        if self.paddle.is_none() {
            self.paddle = Some(Paddle::new(self.playfield));
        }
        self.paddle_boundary_oval = false;
        self.paddle_resync_pending = false;
        if let Some(paddle) = &self.paddle {
            self.behavior.add_paddle(paddle.frame());
        }

        if self.bricks.is_empty() {
            self.create_bricks();
        }
        self.spawn_balls();

        self.phase = GamePhase::Playing;
        log::info!(
            "Round started: {} balls, {} bricks",
            self.balls.len(),
            self.bricks.len()
        );
    }

    fn reset_round(&mut self) {
        for ball in std::mem::take(&mut self.balls) {
            self.behavior.remove_ball(ball.body);
        }
        self.frozen.clear();
        self.phase = GamePhase::NotStarted;
        log::info!("Round reset");
    }

    /// Balls start resting on the paddle, spaced evenly along its width
    fn spawn_balls(&mut self) {
        let paddle_frame = match &self.paddle {
            Some(paddle) => paddle.frame(),
            None => return,
        };
        let count = self.round.number_of_balls.max(1);
        let radius = BALL_SIZE / 2.0;

        for i in 0..count {
            let t = (i + 1) as f32 / (count + 1) as f32;
            let center = Vec2::new(
                paddle_frame.min_x() + paddle_frame.width() * t,
                paddle_frame.min_y() - radius,
            );
            let frame = Rect::from_center(center, Vec2::splat(BALL_SIZE));
            let body = self.behavior.add_ball(frame);
            self.balls.push(Ball {
                id: self.next_ball_id,
                body,
                radius,
            });
            self.next_ball_id += 1;
        }
        if let Some(ball) = self.balls.first() {
            self.last_ball_center = self
                .behavior
                .host
                .body_frame(ball.body)
                .map(|frame| frame.center())
                .unwrap_or(paddle_frame.center());
        }
    }

    /// Create the brick grid for this round: `total_bricks` cells filled
    /// row-major, with the special cells chosen by rejection sampling
    fn create_bricks(&mut self) {
        let columns = BRICK_COLUMNS;
        let brick_width = self.playfield.width() / columns as f32;

        // Keep the grid in the upper half of the playfield
        let max_rows = (((self.playfield.height() / 2.0) - TOP_BRICK_OFFSET) / BRICK_HEIGHT)
            .floor()
            .max(1.0) as usize;
        let total = self.round.total_bricks.min(columns * max_rows);
        let rows = total.div_ceil(columns);

        let enabled = BrickKind::enabled_specials(&self.round);
        let wanted_specials = if enabled.is_empty() {
            0
        } else {
            self.round.special_bricks.min(total)
        };

        // Rejection-sample distinct (row, column) cells for the specials
        let mut special_cells: Vec<usize> = Vec::with_capacity(wanted_specials);
        while special_cells.len() < wanted_specials {
            let row = self.rng.random_range(0..rows);
            let column = self.rng.random_range(0..columns);
            let cell = row * columns + column;
            if cell < total && !special_cells.contains(&cell) {
                special_cells.push(cell);
            }
        }

        for cell in 0..total {
            let row = cell / columns;
            let column = cell % columns;
            let frame = Rect::new(
                self.playfield.min_x() + column as f32 * brick_width,
                self.playfield.min_y() + TOP_BRICK_OFFSET + row as f32 * BRICK_HEIGHT,
                brick_width,
                BRICK_HEIGHT,
            );
            let kind = if special_cells.contains(&cell) {
                enabled[self.rng.random_range(0..enabled.len())]
            } else {
                BrickKind::Regular
            };

            let id = self.next_brick_id;
            self.next_brick_id += 1;
            self.behavior
                .upsert_boundary(BoundaryKey::Brick(id), BoundaryShape::Rect(frame));
            self.bricks.push(Brick::new(id, kind, frame));
        }
        log::info!("Created {} bricks ({} special)", total, wanted_specials);
    }

    // --- Collision handling ---

    fn brick_hit(&mut self, id: u32) {
        let Some(index) = self.bricks.iter().position(|b| b.id == id) else {
            return;
        };
        let destroyed = {
            let brick = &mut self.bricks[index];
            if brick.is_fading() {
                return;
            }
            brick.hits = brick.hits.saturating_add(1);
            brick.hits >= brick.kind.hits_required()
        };
        if !destroyed {
            return;
        }

        let kind = self.bricks[index].kind;
        self.bricks[index].fade = Some(0);
        self.behavior.remove_boundary(BoundaryKey::Brick(id));
        log::debug!("Brick {} ({:?}) destroyed", id, kind);

        match kind {
            BrickKind::SmallerPaddle => self.resize_paddle(false),
            BrickKind::LargerPaddle => self.resize_paddle(true),
            BrickKind::AddBall => self.spawn_extra_ball(),
            BrickKind::Regular | BrickKind::Hard => {}
        }
    }

    fn resize_paddle(&mut self, grow: bool) {
        let changed = match self.paddle.as_mut() {
            Some(paddle) if grow => paddle.increase_width(),
            Some(paddle) => paddle.decrease_width(),
            None => false,
        };
        if changed {
            self.sync_paddle_boundary();
        }
    }

    fn spawn_extra_ball(&mut self) {
        let radius = BALL_SIZE / 2.0;
        let frame = Rect::from_center(self.last_ball_center, Vec2::splat(BALL_SIZE));
        let body = self.behavior.add_ball(frame);
        self.behavior.push_ball(body);
        self.balls.push(Ball {
            id: self.next_ball_id,
            body,
            radius,
        });
        self.next_ball_id += 1;
        log::debug!("Extra ball spawned at {:?}", self.last_ball_center);
    }

    /// Push the paddle's boundary to the host, unless a ball currently
    /// overlaps the paddle frame: replacing the shape then would trap the
    /// ball inside the paddle, so the sync is parked until a step on which
    /// they no longer overlap.
    fn sync_paddle_boundary(&mut self) {
        let Some(frame) = self.paddle.as_ref().map(|p| p.frame()) else {
            return;
        };
        if self.any_ball_overlaps(frame) {
            self.paddle_resync_pending = true;
            return;
        }
        self.behavior
            .sync_paddle_boundary(frame, self.paddle_boundary_oval);
        self.paddle_resync_pending = false;
    }

    fn any_ball_overlaps(&self, frame: Rect) -> bool {
        self.balls.iter().any(|ball| {
            self.behavior
                .host
                .body_frame(ball.body)
                .is_some_and(|ball_frame| ball_frame.intersects(&frame))
        })
    }

    // --- Per-step bookkeeping ---

    fn step(&mut self) {
        // Destroyed bricks fade over a few steps, then leave the set
        self.bricks.retain_mut(|brick| !brick.advance_fade());

        // Any ball that left the playfield is out of the game
        let playfield = self.playfield;
        let mut exited = Vec::new();
        for ball in &self.balls {
            match self.behavior.host.body_frame(ball.body) {
                Some(frame) => {
                    if frame.intersects(&playfield) {
                        self.last_ball_center = frame.center();
                    } else {
                        exited.push(ball.id);
                    }
                }
                None => exited.push(ball.id),
            }
        }
        for id in exited {
            if let Some(index) = self.balls.iter().position(|b| b.id == id) {
                let ball = self.balls.remove(index);
                self.behavior.remove_ball(ball.body);
                log::debug!("Ball {} left the playfield", id);
            }
        }

        // Re-armed until the paddle and every ball are clear of each other
        if self.paddle_resync_pending {
            self.sync_paddle_boundary();
        }

        if self.phase != GamePhase::Playing {
            return;
        }
        if self.bricks.is_empty() && !self.balls.is_empty() {
            self.phase = GamePhase::Won;
            log::info!("All bricks cleared - won");
        } else if self.balls.is_empty() && self.frozen.is_empty() {
            self.phase = GamePhase::GameOver;
            log::info!("All balls lost - game over");
        }
    }
}
