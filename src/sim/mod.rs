//! Game simulation orchestration
//!
//! Nothing in here integrates motion: the host engine owns the physics and
//! calls back into [`GameController::handle_event`]. This module is the
//! choreography on top:
//! - `rect`: frame geometry
//! - `state`: entities and the round phase
//! - `paddle`: divisor-derived widths/speeds and clamped movement
//! - `behavior`: gravity + boundaries + item dynamics + pushes, composed
//! - `controller`: the state machine driving it all

pub mod behavior;
pub mod controller;
pub mod paddle;
pub mod rect;
pub mod state;

pub use behavior::{BoundaryKey, GameBehavior, push_magnitude_for_height};
pub use controller::GameController;
pub use paddle::Paddle;
pub use rect::Rect;
pub use state::{Ball, Brick, BrickKind, FrozenBall, GamePhase};
