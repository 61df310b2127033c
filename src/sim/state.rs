//! Game entities and phase
//!
//! Entities are bookkeeping records around host-simulated bodies: the host
//! owns ball motion, we own brick hit counts, fade-out progress and the
//! round phase.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::consts::BRICK_FADE_STEPS;
use crate::engine::BodyId;
use crate::settings::Settings;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the start tap
    NotStarted,
    /// Active round
    Playing,
    /// All balls lost with bricks remaining
    GameOver,
    /// All bricks cleared with at least one ball alive
    Won,
}

/// Brick types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrickKind {
    #[default]
    Regular,
    /// Needs 3 hits, no side effect
    Hard,
    /// Shrinks the paddle one width step on destruction
    SmallerPaddle,
    /// Grows the paddle one width step on destruction
    LargerPaddle,
    /// Spawns an extra ball on destruction
    AddBall,
}

impl BrickKind {
    /// Hits needed to destroy a brick of this kind
    pub fn hits_required(&self) -> u8 {
        match self {
            BrickKind::Hard => 3,
            _ => 1,
        }
    }

    pub fn is_special(&self) -> bool {
        *self != BrickKind::Regular
    }

    /// Stable tag for persistence / debugging
    pub fn tag(&self) -> &'static str {
        match self {
            BrickKind::Regular => "regular",
            BrickKind::Hard => "hard",
            BrickKind::SmallerPaddle => "smaller-paddle",
            BrickKind::LargerPaddle => "larger-paddle",
            BrickKind::AddBall => "add-ball",
        }
    }

    /// Lenient tag lookup; an unknown tag resolves to Regular
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "hard" => BrickKind::Hard,
            "smaller-paddle" => BrickKind::SmallerPaddle,
            "larger-paddle" => BrickKind::LargerPaddle,
            "add-ball" => BrickKind::AddBall,
            _ => BrickKind::Regular,
        }
    }

    /// The special kinds currently enabled in settings
    pub fn enabled_specials(settings: &Settings) -> Vec<BrickKind> {
        let mut kinds = Vec::with_capacity(4);
        if settings.smaller_paddle_enabled {
            kinds.push(BrickKind::SmallerPaddle);
        }
        if settings.larger_paddle_enabled {
            kinds.push(BrickKind::LargerPaddle);
        }
        if settings.add_ball_enabled {
            kinds.push(BrickKind::AddBall);
        }
        if settings.hard_enabled {
            kinds.push(BrickKind::Hard);
        }
        kinds
    }
}

/// A brick in the grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub kind: BrickKind,
    pub frame: Rect,
    /// Hits received so far (monotonically non-decreasing)
    pub hits: u8,
    /// Fade-out stage once destroyed (0..BRICK_FADE_STEPS); None while alive
    pub fade: Option<u8>,
}

impl Brick {
    pub fn new(id: u32, kind: BrickKind, frame: Rect) -> Self {
        Self {
            id,
            kind,
            frame,
            hits: 0,
            fade: None,
        }
    }

    /// True once the fatal hit landed (fading out, boundary already gone)
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Visual opacity: proportional to remaining hits while alive, stepping
    /// down to zero across the fade-out
    pub fn opacity(&self) -> f32 {
        match self.fade {
            Some(stage) => 1.0 - (stage + 1) as f32 / BRICK_FADE_STEPS as f32,
            None => {
                let required = self.kind.hits_required();
                (required - self.hits.min(required)) as f32 / required as f32
            }
        }
    }

    /// Advance the fade by one step; true when the brick should be removed
    pub fn advance_fade(&mut self) -> bool {
        match self.fade {
            Some(stage) if stage + 1 >= BRICK_FADE_STEPS => true,
            Some(stage) => {
                self.fade = Some(stage + 1);
                false
            }
            None => false,
        }
    }
}

/// An active ball: a handle into the host simulation plus its radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub body: BodyId,
    pub radius: f32,
}

/// A ball captured across app suspension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrozenBall {
    pub center: Vec2,
    pub radius: f32,
    pub velocity: Vec2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hits_required() {
        assert_eq!(BrickKind::Regular.hits_required(), 1);
        assert_eq!(BrickKind::Hard.hits_required(), 3);
        assert_eq!(BrickKind::AddBall.hits_required(), 1);
    }

    #[test]
    fn test_tag_round_trip_and_fallback() {
        for kind in [
            BrickKind::Regular,
            BrickKind::Hard,
            BrickKind::SmallerPaddle,
            BrickKind::LargerPaddle,
            BrickKind::AddBall,
        ] {
            assert_eq!(BrickKind::from_tag(kind.tag()), kind);
        }
        // Corrupt stored type falls back to Regular
        assert_eq!(BrickKind::from_tag("garbage"), BrickKind::Regular);
    }

    #[test]
    fn test_enabled_specials_respects_flags() {
        let mut settings = Settings::default();
        assert_eq!(BrickKind::enabled_specials(&settings).len(), 4);

        settings.hard_enabled = false;
        settings.add_ball_enabled = false;
        let kinds = BrickKind::enabled_specials(&settings);
        assert_eq!(kinds, vec![BrickKind::SmallerPaddle, BrickKind::LargerPaddle]);
    }

    #[test]
    fn test_hard_brick_opacity_tracks_remaining_hits() {
        let mut brick = Brick::new(1, BrickKind::Hard, Rect::new(0.0, 0.0, 50.0, 20.0));
        assert!((brick.opacity() - 1.0).abs() < 1e-6);
        brick.hits = 1;
        assert!((brick.opacity() - 2.0 / 3.0).abs() < 1e-6);
        brick.hits = 2;
        assert!((brick.opacity() - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_fade_runs_three_stages() {
        let mut brick = Brick::new(1, BrickKind::Regular, Rect::new(0.0, 0.0, 50.0, 20.0));
        assert!(!brick.advance_fade()); // alive bricks don't fade

        brick.fade = Some(0);
        assert!(!brick.advance_fade());
        assert!(!brick.advance_fade());
        assert!(brick.advance_fade()); // third step removes it
    }
}
