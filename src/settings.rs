//! Game settings and preferences
//!
//! Persisted in a host key-value store, one entry per setting. Reads never
//! fail: a missing or unparseable value resolves to the hard-coded default,
//! which is written back so the store converges to a full set of keys.
//!
//! Gravity and elasticity are live-tunable (re-applied to the running
//! simulation via [`GameController::apply_settings`]); the ball and brick
//! counts only take effect at the next round start.
//!
//! [`GameController::apply_settings`]: crate::sim::GameController::apply_settings

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key-value store collaborator (user defaults, LocalStorage, ...)
///
/// Values are JSON-encoded scalars. There is no error path: a store that
/// cannot produce a value returns `None` and the caller falls back to the
/// default.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory store, used by tests and as a stand-in collaborator
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// Store keys, one per setting
mod keys {
    pub const GRAVITY_MAGNITUDE: &str = "Gravity Magnitude";
    pub const ELASTICITY: &str = "Ball Behavior Elasticity";
    pub const NUMBER_OF_BALLS: &str = "Number of Bouncing Balls";
    pub const TOTAL_BRICKS: &str = "Number of Total Bricks";
    pub const SPECIAL_BRICKS: &str = "Number of Special Bricks";
    pub const SMALLER_PADDLE_ENABLED: &str = "Special Brick Smaller Paddle Enabled";
    pub const LARGER_PADDLE_ENABLED: &str = "Special Brick Larger Paddle Enabled";
    pub const ADD_BALL_ENABLED: &str = "Special Brick Add Ball Enabled";
    pub const HARD_ENABLED: &str = "Special Brick Hard Enabled";
}

/// Gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Downward gravity magnitude
    pub gravity_magnitude: f32,
    /// Bounce elasticity for all dynamic items (1.0 = lossless)
    pub elasticity: f32,
    /// Balls spawned per round
    pub number_of_balls: usize,
    /// Bricks created at round start
    pub total_bricks: usize,
    /// How many of those bricks carry a special effect
    pub special_bricks: usize,
    /// Per-type enable flags for special bricks
    pub smaller_paddle_enabled: bool,
    pub larger_paddle_enabled: bool,
    pub add_ball_enabled: bool,
    pub hard_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gravity_magnitude: 0.25,
            elasticity: 1.0,
            number_of_balls: 2,
            total_bricks: 18,
            special_bricks: 6,
            smaller_paddle_enabled: true,
            larger_paddle_enabled: true,
            add_ball_enabled: true,
            hard_enabled: true,
        }
    }
}

impl Settings {
    /// Load from a store, resolving each missing key to its default and
    /// writing the default back
    pub fn load(store: &mut dyn SettingsStore) -> Self {
        let defaults = Self::default();
        let settings = Self {
            gravity_magnitude: read_or_default(
                store,
                keys::GRAVITY_MAGNITUDE,
                defaults.gravity_magnitude,
            ),
            elasticity: read_or_default(store, keys::ELASTICITY, defaults.elasticity),
            number_of_balls: read_or_default(
                store,
                keys::NUMBER_OF_BALLS,
                defaults.number_of_balls,
            ),
            total_bricks: read_or_default(store, keys::TOTAL_BRICKS, defaults.total_bricks),
            special_bricks: read_or_default(store, keys::SPECIAL_BRICKS, defaults.special_bricks),
            smaller_paddle_enabled: read_or_default(
                store,
                keys::SMALLER_PADDLE_ENABLED,
                defaults.smaller_paddle_enabled,
            ),
            larger_paddle_enabled: read_or_default(
                store,
                keys::LARGER_PADDLE_ENABLED,
                defaults.larger_paddle_enabled,
            ),
            add_ball_enabled: read_or_default(
                store,
                keys::ADD_BALL_ENABLED,
                defaults.add_ball_enabled,
            ),
            hard_enabled: read_or_default(store, keys::HARD_ENABLED, defaults.hard_enabled),
        };
        log::info!("Loaded settings: {:?}", settings);
        settings
    }

    /// Write every setting to the store
    pub fn save(&self, store: &mut dyn SettingsStore) {
        write(store, keys::GRAVITY_MAGNITUDE, &self.gravity_magnitude);
        write(store, keys::ELASTICITY, &self.elasticity);
        write(store, keys::NUMBER_OF_BALLS, &self.number_of_balls);
        write(store, keys::TOTAL_BRICKS, &self.total_bricks);
        write(store, keys::SPECIAL_BRICKS, &self.special_bricks);
        write(
            store,
            keys::SMALLER_PADDLE_ENABLED,
            &self.smaller_paddle_enabled,
        );
        write(
            store,
            keys::LARGER_PADDLE_ENABLED,
            &self.larger_paddle_enabled,
        );
        write(store, keys::ADD_BALL_ENABLED, &self.add_ball_enabled);
        write(store, keys::HARD_ENABLED, &self.hard_enabled);
        log::info!("Settings saved");
    }
}

fn read_or_default<T>(store: &mut dyn SettingsStore, key: &str, default: T) -> T
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    if let Some(raw) = store.get(key)
        && let Ok(value) = serde_json::from_str(&raw)
    {
        return value;
    }
    write(store, key, &default);
    default
}

fn write<T: Serialize>(store: &mut dyn SettingsStore, key: &str, value: &T) {
    if let Ok(raw) = serde_json::to_string(value) {
        store.set(key, &raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_empty_store_yields_defaults_and_writes_back() {
        let mut store = MemoryStore::new();
        let settings = Settings::load(&mut store);
        assert_eq!(settings, Settings::default());

        // Defaults were written back on first read
        assert_eq!(store.get(keys::NUMBER_OF_BALLS).as_deref(), Some("2"));
        assert_eq!(store.get(keys::GRAVITY_MAGNITUDE).as_deref(), Some("0.25"));
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut store = MemoryStore::new();
        let settings = Settings {
            gravity_magnitude: 0.5,
            elasticity: 0.8,
            number_of_balls: 3,
            total_bricks: 24,
            special_bricks: 4,
            smaller_paddle_enabled: false,
            larger_paddle_enabled: true,
            add_ball_enabled: false,
            hard_enabled: true,
        };
        settings.save(&mut store);
        assert_eq!(Settings::load(&mut store), settings);
    }

    #[test]
    fn test_corrupt_value_falls_back_to_default() {
        let mut store = MemoryStore::new();
        store.set(keys::NUMBER_OF_BALLS, "not a number");
        let settings = Settings::load(&mut store);
        assert_eq!(settings.number_of_balls, 2);
        // Store healed with the default
        assert_eq!(store.get(keys::NUMBER_OF_BALLS).as_deref(), Some("2"));
    }
}
