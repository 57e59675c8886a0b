//! Configuration module - environment variable parsing

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::perception::{LEFT_EYE_IDX, NOSE_IDX, RIGHT_EYE_IDX};

/// Fastest frame loop the session will run
pub const MAX_TARGET_FPS: u32 = 1000;

/// Where landmark frames come from
#[derive(Clone, Debug, PartialEq)]
pub enum SourceKind {
    /// Seeded synthetic players
    Simulated {
        seed: u64,
        /// Stop after this many frames (unbounded when `None`)
        frames: Option<u64>,
    },
    /// JSON-lines recording of landmark frames
    Replay(PathBuf),
}

/// Offset from the nose anchor to the avatar's top-left corner
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AvatarOffset {
    pub x: f32,
    pub y: f32,
}

/// Engine constants. Everything here is fixed for the lifetime of a session.
#[derive(Clone, Debug)]
pub struct GameConfig {
    /// Working frame width in pixels
    pub frame_width: u32,
    /// Working frame height in pixels
    pub frame_height: u32,
    /// Two-player duel; when false only one face is tracked and it always owns slot 0
    pub two_player: bool,

    /// Face mesh indices of the left eye contour
    pub left_eye: [usize; 6],
    /// Face mesh indices of the right eye contour
    pub right_eye: [usize; 6],
    /// Face mesh index of the nose tip
    pub nose_index: usize,

    /// Average EAR below which the eyes count as closed
    pub blink_threshold: f32,
    /// Average EAR above which the eyes count as open
    pub open_threshold: f32,
    /// Minimum time between two shots of the same player
    pub blink_cooldown: Duration,
    /// Normalized distance the thumb tip must clear the finger tips by
    pub gesture_margin: f32,

    /// Avatar sprite size in pixels
    pub avatar_width: f32,
    pub avatar_height: f32,
    /// Per-slot avatar offsets from the anchor
    pub avatar_offsets: [AvatarOffset; 2],

    /// Projectile sprite size in pixels
    pub projectile_width: f32,
    pub projectile_height: f32,
    /// Horizontal pixels travelled per frame
    pub projectile_speed: f32,
    /// Live projectile cap
    pub max_projectiles: usize,

    /// How long a shield stays up
    pub shield_duration: Duration,
    /// Minimum time between a shield dropping and the next activation
    pub shield_cooldown: Duration,

    /// Health removed per hit
    pub damage_per_hit: u32,
    /// Health at match start and after reset
    pub starting_health: u32,
}

impl GameConfig {
    /// Horizontal divider between the two player halves
    pub fn center_x(&self) -> f32 {
        self.frame_width as f32 / 2.0
    }

    /// Validate internal consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ConfigError::Invalid("frame dimensions must be non-zero".to_string()));
        }
        if !(self.blink_threshold < self.open_threshold) {
            return Err(ConfigError::Invalid(format!(
                "blink threshold {} must be below open threshold {}",
                self.blink_threshold, self.open_threshold
            )));
        }
        if !(self.gesture_margin >= 0.0) {
            return Err(ConfigError::Invalid("gesture margin must not be negative".to_string()));
        }
        if !(self.avatar_width > 0.0 && self.avatar_height > 0.0) {
            return Err(ConfigError::Invalid("avatar size must be positive".to_string()));
        }
        if self
            .avatar_offsets
            .iter()
            .any(|o| !(o.x.is_finite() && o.y.is_finite()))
        {
            return Err(ConfigError::Invalid("avatar offsets must be finite".to_string()));
        }
        if !(self.projectile_width > 0.0 && self.projectile_height > 0.0) {
            return Err(ConfigError::Invalid("projectile size must be positive".to_string()));
        }
        if !(self.projectile_speed > 0.0 && self.projectile_speed.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "projectile speed {} must be positive",
                self.projectile_speed
            )));
        }
        if self.max_projectiles == 0 {
            return Err(ConfigError::Invalid("projectile cap must be greater than 0".to_string()));
        }
        if self.starting_health == 0 {
            return Err(ConfigError::Invalid("starting health must be greater than 0".to_string()));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        let avatar_width = 100.0;
        let avatar_height = 75.0;
        let centered = AvatarOffset {
            x: avatar_width / 2.0,
            y: avatar_height / 2.0,
        };

        Self {
            frame_width: 640,
            frame_height: 480,
            two_player: true,
            left_eye: LEFT_EYE_IDX,
            right_eye: RIGHT_EYE_IDX,
            nose_index: NOSE_IDX,
            blink_threshold: 0.15,
            open_threshold: 0.25,
            blink_cooldown: Duration::from_millis(1000),
            gesture_margin: 0.02,
            avatar_width,
            avatar_height,
            avatar_offsets: [centered, centered],
            projectile_width: 30.0,
            projectile_height: 15.0,
            projectile_speed: 10.0,
            max_projectiles: 50,
            shield_duration: Duration::from_millis(5000),
            shield_cooldown: Duration::from_millis(5000),
            damage_per_hit: 10,
            starting_health: 100,
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Landmark source
    pub source: SourceKind,
    /// Frame loop rate
    pub target_fps: u32,
    /// Publish a snapshot every N frames
    pub snapshot_every: u32,
    /// Engine constants
    pub game: GameConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GameConfig::default();

        let source = match lookup("BLINKSHOT_SOURCE").as_deref() {
            None | Some("") | Some("sim") => SourceKind::Simulated {
                seed: parse_or(&lookup, "BLINKSHOT_SEED", 7)?,
                frames: parse_opt(&lookup, "SIM_FRAMES")?,
            },
            Some(path) => SourceKind::Replay(PathBuf::from(path)),
        };

        let avatar_width = parse_or(&lookup, "AVATAR_WIDTH", defaults.avatar_width)?;
        let avatar_height = parse_or(&lookup, "AVATAR_HEIGHT", defaults.avatar_height)?;
        let centered = AvatarOffset {
            x: avatar_width / 2.0,
            y: avatar_height / 2.0,
        };
        let avatar_offsets = [
            AvatarOffset {
                x: parse_or(&lookup, "AVATAR_OFFSET_LEFT_X", centered.x)?,
                y: parse_or(&lookup, "AVATAR_OFFSET_LEFT_Y", centered.y)?,
            },
            AvatarOffset {
                x: parse_or(&lookup, "AVATAR_OFFSET_RIGHT_X", centered.x)?,
                y: parse_or(&lookup, "AVATAR_OFFSET_RIGHT_Y", centered.y)?,
            },
        ];

        let game = GameConfig {
            frame_width: parse_or(&lookup, "FRAME_WIDTH", defaults.frame_width)?,
            frame_height: parse_or(&lookup, "FRAME_HEIGHT", defaults.frame_height)?,
            two_player: parse_or(&lookup, "TWO_PLAYER", defaults.two_player)?,
            blink_threshold: parse_or(&lookup, "BLINK_THRESHOLD", defaults.blink_threshold)?,
            open_threshold: parse_or(&lookup, "OPEN_THRESHOLD", defaults.open_threshold)?,
            blink_cooldown: parse_millis(&lookup, "BLINK_COOLDOWN_MS", defaults.blink_cooldown)?,
            gesture_margin: parse_or(&lookup, "GESTURE_MARGIN", defaults.gesture_margin)?,
            avatar_width,
            avatar_height,
            avatar_offsets,
            projectile_width: parse_or(&lookup, "PROJECTILE_WIDTH", defaults.projectile_width)?,
            projectile_height: parse_or(&lookup, "PROJECTILE_HEIGHT", defaults.projectile_height)?,
            projectile_speed: parse_or(&lookup, "PROJECTILE_SPEED", defaults.projectile_speed)?,
            max_projectiles: parse_or(&lookup, "MAX_PROJECTILES", defaults.max_projectiles)?,
            shield_duration: parse_millis(&lookup, "SHIELD_DURATION_MS", defaults.shield_duration)?,
            shield_cooldown: parse_millis(&lookup, "SHIELD_COOLDOWN_MS", defaults.shield_cooldown)?,
            damage_per_hit: parse_or(&lookup, "DAMAGE_PER_HIT", defaults.damage_per_hit)?,
            starting_health: parse_or(&lookup, "STARTING_HEALTH", defaults.starting_health)?,
            ..defaults
        };

        let config = Self {
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            source,
            target_fps: parse_or(&lookup, "TARGET_FPS", 30)?,
            snapshot_every: parse_or(&lookup, "SNAPSHOT_EVERY", 3)?,
            game,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("target FPS must be greater than 0".to_string()));
        }
        if self.target_fps > MAX_TARGET_FPS {
            return Err(ConfigError::Invalid(format!(
                "target FPS {} exceeds {}",
                self.target_fps, MAX_TARGET_FPS
            )));
        }
        if self.snapshot_every == 0 {
            return Err(ConfigError::Invalid(
                "snapshot interval must be greater than 0".to_string(),
            ));
        }
        self.game.validate()
    }

    /// Interval between two frame ticks, never zero
    pub fn frame_interval(&self) -> Duration {
        let fps = u64::from(self.target_fps.max(1));
        Duration::from_micros((1_000_000 / fps).max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            source: SourceKind::Simulated { seed: 7, frames: None },
            target_fps: 30,
            snapshot_every: 3,
            game: GameConfig::default(),
        }
    }
}

fn parse_opt<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Malformed { key, value: raw }),
        None => Ok(None),
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}

fn parse_millis<F>(
    lookup: &F,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt::<F, u64>(lookup, key)?
        .map(Duration::from_millis)
        .unwrap_or(default))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Malformed value for {key}: {value:?}")]
    Malformed { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
