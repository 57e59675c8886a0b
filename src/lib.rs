//! Blinkshot - gesture-driven duel engine
//!
//! Players steer avatars with their heads, shoot by blinking and raise a
//! shield with a thumbs-up. Landmark extraction and sprite compositing live
//! outside this crate; this is the per-frame game state in between:
//! - `perception`: landmark frames and the sources that produce them
//! - `game`: interpretation, blink gates, tracking, projectiles, shields, match state
//! - `session`: the fixed-rate frame loop, UI triggers and snapshot broadcast

pub mod config;
pub mod game;
pub mod perception;
pub mod session;
pub mod util;

pub use config::{Config, ConfigError, GameConfig};
pub use game::{GameEvent, Match, MatchState, Slot};
pub use session::{Session, SessionCommand, SessionHandle, SessionSummary};
