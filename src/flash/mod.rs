//! Direction flash state
//!
//! Gives the UI a short-lived "just went up/down" signal that resets itself.
//! [`DirectionFlash`] is the synchronous state machine; [`FlashSignal`]
//! drives it with Tokio timers.

mod signal;

pub use signal::FlashSignal;

use crate::project::Direction;
use std::time::Duration;

/// Default time a flash stays visible
pub const DEFAULT_FLASH_RESET: Duration = Duration::from_millis(300);

/// Identifies one arming of the reset timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashToken(u64);

/// Neutral / Up / Down state with generation-guarded resets
///
/// Every arm bumps the generation. An expiry only applies when it carries
/// the latest generation, so a timer from a superseded tick can never clear
/// a newer flash.
#[derive(Debug, Clone, Default)]
pub struct DirectionFlash {
    state: Direction,
    generation: u64,
}

impl DirectionFlash {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Direction {
        self.state
    }

    /// Apply a projected direction
    ///
    /// `Up`/`Down` set the state and return a token for the new reset
    /// timer. `Neutral` changes nothing.
    pub fn observe(&mut self, direction: Direction) -> Option<FlashToken> {
        if direction.is_neutral() {
            return None;
        }
        self.state = direction;
        self.generation += 1;
        Some(FlashToken(self.generation))
    }

    /// Reset to `Neutral` if `token` is from the latest arm
    pub fn expire(&mut self, token: FlashToken) -> bool {
        if token.0 != self.generation || self.state.is_neutral() {
            return false;
        }
        self.state = Direction::Neutral;
        true
    }
}
