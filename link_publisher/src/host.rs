//! Host integration surface.
//!
//! The host engine owns the lifecycle and the tick scheduler. It exposes a
//! read-only view of the session and the local player through [`LinkHost`]
//! and drives any [`HostSystem`] through `start`, `tick` and `dispose`.
//!
//! # Lifecycle
//!
//! 1. `start()` - Called once when the client side comes up
//! 2. `tick()` - Called every tick interval by the host scheduler
//! 3. `dispose()` - Called on every shutdown path
//!
//! | Operation | Blocking | Errors |
//! |-----------|----------|--------|
//! | `start()` | Directory watch / mapping setup | Returned to the host |
//! | `tick()` | Never | Absorbed, logged |
//! | `dispose()` | Never | None |

use link::math::Vec3;
use std::time::Duration;

/// Pose of the local player entity for one tick, in host coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPose<'a> {
    /// Stable unique player identifier
    pub uid: &'a str,
    /// Entity feet position
    pub position: Vec3,
    /// Eye offset relative to `position`
    pub eye_offset: Vec3,
    /// Camera position
    pub camera_position: Vec3,
    /// Body yaw in radians
    pub body_yaw: f64,
    /// Head yaw relative to the body, in radians
    pub head_yaw: f64,
    /// Head pitch in radians
    pub head_pitch: f64,
}

impl PlayerPose<'_> {
    /// Eye position in host coordinates.
    #[inline]
    pub fn eye_position(&self) -> Vec3 {
        self.position + self.eye_offset
    }

    /// Absolute facing yaw (body + head).
    #[inline]
    pub fn facing_yaw(&self) -> f64 {
        self.body_yaw + self.head_yaw
    }
}

/// Read-only view of the host session.
pub trait LinkHost {
    /// True when no remote party could be listening.
    fn is_single_player(&self) -> bool;

    /// Seed of the current world, used as the session context.
    fn world_seed(&self) -> i64;

    /// Local player pose, or `None` before a player entity exists.
    fn player(&self) -> Option<PlayerPose<'_>>;
}

/// A system whose lifecycle is driven by the host.
pub trait HostSystem {
    /// Error surfaced from `start`.
    type Error: std::error::Error;

    /// Returns the system's identifier for logs.
    fn name(&self) -> &'static str;

    /// Called once before the first tick.
    fn start(&mut self, host: &dyn LinkHost) -> Result<(), Self::Error>;

    /// Called once per host tick with the elapsed time since the last one.
    fn tick(&mut self, host: &dyn LinkHost, dt: Duration);

    /// Called on teardown. Must be idempotent.
    fn dispose(&mut self);
}
