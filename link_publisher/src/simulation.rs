//! Simulated host: a player walking in a circle while looking around.
//!
//! Used by the `link_publisher` binary to exercise the full publishing path
//! without a game engine attached.

use crate::config::SimulationConfig;
use crate::host::{LinkHost, PlayerPose};
use crate::runtime::HostClock;
use link::math::Vec3;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::time::Duration;
use tracing::info;

/// Ground level of the simulated walk.
const GROUND_Y: f64 = 110.0;

/// Simulation host implementing [`LinkHost`].
#[derive(Debug, Clone)]
pub struct SimulatedHost {
    config: SimulationConfig,
    elapsed: Duration,
    ticks: u64,
    position: Vec3,
    body_yaw: f64,
    head_yaw: f64,
    head_pitch: f64,
}

impl SimulatedHost {
    /// Create a host at elapsed time zero.
    pub fn new(config: SimulationConfig) -> Self {
        let mut host = Self {
            config,
            elapsed: Duration::ZERO,
            ticks: 0,
            position: Vec3::ZERO,
            body_yaw: 0.0,
            head_yaw: 0.0,
            head_pitch: 0.0,
        };
        host.update_pose();
        host
    }

    /// Ticks advanced so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated time.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    fn update_pose(&mut self) {
        let t = self.elapsed.as_secs_f64();
        let angle = TAU * t / self.config.orbit_period_s;
        let (sin_a, cos_a) = angle.sin_cos();
        let r = self.config.orbit_radius;

        self.position = Vec3::new(r * cos_a, GROUND_Y, r * sin_a);
        // Walking direction is tangent to the circle.
        self.body_yaw = angle + FRAC_PI_2;
        self.head_yaw = 0.4 * (t * 0.7).sin();
        self.head_pitch = 0.25 * (t * 0.3).sin();
    }
}

impl LinkHost for SimulatedHost {
    fn is_single_player(&self) -> bool {
        self.config.single_player
    }

    fn world_seed(&self) -> i64 {
        self.config.world_seed
    }

    fn player(&self) -> Option<PlayerPose<'_>> {
        if self.ticks <= self.config.absent_ticks {
            return None;
        }
        let eye_offset = Vec3::new(0.0, self.config.eye_height, 0.0);
        Some(PlayerPose {
            uid: &self.config.player_uid,
            position: self.position,
            eye_offset,
            // First person: camera sits at the eyes.
            camera_position: self.position + eye_offset,
            body_yaw: self.body_yaw,
            head_yaw: self.head_yaw,
            head_pitch: self.head_pitch,
        })
    }
}

impl HostClock for SimulatedHost {
    fn advance(&mut self, dt: Duration) {
        self.ticks += 1;
        self.elapsed += dt;
        self.update_pose();
        if self.ticks == self.config.absent_ticks + 1 {
            info!("Simulated player {} joined", self.config.player_uid);
        }
    }
}
