//! Pose snapshot and its encoding into the Link record.
//!
//! [`PoseSnapshot`] is the reusable per-tick state: it is mutated in place
//! and never reallocated (strings are fixed-capacity). [`RecordEncoder`]
//! owns the one record buffer handed to the channel; static fields (version,
//! name, description) are written once, dynamic fields every tick.
//!
//! ## Coordinate conversion
//!
//! Positions are mirrored across X (host right-handed, consumer
//! left-handed). Facing vectors come from [`forward_from_angles`], which
//! already yields consumer-frame vectors, so they are not mirrored again.

use crate::host::PlayerPose;
use core::fmt::Write;
use link::layout::{
    self, CONTEXT_CAPACITY, DESCRIPTION_UNITS, IDENTITY_UNITS, LINK_VERSION, LinkBuffer,
    NAME_UNITS, offsets,
};
use link::math::{Vec3, forward_from_angles};

/// Byte capacity of the identity string held in the snapshot.
pub const IDENTITY_CAPACITY: usize = IDENTITY_UNITS;

/// Reusable pose record, updated in place every published tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseSnapshot {
    /// Tick heartbeat, wraps on overflow
    pub ui_tick: u32,
    /// Session context (world seed, decimal)
    pub context: heapless::String<CONTEXT_CAPACITY>,
    /// Player identity
    pub identity: heapless::String<IDENTITY_CAPACITY>,
    /// Avatar eye position, consumer frame
    pub avatar_position: Vec3,
    /// Avatar facing unit vector, consumer frame
    pub avatar_front: Vec3,
    /// Camera position, consumer frame
    pub camera_position: Vec3,
    /// Camera facing unit vector, consumer frame
    pub camera_front: Vec3,
}

impl PoseSnapshot {
    /// Empty snapshot with tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the heartbeat by one, wrapping at `u32::MAX`.
    #[inline]
    pub fn advance_tick(&mut self) -> u32 {
        self.ui_tick = self.ui_tick.wrapping_add(1);
        self.ui_tick
    }

    /// Rewrite the session context from the world seed.
    pub fn set_context_seed(&mut self, seed: i64) {
        self.context.clear();
        // An i64 is at most 20 bytes, well within capacity.
        let _ = write!(self.context, "{seed}");
    }

    /// Rewrite the identity, truncating at a character boundary.
    pub fn set_identity(&mut self, uid: &str) {
        self.identity.clear();
        for ch in uid.chars() {
            if self.identity.push(ch).is_err() {
                break;
            }
        }
    }

    /// Convert a host pose into consumer-frame vectors.
    pub fn set_pose(&mut self, pose: &PlayerPose<'_>) {
        let front = forward_from_angles(pose.facing_yaw(), pose.head_pitch);
        self.avatar_position = pose.eye_position().flip_x();
        self.avatar_front = front;
        self.camera_position = pose.camera_position.flip_x();
        // Camera orientation tracks the head.
        self.camera_front = front;
    }

    /// Full per-tick update: heartbeat, context, identity and pose.
    ///
    /// Returns the new tick value.
    pub fn update(&mut self, world_seed: i64, pose: &PlayerPose<'_>) -> u32 {
        let tick = self.advance_tick();
        self.set_context_seed(world_seed);
        self.set_identity(pose.uid);
        self.set_pose(pose);
        tick
    }

    /// Write the dynamic fields into `buf`. Never touches name or description.
    pub fn encode_into(&self, buf: &mut LinkBuffer) {
        layout::put_u32(buf, offsets::UI_VERSION, LINK_VERSION);
        layout::put_u32(buf, offsets::UI_TICK, self.ui_tick);
        layout::put_vec3(buf, offsets::AVATAR_POSITION, self.avatar_position);
        layout::put_vec3(buf, offsets::AVATAR_FRONT, self.avatar_front);
        layout::put_vec3(buf, offsets::AVATAR_TOP, Vec3::ZERO);
        layout::put_vec3(buf, offsets::CAMERA_POSITION, self.camera_position);
        layout::put_vec3(buf, offsets::CAMERA_FRONT, self.camera_front);
        layout::put_vec3(buf, offsets::CAMERA_TOP, Vec3::ZERO);
        layout::put_wide_str(buf, offsets::IDENTITY, IDENTITY_UNITS, &self.identity);
        layout::put_context(buf, self.context.as_bytes());
    }
}

/// Owner of the single record buffer written to the channel.
pub struct RecordEncoder {
    buffer: Box<LinkBuffer>,
}

impl RecordEncoder {
    /// Create a buffer with the static application fields filled in.
    pub fn new(name: &str, description: &str) -> Self {
        let mut buffer = layout::new_buffer();
        layout::put_u32(&mut buffer, offsets::UI_VERSION, LINK_VERSION);
        layout::put_wide_str(&mut buffer, offsets::NAME, NAME_UNITS, name);
        layout::put_wide_str(&mut buffer, offsets::DESCRIPTION, DESCRIPTION_UNITS, description);
        Self { buffer }
    }

    /// Encode `snapshot` and return the complete record.
    pub fn encode(&mut self, snapshot: &PoseSnapshot) -> &LinkBuffer {
        snapshot.encode_into(&mut self.buffer);
        &self.buffer
    }
}

impl std::fmt::Debug for RecordEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordEncoder")
            .field("len", &self.buffer.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use link::layout::{LINK_SIZE, LinkFrame};
    use proptest::prelude::*;
    use std::f64::consts::FRAC_PI_2;

    fn pose(uid: &str, position: Vec3, yaw: f64, pitch: f64) -> PlayerPose<'_> {
        PlayerPose {
            uid,
            position,
            eye_offset: Vec3::ZERO,
            camera_position: position,
            body_yaw: yaw,
            head_yaw: 0.0,
            head_pitch: pitch,
        }
    }

    #[test]
    fn test_quarter_turn_scenario() {
        let mut snapshot = PoseSnapshot::new();
        snapshot.update(42, &pose("uid-1", Vec3::new(1.0, 2.0, 3.0), FRAC_PI_2, 0.0));

        let mut encoder = RecordEncoder::new("Game", "Desc");
        let frame = LinkFrame::decode(&encoder.encode(&snapshot)[..]).unwrap();

        assert_eq!(frame.avatar_position, [-1.0, 2.0, 3.0]);
        assert_eq!(frame.camera_position, [-1.0, 2.0, 3.0]);
        assert!(frame.avatar_front[0].abs() < 1e-6);
        assert!(frame.avatar_front[1].abs() < 1e-6);
        assert!((frame.avatar_front[2] + 1.0).abs() < 1e-6);
        assert_eq!(frame.camera_front, frame.avatar_front);
        assert_eq!(frame.avatar_top, [0.0; 3]);
    }

    #[test]
    fn test_eye_offset_and_head_yaw_are_applied() {
        let host_pose = PlayerPose {
            uid: "p",
            position: Vec3::new(10.0, 64.0, -5.0),
            eye_offset: Vec3::new(0.0, 1.5, 0.0),
            camera_position: Vec3::new(12.0, 66.0, -5.0),
            body_yaw: FRAC_PI_2,
            head_yaw: -FRAC_PI_2,
            head_pitch: 0.0,
        };
        let mut snapshot = PoseSnapshot::new();
        snapshot.set_pose(&host_pose);

        assert_eq!(snapshot.avatar_position, Vec3::new(-10.0, 65.5, -5.0));
        assert_eq!(snapshot.camera_position, Vec3::new(-12.0, 66.0, -5.0));
        // body + head = 0 -> facing -X
        assert!((snapshot.avatar_front.x + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_static_fields_and_strings() {
        let mut snapshot = PoseSnapshot::new();
        snapshot.update(-1234567890123, &pose("player-uid", Vec3::ZERO, 0.0, 0.0));

        let mut encoder = RecordEncoder::new("Vintage Story", "Positional audio");
        let frame = LinkFrame::decode(&encoder.encode(&snapshot)[..]).unwrap();

        assert_eq!(frame.ui_version, LINK_VERSION);
        assert_eq!(frame.ui_tick, 1);
        assert_eq!(frame.name, "Vintage Story");
        assert_eq!(frame.description, "Positional audio");
        assert_eq!(frame.identity, "player-uid");
        assert_eq!(frame.context_str(), "-1234567890123");
    }

    #[test]
    fn test_tick_wraps() {
        let mut snapshot = PoseSnapshot {
            ui_tick: u32::MAX,
            ..PoseSnapshot::default()
        };
        assert_eq!(snapshot.advance_tick(), 0);
        assert_eq!(snapshot.advance_tick(), 1);
    }

    #[test]
    fn test_identity_truncates_on_char_boundary() {
        let mut snapshot = PoseSnapshot::new();
        let long: String = "é".repeat(IDENTITY_CAPACITY);
        snapshot.set_identity(&long);
        assert_eq!(snapshot.identity.len(), IDENTITY_CAPACITY);
        assert!(snapshot.identity.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_shorter_identity_overwrites_longer() {
        let mut snapshot = PoseSnapshot::new();
        let mut encoder = RecordEncoder::new("n", "d");
        snapshot.set_identity("a-much-longer-identity");
        encoder.encode(&snapshot);
        snapshot.set_identity("short");
        let frame = LinkFrame::decode(&encoder.encode(&snapshot)[..]).unwrap();
        assert_eq!(frame.identity, "short");
    }

    proptest! {
        #[test]
        fn prop_positions_flip_x_only(
            x in -1.0e6f64..1.0e6, y in -1.0e6f64..1.0e6, z in -1.0e6f64..1.0e6,
            yaw in -10.0f64..10.0, pitch in -1.6f64..1.6,
        ) {
            let mut snapshot = PoseSnapshot::new();
            snapshot.update(7, &pose("u", Vec3::new(x, y, z), yaw, pitch));

            let mut encoder = RecordEncoder::new("n", "d");
            let record = encoder.encode(&snapshot);
            prop_assert_eq!(record.len(), LINK_SIZE);

            let frame = LinkFrame::decode(&record[..]).unwrap();
            prop_assert_eq!(frame.avatar_position, [-x as f32, y as f32, z as f32]);
            prop_assert_eq!(frame.camera_position, [-x as f32, y as f32, z as f32]);

            let f = frame.avatar_front;
            let len = (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt();
            prop_assert!((len - 1.0).abs() < 1e-5);
        }
    }
}
