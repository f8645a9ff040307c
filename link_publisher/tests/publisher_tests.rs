//! End-to-end publishing tests: a fake host drives `LinkSystem` into a
//! resource in a temporary directory, and the record is decoded back.

use link::layout::{LINK_SIZE, LINK_VERSION, LinkFrame};
use link::math::Vec3;
use link_publisher::host::{HostSystem, LinkHost, PlayerPose};
use link_publisher::runtime::HostClock;
use link_publisher::{LinkSystem, SkipReason, TickOutcome, TickRuntime};
use link_shared_memory::{ChannelStrategy, LinkChannelManager};
use std::f64::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::{TempDir, tempdir};

const EPS: f32 = 1e-5;

struct FakeHost {
    single_player: bool,
    seed: i64,
    uid: String,
    present: bool,
    position: Vec3,
    body_yaw: f64,
    head_pitch: f64,
    advanced: u64,
}

impl FakeHost {
    fn new() -> Self {
        Self {
            single_player: false,
            seed: 12345,
            uid: "p1".to_string(),
            present: true,
            position: Vec3::new(10.0, 64.0, -5.0),
            body_yaw: 0.0,
            head_pitch: 0.0,
            advanced: 0,
        }
    }
}

impl LinkHost for FakeHost {
    fn is_single_player(&self) -> bool {
        self.single_player
    }

    fn world_seed(&self) -> i64 {
        self.seed
    }

    fn player(&self) -> Option<PlayerPose<'_>> {
        if !self.present {
            return None;
        }
        let eye_offset = Vec3::new(0.0, 1.6, 0.0);
        Some(PlayerPose {
            uid: &self.uid,
            position: self.position,
            eye_offset,
            camera_position: self.position + eye_offset,
            body_yaw: self.body_yaw,
            head_yaw: 0.0,
            head_pitch: self.head_pitch,
        })
    }
}

impl HostClock for FakeHost {
    fn advance(&mut self, _dt: Duration) {
        self.advanced += 1;
    }
}

fn always_open_system() -> (TempDir, PathBuf, LinkSystem) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("MumbleLink.1000");
    let manager = LinkChannelManager::new(ChannelStrategy::AlwaysOpen, path.clone());
    let system = LinkSystem::new(manager, "Vintage Story", "test description");
    (dir, path, system)
}

fn read_frame(path: &Path) -> LinkFrame {
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(bytes.len(), LINK_SIZE);
    LinkFrame::decode(&bytes).unwrap()
}

fn assert_close(actual: [f32; 3], expected: [f32; 3]) {
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!((a - e).abs() < EPS, "{actual:?} != {expected:?}");
    }
}

#[test]
fn test_publishes_flipped_pose_into_resource() {
    let (_dir, path, mut system) = always_open_system();
    let mut host = FakeHost::new();
    host.body_yaw = FRAC_PI_2;

    system.start(&host).unwrap();
    assert_eq!(system.publish(&host), TickOutcome::Published(1));

    let frame = read_frame(&path);
    assert_eq!(frame.ui_version, LINK_VERSION);
    assert_eq!(frame.ui_tick, 1);
    assert_eq!(frame.name, "Vintage Story");
    assert_eq!(frame.description, "test description");
    assert_eq!(frame.identity, "p1");
    assert_eq!(frame.context_str(), "12345");

    assert_close(frame.avatar_position, [-10.0, 65.6, -5.0]);
    assert_close(frame.camera_position, [-10.0, 65.6, -5.0]);
    assert_close(frame.avatar_front, [0.0, 0.0, -1.0]);
    assert_close(frame.camera_front, frame.avatar_front);
    assert_eq!(frame.avatar_top, [0.0; 3]);
    assert_eq!(frame.camera_top, [0.0; 3]);
}

#[test]
fn test_heartbeat_counts_published_ticks_only() {
    let (_dir, path, mut system) = always_open_system();
    let mut host = FakeHost::new();
    system.start(&host).unwrap();

    assert_eq!(system.publish(&host), TickOutcome::Published(1));
    host.present = false;
    assert_eq!(
        system.publish(&host),
        TickOutcome::Skipped(SkipReason::NoPlayer)
    );
    host.present = true;
    assert_eq!(system.publish(&host), TickOutcome::Published(2));

    assert_eq!(read_frame(&path).ui_tick, 2);
    let stats = system.stats();
    assert_eq!(stats.ticks, 3);
    assert_eq!(stats.published, 2);
    assert_eq!(stats.skipped, 1);
}

#[test]
fn test_single_player_never_writes() {
    let (_dir, path, mut system) = always_open_system();
    let mut host = FakeHost::new();
    host.single_player = true;
    system.start(&host).unwrap();

    for _ in 0..5 {
        assert_eq!(
            system.publish(&host),
            TickOutcome::Skipped(SkipReason::SinglePlayer)
        );
    }
    assert_eq!(read_frame(&path).ui_tick, 0);
    assert_eq!(system.snapshot().ui_tick, 0);
    assert_eq!(system.manager().stats().frames_written, 0);
}

#[test]
fn test_identity_and_context_follow_host() {
    let (_dir, path, mut system) = always_open_system();
    let mut host = FakeHost::new();
    system.start(&host).unwrap();
    system.publish(&host);

    host.uid = "p2".to_string();
    host.seed = -42;
    system.publish(&host);

    let frame = read_frame(&path);
    assert_eq!(frame.identity, "p2");
    assert_eq!(frame.context_str(), "-42");
}

#[test]
fn test_dispose_releases_channel() {
    let (_dir, _path, mut system) = always_open_system();
    let host = FakeHost::new();
    system.start(&host).unwrap();
    assert!(system.manager().is_open());

    system.dispose();
    assert!(!system.manager().is_open());
    assert!(!system.manager().is_started());
    assert_eq!(
        system.publish(&host),
        TickOutcome::Skipped(SkipReason::ChannelClosed)
    );
}

#[test]
fn test_runtime_drives_system_for_bounded_ticks() {
    let (_dir, path, mut system) = always_open_system();
    let mut host = FakeHost::new();

    let mut runtime = TickRuntime::new(Duration::from_millis(1)).with_max_ticks(4);
    runtime.run(&mut host, &mut system).unwrap();

    assert_eq!(runtime.stats().tick_count, 4);
    assert_eq!(host.advanced, 4);
    assert_eq!(read_frame(&path).ui_tick, 4);
    assert!(!system.manager().is_started());
}

#[cfg(target_os = "linux")]
mod presence {
    use super::*;
    use std::fs::File;

    fn consumer_create(path: &Path) {
        let file = File::create(path).unwrap();
        file.set_len(LINK_SIZE as u64).unwrap();
    }

    #[test]
    fn test_follows_consumer_lifecycle() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("MumbleLink.1000");
        let manager = LinkChannelManager::new(ChannelStrategy::PresenceWatched, path.clone());
        let mut system = LinkSystem::new(manager, "Vintage Story", "");
        let host = FakeHost::new();

        system.start(&host).unwrap();
        assert_eq!(
            system.publish(&host),
            TickOutcome::Skipped(SkipReason::ChannelClosed)
        );
        assert!(!path.exists());

        consumer_create(&path);
        assert_eq!(system.publish(&host), TickOutcome::Published(1));
        assert_eq!(read_frame(&path).ui_tick, 1);

        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            system.publish(&host),
            TickOutcome::Skipped(SkipReason::ChannelClosed)
        );
        assert!(!path.exists());

        consumer_create(&path);
        assert_eq!(system.publish(&host), TickOutcome::Published(2));
        assert_eq!(read_frame(&path).ui_tick, 2);

        system.dispose();
    }
}
