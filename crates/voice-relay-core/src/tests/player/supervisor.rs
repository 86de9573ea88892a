use super::fakes::{FakeLauncher, FakePlayer, FakeProcessTable, quick_supervisor_settings, supervisor};
use crate::ShutdownFlag;

use std::{
    path::PathBuf,
    sync::{Arc, atomic::Ordering},
};

fn missing_executable() -> PathBuf {
    PathBuf::from("/nonexistent/SoundPad/Soundpad.exe")
}

/// WHAT: A responsive player is accepted on the fast path
/// WHY: The common case must cost a single connection and no process scan
#[test]
fn given_responsive_player_when_ensuring_running_then_true_without_scan() {
    // Given: A reachable player
    let player = FakePlayer::reachable();
    let processes = Arc::new(FakeProcessTable::with_running(false));
    let launcher = Arc::new(FakeLauncher::default());
    let sup = supervisor(
        &player,
        Arc::clone(&processes),
        Arc::clone(&launcher),
        quick_supervisor_settings(missing_executable(), true),
        ShutdownFlag::new(),
    );

    // When: Ensuring it runs
    let running = sup.ensure_running();

    // Then: True after one connection, no scan, no launch
    assert!(running);
    assert_eq!(player.connects(), 1);
    assert_eq!(processes.scans.load(Ordering::SeqCst), 0);
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
}

/// WHAT: Missing executable with auto-start on returns false without spawning
/// WHY: A bad path must be reported, never panicked on or retried
#[test]
fn given_missing_executable_when_auto_start_enabled_then_false_and_no_spawn() {
    // Given: Player down, no process, executable missing
    let player = FakePlayer::unreachable();
    let launcher = Arc::new(FakeLauncher::default());
    let sup = supervisor(
        &player,
        Arc::new(FakeProcessTable::with_running(false)),
        Arc::clone(&launcher),
        quick_supervisor_settings(missing_executable(), true),
        ShutdownFlag::new(),
    );

    // When: Ensuring it runs
    let running = sup.ensure_running();

    // Then: False, nothing launched
    assert!(!running);
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
}

/// WHAT: A running but silent process gets the extended probe, then false
/// WHY: A player still initializing deserves time, but not forever
#[test]
fn given_running_unresponsive_process_when_ensuring_then_extended_probe_then_false() {
    // Given: Process present, channel never answers
    let player = FakePlayer::unreachable();
    let launcher = Arc::new(FakeLauncher::default());
    let sup = supervisor(
        &player,
        Arc::new(FakeProcessTable::with_running(true)),
        Arc::clone(&launcher),
        quick_supervisor_settings(missing_executable(), true),
        ShutdownFlag::new(),
    );

    // When: Ensuring it runs
    let running = sup.ensure_running();

    // Then: Fast probe plus five warmup probes, no launch
    assert!(!running);
    assert_eq!(player.connects(), 1 + 5);
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
}

/// WHAT: A running player that accepts the channel but never answers is unresponsive
/// WHY: Connecting alone does not prove the player can take commands
#[test]
fn given_running_process_that_ignores_queries_when_ensuring_then_false_without_launch() {
    // Given: Process present, channel opens but the count query fails
    let player = FakePlayer::reachable();
    player.set_unresponsive(true);
    let launcher = Arc::new(FakeLauncher::default());
    let sup = supervisor(
        &player,
        Arc::new(FakeProcessTable::with_running(true)),
        Arc::clone(&launcher),
        quick_supervisor_settings(missing_executable(), true),
        ShutdownFlag::new(),
    );

    // When: Ensuring it runs
    let running = sup.ensure_running();

    // Then: Every connection attempt goes unanswered and nothing is launched
    assert!(!running);
    assert_eq!(player.connects(), 1 + 5);
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
}

/// WHAT: Auto-start disabled and no process returns false
/// WHY: Users may opt out of the tool launching programs
#[test]
fn given_auto_start_disabled_when_player_absent_then_false() {
    // Given: Player absent, auto-start off
    let player = FakePlayer::unreachable();
    let launcher = Arc::new(FakeLauncher::default());
    let sup = supervisor(
        &player,
        Arc::new(FakeProcessTable::with_running(false)),
        Arc::clone(&launcher),
        quick_supervisor_settings(missing_executable(), false),
        ShutdownFlag::new(),
    );

    // When / Then: False, nothing launched
    assert!(!sup.ensure_running());
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
}

/// WHAT: An absent player is launched and verified
/// WHY: Auto-start is the recovery path when the player was never opened
#[test]
fn given_existing_executable_when_player_absent_then_launched_and_true() {
    // Given: Executable on disk, launcher that brings the player up
    let dir = tempfile::tempdir().unwrap();
    let exe = dir.path().join("Soundpad.exe");
    std::fs::write(&exe, b"").unwrap();
    let player = FakePlayer::unreachable();
    let launcher = Arc::new(FakeLauncher {
        brings_up: Some(player.clone()),
        ..FakeLauncher::default()
    });
    let sup = supervisor(
        &player,
        Arc::new(FakeProcessTable::with_running(false)),
        Arc::clone(&launcher),
        quick_supervisor_settings(exe, true),
        ShutdownFlag::new(),
    );

    // When: Ensuring it runs
    let running = sup.ensure_running();

    // Then: Launched once and verified
    assert!(running);
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
}

/// WHAT: A failed spawn returns false
/// WHY: Launch errors are logged and reported, never propagated as panics
#[test]
fn given_failing_launcher_when_player_absent_then_false() {
    // Given: Executable on disk but spawning fails
    let dir = tempfile::tempdir().unwrap();
    let exe = dir.path().join("Soundpad.exe");
    std::fs::write(&exe, b"").unwrap();
    let player = FakePlayer::unreachable();
    let launcher = Arc::new(FakeLauncher {
        fail: true,
        ..FakeLauncher::default()
    });
    let sup = supervisor(
        &player,
        Arc::new(FakeProcessTable::with_running(false)),
        Arc::clone(&launcher),
        quick_supervisor_settings(exe, true),
        ShutdownFlag::new(),
    );

    // When / Then: False after one launch attempt, no post-launch probing
    assert!(!sup.ensure_running());
    assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    assert_eq!(player.connects(), 1);
}

/// WHAT: Shutdown short-circuits before any connection
/// WHY: Teardown must not start or probe the player
#[test]
fn given_shutdown_requested_when_ensuring_then_false_without_connecting() {
    // Given: A reachable player and a requested shutdown
    let player = FakePlayer::reachable();
    let shutdown = ShutdownFlag::new();
    shutdown.request();
    let sup = supervisor(
        &player,
        Arc::new(FakeProcessTable::with_running(true)),
        Arc::new(FakeLauncher::default()),
        quick_supervisor_settings(missing_executable(), true),
        shutdown,
    );

    // When / Then: False, no connection
    assert!(!sup.ensure_running());
    assert_eq!(player.connects(), 0);
}
