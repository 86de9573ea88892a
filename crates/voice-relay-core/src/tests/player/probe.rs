use super::fakes::FakePlayer;
use crate::{RetryPolicy, player::ConnectionProbe};

use std::{sync::Arc, time::Duration};

/// WHAT: A reachable player is reported after one connection
/// WHY: The probe must not spend retries when the first attempt works
#[test]
fn given_reachable_player_when_probing_then_true_after_one_attempt() {
    // Given: A reachable player
    let player = FakePlayer::reachable();
    let probe = ConnectionProbe::new(Arc::new(player.clone()));

    // When: Probing with three attempts
    let reachable = probe.probe(RetryPolicy::new(3, Duration::ZERO));

    // Then: True, one connection
    assert!(reachable);
    assert_eq!(player.connects(), 1);
}

/// WHAT: An unreachable player exhausts the budget with fresh connections
/// WHY: Each attempt must open a new handle; none is cached
#[test]
fn given_unreachable_player_when_probing_then_false_after_all_attempts() {
    // Given: An unreachable player
    let player = FakePlayer::unreachable();
    let probe = ConnectionProbe::new(Arc::new(player.clone()));

    // When: Probing with three attempts
    let reachable = probe.probe(RetryPolicy::new(3, Duration::from_millis(1)));

    // Then: False after three connections
    assert!(!reachable);
    assert_eq!(player.connects(), 3);
}

/// WHAT: A player that accepts the channel but rejects the count query is unreachable
/// WHY: A hung or restarting player must not pass the liveness check
#[test]
fn given_connectable_but_silent_player_when_checked_then_unreachable() {
    // Given: A player that connects but fails every entry-count query
    let player = FakePlayer::reachable();
    player.set_unresponsive(true);
    let probe = ConnectionProbe::new(Arc::new(player.clone()));

    // When: Probing with two attempts
    let reachable = probe.probe(RetryPolicy::new(2, Duration::ZERO));

    // Then: False, and each attempt connected afresh
    assert!(!reachable);
    assert_eq!(player.connects(), 2);
}
