use crate::{AtomicSessionState, SessionState};

const ALL: [SessionState; 4] = [
    SessionState::Idle,
    SessionState::Recording,
    SessionState::Processing,
    SessionState::Playing,
];

/// WHAT: Exactly the six lifecycle edges are allowed
/// WHY: No transition outside the lifecycle table may ever be taken
#[test]
fn given_every_state_pair_when_checking_transitions_then_only_lifecycle_edges_allowed() {
    // Given: The lifecycle edges
    let allowed = [
        (SessionState::Idle, SessionState::Recording),
        (SessionState::Recording, SessionState::Processing),
        (SessionState::Recording, SessionState::Idle),
        (SessionState::Processing, SessionState::Playing),
        (SessionState::Processing, SessionState::Idle),
        (SessionState::Playing, SessionState::Idle),
    ];

    // When / Then: Every pair is allowed iff it is a lifecycle edge
    for from in ALL {
        for to in ALL {
            assert_eq!(
                from.can_transition_to(to),
                allowed.contains(&(from, to)),
                "{from} -> {to}"
            );
        }
    }
}

/// WHAT: Compare-and-set only succeeds from the expected state
/// WHY: Callers branch on the CAS result instead of re-reading state
#[test]
fn given_atomic_state_when_cas_with_stale_expectation_then_unchanged() {
    // Given: State in Recording
    let state = AtomicSessionState::new(SessionState::Recording);

    // When: CAS expecting Idle, then expecting Recording
    let stale = state.compare_and_set(SessionState::Idle, SessionState::Processing);
    let fresh = state.compare_and_set(SessionState::Recording, SessionState::Processing);

    // Then: Only the second succeeds
    assert!(!stale);
    assert!(fresh);
    assert_eq!(state.load(), SessionState::Processing);
}
