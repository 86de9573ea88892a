mod machine;
mod state;

pub use {
    machine::{PressOutcome, ReleaseOutcome, SessionSettings, SessionStateMachine},
    state::{AtomicSessionState, ModelStatus, SessionState},
};
