use std::time::Instant;

/// Commands sent from the hotkey handler to the main application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// The push-to-talk key went down.
    HotkeyDown {
        /// When the edge was observed.
        at: Instant,
    },
    /// The push-to-talk key was released.
    HotkeyUp {
        /// When the edge was observed.
        at: Instant,
    },
    /// Request application shutdown.
    Shutdown,
}
