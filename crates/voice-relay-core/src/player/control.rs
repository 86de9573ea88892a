use crate::player::PlayerResult;

use std::path::Path;

/// Which outputs a play command is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackRouting {
    /// Play through the local speakers.
    pub speakers: bool,
    /// Inject into the virtual microphone.
    pub microphone: bool,
}

impl Default for PlaybackRouting {
    fn default() -> Self {
        Self {
            speakers: true,
            microphone: true,
        }
    }
}

/// Commands the external player understands.
///
/// One value is one open control channel. Every call may fail independently;
/// the player gives no atomicity across calls.
pub trait PlayerControl: Send {
    /// Number of entries in the player's library.
    fn sound_count(&mut self) -> PlayerResult<u32>;

    /// Append a file to the library.
    fn add_sound(&mut self, path: &Path) -> PlayerResult<()>;

    /// Play the entry at `index` (1-based).
    fn play_sound(&mut self, index: u32, routing: PlaybackRouting) -> PlayerResult<()>;

    /// Stop whatever is playing.
    fn stop_sound(&mut self) -> PlayerResult<()>;

    /// Select the entry at `index` (1-based).
    fn select_index(&mut self, index: u32) -> PlayerResult<()>;

    /// Remove the selected entries from the library.
    fn remove_selected(&mut self, remove_from_disk: bool) -> PlayerResult<()>;
}

/// Opens fresh control channels on demand.
///
/// Handles are never cached or shared: each operation opens its own and drops
/// it when done.
pub trait PlayerConnector: Send + Sync {
    /// Open a new control channel.
    fn connect(&self) -> PlayerResult<Box<dyn PlayerControl>>;
}
