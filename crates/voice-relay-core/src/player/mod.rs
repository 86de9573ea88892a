mod control;
mod error;
mod playback;
mod probe;
mod process;
pub mod soundpad;
mod supervisor;

pub use {
    control::{PlaybackRouting, PlayerConnector, PlayerControl},
    error::{PlayerError, PlayerResult},
    playback::{PlaybackController, PlaybackRequest, PlaybackSettings},
    probe::ConnectionProbe,
    process::{DetachedLauncher, ProcessLauncher, ProcessTable, SystemProcessTable},
    soundpad::{SoundpadClient, SoundpadConnector},
    supervisor::{PlayerSupervisor, SupervisorSettings},
};
