//! Launch-and-verify protocol for the external player process.

use crate::{
    player::{ConnectionProbe, ProcessLauncher, ProcessTable},
    retry::RetryPolicy,
    shutdown::ShutdownFlag,
};

use std::{path::PathBuf, sync::Arc, time::Duration};

use tracing::{debug, error, info, instrument, warn};

/// Budgets and paths for [`PlayerSupervisor::ensure_running`].
#[derive(Debug, Clone, PartialEq)]
pub struct SupervisorSettings {
    /// Player executable to launch when it is not running.
    pub executable: PathBuf,
    /// Name matched against the process table.
    pub process_name: String,
    /// Whether a missing player may be launched.
    pub auto_start: bool,
    /// Probe used before anything else.
    pub fast_probe: RetryPolicy,
    /// Probe used when the process exists but did not answer.
    pub warmup_probe: RetryPolicy,
    /// Probe used after launching the process.
    pub launch_probe: RetryPolicy,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("SoundPad/Soundpad.exe"),
            process_name: "soundpad".to_string(),
            auto_start: true,
            fast_probe: RetryPolicy::new(1, Duration::from_millis(500)),
            warmup_probe: RetryPolicy::new(5, Duration::from_secs(1)),
            launch_probe: RetryPolicy::new(10, Duration::from_secs(1)),
        }
    }
}

/// Keeps the external player running and responsive.
pub struct PlayerSupervisor {
    probe: ConnectionProbe,
    processes: Arc<dyn ProcessTable>,
    launcher: Arc<dyn ProcessLauncher>,
    settings: SupervisorSettings,
    shutdown: ShutdownFlag,
}

impl PlayerSupervisor {
    /// Create a supervisor over the given probe and OS seams.
    pub fn new(
        probe: ConnectionProbe,
        processes: Arc<dyn ProcessTable>,
        launcher: Arc<dyn ProcessLauncher>,
        settings: SupervisorSettings,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            probe,
            processes,
            launcher,
            settings,
            shutdown,
        }
    }

    /// Supervisor settings.
    pub fn settings(&self) -> &SupervisorSettings {
        &self.settings
    }

    /// Make sure the player answers on its control channel, launching it if
    /// allowed.
    ///
    /// Blocking; runs on a worker thread. Returns `false` instead of failing.
    #[instrument(skip(self))]
    pub fn ensure_running(&self) -> bool {
        if self.shutdown.is_requested() {
            debug!("Shutdown requested, not checking player");
            return false;
        }

        if self.probe.probe(self.settings.fast_probe) {
            return true;
        }

        if self.processes.is_running(&self.settings.process_name) {
            info!(
                process = %self.settings.process_name,
                "Player process found, waiting for it to respond"
            );

            if self.probe.probe(self.settings.warmup_probe) {
                return true;
            }

            warn!(
                process = %self.settings.process_name,
                "Player process is running but unresponsive"
            );
            return false;
        }

        if !self.settings.auto_start {
            warn!("Player is not running and auto start is disabled");
            return false;
        }

        let executable = &self.settings.executable;
        if !executable.exists() {
            error!(path = ?executable, "Player executable not found");
            return false;
        }

        if self.shutdown.is_requested() {
            return false;
        }

        if let Err(e) = self.launcher.launch(executable) {
            error!(path = ?executable, error = %e, "Failed to launch player");
            return false;
        }

        if self.probe.probe(self.settings.launch_probe) {
            info!("Player launched and responding");
            true
        } else {
            error!(path = ?executable, "Player launched but never became responsive");
            false
        }
    }

    /// Run [`PlayerSupervisor::ensure_running`] once and log the result.
    pub fn check_readiness(&self) -> bool {
        let ready = self.ensure_running();
        if ready {
            info!("Player ready");
        } else {
            warn!("Player not ready; playback will retry on demand");
        }
        ready
    }
}
