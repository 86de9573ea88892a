//! Process table lookups and detached launching of the player executable.

use crate::player::{PlayerError, PlayerResult};

use std::{
    panic::Location,
    path::Path,
    process::{Command, Stdio},
};

use error_location::ErrorLocation;
use sysinfo::{ProcessStatus, System};
use tracing::{debug, info};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;
#[cfg(windows)]
const DETACHED_PROCESS: u32 = 0x0000_0008;

/// Read-only view of running processes.
pub trait ProcessTable: Send + Sync {
    /// Whether a live process whose name contains `name` exists.
    fn is_running(&self, name: &str) -> bool;
}

/// Starts the player executable.
pub trait ProcessLauncher: Send + Sync {
    /// Start `executable` without waiting for it.
    fn launch(&self, executable: &Path) -> PlayerResult<()>;
}

/// [`ProcessTable`] backed by a fresh sysinfo snapshot per query.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcessTable;

impl ProcessTable for SystemProcessTable {
    fn is_running(&self, name: &str) -> bool {
        let system = System::new_all();
        let needle = name.to_lowercase();

        let found = system.processes().values().any(|process| {
            let alive = !matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead);
            alive
                && process
                    .name()
                    .to_string_lossy()
                    .to_lowercase()
                    .contains(&needle)
        });

        debug!(name, found, "Process table scanned");
        found
    }
}

/// Launches the player fully detached from this process.
///
/// No console window, no inherited stdio, and the child is never waited on
/// by the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedLauncher;

impl ProcessLauncher for DetachedLauncher {
    #[track_caller]
    fn launch(&self, executable: &Path) -> PlayerResult<()> {
        let location = ErrorLocation::from(Location::caller());

        let mut command = Command::new(executable);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        if let Some(dir) = executable.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW | DETACHED_PROCESS);
        }

        let child = command.spawn().map_err(|source| PlayerError::LaunchFailed {
            path: executable.to_path_buf(),
            source,
            location,
        })?;

        info!(pid = child.id(), path = ?executable, "Player launched");

        // The child must be reaped on Unix so it does not linger as a zombie.
        #[cfg(unix)]
        {
            let mut child = child;
            std::thread::spawn(move || {
                let _ = child.wait();
            });
        }

        #[cfg(not(unix))]
        drop(child);

        Ok(())
    }
}
