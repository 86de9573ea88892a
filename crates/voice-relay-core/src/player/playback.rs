//! Serialized upload → play → cleanup sequence against the external player.
//!
//! At most one sequence runs at a time: every attempt holds `serial` from the
//! initial stop to the final cleanup. There is no queue; a second submission
//! simply blocks on the mutex until the first finishes.
//!
//! The index of the uploaded entry is inferred from the library size before
//! and after the upload. That only holds while nothing else edits the
//! library in between, which the mutex guarantees for this process but not
//! for a user clicking around in the player.

use crate::{
    player::{PlaybackRouting, PlayerConnector, PlayerControl, PlayerError, PlayerResult, PlayerSupervisor},
    retry::RetryPolicy,
    shutdown::ShutdownFlag,
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Delays and budgets for playback.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSettings {
    /// Stop whatever is playing before each attempt.
    pub force_stop_before_play: bool,
    /// Pause before each attempt, retries included.
    pub pre_play_delay: Duration,
    /// Pause between the upload and re-reading the entry count.
    pub upload_settle: Duration,
    /// Added to the estimated duration before cleanup.
    pub completion_margin: Duration,
    /// Upper bound on the wait for playback to finish.
    pub playback_timeout: Duration,
    /// Pause between selecting an entry and removing it.
    pub select_settle: Duration,
    /// Pause after cleanup before the mutex is released.
    pub post_cleanup_delay: Duration,
    /// Attempts of the whole sequence per submission.
    pub max_attempts: u32,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            force_stop_before_play: true,
            pre_play_delay: Duration::from_millis(200),
            upload_settle: Duration::from_millis(150),
            completion_margin: Duration::from_millis(500),
            playback_timeout: Duration::from_secs(10),
            select_settle: Duration::from_millis(50),
            post_cleanup_delay: Duration::from_millis(100),
            max_attempts: 3,
        }
    }
}

impl PlaybackSettings {
    /// How long to wait after starting a clip of `estimated` length.
    pub fn wait_for(&self, estimated: Duration) -> Duration {
        (estimated + self.completion_margin).min(self.playback_timeout)
    }
}

/// One clip to play.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackRequest {
    /// Audio file; made absolute before upload.
    pub path: PathBuf,
    /// Estimated clip length.
    pub estimated_duration: Duration,
    /// Output routing for this clip.
    pub routing: PlaybackRouting,
}

struct Inner {
    supervisor: Arc<PlayerSupervisor>,
    connector: Arc<dyn PlayerConnector>,
    settings: PlaybackSettings,
    serial: Mutex<()>,
    playing: AtomicBool,
    shutdown: ShutdownFlag,
}

/// Plays clips through the external player, one at a time.
#[derive(Clone)]
pub struct PlaybackController {
    inner: Arc<Inner>,
}

/// Clears the playing flag when dropped.
struct PlayingGuard<'a>(&'a AtomicBool);

impl<'a> PlayingGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for PlayingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl PlaybackController {
    /// Create a controller.
    pub fn new(
        supervisor: Arc<PlayerSupervisor>,
        connector: Arc<dyn PlayerConnector>,
        settings: PlaybackSettings,
        shutdown: ShutdownFlag,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                supervisor,
                connector,
                settings,
                serial: Mutex::new(()),
                playing: AtomicBool::new(false),
                shutdown,
            }),
        }
    }

    /// Playback settings.
    pub fn settings(&self) -> &PlaybackSettings {
        &self.inner.settings
    }

    /// Whether a clip is currently playing.
    pub fn is_playing(&self) -> bool {
        self.inner.playing.load(Ordering::Acquire)
    }

    /// Play `request` on the blocking pool.
    ///
    /// Must be called from within a tokio runtime. The handle resolves to
    /// `true` once the clip played and was cleaned up.
    pub fn submit(&self, request: PlaybackRequest) -> JoinHandle<bool> {
        let controller = self.clone();
        tokio::task::spawn_blocking(move || controller.play_blocking(&request))
    }

    /// Play `request`, retrying the whole sequence on transient failures.
    #[instrument(skip(self, request), fields(path = ?request.path))]
    pub fn play_blocking(&self, request: &PlaybackRequest) -> bool {
        if self.inner.shutdown.is_requested() {
            debug!("Shutdown requested, skipping playback");
            return false;
        }

        let settings = &self.inner.settings;
        // Each attempt already sleeps `pre_play_delay` before touching the player.
        let policy = RetryPolicy::new(settings.max_attempts, Duration::ZERO);

        let result = policy.run_if("playback", PlayerError::is_retryable, |attempt| {
            if attempt > 1 {
                info!(attempt, "Retrying playback");
            }
            self.play_once(request)
        });

        match result {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Playback failed");
                false
            }
        }
    }

    /// Stop whatever the player is playing. Best effort.
    pub fn stop_playback(&self) -> bool {
        let stopped = self
            .inner
            .connector
            .connect()
            .and_then(|mut control| control.stop_sound());

        match stopped {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Stop playback failed");
                false
            }
        }
    }

    fn play_once(&self, request: &PlaybackRequest) -> PlayerResult<()> {
        let _serial = self.lock_serial();
        let inner = &self.inner;
        let settings = &inner.settings;

        self.check_shutdown()?;

        if settings.force_stop_before_play {
            self.stop_playback();
        }

        thread::sleep(settings.pre_play_delay);

        let path = std::path::absolute(&request.path)?;
        if !path.exists() {
            return Err(PlayerError::FileNotFound {
                path,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if !inner.supervisor.ensure_running() {
            self.check_shutdown()?;
            return Err(PlayerError::Unavailable {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let mut control = inner.connector.connect()?;

        let before = control.sound_count()?;
        control.add_sound(&path)?;
        thread::sleep(settings.upload_settle);

        let after = match control.sound_count() {
            Ok(after) => after,
            Err(e) => {
                drop(control);
                self.discard_upload(before);
                return Err(e);
            }
        };

        if after <= before {
            drop(control);
            self.discard_upload(before);
            return Err(PlayerError::UploadNotRegistered {
                before,
                after,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        // Entries are appended, so the new one is last (1-based).
        let index = after;
        let _playing = PlayingGuard::set(&inner.playing);

        if let Err(e) = control.play_sound(index, request.routing) {
            self.remove_entry(control.as_mut(), index);
            return Err(e);
        }
        drop(control);

        let wait = settings.wait_for(request.estimated_duration);
        info!(index, wait_ms = wait.as_millis(), "Playback started");

        self.sleep_unless_shutdown(wait);

        match inner.connector.connect() {
            Ok(mut control) => self.remove_entry(control.as_mut(), index),
            Err(e) => warn!(index, error = %e, "Could not reconnect to remove played entry"),
        }

        thread::sleep(settings.post_cleanup_delay);
        debug!(index, "Playback finished");

        Ok(())
    }

    /// Remove an upload whose index was never confirmed, if it landed after
    /// the `before` entries.
    fn discard_upload(&self, before: u32) {
        let discarded = self.inner.connector.connect().and_then(|mut control| {
            if control.sound_count()? > before {
                self.remove_entry(control.as_mut(), before + 1);
            }
            Ok(())
        });

        if let Err(e) = discarded {
            warn!(error = %e, "Could not check for an unconfirmed upload");
        }
    }

    fn remove_entry(&self, control: &mut dyn PlayerControl, index: u32) {
        let removed = control.select_index(index).and_then(|()| {
            thread::sleep(self.inner.settings.select_settle);
            control.remove_selected(false)
        });

        if let Err(e) = removed {
            warn!(index, error = %e, "Failed to remove played entry from player library");
        }
    }

    #[track_caller]
    fn check_shutdown(&self) -> PlayerResult<()> {
        if self.inner.shutdown.is_requested() {
            return Err(PlayerError::ShuttingDown {
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    fn sleep_unless_shutdown(&self, total: Duration) {
        let deadline = Instant::now() + total;
        loop {
            let now = Instant::now();
            if now >= deadline || self.inner.shutdown.is_requested() {
                return;
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }

    fn lock_serial(&self) -> MutexGuard<'_, ()> {
        self.inner.serial.lock().unwrap_or_else(|e| {
            error!("Playback mutex poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}
