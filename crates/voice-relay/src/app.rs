use crate::{AppCommand, AppResult};

use voice_relay_core::{
    PressOutcome, ReleaseOutcome, SessionStateMachine, ShutdownFlag,
    pipeline::{Pipeline, PipelineOutcome},
    player::PlaybackController,
};

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// How long shutdown waits for an in-flight utterance.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Main application state.
///
/// Runs on the async runtime thread. Hotkey edges arrive on `command_rx`;
/// captured recordings are handed to the pipeline on their own task so the
/// loop keeps answering the hotkey while an utterance is in flight.
pub struct App {
    pub(crate) session: Arc<SessionStateMachine>,
    pub(crate) pipeline: Arc<Pipeline>,
    pub(crate) playback: PlaybackController,
    pub(crate) shutdown: ShutdownFlag,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the main application event loop until shutdown is requested.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Voice relay starting");

        let mut in_flight: Option<JoinHandle<PipelineOutcome>> = None;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        AppCommand::HotkeyDown { at } => self.on_press(at),
                        AppCommand::HotkeyUp { at } => {
                            if let Some(task) = self.on_release(at) {
                                if in_flight.as_ref().is_some_and(|t| !t.is_finished()) {
                                    warn!("Previous utterance still running");
                                }
                                in_flight = Some(task);
                            }
                        }
                        AppCommand::Shutdown => {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                }

                result = &mut ctrl_c => {
                    match result {
                        Ok(()) => info!("Interrupt received, shutting down"),
                        Err(e) => error!(error = %e, "Failed to listen for interrupt"),
                    }
                    break;
                }

                else => {
                    info!("Command channel closed, shutting down");
                    break;
                }
            }
        }

        self.drain(in_flight).await;

        info!("Voice relay stopped");
        Ok(())
    }

    fn on_press(&self, at: Instant) {
        match self.session.on_hotkey_down(at) {
            PressOutcome::Started => info!("Recording started"),
            PressOutcome::ModelLoading => warn!("Speech model still loading, press ignored"),
            PressOutcome::ModelFailed => error!("Speech model failed to load, press ignored"),
            outcome => debug!(outcome = ?outcome, "Press ignored"),
        }
    }

    fn on_release(&self, at: Instant) -> Option<JoinHandle<PipelineOutcome>> {
        match self.session.on_hotkey_up(at) {
            ReleaseOutcome::Captured { held, samples } => {
                let utterance_id = Uuid::new_v4();
                info!(
                    utterance = %utterance_id,
                    held_ms = held.as_millis(),
                    sample_count = samples.len(),
                    "Recording captured"
                );

                let pipeline = Arc::clone(&self.pipeline);
                Some(tokio::spawn(async move {
                    pipeline.process(samples, utterance_id).await
                }))
            }
            outcome => {
                debug!(outcome = ?outcome, "Release ignored");
                None
            }
        }
    }

    /// Stop playback and give the in-flight utterance a bounded time to end.
    async fn drain(&self, in_flight: Option<JoinHandle<PipelineOutcome>>) {
        self.shutdown.request();

        if self.shutdown_tx.send(true).is_err() {
            debug!("Hotkey handler already stopped");
        }

        if self.playback.is_playing() {
            let playback = self.playback.clone();
            let stop = tokio::task::spawn_blocking(move || playback.stop_playback());
            if tokio::time::timeout(DRAIN_TIMEOUT, stop).await.is_err() {
                warn!("Stopping playback timed out");
            }
        }

        let Some(task) = in_flight else {
            return;
        };

        match tokio::time::timeout(DRAIN_TIMEOUT, task).await {
            Ok(Ok(outcome)) => info!(outcome = ?outcome, "In-flight utterance finished"),
            Ok(Err(e)) => error!(error = %e, "In-flight utterance task failed"),
            Err(_) => warn!(
                timeout_secs = DRAIN_TIMEOUT.as_secs(),
                "In-flight utterance did not finish, abandoning"
            ),
        }
    }
}
