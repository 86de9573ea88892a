//! Global push-to-talk key.
//!
//! Registers the configured key and forwards its press and release edges to
//! the application as timestamped commands. The session decides what an edge
//! means; this module keeps no recording state of its own.

use crate::{AppCommand, AppError, AppResult};

use std::{str::FromStr, time::Instant};

use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::HotKey,
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument};

/// Forwards push-to-talk edges to the application.
pub struct HotkeyHandler {
    hotkey_id: u32,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Register `hotkey` (e.g. `PageUp`, `ctrl+shift+KeyT`) as the global
    /// push-to-talk key.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao`/`winit` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkey to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkey(hotkey: &str) -> AppResult<(GlobalHotKeyManager, u32)> {
        let parsed = parse_hotkey(hotkey)?;

        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::hotkey(format!("manager: {}", e)))?;

        manager
            .register(parsed)
            .map_err(|e| AppError::hotkey(format!("{} not registered: {}", hotkey, e)))?;

        info!(hotkey, "Global hotkey registered");

        Ok((manager, parsed.id()))
    }

    /// Create a handler for a previously registered hotkey.
    ///
    /// The `hotkey_id` should come from [`HotkeyHandler::register_hotkey`].
    /// This struct is `Send` and can live on any thread; it only listens on
    /// the global [`GlobalHotKeyEvent`] channel.
    pub fn new(hotkey_id: u32, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self {
            hotkey_id,
            command_tx,
        }
    }

    /// Run the hotkey handler event loop until a shutdown signal is received.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // GlobalHotKeyEvent::receiver() is a crossbeam receiver with a
        // blocking recv(). It is forwarded from a dedicated thread so the
        // runtime's small blocking pool stays free for the pipeline. The
        // thread ends on the first send after event_rx is dropped.
        let _forwarder = std::thread::Builder::new()
            .name("hotkey-forwarder".to_string())
            .spawn(move || {
                while let Ok(event) = receiver.recv() {
                    if event_tx.blocking_send(event).is_err() {
                        break;
                    }
                }
            })?;

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if !self.forward(event.id, event.state, Instant::now()).await {
                        info!("Application stopped listening, hotkey handler exiting");
                        break;
                    }
                }
            }
        }

        // The forwarder may stay parked in recv() until the next key event;
        // it holds nothing but the channel and exits with the process.
        drop(event_rx);
        debug!("Hotkey event forwarder released");

        Ok(())
    }

    /// Send the command for one hotkey event. Returns `false` once the
    /// application has dropped its command receiver.
    pub async fn forward(&self, id: u32, state: HotKeyState, at: Instant) -> bool {
        let Some(command) = self.command_for(id, state, at) else {
            return true;
        };

        self.command_tx.send(command).await.is_ok()
    }

    /// Translate a raw hotkey event into an application command.
    pub fn command_for(&self, id: u32, state: HotKeyState, at: Instant) -> Option<AppCommand> {
        if id != self.hotkey_id {
            return None;
        }

        Some(match state {
            HotKeyState::Pressed => AppCommand::HotkeyDown { at },
            HotKeyState::Released => AppCommand::HotkeyUp { at },
        })
    }
}

/// Parse a hotkey description in `global-hotkey` syntax.
#[track_caller]
pub fn parse_hotkey(hotkey: &str) -> AppResult<HotKey> {
    HotKey::from_str(hotkey.trim())
        .map_err(|e| AppError::hotkey(format!("{:?} is not a valid key: {}", hotkey, e)))
}
