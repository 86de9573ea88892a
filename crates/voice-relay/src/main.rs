//! Voice relay: push-to-talk speech translation played into a virtual
//! microphone through Soundpad.

mod app;
mod app_command;
mod config;
mod error;
mod hotkey_handler;
mod logging;
mod translate;
mod tts;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
};

use crate::{config::Config, tts::EdgeTtsSynthesizer};

use voice_relay_core::{
    MicrophoneCapture, ModelStatus, SessionStateMachine, ShutdownFlag, SttEngine,
    pipeline::{DeferredTranscriber, Pipeline, Transcriber, Translator},
    player::{
        ConnectionProbe, DetachedLauncher, PlaybackController, PlayerConnector, PlayerSupervisor,
        SoundpadConnector, SystemProcessTable,
    },
};

use std::{path::Path, sync::Arc, time::Duration};

use global_hotkey::GlobalHotKeyManager;
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
};
use tokio::{
    runtime::Runtime,
    sync::{mpsc, watch},
};
use tracing::{error, info, warn};

const LOG_DIR: &str = "logs";
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// Events delivered to the main-thread event loop.
#[derive(Debug)]
enum MainCommand {
    /// The runtime thread has finished; exit the event loop.
    Shutdown,
}

/// Application entry point.
fn main() {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let mut log_guard = match logging::init(&config.app.log_level, Path::new(LOG_DIR)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialise logging: {}", e);
            std::process::exit(1);
        }
    };

    let event_loop = EventLoopBuilder::<MainCommand>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    // Persists across event loop iterations; dropping it unregisters the hotkey.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;
    let mut config = Some(config);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(MainCommand::Shutdown) => {
                info!("Exiting event loop");
                // The process exits with the loop; flush buffered log lines first.
                drop(log_guard.take());
                *control_flow = ControlFlow::ExitWithCode(0);
                return;
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let Some(config) = config.take() else {
                    return;
                };

                // Register hotkey on the main thread; tao's event loop pumps
                // the Windows messages needed for WM_HOTKEY delivery.
                let (manager, hotkey_id) =
                    match HotkeyHandler::register_hotkey(&config.app.hotkey) {
                        Ok(pair) => pair,
                        Err(e) => {
                            error!("Failed to register hotkey: {:?}", e);
                            std::process::exit(1);
                        }
                    };
                hotkey_manager = Some(manager);

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                let proxy = proxy.clone();

                // Spawn tokio runtime on separate thread.
                // hotkey_manager stays on the main thread.
                std::thread::spawn(move || run_runtime(config, hotkey_id, proxy));
            }
            _ => {}
        }

        // Keep hotkey_manager and the log writer alive for the app's lifetime.
        let _ = (&hotkey_manager, &log_guard);
    });
}

/// Body of the runtime thread. Always tells the event loop to exit.
fn run_runtime(config: Config, hotkey_id: u32, proxy: EventLoopProxy<MainCommand>) {
    if let Err(e) = run_until_shutdown(&config, hotkey_id) {
        error!(error = ?e, "Voice relay failed");
    }

    if proxy.send_event(MainCommand::Shutdown).is_err() {
        warn!("Event loop already closed");
    }
}

fn run_until_shutdown(config: &Config, hotkey_id: u32) -> AppResult<()> {
    // The blocking HTTP client must be dropped outside the runtime, so it is
    // released only after the runtime has shut down.
    let translator: Arc<dyn Translator> = Arc::from(translate::from_config(&config.translation)?);

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .max_blocking_threads(3)
        .enable_all()
        .build()?;

    let result = run_app(&rt, config, Arc::clone(&translator), hotkey_id);

    rt.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    drop(translator);

    result
}

/// Wire the session, player and pipeline together and run until shutdown.
fn run_app(
    rt: &Runtime,
    config: &Config,
    translator: Arc<dyn Translator>,
    hotkey_id: u32,
) -> AppResult<()> {
    let mut capture = MicrophoneCapture::new()?;
    let sample_rate = capture.sample_rate();

    let session = Arc::new(SessionStateMachine::new(
        config.timing.session_settings(sample_rate),
    ));
    capture.start(Arc::clone(&session), config.timing.block_size)?;

    let shutdown = ShutdownFlag::new();

    let connector: Arc<dyn PlayerConnector> =
        Arc::new(SoundpadConnector::new(&config.player.pipe_name));
    let supervisor = Arc::new(PlayerSupervisor::new(
        ConnectionProbe::new(Arc::clone(&connector)),
        Arc::new(SystemProcessTable),
        Arc::new(DetachedLauncher),
        config.player.supervisor_settings(),
        shutdown.clone(),
    ));
    let playback = PlaybackController::new(
        Arc::clone(&supervisor),
        connector,
        config.player.playback_settings(),
        shutdown.clone(),
    );

    let transcriber = Arc::new(DeferredTranscriber::new());
    let pipeline = Arc::new(Pipeline::new(
        Arc::clone(&session),
        Arc::clone(&transcriber) as Arc<dyn Transcriber>,
        translator,
        Arc::new(EdgeTtsSynthesizer::new(
            &config.tts.command,
            config.tts_output_path(),
        )),
        playback.clone(),
        config.pipeline_settings(sample_rate),
    ));

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let model_path = config.model_path();
    let use_gpu = config.translation.use_gpu;

    let result = rt.block_on(async {
        let loader_session = Arc::clone(&session);
        let _model_loader = tokio::task::spawn_blocking(move || {
            info!(model_path = ?model_path, use_gpu, "Loading speech model");
            match SttEngine::new(&model_path, use_gpu) {
                Ok(engine) => {
                    transcriber.install(Arc::new(engine));
                    loader_session.set_model_status(ModelStatus::Ready);
                    info!("Speech model ready");
                }
                Err(e) => {
                    loader_session.set_model_status(ModelStatus::Failed);
                    error!(error = %e, "Speech model failed to load");
                }
            }
        });

        let _readiness = tokio::task::spawn_blocking(move || supervisor.check_readiness());

        let hotkey_handler = HotkeyHandler::new(hotkey_id, command_tx);

        let app = App {
            session,
            pipeline,
            playback,
            shutdown,
            command_rx,
            shutdown_tx,
        };

        let (_, app_result) = tokio::join!(
            async {
                if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                    error!(error = ?e, "Hotkey handler error");
                }
            },
            app.run()
        );

        app_result
    });

    capture.stop();

    result
}
