//! Soundpad remote-control client.
//!
//! Soundpad accepts plain-text commands such as `DoPlaySound(3, true, false)`
//! on the `\\.\pipe\sp_remote_control` named pipe and answers each with a short
//! reply: `R-200` for success, another `R-<code>` for failure, or a bare value
//! for queries. On non-Windows hosts the same protocol is spoken over a Unix
//! domain socket so a bridge process can stand in for the pipe.

use crate::player::{PlaybackRouting, PlayerConnector, PlayerControl, PlayerError, PlayerResult};

use std::{
    io::{Read, Write},
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, trace};

/// Default control endpoint.
#[cfg(windows)]
pub const DEFAULT_ENDPOINT: &str = r"\\.\pipe\sp_remote_control";

/// Default control endpoint.
#[cfg(not(windows))]
pub const DEFAULT_ENDPOINT: &str = "/tmp/sp_remote_control.sock";

const SUCCESS_REPLY: &str = "R-200";
const REPLY_BUFFER_SIZE: usize = 4096;

#[cfg(unix)]
const REPLY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

#[cfg(windows)]
type Channel = std::fs::File;

#[cfg(unix)]
type Channel = std::os::unix::net::UnixStream;

/// Opens one [`SoundpadClient`] per call.
#[derive(Debug, Clone)]
pub struct SoundpadConnector {
    endpoint: PathBuf,
}

impl SoundpadConnector {
    /// Connect to the given endpoint (pipe or socket path).
    pub fn new(endpoint: impl Into<PathBuf>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    /// The endpoint connections are opened against.
    pub fn endpoint(&self) -> &Path {
        &self.endpoint
    }
}

impl Default for SoundpadConnector {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl PlayerConnector for SoundpadConnector {
    fn connect(&self) -> PlayerResult<Box<dyn PlayerControl>> {
        Ok(Box::new(SoundpadClient::open(&self.endpoint)?))
    }
}

/// One open control channel to Soundpad.
pub struct SoundpadClient {
    channel: Channel,
}

impl SoundpadClient {
    /// Open the control channel at `endpoint`.
    #[track_caller]
    pub fn open(endpoint: &Path) -> PlayerResult<Self> {
        let channel = open_channel(endpoint).map_err(|e| PlayerError::ConnectFailed {
            reason: format!("{}: {}", endpoint.display(), e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        trace!(endpoint = ?endpoint, "Player channel opened");

        Ok(Self { channel })
    }

    fn send(&mut self, command: &str) -> PlayerResult<String> {
        self.channel.write_all(command.as_bytes())?;
        self.channel.flush()?;

        let mut buf = [0u8; REPLY_BUFFER_SIZE];
        let read = self.channel.read(&mut buf)?;
        let reply = decode_reply(&buf[..read]);

        trace!(command, reply = %reply, "Player command");

        Ok(reply)
    }

    #[track_caller]
    fn send_expect_ok(&mut self, command: &str) -> PlayerResult<()> {
        let reply = self.send(command)?;
        expect_success(command, &reply)
    }
}

impl PlayerControl for SoundpadClient {
    fn sound_count(&mut self) -> PlayerResult<u32> {
        let command = commands::sound_count();
        let reply = self.send(&command)?;
        parse_count(&command, &reply)
    }

    fn add_sound(&mut self, path: &Path) -> PlayerResult<()> {
        debug!(path = ?path, "Adding sound to player library");
        self.send_expect_ok(&commands::add_sound(path))
    }

    fn play_sound(&mut self, index: u32, routing: PlaybackRouting) -> PlayerResult<()> {
        self.send_expect_ok(&commands::play_sound(index, routing))
    }

    fn stop_sound(&mut self) -> PlayerResult<()> {
        self.send_expect_ok(&commands::stop_sound())
    }

    fn select_index(&mut self, index: u32) -> PlayerResult<()> {
        self.send_expect_ok(&commands::select_index(index))
    }

    fn remove_selected(&mut self, remove_from_disk: bool) -> PlayerResult<()> {
        self.send_expect_ok(&commands::remove_selected(remove_from_disk))
    }
}

#[cfg(windows)]
fn open_channel(endpoint: &Path) -> std::io::Result<Channel> {
    std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(endpoint)
}

#[cfg(unix)]
fn open_channel(endpoint: &Path) -> std::io::Result<Channel> {
    let stream = std::os::unix::net::UnixStream::connect(endpoint)?;
    stream.set_read_timeout(Some(REPLY_TIMEOUT))?;
    Ok(stream)
}

/// Command strings of the remote-control protocol.
pub mod commands {
    use crate::player::PlaybackRouting;

    use std::path::Path;

    /// `GetSoundFileCount()`
    pub fn sound_count() -> String {
        "GetSoundFileCount()".to_string()
    }

    /// `DoAddSound("<path>")`
    pub fn add_sound(path: &Path) -> String {
        format!("DoAddSound(\"{}\")", path.display())
    }

    /// `DoPlaySound(<index>, <speakers>, <mic>)`
    pub fn play_sound(index: u32, routing: PlaybackRouting) -> String {
        format!(
            "DoPlaySound({}, {}, {})",
            index, routing.speakers, routing.microphone
        )
    }

    /// `DoStopSound()`
    pub fn stop_sound() -> String {
        "DoStopSound()".to_string()
    }

    /// `DoSelectIndex(<index>)`
    pub fn select_index(index: u32) -> String {
        format!("DoSelectIndex({})", index)
    }

    /// `DoRemoveSelectedEntries(<from_disk>)`
    pub fn remove_selected(remove_from_disk: bool) -> String {
        format!("DoRemoveSelectedEntries({})", remove_from_disk)
    }
}

/// Strip padding NULs and whitespace from a raw reply.
pub fn decode_reply(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string()
}

/// Accept only the `R-200` success code.
#[track_caller]
pub fn expect_success(command: &str, reply: &str) -> PlayerResult<()> {
    if reply.starts_with(SUCCESS_REPLY) {
        Ok(())
    } else {
        Err(PlayerError::Rejected {
            command: command.to_string(),
            response: reply.to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

/// Parse the numeric reply of a count query.
#[track_caller]
pub fn parse_count(command: &str, reply: &str) -> PlayerResult<u32> {
    reply.parse::<u32>().map_err(|_| PlayerError::Rejected {
        command: command.to_string(),
        response: reply.to_string(),
        location: ErrorLocation::from(Location::caller()),
    })
}
