use std::cell::OnceCell;
use std::rc::Rc;

use tracing::{debug, warn};

use crate::errors::{DBusError, Error};
use crate::identity::PlayerIdentity;
use crate::metadata::{Metadata, Value};
use crate::track_id::TrackID;
use crate::transport::{Command, Connection, Interface, Transport};

/// A connected MPRIS-compatible player.
///
/// A `Player` is always fully connected: construction either opens and validates the player
/// object or fails. When the connection goes bad the handle is not repaired; [`reconnect`]
/// builds a new one for the same identity instead.
///
/// The `can_*` capability queries hit the bus once per handle and are cached after that.
///
/// **See:** [MPRIS2 MediaPlayer2.Player Specification][spec]
/// [spec]: <https://specifications.freedesktop.org/mpris-spec/latest/Player_Interface.html>
///
/// [`reconnect`]: Player::reconnect
#[derive(Debug)]
pub struct Player {
    transport: Rc<dyn Transport>,
    identity: PlayerIdentity,
    connection: Box<dyn Connection>,
    can_control: OnceCell<bool>,
    can_seek: OnceCell<bool>,
    can_pause: OnceCell<bool>,
    can_play: OnceCell<bool>,
}

impl Player {
    /// Connect to the player with the given identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionFailed`] if the service is not running or does not expose a
    /// usable player object.
    pub fn connect(transport: Rc<dyn Transport>, identity: PlayerIdentity) -> Result<Player, Error> {
        let connection = transport.connect(&identity)?;
        debug!(
            player = %identity,
            unique_name = connection.unique_name(),
            binding = %transport.binding(),
            "connected to player"
        );

        Ok(Player {
            transport,
            identity,
            connection,
            can_control: OnceCell::new(),
            can_seek: OnceCell::new(),
            can_pause: OnceCell::new(),
            can_play: OnceCell::new(),
        })
    }

    /// Build a fresh handle to the same player, through the same transport.
    ///
    /// The new handle starts with empty capability caches.
    pub fn reconnect(&self) -> Result<Player, Error> {
        Player::connect(Rc::clone(&self.transport), self.identity.clone())
    }

    /// The identity this handle was created for.
    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    /// The name to show to users, like `vlc`.
    pub fn ext_name(&self) -> &str {
        self.identity.short_name()
    }

    /// Returns the player's D-Bus bus name.
    pub fn bus_name(&self) -> &str {
        self.identity.bus_name()
    }

    /// Returns the player's unique D-Bus bus name (usually something like `:1.1337`).
    pub fn unique_name(&self) -> &str {
        self.connection.unique_name()
    }

    /// Returns the player's MPRIS `Identity`.
    ///
    /// This is usually the application's name, like `VLC media player`.
    pub fn player_identity_name(&self) -> &str {
        self.connection.identity()
    }

    fn command(&self, command: Command) -> Result<(), Error> {
        self.connection
            .call(command)
            .map_err(Error::remote_call(command.member()))
    }

    /// Send a `Play` signal to the player.
    pub fn play(&self) -> Result<(), Error> {
        self.command(Command::Play)
    }

    /// Send a `Pause` signal to the player.
    pub fn pause(&self) -> Result<(), Error> {
        self.command(Command::Pause)
    }

    /// Send a `PlayPause` signal to the player.
    pub fn play_pause(&self) -> Result<(), Error> {
        self.command(Command::PlayPause)
    }

    /// Send a `Stop` signal to the player.
    pub fn stop(&self) -> Result<(), Error> {
        self.command(Command::Stop)
    }

    /// Send a `Next` signal to the player.
    pub fn next(&self) -> Result<(), Error> {
        self.command(Command::Next)
    }

    /// Send a `Previous` signal to the player.
    pub fn previous(&self) -> Result<(), Error> {
        self.command(Command::Previous)
    }

    /// Ask the player to bring its window to the front.
    pub fn raise_window(&self) -> Result<(), Error> {
        self.command(Command::Raise)
    }

    /// Send a `Seek` signal to the player.
    ///
    /// The offset is relative to the current position; negative values seek backwards. Clamping
    /// is left to the player.
    ///
    /// See: [MPRIS2 specification about `Seek`](https://specifications.freedesktop.org/mpris-spec/latest/Player_Interface.html#Method:Seek)
    pub fn seek(&self, offset_in_microseconds: i64) -> Result<(), Error> {
        self.connection
            .seek(offset_in_microseconds)
            .map_err(Error::remote_call("Seek"))
    }

    /// Jump to an absolute position in the current track.
    ///
    /// `SetPosition` needs the current track id. Some players report an empty or malformed one,
    /// which `SetPosition` cannot accept; for those the current position is read and a relative
    /// `Seek` by the difference is sent instead. Playback keeps running between the two calls, so
    /// that path may land a few microseconds off.
    ///
    /// See: [MPRIS2 specification about `SetPosition`](https://specifications.freedesktop.org/mpris-spec/latest/Player_Interface.html#Method:SetPosition)
    pub fn set_position(&self, position_in_microseconds: u64) -> Result<(), Error> {
        let target = i64::try_from(position_in_microseconds).unwrap_or(i64::MAX);
        let track_id = self.track_id()?;

        match TrackID::try_from(track_id.as_str()) {
            Ok(track_id) => self
                .connection
                .set_position(&track_id, target)
                .map_err(Error::remote_call("SetPosition")),
            Err(()) => {
                warn!(
                    player = %self.identity,
                    track_id = %track_id,
                    "track id is not an object path, seeking relative to the current position"
                );
                let current = self.position()?;
                self.seek(target.saturating_sub(current))
            }
        }
    }

    /// Read any property of the `org.mpris.MediaPlayer2.Player` interface.
    pub fn get(&self, property: &str) -> Result<Value, Error> {
        self.connection
            .get(Interface::Player, property)
            .map_err(Error::remote_call(property))
    }

    fn get_as<T>(&self, property: &str, convert: impl FnOnce(Value) -> Option<T>) -> Result<T, Error> {
        convert(self.get(property)?).ok_or_else(|| Error::RemoteCall {
            member: property.to_owned(),
            source: DBusError::new("unexpected value type"),
        })
    }

    /// Query the player for current playback status, like `Playing` or `Paused`.
    ///
    /// The value is passed through as reported.
    pub fn playback_status(&self) -> Result<String, Error> {
        self.get_as("PlaybackStatus", Value::into_string)
    }

    /// Returns the player's MPRIS `position` as a count of microseconds since the start of the
    /// media.
    pub fn position(&self) -> Result<i64, Error> {
        self.get_as("Position", |value| value.as_i64())
    }

    /// Query the player for current metadata.
    pub fn metadata(&self) -> Result<Metadata, Error> {
        self.connection
            .get_metadata()
            .map_err(Error::remote_call("Metadata"))
    }

    /// The current track id, exactly as the player reports it.
    ///
    /// Players that leave `mpris:trackid` out of their metadata get an empty string.
    pub fn track_id(&self) -> Result<String, Error> {
        let metadata = self.metadata()?;
        match metadata.track_id() {
            Some(track_id) => Ok(track_id.to_owned()),
            None => {
                warn!(player = %self.identity, "metadata has no mpris:trackid");
                Ok(String::new())
            }
        }
    }

    fn cached_flag(&self, cell: &OnceCell<bool>, property: &str) -> Result<bool, Error> {
        if let Some(&flag) = cell.get() {
            return Ok(flag);
        }
        let flag = self.get_as(property, |value| value.as_bool())?;
        Ok(*cell.get_or_init(|| flag))
    }

    /// Queries the player to see if it can be controlled or not.
    ///
    /// See: [MPRIS2 specification about `CanControl`](https://specifications.freedesktop.org/mpris-spec/latest/Player_Interface.html#Property:CanControl)
    pub fn can_control(&self) -> Result<bool, Error> {
        self.cached_flag(&self.can_control, "CanControl")
    }

    /// Queries the player to see if it can seek within the media.
    ///
    /// See: [MPRIS2 specification about `CanSeek`](https://specifications.freedesktop.org/mpris-spec/latest/Player_Interface.html#Property:CanSeek)
    pub fn can_seek(&self) -> Result<bool, Error> {
        self.cached_flag(&self.can_seek, "CanSeek")
    }

    /// Queries the player to see if it can pause.
    pub fn can_pause(&self) -> Result<bool, Error> {
        self.cached_flag(&self.can_pause, "CanPause")
    }

    /// Queries the player to see if it can play.
    pub fn can_play(&self) -> Result<bool, Error> {
        self.cached_flag(&self.can_play, "CanPlay")
    }
}
