//! The seam between players and the D-Bus client libraries.
//!
//! A [`Transport`] is one open bus connection through one binding. It lists names and opens
//! [`Connection`]s to single players. Which binding backs it is decided once, by [`detect`].

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::errors::{DBusError, Error};
use crate::identity::PlayerIdentity;
use crate::metadata::{Metadata, Value};
use crate::options::{Binding, Options};
use crate::track_id::TrackID;

#[cfg(feature = "libdbus")]
mod libdbus_transport;
#[cfg(feature = "zbus")]
mod zbus_transport;

/// The MPRIS interfaces a player object implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interface {
    /// `org.mpris.MediaPlayer2`, the application-level interface.
    MediaPlayer2,
    /// `org.mpris.MediaPlayer2.Player`, the playback interface.
    Player,
}

impl Interface {
    /// The D-Bus interface name.
    pub fn name(self) -> &'static str {
        match self {
            Interface::MediaPlayer2 => "org.mpris.MediaPlayer2",
            Interface::Player => "org.mpris.MediaPlayer2.Player",
        }
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Argument-less MPRIS methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `Player.Play`
    Play,
    /// `Player.Pause`
    Pause,
    /// `Player.PlayPause`
    PlayPause,
    /// `Player.Stop`
    Stop,
    /// `Player.Next`
    Next,
    /// `Player.Previous`
    Previous,
    /// `MediaPlayer2.Raise`
    Raise,
}

impl Command {
    /// The interface the method lives on.
    pub fn interface(self) -> Interface {
        match self {
            Command::Raise => Interface::MediaPlayer2,
            _ => Interface::Player,
        }
    }

    /// The D-Bus member name.
    pub fn member(self) -> &'static str {
        match self {
            Command::Play => "Play",
            Command::Pause => "Pause",
            Command::PlayPause => "PlayPause",
            Command::Stop => "Stop",
            Command::Next => "Next",
            Command::Previous => "Previous",
            Command::Raise => "Raise",
        }
    }
}

/// An open bus connection through one D-Bus binding.
pub trait Transport: fmt::Debug {
    /// Which binding this is.
    fn binding(&self) -> Binding;

    /// All names currently owned on the bus, in the order the bus daemon reports them.
    fn list_names(&self) -> Result<Vec<String>, DBusError>;

    /// Open the MPRIS object of a single player.
    ///
    /// Implementations must make sure the player object is actually reachable before returning,
    /// and fail with [`Error::ConnectionFailed`] otherwise. They must not retry.
    fn connect(&self, identity: &PlayerIdentity) -> Result<Box<dyn Connection>, Error>;
}

/// The MPRIS object of one player, as opened by a [`Transport`].
///
/// Every method is a single blocking round trip.
pub trait Connection: fmt::Debug {
    /// The unique bus name of the player process (usually something like `:1.1337`).
    fn unique_name(&self) -> &str;

    /// The player's MPRIS `Identity`, read when the connection was opened.
    fn identity(&self) -> &str;

    /// Call an argument-less method.
    fn call(&self, command: Command) -> Result<(), DBusError>;

    /// `Player.Seek`
    fn seek(&self, offset_in_microseconds: i64) -> Result<(), DBusError>;

    /// `Player.SetPosition`
    fn set_position(
        &self,
        track_id: &TrackID,
        position_in_microseconds: i64,
    ) -> Result<(), DBusError>;

    /// Read a property through `org.freedesktop.DBus.Properties.Get`.
    fn get(&self, interface: Interface, property: &str) -> Result<Value, DBusError>;

    /// Read `Player.Metadata`.
    fn get_metadata(&self) -> Result<Metadata, DBusError>;
}

/// Pick the D-Bus binding for this process.
///
/// For [`Binding::Auto`] every compiled-in binding is tried in order and the first one that can
/// open the configured bus is returned. An explicit binding is the only one tried.
///
/// # Errors
///
/// Returns [`Error::NoTransport`] describing every failed attempt.
pub fn detect(options: &Options) -> Result<Rc<dyn Transport>, Error> {
    debug!(binding = %options.binding, bus = ?options.bus, "looking for a D-Bus binding");
    select_binding(options.binding.candidates(), |binding| open(binding, options))
}

/// Try `open` on each candidate in turn, keeping the first transport that opens.
fn select_binding(
    candidates: &[Binding],
    mut open: impl FnMut(Binding) -> Result<Rc<dyn Transport>, DBusError>,
) -> Result<Rc<dyn Transport>, Error> {
    let mut failures = Vec::new();

    for &binding in candidates {
        match open(binding) {
            Ok(transport) => {
                debug!(%binding, "selected D-Bus binding");
                return Ok(transport);
            }
            Err(error) => {
                debug!(%binding, %error, "D-Bus binding unavailable");
                failures.push(format!("{binding}: {}", error.message()));
            }
        }
    }

    Err(Error::NoTransport(failures.join("; ")))
}

fn open(binding: Binding, options: &Options) -> Result<Rc<dyn Transport>, DBusError> {
    match binding {
        #[cfg(feature = "zbus")]
        Binding::Zbus => Ok(Rc::new(zbus_transport::ZbusTransport::open(options.bus)?)),
        #[cfg(feature = "libdbus")]
        Binding::Libdbus => Ok(Rc::new(libdbus_transport::LibdbusTransport::open(
            options.bus,
            options.timeout,
        )?)),
        other => Err(DBusError::new(format!(
            "the {other} binding is not compiled in"
        ))),
    }
}
