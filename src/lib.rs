#![warn(missing_docs)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

//!
//! # mpris-chapters
//!
//! `mpris-chapters` keeps a remote control session open to an MPRIS2-compatible media player over
//! D-Bus, so that a front-end can jump between chapter timestamps of whatever is playing.
//!
//! Players are uncooperative, external processes: they come and go, restart, advertise a bus name
//! without implementing the player object, or report broken track ids. This crate hides that:
//!
//! * [`PlayerRegistry`] lists the running players and only returns the ones that can actually be
//!   connected to. Players that fail once are not tried again.
//! * [`PlayerProxy`] stands in for the selected player. It works before any player is selected,
//!   and reconnects and retries once when a call fails.
//! * [`Player`] is a single connection. Its `set_position` falls back to a relative seek when the
//!   player's track id cannot be used.
//!
//! Two D-Bus client libraries are supported, the pure-Rust `zbus` (feature `zbus`, default) and
//! the system libdbus (feature `libdbus`). With both enabled the first one that can reach the
//! bus is used; see [`Options`] and [`detect`].
//!
//! ## Getting started
//!
//! ```rust,no_run
//! use mpris_chapters::{select_player, PlayerRegistry};
//!
//! let registry = PlayerRegistry::new()?;
//! let players = registry.discover()?;
//! let player = select_player(&registry, &players, None)?;
//!
//! // Jump to 00:01:30.
//! player.set_position(90_000_000)?;
//! # Ok::<(), mpris_chapters::Error>(())
//! ```
//!
//! Everything is blocking and single-threaded; none of the types are `Send`.

#[cfg(not(any(feature = "zbus", feature = "libdbus")))]
compile_error!("Enable at least one of the `zbus` and `libdbus` features");

mod errors;
mod identity;
mod metadata;
mod options;
mod player;
mod proxy;
mod registry;
mod track_id;
mod transport;

pub mod select;
pub mod time;

#[cfg(test)]
mod testing;

pub use errors::{DBusError, Error};
pub use identity::{PlayerIdentity, MPRIS2_PATH, MPRIS2_PREFIX};
pub use metadata::{Metadata, Value as MetadataValue};
pub use options::{Binding, BusType, Options, DEFAULT_TIMEOUT_MS};
pub use player::Player;
pub use proxy::PlayerProxy;
pub use registry::{PlayerRegistry, UnusableNames};
pub use select::select_player;
pub use track_id::{is_valid_object_path, TrackID};
pub use transport::{detect, Command, Connection, Interface, Transport};
