use std::cell::RefCell;

use tracing::{debug, warn};

use crate::errors::Error;
use crate::identity::PlayerIdentity;
use crate::metadata::{Metadata, Value};
use crate::player::Player;

/// Stands in for "whichever player is currently selected".
///
/// Front-ends hold on to one `PlayerProxy` for their whole lifetime while the player behind it
/// can be attached, swapped or rebuilt:
///
/// * With no player attached every command is a no-op returning `Ok(())` and every query returns
///   `Ok(None)`, so widgets can be wired up before anything is selected.
/// * When a call fails, the proxy rebuilds the player for the same identity, replaces its own
///   handle and tries the call once more. If that fails too (or the player cannot be rebuilt) the
///   error is returned. There are no further retries.
///
/// ```rust,no_run
/// use mpris_chapters::PlayerRegistry;
///
/// let registry = PlayerRegistry::new()?;
/// let proxy = registry.connect_player("org.mpris.MediaPlayer2.vlc", "vlc")?;
/// proxy.set_position(90_000_000)?;
/// # Ok::<(), mpris_chapters::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct PlayerProxy {
    player: RefCell<Option<Player>>,
}

impl PlayerProxy {
    /// Create a proxy, optionally with a player attached.
    pub fn new(player: Option<Player>) -> Self {
        PlayerProxy {
            player: RefCell::new(player),
        }
    }

    /// Create a proxy with no player attached.
    pub fn empty() -> Self {
        PlayerProxy::default()
    }

    /// Attach a player, replacing the current one.
    pub fn set_player(&self, player: Player) {
        debug!(player = %player.identity(), "attaching player");
        self.player.replace(Some(player));
    }

    /// Detach the current player and hand it back.
    pub fn clear(&self) -> Option<Player> {
        self.player.take()
    }

    /// Whether a player is attached.
    pub fn is_attached(&self) -> bool {
        self.player.borrow().is_some()
    }

    /// Run `f` against the attached player, if any.
    ///
    /// Forwarded calls made from inside `f` still work. A handle rebuilt by such a call is used for
    /// its retry and then dropped, so the next call reconnects again. `set_player` and `clear` must
    /// not be called from inside `f`.
    pub fn with_player<R>(&self, f: impl FnOnce(&Player) -> R) -> Option<R> {
        self.player.borrow().as_ref().map(f)
    }

    /// Identity of the attached player.
    pub fn identity(&self) -> Option<PlayerIdentity> {
        self.player
            .borrow()
            .as_ref()
            .map(|player| player.identity().clone())
    }

    /// The name to show to users for the attached player.
    pub fn ext_name(&self) -> Option<String> {
        self.player
            .borrow()
            .as_ref()
            .map(|player| player.ext_name().to_owned())
    }

    fn forward<T, F>(&self, operation: &'static str, f: F) -> Result<Option<T>, Error>
    where
        F: Fn(&Player) -> Result<T, Error>,
    {
        let replacement = {
            let current = self.player.borrow();
            let player = match current.as_ref() {
                Some(player) => player,
                None => return Ok(None),
            };

            match f(player) {
                Ok(value) => return Ok(Some(value)),
                Err(error) => {
                    warn!(
                        player = %player.identity(),
                        operation,
                        %error,
                        "call failed, reconnecting and retrying once"
                    );
                }
            }

            player.reconnect()?
        };

        let result = f(&replacement).map(Some);
        match self.player.try_borrow_mut() {
            Ok(mut slot) => *slot = Some(replacement),
            Err(_) => debug!(operation, "player is borrowed, dropping the rebuilt handle"),
        }
        result
    }

    fn forward_command<F>(&self, operation: &'static str, f: F) -> Result<(), Error>
    where
        F: Fn(&Player) -> Result<(), Error>,
    {
        self.forward(operation, f).map(|_| ())
    }

    /// Send a `Play` signal to the player.
    pub fn play(&self) -> Result<(), Error> {
        self.forward_command("play", Player::play)
    }

    /// Send a `Pause` signal to the player.
    pub fn pause(&self) -> Result<(), Error> {
        self.forward_command("pause", Player::pause)
    }

    /// Send a `PlayPause` signal to the player.
    pub fn play_pause(&self) -> Result<(), Error> {
        self.forward_command("play_pause", Player::play_pause)
    }

    /// Send a `Stop` signal to the player.
    pub fn stop(&self) -> Result<(), Error> {
        self.forward_command("stop", Player::stop)
    }

    /// Send a `Next` signal to the player.
    pub fn next(&self) -> Result<(), Error> {
        self.forward_command("next", Player::next)
    }

    /// Send a `Previous` signal to the player.
    pub fn previous(&self) -> Result<(), Error> {
        self.forward_command("previous", Player::previous)
    }

    /// Ask the player to bring its window to the front.
    pub fn raise_window(&self) -> Result<(), Error> {
        self.forward_command("raise_window", Player::raise_window)
    }

    /// Seek relative to the current position. See [`Player::seek`].
    pub fn seek(&self, offset_in_microseconds: i64) -> Result<(), Error> {
        self.forward_command("seek", |player| player.seek(offset_in_microseconds))
    }

    /// Jump to an absolute position. See [`Player::set_position`].
    pub fn set_position(&self, position_in_microseconds: u64) -> Result<(), Error> {
        self.forward_command("set_position", |player| {
            player.set_position(position_in_microseconds)
        })
    }

    /// Read any property of the `org.mpris.MediaPlayer2.Player` interface.
    pub fn get(&self, property: &str) -> Result<Option<Value>, Error> {
        self.forward("get", |player| player.get(property))
    }

    /// Playback status as reported by the player.
    pub fn playback_status(&self) -> Result<Option<String>, Error> {
        self.forward("playback_status", Player::playback_status)
    }

    /// Current position in microseconds.
    pub fn position(&self) -> Result<Option<i64>, Error> {
        self.forward("position", Player::position)
    }

    /// Current metadata.
    pub fn metadata(&self) -> Result<Option<Metadata>, Error> {
        self.forward("metadata", Player::metadata)
    }

    /// Current track id, empty when the player does not report one.
    pub fn track_id(&self) -> Result<Option<String>, Error> {
        self.forward("track_id", Player::track_id)
    }

    /// See [`Player::can_control`].
    pub fn can_control(&self) -> Result<Option<bool>, Error> {
        self.forward("can_control", Player::can_control)
    }

    /// See [`Player::can_seek`].
    pub fn can_seek(&self) -> Result<Option<bool>, Error> {
        self.forward("can_seek", Player::can_seek)
    }

    /// See [`Player::can_pause`].
    pub fn can_pause(&self) -> Result<Option<bool>, Error> {
        self.forward("can_pause", Player::can_pause)
    }

    /// See [`Player::can_play`].
    pub fn can_play(&self) -> Result<Option<bool>, Error> {
        self.forward("can_play", Player::can_play)
    }

    /// Whether the attached player can be both controlled and seeked.
    ///
    /// `false` when no player is attached.
    pub fn is_usable(&self) -> Result<bool, Error> {
        Ok(self.can_control()?.unwrap_or(false) && self.can_seek()?.unwrap_or(false))
    }
}

impl From<Player> for PlayerProxy {
    fn from(player: Player) -> Self {
        PlayerProxy::new(Some(player))
    }
}
