//! Picking one player out of the discovered ones, without asking anybody.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::errors::Error;
use crate::proxy::PlayerProxy;
use crate::registry::PlayerRegistry;

/// Whether a player can be both controlled and seeked, which is what jumping between chapters
/// needs.
pub fn is_usable(proxy: &PlayerProxy) -> Result<bool, Error> {
    proxy.is_usable()
}

/// Connect to the first usable player.
///
/// `players` is a short name to bus name mapping as returned by [`PlayerRegistry::discover`].
/// The `preferred` player is tried first, then the others in name order. Players that cannot be
/// connected to, or that are not [usable](is_usable), are skipped.
///
/// # Errors
///
/// * [`Error::NoPlayerFound`] if `players` is empty.
/// * [`Error::UnknownPlayer`] if `preferred` is not in `players`.
/// * [`Error::NoUsablePlayer`] if every candidate was skipped.
pub fn select_player(
    registry: &PlayerRegistry,
    players: &BTreeMap<String, String>,
    preferred: Option<&str>,
) -> Result<PlayerProxy, Error> {
    if players.is_empty() {
        return Err(Error::NoPlayerFound);
    }

    let mut candidates: Vec<(&String, &String)> = Vec::with_capacity(players.len());
    if let Some(name) = preferred {
        match players.get_key_value(name) {
            Some(entry) => candidates.push(entry),
            None => return Err(Error::UnknownPlayer(name.to_owned())),
        }
    }
    candidates.extend(
        players
            .iter()
            .filter(|(name, _)| Some(name.as_str()) != preferred),
    );

    for (short_name, bus_name) in candidates {
        let proxy = match registry.create(bus_name, short_name) {
            Ok(proxy) => proxy,
            Err(error) => {
                debug!(player = %short_name, %error, "skipping player");
                continue;
            }
        };

        match is_usable(&proxy) {
            Ok(true) => {
                info!(player = %short_name, "selected player");
                return Ok(proxy);
            }
            Ok(false) => debug!(player = %short_name, "player cannot be controlled or seeked"),
            Err(error) => debug!(player = %short_name, %error, "could not query capabilities"),
        }
    }

    Err(Error::NoUsablePlayer)
}
