use std::cell::RefCell;
use std::collections::{btree_set, BTreeMap, BTreeSet};
use std::rc::Rc;

use tracing::{debug, error};

use crate::errors::Error;
use crate::identity::PlayerIdentity;
use crate::options::{Binding, Options};
use crate::player::Player;
use crate::proxy::PlayerProxy;
use crate::transport::{self, Transport};

/// Bus names that advertise an MPRIS player but could not be connected to.
///
/// Names are only ever added. A name in here is skipped by [`PlayerRegistry::discover`] for as
/// long as the set lives; nothing is written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnusableNames {
    names: BTreeSet<String>,
}

impl UnusableNames {
    /// Create an empty set.
    pub fn new() -> Self {
        UnusableNames::default()
    }

    /// Whether the bus name has been found unusable.
    pub fn contains(&self, bus_name: &str) -> bool {
        self.names.contains(bus_name)
    }

    /// Remember a bus name as unusable. Returns `false` if it already was.
    pub fn insert<S: Into<String>>(&mut self, bus_name: S) -> bool {
        self.names.insert(bus_name.into())
    }

    /// Number of remembered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no name has been found unusable yet.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over the remembered names, in order.
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.names.iter()
    }
}

impl<'a> IntoIterator for &'a UnusableNames {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Used to find and connect to players running on the bus.
///
/// The registry owns the bus connection (through whichever binding was picked when it was
/// created) and the memo of players that turned out to be unusable.
///
/// ```rust,no_run
/// use mpris_chapters::PlayerRegistry;
///
/// let registry = PlayerRegistry::new()?;
/// for (name, bus_name) in registry.discover()? {
///     println!("{name}: {bus_name}");
/// }
/// # Ok::<(), mpris_chapters::Error>(())
/// ```
#[derive(Debug)]
pub struct PlayerRegistry {
    transport: Rc<dyn Transport>,
    unusable: RefCell<UnusableNames>,
}

impl PlayerRegistry {
    /// Creates a new `PlayerRegistry` on the session bus, using the first D-Bus binding that
    /// works.
    ///
    /// Use `with_options` to pick the bus or binding, or `for_transport` to bring your own.
    pub fn new() -> Result<Self, Error> {
        PlayerRegistry::with_options(&Options::default())
    }

    /// Creates a new `PlayerRegistry` with the given connection options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoTransport`] if no binding could connect to the bus.
    pub fn with_options(options: &Options) -> Result<Self, Error> {
        Ok(PlayerRegistry::for_transport(transport::detect(options)?))
    }

    /// Create a new `PlayerRegistry` over an already open transport.
    pub fn for_transport(transport: Rc<dyn Transport>) -> Self {
        PlayerRegistry::with_unusable(transport, UnusableNames::new())
    }

    /// Create a new `PlayerRegistry` that starts out with some names already known to be unusable.
    pub fn with_unusable(transport: Rc<dyn Transport>, unusable: UnusableNames) -> Self {
        PlayerRegistry {
            transport,
            unusable: RefCell::new(unusable),
        }
    }

    /// The transport players are connected through.
    pub fn transport(&self) -> &Rc<dyn Transport> {
        &self.transport
    }

    /// Which D-Bus binding is in use.
    pub fn binding(&self) -> Binding {
        self.transport.binding()
    }

    /// A copy of the names found unusable so far.
    pub fn unusable(&self) -> UnusableNames {
        self.unusable.borrow().clone()
    }

    /// Find all usable players on the bus, mapped from short name to bus name.
    ///
    /// Every candidate not already known to be unusable is connected to once to make sure it
    /// actually works; the connection is dropped again right away. Candidates that fail are
    /// remembered and left out of this and every later result.
    ///
    /// # Errors
    ///
    /// Only fails if the bus names cannot be listed. Broken players are never an error here.
    pub fn discover(&self) -> Result<BTreeMap<String, String>, Error> {
        let names = self.transport.list_names()?;
        let mut players = BTreeMap::new();

        for identity in names
            .iter()
            .filter_map(|name| PlayerIdentity::from_bus_name(name))
        {
            if self.unusable.borrow().contains(identity.bus_name()) {
                debug!(player = %identity, "skipping player known to be unusable");
                continue;
            }

            match self.create(identity.bus_name(), identity.short_name()) {
                Ok(_) => {
                    players.insert(
                        identity.short_name().to_owned(),
                        identity.bus_name().to_owned(),
                    );
                }
                Err(error) => {
                    error!(player = %identity, %error, "player is unusable, ignoring it from now on");
                    self.unusable.borrow_mut().insert(identity.bus_name());
                }
            }
        }

        Ok(players)
    }

    /// Same as [`discover`](PlayerRegistry::discover).
    pub fn discover_players(&self) -> Result<BTreeMap<String, String>, Error> {
        self.discover()
    }

    /// Connect to a player and wrap it in a fresh [`PlayerProxy`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::PlayerCreation`] wrapping whatever made the connection fail.
    pub fn create(&self, bus_name: &str, short_name: &str) -> Result<PlayerProxy, Error> {
        let identity = PlayerIdentity::new(bus_name, short_name);
        debug!(player = %identity, bus_name, "connecting");

        match Player::connect(Rc::clone(&self.transport), identity) {
            Ok(player) => {
                debug!(player = %player.identity(), "connected");
                Ok(PlayerProxy::from(player))
            }
            Err(source) => {
                debug!(player = short_name, bus_name, "connection failed");
                Err(Error::PlayerCreation {
                    name: bus_name.to_owned(),
                    source: Box::new(source),
                })
            }
        }
    }

    /// Same as [`create`](PlayerRegistry::create).
    pub fn connect_player(&self, bus_name: &str, short_name: &str) -> Result<PlayerProxy, Error> {
        self.create(bus_name, short_name)
    }
}
