use std::fmt;

/// Every MPRIS player owns a bus name starting with this prefix.
pub const MPRIS2_PREFIX: &str = "org.mpris.MediaPlayer2.";

/// Object path of the MPRIS player object.
pub const MPRIS2_PATH: &str = "/org/mpris/MediaPlayer2";

/// Names a single player on the bus.
///
/// The short name is the part of the bus name after [`MPRIS2_PREFIX`], like `vlc` or
/// `chromium.instance1234`. It is what gets shown to users; the fully-qualified bus name is what
/// is used to address the player.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerIdentity {
    short_name: String,
    bus_name: String,
}

impl PlayerIdentity {
    /// Create an identity from a fully-qualified bus name and a display name.
    pub fn new<B, S>(bus_name: B, short_name: S) -> Self
    where
        B: Into<String>,
        S: Into<String>,
    {
        PlayerIdentity {
            short_name: short_name.into(),
            bus_name: bus_name.into(),
        }
    }

    /// Derive the identity from a bus name, if it is an MPRIS player name.
    ///
    /// ```rust
    /// use mpris_chapters::PlayerIdentity;
    ///
    /// let vlc = PlayerIdentity::from_bus_name("org.mpris.MediaPlayer2.vlc").unwrap();
    /// assert_eq!(vlc.short_name(), "vlc");
    /// assert!(PlayerIdentity::from_bus_name("org.freedesktop.Notifications").is_none());
    /// ```
    pub fn from_bus_name(bus_name: &str) -> Option<Self> {
        match bus_name.strip_prefix(MPRIS2_PREFIX) {
            Some(suffix) if !suffix.is_empty() => Some(PlayerIdentity::new(bus_name, suffix)),
            _ => None,
        }
    }

    /// The human-readable name, used for display.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// The fully-qualified bus name, like `org.mpris.MediaPlayer2.vlc`.
    pub fn bus_name(&self) -> &str {
        &self.bus_name
    }
}

impl fmt::Display for PlayerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_name)
    }
}
