use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// When D-Bus connection is managed for you, use this timeout while communicating with a Player.
pub const DEFAULT_TIMEOUT_MS: u64 = 500; // ms

/// Which message bus to look for players on.
///
/// Media players live on the session bus; the system bus is only useful for unusual setups like
/// system-wide MPD instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BusType {
    /// The per-login-session bus.
    #[default]
    Session,
    /// The system-wide bus.
    System,
}

/// The D-Bus client library used to talk to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Binding {
    /// Use the first compiled-in binding that can connect to the bus, preferring `Zbus`.
    #[default]
    Auto,
    /// The pure-Rust `zbus` crate. Requires the `zbus` feature.
    Zbus,
    /// The system `libdbus` library through the `dbus` crate. Requires the `libdbus` feature.
    Libdbus,
}

impl Binding {
    /// The concrete bindings to try, in order.
    pub(crate) fn candidates(self) -> &'static [Binding] {
        match self {
            Binding::Auto => &[Binding::Zbus, Binding::Libdbus],
            Binding::Zbus => &[Binding::Zbus],
            Binding::Libdbus => &[Binding::Libdbus],
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Binding::Auto => "auto",
            Binding::Zbus => "zbus",
            Binding::Libdbus => "libdbus",
        })
    }
}

impl FromStr for Binding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Binding::Auto),
            "zbus" => Ok(Binding::Zbus),
            "libdbus" | "dbus" => Ok(Binding::Libdbus),
            other => Err(format!(
                "Binding must be one of auto, zbus, libdbus, but was {other}"
            )),
        }
    }
}

/// How to connect to the bus.
///
/// ```rust
/// use std::time::Duration;
/// use mpris_chapters::{Binding, Options};
///
/// let options = Options::default()
///     .with_binding(Binding::Libdbus)
///     .with_timeout(Duration::from_secs(2));
/// assert_eq!(options.binding, Binding::Libdbus);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Bus to connect to.
    pub bus: BusType,

    /// Binding to use.
    pub binding: Binding,

    /// Upper bound for a single method call. The libdbus binding applies it to every call; zbus
    /// uses its own defaults.
    #[cfg_attr(feature = "serde", serde(rename = "timeout_ms", with = "millis"))]
    pub timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            bus: BusType::default(),
            binding: Binding::default(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl Options {
    /// Change the bus to connect to.
    pub fn with_bus(mut self, bus: BusType) -> Self {
        self.bus = bus;
        self
    }

    /// Change the binding preference.
    pub fn with_binding(mut self, binding: Binding) -> Self {
        self.binding = binding;
        self
    }

    /// Change the D-Bus communication timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(feature = "serde")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
