use thiserror::Error;

/// Something went wrong when communicating with the D-Bus. This could either be an underlying
/// D-Bus library problem, or that the other side did not conform to the expected protocols.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("D-Bus call failed: {message}")]
pub struct DBusError {
    /// The reported error message from the underlying D-Bus error.
    message: String,
}

impl DBusError {
    /// Create a new error from a message.
    ///
    /// Custom `Transport` implementations use this to report their own failures.
    pub fn new<S: Into<String>>(message: S) -> Self {
        DBusError {
            message: message.into(),
        }
    }

    /// The message reported by the D-Bus library or the remote side.
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(feature = "zbus")]
impl From<zbus::Error> for DBusError {
    fn from(error: zbus::Error) -> Self {
        match error {
            zbus::Error::MethodError(name, Some(message), _) => {
                DBusError::new(format!("{}: {}", name.as_str(), message))
            }
            other => DBusError::new(other.to_string()),
        }
    }
}

#[cfg(feature = "zbus")]
impl From<zbus::fdo::Error> for DBusError {
    fn from(error: zbus::fdo::Error) -> Self {
        DBusError::new(error.to_string())
    }
}

#[cfg(feature = "libdbus")]
impl From<dbus::Error> for DBusError {
    fn from(error: dbus::Error) -> Self {
        DBusError {
            message: error
                .message()
                .unwrap_or("No error message present")
                .to_string(),
        }
    }
}

/// Errors surfaced by players, the player proxy and the registry.
#[derive(Debug, Error)]
pub enum Error {
    /// The named service could not be reached right now: it is not running, its name could not be
    /// resolved, or access was denied.
    #[error("Unable to connect to {name}, check if it is running")]
    ConnectionFailed {
        /// Fully-qualified bus name of the service.
        name: String,
        /// What the D-Bus binding reported.
        #[source]
        source: DBusError,
    },

    /// A remote method call or property read failed, including when the remote process has
    /// exited.
    #[error("Calling {member} on the player failed")]
    RemoteCall {
        /// The D-Bus method or property name.
        member: String,
        /// What the D-Bus binding reported.
        #[source]
        source: DBusError,
    },

    /// The registry could not build a player for the given name.
    #[error("Could not create a player for {name}")]
    PlayerCreation {
        /// Fully-qualified bus name of the service.
        name: String,
        /// Why construction failed.
        #[source]
        source: Box<Error>,
    },

    /// A bus-level call that does not involve any player failed, like listing names.
    #[error(transparent)]
    Bus(#[from] DBusError),

    /// None of the D-Bus bindings compiled into this crate could connect to the bus.
    #[error("No D-Bus binding could connect to the bus ({0})")]
    NoTransport(String),

    /// No MPRIS players are running.
    #[error("No MPRIS enabled players are running")]
    NoPlayerFound,

    /// Players are running, but none of them can be both controlled and seeked.
    #[error("None of the running players implement the required MPRIS functionality")]
    NoUsablePlayer,

    /// A player was requested by a name that is not among the running players.
    #[error("No running player is named {0:?}")]
    UnknownPlayer(String),
}

impl Error {
    pub(crate) fn remote_call<S: Into<String>>(member: S) -> impl FnOnce(DBusError) -> Error {
        let member = member.into();
        move |source| Error::RemoteCall { member, source }
    }
}
