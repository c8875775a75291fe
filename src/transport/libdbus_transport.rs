use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use dbus::arg::{PropMap, RefArg, Variant};
use dbus::blocking::stdintf::org_freedesktop_dbus::Properties;
use dbus::blocking::{Connection as BusConnection, Proxy};
use dbus::strings::BusName;
use dbus::Path;

use super::{Command, Connection, Interface, Transport};
use crate::errors::{DBusError, Error};
use crate::identity::{PlayerIdentity, MPRIS2_PATH};
use crate::metadata::{Metadata, Value};
use crate::options::{Binding, BusType};
use crate::track_id::TrackID;

const DBUS_SERVICE: &str = "org.freedesktop.DBus";
const DBUS_PATH: &str = "/org/freedesktop/DBus";
const PROPERTIES_INTERFACE: &str = "org.freedesktop.DBus.Properties";

/// Binding over the system libdbus library, through the `dbus` crate's blocking API.
pub(crate) struct LibdbusTransport {
    connection: Rc<BusConnection>,
    timeout: Duration,
}

impl LibdbusTransport {
    pub(crate) fn open(bus: BusType, timeout: Duration) -> Result<Self, DBusError> {
        let connection = match bus {
            BusType::Session => BusConnection::new_session()?,
            BusType::System => BusConnection::new_system()?,
        };
        Ok(LibdbusTransport {
            connection: Rc::new(connection),
            timeout,
        })
    }
}

impl fmt::Debug for LibdbusTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibdbusTransport")
            .field("unique_name", &&*self.connection.unique_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Transport for LibdbusTransport {
    fn binding(&self) -> Binding {
        Binding::Libdbus
    }

    fn list_names(&self) -> Result<Vec<String>, DBusError> {
        let proxy = self
            .connection
            .with_proxy(DBUS_SERVICE, DBUS_PATH, self.timeout);
        let (names,): (Vec<String>,) = proxy.method_call(DBUS_SERVICE, "ListNames", ())?;
        Ok(names)
    }

    fn connect(&self, identity: &PlayerIdentity) -> Result<Box<dyn Connection>, Error> {
        match LibdbusConnection::open(Rc::clone(&self.connection), identity, self.timeout) {
            Ok(connection) => Ok(Box::new(connection)),
            Err(source) => Err(Error::ConnectionFailed {
                name: identity.bus_name().to_owned(),
                source,
            }),
        }
    }
}

struct LibdbusConnection {
    connection: Rc<BusConnection>,
    bus_name: BusName<'static>,
    timeout: Duration,
    unique_name: String,
    identity: String,
}

impl LibdbusConnection {
    fn open(
        connection: Rc<BusConnection>,
        identity: &PlayerIdentity,
        timeout: Duration,
    ) -> Result<Self, DBusError> {
        let bus_name = BusName::new(identity.bus_name().to_owned()).map_err(DBusError::new)?;

        let (unique_name, identity) = {
            let bus = connection.with_proxy(DBUS_SERVICE, DBUS_PATH, timeout);
            let (unique_name,): (String,) =
                bus.method_call(DBUS_SERVICE, "GetNameOwner", (identity.bus_name(),))?;

            let player = connection.with_proxy(bus_name.clone(), MPRIS2_PATH, timeout);
            let identity: String = player.get(Interface::MediaPlayer2.name(), "Identity")?;
            (unique_name, identity)
        };

        Ok(LibdbusConnection {
            connection,
            bus_name,
            timeout,
            unique_name,
            identity,
        })
    }

    fn proxy(&self) -> Proxy<'_, &BusConnection> {
        self.connection
            .with_proxy(self.bus_name.clone(), MPRIS2_PATH, self.timeout)
    }
}

impl fmt::Debug for LibdbusConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibdbusConnection")
            .field("bus_name", &&*self.bus_name)
            .field("unique_name", &self.unique_name)
            .field("identity", &self.identity)
            .finish()
    }
}

impl Connection for LibdbusConnection {
    fn unique_name(&self) -> &str {
        &self.unique_name
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn call(&self, command: Command) -> Result<(), DBusError> {
        self.proxy().method_call::<(), _, _, _>(
            command.interface().name(),
            command.member(),
            (),
        )?;
        Ok(())
    }

    fn seek(&self, offset_in_microseconds: i64) -> Result<(), DBusError> {
        self.proxy().method_call::<(), _, _, _>(
            Interface::Player.name(),
            "Seek",
            (offset_in_microseconds,),
        )?;
        Ok(())
    }

    fn set_position(
        &self,
        track_id: &TrackID,
        position_in_microseconds: i64,
    ) -> Result<(), DBusError> {
        let path = Path::new(track_id.to_string()).map_err(DBusError::new)?;
        self.proxy().method_call::<(), _, _, _>(
            Interface::Player.name(),
            "SetPosition",
            (path, position_in_microseconds),
        )?;
        Ok(())
    }

    fn get(&self, interface: Interface, property: &str) -> Result<Value, DBusError> {
        let (value,): (Variant<Box<dyn RefArg>>,) =
            self.proxy()
                .method_call(PROPERTIES_INTERFACE, "Get", (interface.name(), property))?;
        Ok(Value::from_ref_arg(&*value.0))
    }

    fn get_metadata(&self) -> Result<Metadata, DBusError> {
        let raw: PropMap = self.proxy().get(Interface::Player.name(), "Metadata")?;
        Ok(raw
            .into_iter()
            .map(|(key, value)| (key, Value::from_ref_arg(&*value.0)))
            .collect())
    }
}
