use std::collections::HashMap;

use zbus::blocking::fdo::{DBusProxy, PropertiesProxy};
use zbus::blocking::Connection as BusConnection;
use zbus::names::{BusName, InterfaceName};
use zbus::zvariant::{ObjectPath, OwnedValue};
use zbus::CacheProperties;

use self::proxies::{MediaPlayer2ProxyBlocking, MprisPlayerProxyBlocking};
use super::{Command, Connection, Interface, Transport};
use crate::errors::{DBusError, Error};
use crate::identity::{PlayerIdentity, MPRIS2_PATH};
use crate::metadata::{Metadata, Value};
use crate::options::{Binding, BusType};
use crate::track_id::TrackID;

mod proxies {
    #![allow(dead_code)]

    use std::collections::HashMap;

    use zbus::dbus_proxy;
    use zbus::zvariant::{ObjectPath, OwnedValue};

    #[dbus_proxy(
        interface = "org.mpris.MediaPlayer2",
        default_path = "/org/mpris/MediaPlayer2"
    )]
    pub(crate) trait MediaPlayer2 {
        fn raise(&self) -> zbus::Result<()>;

        #[dbus_proxy(property)]
        fn identity(&self) -> zbus::Result<String>;
    }

    #[dbus_proxy(
        interface = "org.mpris.MediaPlayer2.Player",
        default_path = "/org/mpris/MediaPlayer2"
    )]
    pub(crate) trait MprisPlayer {
        fn play(&self) -> zbus::Result<()>;
        fn pause(&self) -> zbus::Result<()>;
        fn play_pause(&self) -> zbus::Result<()>;
        fn stop(&self) -> zbus::Result<()>;
        fn next(&self) -> zbus::Result<()>;
        fn previous(&self) -> zbus::Result<()>;
        fn seek(&self, offset: i64) -> zbus::Result<()>;
        fn set_position(&self, track_id: &ObjectPath<'_>, position: i64) -> zbus::Result<()>;

        #[dbus_proxy(property)]
        fn metadata(&self) -> zbus::Result<HashMap<String, OwnedValue>>;
    }
}

/// Binding over the pure-Rust `zbus` crate, using its blocking API.
#[derive(Debug)]
pub(crate) struct ZbusTransport {
    connection: BusConnection,
}

impl ZbusTransport {
    pub(crate) fn open(bus: BusType) -> Result<Self, DBusError> {
        let connection = match bus {
            BusType::Session => BusConnection::session()?,
            BusType::System => BusConnection::system()?,
        };
        Ok(ZbusTransport { connection })
    }
}

impl Transport for ZbusTransport {
    fn binding(&self) -> Binding {
        Binding::Zbus
    }

    fn list_names(&self) -> Result<Vec<String>, DBusError> {
        let names = DBusProxy::new(&self.connection)?.list_names()?;
        Ok(names.into_iter().map(|name| name.to_string()).collect())
    }

    fn connect(&self, identity: &PlayerIdentity) -> Result<Box<dyn Connection>, Error> {
        match ZbusConnection::open(&self.connection, identity) {
            Ok(connection) => Ok(Box::new(connection)),
            Err(error) => Err(Error::ConnectionFailed {
                name: identity.bus_name().to_owned(),
                source: error.into(),
            }),
        }
    }
}

#[derive(Debug)]
struct ZbusConnection {
    media_player: MediaPlayer2ProxyBlocking<'static>,
    player: MprisPlayerProxyBlocking<'static>,
    properties: PropertiesProxy<'static>,
    unique_name: String,
    identity: String,
}

impl ZbusConnection {
    fn open(connection: &BusConnection, identity: &PlayerIdentity) -> zbus::Result<Self> {
        let bus_name = BusName::try_from(identity.bus_name())?.into_owned();

        let media_player = MediaPlayer2ProxyBlocking::builder(connection)
            .destination(bus_name.clone())?
            .cache_properties(CacheProperties::No)
            .build()?;
        let player = MprisPlayerProxyBlocking::builder(connection)
            .destination(bus_name.clone())?
            .cache_properties(CacheProperties::No)
            .build()?;
        let properties = PropertiesProxy::builder(connection)
            .destination(bus_name.clone())?
            .path(MPRIS2_PATH)?
            .cache_properties(CacheProperties::No)
            .build()?;

        // Building proxies never touches the bus. Resolve the owner and read a property so that
        // names without a usable player object are rejected here.
        let unique_name = DBusProxy::new(connection)?
            .get_name_owner(bus_name)?
            .to_string();
        let identity = media_player.identity()?;

        Ok(ZbusConnection {
            media_player,
            player,
            properties,
            unique_name,
            identity,
        })
    }
}

impl Connection for ZbusConnection {
    fn unique_name(&self) -> &str {
        &self.unique_name
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn call(&self, command: Command) -> Result<(), DBusError> {
        let result = match command {
            Command::Play => self.player.play(),
            Command::Pause => self.player.pause(),
            Command::PlayPause => self.player.play_pause(),
            Command::Stop => self.player.stop(),
            Command::Next => self.player.next(),
            Command::Previous => self.player.previous(),
            Command::Raise => self.media_player.raise(),
        };
        result.map_err(DBusError::from)
    }

    fn seek(&self, offset_in_microseconds: i64) -> Result<(), DBusError> {
        Ok(self.player.seek(offset_in_microseconds)?)
    }

    fn set_position(
        &self,
        track_id: &TrackID,
        position_in_microseconds: i64,
    ) -> Result<(), DBusError> {
        let path = ObjectPath::try_from(&**track_id).map_err(zbus::Error::from)?;
        Ok(self.player.set_position(&path, position_in_microseconds)?)
    }

    fn get(&self, interface: Interface, property: &str) -> Result<Value, DBusError> {
        let interface = InterfaceName::from_static_str_unchecked(interface.name());
        Ok(Value::from(self.properties.get(interface, property)?))
    }

    fn get_metadata(&self) -> Result<Metadata, DBusError> {
        let raw: HashMap<String, OwnedValue> = self.player.metadata()?;
        Ok(raw
            .into_iter()
            .map(|(key, value)| (key, Value::from(value)))
            .collect())
    }
}
