//! Scripted in-memory transport used by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::errors::{DBusError, Error};
use crate::identity::PlayerIdentity;
use crate::metadata::{Metadata, Value};
use crate::options::Binding;
use crate::player::Player;
use crate::track_id::TrackID;
use crate::transport::{Command, Connection, Interface, Transport};

pub(crate) const VALID_TRACK_ID: &str = "/org/mpris/MediaPlayer2/Track/1";

/// State shared between the transport and every connection it opened.
#[derive(Debug, Default)]
pub(crate) struct Bus {
    names: RefCell<Vec<String>>,
    refused: RefCell<HashSet<String>>,
    connect_attempts: RefCell<Vec<String>>,
    failing_connects: Cell<usize>,
    failing_calls: Cell<usize>,
    calls: RefCell<Vec<String>>,
    reads: RefCell<HashMap<String, usize>>,
    properties: RefCell<HashMap<String, Value>>,
    metadata: RefCell<Metadata>,
}

#[derive(Debug, Clone)]
pub(crate) struct MockTransport {
    bus: Rc<Bus>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        let bus = Bus::default();
        {
            let mut properties = bus.properties.borrow_mut();
            properties.insert(String::from("PlaybackStatus"), Value::from("Playing"));
            properties.insert(String::from("Position"), Value::SignedInt(0));
            for flag in ["CanControl", "CanSeek", "CanPause", "CanPlay"] {
                properties.insert(String::from(flag), Value::Boolean(true));
            }
        }
        bus.metadata.replace(Metadata::new(VALID_TRACK_ID));

        MockTransport { bus: Rc::new(bus) }
    }

    pub(crate) fn with_names(names: &[&str]) -> Self {
        let transport = MockTransport::new();
        transport
            .bus
            .names
            .replace(names.iter().map(|name| String::from(*name)).collect());
        transport
    }

    pub(crate) fn shared(&self) -> Rc<dyn Transport> {
        Rc::new(self.clone())
    }

    /// Connect a player directly, bypassing the registry.
    pub(crate) fn player(&self, bus_name: &str) -> Player {
        let identity = PlayerIdentity::from_bus_name(bus_name).unwrap();
        Player::connect(self.shared(), identity).unwrap()
    }

    pub(crate) fn set_property<V: Into<Value>>(&self, name: &str, value: V) {
        self.bus
            .properties
            .borrow_mut()
            .insert(String::from(name), value.into());
    }

    pub(crate) fn set_metadata(&self, metadata: Metadata) {
        self.bus.metadata.replace(metadata);
    }

    /// Make every connection attempt to `bus_name` fail.
    pub(crate) fn refuse(&self, bus_name: &str) {
        self.bus.refused.borrow_mut().insert(String::from(bus_name));
    }

    /// Make the next `count` method calls or property reads fail, on any connection.
    pub(crate) fn fail_next_calls(&self, count: usize) {
        self.bus.failing_calls.set(count);
    }

    /// Make the next `count` connection attempts fail.
    pub(crate) fn fail_next_connects(&self, count: usize) {
        self.bus.failing_connects.set(count);
    }

    /// Remote calls that succeeded, in order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.bus.calls.borrow().clone()
    }

    /// Number of successful reads of a property.
    pub(crate) fn reads(&self, property: &str) -> usize {
        self.bus.reads.borrow().get(property).copied().unwrap_or(0)
    }

    /// Number of connection attempts, successful or not, for a bus name.
    pub(crate) fn connect_attempts(&self, bus_name: &str) -> usize {
        self.bus
            .connect_attempts
            .borrow()
            .iter()
            .filter(|name| name.as_str() == bus_name)
            .count()
    }
}

fn take_one(counter: &Cell<usize>) -> bool {
    match counter.get() {
        0 => false,
        n => {
            counter.set(n - 1);
            true
        }
    }
}

impl Transport for MockTransport {
    fn binding(&self) -> Binding {
        Binding::Auto
    }

    fn list_names(&self) -> Result<Vec<String>, DBusError> {
        Ok(self.bus.names.borrow().clone())
    }

    fn connect(&self, identity: &PlayerIdentity) -> Result<Box<dyn Connection>, Error> {
        let bus_name = identity.bus_name().to_owned();
        self.bus.connect_attempts.borrow_mut().push(bus_name.clone());

        if self.bus.refused.borrow().contains(&bus_name) || take_one(&self.bus.failing_connects)
        {
            return Err(Error::ConnectionFailed {
                name: bus_name,
                source: DBusError::new("org.freedesktop.DBus.Error.ServiceUnknown"),
            });
        }

        Ok(Box::new(MockConnection {
            bus: Rc::clone(&self.bus),
            identity: identity.clone(),
        }))
    }
}

#[derive(Debug)]
struct MockConnection {
    bus: Rc<Bus>,
    identity: PlayerIdentity,
}

impl MockConnection {
    fn check(&self) -> Result<(), DBusError> {
        if take_one(&self.bus.failing_calls) {
            Err(DBusError::new("org.freedesktop.DBus.Error.NoReply"))
        } else {
            Ok(())
        }
    }

    fn record(&self, call: String) {
        self.bus.calls.borrow_mut().push(call);
    }

    fn count_read(&self, property: &str) {
        *self
            .bus
            .reads
            .borrow_mut()
            .entry(String::from(property))
            .or_insert(0) += 1;
    }
}

impl Connection for MockConnection {
    fn unique_name(&self) -> &str {
        ":1.42"
    }

    fn identity(&self) -> &str {
        self.identity.short_name()
    }

    fn call(&self, command: Command) -> Result<(), DBusError> {
        self.check()?;
        self.record(String::from(command.member()));
        Ok(())
    }

    fn seek(&self, offset_in_microseconds: i64) -> Result<(), DBusError> {
        self.check()?;
        self.record(format!("Seek({offset_in_microseconds})"));
        Ok(())
    }

    fn set_position(
        &self,
        track_id: &TrackID,
        position_in_microseconds: i64,
    ) -> Result<(), DBusError> {
        self.check()?;
        self.record(format!("SetPosition({track_id}, {position_in_microseconds})"));
        Ok(())
    }

    fn get(&self, interface: Interface, property: &str) -> Result<Value, DBusError> {
        self.check()?;
        let value = self
            .bus
            .properties
            .borrow()
            .get(property)
            .cloned()
            .ok_or_else(|| DBusError::new(format!("{interface} has no property {property}")))?;
        self.count_read(property);
        Ok(value)
    }

    fn get_metadata(&self) -> Result<Metadata, DBusError> {
        self.check()?;
        self.count_read("Metadata");
        Ok(self.bus.metadata.borrow().clone())
    }
}
