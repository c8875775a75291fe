//! A whole session against a scripted bus: discovery, selection, control and a player restart.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use mpris_chapters::{
    select_player, Binding, Command, Connection, DBusError, Error, Interface, Metadata,
    MetadataValue, PlayerIdentity, PlayerRegistry, TrackID, Transport,
};

#[derive(Debug, Default)]
struct Script {
    names: Vec<String>,
    broken: Vec<String>,
    restarted: bool,
    generation: u32,
    connects: HashMap<String, u32>,
    log: Vec<String>,
    track_id: String,
    position: i64,
}

#[derive(Debug, Clone, Default)]
struct ScriptedBus(Rc<RefCell<Script>>);

impl ScriptedBus {
    fn new(names: &[&str]) -> Self {
        let bus = ScriptedBus::default();
        {
            let mut script = bus.0.borrow_mut();
            script.names = names.iter().map(|name| name.to_string()).collect();
            script.track_id = String::from("/org/mpris/MediaPlayer2/Track/7");
        }
        bus
    }

    /// Simulate the player process restarting: every open connection goes stale.
    fn restart(&self) {
        let mut script = self.0.borrow_mut();
        script.restarted = true;
        script.generation += 1;
    }

    fn connects(&self, bus_name: &str) -> u32 {
        self.0.borrow().connects.get(bus_name).copied().unwrap_or(0)
    }

    fn log(&self) -> Vec<String> {
        self.0.borrow().log.clone()
    }
}

impl Transport for ScriptedBus {
    fn binding(&self) -> Binding {
        Binding::Zbus
    }

    fn list_names(&self) -> Result<Vec<String>, DBusError> {
        Ok(self.0.borrow().names.clone())
    }

    fn connect(&self, identity: &PlayerIdentity) -> Result<Box<dyn Connection>, Error> {
        let mut script = self.0.borrow_mut();
        *script
            .connects
            .entry(identity.bus_name().to_owned())
            .or_insert(0) += 1;

        if script.broken.iter().any(|name| name == identity.bus_name()) {
            return Err(Error::ConnectionFailed {
                name: identity.bus_name().to_owned(),
                source: DBusError::new("org.freedesktop.DBus.Error.UnknownObject"),
            });
        }

        Ok(Box::new(ScriptedPlayer {
            script: Rc::clone(&self.0),
            generation: script.generation,
            name: identity.short_name().to_owned(),
        }))
    }
}

#[derive(Debug)]
struct ScriptedPlayer {
    script: Rc<RefCell<Script>>,
    generation: u32,
    name: String,
}

impl ScriptedPlayer {
    fn alive(&self) -> Result<(), DBusError> {
        if self.script.borrow().generation == self.generation {
            Ok(())
        } else {
            Err(DBusError::new("org.freedesktop.DBus.Error.ServiceUnknown"))
        }
    }

    fn record(&self, entry: String) -> Result<(), DBusError> {
        self.alive()?;
        self.script.borrow_mut().log.push(format!("{}: {}", self.name, entry));
        Ok(())
    }
}

impl Connection for ScriptedPlayer {
    fn unique_name(&self) -> &str {
        ":1.99"
    }

    fn identity(&self) -> &str {
        &self.name
    }

    fn call(&self, command: Command) -> Result<(), DBusError> {
        self.record(command.member().to_owned())
    }

    fn seek(&self, offset_in_microseconds: i64) -> Result<(), DBusError> {
        self.record(format!("Seek {offset_in_microseconds}"))
    }

    fn set_position(
        &self,
        track_id: &TrackID,
        position_in_microseconds: i64,
    ) -> Result<(), DBusError> {
        self.record(format!("SetPosition {track_id} {position_in_microseconds}"))
    }

    fn get(&self, interface: Interface, property: &str) -> Result<MetadataValue, DBusError> {
        self.alive()?;
        assert_eq!(interface, Interface::Player);
        match property {
            "CanControl" | "CanSeek" | "CanPause" | "CanPlay" => Ok(MetadataValue::Boolean(true)),
            "PlaybackStatus" => Ok(MetadataValue::from("Playing")),
            "Position" => Ok(MetadataValue::SignedInt(self.script.borrow().position)),
            other => Err(DBusError::new(format!("No such property {other}"))),
        }
    }

    fn get_metadata(&self) -> Result<Metadata, DBusError> {
        self.alive()?;
        let mut metadata = Metadata::new(self.script.borrow().track_id.clone());
        metadata.insert("xesam:title", "Chapter One");
        Ok(metadata)
    }
}

const VLC: &str = "org.mpris.MediaPlayer2.vlc";
const RHYTHMBOX: &str = "org.mpris.MediaPlayer2.rhythmbox";

#[test]
fn it_discovers_only_players_that_can_be_built() {
    let bus = ScriptedBus::new(&["org.freedesktop.DBus", VLC, RHYTHMBOX]);
    bus.0.borrow_mut().broken.push(String::from(RHYTHMBOX));
    let registry = PlayerRegistry::for_transport(Rc::new(bus.clone()));

    let expected = BTreeMap::from([(String::from("vlc"), String::from(VLC))]);
    assert_eq!(registry.discover_players().unwrap(), expected);
    assert_eq!(registry.discover_players().unwrap(), expected);

    assert_eq!(bus.connects(RHYTHMBOX), 1);
    assert_eq!(
        registry.unusable().iter().collect::<Vec<_>>(),
        vec![RHYTHMBOX]
    );
}

#[test]
fn it_survives_a_player_restart() {
    let bus = ScriptedBus::new(&[VLC]);
    let registry = PlayerRegistry::for_transport(Rc::new(bus.clone()));
    let players = registry.discover().unwrap();
    let player = select_player(&registry, &players, Some("vlc")).unwrap();

    player.play().unwrap();
    bus.restart();
    player.set_position(60_000_000).unwrap();

    assert!(bus.0.borrow().restarted);
    assert_eq!(
        bus.log(),
        vec![
            "vlc: Play",
            "vlc: SetPosition /org/mpris/MediaPlayer2/Track/7 60000000",
        ]
    );
    // discover + select + reconnect
    assert_eq!(bus.connects(VLC), 3);
}

#[test]
fn it_seeks_relatively_for_unusable_track_ids() {
    let bus = ScriptedBus::new(&[VLC]);
    {
        let mut script = bus.0.borrow_mut();
        script.track_id = String::from("/org/mpris/MediaPlayer2/Track/not-a-path");
        script.position = 90_000_000;
    }
    let registry = PlayerRegistry::for_transport(Rc::new(bus.clone()));
    let player = registry.connect_player(VLC, "vlc").unwrap();

    player.set_position(30_000_000).unwrap();

    assert_eq!(bus.log(), vec!["vlc: Seek -60000000"]);
}

#[test]
fn it_reports_errors_after_one_retry() {
    let bus = ScriptedBus::new(&[VLC]);
    let registry = PlayerRegistry::for_transport(Rc::new(bus.clone()));
    let player = registry.connect_player(VLC, "vlc").unwrap();

    bus.restart();
    bus.0.borrow_mut().broken.push(String::from(VLC));

    match player.next() {
        Err(Error::ConnectionFailed { name, .. }) => assert_eq!(name, VLC),
        other => panic!("expected ConnectionFailed, got {other:?}"),
    }
    assert_eq!(bus.connects(VLC), 2);

    // The session stays usable for another player.
    assert!(player.is_attached());
    assert_eq!(player.ext_name().as_deref(), Some("vlc"));
}
