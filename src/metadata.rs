use std::collections::hash_map;
use std::collections::HashMap;
use std::time::Duration;

/// Holds a dynamically-typed metadata or property value.
///
/// Subset of D-Bus data types that are commonly used in MPRIS metadata and player properties.
/// Anything else is kept as `Unsupported` so that the key is still visible.
///
/// See <https://www.freedesktop.org/wiki/Specifications/mpris-spec/metadata/>
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// Value is a boolean.
    Boolean(bool),
    /// Value is a signed integer of any width.
    SignedInt(i64),
    /// Value is an unsigned integer of any width.
    UnsignedInt(u64),
    /// Value is a float.
    Float(f64),
    /// Value is a string or an object path.
    String(String),
    /// Value is an array of strings.
    Strings(Vec<String>),
    /// Unsupported value type.
    Unsupported,
}

impl Value {
    /// Returns the value as a `&str` if it is a `Value::String`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the strings of a `Value::Strings`, or a single-element list for a `Value::String`.
    pub fn as_strs(&self) -> Option<Vec<&str>> {
        match self {
            Value::Strings(v) => Some(v.iter().map(String::as_str).collect()),
            Value::String(s) => Some(vec![s.as_str()]),
            _ => None,
        }
    }

    /// Returns the value as a `bool` if it is a `Value::Boolean`.
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Boolean(b) => Some(b),
            _ => None,
        }
    }

    /// Returns any integer as an `i64`, saturating unsigned values that do not fit.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::SignedInt(i) => Some(i),
            Value::UnsignedInt(i) => Some(0i64.saturating_add_unsigned(i)),
            _ => None,
        }
    }

    /// Returns any integer as a `u64`, clamping negative values to zero.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::SignedInt(i) => Some(u64::try_from(i).unwrap_or(0)),
            Value::UnsignedInt(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the value as a `f64` if it is a `Value::Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Float(f) => Some(f),
            _ => None,
        }
    }

    /// Consumes the value and returns the string, if it is a `Value::String`.
    pub fn into_string(self) -> Option<String> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::SignedInt(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UnsignedInt(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::Strings(value)
    }
}

#[cfg(feature = "zbus")]
impl<'a> From<&zbus::zvariant::Value<'a>> for Value {
    fn from(value: &zbus::zvariant::Value<'a>) -> Self {
        use zbus::zvariant::Value as Z;

        match value {
            Z::Bool(v) => Value::Boolean(*v),
            Z::I16(v) => Value::SignedInt(i64::from(*v)),
            Z::I32(v) => Value::SignedInt(i64::from(*v)),
            Z::I64(v) => Value::SignedInt(*v),
            Z::U8(v) => Value::UnsignedInt(u64::from(*v)),
            Z::U16(v) => Value::UnsignedInt(u64::from(*v)),
            Z::U32(v) => Value::UnsignedInt(u64::from(*v)),
            Z::U64(v) => Value::UnsignedInt(*v),

            Z::F64(v) => Value::Float(*v),

            Z::Str(v) => Value::String(v.to_string()),
            Z::Signature(v) => Value::String(v.to_string()),
            Z::ObjectPath(v) => Value::String(v.to_string()),

            Z::Array(a) if a.full_signature() == "as" => Value::Strings(
                a.get()
                    .iter()
                    .filter_map(|v| match v {
                        Z::Str(s) => Some(s.to_string()),
                        _ => None,
                    })
                    .collect(),
            ),

            Z::Value(v) => Value::from(&**v),

            _ => Value::Unsupported,
        }
    }
}

#[cfg(feature = "zbus")]
impl From<zbus::zvariant::OwnedValue> for Value {
    fn from(value: zbus::zvariant::OwnedValue) -> Self {
        Value::from(&*value)
    }
}

#[cfg(feature = "libdbus")]
impl Value {
    pub(crate) fn from_ref_arg(arg: &dyn dbus::arg::RefArg) -> Value {
        use dbus::arg::ArgType;

        match arg.arg_type() {
            ArgType::Boolean => arg
                .as_i64()
                .map(|b| Value::Boolean(b != 0))
                .unwrap_or(Value::Unsupported),
            ArgType::Int16 | ArgType::Int32 | ArgType::Int64 => {
                arg.as_i64().map(Value::SignedInt).unwrap_or(Value::Unsupported)
            }
            ArgType::Byte | ArgType::UInt16 | ArgType::UInt32 | ArgType::UInt64 => arg
                .as_u64()
                .map(Value::UnsignedInt)
                .unwrap_or(Value::Unsupported),
            ArgType::Double => arg.as_f64().map(Value::Float).unwrap_or(Value::Unsupported),
            ArgType::String | ArgType::ObjectPath | ArgType::Signature => arg
                .as_str()
                .map(|s| Value::String(s.to_owned()))
                .unwrap_or(Value::Unsupported),
            ArgType::Array if &*arg.signature() == "as" => arg
                .as_iter()
                .map(|items| {
                    Value::Strings(items.filter_map(|s| s.as_str()).map(String::from).collect())
                })
                .unwrap_or(Value::Unsupported),
            ArgType::Variant => arg
                .as_iter()
                .and_then(|mut inner| inner.next().map(Value::from_ref_arg))
                .unwrap_or(Value::Unsupported),
            _ => Value::Unsupported,
        }
    }
}

/// A key/value representation of the `Player` metadata.
///
/// Only a handful of keys have typed accessors; everything else is reachable through `get`.
///
/// * [Read more about the MPRIS2 `Metadata_Map`
/// type.](https://specifications.freedesktop.org/mpris-spec/latest/Track_List_Interface.html#Mapping:Metadata_Map)
/// * [Read MPRIS v2 metadata guidelines](https://www.freedesktop.org/wiki/Specifications/mpris-spec/metadata/)
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Metadata {
    values: HashMap<String, Value>,
}

impl Metadata {
    /// Create a new `Metadata` struct with a given `track_id`.
    ///
    /// This is mostly useful for test fixtures and other places where you want to work with mock
    /// data.
    pub fn new<S>(track_id: S) -> Self
    where
        S: Into<String>,
    {
        let mut metadata = Metadata::default();
        metadata.insert("mpris:trackid", Value::String(track_id.into()));
        metadata
    }

    /// Set a value, returning the previous one for that key.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.values.insert(key.into(), value.into())
    }

    /// Get a value from the metadata by key name.
    ///
    /// ```rust
    /// # use mpris_chapters::{Metadata, MetadataValue};
    /// # let metadata = Metadata::new("/1234");
    /// if let Some(MetadataValue::Strings(names)) = metadata.get("xesam:composer") {
    ///     println!("Composed by: {}", names.join(", "));
    /// }
    /// ```
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether a key is present at all, regardless of its type.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys in the metadata.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the player reported no metadata, like when nothing is loaded.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all keys and values, in no particular order.
    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.values.iter()
    }

    /// The track ID, exactly as the player reported it.
    ///
    /// Based on `mpris:trackid`
    /// > A unique identity for this track within the context of an MPRIS object.
    ///
    /// This is not validated; see [`TrackID`](crate::TrackID) for that.
    pub fn track_id(&self) -> Option<&str> {
        self.get("mpris:trackid").and_then(Value::as_str)
    }

    /// The name of the track.
    ///
    /// Based on `xesam:title`
    /// > The track title.
    pub fn title(&self) -> Option<&str> {
        self.get("xesam:title")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// A list of artists of the track.
    ///
    /// Based on `xesam:artist`
    /// > The track artist(s).
    pub fn artists(&self) -> Option<Vec<&str>> {
        self.get("xesam:artist").and_then(Value::as_strs)
    }

    /// The name of the album the track appears on.
    ///
    /// Based on `xesam:album`
    /// > The album name.
    pub fn album_name(&self) -> Option<&str> {
        self.get("xesam:album").and_then(Value::as_str)
    }

    /// A URL to the media being played.
    ///
    /// Based on `xesam:url`
    /// > The location of the media file.
    pub fn url(&self) -> Option<&str> {
        self.get("xesam:url").and_then(Value::as_str)
    }

    /// The duration of the track, in microseconds
    ///
    /// Based on `mpris:length`
    /// > The duration of the track in microseconds.
    pub fn length_in_microseconds(&self) -> Option<u64> {
        self.get("mpris:length").and_then(Value::as_u64)
    }

    /// The duration of the track, as a `Duration`
    ///
    /// Based on `mpris:length`.
    pub fn length(&self) -> Option<Duration> {
        self.length_in_microseconds().map(Duration::from_micros)
    }
}

impl From<HashMap<String, Value>> for Metadata {
    fn from(values: HashMap<String, Value>) -> Self {
        Metadata { values }
    }
}

impl FromIterator<(String, Value)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Metadata {
            values: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Metadata {
    type Item = (String, Value);
    type IntoIter = hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_creates_new_metadata() {
        let metadata = Metadata::new("/foo");
        assert_eq!(metadata.track_id(), Some("/foo"));
        assert_eq!(metadata.len(), 1);
    }

    #[test]
    fn it_reads_common_keys() {
        let mut metadata = Metadata::new("/org/videolan/vlc/playlist/3");
        metadata.insert("xesam:title", "Big Buck Bunny");
        metadata.insert("mpris:length", 596_000_000i64);
        metadata.insert("xesam:artist", vec![String::from("Blender Foundation")]);

        assert_eq!(metadata.title(), Some("Big Buck Bunny"));
        assert_eq!(metadata.length_in_microseconds(), Some(596_000_000));
        assert_eq!(metadata.length(), Some(Duration::from_secs(596)));
        assert_eq!(metadata.artists(), Some(vec!["Blender Foundation"]));
        assert_eq!(metadata.album_name(), None);
    }

    #[test]
    fn it_treats_empty_titles_as_missing() {
        let mut metadata = Metadata::default();
        metadata.insert("xesam:title", "");
        assert_eq!(metadata.title(), None);
        assert!(metadata.contains_key("xesam:title"));
    }

    #[test]
    fn test_signed_integer_casting() {
        assert_eq!(Value::SignedInt(42).as_i64(), Some(42));
        assert_eq!(Value::SignedInt(-42).as_i64(), Some(-42));
        assert_eq!(Value::UnsignedInt(42).as_i64(), Some(42));
        assert_eq!(Value::Boolean(true).as_i64(), None);
        assert_eq!(Value::UnsignedInt(u64::MAX).as_i64(), Some(i64::MAX));
    }

    #[test]
    fn test_unsigned_integer_casting() {
        assert_eq!(Value::SignedInt(42).as_u64(), Some(42));
        assert_eq!(Value::SignedInt(-42).as_u64(), Some(0));
        assert_eq!(Value::UnsignedInt(u64::MAX).as_u64(), Some(u64::MAX));
        assert_eq!(Value::String(String::from("42")).as_u64(), None);
    }

    #[cfg(feature = "zbus")]
    mod zvariant {
        use super::*;
        use zbus::zvariant::{Array, ObjectPath, Value as Z};

        #[test]
        fn it_converts_object_paths_to_strings() {
            let path = ObjectPath::try_from("/org/mpris/MediaPlayer2/Track/1").unwrap();
            assert_eq!(
                Value::from(&Z::ObjectPath(path)),
                Value::String(String::from("/org/mpris/MediaPlayer2/Track/1"))
            );
        }

        #[test]
        fn it_converts_string_arrays() {
            let array = Array::from(vec!["a", "b"]);
            assert_eq!(
                Value::from(&Z::Array(array)),
                Value::Strings(vec![String::from("a"), String::from("b")])
            );
        }

        #[test]
        fn it_unwraps_nested_variants() {
            let nested = Z::Value(Box::new(Z::U32(7)));
            assert_eq!(Value::from(&nested), Value::UnsignedInt(7));
        }
    }

    #[cfg(feature = "libdbus")]
    mod ref_arg {
        use super::*;
        use dbus::arg::{RefArg, Variant};

        #[test]
        fn it_converts_scalars() {
            assert_eq!(Value::from_ref_arg(&true), Value::Boolean(true));
            assert_eq!(Value::from_ref_arg(&false), Value::Boolean(false));
            assert_eq!(Value::from_ref_arg(&-3i32), Value::SignedInt(-3));
            assert_eq!(Value::from_ref_arg(&7u8), Value::UnsignedInt(7));
            assert_eq!(Value::from_ref_arg(&7u32), Value::UnsignedInt(7));
            assert_eq!(Value::from_ref_arg(&1.5f64), Value::Float(1.5));
        }

        #[test]
        fn it_converts_object_paths_to_strings() {
            let path = dbus::Path::new("/org/mpris/MediaPlayer2/Track/1").unwrap();
            assert_eq!(
                Value::from_ref_arg(&path),
                Value::String(String::from("/org/mpris/MediaPlayer2/Track/1"))
            );
        }

        #[test]
        fn it_converts_string_arrays() {
            let artists = vec![String::from("a"), String::from("b")];
            assert_eq!(
                Value::from_ref_arg(&artists),
                Value::Strings(vec![String::from("a"), String::from("b")])
            );
        }

        #[test]
        fn it_unwraps_nested_variants() {
            let nested = Variant(Box::new(5i64) as Box<dyn RefArg>);
            assert_eq!(Value::from_ref_arg(&nested), Value::SignedInt(5));
        }

        #[test]
        fn it_gives_up_on_other_containers() {
            let counts = vec![1u32, 2];
            assert_eq!(Value::from_ref_arg(&counts), Value::Unsupported);
        }
    }
}
