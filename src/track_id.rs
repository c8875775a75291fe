use std::fmt;
use std::ops::Deref;

/// Represents [the MPRIS `Track_Id` type][track_id].
///
/// A `TrackID` can only hold a syntactically valid D-Bus object path. Some players report empty
/// or malformed ids; those never become a `TrackID` and the player falls back to relative
/// seeking instead.
///
/// ```rust
/// use mpris_chapters::TrackID;
///
/// assert!(TrackID::try_from("/org/mpris/MediaPlayer2/Track/12").is_ok());
/// assert!(TrackID::try_from("").is_err());
/// assert!(TrackID::try_from("spotify:track:4uLU6hMCjMI75M1A2tKUQC").is_err());
/// ```
///
/// [track_id]: https://specifications.freedesktop.org/mpris-spec/latest/Player_Interface.html#Simple-Type:Track_Id
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct TrackID(String);

impl TryFrom<&str> for TrackID {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if is_valid_object_path(value) {
            Ok(TrackID(value.to_owned()))
        } else {
            Err(())
        }
    }
}

impl TryFrom<String> for TrackID {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_object_path(&value) {
            Ok(TrackID(value))
        } else {
            Err(format!("{value:?} is not a valid D-Bus object path"))
        }
    }
}

impl From<TrackID> for String {
    fn from(track_id: TrackID) -> String {
        track_id.0
    }
}

impl Deref for TrackID {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for TrackID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `path` is a valid D-Bus object path.
///
/// A path starts with `/` and is made of non-empty elements of ASCII letters, digits and `_`,
/// separated by `/`. The root path `/` is valid on its own; a trailing `/` is not.
///
/// See [the D-Bus specification on object paths](https://dbus.freedesktop.org/doc/dbus-specification.html#message-protocol-marshaling-object-path).
pub fn is_valid_object_path(path: &str) -> bool {
    match path.strip_prefix('/') {
        Some("") => true,
        Some(rest) => rest.split('/').all(|element| {
            !element.is_empty()
                && element
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }),
        None => false,
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use serde_test::{assert_de_tokens_error, assert_tokens, Token};

    #[test]
    fn test_serialization() {
        let track_id = TrackID("/foo/bar".to_owned());
        assert_tokens(&track_id, &[Token::String("/foo/bar")]);
    }

    #[test]
    fn test_invalid_deserialization() {
        assert_de_tokens_error::<TrackID>(
            &[Token::String("foo")],
            "\"foo\" is not a valid D-Bus object path",
        );
    }
}
