use crate::value::Value;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    ser::{SerializeMap, SerializeSeq},
};
use std::{cmp::Ordering, fmt};

///
/// KeyPart
///
/// One component of an index key. `Open` collates after every value and
/// closes a range at "highest possible" for the remaining tail. On the wire
/// it is `{}`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum KeyPart {
    Value(Value),
    Open,
}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => a.cmp(b),
            (Self::Value(_), Self::Open) => Ordering::Less,
            (Self::Open, Self::Value(_)) => Ordering::Greater,
            (Self::Open, Self::Open) => Ordering::Equal,
        }
    }
}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<Value> for KeyPart {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for KeyPart {
    fn from(value: &str) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<String> for KeyPart {
    fn from(value: String) -> Self {
        Self::Value(Value::from(value))
    }
}

impl From<bool> for KeyPart {
    fn from(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }
}

impl From<i64> for KeyPart {
    fn from(value: i64) -> Self {
        Self::Value(Value::Int(value))
    }
}

impl Serialize for KeyPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Open => serializer.serialize_map(Some(0))?.end(),
        }
    }
}

impl<'de> Deserialize<'de> for KeyPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Index keys hold scalars only, so an empty map is unambiguous.
        match Value::deserialize(deserializer)? {
            Value::Map(map) if map.is_empty() => Ok(Self::Open),
            value => Ok(Self::Value(value)),
        }
    }
}

///
/// IndexKey
///
/// Ordered tuple of key parts. Collation is lexicographic; a strict prefix
/// sorts before any of its extensions, so `[s]` ≤ `[s, x, …]` ≤ `[s, {}]`.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Ord, PartialEq, PartialOrd)]
#[serde(transparent)]
pub struct IndexKey(Vec<KeyPart>);

impl IndexKey {
    #[must_use]
    pub const fn new(parts: Vec<KeyPart>) -> Self {
        Self(parts)
    }

    #[must_use]
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extend with one more component.
    #[must_use]
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    /// Extend with the open sentinel.
    #[must_use]
    pub fn with_open(mut self) -> Self {
        self.0.push(KeyPart::Open);
        self
    }

    #[must_use]
    pub fn ends_open(&self) -> bool {
        matches!(self.0.last(), Some(KeyPart::Open))
    }
}

impl Serialize for IndexKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for part in &self.0 {
            seq.serialize_element(part)?;
        }
        seq.end()
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match part {
                KeyPart::Value(Value::Text(text)) => write!(f, "{text:?}")?,
                KeyPart::Value(value) => write!(f, "{value}")?,
                KeyPart::Open => write!(f, "{{}}")?,
            }
        }
        write!(f, "]")
    }
}

/// Build an index key from literal parts: `index_key!["all", "fw"]`.
#[macro_export]
macro_rules! index_key {
    () => {
        $crate::db::index::IndexKey::default()
    };
    ( $( $part:expr ),+ $(,)? ) => {
        $crate::db::index::IndexKey::new(vec![ $( $crate::db::index::KeyPart::from($part) ),+ ])
    };
}
