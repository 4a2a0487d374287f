use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A value the migration understands, or anything else kept verbatim.
///
/// Used wherever the dashboard expects an object or an array but old or
/// hand-edited data may hold something else; such values pass through
/// untouched instead of failing the whole roster.
#[derive(Debug, Clone, PartialEq)]
pub enum Shaped<T> {
    Typed(T),
    Opaque(Value),
}

impl<T> Shaped<T> {
    pub fn as_typed(&self) -> Option<&T> {
        match self {
            Shaped::Typed(value) => Some(value),
            Shaped::Opaque(_) => None,
        }
    }

    /// Applies `f` to a typed value; opaque values are cloned as they are.
    pub fn map_typed<F: FnOnce(&T) -> T>(&self, f: F) -> Shaped<T> {
        match self {
            Shaped::Typed(value) => Shaped::Typed(f(value)),
            Shaped::Opaque(value) => Shaped::Opaque(value.clone()),
        }
    }
}

impl<T: Serialize> Serialize for Shaped<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Shaped::Typed(value) => value.serialize(serializer),
            Shaped::Opaque(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Shaped<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match T::deserialize(&value) {
            Ok(typed) => Shaped::Typed(typed),
            Err(_) => Shaped::Opaque(value),
        })
    }
}
