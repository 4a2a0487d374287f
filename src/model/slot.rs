use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How an optional field was found in the stored document.
///
/// `Absent` means the key was missing, `Null` means the key held JSON `null`.
/// Fields of this type are declared with
/// `#[serde(default, skip_serializing_if = "Slot::is_absent")]` so a record
/// writes back exactly the keys it was read with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<T> {
    Absent,
    Null,
    Present(T),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Absent
    }
}

impl<T> Slot<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Slot::Present(_))
    }

    pub fn as_present(&self) -> Option<&T> {
        match self {
            Slot::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Slot<&T> {
        match self {
            Slot::Absent => Slot::Absent,
            Slot::Null => Slot::Null,
            Slot::Present(value) => Slot::Present(value),
        }
    }

    /// Transforms a present value, keeping `Absent` and `Null` as they are.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Slot<U> {
        match self {
            Slot::Absent => Slot::Absent,
            Slot::Null => Slot::Null,
            Slot::Present(value) => Slot::Present(f(value)),
        }
    }
}

impl<T: Serialize> Serialize for Slot<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Slot::Present(value) => value.serialize(serializer),
            // Absent is normally skipped by the field attribute.
            Slot::Absent | Slot::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Slot<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Slot::Present(value),
            None => Slot::Null,
        })
    }
}
