//! Three-state field wrapper for partial updates.
//!
//! Update DTOs need to tell "leave this column alone" apart from "clear this
//! column" and "set this column". [`Patch`] models the three cases
//! explicitly: a missing JSON key deserializes to [`Patch::Unset`], an
//! explicit `null` to [`Patch::Null`], and any other value to
//! [`Patch::Value`]. Fields must carry `#[serde(default)]` for the missing
//! key case to apply.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Not supplied; the column is left untouched.
    #[default]
    Unset,
    /// Explicitly cleared to NULL.
    Null,
    /// Set to a new value.
    Value(T),
}

impl<T> Patch<T> {
    /// `true` unless the field is [`Patch::Unset`].
    pub fn is_set(&self) -> bool {
        !matches!(self, Patch::Unset)
    }

    /// Borrow the new value, if one was supplied.
    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Resolve the patch against the current value of the column.
    ///
    /// `Unset` keeps `current`, `Null` yields `None`, `Value` yields the new
    /// value.
    pub fn resolve(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Unset => current,
            Patch::Null => None,
            Patch::Value(v) => Some(v),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}
