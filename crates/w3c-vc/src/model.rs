//! # Verifiable Credentials Data Model
//!
//! The credential document model serialized to JSON. When documents are
//! signed as typed data, the serialized structure is the signed structure:
//! participants must interpret a credential's JSON in a consistent manner,
//! so the flex types below pin down exactly how scalar-or-sequence and
//! string-or-object properties serialize.

pub mod vc;

use serde::{Deserialize, Serialize};
pub use vc::*;

/// `Kind` allows serde to serialize/deserialize a string or an object, as
/// `@context` entries and the `issuer` property require.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Kind<T> {
    /// Simple string value
    String(String),

    /// Complex object value
    Object(T),
}

impl<T: Default> Default for Kind<T> {
    fn default() -> Self {
        Self::String(String::new())
    }
}

/// `Quota` allows serde to serialize/deserialize a single object or a set of
/// objects.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Quota<T> {
    /// Single object
    One(T),

    /// Set of objects
    Many(Vec<T>),
}

impl<T: Default> Default for Quota<T> {
    fn default() -> Self {
        Self::One(T::default())
    }
}

impl<T> Quota<T> {
    /// The first (or only) entry.
    pub fn first(&self) -> Option<&T> {
        match self {
            Self::One(one) => Some(one),
            Self::Many(many) => many.first(),
        }
    }
}
