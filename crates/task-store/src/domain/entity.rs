//! Domain Layer - Identifiers and Entity Trait
//!
//! Server rows are identified by opaque strings (UUIDs in practice). Optimistic
//! placeholders carry a locally generated `temp-` id until the server answers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Prefix reserved for placeholder ids. Server ids never start with it.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Core trait for entities held in the store
pub trait Entity: Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + std::hash::Hash + fmt::Debug;

    /// Returns the entity's unique identifier
    fn id(&self) -> &Self::Id;
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Build a placeholder id from a per-store sequence number
            pub fn temporary(seq: u64) -> Self {
                Self(format!("{}{}", TEMP_ID_PREFIX, seq))
            }

            /// True for optimistic placeholders that the server has not confirmed yet
            pub fn is_temporary(&self) -> bool {
                self.0.starts_with(TEMP_ID_PREFIX)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a row in the `tasks` table
    TaskId
);

string_id!(
    /// Identifier of a row in the `subtasks` table
    SubtaskId
);
