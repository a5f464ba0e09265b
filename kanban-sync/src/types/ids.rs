//! Identifier newtypes for boards, lists, cards and their references.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Mint a fresh ULID-based identifier
            pub fn new() -> Self {
                Self(ulid::Ulid::new().to_string())
            }

            /// Wrap an identifier issued elsewhere (usually by the backend)
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Identifies a board
    BoardId
);
define_id!(
    /// Identifies a list (column) on a board
    ListId
);
define_id!(
    /// Identifies a card
    CardId
);
define_id!(
    /// Identifies a label attached to cards
    LabelId
);
define_id!(
    /// Identifies a staff member a card can be assigned to
    MemberId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_is_ulid() {
        let id = CardId::new();
        assert_eq!(id.as_str().len(), 26);
        assert_ne!(id, CardId::new());
    }

    #[test]
    fn test_id_serializes_transparently() {
        let id = ListId::from("l1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"l1\"");
        let parsed: ListId = serde_json::from_str("\"l1\"").unwrap();
        assert_eq!(parsed, id);
    }
}
