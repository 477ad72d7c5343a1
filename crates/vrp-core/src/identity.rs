//! # Domain Identity Newtypes
//!
//! Opaque identifiers handed to the core by the external voucher domain
//! service. The core never interprets them; the newtypes only keep the
//! namespaces apart so a batch code cannot stand in for a user id.

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an opaque identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Access the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True when the identifier is empty or whitespace only.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
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
    };
}

opaque_id!(
    /// Identifier of a voucher in the external voucher domain.
    VoucherId
);

opaque_id!(
    /// Identifier of the end user a voucher was claimed by.
    UserId
);

opaque_id!(
    /// Identifier of a print/distribution batch.
    BatchCode
);

/// Redemption channel a token was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Claimed by a specific user, redeemed in person within a short window.
    User,
    /// Distributed in physical/batch form, long-lived, no bound user.
    Print,
}

impl TokenType {
    /// Wire name of the type (`"user"` / `"print"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Print => "print",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
