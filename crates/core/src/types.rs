use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InvalidRecipientId;

/// Shared accessors for string newtypes.
macro_rules! string_accessors {
    ($name:ident) => {
        impl $name {
            /// Return the inner string as a str slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

/// The provider identifier of a recipient, as it appears in the directory.
///
/// This is the single key used for selection, dispatch and presentation.
/// A `RecipientId` is always non-empty after trimming; the raw value is not
/// yet normalized into the provider's addressing scheme (see [`ChatId`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecipientId(String);

impl RecipientId {
    /// Trim `value` and wrap it, returning `None` when nothing is left.
    pub fn new(value: impl AsRef<str>) -> Option<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }
}

string_accessors!(RecipientId);

impl TryFrom<String> for RecipientId {
    type Error = InvalidRecipientId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value).ok_or(InvalidRecipientId(value))
    }
}

impl TryFrom<&str> for RecipientId {
    type Error = InvalidRecipientId;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| InvalidRecipientId(value.to_owned()))
    }
}

/// A fully qualified provider address such as `120363...@g.us`.
///
/// Produced by [`AddressingPolicy::normalize`](crate::AddressingPolicy::normalize);
/// transports only ever receive values of this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }
}

string_accessors!(ChatId);
