//! Typed identifier newtypes.
//!
//! Devices and rules carry human-chosen slugs (`front_door_lock`,
//! `welcome_home`) so their ids are string-backed. Execution reports are
//! generated by the engine and use random UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

macro_rules! define_slug_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a slug without validation.
            #[must_use]
            pub fn new(slug: impl Into<String>) -> Self {
                Self(slug.into())
            }

            /// Access the slug.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the slug is empty.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(ValidationError::EmptyId);
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

define_slug_id!(
    /// Unique identifier for a [`Device`](crate::device::Device).
    DeviceId
);

define_slug_id!(
    /// Unique identifier for a [`Rule`](crate::rule::Rule).
    RuleId
);

/// Unique identifier for an [`ExecutionReport`](crate::report::ExecutionReport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(uuid::Uuid);

impl Default for ReportId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl ReportId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
