use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies a target devbox. Non-negative by construction; whether a given
/// id is actually switchable is decided by whatever executes the command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid device id: '{input}'")]
pub struct ParseDeviceIdError {
    pub input: String,
}

impl DeviceId {
    pub fn parse(text: &str) -> Result<Self, ParseDeviceIdError> {
        text.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ParseDeviceIdError {
                input: text.to_string(),
            })
    }
}

impl FromStr for DeviceId {
    type Err = ParseDeviceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque token naming a saved favorite. It is displayed as-is and handed back
/// verbatim when the favorite is activated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSelector(pub String);

impl FavoriteSelector {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for FavoriteSelector {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FavoriteSelector {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for FavoriteSelector {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for FavoriteSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
