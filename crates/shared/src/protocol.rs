use serde::{Deserialize, Serialize};

use crate::{
    domain::{DeviceId, FavoriteSelector},
    error::OperationFailed,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "args", rename_all = "snake_case")]
pub enum GatewayRequest {
    SwitchDevice {
        #[serde(rename = "deviceId")]
        device_id: DeviceId,
    },
    ActivateFavorite {
        selector: FavoriteSelector,
    },
    ListFavorites,
}

impl GatewayRequest {
    pub fn command_name(&self) -> &'static str {
        match self {
            Self::SwitchDevice { .. } => "switch_device",
            Self::ActivateFavorite { .. } => "activate_favorite",
            Self::ListFavorites => "list_favorites",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GatewayReply {
    Favorites(Vec<FavoriteSelector>),
    Unit,
}

/// One line of the JSON-lines boundary: `{"ok": ...}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireResponse {
    Ok(GatewayReply),
    Error(String),
}

impl From<Result<GatewayReply, OperationFailed>> for WireResponse {
    fn from(value: Result<GatewayReply, OperationFailed>) -> Self {
        match value {
            Ok(reply) => Self::Ok(reply),
            Err(failure) => Self::Error(failure.reason),
        }
    }
}

impl From<WireResponse> for Result<GatewayReply, OperationFailed> {
    fn from(value: WireResponse) -> Self {
        match value {
            WireResponse::Ok(reply) => Ok(reply),
            WireResponse::Error(reason) => Err(OperationFailed { reason }),
        }
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
