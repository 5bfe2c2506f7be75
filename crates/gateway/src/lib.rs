//! Command gateway: the uniform async boundary through which the panel asks
//! for a devbox switch, a favorite activation, or the favorites list.
//!
//! [`CommandInvoker`] is the raw boundary (one named request in, one reply or
//! failure out). [`CommandGateway`] shapes the three typed operations on top
//! of it and forwards arguments untouched.

use std::sync::Arc;

use async_trait::async_trait;
use hosts::HostsFile;
use shared::{
    domain::{DeviceId, FavoriteSelector},
    error::OperationFailed,
    protocol::{GatewayReply, GatewayRequest},
};
use tracing::{debug, warn};

#[async_trait]
pub trait CommandInvoker: Send + Sync {
    /// Executes one named request. Resolves or rejects exactly once; no
    /// retries or timeouts are applied on this side.
    async fn invoke(&self, request: GatewayRequest) -> Result<GatewayReply, OperationFailed>;
}

pub struct UnavailableInvoker;

#[async_trait]
impl CommandInvoker for UnavailableInvoker {
    async fn invoke(&self, _request: GatewayRequest) -> Result<GatewayReply, OperationFailed> {
        Err(OperationFailed::new("command gateway is unavailable"))
    }
}

/// Executes requests against a hosts file on the blocking pool.
pub struct HostsInvoker {
    hosts: HostsFile,
}

impl HostsInvoker {
    pub fn new(hosts: HostsFile) -> Self {
        Self { hosts }
    }

    pub fn hosts(&self) -> &HostsFile {
        &self.hosts
    }

    fn execute(
        hosts: &HostsFile,
        request: GatewayRequest,
    ) -> Result<GatewayReply, OperationFailed> {
        let outcome = match request {
            GatewayRequest::SwitchDevice { device_id } => {
                hosts.swap(device_id).map(|()| GatewayReply::Unit)
            }
            GatewayRequest::ActivateFavorite { selector } => hosts
                .activate_favorite(&selector)
                .map(|()| GatewayReply::Unit),
            GatewayRequest::ListFavorites => hosts.favorites().map(GatewayReply::Favorites),
        };
        outcome.map_err(|error| OperationFailed::new(error.to_string()))
    }
}

#[async_trait]
impl CommandInvoker for HostsInvoker {
    async fn invoke(&self, request: GatewayRequest) -> Result<GatewayReply, OperationFailed> {
        let hosts = self.hosts.clone();
        tokio::task::spawn_blocking(move || Self::execute(&hosts, request))
            .await
            .map_err(|error| OperationFailed::new(format!("hosts task failed: {error}")))?
    }
}

#[derive(Clone)]
pub struct CommandGateway {
    invoker: Arc<dyn CommandInvoker>,
}

impl CommandGateway {
    pub fn new(invoker: Arc<dyn CommandInvoker>) -> Self {
        Self { invoker }
    }

    pub fn unavailable() -> Self {
        Self::new(Arc::new(UnavailableInvoker))
    }

    pub async fn switch_device(&self, device_id: DeviceId) -> Result<(), OperationFailed> {
        self.call(GatewayRequest::SwitchDevice { device_id })
            .await
            .and_then(|reply| expect_unit("switch_device", reply))
    }

    pub async fn activate_favorite(
        &self,
        selector: &FavoriteSelector,
    ) -> Result<(), OperationFailed> {
        self.call(GatewayRequest::ActivateFavorite {
            selector: selector.clone(),
        })
        .await
        .and_then(|reply| expect_unit("activate_favorite", reply))
    }

    pub async fn list_favorites(&self) -> Result<Vec<FavoriteSelector>, OperationFailed> {
        match self.call(GatewayRequest::ListFavorites).await? {
            GatewayReply::Favorites(favorites) => Ok(favorites),
            GatewayReply::Unit => Err(OperationFailed::new(
                "unexpected reply to list_favorites",
            )),
        }
    }

    async fn call(&self, request: GatewayRequest) -> Result<GatewayReply, OperationFailed> {
        let command = request.command_name();
        debug!(command, "invoking gateway command");
        let result = self.invoker.invoke(request).await;
        if let Err(failure) = &result {
            warn!(command, reason = %failure, "gateway command failed");
        }
        result
    }
}

fn expect_unit(command: &str, reply: GatewayReply) -> Result<(), OperationFailed> {
    match reply {
        GatewayReply::Unit => Ok(()),
        GatewayReply::Favorites(_) => Err(OperationFailed::new(format!(
            "unexpected reply to {command}"
        ))),
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
