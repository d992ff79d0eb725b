//! Bridge
//!
//! Owns the session (credential + optional endpoint) and exposes the
//! operations page-side callers use: establish, relay download, relay upload.

use reqwest::{Client, Url};
use tracing::{debug, info, warn};

use super::probe::EndpointProbe;
use super::requester::AuthenticatedRequester;
use super::types::{
    CommandResult, DownloadCommand, DownloadReply, Endpoint, UploadCommand, UploadReply,
};
use crate::config::{origin_header, BridgeConfig};
use crate::error::{BridgeError, Result};

/// Connection state of a bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeState {
    /// No probe attempted yet
    Uninitialized,
    /// Discovery in flight
    Probing,
    /// Companion found
    Connected(Endpoint),
    /// Last probe cycle found no companion
    Disconnected,
}

/// Page-side bridge to the local companion process
#[derive(Debug)]
pub struct Bridge {
    config: BridgeConfig,
    probe: EndpointProbe,
    requester: AuthenticatedRequester,
    state: BridgeState,
}

impl Bridge {
    /// Build a bridge without touching the network. Starts `Uninitialized`.
    pub fn new(config: BridgeConfig) -> Result<Self> {
        // Companions are local: never route through a system proxy
        let client = Client::builder().no_proxy().build()?;
        let origin = origin_header(&config.page_origin);

        let probe = EndpointProbe::new(client.clone(), &config.health_path, config.probe_timeout)
            .with_origin(origin.clone());

        let requester =
            AuthenticatedRequester::new(client, config.credential.clone(), config.request_timeout)
                .with_origin(origin)
                .with_status_policy(config.status_policy);

        Ok(Self {
            config,
            probe,
            requester,
            state: BridgeState::Uninitialized,
        })
    }

    /// Build a bridge and run one probe cycle before handing it back
    pub async fn initialize(config: BridgeConfig) -> Result<Self> {
        let mut bridge = Self::new(config)?;
        bridge.establish().await;
        Ok(bridge)
    }

    /// Run one probe cycle over the configured candidates.
    ///
    /// Returns whether a companion was found. A failed cycle leaves no
    /// endpoint behind, even if an earlier cycle had connected.
    pub async fn establish(&mut self) -> bool {
        self.state = BridgeState::Probing;
        debug!(
            "Probing {} host(s) x {} port(s)",
            self.config.hosts.len(),
            self.config.ports.len()
        );

        match self.probe.probe(&self.config.hosts, &self.config.ports).await {
            Some(endpoint) => {
                self.state = BridgeState::Connected(endpoint);
                true
            }
            None => {
                self.state = BridgeState::Disconnected;
                false
            }
        }
    }

    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        match &self.state {
            BridgeState::Connected(endpoint) => Some(endpoint),
            _ => None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.endpoint().is_some()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Resolve `source_path` against the page origin (absolute URLs pass through)
    pub fn resolve_source(&self, source_path: &str) -> Result<Url> {
        self.config
            .page_origin
            .join(source_path)
            .map_err(|e| BridgeError::InvalidUrl {
                input: source_path.to_string(),
                reason: e.to_string(),
            })
    }

    /// Where the companion sends uploaded files: the page origin's upload API
    pub fn upload_url(&self) -> Result<Url> {
        self.resolve_source(&self.config.upload_path)
    }

    /// Ask the companion to fetch `source_path` from the page origin and save it
    pub async fn relay_download(
        &self,
        source_path: &str,
        save_as: Option<&str>,
    ) -> Result<CommandResult<DownloadReply>> {
        let endpoint = self.connected_endpoint()?;

        let command = DownloadCommand {
            url: self.resolve_source(source_path)?.to_string(),
            save_as: save_as.filter(|s| !s.is_empty()).map(str::to_string),
        };

        info!("Relaying download of {} via {}", command.url, endpoint);
        self.requester
            .invoke(endpoint, &command)
            .await
            .inspect_err(|e| warn!("Download relay failed: {}", e))
    }

    /// Ask the companion to upload the local file at `local_path` to the page origin
    pub async fn relay_upload(&self, local_path: &str) -> Result<CommandResult<UploadReply>> {
        let endpoint = self.connected_endpoint()?;

        let command = UploadCommand {
            path: local_path.to_string(),
            upload_url: self.upload_url()?.to_string(),
        };

        info!("Relaying upload of {} via {}", command.path, endpoint);
        self.requester
            .invoke(endpoint, &command)
            .await
            .inspect_err(|e| warn!("Upload relay failed: {}", e))
    }

    fn connected_endpoint(&self) -> Result<&Endpoint> {
        self.endpoint().ok_or(BridgeError::NotConnected)
    }
}
