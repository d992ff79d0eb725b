//! Authenticated Requester
//!
//! Sends one command to an established endpoint and decodes the reply.
//! Single attempt, no retries.

use reqwest::header::{HeaderValue, ORIGIN};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::types::{Command, CommandResult, Credential, Endpoint};
use crate::config::StatusPolicy;
use crate::error::{BridgeError, Result};

/// Header carrying the client token on every command
pub const CLIENT_TOKEN_HEADER: &str = "X-Client-Token";

/// Issues commands carrying a fixed credential
#[derive(Debug, Clone)]
pub struct AuthenticatedRequester {
    client: Client,
    credential: Credential,
    timeout: Duration,
    origin: Option<HeaderValue>,
    status_policy: StatusPolicy,
}

impl AuthenticatedRequester {
    pub fn new(client: Client, credential: Credential, timeout: Duration) -> Self {
        Self {
            client,
            credential,
            timeout,
            origin: None,
            status_policy: StatusPolicy::PassThrough,
        }
    }

    /// Send `Origin` with every command, as a cross-origin page request would
    pub fn with_origin(mut self, origin: Option<HeaderValue>) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Send `command` to `endpoint` and decode its reply.
    ///
    /// Fails with `Transport` if the exchange does not complete, `Protocol` if
    /// the body does not decode, and `Rejected` for non-2xx under `Strict`.
    pub async fn invoke<C: Command>(
        &self,
        endpoint: &Endpoint,
        command: &C,
    ) -> Result<CommandResult<C::Reply>> {
        let url = endpoint.url(C::PATH);
        debug!("{} {}", C::METHOD, url);

        let mut request = self
            .client
            .request(C::METHOD, url.as_str())
            .timeout(self.timeout)
            .header(CLIENT_TOKEN_HEADER, self.credential.header_value()?)
            .json(command);

        if let Some(origin) = &self.origin {
            request = request.header(ORIGIN, origin.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!("{} -> {} ({} bytes)", url, status, body.len());

        if self.status_policy == StatusPolicy::Strict && !status.is_success() {
            return Err(BridgeError::Rejected {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let reply = serde_json::from_slice::<C::Reply>(&body).map_err(|e| BridgeError::Protocol {
            status: status.as_u16(),
            reason: e.to_string(),
        })?;

        Ok(CommandResult {
            status: status.as_u16(),
            reply,
        })
    }
}
