//! Endpoint Probe
//!
//! Finds the companion by walking a fixed candidate list.
//!
//! Order is hosts outer, ports inner: for hosts `[a, b]` and ports `[1, 2]`
//! the candidates are `a:1, a:2, b:1, b:2`. Attempts are strictly sequential,
//! one per candidate, and the first healthy candidate ends the scan.

use reqwest::header::{HeaderValue, ORIGIN};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::types::Endpoint;

/// Outcome of a single reachability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateCheck {
    /// Health path answered with a 2xx status
    Healthy,
    /// Something answered, but not with success
    Unhealthy(StatusCode),
    /// Connection refused, timed out or otherwise failed
    Unreachable(String),
}

/// Sequential, single-attempt discovery over (host, port) candidates
#[derive(Debug, Clone)]
pub struct EndpointProbe {
    client: Client,
    health_path: String,
    timeout: Duration,
    origin: Option<HeaderValue>,
}

impl EndpointProbe {
    pub fn new(client: Client, health_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            health_path: health_path.into(),
            timeout,
            origin: None,
        }
    }

    /// Send `Origin` with every check, as a cross-origin page request would
    pub fn with_origin(mut self, origin: Option<HeaderValue>) -> Self {
        self.origin = origin;
        self
    }

    /// Candidates in scan order
    pub fn candidates(hosts: &[String], ports: &[u16]) -> Vec<Endpoint> {
        hosts
            .iter()
            .flat_map(|host| ports.iter().map(move |&port| Endpoint::new(host.clone(), port)))
            .collect()
    }

    /// One GET against the health path, bounded by the probe timeout
    pub async fn check(&self, candidate: &Endpoint) -> CandidateCheck {
        let mut request = self
            .client
            .get(candidate.url(&self.health_path))
            .timeout(self.timeout);

        if let Some(origin) = &self.origin {
            request = request.header(ORIGIN, origin.clone());
        }

        match request.send().await {
            Ok(resp) if resp.status().is_success() => CandidateCheck::Healthy,
            Ok(resp) => CandidateCheck::Unhealthy(resp.status()),
            Err(e) => CandidateCheck::Unreachable(e.to_string()),
        }
    }

    /// First healthy candidate, or `None` once every candidate has failed
    pub async fn probe(&self, hosts: &[String], ports: &[u16]) -> Option<Endpoint> {
        for candidate in Self::candidates(hosts, ports) {
            match self.check(&candidate).await {
                CandidateCheck::Healthy => {
                    info!("Companion found at {}", candidate);
                    return Some(candidate);
                }
                CandidateCheck::Unhealthy(status) => {
                    debug!("Candidate {} answered {}", candidate, status);
                }
                CandidateCheck::Unreachable(reason) => {
                    debug!("Candidate {} unreachable: {}", candidate, reason);
                }
            }
        }

        warn!(
            "No companion answered on {} host(s) x {} port(s)",
            hosts.len(),
            ports.len()
        );
        None
    }
}
