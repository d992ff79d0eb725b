//! Configuration management

use anyhow::{bail, Context, Result};
use reqwest::header::HeaderValue;
use reqwest::Url;
use std::time::Duration;

use crate::bridge::types::Credential;
use crate::error::BridgeError;

/// Hosts tried during discovery, in order
pub const DEFAULT_HOSTS: [&str; 2] = ["127.0.0.1", "localhost"];

/// Ports tried for each host, in order
pub const DEFAULT_PORTS: [u16; 1] = [4589];

pub const DEFAULT_HEALTH_PATH: &str = "/health";
pub const DEFAULT_UPLOAD_PATH: &str = "/api/upload";

/// How command replies with a non-2xx status are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Decode the body and hand it back together with the status
    #[default]
    PassThrough,
    /// Fail with `BridgeError::Rejected` on any non-2xx status
    Strict,
}

/// Bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Token sent as `X-Client-Token` on every command
    pub credential: Credential,

    /// Origin of the hosting page; download sources and the upload target resolve against it
    pub page_origin: Url,

    /// Candidate hosts (outer loop of the probe)
    pub hosts: Vec<String>,

    /// Candidate ports (inner loop of the probe)
    pub ports: Vec<u16>,

    /// Reachability path on the companion
    pub health_path: String,

    /// Bound on each single probe attempt
    pub probe_timeout: Duration,

    /// Bound on each command request
    pub request_timeout: Duration,

    /// Upload API path on the page origin
    pub upload_path: String,

    pub status_policy: StatusPolicy,
}

impl BridgeConfig {
    /// Config with the compatible defaults: `127.0.0.1` then `localhost`, port 4589
    pub fn new(credential: impl Into<String>, page_origin: &str) -> crate::Result<Self> {
        Ok(Self {
            credential: Credential::new(credential)?,
            page_origin: normalize_origin(page_origin)?,
            hosts: DEFAULT_HOSTS.iter().map(|h| h.to_string()).collect(),
            ports: DEFAULT_PORTS.to_vec(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            probe_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(30),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            status_policy: StatusPolicy::PassThrough,
        })
    }

    /// Replace the discovery candidates
    pub fn with_candidates(mut self, hosts: Vec<String>, ports: Vec<u16>) -> Self {
        self.hosts = hosts;
        self.ports = ports;
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let credential = lookup("CLIENT_TOKEN").context("CLIENT_TOKEN environment variable required")?;
        let origin = lookup("BRIDGE_PAGE_ORIGIN")
            .context("BRIDGE_PAGE_ORIGIN environment variable required")?;

        let mut config = Self::new(credential, &origin)?;

        if let Some(hosts) = lookup("BRIDGE_HOSTS") {
            config.hosts = split_list(&hosts).map(str::to_string).collect();
            if config.hosts.is_empty() {
                bail!("BRIDGE_HOSTS lists no hosts");
            }
        }

        if let Some(ports) = lookup("BRIDGE_PORTS") {
            config.ports = split_list(&ports)
                .map(|p| p.parse::<u16>().with_context(|| format!("invalid port in BRIDGE_PORTS: {}", p)))
                .collect::<Result<_>>()?;
            if config.ports.is_empty() {
                bail!("BRIDGE_PORTS lists no ports");
            }
        }

        if let Some(ms) = lookup("BRIDGE_PROBE_TIMEOUT_MS") {
            let ms = ms
                .trim()
                .parse()
                .with_context(|| format!("invalid BRIDGE_PROBE_TIMEOUT_MS: {}", ms))?;
            config.probe_timeout = Duration::from_millis(ms);
        }

        if let Some(secs) = lookup("BRIDGE_REQUEST_TIMEOUT_SECS") {
            let secs = secs
                .trim()
                .parse()
                .with_context(|| format!("invalid BRIDGE_REQUEST_TIMEOUT_SECS: {}", secs))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(path) = lookup("BRIDGE_UPLOAD_PATH") {
            config.upload_path = path;
        }

        if lookup("BRIDGE_STRICT_STATUS").is_some_and(|v| v == "true" || v == "1") {
            config.status_policy = StatusPolicy::Strict;
        }

        Ok(config)
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Reduce a page URL to its origin (`scheme://host[:port]/`)
pub fn normalize_origin(input: &str) -> crate::Result<Url> {
    let invalid = |reason: &str| BridgeError::InvalidUrl {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(input).map_err(|e| invalid(&e.to_string()))?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(invalid("URL has no tuple origin"));
    }

    Url::parse(&origin.ascii_serialization()).map_err(|e| invalid(&e.to_string()))
}

/// `Origin` header value for the page (`scheme://host[:port]`, no trailing slash)
pub(crate) fn origin_header(origin: &Url) -> Option<HeaderValue> {
    HeaderValue::from_str(&origin.origin().ascii_serialization()).ok()
}
