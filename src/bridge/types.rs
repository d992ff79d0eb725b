//! Bridge Types
//!
//! Endpoint, credential and the wire schemas of the companion's commands.

use reqwest::header::HeaderValue;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{BridgeError, Result};

/// A live companion process, selected by the probe
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `http://host:port`, bracketing IPv6 literals
    pub fn base_url(&self) -> String {
        if self.host.contains(':') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    /// Absolute URL of `path` on this endpoint
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url(), path)
        } else {
            format!("{}/{}", self.base_url(), path)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}

/// Opaque client token. Fixed once created, wiped on drop, never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential(String);

impl Credential {
    /// Accepts any token that can travel unmodified in an HTTP header
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if HeaderValue::from_str(&token).is_err() {
            return Err(BridgeError::InvalidCredential);
        }
        Ok(Self(token))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Header value marked sensitive so it is left out of debug output
    pub(crate) fn header_value(&self) -> Result<HeaderValue> {
        let mut value =
            HeaderValue::from_str(&self.0).map_err(|_| BridgeError::InvalidCredential)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// A command the companion understands: fixed route plus a typed body and reply
pub trait Command: Serialize {
    const METHOD: Method;
    const PATH: &'static str;

    type Reply: DeserializeOwned;
}

/// Fetch `url` and save it locally
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadCommand {
    pub url: String,
    #[serde(rename = "saveAs")]
    pub save_as: Option<String>,
}

impl Command for DownloadCommand {
    const METHOD: Method = Method::POST;
    const PATH: &'static str = "/v1/download";

    type Reply = DownloadReply;
}

/// Send the local file at `path` to `upload_url`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadCommand {
    pub path: String,
    #[serde(rename = "uploadUrl")]
    pub upload_url: String,
}

impl Command for UploadCommand {
    const METHOD: Method = Method::POST;
    const PATH: &'static str = "/v1/upload";

    type Reply = UploadReply;
}

/// Reply body of a companion command.
///
/// Any JSON object decodes. Known fields are typed when their value has the
/// expected shape; otherwise they stay in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct CommandReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for CommandReply {
    fn from(mut extra: Map<String, Value>) -> Self {
        let ok = match extra.remove("ok") {
            Some(Value::Bool(b)) => Some(b),
            Some(Value::Number(n)) if matches!(n.as_u64(), Some(0 | 1)) => Some(n.as_u64() == Some(1)),
            Some(Value::Null) | None => None,
            Some(other) => {
                extra.insert("ok".to_string(), other);
                None
            }
        };

        Self {
            ok,
            error: take_string(&mut extra, "error"),
            message: take_string(&mut extra, "message"),
            extra,
        }
    }
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => {
            map.insert(key.to_string(), other);
            None
        }
    }
}

impl CommandReply {
    /// Explicit `ok` wins; otherwise success means no `error` field of any shape
    pub fn succeeded(&self) -> bool {
        self.ok
            .unwrap_or(self.error.is_none() && !self.extra.contains_key("error"))
    }
}

pub type DownloadReply = CommandReply;
pub type UploadReply = CommandReply;

/// Decoded reply together with the HTTP status it arrived with
#[derive(Debug, Clone, PartialEq)]
pub struct CommandResult<T> {
    pub status: u16,
    pub reply: T,
}

impl<T> CommandResult<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
