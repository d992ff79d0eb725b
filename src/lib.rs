//! Client Bridge
//!
//! Page-side bridge to a companion process on the user's own machine.
//! Finds the companion over loopback and relays file-transfer commands to it.
//!
//! # Features
//!
//! - **Discovery**: sequential health probe over (host, port) candidates
//! - **Relay**: token-authenticated download and upload commands
//! - **Typed wire schemas**: one request/reply type per command
//!
//! # Architecture
//!
//! ```text
//! Page origin ──► Bridge ──► EndpointProbe ──► GET /health  (127.0.0.1:4589, localhost:4589)
//!                   │
//!                   └──► AuthenticatedRequester ──► POST /v1/download
//!                          (X-Client-Token)     └─► POST /v1/upload
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use client_bridge::{Bridge, BridgeConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BridgeConfig::new("tok-1", "https://files.example.com")?;
//! let bridge = Bridge::initialize(config).await?;
//!
//! if bridge.is_connected() {
//!     let result = bridge.relay_download("/files/x.bin", Some("x.bin")).await?;
//!     println!("companion replied {}", result.status);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod config;
pub mod error;

pub use bridge::{
    AuthenticatedRequester, Bridge, BridgeState, CommandReply, CommandResult, Credential,
    Endpoint, EndpointProbe,
};
pub use config::{BridgeConfig, StatusPolicy};
pub use error::{BridgeError, Result};
