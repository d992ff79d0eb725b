//! Bridge Module
//!
//! Discovery of the local companion process and authenticated command relay.
//! The probe finds an endpoint, the requester talks to it, and `Bridge`
//! ties both to one session.

pub mod client;
pub mod probe;
pub mod requester;
pub mod types;

pub use client::{Bridge, BridgeState};
pub use probe::{CandidateCheck, EndpointProbe};
pub use requester::{AuthenticatedRequester, CLIENT_TOKEN_HEADER};
pub use types::{
    Command, CommandReply, CommandResult, Credential, DownloadCommand, DownloadReply, Endpoint,
    UploadCommand, UploadReply,
};
