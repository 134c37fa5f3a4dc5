//! Client side of the Remote SIM Provisioning (RSP) ES2+ interface.
//!
//! Every request is signed with a fresh request id and millisecond
//! timestamp; see [`RequestSigner`]. [`HttpTransport`] performs the network
//! call, while [`RspClient`] builds the typed ES2+ bodies on top of any
//! [`SignedTransport`].

pub mod client;
pub mod error;
pub mod signing;
pub mod transport;
pub mod wire;

pub use client::RspClient;
pub use error::RequestError;
pub use signing::{RequestSigner, SignedHeaders, SIGN_METHOD};
pub use transport::{HttpTransport, RspSettings, SignedTransport};
pub use wire::*;
