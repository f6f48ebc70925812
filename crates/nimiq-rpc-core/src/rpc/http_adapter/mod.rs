//! JSON-RPC transport for Nimiq nodes over HTTP(S).
//!
//! Implements [`Transport`](super::Transport) with `reqwest`: URL validation,
//! basic auth from a user/password pair, and arbitrary static headers
//! attached to every request.

mod connection;
mod transport;

pub use transport::{HttpTransport, HttpTransportConfig};
