pub mod client;
pub mod currency;
pub mod error;
pub mod rpc;
pub mod types;

pub use client::NimiqClient;
pub use currency::{format_nim, parse_luna, AmountError, Luna, Nim};
pub use error::{CoreError, RpcError};
