//! # bmshub-adapter-remote-reqwest
//!
//! Outbound HTTP adapter using [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - [`ReqwestGateway`] implements `RemoteGateway`: every control and status
//!   endpoint is a `POST {base}/functions/v1/{endpoint}` with a JSON body
//! - [`SmartThingsProbe`] implements `PlatformProbe` by listing the
//!   locations visible to an access token
//! - Map reqwest failures and non-2xx replies into `GatewayError`
//!
//! ## Dependency rule
//! Depends on `bmshub-app` (for port traits) and `bmshub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod gateway;
mod probe;

pub use error::ReqwestGatewayError;
pub use gateway::{GatewayConfig, ReqwestGateway};
pub use probe::SmartThingsProbe;
