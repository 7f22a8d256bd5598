//! Remote gateway port: the RPC-shaped endpoints fronting both device platforms.

use std::future::Future;
use std::sync::Arc;

use bmshub_domain::action::DeviceAction;
use bmshub_domain::command::{CommandRequest, ControlResponse};
use bmshub_domain::error::GatewayError;
use bmshub_domain::status::{StatusRequest, SyncStatusResponse};

/// Invokes named remote endpoints on behalf of the dispatcher and scheduler.
///
/// Implementations perform exactly one delivery attempt per call and never
/// retry; an application-level `error` field is returned as data, not as
/// an `Err`.
pub trait RemoteGateway {
    /// Post a control command to `endpoint`.
    fn invoke_control<A: DeviceAction>(
        &self,
        endpoint: &'static str,
        request: &CommandRequest<A>,
    ) -> impl Future<Output = Result<ControlResponse, GatewayError>> + Send;

    /// Fetch authoritative device status from `endpoint`.
    fn fetch_status(
        &self,
        endpoint: &'static str,
        request: &StatusRequest,
    ) -> impl Future<Output = Result<SyncStatusResponse, GatewayError>> + Send;
}

impl<T: RemoteGateway + Send + Sync> RemoteGateway for Arc<T> {
    fn invoke_control<A: DeviceAction>(
        &self,
        endpoint: &'static str,
        request: &CommandRequest<A>,
    ) -> impl Future<Output = Result<ControlResponse, GatewayError>> + Send {
        (**self).invoke_control(endpoint, request)
    }

    fn fetch_status(
        &self,
        endpoint: &'static str,
        request: &StatusRequest,
    ) -> impl Future<Output = Result<SyncStatusResponse, GatewayError>> + Send {
        (**self).fetch_status(endpoint, request)
    }
}
