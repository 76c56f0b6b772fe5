// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Command-level errors and their mapping onto the RPC taxonomy

use coretest_hal::HalError;
use coretest_ipc::BridgeError;
use coretest_resources::StoreError;
use coretest_rpc::RpcError;
use thiserror::Error;

/// Anything a command handler can fail with
///
/// Handlers use `?` on every layer they touch; the registry boundary converts the result into
/// an [`RpcError`].
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Hal(#[from] HalError),
}

pub type CommandResult<T> = Result<T, CommandError>;

fn store_error(err: StoreError) -> RpcError {
    match err {
        StoreError::NotFound { name } => RpcError::resource_not_found(name),
        StoreError::AllocationFailed { .. } => RpcError::ResourceAllocationFailed(err.to_string()),
        StoreError::Overflow { .. } => RpcError::ResourceOverflow(err.to_string()),
        StoreError::InvalidEncoding(_) => RpcError::bad_param("data", err.to_string()),
    }
}

fn bridge_error(err: BridgeError) -> RpcError {
    match err {
        BridgeError::PeerUnresponsive => {
            RpcError::PeerUnresponsive("M4 has not been started".to_string())
        }
        BridgeError::TimedOut { .. } => {
            RpcError::PeerUnresponsive("Timed out waiting for response from M4".to_string())
        }
        other => RpcError::failed(other.to_string()),
    }
}

fn hal_error(err: HalError) -> RpcError {
    match err {
        HalError::NotDetected(_) | HalError::NotPowered(_) | HalError::Configure { .. } => {
            RpcError::DeviceUnavailable(err.to_string())
        }
        HalError::InvalidArgument { .. } | HalError::Timeout { .. } | HalError::Device(_) => {
            RpcError::failed(err.to_string())
        }
    }
}

impl From<CommandError> for RpcError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Rpc(e) => e,
            CommandError::Store(e) => store_error(e),
            CommandError::Bridge(e) => bridge_error(e),
            CommandError::Hal(e) => hal_error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coretest_rpc::codes;

    fn rpc(err: impl Into<CommandError>) -> RpcError {
        let err: CommandError = err.into();
        RpcError::from(err)
    }

    #[test]
    fn test_store_mapping() {
        let not_found = rpc(StoreError::NotFound {
            name: "model".to_string(),
        });
        assert_eq!(not_found, RpcError::resource_not_found("model"));

        let encoding = rpc(StoreError::InvalidEncoding("bad byte".to_string()));
        assert_eq!(encoding.code(), codes::BAD_PARAMS);
        assert_eq!(encoding.data(), Some(serde_json::json!({"param": "data"})));

        let overflow = rpc(StoreError::Overflow {
            name: "img".to_string(),
            offset: 8,
            len: 4,
            size: 10,
        });
        assert_eq!(overflow.code(), codes::RESOURCE_OVERFLOW);
    }

    #[test]
    fn test_bridge_mapping() {
        assert_eq!(rpc(BridgeError::PeerUnresponsive).code(), codes::PEER_UNRESPONSIVE);
        let timed_out = rpc(BridgeError::TimedOut { timeout_ms: 1000 });
        assert_eq!(timed_out.code(), codes::PEER_UNRESPONSIVE);
        assert_eq!(timed_out.to_string(), "Timed out waiting for response from M4");
    }

    #[test]
    fn test_hal_mapping() {
        assert_eq!(
            rpc(HalError::NotDetected("camera")),
            RpcError::DeviceUnavailable("unable to detect camera".to_string())
        );
        assert_eq!(rpc(HalError::Device("boom".to_string())), RpcError::failed("boom"));
    }

    #[test]
    fn test_rpc_passthrough() {
        let original = RpcError::bad_param("size", "missing param");
        assert_eq!(rpc(original.clone()), original);
    }
}
