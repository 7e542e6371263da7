pub mod app;
pub mod types;

use crate::hardware::DeviceHandle;
use async_trait::async_trait;
use serde_json::Value;
use types::TrezorError;

/// Opens connections to a Trezor through its bridge
#[async_trait]
pub trait TrezorTransport: Send + Sync {
    async fn open(&self) -> Result<Box<dyn TrezorHandle>, TrezorError>;
}

/// An open bridge connection. Signatures come back as 65-byte hex strings.
#[async_trait]
pub trait TrezorHandle: DeviceHandle {
    /// One-time bridge setup; may report that a previous session already did it
    async fn init(&mut self) -> Result<(), TrezorError>;

    /// Signs an EIP-191 personal message given as hex without the `0x` prefix
    async fn sign_message(&mut self, path: &str, message_hex: &str) -> Result<String, TrezorError>;

    /// Signs a complete typed-data document; the device does its own hashing
    async fn sign_typed_data(
        &mut self,
        path: &str,
        document: &Value,
        metamask_v4_compat: bool,
    ) -> Result<String, TrezorError>;
}
