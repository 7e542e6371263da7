pub mod app;
#[cfg(feature = "ledger")]
pub mod apdu;
pub mod types;

use crate::hardware::DeviceHandle;
use async_trait::async_trait;
use custodian_core::types::RawSignature;
use types::LedgerError;

/// Opens connections to a Ledger running the Ethereum app
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    async fn open(&self) -> Result<Box<dyn LedgerHandle>, LedgerError>;
}

/// An open Ledger connection. Paths are BIP-32 strings such as `m/44'/60'/0'/0/0`, payloads are
/// hex without the `0x` prefix.
#[async_trait]
pub trait LedgerHandle: DeviceHandle {
    /// Signs an EIP-191 personal message; the device applies the prefix itself
    async fn sign_personal_message(
        &mut self,
        path: &str,
        message_hex: &str,
    ) -> Result<RawSignature, LedgerError>;

    /// Signs a precomputed EIP-712 domain separator and message hash
    async fn sign_typed_data_hash(
        &mut self,
        path: &str,
        domain_separator_hex: &str,
        struct_hash_hex: &str,
    ) -> Result<RawSignature, LedgerError>;
}
